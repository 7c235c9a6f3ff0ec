use std::fmt::Display;

use xf_core::XFormError;

fn map_error(code: &'static str, error: impl Display) -> XFormError {
    XFormError::new(code, error.to_string())
}

pub(crate) fn emit_error(error: XFormError) -> i32 {
    eprintln!("error {}: {}", error.code, error.message);
    1
}

pub(crate) fn map_cli_form_read(error: std::io::Error) -> XFormError {
    map_error("CLI_FORM_READ", error)
}

pub(crate) fn map_cli_output_write(error: std::io::Error) -> XFormError {
    map_error("CLI_OUTPUT_WRITE", error)
}

pub(crate) fn map_cli_forms_scan(error: walkdir::Error) -> XFormError {
    map_error("CLI_FORMS_SCAN", error)
}

pub(crate) fn map_cli_out_dir(error: std::io::Error) -> XFormError {
    map_error("CLI_OUT_DIR", error)
}
