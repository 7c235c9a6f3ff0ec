mod error_map;

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use walkdir::WalkDir;
use xf_api::convert_xform_to_json;
use xf_core::XFormError;

use error_map::{
    emit_error, map_cli_form_read, map_cli_forms_scan, map_cli_out_dir, map_cli_output_write,
};

#[derive(Debug, Parser)]
#[command(name = "xf-cli")]
#[command(about = "XForm to JSON converter")]
struct Cli {
    #[command(subcommand)]
    command: Mode,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Convert one form document to JSON.
    Convert(ConvertArgs),
    /// Convert every .xml form under a directory.
    Batch(BatchArgs),
}

#[derive(Debug, Args)]
struct ConvertArgs {
    #[arg(long = "form")]
    form: String,
    #[arg(long = "out")]
    out: Option<String>,
    #[arg(long = "pretty", default_value_t = false)]
    pretty: bool,
}

#[derive(Debug, Args)]
struct BatchArgs {
    #[arg(long = "forms-dir")]
    forms_dir: String,
    #[arg(long = "out-dir")]
    out_dir: String,
    #[arg(long = "pretty", default_value_t = false)]
    pretty: bool,
}

fn main() {
    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(error) => emit_error(error),
    };

    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32, XFormError> {
    match cli.command {
        Mode::Convert(args) => run_convert(args),
        Mode::Batch(args) => run_batch(args),
    }
}

fn run_convert(args: ConvertArgs) -> Result<i32, XFormError> {
    let source = fs::read_to_string(&args.form).map_err(map_cli_form_read)?;
    let rendered = convert_xform_to_json(&source, args.pretty)?;

    match args.out {
        Some(out) => fs::write(&out, rendered).map_err(map_cli_output_write)?,
        None => println!("{}", rendered),
    }

    Ok(0)
}

fn run_batch(args: BatchArgs) -> Result<i32, XFormError> {
    let forms = scan_form_files(Path::new(&args.forms_dir))?;
    if forms.is_empty() {
        return Err(XFormError::new(
            "CLI_FORMS_EMPTY",
            format!("No .xml forms found under {}", args.forms_dir),
        ));
    }

    let out_dir = PathBuf::from(&args.out_dir);
    fs::create_dir_all(&out_dir).map_err(map_cli_out_dir)?;

    for form in &forms {
        let source = fs::read_to_string(form).map_err(map_cli_form_read)?;
        let rendered = convert_xform_to_json(&source, args.pretty).map_err(|error| {
            XFormError::new(
                error.code.clone(),
                format!("{} ({})", error.message, form.display()),
            )
        })?;

        let target = out_dir.join(output_file_name(form));
        fs::write(&target, rendered).map_err(map_cli_output_write)?;
        println!("converted {} -> {}", form.display(), target.display());
    }

    Ok(0)
}

fn scan_form_files(forms_dir: &Path) -> Result<Vec<PathBuf>, XFormError> {
    let mut forms = Vec::new();
    for entry in WalkDir::new(forms_dir).follow_links(false) {
        let entry = entry.map_err(map_cli_forms_scan)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.into_path();
        if path
            .extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| extension.eq_ignore_ascii_case("xml"))
        {
            forms.push(path);
        }
    }

    forms.sort();
    Ok(forms)
}

fn output_file_name(form: &Path) -> PathBuf {
    let stem = form
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("form");
    PathBuf::from(format!("{}.json", stem))
}
