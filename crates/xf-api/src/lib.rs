pub use xf_core::{
    Binding, ChoiceItem, DataType, DefaultValue, FormModel, InstanceNode, LanguageText,
    LocalizedText, SectionInfo, SectionKind, TextEntry, Translation, Widget, WidgetKind,
    XFormError,
};

/// Converts one form document into the normalized model. The only error is
/// the tokenizer's; structurally incomplete forms convert to sparse models.
pub fn convert_xform(source: &str) -> Result<FormModel, XFormError> {
    xf_convert::convert_xform(source)
}

/// Converts one form document and renders the model as JSON.
pub fn convert_xform_to_json(source: &str, pretty: bool) -> Result<String, XFormError> {
    let model = convert_xform(source)?;
    let rendered = if pretty {
        serde_json::to_string_pretty(&model)
    } else {
        serde_json::to_string(&model)
    };
    rendered.map_err(|error| XFormError::new("JSON_RENDER_ERROR", error.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convert_xform_produces_a_model() {
        let model = convert_xform(
            r#"<html><head><title>Tiny</title></head><body/></html>"#,
        )
        .expect("form should convert");
        assert_eq!(model.title, "Tiny");
    }

    #[test]
    fn convert_xform_returns_the_tokenizer_error() {
        let error = convert_xform("<html>").expect_err("malformed xml should fail");
        assert_eq!(error.code, "XML_PARSE_ERROR");
    }

    #[test]
    fn convert_xform_to_json_renders_compact_and_pretty() {
        let source = r#"<html><head><title>Tiny</title></head><body/></html>"#;

        let compact = convert_xform_to_json(source, false).expect("render should pass");
        assert!(compact.contains("\"title\":\"Tiny\""));

        let pretty = convert_xform_to_json(source, true).expect("render should pass");
        assert!(pretty.contains("\"title\": \"Tiny\""));
    }
}
