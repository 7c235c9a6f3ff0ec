pub mod binding;
pub mod common;
pub mod controls;
pub mod instance;
pub mod meta;
pub mod record;
pub mod translation;


use xf_core::{FormModel, InstanceNode, XFormError};
use xf_parser::{parse_xml_document, XmlElementNode};

const DEFAULT_VERSION: &str = "1.0.0";

/// Tokenizes the form document and converts it. Tokenization failure is the
/// single terminal error of the whole conversion.
pub fn convert_xform(source: &str) -> Result<FormModel, XFormError> {
    let document = parse_xml_document(source)?;
    Ok(convert_document(&document.root))
}

/// Assembles the normalized form model from the attributed tree. The phases
/// read disjoint views of the same immutable tree: translations and the
/// binding table are independent, the widget walker joins both, and the
/// head extractions fill the remaining fields. Absent sections degrade to
/// empty output, never errors.
pub fn convert_document(root: &XmlElementNode) -> FormModel {
    let primary = instance::primary_instance(root);
    let container = instance::instance_container(root);

    let translations = translation::parse_translations(root);
    let bindings = binding::parse_bindings(root, &container);
    let questions = controls::parse_questions(root, &bindings, &translations);
    let meta = meta::parse_meta(&bindings);

    FormModel {
        title: parse_title(root),
        id: primary.and_then(|node| node.attr("id")).map(str::to_string),
        version: primary
            .and_then(|node| node.attr("version"))
            .unwrap_or(DEFAULT_VERSION)
            .to_string(),
        instance_name: primary.map(|node| node.name.clone()).unwrap_or_default(),
        instance: primary
            .map(instance::instance_tree)
            .unwrap_or_else(InstanceNode::empty),
        translations,
        questions,
        meta,
    }
}

fn parse_title(root: &XmlElementNode) -> String {
    root.child("head")
        .and_then(|head| head.child("title"))
        .map(|title| title.text().trim().to_string())
        .unwrap_or_default()
}
