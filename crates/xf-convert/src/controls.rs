use std::collections::BTreeMap;

use xf_core::{
    Binding, ChoiceItem, LocalizedText, SectionInfo, SectionKind, Translation, Widget, WidgetKind,
};
use xf_parser::XmlElementNode;

use crate::common::{collapse_whitespace, text_id_from_reference, variable_name};
use crate::translation::{resolve_all_languages, resolve_default_text};

/// Body tree after the normalize pass: leaf widgets and nested sections as
/// an explicit tagged variant mirroring the source group/repeat nesting.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyNode {
    Widget(Box<Widget>),
    Section(SectionNode),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionNode {
    pub info: SectionInfo,
    pub children: Vec<BodyNode>,
}

pub fn section_kind(tag: &str) -> Option<SectionKind> {
    match tag {
        "group" => Some(SectionKind::Group),
        "repeat" => Some(SectionKind::Repeat),
        _ => None,
    }
}

/// Walks the body tree and returns the flat ordered widget list, each widget
/// stamped with its section ancestry chain.
pub fn parse_questions(
    root: &XmlElementNode,
    bindings: &BTreeMap<String, Binding>,
    translations: &[Translation],
) -> Vec<Widget> {
    let Some(body) = root.child("body") else {
        return Vec::new();
    };
    flatten_body(normalize_body(body, bindings, translations))
}

/// Normalize pass: pure recursion over the immutable body tree. Widget tags
/// become parsed widgets merged with their bindings; group/repeat tags
/// become sections holding their recursively normalized children. Label and
/// hint children belong to the enclosing control and are consumed by its
/// parser, not walked here.
pub fn normalize_body(
    container: &XmlElementNode,
    bindings: &BTreeMap<String, Binding>,
    translations: &[Translation],
) -> Vec<BodyNode> {
    let mut nodes = Vec::new();
    for child in container.elements() {
        if let Some(kind) = WidgetKind::parse(&child.name) {
            nodes.push(BodyNode::Widget(Box::new(parse_widget(
                child,
                kind,
                bindings,
                translations,
            ))));
        } else if let Some(kind) = section_kind(&child.name) {
            nodes.push(BodyNode::Section(SectionNode {
                info: section_info(child, kind, translations),
                children: normalize_body(child, bindings, translations),
            }));
        }
    }
    nodes
}

fn section_info(
    element: &XmlElementNode,
    kind: SectionKind,
    translations: &[Translation],
) -> SectionInfo {
    SectionInfo {
        kind,
        reference: element
            .attr("ref")
            .or_else(|| element.attr("nodeset"))
            .map(str::to_string),
        label: element
            .child("label")
            .map(|label| resolve_text(label, translations)),
        appearance: element.attr("appearance").map(str::to_string),
    }
}

/// Flatten pass: the section chain grows one link per nesting level and every
/// widget is appended in document order carrying the full accumulated chain.
pub fn flatten_body(nodes: Vec<BodyNode>) -> Vec<Widget> {
    let mut widgets = Vec::new();
    for node in nodes {
        flatten_into(&[], node, &mut widgets);
    }
    widgets
}

fn flatten_into(chain: &[SectionInfo], node: BodyNode, out: &mut Vec<Widget>) {
    match node {
        BodyNode::Widget(widget) => {
            let mut widget = *widget;
            widget.section = chain.to_vec();
            out.push(widget);
        }
        BodyNode::Section(section) => {
            let mut chain = chain.to_vec();
            chain.push(section.info);
            for child in section.children {
                flatten_into(&chain, child, out);
            }
        }
    }
}

fn parse_widget(
    element: &XmlElementNode,
    kind: WidgetKind,
    bindings: &BTreeMap<String, Binding>,
    translations: &[Translation],
) -> Widget {
    let reference = element
        .attr("ref")
        .or_else(|| element.attr("nodeset"))
        .unwrap_or_default()
        .to_string();
    let binding = bindings.get(&reference);

    Widget {
        name: binding
            .map(|binding| binding.variable.clone())
            .unwrap_or_else(|| variable_name(&reference)),
        reference,
        widget: kind,
        r#type: binding
            .map(|binding| binding.r#type.clone())
            .unwrap_or_default(),
        required: binding.is_some_and(|binding| binding.required),
        readonly: binding.is_some_and(|binding| binding.readonly),
        constraint: binding.and_then(|binding| binding.constraint.clone()),
        constraint_message: binding.and_then(|binding| binding.constraint_message.clone()),
        relevant: binding.and_then(|binding| binding.relevant.clone()),
        calculate: binding.and_then(|binding| binding.calculate.clone()),
        save_incomplete: binding.is_some_and(|binding| binding.save_incomplete),
        default_value: binding.and_then(|binding| binding.default_value.clone()),
        label: element
            .child("label")
            .map(|label| resolve_text(label, translations)),
        hint: element
            .child("hint")
            .map(|hint| resolve_text(hint, translations)),
        appearance: element.attr("appearance").map(str::to_string),
        mediatype: element.attr("mediatype").map(str::to_string),
        items: element
            .children_named("item")
            .map(|item| parse_choice_item(item, translations))
            .collect(),
        section: Vec::new(),
    }
}

fn parse_choice_item(element: &XmlElementNode, translations: &[Translation]) -> ChoiceItem {
    ChoiceItem {
        value: element
            .child("value")
            .map(|value| value.text().trim().to_string())
            .unwrap_or_default(),
        label: element
            .child("label")
            .map(|label| resolve_text(label, translations)),
    }
}

/// Resolves a label or hint node. Inline text becomes the long-form default;
/// a `ref` attribute naming a catalogue id replaces the default with the
/// default language's text and attaches every language; an embedded `output`
/// child splices a `{{variable}}` placeholder at the first newline, after
/// which whitespace runs collapse to single spaces.
fn resolve_text(element: &XmlElementNode, translations: &[Translation]) -> LocalizedText {
    let mut text = LocalizedText::default();

    let inline = element.text();
    if !inline.trim().is_empty() {
        text.default_value.insert("long".to_string(), inline);
    }

    if let Some(reference) = element.attr("ref") {
        if !translations.is_empty() {
            let id = text_id_from_reference(reference);
            if let Some(resolved) = resolve_default_text(translations, &id) {
                text.default_value = resolved.value;
            }
            text.languages = resolve_all_languages(translations, &id);
            text.id = Some(id);
        }
    }

    if let Some(output_ref) = element.child("output").and_then(|output| output.attr("ref")) {
        if let Some(long) = text.default_value.get("long").cloned() {
            let placeholder = format!(" {{{{{}}}}}", variable_name(output_ref));
            let spliced = long.replacen('\n', &placeholder, 1);
            text.default_value
                .insert("long".to_string(), collapse_whitespace(&spliced));
        }
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use xf_core::{DataType, DefaultValue};
    use xf_parser::parse_xml_document;
    use crate::binding::parse_bindings;
    use crate::instance::instance_container;
    use crate::translation::parse_translations;

    fn questions(source: &str) -> Vec<Widget> {
        let document = parse_xml_document(source).expect("xml should parse");
        let instance = instance_container(&document.root);
        let bindings = parse_bindings(&document.root, &instance);
        let translations = parse_translations(&document.root);
        parse_questions(&document.root, &bindings, &translations)
    }

    #[test]
    fn parse_questions_merges_widgets_with_their_bindings() {
        let widgets = questions(
            r#"
<html>
  <head><model>
    <instance><phone><age>18</age></phone></instance>
    <bind nodeset="/phone/age" type="int" required="true()"/>
  </model></head>
  <body>
    <input ref="/phone/age"><label>Age</label><hint>Years since birth</hint></input>
  </body>
</html>
"#,
        );

        assert_eq!(widgets.len(), 1);
        let age = &widgets[0];
        assert_eq!(age.name, "age");
        assert_eq!(age.reference, "/phone/age");
        assert_eq!(age.widget, WidgetKind::Input);
        assert_eq!(age.r#type, DataType::Integer);
        assert!(age.required);
        assert_eq!(age.default_value, Some(DefaultValue::Number(18.0)));
        assert_eq!(
            age.label.as_ref().and_then(|label| label.long()),
            Some("Age")
        );
        assert_eq!(
            age.hint.as_ref().and_then(|hint| hint.long()),
            Some("Years since birth")
        );
        assert!(age.section.is_empty());
    }

    #[test]
    fn parse_questions_keeps_unbound_widgets_with_defaults() {
        let widgets = questions(
            r#"
<html>
  <body><trigger ref="/data/ack"><label>Acknowledge</label></trigger></body>
</html>
"#,
        );

        assert_eq!(widgets.len(), 1);
        assert_eq!(widgets[0].widget, WidgetKind::Trigger);
        assert_eq!(widgets[0].name, "ack");
        assert_eq!(widgets[0].r#type, DataType::String);
        assert!(!widgets[0].required);
    }

    #[test]
    fn flattening_preserves_document_order_and_section_depth() {
        let widgets = questions(
            r#"
<html>
  <body>
    <input ref="/data/first"><label>First</label></input>
    <group ref="/data/outer">
      <label>Outer</label>
      <input ref="/data/second"><label>Second</label></input>
      <repeat nodeset="/data/inner">
        <input ref="/data/third"><label>Third</label></input>
        <input ref="/data/fourth"><label>Fourth</label></input>
      </repeat>
    </group>
    <input ref="/data/fifth"><label>Fifth</label></input>
  </body>
</html>
"#,
        );

        let names = widgets.iter().map(|widget| widget.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["first", "second", "third", "fourth", "fifth"]);

        assert!(widgets[0].section.is_empty());
        assert_eq!(widgets[1].section.len(), 1);
        assert_eq!(widgets[1].section[0].kind, SectionKind::Group);
        assert_eq!(
            widgets[1].section[0].reference.as_deref(),
            Some("/data/outer")
        );

        assert_eq!(widgets[2].section.len(), 2);
        assert_eq!(widgets[2].section[0].kind, SectionKind::Group);
        assert_eq!(widgets[2].section[1].kind, SectionKind::Repeat);
        assert_eq!(
            widgets[2].section[1].reference.as_deref(),
            Some("/data/inner")
        );
        assert_eq!(widgets[3].section, widgets[2].section);

        assert!(widgets[4].section.is_empty());
    }

    #[test]
    fn sibling_sections_carry_their_own_chains() {
        let widgets = questions(
            r#"
<html>
  <body>
    <group ref="/data/a"><input ref="/data/a/x"><label>X</label></input></group>
    <group ref="/data/b"><input ref="/data/b/y"><label>Y</label></input></group>
  </body>
</html>
"#,
        );

        assert_eq!(widgets.len(), 2);
        assert_eq!(widgets[0].section[0].reference.as_deref(), Some("/data/a"));
        assert_eq!(widgets[1].section[0].reference.as_deref(), Some("/data/b"));
    }

    #[test]
    fn select_widgets_collect_choice_items() {
        let widgets = questions(
            r#"
<html>
  <head><model>
    <instance><phone><status/></phone></instance>
    <bind nodeset="/phone/status" type="select1"/>
  </model></head>
  <body>
    <select1 ref="/phone/status">
      <label>Status</label>
      <item><label>Functional</label><value>functional</value></item>
      <item><label>Broken</label><value>broken</value></item>
    </select1>
  </body>
</html>
"#,
        );

        let status = &widgets[0];
        assert_eq!(status.r#type, DataType::Select1);
        assert_eq!(
            status
                .items
                .iter()
                .map(|item| item.value.as_str())
                .collect::<Vec<_>>(),
            vec!["functional", "broken"]
        );
        assert_eq!(
            status.items[0].label.as_ref().and_then(|label| label.long()),
            Some("Functional")
        );
    }

    #[test]
    fn label_with_output_child_splices_a_placeholder_at_the_first_newline() {
        let widgets = questions(
            "<html><body><input ref=\"/data/sex\"><label>Hi\n<output ref=\"/data/name\"/></label></input></body></html>",
        );

        assert_eq!(
            widgets[0].label.as_ref().and_then(|label| label.long()),
            Some("Hi {{name}}")
        );
    }

    #[test]
    fn label_ref_resolves_against_the_catalogue() {
        let widgets = questions(
            r#"
<html>
  <head><model>
    <itext>
      <translation lang="eng" default="true()">
        <text id="/data/name:label"><value>Water Point Name</value></text>
      </translation>
      <translation lang="sw">
        <text id="/data/name:label"><value>Jina la Kituo cha Maji</value></text>
      </translation>
    </itext>
    <instance><data><name/></data></instance>
    <bind nodeset="/data/name" type="string"/>
  </model></head>
  <body>
    <input ref="/data/name"><label ref="jr:itext('/data/name:label')"/></input>
  </body>
</html>
"#,
        );

        let label = widgets[0].label.as_ref().expect("label");
        assert_eq!(label.id.as_deref(), Some("/data/name:label"));
        assert_eq!(label.long(), Some("Water Point Name"));
        assert_eq!(
            label
                .languages
                .iter()
                .map(|entry| entry.lang.as_str())
                .collect::<Vec<_>>(),
            vec!["eng", "sw"]
        );
    }

    #[test]
    fn label_ref_without_a_catalogue_falls_back_to_plain_text() {
        let widgets = questions(
            r#"<html><body><input ref="/data/name"><label ref="jr:itext('/data/name:label')">Name</label></input></body></html>"#,
        );

        let label = widgets[0].label.as_ref().expect("label");
        assert!(label.id.is_none());
        assert_eq!(label.long(), Some("Name"));
        assert!(label.languages.is_empty());
    }

    #[test]
    fn upload_widgets_carry_their_mediatype() {
        let widgets = questions(
            r#"<html><body><upload ref="/data/picture" mediatype="image/*"><label>Picture</label></upload></body></html>"#,
        );
        assert_eq!(widgets[0].widget, WidgetKind::Upload);
        assert_eq!(widgets[0].mediatype.as_deref(), Some("image/*"));
    }

    #[test]
    fn parse_questions_degrades_to_empty_without_a_body() {
        let document = parse_xml_document("<html><head/></html>").expect("xml should parse");
        assert!(parse_questions(&document.root, &BTreeMap::new(), &[]).is_empty());
    }
}
