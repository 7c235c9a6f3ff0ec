use std::collections::BTreeMap;

use xf_parser::{XmlElementNode, XmlNode};

/// Reserved record key for an element's inline text content.
pub const VALUE_KEY: &str = "value";

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            Self::Flag(_) => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(value) => Some(*value),
            Self::Text(_) => None,
        }
    }
}

/// A tree node flattened into one keyed record: attribute map merged into
/// the node body, attribute container gone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl FlatRecord {
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(FieldValue::as_text)
    }

    pub fn flag(&self, key: &str) -> bool {
        self.fields
            .get(key)
            .and_then(FieldValue::as_flag)
            .unwrap_or(false)
    }

    pub fn has(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn set_text(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields
            .insert(key.into(), FieldValue::Text(value.into()));
    }

    fn values_mut(&mut self) -> impl Iterator<Item = &mut FieldValue> {
        self.fields.values_mut()
    }
}

pub fn normalize(node: &XmlNode) -> FlatRecord {
    match node {
        XmlNode::Element(element) => normalize_element(element),
        XmlNode::Text(text) => {
            let mut record = FlatRecord::default();
            record.set_text(VALUE_KEY, text.value.clone());
            record
        }
    }
}

pub fn normalize_element(element: &XmlElementNode) -> FlatRecord {
    let mut record = FlatRecord::default();
    for (name, value) in &element.attributes {
        record.set_text(name.clone(), value.clone());
    }

    let inline = element.text();
    if !inline.is_empty() {
        record.set_text(VALUE_KEY, inline);
    }

    record
}

/// Promotes `true()`/`false()` literals (and their bare spellings) to native
/// flags. Top-level fields only, never recursive.
pub fn coerce_booleans(record: &mut FlatRecord) {
    for value in record.values_mut() {
        let FieldValue::Text(text) = value else {
            continue;
        };
        if text.starts_with("true") {
            *value = FieldValue::Flag(true);
        } else if text.starts_with("false") {
            *value = FieldValue::Flag(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xf_parser::parse_xml_document;

    fn element(source: &str) -> XmlElementNode {
        parse_xml_document(source).expect("xml should parse").root
    }

    #[test]
    fn normalize_merges_attributes_into_the_record() {
        let node = element(r#"<bind nodeset="/phone/age" type="int" required="true()"/>"#);
        let record = normalize_element(&node);

        assert_eq!(record.text("nodeset"), Some("/phone/age"));
        assert_eq!(record.text("type"), Some("int"));
        assert_eq!(record.text("required"), Some("true()"));
        assert!(!record.has(VALUE_KEY));
    }

    #[test]
    fn normalize_keeps_inline_text_under_the_value_key() {
        let node = element("<label>Visible ID</label>");
        let record = normalize_element(&node);
        assert_eq!(record.text(VALUE_KEY), Some("Visible ID"));
    }

    #[test]
    fn normalize_wraps_a_plain_text_node() {
        let root = element("<label>Hello\n<output ref=\"/a\"/></label>");
        let text = root
            .children
            .iter()
            .find(|child| matches!(child, XmlNode::Text(_)))
            .expect("text child");

        let record = normalize(text);
        assert_eq!(record.text(VALUE_KEY), Some("Hello\n"));
    }

    #[test]
    fn coerce_booleans_promotes_literal_prefixes() {
        let node = element(r#"<bind required="true()" readonly="false()" relevant="../age > 10"/>"#);
        let mut record = normalize_element(&node);
        coerce_booleans(&mut record);

        assert!(record.flag("required"));
        assert!(!record.flag("readonly"));
        assert_eq!(record.get("readonly"), Some(&FieldValue::Flag(false)));
        // non-boolean expressions stay text
        assert_eq!(record.text("relevant"), Some("../age > 10"));
    }

    #[test]
    fn flag_is_false_for_missing_and_text_fields() {
        let node = element(r#"<bind nodeset="/a"/>"#);
        let record = normalize_element(&node);
        assert!(!record.flag("required"));
        assert!(!record.flag("nodeset"));
    }
}
