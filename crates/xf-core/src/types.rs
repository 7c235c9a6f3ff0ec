use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value::InstanceNode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: SourceLocation,
    pub end: SourceLocation,
}

impl SourceSpan {
    pub fn synthetic() -> Self {
        Self {
            start: SourceLocation { line: 1, column: 1 },
            end: SourceLocation { line: 1, column: 1 },
        }
    }
}

/// Canonical data-type tag of a binding. Source documents spell types with
/// dialect synonyms (`int`, `text`, `dateTime`); `parse` folds those into one
/// tag and passes every unrecognized name through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum DataType {
    String,
    Integer,
    Decimal,
    Boolean,
    Date,
    Time,
    DateTime,
    Select1,
    Select,
    Binary,
    Other(String),
}

impl DataType {
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with("dateTime") || raw.starts_with("datetime") {
            return Self::DateTime;
        }
        if raw.starts_with("int") {
            return Self::Integer;
        }
        if raw.starts_with("string") || raw.starts_with("text") {
            return Self::String;
        }

        match raw {
            "decimal" => Self::Decimal,
            "boolean" => Self::Boolean,
            "date" => Self::Date,
            "time" => Self::Time,
            "select1" => Self::Select1,
            "select" => Self::Select,
            "binary" => Self::Binary,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "datetime",
            Self::Select1 => "select1",
            Self::Select => "select",
            Self::Binary => "binary",
            Self::Other(name) => name,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer | Self::Decimal)
    }
}

impl Default for DataType {
    fn default() -> Self {
        Self::String
    }
}

impl From<DataType> for String {
    fn from(value: DataType) -> Self {
        value.as_str().to_string()
    }
}

impl From<String> for DataType {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

/// Default answer of a question. Numeric bindings carry numbers; everything
/// else stays text, including numeric bindings whose source value does not
/// parse as a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    pub reference: String,
    pub variable: String,
    pub r#type: DataType,
    pub required: bool,
    pub readonly: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preload: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preload_params: Option<String>,
    pub save_incomplete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<DefaultValue>,
}

/// One catalogue entry: text id plus its form-keyed variants
/// (`long`/`short`/`image`). An unlabeled variant lands under `long`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEntry {
    pub id: String,
    pub value: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub lang: String,
    #[serde(rename = "default")]
    pub is_default: bool,
    pub text: Vec<TextEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageText {
    pub lang: String,
    pub value: BTreeMap<String, String>,
}

/// Resolved label or hint. `id` is present only when the text came from the
/// translation catalogue; `default_value` always uses the form-keyed shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedText {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub default_value: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<LanguageText>,
}

impl LocalizedText {
    pub fn long(&self) -> Option<&str> {
        self.default_value.get("long").map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetKind {
    Input,
    Select1,
    Select,
    Upload,
    Trigger,
}

impl WidgetKind {
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "input" => Some(Self::Input),
            "select1" => Some(Self::Select1),
            "select" => Some(Self::Select),
            "upload" => Some(Self::Upload),
            "trigger" => Some(Self::Trigger),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Select1 => "select1",
            Self::Select => "select",
            Self::Upload => "upload",
            Self::Trigger => "trigger",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Group,
    Repeat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionInfo {
    pub kind: SectionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<LocalizedText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appearance: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceItem {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<LocalizedText>,
}

/// A leaf input question: the body control merged with its binding, resolved
/// label/hint, choice items, and the section ancestry chain (outermost
/// enclosing group or repeat first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    pub name: String,
    pub reference: String,
    pub widget: WidgetKind,
    pub r#type: DataType,
    pub required: bool,
    pub readonly: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculate: Option<String>,
    pub save_incomplete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<DefaultValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<LocalizedText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<LocalizedText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appearance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mediatype: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<ChoiceItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub section: Vec<SectionInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormModel {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub version: String,
    pub instance_name: String,
    pub instance: InstanceNode,
    pub translations: Vec<Translation>,
    pub questions: Vec<Widget>,
    pub meta: Vec<Binding>,
}
