use std::collections::BTreeMap;

use xf_core::{Binding, DataType, DefaultValue, InstanceNode};
use xf_parser::XmlElementNode;

use crate::common::{instance_segments, variable_name};
use crate::record::{coerce_booleans, normalize_element};

const FALSE_LITERAL: &str = "false()";

/// Parses one `bind` declaration. `reference` prefers `nodeset` over `ref`;
/// the type tag defaults to string; absent behavior flags default to the
/// unresolved `false()` literal before boolean coercion.
pub fn parse_binding(node: &XmlElementNode) -> Binding {
    let mut record = normalize_element(node);

    let reference = record
        .text("nodeset")
        .or_else(|| record.text("ref"))
        .unwrap_or_default()
        .to_string();
    let r#type = DataType::parse(record.text("type").unwrap_or("string"));

    for key in ["readonly", "required", "saveIncomplete"] {
        if !record.has(key) {
            record.set_text(key, FALSE_LITERAL);
        }
    }
    coerce_booleans(&mut record);

    Binding {
        variable: variable_name(&reference),
        reference,
        r#type,
        required: record.flag("required"),
        readonly: record.flag("readonly"),
        constraint: record.text("constraint").map(str::to_string),
        constraint_message: record.text("constraintMsg").map(str::to_string),
        relevant: record.text("relevant").map(str::to_string),
        calculate: record.text("calculate").map(str::to_string),
        preload: record.text("preload").map(str::to_string),
        preload_params: record.text("preloadParams").map(str::to_string),
        save_incomplete: record.flag("saveIncomplete"),
        default_value: None,
    }
}

/// Looks the binding's reference up in the primary-instance tree and assigns
/// a non-empty value as the default. Readonly bindings never take defaults.
/// Integer/decimal defaults coerce to numbers when the text parses; a
/// non-numeric source value stays text.
pub fn resolve_default_value(instance: &InstanceNode, binding: &mut Binding) {
    if binding.readonly {
        return;
    }

    let segments = instance_segments(&binding.reference);
    if segments.is_empty() {
        return;
    }

    let Some(found) = instance.lookup(&segments) else {
        return;
    };
    let Some(text) = found.as_text() else {
        return;
    };
    if text.is_empty() {
        return;
    }

    binding.default_value = Some(coerce_default(&binding.r#type, text));
}

fn coerce_default(r#type: &DataType, raw: &str) -> DefaultValue {
    if r#type.is_numeric() {
        if let Ok(number) = raw.trim().parse::<f64>() {
            return DefaultValue::Number(number);
        }
    }
    DefaultValue::Text(raw.to_string())
}

/// Parses every `model/bind` declaration into a reference-keyed table.
/// A later declaration for a duplicate reference overwrites the earlier one.
pub fn parse_bindings(
    root: &XmlElementNode,
    instance: &InstanceNode,
) -> BTreeMap<String, Binding> {
    let Some(model) = root.child("head").and_then(|head| head.child("model")) else {
        return BTreeMap::new();
    };

    let mut table = BTreeMap::new();
    for node in model.children_named("bind") {
        let mut binding = parse_binding(node);
        if binding.reference.is_empty() {
            continue;
        }
        resolve_default_value(instance, &mut binding);
        table.insert(binding.reference.clone(), binding);
    }

    table
}
