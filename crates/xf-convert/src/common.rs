use regex::Regex;

/// Last non-empty segment of a reference path, the answer variable name.
pub fn variable_name(reference: &str) -> String {
    reference
        .split('/')
        .filter(|segment| !segment.is_empty())
        .next_back()
        .unwrap_or_default()
        .to_string()
}

/// Non-empty segments of a reference path, the instance lookup chain.
pub fn instance_segments(reference: &str) -> Vec<&str> {
    reference
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Extracts the text id embedded as the sole quoted argument of a call-like
/// reference expression, e.g. `jr:itext('/data/name:label')`. Expressions
/// without the quote delimiters pass through unchanged.
pub fn text_id_from_reference(ref_expr: &str) -> String {
    let Some((_, rest)) = ref_expr.split_once("('") else {
        return ref_expr.to_string();
    };
    match rest.split_once("')") {
        Some((id, _)) => id.to_string(),
        None => rest.to_string(),
    }
}

pub fn collapse_whitespace(value: &str) -> String {
    let whitespace = Regex::new(r"\s+").expect("whitespace regex must compile");
    whitespace.replace_all(value, " ").into_owned()
}
