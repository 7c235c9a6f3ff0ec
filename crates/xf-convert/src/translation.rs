use std::collections::BTreeMap;

use xf_core::{LanguageText, TextEntry, Translation};
use xf_parser::XmlElementNode;

use crate::record::{coerce_booleans, normalize_element};

/// Builds the ordered language catalogue from the `head/model/itext` block.
/// A form without a catalogue yields an empty list, not an error. When no
/// translation is flagged default, the first declared one is forced default.
pub fn parse_translations(root: &XmlElementNode) -> Vec<Translation> {
    let Some(itext) = root
        .child("head")
        .and_then(|head| head.child("model"))
        .and_then(|model| model.child("itext"))
    else {
        return Vec::new();
    };

    let mut translations = Vec::new();
    for node in itext.children_named("translation") {
        let mut record = normalize_element(node);
        coerce_booleans(&mut record);

        translations.push(Translation {
            lang: record.text("lang").unwrap_or_default().to_string(),
            is_default: record.flag("default"),
            text: node.children_named("text").map(parse_text_entry).collect(),
        });
    }

    if !translations.is_empty() && !translations.iter().any(|entry| entry.is_default) {
        translations[0].is_default = true;
    }

    translations
}

fn parse_text_entry(node: &XmlElementNode) -> TextEntry {
    let mut value = BTreeMap::new();
    for variant in node.children_named("value") {
        let form = variant.attr("form").unwrap_or("long").to_string();
        value.insert(form, variant.text());
    }

    // some dialects inline the text directly on <text>; wrap it as the
    // long form so every entry shares one shape
    if value.is_empty() {
        let inline = node.text();
        if !inline.is_empty() {
            value.insert("long".to_string(), inline);
        }
    }

    TextEntry {
        id: node.attr("id").unwrap_or_default().to_string(),
        value,
    }
}

/// Exact-language match when `lang` is given, otherwise the default-flagged
/// entry. Absence is not an error; callers treat a missing language as
/// optional.
pub fn select_language<'a>(
    translations: &'a [Translation],
    lang: Option<&str>,
) -> Option<&'a Translation> {
    match lang {
        Some(lang) => translations.iter().find(|entry| entry.lang == lang),
        None => translations.iter().find(|entry| entry.is_default),
    }
}

/// The default language's entry for `text_id`, merged with its language code.
pub fn resolve_default_text(translations: &[Translation], text_id: &str) -> Option<LanguageText> {
    let language = select_language(translations, None)?;
    let entry = language.text.iter().find(|entry| entry.id == text_id)?;
    Some(LanguageText {
        lang: language.lang.clone(),
        value: entry.value.clone(),
    })
}

/// Every language's entry for `text_id` in declaration order, skipping
/// languages that lack the id.
pub fn resolve_all_languages(translations: &[Translation], text_id: &str) -> Vec<LanguageText> {
    translations
        .iter()
        .filter_map(|translation| {
            translation
                .text
                .iter()
                .find(|entry| entry.id == text_id)
                .map(|entry| LanguageText {
                    lang: translation.lang.clone(),
                    value: entry.value.clone(),
                })
        })
        .collect()
}
