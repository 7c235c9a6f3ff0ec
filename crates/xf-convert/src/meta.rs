use std::collections::BTreeMap;

use xf_core::Binding;

/// Form metadata: every binding whose source node carried a `preload`
/// attribute, unmodified, in table order.
pub fn parse_meta(bindings: &BTreeMap<String, Binding>) -> Vec<Binding> {
    bindings
        .values()
        .filter(|binding| binding.preload.is_some())
        .cloned()
        .collect()
}
