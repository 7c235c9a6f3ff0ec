use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use xf_core::InstanceNode;
use xf_parser::XmlElementNode;

/// First element child of the first `head/model/instance` block: the root of
/// the primary data schema. Secondary instances are never consulted.
pub fn primary_instance(root: &XmlElementNode) -> Option<&XmlElementNode> {
    root.child("head")?
        .child("model")?
        .child("instance")?
        .elements()
        .next()
}

/// Converts an instance subtree into the data-value tree. Leaf elements keep
/// their trimmed text; repeated same-tag children collapse into a list under
/// their shared key.
pub fn instance_tree(element: &XmlElementNode) -> InstanceNode {
    let mut children: BTreeMap<String, InstanceNode> = BTreeMap::new();
    let mut has_elements = false;

    for child in element.elements() {
        has_elements = true;
        let value = instance_tree(child);
        match children.entry(child.name.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
            Entry::Occupied(mut slot) => match slot.get_mut() {
                InstanceNode::List(list) => list.push(value),
                existing => {
                    let first = existing.clone();
                    *existing = InstanceNode::List(vec![first, value]);
                }
            },
        }
    }

    if has_elements {
        InstanceNode::Children(children)
    } else {
        InstanceNode::Text(element.text().trim().to_string())
    }
}

/// The primary instance wrapped under its own name, the shape default-value
/// lookups walk: the first reference segment is the instance name itself.
pub fn instance_container(root: &XmlElementNode) -> InstanceNode {
    match primary_instance(root) {
        Some(node) => InstanceNode::Children(BTreeMap::from([(
            node.name.clone(),
            instance_tree(node),
        )])),
        None => InstanceNode::empty(),
    }
}
