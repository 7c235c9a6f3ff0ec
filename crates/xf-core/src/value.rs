use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Primary-instance data tree. Leaf elements carry their text content,
/// containers map child names to nodes, and repeated same-tag children
/// collapse into an ordered list under their shared key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InstanceNode {
    Text(String),
    List(Vec<InstanceNode>),
    Children(BTreeMap<String, InstanceNode>),
}

impl InstanceNode {
    pub fn empty() -> Self {
        Self::Children(BTreeMap::new())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&InstanceNode> {
        match self {
            Self::Children(children) => children.get(key),
            _ => None,
        }
    }

    /// Descends container nodes segment by segment. Lists stop the walk:
    /// a repeated node has no single addressable value.
    pub fn lookup(&self, segments: &[&str]) -> Option<&InstanceNode> {
        let mut current = self;
        for segment in segments {
            current = current.get(segment)?;
        }
        Some(current)
    }
}
