// Nested value tree assembled from dotted field keys
//
// `purple.profile.phone` style keys are split on `.` and merged into a tree of nodes. The tree
// serializes as plain JSON (leaves as strings, nodes as objects) so it can be dropped straight
// into a request body.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

pub const PATH_SEPARATOR: char = '.';

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathTree {
    Leaf(String),
    Node(BTreeMap<String, PathTree>),
}

impl Default for PathTree {
    fn default() -> Self {
        Self::empty()
    }
}

impl PathTree {
    pub fn empty() -> Self {
        Self::Node(BTreeMap::new())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Node(children) if children.is_empty())
    }

    /// Assign `value` at `path`.
    ///
    /// Intermediate segments reuse an existing node; anything else sitting there (a leaf) is
    /// replaced by a fresh empty node. The final segment is always overwritten, so the last
    /// writer wins when two keys disagree about the shape.
    pub fn set_path(&mut self, path: &str, value: impl Into<String>) {
        let segments: Vec<&str> = path.split(PATH_SEPARATOR).collect();
        let (last, parents) = match segments.split_last() {
            Some(split) => split,
            None => return,
        };

        let mut node = self;
        for segment in parents {
            node = node.child_node_mut(segment);
        }
        node.as_node_mut()
            .insert((*last).to_string(), Self::Leaf(value.into()));
    }

    pub fn get_path(&self, path: &str) -> Option<&PathTree> {
        path.split(PATH_SEPARATOR)
            .try_fold(self, |node, segment| match node {
                Self::Node(children) => children.get(segment),
                Self::Leaf(_) => None,
            })
    }

    pub fn leaf_at(&self, path: &str) -> Option<&str> {
        match self.get_path(path)? {
            Self::Leaf(v) => Some(v.as_str()),
            Self::Node(_) => None,
        }
    }

    /// Inverse of `set_path`: every leaf as `(dotted key, value)`, keys in sorted order.
    pub fn flatten(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        self.flatten_into("", &mut out);
        out
    }

    fn flatten_into(&self, prefix: &str, out: &mut Vec<(String, String)>) {
        match self {
            Self::Leaf(v) => out.push((prefix.to_string(), v.clone())),
            Self::Node(children) => {
                for (key, child) in children {
                    let path = if prefix.is_empty() {
                        key.clone()
                    } else {
                        format!("{}{}{}", prefix, PATH_SEPARATOR, key)
                    };
                    child.flatten_into(&path, out);
                }
            }
        }
    }

    /// Build a tree from a JSON document (e.g. a contract preview section).
    ///
    /// Scalars become string leaves (`null` becomes an empty string); arrays are keyed by index.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self::Node(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            ),
            Value::Array(items) => Self::Node(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (i.to_string(), Self::from_json(v)))
                    .collect(),
            ),
            Value::String(s) => Self::Leaf(s.clone()),
            Value::Null => Self::Leaf(String::new()),
            other => Self::Leaf(other.to_string()),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Leaf(v) => Value::String(v.clone()),
            Self::Node(children) => Value::Object(
                children
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    fn as_node_mut(&mut self) -> &mut BTreeMap<String, PathTree> {
        if let Self::Leaf(_) = self {
            *self = Self::empty();
        }
        match self {
            Self::Node(children) => children,
            Self::Leaf(_) => unreachable!("leaf was replaced by a node above"),
        }
    }

    fn child_node_mut(&mut self, segment: &str) -> &mut PathTree {
        let child = self
            .as_node_mut()
            .entry(segment.to_string())
            .or_insert_with(Self::empty);
        if let Self::Leaf(_) = child {
            *child = Self::empty();
        }
        child
    }
}
