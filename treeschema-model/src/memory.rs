//! An in-memory [`Tree`] built from a small JSON fixture, in the manner of
//! `diskplan_filesystem::MemoryFilesystem`. This stands in for the
//! out-of-scope real container reader (e.g. an HDF5 binding) so the CLI and
//! test suite have something concrete to validate against.

use std::collections::HashMap;

use serde::Deserialize;

use crate::{
    dtype::{parse_simple_dtype, CompoundDtype, CompoundField, Dtype},
    value::{AttrValue, Payload, Scalar},
    tree::{IoError, NodeKind, Tree},
};

/// An error building a [`MemoryTree`] from its JSON fixture.
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    /// The fixture's JSON could not be deserialized into the expected shape
    #[error("malformed tree fixture: {0}")]
    Malformed(#[from] serde_json::Error),
    /// A dtype code string within the fixture was invalid
    #[error(transparent)]
    Dtype(#[from] crate::dtype::DtypeError),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDtype {
    Simple(String),
    Compound {
        fields: Vec<RawField>,
        itemsize: usize,
    },
}

#[derive(Debug, Deserialize)]
struct RawField {
    name: String,
    format: String,
    offset: usize,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPayload {
    Scalar(Scalar),
    Array(Vec<Scalar>),
}

#[derive(Debug, Deserialize)]
struct RawAttr {
    dtype: RawDtype,
    value: RawPayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RawKind {
    Group,
    Dataset,
}

#[derive(Debug, Deserialize, Default)]
struct RawNode {
    kind: Option<RawKind>,
    #[serde(default)]
    dtype: Option<RawDtype>,
    #[serde(default)]
    shape: Option<Vec<u64>>,
    #[serde(default)]
    attrs: HashMap<String, RawAttr>,
    #[serde(default)]
    children: HashMap<String, RawNode>,
    #[serde(default)]
    values: Option<Vec<Scalar>>,
}

fn convert_dtype(raw: &RawDtype) -> Result<Dtype, FixtureError> {
    Ok(match raw {
        RawDtype::Simple(code) => Dtype::Simple(parse_simple_dtype(code)?),
        RawDtype::Compound { fields, itemsize } => Dtype::Compound(CompoundDtype {
            fields: fields
                .iter()
                .map(|f| {
                    Ok(CompoundField {
                        name: f.name.clone(),
                        format: parse_simple_dtype(&f.format)?,
                        offset: f.offset,
                    })
                })
                .collect::<Result<Vec<_>, FixtureError>>()?,
            itemsize: *itemsize,
        }),
    })
}

fn convert_attrs(raw: HashMap<String, RawAttr>) -> Result<Vec<(String, AttrValue)>, FixtureError> {
    let mut attrs = raw
        .into_iter()
        .map(|(name, attr)| {
            Ok((
                name,
                AttrValue {
                    dtype: convert_dtype(&attr.dtype)?,
                    value: match attr.value {
                        RawPayload::Scalar(s) => Payload::Scalar(s),
                        RawPayload::Array(items) => Payload::Array(items),
                    },
                },
            ))
        })
        .collect::<Result<Vec<_>, FixtureError>>()?;
    attrs.sort_by(|(a, _), (b, _)| a.cmp(b));
    Ok(attrs)
}

enum MemNode {
    Group {
        attrs: Vec<(String, AttrValue)>,
        children: Vec<(String, usize)>,
    },
    Dataset {
        attrs: Vec<(String, AttrValue)>,
        dtype: Dtype,
        shape: Vec<u64>,
        values: Option<Vec<Scalar>>,
    },
}

/// An in-memory tree deserialized from a JSON fixture.
pub struct MemoryTree {
    nodes: Vec<MemNode>,
    root: usize,
}

impl MemoryTree {
    /// Parses a tree fixture from a JSON document.
    pub fn from_json(text: &str) -> Result<Self, FixtureError> {
        let raw: RawNode = serde_json::from_str(text)?;
        let mut nodes = Vec::new();
        let root = Self::build(raw, &mut nodes)?;
        Ok(MemoryTree { nodes, root })
    }

    fn build(raw: RawNode, nodes: &mut Vec<MemNode>) -> Result<usize, FixtureError> {
        let is_dataset = matches!(raw.kind, Some(RawKind::Dataset))
            || (raw.kind.is_none() && raw.dtype.is_some());
        let attrs = convert_attrs(raw.attrs)?;
        let node = if is_dataset {
            MemNode::Dataset {
                attrs,
                dtype: match &raw.dtype {
                    Some(d) => convert_dtype(d)?,
                    None => Dtype::Simple(parse_simple_dtype("|b1")?),
                },
                shape: raw.shape.unwrap_or_default(),
                values: raw.values,
            }
        } else {
            let mut children = Vec::with_capacity(raw.children.len());
            for (name, child) in raw.children {
                let id = Self::build(child, nodes)?;
                children.push((name, id));
            }
            children.sort_by(|(a, _), (b, _)| a.cmp(b));
            MemNode::Group { attrs, children }
        };
        nodes.push(node);
        Ok(nodes.len() - 1)
    }
}

impl Tree for MemoryTree {
    type NodeId = usize;

    fn root(&self) -> Self::NodeId {
        self.root
    }

    fn kind(&self, node: Self::NodeId) -> NodeKind {
        match &self.nodes[node] {
            MemNode::Group { .. } => NodeKind::Group,
            MemNode::Dataset { .. } => NodeKind::Dataset,
        }
    }

    fn children(&self, node: Self::NodeId) -> Vec<(String, Self::NodeId)> {
        match &self.nodes[node] {
            MemNode::Group { children, .. } => children.clone(),
            MemNode::Dataset { .. } => vec![],
        }
    }

    fn attrs(&self, node: Self::NodeId) -> Vec<(String, AttrValue)> {
        match &self.nodes[node] {
            MemNode::Group { attrs, .. } | MemNode::Dataset { attrs, .. } => attrs.clone(),
        }
    }

    fn dtype(&self, node: Self::NodeId) -> Dtype {
        match &self.nodes[node] {
            MemNode::Dataset { dtype, .. } => dtype.clone(),
            MemNode::Group { .. } => panic!("dtype() called on a group node"),
        }
    }

    fn shape(&self, node: Self::NodeId) -> Vec<u64> {
        match &self.nodes[node] {
            MemNode::Dataset { shape, .. } => shape.clone(),
            MemNode::Group { .. } => panic!("shape() called on a group node"),
        }
    }

    fn read_values(&self, node: Self::NodeId) -> Result<Vec<Scalar>, IoError> {
        match &self.nodes[node] {
            MemNode::Dataset {
                values: Some(values),
                ..
            } => Ok(values.clone()),
            MemNode::Dataset { values: None, .. } => {
                Err(IoError("dataset has no recorded values".into()))
            }
            MemNode::Group { .. } => panic!("read_values() called on a group node"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_simple_dataset_tree() {
        let tree = MemoryTree::from_json(
            r#"{
                "kind": "group",
                "children": {
                    "data": {
                        "kind": "dataset",
                        "dtype": "<f8",
                        "shape": [100, 50]
                    }
                }
            }"#,
        )
        .unwrap();
        let root = tree.root();
        assert_eq!(tree.kind(root), NodeKind::Group);
        let (name, child) = &tree.children(root)[0];
        assert_eq!(name, "data");
        assert_eq!(tree.kind(*child), NodeKind::Dataset);
        assert_eq!(tree.shape(*child), vec![100, 50]);
    }

    #[test]
    fn reads_attribute_values() {
        let tree = MemoryTree::from_json(
            r#"{
                "kind": "group",
                "attrs": {
                    "sensor_type": {"dtype": "S", "value": "temperature"}
                }
            }"#,
        )
        .unwrap();
        let attrs = tree.attrs(tree.root());
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].0, "sensor_type");
    }
}
