//! The Schema AST (§3): a tagged-variant representation of a schema node,
//! stored in an [`crate::arena::Arena`] rather than as an owned, borrowed
//! graph (see the representation note in §3 of the design document).

use regex::Regex;
use treeschema_model::{Dtype, Scalar, SchemaShape};

use crate::arena::NodeId;

/// An attribute constraint attached to a group or dataset node's `attrs`
/// list (§3 `AttrSpec`). Unlike [`SchemaNode`], an attribute spec is
/// evaluated directly against an attribute value; it is never itself
/// recursed into by the walker, so it carries no `NodeId`.
#[derive(Debug, Clone)]
pub struct AttrSpec {
    /// The attribute's name
    pub name: String,
    /// The attribute's expected dtype, if constrained
    pub dtype: Option<Dtype>,
    /// Whether this attribute must be present
    pub required: bool,
    /// Value constraints applied to the attribute's value, if present
    pub constraints: ValueConstraints,
}

/// The value-level constraints shared by dataset nodes and attribute specs
/// (§4.G): `enum`, `const`, string length bounds, `pattern`, and `format`.
#[derive(Debug, Clone, Default)]
pub struct ValueConstraints {
    /// `enum`: the value (or every array element) must be one of these
    pub enum_values: Option<Vec<Scalar>>,
    /// `const`: the value (or every array element) must equal this scalar
    pub const_value: Option<Scalar>,
    /// `minLength`: minimum character/byte length of string elements
    pub min_length: Option<usize>,
    /// `maxLength`: maximum character/byte length of string elements
    pub max_length: Option<usize>,
    /// `pattern`: compiled regex applied to every string element
    pub pattern: Option<Regex>,
    /// `format`: a named format validator, e.g. `"date-time"` or `"uuid"`
    pub format: Option<String>,
}

/// `allOf`/`anyOf`/`oneOf`/`not` (§3 `combinators`, §4.I).
#[derive(Debug, Clone, Default)]
pub struct Combinators {
    /// `allOf`: every listed branch must hold
    pub all_of: Vec<NodeId>,
    /// `anyOf`: at least one listed branch must hold
    pub any_of: Vec<NodeId>,
    /// `oneOf`: exactly one listed branch must hold
    pub one_of: Vec<NodeId>,
    /// `not`: the listed branch must not hold
    pub not: Option<NodeId>,
}

impl Combinators {
    /// Whether any combinator keyword was present on this node.
    pub fn is_empty(&self) -> bool {
        self.all_of.is_empty() && self.any_of.is_empty() && self.one_of.is_empty() && self.not.is_none()
    }
}

/// `if`/`then`/`else` (§3 `conditional`, §4.I).
#[derive(Debug, Clone, Default)]
pub struct Conditional {
    /// `if`: evaluated silently to decide which branch applies
    pub if_: Option<NodeId>,
    /// `then`: merged into the main error stream when `if` is satisfied
    pub then: Option<NodeId>,
    /// `else`: merged into the main error stream when `if` is not satisfied
    pub else_: Option<NodeId>,
}

impl Conditional {
    /// Whether an `if` keyword was present on this node.
    pub fn is_empty(&self) -> bool {
        self.if_.is_none()
    }
}

/// `dependentRequired`/`dependentSchemas` (§3 `dependents`, §4.I).
#[derive(Debug, Clone, Default)]
pub struct Dependents {
    /// `dependentRequired`: name → list of names that must co-occur with it
    pub dependent_required: Vec<(String, Vec<String>)>,
    /// `dependentSchemas`: name → schema evaluated against the same node
    /// when that name is present
    pub dependent_schemas: Vec<(String, NodeId)>,
}

impl Dependents {
    /// Whether any dependency keyword was present on this node.
    pub fn is_empty(&self) -> bool {
        self.dependent_required.is_empty() && self.dependent_schemas.is_empty()
    }
}

/// Diagnostic-only annotations (§3 `annotations`): ignored by semantics,
/// preserved for error messages and tooling.
#[derive(Debug, Clone, Default)]
pub struct Annotations {
    /// `description`
    pub description: Option<String>,
    /// `$comment`
    pub comment: Option<String>,
    /// `$id`
    pub id: Option<String>,
}

/// A `"type": "group"` node: a named interior node with children.
#[derive(Debug, Clone, Default)]
pub struct GroupNode {
    /// Literal child name → schema; a literal match suppresses pattern
    /// matches for that child (§4.H)
    pub members: Vec<(String, NodeId)>,
    /// Compiled regex → schema, in declaration order; every matching
    /// pattern applies conjunctively unless a literal member already
    /// matched the child (§4.H)
    pub pattern_members: Vec<(Regex, NodeId)>,
    /// Child names that must be present among the actual children
    pub required: Vec<String>,
    /// Attribute specs checked against this node's own attributes
    pub attrs: Vec<AttrSpec>,
    pub combinators: Combinators,
    pub conditional: Conditional,
    pub dependents: Dependents,
    pub annotations: Annotations,
}

/// A `"type": "dataset"` node: a leaf with a typed, shaped payload.
#[derive(Debug, Clone, Default)]
pub struct DatasetNode {
    /// Expected dtype descriptor, if constrained
    pub dtype: Option<Dtype>,
    /// Expected shape, if constrained
    pub shape: Option<SchemaShape>,
    /// Value constraints applied to the dataset's elements
    pub constraints: ValueConstraints,
    /// Attribute specs checked against this node's own attributes
    pub attrs: Vec<AttrSpec>,
    pub combinators: Combinators,
    pub conditional: Conditional,
    pub dependents: Dependents,
    pub annotations: Annotations,
}

/// A combinator branch that declared no `"type"` (§4.B): a transparent
/// constraint-only overlay, applied using whichever of its fields are
/// relevant to the actual node's kind at evaluation time. Carries the
/// union of group-style and dataset-style fields, all optional.
#[derive(Debug, Clone, Default)]
pub struct UntypedNode {
    pub members: Vec<(String, NodeId)>,
    pub pattern_members: Vec<(Regex, NodeId)>,
    pub required: Vec<String>,
    pub dtype: Option<Dtype>,
    pub shape: Option<SchemaShape>,
    pub constraints: ValueConstraints,
    pub attrs: Vec<AttrSpec>,
    pub combinators: Combinators,
    pub conditional: Conditional,
    pub dependents: Dependents,
    pub annotations: Annotations,
}

/// A deferred `$ref` pointer into `$defs` (§3 `Ref`).
#[derive(Debug, Clone)]
pub struct RefNode {
    /// The raw JSON-pointer string, e.g. `"#/$defs/sensor"`
    pub pointer: String,
}

/// A node of the schema AST (§3 "Schema AST node (Variants)").
#[derive(Debug, Clone)]
pub enum SchemaNode {
    Group(GroupNode),
    Dataset(DatasetNode),
    /// A combinator branch with no declared `"type"` (§4.B)
    Untyped(UntypedNode),
    Ref(RefNode),
}

impl SchemaNode {
    /// The node's own `attrs` list, if it has one (a bare [`RefNode`] has
    /// none until resolved).
    pub fn attrs(&self) -> &[AttrSpec] {
        match self {
            SchemaNode::Group(g) => &g.attrs,
            SchemaNode::Dataset(d) => &d.attrs,
            SchemaNode::Untyped(u) => &u.attrs,
            SchemaNode::Ref(_) => &[],
        }
    }

    /// The node's `combinators` record, if it has one.
    pub fn combinators(&self) -> Option<&Combinators> {
        match self {
            SchemaNode::Group(g) => Some(&g.combinators),
            SchemaNode::Dataset(d) => Some(&d.combinators),
            SchemaNode::Untyped(u) => Some(&u.combinators),
            SchemaNode::Ref(_) => None,
        }
    }

    /// The node's `conditional` record, if it has one.
    pub fn conditional(&self) -> Option<&Conditional> {
        match self {
            SchemaNode::Group(g) => Some(&g.conditional),
            SchemaNode::Dataset(d) => Some(&d.conditional),
            SchemaNode::Untyped(u) => Some(&u.conditional),
            SchemaNode::Ref(_) => None,
        }
    }

    /// The node's `dependents` record, if it has one.
    pub fn dependents(&self) -> Option<&Dependents> {
        match self {
            SchemaNode::Group(g) => Some(&g.dependents),
            SchemaNode::Dataset(d) => Some(&d.dependents),
            SchemaNode::Untyped(u) => Some(&u.dependents),
            SchemaNode::Ref(_) => None,
        }
    }
}
