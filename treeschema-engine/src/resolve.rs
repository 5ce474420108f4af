//! Reference resolution's runtime half (§4.C): chasing `$ref` chains down
//! to a concrete node, and the per-validation cycle guard.

use std::collections::HashSet;

use treeschema_model::NodePath;
use treeschema_schema::{Schema, SchemaError, SchemaNode};

/// A reference chain longer than this is treated as a malformed schema (a
/// cycle of bare `$ref`s that never reaches a concrete node, as distinct
/// from the data-driven recursion the cycle guard below tolerates).
const MAX_REF_CHAIN: usize = 1024;

/// Follows `Ref` nodes until a concrete (`Group`/`Dataset`/`Untyped`) node
/// is reached, returning its id.
pub fn resolve_to_concrete(
    schema: &Schema,
    mut id: treeschema_schema::NodeId,
) -> Result<treeschema_schema::NodeId, SchemaError> {
    for _ in 0..MAX_REF_CHAIN {
        match schema.node(id) {
            SchemaNode::Ref(r) => {
                id = schema.resolve(&r.pointer)?;
            }
            _ => return Ok(id),
        }
    }
    Err(SchemaError::UnresolvedRef {
        pointer: "<ref chain exceeded depth limit, likely a pure-$ref cycle>".to_owned(),
    })
}

/// The per-validation visit set (§4.C): re-entering the same
/// (resolved node, actual path) pair succeeds silently rather than
/// recursing forever.
#[derive(Debug, Default)]
pub struct VisitSet {
    seen: HashSet<(treeschema_schema::NodeId, NodePath)>,
}

impl VisitSet {
    pub fn new() -> Self {
        VisitSet::default()
    }

    /// Records a visit, returning `true` if this exact pair was already
    /// visited (the caller should stop and report success for it).
    pub fn enter(&mut self, node: treeschema_schema::NodeId, path: &NodePath) -> bool {
        !self.seen.insert((node, path.clone()))
    }
}
