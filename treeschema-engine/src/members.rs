//! Member / Pattern-Member Resolver (§4.H): pairs each actual child with
//! its effective schema(s). A literal match wins outright; otherwise every
//! matching `patternMembers` regex applies conjunctively.
//!
//! This generalizes the teacher's "pick exactly one binding, error on
//! ambiguity" matching loop into "literal wins, all matching patterns
//! apply conjunctively", per this crate's semantics.

use treeschema_model::NodePath;
use treeschema_schema::NodeId;

use crate::error::{ErrorKind, ErrorRecord};

/// Returns the schema(s) that apply to a child named `name`: a single
/// literal match if present, otherwise every pattern whose regex matches,
/// in declaration order, otherwise empty (the child is unconstrained).
pub fn effective_schemas_for_child<'a>(
    members: &'a [(String, NodeId)],
    pattern_members: &'a [(regex::Regex, NodeId)],
    name: &str,
) -> Vec<NodeId> {
    if let Some((_, id)) = members.iter().find(|(member_name, _)| member_name == name) {
        return vec![*id];
    }
    pattern_members
        .iter()
        .filter(|(re, _)| re.is_match(name))
        .map(|(_, id)| *id)
        .collect()
}

/// Emits `MissingMember` for every required name absent from `actual_children`.
pub fn check_required_members(
    required: &[String],
    actual_children: &[String],
    path: &NodePath,
) -> Vec<ErrorRecord> {
    required
        .iter()
        .filter(|name| !actual_children.iter().any(|c| c == *name))
        .map(|name| ErrorRecord {
            path: path.clone(),
            kind: ErrorKind::MissingMember { name: name.clone() },
        })
        .collect()
}
