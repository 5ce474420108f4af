//! Walker / Error Collector (§4.J): the top-level depth-first recursion.
//!
//! Grounding: mirrors the teacher's `traverse`/`traverse_node`/
//! `traverse_directory` recursive shape, including its use of
//! `tracing::span!` at each recursion level, but read-only: nothing is
//! created or mutated, and failures are collected into `Vec<ErrorRecord>`
//! instead of bailing out with `anyhow::Error`.

use tracing::Level;
use treeschema_model::{dtype_matches, shape_matches, Dtype, NodeKind, NodePath, Payload, SchemaShape, Tree};
use treeschema_schema::ast::ValueConstraints;
use treeschema_schema::{NodeId, Schema, SchemaError, SchemaNode};

use crate::attrs_check::check_attrs;
use crate::combinators::{evaluate_combinators, evaluate_conditional, evaluate_dependents};
use crate::constraints::check_value_constraints;
use crate::error::{ErrorKind, ErrorRecord};
use crate::members::{check_required_members, effective_schemas_for_child};
use crate::resolve::{resolve_to_concrete, VisitSet};

/// Evaluates `schema_id` against `node`, returning every error found in
/// that subtree (including from child recursion and combinators). This is
/// the single composable unit reused for the top-level call, for child
/// recursion, and for every combinator/conditional/dependent-schema
/// branch.
pub fn walk_node<T: Tree>(
    tree: &T,
    node: T::NodeId,
    schema: &Schema,
    schema_id: NodeId,
    path: &NodePath,
    visited: &mut VisitSet,
) -> Result<Vec<ErrorRecord>, SchemaError> {
    let concrete_id = resolve_to_concrete(schema, schema_id)?;
    if visited.enter(concrete_id, path) {
        return Ok(Vec::new());
    }
    let _span = tracing::span!(Level::DEBUG, "validate_node", path = %path).entered();
    tracing::debug!("visiting node");

    let mut errors = Vec::new();
    match schema.node(concrete_id) {
        SchemaNode::Group(g) => {
            if tree.kind(node) != NodeKind::Group {
                errors.push(kind_mismatch("group", tree.kind(node), path));
                return Ok(errors);
            }
            errors.extend(check_attrs(&g.attrs, &tree.attrs(node), path));
            let children = tree.children(node);
            let names: Vec<String> = children.iter().map(|(n, _)| n.clone()).collect();
            errors.extend(check_required_members(&g.required, &names, path));
            for (name, child_node) in &children {
                let child_path = path.join(name.clone());
                for sub_id in effective_schemas_for_child(&g.members, &g.pattern_members, name) {
                    errors.extend(walk_node(tree, *child_node, schema, sub_id, &child_path, visited)?);
                }
            }
            errors.extend(evaluate_combinators(&g.combinators, path, |id| {
                walk_node(tree, node, schema, id, path, visited)
            })?);
            errors.extend(evaluate_conditional(&g.conditional, |id| {
                walk_node(tree, node, schema, id, path, visited)
            })?);
            let names_ref = &names;
            errors.extend(evaluate_dependents(
                &g.dependents,
                path,
                |name| names_ref.iter().any(|c| c == name) || attr_present(tree, node, name),
                |id| walk_node(tree, node, schema, id, path, visited),
            )?);
        }
        SchemaNode::Dataset(d) => {
            if tree.kind(node) != NodeKind::Dataset {
                errors.push(kind_mismatch("dataset", tree.kind(node), path));
                return Ok(errors);
            }
            errors.extend(check_dataset_locals(
                tree,
                node,
                d.dtype.as_ref(),
                d.shape.as_ref(),
                &d.constraints,
                path,
            ));
            errors.extend(check_attrs(&d.attrs, &tree.attrs(node), path));
            errors.extend(evaluate_combinators(&d.combinators, path, |id| {
                walk_node(tree, node, schema, id, path, visited)
            })?);
            errors.extend(evaluate_conditional(&d.conditional, |id| {
                walk_node(tree, node, schema, id, path, visited)
            })?);
            errors.extend(evaluate_dependents(
                &d.dependents,
                path,
                |name| attr_present(tree, node, name),
                |id| walk_node(tree, node, schema, id, path, visited),
            )?);
        }
        SchemaNode::Untyped(u) => {
            match tree.kind(node) {
                NodeKind::Group => {
                    errors.extend(check_attrs(&u.attrs, &tree.attrs(node), path));
                    let children = tree.children(node);
                    let names: Vec<String> = children.iter().map(|(n, _)| n.clone()).collect();
                    errors.extend(check_required_members(&u.required, &names, path));
                    for (name, child_node) in &children {
                        let child_path = path.join(name.clone());
                        for sub_id in effective_schemas_for_child(&u.members, &u.pattern_members, name) {
                            errors.extend(walk_node(tree, *child_node, schema, sub_id, &child_path, visited)?);
                        }
                    }
                }
                NodeKind::Dataset => {
                    errors.extend(check_dataset_locals(
                        tree,
                        node,
                        u.dtype.as_ref(),
                        u.shape.as_ref(),
                        &u.constraints,
                        path,
                    ));
                    errors.extend(check_attrs(&u.attrs, &tree.attrs(node), path));
                }
            }
            errors.extend(evaluate_combinators(&u.combinators, path, |id| {
                walk_node(tree, node, schema, id, path, visited)
            })?);
            errors.extend(evaluate_conditional(&u.conditional, |id| {
                walk_node(tree, node, schema, id, path, visited)
            })?);
            errors.extend(evaluate_dependents(
                &u.dependents,
                path,
                |name| attr_present(tree, node, name) || matches!(tree.kind(node), NodeKind::Group if tree.children(node).iter().any(|(n, _)| n == name)),
                |id| walk_node(tree, node, schema, id, path, visited),
            )?);
        }
        SchemaNode::Ref(_) => unreachable!("resolve_to_concrete never returns a Ref"),
    }
    Ok(errors)
}

fn attr_present<T: Tree>(tree: &T, node: T::NodeId, name: &str) -> bool {
    tree.attrs(node).iter().any(|(n, _)| n == name)
}

fn kind_mismatch(expected: &'static str, actual: NodeKind, path: &NodePath) -> ErrorRecord {
    ErrorRecord {
        path: path.clone(),
        kind: ErrorKind::KindMismatch {
            expected,
            actual: match actual {
                NodeKind::Group => "group",
                NodeKind::Dataset => "dataset",
            },
        },
    }
}

fn check_dataset_locals<T: Tree>(
    tree: &T,
    node: T::NodeId,
    dtype: Option<&Dtype>,
    shape: Option<&SchemaShape>,
    constraints: &ValueConstraints,
    path: &NodePath,
) -> Vec<ErrorRecord> {
    let mut errors = Vec::new();
    if let Some(expected) = dtype {
        let actual = tree.dtype(node);
        if !dtype_matches(expected, &actual) {
            errors.push(ErrorRecord {
                path: path.clone(),
                kind: ErrorKind::DtypeMismatch {
                    expected: expected.to_string(),
                    actual: actual.to_string(),
                },
            });
        }
    }
    if let Some(expected) = shape {
        let actual = tree.shape(node);
        if !shape_matches(expected, &actual) {
            errors.push(ErrorRecord {
                path: path.clone(),
                kind: ErrorKind::ShapeMismatch {
                    expected: format!("{expected:?}"),
                    actual: format!("{actual:?}"),
                },
            });
        }
    }
    if has_value_constraint(constraints) {
        match tree.read_values(node) {
            Ok(values) => {
                errors.extend(check_value_constraints(constraints, &Payload::Array(values), path));
            }
            Err(e) => errors.push(ErrorRecord {
                path: path.clone(),
                kind: ErrorKind::IoError { message: e.0 },
            }),
        }
    }
    errors
}

fn has_value_constraint(constraints: &ValueConstraints) -> bool {
    constraints.enum_values.is_some()
        || constraints.const_value.is_some()
        || constraints.min_length.is_some()
        || constraints.max_length.is_some()
        || constraints.pattern.is_some()
        || constraints.format.is_some()
}
