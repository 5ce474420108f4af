//! Combinator & Conditional Engine (§4.I). Each function here takes the
//! already-loaded combinator/conditional/dependents record plus small
//! closures for "evaluate this branch" and "is this name present", so it
//! has no dependency on [`treeschema_model::Tree`] itself — the walker
//! supplies those closures, closing over the actual node being evaluated.
//!
//! Grounding: the shape of these evaluators (small, each evaluating a
//! branch and merging/filtering the resulting error lists) follows
//! `jsonschema-rs`'s dependency validators, adapted to this crate's owned
//! arena and `Vec<ErrorRecord>` accumulation instead of a `Validate` trait
//! object graph.

use treeschema_model::NodePath;
use treeschema_schema::ast::{Combinators, Conditional, Dependents};
use treeschema_schema::{NodeId, SchemaError};

use crate::error::{ErrorKind, ErrorRecord};

/// Evaluates `allOf`/`anyOf`/`oneOf`/`not` against the same node, merging
/// or wrapping sub-evaluation results per branch.
pub fn evaluate_combinators(
    combinators: &Combinators,
    path: &NodePath,
    mut eval: impl FnMut(NodeId) -> Result<Vec<ErrorRecord>, SchemaError>,
) -> Result<Vec<ErrorRecord>, SchemaError> {
    let mut errors = Vec::new();

    for &id in &combinators.all_of {
        errors.extend(eval(id)?);
    }

    if !combinators.any_of.is_empty() {
        let mut branch_errors = Vec::with_capacity(combinators.any_of.len());
        let mut any_matched = false;
        for &id in &combinators.any_of {
            let sub = eval(id)?;
            any_matched |= sub.is_empty();
            branch_errors.push(sub);
        }
        if !any_matched {
            errors.push(ErrorRecord {
                path: path.clone(),
                kind: ErrorKind::AnyOfFailed { branch_errors },
            });
        }
    }

    if !combinators.one_of.is_empty() {
        let mut matched = Vec::new();
        for (i, &id) in combinators.one_of.iter().enumerate() {
            if eval(id)?.is_empty() {
                matched.push(i);
            }
        }
        match matched.len() {
            1 => {}
            0 => errors.push(ErrorRecord {
                path: path.clone(),
                kind: ErrorKind::OneOfNoneMatched,
            }),
            _ => errors.push(ErrorRecord {
                path: path.clone(),
                kind: ErrorKind::OneOfMultipleMatched { matched },
            }),
        }
    }

    if let Some(id) = combinators.not {
        if eval(id)?.is_empty() {
            errors.push(ErrorRecord {
                path: path.clone(),
                kind: ErrorKind::NotFailed,
            });
        }
    }

    Ok(errors)
}

/// Evaluates `if`/`then`/`else`. `if` is run silently (its errors are
/// discarded, only whether it produced any is used); an absent branch is
/// trivially satisfied.
pub fn evaluate_conditional(
    conditional: &Conditional,
    mut eval: impl FnMut(NodeId) -> Result<Vec<ErrorRecord>, SchemaError>,
) -> Result<Vec<ErrorRecord>, SchemaError> {
    let Some(if_id) = conditional.if_ else {
        return Ok(Vec::new());
    };
    let if_errors = eval(if_id)?;
    if if_errors.is_empty() {
        match conditional.then {
            Some(then_id) => eval(then_id),
            None => Ok(Vec::new()),
        }
    } else {
        match conditional.else_ {
            Some(else_id) => eval(else_id),
            None => Ok(Vec::new()),
        }
    }
}

/// Evaluates `dependentRequired`/`dependentSchemas`. `is_present` answers
/// whether a name occurs as a child (group) or an attribute on the node
/// currently being evaluated.
pub fn evaluate_dependents(
    dependents: &Dependents,
    path: &NodePath,
    is_present: impl Fn(&str) -> bool,
    mut eval: impl FnMut(NodeId) -> Result<Vec<ErrorRecord>, SchemaError>,
) -> Result<Vec<ErrorRecord>, SchemaError> {
    let mut errors = Vec::new();

    for (name, deps) in &dependents.dependent_required {
        if is_present(name) {
            for dep in deps {
                if !is_present(dep) {
                    errors.push(ErrorRecord {
                        path: path.clone(),
                        kind: ErrorKind::DependentRequiredFailed {
                            name: name.clone(),
                            missing: dep.clone(),
                        },
                    });
                }
            }
        }
    }

    for (name, schema_id) in &dependents.dependent_schemas {
        if is_present(name) {
            let sub = eval(*schema_id)?;
            if !sub.is_empty() {
                errors.push(ErrorRecord {
                    path: path.clone(),
                    kind: ErrorKind::DependentSchemasFailed {
                        name: name.clone(),
                        errors: sub,
                    },
                });
            }
        }
    }

    Ok(errors)
}
