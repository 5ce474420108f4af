//! Attribute Matcher (§4.F): required/dtype/value checks on a node's own
//! attribute map, independent of whether the node is a group or dataset.

use treeschema_model::{dtype_matches, AttrValue, NodePath};
use treeschema_schema::ast::AttrSpec;

use crate::constraints::check_value_constraints;
use crate::error::{ErrorKind, ErrorRecord};

/// Checks `specs` against `actual`, the node's own attribute list.
/// Attributes not named by any spec are allowed (open-world on attrs).
pub fn check_attrs(
    specs: &[AttrSpec],
    actual: &[(String, AttrValue)],
    path: &NodePath,
) -> Vec<ErrorRecord> {
    let mut errors = Vec::new();
    for spec in specs {
        let found = actual.iter().find(|(name, _)| name == &spec.name);
        let Some((_, value)) = found else {
            if spec.required {
                errors.push(ErrorRecord {
                    path: path.clone(),
                    kind: ErrorKind::MissingAttribute {
                        name: spec.name.clone(),
                    },
                });
            }
            continue;
        };
        if let Some(expected) = &spec.dtype {
            if !dtype_matches(expected, &value.dtype) {
                errors.push(ErrorRecord {
                    path: path.clone(),
                    kind: ErrorKind::DtypeMismatch {
                        expected: expected.to_string(),
                        actual: value.dtype.to_string(),
                    },
                });
            }
        }
        errors.extend(check_value_constraints(&spec.constraints, &value.value, path));
    }
    errors
}
