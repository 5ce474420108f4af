//! String/Value Constraints (§4.G): `enum`, `const`, `minLength`,
//! `maxLength`, `pattern`, and `format`, evaluated elementwise over a
//! dataset payload or an attribute value.

use treeschema_model::{NodePath, Payload, Scalar};
use treeschema_schema::ast::ValueConstraints;

use crate::error::{ErrorKind, ErrorRecord};
use crate::format;

/// Checks every element of `payload` against `constraints`, returning one
/// [`ErrorRecord`] per violated element. String-only constraints
/// (`minLength`/`maxLength`/`pattern`/`format`) are skipped for non-string
/// elements rather than reported as violations (§6 "dataset, attr (string)").
pub fn check_value_constraints(
    constraints: &ValueConstraints,
    payload: &Payload,
    path: &NodePath,
) -> Vec<ErrorRecord> {
    let mut errors = Vec::new();
    for element in payload.elements() {
        check_element(constraints, element, path, &mut errors);
    }
    errors
}

fn check_element(
    constraints: &ValueConstraints,
    element: &Scalar,
    path: &NodePath,
    errors: &mut Vec<ErrorRecord>,
) {
    if let Some(values) = &constraints.enum_values {
        if !values.iter().any(|v| v.const_eq(element)) {
            errors.push(ErrorRecord {
                path: path.clone(),
                kind: ErrorKind::EnumViolation {
                    value: element.to_string(),
                },
            });
        }
    }
    if let Some(expected) = &constraints.const_value {
        if !expected.const_eq(element) {
            errors.push(ErrorRecord {
                path: path.clone(),
                kind: ErrorKind::ConstViolation {
                    value: element.to_string(),
                },
            });
        }
    }
    let Some(text) = element.as_str() else {
        return;
    };
    if let Some(min) = constraints.min_length {
        if text.chars().count() < min {
            errors.push(ErrorRecord {
                path: path.clone(),
                kind: ErrorKind::MinLengthViolation {
                    value: text.to_owned(),
                    min,
                },
            });
        }
    }
    if let Some(max) = constraints.max_length {
        if text.chars().count() > max {
            errors.push(ErrorRecord {
                path: path.clone(),
                kind: ErrorKind::MaxLengthViolation {
                    value: text.to_owned(),
                    max,
                },
            });
        }
    }
    if let Some(re) = &constraints.pattern {
        if !re.is_match(text) {
            errors.push(ErrorRecord {
                path: path.clone(),
                kind: ErrorKind::PatternViolation {
                    value: text.to_owned(),
                    pattern: re.as_str().to_owned(),
                },
            });
        }
    }
    if let Some(fmt) = &constraints.format {
        if format::validate_format(fmt, text) == Some(false) {
            errors.push(ErrorRecord {
                path: path.clone(),
                kind: ErrorKind::FormatViolation {
                    value: text.to_owned(),
                    format: fmt.clone(),
                },
            });
        }
    }
}
