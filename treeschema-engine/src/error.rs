//! Data errors (§7): collected during the walk, never thrown. Distinct from
//! [`treeschema_schema::SchemaError`], which aborts the call outright.

use std::fmt::{self, Display};

use treeschema_model::NodePath;

/// A single conformance error, with the path to the offending node.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    /// The path to the node the error was found at
    pub path: NodePath,
    /// What went wrong
    pub kind: ErrorKind,
}

impl Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.kind)
    }
}

/// The kind of conformance error found (§7 table).
#[derive(Debug, Clone)]
pub enum ErrorKind {
    /// The schema declared a kind (group/dataset) that didn't match the
    /// actual node; no further evaluation of that subtree is performed.
    KindMismatch { expected: &'static str, actual: &'static str },
    /// §4.D disagreed
    DtypeMismatch { expected: String, actual: String },
    /// §4.E disagreed
    ShapeMismatch { expected: String, actual: String },
    /// A required child was absent
    MissingMember { name: String },
    /// A required attribute was absent
    MissingAttribute { name: String },
    /// §4.G `enum`
    EnumViolation { value: String },
    /// §4.G `const`
    ConstViolation { value: String },
    /// §4.G `minLength`
    MinLengthViolation { value: String, min: usize },
    /// §4.G `maxLength`
    MaxLengthViolation { value: String, max: usize },
    /// §4.G `pattern`
    PatternViolation { value: String, pattern: String },
    /// §4.G `format`
    FormatViolation { value: String, format: String },
    /// §4.I `anyOf`: no branch produced zero errors
    AnyOfFailed { branch_errors: Vec<Vec<ErrorRecord>> },
    /// §4.I `oneOf`: no branch produced zero errors
    OneOfNoneMatched,
    /// §4.I `oneOf`: more than one branch produced zero errors
    OneOfMultipleMatched { matched: Vec<usize> },
    /// §4.I `not`: the negated branch produced zero errors
    NotFailed,
    /// §4.I `dependentRequired`: a dependency was missing
    DependentRequiredFailed { name: String, missing: String },
    /// §4.I `dependentSchemas`: the dependent schema produced errors
    DependentSchemasFailed { name: String, errors: Vec<ErrorRecord> },
    /// §4.A `read_values` failed; only that dataset's value constraints are
    /// skipped, the walk continues
    IoError { message: String },
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::KindMismatch { expected, actual } => {
                write!(f, "expected a {expected}, found a {actual}")
            }
            ErrorKind::DtypeMismatch { expected, actual } => {
                write!(f, "dtype mismatch: expected {expected}, found {actual}")
            }
            ErrorKind::ShapeMismatch { expected, actual } => {
                write!(f, "shape mismatch: expected {expected}, found {actual}")
            }
            ErrorKind::MissingMember { name } => write!(f, "missing required member {name:?}"),
            ErrorKind::MissingAttribute { name } => write!(f, "missing required attribute {name:?}"),
            ErrorKind::EnumViolation { value } => write!(f, "{value} is not one of the allowed enum values"),
            ErrorKind::ConstViolation { value } => write!(f, "{value} does not equal the required const value"),
            ErrorKind::MinLengthViolation { value, min } => {
                write!(f, "{value} is shorter than minLength {min}")
            }
            ErrorKind::MaxLengthViolation { value, max } => {
                write!(f, "{value} is longer than maxLength {max}")
            }
            ErrorKind::PatternViolation { value, pattern } => {
                write!(f, "{value} does not match pattern {pattern:?}")
            }
            ErrorKind::FormatViolation { value, format } => {
                write!(f, "{value} is not valid for format {format:?}")
            }
            ErrorKind::AnyOfFailed { branch_errors } => {
                write!(f, "anyOf: no branch of {} matched", branch_errors.len())
            }
            ErrorKind::OneOfNoneMatched => write!(f, "oneOf: no branch matched"),
            ErrorKind::OneOfMultipleMatched { matched } => {
                write!(f, "oneOf: multiple branches matched: {matched:?}")
            }
            ErrorKind::NotFailed => write!(f, "not: the negated schema was satisfied"),
            ErrorKind::DependentRequiredFailed { name, missing } => {
                write!(f, "{name:?} present but dependent {missing:?} is missing")
            }
            ErrorKind::DependentSchemasFailed { name, errors } => {
                write!(f, "dependentSchemas for {name:?} failed with {} error(s)", errors.len())
            }
            ErrorKind::IoError { message } => write!(f, "failed to read values: {message}"),
        }
    }
}
