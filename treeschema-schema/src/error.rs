//! Schema errors (§7): malformed schema documents, detected at load time or
//! on first reference resolution, which abort the `validate` call outright
//! rather than being collected like data errors.

use thiserror::Error;
use treeschema_model::DtypeError;

/// An error loading or resolving a schema document.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// `"type"` was present but held a value other than `"group"` or
    /// `"dataset"`
    #[error("{path}: invalid \"type\" value {value:?}, expected \"group\" or \"dataset\"")]
    InvalidType {
        /// The JSON-pointer-ish path to the offending node within the document
        path: String,
        /// The offending value
        value: String,
    },

    /// A `pattern` or `patternMembers` regex failed to compile
    #[error("{path}: invalid regex {pattern:?}: {source}")]
    BadRegex {
        /// The path to the offending node
        path: String,
        /// The regex source text that failed to compile
        pattern: String,
        /// The underlying compilation error
        #[source]
        source: regex::Error,
    },

    /// A compound dtype's field layout was inconsistent
    #[error("{path}: {source}")]
    BadCompoundLayout {
        /// The path to the offending node
        path: String,
        #[source]
        source: DtypeError,
    },

    /// A dtype code string could not be parsed
    #[error("{path}: {source}")]
    BadDtype {
        /// The path to the offending node
        path: String,
        #[source]
        source: DtypeError,
    },

    /// `const` was given a non-scalar (array or object) JSON value; this
    /// crate only supports scalar `const` (§9 Open Question)
    #[error("{path}: \"const\" must be a scalar value, not an array or object")]
    NonScalarConst {
        /// The path to the offending node
        path: String,
    },

    /// A `$ref` pointer did not resolve to any `$defs` entry
    #[error("unresolved reference {pointer:?}")]
    UnresolvedRef {
        /// The raw pointer string that failed to resolve
        pointer: String,
    },

    /// The top-level document was not a JSON object
    #[error("schema document must be a JSON object, found {0}")]
    NotAnObject(&'static str),
}
