//! The validation engine: resolves `$ref`s (§4.C), matches attributes
//! (§4.F) and value constraints (§4.G), resolves group members against
//! patterns (§4.H), evaluates combinators and conditionals (§4.I), and
//! drives the depth-first walk (§4.J) that ties them together.
//!
//! ```
//! # use treeschema_model::MemoryTree;
//! # use treeschema_schema::Schema;
//! let schema = Schema::load(&serde_json::json!({
//!     "type": "group",
//!     "required": ["readings"],
//!     "members": { "readings": { "type": "dataset", "dtype": "<f8", "shape": [-1] } }
//! })).unwrap();
//! let tree = MemoryTree::from_json(r#"{
//!     "kind": "group",
//!     "children": { "readings": { "kind": "dataset", "dtype": "<f8", "shape": [3] } }
//! }"#).unwrap();
//! assert!(treeschema_engine::is_valid(&tree, &schema).unwrap());
//! ```

mod attrs_check;
mod combinators;
mod constraints;
pub mod error;
mod format;
mod members;
mod resolve;
mod walk;

use treeschema_model::{NodePath, Tree};
use treeschema_schema::{Schema, SchemaError};

pub use error::{ErrorKind, ErrorRecord};
pub use resolve::VisitSet;

/// Validates `tree` against `schema`, returning every data error found
/// (§6). `Err` is returned only for schema errors (a malformed schema or
/// an unresolved `$ref`); data nonconformance is always `Ok` with a
/// non-empty list.
pub fn validate<T: Tree>(tree: &T, schema: &Schema) -> Result<Vec<ErrorRecord>, SchemaError> {
    let mut visited = VisitSet::new();
    walk::walk_node(tree, tree.root(), schema, schema.root(), &NodePath::root(), &mut visited)
}

/// Lazy form of [`validate`]: the full error list is computed eagerly by
/// the same depth-first walk (the walker has no internal suspension
/// points), then handed back as an iterator so callers can stop consuming
/// early without changing the engine's recursion shape.
pub fn validate_iter<T: Tree>(
    tree: &T,
    schema: &Schema,
) -> Result<impl Iterator<Item = ErrorRecord>, SchemaError> {
    Ok(validate(tree, schema)?.into_iter())
}

/// Convenience wrapper: `true` iff [`validate`] reports zero errors.
pub fn is_valid<T: Tree>(tree: &T, schema: &Schema) -> Result<bool, SchemaError> {
    Ok(validate(tree, schema)?.is_empty())
}
