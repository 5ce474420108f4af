//! The Schema AST (§3), its arena, and the loader that builds it from a
//! parsed JSON document (§4.B).
//!
//! ```
//! # use treeschema_schema::Schema;
//! let doc = serde_json::json!({
//!     "type": "group",
//!     "required": ["readings"],
//!     "members": {
//!         "readings": { "type": "dataset", "dtype": "<f8", "shape": [-1] }
//!     }
//! });
//! let schema = Schema::load(&doc).unwrap();
//! ```

pub mod arena;
pub mod ast;
pub mod error;
mod load;

use std::collections::HashMap;

use serde_json::Value;

pub use arena::{Arena, NodeId};
pub use ast::SchemaNode;
pub use error::SchemaError;
pub use load::unknown_top_level_keys;

/// A loaded, immutable schema document: an arena of AST nodes, a root, and
/// the `$defs` registry resolved by [`Schema::resolve`].
#[derive(Debug)]
pub struct Schema {
    arena: Arena,
    defs: HashMap<String, NodeId>,
    root: NodeId,
}

impl Schema {
    /// Parses a schema document (§4.B), building the AST arena and the
    /// `$defs` registry. Fails with a [`SchemaError`] on any malformed
    /// structure: an invalid `"type"`, an uncompilable regex, or an
    /// inconsistent compound dtype layout.
    pub fn load(value: &Value) -> Result<Self, SchemaError> {
        let mut arena = Arena::new();
        let defs = load::load_defs(value, &mut arena)?.into_iter().collect();
        let root = load::load_document(value, &mut arena)?;
        Ok(Schema { arena, defs, root })
    }

    /// The id of the document's root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Looks up a node by id.
    pub fn node(&self, id: NodeId) -> &SchemaNode {
        self.arena.get(id)
    }

    /// Resolves a `$ref` pointer against the `$defs` registry (§4.C).
    ///
    /// Only pointers of the form `#/$defs/<name>` are recognized: the root
    /// `$defs` table is canonical (§6), and this crate does not index
    /// further into a resolved node.
    pub fn resolve(&self, pointer: &str) -> Result<NodeId, SchemaError> {
        let name = pointer
            .strip_prefix("#/$defs/")
            .map(|rest| rest.split('/').next().unwrap_or(rest));
        let id = name.and_then(|name| self.defs.get(name)).copied();
        tracing::trace!(pointer, resolved = id.is_some(), "resolving $ref");
        id.ok_or_else(|| SchemaError::UnresolvedRef {
            pointer: pointer.to_owned(),
        })
    }
}
