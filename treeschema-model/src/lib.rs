//! Data model shared between the schema loader and the validation engine:
//! the dtype and shape matchers, scalar/attribute value types, the abstract
//! node path, the [`Tree`] adapter contract, and an in-memory [`Tree`] used
//! by the CLI and test fixtures.

pub mod dtype;
pub mod memory;
pub mod path;
pub mod shape;
pub mod tree;
pub mod value;

pub use dtype::{
    ByteOrder, CompoundDtype, CompoundField, Dtype, DtypeError, Kind, SimpleDtype,
    dtype_matches, parse_simple_dtype, validate_compound_layout,
};
pub use memory::{FixtureError, MemoryTree};
pub use path::NodePath;
pub use shape::{ActualShape, SchemaShape, WILDCARD, shape_matches};
pub use tree::{IoError, NodeKind, Tree};
pub use value::{AttrValue, Payload, Scalar};
