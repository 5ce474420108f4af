//! Scalar and array values read from dataset payloads or attributes.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// A single scalar value, as read from a dataset element or an attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// A signed integer value
    Int(i64),
    /// An unsigned integer value (used when it doesn't fit in `i64`)
    UInt(u64),
    /// A floating point value
    Float(f64),
    /// A string value
    Str(String),
    /// A boolean value
    Bool(bool),
}

impl Scalar {
    /// Returns this value as a `&str`, if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns true if `self` is numerically equal to `other`, using exact
    /// bitwise equality for integers and IEEE value equality for floats.
    /// `NaN` never equals anything, including itself (§4.G `const`).
    pub fn const_eq(&self, other: &Scalar) -> bool {
        match (self, other) {
            (Scalar::Float(a), _) if a.is_nan() => false,
            (_, Scalar::Float(b)) if b.is_nan() => false,
            (Scalar::Int(a), Scalar::Int(b)) => a == b,
            (Scalar::UInt(a), Scalar::UInt(b)) => a == b,
            (Scalar::Int(a), Scalar::UInt(b)) | (Scalar::UInt(b), Scalar::Int(a)) => {
                *a >= 0 && *a as u64 == *b
            }
            (Scalar::Float(a), Scalar::Float(b)) => a == b,
            (Scalar::Int(a), Scalar::Float(b)) | (Scalar::Float(b), Scalar::Int(a)) => {
                *a as f64 == *b
            }
            (Scalar::Str(a), Scalar::Str(b)) => a == b,
            (Scalar::Bool(a), Scalar::Bool(b)) => a == b,
            _ => false,
        }
    }
}

impl Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(v) => write!(f, "{v}"),
            Scalar::UInt(v) => write!(f, "{v}"),
            Scalar::Float(v) => write!(f, "{v}"),
            Scalar::Str(v) => write!(f, "{v:?}"),
            Scalar::Bool(v) => write!(f, "{v}"),
        }
    }
}

/// Either a single scalar value or a 1-D array of them, as carried by an
/// [`AttrValue`] or read from a dataset via [`crate::Tree::read_values`].
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// A single scalar value
    Scalar(Scalar),
    /// A 1-D array of scalar values
    Array(Vec<Scalar>),
}

impl Payload {
    /// Returns an iterator over every scalar element in this payload (one
    /// element for [`Payload::Scalar`], all elements for [`Payload::Array`]).
    pub fn elements(&self) -> Box<dyn Iterator<Item = &Scalar> + '_> {
        match self {
            Payload::Scalar(s) => Box::new(std::iter::once(s)),
            Payload::Array(items) => Box::new(items.iter()),
        }
    }
}

/// An attribute's dtype and value, as returned by [`crate::Tree::attrs`].
#[derive(Debug, Clone, PartialEq)]
pub struct AttrValue {
    /// The attribute's dtype descriptor
    pub dtype: crate::Dtype,
    /// The attribute's value
    pub value: Payload,
}
