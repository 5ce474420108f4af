//! Dtype descriptors (§3, §4.D) and the matcher that compares a schema's
//! declared dtype against the dtype actually found on a tree node.

use std::fmt::{self, Display};

use thiserror::Error;

/// Byte order of a [`SimpleDtype`]. `NotApplicable` is used for single-byte
/// kinds (`|b1`) where order has no meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    /// `<` - little-endian
    Little,
    /// `>` - big-endian
    Big,
    /// `|` - not applicable (single byte kinds)
    NotApplicable,
}

impl ByteOrder {
    fn prefix_char(self) -> char {
        match self {
            ByteOrder::Little => '<',
            ByteOrder::Big => '>',
            ByteOrder::NotApplicable => '|',
        }
    }
}

/// The element kind of a [`SimpleDtype`], independent of byte order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Kind {
    /// `b1` - boolean
    Bool,
    /// `i<N>` - signed integer of `N` bytes
    Int(usize),
    /// `u<N>` - unsigned integer of `N` bytes
    UInt(usize),
    /// `f<N>` - floating point of `N` bytes
    Float(usize),
    /// `S<N>` - fixed-length ASCII string; `None` is the schema-only wildcard length
    StringAscii(Option<usize>),
    /// `U<N>` - fixed-length Unicode string; `None` is the schema-only wildcard length
    StringUnicode(Option<usize>),
}

/// A simple (non-compound) dtype: byte order plus element kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SimpleDtype {
    /// The byte order prefix
    pub byte_order: ByteOrder,
    /// The element kind and size
    pub kind: Kind,
}

impl Display for SimpleDtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.byte_order.prefix_char())?;
        match &self.kind {
            Kind::Bool => write!(f, "b1"),
            Kind::Int(n) => write!(f, "i{n}"),
            Kind::UInt(n) => write!(f, "u{n}"),
            Kind::Float(n) => write!(f, "f{n}"),
            Kind::StringAscii(Some(n)) => write!(f, "S{n}"),
            Kind::StringAscii(None) => write!(f, "S"),
            Kind::StringUnicode(Some(n)) => write!(f, "U{n}"),
            Kind::StringUnicode(None) => write!(f, "U"),
        }
    }
}

/// A single field of a [`CompoundDtype`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundField {
    /// The field's name
    pub name: String,
    /// The field's simple dtype
    pub format: SimpleDtype,
    /// The byte offset of this field within the record
    pub offset: usize,
}

/// A compound (record) dtype: an ordered sequence of named fields packed
/// into `itemsize` bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundDtype {
    /// The fields, in declaration order
    pub fields: Vec<CompoundField>,
    /// The total size in bytes of one record
    pub itemsize: usize,
}

/// A dtype descriptor: either simple or compound (§3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dtype {
    /// A simple, non-record dtype
    Simple(SimpleDtype),
    /// A compound, record dtype
    Compound(CompoundDtype),
}

impl Display for CompoundDtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}@{}", field.name, field.format, field.offset)?;
        }
        write!(f, "}}[{}]", self.itemsize)
    }
}

impl Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dtype::Simple(s) => write!(f, "{s}"),
            Dtype::Compound(c) => write!(f, "{c}"),
        }
    }
}

/// An error encountered while parsing or validating a dtype descriptor.
///
/// These surface as schema errors (an invalid compound layout) when found
/// while loading a schema document, and can also occur reading a tree
/// adapter's own dtype strings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DtypeError {
    /// The simple dtype code string could not be parsed
    #[error("invalid dtype code {0:?}")]
    InvalidCode(String),
    /// A compound dtype's field offsets were not strictly increasing, or a
    /// field did not fit within `itemsize`
    #[error("compound dtype field {field:?} at offset {offset} does not fit within itemsize {itemsize} (or offsets are not strictly increasing)")]
    BadCompoundLayout {
        /// The offending field's name
        field: String,
        /// The offset given for that field
        offset: usize,
        /// The compound dtype's declared itemsize
        itemsize: usize,
    },
}

/// Returns the byte size of a [`Kind`], where meaningful (strings return
/// their declared length, or `1` if the length is the schema-only wildcard).
fn kind_size(kind: &Kind) -> usize {
    match kind {
        Kind::Bool => 1,
        Kind::Int(n) | Kind::UInt(n) | Kind::Float(n) => *n,
        Kind::StringAscii(n) | Kind::StringUnicode(n) => n.unwrap_or(1),
    }
}

/// Parses a simple dtype code string, e.g. `"<f8"`, `">i4"`, `"|b1"`,
/// `"S10"`, `"U"`, or a canonical alias such as `"int32"` (§4.D).
///
/// Canonical aliases assume a little-endian default platform, as the
/// specification allows.
pub fn parse_simple_dtype(code: &str) -> Result<SimpleDtype, DtypeError> {
    if let Some(alias) = alias_to_code(code) {
        return parse_simple_dtype(alias);
    }
    let mut chars = code.chars();
    let (byte_order, rest): (ByteOrder, &str) = match chars.next() {
        Some('<') => (ByteOrder::Little, &code[1..]),
        Some('>') => (ByteOrder::Big, &code[1..]),
        Some('|') => (ByteOrder::NotApplicable, &code[1..]),
        _ => (ByteOrder::Little, code),
    };
    let mut it = rest.chars();
    let kind_char = it
        .next()
        .ok_or_else(|| DtypeError::InvalidCode(code.to_owned()))?;
    let digits: &str = &rest[kind_char.len_utf8()..];
    let parse_size = || -> Result<usize, DtypeError> {
        if digits.is_empty() {
            return Err(DtypeError::InvalidCode(code.to_owned()));
        }
        digits
            .parse()
            .map_err(|_| DtypeError::InvalidCode(code.to_owned()))
    };
    let parse_opt_size = || -> Result<Option<usize>, DtypeError> {
        if digits.is_empty() {
            Ok(None)
        } else {
            Ok(Some(
                digits
                    .parse()
                    .map_err(|_| DtypeError::InvalidCode(code.to_owned()))?,
            ))
        }
    };
    let kind = match kind_char {
        'b' => Kind::Bool,
        'i' => Kind::Int(parse_size()?),
        'u' => Kind::UInt(parse_size()?),
        'f' => Kind::Float(parse_size()?),
        'S' => Kind::StringAscii(parse_opt_size()?),
        'U' => Kind::StringUnicode(parse_opt_size()?),
        _ => return Err(DtypeError::InvalidCode(code.to_owned())),
    };
    Ok(SimpleDtype { byte_order, kind })
}

fn alias_to_code(name: &str) -> Option<&'static str> {
    Some(match name {
        "int8" => "<i1",
        "int16" => "<i2",
        "int32" => "<i4",
        "int64" => "<i8",
        "uint8" => "<u1",
        "uint16" => "<u2",
        "uint32" => "<u4",
        "uint64" => "<u8",
        "float32" => "<f4",
        "float64" => "<f8",
        "bool" => "|b1",
        _ => return None,
    })
}

/// Validates that a compound dtype's field offsets are strictly increasing
/// and each field fits within `itemsize` (an invariant from §3, violation of
/// which is a schema error, not a data error).
pub fn validate_compound_layout(compound: &CompoundDtype) -> Result<(), DtypeError> {
    let mut last_end = 0usize;
    for field in &compound.fields {
        let size = kind_size(&field.format.kind);
        if field.offset < last_end || field.offset + size > compound.itemsize {
            return Err(DtypeError::BadCompoundLayout {
                field: field.name.clone(),
                offset: field.offset,
                itemsize: compound.itemsize,
            });
        }
        last_end = field.offset + size;
    }
    Ok(())
}

/// Compares a schema-declared dtype against an actual dtype (§4.D).
///
/// A string kind with a wildcard (schema-only) length matches any length of
/// that same string kind.
pub fn dtype_matches(schema: &Dtype, actual: &Dtype) -> bool {
    match (schema, actual) {
        (Dtype::Simple(s), Dtype::Simple(a)) => simple_matches(s, a),
        (Dtype::Compound(s), Dtype::Compound(a)) => compound_matches(s, a),
        _ => false,
    }
}

fn simple_matches(schema: &SimpleDtype, actual: &SimpleDtype) -> bool {
    if schema.byte_order != actual.byte_order {
        return false;
    }
    match (&schema.kind, &actual.kind) {
        (Kind::StringAscii(None), Kind::StringAscii(_)) => true,
        (Kind::StringUnicode(None), Kind::StringUnicode(_)) => true,
        (s, a) => s == a,
    }
}

fn compound_matches(schema: &CompoundDtype, actual: &CompoundDtype) -> bool {
    if schema.itemsize != actual.itemsize || schema.fields.len() != actual.fields.len() {
        return false;
    }
    schema
        .fields
        .iter()
        .zip(actual.fields.iter())
        .all(|(s, a)| s.name == a.name && s.offset == a.offset && simple_matches(&s.format, &a.format))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_byte_order_prefixed_codes() {
        assert_eq!(
            parse_simple_dtype("<f8").unwrap(),
            SimpleDtype {
                byte_order: ByteOrder::Little,
                kind: Kind::Float(8)
            }
        );
        assert_eq!(
            parse_simple_dtype(">i4").unwrap(),
            SimpleDtype {
                byte_order: ByteOrder::Big,
                kind: Kind::Int(4)
            }
        );
        assert_eq!(
            parse_simple_dtype("|b1").unwrap(),
            SimpleDtype {
                byte_order: ByteOrder::NotApplicable,
                kind: Kind::Bool
            }
        );
    }

    #[test]
    fn parses_canonical_aliases() {
        assert_eq!(parse_simple_dtype("int32").unwrap(), parse_simple_dtype("<i4").unwrap());
    }

    #[test]
    fn string_kind_requires_matching_length() {
        let schema = Dtype::Simple(parse_simple_dtype("S10").unwrap());
        let matches = Dtype::Simple(parse_simple_dtype("S10").unwrap());
        let mismatches = Dtype::Simple(parse_simple_dtype("S11").unwrap());
        assert!(dtype_matches(&schema, &matches));
        assert!(!dtype_matches(&schema, &mismatches));
    }

    #[test]
    fn wildcard_string_length_matches_any_length() {
        let schema = Dtype::Simple(parse_simple_dtype("S").unwrap());
        let actual = Dtype::Simple(parse_simple_dtype("S42").unwrap());
        assert!(dtype_matches(&schema, &actual));
    }

    #[test]
    fn compound_vs_simple_is_mismatch() {
        let simple = Dtype::Simple(parse_simple_dtype("<f8").unwrap());
        let compound = Dtype::Compound(CompoundDtype {
            fields: vec![],
            itemsize: 0,
        });
        assert!(!dtype_matches(&simple, &compound));
        assert!(!dtype_matches(&compound, &simple));
    }

    #[test]
    fn compound_layout_rejects_overlapping_offsets() {
        let compound = CompoundDtype {
            fields: vec![
                CompoundField {
                    name: "a".into(),
                    format: parse_simple_dtype("<f8").unwrap(),
                    offset: 0,
                },
                CompoundField {
                    name: "b".into(),
                    format: parse_simple_dtype("<i4").unwrap(),
                    offset: 4,
                },
            ],
            itemsize: 16,
        };
        assert!(validate_compound_layout(&compound).is_err());
    }

    #[test]
    fn compound_layout_accepts_packed_fields() {
        let compound = CompoundDtype {
            fields: vec![
                CompoundField {
                    name: "a".into(),
                    format: parse_simple_dtype("<f8").unwrap(),
                    offset: 0,
                },
                CompoundField {
                    name: "b".into(),
                    format: parse_simple_dtype("<i4").unwrap(),
                    offset: 8,
                },
            ],
            itemsize: 12,
        };
        assert!(validate_compound_layout(&compound).is_ok());
    }
}
