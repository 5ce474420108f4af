//! The Schema AST Loader (§4.B): builds the arena from a `serde_json::Value`
//! already parsed by the out-of-scope JSON-parsing collaborator.

use regex::Regex;
use serde_json::Value;
use treeschema_model::{parse_simple_dtype, validate_compound_layout, CompoundDtype, CompoundField, Dtype, Scalar};

use crate::arena::{Arena, NodeId};
use crate::ast::{
    AttrSpec, Combinators, Conditional, Dependents, DatasetNode, GroupNode, RefNode, SchemaNode,
    UntypedNode, ValueConstraints, Annotations,
};
use crate::error::SchemaError;

/// Parses the whole document, returning the root node id and the built
/// arena. The `$defs` registry is extracted by the caller from the root
/// object separately (see [`crate::Schema::load`]).
pub fn load_document(value: &Value, arena: &mut Arena) -> Result<NodeId, SchemaError> {
    load_node(value, "", arena)
}

/// The top-level keys this loader recognizes (§6's key table, plus `$defs`).
const KNOWN_TOP_LEVEL_KEYS: &[&str] = &[
    "type",
    "members",
    "patternMembers",
    "required",
    "attrs",
    "dtype",
    "shape",
    "enum",
    "const",
    "minLength",
    "maxLength",
    "pattern",
    "format",
    "allOf",
    "anyOf",
    "oneOf",
    "not",
    "if",
    "then",
    "else",
    "dependentRequired",
    "dependentSchemas",
    "$defs",
    "$ref",
    "$comment",
    "description",
    "$id",
];

/// Returns every key on the document's root object that this loader doesn't
/// recognize, in document order. Purely diagnostic: an unknown key is never
/// a [`SchemaError`] on its own (§9 open-world), but a caller whose config
/// asks for it can surface these as warnings before the unrecognized key is
/// silently ignored.
pub fn unknown_top_level_keys(value: &Value) -> Vec<String> {
    let Some(obj) = value.as_object() else {
        return Vec::new();
    };
    obj.keys()
        .filter(|key| !KNOWN_TOP_LEVEL_KEYS.contains(&key.as_str()))
        .cloned()
        .collect()
}

/// Loads the root object's `$defs` table, if present. Only root-level
/// entries are registered; the table is the "root is canonical" registry
/// described by §6.
pub fn load_defs(
    value: &Value,
    arena: &mut Arena,
) -> Result<Vec<(String, NodeId)>, SchemaError> {
    let mut defs = Vec::new();
    if let Some(obj) = value.as_object() {
        if let Some(defs_obj) = obj.get("$defs").and_then(Value::as_object) {
            for (name, node_value) in defs_obj {
                let path = format!("/$defs/{name}");
                let id = load_node(node_value, &path, arena)?;
                defs.push((name.clone(), id));
            }
        }
    }
    Ok(defs)
}

fn load_node(value: &Value, path: &str, arena: &mut Arena) -> Result<NodeId, SchemaError> {
    let obj = value.as_object().ok_or(SchemaError::NotAnObject(json_kind(value)))?;

    if let Some(pointer) = obj.get("$ref").and_then(Value::as_str) {
        tracing::trace!(pointer, path, "schema node is a $ref, siblings ignored");
        return Ok(arena.push(SchemaNode::Ref(RefNode {
            pointer: pointer.to_owned(),
        })));
    }

    let node = match obj.get("type").and_then(Value::as_str) {
        Some("group") => SchemaNode::Group(load_group(obj, path, arena)?),
        Some("dataset") => SchemaNode::Dataset(load_dataset(obj, path, arena)?),
        Some(other) => {
            return Err(SchemaError::InvalidType {
                path: path.to_owned(),
                value: other.to_owned(),
            })
        }
        None => SchemaNode::Untyped(load_untyped(obj, path, arena)?),
    };
    Ok(arena.push(node))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn load_group(
    obj: &serde_json::Map<String, Value>,
    path: &str,
    arena: &mut Arena,
) -> Result<GroupNode, SchemaError> {
    Ok(GroupNode {
        members: load_members(obj, path, arena)?,
        pattern_members: load_pattern_members(obj, path, arena)?,
        required: load_required(obj),
        attrs: load_attrs(obj, path)?,
        combinators: load_combinators(obj, path, arena)?,
        conditional: load_conditional(obj, path, arena)?,
        dependents: load_dependents(obj, path, arena)?,
        annotations: load_annotations(obj),
    })
}

fn load_dataset(
    obj: &serde_json::Map<String, Value>,
    path: &str,
    arena: &mut Arena,
) -> Result<DatasetNode, SchemaError> {
    Ok(DatasetNode {
        dtype: load_dtype(obj, path)?,
        shape: load_shape(obj),
        constraints: load_value_constraints(obj, path)?,
        attrs: load_attrs(obj, path)?,
        combinators: load_combinators(obj, path, arena)?,
        conditional: load_conditional(obj, path, arena)?,
        dependents: load_dependents(obj, path, arena)?,
        annotations: load_annotations(obj),
    })
}

fn load_untyped(
    obj: &serde_json::Map<String, Value>,
    path: &str,
    arena: &mut Arena,
) -> Result<UntypedNode, SchemaError> {
    Ok(UntypedNode {
        members: load_members(obj, path, arena)?,
        pattern_members: load_pattern_members(obj, path, arena)?,
        required: load_required(obj),
        dtype: load_dtype(obj, path)?,
        shape: load_shape(obj),
        constraints: load_value_constraints(obj, path)?,
        attrs: load_attrs(obj, path)?,
        combinators: load_combinators(obj, path, arena)?,
        conditional: load_conditional(obj, path, arena)?,
        dependents: load_dependents(obj, path, arena)?,
        annotations: load_annotations(obj),
    })
}

fn load_members(
    obj: &serde_json::Map<String, Value>,
    path: &str,
    arena: &mut Arena,
) -> Result<Vec<(String, NodeId)>, SchemaError> {
    let mut members = Vec::new();
    if let Some(map) = obj.get("members").and_then(Value::as_object) {
        for (name, node_value) in map {
            let child_path = format!("{path}/members/{name}");
            let id = load_node(node_value, &child_path, arena)?;
            members.push((name.clone(), id));
        }
    }
    Ok(members)
}

fn load_pattern_members(
    obj: &serde_json::Map<String, Value>,
    path: &str,
    arena: &mut Arena,
) -> Result<Vec<(Regex, NodeId)>, SchemaError> {
    let mut pattern_members = Vec::new();
    if let Some(map) = obj.get("patternMembers").and_then(Value::as_object) {
        for (pattern, node_value) in map {
            let regex = Regex::new(pattern).map_err(|source| SchemaError::BadRegex {
                path: path.to_owned(),
                pattern: pattern.clone(),
                source,
            })?;
            let child_path = format!("{path}/patternMembers/{pattern}");
            let id = load_node(node_value, &child_path, arena)?;
            pattern_members.push((regex, id));
        }
    }
    Ok(pattern_members)
}

fn load_required(obj: &serde_json::Map<String, Value>) -> Vec<String> {
    obj.get("required")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(Value::as_str).map(String::from).collect())
        .unwrap_or_default()
}

fn load_attrs(
    obj: &serde_json::Map<String, Value>,
    path: &str,
) -> Result<Vec<AttrSpec>, SchemaError> {
    let mut attrs = Vec::new();
    if let Some(arr) = obj.get("attrs").and_then(Value::as_array) {
        for (i, spec_value) in arr.iter().enumerate() {
            let spec_obj = spec_value
                .as_object()
                .ok_or(SchemaError::NotAnObject(json_kind(spec_value)))?;
            let name = spec_obj
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| SchemaError::InvalidType {
                    path: format!("{path}/attrs/{i}"),
                    value: "<attr spec missing \"name\">".to_owned(),
                })?
                .to_owned();
            let attr_path = format!("{path}/attrs/{name}");
            attrs.push(AttrSpec {
                name,
                dtype: load_dtype(spec_obj, &attr_path)?,
                required: spec_obj.get("required").and_then(Value::as_bool).unwrap_or(false),
                constraints: load_value_constraints(spec_obj, &attr_path)?,
            });
        }
    }
    Ok(attrs)
}

fn load_dtype(
    obj: &serde_json::Map<String, Value>,
    path: &str,
) -> Result<Option<Dtype>, SchemaError> {
    let Some(value) = obj.get("dtype") else {
        return Ok(None);
    };
    Ok(Some(parse_dtype_value(value, path)?))
}

fn parse_dtype_value(value: &Value, path: &str) -> Result<Dtype, SchemaError> {
    match value {
        Value::String(code) => {
            let simple = parse_simple_dtype(code).map_err(|source| SchemaError::BadDtype {
                path: path.to_owned(),
                source,
            })?;
            Ok(Dtype::Simple(simple))
        }
        Value::Object(obj) => {
            let formats = obj
                .get("formats")
                .and_then(Value::as_array)
                .ok_or_else(|| SchemaError::InvalidType {
                    path: path.to_owned(),
                    value: "<compound dtype missing \"formats\">".to_owned(),
                })?;
            let itemsize = obj
                .get("itemsize")
                .and_then(Value::as_u64)
                .ok_or_else(|| SchemaError::InvalidType {
                    path: path.to_owned(),
                    value: "<compound dtype missing \"itemsize\">".to_owned(),
                })? as usize;
            let mut running_offset = 0usize;
            let mut fields = Vec::with_capacity(formats.len());
            for field_value in formats {
                let field_obj = field_value
                    .as_object()
                    .ok_or(SchemaError::NotAnObject(json_kind(field_value)))?;
                let name = field_obj
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_owned();
                let format_code = field_obj.get("format").and_then(Value::as_str).unwrap_or("");
                let format = parse_simple_dtype(format_code).map_err(|source| SchemaError::BadDtype {
                    path: path.to_owned(),
                    source,
                })?;
                let offset = field_obj
                    .get("offset")
                    .and_then(Value::as_u64)
                    .map(|o| o as usize)
                    .unwrap_or(running_offset);
                running_offset = offset + simple_byte_width(&format);
                fields.push(CompoundField { name, format, offset });
            }
            let compound = CompoundDtype { fields, itemsize };
            validate_compound_layout(&compound).map_err(|source| SchemaError::BadCompoundLayout {
                path: path.to_owned(),
                source,
            })?;
            Ok(Dtype::Compound(compound))
        }
        other => Err(SchemaError::InvalidType {
            path: path.to_owned(),
            value: format!("<dtype as {}>", json_kind(other)),
        }),
    }
}

fn simple_byte_width(format: &treeschema_model::SimpleDtype) -> usize {
    use treeschema_model::Kind;
    match &format.kind {
        Kind::Bool => 1,
        Kind::Int(n) | Kind::UInt(n) | Kind::Float(n) => *n,
        Kind::StringAscii(n) | Kind::StringUnicode(n) => n.unwrap_or(1),
    }
}

fn load_shape(obj: &serde_json::Map<String, Value>) -> Option<Vec<i64>> {
    obj.get("shape").and_then(Value::as_array).map(|arr| {
        arr.iter()
            .filter_map(|v| v.as_i64())
            .collect()
    })
}

fn load_value_constraints(
    obj: &serde_json::Map<String, Value>,
    path: &str,
) -> Result<ValueConstraints, SchemaError> {
    let enum_values = obj.get("enum").and_then(Value::as_array).map(|arr| {
        arr.iter().filter_map(json_to_scalar).collect()
    });
    let const_value = match obj.get("const") {
        Some(v) => Some(json_to_scalar(v).ok_or_else(|| SchemaError::NonScalarConst {
            path: path.to_owned(),
        })?),
        None => None,
    };
    let min_length = obj.get("minLength").and_then(Value::as_u64).map(|n| n as usize);
    let max_length = obj.get("maxLength").and_then(Value::as_u64).map(|n| n as usize);
    let pattern = match obj.get("pattern").and_then(Value::as_str) {
        Some(p) => Some(Regex::new(p).map_err(|source| SchemaError::BadRegex {
            path: path.to_owned(),
            pattern: p.to_owned(),
            source,
        })?),
        None => None,
    };
    let format = obj.get("format").and_then(Value::as_str).map(String::from);
    Ok(ValueConstraints {
        enum_values,
        const_value,
        min_length,
        max_length,
        pattern,
        format,
    })
}

fn json_to_scalar(value: &Value) -> Option<Scalar> {
    match value {
        Value::String(s) => Some(Scalar::Str(s.clone())),
        Value::Bool(b) => Some(Scalar::Bool(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Scalar::Int(i))
            } else if let Some(u) = n.as_u64() {
                Some(Scalar::UInt(u))
            } else {
                n.as_f64().map(Scalar::Float)
            }
        }
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn load_combinators(
    obj: &serde_json::Map<String, Value>,
    path: &str,
    arena: &mut Arena,
) -> Result<Combinators, SchemaError> {
    let load_list = |key: &str, arena: &mut Arena| -> Result<Vec<NodeId>, SchemaError> {
        let Some(arr) = obj.get(key).and_then(Value::as_array) else {
            return Ok(Vec::new());
        };
        arr.iter()
            .enumerate()
            .map(|(i, v)| load_node(v, &format!("{path}/{key}/{i}"), arena))
            .collect()
    };
    let not = match obj.get("not") {
        Some(v) => Some(load_node(v, &format!("{path}/not"), arena)?),
        None => None,
    };
    Ok(Combinators {
        all_of: load_list("allOf", arena)?,
        any_of: load_list("anyOf", arena)?,
        one_of: load_list("oneOf", arena)?,
        not,
    })
}

fn load_conditional(
    obj: &serde_json::Map<String, Value>,
    path: &str,
    arena: &mut Arena,
) -> Result<Conditional, SchemaError> {
    let load_branch = |key: &str, arena: &mut Arena| -> Result<Option<NodeId>, SchemaError> {
        match obj.get(key) {
            Some(v) => Ok(Some(load_node(v, &format!("{path}/{key}"), arena)?)),
            None => Ok(None),
        }
    };
    Ok(Conditional {
        if_: load_branch("if", arena)?,
        then: load_branch("then", arena)?,
        else_: load_branch("else", arena)?,
    })
}

fn load_dependents(
    obj: &serde_json::Map<String, Value>,
    path: &str,
    arena: &mut Arena,
) -> Result<Dependents, SchemaError> {
    let mut dependent_required = Vec::new();
    if let Some(map) = obj.get("dependentRequired").and_then(Value::as_object) {
        for (name, deps) in map {
            let deps = deps
                .as_array()
                .map(|arr| arr.iter().filter_map(Value::as_str).map(String::from).collect())
                .unwrap_or_default();
            dependent_required.push((name.clone(), deps));
        }
    }
    let mut dependent_schemas = Vec::new();
    if let Some(map) = obj.get("dependentSchemas").and_then(Value::as_object) {
        for (name, node_value) in map {
            let child_path = format!("{path}/dependentSchemas/{name}");
            let id = load_node(node_value, &child_path, arena)?;
            dependent_schemas.push((name.clone(), id));
        }
    }
    Ok(Dependents {
        dependent_required,
        dependent_schemas,
    })
}

fn load_annotations(obj: &serde_json::Map<String, Value>) -> Annotations {
    Annotations {
        description: obj.get("description").and_then(Value::as_str).map(String::from),
        comment: obj.get("$comment").and_then(Value::as_str).map(String::from),
        id: obj.get("$id").and_then(Value::as_str).map(String::from),
    }
}
