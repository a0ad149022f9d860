//! Projection of a command's JSON Schema into a flat option list.
//!
//! Only the root object's `properties` become options. Nested objects and
//! arrays of objects have no command-line form and are skipped.

use crate::{Deprecation, OptionModel, OptionType, Value};
use serde_json::Value as Json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("options schema must be a JSON object")]
    NotAnObject,
    #[error("unresolved $ref '{0}'")]
    UnresolvedRef(String),
    #[error("$ref cycle through '{0}'")]
    RefCycle(String),
    #[error("unsupported $ref '{0}': only local references are supported")]
    ExternalRef(String),
}

/// Project the root `properties` of `schema` into option models.
///
/// The result lists non-positional options in declaration order, followed by
/// positional options ordered by their slot.
pub fn parse_json_schema_to_options(schema: &Json) -> Result<Vec<OptionModel>, SchemaError> {
    let root = schema.as_object().ok_or(SchemaError::NotAnObject)?;

    let required: Vec<&str> = root
        .get("required")
        .and_then(Json::as_array)
        .map(|names| names.iter().filter_map(Json::as_str).collect())
        .unwrap_or_default();

    let Some(properties) = root.get("properties").and_then(Json::as_object) else {
        return Ok(Vec::new());
    };

    let mut options = Vec::with_capacity(properties.len());
    for (name, property) in properties {
        let property = resolve_refs(schema, property)?;
        match project_property(schema, name, property, &required)? {
            Some(option) => options.push(option),
            None => tracing::debug!(property = %name, "skipping property without a command-line type"),
        }
    }

    options.sort_by_key(|o| o.positional.map_or((0, 0), |slot| (1, slot)));
    Ok(options)
}

/// Follow local `$ref` pointers until a concrete schema node is reached.
fn resolve_refs<'a>(root: &'a Json, mut node: &'a Json) -> Result<&'a Json, SchemaError> {
    let mut seen: Vec<&str> = Vec::new();
    while let Some(reference) = node.get("$ref").and_then(Json::as_str) {
        if seen.contains(&reference) {
            return Err(SchemaError::RefCycle(reference.to_string()));
        }
        seen.push(reference);

        let pointer = reference
            .strip_prefix('#')
            .ok_or_else(|| SchemaError::ExternalRef(reference.to_string()))?;
        node = root
            .pointer(pointer)
            .ok_or_else(|| SchemaError::UnresolvedRef(reference.to_string()))?;
    }
    Ok(node)
}

fn push_type_keyword<'a>(node: &'a Json, out: &mut Vec<&'a str>) {
    match node.get("type") {
        Some(Json::String(ty)) => out.push(ty.as_str()),
        Some(Json::Array(items)) => out.extend(items.iter().filter_map(Json::as_str)),
        _ => {}
    }
}

fn collect_types(root: &Json, node: &Json) -> Result<Vec<OptionType>, SchemaError> {
    let mut raw: Vec<&str> = Vec::new();
    push_type_keyword(node, &mut raw);
    for keyword in ["oneOf", "anyOf"] {
        if let Some(alternatives) = node.get(keyword).and_then(Json::as_array) {
            for alternative in alternatives {
                let alternative = resolve_refs(root, alternative)?;
                push_type_keyword(alternative, &mut raw);
            }
        }
    }

    let mut types: Vec<OptionType> = Vec::new();
    for ty in raw.into_iter().filter_map(OptionType::from_schema_type) {
        if !types.contains(&ty) {
            types.push(ty);
        }
    }
    Ok(types)
}

fn project_default(primary: OptionType, raw: &Json) -> Option<Value> {
    match (primary, raw) {
        (OptionType::String, Json::String(s)) => Some(Value::String(s.clone())),
        (OptionType::Number, Json::Number(n)) => n.as_f64().map(Value::Number),
        (OptionType::Boolean, Json::Bool(b)) => Some(Value::Bool(*b)),
        (OptionType::Array, Json::Array(items)) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        _ => None,
    }
}

fn scalar_to_string(value: &Json) -> String {
    match value {
        Json::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn project_property(
    root: &Json,
    name: &str,
    node: &Json,
    required: &[&str],
) -> Result<Option<OptionModel>, SchemaError> {
    let types = collect_types(root, node)?;
    let Some(&primary) = types.first() else {
        return Ok(None);
    };

    let mut option = OptionModel::new(name, primary);
    if types.len() > 1 {
        option.types = Some(types);
    }

    option.description = node
        .get("description")
        .and_then(Json::as_str)
        .unwrap_or_default()
        .to_string();

    if let Some(values) = node.get("enum").and_then(Json::as_array) {
        let values: Vec<Value> = values.iter().filter_map(Value::from_json_scalar).collect();
        if !values.is_empty() {
            option.enum_values = Some(values);
        }
    }

    option.default = node
        .get("default")
        .and_then(|raw| project_default(primary, raw));

    option.positional = node
        .get("$default")
        .filter(|d| d.get("$source").and_then(Json::as_str) == Some("argv"))
        .and_then(|d| d.get("index"))
        .and_then(Json::as_u64)
        .and_then(|index| usize::try_from(index).ok());

    option.aliases = match (node.get("aliases"), node.get("alias")) {
        (Some(Json::Array(aliases)), _) => aliases.iter().map(scalar_to_string).collect(),
        (_, Some(alias)) if !alias.is_null() => vec![scalar_to_string(alias)],
        _ => Vec::new(),
    };

    option.format = node
        .get("format")
        .and_then(Json::as_str)
        .map(str::to_string);
    option.required = required.contains(&name);

    let hidden = node.get("hidden").and_then(Json::as_bool).unwrap_or(false);
    let visible = node.get("visible").and_then(Json::as_bool).unwrap_or(true);
    option.hidden = hidden || !visible;

    option.deprecated = match node.get("x-deprecated") {
        Some(Json::Bool(true)) => Some(Deprecation::Flag(true)),
        Some(Json::String(message)) => Some(Deprecation::Message(message.clone())),
        _ => None,
    };

    Ok(Some(option))
}
