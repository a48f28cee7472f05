use serde_json::Value;

use crate::codegen::c_gen::escape_string;
use crate::od::context::ModelContext;
use crate::od::error::OdResult;
use crate::od::registry::{DataType, ScalarKind};
use crate::od::tree::{NodeId, ResolvedKind};

const INDENT: &str = "    ";

/// The packed backing struct typedef. `None` when nothing needs storage
/// (all parameters void or externally referenced).
pub fn emit_variables_typedef(
    context: &ModelContext,
    variables_type: &str,
) -> OdResult<Option<String>> {
    let body = struct_members(context, context.tree.root(), 1)?;
    if body.is_empty() {
        return Ok(None);
    }
    Ok(Some(format!(
        "typedef struct\n{{\n{body}}} {variables_type};\n"
    )))
}

fn struct_members(context: &ModelContext, group: NodeId, depth: usize) -> OdResult<String> {
    let indent = INDENT.repeat(depth);
    let mut body = String::new();

    for &child in context.tree.children(group) {
        let node = context.tree.node(child);
        if node.storage_reference().is_some() {
            continue;
        }

        match &node.kind {
            ResolvedKind::Group(_) => {
                let inner = struct_members(context, child, depth + 1)?;
                if inner.is_empty() {
                    continue;
                }
                body.push_str(&format!(
                    "{indent}struct\n{indent}{{\n{inner}{indent}}} {};\n",
                    node.name
                ));
            }

            ResolvedKind::Parameter(parameter) => {
                if parameter.void {
                    continue;
                }
                let resolved = context.types.lookup(&parameter.type_name)?;
                body.push_str(&format!("{indent}{} {};\n", resolved.c_typename, node.name));
            }

            ResolvedKind::Array(array) => {
                let resolved = context.types.lookup(&array.type_name)?;
                body.push_str(&format!(
                    "{indent}{} {}[{}];\n",
                    resolved.c_typename, node.name, array.elements
                ));
            }

            ResolvedKind::Vector(vector) => {
                let resolved = context.types.lookup(&vector.type_name)?;
                body.push_str(&format!(
                    "{indent}struct\n{indent}{{\n\
                     {indent}{INDENT}size_t num_elements;\n\
                     {indent}{INDENT}{} data[{}];\n\
                     {indent}}} {};\n",
                    resolved.c_typename, vector.max_elements, node.name
                ));
            }
        }
    }

    Ok(body)
}

/// The statically initialized backing struct with per-parameter defaults.
pub fn emit_variables_initialiser(
    context: &ModelContext,
    variables_type: &str,
    variables_name: &str,
) -> OdResult<Option<String>> {
    let Some(body) = group_initialiser(context, context.tree.root(), 1)? else {
        return Ok(None);
    };
    Ok(Some(format!(
        "{variables_type} {variables_name} = {{\n{body}}};\n"
    )))
}

fn group_initialiser(
    context: &ModelContext,
    group: NodeId,
    depth: usize,
) -> OdResult<Option<String>> {
    let indent = INDENT.repeat(depth);
    let mut body = String::new();

    for &child in context.tree.children(group) {
        let node = context.tree.node(child);
        if node.storage_reference().is_some() {
            continue;
        }

        match &node.kind {
            ResolvedKind::Group(_) => {
                if let Some(inner) = group_initialiser(context, child, depth + 1)? {
                    body.push_str(&format!("{indent}.{} = {{\n{inner}{indent}}},\n", node.name));
                }
            }

            ResolvedKind::Parameter(parameter) => {
                if parameter.void {
                    continue;
                }
                let resolved = context.types.lookup(&parameter.type_name)?;
                let literal = scalar_value(resolved, parameter.default.as_ref());
                body.push_str(&format!("{indent}.{} = {literal},\n", node.name));
            }

            ResolvedKind::Array(array) => {
                let resolved = context.types.lookup(&array.type_name)?;
                let literal = elements_value(resolved, array.default.as_ref());
                body.push_str(&format!("{indent}.{} = {literal},\n", node.name));
            }

            ResolvedKind::Vector(vector) => {
                let resolved = context.types.lookup(&vector.type_name)?;
                let length = default_length(vector.default.as_ref());
                let literal = elements_value(resolved, vector.default.as_ref());
                body.push_str(&format!(
                    "{indent}.{} = {{ .num_elements = {length}, .data = {literal} }},\n",
                    node.name
                ));
            }
        }
    }

    if body.is_empty() {
        Ok(None)
    } else {
        Ok(Some(body))
    }
}

/// Literal of a single value; falls back to the type default when the
/// parameter does not set one.
pub fn scalar_value(resolved: &DataType, default: Option<&Value>) -> String {
    let value = default.unwrap_or(&resolved.default);
    match resolved.scalar_kind() {
        Some(kind) => scalar_literal(kind, value),
        None => compound_literal(value),
    }
}

fn elements_value(resolved: &DataType, default: Option<&Value>) -> String {
    match default {
        // A character array may be initialized from a string literal.
        Some(Value::String(text)) if resolved.scalar_kind() == Some(ScalarKind::Char) => {
            format!("\"{}\"", escape_string(text))
        }
        Some(Value::Array(items)) if !items.is_empty() => {
            let rendered: Vec<String> = items
                .iter()
                .map(|item| match resolved.scalar_kind() {
                    Some(kind) => scalar_literal(kind, item),
                    None => compound_literal(item),
                })
                .collect();
            format!("{{ {} }}", rendered.join(", "))
        }
        _ => "{ 0 }".to_string(),
    }
}

fn default_length(default: Option<&Value>) -> usize {
    match default {
        Some(Value::String(text)) => text.len(),
        Some(Value::Array(items)) => items.len(),
        _ => 0,
    }
}

fn scalar_literal(kind: ScalarKind, value: &Value) -> String {
    match kind {
        ScalarKind::Bool => {
            let truthy = match value {
                Value::Bool(flag) => *flag,
                Value::Number(number) => number.as_f64().unwrap_or(0.0) != 0.0,
                _ => false,
            };
            if truthy { "true".to_string() } else { "false".to_string() }
        }
        ScalarKind::Char => match value {
            Value::String(text) => format!("'{}'", escape_string(text)),
            other => plain_literal(other),
        },
        _ => plain_literal(value),
    }
}

fn plain_literal(value: &Value) -> String {
    match value {
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::String(text) => format!("\"{}\"", escape_string(text)),
        Value::Null => "0".to_string(),
        other => compound_literal(other),
    }
}

/// Designated initializer for composite defaults.
fn compound_literal(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let fields: Vec<String> = map
                .iter()
                .map(|(name, field)| format!(".{name} = {}", compound_literal(field)))
                .collect();
            format!("{{ {} }}", fields.join(", "))
        }
        Value::Array(items) => {
            if items.is_empty() {
                return "{ 0 }".to_string();
            }
            let rendered: Vec<String> = items.iter().map(compound_literal).collect();
            format!("{{ {} }}", rendered.join(", "))
        }
        other => plain_literal(other),
    }
}
