//! Building blocks of the C backend: descriptor tables, the backing
//! variables struct, group tables and extension chain literals.

pub mod extensions;
pub mod groups;
pub mod objects;
pub mod variables;

use crate::od::access::AccessCollection;

pub const ODIN_PARAMETER_TYPE: &str = "ODIN_parameter_t";
pub const ODIN_PARAMETER_GROUP_TYPE: &str = "ODIN_parameter_group_t";

pub const ODIN_TYPE_PARAMETER: &str = "ODIN_TYPE_PARAMETER";
pub const ODIN_TYPE_ARRAY: &str = "ODIN_TYPE_ARRAY";
pub const ODIN_TYPE_VECTOR: &str = "ODIN_TYPE_VECTOR";
pub const ODIN_TYPE_GROUP: &str = "ODIN_TYPE_GROUP";

const GROUP_ACCESS_PREFIX: &str = "ODIN_ACCESS_";
const ACTION_PREFIX: &str = "ODIN_ACCESS_";

/// Map a C scalar typename onto the runtime element type enumeration.
/// Everything that is not a built-in scalar is custom.
pub fn element_type_macro(c_typename: &str) -> &'static str {
    match c_typename {
        "bool" => "ODIN_ELEMENT_TYPE_BOOL",
        "uint8_t" => "ODIN_ELEMENT_TYPE_UINT8",
        "uint16_t" => "ODIN_ELEMENT_TYPE_UINT16",
        "uint32_t" => "ODIN_ELEMENT_TYPE_UINT32",
        "uint64_t" => "ODIN_ELEMENT_TYPE_UINT64",
        "int8_t" => "ODIN_ELEMENT_TYPE_INT8",
        "int16_t" => "ODIN_ELEMENT_TYPE_INT16",
        "int32_t" => "ODIN_ELEMENT_TYPE_INT32",
        "int64_t" => "ODIN_ELEMENT_TYPE_INT64",
        "float" => "ODIN_ELEMENT_TYPE_FLOAT32",
        "double" => "ODIN_ELEMENT_TYPE_FLOAT64",
        "char" => "ODIN_ELEMENT_TYPE_CHAR",
        _ => "ODIN_ELEMENT_TYPE_CUSTOM",
    }
}

/// Escape a string for use inside a C string literal.
pub fn escape_string(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '\r' => escaped.push_str("\\r"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// The packed `name\0description` literal of a descriptor.
pub fn name_and_description(name: &str, description: &str) -> String {
    format!("\"{}\\0{}\"", escape_string(name), escape_string(description))
}

/// Format a float for embedding in C. Unbounded values become the math.h
/// infinity macros.
pub fn fmt_float(value: f64) -> String {
    if value.is_infinite() {
        if value > 0.0 { "INFINITY".to_string() } else { "-INFINITY".to_string() }
    } else {
        format!("{value:?}")
    }
}

/// Lower an effective access collection to the descriptor flag expression.
/// Groups with an empty permission set contribute nothing; a fully empty
/// expression collapses to the literal `0` to stay syntactically valid.
pub fn access_expression(access: &AccessCollection) -> String {
    let mut terms: Vec<String> = Vec::new();

    for (group_name, definition) in &access.groups {
        if definition.default.is_empty() {
            continue;
        }
        let permissions: Vec<String> = definition
            .default
            .iter()
            .map(|permission| format!("{ACTION_PREFIX}{}", permission.macro_name()))
            .collect();
        terms.push(format!(
            "({GROUP_ACCESS_PREFIX}{} & ({}))",
            group_name.to_uppercase(),
            permissions.join(" | ")
        ));
    }

    if terms.is_empty() {
        "0".to_string()
    } else {
        terms.join(" | ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::od::access::{AccessDefinition, Permission, PermissionSet};
    use indexmap::IndexMap;

    #[test]
    fn empty_access_collapses_to_zero() {
        assert_eq!(access_expression(&AccessCollection::default()), "0");

        let mut groups = IndexMap::new();
        groups.insert("ops".to_string(), AccessDefinition::default());
        assert_eq!(access_expression(&AccessCollection { groups }), "0");
    }

    #[test]
    fn access_expression_names_groups_and_actions() {
        let mut set = PermissionSet::new();
        set.insert(Permission::Read);
        set.insert(Permission::Write);
        let mut groups = IndexMap::new();
        groups.insert(
            "ops".to_string(),
            AccessDefinition {
                override_: None,
                default: set,
            },
        );
        assert_eq!(
            access_expression(&AccessCollection { groups }),
            "(ODIN_ACCESS_OPS & (ODIN_ACCESS_READ | ODIN_ACCESS_WRITE))"
        );
    }

    #[test]
    fn floats_and_infinities() {
        assert_eq!(fmt_float(2.5), "2.5");
        assert_eq!(fmt_float(f64::INFINITY), "INFINITY");
        assert_eq!(fmt_float(f64::NEG_INFINITY), "-INFINITY");
    }
}
