use chrono::Utc;
use indexmap::IndexMap;
use md5::{Digest, Md5};
use serde_derive::Serialize;
use serde_json::Value;

use crate::codegen::DbGeneratorConfig;
use crate::od::context::ModelContext;
use crate::od::error::{OdError, OdResult};
use crate::od::registry::{TypeRegistry, UserType};
use crate::od::tree::{NodeId, ResolvedKind};

/* ============================================================================
   Database document models
   ============================================================================ */

#[derive(Serialize, Debug)]
struct DbDocument {
    name: String,
    description: String,
    creation_timestamp: f64,
    /// MD5 of the canonical JSON of `root`, as 32 hex digits.
    configuration_hash: String,
    root: DbNode,
    types: IndexMap<String, DbTypeDefinition>,
}

#[derive(Serialize, Debug)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum DbNode {
    Parameter {
        name: String,
        description: String,
        global_id: u32,
        global_name: String,
        element_size: usize,
        element_type: String,
        default_value: Value,
    },
    Array {
        name: String,
        description: String,
        global_id: u32,
        global_name: String,
        element_size: usize,
        element_type: String,
        default_value: Value,
        element_count: usize,
    },
    Vector {
        name: String,
        description: String,
        global_id: u32,
        global_name: String,
        element_size: usize,
        element_type: String,
        default_value: Value,
        max_element_count: usize,
    },
    Group {
        name: String,
        description: String,
        global_id: u32,
        global_name: String,
        parameters: Vec<DbNode>,
    },
}

#[derive(Serialize, Debug)]
struct DbTypeDefinition {
    count: usize,
    size: usize,
    structure: DbStructure,
}

#[derive(Serialize, Debug)]
#[serde(untagged)]
enum DbStructure {
    Scalar(String),
    Composite(IndexMap<String, DbTypeDefinition>),
}

/* ============================================================================
   Emission
   ============================================================================ */

/// Serialize the frozen model into the object dictionary database JSON.
pub fn emit(context: &ModelContext, config: &DbGeneratorConfig) -> OdResult<String> {
    context.ensure_frozen()?;

    let root = node_to_db(context, context.tree.root())?;

    let canonical = to_json(&root, None)?;
    let mut hasher = Md5::new();
    hasher.update(canonical.as_bytes());
    let configuration_hash = format!("{:032x}", u128::from_be_bytes(hasher.finalize().into()));

    let mut types = IndexMap::new();
    for (name, data_type) in context.types.iter() {
        let Some(user) = data_type.user() else {
            continue;
        };
        types.insert(
            name.clone(),
            DbTypeDefinition {
                count: 1,
                size: data_type.size,
                structure: composite_structure(&context.types, user),
            },
        );
    }

    let document = DbDocument {
        name: config.name.clone(),
        description: config.description.clone(),
        creation_timestamp: Utc::now().timestamp_micros() as f64 / 1e6,
        configuration_hash,
        root,
        types,
    };

    to_json(&document, config.indent)
}

fn node_to_db(context: &ModelContext, id: NodeId) -> OdResult<DbNode> {
    let node = context.tree.node(id);

    let db_node = match &node.kind {
        ResolvedKind::Group(group) => {
            let mut parameters = Vec::with_capacity(group.children.len());
            for &child in &group.children {
                parameters.push(node_to_db(context, child)?);
            }
            DbNode::Group {
                name: node.name.clone(),
                description: node.resolved_description().to_string(),
                global_id: node.global_id,
                global_name: node.path.clone(),
                parameters,
            }
        }

        ResolvedKind::Parameter(parameter) => {
            let resolved = context.types.lookup(&parameter.type_name)?;
            DbNode::Parameter {
                name: node.name.clone(),
                description: node.resolved_description().to_string(),
                global_id: node.global_id,
                global_name: node.path.clone(),
                element_size: resolved.size,
                element_type: resolved.typename.clone(),
                default_value: parameter.default.clone().unwrap_or(Value::Null),
            }
        }

        ResolvedKind::Array(array) => {
            let resolved = context.types.lookup(&array.type_name)?;
            DbNode::Array {
                name: node.name.clone(),
                description: node.resolved_description().to_string(),
                global_id: node.global_id,
                global_name: node.path.clone(),
                element_size: resolved.size,
                element_type: resolved.typename.clone(),
                default_value: elementwise_default(array.default.as_ref()),
                element_count: array.elements,
            }
        }

        ResolvedKind::Vector(vector) => {
            let resolved = context.types.lookup(&vector.type_name)?;
            DbNode::Vector {
                name: node.name.clone(),
                description: node.resolved_description().to_string(),
                global_id: node.global_id,
                global_name: node.path.clone(),
                element_size: resolved.size,
                element_type: resolved.typename.clone(),
                default_value: elementwise_default(vector.default.as_ref()),
                max_element_count: vector.max_elements,
            }
        }
    };

    Ok(db_node)
}

/// String defaults of character runs are stored element-wise.
fn elementwise_default(default: Option<&Value>) -> Value {
    match default {
        Some(Value::String(text)) => Value::Array(
            text.chars()
                .map(|ch| Value::String(ch.to_string()))
                .collect(),
        ),
        Some(other) => other.clone(),
        None => Value::Null,
    }
}

fn composite_structure(registry: &TypeRegistry, user: &UserType) -> DbStructure {
    let mut fields = IndexMap::new();
    for (field_name, field) in &user.fields {
        let structure = match registry.get(&field.type_name) {
            Some(base) => match base.user() {
                Some(nested) => composite_structure(registry, nested),
                None => DbStructure::Scalar(base.typename.clone()),
            },
            // Field types were bound during registration.
            None => DbStructure::Scalar(field.type_name.clone()),
        };
        fields.insert(
            field_name.clone(),
            DbTypeDefinition {
                count: field.elements,
                size: field.base_size,
                structure,
            },
        );
    }
    DbStructure::Composite(fields)
}

fn to_json<T: serde::Serialize>(value: &T, indent: Option<usize>) -> OdResult<String> {
    let result = match indent {
        Some(indent) => {
            let spaces = " ".repeat(indent);
            let formatter = serde_json::ser::PrettyFormatter::with_indent(spaces.as_bytes());
            let mut buffer = Vec::new();
            let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
            serde::Serialize::serialize(value, &mut serializer)
                .map_err(|error| OdError::schema("db", error.to_string()))?;
            String::from_utf8(buffer)
                .map_err(|error| OdError::schema("db", error.to_string()))?
        }
        None => serde_json::to_string(value)
            .map_err(|error| OdError::schema("db", error.to_string()))?,
    };
    Ok(result)
}
