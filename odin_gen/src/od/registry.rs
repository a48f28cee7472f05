use indexmap::IndexMap;
use serde_json::Value;

use odin_types::TypeDecl;

use crate::od::error::{OdError, OdResult};

/* ============================================================================
   Data Types
   ============================================================================ */

/// Classification of a built-in scalar, used to pick literal formatting and
/// the host-side primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Unsigned,
    Signed,
    Float,
    Bool,
    Char,
}

impl ScalarKind {
    /// The host-side primitive the scalar maps onto.
    pub fn python_primitive(&self) -> &'static str {
        match self {
            ScalarKind::Float => "float",
            _ => "int",
        }
    }
}

/// A resolved data type: one of the twelve built-in scalars or a user
/// composite registered from the specification.
#[derive(Debug, Clone, PartialEq)]
pub struct DataType {
    pub typename: String,
    /// The C typename that corresponds to the data type.
    pub c_typename: String,
    /// The host-side class name that corresponds to the data type.
    pub py_typename: String,
    /// Packed size of the data type in bytes.
    pub size: usize,
    /// The default value for the data type.
    pub default: Value,
    /// Little-endian packed wire-format descriptor.
    pub struct_format: String,
    pub kind: DataTypeKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DataTypeKind {
    Scalar(ScalarKind),
    User(UserType),
}

impl DataType {
    pub fn is_custom(&self) -> bool {
        matches!(self.kind, DataTypeKind::User(_))
    }

    pub fn user(&self) -> Option<&UserType> {
        match &self.kind {
            DataTypeKind::User(user) => Some(user),
            DataTypeKind::Scalar(_) => None,
        }
    }

    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match &self.kind {
            DataTypeKind::Scalar(kind) => Some(*kind),
            DataTypeKind::User(_) => None,
        }
    }

    fn scalar(
        typename: &str,
        c_typename: &str,
        py_typename: &str,
        size: usize,
        struct_format: &str,
        default: Value,
        kind: ScalarKind,
    ) -> Self {
        DataType {
            typename: typename.to_string(),
            c_typename: c_typename.to_string(),
            py_typename: py_typename.to_string(),
            size,
            default,
            struct_format: struct_format.to_string(),
            kind: DataTypeKind::Scalar(kind),
        }
    }
}

/// The expanded body of a user composite type.
#[derive(Debug, Clone, PartialEq)]
pub struct UserType {
    pub string_serialiser: Option<String>,
    pub description: Option<String>,
    /// Fields in declaration order.
    pub fields: IndexMap<String, FieldModel>,
}

/// One expanded field of a user type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldModel {
    /// Registry name of the base type.
    pub type_name: String,
    /// Whether the base type is itself a user type.
    pub is_custom: bool,
    pub elements: usize,
    /// Packed size of the base type in bytes.
    pub base_size: usize,
    /// Field default; the base type's default applies when unset.
    pub default: Option<Value>,
}

impl FieldModel {
    /// Total packed size of the field in bytes.
    pub fn total_size(&self) -> usize {
        self.base_size * self.elements
    }
}

/* ============================================================================
   Registry
   ============================================================================ */

/// Stores all resolvable data types, keyed by name and in registration
/// order. User types may reference previously registered user types.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: IndexMap<String, DataType>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with the twelve built-in scalars.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for builtin in builtin_types() {
            // Builtin names are distinct, registration cannot conflict.
            let _ = registry.register(builtin);
        }
        registry
    }

    pub fn register(&mut self, data_type: DataType) -> OdResult<()> {
        if self.types.contains_key(&data_type.typename) {
            return Err(OdError::TypeConflict {
                type_name: data_type.typename,
            });
        }
        self.types.insert(data_type.typename.clone(), data_type);
        Ok(())
    }

    /// Expand a user type declaration and register it.
    ///
    /// The packed descriptor treats nested user-typed fields as opaque byte
    /// runs (`{total_bytes}s`); scalar fields contribute
    /// `{elements}{format}` fragments in declaration order.
    pub fn register_user_type(&mut self, name: &str, decl: &TypeDecl) -> OdResult<()> {
        if self.types.contains_key(name) {
            return Err(OdError::TypeConflict {
                type_name: name.to_string(),
            });
        }

        let mut fields: IndexMap<String, FieldModel> = IndexMap::new();
        let mut struct_format = String::new();
        let mut size = 0usize;

        for (field_name, type_use) in &decl.model {
            let location = format!("{name}.{field_name}");

            let elements = type_use.elements() as usize;
            if elements < 1 {
                return Err(OdError::schema(&location, "elements must be at least 1"));
            }

            let base = self.lookup_at(type_use.type_name(), &location)?;
            let is_custom = base.is_custom();

            if is_custom {
                struct_format.push_str(&format!("{}s", base.size * elements));
            } else {
                struct_format.push_str(&format!("{}{}", elements, base.struct_format));
            }
            size += base.size * elements;

            let default = type_use.default().cloned();
            if let Some(value) = &default {
                validate_field_default(value, elements, is_custom, &location)?;
            }

            let field = FieldModel {
                type_name: base.typename.clone(),
                is_custom,
                elements,
                base_size: base.size,
                default,
            };
            fields.insert(field_name.clone(), field);
        }

        let default = self.default_for_fields(&fields);

        self.register(DataType {
            typename: name.to_string(),
            c_typename: decl
                .c_typename
                .clone()
                .unwrap_or_else(|| format!("{name}_t")),
            py_typename: decl
                .py_typename
                .clone()
                .unwrap_or_else(|| format!("Odin{}", to_camel_case(name))),
            size,
            default,
            struct_format,
            kind: DataTypeKind::User(UserType {
                string_serialiser: decl.string_serialiser.clone(),
                description: decl.description.clone(),
                fields,
            }),
        })
    }

    pub fn lookup(&self, name: &str) -> OdResult<&DataType> {
        self.lookup_at(name, name)
    }

    pub fn lookup_at(&self, name: &str, location: &str) -> OdResult<&DataType> {
        self.types.get(name).ok_or_else(|| OdError::UnknownType {
            type_name: name.to_string(),
            location: location.to_string(),
        })
    }

    pub fn get(&self, name: &str) -> Option<&DataType> {
        self.types.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &DataType)> {
        self.types.iter()
    }

    /// The recursive default of a composite body: field defaults where set,
    /// base type defaults (repeated per element) elsewhere.
    fn default_for_fields(&self, fields: &IndexMap<String, FieldModel>) -> Value {
        let mut defaults = serde_json::Map::new();
        for (field_name, field) in fields {
            let value = match &field.default {
                Some(value) => value.clone(),
                None => {
                    // The base type was looked up during expansion.
                    let base_default = self
                        .types
                        .get(&field.type_name)
                        .map(|base| base.default.clone())
                        .unwrap_or(Value::Null);
                    if field.elements == 1 {
                        base_default
                    } else {
                        Value::Array(vec![base_default; field.elements])
                    }
                }
            };
            defaults.insert(field_name.clone(), value);
        }
        Value::Object(defaults)
    }
}

/// Reject field defaults whose shape does not match the field type. A
/// sequence is per-element, a mapping is per-field; intent is never
/// inferred when the shape and the type disagree.
fn validate_field_default(
    value: &Value,
    elements: usize,
    is_custom: bool,
    location: &str,
) -> OdResult<()> {
    if elements > 1 {
        match value {
            Value::Array(items) if items.len() == elements => Ok(()),
            Value::Array(items) => Err(OdError::schema(
                location,
                format!("default has {} elements, field has {elements}", items.len()),
            )),
            _ => Err(OdError::schema(
                location,
                "a multi-element field default must be a sequence",
            )),
        }
    } else if is_custom {
        match value {
            Value::Object(_) => Ok(()),
            _ => Err(OdError::schema(
                location,
                "a composite field default must be a per-field mapping",
            )),
        }
    } else {
        match value {
            Value::Array(_) | Value::Object(_) => Err(OdError::schema(
                location,
                "a scalar field default must be a scalar value",
            )),
            _ => Ok(()),
        }
    }
}

/* ============================================================================
   Built-ins and descriptor helpers
   ============================================================================ */

fn builtin_types() -> Vec<DataType> {
    use ScalarKind::*;
    vec![
        DataType::scalar("u64", "uint64_t", "OdinU64", 8, "Q", Value::from(0), Unsigned),
        DataType::scalar("u32", "uint32_t", "OdinU32", 4, "I", Value::from(0), Unsigned),
        DataType::scalar("u16", "uint16_t", "OdinU16", 2, "H", Value::from(0), Unsigned),
        DataType::scalar("u8", "uint8_t", "OdinU8", 1, "B", Value::from(0), Unsigned),
        DataType::scalar("i64", "int64_t", "OdinI64", 8, "q", Value::from(0), Signed),
        DataType::scalar("i32", "int32_t", "OdinI32", 4, "i", Value::from(0), Signed),
        DataType::scalar("i16", "int16_t", "OdinI16", 2, "h", Value::from(0), Signed),
        DataType::scalar("i8", "int8_t", "OdinI8", 1, "b", Value::from(0), Signed),
        DataType::scalar("f32", "float", "OdinF32", 4, "f", Value::from(0.0), Float),
        DataType::scalar("f64", "double", "OdinF64", 8, "d", Value::from(0.0), Float),
        DataType::scalar("bool", "bool", "OdinBool", 1, "?", Value::from(false), Bool),
        DataType::scalar("char", "char", "OdinChar", 1, "B", Value::from(0), Char),
    ]
}

/// Byte size of a little-endian packed wire-format descriptor.
pub fn struct_calcsize(format: &str) -> OdResult<usize> {
    let mut total = 0usize;
    let mut count: Option<usize> = None;

    for ch in format.chars() {
        if let Some(digit) = ch.to_digit(10) {
            count = Some(count.unwrap_or(0) * 10 + digit as usize);
            continue;
        }
        let repeat = count.take().unwrap_or(1);
        let element = match ch {
            'B' | 'b' | '?' | 'c' => 1,
            'H' | 'h' => 2,
            'I' | 'i' | 'f' => 4,
            'Q' | 'q' | 'd' => 8,
            's' => {
                total += repeat;
                continue;
            }
            other => {
                return Err(OdError::schema(
                    format,
                    format!("unknown descriptor character '{other}'"),
                ));
            }
        };
        total += repeat * element;
    }

    Ok(total)
}

fn to_camel_case(name: &str) -> String {
    name.split('_')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}
