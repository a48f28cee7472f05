use indexmap::IndexMap;
use serde_derive::{Deserialize, Serialize};
use serde_json::Value;

/* ============================================================================
   User Type Declarations
   ============================================================================ */

/* A field-type-use: either a bare type name or an expanded form */
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
#[serde(expecting = "expected a type name or an expanded {type, elements, default} mapping")]
pub enum FieldTypeUse {
    Name(String),
    Expanded(ExpandedFieldTypeUse),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ExpandedFieldTypeUse {
    #[serde(rename = "type")]
    pub type_name: String,

    /* Default value for the field; the base type's default applies when unset */
    #[serde(default)]
    pub default: Option<Value>,

    /* Number of elements; 1 when unset */
    #[serde(default)]
    pub elements: Option<u64>,
}

impl FieldTypeUse {
    /* Name of the referenced base type */
    pub fn type_name(&self) -> &str {
        match self {
            FieldTypeUse::Name(name) => name,
            FieldTypeUse::Expanded(expanded) => &expanded.type_name,
        }
    }

    pub fn elements(&self) -> u64 {
        match self {
            FieldTypeUse::Name(_) => 1,
            FieldTypeUse::Expanded(expanded) => expanded.elements.unwrap_or(1),
        }
    }

    pub fn default(&self) -> Option<&Value> {
        match self {
            FieldTypeUse::Name(_) => None,
            FieldTypeUse::Expanded(expanded) => expanded.default.as_ref(),
        }
    }
}

/* A user composite type: a named mapping from field name to field-type-use */
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TypeDecl {
    #[serde(default)]
    pub description: Option<String>,

    /* Named string codec paired with every parameter of this type */
    #[serde(default)]
    pub string_serialiser: Option<String>,

    /* C typename; `<name>_t` when unset */
    #[serde(default)]
    pub c_typename: Option<String>,

    /* Host-side class name; CamelCase with an `Odin` prefix when unset */
    #[serde(default)]
    pub py_typename: Option<String>,

    /* Fields in declaration order */
    pub model: IndexMap<String, FieldTypeUse>,
}
