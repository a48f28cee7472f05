use indexmap::IndexMap;
use serde_derive::{Deserialize, Serialize};
use serde_json::Value;

use crate::access::AccessControlDecl;
use crate::extension::ExtensionDecl;

/* ============================================================================
   Parameter Tree Declarations
   ============================================================================ */

/* A node of the parameter tree, discriminated by its `type` field */
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParameterDecl {
    /* A single typed value backed by internal or external storage */
    Parameter(ScalarParameterDecl),

    /* A parameter-shaped node without storage, driven purely by extensions */
    Void(ScalarParameterDecl),

    /* A fixed-length run of elements of one type */
    Array(ArrayParameterDecl),

    /* A variable-length run of elements with a compile-time capacity */
    Vector(VectorParameterDecl),

    /* A nested namespace of further parameters */
    Group(GroupDecl),
}

impl ParameterDecl {
    /* Local id of the node, unique within its parent */
    pub fn local_id(&self) -> i64 {
        match self {
            ParameterDecl::Parameter(p) | ParameterDecl::Void(p) => p.local_id,
            ParameterDecl::Array(p) => p.local_id,
            ParameterDecl::Vector(p) => p.local_id,
            ParameterDecl::Group(p) => p.local_id,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            ParameterDecl::Parameter(p) | ParameterDecl::Void(p) => p.description.as_deref(),
            ParameterDecl::Array(p) => p.description.as_deref(),
            ParameterDecl::Vector(p) => p.description.as_deref(),
            ParameterDecl::Group(p) => p.description.as_deref(),
        }
    }

    pub fn access_control(&self) -> &AccessControlDecl {
        match self {
            ParameterDecl::Parameter(p) | ParameterDecl::Void(p) => &p.access_control,
            ParameterDecl::Array(p) => &p.access_control,
            ParameterDecl::Vector(p) => &p.access_control,
            ParameterDecl::Group(p) => &p.access_control,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, ParameterDecl::Group(_))
    }
}

/* A scalar parameter declaration, shared by `parameter` and `void` nodes */
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScalarParameterDecl {
    /* Local id of the parameter, unique within the parent */
    pub local_id: i64,

    pub primitive: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub access_control: AccessControlDecl,

    /* Default value; the resolved type's default applies when unset */
    #[serde(default)]
    pub default: Option<Value>,

    /* Name of an externally-defined backing variable overriding internal storage */
    #[serde(default)]
    pub reference: Option<String>,

    #[serde(default)]
    pub extensions: Vec<ExtensionDecl>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ArrayParameterDecl {
    pub local_id: i64,

    pub primitive: String,

    /* Number of elements in the array */
    pub elements: u64,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub access_control: AccessControlDecl,

    /* Per-element defaults, or a string for character arrays */
    #[serde(default)]
    pub default: Option<Value>,

    #[serde(default)]
    pub reference: Option<String>,

    #[serde(default)]
    pub extensions: Vec<ExtensionDecl>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct VectorParameterDecl {
    pub local_id: i64,

    pub primitive: String,

    /* Capacity of the vector; the current length is runtime state */
    pub max_elements: u64,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub access_control: AccessControlDecl,

    #[serde(default)]
    pub default: Option<Value>,

    #[serde(default)]
    pub reference: Option<String>,

    #[serde(default)]
    pub extensions: Vec<ExtensionDecl>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GroupDecl {
    pub local_id: i64,

    /* Number of bits reserved for the local ids of the children */
    pub id_space_shift: u32,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub access_control: AccessControlDecl,

    /* Children in declaration order; the order is preserved end-to-end */
    pub children: IndexMap<String, ParameterDecl>,
}

/* A named flat view over the parameter tree, built from path patterns */
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct CollectionDecl {
    #[serde(default)]
    pub description: Option<String>,

    /* Dot-separated paths from the root; `*` matches all children of a group */
    #[serde(default)]
    pub children: Vec<String>,
}
