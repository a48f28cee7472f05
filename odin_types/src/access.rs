use indexmap::IndexMap;
use serde_derive::{Deserialize, Serialize};

/* ============================================================================
   Access Control Declarations
   ============================================================================ */

/* Permissions in declared form: a compact string or a list of names.
 *
 * The compact form accepts "R", "W" and "RW"; the list form accepts
 * permission names (case-insensitive) as well as the compact letters.
 */
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
#[serde(expecting = "expected a compact permission string or a list of permission names")]
pub enum PermissionsDecl {
    Compact(String),
    Names(Vec<String>),
}

/* Access control definition for a single access group */
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct AccessDefinitionDecl {
    /* Forces the permissions at this node and downstream, replacing the
     * parent's default for this group */
    #[serde(default, rename = "override")]
    pub override_: Option<PermissionsDecl>,

    /* Permissions granted unless overridden */
    #[serde(default)]
    pub default: Option<PermissionsDecl>,
}

/* A group entry: either a full definition or a bare permission shorthand
 * (equivalent to a definition with only `default` set) */
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
#[serde(expecting = "expected an access definition or a bare permission value")]
pub enum AccessEntryDecl {
    Definition(AccessDefinitionDecl),
    Permissions(PermissionsDecl),
}

/* Map from access group name to its declared permissions.
 *
 * Insertion order is semantic: the root collection's order assigns the
 * numeric access group ids.
 */
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(transparent)]
pub struct AccessControlDecl(pub IndexMap<String, AccessEntryDecl>);

impl AccessControlDecl {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
