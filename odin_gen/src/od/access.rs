use std::collections::BTreeSet;

use indexmap::IndexMap;

use odin_types::{AccessControlDecl, AccessDefinitionDecl, AccessEntryDecl, PermissionsDecl};

use crate::od::error::{OdError, OdResult};

/// Max supported distinct access groups; the id fits the descriptor's
/// flag bit budget.
pub const MAX_ACCESS_GROUPS: usize = 6;

/* ============================================================================
   Permissions
   ============================================================================ */

/// A single grantable action. Must match the definitions in the C runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Permission {
    Read,
    Write,
    LogRead,
    LogWrite,
}

/// Set of permissions granted for one access group. Ordered so emitted
/// expressions are deterministic.
pub type PermissionSet = BTreeSet<Permission>;

impl Permission {
    /// Upper-case name as used by the C runtime macros.
    pub fn macro_name(&self) -> &'static str {
        match self {
            Permission::Read => "READ",
            Permission::Write => "WRITE",
            Permission::LogRead => "LOG_READ",
            Permission::LogWrite => "LOG_WRITE",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "READ" => Some(Permission::Read),
            "WRITE" => Some(Permission::Write),
            "LOG_READ" => Some(Permission::LogRead),
            "LOG_WRITE" => Some(Permission::LogWrite),
            _ => match name {
                "R" => Some(Permission::Read),
                "W" => Some(Permission::Write),
                _ => None,
            },
        }
    }

    /// Parse the compact representation ("R", "W", "RW").
    fn set_from_compact(compact: &str, location: &str) -> OdResult<PermissionSet> {
        let mut permissions = PermissionSet::new();
        let mut rest = String::new();
        for ch in compact.chars() {
            match ch {
                'R' => {
                    permissions.insert(Permission::Read);
                }
                'W' => {
                    permissions.insert(Permission::Write);
                }
                other => rest.push(other),
            }
        }
        if !rest.is_empty() {
            return Err(OdError::schema(
                location,
                format!("unknown access control item '{rest}'"),
            ));
        }
        Ok(permissions)
    }

    fn set_from_decl(decl: &PermissionsDecl, location: &str) -> OdResult<PermissionSet> {
        match decl {
            PermissionsDecl::Compact(compact) => Self::set_from_compact(compact, location),
            PermissionsDecl::Names(names) => {
                let mut permissions = PermissionSet::new();
                for name in names {
                    let permission = Permission::from_name(name).ok_or_else(|| {
                        OdError::schema(
                            location,
                            format!("unknown access control item '{name}'"),
                        )
                    })?;
                    permissions.insert(permission);
                }
                Ok(permissions)
            }
        }
    }
}

/* ============================================================================
   Definitions and collections
   ============================================================================ */

/// Normalized access control definition for a single group. After
/// normalization `default` always includes the override permissions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AccessDefinition {
    pub override_: Option<PermissionSet>,
    pub default: PermissionSet,
}

impl AccessDefinition {
    pub fn from_decl(decl: &AccessDefinitionDecl, location: &str) -> OdResult<Self> {
        let override_ = decl
            .override_
            .as_ref()
            .map(|value| Permission::set_from_decl(value, location))
            .transpose()?;
        let mut default = decl
            .default
            .as_ref()
            .map(|value| Permission::set_from_decl(value, location))
            .transpose()?
            .unwrap_or_default();
        if let Some(override_set) = &override_ {
            default.extend(override_set.iter().copied());
        }
        Ok(AccessDefinition { override_, default })
    }

    /// Merge a parent definition with a child definition.
    ///
    /// A child override dominates and replaces the inherited default;
    /// otherwise the defaults accumulate and the parent override carries
    /// through.
    pub fn merge(&self, child: &AccessDefinition) -> AccessDefinition {
        if let Some(override_set) = &child.override_ {
            AccessDefinition {
                override_: Some(override_set.clone()),
                default: override_set.clone(),
            }
        } else {
            let mut default = self.default.clone();
            default.extend(child.default.iter().copied());
            AccessDefinition {
                override_: self.override_.clone(),
                default,
            }
        }
    }
}

/// Normalized access control collection: group name to definition, in
/// declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AccessCollection {
    pub groups: IndexMap<String, AccessDefinition>,
}

impl AccessCollection {
    pub fn from_decl(decl: &AccessControlDecl, location: &str) -> OdResult<Self> {
        let mut groups = IndexMap::new();
        for (group_name, entry) in &decl.0 {
            let definition = match entry {
                AccessEntryDecl::Definition(definition) => {
                    AccessDefinition::from_decl(definition, location)?
                }
                AccessEntryDecl::Permissions(permissions) => AccessDefinition {
                    override_: None,
                    default: Permission::set_from_decl(permissions, location)?,
                },
            };
            groups.insert(group_name.clone(), definition);
        }
        Ok(AccessCollection { groups })
    }

    /// Merge two collections: groups only in one side carry through, shared
    /// groups merge per definition.
    pub fn merge(&self, child: &AccessCollection) -> AccessCollection {
        let mut groups = self.groups.clone();
        for (name, definition) in &child.groups {
            let merged = match groups.get(name) {
                Some(parent) => parent.merge(definition),
                None => definition.clone(),
            };
            groups.insert(name.clone(), merged);
        }
        AccessCollection { groups }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Numeric access group ids, assigned by insertion order of the root
/// collection.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AccessGroups {
    names: Vec<String>,
}

impl AccessGroups {
    pub fn from_root(collection: &AccessCollection) -> OdResult<Self> {
        if collection.groups.len() > MAX_ACCESS_GROUPS {
            return Err(OdError::TooManyAccessGroups {
                count: collection.groups.len(),
            });
        }
        Ok(AccessGroups {
            names: collection.groups.keys().cloned().collect(),
        })
    }

    /// (id, name) pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.names.iter().enumerate().map(|(id, name)| (id, name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compact(value: &str) -> AccessDefinition {
        AccessDefinition {
            override_: None,
            default: Permission::set_from_compact(value, "test").unwrap(),
        }
    }

    fn override_def(value: &str) -> AccessDefinition {
        let set = Permission::set_from_compact(value, "test").unwrap();
        AccessDefinition {
            override_: Some(set.clone()),
            default: set,
        }
    }

    #[test]
    fn compact_parsing() {
        let set = Permission::set_from_compact("RW", "test").unwrap();
        assert!(set.contains(&Permission::Read));
        assert!(set.contains(&Permission::Write));
        assert!(Permission::set_from_compact("RX", "test").is_err());
    }

    #[test]
    fn names_parsing_is_case_insensitive() {
        let decl = PermissionsDecl::Names(vec!["read".to_string(), "LOG_WRITE".to_string()]);
        let set = Permission::set_from_decl(&decl, "test").unwrap();
        assert!(set.contains(&Permission::Read));
        assert!(set.contains(&Permission::LogWrite));
    }

    #[test]
    fn child_override_dominates() {
        let parent = compact("R");
        let child = override_def("RW");
        let merged = parent.merge(&child);
        assert_eq!(merged.default, child.default);
        assert_eq!(merged.override_, child.override_);
    }

    #[test]
    fn defaults_accumulate_without_override() {
        let parent = compact("R");
        let child = compact("W");
        let merged = parent.merge(&child);
        assert!(merged.default.contains(&Permission::Read));
        assert!(merged.default.contains(&Permission::Write));
        assert!(merged.override_.is_none());
    }

    #[test]
    fn merge_is_associative_along_a_chain() {
        let root = override_def("R");
        let a = compact("W");
        let b = compact("R");

        let left = root.merge(&a).merge(&b);
        let right = root.merge(&a.merge(&b));
        assert_eq!(left.default, right.default);
    }

    #[test]
    fn group_id_budget() {
        let mut groups = IndexMap::new();
        for i in 0..MAX_ACCESS_GROUPS {
            groups.insert(format!("group_{i}"), AccessDefinition::default());
        }
        let collection = AccessCollection { groups: groups.clone() };
        assert_eq!(AccessGroups::from_root(&collection).unwrap().len(), 6);

        groups.insert("one_too_many".to_string(), AccessDefinition::default());
        let collection = AccessCollection { groups };
        assert!(matches!(
            AccessGroups::from_root(&collection),
            Err(OdError::TooManyAccessGroups { count: 7 })
        ));
    }
}
