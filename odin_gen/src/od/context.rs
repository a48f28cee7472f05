use indexmap::IndexMap;

use odin_types::CollectionDecl;

use crate::od::access::AccessGroups;
use crate::od::error::{OdError, OdResult};
use crate::od::registry::TypeRegistry;
use crate::od::tree::{NodeId, ResolvedTree};

/// Fixed id space shift of a collection group.
pub const COLLECTION_ID_SPACE_SHIFT: u32 = 8;

/* ============================================================================
   Collections
   ============================================================================ */

/// A named flat view over the tree. Members are borrowed references into
/// the arena; they keep their original global ids. Collections live in a
/// namespace of their own and never contribute to the id tree.
#[derive(Debug)]
pub struct Collection {
    pub name: String,
    pub description: Option<String>,
    pub local_id: u32,
    pub id_space_shift: u32,
    pub members: Vec<NodeId>,
}

impl Collection {
    fn build(name: &str, decl: &CollectionDecl, tree: &ResolvedTree) -> OdResult<Self> {
        // First-seen order, duplicates across patterns dropped.
        let mut members: IndexMap<NodeId, ()> = IndexMap::new();

        for pattern in &decl.children {
            let matches = tree.find_parameters_by_object_name(pattern);
            if matches.is_empty() {
                return Err(OdError::UnresolvedReference {
                    location: format!("collections.{name}"),
                    reference: pattern.clone(),
                });
            }
            for id in matches {
                members.entry(id).or_insert(());
            }
        }

        Ok(Collection {
            name: name.to_string(),
            description: decl.description.clone(),
            local_id: 0,
            id_space_shift: COLLECTION_ID_SPACE_SHIFT,
            members: members.into_keys().collect(),
        })
    }
}

/* ============================================================================
   Model context
   ============================================================================ */

/// Build progress of the model. Transitions are monotonic; backends only
/// ever observe [`PipelineState::Frozen`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineState {
    Resolved,
    CollectionsBound,
    Frozen,
}

/// The frozen model handed to every backend: the type registry, the
/// resolved tree, the bound collections and the root access group ids.
///
/// The earlier pipeline stages (registering types, building and resolving
/// the tree) are enforced by construction: a context cannot exist without
/// a resolved tree. The remaining transitions are tracked explicitly so a
/// backend invoked too early fails instead of reading a half-built model.
#[derive(Debug)]
pub struct ModelContext {
    pub types: TypeRegistry,
    pub tree: ResolvedTree,
    pub collections: IndexMap<String, Collection>,
    pub access_groups: AccessGroups,
    state: PipelineState,
}

impl ModelContext {
    pub fn new(types: TypeRegistry, tree: ResolvedTree, access_groups: AccessGroups) -> Self {
        ModelContext {
            types,
            tree,
            collections: IndexMap::new(),
            access_groups,
            state: PipelineState::Resolved,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Resolve the declared collections against the tree.
    pub fn bind_collections(
        &mut self,
        decls: &IndexMap<String, CollectionDecl>,
    ) -> OdResult<()> {
        if self.state != PipelineState::Resolved {
            return Err(OdError::PipelineMisuse {
                message: format!(
                    "collections can only be bound once, right after resolve (state: {:?})",
                    self.state
                ),
            });
        }

        for (name, decl) in decls {
            let collection = Collection::build(name, decl, &self.tree)?;
            self.collections.insert(name.clone(), collection);
        }

        self.state = PipelineState::CollectionsBound;
        Ok(())
    }

    /// Seal the model for backend consumption.
    pub fn freeze(&mut self) -> OdResult<()> {
        if self.state == PipelineState::Frozen {
            return Err(OdError::PipelineMisuse {
                message: "the model is already frozen".to_string(),
            });
        }
        self.state = PipelineState::Frozen;
        Ok(())
    }

    /// Backends call this before reading anything.
    pub fn ensure_frozen(&self) -> OdResult<()> {
        if self.state != PipelineState::Frozen {
            return Err(OdError::PipelineMisuse {
                message: format!("backend invoked on a non-frozen model (state: {:?})", self.state),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::od::access::AccessCollection;
    use odin_types::{ParameterDecl, ScalarParameterDecl};

    fn context() -> ModelContext {
        let registry = TypeRegistry::with_builtins();
        let mut children = IndexMap::new();
        children.insert(
            "speed".to_string(),
            ParameterDecl::Parameter(ScalarParameterDecl {
                local_id: 1,
                primitive: "u16".to_string(),
                description: None,
                access_control: Default::default(),
                default: None,
                reference: None,
                extensions: Vec::new(),
            }),
        );
        let tree =
            ResolvedTree::resolve(&children, 8, AccessCollection::default(), &registry).unwrap();
        ModelContext::new(registry, tree, AccessGroups::default())
    }

    #[test]
    fn backend_rejects_non_frozen_model() {
        let ctx = context();
        assert!(matches!(
            ctx.ensure_frozen(),
            Err(OdError::PipelineMisuse { .. })
        ));
    }

    #[test]
    fn freeze_is_monotonic() {
        let mut ctx = context();
        ctx.freeze().unwrap();
        assert!(ctx.ensure_frozen().is_ok());
        assert!(matches!(ctx.freeze(), Err(OdError::PipelineMisuse { .. })));

        let mut decls = IndexMap::new();
        decls.insert("late".to_string(), CollectionDecl::default());
        assert!(matches!(
            ctx.bind_collections(&decls),
            Err(OdError::PipelineMisuse { .. })
        ));
    }

    #[test]
    fn collections_borrow_members_in_first_seen_order() {
        let mut ctx = context();
        let mut decls = IndexMap::new();
        decls.insert(
            "all".to_string(),
            CollectionDecl {
                description: Some("everything".to_string()),
                children: vec!["*".to_string(), "speed".to_string()],
            },
        );
        ctx.bind_collections(&decls).unwrap();

        let collection = &ctx.collections["all"];
        assert_eq!(collection.members.len(), 1);
        assert_eq!(collection.local_id, 0);
        assert_eq!(collection.id_space_shift, COLLECTION_ID_SPACE_SHIFT);
    }

    #[test]
    fn unresolved_collection_pattern_fails() {
        let mut ctx = context();
        let mut decls = IndexMap::new();
        decls.insert(
            "broken".to_string(),
            CollectionDecl {
                description: None,
                children: vec!["missing.path".to_string()],
            },
        );
        assert!(matches!(
            ctx.bind_collections(&decls),
            Err(OdError::UnresolvedReference { .. })
        ));
    }
}
