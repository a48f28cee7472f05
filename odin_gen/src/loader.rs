//! Loads a specification document and drives the build pipeline to a
//! frozen [`ModelContext`].

use indexmap::IndexMap;
use serde_derive::Deserialize;

use odin_types::{AccessControlDecl, CollectionDecl, ParameterDecl, TypeDecl};

use crate::codegen::GeneratorConfigurations;
use crate::od::access::{AccessCollection, AccessGroups};
use crate::od::context::ModelContext;
use crate::od::error::{OdError, OdResult};
use crate::od::registry::TypeRegistry;
use crate::od::tree::{ResolvedTree, ROOT_NAME};

/// The top-level specification document. Unknown fields are rejected.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct SpecDocument {
    /* Per-backend configuration */
    #[serde(default)]
    pub config: GeneratorConfigurations,

    /* Access control for the root group */
    #[serde(default)]
    pub access_control: AccessControlDecl,

    /* User type definitions, registered in declaration order */
    #[serde(default)]
    pub types: IndexMap<String, TypeDecl>,

    /* Named collections of parameters */
    #[serde(default)]
    pub collections: IndexMap<String, CollectionDecl>,

    /* The root group's children */
    pub parameters: IndexMap<String, ParameterDecl>,

    /* Bit width for the local ids of the root's children */
    pub id_space_shift: u32,
}

impl SpecDocument {
    pub fn from_yaml_str(input: &str) -> OdResult<Self> {
        serde_yml::from_str(input)
            .map_err(|error| OdError::schema("document", error.to_string()))
    }
}

/// A fully loaded specification: the frozen model plus the backend
/// configuration it was loaded with.
pub struct LoadedSpec {
    pub context: ModelContext,
    pub config: GeneratorConfigurations,
}

/// Drive the whole pipeline: register types, resolve the tree, set the
/// absolute C references, bind collections and freeze.
pub fn load(document: SpecDocument) -> OdResult<LoadedSpec> {
    let mut registry = TypeRegistry::with_builtins();
    for (name, decl) in &document.types {
        registry.register_user_type(name, decl)?;
    }

    let root_access = AccessCollection::from_decl(&document.access_control, ROOT_NAME)?;
    let access_groups = AccessGroups::from_root(&root_access)?;

    let mut tree = ResolvedTree::resolve(
        &document.parameters,
        document.id_space_shift,
        root_access,
        &registry,
    )?;
    tree.initialise_types(&document.config.c_generator.names());

    let mut context = ModelContext::new(registry, tree, access_groups);
    context.bind_collections(&document.collections)?;
    context.freeze()?;

    Ok(LoadedSpec {
        context,
        config: document.config,
    })
}

/// Parse and load a document from YAML text.
pub fn load_str(input: &str) -> OdResult<LoadedSpec> {
    load(SpecDocument::from_yaml_str(input)?)
}
