//! The semantic model: type registry, resolved parameter tree, access
//! control, extensions and the frozen model context consumed by backends.

pub mod access;
pub mod context;
pub mod error;
pub mod extensions;
pub mod registry;
pub mod tree;

pub use access::{AccessCollection, AccessDefinition, AccessGroups, Permission, PermissionSet};
pub use context::{Collection, ModelContext, PipelineState};
pub use error::{OdError, OdResult};
pub use extensions::Extension;
pub use registry::{DataType, DataTypeKind, FieldModel, ScalarKind, TypeRegistry, UserType};
pub use tree::{CNames, NodeId, ResolvedKind, ResolvedNode, ResolvedTree};
