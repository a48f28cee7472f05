use thiserror::Error;

/// Result alias used across the generator core.
pub type OdResult<T> = Result<T, OdError>;

/// Errors produced while lowering an object dictionary specification.
///
/// Every variant carries the offending symbolic location (a parameter path
/// or a type name). The core never retries: the first error aborts the
/// build and no output is produced for the affected backend.
#[derive(Debug, Error)]
pub enum OdError {
    /// The document is well-formed YAML but violates the model rules.
    #[error("schema validation failed at '{location}': {message}")]
    SchemaValidation { location: String, message: String },

    /// A parameter or field names a type absent from the registry.
    #[error("unknown type '{type_name}' referenced by '{location}'")]
    UnknownType {
        type_name: String,
        location: String,
    },

    /// A scalar or user type was registered twice.
    #[error("type '{type_name}' is already registered")]
    TypeConflict { type_name: String },

    /// A local id is negative, does not fit its parent's bit field, or the
    /// cumulative shift exceeds the 32-bit id width.
    #[error("id space violation at '{location}': {message}")]
    IdSpaceViolation { location: String, message: String },

    /// Two distinct nodes computed the same global id.
    #[error("global id 0x{global_id:08X} is claimed by both '{first}' and '{second}'")]
    IdCollision {
        global_id: u32,
        first: String,
        second: String,
    },

    /// The root access control collection names more than six groups.
    #[error("at most 6 access groups are supported, the root collection defines {count}")]
    TooManyAccessGroups { count: usize },

    /// An extension or collection path does not resolve to a parameter.
    #[error("reference '{reference}' at '{location}' does not resolve")]
    UnresolvedReference {
        location: String,
        reference: String,
    },

    /// A backend was invoked against a model that is not frozen yet.
    #[error("pipeline misuse: {message}")]
    PipelineMisuse { message: String },
}

impl OdError {
    pub fn schema(location: impl Into<String>, message: impl Into<String>) -> Self {
        OdError::SchemaValidation {
            location: location.into(),
            message: message.into(),
        }
    }

    pub fn id_space(location: impl Into<String>, message: impl Into<String>) -> Self {
        OdError::IdSpaceViolation {
            location: location.into(),
            message: message.into(),
        }
    }
}
