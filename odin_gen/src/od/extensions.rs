use odin_types::ExtensionDecl;

/* ============================================================================
   Resolved Extensions
   ============================================================================ */

/// A resolved behaviour modifier attached to a parameter. The list order is
/// the declaration order; implicit extensions are appended at the end.
#[derive(Debug, Clone, PartialEq)]
pub enum Extension {
    /// Transforms a numeric parameter by `y = scale * x + offset`. The
    /// reference names another parameter whose descriptor address is
    /// embedded in the generated transform.
    IoMappedNumber {
        reference: String,
        scale: f64,
        offset: f64,
    },

    /// Opaque custom I/O ops; the reference names a firmware ops table.
    CustomIo { reference: String },

    /// Clamps to a numeric range; unset bounds are unbounded.
    ValidationLimitValue { min: Option<f64>, max: Option<f64> },

    /// Pairs the parameter with a named string codec.
    StringCodecReference { reference: String },
}

impl Extension {
    /// The parameter path this extension points at, when it points at one.
    ///
    /// Only the mapped-number transform references another parameter; the
    /// custom I/O and string codec references name firmware symbols.
    pub fn parameter_reference(&self) -> Option<&str> {
        match self {
            Extension::IoMappedNumber { reference, .. } => Some(reference),
            _ => None,
        }
    }
}

impl From<&ExtensionDecl> for Extension {
    fn from(decl: &ExtensionDecl) -> Self {
        match decl {
            ExtensionDecl::IoMappedNumber(inner) => Extension::IoMappedNumber {
                reference: inner.reference.clone(),
                scale: inner.scale,
                offset: inner.offset,
            },
            ExtensionDecl::CustomIo(inner) => Extension::CustomIo {
                reference: inner.reference.clone(),
            },
            ExtensionDecl::ValidationLimitValue(inner) => Extension::ValidationLimitValue {
                min: inner.min,
                max: inner.max,
            },
            ExtensionDecl::StringCodecReference(inner) => Extension::StringCodecReference {
                reference: inner.reference.clone(),
            },
        }
    }
}
