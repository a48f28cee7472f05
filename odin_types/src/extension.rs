use serde_derive::{Deserialize, Serialize};

/* ============================================================================
   Extension Declarations
   ============================================================================ */

/* A behaviour modifier attached to a parameter, discriminated by `type`.
 *
 * Declaration order is preserved; the C lowering chains the declared
 * extensions into a singly-linked list.
 */
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExtensionDecl {
    /* Transforms a numeric parameter by `y = scale * x + offset` */
    IoMappedNumber(IoMappedNumberDecl),

    /* Opaque custom I/O ops provided by firmware */
    CustomIo(CustomIoDecl),

    /* Clamps a numeric parameter to a range */
    ValidationLimitValue(ValidationLimitDecl),

    /* Pairs a parameter with a named string codec */
    StringCodecReference(StringCodecReferenceDecl),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct IoMappedNumberDecl {
    /* Path of the parameter whose address is embedded in the transform */
    pub reference: String,

    #[serde(default = "default_scale")]
    pub scale: f64,

    #[serde(default)]
    pub offset: f64,
}

fn default_scale() -> f64 {
    1.0
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CustomIoDecl {
    /* Name of the ops table implemented in firmware */
    pub reference: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ValidationLimitDecl {
    /* Minimum value; unbounded below when unset */
    #[serde(default)]
    pub min: Option<f64>,

    /* Maximum value; unbounded above when unset */
    #[serde(default)]
    pub max: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct StringCodecReferenceDecl {
    /* Name of the codec */
    pub reference: String,
}
