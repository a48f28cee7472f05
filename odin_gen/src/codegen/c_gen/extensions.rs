use crate::codegen::c_gen::fmt_float;
use crate::od::context::ModelContext;
use crate::od::error::{OdError, OdResult};
use crate::od::extensions::Extension;
use crate::od::tree::ResolvedNode;

/// Lower a parameter's extension list into a chain of array-of-one
/// compound literals. Each literal's `.next` points at the previously
/// emitted one, so the returned head is the last declared extension.
pub fn extension_chain(
    context: &ModelContext,
    node: &ResolvedNode,
) -> OdResult<Option<String>> {
    let mut head: Option<String> = None;
    for extension in node.extensions() {
        head = Some(extension_literal(context, node, extension, head.as_deref())?);
    }
    Ok(head)
}

fn extension_literal(
    context: &ModelContext,
    node: &ResolvedNode,
    extension: &Extension,
    next: Option<&str>,
) -> OdResult<String> {
    let (type_macro, ops, parameters) = match extension {
        Extension::IoMappedNumber {
            reference,
            scale,
            offset,
        } => {
            let target = context
                .tree
                .find_parameter_by_object_name(reference)
                .ok_or_else(|| OdError::UnresolvedReference {
                    location: node.path.clone(),
                    reference: reference.clone(),
                })?;
            let target_ref = &context.tree.node(target).object_ref;
            (
                "ODIN_EXTENSION_TYPE_IO",
                "ODIN_extension_io_mapped_number_ops".to_string(),
                Some(format!(
                    "(mapped_number_parameters_t){{ .reference = &{target_ref}, .scale = {}, .offset = {} }}",
                    fmt_float(*scale),
                    fmt_float(*offset)
                )),
            )
        }

        Extension::CustomIo { reference } => {
            ("ODIN_EXTENSION_TYPE_IO", reference.clone(), None)
        }

        Extension::ValidationLimitValue { min, max } => (
            "ODIN_EXTENSION_TYPE_VALIDATE",
            "ODIN_validate_extension_ops".to_string(),
            Some(format!(
                "(range_parameter_t){{ .max = {}, .min = {} }}",
                fmt_float(max.unwrap_or(f64::INFINITY)),
                fmt_float(min.unwrap_or(f64::NEG_INFINITY))
            )),
        ),

        Extension::StringCodecReference { reference } => {
            ("ODIN_EXTENSION_TYPE_STRING_CODEC", reference.clone(), None)
        }
    };

    let data = match parameters {
        Some(parameters) => format!("&{parameters}"),
        None => "NULL".to_string(),
    };
    let next = next.unwrap_or("NULL");

    Ok(format!(
        "(ODIN_extension_t[]){{ {{\n\
         \t\t\t.type = {type_macro},\n\
         \t\t\t.ops = &{ops},\n\
         \t\t\t.data = {data},\n\
         \t\t\t.next = {next} }} }}"
    ))
}
