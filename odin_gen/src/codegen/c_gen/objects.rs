use crate::codegen::c_gen::extensions::extension_chain;
use crate::codegen::c_gen::{
    access_expression, element_type_macro, name_and_description, ODIN_PARAMETER_TYPE,
    ODIN_TYPE_ARRAY, ODIN_TYPE_PARAMETER, ODIN_TYPE_VECTOR,
};
use crate::od::context::ModelContext;
use crate::od::error::OdResult;
use crate::od::tree::{NodeId, ResolvedKind, ResolvedNode};

const INDENT: &str = "    ";

/// Typedef of the descriptor objects struct mirroring the group tree.
pub fn emit_objects_typedef(context: &ModelContext, objects_type: &str) -> OdResult<String> {
    let body = struct_members(context, context.tree.root(), 1);
    Ok(format!("typedef struct\n{{\n{body}}} {objects_type};\n"))
}

fn struct_members(context: &ModelContext, group: NodeId, depth: usize) -> String {
    let indent = INDENT.repeat(depth);
    let mut body = String::new();

    for &child in context.tree.children(group) {
        let node = context.tree.node(child);
        match &node.kind {
            ResolvedKind::Group(_) => {
                let inner = struct_members(context, child, depth + 1);
                body.push_str(&format!(
                    "{indent}struct\n{indent}{{\n{inner}{indent}}} {};\n",
                    node.name
                ));
            }
            _ => {
                body.push_str(&format!("{indent}{ODIN_PARAMETER_TYPE} {};\n", node.name));
            }
        }
    }

    body
}

/// The statically initialized descriptor table.
pub fn emit_objects_initialiser(
    context: &ModelContext,
    objects_type: &str,
    objects_name: &str,
) -> OdResult<String> {
    let body = group_initialiser(context, context.tree.root(), 1)?;
    Ok(format!("{objects_type} {objects_name} = {{\n{body}}};\n"))
}

fn group_initialiser(context: &ModelContext, group: NodeId, depth: usize) -> OdResult<String> {
    let indent = INDENT.repeat(depth);
    let mut body = String::new();

    for &child in context.tree.children(group) {
        let node = context.tree.node(child);
        match &node.kind {
            ResolvedKind::Group(_) => {
                let inner = group_initialiser(context, child, depth + 1)?;
                body.push_str(&format!("{indent}.{} = {{\n{inner}{indent}}},\n", node.name));
            }
            _ => {
                let value = parameter_descriptor(context, node, depth + 1)?;
                body.push_str(&format!(
                    "{indent}.{} = {value}, /* index: 0x{:08X} */\n",
                    node.name, node.global_id
                ));
            }
        }
    }

    Ok(body)
}

/// The descriptor compound value of one leaf parameter.
fn parameter_descriptor(
    context: &ModelContext,
    node: &ResolvedNode,
    depth: usize,
) -> OdResult<String> {
    let indent = INDENT.repeat(depth);
    let inner = INDENT.repeat(depth + 1);

    let (odin_type, type_name, void, max_elements) = match &node.kind {
        ResolvedKind::Parameter(parameter) => (
            ODIN_TYPE_PARAMETER,
            parameter.type_name.as_str(),
            parameter.void,
            None,
        ),
        ResolvedKind::Array(array) => (
            ODIN_TYPE_ARRAY,
            array.type_name.as_str(),
            false,
            Some(array.elements),
        ),
        ResolvedKind::Vector(vector) => (
            ODIN_TYPE_VECTOR,
            vector.type_name.as_str(),
            false,
            Some(vector.max_elements),
        ),
        ResolvedKind::Group(_) => unreachable!("groups have no parameter descriptor"),
    };

    let resolved = context.types.lookup(type_name)?;

    // External references replace the internal storage address.
    let data = if void {
        "NULL".to_string()
    } else {
        match node.storage_reference() {
            Some(reference) => format!("&{reference}"),
            None => format!("&{}", node.variable_ref),
        }
    };

    let extension = match &node.kind {
        // Extension chains are only attached to plain parameters.
        ResolvedKind::Parameter(_) => extension_chain(context, node)?,
        _ => None,
    };
    let extension = extension.unwrap_or_else(|| "NULL".to_string());

    let mut fields = vec![
        format!(".odin_type = {odin_type}"),
        format!(".element_type = {}", element_type_macro(&resolved.c_typename)),
        format!(".flags = {}", access_expression(&node.access)),
        format!(".global_index = 0x{:08X}", node.global_id),
        format!(".element_size = sizeof({})", resolved.c_typename),
        format!(".data = {data}"),
        format!(
            ".name_and_description = {}",
            name_and_description(&node.name, node.resolved_description())
        ),
        format!(".extension = {extension}"),
    ];
    if let Some(max_elements) = max_elements {
        fields.push(format!(".max_elements = {max_elements}"));
    }

    let body: Vec<String> = fields
        .into_iter()
        .map(|field| format!("{inner}{field},"))
        .collect();
    Ok(format!("{{\n{}\n{indent}}}", body.join("\n")))
}
