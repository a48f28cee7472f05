use crate::codegen::c_gen::{
    name_and_description, ODIN_PARAMETER_GROUP_TYPE, ODIN_TYPE_GROUP,
};
use crate::od::context::{Collection, ModelContext};
use crate::od::error::OdResult;
use crate::od::tree::{NodeId, ResolvedKind};

const INDENT: &str = "    ";

/// Declarations of every group descriptor, for the header. Descriptors
/// reference each other, so all of them are declared up front.
pub fn emit_group_declarations(context: &ModelContext) -> String {
    let mut declarations = String::new();
    for reference in group_references(context) {
        declarations.push_str(&format!(
            "extern {ODIN_PARAMETER_GROUP_TYPE} {reference};\n"
        ));
    }
    for collection in context.collections.values() {
        declarations.push_str(&format!(
            "extern {ODIN_PARAMETER_GROUP_TYPE} collection_{};\n",
            collection.name
        ));
    }
    declarations
}

/// Definitions of all group descriptors, root first, then the collection
/// groups.
pub fn emit_group_descriptors(context: &ModelContext) -> OdResult<String> {
    let mut output = String::new();

    emit_group(context, context.tree.root(), &mut output)?;

    for collection in context.collections.values() {
        output.push('\n');
        output.push_str(&emit_collection(context, collection));
    }

    Ok(output)
}

fn group_references(context: &ModelContext) -> Vec<String> {
    let mut references = Vec::new();
    collect_group_references(context, context.tree.root(), &mut references);
    references
}

fn collect_group_references(context: &ModelContext, id: NodeId, references: &mut Vec<String>) {
    if let ResolvedKind::Group(group) = &context.tree.node(id).kind {
        references.push(group.group_ref.clone());
        for &child in &group.children {
            collect_group_references(context, child, references);
        }
    }
}

fn emit_group(context: &ModelContext, id: NodeId, output: &mut String) -> OdResult<()> {
    let node = context.tree.node(id);
    let ResolvedKind::Group(group) = &node.kind else {
        return Ok(());
    };

    let mut members = Vec::with_capacity(group.children.len());
    for &child in &group.children {
        let child_node = context.tree.node(child);
        let reference = match &child_node.kind {
            ResolvedKind::Group(child_group) => &child_group.group_ref,
            _ => &child_node.object_ref,
        };
        members.push(format!("&{reference}"));
    }

    output.push_str(&descriptor(
        &group.group_ref,
        &node.name,
        node.resolved_description(),
        node.global_id,
        group.id_space_shift,
        &members,
    ));

    for &child in &group.children {
        if context.tree.node(child).is_group() {
            output.push('\n');
            emit_group(context, child, output)?;
        }
    }

    Ok(())
}

/// Collections are descriptor groups in a namespace of their own: global
/// index 0, shift 0, members borrowed from the tree.
fn emit_collection(context: &ModelContext, collection: &Collection) -> String {
    let members: Vec<String> = collection
        .members
        .iter()
        .map(|&member| {
            let node = context.tree.node(member);
            match &node.kind {
                ResolvedKind::Group(group) => format!("&{}", group.group_ref),
                _ => format!("&{}", node.object_ref),
            }
        })
        .collect();

    descriptor(
        &format!("collection_{}", collection.name),
        &collection.name,
        collection.description.as_deref().unwrap_or("No description"),
        0,
        0,
        &members,
    )
}

fn descriptor(
    variable: &str,
    name: &str,
    description: &str,
    global_id: u32,
    shift: u32,
    members: &[String],
) -> String {
    let parameters = if members.is_empty() {
        "NULL".to_string()
    } else {
        format!("(const void *[]){{ {} }}", members.join(", "))
    };

    format!(
        "{ODIN_PARAMETER_GROUP_TYPE} {variable} = {{ /* index: 0x{global_id:08X} */\n\
         {INDENT}.name_and_description = {},\n\
         {INDENT}.odin_type = {ODIN_TYPE_GROUP},\n\
         {INDENT}.global_index = 0x{global_id:08X},\n\
         {INDENT}.shift = {shift},\n\
         {INDENT}.count = {},\n\
         {INDENT}.parameters = {parameters},\n\
         }};\n",
        name_and_description(name, description),
        members.len(),
    )
}
