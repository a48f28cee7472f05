//! Reference document backend: a Markdown document with one section per
//! group and a cross-linked table of the group's members.

use std::fmt::Write;

use crate::codegen::DocGeneratorConfig;
use crate::od::context::ModelContext;
use crate::od::error::OdResult;
use crate::od::tree::{NodeId, ResolvedKind};

pub fn emit(context: &ModelContext, config: &DocGeneratorConfig) -> OdResult<String> {
    context.ensure_frozen()?;

    let mut document = format!("# {}\n", config.title);

    let mut groups = vec![context.tree.root()];
    groups.extend(
        context
            .tree
            .descendants()
            .into_iter()
            .filter(|&id| context.tree.node(id).is_group()),
    );

    for group in groups {
        document.push_str(&group_section(context, group)?);
    }

    Ok(document)
}

fn group_section(context: &ModelContext, group: NodeId) -> OdResult<String> {
    let node = context.tree.node(group);
    let title = title_case(&node.name);

    let mut section = format!("\n## {title}\n\n");
    let _ = writeln!(section, "{}", node.resolved_description());

    if let Some(parent) = node.parent {
        let parent_name = &context.tree.node(parent).name;
        let _ = writeln!(
            section,
            "\n[Go to parent](#{})",
            anchor(&title_case(parent_name))
        );
    }

    section.push_str("\n| Name | Type | ID | Description |\n");
    section.push_str("|---|---|---|---|\n");

    for &child in context.tree.children(group) {
        let child_node = context.tree.node(child);
        let (name_cell, kind_cell) = match &child_node.kind {
            ResolvedKind::Group(_) => (
                format!(
                    "[{}](#{})",
                    child_node.name,
                    anchor(&title_case(&child_node.name))
                ),
                "group".to_string(),
            ),
            ResolvedKind::Parameter(parameter) => {
                (child_node.name.clone(), parameter.type_name.clone())
            }
            ResolvedKind::Array(array) => (
                child_node.name.clone(),
                format!("{}[{}]", array.type_name, array.elements),
            ),
            ResolvedKind::Vector(vector) => (
                child_node.name.clone(),
                format!("{}[<= {}]", vector.type_name, vector.max_elements),
            ),
        };

        let _ = writeln!(
            section,
            "| {name_cell} | {kind_cell} | 0x{:08X} | {} |",
            child_node.global_id,
            child_node.resolved_description().replace('|', "\\|")
        );
    }

    Ok(section)
}

fn title_case(name: &str) -> String {
    name.split('_')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn anchor(title: &str) -> String {
    title.to_lowercase().replace(' ', "-")
}
