//! Host-side client backend: emits one Python module containing a codec
//! class per data type and a nested class tree mirroring the groups, where
//! every leaf is an asynchronously readable entry object.

use std::fmt::Write;

use crate::codegen::PyGeneratorConfig;
use crate::od::context::ModelContext;
use crate::od::error::OdResult;
use crate::od::registry::{DataType, UserType};
use crate::od::tree::{NodeId, ResolvedKind, ResolvedNode};

pub fn emit(context: &ModelContext, config: &PyGeneratorConfig) -> OdResult<String> {
    context.ensure_frozen()?;

    let mut module = String::new();
    module.push_str("\"\"\"Generated object dictionary host interface.\"\"\"\n\n");
    module.push_str("import struct\n\n");
    let _ = writeln!(module, "from {} import (", config.interface_module);
    for import in [
        "BaseRootModel",
        "ConfiguredBaseModel",
        "GenericModel",
        "ODINArrayEntry",
        "ODINBytesEntry",
        "ODINEntry",
        "ODINStringEntry",
        "ODINVectorEntry",
        "TemplateInterface",
    ] {
        let _ = writeln!(module, "    {import},");
    }
    module.push_str(")\n\n\n");

    for (_, data_type) in context.types.iter() {
        match data_type.user() {
            None => module.push_str(&standard_type_class(data_type)),
            Some(user) => module.push_str(&composite_type_class(context, data_type, user)?),
        }
    }

    generate_class(
        &mut module,
        context,
        &config.root_class,
        context.tree.root(),
        0,
        &config.root_class,
    )?;

    Ok(module)
}

/* ============================================================================
   Codec classes
   ============================================================================ */

fn standard_type_class(data_type: &DataType) -> String {
    let class = &data_type.py_typename;
    let primitive = data_type
        .scalar_kind()
        .map(|kind| kind.python_primitive())
        .unwrap_or("int");
    let format = &data_type.struct_format;

    let mut output = String::new();
    let _ = writeln!(output, "class {class}(GenericModel, {primitive}):");
    let _ = writeln!(output, "    def encode_to_bytes(self) -> bytes:");
    let _ = writeln!(output, "        return struct.pack(");
    let _ = writeln!(output, "            '<{format}',");
    let _ = writeln!(output, "            self,");
    let _ = writeln!(output, "        )\n");
    let _ = writeln!(output, "    @classmethod");
    let _ = writeln!(
        output,
        "    def decode_from_bytes(cls, data: bytes) -> \"{class}\":"
    );
    let _ = writeln!(output, "        return cls(");
    let _ = writeln!(output, "            *struct.unpack('<{format}', data)");
    output.push_str("        )\n\n\n");
    output
}

/// A pydantic-backed codec class for a user type: typed fields plus a
/// recursive encode/decode pair over the packed descriptor. Nested custom
/// fields travel as opaque byte runs on the wire and are decoded by
/// slicing.
fn composite_type_class(
    context: &ModelContext,
    data_type: &DataType,
    user: &UserType,
) -> OdResult<String> {
    let class = &data_type.py_typename;
    let mut output = format!("class {class}(GenericModel, ConfiguredBaseModel):\n");

    for (field_name, field) in &user.fields {
        let base = context.types.lookup(&field.type_name)?;
        let annotation = python_value_typename(base);
        if field.elements == 1 {
            let _ = writeln!(output, "    {field_name}: {annotation}");
        } else {
            let repeated = vec![annotation.to_string(); field.elements].join(", ");
            let _ = writeln!(output, "    {field_name}: tuple[{repeated}]");
        }
    }

    // encode_to_bytes
    let _ = writeln!(output, "\n    def encode_to_bytes(self) -> bytes:");
    let _ = writeln!(output, "        packed_data = struct.pack(");
    let _ = writeln!(output, "            '<{}',", data_type.struct_format);
    for (field_name, field) in &user.fields {
        let base = context.types.lookup(&field.type_name)?;
        if field.is_custom {
            if field.elements == 1 {
                let _ = writeln!(
                    output,
                    "            {}.encode_to_bytes(self.{field_name}),",
                    base.py_typename
                );
            } else {
                let _ = writeln!(
                    output,
                    "            b\"\".join({}.encode_to_bytes(v) for v in self.{field_name}),",
                    base.py_typename
                );
            }
        } else if field.elements == 1 {
            let _ = writeln!(output, "            self.{field_name},");
        } else {
            let _ = writeln!(output, "            *self.{field_name},");
        }
    }
    output.push_str("        )\n        return packed_data\n");

    // decode_from_bytes
    let _ = writeln!(output, "\n    @classmethod");
    let _ = writeln!(
        output,
        "    def decode_from_bytes(cls, data: bytes) -> \"{class}\":"
    );
    let _ = writeln!(
        output,
        "        unpacked_data = struct.unpack('<{}', data)",
        data_type.struct_format
    );
    let _ = writeln!(output, "        return cls(");
    let mut index = 0usize;
    for (field_name, field) in &user.fields {
        let base = context.types.lookup(&field.type_name)?;
        if field.is_custom {
            // One opaque byte run per custom field, sliced per element.
            if field.elements == 1 {
                let _ = writeln!(
                    output,
                    "            {field_name}={}.decode_from_bytes(unpacked_data[{index}]),",
                    base.py_typename
                );
            } else {
                let _ = writeln!(output, "            {field_name}=tuple(");
                let _ = writeln!(
                    output,
                    "                {}.decode_from_bytes(unpacked_data[{index}][i * {size} : (i + 1) * {size}])",
                    base.py_typename,
                    size = field.base_size,
                );
                let _ = writeln!(output, "                for i in range({})", field.elements);
                let _ = writeln!(output, "            ),");
            }
            index += 1;
        } else if field.elements == 1 {
            let _ = writeln!(output, "            {field_name}=unpacked_data[{index}],");
            index += 1;
        } else {
            let _ = writeln!(
                output,
                "            {field_name}=tuple(unpacked_data[{index}:{}]),",
                index + field.elements
            );
            index += field.elements;
        }
    }
    output.push_str("        )\n\n\n");

    Ok(output)
}

fn python_value_typename(data_type: &DataType) -> &str {
    match data_type.scalar_kind() {
        Some(kind) => kind.python_primitive(),
        None => &data_type.py_typename,
    }
}

/* ============================================================================
   Group class tree
   ============================================================================ */

fn generate_class(
    output: &mut String,
    context: &ModelContext,
    class_name: &str,
    group: NodeId,
    level: usize,
    parent_model: &str,
) -> OdResult<()> {
    let indent = "    ".repeat(level);
    let children = context.tree.children(group);

    let _ = writeln!(output, "{indent}class {class_name}(BaseRootModel):");
    let _ = writeln!(output, "{indent}    class Model(ConfiguredBaseModel):");

    for &child in children {
        let node = context.tree.node(child);
        let annotation = model_annotation(context, node, parent_model)?;
        let _ = writeln!(output, "{indent}        {}: {annotation}", node.name);
    }
    let _ = writeln!(output, "{indent}        pass\n");

    // Nested group classes come before the constructor.
    for &child in children {
        let node = context.tree.node(child);
        if node.is_group() {
            let nested_class = to_camel_case(&node.name);
            generate_class(
                output,
                context,
                &nested_class,
                child,
                level + 1,
                &format!("{parent_model}.{nested_class}"),
            )?;
        }
    }

    let _ = writeln!(
        output,
        "{indent}    def __init__(self, interface: TemplateInterface):"
    );
    for &child in children {
        let node = context.tree.node(child);
        if node.is_group() {
            let _ = writeln!(
                output,
                "{indent}        self.{} = self.{}(interface)",
                node.name,
                to_camel_case(&node.name)
            );
        } else {
            let _ = writeln!(
                output,
                "{indent}        self.{} = {}",
                node.name,
                entry_constructor(context, node)?
            );
        }
    }

    let _ = writeln!(output, "{indent}        self._children = {{");
    for &child in children {
        let node = context.tree.node(child);
        let _ = writeln!(
            output,
            "{indent}            '{0}': self.{0},",
            node.name
        );
    }
    let _ = writeln!(output, "{indent}        }}");
    let _ = writeln!(output, "{indent}        super().__init__(interface)\n");

    // One concurrent read over every child through the injected transport.
    let _ = writeln!(output, "{indent}    async def read(self) -> Model:");
    let _ = writeln!(output, "{indent}        data = await self.read_all()");
    let _ = writeln!(output, "{indent}        return self.Model(");
    for &child in children {
        let node = context.tree.node(child);
        let _ = writeln!(
            output,
            "{indent}            {0}=data['{0}'],",
            node.name
        );
    }
    let _ = writeln!(output, "{indent}        )\n");

    Ok(())
}

fn model_annotation(
    context: &ModelContext,
    node: &ResolvedNode,
    parent_model: &str,
) -> OdResult<String> {
    let annotation = match &node.kind {
        ResolvedKind::Group(_) => {
            format!("'{parent_model}.{}.Model'", to_camel_case(&node.name))
        }
        ResolvedKind::Parameter(parameter) => {
            let resolved = context.types.lookup(&parameter.type_name)?;
            python_value_typename(resolved).to_string()
        }
        ResolvedKind::Array(array) => {
            let resolved = context.types.lookup(&array.type_name)?;
            if resolved.c_typename == "uint8_t" {
                "bytes".to_string()
            } else {
                format!("list[{}]", python_value_typename(resolved))
            }
        }
        ResolvedKind::Vector(vector) => {
            let resolved = context.types.lookup(&vector.type_name)?;
            if resolved.c_typename == "char" {
                "str".to_string()
            } else if resolved.c_typename == "uint8_t" {
                "bytes".to_string()
            } else {
                format!("list[{}]", python_value_typename(resolved))
            }
        }
    };
    Ok(annotation)
}

fn entry_constructor(context: &ModelContext, node: &ResolvedNode) -> OdResult<String> {
    let constructor = match &node.kind {
        ResolvedKind::Parameter(parameter) => {
            let resolved = context.types.lookup(&parameter.type_name)?;
            format!(
                "ODINEntry[{0}](0x{1:08X}, cls={0}, interface=interface)",
                resolved.py_typename, node.global_id
            )
        }

        ResolvedKind::Array(array) => {
            let resolved = context.types.lookup(&array.type_name)?;
            if resolved.c_typename == "uint8_t" {
                format!(
                    "ODINBytesEntry(0x{:08X}, interface=interface, max_length={}, fixed_length=True)",
                    node.global_id, array.elements
                )
            } else {
                format!(
                    "ODINArrayEntry[{0}](0x{1:08X}, cls={0}, elements={2}, element_size={3}, interface=interface)",
                    resolved.py_typename, node.global_id, array.elements, resolved.size
                )
            }
        }

        ResolvedKind::Vector(vector) => {
            let resolved = context.types.lookup(&vector.type_name)?;
            if resolved.c_typename == "char" {
                format!(
                    "ODINStringEntry(0x{:08X}, interface=interface, max_length={})",
                    node.global_id, vector.max_elements
                )
            } else if resolved.c_typename == "uint8_t" {
                format!(
                    "ODINBytesEntry(0x{:08X}, interface=interface, max_length={}, fixed_length=False)",
                    node.global_id, vector.max_elements
                )
            } else {
                format!(
                    "ODINVectorEntry[{0}](0x{1:08X}, cls={0}, max_elements={2}, element_size={3}, interface=interface)",
                    resolved.py_typename, node.global_id, vector.max_elements, resolved.size
                )
            }
        }

        ResolvedKind::Group(_) => unreachable!("groups are instantiated, not entries"),
    };
    Ok(constructor)
}

fn to_camel_case(name: &str) -> String {
    name.split('_')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}
