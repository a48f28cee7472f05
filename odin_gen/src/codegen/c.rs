use crate::codegen::c_gen::{groups, objects, variables};
use crate::codegen::CGeneratorConfig;
use crate::od::context::ModelContext;
use crate::od::error::OdResult;

/// The two artifacts of the C backend.
#[derive(Debug)]
pub struct COutput {
    pub header: String,
    pub source: String,
}

/// Emits the C runtime: a header with the access group mapping and the
/// struct typedefs, and a source file with the statically initialized
/// backing variables, descriptor table and group tables.
pub struct CCodeGenerator<'a> {
    config: &'a CGeneratorConfig,
}

impl<'a> CCodeGenerator<'a> {
    pub fn new(config: &'a CGeneratorConfig) -> Self {
        Self { config }
    }

    pub fn emit(&self, context: &ModelContext, name: &str) -> OdResult<COutput> {
        context.ensure_frozen()?;
        Ok(COutput {
            header: self.emit_header(context)?,
            source: self.emit_source(context, name)?,
        })
    }

    fn emit_header(&self, context: &ModelContext) -> OdResult<String> {
        let mut header = String::from("#pragma once\n\n");
        header.push_str("#include <stdbool.h>\n");
        header.push_str("#include <stddef.h>\n");
        header.push_str("#include <stdint.h>\n\n");
        header.push_str("#include \"odin.h\"\n\n");

        if !context.access_groups.is_empty() {
            for (id, group_name) in context.access_groups.iter() {
                header.push_str(&format!(
                    "#define ODIN_ACCESS_{} ODIN_ACCESS_GROUP_{id}\n",
                    group_name.to_uppercase()
                ));
            }
            header.push('\n');
        }

        let variables_typedef =
            variables::emit_variables_typedef(context, &self.config.variables_type)?;
        if let Some(typedef) = &variables_typedef {
            header.push_str(typedef);
            header.push('\n');
        }

        header.push_str(&objects::emit_objects_typedef(
            context,
            &self.config.objects_type,
        )?);
        header.push('\n');

        if variables_typedef.is_some() {
            header.push_str(&format!(
                "extern {} {};\n",
                self.config.variables_type, self.config.variables_name
            ));
        }
        header.push_str(&format!(
            "extern {} {};\n",
            self.config.objects_type, self.config.objects_name
        ));
        header.push_str(&groups::emit_group_declarations(context));

        Ok(header)
    }

    fn emit_source(&self, context: &ModelContext, name: &str) -> OdResult<String> {
        let mut source = format!("#include \"{name}.h\"\n\n");
        source.push_str("#include <math.h>\n\n");

        if let Some(initialiser) = variables::emit_variables_initialiser(
            context,
            &self.config.variables_type,
            &self.config.variables_name,
        )? {
            source.push_str(&initialiser);
            source.push('\n');
        }

        source.push_str(&objects::emit_objects_initialiser(
            context,
            &self.config.objects_type,
            &self.config.objects_name,
        )?);
        source.push('\n');

        source.push_str(&groups::emit_group_descriptors(context)?);

        Ok(source)
    }
}
