pub mod c;
pub mod c_gen;
pub mod db;
pub mod doc;
pub mod py;

use std::fs;
use std::path::Path;

use serde_derive::Deserialize;

use crate::od::context::ModelContext;
use crate::od::tree::CNames;

/// Default base name of the emitted artifacts.
pub const DEFAULT_NAME: &str = "OD";

/* ============================================================================
   Targets
   ============================================================================ */

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum GeneratorTarget {
    /* C runtime: header and source */
    C,
    /* Typed host-side client */
    Py,
    /* Machine-readable object dictionary database */
    Db,
    /* Human-readable reference document */
    Doc,
}

impl GeneratorTarget {
    pub fn all() -> Vec<GeneratorTarget> {
        vec![
            GeneratorTarget::C,
            GeneratorTarget::Py,
            GeneratorTarget::Db,
            GeneratorTarget::Doc,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            GeneratorTarget::C => "c",
            GeneratorTarget::Py => "py",
            GeneratorTarget::Db => "db",
            GeneratorTarget::Doc => "doc",
        }
    }
}

/* ============================================================================
   Configuration
   ============================================================================ */

/// Per-backend configuration from the document's `config` block. Every
/// field is optional and falls back to the backend defaults.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields, default)]
pub struct GeneratorConfigurations {
    pub c_generator: CGeneratorConfig,
    pub python_generator: PyGeneratorConfig,
    pub doc_generator: DocGeneratorConfig,
    pub db_generator: DbGeneratorConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields, default)]
pub struct CGeneratorConfig {
    /* Typedef name of the descriptor objects struct */
    pub objects_type: String,
    /* Variable name of the descriptor objects struct */
    pub objects_name: String,
    /* Typedef name of the backing variables struct */
    pub variables_type: String,
    /* Variable name of the backing variables struct */
    pub variables_name: String,
    /* Prefix of the emitted group descriptor variables */
    pub groups_name: String,
}

impl Default for CGeneratorConfig {
    fn default() -> Self {
        CGeneratorConfig {
            objects_type: "OD_objects_t".to_string(),
            objects_name: "OD_objects".to_string(),
            variables_type: "variables_t".to_string(),
            variables_name: "variables".to_string(),
            groups_name: "OD_groups".to_string(),
        }
    }
}

impl CGeneratorConfig {
    pub fn names(&self) -> CNames {
        CNames {
            objects_type: self.objects_type.clone(),
            objects_name: self.objects_name.clone(),
            variables_type: self.variables_type.clone(),
            variables_name: self.variables_name.clone(),
            groups_name: self.groups_name.clone(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields, default)]
pub struct PyGeneratorConfig {
    /* Name of the generated root client class */
    pub root_class: String,
    /* Module providing the entry and interface runtime classes */
    pub interface_module: String,
}

impl Default for PyGeneratorConfig {
    fn default() -> Self {
        PyGeneratorConfig {
            root_class: "ODIN".to_string(),
            interface_module: "odin_interface.base_types".to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields, default)]
pub struct DbGeneratorConfig {
    pub name: String,
    pub description: String,
    /* Indentation of the emitted JSON; compact when unset */
    pub indent: Option<usize>,
}

impl Default for DbGeneratorConfig {
    fn default() -> Self {
        DbGeneratorConfig {
            name: "ODIN".to_string(),
            description: "Generic description".to_string(),
            indent: Some(4),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields, default)]
pub struct DocGeneratorConfig {
    pub title: String,
}

impl Default for DocGeneratorConfig {
    fn default() -> Self {
        DocGeneratorConfig {
            title: "ODIN Object Dictionary".to_string(),
        }
    }
}

/* ============================================================================
   Dispatch
   ============================================================================ */

/// Run one backend against a frozen model and write its artifacts into
/// `output_dir`. The artifact content is built in memory first; nothing is
/// written when the backend fails.
pub fn generate(
    name: &str,
    context: &ModelContext,
    config: &GeneratorConfigurations,
    output_dir: &Path,
    target: GeneratorTarget,
) -> anyhow::Result<()> {
    match target {
        GeneratorTarget::C => {
            let generator = c::CCodeGenerator::new(&config.c_generator);
            let output = generator.emit(context, name)?;
            fs::write(output_dir.join(format!("{name}.h")), output.header)?;
            fs::write(output_dir.join(format!("{name}.c")), output.source)?;
        }
        GeneratorTarget::Py => {
            let module = py::emit(context, &config.python_generator)?;
            fs::write(output_dir.join(format!("{name}.py")), module)?;
        }
        GeneratorTarget::Db => {
            let document = db::emit(context, &config.db_generator)?;
            fs::write(output_dir.join(format!("{name}.odin")), document)?;
        }
        GeneratorTarget::Doc => {
            let document = doc::emit(context, &config.doc_generator)?;
            fs::write(output_dir.join(format!("{name}.md")), document)?;
        }
    }
    Ok(())
}
