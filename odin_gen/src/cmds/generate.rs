/* Generate command - lower a specification and run the selected backends */

use std::fs;
use std::path::Path;

use anyhow::{bail, Context};

use crate::codegen::{self, GeneratorTarget};
use crate::loader;

/* Execute the generate command */
pub fn run(
    input_file: &Path,
    output_dir: &Path,
    name: &str,
    targets: Vec<GeneratorTarget>,
) -> anyhow::Result<()> {
    if !input_file.exists() {
        bail!("input file {} does not exist", input_file.display());
    }
    if input_file.extension().and_then(|ext| ext.to_str()) != Some("yaml") {
        bail!("input file {} must be a yaml file", input_file.display());
    }
    if !output_dir.is_dir() {
        bail!("output directory {} does not exist", output_dir.display());
    }

    println!(
        "Converting {} to {}",
        input_file.display(),
        output_dir.display()
    );

    let input = fs::read_to_string(input_file)
        .with_context(|| format!("failed to read {}", input_file.display()))?;
    let loaded = loader::load_str(&input)?;

    let targets = if targets.is_empty() {
        GeneratorTarget::all()
    } else {
        targets
    };

    for target in targets {
        codegen::generate(name, &loaded.context, &loaded.config, output_dir, target)
            .with_context(|| format!("backend '{}' failed", target.name()))?;
    }

    Ok(())
}
