/* Schema command - dump the JSON schema of the specification document */

use std::fs;
use std::path::Path;

use anyhow::Context;

use crate::schema::document_schema;

/* Execute the gen-schema command */
pub fn run(output_file: &Path) -> anyhow::Result<()> {
    let schema = serde_json::to_string_pretty(&document_schema())?;
    fs::write(output_file, schema)
        .with_context(|| format!("failed to write {}", output_file.display()))?;
    Ok(())
}
