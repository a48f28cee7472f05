/* CLI Command Tests
 *
 * Exercise the command bodies behind the `odin-gen` binary: input
 * validation, schema dumping and full generation runs.
 */

use std::fs;
use std::path::Path;

use odin_gen::cmds;
use odin_gen::codegen::GeneratorTarget;

const CONFIG: &str = r#"
id_space_shift: 8
parameters:
  status:
    type: group
    local_id: 1
    id_space_shift: 8
    children:
      uptime: { type: parameter, local_id: 1, primitive: u32 }
"#;

#[test]
fn schema_generation() {
    let dir = tempfile::tempdir().unwrap();
    let schema_path = dir.path().join("schema.json");

    cmds::schema::run(&schema_path).unwrap();

    let schema: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&schema_path).unwrap()).unwrap();
    assert!(schema["$defs"]["parameter_node"].is_object());
}

#[test]
fn schema_generation_rejects_missing_directory() {
    assert!(cmds::schema::run(Path::new("nonexistent/schema.json")).is_err());
}

#[test]
fn generate_rejects_missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let result = cmds::generate::run(
        Path::new("nonexistent.yaml"),
        dir.path(),
        "OD",
        Vec::new(),
    );
    assert!(result.is_err());
}

#[test]
fn generate_rejects_non_yaml_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("README.md");
    fs::write(&input, "not a spec").unwrap();

    assert!(cmds::generate::run(&input, dir.path(), "OD", Vec::new()).is_err());
}

#[test]
fn generate_rejects_missing_output_directory() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("config.yaml");
    fs::write(&input, CONFIG).unwrap();

    let missing = dir.path().join("missing");
    assert!(cmds::generate::run(&input, &missing, "OD", Vec::new()).is_err());
}

#[test]
fn generate_defaults_to_all_targets() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("config.yaml");
    fs::write(&input, CONFIG).unwrap();
    let output = dir.path().join("out");
    fs::create_dir(&output).unwrap();

    cmds::generate::run(&input, &output, "OD", Vec::new()).unwrap();

    for artifact in ["OD.h", "OD.c", "OD.py", "OD.odin", "OD.md"] {
        assert!(output.join(artifact).exists(), "{artifact} missing");
    }
}

#[test]
fn generate_honours_target_selection() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("config.yaml");
    fs::write(&input, CONFIG).unwrap();
    let output = dir.path().join("out");
    fs::create_dir(&output).unwrap();

    cmds::generate::run(&input, &output, "OD", vec![GeneratorTarget::Db]).unwrap();

    assert!(output.join("OD.odin").exists());
    assert!(!output.join("OD.h").exists());
    assert!(!output.join("OD.py").exists());
}

#[test]
fn flawed_configs_produce_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("config.yaml");
    fs::write(
        &input,
        r#"
id_space_shift: 8
parameters:
  a: { type: parameter, local_id: 3, primitive: u8 }
  b: { type: parameter, local_id: 3, primitive: u8 }
"#,
    )
    .unwrap();
    let output = dir.path().join("out");
    fs::create_dir(&output).unwrap();

    assert!(cmds::generate::run(&input, &output, "OD", Vec::new()).is_err());
    assert!(fs::read_dir(&output).unwrap().next().is_none());
}
