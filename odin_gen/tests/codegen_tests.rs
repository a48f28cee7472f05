/* Backend Tests
 *
 * These tests run the backends against a fully loaded model and check the
 * emitted C, host client, database and document artifacts.
 */

use odin_gen::codegen::c::CCodeGenerator;
use odin_gen::codegen::{self, GeneratorConfigurations, GeneratorTarget};
use odin_gen::loader::{self, LoadedSpec};
use odin_gen::od::access::{AccessCollection, AccessGroups};
use odin_gen::od::error::OdError;
use odin_gen::od::registry::TypeRegistry;
use odin_gen::od::tree::ResolvedTree;
use odin_gen::ModelContext;

const FIXTURE: &str = r#"
id_space_shift: 8
access_control:
  ops: { default: "R" }
types:
  vec3:
    model:
      x: f32
      y: f32
      z: f32
collections:
  telemetry_view:
    description: "Telemetry snapshot"
    children: ["telemetry.*"]
parameters:
  telemetry:
    type: group
    local_id: 1
    id_space_shift: 8
    description: "Live measurements"
    children:
      voltage:
        type: parameter
        local_id: 2
        primitive: u16
        description: "Bus voltage"
        default: 3300
      name:
        type: vector
        local_id: 3
        primitive: char
        max_elements: 16
        default: "od"
  trigger: { type: void, local_id: 4, primitive: u8 }
  attitude: { type: parameter, local_id: 5, primitive: vec3 }
  samples:
    type: array
    local_id: 6
    primitive: u16
    elements: 4
    default: [1, 2, 3, 4]
  scaled:
    type: parameter
    local_id: 7
    primitive: f32
    extensions:
      - { type: validation_limit_value, max: 100.0 }
      - { type: io_mapped_number, reference: "telemetry.voltage", scale: 0.001 }
"#;

fn load_fixture() -> LoadedSpec {
    loader::load_str(FIXTURE).unwrap()
}

/* ============================================================================
   C backend
   ============================================================================ */

#[test]
fn c_header_declares_access_groups_and_structs() {
    let loaded = load_fixture();
    let output = CCodeGenerator::new(&loaded.config.c_generator)
        .emit(&loaded.context, "OD")
        .unwrap();

    assert!(output.header.contains("#pragma once"));
    assert!(output
        .header
        .contains("#define ODIN_ACCESS_OPS ODIN_ACCESS_GROUP_0"));
    assert!(output.header.contains("} variables_t;"));
    assert!(output.header.contains("} OD_objects_t;"));
    assert!(output.header.contains("extern variables_t variables;"));
    assert!(output.header.contains("extern OD_objects_t OD_objects;"));
    assert!(output
        .header
        .contains("extern ODIN_parameter_group_t OD_groups_telemetry;"));
    assert!(output
        .header
        .contains("extern ODIN_parameter_group_t collection_telemetry_view;"));
    assert!(output.header.contains("uint16_t samples[4];"));
    assert!(output.header.contains("char data[16];"));
    // Void parameters contribute no storage, but keep their descriptor.
    assert!(!output.header.contains("uint8_t trigger;"));
    assert!(output.header.contains("ODIN_parameter_t trigger;"));
}

#[test]
fn c_source_initialises_variables_with_defaults() {
    let loaded = load_fixture();
    let output = CCodeGenerator::new(&loaded.config.c_generator)
        .emit(&loaded.context, "OD")
        .unwrap();

    assert!(output.source.contains(".voltage = 3300,"));
    assert!(output
        .source
        .contains(".name = { .num_elements = 2, .data = \"od\" },"));
    assert!(output
        .source
        .contains(".attitude = { .x = 0.0, .y = 0.0, .z = 0.0 },"));
    assert!(output.source.contains(".samples = { 1, 2, 3, 4 },"));
}

#[test]
fn c_source_emits_descriptors() {
    let loaded = load_fixture();
    let output = CCodeGenerator::new(&loaded.config.c_generator)
        .emit(&loaded.context, "OD")
        .unwrap();

    assert!(output.source.contains(".global_index = 0x01020000"));
    assert!(output
        .source
        .contains(".flags = (ODIN_ACCESS_OPS & (ODIN_ACCESS_READ))"));
    assert!(output
        .source
        .contains(".data = &variables.telemetry.voltage"));
    assert!(output
        .source
        .contains(".name_and_description = \"voltage\\0Bus voltage\""));
    assert!(output.source.contains(".element_size = sizeof(uint16_t)"));
    assert!(output.source.contains("ODIN_ELEMENT_TYPE_CUSTOM"));
    assert!(output.source.contains(".max_elements = 16"));

    // Void parameters carry no data pointer.
    assert!(output.source.contains(".data = NULL"));
}

#[test]
fn c_source_chains_extensions_in_declaration_order() {
    let loaded = load_fixture();
    let output = CCodeGenerator::new(&loaded.config.c_generator)
        .emit(&loaded.context, "OD")
        .unwrap();

    // The chain head is the last declared extension; the validator is
    // reachable through its .next.
    let io_position = output
        .source
        .find("ODIN_extension_io_mapped_number_ops")
        .unwrap();
    let validate_position = output.source.find("ODIN_validate_extension_ops").unwrap();
    assert!(io_position < validate_position);

    assert!(output
        .source
        .contains("&OD_objects.telemetry.voltage, .scale = 0.001, .offset = 0.0"));
    assert!(output.source.contains(".max = 100.0, .min = -INFINITY"));
}

#[test]
fn c_source_emits_group_tables_and_collections() {
    let loaded = load_fixture();
    let output = CCodeGenerator::new(&loaded.config.c_generator)
        .emit(&loaded.context, "OD")
        .unwrap();

    assert!(output
        .source
        .contains("ODIN_parameter_group_t OD_groups = { /* index: 0x00000000 */"));
    assert!(output.source.contains("&OD_groups_telemetry"));
    assert!(output.source.contains(".shift = 8"));
    assert!(output
        .source
        .contains("ODIN_parameter_group_t collection_telemetry_view"));
    assert!(output
        .source
        .contains("\"telemetry_view\\0Telemetry snapshot\""));
}

#[test]
fn c_backend_rejects_unfrozen_models() {
    let registry = TypeRegistry::with_builtins();
    let tree = ResolvedTree::resolve(
        &Default::default(),
        8,
        AccessCollection::default(),
        &registry,
    )
    .unwrap();
    let context = ModelContext::new(registry, tree, AccessGroups::default());

    let config = GeneratorConfigurations::default();
    let err = CCodeGenerator::new(&config.c_generator)
        .emit(&context, "OD")
        .unwrap_err();
    assert!(matches!(err, OdError::PipelineMisuse { .. }));
}

/* ============================================================================
   Host client backend
   ============================================================================ */

#[test]
fn py_module_contains_codecs_and_entries() {
    let loaded = load_fixture();
    let module = codegen::py::emit(&loaded.context, &loaded.config.python_generator).unwrap();

    assert!(module.contains("class OdinU16(GenericModel, int):"));
    assert!(module.contains("class OdinF32(GenericModel, float):"));
    assert!(module.contains("class OdinVec3(GenericModel, ConfiguredBaseModel):"));
    assert!(module.contains("struct.pack(\n            '<1f1f1f',"));

    assert!(module.contains("class ODIN(BaseRootModel):"));
    assert!(module.contains("class Telemetry(BaseRootModel):"));
    assert!(module.contains(
        "self.voltage = ODINEntry[OdinU16](0x01020000, cls=OdinU16, interface=interface)"
    ));
    assert!(module
        .contains("self.name = ODINStringEntry(0x01030000, interface=interface, max_length=16)"));
    assert!(module.contains(
        "ODINArrayEntry[OdinU16](0x06000000, cls=OdinU16, elements=4, element_size=2, interface=interface)"
    ));
    assert!(module.contains("async def read(self) -> Model:"));
    assert!(module.contains("data = await self.read_all()"));
}

/* ============================================================================
   Database backend
   ============================================================================ */

#[test]
fn db_document_shape_and_fingerprint() {
    let loaded = load_fixture();
    let first = codegen::db::emit(&loaded.context, &loaded.config.db_generator).unwrap();
    let second = codegen::db::emit(&loaded.context, &loaded.config.db_generator).unwrap();

    let first: serde_json::Value = serde_json::from_str(&first).unwrap();
    let second: serde_json::Value = serde_json::from_str(&second).unwrap();

    // The fingerprint covers the tree only; it is stable across runs.
    assert_eq!(first["configuration_hash"], second["configuration_hash"]);
    let hash = first["configuration_hash"].as_str().unwrap();
    assert_eq!(hash.len(), 32);

    assert_eq!(first["name"], "ODIN");
    assert_eq!(first["root"]["kind"], "group");
    assert_eq!(first["root"]["global_name"], "root");

    let telemetry = &first["root"]["parameters"][0];
    assert_eq!(telemetry["name"], "telemetry");
    assert_eq!(telemetry["global_id"], 0x0100_0000u32 as u64);
    let voltage = &telemetry["parameters"][0];
    assert_eq!(voltage["kind"], "parameter");
    assert_eq!(voltage["element_type"], "u16");
    assert_eq!(voltage["default_value"], 3300);

    let vec3 = &first["types"]["vec3"];
    assert_eq!(vec3["size"], 12);
    assert_eq!(vec3["structure"]["x"]["structure"], "f32");
    assert_eq!(vec3["structure"]["x"]["count"], 1);
}

/* ============================================================================
   Document backend
   ============================================================================ */

#[test]
fn doc_lists_groups_with_cross_links() {
    let loaded = load_fixture();
    let document = codegen::doc::emit(&loaded.context, &loaded.config.doc_generator).unwrap();

    assert!(document.starts_with("# ODIN Object Dictionary\n"));
    assert!(document.contains("## Root"));
    assert!(document.contains("## Telemetry"));
    assert!(document.contains("Live measurements"));
    assert!(document.contains("[Go to parent](#root)"));
    assert!(document.contains("| [telemetry](#telemetry) | group | 0x01000000 | Live measurements |"));
    assert!(document.contains("| voltage | u16 | 0x01020000 | Bus voltage |"));
    assert!(document.contains("| name | char[<= 16] | 0x01030000 | No description |"));
    assert!(document.contains("| samples | u16[4] | 0x06000000 | No description |"));
}

/* ============================================================================
   Dispatch
   ============================================================================ */

#[test]
fn generate_writes_every_artifact() {
    let loaded = load_fixture();
    let output_dir = tempfile::tempdir().unwrap();

    for target in GeneratorTarget::all() {
        codegen::generate(
            "OD",
            &loaded.context,
            &loaded.config,
            output_dir.path(),
            target,
        )
        .unwrap();
    }

    for artifact in ["OD.h", "OD.c", "OD.py", "OD.odin", "OD.md"] {
        assert!(output_dir.path().join(artifact).exists(), "{artifact} missing");
    }
}
