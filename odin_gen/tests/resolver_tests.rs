/* Resolver Tests
 *
 * These tests drive the full load pipeline from YAML and verify the
 * semantic invariants: global id packing, access control inheritance,
 * implicit extensions, collections and the failure taxonomy.
 */

use odin_gen::loader;
use odin_gen::od::access::Permission;
use odin_gen::od::error::OdError;
use odin_gen::od::extensions::Extension;
use odin_gen::od::tree::ResolvedKind;
use odin_gen::ModelContext;

fn load(yaml: &str) -> Result<ModelContext, OdError> {
    loader::load_str(yaml).map(|loaded| loaded.context)
}

#[test]
fn telemetry_global_ids_are_packed() {
    let context = load(
        r#"
id_space_shift: 8
parameters:
  telemetry:
    type: group
    local_id: 1
    id_space_shift: 8
    children:
      voltage:
        type: parameter
        local_id: 2
        primitive: u16
        description: "Bus voltage"
"#,
    )
    .unwrap();

    let telemetry = context
        .tree
        .find_parameter_by_object_name("telemetry")
        .unwrap();
    let voltage = context
        .tree
        .find_parameter_by_object_name("telemetry.voltage")
        .unwrap();

    assert_eq!(context.tree.node(telemetry).global_id, 0x0100_0000);
    assert_eq!(context.tree.node(voltage).global_id, 0x0102_0000);
}

#[test]
fn global_ids_are_injective() {
    let context = load(
        r#"
id_space_shift: 4
parameters:
  a:
    type: group
    local_id: 1
    id_space_shift: 8
    children:
      x: { type: parameter, local_id: 1, primitive: u8 }
      y: { type: parameter, local_id: 2, primitive: u8 }
  b:
    type: group
    local_id: 2
    id_space_shift: 8
    children:
      x: { type: parameter, local_id: 1, primitive: u8 }
"#,
    )
    .unwrap();

    let mut seen = std::collections::HashSet::new();
    let mut paths = std::collections::HashSet::new();
    for id in context.tree.descendants() {
        let node = context.tree.node(id);
        assert!(seen.insert(node.global_id), "duplicate id for {}", node.path);
        assert!(paths.insert(node.path.clone()));
    }
}

#[test]
fn duplicate_local_ids_at_root_collide() {
    let err = load(
        r#"
id_space_shift: 8
parameters:
  first: { type: parameter, local_id: 3, primitive: u8 }
  second: { type: parameter, local_id: 3, primitive: u8 }
"#,
    )
    .unwrap_err();
    assert!(matches!(err, OdError::IdCollision { .. }));
}

#[test]
fn local_id_boundary() {
    let tight = r#"
id_space_shift: 4
parameters:
  edge: { type: parameter, local_id: EDGE_ID, primitive: u8 }
"#;

    let err = load(&tight.replace("EDGE_ID", "16")).unwrap_err();
    assert!(matches!(err, OdError::IdSpaceViolation { .. }));

    load(&tight.replace("EDGE_ID", "15")).unwrap();
}

#[test]
fn access_override_propagates_to_grandchildren() {
    let context = load(
        r#"
id_space_shift: 8
access_control:
  ops:
    default: "R"
parameters:
  motor:
    type: group
    local_id: 1
    id_space_shift: 8
    access_control:
      ops:
        override: "RW"
    children:
      limits:
        type: group
        local_id: 1
        id_space_shift: 8
        children:
          max_speed: { type: parameter, local_id: 1, primitive: u32 }
"#,
    )
    .unwrap();

    let leaf = context
        .tree
        .find_parameter_by_object_name("motor.limits.max_speed")
        .unwrap();
    let access = &context.tree.node(leaf).access;
    let ops = &access.groups["ops"];
    assert!(ops.default.contains(&Permission::Read));
    assert!(ops.default.contains(&Permission::Write));
    assert_eq!(ops.default.len(), 2);
}

#[test]
fn sibling_defaults_accumulate_down_the_path() {
    let context = load(
        r#"
id_space_shift: 8
access_control:
  ops:
    default: "R"
parameters:
  motor:
    type: group
    local_id: 1
    id_space_shift: 8
    access_control:
      ops:
        default: "W"
    children:
      speed: { type: parameter, local_id: 1, primitive: u16 }
"#,
    )
    .unwrap();

    let leaf = context
        .tree
        .find_parameter_by_object_name("motor.speed")
        .unwrap();
    let ops = &context.tree.node(leaf).access.groups["ops"];
    assert!(ops.default.contains(&Permission::Read));
    assert!(ops.default.contains(&Permission::Write));
    assert!(ops.override_.is_none());
}

#[test]
fn six_access_groups_pass_seven_fail() {
    let six = r#"
id_space_shift: 8
access_control:
  g0: { default: "R" }
  g1: { default: "R" }
  g2: { default: "R" }
  g3: { default: "R" }
  g4: { default: "R" }
  g5: { default: "R" }
parameters:
  p: { type: parameter, local_id: 1, primitive: u8 }
"#;
    load(six).unwrap();

    let seven = six.replace("parameters:", "  g6: { default: \"R\" }\nparameters:");
    let err = load(&seven).unwrap_err();
    assert!(matches!(err, OdError::TooManyAccessGroups { count: 7 }));
}

#[test]
fn string_serialised_type_injects_codec_extension() {
    let context = load(
        r#"
id_space_shift: 8
types:
  version:
    string_serialiser: "version_codec"
    model:
      major: u8
      minor: u8
      patch: u16
parameters:
  fw_version:
    type: parameter
    local_id: 1
    primitive: version
"#,
    )
    .unwrap();

    let node_id = context
        .tree
        .find_parameter_by_object_name("fw_version")
        .unwrap();
    let node = context.tree.node(node_id);
    assert!(matches!(
        node.extensions(),
        [Extension::StringCodecReference { reference }] if reference == "version_codec"
    ));

    let version = context.types.lookup("version").unwrap();
    assert_eq!(version.struct_format, "1B1B1H");
    assert_eq!(version.size, 4);
}

#[test]
fn unresolved_io_reference_fails() {
    let err = load(
        r#"
id_space_shift: 8
parameters:
  scaled:
    type: parameter
    local_id: 1
    primitive: f32
    extensions:
      - type: io_mapped_number
        reference: "does.not.exist"
        scale: 2.0
"#,
    )
    .unwrap_err();
    assert!(matches!(err, OdError::UnresolvedReference { .. }));
}

#[test]
fn extension_declaration_order_is_preserved() {
    let context = load(
        r#"
id_space_shift: 8
parameters:
  raw: { type: parameter, local_id: 1, primitive: f32 }
  scaled:
    type: parameter
    local_id: 2
    primitive: f32
    extensions:
      - type: validation_limit_value
        min: 0.0
      - type: io_mapped_number
        reference: "raw"
"#,
    )
    .unwrap();

    let scaled = context.tree.find_parameter_by_object_name("scaled").unwrap();
    let extensions = context.tree.node(scaled).extensions();
    assert_eq!(extensions.len(), 2);
    assert!(matches!(
        &extensions[0],
        Extension::ValidationLimitValue { min: Some(min), max: None } if *min == 0.0
    ));
    assert!(matches!(&extensions[1], Extension::IoMappedNumber { .. }));
}

#[test]
fn collections_resolve_globs_and_keep_ids() {
    let context = load(
        r#"
id_space_shift: 8
collections:
  tuning:
    description: "Motor tuning"
    children:
      - "motor.*"
      - "motor.kp"
parameters:
  motor:
    type: group
    local_id: 1
    id_space_shift: 8
    children:
      kp: { type: parameter, local_id: 1, primitive: f32 }
      ki: { type: parameter, local_id: 2, primitive: f32 }
"#,
    )
    .unwrap();

    let tuning = &context.collections["tuning"];
    assert_eq!(tuning.members.len(), 2);
    let kp = context.tree.node(tuning.members[0]);
    assert_eq!(kp.name, "kp");
    // Borrowed members keep their tree ids.
    assert_eq!(kp.global_id, 0x0101_0000);
}

#[test]
fn unknown_collection_pattern_fails() {
    let err = load(
        r#"
id_space_shift: 8
collections:
  broken:
    children: ["nope"]
parameters:
  p: { type: parameter, local_id: 1, primitive: u8 }
"#,
    )
    .unwrap_err();
    assert!(matches!(err, OdError::UnresolvedReference { .. }));
}

#[test]
fn unknown_primitive_fails() {
    let err = load(
        r#"
id_space_shift: 8
parameters:
  p: { type: parameter, local_id: 1, primitive: q64 }
"#,
    )
    .unwrap_err();
    assert!(matches!(err, OdError::UnknownType { .. }));
}

#[test]
fn extra_fields_are_rejected() {
    let err = load(
        r#"
id_space_shift: 8
parameters:
  p: { type: parameter, local_id: 1, primitive: u8, surprise: true }
"#,
    )
    .unwrap_err();
    assert!(matches!(err, OdError::SchemaValidation { .. }));
}

#[test]
fn void_parameters_resolve_without_defaults() {
    let context = load(
        r#"
id_space_shift: 8
parameters:
  trigger:
    type: void
    local_id: 1
    primitive: u8
    default: 42
"#,
    )
    .unwrap();

    let trigger = context
        .tree
        .find_parameter_by_object_name("trigger")
        .unwrap();
    match &context.tree.node(trigger).kind {
        ResolvedKind::Parameter(parameter) => {
            assert!(parameter.void);
            assert!(parameter.default.is_none());
        }
        _ => panic!("trigger is a parameter"),
    }
}
