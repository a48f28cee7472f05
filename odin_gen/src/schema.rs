//! JSON Schema of the specification document, for editor tooling.
//!
//! Hand-maintained against [`crate::loader::SpecDocument`] and the
//! declaration types; `gen-schema` dumps it verbatim.

use serde_json::{json, Value};

/// The schema of the whole input document.
pub fn document_schema() -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "Object dictionary specification",
        "type": "object",
        "additionalProperties": false,
        "required": ["parameters", "id_space_shift"],
        "properties": {
            "config": { "$ref": "#/$defs/config" },
            "access_control": { "$ref": "#/$defs/access_control" },
            "types": {
                "type": "object",
                "additionalProperties": { "$ref": "#/$defs/type_definition" }
            },
            "collections": {
                "type": "object",
                "additionalProperties": { "$ref": "#/$defs/collection" }
            },
            "parameters": {
                "type": "object",
                "additionalProperties": { "$ref": "#/$defs/parameter_node" }
            },
            "id_space_shift": { "type": "integer", "minimum": 0, "maximum": 32 }
        },
        "$defs": {
            "config": {
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "c_generator": {
                        "type": "object",
                        "additionalProperties": false,
                        "properties": {
                            "objects_type": { "type": "string" },
                            "objects_name": { "type": "string" },
                            "variables_type": { "type": "string" },
                            "variables_name": { "type": "string" },
                            "groups_name": { "type": "string" }
                        }
                    },
                    "python_generator": {
                        "type": "object",
                        "additionalProperties": false,
                        "properties": {
                            "root_class": { "type": "string" },
                            "interface_module": { "type": "string" }
                        }
                    },
                    "doc_generator": {
                        "type": "object",
                        "additionalProperties": false,
                        "properties": {
                            "title": { "type": "string" }
                        }
                    },
                    "db_generator": {
                        "type": "object",
                        "additionalProperties": false,
                        "properties": {
                            "name": { "type": "string" },
                            "description": { "type": "string" },
                            "indent": { "type": ["integer", "null"] }
                        }
                    }
                }
            },
            "permissions": {
                "oneOf": [
                    { "type": "string" },
                    { "type": "array", "items": { "type": "string" } }
                ]
            },
            "access_definition": {
                "oneOf": [
                    { "$ref": "#/$defs/permissions" },
                    {
                        "type": "object",
                        "additionalProperties": false,
                        "properties": {
                            "override": { "$ref": "#/$defs/permissions" },
                            "default": { "$ref": "#/$defs/permissions" }
                        }
                    }
                ]
            },
            "access_control": {
                "type": "object",
                "additionalProperties": { "$ref": "#/$defs/access_definition" }
            },
            "field_type_use": {
                "oneOf": [
                    { "type": "string" },
                    {
                        "type": "object",
                        "additionalProperties": false,
                        "required": ["type"],
                        "properties": {
                            "type": { "type": "string" },
                            "default": {},
                            "elements": { "type": "integer", "minimum": 1 }
                        }
                    }
                ]
            },
            "type_definition": {
                "type": "object",
                "additionalProperties": false,
                "required": ["model"],
                "properties": {
                    "description": { "type": "string" },
                    "string_serialiser": { "type": "string" },
                    "c_typename": { "type": "string" },
                    "py_typename": { "type": "string" },
                    "model": {
                        "type": "object",
                        "additionalProperties": { "$ref": "#/$defs/field_type_use" }
                    }
                }
            },
            "collection": {
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "description": { "type": "string" },
                    "children": { "type": "array", "items": { "type": "string" } }
                }
            },
            "extension": {
                "type": "object",
                "required": ["type"],
                "oneOf": [
                    {
                        "additionalProperties": false,
                        "properties": {
                            "type": { "const": "io_mapped_number" },
                            "reference": { "type": "string" },
                            "scale": { "type": "number" },
                            "offset": { "type": "number" }
                        },
                        "required": ["type", "reference"]
                    },
                    {
                        "additionalProperties": false,
                        "properties": {
                            "type": { "const": "custom_io" },
                            "reference": { "type": "string" }
                        },
                        "required": ["type", "reference"]
                    },
                    {
                        "additionalProperties": false,
                        "properties": {
                            "type": { "const": "validation_limit_value" },
                            "min": { "type": ["number", "null"] },
                            "max": { "type": ["number", "null"] }
                        },
                        "required": ["type"]
                    },
                    {
                        "additionalProperties": false,
                        "properties": {
                            "type": { "const": "string_codec_reference" },
                            "reference": { "type": "string" }
                        },
                        "required": ["type", "reference"]
                    }
                ]
            },
            "parameter_node": {
                "type": "object",
                "required": ["type", "local_id"],
                "oneOf": [
                    {
                        "additionalProperties": false,
                        "properties": {
                            "type": { "enum": ["parameter", "void"] },
                            "local_id": { "type": "integer" },
                            "primitive": { "type": "string" },
                            "description": { "type": "string" },
                            "access_control": { "$ref": "#/$defs/access_control" },
                            "default": {},
                            "reference": { "type": "string" },
                            "extensions": {
                                "type": "array",
                                "items": { "$ref": "#/$defs/extension" }
                            }
                        },
                        "required": ["type", "local_id", "primitive"]
                    },
                    {
                        "additionalProperties": false,
                        "properties": {
                            "type": { "const": "array" },
                            "local_id": { "type": "integer" },
                            "primitive": { "type": "string" },
                            "elements": { "type": "integer", "minimum": 1 },
                            "description": { "type": "string" },
                            "access_control": { "$ref": "#/$defs/access_control" },
                            "default": {},
                            "reference": { "type": "string" },
                            "extensions": {
                                "type": "array",
                                "items": { "$ref": "#/$defs/extension" }
                            }
                        },
                        "required": ["type", "local_id", "primitive", "elements"]
                    },
                    {
                        "additionalProperties": false,
                        "properties": {
                            "type": { "const": "vector" },
                            "local_id": { "type": "integer" },
                            "primitive": { "type": "string" },
                            "max_elements": { "type": "integer", "minimum": 1 },
                            "description": { "type": "string" },
                            "access_control": { "$ref": "#/$defs/access_control" },
                            "default": {},
                            "reference": { "type": "string" },
                            "extensions": {
                                "type": "array",
                                "items": { "$ref": "#/$defs/extension" }
                            }
                        },
                        "required": ["type", "local_id", "primitive", "max_elements"]
                    },
                    {
                        "additionalProperties": false,
                        "properties": {
                            "type": { "const": "group" },
                            "local_id": { "type": "integer" },
                            "id_space_shift": { "type": "integer", "minimum": 0, "maximum": 32 },
                            "description": { "type": "string" },
                            "access_control": { "$ref": "#/$defs/access_control" },
                            "children": {
                                "type": "object",
                                "additionalProperties": { "$ref": "#/$defs/parameter_node" }
                            }
                        },
                        "required": ["type", "local_id", "id_space_shift", "children"]
                    }
                ]
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_is_an_object_with_defs() {
        let schema = document_schema();
        assert_eq!(schema["type"], "object");
        assert!(schema["$defs"]["parameter_node"].is_object());
        assert!(schema["properties"]["id_space_shift"].is_object());
    }
}
