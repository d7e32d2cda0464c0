//! Response schemas keyed by operation and microversion.
//!
//! Schemas check shape, not values: required keys, types, and the
//! representation changes introduced at 2.47 (embedded flavor) and 2.75
//! (full server body from update and rebuild, numeric flavor swap).

use computest_model::{Microversion, ServerStatus};
use serde_json::{json, Value};

use crate::{ClientError, Operation, Role};

/// Validates `body` for `operation` at `microversion`, as seen by `role`.
///
/// Operations without a response body always pass.
pub fn validate(
    operation: Operation,
    microversion: Microversion,
    role: Role,
    body: &Value,
) -> Result<(), ClientError> {
    let Some(schema) = schema_for(operation, microversion, role) else {
        return Ok(());
    };

    let validator =
        jsonschema::validator_for(&schema).map_err(|e| ClientError::Schema(e.to_string()))?;
    let errors: Vec<String> = validator.iter_errors(body).map(|e| e.to_string()).collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ClientError::InvalidResponse {
            operation: operation.name(),
            microversion: microversion.to_string(),
            errors,
        })
    }
}

/// The response schema for `operation`, or `None` for body-less responses.
pub fn schema_for(operation: Operation, microversion: Microversion, role: Role) -> Option<Value> {
    let schema = match operation {
        Operation::CreateServer => envelope("server", created_server()),
        Operation::ShowServer => envelope("server", server_detail(microversion, role, true)),
        Operation::ListServers => list_envelope(server_summary()),
        Operation::ListServersDetail => list_envelope(server_detail(microversion, role, true)),
        Operation::UpdateServer => envelope(
            "server",
            server_detail(microversion, role, microversion >= Microversion::V2_75),
        ),
        Operation::RebuildServer => {
            let mut server =
                server_detail(microversion, role, microversion >= Microversion::V2_75);
            server["properties"]["adminPass"] = json!({"type": "string"});
            envelope("server", server)
        }
        Operation::ShowFlavor => envelope("flavor", flavor(microversion)),
        Operation::DeleteServer | Operation::ResetState | Operation::InjectNetworkInfo => {
            return None
        }
    };
    Some(schema)
}

fn envelope(key: &str, inner: Value) -> Value {
    json!({
        "type": "object",
        "properties": { key: inner },
        "required": [key]
    })
}

fn list_envelope(item: Value) -> Value {
    json!({
        "type": "object",
        "properties": {
            "servers": { "type": "array", "items": item },
            "servers_links": links()
        },
        "required": ["servers"]
    })
}

fn links() -> Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "href": { "type": "string" },
                "rel": { "type": "string" }
            },
            "required": ["href", "rel"]
        }
    })
}

fn server_summary() -> Value {
    json!({
        "type": "object",
        "properties": {
            "id": { "type": "string" },
            "name": { "type": "string" },
            "links": links()
        },
        "required": ["id", "name", "links"]
    })
}

fn created_server() -> Value {
    json!({
        "type": "object",
        "properties": {
            "id": { "type": "string" },
            "links": links(),
            "adminPass": { "type": "string" },
            "OS-DCF:diskConfig": { "type": "string" }
        },
        "required": ["id", "links"]
    })
}

fn image() -> Value {
    json!({
        "anyOf": [
            {
                "type": "object",
                "properties": {
                    "id": { "type": "string" },
                    "links": links()
                },
                "required": ["id", "links"]
            },
            { "type": "string", "maxLength": 0 }
        ]
    })
}

fn server_flavor(microversion: Microversion) -> Value {
    if microversion >= Microversion::V2_47 {
        json!({
            "type": "object",
            "properties": {
                "original_name": { "type": "string" },
                "vcpus": { "type": "integer" },
                "ram": { "type": "integer" },
                "disk": { "type": "integer" },
                "ephemeral": { "type": "integer" },
                "swap": { "type": "integer" },
                "extra_specs": {
                    "type": "object",
                    "additionalProperties": { "type": "string" }
                }
            },
            "required": ["original_name", "vcpus", "ram", "disk", "ephemeral", "swap"],
            "not": { "required": ["id"] }
        })
    } else {
        json!({
            "type": "object",
            "properties": {
                "id": { "type": "string" },
                "links": links()
            },
            "required": ["id", "links"]
        })
    }
}

/// Detailed server body. `full` adds the `OS-EXT-*` attributes that show
/// and list always render, and that update/rebuild render from 2.75.
fn server_detail(microversion: Microversion, role: Role, full: bool) -> Value {
    let statuses: Vec<&str> = ServerStatus::ALL.iter().map(|s| s.as_str()).collect();
    let nullable_string = json!({ "type": ["string", "null"] });

    let mut schema = json!({
        "type": "object",
        "properties": {
            "id": { "type": "string" },
            "name": { "type": "string" },
            "status": { "enum": statuses },
            "tenant_id": { "type": "string" },
            "user_id": { "type": "string" },
            "image": image(),
            "flavor": server_flavor(microversion),
            "hostId": { "type": "string" },
            "created": { "type": "string" },
            "updated": { "type": "string" },
            "addresses": { "type": "object" },
            "metadata": { "type": "object" },
            "links": links(),
            "OS-EXT-AZ:availability_zone": { "type": "string" },
            "OS-EXT-STS:task_state": nullable_string.clone(),
            "OS-EXT-STS:vm_state": { "type": "string" },
            "OS-EXT-STS:power_state": { "type": "integer" },
            "OS-EXT-SRV-ATTR:host": nullable_string.clone(),
            "OS-EXT-SRV-ATTR:hypervisor_hostname": nullable_string.clone(),
            "OS-EXT-SRV-ATTR:instance_name": { "type": "string" }
        },
        "required": [
            "id", "name", "status", "tenant_id", "user_id", "image", "flavor",
            "hostId", "created", "updated", "addresses", "metadata", "links"
        ]
    });

    if full {
        let mut required = vec![
            "OS-EXT-AZ:availability_zone",
            "OS-EXT-STS:task_state",
            "OS-EXT-STS:vm_state",
            "OS-EXT-STS:power_state",
        ];
        if role == Role::Admin {
            required.extend([
                "OS-EXT-SRV-ATTR:host",
                "OS-EXT-SRV-ATTR:hypervisor_hostname",
                "OS-EXT-SRV-ATTR:instance_name",
            ]);
        }
        if let Some(list) = schema["required"].as_array_mut() {
            list.extend(required.into_iter().map(Value::from));
        }
    }

    schema
}

fn flavor(microversion: Microversion) -> Value {
    let swap = if microversion >= Microversion::V2_75 {
        json!({ "type": "integer" })
    } else {
        json!({ "anyOf": [{ "type": "integer" }, { "type": "string", "maxLength": 0 }] })
    };

    json!({
        "type": "object",
        "properties": {
            "id": { "type": "string" },
            "name": { "type": "string" },
            "vcpus": { "type": "integer" },
            "ram": { "type": "integer" },
            "disk": { "type": "integer" },
            "swap": swap,
            "OS-FLV-EXT-DATA:ephemeral": { "type": "integer" },
            "links": links()
        },
        "required": ["id", "name", "vcpus", "ram", "disk", "swap", "links"]
    })
}
