//! Renders stored servers and flavors as API bodies.
//!
//! The rendering depends on who is asking and at which microversion; see
//! [`ViewOptions`].

use std::collections::BTreeMap;

use computest_id::ServerId;
use computest_model::server::Address;
use computest_model::{
    CreatedServer, EmbeddedFlavor, ExtendedAttributes, ExtendedStatus, Flavor, FlavorLink,
    ImageRef, Link, Microversion, Server, ServerFlavor, ServerImage, ServerSummary,
};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::config::{FlavorSpec, SimConfig};
use crate::store::ServerRecord;

#[derive(Debug, Clone, Copy)]
pub struct ViewOptions {
    pub microversion: Microversion,
    pub admin: bool,
    /// Render the `OS-EXT-*` attributes.
    pub extended: bool,
}

fn server_links(id: &ServerId) -> Vec<Link> {
    vec![
        Link::new(format!("/v2.1/servers/{id}"), "self"),
        Link::new(format!("/servers/{id}"), "bookmark"),
    ]
}

/// `hostId`: an opaque per-project digest of the host, empty when unplaced.
fn host_id(record: &ServerRecord) -> String {
    let Some(host) = record.host.as_deref() else {
        return String::new();
    };
    let digest = Sha256::digest(format!("{}{}", record.project_id, host).as_bytes());
    let hex = format!("{:x}", digest);
    hex.get(..56).unwrap_or(&hex).to_string()
}

fn addresses(record: &ServerRecord) -> BTreeMap<String, Vec<Address>> {
    if !record.networked || record.host.is_none() {
        return BTreeMap::new();
    }
    let octet = 2 + record.index % 250;
    BTreeMap::from([(
        "private".to_string(),
        vec![Address {
            addr: format!("10.0.0.{octet}"),
            version: 4,
        }],
    )])
}

fn server_flavor(record: &ServerRecord, spec: Option<&FlavorSpec>, mv: Microversion) -> ServerFlavor {
    match spec {
        Some(spec) if mv >= Microversion::V2_47 => ServerFlavor::Embedded(EmbeddedFlavor {
            original_name: spec.name.clone(),
            vcpus: spec.vcpus,
            ram: spec.ram,
            disk: spec.disk,
            ephemeral: 0,
            swap: 0,
            extra_specs: BTreeMap::new(),
        }),
        _ => ServerFlavor::Reference(FlavorLink {
            id: record.flavor_id.clone(),
            links: vec![Link::new(format!("/flavors/{}", record.flavor_id), "bookmark")],
        }),
    }
}

pub fn server_detail(record: &ServerRecord, config: &SimConfig, options: ViewOptions) -> Server {
    let (availability_zone, extended_status) = if options.extended {
        (
            Some(config.availability_zone.clone()),
            Some(ExtendedStatus {
                task_state: record.task_state.map(|t| t.as_str().to_string()),
                vm_state: record.status.vm_state().to_string(),
                power_state: record.status.power_state(),
            }),
        )
    } else {
        (None, None)
    };

    let extended_attributes = (options.extended && options.admin).then(|| ExtendedAttributes {
        host: record.host.clone(),
        hypervisor_hostname: record.host.as_ref().map(|h| format!("{h}.localdomain")),
        instance_name: format!("instance-{:08x}", record.index),
    });

    Server {
        id: record.id.clone(),
        name: record.name.clone(),
        status: record.status,
        tenant_id: record.project_id.clone(),
        user_id: record.user_id.clone(),
        image: ServerImage::Image(ImageRef {
            id: record.image_id.clone(),
            links: vec![Link::new(format!("/images/{}", record.image_id), "bookmark")],
        }),
        flavor: server_flavor(record, config.flavor(&record.flavor_id), options.microversion),
        host_id: host_id(record),
        created: record.created,
        updated: record.updated,
        addresses: addresses(record),
        metadata: record.metadata.clone(),
        links: server_links(&record.id),
        availability_zone,
        extended_status,
        extended_attributes,
        admin_pass: None,
    }
}

pub fn server_summary(record: &ServerRecord) -> ServerSummary {
    ServerSummary {
        id: record.id.clone(),
        name: record.name.clone(),
        links: server_links(&record.id),
    }
}

pub fn created_server(record: &ServerRecord, admin_pass: String) -> CreatedServer {
    CreatedServer {
        id: record.id.clone(),
        links: server_links(&record.id),
        admin_pass: Some(admin_pass),
    }
}

/// Flavor body. Before 2.75 "no swap" is rendered as `""`.
pub fn flavor(spec: &FlavorSpec, mv: Microversion) -> Result<Value, serde_json::Error> {
    let flavor = Flavor {
        id: spec.id.clone(),
        name: spec.name.clone(),
        vcpus: spec.vcpus,
        ram: spec.ram,
        disk: spec.disk,
        ephemeral: 0,
        swap: 0,
        links: vec![Link::new(format!("/flavors/{}", spec.id), "bookmark")],
    };
    let mut body = serde_json::to_value(&flavor)?;
    if mv < Microversion::V2_75 && flavor.swap == 0 {
        body["swap"] = Value::String(String::new());
    }
    Ok(body)
}
