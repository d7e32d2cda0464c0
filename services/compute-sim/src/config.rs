use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{bail, Result};
use computest_id::{FlavorId, ImageId, ProjectId, UserId};
use computest_model::Microversion;

pub const DEFAULT_IMAGE: &str = "70a599e0-31e7-49b7-b260-868f441e862b";
pub const DEFAULT_ALT_IMAGE: &str = "3a1c8d5e-6f0b-4a29-8e47-5d2b9c0f1a64";
pub const DEFAULT_FLAVOR: &str = "1";
pub const DEFAULT_ADMIN_TOKEN: &str = "admin-token";
pub const DEFAULT_ADMIN_PROJECT: &str = "a0c1f3e2d4b5467889a0b1c2d3e4f5a6";
pub const DEFAULT_TENANT_TOKEN: &str = "tenant-token";
pub const DEFAULT_TENANT_PROJECT: &str = "7b2e9d4c1a0f48e6b3d5c7a9e1f2b4d6";

/// A credential the simulator accepts in `X-Auth-Token`.
#[derive(Debug, Clone)]
pub struct Identity {
    pub token: String,
    pub project_id: ProjectId,
    pub user_id: UserId,
    pub admin: bool,
}

#[derive(Debug, Clone)]
pub struct FlavorSpec {
    pub id: FlavorId,
    pub name: String,
    pub vcpus: u32,
    pub ram: u64,
    pub disk: u64,
}

/// Deliberate deviations from correct behaviour, used to prove that the
/// conformance checks catch them. Only settable in code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Faults {
    /// Listing without `all_tenants` returns every project's servers.
    pub ignore_tenant_scope: bool,
    /// Rebuild echoes the new image but keeps the old one.
    pub keep_image_on_rebuild: bool,
    /// Unknown `status` filters are ignored instead of rejected or
    /// matched against nothing.
    pub ignore_invalid_status: bool,
    /// Update and rebuild never render `OS-EXT-*` attributes.
    pub short_update_body: bool,
    /// Server bodies report the caller's project as `tenant_id`.
    pub report_caller_tenant: bool,
}

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub listen_addr: SocketAddr,
    pub log_level: String,
    pub max_microversion: Microversion,
    pub build_time: Duration,
    pub rebuild_time: Duration,
    pub delete_time: Duration,
    pub hosts: Vec<String>,
    pub availability_zone: String,
    pub images: Vec<ImageId>,
    pub flavors: Vec<FlavorSpec>,
    pub identities: Vec<Identity>,
    /// Rebuilding a server that is in ERROR passes through ERROR once more
    /// before it settles in ACTIVE.
    pub transient_rebuild_error: bool,
    pub faults: Faults,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 8774)),
            log_level: "info".to_string(),
            max_microversion: Microversion::new(2, 96),
            build_time: Duration::from_millis(200),
            rebuild_time: Duration::from_millis(200),
            delete_time: Duration::from_millis(100),
            hosts: vec!["compute-0".to_string(), "compute-1".to_string()],
            availability_zone: "nova".to_string(),
            images: vec![
                ImageId::from_trusted(DEFAULT_IMAGE),
                ImageId::from_trusted(DEFAULT_ALT_IMAGE),
            ],
            flavors: vec![
                FlavorSpec {
                    id: FlavorId::from_trusted(DEFAULT_FLAVOR),
                    name: "m1.tiny".to_string(),
                    vcpus: 1,
                    ram: 512,
                    disk: 1,
                },
                FlavorSpec {
                    id: FlavorId::from_trusted("2"),
                    name: "m1.small".to_string(),
                    vcpus: 1,
                    ram: 2048,
                    disk: 20,
                },
            ],
            identities: vec![
                Identity {
                    token: DEFAULT_ADMIN_TOKEN.to_string(),
                    project_id: ProjectId::from_trusted(DEFAULT_ADMIN_PROJECT),
                    user_id: UserId::from_trusted("e5a7c9b1d3f24680a2c4e6f8b0d2f4a6"),
                    admin: true,
                },
                Identity {
                    token: DEFAULT_TENANT_TOKEN.to_string(),
                    project_id: ProjectId::from_trusted(DEFAULT_TENANT_PROJECT),
                    user_id: UserId::from_trusted("1f3b5d7f9a2c4e6a8c0e2a4c6e8a0c2e"),
                    admin: false,
                },
            ],
            transient_rebuild_error: false,
            faults: Faults::default(),
        }
    }
}

impl SimConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("COMPUTEST_SIM_LISTEN_ADDR") {
            config.listen_addr = addr.parse()?;
        }

        if let Ok(level) = std::env::var("COMPUTEST_SIM_LOG_LEVEL") {
            config.log_level = level;
        }

        if let Ok(version) = std::env::var("COMPUTEST_SIM_MAX_MICROVERSION") {
            config.max_microversion = version.parse()?;
        }

        if let Some(ms) = env_millis("COMPUTEST_SIM_BUILD_MS")? {
            config.build_time = ms;
        }
        if let Some(ms) = env_millis("COMPUTEST_SIM_REBUILD_MS")? {
            config.rebuild_time = ms;
        }
        if let Some(ms) = env_millis("COMPUTEST_SIM_DELETE_MS")? {
            config.delete_time = ms;
        }

        if let Ok(hosts) = std::env::var("COMPUTEST_SIM_HOSTS") {
            config.hosts = hosts
                .split(',')
                .map(str::trim)
                .filter(|h| !h.is_empty())
                .map(str::to_string)
                .collect();
        }

        if let Ok(token) = std::env::var("COMPUTEST_SIM_ADMIN_TOKEN") {
            config.identities[0].token = token;
        }
        if let Ok(token) = std::env::var("COMPUTEST_SIM_TENANT_TOKEN") {
            config.identities[1].token = token;
        }

        config.transient_rebuild_error = std::env::var("COMPUTEST_SIM_TRANSIENT_REBUILD_ERROR")
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(false);

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.hosts.is_empty() {
            bail!("at least one compute host is required");
        }
        if self.images.is_empty() || self.flavors.is_empty() {
            bail!("at least one image and one flavor are required");
        }
        if self.max_microversion < Microversion::V2_1 {
            bail!("max microversion must be at least 2.1");
        }
        Ok(())
    }

    pub fn identity_for_token(&self, token: &str) -> Option<&Identity> {
        self.identities.iter().find(|identity| identity.token == token)
    }

    pub fn flavor(&self, id: &FlavorId) -> Option<&FlavorSpec> {
        self.flavors.iter().find(|flavor| &flavor.id == id)
    }

    pub fn has_image(&self, id: &ImageId) -> bool {
        self.images.contains(id)
    }
}

fn env_millis(name: &str) -> Result<Option<Duration>> {
    match std::env::var(name) {
        Ok(value) => Ok(Some(Duration::from_millis(value.parse()?))),
        Err(_) => Ok(None),
    }
}
