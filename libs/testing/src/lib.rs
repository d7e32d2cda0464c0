//! # computest-testing
//!
//! Shared test support: [`SimHarness`] runs the simulated compute API on an
//! ephemeral local port and hands out clients for its seeded credentials.

use std::net::SocketAddr;

use computest_client::{ClientError, Credentials, Role, ServersClient};
use computest_sim::config::Identity;
use computest_sim::{api, AppState, SimConfig};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Installs a test-writer subscriber. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// A simulator serving on `127.0.0.1:<ephemeral>`. Stopped on drop.
pub struct SimHarness {
    addr: SocketAddr,
    config: SimConfig,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl SimHarness {
    pub async fn start(config: SimConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = api::create_router(AppState::new(config.clone()));
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(e) = result {
                warn!(error = %e, "simulator exited with error");
            }
        });

        debug!(addr = %addr, "simulator started");

        Ok(Self {
            addr,
            config,
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Compute endpoint, including the `/v2.1` prefix.
    pub fn endpoint(&self) -> String {
        format!("http://{}/v2.1", self.addr)
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    fn identity(&self, admin: bool) -> Result<&Identity, ClientError> {
        self.config
            .identities
            .iter()
            .find(|identity| identity.admin == admin)
            .ok_or_else(|| {
                ClientError::Config(format!("simulator has no credential with admin={admin}"))
            })
    }

    pub fn credentials(&self, role: Role) -> Result<Credentials, ClientError> {
        let identity = self.identity(role == Role::Admin)?;
        let mut credentials = Credentials::new(&identity.token, identity.project_id.clone());
        credentials.user_id = Some(identity.user_id.clone());
        Ok(credentials)
    }

    pub fn client(&self, role: Role) -> Result<ServersClient, ClientError> {
        ServersClient::new(&self.endpoint(), self.credentials(role)?, role)
    }

    pub fn admin_client(&self) -> Result<ServersClient, ClientError> {
        self.client(Role::Admin)
    }

    pub fn tenant_client(&self) -> Result<ServersClient, ClientError> {
        self.client(Role::Tenant)
    }

    /// Stops the server and waits for it to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for SimHarness {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}
