//! Polling helpers that block until a server reaches a status.
//!
//! The compute API has no push notifications: every mutating call is
//! followed by one of these waits before anything reads the new status.

use std::time::Duration;

use computest_id::ServerId;
use computest_model::{Server, ServerStatus};
use thiserror::Error;
use tokio::time::Instant;
use tracing::debug;

use crate::{ClientError, ServersClient};

/// How long and how often to poll.
#[derive(Debug, Clone)]
pub struct WaitPolicy {
    pub interval: Duration,
    pub timeout: Duration,
    /// Fail as soon as the server reports ERROR. Cleared only where a
    /// transient ERROR is part of the expected path.
    pub raise_on_error: bool,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            timeout: Duration::from_secs(300),
            raise_on_error: true,
        }
    }
}

impl WaitPolicy {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self {
            interval,
            timeout,
            raise_on_error: true,
        }
    }

    /// Same policy, but keep polling through ERROR.
    pub fn tolerating_errors(&self) -> Self {
        Self {
            raise_on_error: false,
            ..self.clone()
        }
    }
}

#[derive(Debug, Error)]
pub enum WaitError {
    #[error(
        "server {server_id} did not reach {target} within {timeout:?} \
         (last status {last_status}, task state {last_task_state:?})"
    )]
    Timeout {
        server_id: ServerId,
        target: String,
        timeout: Duration,
        last_status: String,
        last_task_state: Option<String>,
    },

    #[error("server {server_id} went to ERROR while waiting for {target}")]
    BuildError { server_id: ServerId, target: String },

    #[error("server {server_id} went to ERROR while being deleted")]
    DeleteError { server_id: ServerId },

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Polls `show_server` until the server reports `target` with no task in
/// progress.
pub async fn wait_for_server_status(
    client: &ServersClient,
    server_id: &ServerId,
    target: ServerStatus,
    policy: &WaitPolicy,
) -> Result<Server, WaitError> {
    let start = Instant::now();

    loop {
        let server = client.show_server(server_id).await?;
        let task_state = server.task_state().map(str::to_string);

        debug!(
            server_id = %server_id,
            status = %server.status,
            task_state = task_state.as_deref().unwrap_or("-"),
            target = %target,
            "polled server status"
        );

        if server.status == target && task_state.is_none() {
            return Ok(server);
        }

        if server.status == ServerStatus::Error
            && target != ServerStatus::Error
            && policy.raise_on_error
        {
            return Err(WaitError::BuildError {
                server_id: server_id.clone(),
                target: target.to_string(),
            });
        }

        if start.elapsed() >= policy.timeout {
            return Err(WaitError::Timeout {
                server_id: server_id.clone(),
                target: target.to_string(),
                timeout: policy.timeout,
                last_status: server.status.to_string(),
                last_task_state: task_state,
            });
        }

        tokio::time::sleep(policy.interval).await;
    }
}

/// Polls until `show_server` returns 404.
pub async fn wait_for_server_termination(
    client: &ServersClient,
    server_id: &ServerId,
    policy: &WaitPolicy,
) -> Result<(), WaitError> {
    let start = Instant::now();

    loop {
        let server = match client.show_server(server_id).await {
            Ok(server) => server,
            Err(e) if e.is_not_found() => {
                debug!(server_id = %server_id, "server terminated");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        if server.status == ServerStatus::Error && policy.raise_on_error {
            return Err(WaitError::DeleteError {
                server_id: server_id.clone(),
            });
        }

        if start.elapsed() >= policy.timeout {
            return Err(WaitError::Timeout {
                server_id: server_id.clone(),
                target: "termination".to_string(),
                timeout: policy.timeout,
                last_status: server.status.to_string(),
                last_task_state: server.task_state().map(str::to_string),
            });
        }

        tokio::time::sleep(policy.interval).await;
    }
}
