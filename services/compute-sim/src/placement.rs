//! Host selection for new servers.
//!
//! Honors the `same_host` and `different_host` scheduler hints. A hint
//! that cannot be satisfied is not a request error: the server is accepted
//! and then goes to ERROR, the way a real scheduler reports "no valid host".

use std::sync::atomic::{AtomicUsize, Ordering};

use computest_model::SchedulerHints;
use thiserror::Error;

use crate::store::ServerStore;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlacementError {
    #[error("no valid host: {0}")]
    NoValidHost(String),
}

/// Round-robin host picker.
#[derive(Debug, Default)]
pub struct Placement {
    cursor: AtomicUsize,
}

impl Placement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(
        &self,
        hosts: &[String],
        hints: &SchedulerHints,
        store: &ServerStore,
    ) -> Result<String, PlacementError> {
        let excluded: Vec<&str> = hints
            .different_host
            .iter()
            .filter_map(|id| store.host_of(id))
            .collect();

        let mut candidates: Vec<&String> = hosts
            .iter()
            .filter(|host| !excluded.contains(&host.as_str()))
            .collect();

        if !hints.same_host.is_empty() {
            let mut required: Option<&str> = None;
            for id in &hints.same_host {
                let Some(host) = store.host_of(id) else {
                    return Err(PlacementError::NoValidHost(format!(
                        "same_host server {id} has no host"
                    )));
                };
                match required {
                    Some(existing) if existing != host => {
                        return Err(PlacementError::NoValidHost(
                            "same_host servers are on different hosts".to_string(),
                        ));
                    }
                    _ => required = Some(host),
                }
            }
            candidates.retain(|host| Some(host.as_str()) == required);
        }

        if candidates.is_empty() {
            return Err(PlacementError::NoValidHost(
                "every host was filtered out".to_string(),
            ));
        }

        let pick = self.cursor.fetch_add(1, Ordering::Relaxed) % candidates.len();
        Ok(candidates[pick].clone())
    }
}
