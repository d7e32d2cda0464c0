//! In-memory server records.
//!
//! Every mutating call records the statuses the server will pass through
//! and when. Nothing runs in the background: [`ServerStore::settle`] applies
//! whatever is due before each read, so observed state only depends on
//! elapsed time.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::time::Duration;

use chrono::{DateTime, Utc};
use computest_id::{FlavorId, ImageId, ProjectId, ServerId, UserId};
use computest_model::{ResetState, ServerStatus};
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Scheduling,
    Spawning,
    Rebuilding,
    RebuildSpawning,
    Deleting,
}

impl TaskState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduling => "scheduling",
            Self::Spawning => "spawning",
            Self::Rebuilding => "rebuilding",
            Self::RebuildSpawning => "rebuild_spawning",
            Self::Deleting => "deleting",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Set(ServerStatus, Option<TaskState>),
    Remove,
}

#[derive(Debug, Clone)]
struct Transition {
    due: Instant,
    step: Step,
}

/// Everything the simulator knows about one server.
#[derive(Debug, Clone)]
pub struct ServerRecord {
    pub id: ServerId,
    pub name: String,
    pub project_id: ProjectId,
    pub user_id: UserId,
    pub image_id: ImageId,
    pub flavor_id: FlavorId,
    pub status: ServerStatus,
    pub task_state: Option<TaskState>,
    pub host: Option<String>,
    /// Creation sequence number; also backs `instance_name`.
    pub index: u64,
    pub networked: bool,
    pub metadata: BTreeMap<String, String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pending: VecDeque<Transition>,
}

/// Fields fixed at creation time.
#[derive(Debug, Clone)]
pub struct NewServer {
    pub name: String,
    pub project_id: ProjectId,
    pub user_id: UserId,
    pub image_id: ImageId,
    pub flavor_id: FlavorId,
    pub host: Option<String>,
    pub networked: bool,
    pub metadata: BTreeMap<String, String>,
}

impl ServerRecord {
    /// A server in BUILD that goes ACTIVE after `build`, or ERROR early if
    /// it could not be placed on a host.
    pub fn building(new: NewServer, index: u64, now: Instant, build: Duration) -> Self {
        let created = Utc::now();
        let placed = new.host.is_some();
        let mut record = Self {
            id: ServerId::new(),
            name: new.name,
            project_id: new.project_id,
            user_id: new.user_id,
            image_id: new.image_id,
            flavor_id: new.flavor_id,
            status: ServerStatus::Build,
            task_state: Some(TaskState::Scheduling),
            host: new.host,
            index,
            networked: new.networked,
            metadata: new.metadata,
            created,
            updated: created,
            pending: VecDeque::new(),
        };

        if placed {
            record.schedule(
                now + build / 2,
                Step::Set(ServerStatus::Build, Some(TaskState::Spawning)),
            );
            record.schedule(now + build, Step::Set(ServerStatus::Active, None));
        } else {
            record.schedule(now + build / 4, Step::Set(ServerStatus::Error, None));
        }
        record
    }

    fn schedule(&mut self, due: Instant, step: Step) {
        self.pending.push_back(Transition { due, step });
    }

    fn touch(&mut self) {
        self.updated = Utc::now();
    }

    /// Applies due transitions. Returns `true` once the server is gone.
    fn advance(&mut self, now: Instant) -> bool {
        while let Some(next) = self.pending.front() {
            if next.due > now {
                break;
            }
            let step = next.step;
            self.pending.pop_front();
            match step {
                Step::Set(status, task_state) => {
                    debug!(
                        server_id = %self.id,
                        status = %status,
                        task_state = task_state.map(|t| t.as_str()).unwrap_or("-"),
                        "server transition"
                    );
                    self.status = status;
                    self.task_state = task_state;
                    self.touch();
                }
                Step::Remove => return true,
            }
        }
        false
    }

    pub fn is_deleting(&self) -> bool {
        self.task_state == Some(TaskState::Deleting)
    }

    /// Forces the status, dropping anything in flight.
    pub fn reset_state(&mut self, state: ResetState) {
        self.pending.clear();
        self.status = match state {
            ResetState::Active => ServerStatus::Active,
            ResetState::Error => ServerStatus::Error,
        };
        self.task_state = None;
        self.touch();
    }

    /// Starts a rebuild onto `image_id`. A server rebuilt out of ERROR with
    /// `transient_error` set reports ERROR once more halfway through.
    pub fn rebuild(
        &mut self,
        image_id: ImageId,
        now: Instant,
        rebuild: Duration,
        transient_error: bool,
    ) {
        let from_error = self.status == ServerStatus::Error;
        self.pending.clear();
        self.image_id = image_id;
        self.status = ServerStatus::Rebuild;
        self.task_state = Some(TaskState::Rebuilding);
        self.touch();

        if transient_error && from_error {
            self.schedule(now + rebuild / 2, Step::Set(ServerStatus::Error, None));
        } else {
            self.schedule(
                now + rebuild / 2,
                Step::Set(ServerStatus::Rebuild, Some(TaskState::RebuildSpawning)),
            );
        }
        self.schedule(now + rebuild, Step::Set(ServerStatus::Active, None));
    }

    pub fn delete(&mut self, now: Instant, delete: Duration) {
        self.pending.clear();
        self.task_state = Some(TaskState::Deleting);
        self.touch();
        self.schedule(now + delete, Step::Remove);
    }
}

#[derive(Debug, Default)]
pub struct ServerStore {
    servers: HashMap<ServerId, ServerRecord>,
    next_index: u64,
}

impl ServerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_index(&mut self) -> u64 {
        self.next_index += 1;
        self.next_index
    }

    pub fn insert(&mut self, record: ServerRecord) {
        self.servers.insert(record.id.clone(), record);
    }

    /// Applies every transition due at `now` and drops deleted servers.
    pub fn settle(&mut self, now: Instant) {
        self.servers.retain(|id, record| {
            let removed = record.advance(now);
            if removed {
                debug!(server_id = %id, "server deleted");
            }
            !removed
        });
    }

    pub fn get(&self, id: &ServerId) -> Option<&ServerRecord> {
        self.servers.get(id)
    }

    pub fn get_mut(&mut self, id: &ServerId) -> Option<&mut ServerRecord> {
        self.servers.get_mut(id)
    }

    /// All servers, most recently created first.
    pub fn newest_first(&self) -> Vec<&ServerRecord> {
        let mut records: Vec<&ServerRecord> = self.servers.values().collect();
        records.sort_by(|a, b| b.index.cmp(&a.index));
        records
    }

    pub fn host_of(&self, id: &ServerId) -> Option<&str> {
        self.servers.get(id).and_then(|record| record.host.as_deref())
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}
