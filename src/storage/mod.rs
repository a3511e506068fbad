// src/storage/mod.rs
// =============================================================================
// Durable result store.
//
// Owns the ledger of link sets and the deferred task queue, each persisted
// as a JSON file. Every accepted mutation is flushed to disk before the
// call returns; there is no write-behind. Files are replaced with a
// write-then-rename so a crash mid-write never leaves a torn file.
//
// A single RwLock guards the whole durable state: mutating operations take
// the exclusive side (serializing the file writes), snapshot reads take the
// shared side.
// =============================================================================

use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::warn;

use crate::models::{Ledger, LinkEntry, LinkSet, LinkState, PendingTask, PendingTasks};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Default)]
struct State {
    ledger: Ledger,
    tasks: PendingTasks,
}

/// Sole owner of the durable state. All reads and writes of the ledger and
/// the deferred queue go through this type.
pub struct Storage {
    state: RwLock<State>,
    ledger_path: PathBuf,
    tasks_path: PathBuf,
}

impl Storage {
    /// Load both files, treating a missing file as the empty initial state.
    pub fn load(
        ledger_path: impl Into<PathBuf>,
        tasks_path: impl Into<PathBuf>,
    ) -> Result<Self, StorageError> {
        let ledger_path = ledger_path.into();
        let tasks_path = tasks_path.into();

        let ledger: Ledger = read_or_default(&ledger_path)?;
        let tasks: PendingTasks = read_or_default(&tasks_path)?;

        Ok(Self {
            state: RwLock::new(State { ledger, tasks }),
            ledger_path,
            tasks_path,
        })
    }

    /// Allocate the next identifier and append a link set with every status
    /// pending. A failed flush is rolled back so the counter never advances
    /// without a matching record on disk.
    pub async fn create_link_set(&self, links: &[String]) -> Result<u64, StorageError> {
        let mut state = self.state.write().await;

        state.ledger.last_id += 1;
        let id = state.ledger.last_id;

        let entries = links
            .iter()
            .map(|url| LinkEntry {
                url: url.clone(),
                status: LinkState::Pending,
            })
            .collect();

        state.ledger.link_sets.push(LinkSet {
            id,
            links: entries,
            checked: false,
        });

        if let Err(err) = write_atomic(&self.ledger_path, &state.ledger) {
            state.ledger.link_sets.pop();
            state.ledger.last_id -= 1;
            return Err(err);
        }

        Ok(id)
    }

    /// Merge probe results into the link set with this id, matching entries
    /// by exact URL string, and mark it checked. An unknown id is tolerated
    /// as a no-op (deferred replay depends on that) but flagged in the log,
    /// and the ledger is persisted either way.
    pub async fn update_link_set(
        &self,
        id: u64,
        statuses: &HashMap<String, LinkState>,
    ) -> Result<(), StorageError> {
        let mut state = self.state.write().await;

        match state.ledger.link_sets.iter_mut().find(|set| set.id == id) {
            Some(set) => {
                for entry in &mut set.links {
                    if let Some(status) = statuses.get(&entry.url) {
                        entry.status = *status;
                    }
                }
                set.checked = true;
            }
            None => warn!(id, "update for unknown link set"),
        }

        write_atomic(&self.ledger_path, &state.ledger)
    }

    /// Every stored link set whose id is in `ids` and whose check has
    /// completed, in insertion order. Unchecked sets are silently excluded.
    pub async fn completed_link_sets(&self, ids: &[u64]) -> Vec<LinkSet> {
        let wanted: HashSet<u64> = ids.iter().copied().collect();

        let state = self.state.read().await;
        state
            .ledger
            .link_sets
            .iter()
            .filter(|set| wanted.contains(&set.id) && set.checked)
            .cloned()
            .collect()
    }

    /// Append a deferred batch to the queue.
    pub async fn add_pending_task(&self, id: u64, links: Vec<String>) -> Result<(), StorageError> {
        let mut state = self.state.write().await;

        state.tasks.tasks.push(PendingTask { id, links });

        if let Err(err) = write_atomic(&self.tasks_path, &state.tasks) {
            state.tasks.tasks.pop();
            return Err(err);
        }

        Ok(())
    }

    /// Snapshot copy of the deferred queue.
    pub async fn pending_tasks(&self) -> Vec<PendingTask> {
        self.state.read().await.tasks.tasks.clone()
    }

    /// Remove the first queue entry with this id. Persists even when no
    /// entry matched.
    pub async fn remove_pending_task(&self, id: u64) -> Result<(), StorageError> {
        let mut state = self.state.write().await;

        if let Some(pos) = state.tasks.tasks.iter().position(|task| task.id == id) {
            state.tasks.tasks.remove(pos);
        }

        write_atomic(&self.tasks_path, &state.tasks)
    }
}

fn read_or_default<T: Default + DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
        Err(err) => Err(err.into()),
    }
}

// Serialize into a temp file next to the target, then rename over it.
fn write_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let body = serde_json::to_vec_pretty(value)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(&body)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|err| StorageError::Io(err.error))?;

    Ok(())
}
