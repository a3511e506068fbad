// src/checker/service.rs
// =============================================================================
// Batch coordinator: sequences a batch through allocation, probing, and
// result recording, and replays batches that were deferred during a
// previous shutdown.
// =============================================================================

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tracing::{error, info};

use crate::models::LinkState;
use crate::storage::{Storage, StorageError};

use super::probe;

pub struct Checker {
    storage: Arc<Storage>,
    client: Client,
    concurrency: usize,
}

impl Checker {
    pub fn new(
        storage: Arc<Storage>,
        probe_timeout: Duration,
        concurrency: usize,
    ) -> reqwest::Result<Self> {
        let client = probe::build_client(probe_timeout)?;
        Ok(Self {
            storage,
            client,
            concurrency,
        })
    }

    /// Live path: allocate a link set, probe every URL, record the results,
    /// and return them together with the allocated id.
    ///
    /// There is no partial-success path. When recording fails after the
    /// probes ran, the error propagates and the set stays pending in the
    /// ledger until a later re-drive.
    pub async fn check_links(
        &self,
        links: &[String],
    ) -> Result<(HashMap<String, LinkState>, u64), StorageError> {
        let id = self.storage.create_link_set(links).await?;
        let statuses = probe::check_urls(&self.client, links, self.concurrency).await;
        self.storage.update_link_set(id, &statuses).await?;
        Ok((statuses, id))
    }

    /// Degraded path, taken while shutting down: allocate the link set in
    /// pending form and queue it for the next startup instead of probing.
    pub async fn defer_links(&self, links: &[String]) -> Result<u64, StorageError> {
        let id = self.storage.create_link_set(links).await?;
        self.storage.add_pending_task(id, links.to_vec()).await?;
        Ok(id)
    }

    /// Drain the deferred queue, run once at startup. Batches are processed
    /// strictly one after another; an entry is dequeued only after its
    /// results are recorded, and a failing entry is skipped so it stays
    /// queued for a future drain.
    pub async fn process_pending_tasks(&self) {
        let tasks = self.storage.pending_tasks().await;
        if tasks.is_empty() {
            return;
        }

        info!(count = tasks.len(), "processing deferred link sets");

        for task in tasks {
            let statuses = probe::check_urls(&self.client, &task.links, self.concurrency).await;

            if let Err(err) = self.storage.update_link_set(task.id, &statuses).await {
                error!(id = task.id, error = %err, "failed to record deferred link set");
                continue;
            }

            if let Err(err) = self.storage.remove_pending_task(task.id).await {
                error!(id = task.id, error = %err, "failed to dequeue deferred link set");
            }
        }

        info!("deferred link sets processed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_checker(dir: &std::path::Path) -> (Arc<Storage>, Checker) {
        let storage = Arc::new(
            Storage::load(dir.join("storage.json"), dir.join("pending.json")).unwrap(),
        );
        let checker =
            Checker::new(storage.clone(), Duration::from_secs(3), 8).unwrap();
        (storage, checker)
    }

    async fn mock_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/up"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/down"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn live_check_records_and_returns_results() {
        let server = mock_server().await;
        let dir = tempfile::tempdir().unwrap();
        let (storage, checker) = test_checker(dir.path());

        let up = format!("{}/up", server.uri());
        let down = format!("{}/down", server.uri());
        let (statuses, id) = checker
            .check_links(&[up.clone(), down.clone()])
            .await
            .unwrap();

        assert_eq!(statuses[&up], LinkState::Available);
        assert_eq!(statuses[&down], LinkState::NotAvailable);

        let sets = storage.completed_link_sets(&[id]).await;
        assert_eq!(sets.len(), 1);
        assert!(sets[0].checked);

        let by_url: HashMap<_, _> = sets[0]
            .links
            .iter()
            .map(|entry| (entry.url.clone(), entry.status))
            .collect();
        assert_eq!(by_url[&up], LinkState::Available);
        assert_eq!(by_url[&down], LinkState::NotAvailable);
    }

    #[tokio::test]
    async fn deferred_batch_is_queued_without_probing() {
        let dir = tempfile::tempdir().unwrap();
        let (storage, checker) = test_checker(dir.path());

        // No mock server exists; deferring must not reach the network.
        let id = checker
            .defer_links(&["unreachable.invalid".to_string()])
            .await
            .unwrap();

        let tasks = storage.pending_tasks().await;
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, id);

        // Still pending, so a report request would not see it.
        assert!(storage.completed_link_sets(&[id]).await.is_empty());
    }

    #[tokio::test]
    async fn drain_completes_deferred_batches_and_empties_the_queue() {
        let server = mock_server().await;
        let dir = tempfile::tempdir().unwrap();
        let (storage, checker) = test_checker(dir.path());

        let up = format!("{}/up", server.uri());
        let id = checker.defer_links(&[up.clone()]).await.unwrap();

        checker.process_pending_tasks().await;

        let sets = storage.completed_link_sets(&[id]).await;
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].links[0].status, LinkState::Available);
        assert!(storage.pending_tasks().await.is_empty());
    }

    #[tokio::test]
    async fn drain_with_empty_queue_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let (storage, checker) = test_checker(dir.path());

        checker.process_pending_tasks().await;
        assert!(storage.pending_tasks().await.is_empty());
    }
}
