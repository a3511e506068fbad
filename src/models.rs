// src/models.rs
// =============================================================================
// Shared data types for link-sentry.
//
// Three groups live here:
// - LinkState: the availability verdict for a single link
// - Persisted records: LinkSet, Ledger, PendingTask(s) - exactly the JSON
//   shapes written to disk
// - Wire schema: request/response bodies for the /check and /report endpoints
// =============================================================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Availability of a single link.
///
/// Serialized as `"available"`, `"not_available"`, or `"pending"` both on
/// the wire and on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkState {
    /// Probe answered with HTTP 2xx
    Available,
    /// Probe failed, timed out, or answered with a non-2xx status
    NotAvailable,
    /// Not probed yet
    Pending,
}

impl LinkState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkState::Available => "available",
            LinkState::NotAvailable => "not_available",
            LinkState::Pending => "pending",
        }
    }
}

/// One (url, status) entry inside a stored link set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkEntry {
    pub url: String,
    pub status: LinkState,
}

/// A batch of submitted links sharing one identifier.
///
/// `checked` flips to true exactly once, when probe results are merged in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkSet {
    pub id: u64,
    pub links: Vec<LinkEntry>,
    pub checked: bool,
}

/// Durable ledger: the identifier counter plus every link set ever created.
///
/// Invariant: `last_id` is always >= the largest id in `link_sets`, and ids
/// are never reused or reordered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    pub last_id: u64,
    pub link_sets: Vec<LinkSet>,
}

/// A batch accepted while the service was shutting down, still to be probed.
///
/// The id always refers to a link set that already exists in the ledger in
/// pending form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingTask {
    pub id: u64,
    pub links: Vec<String>,
}

/// Durable queue of deferred batches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PendingTasks {
    pub tasks: Vec<PendingTask>,
}

/// Body of POST /check.
#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    pub links: Vec<String>,
}

/// Response of POST /check: per-link verdicts keyed by the submitted URL
/// string, plus the identifier of the stored link set.
#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub links: HashMap<String, LinkState>,
    pub links_num: u64,
}

/// Body of POST /report.
#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub links_list: Vec<u64>,
}
