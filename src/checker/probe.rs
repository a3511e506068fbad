// src/checker/probe.rs
// =============================================================================
// This module probes URLs over HTTP to decide whether they are reachable.
//
// Key functionality:
// - Normalizes bare hosts by prepending https://
// - Issues one GET per URL, all concurrently, with a fixed per-probe timeout
// - Maps every transport failure and non-2xx response to "not available"
// - Returns a mapping keyed by the original, unnormalized URL strings
// =============================================================================

use std::collections::HashMap;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use reqwest::Client;
use tracing::debug;

use crate::models::LinkState;

/// Build the HTTP client shared by all probes of this process. Reusing one
/// client keeps connection pooling across batches.
pub fn build_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder().timeout(timeout).build()
}

/// Probe every URL concurrently and collect original URL -> state.
///
/// The returned map has exactly one entry per distinct input URL
/// (duplicates collapse; probes are idempotent) and the call returns only
/// once the whole fan-out has completed. At most `width` probes are in
/// flight at a time.
pub async fn check_urls(
    client: &Client,
    urls: &[String],
    width: usize,
) -> HashMap<String, LinkState> {
    let probes = urls.to_vec().into_iter().map(|url| {
        // Client clones share the same pool.
        let client = client.clone();
        async move {
            let state = probe_url(&client, &url).await;
            (url, state)
        }
    });

    stream::iter(probes)
        .buffer_unordered(width.max(1))
        .collect()
        .await
}

// A single GET against the normalized target. Transport failures never
// propagate; they are the "not available" verdict.
async fn probe_url(client: &Client, url: &str) -> LinkState {
    let target = normalize_url(url);

    match client.get(&target).send().await {
        Ok(response) if response.status().is_success() => LinkState::Available,
        Ok(response) => {
            debug!(url, status = response.status().as_u16(), "probe got non-2xx");
            LinkState::NotAvailable
        }
        Err(err) => {
            debug!(url, error = %err, "probe failed");
            LinkState::NotAvailable
        }
    }
}

// The probe target gets a scheme when the caller omitted one; the caller's
// original string stays the map key.
fn normalize_url(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}
