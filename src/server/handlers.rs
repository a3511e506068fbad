// src/server/handlers.rs
// =============================================================================
// Request handlers for the check and report endpoints.
//
// These stay thin: decode the body, validate, dispatch to the coordinator
// or the store, encode the result. Core failures surface as an opaque 500;
// the detail goes to the log only.
// =============================================================================

use std::sync::atomic::Ordering;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use crate::models::{CheckRequest, CheckResponse, LinkState, ReportRequest};
use crate::report;
use crate::storage::StorageError;

use super::AppState;

/// POST /check - probe a batch of links, or queue it while shutting down.
pub(super) async fn check_links(
    State(state): State<AppState>,
    Json(req): Json<CheckRequest>,
) -> Result<Json<CheckResponse>, AppError> {
    if req.links.is_empty() {
        return Err(AppError::BadRequest("no links provided"));
    }

    if state.shutting_down.load(Ordering::SeqCst) {
        let id = state.checker.defer_links(&req.links).await?;
        let links = req
            .links
            .iter()
            .map(|url| (url.clone(), LinkState::Pending))
            .collect();
        return Ok(Json(CheckResponse {
            links,
            links_num: id,
        }));
    }

    let (links, id) = state.checker.check_links(&req.links).await?;
    Ok(Json(CheckResponse {
        links,
        links_num: id,
    }))
}

/// POST /report - render completed link sets as a downloadable document.
pub(super) async fn get_report(
    State(state): State<AppState>,
    Json(req): Json<ReportRequest>,
) -> Result<Response, AppError> {
    if req.links_list.is_empty() {
        return Err(AppError::BadRequest("no link set ids provided"));
    }

    let link_sets = state.storage.completed_link_sets(&req.links_list).await;
    if link_sets.is_empty() {
        return Err(AppError::NotFound("no completed link sets found"));
    }

    let body = report::render(&link_sets);
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=report.txt",
            ),
        ],
        body,
    )
        .into_response())
}

/// Maps failures onto HTTP responses without leaking internals.
#[derive(Debug)]
pub(super) enum AppError {
    BadRequest(&'static str),
    NotFound(&'static str),
    Internal,
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        error!(error = %err, "storage failure");
        AppError::Internal
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "internal server error"),
        };

        (status, message).into_response()
    }
}
