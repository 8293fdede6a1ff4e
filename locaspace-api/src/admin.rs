use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use locaspace_catalog::ValidationQueue;
use locaspace_core::SessionContext;
use locaspace_shared::ListingId;
use locaspace_table::{SortDirection, TableView};

use crate::{error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/admin/listings/pending", get(list_pending))
        .route("/v1/admin/listings/{id}/validate", post(validate_listing))
        .route("/v1/admin/listings/{id}", delete(reject_listing))
}

#[derive(Debug, Deserialize)]
pub struct PendingQuery {
    pub search: Option<String>,
    /// Column key to sort by.
    pub sort: Option<String>,
    pub direction: Option<SortDirection>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

fn queue(state: &AppState, session: &SessionContext, page_size: usize) -> ValidationQueue {
    let backend = state.backend.connect(session);
    let notifier = Arc::new(state.notifier.for_recipient(session.user_id.clone()));
    ValidationQueue::new(backend.listings, notifier, page_size)
}

/// GET /v1/admin/listings/pending
///
/// The table is rebuilt from the backend on every call, then searched,
/// sorted and paginated as the query asks.
async fn list_pending(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Query(query): Query<PendingQuery>,
) -> Result<Json<TableView>, AppError> {
    let page_size = query.page_size.filter(|n| *n > 0).unwrap_or(state.page_size);
    let mut queue = queue(&state, &session, page_size);
    queue.refresh().await?;

    let table = queue.table_mut();
    if let Some(term) = &query.search {
        table.on_search(term);
    }
    if let Some(column) = &query.sort {
        table.on_sort(column);
        if query.direction == Some(SortDirection::Desc) {
            table.on_sort(column);
        }
    }
    if let Some(page) = query.page {
        table.change_page(page);
    }

    Ok(Json(queue.view()))
}

/// POST /v1/admin/listings/:id/validate
async fn validate_listing(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<ListingId>,
) -> Result<StatusCode, AppError> {
    let mut queue = queue(&state, &session, state.page_size);
    queue.refresh().await?;
    queue.validate(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /v1/admin/listings/:id
async fn reject_listing(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<ListingId>,
) -> Result<StatusCode, AppError> {
    let mut queue = queue(&state, &session, state.page_size);
    queue.refresh().await?;
    queue.reject(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
