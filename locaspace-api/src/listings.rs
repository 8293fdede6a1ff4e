use axum::{
    extract::{Path, State},
    routing::get,
    Extension, Json, Router,
};

use locaspace_core::{ListingApi, SessionContext};
use locaspace_shared::{Listing, ListingId};

use crate::{error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/listings/{id}", get(get_listing))
}

/// GET /v1/listings/:id
async fn get_listing(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<ListingId>,
) -> Result<Json<Listing>, AppError> {
    let listing = state.backend.connect(&session).listings.get_listing(&id).await?;
    Ok(Json(listing))
}
