use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{post, put},
    Extension, Json, Router,
};
use std::sync::Arc;
use tracing::info;

use locaspace_booking::{DatesForm, PaymentForm, PersonalForm, WizardController, WizardDeps, WizardStep, WizardView};
use locaspace_core::{ListingApi, SessionContext};
use locaspace_shared::ListingId;

use crate::{error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/reservations/{listing_id}/wizard",
            post(mount_wizard).get(get_wizard).delete(unmount_wizard),
        )
        .route("/v1/reservations/{listing_id}/wizard/dates", put(update_dates))
        .route("/v1/reservations/{listing_id}/wizard/personal", put(update_personal))
        .route("/v1/reservations/{listing_id}/wizard/payment", put(update_payment))
        .route("/v1/reservations/{listing_id}/wizard/next", post(next_step))
        .route("/v1/reservations/{listing_id}/wizard/previous", post(previous_step))
}

async fn mounted(
    state: &AppState,
    session: &SessionContext,
    listing_id: &ListingId,
) -> Result<Arc<WizardController>, AppError> {
    state
        .wizards
        .get(session, listing_id)
        .await
        .ok_or_else(|| AppError::NotFoundError(format!("No reservation in progress for listing {}", listing_id)))
}

/// POST /v1/reservations/:listing_id/wizard
async fn mount_wizard(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(listing_id): Path<ListingId>,
) -> Result<(StatusCode, Json<WizardView>), AppError> {
    if let Some(existing) = state.wizards.get(&session, &listing_id).await {
        return Ok((StatusCode::OK, Json(existing.view().await)));
    }

    let backend = state.backend.connect(&session);
    let listing = backend.listings.get_listing(&listing_id).await?;

    let deps = WizardDeps {
        drafts: state.drafts.for_session(&session),
        payments: state.payments.adapter(&backend),
        notifier: Arc::new(state.notifier.for_recipient(session.user_id.clone())),
    };
    let controller = WizardController::mount(listing, deps, state.wizard_settings.clone()).await;
    let controller = state.wizards.insert(&session, &listing_id, Arc::new(controller)).await;

    info!(user_id = %session.user_id, listing_id = %listing_id, "Wizard mounted");
    Ok((StatusCode::CREATED, Json(controller.view().await)))
}

/// GET /v1/reservations/:listing_id/wizard
async fn get_wizard(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(listing_id): Path<ListingId>,
) -> Result<Json<WizardView>, AppError> {
    let controller = mounted(&state, &session, &listing_id).await?;
    Ok(Json(controller.view().await))
}

/// DELETE /v1/reservations/:listing_id/wizard
async fn unmount_wizard(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(listing_id): Path<ListingId>,
) -> Result<StatusCode, AppError> {
    let controller = state
        .wizards
        .remove(&session, &listing_id)
        .await
        .ok_or_else(|| AppError::NotFoundError(format!("No reservation in progress for listing {}", listing_id)))?;
    controller.unmount();
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /v1/reservations/:listing_id/wizard/dates
async fn update_dates(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(listing_id): Path<ListingId>,
    Json(form): Json<DatesForm>,
) -> Result<Json<WizardView>, AppError> {
    let controller = mounted(&state, &session, &listing_id).await?;
    controller.update_dates(form).await?;
    Ok(Json(controller.view().await))
}

/// PUT /v1/reservations/:listing_id/wizard/personal
async fn update_personal(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(listing_id): Path<ListingId>,
    Json(form): Json<PersonalForm>,
) -> Result<Json<WizardView>, AppError> {
    let controller = mounted(&state, &session, &listing_id).await?;
    controller.update_personal(form).await?;
    Ok(Json(controller.view().await))
}

/// PUT /v1/reservations/:listing_id/wizard/payment
async fn update_payment(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(listing_id): Path<ListingId>,
    Json(form): Json<PaymentForm>,
) -> Result<Json<WizardView>, AppError> {
    let controller = mounted(&state, &session, &listing_id).await?;
    controller.update_payment(form).await?;
    Ok(Json(controller.view().await))
}

/// POST /v1/reservations/:listing_id/wizard/next
///
/// From the payment step this waits for the payment round trip. A
/// confirmed wizard is unmounted; the returned view is its last one.
async fn next_step(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(listing_id): Path<ListingId>,
) -> Result<Json<WizardView>, AppError> {
    let controller = mounted(&state, &session, &listing_id).await?;
    let step = controller.next().await?;
    let view = controller.view().await;

    if step == WizardStep::Confirmation {
        state.wizards.remove(&session, &listing_id).await;
        controller.unmount();
        info!(user_id = %session.user_id, listing_id = %listing_id, "Reservation confirmed, wizard unmounted");
    }
    Ok(Json(view))
}

/// POST /v1/reservations/:listing_id/wizard/previous
async fn previous_step(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(listing_id): Path<ListingId>,
) -> Result<Json<WizardView>, AppError> {
    let controller = mounted(&state, &session, &listing_id).await?;
    controller.previous().await?;
    Ok(Json(controller.view().await))
}
