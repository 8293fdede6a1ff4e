use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Extension, Router,
};
use futures_util::stream::Stream;
use std::convert::Infallible;
use tokio_stream::{wrappers::BroadcastStream, StreamExt};

use locaspace_core::SessionContext;

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/notifications/stream", get(toast_stream))
}

/// GET /v1/notifications/stream
///
/// Server-sent toasts addressed to the caller (or to everyone). A slow
/// client that lags behind the channel skips the missed toasts.
async fn toast_stream(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let user_id = session.user_id;
    let stream = BroadcastStream::new(state.notifier.subscribe()).filter_map(move |delivery| {
        let delivery = delivery.ok()?;
        if !delivery.is_for(&user_id) {
            return None;
        }
        Event::default()
            .event("toast")
            .json_data(&delivery.toast)
            .ok()
            .map(Ok)
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
