use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};

use locaspace_client::MessagingService;
use locaspace_core::SessionContext;
use locaspace_shared::{Conversation, Message};

use crate::{error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/conversations", get(list_conversations))
        .route("/v1/conversations/{id}/messages", get(list_messages).post(send_message))
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub body: String,
}

/// A message plus whether the caller wrote it.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    #[serde(flatten)]
    pub message: Message,
    pub own: bool,
}

fn service(state: &AppState, session: &SessionContext) -> MessagingService {
    let backend = state.backend.connect(session);
    MessagingService::new(backend.messaging, session.clone())
}

/// GET /v1/conversations
async fn list_conversations(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<Vec<Conversation>>, AppError> {
    let conversations = service(&state, &session).conversations().await?;
    Ok(Json(conversations))
}

/// GET /v1/conversations/:id/messages
async fn list_messages(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
) -> Result<Json<Vec<MessageResponse>>, AppError> {
    let service = service(&state, &session);
    let messages = service
        .messages(&id)
        .await?
        .into_iter()
        .map(|message| MessageResponse {
            own: service.is_own_message(&message),
            message,
        })
        .collect();
    Ok(Json(messages))
}

/// POST /v1/conversations/:id/messages
async fn send_message(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let service = service(&state, &session);
    let message = service.send(&id, &req.body).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            own: true,
            message,
        }),
    ))
}
