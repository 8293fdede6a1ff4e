use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use locaspace_core::{Role, SessionContext};

use crate::{error::AppError, state::AppState};

// ============================================================================
// JWT Claims
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub exp: usize,
}

pub fn issue_token(secret: &str, user_id: &str, role: Role, ttl_seconds: i64) -> Result<String, AppError> {
    let claims = Claims {
        sub: user_id.to_string(),
        role,
        exp: (chrono::Utc::now() + chrono::Duration::seconds(ttl_seconds)).timestamp() as usize,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))
}

// ============================================================================
// Session Middleware
// ============================================================================

/// Turn the bearer token into a [`SessionContext`] request extension.
///
/// Requests without a token browse anonymously; a token that does not verify
/// is rejected. The raw token is kept so backend calls carry it on.
pub async fn session_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let session = match bearer {
        None => SessionContext::anonymous(),
        Some(TypedHeader(Authorization(bearer))) => {
            let token_data = decode::<Claims>(
                bearer.token(),
                &DecodingKey::from_secret(state.auth.secret.as_bytes()),
                &Validation::default(),
            )
            .map_err(|e| AppError::AuthenticationError(format!("Invalid token: {}", e)))?;

            SessionContext::new(token_data.claims.sub, token_data.claims.role).with_token(bearer.token())
        }
    };

    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}

// ============================================================================
// Guards
// ============================================================================

fn signed_in(req: &Request) -> Result<&SessionContext, AppError> {
    let session = req
        .extensions()
        .get::<SessionContext>()
        .ok_or_else(|| AppError::AuthenticationError("Missing session".to_string()))?;

    if session.bearer_token.is_none() {
        return Err(AppError::AuthenticationError("Sign in required".to_string()));
    }
    Ok(session)
}

/// Runs after [`session_middleware`]; anonymous requests are refused.
pub async fn signed_in_middleware(req: Request, next: Next) -> Result<Response, AppError> {
    signed_in(&req)?;
    Ok(next.run(req).await)
}

/// Runs after [`session_middleware`]; only admins get through.
pub async fn admin_middleware(req: Request, next: Next) -> Result<Response, AppError> {
    let session = signed_in(&req)?;
    if !session.is_admin() {
        return Err(AppError::AuthorizationError("Admin role required".to_string()));
    }

    Ok(next.run(req).await)
}
