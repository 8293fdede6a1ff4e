use serde::{Deserialize, Serialize};

use locaspace_shared::Masked;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Guest,
    Host,
    Admin,
}

/// Who is acting, and with which credentials.
///
/// Built once per session (or per request in the BFF) and handed to every
/// service at construction time; nothing in the workspace reads the current
/// user from a global.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionContext {
    pub user_id: String,
    pub role: Role,
    /// Token forwarded to the backend as `Authorization: Bearer ...`.
    #[serde(skip_serializing)]
    pub bearer_token: Option<Masked<String>>,
}

impl SessionContext {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
            bearer_token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(Masked::new(token.into()));
        self
    }

    /// Anonymous visitor browsing without an account.
    pub fn anonymous() -> Self {
        Self::new("anonymous", Role::Guest)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn authorization_header(&self) -> Option<String> {
        self.bearer_token
            .as_ref()
            .map(|token| format!("Bearer {}", token.expose()))
    }
}
