pub mod auth;

pub use auth::{admin_middleware, issue_token, session_middleware, signed_in_middleware, Claims};
