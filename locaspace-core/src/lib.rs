pub mod notify;
pub mod payment;
pub mod repository;
pub mod session;

pub use notify::{BroadcastNotifier, Delivery, Notifier, RecordingNotifier, Toast, ToastLevel};
pub use payment::{PaymentAdapter, PaymentReceipt, PaymentStatus};
pub use repository::{BackendConnector, BackendHandle, DraftStore, ListingApi, MessagingApi};
pub use session::{Role, SessionContext};

#[derive(Debug, Clone, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Backend call failed ({status:?}): {message}")]
    BackendError { status: Option<u16>, message: String },
    #[error("Draft storage failed: {0}")]
    StorageError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Not authorized: {0}")]
    Unauthorized(String),
    #[error("Payment failed: {0}")]
    PaymentError(String),
    #[error("Internal service error: {0}")]
    InternalError(String),
}

impl CoreError {
    pub fn backend(status: Option<u16>, message: impl Into<String>) -> Self {
        CoreError::BackendError {
            status,
            message: message.into(),
        }
    }

    /// Human readable text suitable for a toast.
    pub fn user_message(&self) -> String {
        match self {
            CoreError::BackendError { status: Some(401), .. } | CoreError::Unauthorized(_) => {
                "Your session has expired, please sign in again.".to_string()
            }
            CoreError::BackendError { .. } => "The server could not be reached, please try again later.".to_string(),
            CoreError::NotFound(what) => format!("{} not found.", what),
            CoreError::StorageError(_) => "Your draft could not be saved.".to_string(),
            CoreError::PaymentError(_) => "The payment could not be completed.".to_string(),
            CoreError::ValidationError(msg) | CoreError::InternalError(msg) => msg.clone(),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
