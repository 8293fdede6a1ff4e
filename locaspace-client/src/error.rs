use locaspace_core::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Backend answered {status}: {message}")]
    Status { status: u16, message: String },
}

impl From<ClientError> for CoreError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Status { status: 404, message } => CoreError::NotFound(message),
            ClientError::Status { status, message } => CoreError::backend(Some(status), message),
            ClientError::Transport(e) => CoreError::backend(e.status().map(|s| s.as_u16()), e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let not_found: CoreError = ClientError::Status {
            status: 404,
            message: "Listing 9".to_string(),
        }
        .into();
        assert!(matches!(not_found, CoreError::NotFound(_)));

        let expired: CoreError = ClientError::Status {
            status: 401,
            message: "token expired".to_string(),
        }
        .into();
        assert_eq!(expired.user_message(), "Your session has expired, please sign in again.");
    }
}
