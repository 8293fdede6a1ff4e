pub mod client;
pub mod connector;
pub mod error;
pub mod messaging;

pub use client::ApiClient;
pub use connector::HttpConnector;
pub use error::ClientError;
pub use messaging::{MessagingService, MAX_MESSAGE_LEN};
