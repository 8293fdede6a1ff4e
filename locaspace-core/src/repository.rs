use async_trait::async_trait;
use std::sync::Arc;

use locaspace_shared::{
    BookingConfirmation, BookingRequest, Conversation, Listing, ListingId, Message, ReservationDraft,
};

use crate::session::SessionContext;
use crate::CoreResult;

/// Key-value persistence of reservation drafts, one per listing.
#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn load_draft(&self, listing_id: &ListingId) -> CoreResult<Option<ReservationDraft>>;

    async fn save_draft(&self, listing_id: &ListingId, draft: &ReservationDraft) -> CoreResult<()>;

    async fn delete_draft(&self, listing_id: &ListingId) -> CoreResult<()>;
}

/// Listing and booking endpoints of the backend REST API.
#[async_trait]
pub trait ListingApi: Send + Sync {
    async fn pending_listings(&self) -> CoreResult<Vec<Listing>>;

    async fn validate_listing(&self, id: &ListingId) -> CoreResult<()>;

    async fn reject_listing(&self, id: &ListingId) -> CoreResult<()>;

    async fn get_listing(&self, id: &ListingId) -> CoreResult<Listing>;

    async fn create_booking(&self, request: &BookingRequest) -> CoreResult<BookingConfirmation>;
}

/// Messaging endpoints of the backend REST API.
#[async_trait]
pub trait MessagingApi: Send + Sync {
    async fn conversations(&self) -> CoreResult<Vec<Conversation>>;

    async fn messages(&self, conversation_id: &str) -> CoreResult<Vec<Message>>;

    async fn send_message(&self, conversation_id: &str, body: &str) -> CoreResult<Message>;
}

/// Backend endpoints as seen by one session.
#[derive(Clone)]
pub struct BackendHandle {
    pub listings: Arc<dyn ListingApi>,
    pub messaging: Arc<dyn MessagingApi>,
}

impl BackendHandle {
    /// Both surfaces served by the same client.
    pub fn from_client<C: ListingApi + MessagingApi + 'static>(client: C) -> Self {
        let client = Arc::new(client);
        Self {
            listings: client.clone(),
            messaging: client,
        }
    }
}

/// Opens a backend handle bound to a session's credentials.
pub trait BackendConnector: Send + Sync {
    fn connect(&self, session: &SessionContext) -> BackendHandle;
}
