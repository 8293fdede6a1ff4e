pub mod models;
pub mod pii;

pub use models::booking::{BookingConfirmation, BookingRequest};
pub use models::draft::{draft_key, DraftDates, DraftPersonal, ReservationDraft};
pub use models::events::ReservationConfirmedEvent;
pub use models::listing::{Listing, ListingId, ListingOwner, ListingStatus};
pub use models::messaging::{Conversation, Message};
pub use pii::Masked;
