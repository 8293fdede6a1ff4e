pub mod booking;
pub mod draft;
pub mod events;
pub mod listing;
pub mod messaging;
