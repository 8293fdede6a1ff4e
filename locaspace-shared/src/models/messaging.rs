use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::listing::ListingId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    #[serde(default)]
    pub listing_id: Option<ListingId>,
    pub participants: Vec<String>,
    #[serde(default)]
    pub last_message: Option<Message>,
}
