use serde::{Deserialize, Serialize};

/// Visual style of a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeVariant {
    Success,
    Secondary,
    Warning,
    Danger,
    Primary,
}

impl BadgeVariant {
    /// Fallback mapping for rows that only carry a status string.
    ///
    /// Matching is case-insensitive; anything unknown is `Secondary`.
    pub fn from_status(status: &str) -> Self {
        match status.trim().to_lowercase().as_str() {
            "active" | "validated" | "approved" | "confirmed" | "paid" | "completed" => BadgeVariant::Success,
            "pending" | "waiting" | "in_progress" | "processing" => BadgeVariant::Warning,
            "rejected" | "cancelled" | "canceled" | "failed" | "blocked" | "suspended" => BadgeVariant::Danger,
            "new" | "draft" | "info" => BadgeVariant::Primary,
            _ => BadgeVariant::Secondary,
        }
    }
}
