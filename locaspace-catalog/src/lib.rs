pub mod listing;
pub mod pricing;
pub mod validation;

pub use listing::{listing_columns, ListingRow};
pub use pricing::{total_nights, PricingBreakdown, PricingConfig, PricingEngine};
pub use validation::{ReviewDecision, ValidationQueue};
