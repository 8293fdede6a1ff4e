use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use locaspace_shared::{Listing, ListingStatus};
use locaspace_table::{Align, BadgeVariant, ColumnKind, TableColumn, TableRow};

/// A listing as displayed in admin tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingRow(pub Listing);

impl From<Listing> for ListingRow {
    fn from(listing: Listing) -> Self {
        Self(listing)
    }
}

impl TableRow for ListingRow {
    fn cell(&self, key: &str) -> Option<Value> {
        let listing = &self.0;
        let value = match key {
            "id" => json!(listing.id.as_str()),
            "title" => json!(listing.title),
            "city" => json!(listing.city),
            "pricePerNight" => json!(listing.price_per_night),
            "maxGuests" => json!(listing.max_guests?),
            "owner.id" => json!(listing.owner.id),
            "owner.name" => json!(listing.owner.name),
            "owner.email" => json!(listing.owner.email),
            "status" => json!(listing.status.as_str()),
            "createdAt" => json!(listing.created_at.to_rfc3339()),
            _ => return None,
        };
        Some(value)
    }

    fn badge(&self, key: &str) -> Option<BadgeVariant> {
        match key {
            "status" => Some(match self.0.status {
                ListingStatus::Pending => BadgeVariant::Warning,
                ListingStatus::Validated => BadgeVariant::Success,
                ListingStatus::Rejected => BadgeVariant::Danger,
            }),
            _ => None,
        }
    }
}

/// Columns of the "listings awaiting validation" screen.
pub fn listing_columns() -> Vec<TableColumn<ListingRow>> {
    vec![
        TableColumn::new("title", "Title").sortable(),
        TableColumn::new("city", "City").sortable(),
        TableColumn::new("owner.name", "Host").sortable(),
        TableColumn::new("owner.email", "Email"),
        TableColumn::new("pricePerNight", "Price / night")
            .sortable()
            .kind(ColumnKind::Number)
            .align(Align::Right)
            .render(|value, _| match value.and_then(Value::as_i64) {
                Some(price) => format!("{} €", price),
                None => String::new(),
            }),
        TableColumn::new("createdAt", "Submitted").sortable().kind(ColumnKind::Date),
        TableColumn::new("status", "Status").kind(ColumnKind::Badge).width("120px"),
        TableColumn::new("actions", "").kind(ColumnKind::Actions),
    ]
}
