use serde_json::Value;

use crate::badge::BadgeVariant;
use crate::path;

/// A row the table can display.
///
/// `cell` resolves a column key (a dot-path) to a value; `None` renders as
/// an empty cell. Typed rows should override `badge` to hand the table an
/// explicit variant instead of relying on the status-string lookup.
pub trait TableRow {
    fn cell(&self, key: &str) -> Option<Value>;

    fn badge(&self, key: &str) -> Option<BadgeVariant> {
        self.cell(key)
            .map(|v| BadgeVariant::from_status(&path::stringify(&v)))
    }
}

impl TableRow for Value {
    fn cell(&self, key: &str) -> Option<Value> {
        path::lookup(self, key).cloned()
    }
}
