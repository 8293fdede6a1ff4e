use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use locaspace_core::{CoreError, CoreResult, ListingApi, Notifier, Toast};
use locaspace_shared::ListingId;
use locaspace_table::{DataTable, TableAction, TableConfig, TableView};

use crate::listing::{listing_columns, ListingRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Validate,
    Reject,
}

type PendingDecisions = Arc<Mutex<Vec<(ListingId, ReviewDecision)>>>;

/// Admin screen listing spaces that wait for moderation.
///
/// Backend failures never remove a row: the listing stays in the queue and
/// an error toast is raised.
pub struct ValidationQueue {
    api: Arc<dyn ListingApi>,
    notifier: Arc<dyn Notifier>,
    table: DataTable<ListingRow>,
    pending: PendingDecisions,
}

impl ValidationQueue {
    pub fn new(api: Arc<dyn ListingApi>, notifier: Arc<dyn Notifier>, page_size: usize) -> Self {
        let pending: PendingDecisions = Arc::new(Mutex::new(Vec::new()));
        let config = TableConfig {
            empty_message: "No listing awaiting validation".to_string(),
            ..TableConfig::default().selectable().page_size(page_size)
        };
        let table = DataTable::new(listing_columns(), config).with_actions(vec![
            review_action("Validate", "check", "success", ReviewDecision::Validate, pending.clone()),
            review_action("Reject", "x", "danger", ReviewDecision::Reject, pending.clone()),
        ]);

        Self {
            api,
            notifier,
            table,
            pending,
        }
    }

    pub fn table(&self) -> &DataTable<ListingRow> {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut DataTable<ListingRow> {
        &mut self.table
    }

    pub fn view(&self) -> TableView {
        self.table.view()
    }

    /// Reload the pending listings. On failure the current rows are kept.
    pub async fn refresh(&mut self) -> CoreResult<()> {
        match self.api.pending_listings().await {
            Ok(listings) => {
                info!(count = listings.len(), "Loaded pending listings");
                self.table.set_data(listings.into_iter().map(ListingRow::from).collect());
                Ok(())
            }
            Err(e) => {
                warn!("Failed to load pending listings: {}", e);
                self.notifier
                    .notify(Toast::error("Loading failed", e.user_message()));
                Err(e)
            }
        }
    }

    pub async fn validate(&mut self, id: &ListingId) -> CoreResult<()> {
        self.review(id, ReviewDecision::Validate).await
    }

    pub async fn reject(&mut self, id: &ListingId) -> CoreResult<()> {
        self.review(id, ReviewDecision::Reject).await
    }

    /// Validate every selected listing. Stops at the first failure.
    pub async fn validate_selected(&mut self) -> CoreResult<usize> {
        let ids: Vec<ListingId> = self
            .table
            .selected_rows()
            .into_iter()
            .map(|row| row.0.id.clone())
            .collect();

        for id in &ids {
            self.validate(id).await?;
        }
        Ok(ids.len())
    }

    /// Trigger the `index`-th visible row action of listing `id`, then run
    /// the decision it recorded.
    pub async fn trigger_action(&mut self, id: &ListingId, index: usize) -> CoreResult<()> {
        let row = self
            .find_row(id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(format!("Listing {}", id)))?;

        if !self.table.trigger_action(index, &row) {
            return Err(CoreError::ValidationError(format!("No action #{} for listing {}", index, id)));
        }
        self.flush_pending().await
    }

    async fn flush_pending(&mut self) -> CoreResult<()> {
        let decisions: Vec<(ListingId, ReviewDecision)> = match self.pending.lock() {
            Ok(mut pending) => pending.drain(..).collect(),
            Err(_) => return Err(CoreError::InternalError("review queue poisoned".to_string())),
        };
        for (id, decision) in decisions {
            self.review(&id, decision).await?;
        }
        Ok(())
    }

    async fn review(&mut self, id: &ListingId, decision: ReviewDecision) -> CoreResult<()> {
        let title = self
            .find_row(id)
            .map(|row| row.0.title.clone())
            .ok_or_else(|| CoreError::NotFound(format!("Listing {}", id)))?;

        let result = match decision {
            ReviewDecision::Validate => self.api.validate_listing(id).await,
            ReviewDecision::Reject => self.api.reject_listing(id).await,
        };

        match result {
            Ok(()) => {
                info!(listing_id = %id, ?decision, "Listing reviewed");
                let remaining = self
                    .table
                    .data()
                    .iter()
                    .filter(|row| &row.0.id != id)
                    .cloned()
                    .collect();
                self.table.set_data(remaining);

                let toast = match decision {
                    ReviewDecision::Validate => Toast::success("Listing validated", format!("\"{}\" is now online.", title)),
                    ReviewDecision::Reject => Toast::success("Listing rejected", format!("\"{}\" has been rejected.", title)),
                };
                self.notifier.notify(toast);
                Ok(())
            }
            Err(e) => {
                warn!(listing_id = %id, ?decision, "Review failed: {}", e);
                self.notifier.notify(Toast::error("Action failed", e.user_message()));
                Err(e)
            }
        }
    }

    fn find_row(&self, id: &ListingId) -> Option<&ListingRow> {
        self.table.data().iter().find(|row| &row.0.id == id)
    }
}

fn review_action(
    label: &str,
    icon: &str,
    color: &str,
    decision: ReviewDecision,
    pending: PendingDecisions,
) -> TableAction<ListingRow> {
    TableAction::new(label, move |row: &ListingRow| {
        if let Ok(mut pending) = pending.lock() {
            pending.push((row.0.id.clone(), decision));
        }
    })
    .icon(icon)
    .color(color)
}
