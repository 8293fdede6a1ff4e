use serde::{Deserialize, Serialize};

/// Table-level switches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub searchable: bool,
    pub sortable: bool,
    pub pagination: bool,
    pub page_size: usize,
    pub selectable: bool,
    /// Dot-path of the row identity.
    pub id_field: String,
    pub empty_message: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            searchable: true,
            sortable: true,
            pagination: true,
            page_size: 10,
            selectable: false,
            id_field: "id".to_string(),
            empty_message: "No data available".to_string(),
        }
    }
}

impl TableConfig {
    pub fn selectable(mut self) -> Self {
        self.selectable = true;
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }
}
