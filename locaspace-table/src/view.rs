use serde::Serialize;

use crate::badge::BadgeVariant;
use crate::column::{Align, ColumnKind};
use crate::pagination::PageItem;
use crate::row::TableRow;
use crate::table::{DataTable, SortDirection};

#[derive(Debug, Clone, Serialize)]
pub struct HeaderView {
    pub key: String,
    pub label: String,
    pub kind: ColumnKind,
    pub sortable: bool,
    pub sorted: Option<SortDirection>,
    pub width: Option<String>,
    pub align: Option<Align>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CellView {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<BadgeVariant>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RowView {
    pub id: Option<String>,
    pub selected: bool,
    pub cells: Vec<CellView>,
    pub actions: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmptyState {
    pub message: String,
    pub colspan: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginationView {
    pub current_page: usize,
    pub total_pages: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub has_previous: bool,
    pub has_next: bool,
    pub pages: Vec<PageItem>,
}

/// Serializable snapshot of what the table currently displays.
#[derive(Debug, Clone, Serialize)]
pub struct TableView {
    pub headers: Vec<HeaderView>,
    pub rows: Vec<RowView>,
    pub empty: Option<EmptyState>,
    pub search_term: String,
    pub selected_count: usize,
    pub page_fully_selected: bool,
    pub page_partially_selected: bool,
    pub pagination: Option<PaginationView>,
}

impl<R: TableRow> DataTable<R> {
    pub fn view(&self) -> TableView {
        let headers = self
            .columns()
            .iter()
            .map(|c| HeaderView {
                key: c.key.clone(),
                label: c.label.clone(),
                kind: c.kind,
                sortable: c.sortable && self.config().sortable,
                sorted: self.sort_direction_for(&c.key),
                width: c.width.clone(),
                align: c.align,
            })
            .collect();

        let rows = self
            .page_rows()
            .into_iter()
            .map(|row| RowView {
                id: self.row_id(row),
                selected: self.is_selected(row),
                cells: self
                    .columns()
                    .iter()
                    .map(|c| CellView {
                        text: self.render_cell(c, row),
                        badge: match c.kind {
                            ColumnKind::Badge => row.badge(&c.key),
                            _ => None,
                        },
                    })
                    .collect(),
                actions: self
                    .visible_actions(row)
                    .into_iter()
                    .map(|a| a.label.clone())
                    .collect(),
            })
            .collect();

        let empty = self.is_empty().then(|| EmptyState {
            message: self.config().empty_message.clone(),
            colspan: self.colspan(),
        });

        let pagination = self.config().pagination.then(|| PaginationView {
            current_page: self.current_page(),
            total_pages: self.total_pages(),
            page_size: self.page_size(),
            total_items: self.filtered_len(),
            has_previous: self.has_previous_page(),
            has_next: self.has_next_page(),
            pages: self.visible_pages(),
        });

        TableView {
            headers,
            rows,
            empty,
            search_term: self.search_term().to_string(),
            selected_count: self.selected_count(),
            page_fully_selected: self.is_page_fully_selected(),
            page_partially_selected: self.is_page_partially_selected(),
            pagination,
        }
    }
}
