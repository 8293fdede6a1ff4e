use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::debug;

use crate::column::{ColumnKind, TableAction, TableColumn};
use crate::config::TableConfig;
use crate::pagination::{self, PageItem};
use crate::path;
use crate::row::TableRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub column: String,
    pub direction: SortDirection,
}

/// Session state of one table instance.
///
/// The table never owns the lifecycle of its rows: callers push a new data
/// set with [`DataTable::set_data`] and every derived view (filtered rows,
/// sort order, page slice) is recomputed from it. Filtered and paged views
/// are kept as indices into `data` so that selections always resolve to the
/// caller's original rows.
pub struct DataTable<R> {
    data: Vec<R>,
    columns: Vec<TableColumn<R>>,
    actions: Vec<TableAction<R>>,
    config: TableConfig,
    search_term: String,
    filtered: Vec<usize>,
    selected: HashSet<String>,
    sort: Option<SortState>,
    current_page: usize,
}

impl<R: TableRow> DataTable<R> {
    pub fn new(columns: Vec<TableColumn<R>>, config: TableConfig) -> Self {
        Self {
            data: Vec::new(),
            columns,
            actions: Vec::new(),
            config,
            search_term: String::new(),
            filtered: Vec::new(),
            selected: HashSet::new(),
            sort: None,
            current_page: 1,
        }
    }

    pub fn with_actions(mut self, actions: Vec<TableAction<R>>) -> Self {
        self.actions = actions;
        self
    }

    pub fn with_data(mut self, data: Vec<R>) -> Self {
        self.set_data(data);
        self
    }

    // ------------------------------------------------------------------
    // Inputs
    // ------------------------------------------------------------------

    /// Replace the data set. Selected ids that no longer exist are dropped.
    pub fn set_data(&mut self, data: Vec<R>) {
        self.data = data;
        let known: HashSet<String> = self.data.iter().filter_map(|row| self.row_id(row)).collect();
        self.selected.retain(|id| known.contains(id));
        self.recompute();
    }

    pub fn set_columns(&mut self, columns: Vec<TableColumn<R>>) {
        self.columns = columns;
        if let Some(sort) = &self.sort {
            if !self.columns.iter().any(|c| c.key == sort.column) {
                self.sort = None;
            }
        }
        self.recompute();
    }

    pub fn set_config(&mut self, config: TableConfig) {
        let id_changed = config.id_field != self.config.id_field;
        self.config = config;
        if id_changed || !self.config.selectable {
            self.selected.clear();
        }
        self.recompute();
    }

    pub fn data(&self) -> &[R] {
        &self.data
    }

    pub fn columns(&self) -> &[TableColumn<R>] {
        &self.columns
    }

    pub fn actions(&self) -> &[TableAction<R>] {
        &self.actions
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Search & sort
    // ------------------------------------------------------------------

    /// Keep rows where any column contains `term`, case-insensitively.
    pub fn on_search(&mut self, term: &str) {
        if !self.config.searchable {
            return;
        }
        self.search_term = term.to_string();
        self.current_page = 1;
        self.recompute();
        debug!(term, matches = self.filtered.len(), "table search");
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Sort by `column_key`, flipping the direction when it is already the
    /// sort column.
    pub fn on_sort(&mut self, column_key: &str) {
        if !self.config.sortable {
            return;
        }
        let Some(column) = self.columns.iter().find(|c| c.key == column_key) else {
            return;
        };
        if !column.sortable {
            return;
        }

        self.sort = Some(match self.sort.take() {
            Some(current) if current.column == column_key => SortState {
                column: current.column,
                direction: current.direction.flipped(),
            },
            _ => SortState {
                column: column_key.to_string(),
                direction: SortDirection::Asc,
            },
        });
        self.recompute();
    }

    pub fn sort_state(&self) -> Option<&SortState> {
        self.sort.as_ref()
    }

    pub fn sort_direction_for(&self, column_key: &str) -> Option<SortDirection> {
        self.sort
            .as_ref()
            .filter(|s| s.column == column_key)
            .map(|s| s.direction)
    }

    // ------------------------------------------------------------------
    // Pagination
    // ------------------------------------------------------------------

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.config.page_size
    }

    /// A page size of 0 puts every row on a single page.
    fn is_paged(&self) -> bool {
        self.config.pagination && self.config.page_size > 0
    }

    pub fn total_pages(&self) -> usize {
        if !self.is_paged() {
            return usize::from(!self.filtered.is_empty());
        }
        pagination::total_pages(self.filtered.len(), self.config.page_size)
    }

    /// Move to `page`. Pages outside `1..=total_pages` are ignored, which is
    /// what a disabled pager button amounts to.
    pub fn change_page(&mut self, page: usize) -> bool {
        if page < 1 || page > self.total_pages() {
            return false;
        }
        self.current_page = page;
        true
    }

    pub fn has_previous_page(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next_page(&self) -> bool {
        self.current_page < self.total_pages()
    }

    pub fn visible_pages(&self) -> Vec<PageItem> {
        pagination::visible_pages(self.current_page, self.total_pages())
    }

    /// Rows matching the current search, in display order.
    pub fn filtered_rows(&self) -> Vec<&R> {
        self.filtered.iter().map(|&i| &self.data[i]).collect()
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    /// Rows of the current page, in display order.
    pub fn page_rows(&self) -> Vec<&R> {
        self.page_indices().into_iter().map(|i| &self.data[i]).collect()
    }

    fn page_indices(&self) -> Vec<usize> {
        if !self.is_paged() {
            return self.filtered.clone();
        }
        let size = self.config.page_size;
        let start = (self.current_page - 1).saturating_mul(size);
        self.filtered.iter().skip(start).take(size).copied().collect()
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    pub fn row_id(&self, row: &R) -> Option<String> {
        row.cell(&self.config.id_field)
            .filter(|v| !v.is_null())
            .map(|v| path::stringify(&v))
    }

    pub fn is_selected(&self, row: &R) -> bool {
        self.row_id(row).is_some_and(|id| self.selected.contains(&id))
    }

    /// Flip the selection of one row and return the full selection.
    pub fn toggle_row(&mut self, row: &R) -> Vec<&R> {
        if let Some(id) = self.row_id(row) {
            self.toggle_id(&id);
        }
        self.selected_rows()
    }

    pub fn toggle_row_by_id(&mut self, id: &str) -> Vec<&R> {
        self.toggle_id(id);
        self.selected_rows()
    }

    fn toggle_id(&mut self, id: &str) {
        if !self.config.selectable {
            return;
        }
        if !self.selected.remove(id) && self.contains_id(id) {
            self.selected.insert(id.to_string());
        }
    }

    /// Select or unselect every row of the current page only.
    pub fn toggle_all_rows(&mut self, checked: bool) -> Vec<&R> {
        if self.config.selectable {
            let ids: Vec<String> = self
                .page_indices()
                .into_iter()
                .filter_map(|i| self.row_id(&self.data[i]))
                .collect();
            for id in ids {
                if checked {
                    self.selected.insert(id);
                } else {
                    self.selected.remove(&id);
                }
            }
        }
        self.selected_rows()
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Selected rows resolved from the original data, in data order.
    pub fn selected_rows(&self) -> Vec<&R> {
        self.data
            .iter()
            .filter(|row| self.is_selected(row))
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn is_page_fully_selected(&self) -> bool {
        let page = self.page_rows();
        !page.is_empty() && page.iter().all(|row| self.is_selected(row))
    }

    pub fn is_page_partially_selected(&self) -> bool {
        let page = self.page_rows();
        let count = page.iter().filter(|row| self.is_selected(row)).count();
        count > 0 && count < page.len()
    }

    fn contains_id(&self, id: &str) -> bool {
        self.data
            .iter()
            .any(|row| self.row_id(row).as_deref() == Some(id))
    }

    // ------------------------------------------------------------------
    // Rendering helpers
    // ------------------------------------------------------------------

    /// Display text of a cell. Missing values render as an empty string.
    pub fn render_cell(&self, column: &TableColumn<R>, row: &R) -> String {
        let value = row.cell(&column.key);
        if let Some(render) = &column.render {
            return render(value.as_ref(), row);
        }
        let Some(value) = value else {
            return String::new();
        };

        match column.kind {
            ColumnKind::Actions => String::new(),
            ColumnKind::Date => format_date(&value),
            ColumnKind::Text | ColumnKind::Number | ColumnKind::Badge => path::stringify(&value),
        }
    }

    pub fn visible_actions(&self, row: &R) -> Vec<&TableAction<R>> {
        self.actions.iter().filter(|a| a.is_visible(row)).collect()
    }

    /// Run the `index`-th visible action on `row`.
    pub fn trigger_action(&self, index: usize, row: &R) -> bool {
        match self.visible_actions(row).get(index) {
            Some(action) => {
                (action.action)(row);
                true
            }
            None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of columns the empty-state row spans.
    pub fn colspan(&self) -> usize {
        self.columns.len()
            + usize::from(self.config.selectable)
            + usize::from(!self.actions.is_empty() && !self.has_actions_column())
    }

    fn has_actions_column(&self) -> bool {
        self.columns.iter().any(|c| c.kind == ColumnKind::Actions)
    }

    // ------------------------------------------------------------------
    // Derived state
    // ------------------------------------------------------------------

    fn recompute(&mut self) {
        let term = self.search_term.to_lowercase();
        let mut filtered: Vec<usize> = (0..self.data.len())
            .filter(|&i| term.is_empty() || self.matches(&self.data[i], &term))
            .collect();

        if let Some(sort) = &self.sort {
            let key = sort.column.as_str();
            let direction = sort.direction;
            filtered.sort_by(|&a, &b| {
                let ordering = compare_values(self.data[a].cell(key).as_ref(), self.data[b].cell(key).as_ref());
                match direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }

        self.filtered = filtered;
        let total = self.total_pages().max(1);
        if self.current_page > total {
            self.current_page = total;
        }
    }

    fn matches(&self, row: &R, term: &str) -> bool {
        self.columns.iter().any(|column| {
            row.cell(&column.key)
                .map(|v| path::stringify(&v).to_lowercase().contains(term))
                .unwrap_or(false)
        })
    }
}

/// Generic `<` / `>` comparison: numbers numerically, strings
/// lexicographically. Values of different kinds are ordered by kind, and
/// missing values sort after everything else, so the order stays total.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            Some(Value::Number(_)) => 0,
            Some(Value::String(_)) => 1,
            Some(Value::Bool(_)) => 2,
            _ => 3,
        }
    }

    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.total_cmp(&y)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

fn format_date(value: &Value) -> String {
    let Some(raw) = value.as_str() else {
        return path::stringify(value);
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%d/%m/%Y").to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%d/%m/%Y").to_string();
    }
    raw.to_string()
}
