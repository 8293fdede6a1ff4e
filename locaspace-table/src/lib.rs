//! Client-side data table: search, sort, pagination and row selection over
//! an in-memory data set, driven by declarative column and action
//! descriptors.

pub mod badge;
pub mod column;
pub mod config;
pub mod pagination;
pub mod path;
pub mod row;
pub mod table;
pub mod view;

pub use badge::BadgeVariant;
pub use column::{Align, ColumnKind, TableAction, TableColumn};
pub use config::TableConfig;
pub use pagination::{total_pages, visible_pages, PageItem};
pub use row::TableRow;
pub use table::{DataTable, SortDirection, SortState};
pub use view::TableView;
