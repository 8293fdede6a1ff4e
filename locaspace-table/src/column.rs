use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Text,
    Number,
    Date,
    Badge,
    Actions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Center,
    Right,
}

pub type CellRenderer<R> = Arc<dyn Fn(Option<&Value>, &R) -> String + Send + Sync>;
pub type RowCallback<R> = Arc<dyn Fn(&R) + Send + Sync>;
pub type RowPredicate<R> = Arc<dyn Fn(&R) -> bool + Send + Sync>;

/// Declarative description of one column.
pub struct TableColumn<R> {
    /// Dot-path into the row.
    pub key: String,
    pub label: String,
    pub sortable: bool,
    pub kind: ColumnKind,
    pub width: Option<String>,
    pub align: Option<Align>,
    pub render: Option<CellRenderer<R>>,
}

impl<R> TableColumn<R> {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            sortable: false,
            kind: ColumnKind::Text,
            width: None,
            align: None,
            render: None,
        }
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn kind(mut self, kind: ColumnKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn width(mut self, width: impl Into<String>) -> Self {
        self.width = Some(width.into());
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = Some(align);
        self
    }

    pub fn render<F>(mut self, render: F) -> Self
    where
        F: Fn(Option<&Value>, &R) -> String + Send + Sync + 'static,
    {
        self.render = Some(Arc::new(render));
        self
    }
}

impl<R> Clone for TableColumn<R> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            label: self.label.clone(),
            sortable: self.sortable,
            kind: self.kind,
            width: self.width.clone(),
            align: self.align,
            render: self.render.clone(),
        }
    }
}

impl<R> fmt::Debug for TableColumn<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableColumn")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("sortable", &self.sortable)
            .field("kind", &self.kind)
            .field("custom_render", &self.render.is_some())
            .finish()
    }
}

/// Per-row action button (edit, validate, delete...).
pub struct TableAction<R> {
    pub label: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub action: RowCallback<R>,
    pub visible: Option<RowPredicate<R>>,
}

impl<R> TableAction<R> {
    pub fn new<F>(label: impl Into<String>, action: F) -> Self
    where
        F: Fn(&R) + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            icon: None,
            color: None,
            action: Arc::new(action),
            visible: None,
        }
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn visible_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&R) -> bool + Send + Sync + 'static,
    {
        self.visible = Some(Arc::new(predicate));
        self
    }

    pub fn is_visible(&self, row: &R) -> bool {
        self.visible.as_ref().map_or(true, |visible| visible(row))
    }
}

impl<R> Clone for TableAction<R> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            icon: self.icon.clone(),
            color: self.color.clone(),
            action: self.action.clone(),
            visible: self.visible.clone(),
        }
    }
}

impl<R> fmt::Debug for TableAction<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableAction")
            .field("label", &self.label)
            .field("icon", &self.icon)
            .field("color", &self.color)
            .finish()
    }
}
