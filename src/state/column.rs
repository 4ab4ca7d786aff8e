use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::state::data_model::{self, Record};
use crate::state::edit::EditorKind;
use crate::state::filter::FilterType;
use crate::state::sort;

pub type AccessorFn<T> = Arc<dyn Fn(&T) -> Value + Send + Sync>;
pub type CellFn<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;
pub type CompareFn<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;
pub type RowPredicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;
pub type HeaderFn = Arc<dyn Fn() -> String + Send + Sync>;

/// How a column reads its value out of a row.
pub enum Accessor<T> {
    Key(String),
    Fn(AccessorFn<T>),
}

impl<T> Clone for Accessor<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Key(key) => Self::Key(key.clone()),
            Self::Fn(f) => Self::Fn(Arc::clone(f)),
        }
    }
}

pub enum Header {
    Label(String),
    Render(HeaderFn),
}

impl Clone for Header {
    fn clone(&self) -> Self {
        match self {
            Self::Label(label) => Self::Label(label.clone()),
            Self::Render(f) => Self::Render(Arc::clone(f)),
        }
    }
}

impl Header {
    pub fn text(&self) -> String {
        match self {
            Self::Label(label) => label.clone(),
            Self::Render(f) => f(),
        }
    }
}

pub enum Editable<T> {
    No,
    Yes,
    When(RowPredicate<T>),
}

impl<T> Clone for Editable<T> {
    fn clone(&self) -> Self {
        match self {
            Self::No => Self::No,
            Self::Yes => Self::Yes,
            Self::When(f) => Self::When(Arc::clone(f)),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    pub fn css(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

/// Static metadata for one table column.
///
/// `id` keys sort, filter and order state and must be unique within a
/// table. Duplicate ids are not detected.
pub struct ColumnDef<T> {
    pub id: String,
    pub header: Header,
    pub accessor: Accessor<T>,
    pub cell: Option<CellFn<T>>,
    pub sortable: bool,
    pub sort_fn: Option<CompareFn<T>>,
    pub filter: Option<FilterType>,
    pub filter_options: Vec<String>,
    pub editable: Editable<T>,
    pub editor: EditorKind,
    pub width: Option<u32>,
    pub align: Align,
    pub class_name: Option<String>,
}

impl<T> ColumnDef<T> {
    /// A column reading `key` from each row, labelled with the key itself.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            header: Header::Label(id.clone()),
            accessor: Accessor::Key(id.clone()),
            id,
            cell: None,
            sortable: false,
            sort_fn: None,
            filter: None,
            filter_options: Vec::new(),
            editable: Editable::No,
            editor: EditorKind::Text,
            width: None,
            align: Align::Left,
            class_name: None,
        }
    }

    pub fn header(mut self, label: impl Into<String>) -> Self {
        self.header = Header::Label(label.into());
        self
    }

    pub fn header_fn(mut self, f: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.header = Header::Render(Arc::new(f));
        self
    }

    pub fn accessor_key(mut self, key: impl Into<String>) -> Self {
        self.accessor = Accessor::Key(key.into());
        self
    }

    pub fn accessor_fn(mut self, f: impl Fn(&T) -> Value + Send + Sync + 'static) -> Self {
        self.accessor = Accessor::Fn(Arc::new(f));
        self
    }

    pub fn cell(mut self, f: impl Fn(&T) -> String + Send + Sync + 'static) -> Self {
        self.cell = Some(Arc::new(f));
        self
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn sort_with(mut self, f: impl Fn(&T, &T) -> Ordering + Send + Sync + 'static) -> Self {
        self.sortable = true;
        self.sort_fn = Some(Arc::new(f));
        self
    }

    pub fn filterable(mut self, filter: FilterType) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn filter_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter_options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn editable(mut self, editor: EditorKind) -> Self {
        self.editable = Editable::Yes;
        self.editor = editor;
        self
    }

    pub fn editable_when(
        mut self,
        editor: EditorKind,
        predicate: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.editable = Editable::When(Arc::new(predicate));
        self.editor = editor;
        self
    }

    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn header_text(&self) -> String {
        self.header.text()
    }

    pub fn is_filterable(&self) -> bool {
        self.filter.is_some()
    }

    pub fn is_editable(&self, row: &T) -> bool {
        match &self.editable {
            Editable::No => false,
            Editable::Yes => true,
            Editable::When(predicate) => predicate(row),
        }
    }
}

impl<T: Record> ColumnDef<T> {
    /// Resolves the accessor against `row`. A key that the row lacks
    /// yields `None`.
    pub fn value(&self, row: &T) -> Option<Value> {
        match &self.accessor {
            Accessor::Key(key) => row.field(key),
            Accessor::Fn(f) => Some(f(row)),
        }
    }

    /// Text for a read-only cell: the custom renderer when present,
    /// otherwise the value, with `-` for nothing.
    pub fn display(&self, row: &T) -> String {
        match &self.cell {
            Some(f) => f(row),
            None => data_model::cell_text(self.value(row).as_ref()),
        }
    }

    /// Orders two rows by this column, using the custom comparator when one
    /// was supplied.
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        match &self.sort_fn {
            Some(f) => f(a, b),
            None => sort::compare_values(self.value(a).as_ref(), self.value(b).as_ref()),
        }
    }
}

impl<T> Clone for ColumnDef<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            header: self.header.clone(),
            accessor: self.accessor.clone(),
            cell: self.cell.clone(),
            sortable: self.sortable,
            sort_fn: self.sort_fn.clone(),
            filter: self.filter,
            filter_options: self.filter_options.clone(),
            editable: self.editable.clone(),
            editor: self.editor.clone(),
            width: self.width,
            align: self.align,
            class_name: self.class_name.clone(),
        }
    }
}

// Closures compare by identity.
impl<T> PartialEq for ColumnDef<T> {
    fn eq(&self, other: &Self) -> bool {
        let accessor_eq = match (&self.accessor, &other.accessor) {
            (Accessor::Key(a), Accessor::Key(b)) => a == b,
            (Accessor::Fn(a), Accessor::Fn(b)) => Arc::ptr_eq(a, b),
            _ => false,
        };
        let editable_eq = match (&self.editable, &other.editable) {
            (Editable::No, Editable::No) | (Editable::Yes, Editable::Yes) => true,
            (Editable::When(a), Editable::When(b)) => Arc::ptr_eq(a, b),
            _ => false,
        };
        let cell_eq = match (&self.cell, &other.cell) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        };
        self.id == other.id
            && self.header_text() == other.header_text()
            && accessor_eq
            && editable_eq
            && cell_eq
            && self.sortable == other.sortable
            && self.filter == other.filter
            && self.filter_options == other.filter_options
            && self.editor == other.editor
            && self.width == other.width
            && self.align == other.align
            && self.class_name == other.class_name
    }
}

impl<T> fmt::Debug for ColumnDef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDef")
            .field("id", &self.id)
            .field("header", &self.header_text())
            .field("sortable", &self.sortable)
            .field("filter", &self.filter)
            .field("editor", &self.editor)
            .finish_non_exhaustive()
    }
}

/// Looks up a column by id.
pub fn find_column<'a, T>(columns: &'a [ColumnDef<T>], id: &str) -> Option<&'a ColumnDef<T>> {
    columns.iter().find(|column| column.id == id)
}

pub fn column_ids<T>(columns: &[ColumnDef<T>]) -> Vec<String> {
    columns.iter().map(|column| column.id.clone()).collect()
}
