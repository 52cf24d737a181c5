use crate::backend::dispatcher::RequestTicket;
use crate::backend::model::{
    Column, FetchRequest, FetchStatus, Filter, Row, RowId, SortDirection,
};
use crate::config::TableConfig;
use crate::error::TableError;
use ratatui::layout::Rect;
use ratatui::widgets::TableState;
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStep {
    Start,
    Previous,
    Next,
    Last,
}

/// Index of the last non-empty page, or 0 when there are no records.
pub fn last_page_index(total_count: usize, rows_per_page: usize) -> usize {
    let rows_per_page = rows_per_page.max(1);
    let mut index = total_count / rows_per_page;
    if total_count % rows_per_page == 0 {
        index = index.saturating_sub(1);
    }
    index
}

/// Inclusive, 1-based bounds of the records shown on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub lower: usize,
    pub upper: usize,
    pub total: usize,
}

impl PageRange {
    pub fn new(page_index: usize, rows_per_page: usize, total: usize) -> Self {
        let lower = page_index * rows_per_page + 1;
        let upper = ((page_index + 1) * rows_per_page).min(total);
        Self {
            lower,
            upper,
            total,
        }
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{} of {}", self.lower, self.upper, self.total)
    }
}

/// Local, ephemeral state of the table. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub page_index: usize,
    pub rows_per_page: usize,
    pub order_by: String,
    pub order_direction: SortDirection,
    /// Row activated with Enter (or by toggling its checkbox).
    pub selected_row_id: Option<RowId>,
    pub all_selected: bool,
    /// Checked rows, kept apart from the fetched records.
    pub checked: BTreeSet<RowId>,
    pub exporting: bool,
    pub filters: Vec<Filter>,
}

impl ViewState {
    pub fn from_config(config: &TableConfig) -> Self {
        Self {
            page_index: 0,
            rows_per_page: config.rows_per_page,
            order_by: config.id_column.clone(),
            order_direction: SortDirection::Asc,
            selected_row_id: None,
            all_selected: false,
            checked: BTreeSet::new(),
            exporting: false,
            filters: config.filters.clone(),
        }
    }

    pub fn request(&self) -> FetchRequest {
        FetchRequest {
            page_index: self.page_index,
            rows_to_return: self.rows_per_page,
            order: vec![(self.order_by.clone(), self.order_direction)],
            filters: self.filters.clone(),
        }
    }

    pub fn is_checked(&self, id: &RowId) -> bool {
        self.checked.contains(id)
    }
}

/// Latest applied fetch result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableData {
    pub status: FetchStatus,
    pub rows: Vec<Row>,
    pub total_count: usize,
    pub error: Option<TableError>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableModel {
    pub columns: Vec<Column>,
    pub id_column: String,
    pub view: ViewState,
    pub data: TableData,
    /// Only the outcome for this ticket is applied.
    pub latest_request: Option<RequestTicket>,
    pub(crate) next_seq: u64,
}

impl Default for TableModel {
    fn default() -> Self {
        Self::new(&TableConfig::default())
    }
}

impl TableModel {
    pub fn new(config: &TableConfig) -> Self {
        Self {
            columns: config.columns.clone(),
            id_column: config.id_column.clone(),
            view: ViewState::from_config(config),
            data: TableData::default(),
            latest_request: None,
            next_seq: 0,
        }
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn row_id(&self, index: usize) -> Option<RowId> {
        self.data
            .rows
            .get(index)
            .and_then(|row| RowId::from_row(row, &self.id_column))
    }

    /// True when every loaded row is checked. Only the current page counts.
    pub fn all_loaded_checked(&self) -> bool {
        !self.data.rows.is_empty()
            && self.data.rows.iter().all(|row| {
                RowId::from_row(row, &self.id_column)
                    .is_some_and(|id| self.view.checked.contains(&id))
            })
    }

    pub fn range(&self) -> PageRange {
        PageRange::new(
            self.view.page_index,
            self.view.rows_per_page,
            self.data.total_count,
        )
    }

    pub fn last_page(&self) -> usize {
        last_page_index(self.data.total_count, self.view.rows_per_page)
    }

    /// Start/previous controls are disabled on the first page.
    pub fn can_go_back(&self) -> bool {
        self.view.page_index > 0
    }

    /// Next/last controls are disabled once the range reaches the total.
    pub fn can_go_forward(&self) -> bool {
        self.range().upper < self.data.total_count
    }

    pub fn is_busy(&self) -> bool {
        self.data.status == FetchStatus::Requested || self.view.exporting
    }
}

/// Cursor and layout state owned by the terminal UI, not by the reducer.
#[derive(Debug, Default)]
pub struct TableUi {
    pub table_state: TableState,
    pub focused_column: usize,
    /// Area the table was last drawn into; `None` until the first draw.
    pub table_area: Option<Rect>,
    pub tick: u64,
}

impl TableUi {
    pub fn new() -> Self {
        Self {
            table_state: TableState::default().with_selected(Some(0)),
            ..Default::default()
        }
    }

    pub fn cursor(&self) -> Option<usize> {
        self.table_state.selected()
    }
}
