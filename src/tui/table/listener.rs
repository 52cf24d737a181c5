//! Callbacks the host receives from the table.

use crate::backend::model::RowId;
use crate::error::TableError;
use log::{info, warn};
use std::path::Path;

/// Every method has a logging default, so hosts only override what they need.
pub trait TableListener: Send {
    fn on_row_selected(&mut self, id: &RowId) {
        info!("Row {id} selected");
    }

    fn on_error_received(&mut self, error: &TableError) {
        warn!("(table) => Error received: {error}");
    }

    /// Extension point for the `Edit` link; nothing is opened by default.
    fn on_edit_requested(&mut self, id: &RowId) {
        info!("Edit requested for row {id}, no editor attached");
    }

    fn on_exported(&mut self, path: &Path) {
        info!("Table exported to {}", path.display());
    }

    /// Text shown under the table, if any.
    fn status(&self) -> Option<&str> {
        None
    }
}

/// Keeps the latest callback as a one-line status message.
#[derive(Debug, Default)]
pub struct StatusLine {
    message: Option<String>,
}

impl TableListener for StatusLine {
    fn on_row_selected(&mut self, id: &RowId) {
        info!("Row {id} selected");
        self.message = Some(format!("Row {id} selected"));
    }

    fn on_error_received(&mut self, error: &TableError) {
        warn!("(table) => Error received: {error}");
        self.message = Some(format!("Error: {error}"));
    }

    fn on_edit_requested(&mut self, id: &RowId) {
        info!("Edit requested for row {id}, no editor attached");
        self.message = Some(format!("Edit row {id}: not available"));
    }

    fn on_exported(&mut self, path: &Path) {
        info!("Table exported to {}", path.display());
        self.message = Some(format!("Saved {}", path.display()));
    }

    fn status(&self) -> Option<&str> {
        self.message.as_deref()
    }
}
