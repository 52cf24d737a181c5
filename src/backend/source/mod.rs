//! Data sources answering [`FetchRequest`]s.
//!
//! The table never talks to a server directly: it hands requests to a
//! [`DataSource`] chosen at startup.

pub mod http;
pub mod sqlite;

use crate::backend::model::{FetchRequest, FetchResponse};
use crate::error::Result;

pub use http::HttpSource;
pub use sqlite::SqliteSource;

#[async_trait::async_trait]
pub trait DataSource: Send + Sync {
    /// Short name for logs (e.g. "http", "sqlite")
    fn name(&self) -> &'static str;

    /// Loads one page of rows plus the total row count.
    async fn fetch(&self, url: &str, request: &FetchRequest) -> Result<FetchResponse>;
}
