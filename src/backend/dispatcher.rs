//! Sends fetch requests to the data source and reports outcomes on a channel.
//!
//! Every request runs as its own task. Nothing is retried, debounced or
//! cancelled; the receiver decides which outcome is still current by
//! comparing ticket sequence numbers.

use crate::backend::model::{FetchRequest, FetchResponse};
use crate::backend::source::DataSource;
use crate::error::Result;
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::{self, JoinHandle};

/// Identifies one issued request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    pub seq: u64,
    pub fingerprint: String,
}

impl RequestTicket {
    pub fn new(seq: u64, request: &FetchRequest) -> Self {
        Self {
            seq,
            fingerprint: request.fingerprint(),
        }
    }
}

#[derive(Debug)]
pub struct FetchOutcome {
    pub ticket: RequestTicket,
    pub result: Result<FetchResponse>,
}

pub struct FetchDispatcher {
    source: Arc<dyn DataSource>,
    url: String,
    tx: UnboundedSender<FetchOutcome>,
}

impl FetchDispatcher {
    pub fn new(
        source: Arc<dyn DataSource>,
        url: impl Into<String>,
    ) -> (Self, UnboundedReceiver<FetchOutcome>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let dispatcher = Self {
            source,
            url: url.into(),
            tx,
        };
        (dispatcher, rx)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn dispatch(&self, ticket: RequestTicket, request: FetchRequest) -> JoinHandle<()> {
        let source = self.source.clone();
        let url = self.url.clone();
        let tx = self.tx.clone();
        info!(
            "🚀 Fetch #{} ({}) via {}: page={} rows={}",
            ticket.seq,
            ticket.fingerprint,
            source.name(),
            request.page_index,
            request.rows_to_return
        );

        task::spawn(async move {
            let result = source.fetch(&url, &request).await;
            match &result {
                Ok(response) => debug!(
                    "✅ Fetch #{} returned {} of {} rows",
                    ticket.seq,
                    response.rows.len(),
                    response.total_count
                ),
                Err(e) => warn!("❌ Fetch #{} failed: {e}", ticket.seq),
            }
            if tx.send(FetchOutcome { ticket, result }).is_err() {
                debug!("Fetch outcome dropped, receiver closed");
            }
        })
    }
}
