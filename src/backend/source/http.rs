use super::DataSource;
use crate::backend::model::{FetchRequest, FetchResponse};
use crate::error::{Result, TableError};
use log::{debug, warn};
use reqwest::Client;
use reqwest::header::ACCEPT;
use std::time::Duration;

/// POSTs the request body as JSON and expects `{rows, totalCount}` back.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl DataSource for HttpSource {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch(&self, url: &str, request: &FetchRequest) -> Result<FetchResponse> {
        debug!("📡 POST {url} page={} rows={}", request.page_index, request.rows_to_return);
        let response = self
            .client
            .post(url)
            .header(ACCEPT, "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!("❌ {url} answered {status}");
            return Err(TableError::FetchFailed(format!("{status}: {}", text.trim())));
        }

        Ok(response.json::<FetchResponse>().await?)
    }
}
