//! Data sources for diagram payloads.
//!
//! A source is one non-cancelable fetch per load; retries and timeouts are
//! the transport's business. The engine only sees the decoded JSON document.

use crate::Result;
use serde_json::Value;
use std::future::Future;
use std::path::PathBuf;

pub trait FlowDataSource {
    fn fetch(&self) -> impl Future<Output = Result<Value>> + Send;
}

/// Fetches the payload with a single HTTP GET against a fixed resource URL.
#[derive(Debug, Clone)]
pub struct HttpDataSource {
    client: reqwest::Client,
    url: String,
}

impl HttpDataSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl FlowDataSource for HttpDataSource {
    async fn fetch(&self) -> Result<Value> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json::<Value>().await?)
    }
}

/// Reads the payload from a local JSON file. Used by the CLI and by hosts
/// that ship bundled datasets.
#[derive(Debug, Clone)]
pub struct FileDataSource {
    path: PathBuf,
}

impl FileDataSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FlowDataSource for FileDataSource {
    async fn fetch(&self) -> Result<Value> {
        let text = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&text).map_err(userflow_core::Error::from)?)
    }
}
