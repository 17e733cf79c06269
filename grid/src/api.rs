//! Server endpoints behind a trait, with the HTTP implementation.
//!
//! `GET /api/map?last_version_id=..` long-polls: the server holds the request
//! until the grid version differs from `last_version_id` or its own timeout
//! lapses, then answers with a full snapshot either way.
//!
//! `POST /api/cell?x_index=..&y_index=..&color_index=..` applies one write and
//! answers with the version it landed at.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::wire::{CellQuery, CellResponse, MapQuery, MapResponse, VersionId};

const MAP_PATH: &str = "/api/map";
const CELL_PATH: &str = "/api/cell";

/// The two calls the sync engine makes against the grid server.
#[async_trait::async_trait]
pub trait GridApi: Send + Sync {
    /// Fetch a snapshot, long-polling for one newer than `last_version`.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncError`] on network, status, or decode failure.
    async fn fetch_map(&self, last_version: Option<&VersionId>) -> Result<MapResponse, SyncError>;

    /// Write one cell.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncError`] on network, status, or decode failure.
    async fn set_cell(&self, x_index: usize, y_index: usize, color_index: usize) -> Result<CellResponse, SyncError>;
}

pub struct HttpGridApi {
    http: reqwest::Client,
    base_url: String,
    write_timeout: Duration,
}

impl HttpGridApi {
    /// Build a client for the server at `config.base_url`.
    ///
    /// No overall request timeout is set on the client: the long-poll is
    /// bounded by the engine, writes by `write_timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::HttpClientBuild`] if the client cannot be built.
    pub fn new(config: &SyncConfig) -> Result<Self, SyncError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| SyncError::HttpClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            write_timeout: config.write_timeout,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait::async_trait]
impl GridApi for HttpGridApi {
    async fn fetch_map(&self, last_version: Option<&VersionId>) -> Result<MapResponse, SyncError> {
        let query = MapQuery { last_version_id: last_version.map(VersionId::as_str) };
        let response = self
            .http
            .get(self.url(MAP_PATH))
            .query(&query)
            .send()
            .await
            .map_err(|e| SyncError::Network(e.to_string()))?;
        decode(response).await
    }

    async fn set_cell(&self, x_index: usize, y_index: usize, color_index: usize) -> Result<CellResponse, SyncError> {
        let query = CellQuery { x_index, y_index, color_index };
        let response = self
            .http
            .post(self.url(CELL_PATH))
            .query(&query)
            .timeout(self.write_timeout)
            .send()
            .await
            .map_err(|e| SyncError::Network(e.to_string()))?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, SyncError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| SyncError::Network(e.to_string()))?;
    if !status.is_success() {
        return Err(SyncError::Status { status: status.as_u16(), body: text });
    }
    parse_body(&text)
}

pub(crate) fn parse_body<T: DeserializeOwned>(text: &str) -> Result<T, SyncError> {
    serde_json::from_str(text).map_err(|e| SyncError::Decode(e.to_string()))
}
