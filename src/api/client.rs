//! API client for communicating with the condominium REST backend.
//!
//! This module provides the `ApiClient` struct for making authenticated
//! requests to fetch statistics, reports, deliveries, reservations,
//! users and announcements.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::models::{Announcement, Delivery, Report, ReportStatus, Reservation, Statistics, User};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Default base URL for the condominium backend.
pub const DEFAULT_BASE_URL: &str = "https://api.condogest.app/v1";

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// API client for the condominium backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client against `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            token: None,
        })
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token),
        }
    }

    // =========================================================================
    // Dashboard data
    // =========================================================================

    /// Fetch the statistics snapshot, scoped to one condominium when an id
    /// is given and aggregated across all of them otherwise.
    pub async fn fetch_statistics(&self, condominium_id: Option<&str>) -> Result<Statistics> {
        let query: Vec<(&str, &str)> = match condominium_id {
            Some(id) => vec![("condominiumId", id)],
            None => Vec::new(),
        };
        self.get_json("statistics", &query).await
    }

    /// Fetch reports, optionally narrowed to a single status.
    pub async fn fetch_reports(&self, status: Option<ReportStatus>) -> Result<Vec<Report>> {
        let query: Vec<(&str, &str)> = match status {
            Some(status) => vec![("status", status.as_str())],
            None => Vec::new(),
        };
        self.get_json("reports", &query).await
    }

    pub async fn fetch_deliveries(&self) -> Result<Vec<Delivery>> {
        self.get_json("deliveries", &[]).await
    }

    pub async fn fetch_reservations(&self) -> Result<Vec<Reservation>> {
        self.get_json("reservations", &[]).await
    }

    pub async fn fetch_users(&self) -> Result<Vec<User>> {
        self.get_json("users", &[]).await
    }

    pub async fn fetch_announcements(&self) -> Result<Vec<Announcement>> {
        self.get_json("announcements", &[]).await
    }

    // =========================================================================
    // Request plumbing
    // =========================================================================

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(%url, "GET");

        let mut request = self.client.get(&url);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", path))?;

        let response = Self::check_response(response).await?;

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse response from {}", path))
    }

    /// Map non-success statuses to `ApiError`, consuming the body for context.
    async fn check_response(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_status(status, &body).into())
    }
}
