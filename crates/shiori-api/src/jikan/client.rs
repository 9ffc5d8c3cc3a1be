use reqwest::Client;

use shiori_core::models::{MediaSummary, MediaType};

use super::error::JikanError;
use super::types::{JikanDetailResponse, JikanListResponse};
use crate::traits::CatalogService;

const BASE_URL: &str = "https://api.jikan.moe/v4";

/// Jikan (unofficial MyAnimeList) REST v4 client. No authentication.
pub struct JikanClient {
    base_url: String,
    http: Client,
}

impl JikanClient {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL.into())
    }

    /// Point the client at a different Jikan deployment (self-hosted, tests).
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Check the HTTP response for errors and return the body text on failure.
    async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, JikanError> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            let status = resp.status().as_u16();
            tracing::warn!(status, "Jikan API error");
            let body = resp.text().await.unwrap_or_default();
            Err(JikanError::Api {
                status,
                message: body,
            })
        }
    }
}

impl Default for JikanClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogService for JikanClient {
    type Error = JikanError;

    async fn top(&self, media: MediaType) -> Result<Vec<MediaSummary>, JikanError> {
        let url = format!("{}/top/{}", self.base_url, media.as_str());
        tracing::debug!(%url, "fetching top list");

        let resp = self.http.get(&url).send().await?;
        let resp = Self::check_response(resp).await?;
        let list: JikanListResponse = resp
            .json()
            .await
            .map_err(|e| JikanError::Parse(e.to_string()))?;

        Ok(list
            .data
            .into_iter()
            .map(|item| item.into_summary(media))
            .collect())
    }

    async fn details(&self, media: MediaType, mal_id: i64) -> Result<MediaSummary, JikanError> {
        let url = format!("{}/{}/{mal_id}", self.base_url, media.as_str());
        tracing::debug!(%url, "fetching details");

        let resp = self.http.get(&url).send().await?;
        let resp = Self::check_response(resp).await?;
        let detail: JikanDetailResponse = resp
            .json()
            .await
            .map_err(|e| JikanError::Parse(e.to_string()))?;

        Ok(detail.data.into_summary(media))
    }
}
