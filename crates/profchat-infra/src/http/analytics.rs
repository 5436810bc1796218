//! HttpAnalyticsClient: concrete [`AnalyticsSource`] for the analytics endpoints.
//!
//! - `GET {base}/get_professor_sentiment?name=<name>`
//! - `GET {base}/get_professor_trends?name=<name>`

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;

use profchat_core::analytics::source::AnalyticsSource;
use profchat_types::analytics::{RatingTrends, SentimentResponse, SentimentScores};
use profchat_types::error::AnalyticsError;

const SENTIMENT_PATH: &str = "/get_professor_sentiment";
const TRENDS_PATH: &str = "/get_professor_trends";

/// Professor analytics over HTTP.
pub struct HttpAnalyticsClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAnalyticsClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        name: &str,
    ) -> Result<T, AnalyticsError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, professor = name, "Analytics request");

        let response = self
            .client
            .get(&url)
            .query(&[("name", name)])
            .send()
            .await
            .map_err(|e| AnalyticsError::Transport {
                message: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AnalyticsError::NotFound(name.to_string()));
        }
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(AnalyticsError::Transport {
                message: format!("HTTP {status}: {error_body}"),
            });
        }

        let body = response.bytes().await.map_err(|e| AnalyticsError::Transport {
            message: format!("response body read: {e}"),
        })?;
        serde_json::from_slice(&body)
            .map_err(|e| AnalyticsError::Decode(format!("failed to parse {path} response: {e}")))
    }
}

impl AnalyticsSource for HttpAnalyticsClient {
    async fn sentiment(&self, name: &str) -> Result<SentimentScores, AnalyticsError> {
        let response: SentimentResponse = self.get_json(SENTIMENT_PATH, name).await?;
        Ok(response.scores())
    }

    async fn trends(&self, name: &str) -> Result<RatingTrends, AnalyticsError> {
        self.get_json(TRENDS_PATH, name).await
    }
}
