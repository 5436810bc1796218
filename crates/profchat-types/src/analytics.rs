//! Professor analytics types.
//!
//! Results of the two side lookups (sentiment and rating trends). These are
//! stateless point-in-time values and never part of the chat transcript.

use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;

/// Aggregated review sentiment for one professor.
///
/// Accepts both the long field names and the short VADER names
/// (`pos`, `neu`, `neg`) on input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScores {
    #[serde(alias = "pos")]
    pub positive: f64,
    #[serde(alias = "neu")]
    pub neutral: f64,
    #[serde(alias = "neg")]
    pub negative: f64,
    pub compound: f64,
}

/// Per-review sentiment as returned alongside the aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewSentiment {
    pub professor: String,
    pub review: String,
    pub sentiment: SentimentScores,
}

/// Body of the sentiment endpoint.
///
/// The endpoint either answers with the bare scores or wraps them in an
/// envelope together with the individual reviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SentimentResponse {
    Envelope {
        sentiment: SentimentScores,
        #[serde(default)]
        reviews: Vec<ReviewSentiment>,
    },
    Flat(SentimentScores),
}

impl SentimentResponse {
    pub fn scores(&self) -> SentimentScores {
        match self {
            SentimentResponse::Envelope { sentiment, .. } => *sentiment,
            SentimentResponse::Flat(scores) => *scores,
        }
    }
}

/// Rating trend summary for one professor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingTrends {
    pub average_rating: f64,
    pub review_count: u64,
}

/// Outcome of looking up both analytics for one name.
///
/// The two lookups are independent: either may fail while the other
/// succeeds.
#[derive(Debug, Clone)]
pub struct ProfessorInsights {
    pub name: String,
    pub sentiment: Result<SentimentScores, AnalyticsError>,
    pub trends: Result<RatingTrends, AnalyticsError>,
}

impl ProfessorInsights {
    /// Whether at least one lookup produced data.
    pub fn has_any(&self) -> bool {
        self.sentiment.is_ok() || self.trends.is_ok()
    }
}
