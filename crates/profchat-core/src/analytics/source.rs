//! AnalyticsSource trait definition.

use std::future::Future;

use profchat_types::analytics::{RatingTrends, SentimentScores};
use profchat_types::error::AnalyticsError;

/// Port for the analytics endpoints.
///
/// `name` is passed through as given (already trimmed by the service);
/// implementations are responsible for encoding it.
pub trait AnalyticsSource: Send + Sync {
    /// Aggregated sentiment across the professor's reviews.
    fn sentiment(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<SentimentScores, AnalyticsError>> + Send;

    /// Average rating and review count.
    fn trends(&self, name: &str) -> impl Future<Output = Result<RatingTrends, AnalyticsError>> + Send;
}
