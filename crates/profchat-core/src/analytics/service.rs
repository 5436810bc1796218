//! Analytics service running both professor lookups for one name.

use tracing::{Instrument, debug, info_span, warn};

use profchat_types::analytics::ProfessorInsights;
use profchat_types::error::AnalyticsError;

use super::source::AnalyticsSource;

/// Runs the sentiment and trends lookups for a professor.
///
/// Generic over `AnalyticsSource`; the HTTP client lives in profchat-infra.
pub struct AnalyticsService<S: AnalyticsSource> {
    source: S,
}

impl<S: AnalyticsSource> AnalyticsService<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Look up both analytics for `name`.
    ///
    /// The two requests run concurrently and their results are kept
    /// separately, so a failed sentiment lookup still reports trends and
    /// vice versa.
    ///
    /// # Errors
    ///
    /// [`AnalyticsError::Validation`] if `name` is blank after trimming.
    pub async fn lookup(&self, name: &str) -> Result<ProfessorInsights, AnalyticsError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AnalyticsError::Validation(
                "professor name is empty".to_string(),
            ));
        }

        let span = info_span!("analytics.lookup", analytics.professor = name);

        let (sentiment, trends) = async {
            tokio::join!(self.source.sentiment(name), self.source.trends(name))
        }
        .instrument(span)
        .await;

        if let Err(err) = &sentiment {
            warn!(professor = name, error = %err, "Sentiment lookup failed");
        }
        if let Err(err) = &trends {
            warn!(professor = name, error = %err, "Trends lookup failed");
        }
        debug!(
            professor = name,
            sentiment_ok = sentiment.is_ok(),
            trends_ok = trends.is_ok(),
            "Analytics lookup finished"
        );

        Ok(ProfessorInsights {
            name: name.to_string(),
            sentiment,
            trends,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use tokio::sync::Notify;

    use profchat_types::analytics::{RatingTrends, SentimentScores};
    use profchat_types::chat::DEFAULT_GREETING;

    use super::*;
    use crate::transcript::TranscriptStore;

    const SCORES: SentimentScores = SentimentScores {
        positive: 0.5,
        neutral: 0.4,
        negative: 0.1,
        compound: 0.71,
    };

    const TRENDS: RatingTrends = RatingTrends {
        average_rating: 4.2,
        review_count: 17,
    };

    struct FixedSource {
        sentiment: Result<SentimentScores, AnalyticsError>,
        trends: Result<RatingTrends, AnalyticsError>,
        names: Mutex<Vec<String>>,
    }

    impl FixedSource {
        fn new(
            sentiment: Result<SentimentScores, AnalyticsError>,
            trends: Result<RatingTrends, AnalyticsError>,
        ) -> Self {
            Self {
                sentiment,
                trends,
                names: Mutex::new(Vec::new()),
            }
        }
    }

    impl AnalyticsSource for FixedSource {
        async fn sentiment(&self, name: &str) -> Result<SentimentScores, AnalyticsError> {
            self.names.lock().unwrap().push(name.to_string());
            self.sentiment.clone()
        }

        async fn trends(&self, name: &str) -> Result<RatingTrends, AnalyticsError> {
            self.names.lock().unwrap().push(name.to_string());
            self.trends.clone()
        }
    }

    #[tokio::test]
    async fn both_lookups_succeed() {
        let svc = AnalyticsService::new(FixedSource::new(Ok(SCORES), Ok(TRENDS)));

        let insights = svc.lookup("Dr. Smith").await.unwrap();

        assert_eq!(insights.name, "Dr. Smith");
        assert_eq!(insights.sentiment, Ok(SCORES));
        assert_eq!(insights.trends, Ok(TRENDS));
        assert!(insights.has_any());
    }

    #[tokio::test]
    async fn unknown_name_reports_each_lookup_independently() {
        let svc = AnalyticsService::new(FixedSource::new(
            Err(AnalyticsError::NotFound("Nobody".to_string())),
            Ok(RatingTrends {
                average_rating: 0.0,
                review_count: 0,
            }),
        ));
        let store = TranscriptStore::new(DEFAULT_GREETING);
        let before = store.snapshot();

        let insights = svc.lookup("Nobody").await.unwrap();

        assert_eq!(
            insights.sentiment,
            Err(AnalyticsError::NotFound("Nobody".to_string()))
        );
        assert_eq!(insights.trends.unwrap().review_count, 0);
        assert_eq!(store.snapshot(), before);
    }

    #[tokio::test]
    async fn both_failures_are_still_an_ok_lookup() {
        let svc = AnalyticsService::new(FixedSource::new(
            Err(AnalyticsError::Transport {
                message: "connection refused".to_string(),
            }),
            Err(AnalyticsError::Decode("expected value".to_string())),
        ));

        let insights = svc.lookup("Dr. Smith").await.unwrap();

        assert!(!insights.has_any());
        assert!(matches!(insights.trends, Err(AnalyticsError::Decode(_))));
    }

    #[tokio::test]
    async fn blank_name_is_rejected_without_requests() {
        let svc = AnalyticsService::new(FixedSource::new(Ok(SCORES), Ok(TRENDS)));

        let err = svc.lookup("  \t").await.unwrap_err();

        assert!(matches!(err, AnalyticsError::Validation(_)));
        assert!(svc.source().names.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn name_is_trimmed_before_lookup() {
        let svc = AnalyticsService::new(FixedSource::new(Ok(SCORES), Ok(TRENDS)));

        let insights = svc.lookup("  Dr. Smith \n").await.unwrap();

        assert_eq!(insights.name, "Dr. Smith");
        let names = svc.source().names.lock().unwrap().clone();
        assert_eq!(names, vec!["Dr. Smith".to_string(), "Dr. Smith".to_string()]);
    }

    /// Sentiment only resolves after trends has run.
    struct OrderedSource {
        trends_done: Notify,
    }

    impl AnalyticsSource for OrderedSource {
        async fn sentiment(&self, _name: &str) -> Result<SentimentScores, AnalyticsError> {
            self.trends_done.notified().await;
            Ok(SCORES)
        }

        async fn trends(&self, _name: &str) -> Result<RatingTrends, AnalyticsError> {
            self.trends_done.notify_one();
            Ok(TRENDS)
        }
    }

    #[tokio::test]
    async fn lookups_run_concurrently() {
        let svc = AnalyticsService::new(OrderedSource {
            trends_done: Notify::new(),
        });

        let insights = tokio::time::timeout(Duration::from_secs(5), svc.lookup("Dr. Smith"))
            .await
            .expect("lookups should not wait on each other")
            .unwrap();

        assert!(insights.sentiment.is_ok());
        assert!(insights.trends.is_ok());
    }
}
