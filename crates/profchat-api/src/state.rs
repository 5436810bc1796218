//! Application state wiring the services together.
//!
//! The services are generic over the core ports; AppState pins them to the
//! HTTP implementations from profchat-infra. Both share one transcript store
//! and one HTTP client.

use std::sync::Arc;

use profchat_core::analytics::AnalyticsService;
use profchat_core::chat::ChatService;
use profchat_core::transcript::TranscriptStore;
use profchat_infra::http::{HttpAnalyticsClient, HttpChatTransport, build_client};
use profchat_types::config::ClientConfig;

pub type ConcreteChatService = ChatService<HttpChatTransport>;
pub type ConcreteAnalyticsService = AnalyticsService<HttpAnalyticsClient>;

/// Shared application state for the CLI commands.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ClientConfig>,
    pub store: TranscriptStore,
    pub chat: Arc<ConcreteChatService>,
    pub analytics: Arc<ConcreteAnalyticsService>,
}

impl AppState {
    /// Wire services from `config`. Nothing touches the network here.
    pub fn init(config: ClientConfig) -> anyhow::Result<Self> {
        let client = build_client(&config.http)?;

        let store = TranscriptStore::with_capacity(config.greeting.clone(), config.chat.event_capacity);

        let transport = HttpChatTransport::new(client.clone(), config.chat.url.clone());
        let chat = ChatService::new(transport, store.clone())
            .with_idle_timeout(config.chat.idle_timeout());

        let analytics =
            AnalyticsService::new(HttpAnalyticsClient::new(client, config.analytics.base_url.clone()));

        tracing::debug!(
            chat_url = %config.chat.url,
            analytics_url = %config.analytics.base_url,
            "Application state initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            store,
            chat: Arc::new(chat),
            analytics: Arc::new(analytics),
        })
    }
}
