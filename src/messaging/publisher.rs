use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

use super::DataEvent;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Failed to serialize event: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Fire-and-forget change notification. At most one attempt per event;
/// callers treat failure as a logged side effect, never as a request error.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: DataEvent) -> Result<(), PublishError>;
}

/// Publishes JSON events to NATS subjects.
pub struct NatsPublisher {
    client: async_nats::Client,
}

impl NatsPublisher {
    pub async fn connect(url: &str) -> Result<Self, PublishError> {
        let client = async_nats::connect(url)
            .await
            .map_err(|e| PublishError::Transport(e.to_string()))?;
        info!(url, "Connected to NATS");
        Ok(Self { client })
    }

    /// Handle for subscribers sharing this connection.
    pub fn client(&self) -> async_nats::Client {
        self.client.clone()
    }
}

#[async_trait]
impl EventPublisher for NatsPublisher {
    async fn publish(&self, event: DataEvent) -> Result<(), PublishError> {
        let payload = event.payload()?;
        self.client
            .publish(event.subject().to_string(), payload.into())
            .await
            .map_err(|e| PublishError::Transport(e.to_string()))
    }
}

/// Stand-in when no bus is configured: drops events with a debug log.
pub struct NoopPublisher;

#[async_trait]
impl EventPublisher for NoopPublisher {
    async fn publish(&self, event: DataEvent) -> Result<(), PublishError> {
        debug!(subject = event.subject(), "No publisher configured; dropping event");
        Ok(())
    }
}
