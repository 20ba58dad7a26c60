pub mod consumer;
pub mod publisher;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use consumer::{apply_status_update, run_status_consumer, TALHAO_STATUS_SUBJECT};
pub use publisher::{EventPublisher, NatsPublisher, NoopPublisher, PublishError};

pub const PROPRIEDADE_DATA_SUBJECT: &str = "propriedade.data";
pub const TALHAO_DATA_SUBJECT: &str = "talhao.data";

/// Broadcast on propriedade create/update so downstream services can refresh
/// derived views. Not transactional with the write; consumers must tolerate
/// duplicates and gaps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PropriedadeDataMessage {
    pub id: Uuid,
    pub nome: String,
    pub produtor_id: Uuid,
}

/// Broadcast on talhao create/update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TalhaoDataMessage {
    pub id: Uuid,
    pub nome: String,
    pub propriedade_id: Uuid,
}

/// Inbound status change produced by other services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TalhaoStatusUpdateMessage {
    pub talhao_id: Uuid,
    pub status: i16,
}

/// Outbound change-notification events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataEvent {
    Propriedade(PropriedadeDataMessage),
    Talhao(TalhaoDataMessage),
}

impl DataEvent {
    pub fn subject(&self) -> &'static str {
        match self {
            DataEvent::Propriedade(_) => PROPRIEDADE_DATA_SUBJECT,
            DataEvent::Talhao(_) => TALHAO_DATA_SUBJECT,
        }
    }

    pub fn payload(&self) -> Result<Vec<u8>, serde_json::Error> {
        match self {
            DataEvent::Propriedade(msg) => serde_json::to_vec(msg),
            DataEvent::Talhao(msg) => serde_json::to_vec(msg),
        }
    }
}
