use futures::StreamExt;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::TalhaoStatusUpdateMessage;
use crate::database::models::StatusTalhao;
use crate::database::repository::TalhaoRepository;

pub const TALHAO_STATUS_SUBJECT: &str = "talhao.status";

/// Background loop applying status updates published by other services.
/// Bad payloads and unknown talhoes are logged and skipped; the loop only
/// ends when the subscription does.
pub async fn run_status_consumer(
    client: async_nats::Client,
    repository: Arc<dyn TalhaoRepository>,
) {
    let mut subscriber = match client.subscribe(TALHAO_STATUS_SUBJECT.to_string()).await {
        Ok(subscriber) => subscriber,
        Err(e) => {
            error!(subject = TALHAO_STATUS_SUBJECT, error = %e, "Failed to subscribe");
            return;
        }
    };

    info!(subject = TALHAO_STATUS_SUBJECT, "Status consumer started");

    while let Some(message) = subscriber.next().await {
        match serde_json::from_slice::<TalhaoStatusUpdateMessage>(&message.payload) {
            Ok(update) => apply_status_update(repository.as_ref(), update).await,
            Err(e) => warn!(error = %e, "Ignoring malformed status message"),
        }
    }

    warn!(subject = TALHAO_STATUS_SUBJECT, "Status consumer stopped");
}

/// Validates and applies one status update.
pub async fn apply_status_update(
    repository: &dyn TalhaoRepository,
    update: TalhaoStatusUpdateMessage,
) {
    let status = match StatusTalhao::try_from(update.status) {
        Ok(status) => status,
        Err(code) => {
            warn!(talhao_id = %update.talhao_id, status = code, "Ignoring out-of-range status");
            return;
        }
    };

    match repository.update_status(update.talhao_id, status).await {
        Ok(true) => info!(talhao_id = %update.talhao_id, status = update.status, "Talhão status updated"),
        Ok(false) => warn!(talhao_id = %update.talhao_id, "Talhão not found for status update"),
        Err(e) => warn!(talhao_id = %update.talhao_id, error = %e, "Failed to apply status update"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{NewTalhao, StatusTalhao};
    use crate::testing::{InMemoryStore, InMemoryTalhaoRepository};
    use uuid::Uuid;

    async fn seeded_repo() -> (InMemoryTalhaoRepository, Uuid) {
        let store = InMemoryStore::shared();
        let repo = InMemoryTalhaoRepository::new(store);
        let talhao = repo
            .create(NewTalhao {
                propriedade_id: Uuid::new_v4(),
                nome: "F1".to_string(),
                cultura: "Soja".to_string(),
                descricao: None,
                area_hectares: None,
            })
            .await
            .unwrap();
        (repo, talhao.id)
    }

    #[tokio::test]
    async fn in_range_status_is_applied() {
        let (repo, id) = seeded_repo().await;
        apply_status_update(
            &repo,
            TalhaoStatusUpdateMessage { talhao_id: id, status: 2 },
        )
        .await;

        let talhao = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(talhao.status, StatusTalhao::EmPlantio);
    }

    #[tokio::test]
    async fn out_of_range_status_is_ignored() {
        let (repo, id) = seeded_repo().await;
        for bad in [0, 4, -1] {
            apply_status_update(
                &repo,
                TalhaoStatusUpdateMessage { talhao_id: id, status: bad },
            )
            .await;
        }

        let talhao = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(talhao.status, StatusTalhao::Cadastrado);
    }

    #[tokio::test]
    async fn unknown_talhao_is_ignored() {
        let (repo, _) = seeded_repo().await;
        apply_status_update(
            &repo,
            TalhaoStatusUpdateMessage { talhao_id: Uuid::new_v4(), status: 2 },
        )
        .await;
    }
}
