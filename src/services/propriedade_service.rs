use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewPropriedade, Propriedade};
use crate::database::repository::PropriedadeRepository;
use crate::messaging::{DataEvent, EventPublisher, PropriedadeDataMessage};

/// Owner-scoped CRUD for propriedades. Every read and write is bounded by
/// the produtor id; "not found" and "not yours" are indistinguishable to
/// callers.
pub struct PropriedadeService {
    repository: Arc<dyn PropriedadeRepository>,
    publisher: Arc<dyn EventPublisher>,
}

impl PropriedadeService {
    pub fn new(
        repository: Arc<dyn PropriedadeRepository>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self { repository, publisher }
    }

    pub async fn get(
        &self,
        id: Uuid,
        produtor_id: Uuid,
    ) -> Result<Option<Propriedade>, DatabaseError> {
        self.repository.get_by_id_and_produtor(id, produtor_id).await
    }

    pub async fn list_by_produtor(
        &self,
        produtor_id: Uuid,
    ) -> Result<Vec<Propriedade>, DatabaseError> {
        self.repository.list_by_produtor(produtor_id).await
    }

    pub async fn create(
        &self,
        produtor_id: Uuid,
        nome: String,
        descricao: Option<String>,
    ) -> Result<Propriedade, DatabaseError> {
        let created = self
            .repository
            .create(NewPropriedade { produtor_id, nome, descricao })
            .await?;

        self.publish_changed(&created).await;
        Ok(created)
    }

    pub async fn update(
        &self,
        id: Uuid,
        produtor_id: Uuid,
        nome: String,
        descricao: Option<String>,
    ) -> Result<Option<Propriedade>, DatabaseError> {
        let Some(mut propriedade) = self.repository.get_by_id_and_produtor(id, produtor_id).await?
        else {
            return Ok(None);
        };

        propriedade.nome = nome;
        propriedade.descricao = descricao;

        let updated = self.repository.update(&propriedade).await?;
        self.publish_changed(&updated).await;
        Ok(Some(updated))
    }

    pub async fn delete(&self, id: Uuid, produtor_id: Uuid) -> Result<bool, DatabaseError> {
        // Ownership is resolved before any mutation
        if self.repository.get_by_id_and_produtor(id, produtor_id).await?.is_none() {
            return Ok(false);
        }
        self.repository.delete(id).await
    }

    /// Best-effort broadcast after the committed write. Failures are logged
    /// and swallowed; the persisted state stands.
    async fn publish_changed(&self, propriedade: &Propriedade) {
        let event = DataEvent::Propriedade(PropriedadeDataMessage {
            id: propriedade.id,
            nome: propriedade.nome.clone(),
            produtor_id: propriedade.produtor_id,
        });

        if let Err(e) = self.publisher.publish(event).await {
            warn!(
                propriedade_id = %propriedade.id,
                error = %e,
                "Falha ao publicar PropriedadeDataMessage"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        FailingPublisher, InMemoryPropriedadeRepository, InMemoryStore, RecordingPublisher,
    };

    fn service_with(
        publisher: Arc<dyn EventPublisher>,
    ) -> (PropriedadeService, Arc<InMemoryPropriedadeRepository>) {
        let store = InMemoryStore::shared();
        let repository = Arc::new(InMemoryPropriedadeRepository::new(store));
        (PropriedadeService::new(repository.clone(), publisher), repository)
    }

    #[tokio::test]
    async fn created_propriedade_is_visible_only_to_its_produtor() {
        let (service, _) = service_with(Arc::new(RecordingPublisher::new()));
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();

        let created = service.create(owner, "Farm1".to_string(), None).await.unwrap();
        assert_eq!(created.produtor_id, owner);

        assert!(service.get(created.id, owner).await.unwrap().is_some());
        assert!(service.get(created.id, other).await.unwrap().is_none());

        assert_eq!(service.list_by_produtor(owner).await.unwrap().len(), 1);
        assert!(service.list_by_produtor(other).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_is_reflected_by_subsequent_get() {
        let (service, _) = service_with(Arc::new(RecordingPublisher::new()));
        let owner = Uuid::new_v4();

        let created = service
            .create(owner, "Farm1".to_string(), Some("old".to_string()))
            .await
            .unwrap();
        let updated = service
            .update(created.id, owner, "Farm1-renamed".to_string(), None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.nome, "Farm1-renamed");
        assert_eq!(updated.descricao, None);

        let fetched = service.get(created.id, owner).await.unwrap().unwrap();
        assert_eq!(fetched.nome, "Farm1-renamed");
        assert_eq!(fetched.data_criacao, created.data_criacao);
    }

    #[tokio::test]
    async fn update_by_another_produtor_is_absent() {
        let (service, _) = service_with(Arc::new(RecordingPublisher::new()));
        let owner = Uuid::new_v4();

        let created = service.create(owner, "Farm1".to_string(), None).await.unwrap();
        let result = service
            .update(created.id, Uuid::new_v4(), "hijack".to_string(), None)
            .await
            .unwrap();
        assert!(result.is_none());

        let fetched = service.get(created.id, owner).await.unwrap().unwrap();
        assert_eq!(fetched.nome, "Farm1");
    }

    #[tokio::test]
    async fn delete_requires_ownership() {
        let (service, _) = service_with(Arc::new(RecordingPublisher::new()));
        let owner = Uuid::new_v4();

        let created = service.create(owner, "Farm1".to_string(), None).await.unwrap();
        assert!(!service.delete(created.id, Uuid::new_v4()).await.unwrap());
        assert!(service.delete(created.id, owner).await.unwrap());
        assert!(service.get(created.id, owner).await.unwrap().is_none());
        assert!(!service.delete(created.id, owner).await.unwrap());
    }

    #[tokio::test]
    async fn create_and_update_publish_change_events() {
        let publisher = Arc::new(RecordingPublisher::new());
        let (service, _) = service_with(publisher.clone());
        let owner = Uuid::new_v4();

        let created = service.create(owner, "Farm1".to_string(), None).await.unwrap();
        service
            .update(created.id, owner, "Farm2".to_string(), None)
            .await
            .unwrap()
            .unwrap();

        let events = publisher.events().await;
        assert_eq!(events.len(), 2);
        match &events[1] {
            DataEvent::Propriedade(msg) => {
                assert_eq!(msg.id, created.id);
                assert_eq!(msg.nome, "Farm2");
                assert_eq!(msg.produtor_id, owner);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn publish_failure_never_fails_the_write() {
        let (service, _) = service_with(Arc::new(FailingPublisher));
        let owner = Uuid::new_v4();

        let created = service.create(owner, "Farm1".to_string(), None).await.unwrap();
        let updated = service
            .update(created.id, owner, "Farm2".to_string(), None)
            .await
            .unwrap();
        assert!(updated.is_some());
        assert_eq!(
            service.get(created.id, owner).await.unwrap().unwrap().nome,
            "Farm2"
        );
    }
}
