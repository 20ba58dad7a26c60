use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewTalhao, Talhao};
use crate::database::repository::{PropriedadeRepository, TalhaoRepository};
use crate::messaging::{DataEvent, EventPublisher, TalhaoDataMessage};

/// CRUD for talhoes. A talhão stores no owner id, so every operation
/// re-derives authorization by walking to the parent propriedade instead of
/// trusting anything cached on the record.
pub struct TalhaoService {
    talhao_repository: Arc<dyn TalhaoRepository>,
    propriedade_repository: Arc<dyn PropriedadeRepository>,
    publisher: Arc<dyn EventPublisher>,
}

impl TalhaoService {
    pub fn new(
        talhao_repository: Arc<dyn TalhaoRepository>,
        propriedade_repository: Arc<dyn PropriedadeRepository>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            talhao_repository,
            propriedade_repository,
            publisher,
        }
    }

    /// Two-step authorization: load the talhão, then confirm its parent
    /// belongs to the requesting produtor.
    pub async fn get_by_id_for_produtor(
        &self,
        id: Uuid,
        produtor_id: Uuid,
    ) -> Result<Option<Talhao>, DatabaseError> {
        let Some(talhao) = self.talhao_repository.get_by_id(id).await? else {
            return Ok(None);
        };

        let propriedade = self
            .propriedade_repository
            .get_by_id_and_produtor(talhao.propriedade_id, produtor_id)
            .await?;

        Ok(propriedade.map(|_| talhao))
    }

    /// Empty, not an error, when the propriedade is missing or not owned.
    pub async fn list_by_propriedade_for_produtor(
        &self,
        propriedade_id: Uuid,
        produtor_id: Uuid,
    ) -> Result<Vec<Talhao>, DatabaseError> {
        let propriedade = self
            .propriedade_repository
            .get_by_id_and_produtor(propriedade_id, produtor_id)
            .await?;
        if propriedade.is_none() {
            return Ok(Vec::new());
        }

        self.talhao_repository.list_by_propriedade(propriedade_id).await
    }

    pub async fn create(
        &self,
        propriedade_id: Uuid,
        produtor_id: Uuid,
        nome: String,
        cultura: String,
        descricao: Option<String>,
        area_hectares: Option<Decimal>,
    ) -> Result<Option<Talhao>, DatabaseError> {
        let propriedade = self
            .propriedade_repository
            .get_by_id_and_produtor(propriedade_id, produtor_id)
            .await?;
        if propriedade.is_none() {
            return Ok(None);
        }

        let created = self
            .talhao_repository
            .create(NewTalhao {
                propriedade_id,
                nome,
                cultura,
                descricao,
                area_hectares,
            })
            .await?;

        self.publish_changed(&created).await;
        Ok(Some(created))
    }

    pub async fn update(
        &self,
        id: Uuid,
        produtor_id: Uuid,
        nome: String,
        cultura: String,
        descricao: Option<String>,
        area_hectares: Option<Decimal>,
    ) -> Result<Option<Talhao>, DatabaseError> {
        let Some(mut talhao) = self.get_by_id_for_produtor(id, produtor_id).await? else {
            return Ok(None);
        };

        talhao.nome = nome;
        talhao.cultura = cultura;
        talhao.descricao = descricao;
        talhao.area_hectares = area_hectares;

        let updated = self.talhao_repository.update(&talhao).await?;
        self.publish_changed(&updated).await;
        Ok(Some(updated))
    }

    pub async fn delete(&self, id: Uuid, produtor_id: Uuid) -> Result<bool, DatabaseError> {
        if self.get_by_id_for_produtor(id, produtor_id).await?.is_none() {
            return Ok(false);
        }
        self.talhao_repository.delete(id).await
    }

    async fn publish_changed(&self, talhao: &Talhao) {
        let event = DataEvent::Talhao(TalhaoDataMessage {
            id: talhao.id,
            nome: talhao.nome.clone(),
            propriedade_id: talhao.propriedade_id,
        });

        if let Err(e) = self.publisher.publish(event).await {
            warn!(
                talhao_id = %talhao.id,
                error = %e,
                "Falha ao publicar TalhaoDataMessage"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::StatusTalhao;
    use crate::services::PropriedadeService;
    use crate::testing::{
        FailingPublisher, InMemoryPropriedadeRepository, InMemoryStore, InMemoryTalhaoRepository,
        RecordingPublisher,
    };

    struct Fixture {
        propriedades: PropriedadeService,
        talhoes: TalhaoService,
        publisher: Arc<RecordingPublisher>,
    }

    fn fixture() -> Fixture {
        let store = InMemoryStore::shared();
        let propriedade_repo = Arc::new(InMemoryPropriedadeRepository::new(store.clone()));
        let talhao_repo = Arc::new(InMemoryTalhaoRepository::new(store));
        let publisher = Arc::new(RecordingPublisher::new());

        Fixture {
            propriedades: PropriedadeService::new(propriedade_repo.clone(), publisher.clone()),
            talhoes: TalhaoService::new(talhao_repo, propriedade_repo, publisher.clone()),
            publisher,
        }
    }

    #[tokio::test]
    async fn create_under_owned_propriedade_succeeds() {
        let f = fixture();
        let owner = Uuid::new_v4();
        let propriedade = f.propriedades.create(owner, "Farm1".to_string(), None).await.unwrap();

        let talhao = f
            .talhoes
            .create(
                propriedade.id,
                owner,
                "F1".to_string(),
                "Soja".to_string(),
                None,
                Some(Decimal::new(105, 1)),
            )
            .await
            .unwrap()
            .expect("created");

        assert_eq!(talhao.propriedade_id, propriedade.id);
        assert_eq!(talhao.status, StatusTalhao::Cadastrado);

        let events = f.publisher.events().await;
        match events.last().unwrap() {
            DataEvent::Talhao(msg) => {
                assert_eq!(msg.id, talhao.id);
                assert_eq!(msg.propriedade_id, propriedade.id);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn create_under_foreign_propriedade_is_absent_and_persists_nothing() {
        let f = fixture();
        let owner = Uuid::new_v4();
        let intruder = Uuid::new_v4();
        let propriedade = f.propriedades.create(owner, "Farm1".to_string(), None).await.unwrap();

        let result = f
            .talhoes
            .create(
                propriedade.id,
                intruder,
                "F1".to_string(),
                "Soja".to_string(),
                None,
                None,
            )
            .await
            .unwrap();
        assert!(result.is_none());

        let talhoes = f
            .talhoes
            .list_by_propriedade_for_produtor(propriedade.id, owner)
            .await
            .unwrap();
        assert!(talhoes.is_empty());
    }

    #[tokio::test]
    async fn create_under_missing_propriedade_is_absent() {
        let f = fixture();
        let result = f
            .talhoes
            .create(
                Uuid::new_v4(),
                Uuid::new_v4(),
                "F1".to_string(),
                "Soja".to_string(),
                None,
                None,
            )
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn get_checks_ownership_through_parent() {
        let f = fixture();
        let owner = Uuid::new_v4();
        let propriedade = f.propriedades.create(owner, "Farm1".to_string(), None).await.unwrap();
        let talhao = f
            .talhoes
            .create(propriedade.id, owner, "F1".to_string(), "Soja".to_string(), None, None)
            .await
            .unwrap()
            .unwrap();

        assert!(f
            .talhoes
            .get_by_id_for_produtor(talhao.id, owner)
            .await
            .unwrap()
            .is_some());
        assert!(f
            .talhoes
            .get_by_id_for_produtor(talhao.id, Uuid::new_v4())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn list_for_foreign_propriedade_is_empty_not_an_error() {
        let f = fixture();
        let owner = Uuid::new_v4();
        let propriedade = f.propriedades.create(owner, "Farm1".to_string(), None).await.unwrap();
        f.talhoes
            .create(propriedade.id, owner, "F1".to_string(), "Soja".to_string(), None, None)
            .await
            .unwrap()
            .unwrap();

        let talhoes = f
            .talhoes
            .list_by_propriedade_for_produtor(propriedade.id, Uuid::new_v4())
            .await
            .unwrap();
        assert!(talhoes.is_empty());
    }

    #[tokio::test]
    async fn update_re_resolves_ownership() {
        let f = fixture();
        let owner = Uuid::new_v4();
        let propriedade = f.propriedades.create(owner, "Farm1".to_string(), None).await.unwrap();
        let talhao = f
            .talhoes
            .create(propriedade.id, owner, "F1".to_string(), "Soja".to_string(), None, None)
            .await
            .unwrap()
            .unwrap();

        let denied = f
            .talhoes
            .update(
                talhao.id,
                Uuid::new_v4(),
                "F2".to_string(),
                "Milho".to_string(),
                None,
                None,
            )
            .await
            .unwrap();
        assert!(denied.is_none());

        let updated = f
            .talhoes
            .update(
                talhao.id,
                owner,
                "F2".to_string(),
                "Milho".to_string(),
                Some("rotacionado".to_string()),
                Some(Decimal::new(20, 0)),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.nome, "F2");
        assert_eq!(updated.cultura, "Milho");
        assert_eq!(updated.status, talhao.status);
    }

    #[tokio::test]
    async fn delete_re_resolves_ownership() {
        let f = fixture();
        let owner = Uuid::new_v4();
        let propriedade = f.propriedades.create(owner, "Farm1".to_string(), None).await.unwrap();
        let talhao = f
            .talhoes
            .create(propriedade.id, owner, "F1".to_string(), "Soja".to_string(), None, None)
            .await
            .unwrap()
            .unwrap();

        assert!(!f.talhoes.delete(talhao.id, Uuid::new_v4()).await.unwrap());
        assert!(f.talhoes.delete(talhao.id, owner).await.unwrap());
        assert!(f
            .talhoes
            .get_by_id_for_produtor(talhao.id, owner)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn deleting_propriedade_cascades_to_talhoes() {
        let f = fixture();
        let owner = Uuid::new_v4();
        let propriedade = f.propriedades.create(owner, "Farm1".to_string(), None).await.unwrap();
        let talhao = f
            .talhoes
            .create(propriedade.id, owner, "F1".to_string(), "Soja".to_string(), None, None)
            .await
            .unwrap()
            .unwrap();

        assert!(f.propriedades.delete(propriedade.id, owner).await.unwrap());
        assert!(f
            .talhoes
            .get_by_id_for_produtor(talhao.id, owner)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn publish_failure_never_fails_the_write() {
        let store = InMemoryStore::shared();
        let propriedade_repo = Arc::new(InMemoryPropriedadeRepository::new(store.clone()));
        let talhao_repo = Arc::new(InMemoryTalhaoRepository::new(store));
        let propriedades =
            PropriedadeService::new(propriedade_repo.clone(), Arc::new(FailingPublisher));
        let talhoes =
            TalhaoService::new(talhao_repo, propriedade_repo, Arc::new(FailingPublisher));

        let owner = Uuid::new_v4();
        let propriedade = propriedades.create(owner, "Farm1".to_string(), None).await.unwrap();
        let talhao = talhoes
            .create(propriedade.id, owner, "F1".to_string(), "Soja".to_string(), None, None)
            .await
            .unwrap();
        assert!(talhao.is_some());
    }
}
