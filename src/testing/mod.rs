//! In-memory doubles for the repository and publisher boundaries, used by
//! unit tests and the router-level tests in `tests/`.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewPropriedade, NewTalhao, Propriedade, StatusTalhao, Talhao};
use crate::database::repository::{PropriedadeRepository, TalhaoRepository};
use crate::messaging::{DataEvent, EventPublisher, PublishError};

/// Shared backing store so the propriedade and talhao repositories observe
/// each other's writes, including the delete cascade.
#[derive(Default)]
pub struct InMemoryStore {
    propriedades: Mutex<HashMap<Uuid, Propriedade>>,
    talhoes: Mutex<HashMap<Uuid, Talhao>>,
}

impl InMemoryStore {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

pub struct InMemoryPropriedadeRepository {
    store: Arc<InMemoryStore>,
}

impl InMemoryPropriedadeRepository {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }

    async fn with_talhoes(&self, mut propriedade: Propriedade) -> Propriedade {
        let talhoes = self.store.talhoes.lock().await;
        propriedade.talhoes = talhoes
            .values()
            .filter(|t| t.propriedade_id == propriedade.id)
            .cloned()
            .collect();
        propriedade
    }
}

#[async_trait]
impl PropriedadeRepository for InMemoryPropriedadeRepository {
    async fn get_by_id_and_produtor(
        &self,
        id: Uuid,
        produtor_id: Uuid,
    ) -> Result<Option<Propriedade>, DatabaseError> {
        let propriedade = {
            let propriedades = self.store.propriedades.lock().await;
            propriedades
                .get(&id)
                .filter(|p| p.produtor_id == produtor_id)
                .cloned()
        };
        match propriedade {
            Some(propriedade) => Ok(Some(self.with_talhoes(propriedade).await)),
            None => Ok(None),
        }
    }

    async fn list_by_produtor(&self, produtor_id: Uuid) -> Result<Vec<Propriedade>, DatabaseError> {
        let owned: Vec<Propriedade> = {
            let propriedades = self.store.propriedades.lock().await;
            propriedades
                .values()
                .filter(|p| p.produtor_id == produtor_id)
                .cloned()
                .collect()
        };

        let mut result = Vec::with_capacity(owned.len());
        for propriedade in owned {
            result.push(self.with_talhoes(propriedade).await);
        }
        Ok(result)
    }

    async fn create(&self, new: NewPropriedade) -> Result<Propriedade, DatabaseError> {
        let propriedade = Propriedade {
            id: Uuid::new_v4(),
            produtor_id: new.produtor_id,
            nome: new.nome,
            descricao: new.descricao,
            data_criacao: Utc::now(),
            talhoes: vec![],
        };

        let mut propriedades = self.store.propriedades.lock().await;
        propriedades.insert(propriedade.id, propriedade.clone());
        Ok(propriedade)
    }

    async fn update(&self, propriedade: &Propriedade) -> Result<Propriedade, DatabaseError> {
        let mut propriedades = self.store.propriedades.lock().await;
        let existing = propriedades
            .get_mut(&propriedade.id)
            .ok_or_else(|| DatabaseError::NotFound("Propriedade não encontrada".to_string()))?;

        existing.nome = propriedade.nome.clone();
        existing.descricao = propriedade.descricao.clone();
        Ok(existing.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let mut propriedades = self.store.propriedades.lock().await;
        if propriedades.remove(&id).is_none() {
            return Ok(false);
        }
        // Mirror the FK cascade
        let mut talhoes = self.store.talhoes.lock().await;
        talhoes.retain(|_, t| t.propriedade_id != id);
        Ok(true)
    }
}

pub struct InMemoryTalhaoRepository {
    store: Arc<InMemoryStore>,
}

impl InMemoryTalhaoRepository {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TalhaoRepository for InMemoryTalhaoRepository {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Talhao>, DatabaseError> {
        let talhoes = self.store.talhoes.lock().await;
        Ok(talhoes.get(&id).cloned())
    }

    async fn list_by_propriedade(
        &self,
        propriedade_id: Uuid,
    ) -> Result<Vec<Talhao>, DatabaseError> {
        let talhoes = self.store.talhoes.lock().await;
        Ok(talhoes
            .values()
            .filter(|t| t.propriedade_id == propriedade_id)
            .cloned()
            .collect())
    }

    async fn create(&self, new: NewTalhao) -> Result<Talhao, DatabaseError> {
        let talhao = Talhao {
            id: Uuid::new_v4(),
            propriedade_id: new.propriedade_id,
            nome: new.nome,
            cultura: new.cultura,
            descricao: new.descricao,
            area_hectares: new.area_hectares,
            status: StatusTalhao::Cadastrado,
            data_criacao: Utc::now(),
        };

        let mut talhoes = self.store.talhoes.lock().await;
        talhoes.insert(talhao.id, talhao.clone());
        Ok(talhao)
    }

    async fn update(&self, talhao: &Talhao) -> Result<Talhao, DatabaseError> {
        let mut talhoes = self.store.talhoes.lock().await;
        let existing = talhoes
            .get_mut(&talhao.id)
            .ok_or_else(|| DatabaseError::NotFound("Talhão não encontrado".to_string()))?;

        existing.nome = talhao.nome.clone();
        existing.cultura = talhao.cultura.clone();
        existing.descricao = talhao.descricao.clone();
        existing.area_hectares = talhao.area_hectares;
        Ok(existing.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let mut talhoes = self.store.talhoes.lock().await;
        Ok(talhoes.remove(&id).is_some())
    }

    async fn update_status(&self, id: Uuid, status: StatusTalhao) -> Result<bool, DatabaseError> {
        let mut talhoes = self.store.talhoes.lock().await;
        match talhoes.get_mut(&id) {
            Some(talhao) => {
                talhao.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Captures published events for assertions.
pub struct RecordingPublisher {
    events: Mutex<Vec<DataEvent>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self { events: Mutex::new(Vec::new()) }
    }

    pub async fn events(&self) -> Vec<DataEvent> {
        self.events.lock().await.clone()
    }
}

impl Default for RecordingPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, event: DataEvent) -> Result<(), PublishError> {
        self.events.lock().await.push(event);
        Ok(())
    }
}

/// Always fails, for exercising the swallow-and-log path.
pub struct FailingPublisher;

#[async_trait]
impl EventPublisher for FailingPublisher {
    async fn publish(&self, _event: DataEvent) -> Result<(), PublishError> {
        Err(PublishError::Transport("broker unreachable".to_string()))
    }
}
