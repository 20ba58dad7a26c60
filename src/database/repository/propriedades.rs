use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewPropriedade, Propriedade, Talhao};

/// Owner-scoped persistence for propriedades. Lookups that take a produtor id
/// never return another produtor's record.
#[async_trait]
pub trait PropriedadeRepository: Send + Sync {
    async fn get_by_id_and_produtor(
        &self,
        id: Uuid,
        produtor_id: Uuid,
    ) -> Result<Option<Propriedade>, DatabaseError>;

    async fn list_by_produtor(&self, produtor_id: Uuid) -> Result<Vec<Propriedade>, DatabaseError>;

    async fn create(&self, new: NewPropriedade) -> Result<Propriedade, DatabaseError>;

    async fn update(&self, propriedade: &Propriedade) -> Result<Propriedade, DatabaseError>;

    /// Removes the propriedade and, through the cascade, its talhoes.
    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError>;
}

pub struct PgPropriedadeRepository {
    pool: PgPool,
}

impl PgPropriedadeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_talhoes(
        &self,
        propriedade_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<Talhao>>, DatabaseError> {
        if propriedade_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let talhoes = sqlx::query_as::<_, Talhao>(
            "SELECT id, propriedade_id, nome, cultura, descricao, area_hectares, status, data_criacao
             FROM talhoes WHERE propriedade_id = ANY($1)",
        )
        .bind(propriedade_ids.to_vec())
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<Talhao>> = HashMap::new();
        for talhao in talhoes {
            grouped.entry(talhao.propriedade_id).or_default().push(talhao);
        }
        Ok(grouped)
    }
}

#[async_trait]
impl PropriedadeRepository for PgPropriedadeRepository {
    async fn get_by_id_and_produtor(
        &self,
        id: Uuid,
        produtor_id: Uuid,
    ) -> Result<Option<Propriedade>, DatabaseError> {
        let propriedade = sqlx::query_as::<_, Propriedade>(
            "SELECT id, produtor_id, nome, descricao, data_criacao
             FROM propriedades WHERE id = $1 AND produtor_id = $2",
        )
        .bind(id)
        .bind(produtor_id)
        .fetch_optional(&self.pool)
        .await?;

        match propriedade {
            Some(mut propriedade) => {
                let mut grouped = self.load_talhoes(&[propriedade.id]).await?;
                propriedade.talhoes = grouped.remove(&propriedade.id).unwrap_or_default();
                Ok(Some(propriedade))
            }
            None => Ok(None),
        }
    }

    async fn list_by_produtor(&self, produtor_id: Uuid) -> Result<Vec<Propriedade>, DatabaseError> {
        let mut propriedades = sqlx::query_as::<_, Propriedade>(
            "SELECT id, produtor_id, nome, descricao, data_criacao
             FROM propriedades WHERE produtor_id = $1",
        )
        .bind(produtor_id)
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = propriedades.iter().map(|p| p.id).collect();
        let mut grouped = self.load_talhoes(&ids).await?;
        for propriedade in &mut propriedades {
            propriedade.talhoes = grouped.remove(&propriedade.id).unwrap_or_default();
        }
        Ok(propriedades)
    }

    async fn create(&self, new: NewPropriedade) -> Result<Propriedade, DatabaseError> {
        let propriedade = sqlx::query_as::<_, Propriedade>(
            "INSERT INTO propriedades (id, produtor_id, nome, descricao, data_criacao)
             VALUES ($1, $2, $3, $4, now())
             RETURNING id, produtor_id, nome, descricao, data_criacao",
        )
        .bind(Uuid::new_v4())
        .bind(new.produtor_id)
        .bind(&new.nome)
        .bind(&new.descricao)
        .fetch_one(&self.pool)
        .await?;

        Ok(propriedade)
    }

    async fn update(&self, propriedade: &Propriedade) -> Result<Propriedade, DatabaseError> {
        let updated = sqlx::query_as::<_, Propriedade>(
            "UPDATE propriedades SET nome = $2, descricao = $3
             WHERE id = $1
             RETURNING id, produtor_id, nome, descricao, data_criacao",
        )
        .bind(propriedade.id)
        .bind(&propriedade.nome)
        .bind(&propriedade.descricao)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        // The talhoes FK is ON DELETE CASCADE, so children go with the parent.
        let result = sqlx::query("DELETE FROM propriedades WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
