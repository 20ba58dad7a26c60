use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewTalhao, StatusTalhao, Talhao};

/// Persistence for talhoes. Deliberately not owner-scoped: authorization is
/// derived at the service layer by walking to the parent propriedade.
#[async_trait]
pub trait TalhaoRepository: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Talhao>, DatabaseError>;

    async fn list_by_propriedade(
        &self,
        propriedade_id: Uuid,
    ) -> Result<Vec<Talhao>, DatabaseError>;

    async fn create(&self, new: NewTalhao) -> Result<Talhao, DatabaseError>;

    async fn update(&self, talhao: &Talhao) -> Result<Talhao, DatabaseError>;

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError>;

    async fn update_status(&self, id: Uuid, status: StatusTalhao) -> Result<bool, DatabaseError>;
}

pub struct PgTalhaoRepository {
    pool: PgPool,
}

impl PgTalhaoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const TALHAO_COLUMNS: &str =
    "id, propriedade_id, nome, cultura, descricao, area_hectares, status, data_criacao";

#[async_trait]
impl TalhaoRepository for PgTalhaoRepository {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Talhao>, DatabaseError> {
        let sql = format!("SELECT {} FROM talhoes WHERE id = $1", TALHAO_COLUMNS);
        let talhao = sqlx::query_as::<_, Talhao>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(talhao)
    }

    async fn list_by_propriedade(
        &self,
        propriedade_id: Uuid,
    ) -> Result<Vec<Talhao>, DatabaseError> {
        let sql = format!("SELECT {} FROM talhoes WHERE propriedade_id = $1", TALHAO_COLUMNS);
        let talhoes = sqlx::query_as::<_, Talhao>(&sql)
            .bind(propriedade_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(talhoes)
    }

    async fn create(&self, new: NewTalhao) -> Result<Talhao, DatabaseError> {
        let sql = format!(
            "INSERT INTO talhoes (id, propriedade_id, nome, cultura, descricao, area_hectares, status, data_criacao)
             VALUES ($1, $2, $3, $4, $5, $6, $7, now())
             RETURNING {}",
            TALHAO_COLUMNS
        );
        let talhao = sqlx::query_as::<_, Talhao>(&sql)
            .bind(Uuid::new_v4())
            .bind(new.propriedade_id)
            .bind(&new.nome)
            .bind(&new.cultura)
            .bind(&new.descricao)
            .bind(new.area_hectares)
            .bind(StatusTalhao::Cadastrado)
            .fetch_one(&self.pool)
            .await?;

        Ok(talhao)
    }

    async fn update(&self, talhao: &Talhao) -> Result<Talhao, DatabaseError> {
        let sql = format!(
            "UPDATE talhoes SET nome = $2, cultura = $3, descricao = $4, area_hectares = $5
             WHERE id = $1
             RETURNING {}",
            TALHAO_COLUMNS
        );
        let updated = sqlx::query_as::<_, Talhao>(&sql)
            .bind(talhao.id)
            .bind(&talhao.nome)
            .bind(&talhao.cultura)
            .bind(&talhao.descricao)
            .bind(talhao.area_hectares)
            .fetch_one(&self.pool)
            .await?;

        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM talhoes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_status(&self, id: Uuid, status: StatusTalhao) -> Result<bool, DatabaseError> {
        let result = sqlx::query("UPDATE talhoes SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
