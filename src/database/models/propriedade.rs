use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::talhao::Talhao;

/// Top-level land holding, always owned by exactly one produtor. The wire
/// form keeps the upstream PascalCase keys.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct Propriedade {
    pub id: Uuid,
    pub produtor_id: Uuid,
    pub nome: String,
    pub descricao: Option<String>,
    pub data_criacao: DateTime<Utc>,
    #[serde(default)]
    #[sqlx(skip)]
    pub talhoes: Vec<Talhao>,
}

/// Fields a caller provides at creation; id and timestamp are server-generated.
#[derive(Debug, Clone)]
pub struct NewPropriedade {
    pub produtor_id: Uuid,
    pub nome: String,
    pub descricao: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_pascal_case_keys() {
        let propriedade = Propriedade {
            id: Uuid::new_v4(),
            produtor_id: Uuid::new_v4(),
            nome: "Fazenda Santa Rita".to_string(),
            descricao: None,
            data_criacao: Utc::now(),
            talhoes: vec![],
        };

        let value = serde_json::to_value(&propriedade).unwrap();
        assert!(value.get("Id").is_some());
        assert!(value.get("ProdutorId").is_some());
        assert_eq!(value["Nome"], "Fazenda Santa Rita");
        assert!(value.get("DataCriacao").is_some());
        assert!(value["Talhoes"].as_array().unwrap().is_empty());
    }
}
