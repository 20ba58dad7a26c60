pub mod manager;
pub mod models;
pub mod repository;

pub use manager::{DatabaseError, DatabaseManager};
pub use models::{NewPropriedade, NewTalhao, Propriedade, StatusTalhao, Talhao};
pub use repository::{
    PgPropriedadeRepository, PgTalhaoRepository, PropriedadeRepository, TalhaoRepository,
};
