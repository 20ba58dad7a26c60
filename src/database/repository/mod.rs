pub mod propriedades;
pub mod talhoes;

pub use propriedades::{PgPropriedadeRepository, PropriedadeRepository};
pub use talhoes::{PgTalhaoRepository, TalhaoRepository};
