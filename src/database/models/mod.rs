pub mod propriedade;
pub mod talhao;

pub use propriedade::{NewPropriedade, Propriedade};
pub use talhao::{NewTalhao, StatusTalhao, Talhao};
