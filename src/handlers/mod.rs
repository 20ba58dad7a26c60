pub mod propriedades;
pub mod talhoes;
