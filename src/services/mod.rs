pub mod propriedade_service;
pub mod talhao_service;

pub use propriedade_service::PropriedadeService;
pub use talhao_service::TalhaoService;
