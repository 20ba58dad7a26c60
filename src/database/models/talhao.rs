use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sqlx::FromRow;
use uuid::Uuid;

/// Production stage of a talhão, updated out-of-band by other services via
/// the status channel. Stored as SMALLINT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[repr(i16)]
pub enum StatusTalhao {
    Cadastrado = 1,
    EmPlantio = 2,
    Colhido = 3,
}

impl TryFrom<i16> for StatusTalhao {
    type Error = i16;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(StatusTalhao::Cadastrado),
            2 => Ok(StatusTalhao::EmPlantio),
            3 => Ok(StatusTalhao::Colhido),
            other => Err(other),
        }
    }
}

// On the wire the status travels as its numeric code, matching the bus
// messages other services already produce.
impl Serialize for StatusTalhao {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i16(*self as i16)
    }
}

impl<'de> Deserialize<'de> for StatusTalhao {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = i16::deserialize(deserializer)?;
        StatusTalhao::try_from(code)
            .map_err(|v| de::Error::custom(format!("invalid status code: {}", v)))
    }
}

/// Subdivision of a Propriedade. Carries no owner id of its own: ownership is
/// always re-derived through the parent propriedade.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct Talhao {
    pub id: Uuid,
    pub propriedade_id: Uuid,
    pub nome: String,
    pub cultura: String,
    pub descricao: Option<String>,
    pub area_hectares: Option<Decimal>,
    pub status: StatusTalhao,
    pub data_criacao: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTalhao {
    pub propriedade_id: Uuid,
    pub nome: String,
    pub cultura: String,
    pub descricao: Option<String>,
    pub area_hectares: Option<Decimal>,
}
