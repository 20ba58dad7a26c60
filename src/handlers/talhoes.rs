use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::AuthUser;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CriarTalhaoDto {
    pub nome: String,
    pub cultura: String,
    pub descricao: Option<String>,
    pub area_hectares: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AtualizarTalhaoDto {
    pub nome: String,
    pub cultura: String,
    pub descricao: Option<String>,
    pub area_hectares: Option<Decimal>,
}

fn validate(nome: &str, cultura: &str, area_hectares: Option<Decimal>) -> Result<(), ApiError> {
    if nome.trim().is_empty() {
        return Err(ApiError::bad_request("Nome é obrigatório"));
    }
    if cultura.trim().is_empty() {
        return Err(ApiError::bad_request("Cultura é obrigatória"));
    }
    if let Some(area) = area_hectares {
        if area.is_sign_negative() {
            return Err(ApiError::bad_request("AreaHectares não pode ser negativa"));
        }
    }
    Ok(())
}

/// GET /api/Talhoes/:id
pub async fn get_by_id(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let talhao = state
        .talhoes
        .get_by_id_for_produtor(id, user.produtor_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Talhão não encontrado"))?;
    Ok(Json(talhao))
}

/// GET /api/Talhoes/propriedade/:propriedade_id
pub async fn list_by_propriedade(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(propriedade_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let talhoes = state
        .talhoes
        .list_by_propriedade_for_produtor(propriedade_id, user.produtor_id)
        .await?;
    Ok(Json(talhoes))
}

/// POST /api/Talhoes/propriedade/:propriedade_id
pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(propriedade_id): Path<Uuid>,
    Json(dto): Json<CriarTalhaoDto>,
) -> Result<impl IntoResponse, ApiError> {
    validate(&dto.nome, &dto.cultura, dto.area_hectares)?;

    let created = state
        .talhoes
        .create(
            propriedade_id,
            user.produtor_id,
            dto.nome,
            dto.cultura,
            dto.descricao,
            dto.area_hectares,
        )
        .await?
        .ok_or_else(|| {
            ApiError::bad_request("Propriedade não encontrada ou não pertence ao produtor")
        })?;

    let location = format!("/api/Talhoes/{}", created.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(created),
    ))
}

/// PUT /api/Talhoes/:id
pub async fn update(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(dto): Json<AtualizarTalhaoDto>,
) -> Result<impl IntoResponse, ApiError> {
    validate(&dto.nome, &dto.cultura, dto.area_hectares)?;

    let updated = state
        .talhoes
        .update(
            id,
            user.produtor_id,
            dto.nome,
            dto.cultura,
            dto.descricao,
            dto.area_hectares,
        )
        .await?
        .ok_or_else(|| ApiError::not_found("Talhão não encontrado"))?;
    Ok(Json(updated))
}

/// DELETE /api/Talhoes/:id
pub async fn remove(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    if state.talhoes.delete(id, user.produtor_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Talhão não encontrado"))
    }
}
