use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::AuthUser;
use crate::error::ApiError;

pub const MAX_NOME_LEN: usize = 200;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CriarPropriedadeDto {
    pub nome: String,
    pub descricao: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AtualizarPropriedadeDto {
    pub nome: String,
    pub descricao: Option<String>,
}

fn validate_nome(nome: &str) -> Result<(), ApiError> {
    if nome.trim().is_empty() {
        return Err(ApiError::bad_request("Nome é obrigatório"));
    }
    if nome.len() > MAX_NOME_LEN {
        return Err(ApiError::bad_request("Nome excede o tamanho máximo"));
    }
    Ok(())
}

/// GET /api/Propriedades
pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let propriedades = state.propriedades.list_by_produtor(user.produtor_id).await?;
    Ok(Json(propriedades))
}

/// GET /api/Propriedades/:id
pub async fn get_by_id(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let propriedade = state
        .propriedades
        .get(id, user.produtor_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Propriedade não encontrada"))?;
    Ok(Json(propriedade))
}

/// POST /api/Propriedades
pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(dto): Json<CriarPropriedadeDto>,
) -> Result<impl IntoResponse, ApiError> {
    validate_nome(&dto.nome)?;

    let created = state
        .propriedades
        .create(user.produtor_id, dto.nome, dto.descricao)
        .await?;

    let location = format!("/api/Propriedades/{}", created.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(created),
    ))
}

/// PUT /api/Propriedades/:id
pub async fn update(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(dto): Json<AtualizarPropriedadeDto>,
) -> Result<impl IntoResponse, ApiError> {
    validate_nome(&dto.nome)?;

    let updated = state
        .propriedades
        .update(id, user.produtor_id, dto.nome, dto.descricao)
        .await?
        .ok_or_else(|| ApiError::not_found("Propriedade não encontrada"))?;
    Ok(Json(updated))
}

/// DELETE /api/Propriedades/:id
pub async fn remove(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    if state.propriedades.delete(id, user.produtor_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Propriedade não encontrada"))
    }
}
