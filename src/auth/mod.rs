use axum::http::HeaderMap;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{AppConfig, Environment};

/// Fixed identity used by the development bypass. Never resolvable through a
/// real token: identity resolution requires a parseable claim instead.
pub const DEV_BYPASS_PRODUTOR_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0001);

/// Claims this service understands. Tokens are issued by the external
/// identity service; several historical claim names remain in circulation,
/// so the produtor id can arrive under any of four keys.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(rename = "nameid", skip_serializing_if = "Option::is_none")]
    pub name_identifier: Option<String>,
    #[serde(rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(rename = "produtorId", skip_serializing_if = "Option::is_none")]
    pub produtor_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// Canonical resolution order: `sub`, then `nameid`, then `userId`, then
    /// the legacy `produtorId`. The first claim that parses as a UUID wins.
    pub fn resolve_produtor_id(&self) -> Option<Uuid> {
        [
            self.sub.as_deref(),
            self.name_identifier.as_deref(),
            self.user_id.as_deref(),
            self.produtor_id.as_deref(),
        ]
        .into_iter()
        .flatten()
        .find_map(|value| Uuid::parse_str(value).ok())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingToken,
    #[error("Authorization header must use Bearer token format")]
    InvalidScheme,
    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),
    #[error("JWT secret not configured")]
    MissingSecret,
    #[error("UserId não encontrado no token")]
    MissingIdentity,
}

/// Authenticated produtor context injected into request extensions
#[derive(Clone, Copy, Debug)]
pub struct AuthUser {
    pub produtor_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

/// How incoming requests are authenticated. Chosen once at startup; request
/// handling never branches on environment.
#[derive(Debug, Clone)]
pub enum AuthStrategy {
    Jwt(JwtSettings),
    DevBypass,
}

impl AuthStrategy {
    /// The bypass flag is only honored under the Development profile, so
    /// production configuration always ends up with token validation.
    pub fn from_config(config: &AppConfig) -> Self {
        if config.auth.disable_jwt_validation {
            if config.environment == Environment::Development {
                tracing::warn!(
                    produtor_id = %DEV_BYPASS_PRODUTOR_ID,
                    "JWT validation disabled; all requests authenticate as the fixed development produtor"
                );
                return AuthStrategy::DevBypass;
            }
            tracing::warn!(
                "AUTH_DISABLE_JWT_VALIDATION is set but the environment is {:?}; ignoring",
                config.environment
            );
        }

        AuthStrategy::Jwt(JwtSettings {
            secret: config.jwt.secret.clone(),
            issuer: config.jwt.issuer.clone(),
            audience: config.jwt.audience.clone(),
        })
    }

    pub fn authenticate(&self, headers: &HeaderMap) -> Result<AuthUser, AuthError> {
        match self {
            AuthStrategy::DevBypass => Ok(AuthUser {
                produtor_id: DEV_BYPASS_PRODUTOR_ID,
            }),
            AuthStrategy::Jwt(settings) => {
                let token = extract_bearer_token(headers)?;
                let claims = validate_jwt(settings, &token)?;
                let produtor_id = claims.resolve_produtor_id().ok_or(AuthError::MissingIdentity)?;
                Ok(AuthUser { produtor_id })
            }
        }
    }
}

/// Extract JWT token from Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AuthError> {
    let auth_header = headers
        .get("authorization")
        .or_else(|| headers.get("Authorization"))
        .ok_or(AuthError::MissingToken)?;

    let auth_str = auth_header.to_str().map_err(|_| AuthError::InvalidScheme)?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.to_string()),
        _ => Err(AuthError::InvalidScheme),
    }
}

/// Validate signature, issuer, audience and lifetime, then extract claims
fn validate_jwt(settings: &JwtSettings, token: &str) -> Result<Claims, AuthError> {
    if settings.secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }

    let decoding_key = DecodingKey::from_secret(settings.secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&settings.issuer]);
    validation.set_audience(&[&settings.audience]);

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    Ok(token_data.claims)
}
