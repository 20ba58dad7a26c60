use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::app::AppState;
use crate::error::ApiError;

/// Authentication middleware. The strategy (token validation or the
/// development bypass) was fixed at startup; this just applies it and
/// injects the resolved produtor into request extensions.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_user = state.auth.authenticate(&headers)?;
    request.extensions_mut().insert(auth_user);
    Ok(next.run(request).await)
}
