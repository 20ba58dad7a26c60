use axum::{middleware, routing::get, Router};
use serde_json::{json, Value};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::AuthStrategy;
use crate::database::manager::DatabaseManager;
use crate::handlers::{propriedades, talhoes};
use crate::middleware::auth_middleware;
use crate::services::{PropriedadeService, TalhaoService};

/// Everything the handlers need, assembled once at startup.
pub struct AppState {
    pub propriedades: PropriedadeService,
    pub talhoes: TalhaoService,
    pub auth: AuthStrategy,
    /// Present when running against Postgres; the health endpoint pings it.
    pub pool: Option<PgPool>,
}

pub fn app(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .merge(propriedade_routes())
        .merge(talhao_routes())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Protected API
        .merge(protected)
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn propriedade_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/Propriedades",
            get(propriedades::list).post(propriedades::create),
        )
        .route(
            "/api/Propriedades/:id",
            get(propriedades::get_by_id)
                .put(propriedades::update)
                .delete(propriedades::remove),
        )
}

fn talhao_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/Talhoes/:id",
            get(talhoes::get_by_id)
                .put(talhoes::update)
                .delete(talhoes::remove),
        )
        .route(
            "/api/Talhoes/propriedade/:propriedade_id",
            get(talhoes::list_by_propriedade).post(talhoes::create),
        )
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "name": "Agro Property API",
        "version": version,
        "endpoints": {
            "health": "/health (public)",
            "propriedades": "/api/Propriedades[/:id] (protected)",
            "talhoes": "/api/Talhoes/:id, /api/Talhoes/propriedade/:propriedadeId (protected)",
        }
    }))
}

async fn health(
    axum::extract::State(state): axum::extract::State<Arc<AppState>>,
) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    let database = match &state.pool {
        Some(pool) => DatabaseManager::health_check(pool).await.err().map(|e| e.to_string()),
        None => None,
    };

    match database {
        None => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Some(error) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "status": "degraded",
                "timestamp": now,
                "database_error": error
            })),
        ),
    }
}
