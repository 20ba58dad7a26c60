use std::sync::Arc;

use agro_property_api::app::{app, AppState};
use agro_property_api::auth::AuthStrategy;
use agro_property_api::config;
use agro_property_api::database::manager::DatabaseManager;
use agro_property_api::database::repository::{PgPropriedadeRepository, PgTalhaoRepository};
use agro_property_api::messaging::{
    run_status_consumer, EventPublisher, NatsPublisher, NoopPublisher,
};
use agro_property_api::services::{PropriedadeService, TalhaoService};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!("Starting agro-property-api in {:?} mode", config.environment);

    let pool = DatabaseManager::connect()
        .await
        .unwrap_or_else(|e| panic!("failed to connect to database: {}", e));

    let propriedade_repository = Arc::new(PgPropriedadeRepository::new(pool.clone()));
    let talhao_repository = Arc::new(PgTalhaoRepository::new(pool.clone()));

    // Publishing is best-effort by contract, so a missing or unreachable bus
    // downgrades to the no-op publisher instead of blocking startup.
    let publisher: Arc<dyn EventPublisher> = match &config.messaging.nats_url {
        Some(url) => match NatsPublisher::connect(url).await {
            Ok(publisher) => {
                tokio::spawn(run_status_consumer(
                    publisher.client(),
                    talhao_repository.clone(),
                ));
                Arc::new(publisher)
            }
            Err(e) => {
                tracing::warn!(error = %e, "NATS unavailable; events will be dropped");
                Arc::new(NoopPublisher)
            }
        },
        None => Arc::new(NoopPublisher),
    };

    let state = Arc::new(AppState {
        propriedades: PropriedadeService::new(propriedade_repository.clone(), publisher.clone()),
        talhoes: TalhaoService::new(talhao_repository, propriedade_repository, publisher),
        auth: AuthStrategy::from_config(config),
        pool: Some(pool),
    });

    let app = app(state);

    // Allow deployments to override port via env
    let port = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(5173);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("agro-property-api listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
