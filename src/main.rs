use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::header;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use splitledger::api::{handlers, openapi::ApiDoc};
use splitledger::config::CONFIG;
use splitledger::{
    InMemoryAuditSink, InMemoryBillStore, InMemoryGroupDirectory, InMemoryNotifier, LedgerService,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(CONFIG.log_level.as_str())
        .init();

    let storage = InMemoryBillStore::new();
    let audit = InMemoryAuditSink::new();
    let groups = InMemoryGroupDirectory::new();
    let notifier = InMemoryNotifier::new();
    let service = Arc::new(LedgerService::new(storage, audit, groups, notifier));

    let app = handlers::api_routes(service)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([http::Method::GET, http::Method::POST])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([127, 0, 0, 1], CONFIG.port));
    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
