use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use stock_watch::aggregation::Aggregator;
use stock_watch::api::create_router;
use stock_watch::config::AppConfig;
use stock_watch::observability::metrics::register_metrics;
use stock_watch::observability::tracing::init_tracing;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = std::env::var("STOCKWATCH_ENV").unwrap_or_else(|_| "default".to_string());
    let config = AppConfig::load(&env).context("loading configuration")?;

    init_tracing(&config.logging)?;
    register_metrics();

    let connector = config.transport.connector().context("building quote connector")?;
    let aggregator = Arc::new(Aggregator::with_connector(connector));

    let app = create_router(aggregator).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.server.bind_address)
        .await
        .with_context(|| format!("binding {}", config.server.bind_address))?;
    tracing::info!(
        env = %env,
        transport = ?config.transport.kind,
        "Listening on {}",
        config.server.bind_address
    );

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
    Ok(())
}
