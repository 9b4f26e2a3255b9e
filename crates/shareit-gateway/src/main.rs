use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result as AnyResult};
use shareit_booking::BookingEngine;
use shareit_gateway::{AppState, router};
use shareit_platform::{ServiceConfig, connect_database, run_migrations};
use shareit_store::{PgBookingStore, PgItemStore, PgUserStore};
use tower_http::{
    LatencyUnit,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, info};

#[tokio::main]
async fn main() -> AnyResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| {
            "shareit_gateway=info,shareit_booking=info,tower_http=info".to_string()
        }))
        .init();

    let config = ServiceConfig::from_env("0.0.0.0:9090")?;
    let pool = connect_database(&config.database_url, config.max_connections).await?;
    run_migrations(&pool).await?;

    info!(
        overlap_policy = %config.engine.overlap_policy,
        last_booking_skew_secs = config.engine.last_booking_skew.num_seconds(),
        "booking engine configured"
    );
    let engine = BookingEngine::new(
        Arc::new(PgUserStore::new(pool.clone())),
        Arc::new(PgItemStore::new(pool.clone())),
        Arc::new(PgBookingStore::new(pool)),
        config.engine.clone(),
    );

    let app = router(AppState {
        engine: Arc::new(engine),
    })
    .layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(
                DefaultOnResponse::new()
                    .level(Level::INFO)
                    .latency_unit(LatencyUnit::Millis),
            ),
    );

    let addr: SocketAddr = config
        .http_addr
        .parse()
        .with_context(|| format!("HTTP_ADDR '{}' is not a socket address", config.http_addr))?;
    info!("gateway listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
