use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::Router;
use sea_orm::{ConnectOptions, Database};
use tower_http::trace::TraceLayer;

use taskpilot::{
    config::AppConfig, logging::init_tracing, routes::router, services::assistant::HttpAgent,
    state::AppState,
};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        tracing::error!("server failed: {err:?}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cfg = AppConfig::from_env().expect("failed to load config");
    init_tracing(&cfg.log_level);

    let mut opt = ConnectOptions::new(cfg.database_url.clone());
    opt.max_connections(cfg.db_max_connections)
        .min_connections(cfg.db_min_idle)
        .connect_timeout(Duration::from_secs(5))
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;
    tracing::info!("syncing database schema from entities");
    db.get_schema_registry("taskpilot::db::entities::*")
        .sync(&db)
        .await?;

    let agent = Arc::new(HttpAgent::new(
        cfg.agent_url.clone(),
        cfg.agent_api_key.clone(),
    ));
    let state = AppState::new(cfg.clone(), db, agent);

    let app = Router::new()
        .merge(router(Arc::clone(&state)))
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", cfg.host, cfg.port)
        .parse()
        .expect("invalid host/port");
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
