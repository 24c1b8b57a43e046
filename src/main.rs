//! TechMart - Role-Gated E-Commerce Backend
//! Mission: JWT-authenticated CRUD over users, products, and categories
//! on top of flat-file JSON collections

use anyhow::{Context, Result};
use dotenv::dotenv;
use std::path::Path;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use techmart_backend::api::create_router;
use techmart_backend::models::Config;
use techmart_backend::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    load_env();
    init_tracing();

    let config = Config::from_env()?;
    info!("Collections stored under: {}", config.data_dir);
    info!(
        "Access tokens expire after {} minutes",
        config.token_expire_minutes
    );

    let state = AppState::new(&config);

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("TechMart API listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn load_env() {
    // Standard dotenv search (cwd + parents), then the manifest directory
    // so running with --manifest-path from elsewhere still finds .env.
    let _ = dotenv();

    let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if manifest_env.exists() {
        let _ = dotenv::from_path(&manifest_env);
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "techmart_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
