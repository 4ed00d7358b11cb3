use anyhow::{Context, Result};
use clap::Parser;
use docshrink_api::{app, ApiConfig};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "docshrink=info,docshrink_api=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::parse();

    config
        .storage()
        .init()
        .context("Failed to prepare storage directories")?;

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;

    info!(
        upload_dir = %config.upload_dir.display(),
        output_dir = %config.output_dir.display(),
        max_upload_size = config.max_upload_size,
        "docshrink API listening on http://{}",
        config.bind
    );

    axum::serve(listener, app(config)).await?;

    Ok(())
}
