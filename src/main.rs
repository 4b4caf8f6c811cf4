use std::path::PathBuf;

use clap::Parser;

use gourmet::app::{build_router, AppState};
use gourmet::auth::handlers::ensure_admin;
use gourmet::config::AppConfig;

/// Catering storefront and admin API server.
#[derive(Debug, Parser)]
#[command(name = "gourmet", version)]
struct Cli {
    /// Optional TOML config file; environment variables take precedence.
    #[arg(long, env = "GOURMET_CONFIG")]
    config: Option<PathBuf>,

    /// Keep all data in process memory instead of MongoDB.
    #[arg(long)]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gourmet=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    tracing::info!("Starting Gourmet server...");
    if config.uses_default_secret() {
        tracing::warn!("JWT_SECRET not set, using the development secret");
    }

    let state = if cli.in_memory {
        tracing::warn!("Running with in-memory storage");
        AppState::in_memory(config.clone())?
    } else {
        AppState::connect(config.clone()).await?
    };

    if let (Some(email), Some(password)) = (
        &config.admin_bootstrap_email,
        &config.admin_bootstrap_password,
    ) {
        ensure_admin(state.users.as_ref(), email, password).await?;
    }

    let app = build_router(state);

    tracing::info!("Listening on http://{}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
