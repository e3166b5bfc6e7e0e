use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use advisor_server::config::{Credentials, Settings, DEFAULT_HOST, DEFAULT_PORT};
use advisor_server::logging::init_logging;
use advisor_server::{run_server, AppState};

#[derive(Parser, Debug, Clone)]
#[command(name = "advisor-server")]
#[command(about = "Chat relay and product recommendation API")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, env = "DEBUG", default_value = "false")]
    debug: bool,

    /// Bind address
    #[arg(long, env = "HOST", default_value = DEFAULT_HOST)]
    host: String,

    /// Server port
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// YAML settings file
    #[arg(long, env = "ADVISOR_CONFIG")]
    config: Option<PathBuf>,

    /// Store blobs in this directory instead of S3
    #[arg(long, env = "ADVISOR_STORAGE_DIR")]
    storage_dir: Option<PathBuf>,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.debug);

    let settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    if let Some(path) = &cli.config {
        log::info!("Loaded settings from {}", path.display());
    }

    let credentials = Credentials::from_env();
    let state = AppState::from_credentials(settings, &credentials, cli.storage_dir.as_deref())
        .context("Failed to initialize application state")?;

    run_server(state, &cli.host, cli.port)
        .await
        .context("HTTP server failed")
}
