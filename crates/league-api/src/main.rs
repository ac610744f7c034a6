//! Music league API server entry point
//!
//! Configuration comes from environment variables (and `.env`); see
//! `AppConfig::from_env` for the full list.

use league_common::{try_init_tracing, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Tracing depends on APP_ENV, so configuration errors go to stderr
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            std::process::exit(2);
        }
    };

    let tracing_config = TracingConfig::for_environment(config.app.env).with_env_overrides();
    if let Err(e) = try_init_tracing(&tracing_config) {
        eprintln!("Warning: {e}");
    }

    if let Err(e) = serve(config).await {
        error!(error = %e, "Server exited with an error");
        std::process::exit(1);
    }
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    info!(
        env = ?config.app.env,
        port = config.api.port,
        storage = ?config.storage.backend,
        sweep_interval_secs = config.league.round_sweep_interval_secs,
        "Starting music league API"
    );

    league_api::run(config).await?;
    Ok(())
}
