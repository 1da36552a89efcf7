use anyhow::Result;
use colored::Colorize;
use decor_analyzer::{config::Config, server};
use tracing::info;

/// Execute the serve command (blocks until shutdown)
pub async fn execute(cfg: Config) -> Result<()> {
    println!(
        "{} http://{}:{}",
        "Starting decoration analyzer on".green(),
        cfg.server.host,
        cfg.server.port
    );
    info!("Starting decoration analyzer in foreground mode");

    server::start_server(cfg).await
}
