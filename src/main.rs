use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use decor_analyzer::{config, init_tracing};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let command = args.get_command();

    if let cli::Commands::Version = command {
        println!("Decoration Analyzer v{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let cfg = config::load_config(&args.config)?;
    init_tracing(&cfg.server.log_level, &cfg.server.log_format);

    match command {
        cli::Commands::Serve => commands::serve::execute(cfg).await?,
        cli::Commands::Analyze {
            image,
            api_key,
            json,
        } => commands::analyze::execute(cfg, image, api_key, json).await?,
        cli::Commands::Config { action } => match action {
            cli::ConfigCommands::Show => commands::config::show(&cfg)?,
            cli::ConfigCommands::Validate => commands::config::validate(&cfg),
        },
        cli::Commands::Version => {}
    }

    Ok(())
}
