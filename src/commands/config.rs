use anyhow::Result;
use colored::Colorize;
use decor_analyzer::config::Config;
use tracing::info;

/// Execute the config show command
///
/// Prints the effective configuration as TOML. It holds no secrets: the
/// API key is only ever supplied per session.
pub fn show(cfg: &Config) -> Result<()> {
    println!("{}", "Current Configuration:".green().bold());
    println!();
    println!("{}", toml::to_string_pretty(cfg)?);

    info!("Configuration displayed successfully");
    Ok(())
}

/// Execute the config validate command
///
/// Loading already validated the configuration; this prints a summary.
pub fn validate(cfg: &Config) {
    println!("{}", "✓ Configuration is valid".green());
    println!();
    println!("{}", "Summary:".bold());
    println!("  {}: {}:{}", "Server".cyan(), cfg.server.host, cfg.server.port);
    println!("  {}: {}", "Log Level".cyan(), cfg.server.log_level);
    println!("  {}: {}", "Log Format".cyan(), cfg.server.log_format);
    println!("  {}: {}", "Model".cyan(), cfg.gemini.model);
    println!("  {}: {}", "Endpoint".cyan(), cfg.gemini.base_url);
    println!("  {}: {}s", "Timeout".cyan(), cfg.gemini.timeout_seconds);

    info!("Configuration validation successful");
}
