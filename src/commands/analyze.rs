use anyhow::{Context, Result};
use colored::Colorize;
use decor_analyzer::{
    config::Config,
    image_utils::{validate_image_size, SelectedImage},
    providers::{gemini::GeminiProvider, VisionProvider},
    report,
    session::{Orchestrator, SessionView},
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Execute the analyze command
///
/// Runs one session through the same orchestrator the server uses and
/// prints the result.
pub async fn execute(
    cfg: Config,
    image: PathBuf,
    api_key: Option<String>,
    json: bool,
) -> Result<()> {
    let provider = Arc::new(GeminiProvider::new(reqwest::Client::new(), cfg.gemini));

    if !json {
        println!("{} {}", "Analyzing".yellow(), image.display());
    }

    let view = run(provider, &image, api_key.as_deref().unwrap_or_default()).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        println!();
        print!("{}", report::render_text(&view.materials, &view.breakdown));
    }

    info!(items = view.materials.len(), total = view.breakdown.total, "Analysis printed");
    Ok(())
}

/// Select, analyze, and snapshot a single image file.
async fn run(provider: Arc<dyn VisionProvider>, path: &Path, api_key: &str) -> Result<SessionView> {
    let metadata = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("Cannot read {}", path.display()))?;
    validate_image_size(usize::try_from(metadata.len()).unwrap_or(usize::MAX))?;

    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Cannot read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let orchestrator = Orchestrator::new(provider);
    orchestrator.submit_credential(api_key)?;
    orchestrator
        .select_and_analyze(SelectedImage::new(file_name, bytes))
        .await?;

    let view = orchestrator.view();
    orchestrator.end_session();
    Ok(view)
}
