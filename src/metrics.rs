use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the Prometheus recorder. Fails if a recorder is already installed.
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    init_metric_descriptions();

    Ok(handle)
}

/// Initialize metric descriptions (can be called multiple times safely)
fn init_metric_descriptions() {
    describe_counter!(
        "decor_analyses_total",
        "Completed analysis runs by outcome"
    );
    describe_counter!(
        "decor_rejections_total",
        "Requests rejected before any network call"
    );
    describe_counter!(
        "decor_items_parsed_total",
        "Material items extracted from model replies"
    );
    describe_histogram!(
        "decor_analysis_duration_seconds",
        "Encode plus inference time per run"
    );
    describe_gauge!(
        "decor_analyzer_info",
        "Version information"
    );

    gauge!("decor_analyzer_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Record a finished run: `succeeded`, `failed` or `superseded`
pub fn record_analysis(provider: &str, outcome: &str, duration: Duration) {
    counter!(
        "decor_analyses_total",
        "provider" => provider.to_string(),
        "outcome" => outcome.to_string(),
    )
    .increment(1);

    histogram!(
        "decor_analysis_duration_seconds",
        "provider" => provider.to_string(),
    )
    .record(duration.as_secs_f64());
}

/// Record items extracted by the normalizer, labelled by strategy
pub fn record_items(strategy: &str, count: usize) {
    counter!(
        "decor_items_parsed_total",
        "strategy" => strategy.to_string(),
    )
    .increment(count as u64);
}

/// Record a validation rejection
pub fn record_rejection(reason: &str) {
    counter!(
        "decor_rejections_total",
        "reason" => reason.to_string(),
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_analysis("gemini", "succeeded", Duration::from_millis(5));
        record_items("line_heuristic", 3);
        record_rejection("image_too_large");
    }
}
