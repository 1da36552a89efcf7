/// End-to-end runs of the orchestrator against a mocked Gemini endpoint
use decor_analyzer::{
    config::GeminiConfig,
    error::AppError,
    image_utils::SelectedImage,
    pricing::CostBreakdown,
    providers::gemini::GeminiProvider,
    session::{AnalysisOutcome, Orchestrator, Phase},
};
use serde_json::json;
use std::sync::Arc;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn orchestrator_for(server: &MockServer) -> Orchestrator {
    let provider = GeminiProvider::new(
        reqwest::Client::new(),
        GeminiConfig {
            base_url: server.uri(),
            model: "gemini-1.5-flash".to_string(),
            timeout_seconds: 5,
        },
    );
    Orchestrator::new(Arc::new(provider))
}

fn gemini_reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }],
        "modelVersion": "gemini-1.5-flash"
    }))
}

fn jpeg(size: usize) -> SelectedImage {
    let mut bytes = vec![0u8; size.max(4)];
    bytes[..4].copy_from_slice(&[0xFF, 0xD8, 0xFF, 0xE0]);
    SelectedImage::new("decoration.jpg", bytes)
}

#[tokio::test]
async fn test_free_text_reply_produces_breakdown() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-flash:generateContent"))
        .and(query_param("key", "AIzaSyTestKey"))
        .respond_with(gemini_reply(
            "Based on the image, here are the materials:\n- Tablecloths: 300\nLet me know if you need more.",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let orchestrator = orchestrator_for(&server);
    orchestrator.submit_credential("AIzaSyTestKey").unwrap();
    let outcome = orchestrator.select_and_analyze(jpeg(1024)).await.unwrap();

    assert_eq!(outcome, AnalysisOutcome::Succeeded { items: 1 });
    let view = orchestrator.view();
    assert_eq!(view.phase, Phase::Succeeded);
    assert_eq!(view.materials[0].name, "Tablecloths");
    assert_eq!(
        view.breakdown,
        CostBreakdown {
            materials_subtotal: 300,
            transportation_fee: 30,
            labor_fee: 45,
            total: 375,
        }
    );
}

#[tokio::test]
async fn test_fenced_json_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(gemini_reply(
            "```json\n[\n  {\"name\": \"Chairs\", \"price\": 500}, // 10 chairs\n  {\"name\": \"Balloon Arch\", \"price\": 2500}\n]\n```",
        ))
        .mount(&server)
        .await;

    let orchestrator = orchestrator_for(&server);
    orchestrator.submit_credential("AIzaSyTestKey").unwrap();
    orchestrator.select_and_analyze(jpeg(2048)).await.unwrap();

    let view = orchestrator.view();
    let names: Vec<&str> = view.materials.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Chairs", "Balloon Arch"]);
    assert_eq!(view.breakdown.materials_subtotal, 3000);
    assert_eq!(view.breakdown.total, 3000 + 300 + 450);
}

#[tokio::test]
async fn test_six_mib_image_never_reaches_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(gemini_reply("Chairs - 500"))
        .expect(0)
        .mount(&server)
        .await;

    let orchestrator = orchestrator_for(&server);
    orchestrator.submit_credential("AIzaSyTestKey").unwrap();
    let err = orchestrator
        .select_and_analyze(jpeg(6 * 1024 * 1024))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::ImageTooLarge { .. }));
    assert_eq!(orchestrator.view().phase, Phase::Idle);
}

#[tokio::test]
async fn test_missing_credential_never_reaches_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(gemini_reply("Chairs - 500"))
        .expect(0)
        .mount(&server)
        .await;

    let orchestrator = orchestrator_for(&server);
    let err = orchestrator.select_and_analyze(jpeg(1024)).await.unwrap_err();

    assert!(matches!(err, AppError::MissingCredential));
    assert_eq!(orchestrator.view().phase, Phase::Previewing);
}

#[tokio::test]
async fn test_upstream_failure_keeps_previous_results() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(gemini_reply("Chairs - 500"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .mount(&server)
        .await;

    let orchestrator = orchestrator_for(&server);
    orchestrator.submit_credential("AIzaSyTestKey").unwrap();
    orchestrator.select_and_analyze(jpeg(1024)).await.unwrap();

    let err = orchestrator.select_and_analyze(jpeg(512)).await.unwrap_err();
    assert!(matches!(err, AppError::Upstream { .. }));

    let view = orchestrator.view();
    assert_eq!(view.phase, Phase::Failed);
    assert!(!view.loading);
    assert_eq!(view.materials.len(), 1);
    assert_eq!(view.breakdown.total, 625);
}

#[tokio::test]
async fn test_unparseable_reply_yields_empty_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(gemini_reply("Sorry, I can't price this decoration."))
        .mount(&server)
        .await;

    let orchestrator = orchestrator_for(&server);
    orchestrator.submit_credential("AIzaSyTestKey").unwrap();
    let outcome = orchestrator.select_and_analyze(jpeg(1024)).await.unwrap();

    assert_eq!(outcome, AnalysisOutcome::Succeeded { items: 0 });
    let view = orchestrator.view();
    assert_eq!(view.phase, Phase::Succeeded);
    assert_eq!(view.breakdown, CostBreakdown::default());
}
