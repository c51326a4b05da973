//! Integration tests for the Gemini INSPECT call.
//!
//! Runs `GeminiClient` against a local HTTP stub, so the full request
//! construction and response handling path is exercised without a key.
//! `test_live_gemini_verdict` additionally hits the real API when
//! GEMINI_API_KEY and INSPECT_SAMPLE_IMAGE are available.

mod http_stub;

use insulator_inspector_lib::capture::{self, EncodedImage};
use insulator_inspector_lib::llm::{
    CredentialSource, GeminiClient, InferenceConfig, InspectionStatus, Verdict,
};
use insulator_inspector_lib::InspectError;

fn sample_image() -> EncodedImage {
    capture::encode_bytes(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10], "image/jpeg").unwrap()
}

fn client_for(base_url: &str) -> GeminiClient {
    GeminiClient::new(
        InferenceConfig::new(Some("test-key".to_string()), CredentialSource::Environment)
            .with_api_base(base_url),
    )
}

#[tokio::test]
async fn test_flashover_round_trip() {
    let model_text = r#"{"status":"Flashover","objectType":"ลูกถ้วยไฟฟ้า","description":"พบรอยไหม้จากการอาร์ค","confidenceScores":{"normal":10,"flashover":80,"broken":10}}"#;
    let stub = http_stub::serve(vec![(200, http_stub::gemini_envelope(model_text))]).await;

    let verdict = client_for(&stub.base_url)
        .classify_image(&sample_image())
        .await
        .expect("classify failed");

    assert_eq!(verdict.status(), InspectionStatus::Flashover);
    assert_eq!(verdict.object_type(), "ลูกถ้วยไฟฟ้า");
    let scores = verdict.confidence_scores().expect("scores missing");
    assert_eq!(
        (scores.normal, scores.flashover, scores.broken),
        (10.0, 80.0, 10.0)
    );

    let requests = stub.requests();
    assert_eq!(requests.len(), 1, "exactly one round trip");
    let request = &requests[0];
    assert_eq!(request.method, "POST");
    assert_eq!(
        request.path,
        "/models/gemini-2.5-flash:generateContent"
    );
    assert_eq!(request.header("x-goog-api-key"), Some("test-key"));

    let body = request.json();
    let parts = &body["contents"][0]["parts"];
    assert!(parts[0]["text"].as_str().unwrap().contains("ลูกถ้วยไฟฟ้า"));
    assert_eq!(parts[1]["inlineData"]["mimeType"], "image/jpeg");
    assert_eq!(parts[1]["inlineData"]["data"], sample_image().data);
    assert_eq!(
        body["generationConfig"]["responseSchema"]["required"],
        serde_json::json!(["status", "objectType", "description"])
    );
}

#[tokio::test]
async fn test_unrecognized_status_is_not_an_error() {
    let model_text = r#"{"status":"purple","objectType":"ลูกถ้วยไฟฟ้า","description":"?"}"#;
    let stub = http_stub::serve(vec![(200, http_stub::gemini_envelope(model_text))]).await;

    let verdict = client_for(&stub.base_url)
        .classify_image(&sample_image())
        .await
        .expect("unrecognized status must not fail");

    assert_eq!(verdict, Verdict::unrecognized());
}

#[tokio::test]
async fn test_empty_body_is_empty_response_error() {
    let stub = http_stub::serve(vec![(200, String::new())]).await;

    let err = client_for(&stub.base_url)
        .classify_image(&sample_image())
        .await
        .unwrap_err();

    assert!(matches!(err, InspectError::EmptyResponse), "got {:?}", err);
}

#[tokio::test]
async fn test_candidate_without_text_is_empty_response_error() {
    let blocked = serde_json::json!({ "promptFeedback": { "blockReason": "SAFETY" } }).to_string();
    let stub = http_stub::serve(vec![(200, blocked)]).await;

    let err = client_for(&stub.base_url)
        .classify_image(&sample_image())
        .await
        .unwrap_err();

    assert!(matches!(err, InspectError::EmptyResponse), "got {:?}", err);
}

#[tokio::test]
async fn test_http_error_carries_status_and_cause() {
    let stub = http_stub::serve(vec![(
        503,
        r#"{"error":{"code":503,"message":"The model is overloaded."}}"#.to_string(),
    )])
    .await;

    let err = client_for(&stub.base_url)
        .classify_image(&sample_image())
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(matches!(err, InspectError::AnalysisFailed(_)));
    assert!(message.contains("503"), "message: {}", message);
    assert!(message.contains("overloaded"), "message: {}", message);
    assert_eq!(stub.requests().len(), 1, "no retry");
}

#[tokio::test]
async fn test_unreachable_service_is_analysis_failure() {
    // Bind then drop to get a port with nothing listening.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let err = client_for(&format!("http://127.0.0.1:{}", port))
        .classify_image(&sample_image())
        .await
        .unwrap_err();

    assert!(matches!(err, InspectError::AnalysisFailed(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_malformed_verdict_is_analysis_failure() {
    let stub = http_stub::serve(vec![(
        200,
        http_stub::gemini_envelope(r#"{"status":"ปกติ","description":"no object type"}"#),
    )])
    .await;

    let err = client_for(&stub.base_url)
        .classify_image(&sample_image())
        .await
        .unwrap_err();

    assert!(matches!(err, InspectError::AnalysisFailed(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_live_gemini_verdict() {
    let manifest_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    let env_path = manifest_dir.join(".env.local");
    if env_path.exists() {
        dotenvy::from_path(&env_path).ok();
    }

    let key = match std::env::var("GEMINI_API_KEY") {
        Ok(key) if !key.is_empty() => key,
        _ => {
            eprintln!("SKIP: No GEMINI_API_KEY");
            return;
        }
    };
    let image_path = match std::env::var("INSPECT_SAMPLE_IMAGE") {
        Ok(path) if !path.is_empty() => std::path::PathBuf::from(path),
        _ => {
            eprintln!("SKIP: No INSPECT_SAMPLE_IMAGE");
            return;
        }
    };

    let image = capture::encode(&image_path).await.expect("sample image unreadable");
    let client = GeminiClient::new(InferenceConfig::new(Some(key), CredentialSource::Environment));

    let start = std::time::Instant::now();
    let verdict = client.classify_image(&image).await.expect("live classify failed");
    eprintln!("[TEST] Verdict in {}ms: {:?}", start.elapsed().as_millis(), verdict);

    assert_eq!(
        verdict.status().is_condition(),
        verdict.confidence_scores().is_some()
    );
}
