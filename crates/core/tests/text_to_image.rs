use ai_studio_core::config::parse_base_url;
use ai_studio_core::{AppError, AspectRatio, Config, CreateFunction, GeminiClient, ImageService, Phase, Session};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PREDICT_PATH: &str = "/models/imagen-4.0-generate-001:predict";

fn client_for(server: &MockServer) -> GeminiClient {
    let mut config = Config::with_api_key("test-key").unwrap();
    config.base_url = parse_base_url(&server.uri()).unwrap();
    GeminiClient::new(&config).unwrap()
}

#[tokio::test]
async fn sends_prompt_and_aspect_ratio() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PREDICT_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_json(json!({
            "instances": [{ "prompt": "a lighthouse at dusk" }],
            "parameters": {
                "sampleCount": 1,
                "aspectRatio": "16:9",
                "outputOptions": { "mimeType": "image/jpeg" }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "predictions": [{ "bytesBase64Encoded": "aW1hZ2U=", "mimeType": "image/jpeg" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let image = client_for(&server)
        .generate_from_text("a lighthouse at dusk", AspectRatio::Landscape)
        .await
        .unwrap();

    assert_eq!(image.media_type(), "image/jpeg");
    assert_eq!(image.decode().unwrap(), b"image");
}

#[tokio::test]
async fn empty_predictions_are_an_empty_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PREDICT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate_from_text("anything", AspectRatio::Square)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::EmptyResult(_)));
}

#[tokio::test]
async fn non_success_status_is_a_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PREDICT_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate_from_text("anything", AspectRatio::Square)
        .await
        .unwrap_err();

    match err {
        AppError::Transport(msg) => assert!(msg.contains("403") && msg.contains("API key not valid")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn session_drives_the_logo_template_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PREDICT_PATH))
        .and(body_json(json!({
            "instances": [{
                "prompt": "design a modern, minimalist logo with the text \"ACME\". vector style, high contrast, on a plain white background."
            }],
            "parameters": {
                "sampleCount": 1,
                "aspectRatio": "1:1",
                "outputOptions": { "mimeType": "image/jpeg" }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "predictions": [{ "bytesBase64Encoded": "bG9nbw==" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut session = Session::new();
    session.select_function(CreateFunction::Text).unwrap();
    session.set_prompt("ACME");

    let image = session.generate(&client).await.unwrap();
    assert_eq!(image.media_type(), "image/jpeg");
    assert_eq!(image.to_data_url(), "data:image/jpeg;base64,bG9nbw==");
    assert_eq!(session.phase(), Phase::Succeeded);
}
