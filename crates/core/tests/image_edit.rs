use ai_studio_core::config::parse_base_url;
use ai_studio_core::{
    AppError, Config, EditFunction, GeminiClient, ImagePayload, ImageService, ImageSource, Phase,
    Session, Slot,
};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE_PATH: &str = "/models/gemini-2.5-flash-image-preview:generateContent";

fn client_for(server: &MockServer) -> GeminiClient {
    let mut config = Config::with_api_key("test-key").unwrap();
    config.base_url = parse_base_url(&server.uri()).unwrap();
    GeminiClient::new(&config).unwrap()
}

fn candidate_with(parts: Value) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": parts },
            "index": 0
        }]
    })
}

fn image_reply() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(candidate_with(json!([
        { "text": "Here you go" },
        { "inlineData": { "mimeType": "image/png", "data": "ZWRpdGVk" } },
        { "inlineData": { "mimeType": "image/jpeg", "data": "c2Vjb25k" } }
    ])))
}

fn text_only_reply() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(candidate_with(json!([
        { "text": "I can't edit that image" }
    ])))
}

#[tokio::test]
async fn edit_sends_image_then_text_and_asks_for_image_output() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{
                "parts": [
                    { "inlineData": { "mimeType": "image/png", "data": "Zmlyc3Q=" } },
                    { "text": "Retouch this image: smooth skin" }
                ]
            }],
            "generationConfig": { "responseModalities": ["IMAGE", "TEXT"] }
        })))
        .respond_with(image_reply())
        .expect(1)
        .mount(&server)
        .await;

    let image = client_for(&server)
        .edit_single_image(
            "Retouch this image: smooth skin",
            &ImagePayload::new("image/png", "Zmlyc3Q="),
        )
        .await
        .unwrap();

    assert_eq!(image.media_type(), "image/png");
    assert_eq!(image.decode().unwrap(), b"edited");
}

#[tokio::test]
async fn text_only_edit_reply_is_an_empty_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(text_only_reply())
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .edit_single_image("add a hat", &ImagePayload::new("image/png", "Zmlyc3Q="))
        .await
        .unwrap_err();

    match err {
        AppError::EmptyResult(msg) => assert_eq!(msg, "API did not return an edited image"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn text_only_compose_reply_names_the_composition() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(text_only_reply())
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .compose_two_images(
            "Combine these two images. ",
            &ImagePayload::new("image/png", "YQ=="),
            &ImagePayload::new("image/png", "Yg=="),
        )
        .await
        .unwrap_err();

    match err {
        AppError::EmptyResult(msg) => assert_eq!(msg, "API did not return a composed image"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn session_style_edit_without_image_reply_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_partial_json(json!({
            "contents": [{
                "parts": [
                    { "inlineData": { "mimeType": "image/jpeg" } },
                    { "text": "Apply a new style to this image based on the following description: watercolor" }
                ]
            }]
        })))
        .respond_with(text_only_reply())
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut session = Session::new();
    session.select_function(EditFunction::Style).unwrap();
    session
        .upload(
            Slot::First,
            ImageSource::Memory {
                bytes: b"photo".to_vec(),
                media_type: Some("image/jpeg".to_string()),
            },
        )
        .unwrap();
    session.set_prompt("watercolor");

    let err = session.generate(&client).await.unwrap_err();
    assert!(matches!(err, AppError::EmptyResult(_)));
    assert_eq!(session.phase(), Phase::Failed);
    assert!(session.result().is_none());
}

#[tokio::test]
async fn session_compose_sends_images_in_upload_order() {
    let server = MockServer::start().await;
    let first = ImagePayload::from_bytes(b"first image", Some("image/png"));
    let second = ImagePayload::from_bytes(b"second image", Some("image/webp"));
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_partial_json(json!({
            "contents": [{
                "parts": [
                    { "inlineData": { "mimeType": "image/png", "data": first.data() } },
                    { "inlineData": { "mimeType": "image/webp", "data": second.data() } },
                    { "text": "Combine these two images. side by side" }
                ]
            }],
            "generationConfig": { "responseModalities": ["IMAGE", "TEXT"] }
        })))
        .respond_with(image_reply())
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut session = Session::new();
    session.select_function(EditFunction::Compose).unwrap();
    for (slot, bytes, media_type) in [
        (Slot::First, &b"first image"[..], "image/png"),
        (Slot::Second, &b"second image"[..], "image/webp"),
    ] {
        session
            .upload(
                slot,
                ImageSource::Memory {
                    bytes: bytes.to_vec(),
                    media_type: Some(media_type.to_string()),
                },
            )
            .unwrap();
    }
    session.set_prompt("side by side");

    let image = session.generate(&client).await.unwrap();
    assert_eq!(image.data(), "ZWRpdGVk");
    assert_eq!(session.phase(), Phase::Succeeded);
}
