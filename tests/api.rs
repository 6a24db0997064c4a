use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use base64::Engine as _;
use http_body_util::BodyExt;
use questforge_server::ai::{MockChatClient, MockImageClient};
use questforge_server::archive::ImageArchive;
use questforge_server::models::{Config, Environment};
use questforge_server::server::{router, AppState};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tower::util::ServiceExt;

fn test_config(max_turns: usize) -> Config {
    Config {
        openai_api_key: "test-key".to_string(),
        environment: Environment::Production,
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        chat_model: "gpt-3.5-turbo".to_string(),
        turn_model: "gpt-4-1106-preview".to_string(),
        image_model: "dall-e-3".to_string(),
        max_turns,
        max_history_turns: 20,
        output_dir: "output".into(),
    }
}

fn build_app(config: Config, chat: MockChatClient, image_gen: MockImageClient) -> Router {
    let archive = Arc::new(ImageArchive::new(Path::new("output"), false));
    router(AppState::with_services(
        config,
        Arc::new(chat),
        Arc::new(image_gen),
        archive,
    ))
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn turn_reply(index: usize) -> String {
    json!({
        "scenario": format!("Scenario {} unfolds before you.", index),
        "question": format!("Question {}?", index),
        "choices": [format!("Choice {}a", index), format!("Choice {}b", index)],
    })
    .to_string()
}

#[tokio::test]
async fn test_missing_prompt_yields_400_with_error_field() {
    for uri in ["/generate-image", "/generate-text"] {
        let app = build_app(test_config(3), MockChatClient::new(), MockImageClient::new());
        let response = app.oneshot(post_json(uri, &json!({}))).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "route {}", uri);
        let body = response_json(response).await;
        assert!(body["error"].is_string(), "route {}", uri);
    }
}

#[tokio::test]
async fn test_generate_image_returns_two_decodable_images() {
    let image_gen = MockImageClient::new().with_response(vec![0x89, 0x50, 0x4E, 0x47]);
    let app = build_app(test_config(3), MockChatClient::new(), image_gen);

    let response = app
        .oneshot(post_json("/generate-image", &json!({ "prompt": "a ruined tower" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let images = body["data"]["images"].as_array().unwrap();
    assert_eq!(images.len(), 2);
    for image in images {
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(image.as_str().unwrap())
            .unwrap();
        assert!(!decoded.is_empty());
    }
}

#[tokio::test]
async fn test_image_provider_failure_yields_500_and_no_partial_list() {
    let image_gen = MockImageClient::new()
        .with_response(vec![1, 2, 3])
        .with_error("seed rejected");
    let app = build_app(test_config(3), MockChatClient::new(), image_gen);

    let response = app
        .oneshot(post_json("/generate-image", &json!({ "prompt": "a ruined tower" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response_json(response).await;
    assert!(body["error"].is_string());
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn test_first_turn_grows_history_by_one() {
    let chat = MockChatClient::new().with_response(turn_reply(1));
    let app = build_app(test_config(3), chat, MockImageClient::new());

    let response = app
        .oneshot(post_json("/generate-text-and-image", &json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let data = &response_json(response).await["data"];

    assert_eq!(data["scenario"], "Scenario 1 unfolds before you.");
    assert_eq!(data["question"], "Question 1?");
    assert_eq!(data["choices"].as_array().unwrap().len(), 2);
    assert_eq!(data["images"].as_array().unwrap().len(), 1);
    assert_eq!(data["oldScenarios"].as_array().unwrap().len(), 1);
    assert_eq!(data["oldQuestions"].as_array().unwrap().len(), 1);
    assert_eq!(data["oldChoices"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_full_game_reaches_terminal_state_within_cap() {
    let max_turns = 3;
    // The model never volunteers an ending; the server must force one.
    let chat = MockChatClient::new()
        .with_response(turn_reply(1))
        .with_response(turn_reply(2))
        .with_response(turn_reply(3))
        .with_response(turn_reply(4));
    let app = build_app(test_config(max_turns), chat, MockImageClient::new());

    let mut request_body = json!({});
    let mut turns_played = 0;

    loop {
        turns_played += 1;
        assert!(
            turns_played <= max_turns,
            "game did not terminate within {} turns",
            max_turns
        );

        let response = app
            .clone()
            .oneshot(post_json("/generate-text-and-image", &request_body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let mut body = response_json(response).await;
        let data = body["data"].take();

        assert_eq!(data["oldScenarios"].as_array().unwrap().len(), turns_played);
        assert_eq!(data["oldQuestions"].as_array().unwrap().len(), turns_played);

        let question = data["question"].as_str().unwrap();
        let choices = data["choices"].as_array().unwrap();
        if question.is_empty() && choices.is_empty() {
            break;
        }

        request_body = json!({
            "oldScenarios": data["oldScenarios"],
            "oldQuestions": data["oldQuestions"],
            "oldChoices": data["oldChoices"],
            "choice": choices[0],
        });
    }

    assert_eq!(turns_played, max_turns);
}

#[tokio::test]
async fn test_malformed_model_json_is_handled_as_502() {
    let chat = MockChatClient::new().with_response("I shall tell you a story instead");
    let app = build_app(test_config(3), chat, MockImageClient::new());

    let response = app
        .oneshot(post_json("/generate-text-and-image", &json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = response_json(response).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_history_over_cap_is_rejected() {
    let mut config = test_config(3);
    config.max_history_turns = 2;

    let app = build_app(config, MockChatClient::new(), MockImageClient::new());
    let long = vec!["x".to_string(); 3];

    let response = app
        .oneshot(post_json(
            "/generate-text-and-image",
            &json!({
                "oldScenarios": long,
                "oldQuestions": long,
                "oldChoices": long,
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_development_mode_archives_generated_images() {
    let dir = tempfile::tempdir().unwrap();
    let output_dir = dir.path().join("output");

    let config = test_config(3);
    let archive = Arc::new(ImageArchive::new(&output_dir, true));
    let app = router(AppState::with_services(
        config,
        Arc::new(MockChatClient::new()),
        Arc::new(MockImageClient::new().with_response(vec![0xCA, 0xFE])),
        archive,
    ));

    let response = app
        .oneshot(post_json("/generate-image", &json!({ "prompt": "a castle" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let mut names: Vec<String> = std::fs::read_dir(&output_dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();

    assert_eq!(names.len(), 2);
    assert!(names[0].starts_with("image-seed-12345-"));
    assert!(names[1].starts_with("image-seed-67890-"));
}
