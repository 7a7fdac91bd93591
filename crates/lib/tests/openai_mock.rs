//! Integration test: run a local stand-in for the OpenAI API (GET /v1/models, POST /v1/chat/completions)
//! and drive the real HTTP client, catalog, and appliers against it. No network access required.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use prompt_skills::apply::{ApplyError, SkillApplier};
use prompt_skills::catalog::{self, FALLBACK_MODELS};
use prompt_skills::config::{self, Config};
use prompt_skills::llm::{LlmError, OpenAiClient};
use prompt_skills::model::load_model_with;
use prompt_skills::skills::{Skill, SkillSelection};
use prompt_skills::templates::{Language, TemplateStore};
use serde_json::{json, Value};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

const GOOD_KEY: &str = "sk-test";

#[derive(Clone, Default)]
struct MockState {
    chat_bodies: Arc<Mutex<Vec<Value>>>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", GOOD_KEY))
        .unwrap_or(false)
}

fn unauthorized() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": { "message": "Incorrect API key provided" } })),
    )
}

async fn models(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    (
        StatusCode::OK,
        Json(json!({
            "object": "list",
            "data": [
                { "id": "whisper-1", "object": "model" },
                { "id": "gpt-3.5-turbo", "object": "model" },
                { "id": "dall-e-3", "object": "model" },
                { "id": "gpt-4o", "object": "model" },
                { "id": "chatgpt-4o-latest", "object": "model" },
                { "id": "text-embedding-3-large", "object": "model" }
            ]
        })),
    )
}

async fn chat_completions(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    let model = body["model"].as_str().unwrap_or_default().to_string();
    state.chat_bodies.lock().unwrap().push(body);
    (
        StatusCode::OK,
        Json(json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": format!("improved by {}\nline two", model) },
                "finish_reason": "stop"
            }]
        })),
    )
}

/// Start the mock server on a free port; returns its /v1 base URL and the shared state.
async fn start_mock() -> (String, MockState) {
    let state = MockState::default();
    let app = Router::new()
        .route("/v1/models", get(models))
        .route("/v1/chat/completions", post(chat_completions))
        .with_state(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock server");
    let addr = listener.local_addr().expect("local_addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{}/v1", addr), state)
}

fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind free port");
    listener.local_addr().expect("local_addr").port()
}

fn applier() -> SkillApplier {
    SkillApplier::new(Arc::new(TemplateStore::bundled().expect("bundled templates")))
}

#[tokio::test]
async fn catalog_lists_filtered_models_in_descending_order() {
    let (base_url, _) = start_mock().await;
    let models = catalog::available_models_for_key(GOOD_KEY, Some(base_url)).await;
    assert_eq!(models, vec!["gpt-4o", "gpt-3.5-turbo", "chatgpt-4o-latest"]);
}

#[tokio::test]
async fn catalog_falls_back_on_rejected_credential() {
    let (base_url, _) = start_mock().await;
    let client = OpenAiClient::new("sk-wrong", Some(base_url)).unwrap();
    let err = catalog::fetch_chat_models(&client).await.unwrap_err();
    assert!(matches!(err, catalog::CatalogError::Unauthorized(_)));
    assert_eq!(catalog::available_models(&client).await, FALLBACK_MODELS.to_vec());
}

#[tokio::test]
async fn catalog_falls_back_when_server_is_unreachable() {
    let base_url = format!("http://127.0.0.1:{}/v1", free_port());
    let models = catalog::available_models_for_key(GOOD_KEY, Some(base_url)).await;
    assert_eq!(models, FALLBACK_MODELS.to_vec());
}

#[tokio::test]
async fn apply_skill_round_trip() {
    let (base_url, state) = start_mock().await;
    let client = OpenAiClient::new(GOOD_KEY, Some(base_url)).unwrap();
    let model = load_model_with("gpt-4o", client).unwrap();
    let templates = TemplateStore::bundled().unwrap();

    let out = applier()
        .apply_skill(&model, Skill::ChainOfThought, "Explain TCP slow start.", 1, Language::English)
        .await
        .unwrap();
    assert_eq!(out, "improved by gpt-4o\nline two");

    let bodies = state.chat_bodies.lock().unwrap().clone();
    assert_eq!(bodies.len(), 1);
    let messages = bodies[0]["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "system");
    assert_eq!(messages[1]["role"], "user");
    let system = messages[0]["content"].as_str().unwrap();
    assert!(system.starts_with(templates.get("system").unwrap()));
    assert!(system.ends_with(templates.get("lang_eng").unwrap()));
    let user = messages[1]["content"].as_str().unwrap();
    assert!(user.contains("Explain TCP slow start."));
    assert!(!user.contains("{prompt}"));
}

#[tokio::test]
async fn apply_skills_round_trip() {
    let (base_url, state) = start_mock().await;
    let client = OpenAiClient::new(GOOD_KEY, Some(base_url)).unwrap();
    let model = load_model_with("gpt-4o-mini", client).unwrap();
    let selection = SkillSelection::from_toggles([
        (Skill::Role, true),
        (Skill::FewShot, false),
        (Skill::OutputFormat, true),
    ]);

    let out = applier()
        .apply_skills(&model, &selection, "Summarize this article.", Language::Default)
        .await
        .unwrap();
    assert_eq!(out, "improved by gpt-4o-mini\nline two");

    let bodies = state.chat_bodies.lock().unwrap().clone();
    assert_eq!(bodies.len(), 1);
    let user = bodies[0]["messages"][1]["content"].as_str().unwrap();
    assert!(user.contains("\n1. role: "));
    assert!(user.contains("\n2. output_format: "));
    assert!(!user.contains("few_shot"));
    assert!(user.ends_with("[original]\nSummarize this article.\n[improved]\n"));
}

#[tokio::test]
async fn rejected_credential_propagates_from_applier() {
    let (base_url, state) = start_mock().await;
    let client = OpenAiClient::new("sk-wrong", Some(base_url)).unwrap();
    let model = load_model_with("gpt-4o", client).unwrap();

    let err = applier()
        .apply_skill(&model, Skill::Role, "p", 1, Language::Default)
        .await
        .unwrap_err();
    assert!(matches!(err, ApplyError::Llm(LlmError::Api { status: 401, .. })));
    assert!(state.chat_bodies.lock().unwrap().is_empty());
}

fn temp_config_dir() -> (PathBuf, PathBuf) {
    let dir = std::env::temp_dir().join(format!("prompt-skills-test-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("create config dir");
    (dir.clone(), dir.join("config.json"))
}

#[test]
fn config_file_selects_custom_templates() {
    let (dir, config_path) = temp_config_dir();
    let mut templates: serde_json::Map<String, Value> =
        serde_json::from_str(include_str!("../config/templates.json")).unwrap();
    templates.insert("system".to_string(), json!("CUSTOM SYSTEM"));
    std::fs::write(dir.join("templates.json"), Value::Object(templates).to_string())
        .expect("write templates.json");
    std::fs::File::create(&config_path)
        .and_then(|mut f| f.write_all(br#"{"templatesPath":"templates.json","defaultModel":"gpt-4o"}"#))
        .expect("write config.json");

    let (config, path) = config::load_config(Some(config_path)).unwrap();
    assert_eq!(config::resolve_default_model(&config), "gpt-4o");
    let store = config::load_templates(&config, &path).unwrap();
    assert_eq!(store.get("system").unwrap(), "CUSTOM SYSTEM");

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn incomplete_custom_templates_are_rejected() {
    let (dir, config_path) = temp_config_dir();
    std::fs::write(dir.join("templates.json"), r#"{"system":"only this"}"#).expect("write templates.json");
    let mut config = Config::default();
    config.templates_path = Some(PathBuf::from("templates.json"));

    let err = config::load_templates(&config, &config_path).unwrap_err();
    assert!(format!("{:#}", err).contains("template not found"));

    let _ = std::fs::remove_dir_all(dir);
}
