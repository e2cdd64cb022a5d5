//! End-to-end runs of the validation pipeline against mocked HTTP endpoints.

use std::io::Write;

use botcheck_core::config::{BotcheckConfig, ProviderConfig, ProviderKind, SuiteConfig};
use botcheck_core::eval::{
    ANSWER_VALIDITY, CheckOutcome, KEY_DATA_CONTAINMENT, RESPONSE_FORMAT, RESPONSE_TIME,
    ValidationPipeline,
};
use serde_json::json;
use tempfile::NamedTempFile;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn question_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[{{"Kto je dekan?": "Igor Fabo"}}, {{"Kolko stoji skolne?": "zadarmo"}}, {{"Kedy zacina semester?": "september"}}]"#
    )
    .unwrap();
    file
}

fn config(server: &MockServer, questions: &NamedTempFile) -> BotcheckConfig {
    BotcheckConfig {
        bot: ProviderConfig {
            provider: ProviderKind::Rag,
            base_url: Some(format!("{}/rag", server.uri())),
            ..Default::default()
        },
        reference: ProviderConfig {
            api_key: Some("test-key".to_string()),
            base_url: Some(server.uri()),
            ..Default::default()
        },
        suite: SuiteConfig {
            questions_path: questions.path().to_path_buf(),
            ..Default::default()
        },
        ..Default::default()
    }
}

async fn mount_bot_answer(server: &MockServer, question: &str, answer: &str) {
    Mock::given(method("POST"))
        .and(path("/rag"))
        .and(body_string_contains(question))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "answer": answer })))
        .mount(server)
        .await;
}

async fn mount_judge(server: &MockServer, reply: &str) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": reply } }]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_suite_passes_over_http() {
    let server = MockServer::start().await;
    mount_bot_answer(&server, "Kto je dekan?", "Dekanom je Igor Fabo.").await;
    mount_bot_answer(&server, "Kolko stoji skolne?", "Studium je zadarmo.").await;
    mount_bot_answer(&server, "Kedy zacina semester?", "Semester zacina v septembri.").await;
    mount_judge(&server, "YES").await;

    let questions = question_file();
    let pipeline = ValidationPipeline::from_config(&config(&server, &questions)).unwrap();
    let report = pipeline.run().await.unwrap();

    assert!(report.outcome(RESPONSE_FORMAT).unwrap().is_passed());
    assert!(report.outcome(RESPONSE_TIME).unwrap().is_passed());
    // "september" is not a substring of "septembri", so 2 of 3 match
    assert!(report.outcome(KEY_DATA_CONTAINMENT).unwrap().is_passed());
    assert!(report.outcome(ANSWER_VALIDITY).unwrap().is_passed());
    assert_eq!(report.exit_code(), 0);
    assert!(report.bot.starts_with("rag/"));
    assert_eq!(report.reference, "openai/gpt-4o-mini");
}

#[tokio::test]
async fn test_bot_server_error_blocks_suite() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rag"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_judge(&server, "YES").await;

    let questions = question_file();
    let report = ValidationPipeline::from_config(&config(&server, &questions))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert!(matches!(
        report.outcome(RESPONSE_FORMAT),
        Some(CheckOutcome::Errored { error }) if error.contains("500")
    ));
    assert_eq!(report.summary.skipped, 3);
    assert_eq!(report.exit_code(), 1);

    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["results"][1]["outcome"]["status"], "skipped");
    assert_eq!(json["results"][1]["outcome"]["blocked_by"][0], RESPONSE_FORMAT);
}

#[tokio::test]
async fn test_invalid_config_is_rejected_before_running() {
    let server = MockServer::start().await;
    let questions = question_file();
    let mut config = config(&server, &questions);
    config.bot.base_url = None;

    let result = ValidationPipeline::from_config(&config);
    assert!(result.is_err());
}
