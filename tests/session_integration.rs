//! Integration tests for configuration loading and session bootstrap
//!
//! These run real tiktoken encodings against the offline echo backend.

use dialogue_session::config::{Config, GeneratorBackend};
use dialogue_session::context::{SessionState, TiktokenTokenizer, Tokenizer};
use dialogue_session::dialogue::{build_session, RecordingSink, Speaker, TerminalSink, TurnOutcome};

use mockito::Matcher;
use serde_json::json;

fn write_temp_config(contents: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!("dialogue-{}.toml", uuid::Uuid::new_v4()));
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_config_loading_from_file() {
    let path = write_temp_config(
        r#"
        [session]
        max_context_tokens = 256
        greeting = "Hi!"

        [generation]
        max_length = 300
        temperature = 0.9

        [tokenizer]
        encoding = "p50k_base"

        [generator]
        backend = "echo"
        endpoint = "http://models.internal:9000/generate"
        timeout_secs = 10

        [logging]
        level = "debug"
        json = true
        "#,
    );

    let config = Config::load(Some(path.as_path())).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(config.session.max_context_tokens, 256);
    assert_eq!(config.session.greeting, "Hi!");
    assert_eq!(config.generation.max_length, 300);
    assert_eq!(config.generation.temperature, 0.9);
    assert_eq!(config.generation.repetition_penalty, 1.2);
    assert_eq!(config.tokenizer.encoding, "p50k_base");
    assert_eq!(config.generator.backend, GeneratorBackend::Echo);
    assert_eq!(config.generator.timeout_secs, 10);
    assert!(config.logging.json);
}

#[test]
fn test_missing_config_file_uses_defaults() {
    let path = std::env::temp_dir().join("dialogue-does-not-exist.toml");
    let config = Config::load(Some(path.as_path())).unwrap();
    assert_eq!(config.session.max_context_tokens, 1024);
    assert_eq!(config.generation.max_length, 1024);
}

#[test]
fn test_invalid_budget_in_file_is_rejected() {
    let path = write_temp_config("[session]\nmax_context_tokens = 0\n");
    let result = Config::load(Some(path.as_path()));
    std::fs::remove_file(&path).ok();
    assert!(result.is_err());
}

#[tokio::test]
async fn test_echo_session_respects_budget_over_many_turns() {
    let config = Config::from_toml_str(
        r#"
        [session]
        max_context_tokens = 48

        [generation]
        max_length = 48

        [generator]
        backend = "echo"
        "#,
    )
    .unwrap();

    let mut session = build_session(&config, RecordingSink::new()).unwrap();
    session.greet(&config.session.greeting);

    let utterances = [
        "Tell me something about the weather today.",
        "Is it going to rain over the weekend in the mountains?",
        "What should I pack for a long hike?",
        "Thanks, that is very helpful.",
    ];

    for utterance in utterances {
        match session.run_turn(utterance).await {
            TurnOutcome::Replied { context_len, .. } => assert!(context_len <= 48),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    assert_eq!(session.state(), SessionState::Active);

    let messages = session.sink().messages();
    assert_eq!(messages[0].0, Speaker::Assistant);
    assert_eq!(messages.len(), 1 + 2 * utterances.len());
    assert_eq!(messages[1], (Speaker::User, utterances[0].to_string()));
}

#[tokio::test]
async fn test_http_backend_failure_is_reported_in_terminal() {
    let mut config = Config::default();
    config.generator.endpoint = "http://127.0.0.1:9/generate".to_string();
    config.generator.timeout_secs = 2;

    let sink = TerminalSink::new(Vec::new()).with_color(false);
    let mut session = build_session(&config, sink).unwrap();

    let outcome = session.run_turn("hello").await;
    assert!(matches!(outcome, TurnOutcome::Failed { .. }));
    assert!(session.context().is_empty());

    let out = String::from_utf8(session.into_sink().into_inner()).unwrap();
    assert!(out.starts_with("You: hello\n\nSystem: Error: generation failed: Network error"));
}

#[tokio::test]
async fn test_out_of_vocab_reply_fails_turn_and_keeps_context() {
    let tokenizer = TiktokenTokenizer::cl100k().unwrap();

    let first_input = tokenizer.encode("hello", true).unwrap();
    let mut first_output = first_input.clone();
    first_output.extend(tokenizer.encode(" there", true).unwrap());

    let mut second_input = first_output.clone();
    second_input.extend(tokenizer.encode("again", true).unwrap());
    let mut second_output = second_input.clone();
    second_output.push(999_999);

    let mut server = mockito::Server::new_async().await;
    let _first = server
        .mock("POST", "/generate")
        .match_body(Matcher::PartialJson(json!({ "input_ids": first_input })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "output_ids": first_output }).to_string())
        .create_async()
        .await;
    let _second = server
        .mock("POST", "/generate")
        .match_body(Matcher::PartialJson(json!({ "input_ids": second_input })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "output_ids": second_output }).to_string())
        .create_async()
        .await;

    let mut config = Config::default();
    config.generator.endpoint = format!("{}/generate", server.url());
    let mut session = build_session(&config, RecordingSink::new()).unwrap();

    match session.run_turn("hello").await {
        TurnOutcome::Replied { reply, .. } => assert_eq!(reply, " there"),
        other => panic!("unexpected outcome: {other:?}"),
    }
    let before = session.context().clone();
    assert_eq!(before.tokens(), first_output.as_slice());

    let outcome = session.run_turn("again").await;

    match outcome {
        TurnOutcome::Failed { error } => assert!(error.contains("failed to decode reply")),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(session.context(), &before);

    let (speaker, text) = session.sink().last().unwrap();
    assert_eq!(*speaker, Speaker::System);
    assert!(text.starts_with("Error: failed to decode reply"));
}
