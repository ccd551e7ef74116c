//! End-to-end: catalog -> engine -> sink.

use std::path::Path;
use std::sync::Arc;

use worksim_core::attempt::{AttemptPhase, FinishReason};
use worksim_core::catalog::{parse_category_str, StaticCatalog};
use worksim_core::engine::{EngineConfig, SimulationEngine};
use worksim_core::error::EngineError;
use worksim_core::model::{Answer, Candidate};
use worksim_sink::{FileSink, MockSink};

const CATALOG: &str = r#"
[category]
id = "support"
name = "Customer Support"

[[tasks]]
id = "s1"
type = "writing"
title = "Reply to an angry customer"
description = "A refund was delayed twice."
instructions = ["Apologize", "Give a date"]
time_limit_minutes = 10

[[tasks]]
id = "s2"
type = "problem-solving"
title = "Triage the queue"
description = "Forty tickets, two agents."
instructions = ["Prioritize"]
time_limit_minutes = 5
"#;

fn catalog() -> Arc<StaticCatalog> {
    let category = parse_category_str(CATALOG, Path::new("support.toml")).unwrap();
    Arc::new(StaticCatalog::new(vec![category]))
}

fn config() -> EngineConfig {
    EngineConfig {
        jitter_seed: Some(11),
        ..EngineConfig::default()
    }
}

#[tokio::test]
async fn failed_delivery_can_be_retried_with_identical_payload() {
    let sink = Arc::new(MockSink::failing(1));
    let engine = SimulationEngine::new(catalog(), sink.clone(), config());

    let mut attempt = engine.start("support", Candidate::default()).unwrap();
    attempt
        .submit(Answer::text("We are sorry for the delay, your refund lands Friday."))
        .unwrap();
    attempt.skip().unwrap();
    assert_eq!(attempt.finish_reason(), Some(FinishReason::Completed));

    let err = engine.finalize(&mut attempt).await.unwrap_err();
    assert!(matches!(err, EngineError::SinkFailure(_)));
    assert!(err.is_user_visible());
    assert_eq!(attempt.phase(), AttemptPhase::Finished);
    assert_eq!(attempt.submissions().len(), 2);

    let receipt = engine.finalize(&mut attempt).await.unwrap();
    assert_eq!(receipt.id, "mock-2");
    assert_eq!(attempt.phase(), AttemptPhase::Submitted);
    assert_eq!(sink.call_count(), 2);

    let accepted = sink.accepted();
    assert_eq!(accepted.len(), 1);
    assert_eq!(accepted[0].category_id, "support");
    assert_eq!(accepted[0].task_results[1].score, 0);
    assert_eq!(accepted[0].breakdown, attempt.score().unwrap().breakdown);

    let again = engine.finalize(&mut attempt).await.unwrap_err();
    assert_eq!(again, EngineError::AlreadySubmitted);
}

#[tokio::test]
async fn file_sink_receives_expired_attempt() {
    let dir = tempfile::tempdir().unwrap();
    let sink = Arc::new(FileSink::new(dir.path()));
    let engine = SimulationEngine::new(catalog(), sink.clone(), config());

    let mut attempt = engine.start("support", Candidate::default()).unwrap();
    attempt.append_line("Draft reply in progress");
    assert!(attempt.auto_submit_on_expiry());

    let receipt = engine.finalize(&mut attempt).await.unwrap();
    let written = std::fs::read_to_string(sink.path_for(&receipt.id)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&written).unwrap();
    let results = value["taskResults"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["answer"]["text"], "Draft reply in progress");
}

#[tokio::test]
async fn finalize_before_finish_is_rejected() {
    let sink = Arc::new(MockSink::new());
    let engine = SimulationEngine::new(catalog(), sink.clone(), config());

    let mut attempt = engine.start("support", Candidate::default()).unwrap();
    let err = engine.finalize(&mut attempt).await.unwrap_err();
    assert_eq!(err, EngineError::NotFinished);
    assert_eq!(sink.call_count(), 0);
}
