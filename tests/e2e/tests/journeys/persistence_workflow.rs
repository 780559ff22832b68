//! Persistence Workflow Tests
//!
//! Cards, logs and configurations survive a trip through JSON on disk, and a
//! deck can be rebuilt from its review history under a new configuration.

use cadence_core::{Card, Rating, ReviewLog, SchedulerConfig, SchedulerError, State};
use cadence_e2e_tests::{TestDataFactory, TestDeckManager};
use chrono::Duration;

use Rating::*;

fn study(deck: &mut TestDeckManager, ids: &[i64]) {
    for (i, &id) in ids.iter().enumerate() {
        let script: &[Rating] = match i % 3 {
            0 => &[Good, Good, Good, Good],
            1 => &[Again, Hard, Good, Good, Again, Good],
            _ => &[Easy, Good, Hard],
        };
        for &rating in script {
            deck.review_when_due(id, rating);
        }
    }
}

#[test]
fn test_deck_survives_reload() {
    let mut deck = TestDeckManager::new_temp(TestDataFactory::unfuzzed_config(), 3);
    let ids = deck.seed_new_cards(6, TestDataFactory::fixed_start());
    study(&mut deck, &ids);

    let before: Vec<Card> = deck.cards().cloned().collect();
    let logs_before = deck.logs().to_vec();
    deck.save();

    deck.clear();
    assert!(deck.is_empty());
    deck.reload();

    let after: Vec<Card> = deck.cards().cloned().collect();
    assert_eq!(after, before);
    assert_eq!(deck.logs(), logs_before.as_slice());
    assert_eq!(deck.scheduler.config(), &TestDataFactory::unfuzzed_config());
}

#[test]
fn test_deck_file_is_plain_json() {
    let mut deck = TestDeckManager::new_temp(TestDataFactory::unfuzzed_config(), 3);
    let ids = deck.seed_new_cards(1, TestDataFactory::fixed_start());
    deck.review_when_due(ids[0], Good);
    deck.save();

    let raw = std::fs::read_to_string(deck.path()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(value["config"]["learning_steps"], serde_json::json!([60, 600]));
    assert_eq!(value["config"]["enable_fuzzing"], false);
    assert_eq!(value["cards"][0]["state"], 1);
    assert_eq!(value["cards"][0]["step"], 1);
    assert_eq!(value["logs"][0]["rating"], 3);
}

#[test]
fn test_reschedule_under_same_config_is_identity() {
    let mut deck = TestDeckManager::new_temp(TestDataFactory::unfuzzed_config(), 3);
    let ids = deck.seed_new_cards(6, TestDataFactory::fixed_start());
    study(&mut deck, &ids);

    let before: Vec<Card> = deck.cards().cloned().collect();
    deck.reschedule_all(TestDataFactory::unfuzzed_config());
    let after: Vec<Card> = deck.cards().cloned().collect();

    assert_eq!(after, before);
}

#[test]
fn test_reschedule_under_new_retention() {
    let mut deck = TestDeckManager::new_temp(TestDataFactory::unfuzzed_config(), 3);
    let ids = deck.seed_new_cards(1, TestDataFactory::fixed_start());
    for _ in 0..5 {
        deck.review_when_due(ids[0], Good);
    }
    let before = deck.card(ids[0]).unwrap().clone();

    deck.reschedule_all(SchedulerConfig {
        desired_retention: 0.8,
        enable_fuzzing: false,
        ..Default::default()
    });
    let after = deck.card(ids[0]).unwrap();

    // Same timestamps replayed, so only the final gap moves
    assert_eq!(after.state, State::Review);
    assert_eq!(after.last_review, before.last_review);
    assert!(after.due > before.due);
}

#[test]
fn test_config_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scheduler.json");

    let config = SchedulerConfig {
        desired_retention: 0.85,
        learning_steps: vec![Duration::minutes(2), Duration::minutes(15), Duration::hours(1)],
        relearning_steps: vec![Duration::minutes(5)],
        maximum_interval: 1000,
        ..Default::default()
    };
    std::fs::write(&path, config.to_json().unwrap()).unwrap();

    let loaded = SchedulerConfig::from_json(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_partial_config_takes_defaults() {
    let config = SchedulerConfig::from_json(r#"{"desired_retention": 0.95}"#).unwrap();
    assert_eq!(config.desired_retention, 0.95);
    assert_eq!(config.maximum_interval, 36500);
    assert_eq!(config.learning_steps.len(), 2);

    assert!(matches!(
        SchedulerConfig::from_json("not json"),
        Err(SchedulerError::Serialization(_))
    ));
}

#[test]
fn test_logs_roundtrip_and_replay() {
    let scheduler = TestDataFactory::unfuzzed_scheduler();
    let mut card = TestDataFactory::new_card(77);
    let mut logs = Vec::new();
    for rating in [Good, Again, Good, Good, Easy] {
        let (next, log) = scheduler
            .review_card_with_log(&card, rating, card.due, Some(std::time::Duration::from_secs(8)))
            .unwrap();
        logs.push(log);
        card = next;
    }

    let json = serde_json::to_string(&logs).unwrap();
    let decoded: Vec<ReviewLog> = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, logs);
    assert!(decoded.iter().all(|log| log.review_duration == Some(8)));

    let replayed = scheduler.reschedule_card(&card, &decoded).unwrap();
    assert_eq!(replayed, card);
}
