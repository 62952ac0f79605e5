use std::fs;

use chrono::{Duration, TimeZone, Utc};
use tempfile::TempDir;

use wordfall::catalog::custom::load_custom_file;
use wordfall::catalog::{CUSTOM_CATEGORY, Catalog, CustomSetSlot, WordResolver, WordSource};
use wordfall::session::game::{
    GameSession, GameStatus, Resolution, SessionRules, SubmitOutcome, TickOutcome,
};
use wordfall::session::word::{SetRef, WordPair};
use wordfall::store::json_store::JsonStore;
use wordfall::store::progress::{ProgressStore, category_progress};

fn store_in(dir: &TempDir) -> JsonStore {
    JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap()
}

fn two_word_session() -> GameSession {
    GameSession::new(
        SetRef::new("basic", "Transport"),
        vec![WordPair::new("Xe hơi", "car"), WordPair::new("Nhà", "house")],
        SessionRules::default(),
    )
    .unwrap()
}

/// Tick until the current word lands and return the pending transition.
fn tick_to_ground(session: &mut GameSession) -> Resolution {
    for _ in 0..10_000 {
        if let TickOutcome::GroundReached(deferred) = session.tick() {
            return session.resolve(deferred.token);
        }
    }
    panic!("word never reached the ground");
}

#[test]
fn correct_answer_then_timeout_saves_best_score() {
    let dir = TempDir::new().unwrap();
    let mut store = store_in(&dir);
    let mut session = two_word_session();

    let SubmitOutcome::Correct(deferred) = session.submit_answer("car") else {
        panic!("expected a correct answer");
    };
    assert_eq!(session.resolve(deferred.token), Resolution::Advanced(1));

    let Resolution::Finished(summary) = tick_to_ground(&mut session) else {
        panic!("expected the session to finish");
    };
    assert_eq!(summary.score, 10);
    assert_eq!(summary.timeouts, 1);
    assert_eq!(session.status(), GameStatus::GameOver);

    let played_at = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
    let saved = session.persist_progress(&mut store, played_at).unwrap().unwrap();
    assert_eq!(saved.score, 10);
    assert!(saved.completed);

    let reopened = store_in(&dir);
    let record = reopened.load("basic_Transport").unwrap();
    assert_eq!(record.score, 10);
    assert!(record.completed);
    assert_eq!(record.last_played_at, played_at);
}

#[test]
fn worse_replay_keeps_best_and_updates_timestamp() {
    let dir = TempDir::new().unwrap();
    let mut store = store_in(&dir);
    let mut session = two_word_session();
    let first = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();

    for answer in ["car", "house"] {
        let SubmitOutcome::Correct(deferred) = session.submit_answer(answer) else {
            panic!("expected a correct answer");
        };
        session.resolve(deferred.token);
    }
    session.persist_progress(&mut store, first).unwrap();
    assert_eq!(store.load("basic_Transport").unwrap().score, 20);

    assert!(session.restart());
    assert!(matches!(tick_to_ground(&mut session), Resolution::Advanced(1)));
    assert!(matches!(tick_to_ground(&mut session), Resolution::Finished(_)));
    assert_eq!(session.score(), 0);

    let later = first + Duration::days(2);
    session.persist_progress(&mut store, later).unwrap();
    let record = store.load("basic_Transport").unwrap();
    assert_eq!(record.score, 20);
    assert_eq!(record.last_played_at, later);

    // Only one write per restart cycle.
    assert!(session.persist_progress(&mut store, later).unwrap().is_none());
}

#[test]
fn bundled_catalog_serves_ordered_words() {
    let catalog = Catalog::load_with_user_dir(None);
    let words = catalog.get_words("basic", "Transport");
    assert_eq!(words[0], WordPair::new("Xe hơi", "car"));
    assert!(catalog.get_words("basic", "transport").is_empty());
    assert!(catalog.get_words("nope", "Transport").is_empty());

    let session = GameSession::new(SetRef::new("basic", "Transport"), words, SessionRules::default())
        .unwrap();
    assert_eq!(session.current_word().unwrap().target, "car");
}

#[test]
fn custom_file_plays_through_resolver() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("kitchen.json");
    fs::write(&path, r#"[{"vi": "Bếp", "en": "stove"}, {"vi": "Nồi", "en": "pot"}]"#).unwrap();

    let catalog = Catalog::load_with_user_dir(None);
    let mut slot = CustomSetSlot::default();
    slot.stage(load_custom_file(&path).unwrap());

    let resolver = WordResolver {
        catalog: &catalog,
        custom: &slot,
    };
    let words = resolver.get_words(CUSTOM_CATEGORY, "kitchen");
    assert_eq!(words.len(), 2);
    assert!(resolver.get_words(CUSTOM_CATEGORY, "Kitchen").is_empty());

    let mut session =
        GameSession::new(SetRef::new(CUSTOM_CATEGORY, "kitchen"), words, SessionRules::default())
            .unwrap();
    assert!(matches!(session.submit_answer("  STOVE "), SubmitOutcome::Correct(_)));
}

#[test]
fn category_progress_counts_completed_sets() {
    let dir = TempDir::new().unwrap();
    let mut store = store_in(&dir);
    let catalog = Catalog::load_with_user_dir(None);
    let basic = catalog.category("basic").unwrap();

    let words = catalog.get_words("basic", "Animals");
    let mut session =
        GameSession::new(SetRef::new("basic", "Animals"), words.clone(), SessionRules::default())
            .unwrap();
    for word in &words {
        let SubmitOutcome::Correct(deferred) = session.submit_answer(&word.target) else {
            panic!("expected a correct answer for {}", word.target);
        };
        session.resolve(deferred.token);
    }
    session.persist_progress(&mut store, Utc::now()).unwrap();

    let progress = category_progress(&store, "basic", &basic.set_names());
    assert_eq!(progress.completed, 1);
    assert_eq!(progress.total, basic.sets.len());
    assert_eq!(progress.best_score("Animals"), 10 * words.len() as u32);

    // Same set name under another category does not count.
    let other = category_progress(&store, "TOEIC", &["Animals"]);
    assert_eq!(other.completed, 0);
}
