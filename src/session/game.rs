use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::engine::answer::{self, Verdict};
use crate::engine::fall::FallSimulator;
use crate::engine::scoring::{POINTS_PER_WORD, ScoreTracker};
use crate::session::result::SessionSummary;
use crate::session::word::{SetRef, WordPair};
use crate::store::progress::ProgressStore;
use crate::store::schema::ProgressRecord;

pub const CORRECT_DELAY: Duration = Duration::from_millis(500);
pub const WRONG_DELAY: Duration = Duration::from_millis(1000);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    Correct,
    Wrong,
    GameOver,
}

impl GameStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            GameStatus::Playing => "playing",
            GameStatus::Correct => "correct",
            GameStatus::Wrong => "wrong",
            GameStatus::GameOver => "game_over",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeferredAction {
    /// Back to `Playing` on the same word after a wrong answer.
    Resume,
    /// Move on after a correct answer or a timeout.
    Advance,
}

/// Handle for a delayed transition. Only the most recently issued token is
/// honoured; anything else resolves as stale.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeferredToken {
    pub generation: u64,
    pub word_index: usize,
    pub action: DeferredAction,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Deferred {
    pub token: DeferredToken,
    pub delay: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input, or input arrived while not `Playing`.
    Ignored,
    Correct(Deferred),
    Incorrect(Deferred),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Idle,
    Falling,
    GroundReached(Deferred),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Resolution {
    Stale,
    Resumed,
    Advanced(usize),
    Finished(SessionSummary),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionRules {
    pub fall: FallSimulator,
    pub correct_delay: Duration,
    pub wrong_delay: Duration,
    pub points_per_word: u32,
}

impl Default for SessionRules {
    fn default() -> Self {
        Self {
            fall: FallSimulator::default(),
            correct_delay: CORRECT_DELAY,
            wrong_delay: WRONG_DELAY,
            points_per_word: POINTS_PER_WORD,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub cleared: usize,
    pub wrong_attempts: usize,
    pub timeouts: usize,
}

pub struct GameSession {
    set: SetRef,
    words: Vec<WordPair>,
    rules: SessionRules,
    current_index: usize,
    score: ScoreTracker,
    status: GameStatus,
    fall_position: f64,
    ground_reported: bool,
    input: String,
    generation: u64,
    awaiting: Option<DeferredToken>,
    stats: SessionStats,
    started_at: Instant,
    finished_at: Option<Instant>,
    progress_saved: bool,
}

impl GameSession {
    /// Returns `None` for an empty word list: there is no partial session.
    pub fn new(set: SetRef, words: Vec<WordPair>, rules: SessionRules) -> Option<Self> {
        if words.is_empty() {
            return None;
        }
        info!(
            category = %set.category_id,
            set = %set.set_name,
            words = words.len(),
            "session started"
        );
        let score = ScoreTracker::new(words.len(), rules.points_per_word);
        Some(Self {
            set,
            words,
            rules,
            current_index: 0,
            score,
            status: GameStatus::Playing,
            fall_position: 0.0,
            ground_reported: false,
            input: String::new(),
            generation: 0,
            awaiting: None,
            stats: SessionStats::default(),
            started_at: Instant::now(),
            finished_at: None,
            progress_saved: false,
        })
    }

    pub fn set(&self) -> &SetRef {
        &self.set
    }

    pub fn words(&self) -> &[WordPair] {
        &self.words
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn rules(&self) -> &SessionRules {
        &self.rules
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status == GameStatus::GameOver
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The active word; `None` once the session is over.
    pub fn current_word(&self) -> Option<&WordPair> {
        if self.is_over() {
            None
        } else {
            self.words.get(self.current_index)
        }
    }

    pub fn score(&self) -> u32 {
        self.score.total()
    }

    pub fn max_score(&self) -> u32 {
        self.score.max_score()
    }

    pub fn fall_position(&self) -> f64 {
        self.fall_position
    }

    pub fn fall_progress(&self) -> f64 {
        self.rules.fall.progress(self.fall_position)
    }

    pub fn ground_reported(&self) -> bool {
        self.ground_reported
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn accepts_input(&self) -> bool {
        self.status == GameStatus::Playing
    }

    /// Mutable answer buffer, only while the learner may type.
    pub fn input_mut(&mut self) -> Option<&mut String> {
        if self.accepts_input() {
            Some(&mut self.input)
        } else {
            None
        }
    }

    pub fn awaiting(&self) -> Option<DeferredToken> {
        self.awaiting
    }

    pub fn elapsed_secs(&self) -> f64 {
        match self.finished_at {
            Some(end) => end.duration_since(self.started_at).as_secs_f64(),
            None => self.started_at.elapsed().as_secs_f64(),
        }
    }

    /// Submit whatever is in the answer buffer.
    pub fn submit(&mut self) -> SubmitOutcome {
        let answer = self.input.clone();
        self.submit_answer(&answer)
    }

    pub fn submit_answer(&mut self, answer: &str) -> SubmitOutcome {
        if self.status != GameStatus::Playing {
            return SubmitOutcome::Ignored;
        }
        let expected = &self.words[self.current_index].target;
        match answer::evaluate(answer, expected) {
            Verdict::Blank => SubmitOutcome::Ignored,
            Verdict::Correct => {
                let total = self.score.add_correct();
                self.stats.cleared += 1;
                self.status = GameStatus::Correct;
                debug!(index = self.current_index, score = total, "correct answer");
                SubmitOutcome::Correct(self.defer(DeferredAction::Advance, self.rules.correct_delay))
            }
            Verdict::Incorrect => {
                self.stats.wrong_attempts += 1;
                self.status = GameStatus::Wrong;
                debug!(index = self.current_index, "wrong answer");
                SubmitOutcome::Incorrect(self.defer(DeferredAction::Resume, self.rules.wrong_delay))
            }
        }
    }

    /// One fall step. The word only moves while `Playing`; the ground event
    /// is reported once per word.
    pub fn tick(&mut self) -> TickOutcome {
        if self.status != GameStatus::Playing || self.ground_reported {
            return TickOutcome::Idle;
        }
        self.fall_position = self.rules.fall.advance(self.fall_position);
        if !self.rules.fall.has_reached_ground(self.fall_position) {
            return TickOutcome::Falling;
        }

        self.ground_reported = true;
        self.stats.timeouts += 1;
        self.status = GameStatus::Wrong;
        debug!(index = self.current_index, "word reached the ground");
        TickOutcome::GroundReached(self.defer(DeferredAction::Advance, self.rules.wrong_delay))
    }

    /// Apply a delayed transition. Tokens from a superseded word, an earlier
    /// transition or a previous restart cycle are ignored.
    pub fn resolve(&mut self, token: DeferredToken) -> Resolution {
        if self.awaiting != Some(token) || token.word_index != self.current_index {
            debug!(?token, "ignoring stale deferred transition");
            return Resolution::Stale;
        }
        self.awaiting = None;

        match token.action {
            DeferredAction::Resume => {
                self.input.clear();
                self.status = GameStatus::Playing;
                Resolution::Resumed
            }
            DeferredAction::Advance => self.advance(),
        }
    }

    /// Start over with the same words in the same order. Only valid once
    /// the session is over.
    pub fn restart(&mut self) -> bool {
        if !self.is_over() {
            return false;
        }
        self.generation += 1;
        self.awaiting = None;
        self.current_index = 0;
        self.score.reset();
        self.status = GameStatus::Playing;
        self.fall_position = 0.0;
        self.ground_reported = false;
        self.input.clear();
        self.stats = SessionStats::default();
        self.started_at = Instant::now();
        self.finished_at = None;
        self.progress_saved = false;
        info!(set = %self.set.set_name, "session restarted");
        true
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            score: self.score.total(),
            max_score: self.score.max_score(),
            word_count: self.words.len(),
            cleared: self.stats.cleared,
            wrong_attempts: self.stats.wrong_attempts,
            timeouts: self.stats.timeouts,
            elapsed_secs: self.elapsed_secs(),
        }
    }

    /// Record the finished session. Writes at most once per restart cycle;
    /// later calls return `Ok(None)`. A failed write can be retried.
    pub fn persist_progress(
        &mut self,
        store: &mut dyn ProgressStore,
        played_at: DateTime<Utc>,
    ) -> Result<Option<ProgressRecord>> {
        if !self.is_over() || self.progress_saved {
            return Ok(None);
        }
        let candidate = self.summary().to_progress_record(&self.set, played_at);
        let stored = store.upsert(candidate)?;
        self.progress_saved = true;
        info!(
            key = %stored.key(),
            score = self.score.total(),
            best = stored.score,
            "progress saved"
        );
        Ok(Some(stored))
    }

    fn defer(&mut self, action: DeferredAction, delay: Duration) -> Deferred {
        self.generation += 1;
        let token = DeferredToken {
            generation: self.generation,
            word_index: self.current_index,
            action,
        };
        self.awaiting = Some(token);
        Deferred { token, delay }
    }

    fn advance(&mut self) -> Resolution {
        if self.current_index + 1 >= self.words.len() {
            self.status = GameStatus::GameOver;
            self.finished_at = Some(Instant::now());
            self.generation += 1;
            let summary = self.summary();
            info!(score = summary.score, max = summary.max_score, "session complete");
            return Resolution::Finished(summary);
        }

        self.current_index += 1;
        self.generation += 1;
        self.fall_position = 0.0;
        self.ground_reported = false;
        self.input.clear();
        self.status = GameStatus::Playing;
        Resolution::Advanced(self.current_index)
    }
}
