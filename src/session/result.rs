use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::word::SetRef;
use crate::store::schema::ProgressRecord;

/// End-of-session figures shown on the game-over screen.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub score: u32,
    pub max_score: u32,
    pub word_count: usize,
    pub cleared: usize,
    pub wrong_attempts: usize,
    pub timeouts: usize,
    pub elapsed_secs: f64,
}

impl SessionSummary {
    pub fn accuracy(&self) -> f64 {
        if self.word_count == 0 {
            return 0.0;
        }
        (self.cleared as f64 / self.word_count as f64 * 100.0).clamp(0.0, 100.0)
    }

    pub fn is_perfect(&self) -> bool {
        self.word_count > 0 && self.cleared == self.word_count && self.wrong_attempts == 0
    }

    pub fn to_progress_record(&self, set: &SetRef, played_at: DateTime<Utc>) -> ProgressRecord {
        ProgressRecord {
            category_id: set.category_id.clone(),
            set_name: set.set_name.clone(),
            score: self.score,
            completed: true,
            last_played_at: played_at,
        }
    }
}
