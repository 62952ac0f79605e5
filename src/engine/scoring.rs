pub const POINTS_PER_WORD: u32 = 10;

/// Running score for one session. Correct answers earn a fixed reward;
/// wrong answers and timeouts cost nothing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreTracker {
    total: u32,
    reward: u32,
    word_count: usize,
}

impl ScoreTracker {
    pub fn new(word_count: usize, reward: u32) -> Self {
        Self {
            total: 0,
            reward,
            word_count,
        }
    }

    pub fn add_correct(&mut self) -> u32 {
        self.total = add_correct(self.total, self.reward);
        self.total
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn reward(&self) -> u32 {
        self.reward
    }

    pub fn max_score(&self) -> u32 {
        (self.word_count as u32).saturating_mul(self.reward)
    }

    pub fn ratio(&self) -> f64 {
        let max = self.max_score();
        if max == 0 {
            return 0.0;
        }
        self.total as f64 / max as f64
    }

    pub fn reset(&mut self) {
        self.total = 0;
    }
}

pub fn add_correct(score: u32, reward: u32) -> u32 {
    score.saturating_add(reward)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_correct_adds_reward() {
        let mut tracker = ScoreTracker::new(3, POINTS_PER_WORD);
        assert_eq!(tracker.add_correct(), 10);
        assert_eq!(tracker.add_correct(), 20);
        assert_eq!(tracker.total(), 20);
    }

    #[test]
    fn test_max_score_is_word_count_times_reward() {
        let tracker = ScoreTracker::new(7, POINTS_PER_WORD);
        assert_eq!(tracker.max_score(), 70);
    }

    #[test]
    fn test_reset_clears_total_only() {
        let mut tracker = ScoreTracker::new(2, POINTS_PER_WORD);
        tracker.add_correct();
        tracker.reset();
        assert_eq!(tracker.total(), 0);
        assert_eq!(tracker.max_score(), 20);
    }

    #[test]
    fn test_ratio() {
        let mut tracker = ScoreTracker::new(4, POINTS_PER_WORD);
        assert_eq!(tracker.ratio(), 0.0);
        tracker.add_correct();
        assert!((tracker.ratio() - 0.25).abs() < f64::EPSILON);
        assert_eq!(ScoreTracker::new(0, POINTS_PER_WORD).ratio(), 0.0);
    }
}
