pub const DEFAULT_FALL_STEP: f64 = 0.2;
pub const DEFAULT_GROUND: f64 = 72.0;

/// Pure descent model for the active word. Positions run from 0 (top) to
/// `ground` (bottom); the caller owns tick scheduling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FallSimulator {
    step: f64,
    ground: f64,
}

impl Default for FallSimulator {
    fn default() -> Self {
        Self::new(DEFAULT_FALL_STEP, DEFAULT_GROUND)
    }
}

impl FallSimulator {
    pub fn new(step: f64, ground: f64) -> Self {
        let step = if step.is_finite() && step > 0.0 {
            step
        } else {
            DEFAULT_FALL_STEP
        };
        let ground = if ground.is_finite() && ground > 0.0 {
            ground
        } else {
            DEFAULT_GROUND
        };
        Self { step, ground }
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn ground(&self) -> f64 {
        self.ground
    }

    pub fn advance(&self, position: f64) -> f64 {
        (position.max(0.0) + self.step).min(self.ground)
    }

    pub fn has_reached_ground(&self, position: f64) -> bool {
        position >= self.ground
    }

    /// Position after `ticks` ticks starting from the top.
    pub fn position_after(&self, ticks: u32) -> f64 {
        (ticks as f64 * self.step).min(self.ground)
    }

    /// Number of ticks a word needs to fall from the top to the ground.
    pub fn ticks_to_ground(&self) -> u32 {
        (self.ground / self.step).ceil() as u32
    }

    /// Fraction of the fall completed, in `[0, 1]`.
    pub fn progress(&self, position: f64) -> f64 {
        (position / self.ground).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_adds_one_step() {
        let fall = FallSimulator::default();
        assert!((fall.advance(0.0) - 0.2).abs() < 1e-9);
        assert!((fall.advance(10.0) - 10.2).abs() < 1e-9);
    }

    #[test]
    fn test_advance_clamps_at_ground() {
        let fall = FallSimulator::default();
        assert_eq!(fall.advance(71.9), 72.0);
        assert_eq!(fall.advance(72.0), 72.0);
        assert_eq!(fall.advance(500.0), 72.0);
    }

    #[test]
    fn test_ground_detection() {
        let fall = FallSimulator::default();
        assert!(!fall.has_reached_ground(0.0));
        assert!(!fall.has_reached_ground(71.99));
        assert!(fall.has_reached_ground(72.0));
    }

    #[test]
    fn test_repeated_advance_reaches_ground() {
        let fall = FallSimulator::default();
        let mut pos = 0.0;
        let mut ticks = 0;
        while !fall.has_reached_ground(pos) {
            pos = fall.advance(pos);
            ticks += 1;
            assert!(ticks <= fall.ticks_to_ground() + 1, "never reached ground");
        }
        assert_eq!(pos, 72.0);
    }

    #[test]
    fn test_position_after_ticks() {
        let fall = FallSimulator::default();
        assert_eq!(fall.position_after(0), 0.0);
        assert!((fall.position_after(5) - 1.0).abs() < 1e-9);
        assert_eq!(fall.position_after(10_000), 72.0);
        assert_eq!(fall.ticks_to_ground(), 360);
    }

    #[test]
    fn test_invalid_parameters_fall_back_to_defaults() {
        let fall = FallSimulator::new(0.0, -3.0);
        assert_eq!(fall.step(), DEFAULT_FALL_STEP);
        assert_eq!(fall.ground(), DEFAULT_GROUND);
    }

    #[test]
    fn test_progress_ratio() {
        let fall = FallSimulator::new(1.0, 50.0);
        assert_eq!(fall.progress(0.0), 0.0);
        assert_eq!(fall.progress(25.0), 0.5);
        assert_eq!(fall.progress(80.0), 1.0);
    }
}
