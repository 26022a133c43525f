use std::time::Duration;

use crate::constants::REFERENCE_FRAME_RATE;

/// Monotonic animation time, in reference frames.
///
/// One unit is one display refresh at [`REFERENCE_FRAME_RATE`], so effects
/// tuned per frame keep the same speed on faster or slower displays.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnimationClock {
    elapsed: f64,
}

impl AnimationClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulates `delta` and returns the new elapsed time.
    pub fn advance(&mut self, delta: Duration) -> f64 {
        self.elapsed += delta.as_secs_f64() * REFERENCE_FRAME_RATE;
        self.elapsed
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_starts_at_zero() {
        assert_eq!(AnimationClock::new().elapsed(), 0.0);
    }

    #[test]
    fn test_clock_counts_reference_frames() {
        let mut clock = AnimationClock::new();
        clock.advance(Duration::from_secs(1));
        assert!((clock.elapsed() - 60.0).abs() < 1e-3);
    }

    #[test]
    fn test_clock_is_monotonic() {
        let mut clock = AnimationClock::new();
        let mut last = clock.elapsed();
        for ms in [16, 0, 33, 7] {
            let now = clock.advance(Duration::from_millis(ms));
            assert!(now >= last);
            last = now;
        }
    }

    #[test]
    fn test_clock_keeps_advancing_after_days() {
        let mut clock = AnimationClock::new();
        clock.advance(Duration::from_secs(78 * 3600));
        let before = clock.elapsed();
        for _ in 0..60 {
            clock.advance(Duration::from_millis(16));
        }
        assert!((clock.elapsed() - before - 57.6).abs() < 1e-6);
    }

    #[test]
    fn test_step_size_holds_after_hours() {
        let mut clock = AnimationClock::new();
        clock.advance(Duration::from_secs(5 * 3600));
        let before = clock.elapsed();
        let after = clock.advance(Duration::from_millis(16));
        assert!((after - before - 0.96).abs() < 1e-6);
    }
}
