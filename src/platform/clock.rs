//! Frame timing for the render loop

use crate::consts::{FIRST_FRAME_DT, MAX_FRAME_DT};

/// Turns frame timestamps (ms) into simulation steps (s)
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Step since the previous tick, clamped to `[0, MAX_FRAME_DT]`.
    /// The first tick yields `FIRST_FRAME_DT`.
    pub fn tick(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_ms {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => FIRST_FRAME_DT,
        };
        self.last_ms = Some(now_ms);
        if dt.is_finite() {
            dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        }
    }

    /// Forget the previous timestamp (next tick counts as the first)
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tick_uses_nominal_step() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick(1234.0), FIRST_FRAME_DT);
    }

    #[test]
    fn test_hitch_is_clamped() {
        let mut clock = FrameClock::new();
        clock.tick(0.0);
        assert!((clock.tick(16.0) - 0.016).abs() < 1e-6);
        assert_eq!(clock.tick(2016.0), MAX_FRAME_DT);
    }

    #[test]
    fn test_time_going_backwards_gives_zero() {
        let mut clock = FrameClock::new();
        clock.tick(500.0);
        assert_eq!(clock.tick(400.0), 0.0);
        assert_eq!(clock.tick(f64::NAN), 0.0);
    }

    #[test]
    fn test_reset_restarts() {
        let mut clock = FrameClock::new();
        clock.tick(0.0);
        clock.reset();
        assert_eq!(clock.tick(10_000.0), FIRST_FRAME_DT);
    }
}
