use std::time::Instant;

/// Delta assumed for the very first frame, before there is a previous tick
pub const FIRST_FRAME_DELTA: f32 = 0.016;

/// Upper bound on a single step, so a stall (minimised window, debugger)
/// does not fling the damped controls across the scene
pub const MAX_FRAME_DELTA: f32 = 0.1;

/// Render-loop clock - yields capped delta time per frame
#[derive(Debug, Default)]
pub struct FrameClock {
    last_tick: Option<Instant>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self { last_tick: None }
    }

    /// Get delta time since last tick and advance clock
    /// Returns delta in seconds
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// Same as [`tick`](Self::tick) with an explicit timestamp
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let delta = match self.last_tick {
            Some(last) => frame_delta(now.saturating_duration_since(last).as_secs_f32()),
            None => FIRST_FRAME_DELTA,
        };
        self.last_tick = Some(now);
        delta
    }

    /// Forget the previous tick; the next one is treated as a first frame
    pub fn reset(&mut self) {
        self.last_tick = None;
    }
}

/// Clamp a raw elapsed time to the largest step the loop will simulate
pub fn frame_delta(elapsed: f32) -> f32 {
    elapsed.min(MAX_FRAME_DELTA)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn first_tick_uses_nominal_delta() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick(), FIRST_FRAME_DELTA);
    }

    #[test]
    fn clock_measures_delta() {
        let mut clock = FrameClock::new();
        let start = Instant::now();
        clock.tick_at(start);

        let delta = clock.tick_at(start + Duration::from_millis(20));
        assert!((delta - 0.02).abs() < 1e-4);
    }

    #[test]
    fn clock_caps_stalls() {
        let mut clock = FrameClock::new();
        let start = Instant::now();
        clock.tick_at(start);

        let delta = clock.tick_at(start + Duration::from_secs(5));
        assert_eq!(delta, MAX_FRAME_DELTA);
    }

    #[test]
    fn clock_resets() {
        let mut clock = FrameClock::new();
        let start = Instant::now();
        clock.tick_at(start);
        clock.reset();

        assert_eq!(clock.tick_at(start + Duration::from_secs(1)), FIRST_FRAME_DELTA);
    }
}
