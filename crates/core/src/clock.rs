//! Frame clock turning host timestamps into per-frame `dt`.

/// Tracks the previous frame timestamp.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the previous tick.
    ///
    /// The first tick yields 0. A timestamp that is not finite or does not
    /// move forward also yields 0; a non-finite one is not recorded.
    pub fn tick(&mut self, timestamp: f64) -> f64 {
        if !timestamp.is_finite() {
            return 0.0;
        }
        let dt = match self.last {
            Some(last) if timestamp > last => timestamp - last,
            Some(last) if timestamp < last => {
                log::debug!("frame clock went backwards ({last} -> {timestamp})");
                0.0
            }
            _ => 0.0,
        };
        self.last = Some(timestamp);
        dt
    }

    /// Forgets the previous timestamp; the next tick yields 0.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_is_zero() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick(12.5), 0.0);
    }

    #[test]
    fn later_ticks_measure_elapsed_seconds() {
        let mut clock = FrameClock::new();
        clock.tick(1.0);
        assert_eq!(clock.tick(1.5), 0.5);
        assert_eq!(clock.tick(3.5), 2.0);
    }

    #[test]
    fn non_monotonic_timestamps_yield_zero_and_resync() {
        let mut clock = FrameClock::new();
        clock.tick(5.0);
        assert_eq!(clock.tick(4.0), 0.0);
        assert_eq!(clock.tick(4.0), 0.0);
        assert_eq!(clock.tick(4.25), 0.25);
    }

    #[test]
    fn non_finite_timestamps_are_ignored() {
        let mut clock = FrameClock::new();
        clock.tick(1.0);
        assert_eq!(clock.tick(f64::NAN), 0.0);
        assert_eq!(clock.tick(2.0), 1.0);
    }

    #[test]
    fn reset_restarts_the_clock() {
        let mut clock = FrameClock::new();
        clock.tick(1.0);
        clock.reset();
        assert_eq!(clock.tick(9.0), 0.0);
    }
}
