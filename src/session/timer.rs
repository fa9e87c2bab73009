//! # Timer EMA
//!
//! An exponential moving average of durations, used to track how much time
//! block update handling costs per tick.

use std::time::Duration;

use log::trace;

/// Smoothing window used by `ScanSession` for block update timing.
pub const DEFAULT_PERIODS: u32 = 100;

/// Exponential moving average of a duration.
///
/// The first sample seeds the average; later samples are blended in with
/// weight `2 / (periods + 1)`.
#[derive(Clone, Debug)]
pub struct TimerEma {
    name: String,
    alpha: f64,
    average_nanos: f64,
    samples: u64,
}

impl TimerEma {
    /// Creates a timer averaging over roughly `periods` samples.
    pub fn new(name: impl Into<String>, periods: u32) -> Self {
        TimerEma {
            name: name.into(),
            alpha: 2.0 / (f64::from(periods.max(1)) + 1.0),
            average_nanos: 0.0,
            samples: 0,
        }
    }

    /// Label of the measured work.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Blends a new sample into the average.
    pub fn update(&mut self, elapsed: Duration) {
        let sample = elapsed.as_nanos() as f64;
        self.average_nanos = if self.samples == 0 {
            sample
        } else {
            self.average_nanos + self.alpha * (sample - self.average_nanos)
        };
        self.samples += 1;
        trace!("{}: {:?} (average {:?})", self.name, elapsed, self.average());
    }

    /// The current average.
    pub fn average(&self) -> Duration {
        Duration::from_nanos(self.average_nanos.round() as u64)
    }

    /// Number of samples seen.
    pub fn samples(&self) -> u64 {
        self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sample_seeds_average() {
        let mut timer = TimerEma::new("test", 10);
        assert_eq!(timer.average(), Duration::ZERO);
        timer.update(Duration::from_micros(500));
        assert_eq!(timer.average(), Duration::from_micros(500));
        assert_eq!(timer.samples(), 1);
    }

    #[test]
    fn average_moves_toward_new_samples() {
        let mut timer = TimerEma::new("test", 3);
        timer.update(Duration::from_nanos(1000));
        timer.update(Duration::from_nanos(3000));
        // alpha = 0.5
        assert_eq!(timer.average(), Duration::from_nanos(2000));

        for _ in 0..50 {
            timer.update(Duration::ZERO);
        }
        assert!(timer.average() < Duration::from_nanos(1));
    }
}
