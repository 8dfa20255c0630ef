//! Rolling computation fault monitor

use std::collections::VecDeque;

use parking_lot::Mutex;

/// Failure ratio over the last `window` computation outcomes.
pub struct FaultMonitor {
    outcomes: Mutex<VecDeque<bool>>,
    window: usize,
    min_samples: usize,
}

/// Point-in-time view of the monitor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaultSnapshot {
    pub samples: usize,
    pub failures: usize,
    /// `None` until `min_samples` outcomes were recorded.
    pub failure_rate: Option<f64>,
}

impl FaultMonitor {
    pub fn new(window: usize, min_samples: usize) -> Self {
        let window = window.max(1);
        Self {
            outcomes: Mutex::new(VecDeque::with_capacity(window)),
            window,
            min_samples: min_samples.min(window),
        }
    }

    pub fn record_success(&self) {
        self.record(true);
    }

    pub fn record_failure(&self) {
        self.record(false);
    }

    fn record(&self, ok: bool) {
        let mut outcomes = self.outcomes.lock();
        if outcomes.len() == self.window {
            outcomes.pop_front();
        }
        outcomes.push_back(ok);
    }

    pub fn snapshot(&self) -> FaultSnapshot {
        let outcomes = self.outcomes.lock();
        let samples = outcomes.len();
        let failures = outcomes.iter().filter(|ok| !**ok).count();
        let failure_rate = (samples > 0 && samples >= self.min_samples)
            .then(|| failures as f64 / samples as f64);
        FaultSnapshot {
            samples,
            failures,
            failure_rate,
        }
    }
}
