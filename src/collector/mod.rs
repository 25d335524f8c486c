// Aggregation core: running drop statistics shared by the poller and the HTTP handlers.
// All state sits behind one mutex; no I/O happens while it is held.

mod exposition;

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant, SystemTime};

use crate::models::{DishGauges, StatusFields};

/// Everything the collector derives from the dish, plus the process-lifetime counters.
#[derive(Debug, Clone)]
pub struct AggregateState {
    /// Most recent instantaneous drop rate.
    pub current_drop_rate: f64,
    /// Highest `current_drop_rate` seen since start; never decreases.
    pub peak_drop_rate: f64,
    /// One second per history sample with a non-zero drop rate.
    pub total_drop_seconds: f64,
    pub total_samples: u64,
    /// Transitions from "not dropping" to "dropping" across the whole sample stream.
    pub drop_events: u64,
    /// Drop state of the last history sample, carried across updates.
    pub last_dropping: bool,
    /// Wall-clock time of the last update (exposed as a unix timestamp).
    pub last_update: SystemTime,
    /// Monotonic time of the last update (used for freshness).
    pub last_update_instant: Instant,
    pub gauges: DishGauges,
    pub errors_total: u64,
    pub scrapes_total: u64,
}

impl AggregateState {
    fn new() -> Self {
        Self {
            current_drop_rate: 0.0,
            peak_drop_rate: 0.0,
            total_drop_seconds: 0.0,
            total_samples: 0,
            drop_events: 0,
            last_dropping: false,
            last_update: SystemTime::now(),
            last_update_instant: Instant::now(),
            gauges: DishGauges::default(),
            errors_total: 0,
            scrapes_total: 0,
        }
    }

    fn record_sample(&mut self, rate: f64) {
        self.total_samples += 1;
        let dropping = rate > 0.0;
        if dropping {
            self.total_drop_seconds += 1.0;
            if !self.last_dropping {
                self.drop_events += 1;
            }
        }
        self.last_dropping = dropping;
    }
}

/// Shared aggregate. Construct once in `main` and hand out via `Arc`.
pub struct Collector {
    state: Mutex<AggregateState>,
    alert_threshold: f64,
    started_at: Instant,
}

impl Collector {
    pub fn new(alert_threshold: f64) -> Self {
        Self {
            state: Mutex::new(AggregateState::new()),
            alert_threshold,
            started_at: Instant::now(),
        }
    }

    pub fn alert_threshold(&self) -> f64 {
        self.alert_threshold
    }

    /// Fold one poll cycle into the aggregate. `history` must be oldest-first.
    /// Gauges are only touched when `status` is present.
    pub fn update(&self, current_rate: f64, history: &[f64], status: Option<&StatusFields>) {
        let gauges = status.map(DishGauges::from_status);
        {
            let mut state = self.lock();
            state.current_drop_rate = current_rate;
            if current_rate > state.peak_drop_rate {
                state.peak_drop_rate = current_rate;
            }
            for &rate in history {
                state.record_sample(rate);
            }
            if let Some(gauges) = gauges {
                state.gauges = gauges;
            }
            let now = SystemTime::now();
            if now > state.last_update {
                state.last_update = now;
            }
            state.last_update_instant = Instant::now();
        }

        if current_rate > self.alert_threshold {
            tracing::warn!(
                drop_rate = current_rate,
                threshold = self.alert_threshold,
                "ALERT: High ping drop detected: {:.2}% (threshold: {:.1}%)",
                current_rate * 100.0,
                self.alert_threshold * 100.0
            );
        }
    }

    pub fn increment_errors(&self) {
        self.lock().errors_total += 1;
    }

    pub fn increment_scrapes(&self) {
        self.lock().scrapes_total += 1;
    }

    /// True if an update landed less than `max_age` ago.
    pub fn is_fresh(&self, max_age: Duration) -> bool {
        self.lock().last_update_instant.elapsed() < max_age
    }

    /// Consistent copy of the current aggregate.
    pub fn snapshot(&self) -> AggregateState {
        self.lock().clone()
    }

    /// Prometheus text exposition of the current aggregate.
    pub fn render(&self) -> String {
        let state = self.lock();
        exposition::render(&state, self.started_at.elapsed())
    }

    fn lock(&self) -> MutexGuard<'_, AggregateState> {
        // Nothing panics mid-mutation, so a poisoned guard still holds a consistent state.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
