// Shared test helpers: scripted in-memory dish, log capture

#![allow(dead_code)]

use starlink_pingmon::dish::history::samples_since;
use starlink_pingmon::dish::{DishConnector, DishError, DishSession};
use starlink_pingmon::models::{HistoryBatch, StatusFields};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

pub const RING_LEN: usize = 16;

/// What the fake dish reports, plus counters the tests assert on.
pub struct DishScript {
    pub status: StatusFields,
    pub ring: Vec<f32>,
    pub current: u64,
    pub connect_failures: usize,
    pub status_failures: usize,
    pub connects: usize,
    pub closes: usize,
    pub history_requests: Vec<Option<u64>>,
}

impl Default for DishScript {
    fn default() -> Self {
        Self {
            status: StatusFields {
                pop_ping_drop_rate: Some(0.0),
                ..Default::default()
            },
            ring: vec![0.0; RING_LEN],
            current: 0,
            connect_failures: 0,
            status_failures: 0,
            connects: 0,
            closes: 0,
            history_requests: Vec::new(),
        }
    }
}

impl DishScript {
    /// Records one per-second sample, overwriting the oldest once the ring wraps.
    pub fn push_sample(&mut self, rate: f32) {
        let idx = (self.current % self.ring.len() as u64) as usize;
        self.ring[idx] = rate;
        self.current += 1;
    }

    /// Sets the instantaneous drop rate and records it as this second's sample.
    pub fn tick(&mut self, rate: f32) {
        self.status.pop_ping_drop_rate = Some(f64::from(rate));
        self.push_sample(rate);
    }

    /// Simulates a dish reboot: counter restarts at zero, ring is cleared.
    pub fn reboot(&mut self) {
        self.current = 0;
        self.ring = vec![0.0; self.ring.len()];
    }
}

#[derive(Clone, Default)]
pub struct FakeDish {
    pub script: Arc<Mutex<DishScript>>,
}

impl FakeDish {
    pub fn script(&self) -> std::sync::MutexGuard<'_, DishScript> {
        self.script.lock().unwrap()
    }
}

pub struct FakeSession {
    script: Arc<Mutex<DishScript>>,
}

impl DishConnector for FakeDish {
    type Session = FakeSession;

    fn target(&self) -> &str {
        "fake-dish:9200"
    }

    async fn connect(&self) -> Result<FakeSession, DishError> {
        let mut script = self.script.lock().unwrap();
        if script.connect_failures > 0 {
            script.connect_failures -= 1;
            return Err(DishError::Connection("connection refused".into()));
        }
        script.connects += 1;
        Ok(FakeSession {
            script: self.script.clone(),
        })
    }
}

impl DishSession for FakeSession {
    async fn fetch_status(&mut self) -> Result<StatusFields, DishError> {
        let mut script = self.script.lock().unwrap();
        if script.status_failures > 0 {
            script.status_failures -= 1;
            return Err(DishError::Connection("deadline exceeded".into()));
        }
        Ok(script.status.clone())
    }

    async fn fetch_history_since(&mut self, since: Option<u64>) -> Result<HistoryBatch, DishError> {
        let mut script = self.script.lock().unwrap();
        script.history_requests.push(since);
        Ok(HistoryBatch {
            end_counter: script.current,
            samples: samples_since(&script.ring, script.current, since),
        })
    }

    async fn close(self) {
        self.script.lock().unwrap().closes += 1;
    }
}

/// A dish that takes `delay` to refuse every connection. Records when each attempt
/// started and ended.
#[derive(Clone)]
pub struct SlowFailingDish {
    pub delay: Duration,
    pub attempts: Arc<Mutex<Vec<(Instant, Instant)>>>,
}

impl SlowFailingDish {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            attempts: Arc::default(),
        }
    }

    /// Idle time between the end of one attempt and the start of the next.
    pub fn idle_gaps(&self) -> Vec<Duration> {
        let attempts = self.attempts.lock().unwrap();
        attempts
            .windows(2)
            .map(|w| w[1].0.duration_since(w[0].1))
            .collect()
    }
}

impl DishConnector for SlowFailingDish {
    type Session = FakeSession;

    fn target(&self) -> &str {
        "slow-dish:9200"
    }

    async fn connect(&self) -> Result<FakeSession, DishError> {
        let started = Instant::now();
        tokio::time::sleep(self.delay).await;
        self.attempts
            .lock()
            .unwrap()
            .push((started, Instant::now()));
        Err(DishError::Connection("connect timed out".into()))
    }
}

/// Collects formatted log output for assertions.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    pub fn count(&self, needle: &str) -> usize {
        self.contents().lines().filter(|l| l.contains(needle)).count()
    }
}

impl std::io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Installs a thread-local subscriber writing WARN and above into the returned capture.
pub fn capture_warnings() -> (LogCapture, tracing::subscriber::DefaultGuard) {
    let capture = LogCapture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(capture.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (capture, guard)
}
