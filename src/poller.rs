// Background dish poller: connect, fetch status + new history, feed the collector.
// Failures drop the link and are retried on the next tick; nothing here ends the process.

use crate::collector::Collector;
use crate::dish::{DishConnector, DishError, DishSession};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::time::{Duration, sleep};

/// Connector, collector and shutdown for the poller task.
pub struct PollerDeps<C: DishConnector> {
    pub connector: C,
    pub collector: Arc<Collector>,
    pub shutdown_rx: oneshot::Receiver<()>,
}

pub struct PollerConfig {
    pub poll_interval: Duration,
}

enum Link<S> {
    Disconnected,
    Connected(S),
}

/// One dish, one link. `poll_once` runs a single cycle; `spawn` drives it on an interval.
pub struct Poller<C: DishConnector> {
    connector: C,
    collector: Arc<Collector>,
    link: Link<C::Session>,
    /// Dish counter through which history has been consumed. Kept across reconnects.
    last_history_counter: Option<u64>,
}

impl<C: DishConnector> Poller<C> {
    pub fn new(connector: C, collector: Arc<Collector>) -> Self {
        Self {
            connector,
            collector,
            link: Link::Disconnected,
            last_history_counter: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.link, Link::Connected(_))
    }

    pub fn last_history_counter(&self) -> Option<u64> {
        self.last_history_counter
    }

    /// One cycle. Connects first if disconnected, then fetches on the same link.
    pub async fn poll_once(&mut self) {
        let mut session = match std::mem::replace(&mut self.link, Link::Disconnected) {
            Link::Connected(session) => session,
            Link::Disconnected => {
                tracing::info!(dish = %self.connector.target(), "Connecting to Starlink dish...");
                match self.connector.connect().await {
                    Ok(session) => session,
                    Err(e) => {
                        tracing::error!(error = %e, operation = "connect", "Error in monitoring loop");
                        self.collector.increment_errors();
                        return;
                    }
                }
            }
        };

        match self.fetch(&mut session).await {
            Ok(()) => self.link = Link::Connected(session),
            Err(e) => {
                tracing::error!(error = %e, operation = "fetch", "Error in monitoring loop");
                self.collector.increment_errors();
                session.close().await;
            }
        }
    }

    /// Closes the link if one is open.
    pub async fn close(&mut self) {
        if let Link::Connected(session) = std::mem::replace(&mut self.link, Link::Disconnected) {
            session.close().await;
        }
    }

    async fn fetch(&mut self, session: &mut C::Session) -> Result<(), DishError> {
        let status = session.fetch_status().await?;
        let current_drop_rate = status
            .pop_ping_drop_rate
            .ok_or_else(|| DishError::Protocol("status is missing pop_ping_drop_rate".into()))?;

        let batch = session
            .fetch_history_since(self.last_history_counter)
            .await?;
        if let Some(previous) = self.last_history_counter {
            if batch.end_counter < previous {
                tracing::warn!(
                    previous_counter = previous,
                    dish_counter = batch.end_counter,
                    "History counter went backwards (dish reset?); resyncing"
                );
                self.collector.increment_errors();
            } else {
                let skipped = (batch.end_counter - previous)
                    .saturating_sub(batch.samples.len() as u64);
                if skipped > 0 {
                    tracing::warn!(
                        previous_counter = previous,
                        dish_counter = batch.end_counter,
                        skipped_samples = skipped,
                        "History gap is longer than the dish ring; samples skipped"
                    );
                }
            }
        }
        self.last_history_counter = Some(batch.end_counter);

        self.collector
            .update(current_drop_rate, &batch.samples, Some(&status));

        tracing::debug!(
            current_drop_pct = current_drop_rate * 100.0,
            latency_ms = status.pop_ping_latency_ms.unwrap_or(0.0),
            down_mbps = status.downlink_throughput_bps.unwrap_or(0.0) / 1e6,
            up_mbps = status.uplink_throughput_bps.unwrap_or(0.0) / 1e6,
            gps_sats = status.gps_sats.unwrap_or(0),
            new_samples = batch.samples.len(),
            "Updated metrics"
        );
        Ok(())
    }
}

/// Spawns the poll loop. The first cycle runs immediately; shutdown interrupts both the
/// wait and an in-flight cycle, then closes the link.
pub fn spawn<C: DishConnector>(
    deps: PollerDeps<C>,
    config: PollerConfig,
) -> tokio::task::JoinHandle<()> {
    let PollerDeps {
        connector,
        collector,
        mut shutdown_rx,
    } = deps;
    let PollerConfig { poll_interval } = config;

    tokio::spawn(async move {
        let mut poller = Poller::new(connector, collector);
        tracing::info!(
            dish = %poller.connector.target(),
            poll_interval_secs = poll_interval.as_secs_f64(),
            alert_threshold_pct = poller.collector.alert_threshold() * 100.0,
            "Starting monitoring loop"
        );

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => break,
                _ = poller.poll_once() => {}
            }
            // A full interval after every cycle, however long the cycle took.
            tokio::select! {
                _ = &mut shutdown_rx => break,
                _ = sleep(poll_interval) => {}
            }
        }

        tracing::info!("Shutting down monitoring loop");
        poller.close().await;
    })
}
