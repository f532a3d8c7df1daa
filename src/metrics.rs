// Pipeline metrics module
//
// Provides lightweight counters for monitoring the callback pipeline

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Callback pipeline metrics
///
/// Uses atomic operations so the worker thread and the game thread can both
/// record without locks. Shared as `Arc<PipelineMetrics>` between the
/// subsystem, its task manager and the worker thread, and logged on shutdown.
#[derive(Debug)]
pub struct PipelineMetrics {
    /// Raw callbacks fired by the SDK
    pub callbacks_received: AtomicU64,

    /// Callbacks dropped before becoming events (wrong game, no handler)
    pub callbacks_dropped: AtomicU64,

    /// Events pushed onto the outbound queue
    pub events_enqueued: AtomicU64,

    /// Events delivered on the game thread
    pub events_dispatched: AtomicU64,

    /// Worker poll iterations
    pub online_ticks: AtomicU64,

    /// Worker threads spawned
    pub workers_started: AtomicU64,

    /// Worker threads joined
    pub workers_joined: AtomicU64,

    start_time: Instant,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self {
            callbacks_received: AtomicU64::new(0),
            callbacks_dropped: AtomicU64::new(0),
            events_enqueued: AtomicU64::new(0),
            events_dispatched: AtomicU64::new(0),
            online_ticks: AtomicU64::new(0),
            workers_started: AtomicU64::new(0),
            workers_joined: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_callback_received(&self) {
        self.callbacks_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_callback_dropped(&self) {
        self.callbacks_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_event_enqueued(&self) {
        self.events_enqueued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_event_dispatched(&self) {
        self.events_dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_online_tick(&self) {
        self.online_ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_worker_started(&self) {
        self.workers_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_worker_joined(&self) {
        self.workers_joined.fetch_add(1, Ordering::Relaxed);
    }

    /// Worker threads currently alive (started but not yet joined)
    pub fn live_workers(&self) -> u64 {
        self.workers_started
            .load(Ordering::Relaxed)
            .saturating_sub(self.workers_joined.load(Ordering::Relaxed))
    }

    /// Events enqueued but not yet dispatched
    pub fn in_flight(&self) -> u64 {
        self.events_enqueued
            .load(Ordering::Relaxed)
            .saturating_sub(self.events_dispatched.load(Ordering::Relaxed))
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::info!("=== Pipeline Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Callbacks: {} received, {} dropped",
            self.callbacks_received.load(Ordering::Relaxed),
            self.callbacks_dropped.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Events: {} enqueued, {} dispatched, {} online ticks",
            self.events_enqueued.load(Ordering::Relaxed),
            self.events_dispatched.load(Ordering::Relaxed),
            self.online_ticks.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Worker threads: {} started, {} joined",
            self.workers_started.load(Ordering::Relaxed),
            self.workers_joined.load(Ordering::Relaxed)
        );
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_metrics_creation() {
        let metrics = PipelineMetrics::new();
        assert_eq!(metrics.callbacks_received.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.live_workers(), 0);
        assert_eq!(metrics.in_flight(), 0);
    }

    #[test]
    fn test_in_flight_events() {
        let metrics = PipelineMetrics::new();

        metrics.record_event_enqueued();
        metrics.record_event_enqueued();
        metrics.record_event_dispatched();

        assert_eq!(metrics.in_flight(), 1);
    }

    #[test]
    fn test_live_workers() {
        let metrics = PipelineMetrics::new();

        metrics.record_worker_started();
        assert_eq!(metrics.live_workers(), 1);

        metrics.record_worker_joined();
        assert_eq!(metrics.live_workers(), 0);
    }

    #[test]
    fn test_uptime() {
        let metrics = PipelineMetrics::new();
        thread::sleep(Duration::from_millis(10));
        assert!(metrics.uptime().as_millis() >= 10);
    }
}
