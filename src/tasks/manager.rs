// Async task manager
//
// Two halves joined by an unbounded channel:
// 1. CallbackPump runs on the worker thread, pumps the SDK and turns raw
//    callbacks into events
// 2. AsyncTaskManager stays on the game thread and drains the channel once
//    per frame, firing delegates in arrival order

use super::event::{AsyncEvent, AsyncEventTarget};
use super::handlers::CallbackRegistry;
use crate::error::OnlineError;
use crate::metrics::PipelineMetrics;
use crate::sdk::SteamSdk;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle, ThreadId};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

pub const WORKER_THREAD_NAME: &str = "steam-async-worker";

/// Worker-side half of the pipeline
///
/// Shared between the manager and its worker thread; everything it touches
/// is `Send + Sync`.
pub struct CallbackPump {
    sdk: Arc<dyn SteamSdk>,
    registry: CallbackRegistry,
    outbound: UnboundedSender<AsyncEvent>,
    metrics: Arc<PipelineMetrics>,
}

impl CallbackPump {
    /// Pump the SDK once and enqueue an event for every accepted callback
    ///
    /// Returns the number of events enqueued.
    pub fn online_tick(&self) -> usize {
        self.metrics.record_online_tick();

        let mut enqueued = 0;
        self.sdk.run_callbacks(&mut |raw| {
            self.metrics.record_callback_received();

            match self.registry.dispatch(self.sdk.as_ref(), raw) {
                Ok(event) => {
                    tracing::debug!("Enqueue {}", event.description());
                    if self.outbound.send(event).is_ok() {
                        self.metrics.record_event_enqueued();
                        enqueued += 1;
                    } else {
                        tracing::warn!("Outbound queue closed, event dropped");
                        self.metrics.record_callback_dropped();
                    }
                }
                Err(err @ OnlineError::WrongGame { .. }) => {
                    tracing::warn!("Dropping callback: {}", err);
                    self.metrics.record_callback_dropped();
                }
                Err(err) => {
                    tracing::debug!("Dropping callback: {}", err);
                    self.metrics.record_callback_dropped();
                }
            }
        });

        enqueued
    }
}

struct Worker {
    handle: JoinHandle<()>,
    shutdown: Arc<AtomicBool>,
}

/// Owns the worker thread and the outbound queue
///
/// Created by [`SteamSubsystem::initialize`](crate::SteamSubsystem::initialize),
/// dropped by its shutdown. Dropping the manager stops and joins the worker.
pub struct AsyncTaskManager {
    pump: Arc<CallbackPump>,
    inbound: UnboundedReceiver<AsyncEvent>,
    worker: Option<Worker>,
    metrics: Arc<PipelineMetrics>,
}

impl AsyncTaskManager {
    /// Manager with the default handlers registered and no worker running
    pub fn new(sdk: Arc<dyn SteamSdk>, metrics: Arc<PipelineMetrics>) -> Self {
        Self::with_registry(sdk, CallbackRegistry::with_default_handlers(), metrics)
    }

    pub fn with_registry(
        sdk: Arc<dyn SteamSdk>,
        registry: CallbackRegistry,
        metrics: Arc<PipelineMetrics>,
    ) -> Self {
        let (outbound, inbound) = mpsc::unbounded_channel();
        let pump = Arc::new(CallbackPump {
            sdk,
            registry,
            outbound,
            metrics: Arc::clone(&metrics),
        });

        Self {
            pump,
            inbound,
            worker: None,
            metrics,
        }
    }

    /// Spawn the worker thread polling the SDK every `poll_interval`
    ///
    /// No-op if the worker is already running.
    pub fn start(&mut self, poll_interval: Duration) -> io::Result<()> {
        if self.worker.is_some() {
            tracing::debug!("Worker thread already running");
            return Ok(());
        }

        let shutdown = Arc::new(AtomicBool::new(false));
        let stop = Arc::clone(&shutdown);
        let pump = Arc::clone(&self.pump);

        let handle = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || {
                tracing::debug!("Steam async worker thread started");
                while !stop.load(Ordering::Acquire) {
                    pump.online_tick();
                    thread::park_timeout(poll_interval);
                }
                tracing::debug!("Steam async worker thread terminated");
            })?;

        self.metrics.record_worker_started();
        self.worker = Some(Worker { handle, shutdown });
        Ok(())
    }

    /// Pump the SDK on the calling thread
    ///
    /// Ignored while the worker thread is running, so a callback is never
    /// raced by two pumps.
    pub fn online_tick(&self) -> usize {
        if self.worker.is_some() {
            tracing::trace!("online_tick ignored, worker thread owns the pump");
            return 0;
        }
        self.pump.online_tick()
    }

    /// Dispatch every event queued before this call, oldest first
    ///
    /// Events enqueued while draining wait for the next tick. Returns the
    /// number of events dispatched.
    pub fn game_tick(&mut self, target: &mut dyn AsyncEventTarget) -> usize {
        let available = self.inbound.len();
        let mut dispatched = 0;

        while dispatched < available {
            let Ok(event) = self.inbound.try_recv() else {
                break;
            };
            event.finalize();
            event.trigger_delegates(target);
            self.metrics.record_event_dispatched();
            dispatched += 1;
        }

        dispatched
    }

    /// Events waiting for the next `game_tick`
    pub fn pending(&self) -> usize {
        self.inbound.len()
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    pub fn worker_thread_id(&self) -> Option<ThreadId> {
        self.worker.as_ref().map(|worker| worker.handle.thread().id())
    }

    /// Stop the worker thread and wait for it to exit
    ///
    /// Queued events are kept; safe to call repeatedly.
    pub fn shutdown(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };

        worker.shutdown.store(true, Ordering::Release);
        worker.handle.thread().unpark();
        if worker.handle.join().is_err() {
            tracing::error!("Steam async worker thread panicked");
        }
        self.metrics.record_worker_joined();
    }
}

impl Drop for AsyncTaskManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AppId, ResultCode, SteamId, UserAchievementStored, UserStatsReceived, UserStatsStored,
        UserStatsUnloaded,
    };
    use crate::sdk::{RawCallback, SimulatedSteam};
    use std::time::Instant;

    #[derive(Default)]
    struct Recorder {
        seen: Vec<String>,
    }

    impl AsyncEventTarget for Recorder {
        fn on_user_stats_received(&mut self, r: UserStatsReceived) {
            self.seen.push(format!("received:{}", r.user));
        }
        fn on_user_stats_stored(&mut self, r: UserStatsStored) {
            self.seen.push(format!("stored:{}", r.success));
        }
        fn on_user_stats_unloaded(&mut self, r: UserStatsUnloaded) {
            self.seen.push(format!("unloaded:{}", r.user));
        }
        fn on_user_achievement_stored(&mut self, r: UserAchievementStored) {
            self.seen.push(format!("achievement:{}", r.achievement_name));
        }
    }

    fn setup() -> (Arc<SimulatedSteam>, AsyncTaskManager, Arc<PipelineMetrics>) {
        let sdk = Arc::new(SimulatedSteam::new(AppId(480), SteamId(1000)));
        assert!(sdk.init());
        let metrics = Arc::new(PipelineMetrics::new());
        let manager = AsyncTaskManager::new(sdk.clone(), Arc::clone(&metrics));
        (sdk, manager, metrics)
    }

    #[test]
    fn test_manual_pump_preserves_order() {
        let (sdk, mut manager, metrics) = setup();
        let game_id = sdk.game_id();

        sdk.push_callback(RawCallback::UserStatsStored {
            game_id,
            result: ResultCode::OK,
        });
        sdk.push_callback(RawCallback::UserStatsUnloaded { user: SteamId(7) });
        sdk.push_callback(RawCallback::UserStatsReceived {
            game_id,
            result: ResultCode::OK,
            user: SteamId(1000),
        });

        assert_eq!(manager.online_tick(), 3);
        assert_eq!(manager.pending(), 3);

        let mut recorder = Recorder::default();
        assert_eq!(manager.game_tick(&mut recorder), 3);
        assert_eq!(
            recorder.seen,
            vec!["stored:true", "unloaded:7", "received:1000"]
        );
        assert_eq!(manager.pending(), 0);
        assert_eq!(metrics.in_flight(), 0);
    }

    #[test]
    fn test_foreign_game_is_dropped() {
        let (sdk, mut manager, metrics) = setup();

        sdk.push_callback(RawCallback::UserStatsStored {
            game_id: crate::models::GameId(570),
            result: ResultCode::OK,
        });

        assert_eq!(manager.online_tick(), 0);
        let mut recorder = Recorder::default();
        assert_eq!(manager.game_tick(&mut recorder), 0);
        assert!(recorder.seen.is_empty());
        assert_eq!(metrics.callbacks_dropped.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_empty_tick_is_noop() {
        let (_sdk, mut manager, _metrics) = setup();
        let mut recorder = Recorder::default();
        assert_eq!(manager.online_tick(), 0);
        assert_eq!(manager.game_tick(&mut recorder), 0);
    }

    #[test]
    fn test_worker_delivers_events() {
        let (sdk, mut manager, metrics) = setup();
        manager.start(Duration::from_millis(1)).unwrap();
        assert!(manager.is_running());
        assert_ne!(manager.worker_thread_id(), Some(thread::current().id()));

        sdk.push_callback(RawCallback::UserStatsUnloaded { user: SteamId(3) });

        let deadline = Instant::now() + Duration::from_secs(5);
        while manager.pending() == 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }

        let mut recorder = Recorder::default();
        assert_eq!(manager.game_tick(&mut recorder), 1);
        assert_eq!(recorder.seen, vec!["unloaded:3"]);

        manager.shutdown();
        assert!(!manager.is_running());
        assert_eq!(metrics.live_workers(), 0);
    }

    #[test]
    fn test_start_twice_spawns_one_worker() {
        let (_sdk, mut manager, metrics) = setup();
        manager.start(Duration::from_millis(1)).unwrap();
        manager.start(Duration::from_millis(1)).unwrap();
        assert_eq!(metrics.workers_started.load(Ordering::Relaxed), 1);

        // Manual pumping is refused while the worker runs
        assert_eq!(manager.online_tick(), 0);

        manager.shutdown();
        manager.shutdown();
        assert_eq!(metrics.workers_joined.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_drop_joins_worker() {
        let (_sdk, mut manager, metrics) = setup();
        manager.start(Duration::from_millis(1)).unwrap();
        drop(manager);
        assert_eq!(metrics.live_workers(), 0);
    }
}
