/// Monitor
///
/// Host-facing handle of the detection engine: owns the shared game state
/// engine and starts or stops the detection thread.
use crossbeam_channel::{bounded, Sender};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::capture::FrameSampler;
use crate::config::Config;
use crate::detection::poller::Poller;
use crate::detection::PollerSettings;
use crate::error::{MonitorError, OcrError};
use crate::messaging::{Announcer, Broadcaster};
use crate::ocr::RecognizerFactory;
use crate::state::{BattleSummary, GameState, GameStateEngine, ProcessState, ProcessStateMachine};

/// Game state engine shared between the detection thread and the host
pub type SharedEngine = Arc<Mutex<GameStateEngine>>;

struct Worker {
    shutdown_tx: Sender<()>,
    handle: JoinHandle<Result<(), OcrError>>,
}

pub struct Monitor {
    settings: PollerSettings,
    sampler: Arc<dyn FrameSampler>,
    recognizer_factory: RecognizerFactory,
    engine: SharedEngine,
    lifecycle: ProcessStateMachine,
    worker: Option<Worker>,
}

impl Monitor {
    pub fn new(
        settings: PollerSettings,
        engine: GameStateEngine,
        sampler: Arc<dyn FrameSampler>,
        recognizer_factory: RecognizerFactory,
    ) -> Self {
        Self {
            settings,
            sampler,
            recognizer_factory,
            engine: Arc::new(Mutex::new(engine)),
            lifecycle: ProcessStateMachine::new(),
            worker: None,
        }
    }

    /// Build a monitor and its engine from configuration
    pub fn from_config(
        config: &Config,
        sampler: Arc<dyn FrameSampler>,
        recognizer_factory: RecognizerFactory,
        announcer: Arc<dyn Announcer>,
        broadcaster: Arc<dyn Broadcaster>,
    ) -> Self {
        let engine = GameStateEngine::new(announcer, broadcaster)
            .with_names(config.side_names.clone())
            .with_inactivity_threshold(config.streak_reset_threshold());
        Self::new(PollerSettings::from(config), engine, sampler, recognizer_factory)
    }

    /// Initialize the recognizer and begin the sampling schedule
    ///
    /// Does nothing if already running. Recognizer initialization errors are
    /// returned and leave the monitor stopped.
    pub fn start(&mut self) -> Result<(), MonitorError> {
        if self.lifecycle.state().is_running() {
            tracing::debug!(
                "Monitor state is {}, start ignored",
                self.lifecycle.state().description()
            );
            return Ok(());
        }
        self.lifecycle.start()?;

        match self.spawn_worker() {
            Ok(worker) => {
                self.worker = Some(worker);
                self.lifecycle.mark_running()?;
                tracing::info!("OCR worker started. Monitoring for battle results...");
                self.engine.lock().broadcast_state();
                Ok(())
            }
            Err(e) => {
                self.lifecycle.force_stop();
                Err(e)
            }
        }
    }

    fn spawn_worker(&self) -> Result<Worker, MonitorError> {
        let (ready_tx, ready_rx) = bounded::<Result<(), OcrError>>(1);
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);

        let factory = Arc::clone(&self.recognizer_factory);
        let poller = Poller::new(
            self.settings.clone(),
            Arc::clone(&self.sampler),
            Arc::clone(&self.engine),
        );

        // The recognizer is built on the detection thread and never leaves it
        let handle = thread::Builder::new()
            .name("detection-poller".to_string())
            .spawn(move || {
                let recognizer = match factory() {
                    Ok(recognizer) => recognizer,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return Ok(());
                    }
                };
                let _ = ready_tx.send(Ok(()));
                poller.run(recognizer, shutdown_rx)
            })
            .map_err(MonitorError::ThreadSpawnFailed)?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Worker {
                shutdown_tx,
                handle,
            }),
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(MonitorError::RecognizerInit(e))
            }
            Err(_) => {
                let _ = handle.join();
                Err(MonitorError::ThreadPanicked)
            }
        }
    }

    /// Cancel all scheduled work and release the recognizer
    ///
    /// Safe to call when never started. Waits for an in-flight sampling cycle
    /// to finish.
    pub fn stop(&mut self) -> Result<(), MonitorError> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };

        match self.lifecycle.state().running_duration() {
            Some(uptime) => tracing::info!(
                "Attempting to stop battle recognition after {}s...",
                uptime.as_secs()
            ),
            None => tracing::info!("Attempting to stop battle recognition..."),
        }
        self.lifecycle.stop()?;

        let _ = worker.shutdown_tx.send(());
        let joined = worker.handle.join();
        self.lifecycle.mark_stopped()?;

        match joined {
            Ok(Ok(())) => {
                tracing::info!("Battle recognition process has been shut down.");
                Ok(())
            }
            Ok(Err(e)) => Err(MonitorError::RecognizerTerminate(e)),
            Err(_) => Err(MonitorError::ThreadPanicked),
        }
    }

    /// Current game state, for on-demand queries
    pub fn snapshot(&self) -> GameState {
        self.engine.lock().snapshot()
    }

    pub fn summary(&self) -> BattleSummary {
        self.engine.lock().summary()
    }

    /// Shared engine handle for other schedulers reading the totals
    pub fn engine(&self) -> SharedEngine {
        Arc::clone(&self.engine)
    }

    pub fn state(&self) -> ProcessState {
        self.lifecycle.state()
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle.state().is_running()
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            tracing::warn!("Monitor shutdown failed: {}", e);
        }
    }
}
