//! Clicker Runtime -- the scheduling context around a clicker engine.
//!
//! The engine is a plain single-owner value. This crate wraps it in a
//! [`SharedGame`] handle (one mutex around every mutable record) and drives
//! it from a [`Ticker`] task that runs exactly one step per firing of a
//! fixed-rate tokio interval. A tick that fires late skips the missed slots
//! rather than bursting, so ticks never overlap.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use clicker_core::command::Command;
use clicker_core::definition::DefinitionError;
use clicker_core::engine::Engine;
use clicker_core::event::Event;
use clicker_core::query::GameState;
use clicker_data::DataLoadError;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

// ===========================================================================
// Errors
// ===========================================================================

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// A command or tick panicked while holding the game lock.
    #[error("game state lock poisoned")]
    Poisoned,

    #[error(transparent)]
    Load(#[from] DataLoadError),

    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error("ticker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

// ===========================================================================
// Shared handle
// ===========================================================================

/// A cloneable handle to one engine. Every command, query and tick takes
/// the same lock, and none of them blocks while holding it.
#[derive(Debug, Clone)]
pub struct SharedGame {
    inner: Arc<Mutex<Engine>>,
}

impl SharedGame {
    pub fn new(engine: Engine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Engine>, RuntimeError> {
        self.inner.lock().map_err(|_| RuntimeError::Poisoned)
    }

    /// Run `f` with exclusive access to the engine.
    pub fn with<R>(&self, f: impl FnOnce(&mut Engine) -> R) -> Result<R, RuntimeError> {
        let mut engine = self.lock()?;
        Ok(f(&mut engine))
    }

    pub fn execute(&self, command: Command) -> Result<bool, RuntimeError> {
        self.with(|engine| engine.execute(command))
    }

    pub fn step(&self) -> Result<(), RuntimeError> {
        self.with(|engine| {
            engine.step();
        })
    }

    pub fn snapshot(&self) -> Result<GameState, RuntimeError> {
        self.with(|engine| engine.snapshot())
    }

    pub fn drain_events(&self) -> Result<Vec<Event>, RuntimeError> {
        self.with(|engine| engine.drain_events())
    }

    /// The tick period configured for this engine.
    pub fn tick_period(&self) -> Result<Duration, RuntimeError> {
        self.with(|engine| Duration::from_secs_f64(engine.config().seconds_per_tick()))
    }
}

// ===========================================================================
// Ticker
// ===========================================================================

/// A running ticker task.
#[derive(Debug)]
pub struct Ticker {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<Result<u64, RuntimeError>>,
}

impl Ticker {
    /// Start stepping `game` once every `period`, first after one period.
    pub fn spawn(game: SharedGame, period: Duration) -> Self {
        let (shutdown, stop) = watch::channel(false);
        let task = tokio::spawn(run_ticker(game, period, stop));
        Self { shutdown, task }
    }

    /// Start a ticker at the engine's configured tick rate.
    pub fn spawn_at_config_rate(game: SharedGame) -> Result<Self, RuntimeError> {
        let period = game.tick_period()?;
        Ok(Self::spawn(game, period))
    }

    /// Stop the task and return how many steps it ran.
    pub async fn shutdown(self) -> Result<u64, RuntimeError> {
        // The task may already have exited on an error; its result is below.
        let _ = self.shutdown.send(true);
        self.task.await?
    }
}

async fn run_ticker(
    game: SharedGame,
    period: Duration,
    mut stop: watch::Receiver<bool>,
) -> Result<u64, RuntimeError> {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tracing::info!(target: "clicker.runtime", ?period, "ticker started");

    let mut steps = 0u64;
    loop {
        tokio::select! {
            _ = interval.tick() => {
                game.step()?;
                steps += 1;
            }
            changed = stop.changed() => {
                if changed.is_err() || *stop.borrow() {
                    break;
                }
            }
        }
    }
    tracing::info!(target: "clicker.runtime", steps, "ticker stopped");
    Ok(steps)
}
