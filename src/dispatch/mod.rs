// src/dispatch/mod.rs
// =============================================================================
// This module fans link validation out over many targets.
//
// Three interchangeable strategies sit behind the Dispatcher trait:
// - process: a pool of child processes (this binary in probe-worker mode)
// - thread:  a pool of OS threads sharing one validator
// - async:   one tokio thread, a semaphore, probes on the blocking pool
//
// Whatever the strategy, dispatch() promises:
// - every target is validated exactly once
// - a failure (even a panic) in one validation becomes a failed outcome for
//   that target and the rest of the batch carries on
// - outcomes come back in no particular order
//
// The strategy is always chosen explicitly (config file, --strategy, or the
// async-check command); nothing here inspects the environment to pick one.
// =============================================================================

#[cfg(feature = "cooperative")]
mod cooperative;
mod process;
mod threads;
pub mod worker;

#[cfg(feature = "cooperative")]
pub use cooperative::CooperativeDispatcher;
pub use process::ProcessPoolDispatcher;
pub use threads::ThreadPoolDispatcher;

use crate::checker::{ValidationOutcome, Validator};
use crate::config::CheckConfig;
use crate::error::CheckError;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Pool of worker processes
    Process,
    /// Pool of worker threads
    #[default]
    Thread,
    /// Single-threaded async scheduling with a concurrency gate
    #[serde(rename = "async")]
    #[value(name = "async")]
    Cooperative,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Process, Strategy::Thread, Strategy::Cooperative];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::Process => "process",
            Strategy::Thread => "thread",
            Strategy::Cooperative => "async",
        }
    }

    /// Whether this build can run the strategy at all.
    pub fn compiled_in(self) -> bool {
        match self {
            Strategy::Process | Strategy::Thread => true,
            Strategy::Cooperative => cfg!(feature = "cooperative"),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub trait Dispatcher {
    fn strategy(&self) -> Strategy;

    /// Validates every target and returns one outcome per target.
    fn dispatch(&self, targets: Vec<String>) -> Vec<ValidationOutcome>;
}

/// Builds the dispatcher for `strategy` from a validated config.
pub fn build_dispatcher(
    strategy: Strategy,
    config: &CheckConfig,
) -> Result<Box<dyn Dispatcher>, CheckError> {
    let settings = config.probe_settings();
    let workers = config.workers.max(1);

    match strategy {
        Strategy::Thread => {
            let validator = Arc::new(Validator::from_settings(&settings)?);
            Ok(Box::new(ThreadPoolDispatcher::new(validator, workers)?))
        }
        Strategy::Process => {
            let program = match &config.worker_program {
                Some(program) => program.clone(),
                None => std::env::current_exe().map_err(CheckError::WorkerExecutable)?,
            };
            Ok(Box::new(ProcessPoolDispatcher::new(program, &settings, workers)?))
        }
        #[cfg(feature = "cooperative")]
        Strategy::Cooperative => {
            let validator = Arc::new(Validator::from_settings(&settings)?);
            Ok(Box::new(CooperativeDispatcher::new(validator, workers)?))
        }
        #[cfg(not(feature = "cooperative"))]
        Strategy::Cooperative => Err(CheckError::StrategyUnavailable(strategy.name())),
    }
}

/// Runs one validation, turning a panic into a failed outcome.
pub(crate) fn validate_guarded(validator: &Validator, target: String) -> ValidationOutcome {
    let started = Instant::now();
    match panic::catch_unwind(AssertUnwindSafe(|| validator.validate(&target))) {
        Ok(outcome) => outcome,
        Err(payload) => {
            let message = panic_message(&*payload);
            tracing::error!("validation of {} panicked: {}", target, message);
            ValidationOutcome::failed(target, message, started.elapsed())
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&'static str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "validation panicked".to_string()
    }
}

/// A rayon pool of exactly `workers` threads for one dispatcher.
pub(crate) fn sized_pool(name: &'static str, workers: usize) -> Result<rayon::ThreadPool, CheckError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .thread_name(move |i| format!("{}-{}", name, i))
        .build()
        .map_err(CheckError::ThreadPool)
}
