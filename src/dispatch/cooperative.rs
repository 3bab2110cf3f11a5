// src/dispatch/cooperative.rs
// =============================================================================
// Async strategy: one scheduler thread, many probes in flight.
//
// How it works:
// - A current-thread tokio runtime drives every probe future
// - A Semaphore with `workers` permits is the concurrency gate: a probe must
//   hold a permit while it runs, so at most `workers` are in flight
// - The probe itself is a blocking call, so it is moved onto tokio's
//   blocking pool with spawn_blocking; the scheduler thread never blocks
// - FuturesUnordered yields outcomes as they finish, in any order
//
// Only compiled with the `cooperative` cargo feature.
// =============================================================================

use super::{panic_message, Dispatcher, Strategy};
use crate::checker::{ValidationOutcome, Validator};
use crate::error::CheckError;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Runtime;
use tokio::sync::Semaphore;

pub struct CooperativeDispatcher {
    validator: Arc<Validator>,
    workers: usize,
    runtime: Runtime,
}

impl CooperativeDispatcher {
    pub fn new(validator: Arc<Validator>, workers: usize) -> Result<Self, CheckError> {
        let workers = workers.max(1);
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .max_blocking_threads(workers)
            .thread_name("doclinks-probe")
            .build()
            .map_err(CheckError::Runtime)?;

        Ok(Self {
            validator,
            workers,
            runtime,
        })
    }
}

impl Dispatcher for CooperativeDispatcher {
    fn strategy(&self) -> Strategy {
        Strategy::Cooperative
    }

    fn dispatch(&self, targets: Vec<String>) -> Vec<ValidationOutcome> {
        let total = targets.len();
        tracing::info!("checking {} target(s), at most {} in flight", total, self.workers);

        self.runtime.block_on(async {
            let gate = Arc::new(Semaphore::new(self.workers));

            let mut in_flight: FuturesUnordered<_> = targets
                .into_iter()
                .map(|target| probe_gated(Arc::clone(&gate), Arc::clone(&self.validator), target))
                .collect();

            let mut outcomes = Vec::with_capacity(total);
            while let Some(outcome) = in_flight.next().await {
                outcomes.push(outcome);
            }
            outcomes
        })
    }
}

// Waits for a permit, then runs the blocking validation off the scheduler
async fn probe_gated(gate: Arc<Semaphore>, validator: Arc<Validator>, target: String) -> ValidationOutcome {
    let started = Instant::now();

    // Held until this function returns
    let _permit = match gate.acquire_owned().await {
        Ok(permit) => permit,
        Err(e) => {
            return ValidationOutcome::failed(target, format!("concurrency gate closed: {}", e), started.elapsed())
        }
    };

    let job_target = target.clone();
    match tokio::task::spawn_blocking(move || validator.validate(&job_target)).await {
        Ok(outcome) => outcome,
        Err(e) => {
            let message = if e.is_panic() {
                panic_message(&*e.into_panic())
            } else {
                e.to_string()
            };
            tracing::error!("validation of {} failed: {}", target, message);
            ValidationOutcome::failed(target, message, started.elapsed())
        }
    }
}
