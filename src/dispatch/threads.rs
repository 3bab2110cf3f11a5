// src/dispatch/threads.rs
// =============================================================================
// Thread pool strategy.
//
// A rayon pool of `workers` threads shares one validator, and with it one
// HTTP connection pool. Targets are spread over the pool with into_par_iter;
// each validation runs under validate_guarded so a panic only fails its own
// target.
// =============================================================================

use super::{sized_pool, validate_guarded, Dispatcher, Strategy};
use crate::checker::{ValidationOutcome, Validator};
use crate::error::CheckError;
use rayon::prelude::*;
use std::sync::Arc;

pub struct ThreadPoolDispatcher {
    validator: Arc<Validator>,
    pool: rayon::ThreadPool,
}

impl ThreadPoolDispatcher {
    pub fn new(validator: Arc<Validator>, workers: usize) -> Result<Self, CheckError> {
        Ok(Self {
            validator,
            pool: sized_pool("doclinks-thread", workers)?,
        })
    }
}

impl Dispatcher for ThreadPoolDispatcher {
    fn strategy(&self) -> Strategy {
        Strategy::Thread
    }

    fn dispatch(&self, targets: Vec<String>) -> Vec<ValidationOutcome> {
        tracing::info!(
            "checking {} target(s) on {} thread(s)",
            targets.len(),
            self.pool.current_num_threads()
        );
        let validator = self.validator.as_ref();
        self.pool.install(|| {
            targets
                .into_par_iter()
                .map(|target| validate_guarded(validator, target))
                .collect()
        })
    }
}
