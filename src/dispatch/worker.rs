// src/dispatch/worker.rs
// =============================================================================
// Child side of the process pool (`doclinks probe-worker`).
//
// Reads one JSON-encoded target per line, answers with one JSON
// ValidationOutcome per line, in order, flushing after each answer.
// Every request line gets exactly one answer, even a malformed one, so the
// parent never falls out of step.
// =============================================================================

use super::validate_guarded;
use crate::checker::{ValidationOutcome, Validator};
use std::io::{self, BufRead, Write};
use std::time::Duration;

/// Subcommand name the parent uses to start a worker.
pub const WORKER_COMMAND: &str = "probe-worker";

/// Serves requests until `input` hits EOF. Returns how many were answered.
pub fn run_worker(validator: &Validator, input: impl BufRead, mut output: impl Write) -> io::Result<usize> {
    let mut answered = 0;

    for line in input.lines() {
        let line = line?;
        let outcome = match serde_json::from_str::<String>(&line) {
            Ok(target) => validate_guarded(validator, target),
            Err(e) => {
                tracing::warn!("malformed worker request {:?}: {}", line, e);
                ValidationOutcome::failed(line, format!("malformed worker request: {}", e), Duration::ZERO)
            }
        };

        serde_json::to_writer(&mut output, &outcome)?;
        output.write_all(b"\n")?;
        output.flush()?;
        answered += 1;
    }

    tracing::debug!("worker answered {} request(s)", answered);
    Ok(answered)
}
