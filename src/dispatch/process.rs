// src/dispatch/process.rs
// =============================================================================
// Process pool strategy.
//
// A rayon pool of `workers` threads spreads the targets; every pool thread
// drives one child process of its own (this same binary started as
// `doclinks probe-worker --settings <json>`) and feeds it one target at a
// time:
//
//   parent -> child stdin : "https://example.com/page"\n      (JSON string)
//   child  -> parent stdout: {"target":"...","valid":true,...}\n (JSON outcome)
//
// Children are isolated: a crash takes out one in-flight target (reported as
// a failed outcome) and a fresh child is started for the next target.
// =============================================================================

use super::worker::WORKER_COMMAND;
use super::{sized_pool, Dispatcher, Strategy};
use crate::checker::{ProbeSettings, ValidationOutcome};
use crate::error::CheckError;
use rayon::prelude::*;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::Instant;

pub struct ProcessPoolDispatcher {
    program: PathBuf,
    settings_json: String,
    pool: rayon::ThreadPool,
}

impl ProcessPoolDispatcher {
    pub fn new(program: PathBuf, settings: &ProbeSettings, workers: usize) -> Result<Self, CheckError> {
        let settings_json = serde_json::to_string(settings).map_err(CheckError::WorkerSettings)?;
        Ok(Self {
            program,
            settings_json,
            pool: sized_pool("doclinks-worker", workers)?,
        })
    }
}

impl Dispatcher for ProcessPoolDispatcher {
    fn strategy(&self) -> Strategy {
        Strategy::Process
    }

    fn dispatch(&self, targets: Vec<String>) -> Vec<ValidationOutcome> {
        tracing::info!(
            "checking {} target(s) on {} worker process(es) ({})",
            targets.len(),
            self.pool.current_num_threads(),
            self.program.display()
        );

        // rayon calls the init closure once per chunk of work it hands a
        // thread; the slot starts its child lazily and stops it when dropped
        self.pool.install(|| {
            targets
                .into_par_iter()
                .map_init(
                    || WorkerSlot::new(&self.program, &self.settings_json),
                    |slot, target| slot.validate(target),
                )
                .collect()
        })
    }
}

// A child process owned by one pool thread, (re)started on demand
struct WorkerSlot<'a> {
    program: &'a Path,
    settings_json: &'a str,
    process: Option<WorkerProcess>,
}

impl<'a> WorkerSlot<'a> {
    fn new(program: &'a Path, settings_json: &'a str) -> Self {
        Self {
            program,
            settings_json,
            process: None,
        }
    }

    fn validate(&mut self, target: String) -> ValidationOutcome {
        let started = Instant::now();

        let process = match self.process.take() {
            Some(process) => process,
            None => match WorkerProcess::spawn(self.program, self.settings_json) {
                Ok(process) => process,
                Err(e) => {
                    tracing::error!("failed to start worker process: {}", e);
                    let message = format!("failed to start worker process: {}", e);
                    return ValidationOutcome::failed(target, message, started.elapsed());
                }
            },
        };
        let process = self.process.insert(process);

        match process.validate(&target) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!("worker process failed on {}: {}", target, e);
                if let Some(broken) = self.process.take() {
                    broken.kill();
                }
                let message = format!("worker process failed: {}", e);
                ValidationOutcome::failed(target, message, started.elapsed())
            }
        }
    }
}

impl Drop for WorkerSlot<'_> {
    fn drop(&mut self) {
        if let Some(process) = self.process.take() {
            process.shutdown();
        }
    }
}

// One running probe-worker child and its pipes
struct WorkerProcess {
    child: Child,
    stdin: BufWriter<ChildStdin>,
    stdout: BufReader<ChildStdout>,
}

impl WorkerProcess {
    fn spawn(program: &Path, settings_json: &str) -> io::Result<Self> {
        let mut child = Command::new(program)
            .arg(WORKER_COMMAND)
            .arg("--settings")
            .arg(settings_json)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        match (stdin, stdout) {
            (Some(stdin), Some(stdout)) => Ok(Self {
                child,
                stdin: BufWriter::new(stdin),
                stdout: BufReader::new(stdout),
            }),
            _ => {
                let _ = child.kill();
                let _ = child.wait();
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "worker pipes were not captured"))
            }
        }
    }

    // Sends one target and reads back its outcome
    fn validate(&mut self, target: &str) -> io::Result<ValidationOutcome> {
        serde_json::to_writer(&mut self.stdin, target)?;
        self.stdin.write_all(b"\n")?;
        self.stdin.flush()?;

        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "worker process exited"));
        }

        let outcome: ValidationOutcome = serde_json::from_str(line.trim_end())?;
        if outcome.target != target {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("worker answered for '{}'", outcome.target),
            ));
        }
        Ok(outcome)
    }

    // Closing stdin tells the child there is no more work
    fn shutdown(self) {
        let WorkerProcess {
            mut child,
            stdin,
            stdout,
        } = self;
        drop(stdin);
        drop(stdout);
        match child.wait() {
            Ok(status) if !status.success() => {
                tracing::warn!("worker process exited with {}", status)
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("could not wait for worker process: {}", e),
        }
    }

    fn kill(mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
