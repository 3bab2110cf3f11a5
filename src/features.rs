// src/features.rs
// =============================================================================
// What this build and this machine can do, for `doclinks features`.
//
// Purely informational: the dispatch strategy is always picked explicitly,
// never from what this report says.
// =============================================================================

use crate::dispatch::Strategy;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize)]
pub struct RuntimeFeatures {
    pub version: &'static str,
    /// Hardware threads reported by the OS, if it would say
    pub available_parallelism: Option<usize>,
    /// Strategies compiled into this binary
    pub strategies: Vec<Strategy>,
    /// Program the process pool would launch
    pub worker_executable: Option<PathBuf>,
}

impl RuntimeFeatures {
    pub fn detect() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            available_parallelism: std::thread::available_parallelism().ok().map(|n| n.get()),
            strategies: Strategy::ALL.into_iter().filter(|s| s.compiled_in()).collect(),
            worker_executable: std::env::current_exe().ok(),
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "📦 doclinks {}", self.version);
        match self.available_parallelism {
            Some(n) => {
                let _ = writeln!(out, "🧵 Available parallelism: {}", n);
            }
            None => {
                let _ = writeln!(out, "🧵 Available parallelism: unknown");
            }
        }
        let names: Vec<_> = self.strategies.iter().map(|s| s.name()).collect();
        let _ = writeln!(out, "🔄 Dispatch strategies: {}", names.join(", "));
        match &self.worker_executable {
            Some(path) => {
                let _ = writeln!(out, "🔧 Worker executable: {}", path.display());
            }
            None => {
                let _ = writeln!(out, "🔧 Worker executable: not found");
            }
        }
        out
    }
}
