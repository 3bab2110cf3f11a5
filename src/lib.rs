// src/lib.rs
// =============================================================================
// doclinks: find broken links in a documentation tree.
//
// Modules:
// - checker:  finding link targets in markup files and probing them
// - dispatch: running validations concurrently (process, thread, async)
// - report:   sorting outcomes into valid / broken / skipped and printing them
// - service:  one full run, scan -> dispatch -> report
// - config, error, logging, status, features: the plumbing around all that
//
// The binary (src/main.rs) is a thin CLI over this library.
// =============================================================================

pub mod checker;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod features;
pub mod logging;
pub mod report;
pub mod service;
pub mod status;

pub use config::{CheckConfig, ConfigOverrides};
pub use error::CheckError;
pub use report::ResultSet;
pub use service::LinkCheckService;
