// src/cli.rs
// =============================================================================
// Command-line interface, built with clap's derive API.
//
// Commands:
// - check-links:  scan the docs tree and check every link
// - async-check:  same, always with the async strategy
// - features:     show what this build and machine support
// - probe-worker: (hidden) child side of the process pool
//
// Flags given here win over the config file; see config.rs for the layers.
// =============================================================================

use crate::config::ConfigOverrides;
use crate::dispatch::Strategy;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "doclinks",
    version,
    about = "Scan a documentation tree for broken links",
    long_about = "doclinks walks a documentation directory, collects every link written in \
                  markdown or raw HTML, and checks each one concurrently. \
                  Useful in CI to keep docs from rotting."
)]
pub struct Cli {
    /// More log output on stderr (-v, -vv). RUST_LOG overrides this.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ./doclinks.toml when present)
    #[arg(long, env = "DOCLINKS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check every link in the docs tree
    ///
    /// Example: doclinks check-links --docs-path docs --base-url https://example.com/docs/
    CheckLinks(CheckArgs),

    /// Check every link using the async strategy
    ///
    /// Fails with exit code 1 when this build has no async support.
    AsyncCheck(CheckArgs),

    /// Show the dispatch strategies and parallelism available
    Features {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Serve validation requests over stdin/stdout (used by the process pool)
    #[command(hide = true)]
    ProbeWorker {
        /// Probe settings as JSON
        #[arg(long)]
        settings: String,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct CheckArgs {
    /// Root of the documentation tree
    #[arg(long, env = "DOCLINKS_DOCS_PATH")]
    pub docs_path: Option<PathBuf>,

    /// Base URL that relative links are resolved against
    #[arg(long, env = "DOCLINKS_BASE_URL")]
    pub base_url: Option<String>,

    /// Concurrency limit (pool size)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<f64>,

    /// Dispatch strategy (ignored by async-check)
    #[arg(long, value_enum)]
    pub strategy: Option<Strategy>,

    /// Don't build an HTTP client; every non-skipped link is reported broken
    #[arg(long)]
    pub offline: bool,

    /// Also write the JSON report to this file (".json" added if no extension)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Print the JSON report instead of the console summary
    #[arg(long)]
    pub json: bool,

    /// Exit with code 1 when any link is broken
    #[arg(long)]
    pub fail_on_broken: bool,
}

impl CheckArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            docs_path: self.docs_path.clone(),
            base_url: self.base_url.clone(),
            workers: self.workers,
            timeout_secs: self.timeout,
            strategy: self.strategy,
            offline: self.offline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_check_links_flags() {
        let cli = Cli::try_parse_from([
            "doclinks",
            "-vv",
            "check-links",
            "--docs-path",
            "site/docs",
            "--base-url",
            "https://example.com/",
            "--workers",
            "4",
            "--timeout",
            "2.5",
            "--strategy",
            "async",
            "--offline",
            "--fail-on-broken",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        let Commands::CheckLinks(args) = cli.command else {
            panic!("expected check-links");
        };
        let overrides = args.overrides();
        assert_eq!(overrides.docs_path, Some(PathBuf::from("site/docs")));
        assert_eq!(overrides.workers, Some(4));
        assert_eq!(overrides.timeout_secs, Some(2.5));
        assert_eq!(overrides.strategy, Some(Strategy::Cooperative));
        assert!(overrides.offline);
        assert!(args.fail_on_broken);
        assert!(!args.json);
    }

    #[test]
    fn test_unknown_strategy_rejected() {
        let result = Cli::try_parse_from(["doclinks", "check-links", "--strategy", "fibers"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_probe_worker_parses() {
        let cli = Cli::try_parse_from(["doclinks", "probe-worker", "--settings", "{}"]).unwrap();
        assert!(matches!(cli.command, Commands::ProbeWorker { settings } if settings == "{}"));
    }
}
