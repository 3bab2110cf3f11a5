// src/main.rs
// =============================================================================
// Entry point of the doclinks CLI.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (stderr, so stdout only carries the report)
// 3. Dispatch to the subcommand handler
// 4. Exit with the proper code:
//    0 = success
//    1 = precondition unmet, or broken links with --fail-on-broken
//    2 = any other fatal error
// =============================================================================

use anyhow::{Context, Result};
use clap::Parser;
use doclinks::checker::{ProbeSettings, Validator};
use doclinks::cli::{CheckArgs, Cli, Commands};
use doclinks::dispatch::{worker::run_worker, Strategy};
use doclinks::features::RuntimeFeatures;
use doclinks::logging::init_logging;
use doclinks::report::{render_console, write_report};
use doclinks::{CheckConfig, CheckError, LinkCheckService};
use std::io::{self, Write};
use std::path::Path;

fn main() {
    let exit_code = match run() {
        Ok(code) => code,
        Err(e) => match e.downcast_ref::<CheckError>() {
            // CheckError messages already carry their cause
            Some(check) => {
                eprintln!("Error: {}", check);
                if check.is_precondition() {
                    1
                } else {
                    2
                }
            }
            None => {
                eprintln!("Error: {:#}", e);
                2
            }
        },
    };

    std::process::exit(exit_code);
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::CheckLinks(args) => handle_check(cli.config.as_deref(), &args, None),
        Commands::AsyncCheck(args) => {
            if !Strategy::Cooperative.compiled_in() {
                eprintln!("❌ async-check needs the 'cooperative' feature, which this build was compiled without");
                eprintln!("   Rebuild with `--features cooperative` or use `check-links --strategy thread`.");
                return Ok(1);
            }
            handle_check(cli.config.as_deref(), &args, Some(Strategy::Cooperative))
        }
        Commands::Features { json } => handle_features(json),
        Commands::ProbeWorker { settings } => handle_probe_worker(&settings),
    }
}

// check-links and async-check; `forced` pins the strategy
fn handle_check(config_path: Option<&Path>, args: &CheckArgs, forced: Option<Strategy>) -> Result<i32> {
    let mut config = CheckConfig::load(config_path)?;
    config.apply(args.overrides());
    if let Some(strategy) = forced {
        config.strategy = strategy;
    }
    let strategy = config.strategy;

    let service = LinkCheckService::new(config)?;
    if !args.json {
        println!("🔍 Scanning {}", service.config().docs_path.display());
        println!("🔄 Strategy: {} ({} workers)\n", strategy, service.config().workers);
    }

    let results = service.run(strategy)?;

    if args.json {
        let report = serde_json::to_string_pretty(&results.report())?;
        println!("{}", report);
    } else {
        print!("{}", render_console(&results));
    }

    if let Some(output) = &args.output {
        let written = write_report(&results, output)?;
        if !args.json {
            println!("\n📝 Report written to {}", written.display());
        }
    }

    if args.fail_on_broken && !results.broken.is_empty() {
        return Ok(1);
    }
    Ok(0)
}

fn handle_features(json: bool) -> Result<i32> {
    let features = RuntimeFeatures::detect();
    if json {
        println!("{}", serde_json::to_string_pretty(&features)?);
    } else {
        print!("{}", features.render());
    }
    Ok(0)
}

// Child side of the process pool: stdin/stdout carry the JSON-lines protocol
fn handle_probe_worker(settings: &str) -> Result<i32> {
    let settings: ProbeSettings = serde_json::from_str(settings).map_err(CheckError::WorkerSettings)?;
    let validator = Validator::from_settings(&settings)?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    run_worker(&validator, stdin.lock(), stdout.lock()).context("worker i/o failed")?;
    io::stdout().flush()?;
    Ok(0)
}
