// src/service.rs
// =============================================================================
// One link check run, start to finish.
//
// 1. Walk the docs tree and collect every distinct target
// 2. Hand the targets to a dispatcher (process, thread or async)
// 3. Sort the outcomes into valid / broken / skipped
//
// Progress is published on a StatusBoard so a caller can look in while the
// run is going.
// =============================================================================

use crate::checker::{LinkExtractor, MarkupFiles, ScanStats};
use crate::config::CheckConfig;
use crate::dispatch::{build_dispatcher, Dispatcher, Strategy};
use crate::error::CheckError;
use crate::report::ResultSet;
use crate::status::{Phase, StatusBoard, StatusSnapshot};
use std::time::Instant;

pub struct LinkCheckService {
    config: CheckConfig,
    extractor: LinkExtractor,
    files: MarkupFiles,
    status: StatusBoard,
}

impl LinkCheckService {
    /// Validates the config and makes sure the docs tree exists.
    pub fn new(config: CheckConfig) -> Result<Self, CheckError> {
        let base = config.validate()?;
        if !config.docs_path.is_dir() {
            return Err(CheckError::DocsPathMissing(config.docs_path.clone()));
        }

        let files = MarkupFiles::new(&config.docs_path, &config.extension);
        Ok(Self {
            extractor: LinkExtractor::new(base),
            files,
            config,
            status: StatusBoard::new(),
        })
    }

    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    pub fn status(&self) -> StatusSnapshot {
        self.status.snapshot()
    }

    /// Every distinct target in the docs tree, in sorted order.
    pub fn collect_targets(&self) -> (Vec<String>, ScanStats) {
        self.status.update(
            Phase::Scanning,
            format!("scanning {}", self.files.root().display()),
            |_| {},
        );

        let (targets, stats) = self.extractor.collect(&self.files);
        tracing::info!(
            "found {} unique link(s) in {} file(s) ({} unreadable)",
            targets.len(),
            stats.files_scanned,
            stats.files_failed
        );

        let count = targets.len();
        self.status.update(Phase::Scanning, format!("found {} link(s)", count), |s| {
            s.files_scanned = stats.files_scanned;
            s.files_failed = stats.files_failed;
            s.targets = count;
        });

        (targets.into_iter().collect(), stats)
    }

    /// Runs the whole check with the given strategy.
    pub fn run(&self, strategy: Strategy) -> Result<ResultSet, CheckError> {
        let dispatcher = match build_dispatcher(strategy, &self.config) {
            Ok(dispatcher) => dispatcher,
            Err(e) => {
                self.status.update(Phase::Failed, e.to_string(), |s| s.strategy = Some(strategy));
                return Err(e);
            }
        };
        Ok(self.run_with(dispatcher.as_ref()))
    }

    /// Runs the whole check on an already-built dispatcher.
    pub fn run_with(&self, dispatcher: &dyn Dispatcher) -> ResultSet {
        let started = Instant::now();
        let (targets, _) = self.collect_targets();
        let strategy = dispatcher.strategy();

        self.status.update(
            Phase::Checking,
            format!("checking {} link(s) with the {} strategy", targets.len(), strategy),
            |s| s.strategy = Some(strategy),
        );

        let outcomes = dispatcher.dispatch(targets);
        let results = ResultSet::from_outcomes(outcomes);
        let summary = results.summary();

        tracing::info!(
            "checked {} link(s) in {:.2}s: {} valid, {} broken, {} skipped",
            summary.total,
            started.elapsed().as_secs_f64(),
            summary.valid,
            summary.broken,
            summary.skipped
        );
        self.status.update(
            Phase::Finished,
            format!("{} valid, {} broken, {} skipped", summary.valid, summary.broken, summary.skipped),
            |_| {},
        );

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::ValidationOutcome;
    use std::fs;
    use std::path::Path;
    use std::sync::Mutex;

    fn offline_config(docs: &Path) -> CheckConfig {
        let mut cfg = CheckConfig::default();
        cfg.docs_path = docs.to_path_buf();
        cfg.base_url = Some("https://example.com/docs/".to_string());
        cfg.workers = 2;
        cfg.http.offline = true;
        cfg
    }

    fn docs_tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("index.md"),
            "[home](https://example.org)\n[local](http://localhost:8000/api)\n[guide](./guide.md)\n",
        )
        .unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(
            dir.path().join("nested/page.md"),
            "<a href=\"https://example.org\">dup</a>\n",
        )
        .unwrap();
        dir
    }

    // Answers 200 for everything and remembers what it was given
    struct RecordingDispatcher {
        seen: Mutex<Vec<String>>,
    }

    impl Dispatcher for RecordingDispatcher {
        fn strategy(&self) -> Strategy {
            Strategy::Thread
        }

        fn dispatch(&self, targets: Vec<String>) -> Vec<ValidationOutcome> {
            self.seen.lock().unwrap().extend(targets.iter().cloned());
            targets
                .into_iter()
                .map(|t| ValidationOutcome::with_status(t, 200, Default::default()))
                .collect()
        }
    }

    #[test]
    fn test_missing_docs_path() {
        let cfg = offline_config(Path::new("/no/such/docs/tree"));
        let err = LinkCheckService::new(cfg).err().unwrap();
        assert!(matches!(err, CheckError::DocsPathMissing(_)));
    }

    #[test]
    fn test_config_is_validated_first() {
        let dir = docs_tree();
        let mut cfg = offline_config(dir.path());
        cfg.base_url = None;
        assert!(matches!(LinkCheckService::new(cfg), Err(CheckError::MissingBaseUrl)));
    }

    #[test]
    fn test_collect_targets_dedupes_across_files() {
        let dir = docs_tree();
        let service = LinkCheckService::new(offline_config(dir.path())).unwrap();

        let (targets, stats) = service.collect_targets();
        assert_eq!(stats.files_scanned, 2);
        assert_eq!(
            targets,
            vec![
                "http://localhost:8000/api",
                "https://example.com/docs/guide.md",
                "https://example.org",
            ]
        );
        assert_eq!(service.status().targets, 3);
    }

    #[test]
    fn test_run_with_dispatches_every_target_once() {
        let dir = docs_tree();
        let service = LinkCheckService::new(offline_config(dir.path())).unwrap();
        let dispatcher = RecordingDispatcher {
            seen: Mutex::new(Vec::new()),
        };

        let results = service.run_with(&dispatcher);
        assert_eq!(dispatcher.seen.lock().unwrap().len(), 3);
        assert_eq!(results.summary().valid, 3);

        let status = service.status();
        assert_eq!(status.phase, Phase::Finished);
        assert_eq!(status.strategy, Some(Strategy::Thread));
    }

    #[test]
    fn test_offline_run_skips_and_breaks() {
        let dir = docs_tree();
        let service = LinkCheckService::new(offline_config(dir.path())).unwrap();

        let results = service.run(Strategy::Thread).unwrap();
        assert_eq!(results.skipped, vec!["http://localhost:8000/api"]);
        assert!(results.valid.is_empty());
        assert_eq!(results.broken.len(), 2);
        assert!(results
            .broken
            .iter()
            .all(|entry| entry.ends_with("(HTTP client not available)")));
    }

    #[test]
    fn test_empty_docs_tree() {
        let dir = tempfile::tempdir().unwrap();
        let service = LinkCheckService::new(offline_config(dir.path())).unwrap();
        let results = service.run(Strategy::Thread).unwrap();
        assert_eq!(results.summary().total, 0);
    }
}
