//! Incremental publishing of asset tasks.
//!
//! # Flow
//!
//! ```text
//! publish_site()
//!     │
//!     ├── clean output (optional)
//!     ├── PublishConfig::asset_tasks()  ──► ordered AssetTask list
//!     └── Orchestrator::run()
//!             │
//!             └── per task, in order:
//!                   stale::check() ──► skip | missing | transform chain ──► atomic write
//! ```
//!
//! Tasks are independent: a failed task is recorded in the report and, under
//! [`FailurePolicy::Continue`], the next task runs as usual.

mod error;
mod report;
mod stale;

pub use error::TaskError;
pub use report::{BuildReport, Outcome};

use stale::Staleness;

use crate::{config::PublishConfig, log, manifest::AssetTask, transform::TransformRegistry};
use anyhow::{Context, Result, bail};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

/// What to do after a task fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Log the failure and run the remaining tasks.
    #[default]
    Continue,
    /// Stop; remaining tasks are not run and not reported.
    Abort,
}

/// Runs asset tasks against a transform registry.
pub struct Orchestrator<'a> {
    registry: &'a TransformRegistry,
    policy: FailurePolicy,
    force: bool,
    log_base: Option<PathBuf>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(registry: &'a TransformRegistry) -> Self {
        Self {
            registry,
            policy: FailurePolicy::default(),
            force: false,
            log_base: None,
        }
    }

    pub fn policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Treat every existing destination as stale.
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Log each outcome, with source paths shown relative to `base`.
    pub fn log_relative_to(mut self, base: &Path) -> Self {
        self.log_base = Some(base.to_path_buf());
        self
    }

    /// Process `tasks` in order, one at a time.
    pub fn run(&self, tasks: Vec<AssetTask>) -> BuildReport {
        let mut report = BuildReport::default();

        for task in tasks {
            let outcome = self.process(&task).unwrap_or_else(Outcome::Failed);
            self.log_outcome(&task, &outcome);

            let stop = outcome.is_failure() && self.policy == FailurePolicy::Abort;
            report.push(task, outcome);
            if stop {
                break;
            }
        }

        report
    }

    fn process(&self, task: &AssetTask) -> Result<Outcome, TaskError> {
        // Resolve the whole chain before looking at any file; an unknown id
        // fails the task whatever the timestamps say
        let chain = task
            .transform
            .ids()
            .iter()
            .map(|id| {
                self.registry
                    .get(id)
                    .map(|transform| (id, transform))
                    .ok_or_else(|| TaskError::UnknownTransform(id.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let outcome = match stale::check(&task.source, &task.destination)? {
            Staleness::MissingSource => return Ok(Outcome::MissingSource),
            Staleness::Missing => Outcome::Created,
            Staleness::Outdated => Outcome::Updated,
            Staleness::UpToDate if self.force => Outcome::Updated,
            Staleness::UpToDate => return Ok(Outcome::Skipped),
        };

        let input = fs::read(&task.source).map_err(|source| TaskError::Read {
            path: task.source.clone(),
            source,
        })?;

        let output = chain.iter().try_fold(input, |bytes, (id, transform)| {
            transform
                .apply(&bytes)
                .map_err(|source| TaskError::Transform {
                    id: (*id).clone(),
                    source,
                })
        })?;

        write_atomic(&task.destination, &output)?;
        Ok(outcome)
    }

    fn log_outcome(&self, task: &AssetTask, outcome: &Outcome) {
        let Some(base) = &self.log_base else {
            return;
        };
        let name = task.source.strip_prefix(base).unwrap_or(&task.source).display();

        match outcome {
            Outcome::Failed(err) => log!("error"; "{name}: {}", err.chain()),
            Outcome::Skipped => log!("skipped"; "{name}"),
            other => log!(other.label(); "{name} ({})", task.transform),
        }
    }
}

/// Write `bytes` to `path` through a temporary file in the same directory.
///
/// The destination is either left as it was or fully replaced.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), TaskError> {
    let err = |source: std::io::Error| TaskError::Write {
        path: path.to_path_buf(),
        source,
    };

    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    fs::create_dir_all(parent).map_err(err)?;

    let mut file = tempfile::NamedTempFile::new_in(parent).map_err(err)?;
    file.write_all(bytes).map_err(err)?;

    // Temp files are private; published files keep the usual mode
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(path)
            .map(|m| m.permissions().mode())
            .unwrap_or(0o644);
        file.as_file()
            .set_permissions(fs::Permissions::from_mode(mode))
            .map_err(err)?;
    }

    file.persist(path).map_err(|e| err(e.error))?;
    Ok(())
}

/// Publish every manifest task of `config`.
///
/// Returns the report even when tasks failed; the caller decides what a
/// failure means for the process.
pub fn publish_site(config: &PublishConfig, registry: &TransformRegistry) -> Result<BuildReport> {
    let output = &config.build.output;

    if config.build.clean && config.build.source.starts_with(output) {
        bail!(
            "Refusing to clean {}: it contains the source directory",
            output.display()
        );
    }
    if config.build.clean && output.exists() {
        fs::remove_dir_all(output)
            .with_context(|| format!("Failed to clear output directory: {}", output.display()))?;
    }

    let tasks = config.asset_tasks();
    log!("publish"; "{} tasks: {} -> {}", tasks.len(), config.build.source.display(), output.display());

    let policy = if config.build.fail_fast {
        FailurePolicy::Abort
    } else {
        FailurePolicy::Continue
    };

    let report = Orchestrator::new(registry)
        .policy(policy)
        .force(config.build.force)
        .log_relative_to(&config.build.source)
        .run(tasks);

    log!("publish"; "done: {}", report.summary());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        manifest::{TaskEntry, TransformChain},
        transform::{self, TransformError},
    };
    use std::{
        fs::File,
        time::{Duration, SystemTime},
    };
    use tempfile::TempDir;

    // 2024-01-01T00:00:00Z and 2024-01-02T00:00:00Z
    const JAN_1: u64 = 1_704_067_200;
    const JAN_2: u64 = 1_704_153_600;

    fn at(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn write_at(path: &Path, content: &[u8], secs: u64) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(at(secs))
            .unwrap();
    }

    fn mtime(path: &Path) -> SystemTime {
        path.metadata().unwrap().modified().unwrap()
    }

    fn task(dir: &TempDir, src: &str, dst: &str, transform: &str) -> AssetTask {
        AssetTask::new(
            dir.path().join("src").join(src),
            dir.path().join("www").join(dst),
            TransformChain::one(transform),
        )
    }

    fn builtins() -> TransformRegistry {
        TransformRegistry::with_builtins(&PublishConfig::default())
    }

    fn failing() -> TransformRegistry {
        let mut registry = builtins();
        registry.register("broken", |_: &[u8]| -> Result<Vec<u8>, TransformError> {
            Err(TransformError::Minify("unexpected token".into()))
        });
        registry
    }

    const MAIN_JS: &[u8] = b"// app entry\nfunction start(x) {\n    return x + 1;\n}\n";

    #[test]
    fn test_created_when_destination_missing() {
        let dir = TempDir::new().unwrap();
        let t = task(&dir, "main.js", "main.js", transform::MINIFY_JS);
        write_at(&t.source, MAIN_JS, JAN_1);

        let registry = builtins();
        let report = Orchestrator::new(&registry).run(vec![t.clone()]);

        assert!(matches!(report.tasks[0].outcome, Outcome::Created));
        let expected = transform::minify::minify_js(MAIN_JS).unwrap();
        assert_eq!(fs::read(&t.destination).unwrap(), expected);
    }

    #[test]
    fn test_updated_when_source_newer() {
        let dir = TempDir::new().unwrap();
        let t = task(&dir, "main.js", "main.js", transform::MINIFY_JS);
        write_at(&t.source, MAIN_JS, JAN_2);
        write_at(&t.destination, b"stale build", JAN_1);

        let registry = builtins();
        let report = Orchestrator::new(&registry).run(vec![t.clone()]);

        assert!(matches!(report.tasks[0].outcome, Outcome::Updated));
        let expected = transform::minify::minify_js(MAIN_JS).unwrap();
        assert_eq!(fs::read(&t.destination).unwrap(), expected);
        assert!(mtime(&t.destination) > at(JAN_2));
    }

    #[test]
    fn test_skipped_when_timestamps_equal() {
        let dir = TempDir::new().unwrap();
        let t = task(&dir, "index.html", "index.html", transform::MINIFY_HTML);
        write_at(&t.source, b"<p>\n  new source\n</p>", JAN_1);
        write_at(&t.destination, b"previous output", JAN_1);

        let registry = builtins();
        let report = Orchestrator::new(&registry).run(vec![t.clone()]);

        assert!(matches!(report.tasks[0].outcome, Outcome::Skipped));
        assert_eq!(fs::read(&t.destination).unwrap(), b"previous output");
        assert_eq!(mtime(&t.destination), at(JAN_1));
    }

    #[test]
    fn test_skipped_when_destination_newer() {
        let dir = TempDir::new().unwrap();
        let t = task(&dir, "favicon.png", "favicon.png", transform::COPY);
        write_at(&t.source, b"new", JAN_1);
        write_at(&t.destination, b"old", JAN_2);

        let registry = builtins();
        let report = Orchestrator::new(&registry).run(vec![t.clone()]);

        assert!(matches!(report.tasks[0].outcome, Outcome::Skipped));
        assert_eq!(fs::read(&t.destination).unwrap(), b"old");
    }

    #[test]
    fn test_force_rebuilds_up_to_date() {
        let dir = TempDir::new().unwrap();
        let t = task(&dir, "favicon.png", "favicon.png", transform::COPY);
        write_at(&t.source, b"new", JAN_1);
        write_at(&t.destination, b"old", JAN_2);

        let registry = builtins();
        let report = Orchestrator::new(&registry).force(true).run(vec![t.clone()]);

        assert!(matches!(report.tasks[0].outcome, Outcome::Updated));
        assert_eq!(fs::read(&t.destination).unwrap(), b"new");
    }

    #[test]
    fn test_missing_source_writes_and_deletes_nothing() {
        let dir = TempDir::new().unwrap();
        let absent = task(&dir, "main.js", "main.js", transform::MINIFY_JS);
        let kept = task(&dir, "favicon.png", "favicon.png", transform::COPY);
        write_at(&kept.destination, b"old favicon", JAN_1);
        let never = task(&dir, "index.html", "index.html", transform::COPY);

        let registry = builtins();
        let report = Orchestrator::new(&registry).force(true).run(vec![
            absent.clone(),
            kept.clone(),
            never.clone(),
        ]);

        assert!(report.tasks.iter().all(|r| matches!(r.outcome, Outcome::MissingSource)));
        assert!(!absent.destination.exists());
        assert_eq!(fs::read(&kept.destination).unwrap(), b"old favicon");
        assert!(!never.destination.exists());
    }

    #[test]
    fn test_chain_applies_in_order() {
        let dir = TempDir::new().unwrap();
        let mut t = task(&dir, "main.js", "main.js.gz", transform::MINIFY_JS);
        t.transform = serde_json::from_str(r#"["minify-js", "gzip"]"#).unwrap();
        write_at(&t.source, MAIN_JS, JAN_1);

        let registry = builtins();
        Orchestrator::new(&registry).run(vec![t.clone()]);

        let mut plain = Vec::new();
        let written = fs::read(&t.destination).unwrap();
        std::io::Read::read_to_end(&mut flate2::read::GzDecoder::new(written.as_slice()), &mut plain)
            .unwrap();
        assert_eq!(plain, transform::minify::minify_js(MAIN_JS).unwrap());
    }

    #[test]
    fn test_failure_continues_and_keeps_old_output() {
        let dir = TempDir::new().unwrap();
        let bad = task(&dir, "main.js", "main.js", "broken");
        write_at(&bad.source, MAIN_JS, JAN_2);
        write_at(&bad.destination, b"last good build", JAN_1);
        let good = task(&dir, "favicon.png", "favicon.png", transform::COPY);
        write_at(&good.source, b"png", JAN_1);

        let registry = failing();
        let report = Orchestrator::new(&registry).run(vec![bad.clone(), good.clone()]);

        assert_eq!(report.tasks.len(), 2);
        match &report.tasks[0].outcome {
            Outcome::Failed(TaskError::Transform { id, .. }) => assert_eq!(id, "broken"),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(matches!(report.tasks[1].outcome, Outcome::Created));
        assert_eq!(fs::read(&bad.destination).unwrap(), b"last good build");
        assert_eq!(fs::read(&good.destination).unwrap(), b"png");
        assert!(report.has_failures());
    }

    #[test]
    fn test_failure_aborts_under_abort_policy() {
        let dir = TempDir::new().unwrap();
        let bad = task(&dir, "main.js", "main.js", "broken");
        write_at(&bad.source, MAIN_JS, JAN_1);
        let good = task(&dir, "favicon.png", "favicon.png", transform::COPY);
        write_at(&good.source, b"png", JAN_1);

        let registry = failing();
        let report = Orchestrator::new(&registry)
            .policy(FailurePolicy::Abort)
            .run(vec![bad, good.clone()]);

        assert_eq!(report.tasks.len(), 1);
        assert!(report.tasks[0].outcome.is_failure());
        assert!(!good.destination.exists());
    }

    #[test]
    fn test_unknown_transform_fails_task() {
        let dir = TempDir::new().unwrap();
        let t = task(&dir, "app.ts", "app.js", "tsc");
        write_at(&t.source, b"let x: number = 1;", JAN_1);

        let registry = builtins();
        let report = Orchestrator::new(&registry).run(vec![t.clone()]);

        assert!(matches!(
            &report.tasks[0].outcome,
            Outcome::Failed(TaskError::UnknownTransform(id)) if id == "tsc"
        ));
        assert!(!t.destination.exists());
    }

    #[test]
    fn test_unknown_transform_fails_even_when_up_to_date_or_missing() {
        let dir = TempDir::new().unwrap();
        let fresh = task(&dir, "app.ts", "app.js", "tsc");
        write_at(&fresh.source, b"let x = 1;", JAN_1);
        write_at(&fresh.destination, b"old", JAN_2);
        let absent = task(&dir, "lib.ts", "lib.js", "tsc");

        let registry = builtins();
        let report = Orchestrator::new(&registry).run(vec![fresh.clone(), absent]);

        assert!(report.tasks.iter().all(|r| matches!(
            &r.outcome,
            Outcome::Failed(TaskError::UnknownTransform(_))
        )));
        assert_eq!(fs::read(&fresh.destination).unwrap(), b"old");
    }

    #[test]
    fn test_report_order_matches_manifest() {
        let dir = TempDir::new().unwrap();
        let names = ["c.txt", "a.txt", "b.txt"];
        let tasks: Vec<_> = names
            .iter()
            .map(|n| task(&dir, n, n, transform::COPY))
            .collect();
        write_at(&tasks[1].source, b"a", JAN_1);

        let registry = builtins();
        let report = Orchestrator::new(&registry).run(tasks.clone());

        let order: Vec<_> = report.tasks.iter().map(|r| r.task.source.clone()).collect();
        let expected: Vec<_> = tasks.iter().map(|t| t.source.clone()).collect();
        assert_eq!(order, expected);
    }

    #[test]
    fn test_write_atomic_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("www/locale/fr.json");
        write_atomic(&path, b"{}").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"{}");
    }

    #[cfg(unix)]
    #[test]
    fn test_write_atomic_uses_public_mode() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.html");
        write_atomic(&path, b"<p>").unwrap();
        assert_eq!(path.metadata().unwrap().permissions().mode() & 0o777, 0o644);
    }

    #[test]
    fn test_publish_site_skips_authoring_locale() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        let www = dir.path().join("www");
        write_at(&src.join("locale/en.json"), br#"{"title": "Pitch Circles"}"#, JAN_2);
        write_at(&src.join("locale/fr.json"), br#"{"title": "Cercles"}"#, JAN_2);
        write_at(&www.join("locale/en.json"), b"{}", JAN_1);

        let mut config = PublishConfig::default();
        config.build.source = src.clone();
        config.build.output = www.clone();
        config.tasks = vec![TaskEntry::dir("locale", "locale", TransformChain::one("copy"), "json")];

        let report = publish_site(&config, &builtins()).unwrap();

        assert_eq!(report.tasks.len(), 1);
        assert!(matches!(report.tasks[0].outcome, Outcome::Created));
        assert_eq!(fs::read(www.join("locale/fr.json")).unwrap(), br#"{"title": "Cercles"}"#);
        assert_eq!(fs::read(www.join("locale/en.json")).unwrap(), b"{}");
    }

    #[test]
    fn test_publish_site_clean_rebuilds_everything() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        let www = dir.path().join("www");
        write_at(&src.join("favicon.png"), b"png", JAN_1);
        write_at(&www.join("favicon.png"), b"png", JAN_2);
        write_at(&www.join("leftover.txt"), b"x", JAN_2);

        let mut config = PublishConfig::default();
        config.build.source = src;
        config.build.output = www.clone();
        config.build.clean = true;
        config.tasks = vec![TaskEntry::file("favicon.png", "favicon.png", TransformChain::one("copy"))];

        let report = publish_site(&config, &builtins()).unwrap();

        assert!(matches!(report.tasks[0].outcome, Outcome::Created));
        assert!(!www.join("leftover.txt").exists());
    }

    #[test]
    fn test_publish_site_refuses_to_clean_source_parent() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        write_at(&src.join("main.js"), MAIN_JS, JAN_1);
        fs::write(dir.path().join("publish.toml"), "").unwrap();

        let mut config = PublishConfig::default();
        config.build.source = src.clone();
        config.build.output = dir.path().to_path_buf();
        config.build.clean = true;

        assert!(publish_site(&config, &builtins()).is_err());
        assert!(src.join("main.js").exists());
        assert!(dir.path().join("publish.toml").exists());
    }
}
