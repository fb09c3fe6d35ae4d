//! Drives one recording from start to finish.
//!
//! A [`RunController`] moves through `Idle -> Running -> Finished`. Starting
//! the run opens the time window and writes a live report; ending it closes
//! the window, downloads the graphs, writes the final report and extracts
//! each host's PCP archive.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use pcpgraph_adapters::{ArchiveExtractor, Backend, Fetch, QueryBuilder};
use pcpgraph_types::{Error, HostSet, ReportMode, TimeWindow};
use tracing::{debug, info, warn};

use crate::collection::GraphCollection;
use crate::report::{ReportRenderer, REPORT_FILE_NAME};
use crate::runner::CommandRunner;
use crate::storage::write_atomic;

/// Where a run is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Not started yet.
    Idle,
    /// Window open, live report written.
    Running,
    /// Window closed, graphs and archives collected.
    Finished,
}

/// Records graphs for one run over a fixed set of hosts.
///
/// Downloads go through `F`; commands on the hosts go through `R`.
pub struct RunController<F, R> {
    hosts: HostSet,
    backends: Vec<Backend>,
    fetcher: F,
    runner: R,
    archives: Option<(ArchiveExtractor, PathBuf)>,
    out_dir: Option<PathBuf>,
    run_id: Option<String>,
    window: TimeWindow,
    graphs: GraphCollection,
    dashboard_url: Option<String>,
    phase: Phase,
}

impl<F, R> RunController<F, R>
where
    F: Fetch,
    R: CommandRunner,
{
    /// An idle controller with no backends, no archives and no output directory.
    pub fn new(hosts: HostSet, fetcher: F, runner: R) -> Self {
        Self {
            hosts,
            backends: Vec::new(),
            fetcher,
            runner,
            archives: None,
            out_dir: None,
            run_id: None,
            window: TimeWindow::new(),
            graphs: GraphCollection::new(),
            dashboard_url: None,
            phase: Phase::Idle,
        }
    }

    /// Backends to query, in order.
    pub fn with_backends(mut self, backends: Vec<Backend>) -> Self {
        self.backends = backends;
        self
    }

    /// Extract archives into `output_dir` on each host when the run ends.
    pub fn with_archives(mut self, extractor: Option<ArchiveExtractor>, output_dir: PathBuf) -> Self {
        self.archives = extractor.map(|extractor| (extractor, output_dir));
        self
    }

    /// Directory receiving the report and downloaded graphs.
    pub fn with_out_dir(mut self, out_dir: Option<PathBuf>) -> Self {
        self.out_dir = out_dir;
        self
    }

    pub fn with_run_id(mut self, run_id: Option<String>) -> Self {
        self.run_id = run_id;
        self
    }

    /// Start the run now.
    pub fn begin(&mut self) -> Result<()> {
        self.begin_at(now()?)
    }

    /// Start the run at `start` (seconds since the epoch).
    pub fn begin_at(&mut self, start: u64) -> Result<()> {
        if self.phase != Phase::Idle {
            return Err(Error::InvalidState("run has already started".to_string()).into());
        }

        let mut window = self.window;
        window.open(start)?;
        debug!("hosts: {}", self.hosts.joined(","));
        debug!("start_time: {}", start);

        let mut graphs = self.graphs.clone();
        let dashboard_url = self.build_queries(&mut graphs, &window)?;

        self.window = window;
        self.graphs = graphs;
        self.dashboard_url = dashboard_url;
        self.phase = Phase::Running;

        self.write_report(ReportMode::Live)
    }

    /// End the run now.
    pub fn end(&mut self) -> Result<()> {
        self.end_at(now()?)
    }

    /// End the run at `end` (seconds since the epoch).
    pub fn end_at(&mut self, end: u64) -> Result<()> {
        match self.phase {
            Phase::Idle => {
                return Err(Error::InvalidState("run has not started".to_string()).into())
            }
            Phase::Finished => {
                return Err(Error::InvalidState("run has already ended".to_string()).into())
            }
            Phase::Running => {}
        }

        let mut window = self.window;
        window.close(end)?;
        debug!("stop_time: {}", end);

        let mut graphs = self.graphs.clone();
        let dashboard_url = self.build_queries(&mut graphs, &window)?;

        self.window = window;
        self.graphs = graphs;
        self.dashboard_url = dashboard_url;
        self.phase = Phase::Finished;

        self.download_graphs();
        // Archives are extracted even when the report could not be written
        let report = self.write_report(ReportMode::Final);
        self.extract_archives();
        report
    }

    fn build_queries(
        &self,
        graphs: &mut GraphCollection,
        window: &TimeWindow,
    ) -> Result<Option<String>> {
        let mut dashboard_url = None;

        for backend in &self.backends {
            if backend.metrics().is_empty() {
                let url = backend
                    .build_url(None, window, &self.hosts)
                    .with_context(|| format!("Failed to build {} query", backend.name()))?;
                info!("{} dashboard: {}", backend.name(), url);
                dashboard_url = Some(url);
            } else {
                graphs
                    .rebuild(backend, window, &self.hosts)
                    .with_context(|| format!("Failed to build {} queries", backend.name()))?;
                debug!("Built {} {} queries", backend.metrics().len(), backend.name());
            }
        }

        Ok(dashboard_url)
    }

    fn download_graphs(&mut self) {
        let Some(out_dir) = &self.out_dir else {
            return;
        };
        if !self.backends.iter().any(|b| b.persists_artifacts()) {
            return;
        }

        let summary = self.graphs.fetch_all(&self.fetcher, out_dir);
        info!(
            "Downloaded {} graphs to {} ({} failed)",
            summary.fetched,
            out_dir.display(),
            summary.failed
        );
    }

    fn write_report(&self, mode: ReportMode) -> Result<()> {
        let Some(out_dir) = &self.out_dir else {
            return Ok(());
        };

        let html = ReportRenderer::new()
            .run_id(self.run_id.as_deref())
            .dashboard(self.dashboard_url.as_deref())
            .render(&self.graphs, mode);

        let path = out_dir.join(REPORT_FILE_NAME);
        write_atomic(&path, html.as_bytes())
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!("Wrote {:?} report to {}", mode, path.display());
        Ok(())
    }

    fn extract_archives(&self) {
        let Some((extractor, output_dir)) = &self.archives else {
            return;
        };

        for host in self.hosts.iter() {
            if let Err(e) = self.extract_archive(extractor, output_dir, host) {
                warn!("Archive extraction failed on {}: {:#}", host, e);
            }
        }
    }

    fn extract_archive(&self, extractor: &ArchiveExtractor, output_dir: &Path, host: &str) -> Result<()> {
        let argv = extractor.build_command(host, &self.window, output_dir.join(host))?;

        let mkdir = vec![
            "mkdir".to_string(),
            "-p".to_string(),
            output_dir.display().to_string(),
        ];
        self.runner.run(host, &mkdir)?;

        info!("Extracting archive on {}: {}", host, argv.join(" "));
        self.runner.run(host, &argv)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn window(&self) -> &TimeWindow {
        &self.window
    }

    pub fn graphs(&self) -> &GraphCollection {
        &self.graphs
    }

    /// Dashboard link from the last query build, when a dashboard backend is enabled.
    pub fn dashboard_url(&self) -> Option<&str> {
        self.dashboard_url.as_deref()
    }

    pub fn hosts(&self) -> &HostSet {
        &self.hosts
    }
}

fn now() -> Result<u64> {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("System clock is before the Unix epoch")?;
    Ok(elapsed.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcpgraph_adapters::grafana::GrafanaAdapter;
    use pcpgraph_adapters::graphite::GraphiteAdapter;
    use pcpgraph_adapters::AdapterError;
    use std::cell::RefCell;
    use tempfile::TempDir;

    type FetchFn = fn(&str) -> std::result::Result<Vec<u8>, AdapterError>;
    type RunFn = fn(&str, &[String]) -> Result<()>;

    fn fetch_ok(_url: &str) -> std::result::Result<Vec<u8>, AdapterError> {
        Ok(b"png".to_vec())
    }

    fn run_ok(_host: &str, _argv: &[String]) -> Result<()> {
        Ok(())
    }

    fn hosts() -> HostSet {
        HostSet::new(["smithi001", "smithi002"]).unwrap()
    }

    fn backends() -> Vec<Backend> {
        vec![
            Backend::Graphite(
                GraphiteAdapter::builder()
                    .pcp_host("http://pcp.example.com")
                    .build(),
            ),
            Backend::Grafana(GrafanaAdapter::new("http://pcp.example.com")),
        ]
    }

    fn controller() -> RunController<FetchFn, RunFn> {
        RunController::new(hosts(), fetch_ok as FetchFn, run_ok as RunFn).with_backends(backends())
    }

    fn state_error(err: &anyhow::Error) -> bool {
        matches!(err.downcast_ref::<Error>(), Some(Error::InvalidState(_)))
    }

    #[test]
    fn test_lifecycle() {
        let mut run = controller();
        assert_eq!(run.phase(), Phase::Idle);

        run.begin_at(1000).unwrap();
        assert_eq!(run.phase(), Phase::Running);
        assert!(run.graphs().records().iter().all(|r| r.url.contains("until=now")));
        assert!(!run.dashboard_url().unwrap().contains("time_to"));

        run.end_at(2000).unwrap();
        assert_eq!(run.phase(), Phase::Finished);
        assert_eq!(run.window().end(), Some(2000));
        assert!(run.graphs().records().iter().all(|r| r.url.contains("from=1000&until=2000")));
        assert!(run.dashboard_url().unwrap().contains("time_to="));
    }

    #[test]
    fn test_out_of_order_calls_are_state_errors() {
        let mut run = controller();
        assert!(state_error(&run.end_at(2000).unwrap_err()));

        run.begin_at(1000).unwrap();
        assert!(state_error(&run.begin_at(1500).unwrap_err()));

        run.end_at(2000).unwrap();
        assert!(state_error(&run.end_at(3000).unwrap_err()));
        assert!(state_error(&run.begin_at(3000).unwrap_err()));
    }

    #[test]
    fn test_failed_begin_stays_idle() {
        let mut run = RunController::new(HostSet::default(), fetch_ok as FetchFn, run_ok as RunFn)
            .with_backends(backends());
        assert!(run.begin_at(1000).is_err());
        assert_eq!(run.phase(), Phase::Idle);
        assert!(!run.window().is_opened());
        assert!(run.graphs().is_empty());
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        let mut run = controller();
        run.begin_at(2000).unwrap();
        assert!(run.end_at(1000).is_err());
        assert_eq!(run.phase(), Phase::Running);
    }

    #[test]
    fn test_without_out_dir_nothing_is_fetched() {
        let fetches = RefCell::new(0);
        let fetcher = |_: &str| -> std::result::Result<Vec<u8>, AdapterError> {
            *fetches.borrow_mut() += 1;
            Ok(Vec::new())
        };

        let mut run = RunController::new(hosts(), fetcher, run_ok as RunFn).with_backends(backends());
        run.begin_at(1000).unwrap();
        run.end_at(2000).unwrap();

        assert_eq!(*fetches.borrow(), 0);
        assert!(run.graphs().records().iter().all(|r| r.artifact().is_none()));
    }

    #[test]
    fn test_reports_are_written() {
        let dir = TempDir::new().unwrap();
        let report = dir.path().join(REPORT_FILE_NAME);
        let mut run = controller()
            .with_out_dir(Some(dir.path().to_path_buf()))
            .with_run_id(Some("run-1".to_string()));

        run.begin_at(1000).unwrap();
        let live = std::fs::read_to_string(&report).unwrap();
        assert!(live.contains("graphite/render"));
        assert!(live.contains("run-1"));

        run.end_at(2000).unwrap();
        let html = std::fs::read_to_string(&report).unwrap();
        assert!(html.contains("mem.util.free.png"));
        assert!(!html.contains("graphite/render"));
        assert!(dir.path().join("mem.util.free.png").exists());
    }

    #[test]
    fn test_grafana_only_downloads_nothing() {
        let dir = TempDir::new().unwrap();
        let fetches = RefCell::new(0);
        let fetcher = |_: &str| -> std::result::Result<Vec<u8>, AdapterError> {
            *fetches.borrow_mut() += 1;
            Ok(Vec::new())
        };

        let mut run = RunController::new(hosts(), fetcher, run_ok as RunFn)
            .with_backends(vec![Backend::Grafana(GrafanaAdapter::new("http://pcp.example.com"))])
            .with_out_dir(Some(dir.path().to_path_buf()));
        run.begin_at(1000).unwrap();
        run.end_at(2000).unwrap();

        assert_eq!(*fetches.borrow(), 0);
        assert!(run.graphs().is_empty());
        let html = std::fs::read_to_string(dir.path().join(REPORT_FILE_NAME)).unwrap();
        assert!(html.contains("hosts=smithi001,smithi002"));
    }

    #[test]
    fn test_archives_extracted_per_host() {
        let calls = RefCell::new(Vec::new());
        let runner = |host: &str, argv: &[String]| -> Result<()> {
            calls.borrow_mut().push((host.to_string(), argv.to_vec()));
            Ok(())
        };

        let mut run = RunController::new(hosts(), fetch_ok as FetchFn, runner)
            .with_backends(backends())
            .with_archives(Some(ArchiveExtractor::new()), PathBuf::from("/tmp/pcp_archive"));
        run.begin_at(1000).unwrap();
        assert!(calls.borrow().is_empty());
        run.end_at(2000).unwrap();

        let calls = calls.borrow();
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[0].0, "smithi001");
        assert_eq!(calls[0].1, vec!["mkdir", "-p", "/tmp/pcp_archive"]);
        assert_eq!(calls[1].1[0], "pmlogextract");
        assert_eq!(calls[1].1[5], "/var/log/pcp/pmlogger/smithi001/*.0");
        assert_eq!(calls[1].1[6], "/tmp/pcp_archive/smithi001");
        assert_eq!(calls[3].0, "smithi002");
    }

    #[test]
    fn test_archives_extracted_when_report_write_fails() {
        let dir = TempDir::new().unwrap();
        let out_dir = dir.path().join("pcp_graphs");
        std::fs::create_dir(&out_dir).unwrap();

        let extracted = RefCell::new(Vec::new());
        let runner = |host: &str, argv: &[String]| -> Result<()> {
            if argv[0] == "pmlogextract" {
                extracted.borrow_mut().push(host.to_string());
            }
            Ok(())
        };

        let mut run = RunController::new(hosts(), fetch_ok as FetchFn, runner)
            .with_backends(backends())
            .with_archives(Some(ArchiveExtractor::new()), PathBuf::from("/tmp/pcp_archive"))
            .with_out_dir(Some(out_dir.clone()));
        run.begin_at(1000).unwrap();

        std::fs::remove_dir_all(&out_dir).unwrap();
        let err = run.end_at(2000).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to write report"));

        assert_eq!(run.phase(), Phase::Finished);
        assert_eq!(*extracted.borrow(), vec!["smithi001", "smithi002"]);
    }

    #[test]
    fn test_archive_failures_are_not_fatal() {
        let attempts = RefCell::new(0);
        let runner = |_: &str, _: &[String]| -> Result<()> {
            *attempts.borrow_mut() += 1;
            anyhow::bail!("connection refused")
        };

        let mut run = RunController::new(hosts(), fetch_ok as FetchFn, runner)
            .with_archives(Some(ArchiveExtractor::new()), PathBuf::from("/tmp/pcp_archive"));
        run.begin_at(1000).unwrap();
        run.end_at(2000).unwrap();

        // mkdir fails on each host, so pmlogextract is never attempted
        assert_eq!(*attempts.borrow(), 2);
        assert_eq!(run.phase(), Phase::Finished);
    }

    #[test]
    fn test_begin_uses_clock() {
        let mut run = controller();
        run.begin().unwrap();
        assert!(run.window().start().unwrap() > 1_600_000_000);
    }
}
