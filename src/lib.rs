//! # pcpgraph
//!
//! Records Performance Co-Pilot graphs for the time window of a test run.
//!
//! When a run starts, pcpgraph builds Graphite render URLs for a fixed
//! catalog of metrics across the run's hosts, plus a Grafana dashboard link,
//! and writes a report embedding the live graphs. When the run ends it
//! closes the window, downloads each graph, rewrites the report to point at
//! the saved images and, optionally, extracts each host's raw PCP archive
//! for the same window.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       RunController                          │
//! │   Idle ──begin──▶ Running ──end──▶ Finished                  │
//! │     │                                                        │
//! │     ├──▶ Backend (Graphite | Grafana) ──▶ GraphCollection    │
//! │     ├──▶ Fetch (HttpFetcher) ──▶ <out_dir>/<metric>.png      │
//! │     ├──▶ ReportRenderer ──▶ <out_dir>/pcp.html               │
//! │     └──▶ ArchiveExtractor ──▶ CommandRunner (ssh)            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`controller`]**: the run state machine
//! - **[`collection`]**: per-metric URLs and downloaded artifacts
//! - **[`report`]**: HTML rendering, live or final
//! - **[`config`]**: settings from file and environment
//! - **[`runner`]**: commands on remote hosts
//! - **[`storage`]**: atomic file writes
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Record graphs while a command runs
//! pcpgraph run --hosts smithi001,smithi002 --pcp-host http://pcp.example.com \
//!     --archive /tmp/run-1 -- ./run-workload.sh
//!
//! # Record graphs for a window that already happened
//! pcpgraph report --hosts smithi001,smithi002 --pcp-host http://pcp.example.com \
//!     --from 1453290806 --until 1453294406 --archive /tmp/run-1
//! ```
//!
//! ### As a library
//!
//! ```
//! use pcpgraph::{RunController, Settings};
//! use pcpgraph_adapters::AdapterError;
//! use pcpgraph_types::HostSet;
//!
//! let settings = Settings {
//!     pcp_host: Some("http://pcp.example.com".to_string()),
//!     ..Settings::default()
//! };
//!
//! let hosts = HostSet::new(["smithi001", "smithi002"]).unwrap();
//! let fetcher = |_url: &str| -> Result<Vec<u8>, AdapterError> { Ok(Vec::new()) };
//! let runner = |_host: &str, _argv: &[String]| -> anyhow::Result<()> { Ok(()) };
//!
//! let mut run = RunController::new(hosts, fetcher, runner)
//!     .with_backends(settings.backends().unwrap());
//! run.begin_at(1000).unwrap();
//! run.end_at(2000).unwrap();
//!
//! assert_eq!(run.graphs().len(), 6);
//! assert!(run.dashboard_url().is_some());
//! ```

pub mod collection;
pub mod config;
pub mod controller;
pub mod report;
pub mod runner;
pub mod storage;

// Re-export main types for convenience
pub use collection::{FetchSummary, GraphCollection};
pub use config::Settings;
pub use controller::{Phase, RunController};
pub use report::{ReportRenderer, REPORT_FILE_NAME};
pub use runner::{CommandRunner, SshRunner};
