//! Per-metric graph state and report modes.

use std::path::{Path, PathBuf};

use crate::Metric;

/// The query URL and downloaded artifact for one metric.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphRecord {
    /// Metric this graph shows.
    pub metric: Metric,

    /// Query URL for the current window.
    pub url: String,

    /// Where the rendered image was saved, after a successful fetch.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub artifact_path: Option<PathBuf>,

    /// Set when the last fetch attempt failed.
    #[cfg_attr(feature = "serde", serde(default))]
    pub fetch_failed: bool,
}

impl GraphRecord {
    /// A record that has a URL but has never been fetched.
    pub fn new(metric: Metric, url: impl Into<String>) -> Self {
        Self {
            metric,
            url: url.into(),
            artifact_path: None,
            fetch_failed: false,
        }
    }

    /// Record a successful fetch.
    pub fn mark_fetched(&mut self, path: impl Into<PathBuf>) {
        self.artifact_path = Some(path.into());
        self.fetch_failed = false;
    }

    /// Record a failed fetch. Any earlier artifact is forgotten.
    pub fn mark_failed(&mut self) {
        self.artifact_path = None;
        self.fetch_failed = true;
    }

    /// The saved artifact, if the last fetch succeeded.
    pub fn artifact(&self) -> Option<&Path> {
        self.artifact_path.as_deref()
    }
}

/// Which flavour of report to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ReportMode {
    /// Run in progress: graphs are live backend queries.
    Live,
    /// Run complete: graphs are the downloaded artifacts.
    Final,
}
