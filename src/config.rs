//! Recorder settings.
//!
//! Settings come from an optional config file followed by environment
//! variables prefixed with `PCPGRAPH_`, so either can be used on its own:
//!
//! ```toml
//! pcp_host = "http://pcp.front.sepia.ceph.com"
//! grafana = false
//! catalog = "v1"
//! ```
//!
//! ```bash
//! PCPGRAPH_PCP_HOST=http://pcp.example.com PCPGRAPH_FETCH_ARCHIVES=false pcpgraph ...
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use pcpgraph_adapters::archive::{ArchiveExtractor, DEFAULT_ARCHIVE_BASE_PATH};
use pcpgraph_adapters::grafana::GrafanaAdapter;
use pcpgraph_adapters::graphite::{GraphiteAdapter, GraphiteOptions};
use pcpgraph_adapters::Backend;
use pcpgraph_types::CatalogVersion;
use serde::Deserialize;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "PCPGRAPH";

/// Everything configurable about a recording.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the host serving Graphite and Grafana.
    pub pcp_host: Option<String>,
    /// Record Graphite graphs.
    pub graphite: bool,
    /// Link the Grafana dashboard.
    pub grafana: bool,
    /// Extract each host's PCP archive when the run ends.
    pub fetch_archives: bool,
    /// Graphite metric list revision.
    pub catalog: CatalogVersion,
    /// Per-graph download timeout.
    pub fetch_timeout_secs: u64,
    /// Where pmlogger archives live on each host.
    pub archive_base_path: PathBuf,
    /// Where extracted archives are written on each host.
    pub archive_output_dir: PathBuf,
    pub graph_width: u32,
    pub graph_height: u32,
    pub hide_legend: bool,
    pub graph_format: String,
}

impl Default for Settings {
    fn default() -> Self {
        let graph = GraphiteOptions::default();
        Self {
            pcp_host: None,
            graphite: true,
            grafana: true,
            fetch_archives: true,
            catalog: CatalogVersion::default(),
            fetch_timeout_secs: 60,
            archive_base_path: PathBuf::from(DEFAULT_ARCHIVE_BASE_PATH),
            archive_output_dir: PathBuf::from("/tmp/pcp_archive"),
            graph_width: graph.width,
            graph_height: graph.height,
            hide_legend: graph.hide_legend,
            graph_format: graph.format,
        }
    }
}

impl Settings {
    /// Load settings from an optional file, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let config = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .context("Failed to load settings")?;

        config
            .try_deserialize()
            .context("Failed to parse settings")
    }

    /// Render parameters for Graphite graphs.
    pub fn graphite_options(&self) -> GraphiteOptions {
        GraphiteOptions {
            width: self.graph_width,
            height: self.graph_height,
            hide_legend: self.hide_legend,
            format: self.graph_format.clone(),
        }
    }

    /// Download timeout for each graph.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// The enabled backends, Graphite first.
    pub fn backends(&self) -> Result<Vec<Backend>> {
        let mut backends = Vec::new();
        if !self.graphite && !self.grafana {
            return Ok(backends);
        }

        let pcp_host = self
            .pcp_host
            .as_deref()
            .filter(|host| !host.is_empty())
            .context("pcp_host must be set when graphite or grafana is enabled")?;

        if self.graphite {
            backends.push(Backend::Graphite(
                GraphiteAdapter::builder()
                    .pcp_host(pcp_host)
                    .catalog(self.catalog)
                    .options(self.graphite_options())
                    .build(),
            ));
        }
        if self.grafana {
            backends.push(Backend::Grafana(GrafanaAdapter::new(pcp_host)));
        }
        Ok(backends)
    }

    /// The archive extractor, when archive fetching is enabled.
    pub fn archive_extractor(&self) -> Option<ArchiveExtractor> {
        self.fetch_archives
            .then(|| ArchiveExtractor::with_base_path(&self.archive_base_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcpgraph_adapters::QueryBuilder;
    use std::io::Write;

    fn toml_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.graphite);
        assert!(settings.grafana);
        assert!(settings.fetch_archives);
        assert_eq!(settings.catalog, CatalogVersion::V2);
        assert_eq!(settings.fetch_timeout(), Duration::from_secs(60));
        assert_eq!(settings.graphite_options(), GraphiteOptions::default());
    }

    #[test]
    fn test_load_from_file() {
        let file = toml_file(
            r#"
            pcp_host = "http://pcp.example.com"
            grafana = false
            fetch_archives = false
            catalog = "v1"
            graph_width = 800
            "#,
        );

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.pcp_host.as_deref(), Some("http://pcp.example.com"));
        assert!(settings.graphite);
        assert!(!settings.grafana);
        assert!(!settings.fetch_archives);
        assert_eq!(settings.catalog, CatalogVersion::V1);
        assert_eq!(settings.graph_width, 800);
        assert_eq!(settings.graph_height, 300);
        assert!(settings.archive_extractor().is_none());
    }

    #[test]
    fn test_backends_follow_flags() {
        let settings = Settings {
            pcp_host: Some("http://pcp.example.com".to_string()),
            ..Settings::default()
        };
        let backends = settings.backends().unwrap();
        let names: Vec<_> = backends.iter().map(|b| b.name()).collect();
        assert_eq!(names, vec!["graphite", "grafana"]);

        let graphite_only = Settings {
            grafana: false,
            ..settings.clone()
        };
        assert_eq!(graphite_only.backends().unwrap().len(), 1);

        let none = Settings {
            graphite: false,
            grafana: false,
            pcp_host: None,
            ..settings
        };
        assert!(none.backends().unwrap().is_empty());
    }

    #[test]
    fn test_backends_need_pcp_host() {
        let settings = Settings::default();
        assert!(settings.backends().is_err());
    }

    #[test]
    fn test_archive_extractor_uses_base_path() {
        let settings = Settings {
            archive_base_path: PathBuf::from("/srv/pcp"),
            ..Settings::default()
        };
        let extractor = settings.archive_extractor().unwrap();
        assert_eq!(extractor.input_glob("smithi001"), "/srv/pcp/smithi001/*.0");
    }
}
