//! Graphite adapter using the render HTTP API.
//!
//! Every metric in the configured catalog becomes one render URL that
//! returns a PNG. Hosts are selected with one `target=` parameter per host
//! glob, so a graph overlays every host taking part in the run.
//!
//! ## Example
//!
//! ```rust
//! use pcpgraph_adapters::graphite::GraphiteAdapter;
//! use pcpgraph_adapters::QueryBuilder;
//! use pcpgraph_types::{HostSet, Metric, TimeWindow};
//!
//! let graphite = GraphiteAdapter::builder()
//!     .pcp_host("http://pcp.example.com")
//!     .build();
//!
//! let hosts = HostSet::new(["smithi001", "smithi002"]).unwrap();
//! let window = TimeWindow::opened_at(1000);
//! let url = graphite
//!     .build_url(Some(&Metric::from("mem.util.free")), &window, &hosts)
//!     .unwrap();
//!
//! assert!(url.contains("&until=now&"));
//! ```

use pcpgraph_types::{CatalogVersion, HostSet, Metric, TimeEncoding, TimeWindow};

use crate::query::{check_inputs, join_endpoint};
use crate::{AdapterError, QueryBuilder};

/// Path of the render API relative to the PCP host.
pub const ENDPOINT: &str = "/graphite/render";

/// Render parameters applied to every graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphiteOptions {
    /// Image width in pixels (default: 1200).
    pub width: u32,
    /// Image height in pixels (default: 300).
    pub height: u32,
    /// Hide the legend (default: false).
    pub hide_legend: bool,
    /// Output format (default: "png").
    pub format: String,
}

impl Default for GraphiteOptions {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 300,
            hide_legend: false,
            format: "png".to_string(),
        }
    }
}

/// Builds Graphite render URLs.
#[derive(Debug, Clone)]
pub struct GraphiteAdapter {
    base_url: String,
    options: GraphiteOptions,
    catalog: CatalogVersion,
    metrics: Vec<Metric>,
}

impl GraphiteAdapter {
    /// Create a new builder for configuring the adapter.
    pub fn builder() -> GraphiteAdapterBuilder {
        GraphiteAdapterBuilder::default()
    }

    /// Render endpoint URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Render parameters in use.
    pub fn options(&self) -> &GraphiteOptions {
        &self.options
    }

    /// Catalog version in use.
    pub fn catalog(&self) -> CatalogVersion {
        self.catalog
    }
}

impl QueryBuilder for GraphiteAdapter {
    fn name(&self) -> &'static str {
        "graphite"
    }

    fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    fn persists_artifacts(&self) -> bool {
        true
    }

    fn build_url(
        &self,
        metric: Option<&Metric>,
        window: &TimeWindow,
        hosts: &HostSet,
    ) -> Result<String, AdapterError> {
        check_inputs(window, hosts)?;
        let times = window.format(TimeEncoding::Graphite)?;

        let mut query = url::form_urlencoded::Serializer::new(String::new());
        query
            .append_pair("width", &self.options.width.to_string())
            .append_pair("height", &self.options.height.to_string())
            .append_pair("hideLegend", bool_str(self.options.hide_legend))
            .append_pair("format", &self.options.format)
            .append_pair("from", &times.from)
            .append_pair("until", times.until.as_deref().unwrap_or("now"));

        // One parameter per host glob; Graphite overlays them
        for target in hosts.globs(metric.map(Metric::name)) {
            query.append_pair("target", &target);
        }

        Ok(format!("{}?{}", self.base_url, query.finish()))
    }
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Builder for GraphiteAdapter.
#[derive(Debug, Default)]
pub struct GraphiteAdapterBuilder {
    pcp_host: Option<String>,
    options: Option<GraphiteOptions>,
    catalog: Option<CatalogVersion>,
}

impl GraphiteAdapterBuilder {
    /// Set the PCP host serving Graphite (e.g., "http://pcp.example.com").
    pub fn pcp_host(mut self, pcp_host: impl Into<String>) -> Self {
        self.pcp_host = Some(pcp_host.into());
        self
    }

    /// Set the render parameters (default: [`GraphiteOptions::default`]).
    pub fn options(mut self, options: GraphiteOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Set the metric catalog version (default: latest).
    pub fn catalog(mut self, catalog: CatalogVersion) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Build the adapter.
    pub fn build(self) -> GraphiteAdapter {
        let catalog = self.catalog.unwrap_or_default();
        let pcp_host = self
            .pcp_host
            .unwrap_or_else(|| "http://localhost".to_string());

        GraphiteAdapter {
            base_url: join_endpoint(&pcp_host, ENDPOINT),
            options: self.options.unwrap_or_default(),
            catalog,
            metrics: catalog.metrics(),
        }
    }
}
