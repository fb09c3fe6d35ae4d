//! The query builder interface shared by every graphing backend.

use pcpgraph_types::{Error, HostSet, Metric, TimeWindow};

use crate::AdapterError;

#[cfg(feature = "grafana")]
use crate::grafana::GrafanaAdapter;
#[cfg(feature = "graphite")]
use crate::graphite::GraphiteAdapter;

/// Turns a window, host set and metric into a backend URL.
pub trait QueryBuilder {
    /// Backend name, used in logs.
    fn name(&self) -> &'static str;

    /// Metrics graphed individually. Empty for dashboard backends.
    fn metrics(&self) -> &[Metric];

    /// Whether graphs from this backend are downloaded when a run ends.
    fn persists_artifacts(&self) -> bool;

    /// Build the query URL.
    ///
    /// Fails with a precondition error when the window has not been opened
    /// or the host set is empty.
    fn build_url(
        &self,
        metric: Option<&Metric>,
        window: &TimeWindow,
        hosts: &HostSet,
    ) -> Result<String, AdapterError>;
}

/// A configured backend.
#[derive(Debug, Clone)]
pub enum Backend {
    /// Per-metric PNGs from Graphite's render API.
    #[cfg(feature = "graphite")]
    Graphite(GraphiteAdapter),
    /// One Grafana dashboard covering every metric.
    #[cfg(feature = "grafana")]
    Grafana(GrafanaAdapter),
}

impl Backend {
    fn inner(&self) -> &dyn QueryBuilder {
        match self {
            #[cfg(feature = "graphite")]
            Backend::Graphite(adapter) => adapter,
            #[cfg(feature = "grafana")]
            Backend::Grafana(adapter) => adapter,
        }
    }
}

impl QueryBuilder for Backend {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn metrics(&self) -> &[Metric] {
        self.inner().metrics()
    }

    fn persists_artifacts(&self) -> bool {
        self.inner().persists_artifacts()
    }

    fn build_url(
        &self,
        metric: Option<&Metric>,
        window: &TimeWindow,
        hosts: &HostSet,
    ) -> Result<String, AdapterError> {
        self.inner().build_url(metric, window, hosts)
    }
}

/// Check the inputs every backend needs before building anything.
pub(crate) fn check_inputs(window: &TimeWindow, hosts: &HostSet) -> Result<(), Error> {
    hosts.require_non_empty()?;
    if !window.is_opened() {
        return Err(Error::Precondition(
            "time window has not been opened".to_string(),
        ));
    }
    Ok(())
}

/// `{host}{endpoint}`, tolerating a trailing slash on the host.
pub(crate) fn join_endpoint(pcp_host: &str, endpoint: &str) -> String {
    format!("{}{}", pcp_host.trim_end_matches('/'), endpoint)
}

/// Form-encode a single query value.
pub(crate) fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
