//! Grafana adapter using the scripted PCP dashboard.
//!
//! Grafana graphs every metric on one dashboard, so a run gets a single URL
//! rather than one per metric. Nothing is downloaded from it; the link is
//! meant to be opened in a browser.

use pcpgraph_types::{HostSet, Metric, TimeEncoding, TimeWindow};

use crate::query::{check_inputs, encode, join_endpoint};
use crate::{AdapterError, QueryBuilder};

/// Path of the scripted dashboard relative to the PCP host.
pub const ENDPOINT: &str = "/grafana/index.html#/dashboard/script/index.js";

/// Builds Grafana dashboard URLs.
#[derive(Debug, Clone)]
pub struct GrafanaAdapter {
    base_url: String,
}

impl GrafanaAdapter {
    /// Create an adapter for the dashboard served by `pcp_host`.
    pub fn new(pcp_host: &str) -> Self {
        Self {
            base_url: join_endpoint(pcp_host, ENDPOINT),
        }
    }

    /// Dashboard URL without arguments.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Dashboard URL for a window and host set.
    pub fn dashboard_url(
        &self,
        window: &TimeWindow,
        hosts: &HostSet,
    ) -> Result<String, AdapterError> {
        check_inputs(window, hosts)?;
        let times = window.format(TimeEncoding::Grafana)?;

        // The dashboard script splits `hosts` on commas, so those stay literal.
        let hosts = hosts.iter().map(encode).collect::<Vec<_>>().join(",");
        let mut url = format!(
            "{}?hosts={}&time_from={}",
            self.base_url,
            hosts,
            encode(&times.from)
        );
        if let Some(until) = times.until {
            url.push_str("&time_to=");
            url.push_str(&encode(&until));
        }

        Ok(url)
    }
}

impl QueryBuilder for GrafanaAdapter {
    fn name(&self) -> &'static str {
        "grafana"
    }

    fn metrics(&self) -> &[Metric] {
        &[]
    }

    fn persists_artifacts(&self) -> bool {
        false
    }

    fn build_url(
        &self,
        _metric: Option<&Metric>,
        window: &TimeWindow,
        hosts: &HostSet,
    ) -> Result<String, AdapterError> {
        self.dashboard_url(window, hosts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcpgraph_types::Error;

    fn hosts() -> HostSet {
        HostSet::new(["smithi001", "smithi002"]).unwrap()
    }

    #[test]
    fn test_closed_window_url() {
        let grafana = GrafanaAdapter::new("http://pcp.example.com");
        let mut window = TimeWindow::opened_at(1000);
        window.close(2000).unwrap();

        let url = grafana.dashboard_url(&window, &hosts()).unwrap();
        assert_eq!(
            url,
            "http://pcp.example.com/grafana/index.html#/dashboard/script/index.js\
             ?hosts=smithi001,smithi002\
             &time_from=1970-01-01T00%3A16%3A40\
             &time_to=1970-01-01T00%3A33%3A20"
        );
    }

    #[test]
    fn test_open_window_omits_time_to() {
        let grafana = GrafanaAdapter::new("http://pcp.example.com");
        let url = grafana
            .dashboard_url(&TimeWindow::opened_at(1000), &hosts())
            .unwrap();
        assert!(url.contains("time_from="));
        assert!(!url.contains("time_to"));
    }

    #[test]
    fn test_metric_is_ignored() {
        let grafana = GrafanaAdapter::new("http://pcp.example.com");
        let window = TimeWindow::opened_at(1000);
        let with_metric = grafana
            .build_url(Some(&Metric::from("mem.util.free")), &window, &hosts())
            .unwrap();
        let without = grafana.build_url(None, &window, &hosts()).unwrap();

        assert_eq!(with_metric, without);
        assert!(grafana.metrics().is_empty());
        assert!(!grafana.persists_artifacts());
    }

    #[test]
    fn test_empty_hosts_rejected() {
        let grafana = GrafanaAdapter::new("http://pcp.example.com");
        let err = grafana
            .dashboard_url(&TimeWindow::opened_at(1000), &HostSet::default())
            .unwrap_err();
        assert!(matches!(err, AdapterError::State(Error::Precondition(_))));
    }
}
