//! The graphs recorded for a run.

use std::path::Path;

use pcpgraph_adapters::{AdapterError, Fetch, QueryBuilder};
use pcpgraph_types::{GraphRecord, HostSet, Metric, TimeWindow};
use tracing::{debug, warn};

use crate::storage::write_atomic;

/// Outcome of a [`GraphCollection::fetch_all`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchSummary {
    /// Graphs downloaded and saved.
    pub fetched: usize,
    /// Graphs whose download or save failed.
    pub failed: usize,
}

/// Query URL and artifact state for each graphed metric, in catalog order.
#[derive(Debug, Clone, Default)]
pub struct GraphCollection {
    records: Vec<GraphRecord>,
}

impl GraphCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)build the URL of every metric in `builder`'s catalog.
    ///
    /// Existing records keep their artifacts, so a rebuild between two
    /// fetch passes loses nothing. If any URL fails to build the collection
    /// is left untouched.
    pub fn rebuild<B>(
        &mut self,
        builder: &B,
        window: &TimeWindow,
        hosts: &HostSet,
    ) -> Result<(), AdapterError>
    where
        B: QueryBuilder + ?Sized,
    {
        let urls = builder
            .metrics()
            .iter()
            .map(|metric| {
                builder
                    .build_url(Some(metric), window, hosts)
                    .map(|url| (metric, url))
            })
            .collect::<Result<Vec<_>, _>>()?;

        for (metric, url) in urls {
            match self.records.iter_mut().find(|r| &r.metric == metric) {
                Some(record) => record.url = url,
                None => self.records.push(GraphRecord::new(metric.clone(), url)),
            }
        }
        Ok(())
    }

    /// Download every graph into `dest_dir` as `<sanitized metric>.png`.
    ///
    /// Failures are recorded on the affected record and logged; they never
    /// stop the remaining downloads.
    pub fn fetch_all<F>(&mut self, fetcher: &F, dest_dir: &Path) -> FetchSummary
    where
        F: Fetch + ?Sized,
    {
        let mut summary = FetchSummary::default();

        for record in &mut self.records {
            let path = dest_dir.join(format!("{}.png", record.metric.sanitized()));

            let result = fetcher
                .fetch(&record.url)
                .map_err(|e| e.to_string())
                .and_then(|bytes| {
                    write_atomic(&path, &bytes)
                        .map_err(|e| format!("failed to save {}: {}", path.display(), e))
                });

            match result {
                Ok(()) => {
                    debug!("Saved graph for {} to {}", record.metric, path.display());
                    record.mark_fetched(path);
                    summary.fetched += 1;
                }
                Err(e) => {
                    warn!("Graph download failed for {}: {} ({})", record.metric, e, record.url);
                    record.mark_failed();
                    summary.failed += 1;
                }
            }
        }

        summary
    }

    /// Records in catalog order.
    pub fn records(&self) -> &[GraphRecord] {
        &self.records
    }

    /// The record for one metric.
    pub fn get(&self, metric: &Metric) -> Option<&GraphRecord> {
        self.records.iter().find(|r| &r.metric == metric)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
