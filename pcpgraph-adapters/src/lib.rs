//! # pcpgraph-adapters
//!
//! Query builders for the backends that graph PCP metrics, plus the pieces
//! that touch the outside world: downloading graphs and building archive
//! extraction commands.
//!
//! ## Supported Backends
//!
//! - **Graphite** (`graphite` feature) - one render URL, and one PNG, per
//!   metric in the catalog
//! - **Grafana** (`grafana` feature) - a single scripted dashboard URL
//!   covering every metric
//!
//! Both implement [`QueryBuilder`]; [`Backend`] dispatches between the
//! enabled ones.
//!
//! ## Quick Start
//!
//! ```rust
//! use pcpgraph_adapters::graphite::GraphiteAdapter;
//! use pcpgraph_adapters::{Backend, QueryBuilder};
//! use pcpgraph_types::{HostSet, TimeWindow};
//!
//! let backend = Backend::Graphite(
//!     GraphiteAdapter::builder()
//!         .pcp_host("http://pcp.example.com")
//!         .build(),
//! );
//!
//! let hosts = HostSet::new(["smithi001", "smithi002"]).unwrap();
//! let mut window = TimeWindow::opened_at(1000);
//! window.close(2000).unwrap();
//!
//! for metric in backend.metrics() {
//!     let url = backend.build_url(Some(metric), &window, &hosts).unwrap();
//!     println!("{}: {}", metric, url);
//! }
//! ```

#[cfg(not(any(feature = "graphite", feature = "grafana")))]
compile_error!("enable at least one backend feature: `graphite` or `grafana`");

pub mod archive;
pub mod error;
pub mod fetch;
mod query;

#[cfg(feature = "graphite")]
pub mod graphite;

#[cfg(feature = "grafana")]
pub mod grafana;

pub use archive::ArchiveExtractor;
pub use error::AdapterError;
pub use fetch::{Fetch, HttpFetcher};
pub use query::{Backend, QueryBuilder};

// Re-export types for convenience
pub use pcpgraph_types::{HostSet, Metric, TimeEncoding, TimeWindow};
