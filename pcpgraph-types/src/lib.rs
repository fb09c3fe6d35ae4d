//! # pcpgraph-types
//!
//! Core types for recording PCP graphs over the time window of a test run.
//! Everything here is plain data plus the rules that keep it consistent;
//! building URLs and talking to backends lives in `pcpgraph-adapters`.
//!
//! ## Types
//!
//! - [`TimeWindow`]: start/end epoch pair that is opened once and closed once,
//!   rendered per backend through [`TimeEncoding`]
//! - [`HostSet`]: ordered, de-duplicated host names and the glob selectors
//!   built from them
//! - [`Metric`] and [`CatalogVersion`]: the metric names graphed for a run
//! - [`GraphRecord`]: one metric's query URL and downloaded artifact
//! - [`ReportMode`]: live or final report
//!
//! ## Features
//!
//! - `serde`: serialization of records, catalogs and modes
//!
//! ## Example
//!
//! ```rust
//! use pcpgraph_types::{CatalogVersion, HostSet, TimeEncoding, TimeWindow};
//!
//! let hosts = HostSet::new(["smithi001", "smithi002"]).unwrap();
//! let mut window = TimeWindow::opened_at(1000);
//! window.close(2000).unwrap();
//!
//! let formatted = window.format(TimeEncoding::Graphite).unwrap();
//! assert_eq!(formatted.from, "1000");
//!
//! for metric in CatalogVersion::default().metrics() {
//!     assert_eq!(hosts.globs(Some(metric.name())).len(), 2);
//! }
//! ```

mod error;
mod hosts;
mod metric;
mod record;
mod window;

pub use error::*;
pub use hosts::*;
pub use metric::*;
pub use record::*;
pub use window::*;
