//! Metric names and the fixed catalogs graphed for every run.

use core::fmt;

/// A PCP metric name, e.g. `mem.util.free` or `network.interface.*.bytes.*`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Metric(String);

impl Metric {
    /// Wrap a metric name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The canonical dotted name.
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Name usable as a file stem: spaces become `_`, wildcards `_all_`.
    ///
    /// Sanitizing an already sanitized name is a no-op.
    pub fn sanitized(&self) -> String {
        self.0.replace(' ', "_").replace('*', "_all_")
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Metric {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl AsRef<str> for Metric {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

const LOAD: &str = "kernel.all.load.1 minute";
const MEM_FREE: &str = "mem.util.free";
const MEM_USED: &str = "mem.util.used";
const NET_BYTES: &str = "network.interface.*.bytes.*";
const DISK_READ: &str = "disk.all.read_bytes";
const DISK_WRITE: &str = "disk.all.write_bytes";

const CATALOG_V1: &[&str] = &[LOAD, MEM_FREE, NET_BYTES, DISK_READ, DISK_WRITE];
const CATALOG_V2: &[&str] = &[LOAD, MEM_FREE, MEM_USED, NET_BYTES, DISK_READ, DISK_WRITE];

/// Which revision of the graphed metric list to use.
///
/// The list has changed over time; runs pin a version rather than relying
/// on whatever the newest list happens to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CatalogVersion {
    /// Load, free memory, network bytes, disk read/write bytes.
    V1,
    /// V1 plus used memory.
    #[default]
    V2,
}

impl CatalogVersion {
    /// All known versions, oldest first.
    pub const ALL: [CatalogVersion; 2] = [CatalogVersion::V1, CatalogVersion::V2];

    /// Metric names in this version, in report order.
    pub fn names(&self) -> &'static [&'static str] {
        match self {
            CatalogVersion::V1 => CATALOG_V1,
            CatalogVersion::V2 => CATALOG_V2,
        }
    }

    /// Metrics in this version, in report order.
    pub fn metrics(&self) -> Vec<Metric> {
        self.names().iter().copied().map(Metric::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sanitize() {
        assert_eq!(
            Metric::new("kernel.all.load.1 minute").sanitized(),
            "kernel.all.load.1_minute"
        );
        assert_eq!(
            Metric::new("network.interface.*.bytes.*").sanitized(),
            "network.interface._all_.bytes._all_"
        );
        assert_eq!(Metric::new("mem.util.free").sanitized(), "mem.util.free");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        for version in CatalogVersion::ALL {
            for metric in version.metrics() {
                let once = metric.sanitized();
                assert_eq!(Metric::new(once.clone()).sanitized(), once);
            }
        }
    }

    #[test]
    fn test_sanitized_catalog_names_are_distinct() {
        for version in CatalogVersion::ALL {
            let metrics = version.metrics();
            let sanitized: HashSet<String> = metrics.iter().map(Metric::sanitized).collect();
            assert_eq!(sanitized.len(), metrics.len(), "{:?}", version);
        }
    }

    #[test]
    fn test_catalog_versions() {
        assert_eq!(CatalogVersion::default(), CatalogVersion::V2);
        assert!(!CatalogVersion::V1.names().contains(&"mem.util.used"));
        assert!(CatalogVersion::V2.names().contains(&"mem.util.used"));
        assert_eq!(CatalogVersion::V2.names().len(), 6);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_catalog_version_serde_names() {
        let parsed: CatalogVersion = serde_json::from_str("\"v1\"").unwrap();
        assert_eq!(parsed, CatalogVersion::V1);
        assert_eq!(serde_json::to_string(&CatalogVersion::V2).unwrap(), "\"v2\"");
    }
}
