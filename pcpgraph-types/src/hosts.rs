//! Host set - the machines taking part in a run.

use crate::Error;

/// Characters that would change the meaning of a glob or a query string.
const RESERVED: &[char] = &['*', '?', '[', ']', '{', '}', ',', '/', '#', '&', '='];

/// Ordered set of short host names.
///
/// Order is the order hosts were supplied in, so every query built from a
/// set is deterministic. Duplicates are dropped, keeping the first one.
///
/// # Example
///
/// ```rust
/// use pcpgraph_types::HostSet;
///
/// let hosts = HostSet::new(["smithi001", "smithi002"]).unwrap();
/// assert_eq!(
///     hosts.globs(Some("mem.util.free")),
///     vec!["*smithi001*.mem.util.free", "*smithi002*.mem.util.free"]
/// );
/// assert_eq!(hosts.joined(","), "smithi001,smithi002");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct HostSet {
    hosts: Vec<String>,
}

impl HostSet {
    /// Build a host set, rejecting names that cannot be globbed safely or
    /// that ssh or a path join would misread (`-opt`, `.`, `..`).
    pub fn new<I, S>(hosts: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for host in hosts {
            let host = host.as_ref();
            if host.is_empty()
                || host.starts_with('-')
                || host == "."
                || host == ".."
                || host.chars().any(|c| c.is_whitespace() || RESERVED.contains(&c))
            {
                return Err(Error::InvalidHost(host.to_string()));
            }
            if !set.hosts.iter().any(|h| h == host) {
                set.hosts.push(host.to_string());
            }
        }
        Ok(set)
    }

    /// One `*host*` glob per host, with `.metric` appended when given.
    pub fn globs(&self, metric: Option<&str>) -> Vec<String> {
        self.hosts
            .iter()
            .map(|host| match metric {
                Some(metric) if !metric.is_empty() => format!("*{}*.{}", host, metric),
                _ => format!("*{}*", host),
            })
            .collect()
    }

    /// Host names joined into a single string.
    pub fn joined(&self, separator: &str) -> String {
        self.hosts.join(separator)
    }

    /// Fail with a precondition error when there is nothing to query.
    pub fn require_non_empty(&self) -> Result<(), Error> {
        if self.hosts.is_empty() {
            Err(Error::Precondition("host set is empty".to_string()))
        } else {
            Ok(())
        }
    }

    /// Iterate over host names in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.hosts.iter().map(String::as_str)
    }

    /// Number of hosts.
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    /// True when no hosts were supplied.
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_globs_without_metric() {
        let hosts = HostSet::new(["b", "a"]).unwrap();
        assert_eq!(hosts.globs(None), vec!["*b*", "*a*"]);
        assert_eq!(hosts.globs(Some("")), vec!["*b*", "*a*"]);
    }

    #[test]
    fn test_globs_keep_metric_wildcards() {
        let hosts = HostSet::new(["smithi001"]).unwrap();
        assert_eq!(
            hosts.globs(Some("network.interface.*.bytes.*")),
            vec!["*smithi001*.network.interface.*.bytes.*"]
        );
    }

    #[test]
    fn test_one_glob_per_host_in_order() {
        let names: Vec<String> = (0..20).map(|i| format!("host{:02}", 19 - i)).collect();
        let hosts = HostSet::new(&names).unwrap();
        let globs = hosts.globs(Some("mem.util.free"));

        assert_eq!(globs.len(), names.len());
        for (glob, name) in globs.iter().zip(&names) {
            assert_eq!(glob, &format!("*{}*.mem.util.free", name));
        }
    }

    #[test]
    fn test_duplicates_dropped() {
        let hosts = HostSet::new(["a", "b", "a"]).unwrap();
        assert_eq!(hosts.len(), 2);
        assert_eq!(hosts.joined(" "), "a b");
    }

    #[test]
    fn test_reserved_characters_rejected() {
        for bad in ["", "smi*thi", "a,b", "host name", "x/y", "q?", "-Fevil", "-", ".", ".."] {
            assert_eq!(
                HostSet::new([bad]),
                Err(Error::InvalidHost(bad.to_string())),
                "{:?}",
                bad
            );
        }
    }

    #[test]
    fn test_empty_set_is_a_precondition_failure() {
        let hosts = HostSet::new(Vec::<String>::new()).unwrap();
        assert!(hosts.is_empty());
        assert!(matches!(
            hosts.require_non_empty(),
            Err(Error::Precondition(_))
        ));
    }
}
