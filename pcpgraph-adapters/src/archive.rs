//! pmlogextract commands that slice raw PCP archives to a run's window.
//!
//! pmlogger writes a continuous archive per host under a fixed directory.
//! Once a run is over, [`ArchiveExtractor`] builds the command that cuts
//! that archive down to the run's window. Running it is left to the caller,
//! since the archive lives on the host being monitored.

use std::path::{Path, PathBuf};

use pcpgraph_types::{Error, TimeEncoding, TimeWindow};

use crate::AdapterError;

/// Where pmlogger keeps per-host archives.
pub const DEFAULT_ARCHIVE_BASE_PATH: &str = "/var/log/pcp/pmlogger";

/// The extraction tool.
pub const EXTRACT_TOOL: &str = "pmlogextract";

/// Data volumes of a PCP archive; the index and metadata files share the stem.
const VOLUME_GLOB: &str = "*.0";

/// Builds pmlogextract command lines.
#[derive(Debug, Clone)]
pub struct ArchiveExtractor {
    base_path: PathBuf,
}

impl ArchiveExtractor {
    /// Extractor for archives under [`DEFAULT_ARCHIVE_BASE_PATH`].
    pub fn new() -> Self {
        Self::with_base_path(DEFAULT_ARCHIVE_BASE_PATH)
    }

    /// Extractor for archives under a custom directory.
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Directory holding the archives.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Glob matching every archive volume recorded for `host`.
    pub fn input_glob(&self, host: &str) -> String {
        self.base_path
            .join(host)
            .join(VOLUME_GLOB)
            .display()
            .to_string()
    }

    /// Build the command extracting `window` from `host`'s archive into `output`.
    ///
    /// The window must be closed; an archive cannot be cut to "now".
    pub fn build_command(
        &self,
        host: &str,
        window: &TimeWindow,
        output: impl AsRef<Path>,
    ) -> Result<Vec<String>, AdapterError> {
        if !window.is_closed() {
            return Err(Error::InvalidState(
                "archive extraction requires a closed time window".to_string(),
            )
            .into());
        }

        let times = window.format(TimeEncoding::PcpArchive)?;
        let end = times
            .until
            .ok_or(Error::UnsupportedOpenWindow(TimeEncoding::PcpArchive))?;

        Ok(vec![
            EXTRACT_TOOL.to_string(),
            "-S".to_string(),
            times.from,
            "-T".to_string(),
            end,
            self.input_glob(host),
            output.as_ref().display().to_string(),
        ])
    }
}

impl Default for ArchiveExtractor {
    fn default() -> Self {
        Self::new()
    }
}
