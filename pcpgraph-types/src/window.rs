//! Time window - the start/end pair bounding a run.

use core::fmt;

use chrono::{DateTime, Local, Utc};

use crate::Error;

/// How a backend wants window timestamps rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TimeEncoding {
    /// Epoch seconds; an open end is the literal `now`.
    Graphite,
    /// UTC `2016-01-20T11:53:26`; an open end is omitted.
    Grafana,
    /// pmlogextract's `@Wed Jan 20 11:53:26 2016 +0000`, local time.
    /// Requires a closed window.
    PcpArchive,
}

impl TimeEncoding {
    /// Short lowercase name, used in logs and error messages.
    pub const fn as_str(&self) -> &'static str {
        match self {
            TimeEncoding::Graphite => "graphite",
            TimeEncoding::Grafana => "grafana",
            TimeEncoding::PcpArchive => "pcp-archive",
        }
    }
}

impl fmt::Display for TimeEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A window rendered for one backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedWindow {
    /// Rendered start time.
    pub from: String,
    /// Rendered end time, `None` when the backend defaults an open end to now.
    pub until: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WindowState {
    Pending,
    Open { start: u64 },
    Closed { start: u64, end: u64 },
}

/// The time range of a run, in epoch seconds.
///
/// A window starts out pending, is opened once when the run begins and is
/// closed once when it ends. Until it is closed the end is "now".
///
/// # Example
///
/// ```rust
/// use pcpgraph_types::{TimeEncoding, TimeWindow};
///
/// let mut window = TimeWindow::opened_at(1000);
/// let live = window.format(TimeEncoding::Graphite).unwrap();
/// assert_eq!(live.until.as_deref(), Some("now"));
///
/// window.close(2000).unwrap();
/// let done = window.format(TimeEncoding::Graphite).unwrap();
/// assert_eq!(done.from, "1000");
/// assert_eq!(done.until.as_deref(), Some("2000"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    state: WindowState,
}

impl TimeWindow {
    /// Create a window that has not been opened yet.
    pub const fn new() -> Self {
        Self {
            state: WindowState::Pending,
        }
    }

    /// Create a window already opened at `start`.
    pub const fn opened_at(start: u64) -> Self {
        Self {
            state: WindowState::Open { start },
        }
    }

    /// Record the start of the window.
    pub fn open(&mut self, start: u64) -> Result<(), Error> {
        match self.state {
            WindowState::Pending => {
                self.state = WindowState::Open { start };
                Ok(())
            }
            _ => Err(Error::InvalidState(
                "time window has already been opened".to_string(),
            )),
        }
    }

    /// Fix the end of the window. Allowed exactly once, after `open`.
    pub fn close(&mut self, end: u64) -> Result<(), Error> {
        match self.state {
            WindowState::Pending => Err(Error::InvalidState(
                "time window closed before it was opened".to_string(),
            )),
            WindowState::Closed { .. } => Err(Error::InvalidState(
                "time window has already been closed".to_string(),
            )),
            WindowState::Open { start } if end < start => Err(Error::InvalidState(format!(
                "time window cannot end ({}) before it starts ({})",
                end, start
            ))),
            WindowState::Open { start } => {
                self.state = WindowState::Closed { start, end };
                Ok(())
            }
        }
    }

    /// Start of the window, if opened.
    pub fn start(&self) -> Option<u64> {
        match self.state {
            WindowState::Pending => None,
            WindowState::Open { start } | WindowState::Closed { start, .. } => Some(start),
        }
    }

    /// End of the window, if closed.
    pub fn end(&self) -> Option<u64> {
        match self.state {
            WindowState::Closed { end, .. } => Some(end),
            _ => None,
        }
    }

    /// True once `open` has been called.
    pub fn is_opened(&self) -> bool {
        !matches!(self.state, WindowState::Pending)
    }

    /// True once `close` has been called.
    pub fn is_closed(&self) -> bool {
        matches!(self.state, WindowState::Closed { .. })
    }

    /// Render the window for a backend.
    pub fn format(&self, encoding: TimeEncoding) -> Result<FormattedWindow, Error> {
        let (start, end) = match self.state {
            WindowState::Pending => {
                return Err(Error::Precondition(
                    "time window has not been opened".to_string(),
                ))
            }
            WindowState::Open { start } => (start, None),
            WindowState::Closed { start, end } => (start, Some(end)),
        };

        let from = format_timestamp(start, encoding)?;
        let until = match (end, encoding) {
            (Some(end), _) => Some(format_timestamp(end, encoding)?),
            (None, TimeEncoding::Graphite) => Some("now".to_string()),
            (None, TimeEncoding::Grafana) => None,
            (None, TimeEncoding::PcpArchive) => {
                return Err(Error::UnsupportedOpenWindow(encoding))
            }
        };

        Ok(FormattedWindow { from, until })
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self::new()
    }
}

fn format_timestamp(seconds: u64, encoding: TimeEncoding) -> Result<String, Error> {
    if encoding == TimeEncoding::Graphite {
        return Ok(seconds.to_string());
    }

    let utc: DateTime<Utc> = i64::try_from(seconds)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or(Error::TimestampOutOfRange(seconds))?;

    Ok(match encoding {
        TimeEncoding::Grafana => utc.format("%Y-%m-%dT%H:%M:%S").to_string(),
        _ => utc
            .with_timezone(&Local)
            .format("@%a %b %d %H:%M:%S %Y %z")
            .to_string(),
    })
}
