//! Error types shared by every pcpgraph crate.

use thiserror::Error;

use crate::TimeEncoding;

/// Errors raised when a window, host set or catalog is used out of order.
///
/// None of these are runtime conditions: they indicate that the caller
/// drove the recorder incorrectly, so they are fatal to the call that
/// raised them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Required state is missing (window never opened, no hosts).
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// A state machine transition was attempted twice or out of order.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The encoding has no representation for a window that is still open.
    #[error("{0} timestamps require a closed time window")]
    UnsupportedOpenWindow(TimeEncoding),

    /// Host name that would break glob or URL construction.
    #[error("Invalid host name: {0:?}")]
    InvalidHost(String),

    /// Epoch seconds that cannot be represented as a calendar date.
    #[error("Timestamp out of range: {0}")]
    TimestampOutOfRange(u64),
}
