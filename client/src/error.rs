use std::error::Error as StdError;
use std::time::Duration;

/// Terminal session failures surfaced on the event channel.
///
/// Every variant that wraps an underlying failure keeps it reachable through
/// `source()`, so consumers can distinguish error classes and retain the
/// originating context rather than a bare message.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("connect timed out after {0:?}")]
    ConnectTimeout(Duration),
    #[error("HTTP connection failed: {0}")]
    Connect(#[source] reqwest::Error),
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },
    #[error("no frame received within {0:?}")]
    FrameTimeout(Duration),
    #[error("HTTP stream error: {0}")]
    Stream(#[source] reqwest::Error),
    #[error("stream closed while more frames were expected")]
    ClosedUnexpectedly,
}

/// Whether a transport error is the benign "server dropped the connection
/// before completing the response" class, which is torn down silently
/// instead of being surfaced.
///
/// reqwest does not re-export hyper's error kinds, so this walks the source
/// chain and matches hyper's stable wording at each level.
pub(crate) fn is_benign_disconnect(err: &reqwest::Error) -> bool {
    let mut source: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(current) = source {
        let text = current.to_string();
        if text.contains("connection closed before message completed")
            || text.contains("IncompleteMessage")
        {
            return true;
        }
        source = current.source();
    }
    false
}
