use bytes::Bytes;

/// Pluggable per-frame byte transform applied before delivery.
///
/// Implementations receive one complete JPEG frame and may rewrite it, or
/// return `None` to suppress it entirely (no delivery, no error).
pub trait FrameTransform: Send + Sync {
    fn apply(&mut self, frame: Bytes) -> Option<Bytes>;

    /// Human-readable name for logging.
    fn name(&self) -> &str {
        "unnamed"
    }
}

/// Default pass-through transform.
pub struct IdentityTransform;

impl FrameTransform for IdentityTransform {
    fn apply(&mut self, frame: Bytes) -> Option<Bytes> {
        Some(frame)
    }

    fn name(&self) -> &str {
        "identity"
    }
}
