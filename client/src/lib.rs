//! MJPEG-over-HTTP stream client.
//!
//! Connects to a long-lived MJPEG endpoint, reassembles complete JPEG frames
//! from arbitrarily chunked transport bytes, and delivers them over a typed
//! event channel. Sessions enforce a connect timeout and a rolling per-frame
//! timeout, support single-shot and continuous live delivery, and release the
//! connection and all timers on every exit path.
//!
//! ```no_run
//! use mjpeg_client::{SessionConfig, SessionEvent, StreamSession};
//!
//! # async fn demo() {
//! let config = SessionConfig::new("http://camera.local/stream");
//! let mut handle = StreamSession::new(reqwest::Client::new(), config).spawn();
//! while let Some(event) = handle.next_event().await {
//!     match event {
//!         SessionEvent::Frame(jpeg) => println!("frame: {} bytes", jpeg.len()),
//!         SessionEvent::Error(err) => eprintln!("stream failed: {err}"),
//!     }
//! }
//! # }
//! ```

pub mod config;
pub mod error;
pub mod extractor;
pub mod session;
pub mod transform;

pub use config::SessionConfig;
pub use error::SessionError;
pub use extractor::FrameExtractor;
pub use session::{SessionEvent, SessionHandle, StreamSession};
pub use transform::{FrameTransform, IdentityTransform};
