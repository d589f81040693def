use std::collections::HashMap;

use bytes::Bytes;
use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::error::{is_benign_disconnect, SessionError};
use crate::extractor::FrameExtractor;
use crate::transform::{FrameTransform, IdentityTransform};

/// Events delivered to the session consumer.
///
/// Clean termination (single-shot completion, cancellation, consumer
/// disengagement) closes the channel without an `Error` event.
#[derive(Debug)]
pub enum SessionEvent {
    /// One complete JPEG frame.
    Frame(Bytes),
    /// Terminal failure; no further events follow.
    Error(SessionError),
}

/// One MJPEG stream session: connects, extracts frames, enforces the connect
/// and rolling per-frame timeouts, and releases the connection and timers on
/// every exit path.
///
/// Sessions are independent; run one per stream. The transform and the
/// "still wanted" signal are optional policy inputs with pass-through
/// defaults.
pub struct StreamSession {
    client: reqwest::Client,
    config: SessionConfig,
    transform: Box<dyn FrameTransform>,
    wanted: Option<watch::Receiver<bool>>,
}

impl StreamSession {
    pub fn new(client: reqwest::Client, config: SessionConfig) -> Self {
        Self {
            client,
            config,
            transform: Box::new(IdentityTransform),
            wanted: None,
        }
    }

    /// Replace the identity transform.
    pub fn with_transform(mut self, transform: impl FrameTransform + 'static) -> Self {
        self.transform = Box::new(transform);
        self
    }

    /// Attach an externally-owned liveness signal. While it reads `false`,
    /// frames are still extracted (keeping the connection considered alive)
    /// but nothing is delivered.
    pub fn with_wanted_signal(mut self, wanted: watch::Receiver<bool>) -> Self {
        self.wanted = Some(wanted);
        self
    }

    /// Launch the session task and return its handle.
    pub fn spawn(self) -> SessionHandle {
        let cancel = CancellationToken::new();
        let (events, receiver) = mpsc::channel(4);
        tokio::spawn(self.run(events, cancel.clone()));
        SessionHandle {
            events: receiver,
            cancel,
        }
    }

    fn is_wanted(&self) -> bool {
        self.wanted.as_ref().map_or(true, |rx| *rx.borrow())
    }

    async fn run(mut self, events: mpsc::Sender<SessionEvent>, cancel: CancellationToken) {
        match self.stream_frames(&events, &cancel).await {
            Ok(delivered) => {
                info!(url = self.config.url, delivered, "stream session finished");
            }
            Err(err) => {
                warn!(url = self.config.url, error = %err, "stream session failed");
                if !cancel.is_cancelled() && self.is_wanted() {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => {}
                        _ = events.send(SessionEvent::Error(err)) => {}
                    }
                }
            }
        }
    }

    /// Returns the number of frames delivered. `Ok` covers every clean exit:
    /// single-shot completion, cancellation, consumer disengagement, and the
    /// benign early-disconnect class.
    async fn stream_frames(
        &mut self,
        events: &mpsc::Sender<SessionEvent>,
        cancel: &CancellationToken,
    ) -> Result<u64, SessionError> {
        let headers = build_headers(&self.config.headers)?;
        let connect_timeout = self.config.connect_timeout();
        let frame_timeout = self.config.frame_timeout();

        info!(
            url = self.config.url,
            live = self.config.live,
            "connecting to MJPEG stream"
        );

        let request = self.client.get(&self.config.url).headers(headers);
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(0),
            outcome = tokio::time::timeout(connect_timeout, request.send()) => match outcome {
                Err(_) => return Err(SessionError::ConnectTimeout(connect_timeout)),
                Ok(Err(err)) => return Err(SessionError::Connect(err)),
                Ok(Ok(response)) => response,
            },
        };

        if !response.status().is_success() {
            return Err(SessionError::Status(response.status().as_u16()));
        }

        info!(status = %response.status(), "connected to MJPEG stream");

        let mut stream = response.bytes_stream();
        let mut extractor = FrameExtractor::new();
        let mut delivered: u64 = 0;

        let deadline = tokio::time::sleep(frame_timeout);
        tokio::pin!(deadline);

        loop {
            let chunk = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(delivered),
                _ = &mut deadline => {
                    debug!(pending = extractor.pending_len(), "frame deadline elapsed");
                    return Err(SessionError::FrameTimeout(frame_timeout));
                }
                chunk = stream.next() => chunk,
            };

            let chunk = match chunk {
                Some(Ok(chunk)) => chunk,
                Some(Err(err)) if is_benign_disconnect(&err) => {
                    debug!(error = %err, "connection closed early, treated as benign");
                    return Ok(delivered);
                }
                Some(Err(err)) => return Err(SessionError::Stream(err)),
                None => return Err(SessionError::ClosedUnexpectedly),
            };

            for frame in extractor.push_chunk(&chunk) {
                // A completed frame proves the connection alive even when
                // delivery is suppressed below.
                deadline.as_mut().reset(Instant::now() + frame_timeout);

                let size = frame.len();
                let Some(frame) = self.transform.apply(frame) else {
                    debug!(
                        size,
                        transform = self.transform.name(),
                        "frame suppressed by transform"
                    );
                    continue;
                };

                if cancel.is_cancelled() {
                    return Ok(delivered);
                }
                if !self.is_wanted() {
                    debug!(size, "consumer not active, skipping frame delivery");
                    continue;
                }

                let sent = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Ok(delivered),
                    sent = events.send(SessionEvent::Frame(frame)) => sent,
                };
                if sent.is_err() {
                    // Receiver dropped: the consumer disengaged.
                    return Ok(delivered);
                }
                delivered += 1;
                debug!(size, delivered, "frame delivered");

                if !self.config.live {
                    return Ok(delivered);
                }
            }
        }
    }
}

/// Consumer-side handle to a running session.
///
/// Dropping the handle cancels the session. `stop` is idempotent and safe
/// to call from any state.
pub struct SessionHandle {
    events: mpsc::Receiver<SessionEvent>,
    cancel: CancellationToken,
}

impl SessionHandle {
    /// Next frame or terminal error; `None` once the session has ended.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events.recv().await
    }

    /// Request teardown: cancels the timers and releases the connection.
    /// No further events are emitted once the request is observed.
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn build_headers(headers: &HashMap<String, String>) -> Result<HeaderMap, SessionError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| SessionError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| SessionError::InvalidHeader {
            name: name.clone(),
            reason: e.to_string(),
        })?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}
