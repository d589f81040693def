use bytes::{Bytes, BytesMut};

const MARKER: u8 = 0xFF;
const SOI: u8 = 0xD8;
const EOI: u8 = 0xD9;

/// Reassembles complete JPEG frames from an MJPEG byte stream.
///
/// The stream is scanned for raw `FFD8`/`FFD9` marker pairs rather than
/// multipart boundary headers, so any transport chunking is tolerated. All
/// scanner state carries across chunks: a marker split over two chunks is
/// detected exactly like one appearing whole, and feeding the stream one
/// byte at a time produces the same frames as feeding it in one piece.
#[derive(Debug, Default)]
pub struct FrameExtractor {
    /// Bytes accumulated since the last confirmed start marker.
    buffer: BytesMut,
    /// Whether the last byte seen outside a candidate frame was `0xFF`.
    pending_marker: bool,
}

impl FrameExtractor {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(256 * 1024),
            pending_marker: false,
        }
    }

    /// Feed one chunk in arrival order; returns the frames it completed.
    ///
    /// Bytes preceding the first start marker are discarded. A start marker
    /// found while a previous candidate is still unterminated discards that
    /// candidate and begins a new one.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<Bytes> {
        let mut frames = Vec::new();

        for &byte in chunk {
            if self.buffer.is_empty() {
                // Outside any candidate: wait for a start marker pair.
                if self.pending_marker && byte == SOI {
                    self.buffer.extend_from_slice(&[MARKER, SOI]);
                    self.pending_marker = false;
                } else {
                    self.pending_marker = byte == MARKER;
                }
                continue;
            }

            let prev = self.buffer[self.buffer.len() - 1];
            if prev == MARKER && byte == SOI {
                // A new start always wins over a stale unterminated candidate.
                self.buffer.clear();
                self.buffer.extend_from_slice(&[MARKER, SOI]);
            } else if prev == MARKER && byte == EOI {
                self.buffer.extend_from_slice(&[EOI]);
                frames.push(self.buffer.split().freeze());
            } else {
                self.buffer.extend_from_slice(&[byte]);
            }
        }

        frames
    }

    /// Size of the in-progress candidate frame, if any. Diagnostic only.
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }
}
