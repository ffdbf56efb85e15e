//! Newline-delimited JSON framing for the stdio transport.
//!
//! One message per line in each direction. Inbound lines are size-capped;
//! outbound messages are serialized on a single line and flushed eagerly so
//! the peer sees responses in request order.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use serde::Serialize;

/// Default maximum size of a single inbound line (10 MiB).
pub const DEFAULT_MAX_LINE_BYTES: usize = 10 * 1024 * 1024;

/// One inbound frame.
#[derive(Debug, PartialEq, Eq)]
pub enum Frame {
    /// A complete line, without its trailing newline.
    Line(String),
    /// A line longer than the limit; its bytes were consumed and dropped.
    Oversized { len: usize },
    /// A line that is not valid UTF-8; dropped.
    InvalidUtf8,
}

/// Reads size-limited lines from a buffered reader.
pub struct FrameReader<R> {
    reader: R,
    max_bytes: usize,
    buf: Vec<u8>,
}

impl<R: BufRead> FrameReader<R> {
    pub const fn new(reader: R, max_bytes: usize) -> Self {
        Self {
            reader,
            max_bytes,
            buf: Vec::new(),
        }
    }

    /// Read the next frame. Returns `Ok(None)` at EOF.
    ///
    /// A final line without a trailing newline is still returned.
    pub fn read_frame(&mut self) -> Result<Option<Frame>> {
        self.buf.clear();
        let mut total = 0usize;
        let mut overflow = false;

        loop {
            let available = self.reader.fill_buf().context("input fill_buf failed")?;
            if available.is_empty() {
                if total == 0 {
                    return Ok(None);
                }
                break;
            }
            let (consumed, found_newline) = match available.iter().position(|&b| b == b'\n') {
                Some(pos) => (pos + 1, true),
                None => (available.len(), false),
            };
            // The limit applies to the payload, not the newline.
            total += consumed - usize::from(found_newline);
            if total > self.max_bytes {
                // Keep draining up to the newline, but stop buffering.
                overflow = true;
                self.buf.clear();
            } else {
                self.buf.extend_from_slice(&available[..consumed]);
            }
            self.reader.consume(consumed);
            if found_newline {
                break;
            }
        }

        if overflow {
            return Ok(Some(Frame::Oversized { len: total }));
        }

        while matches!(self.buf.last(), Some(b'\n' | b'\r')) {
            self.buf.pop();
        }
        match String::from_utf8(std::mem::take(&mut self.buf)) {
            Ok(line) => Ok(Some(Frame::Line(line))),
            Err(_) => Ok(Some(Frame::InvalidUtf8)),
        }
    }
}

/// Writes one JSON message per line.
pub struct FrameWriter<W> {
    writer: W,
}

impl<W: Write> FrameWriter<W> {
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Serialize `message` as a single line and flush.
    pub fn write_message(&mut self, message: &impl Serialize) -> Result<()> {
        let json = serde_json::to_string(message).context("failed to serialize message")?;
        tracing::debug!(line = json, "sending message");
        self.writer
            .write_all(json.as_bytes())
            .context("failed to write to output")?;
        self.writer
            .write_all(b"\n")
            .context("failed to write newline to output")?;
        self.writer.flush().context("failed to flush output")?;
        Ok(())
    }
}
