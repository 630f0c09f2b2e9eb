use std::collections::VecDeque;
use std::io::BufRead;

use crate::error::TransportError;
use crate::frame::TouchFrame;

/// A channel delivering touch frames.
///
/// [`poll_frame`](Self::poll_frame) must not block: it returns `Ok(None)`
/// when no frame is waiting.
pub trait TouchSource {
    fn poll_frame(&mut self) -> Result<Option<TouchFrame>, TransportError>;
}

impl<S: TouchSource + ?Sized> TouchSource for &mut S {
    fn poll_frame(&mut self) -> Result<Option<TouchFrame>, TransportError> {
        (**self).poll_frame()
    }
}

impl<S: TouchSource + ?Sized> TouchSource for Box<S> {
    fn poll_frame(&mut self) -> Result<Option<TouchFrame>, TransportError> {
        (**self).poll_frame()
    }
}

/// Frames decoded from newline-delimited JSON, such as a recorded session
/// or a bridge process writing to a pipe. Blank lines are skipped.
#[derive(Debug)]
pub struct JsonLinesSource<R> {
    reader: R,
    line: usize,
    buf: String,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
        }
    }

    /// Lines consumed so far.
    pub fn line(&self) -> usize {
        self.line
    }
}

impl<R: BufRead> TouchSource for JsonLinesSource<R> {
    fn poll_frame(&mut self) -> Result<Option<TouchFrame>, TransportError> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;
            let text = self.buf.trim();
            if text.is_empty() {
                continue;
            }
            return serde_json::from_str(text)
                .map(Some)
                .map_err(|source| TransportError::DecodeLine {
                    line: self.line,
                    source,
                });
        }
    }
}

/// In-memory FIFO of frames, fed by the caller.
#[derive(Debug, Clone, Default)]
pub struct FrameQueue {
    frames: VecDeque<TouchFrame>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: TouchFrame) {
        self.frames.push_back(frame);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl Extend<TouchFrame> for FrameQueue {
    fn extend<I: IntoIterator<Item = TouchFrame>>(&mut self, iter: I) {
        self.frames.extend(iter);
    }
}

impl FromIterator<TouchFrame> for FrameQueue {
    fn from_iter<I: IntoIterator<Item = TouchFrame>>(iter: I) -> Self {
        Self {
            frames: iter.into_iter().collect(),
        }
    }
}

impl TouchSource for FrameQueue {
    fn poll_frame(&mut self) -> Result<Option<TouchFrame>, TransportError> {
        Ok(self.frames.pop_front())
    }
}
