//! Line-delimited JSON sink
//!
//! One JSON object per line with exactly the `cid`, `text`, and `time`
//! fields, append-only, in discovery order.

use super::{CommentSink, OutputResult, ProgressFn};
use crate::extract::CommentRecord;
use std::io::Write;

/// Writes each comment record as one line of JSON
pub struct JsonLinesSink<W: Write> {
    writer: W,
    written: u64,
    progress: Option<ProgressFn>,
}

impl<W: Write> JsonLinesSink<W> {
    /// Creates a sink writing to `writer`
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            written: 0,
            progress: None,
        }
    }

    /// Attaches a progress callback invoked with the running count after
    /// each record
    pub fn with_progress(mut self, progress: impl FnMut(u64) + 'static) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    /// Consumes the sink, returning the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> CommentSink for JsonLinesSink<W> {
    fn write(&mut self, record: &CommentRecord) -> OutputResult<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        if let Some(progress) = &mut self.progress {
            progress(self.written);
        }
        Ok(())
    }

    fn flush(&mut self) -> OutputResult<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn count(&self) -> u64 {
        self.written
    }
}
