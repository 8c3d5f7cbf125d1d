//! JSON-lines sink adapter.
//!
//! Writes each outbound message as one flat JSON object per line to any
//! `std::io::Write` (stdout for the binary, a `Vec<u8>` in tests).  A
//! failed write is reported as [`SendError::Io`]; after the writer reports
//! a broken pipe the sink closes and drops everything that follows.

use std::io::{ErrorKind, Write};

use log::debug;

use crate::app::ports::EventSink;
use crate::error::SendError;
use crate::messages::Outbound;

pub struct JsonLinesSink<W: Write> {
    writer: W,
    closed: bool,
    written: u64,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            closed: false,
            written: 0,
        }
    }

    /// Number of lines successfully written.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> EventSink for JsonLinesSink<W> {
    fn emit(&mut self, event: Outbound) -> Result<(), SendError> {
        if self.closed {
            return Err(SendError::Closed);
        }
        let wire = event.to_wire();
        let result = serde_json::to_writer(&mut self.writer, &wire)
            .map_err(std::io::Error::from)
            .and_then(|()| self.writer.write_all(b"\n"))
            .and_then(|()| self.writer.flush());
        match result {
            Ok(()) => {
                self.written += 1;
                debug!("OUT | {}", wire);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                self.closed = true;
                Err(SendError::Closed)
            }
            Err(_) => Err(SendError::Io),
        }
    }
}
