use bytes::BytesMut;

use crate::{EngineError, FailureKind};

/// Splits a chunked body into `\n`-terminated lines.
///
/// Bytes are kept until a line is complete, so a UTF-8 sequence cut by a
/// chunk boundary decodes correctly.
#[derive(Debug)]
pub struct LineBuffer {
    buf: BytesMut,
    /// Leading bytes of `buf` already known to hold no newline.
    scanned: usize,
    max_line_bytes: usize,
}

impl LineBuffer {
    pub fn new(max_line_bytes: usize) -> Self {
        Self {
            buf: BytesMut::new(),
            scanned: 0,
            max_line_bytes,
        }
    }

    /// Appends a chunk and returns every line it completed, without the newline.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<String>, EngineError> {
        self.buf.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(offset) = self.buf[self.scanned..].iter().position(|b| *b == b'\n') {
            let pos = self.scanned + offset;
            let line = self.buf.split_to(pos + 1);
            self.scanned = 0;
            self.check_len(pos)?;
            lines.push(String::from_utf8_lossy(&line[..pos]).into_owned());
        }
        self.scanned = self.buf.len();
        self.check_len(self.buf.len())?;
        Ok(lines)
    }

    /// Drains the trailing unterminated line, if any.
    pub fn finish(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            return None;
        }
        let rest = self.buf.split();
        self.scanned = 0;
        Some(String::from_utf8_lossy(&rest).into_owned())
    }

    fn check_len(&self, len: usize) -> Result<(), EngineError> {
        if len > self.max_line_bytes {
            return Err(EngineError::new(
                FailureKind::LineTooLong {
                    max_bytes: self.max_line_bytes,
                },
                format!("line of at least {len} bytes"),
            ));
        }
        Ok(())
    }
}

/// Whether a line looks like one JSON object; anything else is skipped.
pub fn is_record_candidate(line: &str) -> bool {
    let line = line.trim();
    line.len() > 2 && line.starts_with('{') && line.ends_with('}')
}
