//! Line assembly for the upstream event stream
//!
//! The chat body arrives as byte chunks that do not align with line
//! boundaries. `LineBuffer` accumulates chunks and hands out complete
//! lines; whatever trails the last newline stays buffered until the next
//! chunk (or surfaces via [`LineBuffer::take_remainder`] at end of input).

/// Buffer that reassembles newline-delimited lines from byte chunks
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and return every line completed by it.
    ///
    /// Lines are returned without their trailing `\n` (and `\r`, when the
    /// backend sends CRLF). Blank separator lines are returned as empty
    /// lines; the event parser decides what to skip.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(newline) = self.pending.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.pending.drain(..=newline).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            lines.push(line);
        }

        lines
    }

    /// Take any unterminated trailing bytes left at end of input
    pub fn take_remainder(&mut self) -> Option<Vec<u8>> {
        if self.pending.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.pending))
        }
    }
}
