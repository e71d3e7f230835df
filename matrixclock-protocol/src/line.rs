//! Line accumulation and editing for the consoles.
//!
//! Both consoles feed decoded bytes here one at a time. The buffer handles
//! backspace, swallows the LF or NUL that telnet clients send after CR, and
//! reports when a complete line is ready to hand to the command interpreter.
//!
//! Echo is the caller's choice: the serial console echoes what the buffer
//! asks it to, the telnet console ignores echo output because the client is
//! in line mode doing its own.

use heapless::String;

/// Longest accepted command line, including the wifi credential commands
pub const MAX_LINE_LEN: usize = 80;

/// Result of feeding one byte to the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineEvent {
    /// Byte consumed, nothing to do
    Pending,
    /// Echo this byte back to an echoing console
    Echo(u8),
    /// Erase one character on an echoing console (backspace, space, backspace)
    Rubout,
    /// A full line is ready; call [`LineBuffer::take`]
    Complete,
}

/// Accumulates bytes into edited lines
#[derive(Debug, Clone, Default)]
pub struct LineBuffer {
    buf: String<MAX_LINE_LEN>,
    last_was_cr: bool,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard any partial line, e.g. when a telnet client disconnects
    pub fn reset(&mut self) {
        self.buf.clear();
        self.last_was_cr = false;
    }

    /// The line accumulated so far
    pub fn pending(&self) -> &str {
        &self.buf
    }

    /// Take the completed line, leaving the buffer empty for the next one
    ///
    /// Leaves the CR flag alone so a trailing LF or NUL arriving after the
    /// take is still swallowed.
    pub fn take(&mut self) -> String<MAX_LINE_LEN> {
        core::mem::take(&mut self.buf)
    }

    /// Feed a single decoded byte
    pub fn feed(&mut self, byte: u8) -> LineEvent {
        // Telnet sends CR LF or CR NUL; count the pair as one line ending
        if self.last_was_cr && (byte == b'\n' || byte == 0) {
            self.last_was_cr = false;
            return LineEvent::Pending;
        }
        self.last_was_cr = false;

        match byte {
            b'\r' => {
                self.last_was_cr = true;
                LineEvent::Complete
            }
            b'\n' => LineEvent::Complete,
            0x08 | 0x7f => {
                if self.buf.pop().is_some() {
                    LineEvent::Rubout
                } else {
                    LineEvent::Pending
                }
            }
            0x20..=0x7e => {
                if self.buf.push(byte as char).is_ok() {
                    LineEvent::Echo(byte)
                } else {
                    // Line full, drop further input until the user hits enter
                    LineEvent::Pending
                }
            }
            // Other control bytes are ignored
            _ => LineEvent::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_str(buf: &mut LineBuffer, s: &str) -> Option<heapless::String<MAX_LINE_LEN>> {
        for &b in s.as_bytes() {
            if buf.feed(b) == LineEvent::Complete {
                return Some(buf.take());
            }
        }
        None
    }

    #[test]
    fn test_simple_line() {
        let mut buf = LineBuffer::new();
        let line = feed_str(&mut buf, "dim on\r").unwrap();
        assert_eq!(line.as_str(), "dim on");
        assert_eq!(buf.pending(), "");
    }

    #[test]
    fn test_crlf_is_one_line_ending() {
        let mut buf = LineBuffer::new();
        let line = feed_str(&mut buf, "time\r").unwrap();
        assert_eq!(line.as_str(), "time");
        // The trailing LF of CRLF must not produce an empty second line
        assert_eq!(buf.feed(b'\n'), LineEvent::Pending);
        assert_eq!(buf.feed(b'x'), LineEvent::Echo(b'x'));
    }

    #[test]
    fn test_cr_nul_is_one_line_ending() {
        let mut buf = LineBuffer::new();
        feed_str(&mut buf, "time\r").unwrap();
        assert_eq!(buf.feed(0), LineEvent::Pending);
    }

    #[test]
    fn test_bare_lf_completes() {
        let mut buf = LineBuffer::new();
        let line = feed_str(&mut buf, "rtc\n").unwrap();
        assert_eq!(line.as_str(), "rtc");
    }

    #[test]
    fn test_backspace_edits() {
        let mut buf = LineBuffer::new();
        for &b in b"dix" {
            buf.feed(b);
        }
        assert_eq!(buf.feed(0x7f), LineEvent::Rubout);
        buf.feed(b'm');
        assert_eq!(buf.pending(), "dim");
    }

    #[test]
    fn test_backspace_on_empty_line() {
        let mut buf = LineBuffer::new();
        assert_eq!(buf.feed(0x08), LineEvent::Pending);
        assert_eq!(buf.pending(), "");
    }

    #[test]
    fn test_overflow_drops_excess() {
        let mut buf = LineBuffer::new();
        for _ in 0..MAX_LINE_LEN {
            assert_eq!(buf.feed(b'a'), LineEvent::Echo(b'a'));
        }
        assert_eq!(buf.feed(b'a'), LineEvent::Pending);
        assert_eq!(buf.pending().len(), MAX_LINE_LEN);
        assert_eq!(buf.feed(b'\r'), LineEvent::Complete);
    }

    #[test]
    fn test_control_bytes_ignored() {
        let mut buf = LineBuffer::new();
        assert_eq!(buf.feed(0x1b), LineEvent::Pending); // ESC
        assert_eq!(buf.feed(0x07), LineEvent::Pending); // BEL
        assert_eq!(buf.pending(), "");
    }

    #[test]
    fn test_reset_discards_partial() {
        let mut buf = LineBuffer::new();
        for &b in b"pass" {
            buf.feed(b);
        }
        buf.reset();
        assert_eq!(buf.pending(), "");
    }
}
