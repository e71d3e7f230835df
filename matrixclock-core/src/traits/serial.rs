//! The local serial console transport.

/// Byte-level serial console I/O
///
/// The serial console always exists and is never closed.
pub trait SerialIo {
    /// Next received byte, if any; non-blocking
    fn read_byte(&mut self) -> Option<u8>;

    /// Transmit bytes; best effort
    fn write_bytes(&mut self, bytes: &[u8]);
}
