//! Persistent document storage abstractions
//!
//! The clock persists its configuration as small named text documents and
//! appends operational log lines to a log document. Implementations decide
//! where those bytes live (flash partition, host filesystem in tests).
//!
//! Whether storage is writable is fixed at boot: holding the DOWN button at
//! reset hands the drive to USB instead of the running program.

/// Errors from document storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// No document with that name exists
    NotFound,
    /// Storage is not writable by the running program
    ReadOnly,
    /// Document data corrupted or invalid
    Corrupted,
    /// Storage is full
    Full,
    /// Buffer too small for the document
    BufferTooSmall,
    /// Underlying device error
    Io,
}

/// Named flat-document storage
///
/// Operations are synchronous; a save or restore intentionally stalls the
/// clock loop for its duration (rare, user-initiated).
pub trait DocumentStorage {
    /// Read the named document into `buf`, returning the number of bytes
    fn load(&mut self, name: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write the named document, replacing any previous content
    fn save(&mut self, name: &str, data: &[u8]) -> Result<(), StorageError>;

    /// True when the program cannot write (drive handed to USB at boot)
    fn read_only(&self) -> bool;

    /// Append one line to the message log document
    fn append_log(&mut self, line: &str) -> Result<(), StorageError>;
}
