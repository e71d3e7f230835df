//! Timestamped operational logging.
//!
//! Log lines go to every open console and, while the `logging` option is on
//! and storage is writable, are appended to the message log document. The
//! first storage failure turns logging off and says why, so a full or
//! read-only filesystem complains once instead of on every line.

use core::fmt::Write;

use heapless::String;
use matrixclock_hal::{DocumentStorage, StorageError};

use crate::datetime::DateTime;
use crate::options::{Registry, Value};

/// Name of the persistent message log document
pub const LOG_DOCUMENT: &str = "message_log.txt";

/// Longest formatted log line
pub const LOG_LINE_MAX: usize = 160;

/// Persistent-log state
#[derive(Debug)]
pub struct Logger {
    available: bool,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    pub fn new() -> Self {
        Self { available: true }
    }

    /// False once a storage failure has disabled the persistent log
    pub fn available(&self) -> bool {
        self.available
    }

    /// Format `mm/dd/yyyy h:mm:ss - message`; timestampless lines keep the
    /// message column aligned
    pub fn format_line(timestamp: Option<&DateTime>, text: &str) -> String<LOG_LINE_MAX> {
        let mut line = String::new();
        // An oversized message truncates; the prefix is still useful
        let _ = match timestamp {
            Some(ts) => writeln!(line, "{} - {}", ts, text),
            None => writeln!(line, "                    - {}", text),
        };
        line
    }

    /// Append a formatted line to the log document
    ///
    /// Returns a notice to report when this call had to disable logging.
    pub fn append<S: DocumentStorage>(
        &mut self,
        registry: &mut Registry,
        storage: &mut S,
        line: &str,
    ) -> Option<&'static str> {
        if !self.available || !registry.flag("logging") {
            return None;
        }
        let failure = if storage.read_only() {
            Some("Filesystem is read-only - logging disabled")
        } else {
            match storage.append_log(line) {
                Ok(()) => None,
                Err(StorageError::Full) => Some("Filesystem is full - logging disabled"),
                Err(StorageError::ReadOnly) => {
                    Some("Filesystem is read-only - logging disabled")
                }
                Err(_) => Some("Log write failed - logging disabled"),
            }
        };
        if failure.is_some() {
            self.available = false;
            let _ = registry.replace("logging", Value::Bool(false));
        }
        failure
    }
}


#[cfg(test)]
mod tests {
    use super::fakes::FakeStorage;
    use super::*;

    #[test]
    fn test_format_with_timestamp() {
        let ts = DateTime::parse("4/20/2021 8:04:30").unwrap();
        let line = Logger::format_line(Some(&ts), "Clock started");
        assert_eq!(line.as_str(), "4/20/2021 8:04:30 - Clock started\n");
    }

    #[test]
    fn test_format_without_timestamp() {
        let line = Logger::format_line(None, "Version 0.1.0");
        assert_eq!(line.as_str(), "                    - Version 0.1.0\n");
    }

    #[test]
    fn test_append_honors_logging_option() {
        let mut logger = Logger::new();
        let mut reg = Registry::new();
        let mut storage = FakeStorage::default();

        reg.set("logging", "off").unwrap();
        assert!(logger.append(&mut reg, &mut storage, "hidden\n").is_none());
        assert!(storage.log.is_empty());

        reg.set("logging", "on").unwrap();
        assert!(logger.append(&mut reg, &mut storage, "kept\n").is_none());
        assert_eq!(storage.log.as_str(), "kept\n");
    }

    #[test]
    fn test_read_only_disables_logging_once() {
        let mut logger = Logger::new();
        let mut reg = Registry::new();
        let mut storage = FakeStorage {
            read_only: true,
            ..Default::default()
        };

        let notice = logger.append(&mut reg, &mut storage, "line\n");
        assert_eq!(notice, Some("Filesystem is read-only - logging disabled"));
        assert!(!logger.available());
        assert!(!reg.flag("logging"));

        // Later lines are silently skipped
        assert!(logger.append(&mut reg, &mut storage, "line\n").is_none());
    }

    #[test]
    fn test_full_storage_disables_logging() {
        let mut logger = Logger::new();
        let mut reg = Registry::new();
        let mut storage = FakeStorage {
            fail_log_writes: true,
            ..Default::default()
        };

        let notice = logger.append(&mut reg, &mut storage, "line\n");
        assert_eq!(notice, Some("Filesystem is full - logging disabled"));
        assert!(!reg.flag("logging"));
    }
}
