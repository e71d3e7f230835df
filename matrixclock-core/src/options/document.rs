//! Flat-document serialization of the persisted options.
//!
//! A document is human-readable text, one `key value` pair per line. Loading
//! pushes every stored value back through the option's validator, so a
//! document edited by hand (or written by an older firmware) can never put
//! the registry into a state `set` could not have produced.

use core::fmt::Write;

use heapless::String;

use super::{Registry, Value};

/// Document capacity; generous for the persisted catalog
pub const DOC_MAX: usize = 512;

/// What happened while applying a loaded document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LoadStats {
    /// Keys applied through the validator
    pub applied: usize,
    /// Keys skipped: unknown, or stored value no longer valid
    pub skipped: usize,
}

/// Serialize every persisted option's current value
pub fn to_document(registry: &Registry) -> String<DOC_MAX> {
    let mut doc = String::new();
    for (def, value) in registry.iter() {
        if !def.persisted {
            continue;
        }
        // Text values may be empty; the loader treats a missing value
        // as an empty argument, which round-trips correctly
        if matches!(value, Value::Text(s) if s.is_empty()) {
            let _ = writeln!(doc, "{}", def.key);
        } else {
            let _ = writeln!(doc, "{} {}", def.key, value);
        }
    }
    doc
}

/// Overlay a document's values onto the registry
///
/// Unknown keys and no-longer-valid values are counted and skipped, never
/// fatal; untouched options keep their current values.
pub fn apply_document(registry: &mut Registry, text: &str) -> LoadStats {
    let mut stats = LoadStats::default();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (key, raw) = match line.split_once(char::is_whitespace) {
            Some((key, raw)) => (key, raw.trim()),
            None => (line, ""),
        };
        match registry.set(key, raw) {
            Ok(_) => stats.applied += 1,
            Err(_) => stats.skipped += 1,
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{ColorChoice, OptionError};

    #[test]
    fn test_round_trip() {
        let mut reg = Registry::new();
        reg.set("color", "red").unwrap();
        reg.set("24h", "on").unwrap();
        reg.set("night", "21").unwrap();
        reg.set("ssid", "clocknet").unwrap();
        reg.set("passwd", "hunter2").unwrap();

        let doc = to_document(&reg);

        let mut fresh = Registry::new();
        let stats = apply_document(&mut fresh, &doc);
        assert_eq!(stats.skipped, 0);

        for (def, value) in reg.iter() {
            if def.persisted {
                assert_eq!(fresh.get(def.key), Ok(value), "key '{}'", def.key);
            }
        }
    }

    #[test]
    fn test_document_is_flat_text() {
        let reg = Registry::new();
        let doc = to_document(&reg);
        assert!(doc.lines().any(|l| l == "night 22"));
        assert!(doc.lines().any(|l| l == "blink True"));
        // Non-persisted derived values never appear
        assert!(!doc.contains("version"));
    }

    #[test]
    fn test_unknown_keys_skipped() {
        let mut reg = Registry::new();
        let stats = apply_document(&mut reg, "timezone America/Chicago\nblink off\n");
        assert_eq!(stats.applied, 1);
        assert_eq!(stats.skipped, 1);
        assert!(!reg.flag("blink"));
        // The unknown key did not create an option
        assert_eq!(reg.get("timezone"), Err(OptionError::UnknownOption));
    }

    #[test]
    fn test_invalid_stored_value_keeps_default() {
        let mut reg = Registry::new();
        let stats = apply_document(&mut reg, "night 99\ncolor purple\nday 7\n");
        assert_eq!(stats.applied, 1);
        assert_eq!(stats.skipped, 2);
        assert_eq!(reg.hour("night"), 22);
        assert_eq!(reg.color(), ColorChoice::Auto);
        assert_eq!(reg.hour("day"), 7);
    }

    #[test]
    fn test_blank_lines_and_comments_ignored() {
        let mut reg = Registry::new();
        let stats = apply_document(&mut reg, "\n# saved by hand\n\ndim off\n");
        assert_eq!(stats.applied, 1);
        assert_eq!(stats.skipped, 0);
        assert!(!reg.flag("dim"));
    }

    #[test]
    fn test_empty_text_value_round_trips() {
        let reg = Registry::new();
        let doc = to_document(&reg);
        // ssid defaults to empty and appears as a bare key
        assert!(doc.lines().any(|l| l == "ssid"));
        let mut fresh = Registry::new();
        let stats = apply_document(&mut fresh, &doc);
        assert_eq!(stats.skipped, 0);
        assert_eq!(fresh.text("ssid"), "");
    }
}
