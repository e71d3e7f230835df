//! The console command interpreter.
//!
//! One line of text in, one line (or block, for `show`) of response out.
//! Commands that touch a collaborator the interpreter does not own
//! (storage, network, the RTC chip, process restart) come back to the
//! caller as a typed [`SideEffect`] to execute; everything else is applied
//! to the registry directly.
//!
//! Grammar: `token [args...]`. A bare known option shows its current
//! value; `token ?` describes what the token accepts; anything else is a
//! set attempt routed through the option's validator.

use core::fmt::{self, Write};

use heapless::String;

use crate::datetime::DateTime;
use crate::options::{OptionDef, OptionError, Registry, Value, TEXT_MAX};
use crate::VERSION;

/// Longest accepted document name
pub const NAME_MAX: usize = 32;

/// Document name used when `save`/`restore` get no argument
pub const DEFAULT_DOCUMENT: &str = "defaults.opt";

/// An RTC operation requested from the console
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RtcRequest {
    /// Set an absolute date and time
    Set(DateTime),
    /// Shift by a signed number of seconds
    Adjust(i32),
    /// Round to the nearest whole minute
    Nearest,
    /// Zero the seconds onto the next minute boundary
    Sync,
}

/// A command whose execution belongs to the clock loop, not the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEffect {
    Save(String<NAME_MAX>),
    Restore(String<NAME_MAX>),
    Join {
        ssid: String<TEXT_MAX>,
        passwd: String<TEXT_MAX>,
    },
    Rtc(RtcRequest),
    Restart,
}

/// Derived values the interpreter reports but does not own
#[derive(Debug, Clone, Copy)]
pub struct Query {
    /// The running local time counter
    pub local: DateTime,
    /// The chip's current time
    pub chip: DateTime,
    /// Seconds since startup
    pub uptime_secs: u32,
}

/// Interpret one console line
///
/// Writes the response to `out` and returns a side effect for the caller
/// to execute, if the command requires one. An empty line produces no
/// output and no effect.
pub fn run(
    registry: &mut Registry,
    query: &Query,
    line: &str,
    out: &mut dyn Write,
) -> Result<Option<SideEffect>, fmt::Error> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (token, raw) = match line.split_once(char::is_whitespace) {
        Some((token, rest)) => (token, rest.trim()),
        None => (line, ""),
    };

    if raw == "?" {
        describe(token, out)?;
        return Ok(None);
    }

    match token {
        "show" => {
            for (def, value) in registry.iter() {
                show_option(out, def, value)?;
            }
            show_derived(query, out)?;
            Ok(None)
        }
        "save" | "restore" => {
            let name = document_name(raw);
            match name {
                Some(name) if token == "save" => Ok(Some(SideEffect::Save(name))),
                Some(name) => Ok(Some(SideEffect::Restore(name))),
                None => {
                    writeln!(out, "Invalid document name '{}'", raw)?;
                    Ok(None)
                }
            }
        }
        "network" => {
            let mut args = raw.split_whitespace();
            match (args.next(), args.next(), args.next()) {
                (Some(ssid), Some(passwd), None) => {
                    // Both values go through the normal validator path
                    if registry.set("ssid", ssid).is_err()
                        || registry.set("passwd", passwd).is_err()
                    {
                        writeln!(out, "Invalid parameter - 'network' accepts <ssid> <passwd>")?;
                        return Ok(None);
                    }
                    show_key(registry, "ssid", out)?;
                    show_key(registry, "passwd", out)?;
                    Ok(None)
                }
                _ => {
                    writeln!(out, "Invalid parameter - 'network' accepts <ssid> <passwd>")?;
                    Ok(None)
                }
            }
        }
        "join" => {
            let (ssid, passwd) = match raw.split_once(',') {
                Some((ssid, passwd)) => (ssid.trim(), passwd.trim()),
                None if raw.is_empty() => (registry.text("ssid"), registry.text("passwd")),
                None => (raw, registry.text("passwd")),
            };
            if ssid.is_empty() {
                writeln!(out, "join - no network credentials set")?;
                return Ok(None);
            }
            let mut s = String::new();
            let mut p = String::new();
            if s.push_str(ssid).is_err() || p.push_str(passwd).is_err() {
                writeln!(out, "Invalid parameter - 'join' accepts [ssid,passwd]")?;
                return Ok(None);
            }
            Ok(Some(SideEffect::Join { ssid: s, passwd: p }))
        }
        "rtc" => rtc_command(query, raw, out),
        "restart" => {
            if raw.is_empty() {
                Ok(Some(SideEffect::Restart))
            } else {
                writeln!(out, "Invalid parameter - 'restart' accepts no arguments")?;
                Ok(None)
            }
        }
        "version" | "time" | "uptime" => {
            show_derived_key(query, token, out)?;
            Ok(None)
        }
        _ => {
            if Registry::definition(token).is_none() {
                writeln!(out, "Invalid command '{}'", token)?;
                return Ok(None);
            }
            if raw.is_empty() {
                show_key(registry, token, out)?;
                return Ok(None);
            }
            match registry.set(token, raw) {
                Ok(_) => show_key(registry, token, out)?,
                Err(OptionError::InvalidValue) => {
                    write!(out, "Invalid parameter - '{}' accepts ", token)?;
                    if let Some(def) = Registry::definition(token) {
                        def.validator.describe(out)?;
                    }
                    writeln!(out)?;
                }
                Err(OptionError::UnknownOption) => {
                    writeln!(out, "Invalid command '{}'", token)?;
                }
            }
            Ok(None)
        }
    }
}

/// `rtc` with no argument shows the chip; everything else is an effect
fn rtc_command(
    query: &Query,
    raw: &str,
    out: &mut dyn Write,
) -> Result<Option<SideEffect>, fmt::Error> {
    if raw.is_empty() {
        show_derived_key(query, "rtc", out)?;
        return Ok(None);
    }
    if let Some(unit) = raw.strip_prefix('+').or_else(|| raw.strip_prefix('-')) {
        let step = match unit {
            "sec" | "second" => 1,
            "min" | "minute" => 60,
            "hr" | "hour" => 3600,
            _ => {
                writeln!(out, "Invalid time adjustment")?;
                return Ok(None);
            }
        };
        let signed = if raw.starts_with('-') { -step } else { step };
        return Ok(Some(SideEffect::Rtc(RtcRequest::Adjust(signed))));
    }
    match raw {
        "nearest" => Ok(Some(SideEffect::Rtc(RtcRequest::Nearest))),
        "sync" => Ok(Some(SideEffect::Rtc(RtcRequest::Sync))),
        _ => match DateTime::parse(raw) {
            Ok(dt) => Ok(Some(SideEffect::Rtc(RtcRequest::Set(dt)))),
            Err(_) => {
                writeln!(out, "Invalid date/time")?;
                Ok(None)
            }
        },
    }
}

fn describe(token: &str, out: &mut dyn Write) -> fmt::Result {
    if let Some(def) = Registry::definition(token) {
        write!(out, "{} accepts ", token)?;
        def.validator.describe(out)?;
        return writeln!(out);
    }
    let usage = match token {
        "show" | "restart" | "version" | "time" | "uptime" => "no arguments",
        "save" | "restore" => "an optional document name",
        "network" => "<ssid> <passwd>",
        "join" => "[ssid,passwd] (stored credentials when omitted)",
        "rtc" => "mm/dd/yyyy hh:mm:ss, sync, nearest, +sec, -sec, +min, -min, +hour, -hour",
        _ => {
            return writeln!(out, "Invalid command '{}'", token);
        }
    };
    writeln!(out, "{} accepts {}", token, usage)
}

fn show_option(out: &mut dyn Write, def: &OptionDef, value: &Value) -> fmt::Result {
    if def.masked && !matches!(value, Value::Text(s) if s.is_empty()) {
        writeln!(out, "{:<9} is ********", def.key)
    } else {
        writeln!(out, "{:<9} is {}", def.key, value)
    }
}

fn show_key(registry: &Registry, key: &str, out: &mut dyn Write) -> fmt::Result {
    if let (Some(def), Ok(value)) = (Registry::definition(key), registry.get(key)) {
        show_option(out, def, value)?;
    }
    Ok(())
}

fn show_derived_key(query: &Query, key: &str, out: &mut dyn Write) -> fmt::Result {
    match key {
        "version" => writeln!(out, "{:<9} is {}", "version", VERSION),
        "time" => writeln!(out, "{:<9} is {}", "time", query.local),
        "rtc" => writeln!(out, "{:<9} is {} {}", "rtc", query.chip, query.chip.weekday()),
        "uptime" => {
            let days = query.uptime_secs / 86_400;
            let rem = query.uptime_secs % 86_400;
            writeln!(
                out,
                "{:<9} is {}d {}:{:02}:{:02}",
                "uptime",
                days,
                rem / 3600,
                rem % 3600 / 60,
                rem % 60
            )
        }
        _ => Ok(()),
    }
}

fn show_derived(query: &Query, out: &mut dyn Write) -> fmt::Result {
    for key in ["version", "time", "rtc", "uptime"] {
        show_derived_key(query, key, out)?;
    }
    Ok(())
}

fn document_name(raw: &str) -> Option<String<NAME_MAX>> {
    let mut name = String::new();
    if raw.is_empty() {
        // Capacity comfortably holds the default
        let _ = name.push_str(DEFAULT_DOCUMENT);
        return Some(name);
    }
    if raw.contains(char::is_whitespace) {
        return None;
    }
    name.push_str(raw).ok()?;
    if !raw.contains('.') {
        name.push_str(".opt").ok()?;
    }
    Some(name)
}
