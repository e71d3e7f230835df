//! The clock's configuration options.
//!
//! Every option is a named, typed, validated setting. Validation, the
//! valid-forms description printed by `<name> ?`, and rejection messages all
//! come from the option's single [`Validator`], so help text can never drift
//! from what the validator actually accepts.

mod document;
mod registry;
mod validate;

pub use document::{to_document, apply_document, LoadStats, DOC_MAX};
pub use registry::{OptionDef, Registry, CATALOG, NUM_OPTIONS};
pub use validate::Validator;

use heapless::String;

/// Longest text value (ssid, passwd)
pub const TEXT_MAX: usize = 64;

/// Errors from registry operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OptionError {
    /// No option with that key
    UnknownOption,
    /// The arguments were rejected by the option's validator
    InvalidValue,
}

/// Display color selection
///
/// `Auto` tracks the day/night hours: red at night, green during the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ColorChoice {
    Red,
    Green,
    Auto,
}

/// Display rotation selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rotation {
    Normal,
    Flipped,
    Auto,
}

/// An option's current value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    Color(ColorChoice),
    Hour(u8),
    Rotation(Rotation),
    Text(String<TEXT_MAX>),
}

impl core::fmt::Display for Value {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            // Capitalized to read well in `show` output
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Color(ColorChoice::Red) => f.write_str("red"),
            Value::Color(ColorChoice::Green) => f.write_str("green"),
            Value::Color(ColorChoice::Auto) => f.write_str("auto"),
            Value::Hour(h) => write!(f, "{}", h),
            Value::Rotation(Rotation::Normal) => f.write_str("0"),
            Value::Rotation(Rotation::Flipped) => f.write_str("180"),
            Value::Rotation(Rotation::Auto) => f.write_str("auto"),
            Value::Text(s) => f.write_str(s),
        }
    }
}
