//! Option validators.
//!
//! Each validator owns both sides of the contract: it decides whether an
//! argument string is acceptable, and it produces the description of what it
//! accepts. The literal word lists below are the only place the accepted
//! forms are written down.

use core::fmt;

use super::{ColorChoice, OptionError, Rotation, Value};

const TRUE_WORDS: [&str; 5] = ["true", "enable", "enabled", "yes", "on"];
const FALSE_WORDS: [&str; 5] = ["false", "disable", "disabled", "no", "off"];
const COLOR_WORDS: [&str; 3] = ["red", "green", "auto"];
const ROTATION_WORDS: [&str; 3] = ["0", "180", "auto"];

/// The type of a settable option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Validator {
    /// True/false in several spellings; an empty argument means true
    Bool,
    /// One of the fixed color literals
    Color,
    /// An hour of the day, 0-23
    Hour,
    /// 0, 180 or auto
    Rotation,
    /// Free text up to [`super::TEXT_MAX`] bytes
    Text,
}

impl Validator {
    /// Validate a raw argument string, producing the typed value
    pub fn validate(&self, raw: &str) -> Result<Value, OptionError> {
        let raw = raw.trim();
        match self {
            Validator::Bool => {
                if raw.is_empty() {
                    // Bare `blink` style queries are handled before
                    // validation; an empty set argument means enable
                    return Ok(Value::Bool(true));
                }
                if TRUE_WORDS.iter().any(|w| raw.eq_ignore_ascii_case(w)) {
                    Ok(Value::Bool(true))
                } else if FALSE_WORDS.iter().any(|w| raw.eq_ignore_ascii_case(w)) {
                    Ok(Value::Bool(false))
                } else {
                    Err(OptionError::InvalidValue)
                }
            }
            Validator::Color => match COLOR_WORDS.iter().position(|w| *w == raw) {
                Some(0) => Ok(Value::Color(ColorChoice::Red)),
                Some(1) => Ok(Value::Color(ColorChoice::Green)),
                Some(2) => Ok(Value::Color(ColorChoice::Auto)),
                _ => Err(OptionError::InvalidValue),
            },
            Validator::Hour => raw
                .parse::<u8>()
                .ok()
                .filter(|h| *h <= 23)
                .map(Value::Hour)
                .ok_or(OptionError::InvalidValue),
            Validator::Rotation => match ROTATION_WORDS.iter().position(|w| *w == raw) {
                Some(0) => Ok(Value::Rotation(Rotation::Normal)),
                Some(1) => Ok(Value::Rotation(Rotation::Flipped)),
                Some(2) => Ok(Value::Rotation(Rotation::Auto)),
                _ => Err(OptionError::InvalidValue),
            },
            Validator::Text => {
                let mut s = heapless::String::new();
                s.push_str(raw).map_err(|_| OptionError::InvalidValue)?;
                Ok(Value::Text(s))
            }
        }
    }

    /// Write the valid-forms description, built from the same word lists
    /// the validator matches against
    pub fn describe(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        match self {
            Validator::Bool => {
                write_words(out, &TRUE_WORDS)?;
                out.write_str(", ")?;
                write_words(out, &FALSE_WORDS)
            }
            Validator::Color => write_words(out, &COLOR_WORDS),
            Validator::Rotation => write_words(out, &ROTATION_WORDS),
            Validator::Hour => out.write_str("an hour, 0-23"),
            Validator::Text => out.write_str("any text"),
        }
    }
}

fn write_words(out: &mut dyn fmt::Write, words: &[&str]) -> fmt::Result {
    for (i, word) in words.iter().enumerate() {
        if i > 0 {
            out.write_str(", ")?;
        }
        out.write_str(word)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn describe(v: Validator) -> heapless::String<128> {
        let mut s = heapless::String::new();
        v.describe(&mut s).unwrap();
        s
    }

    #[test]
    fn test_bool_literals() {
        for word in ["true", "enable", "enabled", "yes", "on", "ON", "Yes"] {
            assert_eq!(Validator::Bool.validate(word), Ok(Value::Bool(true)));
        }
        for word in ["false", "disable", "disabled", "no", "off", "OFF"] {
            assert_eq!(Validator::Bool.validate(word), Ok(Value::Bool(false)));
        }
        assert_eq!(Validator::Bool.validate(""), Ok(Value::Bool(true)));
        assert_eq!(
            Validator::Bool.validate("maybe"),
            Err(OptionError::InvalidValue)
        );
    }

    #[test]
    fn test_color_literals() {
        assert_eq!(
            Validator::Color.validate("red"),
            Ok(Value::Color(ColorChoice::Red))
        );
        assert_eq!(
            Validator::Color.validate("auto"),
            Ok(Value::Color(ColorChoice::Auto))
        );
        assert_eq!(
            Validator::Color.validate("blue"),
            Err(OptionError::InvalidValue)
        );
    }

    #[test]
    fn test_hour_range() {
        assert_eq!(Validator::Hour.validate("0"), Ok(Value::Hour(0)));
        assert_eq!(Validator::Hour.validate("23"), Ok(Value::Hour(23)));
        assert_eq!(Validator::Hour.validate("24"), Err(OptionError::InvalidValue));
        assert_eq!(Validator::Hour.validate("-1"), Err(OptionError::InvalidValue));
        assert_eq!(Validator::Hour.validate("six"), Err(OptionError::InvalidValue));
    }

    #[test]
    fn test_rotation_literals() {
        assert_eq!(
            Validator::Rotation.validate("0"),
            Ok(Value::Rotation(Rotation::Normal))
        );
        assert_eq!(
            Validator::Rotation.validate("180"),
            Ok(Value::Rotation(Rotation::Flipped))
        );
        assert_eq!(
            Validator::Rotation.validate("auto"),
            Ok(Value::Rotation(Rotation::Auto))
        );
        assert_eq!(
            Validator::Rotation.validate("90"),
            Err(OptionError::InvalidValue)
        );
    }

    #[test]
    fn test_color_description_matches_accepted_set() {
        // The description must enumerate exactly what validates
        assert_eq!(describe(Validator::Color).as_str(), "red, green, auto");
    }

    #[test]
    fn test_descriptions_only_name_accepted_words() {
        // Every word in a description's literal lists must validate
        for v in [Validator::Bool, Validator::Color, Validator::Rotation] {
            let text = describe(v);
            for word in text.split(", ") {
                assert!(
                    v.validate(word).is_ok(),
                    "described word '{}' rejected by {:?}",
                    word,
                    v
                );
            }
        }
    }
}
