//! The option registry: the catalog of built-in options and their current
//! values.

use heapless::Vec;

use super::{ColorChoice, OptionError, Rotation, Validator, Value};

/// A built-in option definition
#[derive(Debug, Clone, Copy)]
pub struct OptionDef {
    pub key: &'static str,
    pub validator: Validator,
    /// Default value, spelled as console input and validated at startup
    pub default: &'static str,
    /// Included in save/restore documents
    pub persisted: bool,
    /// Value is hidden in console output
    pub masked: bool,
}

const fn def(key: &'static str, validator: Validator, default: &'static str) -> OptionDef {
    OptionDef {
        key,
        validator,
        default,
        persisted: true,
        masked: false,
    }
}

/// The built-in options, in registration order (which is also `show` order)
pub const CATALOG: &[OptionDef] = &[
    def("24h", Validator::Bool, "off"),
    def("blink", Validator::Bool, "on"),
    def("center", Validator::Bool, "on"),
    def("dim", Validator::Bool, "on"),
    def("ampm", Validator::Bool, "on"),
    def("color", Validator::Color, "auto"),
    def("night", Validator::Hour, "22"),
    def("day", Validator::Hour, "6"),
    def("logging", Validator::Bool, "on"),
    def("rotation", Validator::Rotation, "auto"),
    def("ssid", Validator::Text, ""),
    OptionDef {
        masked: true,
        ..def("passwd", Validator::Text, "")
    },
    def("autojoin", Validator::Bool, "off"),
];

/// Number of entries in [`CATALOG`]
pub const NUM_OPTIONS: usize = 13;

/// Current values for every cataloged option
///
/// Values only change through the validator path, so every stored value
/// always satisfies its own validator.
#[derive(Debug, Clone)]
pub struct Registry {
    values: Vec<Value, NUM_OPTIONS>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Build a registry holding every option's built-in default
    pub fn new() -> Self {
        let mut values = Vec::new();
        for def in CATALOG {
            let value = def
                .validator
                .validate(def.default)
                .unwrap_or_else(|_| fallback(def.validator));
            // Capacity matches the catalog length
            let _ = values.push(value);
        }
        Self { values }
    }

    fn index_of(key: &str) -> Option<usize> {
        CATALOG.iter().position(|def| def.key == key)
    }

    /// Look up an option's definition
    pub fn definition(key: &str) -> Option<&'static OptionDef> {
        Self::index_of(key).map(|i| &CATALOG[i])
    }

    /// Current value of an option
    pub fn get(&self, key: &str) -> Result<&Value, OptionError> {
        Self::index_of(key)
            .map(|i| &self.values[i])
            .ok_or(OptionError::UnknownOption)
    }

    /// Validate `raw` against the option's validator and commit the new
    /// value; a rejection leaves the prior value untouched
    pub fn set(&mut self, key: &str, raw: &str) -> Result<&Value, OptionError> {
        let i = Self::index_of(key).ok_or(OptionError::UnknownOption)?;
        let value = CATALOG[i].validator.validate(raw)?;
        self.values[i] = value;
        Ok(&self.values[i])
    }

    /// Replace a value directly with an already-typed one
    ///
    /// Used by internal state changes (logging disabled after a storage
    /// failure) which do not originate as console text.
    pub fn replace(&mut self, key: &str, value: Value) -> Result<(), OptionError> {
        let i = Self::index_of(key).ok_or(OptionError::UnknownOption)?;
        self.values[i] = value;
        Ok(())
    }

    /// All options with their definitions, in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&'static OptionDef, &Value)> {
        CATALOG.iter().zip(self.values.iter())
    }

    // Typed accessors for the render path. The catalog fixes each key's
    // type, so a mismatch can only mean a typo in the caller; fall back to
    // the neutral value rather than panic.

    pub fn flag(&self, key: &str) -> bool {
        matches!(self.get(key), Ok(Value::Bool(true)))
    }

    pub fn hour(&self, key: &str) -> u8 {
        match self.get(key) {
            Ok(Value::Hour(h)) => *h,
            _ => 0,
        }
    }

    pub fn color(&self) -> ColorChoice {
        match self.get("color") {
            Ok(Value::Color(c)) => *c,
            _ => ColorChoice::Auto,
        }
    }

    pub fn rotation(&self) -> Rotation {
        match self.get("rotation") {
            Ok(Value::Rotation(r)) => *r,
            _ => Rotation::Auto,
        }
    }

    pub fn text(&self, key: &str) -> &str {
        match self.get(key) {
            Ok(Value::Text(s)) => s.as_str(),
            _ => "",
        }
    }
}

fn fallback(validator: Validator) -> Value {
    match validator {
        Validator::Bool => Value::Bool(false),
        Validator::Color => Value::Color(ColorChoice::Auto),
        Validator::Hour => Value::Hour(0),
        Validator::Rotation => Value::Rotation(Rotation::Auto),
        Validator::Text => Value::Text(heapless::String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_size_matches() {
        assert_eq!(CATALOG.len(), NUM_OPTIONS);
    }

    #[test]
    fn test_every_default_validates() {
        for def in CATALOG {
            assert!(
                def.validator.validate(def.default).is_ok(),
                "default for '{}' rejected by its own validator",
                def.key
            );
        }
    }

    #[test]
    fn test_defaults() {
        let reg = Registry::new();
        assert!(!reg.flag("24h"));
        assert!(reg.flag("blink"));
        assert!(reg.flag("dim"));
        assert_eq!(reg.hour("night"), 22);
        assert_eq!(reg.hour("day"), 6);
        assert_eq!(reg.color(), ColorChoice::Auto);
        assert_eq!(reg.rotation(), Rotation::Auto);
        assert_eq!(reg.text("ssid"), "");
        assert!(!reg.flag("autojoin"));
    }

    #[test]
    fn test_set_then_get() {
        let mut reg = Registry::new();
        reg.set("color", "red").unwrap();
        assert_eq!(reg.get("color"), Ok(&Value::Color(ColorChoice::Red)));
        reg.set("night", "21").unwrap();
        assert_eq!(reg.hour("night"), 21);
    }

    #[test]
    fn test_rejection_keeps_prior_value() {
        let mut reg = Registry::new();
        reg.set("night", "20").unwrap();
        assert_eq!(
            reg.set("night", "99"),
            Err(OptionError::InvalidValue)
        );
        assert_eq!(reg.hour("night"), 20);
    }

    #[test]
    fn test_unknown_key() {
        let mut reg = Registry::new();
        assert_eq!(reg.set("nope", "1"), Err(OptionError::UnknownOption));
        assert_eq!(reg.get("nope"), Err(OptionError::UnknownOption));
    }

    #[test]
    fn test_iteration_order_is_registration_order() {
        let reg = Registry::new();
        let keys: heapless::Vec<&str, NUM_OPTIONS> =
            reg.iter().map(|(def, _)| def.key).collect();
        assert_eq!(&keys[..3], &["24h", "blink", "center"]);
        assert_eq!(keys[keys.len() - 1], "autojoin");
    }

    #[test]
    fn test_masked_flag() {
        let def = Registry::definition("passwd").unwrap();
        assert!(def.masked);
        assert!(def.persisted);
        assert!(!Registry::definition("ssid").unwrap().masked);
    }
}
