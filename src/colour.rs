//! The closed set of colours supported by the CheerLights API.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;

use crate::error::{TweeterError, TweeterResult};

/// Colours supported by the CheerLights API, with their RGB codes.
///
/// String lookups are case-insensitive against the canonical names only;
/// arbitrary RGB integers are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum Colour {
    Red,
    Green,
    Blue,
    Cyan,
    White,
    Oldlace,
    Purple,
    Magenta,
    Yellow,
    Orange,
    Pink,
}

impl Colour {
    /// All known colours, in CheerLights declaration order.
    pub const ALL: [Colour; 11] = [
        Colour::Red,
        Colour::Green,
        Colour::Blue,
        Colour::Cyan,
        Colour::White,
        Colour::Oldlace,
        Colour::Purple,
        Colour::Magenta,
        Colour::Yellow,
        Colour::Orange,
        Colour::Pink,
    ];

    /// Canonical lowercase name, as used in tweet payloads.
    pub fn name(&self) -> &'static str {
        match self {
            Colour::Red => "red",
            Colour::Green => "green",
            Colour::Blue => "blue",
            Colour::Cyan => "cyan",
            Colour::White => "white",
            Colour::Oldlace => "oldlace",
            Colour::Purple => "purple",
            Colour::Magenta => "magenta",
            Colour::Yellow => "yellow",
            Colour::Orange => "orange",
            Colour::Pink => "pink",
        }
    }

    /// RGB code for the colour.
    pub fn rgb(&self) -> u32 {
        match self {
            Colour::Red => 0xFF0000,
            Colour::Green => 0x008000,
            Colour::Blue => 0x0000FF,
            Colour::Cyan => 0x00FFFF,
            Colour::White => 0xFFFFFF,
            Colour::Oldlace => 0xFDF5E6,
            Colour::Purple => 0x800080,
            Colour::Magenta => 0xFF00FF,
            Colour::Yellow => 0xFFFF00,
            Colour::Orange => 0xFFA500,
            Colour::Pink => 0xFFC0CB,
        }
    }

    /// Validate an untyped colour value, e.g. one pulled out of a JSON payload.
    ///
    /// Only strings naming a known colour are accepted. Any other JSON type
    /// (including an integer RGB code) fails with `InvalidType`. This is a
    /// pure precondition check and never touches connection state.
    pub fn verify(value: &serde_json::Value) -> TweeterResult<Colour> {
        match value {
            serde_json::Value::String(name) => name.parse(),
            serde_json::Value::Null => Err(TweeterError::InvalidType { found: "null" }),
            serde_json::Value::Bool(_) => Err(TweeterError::InvalidType { found: "a bool" }),
            serde_json::Value::Number(_) => Err(TweeterError::InvalidType { found: "a number" }),
            serde_json::Value::Array(_) => Err(TweeterError::InvalidType { found: "an array" }),
            serde_json::Value::Object(_) => Err(TweeterError::InvalidType { found: "an object" }),
        }
    }
}

impl FromStr for Colour {
    type Err = TweeterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Colour::ALL
            .iter()
            .find(|colour| colour.name().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| TweeterError::InvalidColour(s.to_string()))
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_all_names_round_trip() {
        for colour in Colour::ALL {
            assert_eq!(colour.name().parse::<Colour>().unwrap(), colour);
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!("BLUE".parse::<Colour>().unwrap(), Colour::Blue);
        assert_eq!("OldLace".parse::<Colour>().unwrap(), Colour::Oldlace);
        assert_eq!("magenta".parse::<Colour>().unwrap(), Colour::Magenta);
    }

    #[test]
    fn test_unknown_name_rejected() {
        let err = "darkblue".parse::<Colour>().unwrap_err();
        assert!(matches!(err, TweeterError::InvalidColour(name) if name == "darkblue"));
    }

    #[test]
    fn test_rgb_codes() {
        assert_eq!(Colour::Red.rgb(), 0xFF0000);
        assert_eq!(Colour::Green.rgb(), 0x008000);
        assert_eq!(Colour::Oldlace.rgb(), 0xFDF5E6);
        assert_eq!(Colour::Pink.rgb(), 0xFFC0CB);
    }

    #[test]
    fn test_verify_accepts_string_values() {
        assert_eq!(Colour::verify(&json!("orange")).unwrap(), Colour::Orange);
        assert_eq!(Colour::verify(&json!("CYAN")).unwrap(), Colour::Cyan);
    }

    #[test]
    fn test_verify_rejects_non_string_types() {
        // An RGB integer is not a legal way to name a colour.
        assert!(matches!(
            Colour::verify(&json!(0xFFFFFF)).unwrap_err(),
            TweeterError::InvalidType { .. }
        ));
        assert!(matches!(
            Colour::verify(&json!(true)).unwrap_err(),
            TweeterError::InvalidType { .. }
        ));
        assert!(matches!(
            Colour::verify(&serde_json::Value::Null).unwrap_err(),
            TweeterError::InvalidType { .. }
        ));
    }

    #[test]
    fn test_verify_rejects_unknown_colour_string() {
        assert!(matches!(
            Colour::verify(&json!("darkblue")).unwrap_err(),
            TweeterError::InvalidColour(_)
        ));
    }
}
