//! Instruments offered by the interactive menu

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Instrument that can be picked by name instead of by raw ticker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Instrument {
    Sp500,
    Nasdaq100,
    EurJpy,
}

impl Instrument {
    /// All instruments, in menu order
    pub const ALL: [Instrument; 3] = [Instrument::Sp500, Instrument::Nasdaq100, Instrument::EurJpy];

    /// Yahoo Finance ticker
    pub fn symbol(&self) -> &'static str {
        match self {
            Instrument::Sp500 => "^GSPC",
            Instrument::Nasdaq100 => "^NDX",
            Instrument::EurJpy => "EURJPY=X",
        }
    }

    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Instrument::Sp500 => "S&P 500",
            Instrument::Nasdaq100 => "NASDAQ 100",
            Instrument::EurJpy => "EURJPY",
        }
    }

    /// Instrument behind a menu option ("1", "2", "3")
    pub fn from_menu_choice(choice: &str) -> Option<Self> {
        match choice.trim() {
            "1" => Some(Instrument::Sp500),
            "2" => Some(Instrument::Nasdaq100),
            "3" => Some(Instrument::EurJpy),
            _ => None,
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.symbol())
    }
}

impl FromStr for Instrument {
    type Err = String;

    /// Accepts a short key ("sp500", "ndx", "eurjpy") or the ticker itself
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sp500" | "spx" | "^gspc" => Ok(Instrument::Sp500),
            "ndx" | "nasdaq100" | "^ndx" => Ok(Instrument::Nasdaq100),
            "eurjpy" | "eurjpy=x" => Ok(Instrument::EurJpy),
            other => Err(format!(
                "unknown instrument '{}' (expected sp500, ndx or eurjpy)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_choices() {
        assert_eq!(Instrument::from_menu_choice(" 1 "), Some(Instrument::Sp500));
        assert_eq!(Instrument::from_menu_choice("3"), Some(Instrument::EurJpy));
        assert_eq!(Instrument::from_menu_choice("4"), None);
        assert_eq!(Instrument::from_menu_choice("x"), None);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("NDX".parse::<Instrument>(), Ok(Instrument::Nasdaq100));
        assert_eq!("EURJPY=X".parse::<Instrument>(), Ok(Instrument::EurJpy));
        assert!("dax".parse::<Instrument>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Instrument::Sp500.to_string(), "S&P 500 (^GSPC)");
    }
}
