//! Log severity as a typed enum.
//!
//! A [`Logger`](crate::Logger) is constructed with a minimum level; any
//! message logged below it is dropped before it ever reaches the buffer.
//! Levels are ordered, so the gate is a plain comparison:
//!
//! ```rust
//! use tome::Level;
//!
//! assert!(Level::Debug < Level::Info);
//! assert!(Level::Fatal > Level::Error);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// A log message severity, lowest to highest.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl Level {
    /// Returns the lowercase name (e.g. `"warn"`), as it appears in emitted
    /// events and configuration files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Error => "error",
            Self::Fatal => "fatal",
            Self::Info  => "info",
            Self::Warn  => "warn",
        }
    }
}

/// Parses a level name, case-insensitively (`"warn"`, `"WARN"`, `"Warn"`).
impl FromStr for Level {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "error" => Ok(Self::Error),
            "fatal" => Ok(Self::Fatal),
            "info"  => Ok(Self::Info),
            "warn"  => Ok(Self::Warn),
            _       => Err(()),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_lowest_to_highest() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
        assert!(Level::Error < Level::Fatal);
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("warn".parse(), Ok(Level::Warn));
        assert_eq!("ERROR".parse(), Ok(Level::Error));
        assert_eq!("Info".parse(), Ok(Level::Info));
        assert_eq!("verbose".parse::<Level>(), Err(()));
    }

    #[test]
    fn round_trips_through_as_str() {
        for level in [Level::Debug, Level::Info, Level::Warn, Level::Error, Level::Fatal] {
            assert_eq!(level.as_str().parse(), Ok(level));
        }
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Level::Fatal).unwrap(), "\"fatal\"");
    }
}
