use std::{fmt, str::FromStr};

use super::Error;

/// The priority of a message.
///
/// The priority is mapped one-to-one onto the importance of the
/// message built by the client library.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(
    feature = "derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Normal => "Normal",
            Self::High => "High",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(priority: &str) -> Result<Self, Self::Err> {
        match priority.trim() {
            p if p.eq_ignore_ascii_case("low") => Ok(Self::Low),
            p if p.eq_ignore_ascii_case("normal") => Ok(Self::Normal),
            p if p.eq_ignore_ascii_case("high") => Ok(Self::High),
            _ => Err(Error::ParsePriority(priority.to_owned())),
        }
    }
}
