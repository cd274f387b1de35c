//! # Protocol version
//!
//! Module dedicated to the protocol version a client session can be
//! bound to. The version is given as a hint by the caller, using the
//! member names of the client library version enumeration.

use std::{fmt, str::FromStr};

use crate::request::Error;

/// The protocol version a session is bound to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(
    feature = "derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub enum ExchangeVersion {
    Exchange2007Sp1,
    Exchange2010,
    Exchange2010Sp1,
    Exchange2010Sp2,
    Exchange2013,
    Exchange2013Sp1,
}

impl ExchangeVersion {
    pub const ALL: [ExchangeVersion; 6] = [
        Self::Exchange2007Sp1,
        Self::Exchange2010,
        Self::Exchange2010Sp1,
        Self::Exchange2010Sp2,
        Self::Exchange2013,
        Self::Exchange2013Sp1,
    ];

    /// Return the name of the version as spelled by the client
    /// library enumeration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exchange2007Sp1 => "Exchange2007_SP1",
            Self::Exchange2010 => "Exchange2010",
            Self::Exchange2010Sp1 => "Exchange2010_SP1",
            Self::Exchange2010Sp2 => "Exchange2010_SP2",
            Self::Exchange2013 => "Exchange2013",
            Self::Exchange2013Sp1 => "Exchange2013_SP1",
        }
    }
}

impl fmt::Display for ExchangeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExchangeVersion {
    type Err = Error;

    fn from_str(hint: &str) -> Result<Self, Self::Err> {
        let normalized = hint.trim().replace('_', "").to_ascii_lowercase();

        Self::ALL
            .into_iter()
            .find(|version| version.as_str().replace('_', "").to_ascii_lowercase() == normalized)
            .ok_or_else(|| Error::ParseVersionHint(hint.to_owned()))
    }
}

impl TryFrom<String> for ExchangeVersion {
    type Error = Error;

    fn try_from(hint: String) -> Result<Self, Self::Error> {
        hint.parse()
    }
}

impl From<ExchangeVersion> for String {
    fn from(version: ExchangeVersion) -> Self {
        version.to_string()
    }
}
