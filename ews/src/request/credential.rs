use std::fmt;

use secret::Secret;

/// The source of the credentials used to authenticate a session.
#[derive(Clone, Default, Eq, PartialEq)]
#[cfg_attr(
    feature = "derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum Credential {
    /// Use the identity of the calling process, as known by the
    /// client library.
    #[default]
    Ambient,

    /// Use the given username and password.
    Explicit { username: String, password: Secret },
}

impl Credential {
    /// Build explicit credentials out of a username and a raw
    /// password.
    pub fn new_explicit(username: impl ToString, password: impl ToString) -> Self {
        Self::Explicit {
            username: username.to_string(),
            password: Secret::new_raw(password.to_string()),
        }
    }

    pub fn is_ambient(&self) -> bool {
        matches!(self, Self::Ambient)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ambient => f.write_str("Ambient"),
            Self::Explicit { username, .. } => f
                .debug_struct("Explicit")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}
