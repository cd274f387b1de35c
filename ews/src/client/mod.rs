//! # Client library
//!
//! Module dedicated to the object model of the client library the
//! dispatcher relies on. The library is opaque: this module only
//! describes the capabilities the dispatcher needs (creating a
//! session, authenticating it, resolving its endpoint, building and
//! sending a message). The wire protocol lives entirely inside the
//! implementations.

pub mod redirect;

use std::{fmt, path::Path};

use async_trait::async_trait;
use url::Url;

#[doc(inline)]
pub use self::redirect::{RedirectPolicy, RedirectPredicate};
use crate::{request::Priority, version::ExchangeVersion, AnyResult};

/// The client library.
///
/// Entry point of a loaded client library, able to create new
/// sessions.
pub trait ClientLibrary: Send + Sync {
    /// Create a new session, bound to the given protocol version or
    /// to the default version of the library when `None`.
    fn new_session(&self, version: Option<ExchangeVersion>) -> AnyResult<Box<dyn Session>>;
}

/// The client session.
///
/// A session is created for a single dispatch and is never shared.
#[async_trait]
pub trait Session: Send + Sync {
    /// Authenticate the session with the given credentials.
    fn set_credentials(&mut self, credentials: WebCredentials) -> AnyResult<()>;

    /// Authenticate the session with the identity of the calling
    /// process.
    fn use_default_credentials(&mut self) -> AnyResult<()>;

    /// Bind the session to the given endpoint.
    fn set_url(&mut self, url: &Url) -> AnyResult<()>;

    /// Discover the endpoint associated to the given address, then
    /// bind the session to it.
    ///
    /// Every redirection proposed during the discovery must be
    /// submitted to the given policy.
    async fn autodiscover_url(&mut self, addr: &str, policy: &RedirectPolicy) -> AnyResult<()>;

    /// Create a new empty message bound to the session.
    fn new_message(&self) -> AnyResult<Box<dyn Message>>;
}

/// The client message.
#[async_trait]
pub trait Message: Send + Sync {
    fn add_to(&mut self, addr: &str) -> AnyResult<()>;
    fn add_cc(&mut self, addr: &str) -> AnyResult<()>;
    fn add_bcc(&mut self, addr: &str) -> AnyResult<()>;

    /// Attach the file located at the given path.
    fn attach_file(&mut self, path: &Path) -> AnyResult<()>;

    fn set_body(&mut self, body: &str) -> AnyResult<()>;

    /// Override the content type of the body. The default content
    /// type of a message is [`BodyType::Html`].
    fn set_body_type(&mut self, body_type: BodyType) -> AnyResult<()>;

    fn set_from(&mut self, addr: &str) -> AnyResult<()>;
    fn set_reply_to(&mut self, addr: &str) -> AnyResult<()>;
    fn set_subject(&mut self, subject: &str) -> AnyResult<()>;
    fn set_importance(&mut self, importance: Importance) -> AnyResult<()>;

    /// Deliver the message without keeping any copy.
    async fn send(&mut self) -> AnyResult<()>;

    /// Deliver the message and save a copy in the sent items of the
    /// mailbox.
    async fn send_and_save_copy(&mut self) -> AnyResult<()>;
}

/// The content type of a message body.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum BodyType {
    #[default]
    Html,
    Text,
}

/// The importance of a message.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum Importance {
    Low,
    #[default]
    Normal,
    High,
}

impl From<Priority> for Importance {
    fn from(priority: Priority) -> Self {
        match priority {
            Priority::Low => Self::Low,
            Priority::Normal => Self::Normal,
            Priority::High => Self::High,
        }
    }
}

/// The credentials given to a session.
#[derive(Clone, Eq, PartialEq)]
pub struct WebCredentials {
    pub username: String,
    pub password: String,
}

impl WebCredentials {
    pub fn new(username: impl ToString, password: impl ToString) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }
}

impl fmt::Debug for WebCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
