//! In-memory client library for testing purpose.
//!
//! The [`RecordingLibrary`] implements the client traits of
//! `ews-mail-lib` without any network activity: every session it
//! creates and every message sent through those sessions is
//! recorded, so tests can inspect what the dispatcher asked for.
//! Failures can be injected at session creation and at send time.

use std::{
    any::Any,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use ews_mail::{
    client::{
        BodyType, ClientLibrary, Importance, Message, RedirectPolicy, Session, WebCredentials,
    },
    AnyError, AnyResult, ExchangeVersion,
};
use thiserror::Error;
use tracing::debug;
use url::Url;

/// The error raised by the recording library.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum RecordingError {
    #[error("cannot create session: {0}")]
    SessionRefused(String),
    #[error("cannot send message: {0}")]
    SendRefused(String),
    #[error("redirection to {0} refused by policy")]
    RedirectRefused(String),
}

impl AnyError for RecordingError {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The way a session has been authenticated.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum AuthRecord {
    #[default]
    None,
    Default,
    Explicit(WebCredentials),
}

/// The endpoint a session has been bound to.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EndpointRecord {
    Url(Url),
    Autodiscovered { addr: String, url: String },
}

/// The way a message has been sent.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Disposition {
    SendOnly,
    SendAndSaveCopy,
}

/// A message sent through a recorded session.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MessageRecord {
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub attachments: Vec<PathBuf>,
    pub body: Option<String>,
    pub body_type: BodyType,
    pub from: Option<String>,
    pub reply_to: Option<String>,
    pub subject: Option<String>,
    pub importance: Importance,
    pub disposition: Option<Disposition>,
}

/// A session created by the recording library.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SessionRecord {
    pub version: Option<ExchangeVersion>,
    pub auth: AuthRecord,
    pub endpoint: Option<EndpointRecord>,
    pub messages: Vec<MessageRecord>,
}

#[derive(Clone, Debug, Default)]
struct Behavior {
    session_error: Option<String>,
    send_error: Option<String>,
    autodiscover_redirect: Option<String>,
}

/// The recording client library.
///
/// Clones share the same records.
#[derive(Clone, Debug, Default)]
pub struct RecordingLibrary {
    sessions: Arc<Mutex<Vec<SessionRecord>>>,
    behavior: Arc<Behavior>,
}

impl RecordingLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every session creation fail with the given reason.
    pub fn failing_sessions(self, reason: impl ToString) -> Self {
        self.with_behavior(|behavior| behavior.session_error = Some(reason.to_string()))
    }

    /// Make every send fail with the given reason.
    pub fn failing_sends(self, reason: impl ToString) -> Self {
        self.with_behavior(|behavior| behavior.send_error = Some(reason.to_string()))
    }

    /// Make autodiscovery propose a redirection to the given
    /// endpoint, which is then submitted to the redirect policy.
    pub fn with_autodiscover_redirect(self, url: impl ToString) -> Self {
        self.with_behavior(|behavior| behavior.autodiscover_redirect = Some(url.to_string()))
    }

    fn with_behavior(self, f: impl FnOnce(&mut Behavior)) -> Self {
        let mut behavior = (*self.behavior).clone();
        f(&mut behavior);

        Self {
            sessions: self.sessions,
            behavior: Arc::new(behavior),
        }
    }

    /// Return a snapshot of all the sessions created so far.
    pub fn sessions(&self) -> Vec<SessionRecord> {
        lock(&self.sessions).clone()
    }

    /// Return a snapshot of all the messages sent so far, across all
    /// sessions.
    pub fn sent_messages(&self) -> Vec<MessageRecord> {
        lock(&self.sessions)
            .iter()
            .flat_map(|session| session.messages.clone())
            .collect()
    }
}

impl ClientLibrary for RecordingLibrary {
    fn new_session(&self, version: Option<ExchangeVersion>) -> AnyResult<Box<dyn Session>> {
        if let Some(reason) = &self.behavior.session_error {
            return Err(Box::new(RecordingError::SessionRefused(reason.clone())));
        }

        let mut sessions = lock(&self.sessions);
        sessions.push(SessionRecord {
            version,
            ..Default::default()
        });

        debug!(?version, "recording new session");

        Ok(Box::new(RecordingSession {
            sessions: self.sessions.clone(),
            behavior: self.behavior.clone(),
            index: sessions.len() - 1,
        }))
    }
}

struct RecordingSession {
    sessions: Arc<Mutex<Vec<SessionRecord>>>,
    behavior: Arc<Behavior>,
    index: usize,
}

impl RecordingSession {
    fn update(&self, f: impl FnOnce(&mut SessionRecord)) {
        f(&mut lock(&self.sessions)[self.index])
    }
}

#[async_trait]
impl Session for RecordingSession {
    fn set_credentials(&mut self, credentials: WebCredentials) -> AnyResult<()> {
        self.update(|session| session.auth = AuthRecord::Explicit(credentials));
        Ok(())
    }

    fn use_default_credentials(&mut self) -> AnyResult<()> {
        self.update(|session| session.auth = AuthRecord::Default);
        Ok(())
    }

    fn set_url(&mut self, url: &Url) -> AnyResult<()> {
        self.update(|session| session.endpoint = Some(EndpointRecord::Url(url.clone())));
        Ok(())
    }

    async fn autodiscover_url(&mut self, addr: &str, policy: &RedirectPolicy) -> AnyResult<()> {
        let url = match &self.behavior.autodiscover_redirect {
            Some(redirect) if policy.accepts(addr, redirect) => redirect.clone(),
            Some(redirect) => {
                return Err(Box::new(RecordingError::RedirectRefused(redirect.clone())));
            }
            None => {
                let domain = addr.rsplit_once('@').map(|(_, d)| d).unwrap_or(addr);
                format!("https://autodiscover.{domain}/EWS/Exchange.asmx")
            }
        };

        let addr = addr.to_owned();
        self.update(|session| {
            session.endpoint = Some(EndpointRecord::Autodiscovered { addr, url })
        });

        Ok(())
    }

    fn new_message(&self) -> AnyResult<Box<dyn Message>> {
        Ok(Box::new(RecordingMessage {
            sessions: self.sessions.clone(),
            behavior: self.behavior.clone(),
            index: self.index,
            record: MessageRecord::default(),
        }))
    }
}

struct RecordingMessage {
    sessions: Arc<Mutex<Vec<SessionRecord>>>,
    behavior: Arc<Behavior>,
    index: usize,
    record: MessageRecord,
}

impl RecordingMessage {
    fn deliver(&mut self, disposition: Disposition) -> AnyResult<()> {
        if let Some(reason) = &self.behavior.send_error {
            return Err(Box::new(RecordingError::SendRefused(reason.clone())));
        }

        let mut record = self.record.clone();
        record.disposition = Some(disposition);
        debug!(?disposition, to = ?record.to, "recording sent message");
        lock(&self.sessions)[self.index].messages.push(record);

        Ok(())
    }
}

#[async_trait]
impl Message for RecordingMessage {
    fn add_to(&mut self, addr: &str) -> AnyResult<()> {
        self.record.to.push(addr.to_owned());
        Ok(())
    }

    fn add_cc(&mut self, addr: &str) -> AnyResult<()> {
        self.record.cc.push(addr.to_owned());
        Ok(())
    }

    fn add_bcc(&mut self, addr: &str) -> AnyResult<()> {
        self.record.bcc.push(addr.to_owned());
        Ok(())
    }

    fn attach_file(&mut self, path: &Path) -> AnyResult<()> {
        self.record.attachments.push(path.to_owned());
        Ok(())
    }

    fn set_body(&mut self, body: &str) -> AnyResult<()> {
        self.record.body = Some(body.to_owned());
        Ok(())
    }

    fn set_body_type(&mut self, body_type: BodyType) -> AnyResult<()> {
        self.record.body_type = body_type;
        Ok(())
    }

    fn set_from(&mut self, addr: &str) -> AnyResult<()> {
        self.record.from = Some(addr.to_owned());
        Ok(())
    }

    fn set_reply_to(&mut self, addr: &str) -> AnyResult<()> {
        self.record.reply_to = Some(addr.to_owned());
        Ok(())
    }

    fn set_subject(&mut self, subject: &str) -> AnyResult<()> {
        self.record.subject = Some(subject.to_owned());
        Ok(())
    }

    fn set_importance(&mut self, importance: Importance) -> AnyResult<()> {
        self.record.importance = importance;
        Ok(())
    }

    async fn send(&mut self) -> AnyResult<()> {
        self.deliver(Disposition::SendOnly)
    }

    async fn send_and_save_copy(&mut self) -> AnyResult<()> {
        self.deliver(Disposition::SendAndSaveCopy)
    }
}

fn lock(sessions: &Mutex<Vec<SessionRecord>>) -> MutexGuard<'_, Vec<SessionRecord>> {
    sessions
        .lock()
        .expect("recorded sessions lock should not be poisoned")
}
