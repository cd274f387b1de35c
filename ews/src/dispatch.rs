//! # Mail dispatch
//!
//! Module dedicated to the dispatch of a [`MailSendRequest`] through
//! a client library. The dispatch is linear: validate the request,
//! create a session, authenticate it, resolve its endpoint, build
//! the message then send it. Nothing is retried and errors raised by
//! the client library are returned as they are.

use std::sync::Arc;

use tracing::{debug, info, trace};

use crate::{
    client::{BodyType, ClientLibrary, Message, Session, WebCredentials},
    config::DispatchConfig,
    library::{self, LoadLibrary, LocateLibrary, SystemRegistry},
    request::{Credential, MailSendRequest},
    version::ExchangeVersion,
    Error, Result,
};

/// The mail dispatcher.
///
/// Holds a loaded client library and the dispatch configuration. A
/// new session is created for every message sent, so the dispatcher
/// keeps no state between two dispatches.
#[derive(Clone)]
pub struct MailDispatcher {
    library: Arc<dyn ClientLibrary>,
    config: DispatchConfig,
}

impl MailDispatcher {
    pub fn new(library: Arc<dyn ClientLibrary>, config: DispatchConfig) -> Self {
        Self { library, config }
    }

    /// Build a dispatcher out of the newest client library found in
    /// the given registry.
    pub fn from_registry(
        registry: &dyn LocateLibrary,
        loader: &dyn LoadLibrary,
        config: DispatchConfig,
    ) -> Result<Self> {
        let location = library::locate_newest(registry)?;
        let library = library::load_library(loader, &location)?;
        Ok(Self::new(library, config))
    }

    /// Build a dispatcher out of the newest client library found in
    /// the registry of the current platform.
    ///
    /// The registry is consulted once per process, see
    /// [`library::locate_newest_once`].
    pub fn from_system(loader: &dyn LoadLibrary, config: DispatchConfig) -> Result<Self> {
        let location = library::locate_newest_once(&SystemRegistry::default())?;
        let library = library::load_library(loader, location)?;
        Ok(Self::new(library, config))
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Send the message described by the given request.
    ///
    /// The request is validated before any session is created.
    pub async fn send(&self, req: &MailSendRequest) -> Result<()> {
        req.validate()?;
        let version = req.version()?;

        info!(to = ?req.to, send_only = req.send_only, "sending message");

        let mut session = self.new_session(version)?;
        self.authenticate(session.as_mut(), &req.credential).await?;
        self.resolve_endpoint(session.as_mut(), req.autodiscover_address.as_deref())
            .await?;

        let mut msg = session.new_message()?;
        populate_message(msg.as_mut(), req)?;

        if req.send_only {
            debug!("sending message without saving a copy");
            msg.send().await?;
        } else {
            debug!("sending message and saving a copy");
            msg.send_and_save_copy().await?;
        }

        info!("message successfully sent");
        Ok(())
    }

    fn new_session(&self, version: Option<ExchangeVersion>) -> Result<Box<dyn Session>> {
        match version {
            Some(version) => debug!(%version, "creating session bound to protocol version"),
            None => debug!("creating session bound to default protocol version"),
        }

        Ok(self.library.new_session(version)?)
    }

    async fn authenticate(&self, session: &mut dyn Session, credential: &Credential) -> Result<()> {
        match credential {
            Credential::Ambient => {
                debug!("authenticating session with default credentials");
                session.use_default_credentials()?;
            }
            Credential::Explicit { username, password } => {
                debug!(username, "authenticating session with explicit credentials");
                let password = password
                    .get()
                    .await
                    .map_err(|err| Error::GetPassword(err, username.clone()))?;
                session.set_credentials(WebCredentials::new(username, password))?;
            }
        }

        Ok(())
    }

    async fn resolve_endpoint(&self, session: &mut dyn Session, addr: Option<&str>) -> Result<()> {
        match addr {
            None => {
                let endpoint = &self.config.endpoint;
                debug!(%endpoint, "binding session to endpoint");
                session.set_url(endpoint)?;
            }
            Some(addr) => {
                let policy = &self.config.redirect_policy;
                debug!(addr, ?policy, "discovering session endpoint");
                session.autodiscover_url(addr, policy).await?;
            }
        }

        Ok(())
    }
}

fn populate_message(msg: &mut dyn Message, req: &MailSendRequest) -> Result<()> {
    for addr in &req.to {
        trace!(addr, "adding to recipient");
        msg.add_to(addr)?;
    }

    for path in &req.attachments {
        trace!(?path, "attaching file");
        msg.attach_file(path)?;
    }

    if let Some(body) = &req.body {
        msg.set_body(body)?;
    }

    if !req.body_is_html {
        msg.set_body_type(BodyType::Text)?;
    }

    for addr in &req.cc {
        trace!(addr, "adding cc recipient");
        msg.add_cc(addr)?;
    }

    for addr in &req.bcc {
        trace!(addr, "adding bcc recipient");
        msg.add_bcc(addr)?;
    }

    if let Some(from) = &req.from {
        msg.set_from(from)?;
    }

    msg.set_importance(req.priority.into())?;

    if let Some(subject) = &req.subject {
        msg.set_subject(subject)?;
    }

    if let Some(reply_to) = &req.reply_to {
        msg.set_reply_to(reply_to)?;
    }

    Ok(())
}

/// Send the message described by the given request, using the newest
/// client library installed on the system and the default
/// configuration.
///
/// See [`MailDispatcher::from_system`] and [`MailDispatcher::send`].
pub async fn send_mail_message(req: &MailSendRequest, loader: &dyn LoadLibrary) -> Result<()> {
    MailDispatcher::from_system(loader, DispatchConfig::default())?
        .send(req)
        .await
}
