//! # Mail send request
//!
//! Module dedicated to the request describing the message to send.
//! A request lives for a single dispatch: it is built by the caller,
//! validated, translated into client library objects, then dropped.

mod credential;
mod priority;

use std::{
    path::{Path, PathBuf},
    result,
    str::FromStr,
};

use email_address::EmailAddress;
use thiserror::Error;
use tracing::debug;

#[doc(inline)]
pub use self::{credential::Credential, priority::Priority};
use crate::version::ExchangeVersion;

/// The global `Result` alias of the module.
pub type Result<T> = result::Result<T, Error>;

/// The global `Error` enum of the module.
///
/// All those errors are raised before any network activity.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot send message: at least one recipient is required")]
    EmptyRecipients,
    #[error("cannot find attachment file at {0:?}")]
    AttachmentNotFound(PathBuf),
    #[error("invalid priority {0}: expected Low, Normal or High")]
    ParsePriority(String),
    #[error("invalid protocol version hint {0}")]
    ParseVersionHint(String),
    #[error("cannot parse autodiscovery address {0}")]
    ParseAutodiscoverAddress(String, #[source] email_address::Error),
}

/// The mail send request.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(
    feature = "derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case", default)
)]
pub struct MailSendRequest {
    /// The primary recipients. Must not be empty.
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,

    pub subject: Option<String>,
    pub body: Option<String>,

    /// Keep the body content type of the client library (HTML)
    /// instead of forcing plain text.
    pub body_is_html: bool,

    /// Paths of the files to attach. Each of them must exist.
    pub attachments: Vec<PathBuf>,

    /// The sender address. Defaults to the identity of the session.
    pub from: Option<String>,
    pub reply_to: Option<String>,

    pub priority: Priority,
    pub credential: Credential,

    /// The name of the protocol version the session should be bound
    /// to, for example `Exchange2010_SP2`.
    pub version_hint: Option<String>,

    /// The address used to discover the service endpoint. When
    /// absent, the endpoint of the configuration is used.
    pub autodiscover_address: Option<String>,

    /// Deliver the message without keeping a copy in the sent items.
    pub send_only: bool,
}

impl MailSendRequest {
    pub fn new<I, S>(to: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        Self {
            to: to.into_iter().map(|addr| addr.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn with_cc<I: IntoIterator<Item = S>, S: ToString>(mut self, cc: I) -> Self {
        self.cc = cc.into_iter().map(|addr| addr.to_string()).collect();
        self
    }

    pub fn with_bcc<I: IntoIterator<Item = S>, S: ToString>(mut self, bcc: I) -> Self {
        self.bcc = bcc.into_iter().map(|addr| addr.to_string()).collect();
        self
    }

    pub fn with_subject(mut self, subject: impl ToString) -> Self {
        self.subject = Some(subject.to_string());
        self
    }

    pub fn with_body(mut self, body: impl ToString) -> Self {
        self.body = Some(body.to_string());
        self
    }

    pub fn with_html_body(mut self, body: impl ToString) -> Self {
        self.body = Some(body.to_string());
        self.body_is_html = true;
        self
    }

    pub fn with_attachments<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.attachments = paths
            .into_iter()
            .map(|path| path.as_ref().to_owned())
            .collect();
        self
    }

    /// Append one attachment to the ones already set.
    pub fn with_attachment(mut self, path: impl AsRef<Path>) -> Self {
        self.attachments.push(path.as_ref().to_owned());
        self
    }

    pub fn with_from(mut self, from: impl ToString) -> Self {
        self.from = Some(from.to_string());
        self
    }

    pub fn with_reply_to(mut self, reply_to: impl ToString) -> Self {
        self.reply_to = Some(reply_to.to_string());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = credential;
        self
    }

    pub fn with_version_hint(mut self, hint: impl ToString) -> Self {
        self.version_hint = Some(hint.to_string());
        self
    }

    pub fn with_autodiscover_address(mut self, addr: impl ToString) -> Self {
        self.autodiscover_address = Some(addr.to_string());
        self
    }

    pub fn with_send_only(mut self, send_only: bool) -> Self {
        self.send_only = send_only;
        self
    }

    /// Check the request before anything is sent over the network.
    pub fn validate(&self) -> Result<()> {
        if self.to.is_empty() {
            return Err(Error::EmptyRecipients);
        }

        if let Some(path) = self.attachments.iter().find(|path| !path.is_file()) {
            return Err(Error::AttachmentNotFound(path.clone()));
        }

        self.version()?;

        if let Some(addr) = &self.autodiscover_address {
            EmailAddress::from_str(addr)
                .map_err(|err| Error::ParseAutodiscoverAddress(addr.clone(), err))?;
        }

        debug!(to = self.to.len(), attachments = self.attachments.len(), "request is valid");
        Ok(())
    }

    /// Parse the protocol version hint, if any.
    pub fn version(&self) -> Result<Option<ExchangeVersion>> {
        self.version_hint
            .as_deref()
            .map(ExchangeVersion::from_str)
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{Error, MailSendRequest};
    use crate::version::ExchangeVersion;

    #[test]
    fn empty_recipients() {
        let req = MailSendRequest::default().with_subject("Test");
        assert!(matches!(req.validate(), Err(Error::EmptyRecipients)));
    }

    #[test]
    fn missing_attachment() {
        let req = MailSendRequest::new(["b@x.com"]).with_attachment("./missing.csv");

        match req.validate() {
            Err(Error::AttachmentNotFound(path)) => {
                assert_eq!(path, PathBuf::from("./missing.csv"))
            }
            res => panic!("expected missing attachment error, got {res:?}"),
        }
    }

    #[test]
    fn first_missing_attachment_is_reported() {
        let req = MailSendRequest::new(["b@x.com"])
            .with_attachment(concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml"))
            .with_attachment("/nonexistent/first.csv")
            .with_attachment("/nonexistent/second.csv");

        match req.validate() {
            Err(Error::AttachmentNotFound(path)) => {
                assert_eq!(path, PathBuf::from("/nonexistent/first.csv"))
            }
            res => panic!("expected missing attachment error, got {res:?}"),
        }
    }

    #[test]
    fn directory_attachment() {
        let dir = env!("CARGO_MANIFEST_DIR");
        let req = MailSendRequest::new(["b@x.com"]).with_attachment(dir);

        match req.validate() {
            Err(Error::AttachmentNotFound(path)) => assert_eq!(path, PathBuf::from(dir)),
            res => panic!("expected missing attachment error, got {res:?}"),
        }
    }

    #[test]
    fn attachments_builders() {
        let req = MailSendRequest::new(["b@x.com"])
            .with_attachment("a.csv")
            .with_attachments(["b.csv", "c.csv"])
            .with_attachment("d.csv");

        assert_eq!(
            req.attachments,
            vec![
                PathBuf::from("b.csv"),
                PathBuf::from("c.csv"),
                PathBuf::from("d.csv")
            ]
        );
    }

    #[test]
    fn invalid_version_hint() {
        let req = MailSendRequest::new(["b@x.com"]).with_version_hint("Exchange2099");
        assert!(matches!(req.validate(), Err(Error::ParseVersionHint(hint)) if hint == "Exchange2099"));
    }

    #[test]
    fn valid_version_hint() {
        let req = MailSendRequest::new(["b@x.com"]).with_version_hint("Exchange2010_SP1");
        assert!(req.validate().is_ok());
        assert_eq!(req.version().unwrap(), Some(ExchangeVersion::Exchange2010Sp1));
    }

    #[test]
    fn invalid_autodiscover_address() {
        let req = MailSendRequest::new(["b@x.com"]).with_autodiscover_address("not an address");
        assert!(matches!(
            req.validate(),
            Err(Error::ParseAutodiscoverAddress(addr, _)) if addr == "not an address"
        ));
    }

    #[test]
    fn minimal_request_is_valid() {
        let req = MailSendRequest::new(["b@x.com"]).with_subject("Test");
        assert!(req.validate().is_ok());
        assert_eq!(req.version().unwrap(), None);
    }
}
