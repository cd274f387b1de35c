//! Rust library to send emails through Exchange Web Services client
//! libraries.
//!
//! The library does not speak the EWS protocol itself. It takes a
//! [`MailSendRequest`], validates it, then maps it onto the object
//! model of an installed client library: a session is created,
//! authenticated and bound to an endpoint, a message is built out of
//! the request then sent.
//!
//! The client library is described by the traits of the [`client`]
//! module. Installed libraries are found with the [`library`]
//! module, which selects the newest version registered on the
//! system.
//!
//! ```rust,ignore
//! use ews_mail::{library::StaticLoader, send_mail_message, MailSendRequest, Priority};
//!
//! let loader = StaticLoader::new(my_client_library);
//! let req = MailSendRequest::new(["bob@example.com"])
//!     .with_subject("Report")
//!     .with_attachment("./data.csv")
//!     .with_priority(Priority::High);
//!
//! send_mail_message(&req, &loader).await?;
//! ```

pub mod client;
pub mod config;
pub mod dispatch;
mod error;
pub mod library;
pub mod request;
pub mod version;

#[doc(inline)]
pub use self::{
    config::DispatchConfig,
    dispatch::{send_mail_message, MailDispatcher},
    error::{AnyBoxedError, AnyError, AnyResult, Error, Result},
    request::{Credential, MailSendRequest, Priority},
    version::ExchangeVersion,
};
