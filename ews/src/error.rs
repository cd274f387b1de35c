use std::{any::Any, error, result};

use thiserror::Error;

use crate::{library, request};

/// The global `Result` alias of the library.
pub type Result<T> = result::Result<T, Error>;

/// The global `Error` enum of the library.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Request(#[from] request::Error),
    #[error(transparent)]
    Library(#[from] library::Error),
    #[error("cannot get password of user {1}")]
    GetPassword(#[source] secret::Error, String),
    /// Error raised by the client library. The inner error is kept
    /// as it is, so it can be downcasted back to its original type.
    #[error(transparent)]
    Client(AnyBoxedError),
}

impl Error {
    /// Return `true` if the error was caused by an argument of the
    /// request, before any network activity.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::Request(_))
    }

    /// Return `true` if the error was caused by the absence of any
    /// installed client library.
    pub fn is_dependency_missing(&self) -> bool {
        matches!(
            self,
            Self::Library(library::Error::DependencyMissing(_))
                | Self::Library(library::Error::LibraryFileMissing(_))
        )
    }

    /// Return the client library error, if any.
    pub fn as_client_error(&self) -> Option<&AnyBoxedError> {
        match self {
            Self::Client(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AnyBoxedError> for Error {
    fn from(err: AnyBoxedError) -> Self {
        Self::Client(err)
    }
}

/// The global any `Result` alias of the library.
///
/// The difference with [`Result`] is that it takes a dynamic error
/// `Box<dyn AnyError>`.
pub type AnyResult<T> = result::Result<T, AnyBoxedError>;

/// The global, dowcastable any `Error` trait of the library.
///
/// This trait is used instead of [`Error`] when an error that is not
/// known at compilation time cannot be placed in a generic due to
/// object-safe trait constraint. The main use case is for client
/// library implementations.
pub trait AnyError: error::Error + Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

/// The global any boxed `Error` alias of the module.
pub type AnyBoxedError = Box<dyn AnyError + Send + 'static>;

impl error::Error for AnyBoxedError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        self.as_ref().source()
    }
}
