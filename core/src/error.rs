//! Error types for call adaptation.
//!
//! # Design
//! Setup-time problems (`ShapeError`) are kept apart from execution-time
//! ones (`AdaptError`). At execution time three causes are distinguished and
//! never folded into each other: the server answered with a non-2xx status
//! (`HttpStatusError`), no response was received (`TransportError`), or the
//! body decoder failed (`DecodeError`, passed through untouched).

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

use crate::http::{ResponseBody, ResponseMeta};
use crate::shape::TypeDescriptor;

type BoxError = Box<dyn StdError + Send + Sync>;

/// A declared return type that cannot be adapted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// `Response` declared without its body type.
    #[error("return type `{0}` must be parameterized as Response<T>")]
    UnparameterizedEnvelope(TypeDescriptor),

    /// `Response` declared with more than one type argument.
    #[error("return type `{declared}` takes exactly one type argument, found {found}")]
    EnvelopeArity { declared: TypeDescriptor, found: usize },
}

/// No response was received: connection refused or reset, a body cut short,
/// or any other I/O failure below HTTP.
#[derive(Debug, Error)]
#[error("transport failure: {source}")]
pub struct TransportError {
    source: BoxError,
}

impl TransportError {
    pub fn new(cause: impl Into<BoxError>) -> Self {
        Self {
            source: cause.into(),
        }
    }

    /// The lower-layer error this wraps.
    pub fn cause(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.source.as_ref()
    }

    pub fn into_cause(self) -> BoxError {
        self.source
    }
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err)
    }
}

/// The decoder's own error, carried without re-labelling.
///
/// `Display` and `source()` are those of the wrapped error; use
/// [`DecodeError::get_ref`] or [`DecodeError::downcast_ref`] to reach it.
#[derive(Debug)]
pub struct DecodeError(BoxError);

impl DecodeError {
    pub fn new(err: impl Into<BoxError>) -> Self {
        Self(err.into())
    }

    pub fn get_ref(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.0.as_ref()
    }

    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.0.downcast_ref::<E>()
    }

    pub fn into_inner(self) -> BoxError {
        self.0
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl StdError for DecodeError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

/// A non-2xx response surfaced as an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("HTTP {} {}", .meta.status, .meta.reason)]
pub struct HttpStatusError {
    payload: ResponseBody,
    meta: ResponseMeta,
}

impl HttpStatusError {
    pub fn new(payload: ResponseBody, meta: ResponseMeta) -> Self {
        Self { payload, meta }
    }

    pub fn status(&self) -> u16 {
        self.meta.status
    }

    pub fn message(&self) -> &str {
        &self.meta.reason
    }

    /// Error body; zero-length `text/plain` if the server sent none.
    pub fn payload(&self) -> &ResponseBody {
        &self.payload
    }

    pub fn meta(&self) -> &ResponseMeta {
        &self.meta
    }

    pub fn into_payload(self) -> ResponseBody {
        self.payload
    }
}

/// Failure of a `Call::execute`.
#[derive(Debug, Error)]
pub enum CallError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Execution-time failure of an adapted call.
#[derive(Debug, Error)]
pub enum AdaptError {
    #[error(transparent)]
    Http(#[from] HttpStatusError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl AdaptError {
    /// Status code of an HTTP failure, `None` for the other kinds.
    pub fn status(&self) -> Option<u16> {
        match self {
            AdaptError::Http(err) => Some(err.status()),
            AdaptError::Transport(_) | AdaptError::Decode(_) => None,
        }
    }
}

/// A request body could not be built.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
