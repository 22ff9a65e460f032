//! Normalizing an executed call into a single tagged `Outcome`.
//!
//! # Design
//! `Normalizer::normalize` is the one place that decides whether the network
//! and protocol layers succeeded. It never fails for HTTP or transport
//! conditions; those become `Outcome` variants. Only a decoder error is
//! returned as `Err`, unchanged, since it is the decoder's failure and not
//! an outcome of the exchange.

use serde::{Deserialize, Serialize};

use crate::call::{Call, Executed, ExecutedBody};
use crate::error::{CallError, DecodeError, TransportError};
use crate::http::{MediaType, ResponseBody, ResponseMeta};

/// Settings owned by a [`Normalizer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Media type given to the empty error payload synthesized when a
    /// failed response carried none.
    pub default_error_media_type: MediaType,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            default_error_media_type: MediaType::text_plain(),
        }
    }
}

/// Result of one call execution.
#[derive(Debug)]
pub enum Outcome<T> {
    /// 2xx. `body` is `None` for no-content responses.
    Success { body: Option<T>, meta: ResponseMeta },
    /// Non-2xx. `payload` is always present, possibly synthesized empty.
    HttpFailure {
        status: u16,
        payload: ResponseBody,
        meta: ResponseMeta,
    },
    /// No response was received.
    TransportFailure(TransportError),
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    /// Status code, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Outcome::Success { meta, .. } => Some(meta.status),
            Outcome::HttpFailure { status, .. } => Some(*status),
            Outcome::TransportFailure(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalizer {
    config: NormalizerConfig,
}

impl Normalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Execute `call` once and classify what happened.
    pub fn normalize<C: Call>(&self, call: C) -> Result<Outcome<C::Output>, DecodeError> {
        match call.execute() {
            Ok(executed) => Ok(self.classify(executed)),
            Err(CallError::Transport(err)) => Ok(Outcome::TransportFailure(err)),
            Err(CallError::Decode(err)) => Err(err),
        }
    }

    fn classify<T>(&self, executed: Executed<T>) -> Outcome<T> {
        let (meta, body) = executed.into_parts();
        match (meta.is_success(), body) {
            (true, ExecutedBody::Success(body)) => Outcome::Success { body, meta },
            (true, ExecutedBody::Failure(_)) => Outcome::Success { body: None, meta },
            (false, ExecutedBody::Success(_)) => Outcome::HttpFailure {
                status: meta.status,
                payload: self.empty_payload(),
                meta,
            },
            (false, ExecutedBody::Failure(payload)) => Outcome::HttpFailure {
                status: meta.status,
                payload: payload.unwrap_or_else(|| self.empty_payload()),
                meta,
            },
        }
    }

    fn empty_payload(&self) -> ResponseBody {
        ResponseBody::empty(Some(self.config.default_error_media_type.clone()))
    }
}
