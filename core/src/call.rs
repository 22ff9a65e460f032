//! The deferred network call and its executed result.
//!
//! # Design
//! `Call::execute` takes `self`, so a call is spent by running it; running
//! the same call twice does not type-check. Transports build `Executed`
//! values through [`parse_response`], which owns the no-content rule: a 204
//! or 205 never reaches the decoder.

use crate::decode::BodyDecoder;
use crate::error::{CallError, DecodeError};
use crate::http::{RawResponse, ResponseBody, ResponseMeta};

/// A request that has not been sent yet.
pub trait Call {
    type Output;

    /// Send the request and decode the response, blocking until done.
    fn execute(self) -> Result<Executed<Self::Output>, CallError>;
}

/// What a call produced: a decoded body on 2xx, an optional raw error body
/// otherwise. Never both.
///
/// The status code is authoritative. A `success` built with a non-2xx
/// status, or a `failure` built with a 2xx one, is classified by its status
/// when normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct Executed<T> {
    meta: ResponseMeta,
    body: ExecutedBody<T>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ExecutedBody<T> {
    Success(Option<T>),
    Failure(Option<ResponseBody>),
}

impl<T> Executed<T> {
    /// A 2xx result. `body` is `None` for no-content responses.
    pub fn success(body: Option<T>, meta: ResponseMeta) -> Self {
        Self {
            meta,
            body: ExecutedBody::Success(body),
        }
    }

    /// A non-2xx result. `error_body` is `None` when the transport supplied
    /// nothing at all.
    pub fn failure(error_body: Option<ResponseBody>, meta: ResponseMeta) -> Self {
        Self {
            meta,
            body: ExecutedBody::Failure(error_body),
        }
    }

    pub fn meta(&self) -> &ResponseMeta {
        &self.meta
    }

    pub fn status(&self) -> u16 {
        self.meta.status
    }

    pub fn is_success(&self) -> bool {
        matches!(self.body, ExecutedBody::Success(_))
    }

    pub fn body(&self) -> Option<&T> {
        match &self.body {
            ExecutedBody::Success(body) => body.as_ref(),
            ExecutedBody::Failure(_) => None,
        }
    }

    pub fn error_body(&self) -> Option<&ResponseBody> {
        match &self.body {
            ExecutedBody::Success(_) => None,
            ExecutedBody::Failure(body) => body.as_ref(),
        }
    }

    pub(crate) fn into_parts(self) -> (ResponseMeta, ExecutedBody<T>) {
        (self.meta, self.body)
    }
}

/// Turn a received response into an `Executed`, decoding 2xx bodies.
///
/// Non-2xx keeps the raw body as the error payload. 204 and 205 succeed with
/// no body and skip the decoder. A 2xx with no body at all is decoded as an
/// empty one. Decoder errors come back unchanged.
pub fn parse_response<T, D>(raw: RawResponse, decoder: &D) -> Result<Executed<T>, DecodeError>
where
    D: BodyDecoder<T> + ?Sized,
{
    let RawResponse { meta, body } = raw;

    if !meta.is_success() {
        return Ok(Executed::failure(body, meta));
    }

    if meta.status == 204 || meta.status == 205 {
        return Ok(Executed::success(None, meta));
    }

    let body = body.unwrap_or_else(|| ResponseBody::empty(meta.content_type()));
    let value = decoder.decode(body)?;
    Ok(Executed::success(Some(value), meta))
}

/// A call backed by a closure.
#[derive(Debug)]
pub struct FnCall<F>(F);

pub fn from_fn<T, F>(f: F) -> FnCall<F>
where
    F: FnOnce() -> Result<Executed<T>, CallError>,
{
    FnCall(f)
}

impl<T, F> Call for FnCall<F>
where
    F: FnOnce() -> Result<Executed<T>, CallError>,
{
    type Output = T;

    fn execute(self) -> Result<Executed<T>, CallError> {
        (self.0)()
    }
}
