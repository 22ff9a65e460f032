//! `Response<T>`: the envelope returned to call sites declared as
//! `Response<T>`.

use crate::error::HttpStatusError;
use crate::http::{ResponseBody, ResponseMeta};

/// Either the decoded body of a 2xx response or the raw body of a failed one.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload<T> {
    Success(Option<T>),
    Error(ResponseBody),
}

/// A decoded body (or error body) together with status and headers.
#[derive(Debug, Clone, PartialEq)]
pub struct Response<T> {
    meta: ResponseMeta,
    payload: Payload<T>,
}

impl<T> Response<T> {
    pub(crate) fn success(body: Option<T>, meta: ResponseMeta) -> Self {
        Self {
            meta,
            payload: Payload::Success(body),
        }
    }

    pub(crate) fn error(error_body: ResponseBody, meta: ResponseMeta) -> Self {
        Self {
            meta,
            payload: Payload::Error(error_body),
        }
    }

    pub fn is_successful(&self) -> bool {
        matches!(self.payload, Payload::Success(_))
    }

    pub fn code(&self) -> u16 {
        self.meta.status
    }

    pub fn message(&self) -> &str {
        &self.meta.reason
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.meta.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.meta.header(name)
    }

    pub fn meta(&self) -> &ResponseMeta {
        &self.meta
    }

    pub fn payload(&self) -> &Payload<T> {
        &self.payload
    }

    /// Decoded body of a successful response.
    pub fn body(&self) -> Option<&T> {
        match &self.payload {
            Payload::Success(body) => body.as_ref(),
            Payload::Error(_) => None,
        }
    }

    pub fn into_body(self) -> Option<T> {
        match self.payload {
            Payload::Success(body) => body,
            Payload::Error(_) => None,
        }
    }

    /// Raw body of an unsuccessful response.
    pub fn error_body(&self) -> Option<&ResponseBody> {
        match &self.payload {
            Payload::Success(_) => None,
            Payload::Error(body) => Some(body),
        }
    }

    /// The bare-value view of this envelope.
    pub fn into_result(self) -> Result<Option<T>, HttpStatusError> {
        match self.payload {
            Payload::Success(body) => Ok(body),
            Payload::Error(error_body) => Err(HttpStatusError::new(error_body, self.meta)),
        }
    }
}
