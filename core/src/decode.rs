//! Body decoders: raw response bytes to `T`.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::error::DecodeError;
use crate::http::ResponseBody;

/// Turns a successful response body into `T`.
///
/// Called at most once per execution, and never for 204/205 responses.
pub trait BodyDecoder<T> {
    fn decode(&self, body: ResponseBody) -> Result<T, DecodeError>;
}

impl<T, D: BodyDecoder<T> + ?Sized> BodyDecoder<T> for &D {
    fn decode(&self, body: ResponseBody) -> Result<T, DecodeError> {
        (**self).decode(body)
    }
}

impl<T, D: BodyDecoder<T> + ?Sized> BodyDecoder<T> for Box<D> {
    fn decode(&self, body: ResponseBody) -> Result<T, DecodeError> {
        (**self).decode(body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported charset `{0}`")]
pub struct UnsupportedCharset(pub String);

/// UTF-8 text. A declared charset other than UTF-8 or US-ASCII is refused.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringDecoder;

impl BodyDecoder<String> for StringDecoder {
    fn decode(&self, body: ResponseBody) -> Result<String, DecodeError> {
        if let Some(charset) = body.media_type().and_then(|mt| mt.charset()) {
            let known = ["utf-8", "utf8", "us-ascii"];
            if !known.iter().any(|k| charset.eq_ignore_ascii_case(k)) {
                return Err(DecodeError::new(UnsupportedCharset(charset.to_string())));
            }
        }
        String::from_utf8(body.into_bytes()).map_err(DecodeError::new)
    }
}

/// Hands the body back undecoded.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesDecoder;

impl BodyDecoder<ResponseBody> for BytesDecoder {
    fn decode(&self, body: ResponseBody) -> Result<ResponseBody, DecodeError> {
        Ok(body)
    }
}

/// JSON via `serde_json`.
#[derive(Debug, Clone, Copy)]
pub struct JsonDecoder<T>(PhantomData<fn() -> T>);

impl<T> JsonDecoder<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for JsonDecoder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DeserializeOwned> BodyDecoder<T> for JsonDecoder<T> {
    fn decode(&self, body: ResponseBody) -> Result<T, DecodeError> {
        serde_json::from_slice(body.bytes()).map_err(DecodeError::new)
    }
}

/// Decoder backed by a closure.
#[derive(Debug, Clone, Copy)]
pub struct FnDecoder<F>(F);

pub fn from_fn<T, F>(f: F) -> FnDecoder<F>
where
    F: Fn(ResponseBody) -> Result<T, DecodeError>,
{
    FnDecoder(f)
}

impl<T, F> BodyDecoder<T> for FnDecoder<F>
where
    F: Fn(ResponseBody) -> Result<T, DecodeError>,
{
    fn decode(&self, body: ResponseBody) -> Result<T, DecodeError> {
        (self.0)(body)
    }
}
