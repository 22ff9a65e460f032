//! HTTP data types shared by calls, decoders and adapters.
//!
//! # Design
//! Requests and responses are plain data. The adaptation core never touches
//! the network: a `Call` implementation (the ureq transport, or a scripted
//! call in tests) turns an `HttpRequest` into a `RawResponse`, and everything
//! downstream works on these owned values.
//!
//! Headers stay as `Vec<(String, String)>` in arrival order; lookups are
//! case-insensitive.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use ::http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// `path` is the fully-qualified URL. The transport executes it as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

/// The media type given in `Content-Type`, e.g. `text/plain; charset=utf-8`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MediaType {
    type_: String,
    subtype: String,
    params: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid media type `{0}`")]
pub struct MediaTypeError(String);

impl MediaType {
    /// `text/plain`, used for error payloads the transport never supplied.
    pub fn text_plain() -> Self {
        Self {
            type_: "text".to_string(),
            subtype: "plain".to_string(),
            params: Vec::new(),
        }
    }

    /// Parse a `Content-Type` value. Malformed parameters are skipped; a
    /// missing or malformed `type/subtype` yields `None`.
    pub fn parse(value: &str) -> Option<Self> {
        let mut parts = value.split(';');
        let essence = parts.next()?.trim();
        let (type_, subtype) = essence.split_once('/')?;
        if !is_token(type_) || !is_token(subtype) {
            return None;
        }

        let params = parts
            .filter_map(|param| {
                let (name, value) = param.split_once('=')?;
                let name = name.trim();
                if !is_token(name) {
                    return None;
                }
                let value = value.trim().trim_matches('"');
                Some((name.to_ascii_lowercase(), value.to_string()))
            })
            .collect();

        Some(Self {
            type_: type_.to_ascii_lowercase(),
            subtype: subtype.to_ascii_lowercase(),
            params,
        })
    }

    pub fn type_(&self) -> &str {
        &self.type_
    }

    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    /// `type/subtype` without parameters.
    pub fn essence(&self) -> String {
        format!("{}/{}", self.type_, self.subtype)
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn charset(&self) -> Option<&str> {
        self.param("charset")
    }
}

fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b))
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.type_, self.subtype)?;
        for (name, value) in &self.params {
            write!(f, "; {name}={value}")?;
        }
        Ok(())
    }
}

impl FromStr for MediaType {
    type Err = MediaTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| MediaTypeError(s.to_string()))
    }
}

impl TryFrom<String> for MediaType {
    type Error = MediaTypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MediaType> for String {
    fn from(value: MediaType) -> Self {
        value.to_string()
    }
}

/// Status line and headers of a received response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMeta {
    pub status: u16,
    pub reason: String,
    pub headers: Vec<(String, String)>,
    pub url: String,
}

impl ResponseMeta {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            reason: StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("")
                .to_string(),
            headers: Vec::new(),
            url: String::new(),
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// First value of the named header, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<MediaType> {
        self.header("content-type").and_then(MediaType::parse)
    }

    /// True for the 2xx status class.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Raw body bytes together with the media type they were sent with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseBody {
    media_type: Option<MediaType>,
    bytes: Vec<u8>,
}

impl ResponseBody {
    pub fn new(media_type: Option<MediaType>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            media_type,
            bytes: bytes.into(),
        }
    }

    /// A zero-length body.
    pub fn empty(media_type: Option<MediaType>) -> Self {
        Self::new(media_type, Vec::new())
    }

    pub fn media_type(&self) -> Option<&MediaType> {
        self.media_type.as_ref()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Body as text, replacing invalid UTF-8 sequences.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A response as received from the wire, before any decoding.
///
/// `body` is `None` when the transport had no body to offer at all, which is
/// different from an empty one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub meta: ResponseMeta,
    pub body: Option<ResponseBody>,
}
