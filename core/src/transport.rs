//! Blocking HTTP transport backed by `ureq`.
//!
//! # Design
//! `HttpClient` holds a base URL and a `ureq::Agent` configured so that 4xx
//! and 5xx responses come back as data rather than `Err`; status
//! interpretation belongs to the adapters. `HttpClient::call` only packages
//! a request with its decoder. Nothing is sent until the resulting
//! `HttpCall` is executed.

use std::marker::PhantomData;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::call::{parse_response, Call, Executed};
use crate::decode::BodyDecoder;
use crate::error::{CallError, RequestError, TransportError};
use crate::http::{HttpMethod, HttpRequest, RawResponse, ResponseBody, ResponseMeta};

/// Transport settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientConfig {
    /// Whole-request timeout; `None` waits indefinitely.
    pub timeout: Option<Duration>,
    pub user_agent: Option<String>,
    /// Largest response body accepted, in bytes; `None` reads any size.
    pub max_body_size: Option<u64>,
}

/// Synchronous client for one base URL.
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    agent: ureq::Agent,
    user_agent: Option<String>,
    max_body_size: Option<u64>,
}

impl HttpClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_config(base_url, ClientConfig::default())
    }

    pub fn with_config(base_url: &str, config: ClientConfig) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(config.timeout)
            .build()
            .new_agent();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
            user_agent: config.user_agent,
            max_body_size: config.max_body_size,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for `path`, relative to the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn build(&self, method: HttpMethod, path: &str) -> HttpRequest {
        let mut headers = Vec::new();
        if let Some(user_agent) = &self.user_agent {
            headers.push(("user-agent".to_string(), user_agent.clone()));
        }
        HttpRequest {
            method,
            path: self.url(path),
            headers,
            body: None,
        }
    }

    pub fn build_get(&self, path: &str) -> HttpRequest {
        self.build(HttpMethod::Get, path)
    }

    pub fn build_delete(&self, path: &str) -> HttpRequest {
        self.build(HttpMethod::Delete, path)
    }

    pub fn build_text(&self, method: HttpMethod, path: &str, body: impl Into<String>) -> HttpRequest {
        let mut req = self.build(method, path);
        req.headers
            .push(("content-type".to_string(), "text/plain; charset=utf-8".to_string()));
        req.body = Some(body.into().into_bytes());
        req
    }

    pub fn build_json<B: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        body: &B,
    ) -> Result<HttpRequest, RequestError> {
        let body = serde_json::to_vec(body)?;
        let mut req = self.build(method, path);
        req.headers
            .push(("content-type".to_string(), "application/json".to_string()));
        req.body = Some(body);
        Ok(req)
    }

    /// Package `request` with the decoder for its response body.
    pub fn call<T, D: BodyDecoder<T>>(&self, request: HttpRequest, decoder: D) -> HttpCall<T, D> {
        HttpCall {
            agent: self.agent.clone(),
            max_body_size: self.max_body_size,
            request,
            decoder,
            _output: PhantomData,
        }
    }
}

/// A request bound to an agent and a decoder, sent on `execute`.
#[derive(Debug)]
pub struct HttpCall<T, D> {
    agent: ureq::Agent,
    max_body_size: Option<u64>,
    request: HttpRequest,
    decoder: D,
    _output: PhantomData<fn() -> T>,
}

impl<T, D> HttpCall<T, D> {
    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    fn send(&self) -> Result<RawResponse, TransportError> {
        let HttpRequest {
            method,
            path,
            headers,
            body,
        } = &self.request;
        debug!(%method, url = %path, "sending request");

        let result = match method {
            HttpMethod::Get => with_headers(self.agent.get(path), headers).call(),
            HttpMethod::Head => with_headers(self.agent.head(path), headers).call(),
            HttpMethod::Delete => with_headers(self.agent.delete(path), headers).call(),
            HttpMethod::Post => send_body(with_headers(self.agent.post(path), headers), body),
            HttpMethod::Put => send_body(with_headers(self.agent.put(path), headers), body),
            HttpMethod::Patch => send_body(with_headers(self.agent.patch(path), headers), body),
        };
        let mut response = result.map_err(TransportError::new)?;

        let status = response.status();
        let mut meta = ResponseMeta::new(status.as_u16()).with_url(path.clone());
        for (name, value) in response.headers() {
            let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
            meta.headers.push((name.as_str().to_string(), value));
        }
        debug!(%method, url = %path, status = meta.status, "received response");

        let limit = self.max_body_size.unwrap_or(u64::MAX);
        let bytes = response
            .body_mut()
            .with_config()
            .limit(limit)
            .read_to_vec()
            .map_err(|err| {
                match &err {
                    ureq::Error::BodyExceedsLimit(limit) => {
                        warn!(url = %path, status = meta.status, limit, "response body exceeds limit")
                    }
                    _ => warn!(url = %path, status = meta.status, error = %err, "response body cut short"),
                }
                TransportError::new(err)
            })?;
        let body = ResponseBody::new(meta.content_type(), bytes);

        Ok(RawResponse {
            meta,
            body: Some(body),
        })
    }
}

impl<T, D: BodyDecoder<T>> Call for HttpCall<T, D> {
    type Output = T;

    fn execute(self) -> Result<Executed<T>, CallError> {
        let raw = self.send()?;
        Ok(parse_response(raw, &self.decoder)?)
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send_body(
    builder: ureq::RequestBuilder<ureq::typestate::WithBody>,
    body: &Option<Vec<u8>>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(body.as_slice()),
        None => builder.send_empty(),
    }
}
