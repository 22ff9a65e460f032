//! Adapters that turn a `Call` into a synchronously returned, typed result.
//!
//! # Design
//! `CallAdapterFactory::register` classifies a declared return type once and
//! hands back a `CallAdapter` bound to it. The adapter variant is fixed from
//! then on, so the execution path only runs the normalizer and maps its
//! outcome:
//!
//! | outcome            | `BareValueAdapter`      | `EnvelopeAdapter`        |
//! |--------------------|-------------------------|--------------------------|
//! | success            | `Ok(body)`              | `Ok(Response::success)`  |
//! | HTTP failure       | `Err(Http)`             | `Ok(Response::error)`    |
//! | transport failure  | `Err(Transport)`        | `Err(Transport)`         |
//! | decoder failure    | `Err(Decode)`           | `Err(Decode)`            |

use crate::call::Call;
use crate::error::{AdaptError, HttpStatusError, ShapeError};
use crate::outcome::{Normalizer, NormalizerConfig, Outcome};
use crate::response::Response;
use crate::shape::{ReturnShape, TypeDescriptor};

/// Returns the decoded body; a non-2xx response is an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BareValueAdapter {
    response_type: TypeDescriptor,
    normalizer: Normalizer,
}

impl BareValueAdapter {
    pub fn new(response_type: TypeDescriptor, normalizer: Normalizer) -> Self {
        Self {
            response_type,
            normalizer,
        }
    }

    pub fn response_type(&self) -> &TypeDescriptor {
        &self.response_type
    }

    /// Execute `call` once. `Ok(None)` means a successful response without
    /// content.
    pub fn adapt<C: Call>(&self, call: C) -> Result<Option<C::Output>, AdaptError> {
        match self.normalizer.normalize(call)? {
            Outcome::Success { body, .. } => Ok(body),
            Outcome::HttpFailure { payload, meta, .. } => {
                Err(HttpStatusError::new(payload, meta).into())
            }
            Outcome::TransportFailure(err) => Err(err.into()),
        }
    }
}

/// Returns a `Response<T>` for every response received, successful or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeAdapter {
    response_type: TypeDescriptor,
    normalizer: Normalizer,
}

impl EnvelopeAdapter {
    pub fn new(response_type: TypeDescriptor, normalizer: Normalizer) -> Self {
        Self {
            response_type,
            normalizer,
        }
    }

    pub fn response_type(&self) -> &TypeDescriptor {
        &self.response_type
    }

    /// Execute `call` once. Only transport and decoder failures are errors.
    pub fn adapt<C: Call>(&self, call: C) -> Result<Response<C::Output>, AdaptError> {
        match self.normalizer.normalize(call)? {
            Outcome::Success { body, meta } => Ok(Response::success(body, meta)),
            Outcome::HttpFailure { payload, meta, .. } => Ok(Response::error(payload, meta)),
            Outcome::TransportFailure(err) => Err(err.into()),
        }
    }
}

/// An adapter bound to one declared return type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallAdapter {
    BareValue(BareValueAdapter),
    Envelope(EnvelopeAdapter),
}

/// Result of [`CallAdapter::adapt`], shaped like the declared return type.
#[derive(Debug, Clone, PartialEq)]
pub enum Adapted<T> {
    Value(Option<T>),
    Envelope(Response<T>),
}

impl<T> Adapted<T> {
    /// The decoded body, whichever variant produced it.
    pub fn into_value(self) -> Option<T> {
        match self {
            Adapted::Value(value) => value,
            Adapted::Envelope(response) => response.into_body(),
        }
    }

    pub fn into_envelope(self) -> Option<Response<T>> {
        match self {
            Adapted::Value(_) => None,
            Adapted::Envelope(response) => Some(response),
        }
    }
}

impl CallAdapter {
    fn bind(shape: ReturnShape, normalizer: Normalizer) -> Self {
        match shape {
            ReturnShape::BareValue(ty) => CallAdapter::BareValue(BareValueAdapter::new(ty, normalizer)),
            ReturnShape::Envelope(ty) => CallAdapter::Envelope(EnvelopeAdapter::new(ty, normalizer)),
        }
    }

    /// The body type the call's decoder must produce.
    pub fn response_type(&self) -> &TypeDescriptor {
        match self {
            CallAdapter::BareValue(adapter) => adapter.response_type(),
            CallAdapter::Envelope(adapter) => adapter.response_type(),
        }
    }

    pub fn adapt<C: Call>(&self, call: C) -> Result<Adapted<C::Output>, AdaptError> {
        match self {
            CallAdapter::BareValue(adapter) => adapter.adapt(call).map(Adapted::Value),
            CallAdapter::Envelope(adapter) => adapter.adapt(call).map(Adapted::Envelope),
        }
    }

    pub fn into_bare_value(self) -> Option<BareValueAdapter> {
        match self {
            CallAdapter::BareValue(adapter) => Some(adapter),
            CallAdapter::Envelope(_) => None,
        }
    }

    pub fn into_envelope(self) -> Option<EnvelopeAdapter> {
        match self {
            CallAdapter::BareValue(_) => None,
            CallAdapter::Envelope(adapter) => Some(adapter),
        }
    }
}

/// Builds adapters for declared return types.
#[derive(Debug, Clone, Default)]
pub struct CallAdapterFactory {
    normalizer: Normalizer,
}

impl CallAdapterFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: NormalizerConfig) -> Self {
        Self {
            normalizer: Normalizer::new(config),
        }
    }

    /// Bind an adapter to `declared`.
    ///
    /// `Ok(None)` for the call type itself, so the caller can fall back to
    /// handling the call unadapted.
    pub fn register(&self, declared: &TypeDescriptor) -> Result<Option<CallAdapter>, ShapeError> {
        let Some(shape) = ReturnShape::select(declared)? else {
            tracing::trace!(%declared, "call type returned as-is");
            return Ok(None);
        };
        tracing::trace!(%declared, response_type = %shape.response_type(), "adapter registered");
        Ok(Some(CallAdapter::bind(shape, self.normalizer.clone())))
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use crate::call::{self, Executed};
    use crate::error::{CallError, DecodeError, TransportError};
    use crate::http::{MediaType, ResponseBody, ResponseMeta};

    fn ok(body: &str) -> impl Call<Output = String> {
        let body = body.to_string();
        call::from_fn(move || Ok(Executed::success(Some(body), ResponseMeta::new(200))))
    }

    fn failed(status: u16, error_body: Option<&str>) -> impl Call<Output = String> {
        let error_body = error_body.map(|b| ResponseBody::new(MediaType::parse("text/plain"), b));
        call::from_fn(move || Ok(Executed::failure(error_body, ResponseMeta::new(status))))
    }

    fn no_content() -> impl Call<Output = String> {
        call::from_fn(|| Ok(Executed::success(None, ResponseMeta::new(204))))
    }

    fn reset() -> impl Call<Output = String> {
        call::from_fn(|| -> Result<Executed<String>, CallError> {
            Err(TransportError::from(io::Error::new(io::ErrorKind::ConnectionReset, "reset")).into())
        })
    }

    fn bare() -> BareValueAdapter {
        CallAdapterFactory::new()
            .register(&TypeDescriptor::of::<String>())
            .unwrap()
            .unwrap()
            .into_bare_value()
            .unwrap()
    }

    fn envelope() -> EnvelopeAdapter {
        CallAdapterFactory::new()
            .register(&TypeDescriptor::response(TypeDescriptor::of::<String>()))
            .unwrap()
            .unwrap()
            .into_envelope()
            .unwrap()
    }

    #[test]
    fn bare_returns_body() {
        assert_eq!(bare().adapt(ok("Hi")).unwrap().as_deref(), Some("Hi"));
    }

    #[test]
    fn bare_returns_none_for_no_content() {
        assert_eq!(bare().adapt(no_content()).unwrap(), None);
    }

    #[test]
    fn bare_fails_with_status_error() {
        let err = bare().adapt(failed(404, Some("Not Found"))).unwrap_err();
        match err {
            AdaptError::Http(err) => {
                assert_eq!(err.status(), 404);
                assert_eq!(err.payload().text(), "Not Found");
            }
            other => panic!("expected HTTP error, got {other:?}"),
        }
    }

    #[test]
    fn bare_fails_with_transport_error() {
        let err = bare().adapt(reset()).unwrap_err();
        assert!(matches!(err, AdaptError::Transport(_)));
    }

    #[test]
    fn envelope_wraps_success() {
        let response = envelope().adapt(ok("Hi")).unwrap();
        assert!(response.is_successful());
        assert_eq!(response.code(), 200);
        assert_eq!(response.body().map(String::as_str), Some("Hi"));
    }

    #[test]
    fn envelope_returns_error_envelope() {
        let response = envelope().adapt(failed(404, Some("Not Found"))).unwrap();
        assert!(!response.is_successful());
        assert_eq!(response.code(), 404);
        assert!(response.body().is_none());
        assert_eq!(response.error_body().unwrap().text(), "Not Found");
    }

    #[test]
    fn envelope_synthesizes_missing_error_body() {
        let response = envelope().adapt(failed(500, None)).unwrap();
        let error_body = response.error_body().unwrap();
        assert!(error_body.is_empty());
        assert_eq!(error_body.media_type().unwrap().essence(), "text/plain");
    }

    #[test]
    fn envelope_fails_with_transport_error() {
        let err = envelope().adapt(reset()).unwrap_err();
        assert!(matches!(err, AdaptError::Transport(_)));
    }

    #[test]
    fn decode_error_passes_through_both_variants() {
        let broken = || {
            call::from_fn(|| -> Result<Executed<String>, CallError> {
                Err(DecodeError::new("I am broken!").into())
            })
        };
        let err = bare().adapt(broken()).unwrap_err();
        assert!(matches!(&err, AdaptError::Decode(_)));
        assert_eq!(err.to_string(), "I am broken!");

        let err = envelope().adapt(broken()).unwrap_err();
        assert!(matches!(err, AdaptError::Decode(_)));
    }

    #[test]
    fn status_class_matches_envelope_flag() {
        for status in [200, 201, 299] {
            let call = call::from_fn(move || Ok(Executed::success(Some(()), ResponseMeta::new(status))));
            assert!(envelope().adapt(call).unwrap().is_successful(), "{status}");
        }
        for status in [300, 400, 404, 500, 503] {
            let call = call::from_fn(move || Ok(Executed::<()>::failure(None, ResponseMeta::new(status))));
            let response = envelope().adapt(call).unwrap();
            assert!(!response.is_successful(), "{status}");
            assert_eq!(response.code(), status);
        }
    }

    #[test]
    fn mislabelled_success_follows_status_code() {
        let call = call::from_fn(|| Ok(Executed::success(Some("Hi".to_string()), ResponseMeta::new(404))));
        let response = envelope().adapt(call).unwrap();
        assert!(!response.is_successful());
        assert_eq!(response.code(), 404);
        assert!(response.body().is_none());
        assert!(response.error_body().unwrap().is_empty());

        let call = call::from_fn(|| Ok(Executed::success(Some("Hi".to_string()), ResponseMeta::new(500))));
        assert!(matches!(bare().adapt(call), Err(AdaptError::Http(err)) if err.status() == 500));
    }

    #[test]
    fn register_rejects_call_type() {
        let factory = CallAdapterFactory::new();
        factory.register(&TypeDescriptor::of::<String>()).unwrap();
        factory
            .register(&TypeDescriptor::response(TypeDescriptor::named("User")))
            .unwrap();
        assert_eq!(factory.register(&TypeDescriptor::raw_call()).unwrap(), None);
        assert_eq!(factory.register(&TypeDescriptor::raw_call()).unwrap(), None);
    }

    #[test]
    fn register_raw_envelope_fails() {
        let err = CallAdapterFactory::new()
            .register(&TypeDescriptor::raw_response())
            .unwrap_err();
        assert!(matches!(err, ShapeError::UnparameterizedEnvelope(_)));
    }

    #[test]
    fn register_binds_response_type() {
        let factory = CallAdapterFactory::new();
        let list = TypeDescriptor::named("Vec").with_args([TypeDescriptor::of::<String>()]);

        let adapter = factory.register(&list).unwrap().unwrap();
        assert!(matches!(adapter, CallAdapter::BareValue(_)));
        assert_eq!(adapter.response_type(), &list);

        let adapter = factory.register(&TypeDescriptor::response(list.clone())).unwrap().unwrap();
        assert!(matches!(adapter, CallAdapter::Envelope(_)));
        assert_eq!(adapter.response_type(), &list);
    }

    #[test]
    fn tagged_adapter_dispatches() {
        let factory = CallAdapterFactory::new();
        let bare = factory.register(&TypeDescriptor::of::<String>()).unwrap().unwrap();
        assert_eq!(bare.adapt(ok("Hi")).unwrap(), Adapted::Value(Some("Hi".to_string())));

        let wrapped = factory
            .register(&TypeDescriptor::response(TypeDescriptor::of::<String>()))
            .unwrap()
            .unwrap();
        let adapted = wrapped.adapt(failed(404, Some("Not Found"))).unwrap();
        let response = adapted.into_envelope().unwrap();
        assert_eq!(response.code(), 404);
    }

    #[test]
    fn factory_config_reaches_adapters() {
        let factory = CallAdapterFactory::with_config(NormalizerConfig {
            default_error_media_type: MediaType::parse("application/octet-stream").unwrap(),
        });
        let adapter = factory
            .register(&TypeDescriptor::response(TypeDescriptor::of::<String>()))
            .unwrap()
            .unwrap()
            .into_envelope()
            .unwrap();
        let response = adapter.adapt(failed(502, None)).unwrap();
        assert_eq!(
            response.error_body().unwrap().media_type().unwrap().essence(),
            "application/octet-stream"
        );
    }
}
