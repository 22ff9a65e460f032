//! Synchronous call adaptation.
//!
//! # Overview
//! A [`Call`] is a request that has not been sent yet. This crate runs it on
//! the caller's thread and hands back either the decoded body or a
//! [`Response`] envelope, depending on the return type the call site
//! declared.
//!
//! # Design
//! - [`CallAdapterFactory::register`] classifies a declared return type once
//!   ([`ReturnShape`]) and returns a bound [`CallAdapter`]; the call type
//!   itself is declined with `None`.
//! - [`Normalizer`] executes a call exactly once and folds the result into an
//!   [`Outcome`]: success, HTTP failure, or transport failure.
//! - [`BareValueAdapter`] turns a non-2xx response into
//!   [`HttpStatusError`]; [`EnvelopeAdapter`] returns it as an error
//!   envelope. Transport failures are errors for both.
//! - Decoder errors are passed through as [`DecodeError`], never relabelled.
//! - With the default `ureq` feature, [`transport::HttpClient`] provides a
//!   blocking [`Call`] implementation.

pub mod adapter;
pub mod call;
pub mod decode;
pub mod error;
pub mod http;
pub mod outcome;
pub mod response;
pub mod shape;
#[cfg(feature = "ureq")]
pub mod transport;

pub use adapter::{Adapted, BareValueAdapter, CallAdapter, CallAdapterFactory, EnvelopeAdapter};
pub use call::{parse_response, Call, Executed};
pub use decode::{BodyDecoder, BytesDecoder, JsonDecoder, StringDecoder};
pub use error::{AdaptError, CallError, DecodeError, HttpStatusError, ShapeError, TransportError};
pub use http::{HttpMethod, HttpRequest, MediaType, RawResponse, ResponseBody, ResponseMeta};
pub use outcome::{Normalizer, NormalizerConfig, Outcome};
pub use response::{Payload, Response};
pub use shape::{RawType, ReturnShape, TypeDescriptor};
#[cfg(feature = "ureq")]
pub use transport::{ClientConfig, HttpCall, HttpClient};
