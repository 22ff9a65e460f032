//! Check both adapter variants against the JSON vectors in `test-vectors/`.
//!
//! Each case describes a raw response as a transport would deliver it, how
//! many times the decoder may run, and what the bare-value and envelope
//! adapters must return.

use std::cell::Cell;

use serde_json::Value;
use synccall_core::{call, decode};
use synccall_core::{
    parse_response, AdaptError, CallAdapterFactory, MediaType, RawResponse, ResponseBody,
    ResponseMeta, TypeDescriptor,
};

fn load() -> Vec<Value> {
    let raw = include_str!("../../test-vectors/status.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();
    vectors["cases"].as_array().unwrap().clone()
}

/// Build the raw response a transport would have received.
fn simulated(case: &Value) -> RawResponse {
    let sim = &case["simulated_response"];
    let mut meta = ResponseMeta::new(sim["status"].as_u64().unwrap() as u16);
    let media_type = sim["content_type"].as_str().map(|ct| {
        meta.headers.push(("Content-Type".to_string(), ct.to_string()));
        MediaType::parse(ct).unwrap()
    });
    let body = sim["body"]
        .as_str()
        .map(|b| ResponseBody::new(media_type, b));
    RawResponse { meta, body }
}

#[test]
fn bare_value_vectors() {
    let adapter = CallAdapterFactory::new()
        .register(&TypeDescriptor::of::<String>())
        .unwrap()
        .unwrap()
        .into_bare_value()
        .unwrap();

    for case in load() {
        let name = case["name"].as_str().unwrap();
        let calls = Cell::new(0);
        let spy = decode::from_fn(|body: ResponseBody| {
            calls.set(calls.get() + 1);
            Ok(body.text().into_owned())
        });
        let raw = simulated(&case);
        let result = adapter.adapt(call::from_fn(|| Ok(parse_response(raw, &spy)?)));

        let expected = &case["expected_bare"];
        if let Some(status) = expected.get("error_status") {
            match result {
                Err(AdaptError::Http(err)) => {
                    assert_eq!(u64::from(err.status()), status.as_u64().unwrap(), "{name}: status")
                }
                other => panic!("{name}: expected HTTP error, got {other:?}"),
            }
        } else {
            let value = result.unwrap_or_else(|err| panic!("{name}: unexpected error {err}"));
            assert_eq!(value.as_deref(), expected["value"].as_str(), "{name}: value");
        }

        assert_eq!(
            calls.get() as u64,
            case["decoder_calls"].as_u64().unwrap(),
            "{name}: decoder calls"
        );
    }
}

#[test]
fn envelope_vectors() {
    let adapter = CallAdapterFactory::new()
        .register(&TypeDescriptor::response(TypeDescriptor::of::<String>()))
        .unwrap()
        .unwrap()
        .into_envelope()
        .unwrap();

    for case in load() {
        let name = case["name"].as_str().unwrap();
        let calls = Cell::new(0);
        let spy = decode::from_fn(|body: ResponseBody| {
            calls.set(calls.get() + 1);
            Ok(body.text().into_owned())
        });
        let raw = simulated(&case);
        let response = adapter
            .adapt(call::from_fn(|| Ok(parse_response(raw, &spy)?)))
            .unwrap_or_else(|err| panic!("{name}: unexpected error {err}"));

        let expected = &case["expected_envelope"];
        assert_eq!(
            response.is_successful(),
            expected["successful"].as_bool().unwrap(),
            "{name}: successful"
        );
        assert_eq!(u64::from(response.code()), expected["code"].as_u64().unwrap(), "{name}: code");

        if response.is_successful() {
            assert_eq!(
                response.body().map(String::as_str),
                expected["body"].as_str(),
                "{name}: body"
            );
            assert!(response.error_body().is_none(), "{name}: error body on success");
        } else {
            assert!(response.body().is_none(), "{name}: body on failure");
            let error_body = response.error_body().unwrap();
            assert_eq!(
                error_body.text(),
                expected["error_body"].as_str().unwrap(),
                "{name}: error body"
            );
            assert_eq!(
                error_body.media_type().map(MediaType::essence).as_deref(),
                expected["error_media_type"].as_str(),
                "{name}: error media type"
            );
        }

        assert_eq!(
            calls.get() as u64,
            case["decoder_calls"].as_u64().unwrap(),
            "{name}: decoder calls"
        );
    }
}
