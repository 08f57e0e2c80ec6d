//! Fetch API
//!
//! Free functions over a default [`HttpClient`]. Each comes in two shapes:
//! a `Result` form, and a `_with_failure` form that always hands back a
//! [`GetFailure`] alongside whatever was obtained.

use crate::client::HttpClient;
use crate::error::FetchError;
use crate::failure::GetFailure;
use crate::{Document, Response};

fn client(verify_certificate: bool) -> HttpClient {
    HttpClient::builder().verify_certificate(verify_certificate).build()
}

fn split<T>(result: Result<T, FetchError>) -> (Option<T>, GetFailure) {
    match result {
        Ok(value) => (Some(value), GetFailure::none()),
        Err(e) => (None, e.failure()),
    }
}

/// Fetch the resource at `url`
pub fn get_response(url: &str, verify_certificate: bool) -> Result<Response, FetchError> {
    client(verify_certificate).get_response(url)
}

/// Fetch the resource at `url`, reporting the failure code
pub fn get_response_with_failure(
    url: &str,
    verify_certificate: bool,
) -> (Option<Response>, GetFailure) {
    split(get_response(url, verify_certificate))
}

/// Status code of `url`, or -1 if no complete response was obtained
pub fn get_status(url: &str, verify_certificate: bool) -> i32 {
    get_status_with_failure(url, verify_certificate).0
}

/// Status code of `url` (-1 if none) and the failure code
pub fn get_status_with_failure(url: &str, verify_certificate: bool) -> (i32, GetFailure) {
    match client(verify_certificate).get_status(url) {
        Ok(status) => (i32::from(status), GetFailure::none()),
        Err(e) => (-1, e.failure()),
    }
}

/// Fetch `url` and decode its body as JSON
pub fn get_json(url: &str, verify_certificate: bool) -> Result<Document, FetchError> {
    client(verify_certificate).get_json(url)
}

/// Fetch `url` and decode its body as JSON, reporting the failure code.
/// A body that fails to decode yields no document at all.
pub fn get_json_with_failure(
    url: &str,
    verify_certificate: bool,
) -> (Option<Document>, GetFailure) {
    split(get_json(url, verify_certificate))
}
