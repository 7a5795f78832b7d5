//! # Custom Extractors
//!
//! - [`Caller`]: the origin and `access_token` of the current request, as a
//!   core [`RequestContext`] for URL synthesis.
//! - [`parse_json`]: decodes a JSON body regardless of its declared content
//!   type, mapping failures to [`AppError::BadRequest`].

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, Uri};
use serde::de::DeserializeOwned;
use url::form_urlencoded;

use vagrancy_core::{RequestContext, RequestOrigin, ACCESS_TOKEN_PARAM};

use crate::error::AppError;

/// Header set by reverse proxies terminating TLS.
const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Return the decoded `access_token` query parameter, if present.
pub fn access_token_param(uri: &Uri) -> Option<String> {
    let query = uri.query()?;
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == ACCESS_TOKEN_PARAM)
        .map(|(_, value)| value.into_owned())
}

/// Work out the scheme, host and port a request was addressed to.
pub fn request_origin(headers: &HeaderMap, uri: &Uri) -> RequestOrigin {
    let scheme = headers
        .get(FORWARDED_PROTO)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| uri.scheme_str())
        .unwrap_or("http");

    let authority = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| uri.authority().map(|a| a.as_str()))
        .unwrap_or("localhost");

    RequestOrigin::from_authority(scheme, authority)
}

/// The request context of the current caller.
#[derive(Debug, Clone)]
pub struct Caller(pub RequestContext);

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let origin = request_origin(&parts.headers, &parts.uri);
        let token = access_token_param(&parts.uri);
        Ok(Caller(RequestContext::new(origin, token)))
    }
}

/// Decode a JSON request body, mapping errors to [`AppError::BadRequest`].
///
/// Box build tools do not always send `content-type: application/json`,
/// so the header is not checked.
pub fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|err| AppError::BadRequest(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn token_is_decoded_from_query() {
        let uri: Uri = "/acme/widget?foo=1&access_token=czNjcmV0".parse().unwrap();
        assert_eq!(access_token_param(&uri).as_deref(), Some("czNjcmV0"));

        let uri: Uri = "/a/b?access_token=ab%2Bc%2Fd%3D%3D".parse().unwrap();
        assert_eq!(access_token_param(&uri).as_deref(), Some("ab+c/d=="));
    }

    #[test]
    fn token_absent() {
        let uri: Uri = "/acme/widget".parse().unwrap();
        assert_eq!(access_token_param(&uri), None);
        let uri: Uri = "/acme/widget?other=1".parse().unwrap();
        assert_eq!(access_token_param(&uri), None);
    }

    #[test]
    fn empty_token_is_present() {
        let uri: Uri = "/acme/widget?access_token=".parse().unwrap();
        assert_eq!(access_token_param(&uri).as_deref(), Some(""));
    }

    #[test]
    fn parse_json_reports_bad_bodies() {
        let value: serde_json::Value = parse_json(br#"{"version":"2.1.0"}"#).unwrap();
        assert_eq!(value["version"], "2.1.0");

        let err = parse_json::<serde_json::Value>(b"{not json").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn origin_from_host_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("boxes.local:8099"));
        let origin = request_origin(&headers, &"/x".parse().unwrap());
        assert_eq!(origin.base_site(), "http://boxes.local:8099");
    }

    #[test]
    fn origin_honours_forwarded_proto() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("boxes.example"));
        headers.insert(FORWARDED_PROTO, HeaderValue::from_static("https, http"));
        let origin = request_origin(&headers, &"/x".parse().unwrap());
        assert_eq!(origin.base_site(), "https://boxes.example:443");
        assert_eq!(origin.site(), "https://boxes.example");
    }

    #[test]
    fn origin_falls_back_to_uri_then_localhost() {
        let headers = HeaderMap::new();
        let origin = request_origin(&headers, &"http://proxy.local:81/x".parse().unwrap());
        assert_eq!(origin.base_site(), "http://proxy.local:81");

        let origin = request_origin(&headers, &"/x".parse().unwrap());
        assert_eq!(origin.base_site(), "http://localhost:80");
    }
}
