//! # Externally Visible URLs
//!
//! Download and upload URLs handed back to clients point at this server
//! itself, so they are built from the origin of the request being served.
//!
//! ## Token Propagation
//!
//! [`synthesize_url`] re-attaches `access_token` only when the caller
//! presented one, and it re-attaches the caller's value, never the
//! server's configured secret. The value is form-urlencoded so base64
//! `+`, `/` and `=` survive the next request's query decoding.

use url::form_urlencoded;

/// Query parameter carrying the caller's credential.
pub const ACCESS_TOKEN_PARAM: &str = "access_token";

/// Scheme, host and port the current request was addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOrigin {
    scheme: String,
    host: String,
    port: Option<u16>,
}

impl RequestOrigin {
    /// Build an origin. A `None` port means the scheme default.
    pub fn new(scheme: impl Into<String>, host: impl Into<String>, port: Option<u16>) -> Self {
        Self {
            scheme: scheme.into().to_ascii_lowercase(),
            host: host.into(),
            port,
        }
    }

    /// Parse a `Host` header value (`host`, `host:port`, `[v6]:port`).
    pub fn from_authority(scheme: &str, authority: &str) -> Self {
        let (host, port) = split_authority(authority);
        Self::new(scheme, host, port)
    }

    /// The request scheme, lowercased.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// The host without port.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The effective port: explicit if given, otherwise the scheme default.
    pub fn port(&self) -> u16 {
        self.port.unwrap_or_else(|| default_port(&self.scheme))
    }

    /// `scheme://host:port`, always printing the port.
    pub fn base_site(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port())
    }

    /// `scheme://host[:port]`, omitting the port when it is the scheme default.
    pub fn site(&self) -> String {
        let port = self.port();
        if port == default_port(&self.scheme) {
            format!("{}://{}", self.scheme, self.host)
        } else {
            format!("{}://{}:{}", self.scheme, self.host, port)
        }
    }
}

/// Per-request inputs to URL synthesis: where the request was addressed
/// and the token the caller presented, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Origin of the request being served.
    pub origin: RequestOrigin,
    /// The caller's `access_token` query parameter, verbatim after decoding.
    pub access_token: Option<String>,
}

impl RequestContext {
    /// Assemble a request context.
    pub fn new(origin: RequestOrigin, access_token: Option<String>) -> Self {
        Self {
            origin,
            access_token,
        }
    }

    /// The caller-supplied token, if present.
    pub fn caller_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }
}

/// Join `base` and a relative `path`, appending `?access_token=<token>`
/// only when a caller token is given.
pub fn synthesize_url(base: &str, path: &str, caller_token: Option<&str>) -> String {
    let mut url = format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    if let Some(token) = caller_token {
        url.push('?');
        url.push_str(ACCESS_TOKEN_PARAM);
        url.push('=');
        url.extend(form_urlencoded::byte_serialize(token.as_bytes()));
    }
    url
}

fn default_port(scheme: &str) -> u16 {
    match scheme {
        "https" => 443,
        _ => 80,
    }
}

fn split_authority(authority: &str) -> (&str, Option<u16>) {
    // Bracketed IPv6 literal, optionally followed by a port.
    if authority.starts_with('[') {
        if let Some(end) = authority.find(']') {
            let host = &authority[..=end];
            let port = authority[end + 1..]
                .strip_prefix(':')
                .and_then(|p| p.parse().ok());
            return (host, port);
        }
    }
    match authority.rsplit_once(':') {
        Some((host, port)) => match port.parse() {
            Ok(port) => (host, Some(port)),
            Err(_) => (authority, None),
        },
        None => (authority, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_appended_only_when_supplied() {
        assert_eq!(
            synthesize_url("http://boxes:8099", "acme/widget/1.0/vb", Some("czNjcmV0")),
            "http://boxes:8099/acme/widget/1.0/vb?access_token=czNjcmV0"
        );
        assert_eq!(
            synthesize_url("http://boxes:8099", "acme/widget/1.0/vb", None),
            "http://boxes:8099/acme/widget/1.0/vb"
        );
    }

    #[test]
    fn token_is_form_encoded() {
        let url = synthesize_url("http://h:1", "a/b", Some("ab+c/d=="));
        assert_eq!(url, "http://h:1/a/b?access_token=ab%2Bc%2Fd%3D%3D");
    }

    #[test]
    fn empty_token_still_echoed() {
        assert_eq!(
            synthesize_url("http://h:1", "a/b", Some("")),
            "http://h:1/a/b?access_token="
        );
    }

    #[test]
    fn slashes_are_not_doubled() {
        assert_eq!(synthesize_url("http://h:1/", "/a/b", None), "http://h:1/a/b");
    }

    #[test]
    fn base_site_always_has_port() {
        let origin = RequestOrigin::from_authority("http", "boxes.example");
        assert_eq!(origin.base_site(), "http://boxes.example:80");
        assert_eq!(origin.site(), "http://boxes.example");

        let origin = RequestOrigin::from_authority("HTTPS", "boxes.example");
        assert_eq!(origin.base_site(), "https://boxes.example:443");
    }

    #[test]
    fn site_keeps_non_default_port() {
        let origin = RequestOrigin::from_authority("http", "localhost:8099");
        assert_eq!(origin.host(), "localhost");
        assert_eq!(origin.port(), 8099);
        assert_eq!(origin.site(), "http://localhost:8099");
        assert_eq!(origin.base_site(), "http://localhost:8099");
    }

    #[test]
    fn ipv6_authority() {
        let origin = RequestOrigin::from_authority("http", "[::1]:8099");
        assert_eq!(origin.host(), "[::1]");
        assert_eq!(origin.port(), 8099);

        let origin = RequestOrigin::from_authority("http", "[::1]");
        assert_eq!(origin.host(), "[::1]");
        assert_eq!(origin.port(), 80);
    }

    #[test]
    fn unparsable_port_is_kept_in_host() {
        let origin = RequestOrigin::from_authority("http", "host:notaport");
        assert_eq!(origin.host(), "host:notaport");
        assert_eq!(origin.port(), 80);
    }
}
