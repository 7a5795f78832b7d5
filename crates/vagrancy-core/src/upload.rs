//! # Upload Path Issuance
//!
//! The indirection-style APIs never accept payloads directly. A client asks
//! for an upload target, receives a URL, and PUTs the payload there in a
//! second request that lands on the direct artifact API.
//!
//! Issuing a path allocates nothing. The URL is the canonical PUT target
//! for the identity; it never expires and may be used any number of times.

use serde::{Deserialize, Serialize};

use crate::identity::{ArtifactIdentity, BoxId};
use crate::urls::{synthesize_url, RequestContext};

/// Fixed artifact file name the artifact-upload API addresses.
pub const ARTIFACT_UPLOAD_NAME: &str = "vagrant.box";

/// Response body carrying an issued upload URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadPath {
    /// Where the client should PUT the payload.
    pub upload_path: String,
}

/// Builds upload URLs for the request being served.
#[derive(Debug, Clone)]
pub struct UploadPathIssuer {
    ctx: RequestContext,
}

impl UploadPathIssuer {
    /// Issuer bound to the origin and token of the current request.
    pub fn new(ctx: RequestContext) -> Self {
        Self { ctx }
    }

    /// Upload target for one provider artifact:
    /// `scheme://host[:port]/owner/name/version/provider`.
    pub fn issue(&self, identity: &ArtifactIdentity) -> UploadPath {
        self.issue_path(&identity.path())
    }

    /// Upload target for the artifact-upload API:
    /// `scheme://host[:port]/owner/name/vagrant.box`.
    ///
    /// Placeholder semantics: no provider or version is encoded, and the
    /// direct API has no route for this path.
    pub fn issue_artifact(&self, box_id: &BoxId) -> UploadPath {
        self.issue_path(&format!("{}/{}", box_id.path(), ARTIFACT_UPLOAD_NAME))
    }

    fn issue_path(&self, path: &str) -> UploadPath {
        UploadPath {
            upload_path: synthesize_url(&self.ctx.origin.site(), path, self.ctx.caller_token()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::urls::RequestOrigin;

    fn issuer(authority: &str, token: Option<&str>) -> UploadPathIssuer {
        UploadPathIssuer::new(RequestContext::new(
            RequestOrigin::from_authority("http", authority),
            token.map(str::to_string),
        ))
    }

    #[test]
    fn issues_canonical_put_target() {
        let id = ArtifactIdentity::new("acme", "widget", "1.0.0", "virtualbox").unwrap();
        let path = issuer("boxes.local:8099", Some("czNjcmV0")).issue(&id);
        assert_eq!(
            path.upload_path,
            "http://boxes.local:8099/acme/widget/1.0.0/virtualbox?access_token=czNjcmV0"
        );
    }

    #[test]
    fn default_port_is_omitted() {
        let id = ArtifactIdentity::new("acme", "widget", "1.0.0", "virtualbox").unwrap();
        let path = issuer("boxes.local", None).issue(&id);
        assert_eq!(path.upload_path, "http://boxes.local/acme/widget/1.0.0/virtualbox");
    }

    #[test]
    fn issuing_is_repeatable() {
        let id = ArtifactIdentity::new("acme", "widget", "1.0.0", "virtualbox").unwrap();
        let issuer = issuer("h:1", Some("t"));
        assert_eq!(issuer.issue(&id), issuer.issue(&id));
    }

    #[test]
    fn artifact_upload_uses_fixed_name() {
        let box_id = BoxId::new("acme", "widget").unwrap();
        let path = issuer("h:8099", Some("t")).issue_artifact(&box_id);
        assert_eq!(path.upload_path, "http://h:8099/acme/widget/vagrant.box?access_token=t");
    }

    #[test]
    fn serializes_as_upload_path_object() {
        let json = serde_json::to_value(UploadPath {
            upload_path: "http://h/a".into(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"upload_path": "http://h/a"}));
    }
}
