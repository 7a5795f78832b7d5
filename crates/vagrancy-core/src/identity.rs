//! # Artifact Identities
//!
//! A stored artifact is addressed by the tuple
//! `(owner, name, version, provider)`. The first two fields identify a box;
//! all four identify exactly one provider artifact. Each field becomes one
//! directory level on disk, so every field is wrapped in a [`Segment`] that
//! is validated on construction and cannot be mutated afterwards.
//!
//! ## Layout
//!
//! ```text
//! <root>/<owner>/<name>/<version>/<provider>/box
//! ```
//!
//! Because no segment may contain a separator, the mapping from identity to
//! relative path is injective: distinct tuples never share a path.

use std::fmt;

use crate::error::IdentityError;

/// File name of the single payload stored per provider artifact.
pub const PAYLOAD_FILE: &str = "box";

/// Longest accepted segment, in bytes. Matches common filesystem name limits.
pub const MAX_SEGMENT_LEN: usize = 255;

/// One validated path segment of an identity.
///
/// Rejects the empty string, `.` and `..`, and anything containing `/`,
/// `\` or a NUL byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Segment(String);

impl Segment {
    /// Validate `value` as the identity field named `field`.
    pub fn new(field: &'static str, value: &str) -> Result<Self, IdentityError> {
        let reject = |reason| IdentityError::InvalidSegment {
            field,
            value: value.to_string(),
            reason,
        };

        if value.is_empty() {
            return Err(reject("must not be empty"));
        }
        if value == "." || value == ".." {
            return Err(reject("parent or current directory reference"));
        }
        if value.contains(['/', '\\']) {
            return Err(reject("must not contain a path separator"));
        }
        if value.contains('\0') {
            return Err(reject("must not contain a NUL byte"));
        }
        if value.len() > MAX_SEGMENT_LEN {
            return Err(reject("longer than 255 bytes"));
        }
        Ok(Self(value.to_string()))
    }

    /// Return the segment as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of a box: every version and provider published under
/// one `owner/name` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoxId {
    owner: Segment,
    name: Segment,
}

impl BoxId {
    /// Validate and assemble a box identity.
    pub fn new(owner: &str, name: &str) -> Result<Self, IdentityError> {
        Ok(Self {
            owner: Segment::new("owner", owner)?,
            name: Segment::new("name", name)?,
        })
    }

    /// The owning user or organisation.
    pub fn owner(&self) -> &Segment {
        &self.owner
    }

    /// The box name.
    pub fn name(&self) -> &Segment {
        &self.name
    }

    /// Relative path prefix shared by every artifact of this box: `owner/name`.
    pub fn path(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Display tag used by box catalogs: `owner/name`.
    pub fn tag(&self) -> String {
        self.path()
    }

    /// Extend this box identity to one provider artifact.
    pub fn artifact(&self, version: &str, provider: &str) -> Result<ArtifactIdentity, IdentityError> {
        Ok(ArtifactIdentity {
            box_id: self.clone(),
            version: Segment::new("version", version)?,
            provider: Segment::new("provider", provider)?,
        })
    }
}

impl fmt::Display for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Identity of exactly one stored provider artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactIdentity {
    box_id: BoxId,
    version: Segment,
    provider: Segment,
}

impl ArtifactIdentity {
    /// Validate and assemble the full four-part identity.
    pub fn new(
        owner: &str,
        name: &str,
        version: &str,
        provider: &str,
    ) -> Result<Self, IdentityError> {
        BoxId::new(owner, name)?.artifact(version, provider)
    }

    /// The box this artifact belongs to.
    pub fn box_id(&self) -> &BoxId {
        &self.box_id
    }

    /// The box version.
    pub fn version(&self) -> &Segment {
        &self.version
    }

    /// The provider (virtualization backend).
    pub fn provider(&self) -> &Segment {
        &self.provider
    }

    /// Logical path of the artifact: `owner/name/version/provider`.
    ///
    /// This is the path clients address over HTTP.
    pub fn path(&self) -> String {
        format!("{}/{}/{}", self.box_id.path(), self.version, self.provider)
    }

    /// Relative storage path of the payload: `owner/name/version/provider/box`.
    pub fn file_path(&self) -> String {
        format!("{}/{}", self.path(), PAYLOAD_FILE)
    }
}

impl fmt::Display for ArtifactIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn file_path_layout() {
        let id = ArtifactIdentity::new("acme", "widget", "1.0.0", "virtualbox").unwrap();
        assert_eq!(id.path(), "acme/widget/1.0.0/virtualbox");
        assert_eq!(id.file_path(), "acme/widget/1.0.0/virtualbox/box");
        assert_eq!(id.box_id().path(), "acme/widget");
        assert_eq!(id.to_string(), "acme/widget/1.0.0/virtualbox");
    }

    #[test]
    fn rejects_traversal_segments() {
        for (owner, name) in [("..", "widget"), ("acme", ".."), (".", "widget")] {
            assert!(BoxId::new(owner, name).is_err(), "{owner}/{name}");
        }
        assert!(ArtifactIdentity::new("../../etc", "passwd", "1", "vb").is_err());
        assert!(ArtifactIdentity::new("acme", "widget", "..", "vb").is_err());
        assert!(ArtifactIdentity::new("acme", "widget", "1", "..").is_err());
    }

    #[test]
    fn rejects_separators_and_empty() {
        let err = Segment::new("owner", "a/b").unwrap_err();
        assert!(matches!(
            err,
            IdentityError::InvalidSegment { field: "owner", .. }
        ));
        assert!(Segment::new("name", "a\\b").is_err());
        assert!(Segment::new("name", "").is_err());
        assert!(Segment::new("name", "nul\0byte").is_err());
        assert!(Segment::new("name", &"x".repeat(256)).is_err());
        assert!(Segment::new("name", &"x".repeat(255)).is_ok());
    }

    #[test]
    fn dots_inside_segments_are_fine() {
        let id = ArtifactIdentity::new("acme", "widget.v2", "1.0.0-rc.1", "libvirt").unwrap();
        assert_eq!(id.file_path(), "acme/widget.v2/1.0.0-rc.1/libvirt/box");
        assert!(Segment::new("name", "...").is_ok());
    }

    #[test]
    fn invalid_field_is_reported() {
        match ArtifactIdentity::new("acme", "widget", "1.0", "") {
            Err(IdentityError::InvalidSegment { field, .. }) => assert_eq!(field, "provider"),
            other => panic!("expected provider rejection, got {other:?}"),
        }
    }

    fn segment() -> impl Strategy<Value = String> {
        "[A-Za-z0-9._-]{1,24}".prop_filter("not a dot reference", |s| s != "." && s != "..")
    }

    proptest! {
        #[test]
        fn path_is_exact_concatenation(
            owner in segment(), name in segment(), version in segment(), provider in segment()
        ) {
            let id = ArtifactIdentity::new(&owner, &name, &version, &provider).unwrap();
            prop_assert_eq!(id.file_path(), format!("{owner}/{name}/{version}/{provider}/box"));
        }

        #[test]
        fn mapping_is_injective(
            a in (segment(), segment(), segment(), segment()),
            b in (segment(), segment(), segment(), segment()),
        ) {
            let ia = ArtifactIdentity::new(&a.0, &a.1, &a.2, &a.3).unwrap();
            let ib = ArtifactIdentity::new(&b.0, &b.1, &b.2, &b.3).unwrap();
            prop_assert_eq!(ia == ib, ia.file_path() == ib.file_path());
        }

        #[test]
        fn separator_bearing_owner_is_rejected(prefix in segment(), suffix in segment()) {
            let owner = format!("{prefix}/{suffix}");
            prop_assert!(BoxId::new(&owner, "widget").is_err());
        }
    }
}
