//! Output/source path classification.
//!
//! Hexmake has exactly one reserved directory: `out/`. Anything whose first
//! path segment is `out` is produced by the build; everything else is a
//! source file resolved against the workspace root.

use std::fmt;

/// The reserved output-root segment.
pub const OUTPUT_ROOT: &str = "out";

/// An opaque, immutable build path. Two `ArtifactPath`s are equal iff their
/// text is equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtifactPath(String);

impl ArtifactPath {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True iff this path's first segment is the reserved output root.
    ///
    /// `"out"` alone (no trailing separator) is NOT an output path, and
    /// `"output/..."` is NOT an output path — only an exact `"out/"` prefix
    /// qualifies.
    pub fn is_output(&self) -> bool {
        self.0
            .strip_prefix(OUTPUT_ROOT)
            .and_then(|rest| rest.strip_prefix('/'))
            .is_some()
    }

    /// Append a separator and `name` to this path.
    pub fn child(&self, name: &str) -> ArtifactPath {
        ArtifactPath(format!("{}/{}", self.0, name))
    }
}

impl fmt::Display for ArtifactPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ArtifactPath {
    fn from(s: String) -> Self {
        ArtifactPath(s)
    }
}

impl From<&str> for ArtifactPath {
    fn from(s: &str) -> Self {
        ArtifactPath(s.to_string())
    }
}
