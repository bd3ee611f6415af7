//! Canonical path keys.
//!
//! A [`Key`] is an opaque, hierarchical, slash-separated path string
//! (`/a/b/c`). Keys carry a canonical form that is stable across all
//! store operations, and their total order is byte-wise lexicographic
//! order on that form, which is what the SQL `ORDER BY key` clause and
//! the in-memory post-processing sort both rely on.

use std::fmt;

/// An immutable datastore key.
///
/// Construction canonicalizes the path: a leading slash is ensured,
/// empty and `.` segments are dropped, `..` pops the previous segment,
/// and the root is spelled `/`.
///
/// # Example
///
/// ```
/// use sqlds::Key;
///
/// assert_eq!(Key::new("foo").as_str(), "/foo");
/// assert_eq!(Key::new("/a/b/../c/").as_str(), "/a/c");
/// assert_eq!(Key::new(""), Key::new("/"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key(String);

impl Key {
    /// Create a key from a path string, canonicalizing it.
    #[must_use]
    pub fn new(path: &str) -> Self {
        Self(canonicalize(path))
    }

    /// The canonical string form of the key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if this is the root key `/`.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// The last path segment, or `/` for the root key.
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().filter(|s| !s.is_empty()).unwrap_or("/")
    }

    /// The parent key, with the root as its own parent.
    #[must_use]
    pub fn parent(&self) -> Self {
        match self.0.rfind('/') {
            Some(0) | None => Self("/".to_string()),
            Some(idx) => Self(self.0[..idx].to_string()),
        }
    }

    /// A child of this key with the given name.
    #[must_use]
    pub fn child(&self, name: &str) -> Self {
        Self::new(&format!("{}/{name}", self.0))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Key {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for Key {
    fn from(path: String) -> Self {
        Self::new(&path)
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Reduce a path to its canonical form.
fn canonicalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        return "/".to_string();
    }

    let mut out = String::with_capacity(path.len());
    for segment in segments {
        out.push('/');
        out.push_str(segment);
    }
    out
}
