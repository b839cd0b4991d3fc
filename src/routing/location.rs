//! Where the current path is read from and written to.

use std::fmt;

/// Source and sink of the current fragment (e.g. a browser hash, a history
/// entry, or a server request path).
pub trait Location: Send + Sync + fmt::Debug {
    /// The raw fragment, prefix included (e.g. `#!/foo/1`).
    fn fragment(&self) -> String;

    /// Replace the raw fragment.
    fn set_fragment(&mut self, fragment: String);
}

/// In-memory location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryLocation {
    fragment: String,
}

impl MemoryLocation {
    pub fn new(fragment: impl Into<String>) -> Self {
        Self {
            fragment: fragment.into(),
        }
    }
}

impl Location for MemoryLocation {
    fn fragment(&self) -> String {
        self.fragment.clone()
    }

    fn set_fragment(&mut self, fragment: String) {
        self.fragment = fragment;
    }
}

/// Extract the routable path from a raw fragment.
///
/// The prefix is stripped if present, then everything from the first `/` is
/// returned; a fragment without a `/` yields `/`.
pub fn path_from_fragment(fragment: &str, prefix: &str) -> String {
    let stripped = fragment.strip_prefix(prefix).unwrap_or(fragment);
    match stripped.find('/') {
        Some(index) => stripped[index..].to_string(),
        None => "/".to_string(),
    }
}

/// Build the raw fragment to navigate to.
pub fn fragment_for(hash: &str, prefix: &str) -> String {
    if hash.starts_with(prefix) {
        hash.to_string()
    } else {
        format!("{prefix}{hash}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_from_fragment() {
        assert_eq!(path_from_fragment("#/a/b", "#"), "/a/b");
        assert_eq!(path_from_fragment("#!/a/b", "#!"), "/a/b");
        assert_eq!(path_from_fragment("#!/a/b", "#"), "/a/b");
        assert_eq!(path_from_fragment("", "#"), "/");
        assert_eq!(path_from_fragment("#nothing", "#"), "/");
    }

    #[test]
    fn test_fragment_for() {
        assert_eq!(fragment_for("/a/1", "#"), "#/a/1");
        assert_eq!(fragment_for("#/a/1", "#"), "#/a/1");
        assert_eq!(fragment_for("/a/1", "#!"), "#!/a/1");
    }

    #[test]
    fn test_memory_location() {
        let mut location = MemoryLocation::default();
        assert_eq!(location.fragment(), "");
        location.set_fragment("#/x".into());
        assert_eq!(location.fragment(), "#/x");
    }
}
