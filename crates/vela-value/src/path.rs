use core::fmt::Display;

use thisisplural::Plural;

/// Path from the root of a validated value to a nested value.
///
/// Composite schemas extend the path by one segment per level while they
/// recurse, so an issue deep inside a structure is reported at, e.g.,
/// `children[2].children[0].value`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Plural)]
pub struct Path(pub Vec<PathSegment>);

impl Path {
    /// Create an empty path representing the root value
    pub fn root() -> Self {
        Path(Vec::new())
    }

    /// Check if this is the root path
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Create a path from a sequence of keys and indices.
    pub fn from_segments<S: Into<PathSegment>>(segments: impl IntoIterator<Item = S>) -> Self {
        Path(segments.into_iter().map(Into::into).collect())
    }

    /// Returns a new path with `segment` appended.
    pub fn join(&self, segment: impl Into<PathSegment>) -> Self {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.extend(self.0.iter().cloned());
        segments.push(segment.into());
        Path(segments)
    }

    /// Returns a new path with all of `other`'s segments appended.
    pub fn concat(&self, other: &Path) -> Self {
        let mut segments = self.0.clone();
        segments.extend(other.0.iter().cloned());
        Path(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn first(&self) -> Option<&PathSegment> {
        self.0.first()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
    /// Object key, record key, or the `"key"`/`"value"` half of a map entry
    Key(String),
    /// Array, tuple, set, or map entry position
    Index(usize),
}

impl PathSegment {
    pub fn as_key(&self) -> Option<&str> {
        match self {
            PathSegment::Key(key) => Some(key),
            PathSegment::Index(_) => None,
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathSegment::Key(_) => None,
            PathSegment::Index(index) => Some(*index),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

impl Display for PathSegment {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{key}"),
            PathSegment::Index(index) => write!(f, "{index}"),
        }
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.0.is_empty() {
            return write!(f, "(root)");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if is_plain_key(key) => {
                    if i != 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{key}")?;
                }
                PathSegment::Key(key) => write!(f, "[{key:?}]")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

fn is_plain_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_empty_path() {
        assert_eq!(format!("{}", Path::root()), "(root)");
    }

    #[test]
    fn test_display_nested_keys() {
        let path = Path::from_segments(["a", "b", "c"]);
        assert_eq!(format!("{}", path), "a.b.c");
    }

    #[test]
    fn test_display_index() {
        let path = Path::root().join("items").join(0usize);
        assert_eq!(format!("{}", path), "items[0]");
    }

    #[test]
    fn test_display_leading_index() {
        let path = Path::root().join(3usize).join("name");
        assert_eq!(format!("{}", path), "[3].name");
    }

    #[test]
    fn test_display_key_with_spaces() {
        let path = Path::root().join("config").join("key with space");
        assert_eq!(format!("{}", path), "config[\"key with space\"]");
    }

    #[test]
    fn test_join_does_not_touch_receiver() {
        let base = Path::root().join("a");
        let child = base.join(1usize);
        assert_eq!(base.segments().len(), 1);
        assert_eq!(child.segments().len(), 2);
        assert_eq!(child.segments()[1], PathSegment::Index(1));
    }

    #[test]
    fn test_concat() {
        let left = Path::from_segments(["a"]);
        let right = Path::root().join(0usize).join("b");
        assert_eq!(format!("{}", left.concat(&right)), "a[0].b");
    }
}
