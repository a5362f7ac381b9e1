//! Coding paths: the route from the root value to the current position.
//!
//! Paths only feed diagnostics. They display as RFC 6901 JSON Pointers.

use std::fmt;

/// One step of a [`CodingPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_owned())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(&escape_component(key)),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CodingPath {
    segments: Vec<PathSegment>,
}

impl CodingPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// A new path one step below `self`.
    pub fn child(&self, segment: impl Into<PathSegment>) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend_from_slice(&self.segments);
        segments.push(segment.into());
        Self { segments }
    }

    pub fn push(&mut self, segment: impl Into<PathSegment>) {
        self.segments.push(segment.into());
    }

    /// `self` followed by every segment of `tail`.
    pub fn join(&self, tail: &CodingPath) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + tail.segments.len());
        segments.extend_from_slice(&self.segments);
        segments.extend_from_slice(&tail.segments);
        Self { segments }
    }

    /// RFC 6901 form; the root is the empty string.
    pub fn to_pointer(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            out.push('/');
            out.push_str(&segment.to_string());
        }
        out
    }
}

impl fmt::Display for CodingPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_str("(root)");
        }
        f.write_str(&self.to_pointer())
    }
}

impl FromIterator<PathSegment> for CodingPath {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

fn escape_component(component: &str) -> String {
    if !component.contains('/') && !component.contains('~') {
        return component.to_string();
    }
    component.replace('~', "~0").replace('/', "~1")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_format_matrix() {
        assert_eq!(CodingPath::root().to_string(), "(root)");
        assert_eq!(CodingPath::root().to_pointer(), "");
        let path = CodingPath::root().child("items").child(0usize).child("a/b~c");
        assert_eq!(path.to_string(), "/items/0/a~1b~0c");
        assert_eq!(path.len(), 3);
        assert_eq!(path.last(), Some(&PathSegment::Key("a/b~c".into())));
    }

    #[test]
    fn join_appends_tail() {
        let head = CodingPath::root().child("user");
        let tail: CodingPath = [PathSegment::Key("name".into())].into_iter().collect();
        assert_eq!(head.join(&tail).to_string(), "/user/name");
        assert_eq!(CodingPath::root().join(&tail), tail);
    }
}
