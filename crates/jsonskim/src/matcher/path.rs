use alloc::string::String;
use core::fmt;

use crate::lexer::ContainerKind;

/// One open container on the path from the root to the current event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A container held by an object member.
    Name(String),
    /// An anonymous object: the root, or an array element.
    Object,
    /// An anonymous array: the root, or an array element.
    Array,
}

impl Segment {
    pub(crate) fn new(name: Option<&str>, kind: ContainerKind) -> Self {
        match (name, kind) {
            (Some(name), _) => Self::Name(name.into()),
            (None, ContainerKind::Object) => Self::Object,
            (None, ContainerKind::Array) => Self::Array,
        }
    }

    /// The member name, or `{}` / `[]` for anonymous containers.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Object => "{}",
            Self::Array => "[]",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) fn join(segments: &[Segment]) -> String {
    let mut out = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            out.push('/');
        }
        out.push_str(segment.as_str());
    }
    out
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn anonymous_containers_use_brackets() {
        let path = vec![
            Segment::new(None, ContainerKind::Array),
            Segment::new(None, ContainerKind::Object),
            Segment::new(Some("devices"), ContainerKind::Array),
        ];
        assert_eq!(join(&path), "[]/{}/devices");
        assert_eq!(join(&[]), "");
    }
}
