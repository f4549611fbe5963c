//! Namespace paths and prefix membership
//!
//! Paths may use either `::` (Rust module paths) or `.` as separators, so
//! `nexum_apdu_core::executor` and `com.example.lib` both parse. Membership is
//! checked segment by segment: `com.example.lib` contains `com.example.lib.Foo`
//! but not `com.example.library.Foo`.

use core::fmt;

use crate::error::TraceError;

/// Split a path into its segments, accepting `::` and `.` separators
pub(crate) fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split("::").flat_map(|part| part.split('.'))
}

fn is_identifier(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// A parsed namespace, such as a crate root or one of its modules
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    segments: Vec<String>,
    path: String,
}

impl Namespace {
    /// Parse a namespace path
    pub fn parse(path: &str) -> Result<Self, TraceError> {
        let trimmed = path.trim();
        if trimmed.is_empty() {
            return Err(TraceError::EmptyNamespace);
        }

        let segments = segments(trimmed)
            .map(|segment| {
                if is_identifier(segment) {
                    Ok(segment.to_string())
                } else {
                    Err(TraceError::invalid_segment(trimmed, segment))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        let path = segments.join("::");
        Ok(Self { segments, path })
    }

    /// Canonical `::`-separated form of the namespace
    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// Segments of the namespace, outermost first
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }

    /// Namespace nested below this one, e.g. `utils` under the crate root
    pub fn join(&self, relative: &str) -> Result<Self, TraceError> {
        let child = Self::parse(relative)?;
        let mut segments = self.segments.clone();
        segments.extend(child.segments);
        let path = segments.join("::");
        Ok(Self { segments, path })
    }

    /// Whether `other` is this namespace or nested inside it
    pub fn contains(&self, other: &Self) -> bool {
        self.is_prefix_of(other.segments())
    }

    /// Whether the dotted or `::` separated `path` lies in this namespace
    pub fn contains_path(&self, path: &str) -> bool {
        self.is_prefix_of(segments(path))
    }

    pub(crate) fn is_prefix_of<'a>(&self, mut path: impl Iterator<Item = &'a str>) -> bool {
        self.segments
            .iter()
            .all(|own| path.next() == Some(own.as_str()))
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl core::str::FromStr for Namespace {
    type Err = TraceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
