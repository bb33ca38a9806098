use std::fmt;

use percent_encoding::percent_decode_str;

use crate::error::{TreeError, TreeResult};

/// One step of a path walk, classified by segment parity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step<'a> {
    /// Even index: look up a field on an object.
    Field(&'a str),
    /// Odd index: look up a record by id inside a collection.
    Record(&'a str),
}

/// A decoded document address.
///
/// The empty path denotes the document root.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct DocPath {
    segments: Vec<String>,
}

impl DocPath {
    /// The root path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a path from already-decoded segments.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse the path component of a request URI.
    ///
    /// Empty segments are dropped, so `/`, `` and `//people/` all normalize.
    /// Each segment is percent-decoded as UTF-8.
    pub fn from_uri_path(raw: &str) -> TreeResult<Self> {
        let segments = raw
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                percent_decode_str(s)
                    .decode_utf8()
                    .map(|decoded| decoded.into_owned())
                    .map_err(|e| TreeError::InvalidSegment {
                        segment: s.to_string(),
                        reason: e.to_string(),
                    })
            })
            .collect::<TreeResult<Vec<_>>>()?;
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The final segment, if any.
    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// The path without its final segment. The parent of the root is the root.
    pub fn parent(&self) -> DocPath {
        self.prefix(self.len().saturating_sub(1))
    }

    /// The path made of the first `len` segments.
    pub fn prefix(&self, len: usize) -> DocPath {
        Self {
            segments: self.segments[..len.min(self.len())].to_vec(),
        }
    }

    /// Split into the parent path and the final segment.
    pub fn split_last(&self) -> Option<(DocPath, &str)> {
        let last = self.last()?;
        Some((self.parent(), last))
    }

    /// Iterate the segments with their collection/record interpretation.
    pub fn steps(&self) -> impl Iterator<Item = Step<'_>> {
        self.segments.iter().enumerate().map(|(index, segment)| {
            if index % 2 == 0 {
                Step::Field(segment)
            } else {
                Step::Record(segment)
            }
        })
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl<S: Into<String>> FromIterator<S> for DocPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}
