//! Composite identifier decomposition.
//!
//! XL Release ids are hierarchical paths such as
//! `Applications/Folder1/Release0e4d/Phasef593/Task9b0c/Taskbd8f`. URL-style
//! ids use `-` instead of `/`. Both delimiters are accepted.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("no {part} segment in id '{id}'")]
    PartNotFound { part: IdPart, id: String },
}

/// The entity kinds that can be pulled out of a composite id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdPart {
    Release,
    Phase,
    Task,
}

impl IdPart {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Release => "Release",
            Self::Phase => "Phase",
            Self::Task => "Task",
        }
    }

    fn classify(token: &str) -> Option<Self> {
        [Self::Release, Self::Phase, Self::Task]
            .into_iter()
            .find(|part| token.starts_with(part.as_str()))
    }
}

impl fmt::Display for IdPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One delimiter-separated piece of a composite id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    /// `None` for folders, `Applications` and anything else unrecognized.
    pub kind: Option<IdPart>,
    pub token: &'a str,
    /// Byte offset just past the token in the source id.
    end: usize,
}

/// A composite id split into typed segments.
#[derive(Debug, Clone)]
pub struct CompositeId<'a> {
    raw: &'a str,
    segments: Vec<Segment<'a>>,
}

impl<'a> CompositeId<'a> {
    pub fn parse(raw: &'a str) -> Self {
        let mut segments = Vec::new();
        let mut start = 0;
        for (i, c) in raw.char_indices().chain(std::iter::once((raw.len(), '/'))) {
            if c != '/' && c != '-' {
                continue;
            }
            let token = &raw[start..i];
            if !token.is_empty() {
                segments.push(Segment {
                    kind: IdPart::classify(token),
                    token,
                    end: i,
                });
            }
            start = i + c.len_utf8();
        }
        Self { raw, segments }
    }

    pub fn segments(&self) -> &[Segment<'a>] {
        &self.segments
    }

    /// The last segment of the given kind, if any.
    pub fn last(&self, part: IdPart) -> Option<&Segment<'a>> {
        self.segments.iter().rev().find(|s| s.kind == Some(part))
    }

    /// Extract a sub-id.
    ///
    /// With `last_part_only` this is the bare token of the last `part`
    /// segment (`Release0e4d`); otherwise it is the whole id up to and
    /// including that segment (`Applications/Folder1/Release0e4d`).
    pub fn extract(&self, part: IdPart, last_part_only: bool) -> Result<&'a str, IdError> {
        let segment = self.last(part).ok_or_else(|| IdError::PartNotFound {
            part,
            id: self.raw.to_string(),
        })?;
        if last_part_only {
            Ok(segment.token)
        } else {
            Ok(&self.raw[..segment.end])
        }
    }
}

/// Shorthand for [`CompositeId::extract`] returning an owned string.
pub fn parse_id(id: &str, part: IdPart, last_part_only: bool) -> Result<String, IdError> {
    CompositeId::parse(id)
        .extract(part, last_part_only)
        .map(str::to_string)
}
