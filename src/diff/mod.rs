//! In-memory diff model shared by the alignment and patch engines.
//!
//! A [`FileDiff`] is produced fresh for every file selection or refresh and
//! is never mutated afterwards; selections index into it by position.

mod parse;

pub use parse::{DiffError, parse_diff, parse_file_diff};

use crate::selection::LineCoord;

/// Where a line in a hunk comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Unchanged on both sides
    Context,
    /// Present only in the new version
    Addition,
    /// Present only in the old version
    Deletion,
}

impl Origin {
    /// The unified diff marker for this origin.
    pub fn marker(self) -> char {
        match self {
            Origin::Context => ' ',
            Origin::Addition => '+',
            Origin::Deletion => '-',
        }
    }
}

/// One physical line inside a hunk, without its diff marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub content: String,
    pub origin: Origin,
    /// Line number in the old file; absent for additions
    pub old_lineno: Option<u32>,
    /// Line number in the new file; absent for deletions
    pub new_lineno: Option<u32>,
    /// The line was followed by `\ No newline at end of file`
    pub missing_newline: bool,
}

impl DiffLine {
    pub fn context(old_lineno: u32, new_lineno: u32, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            origin: Origin::Context,
            old_lineno: Some(old_lineno),
            new_lineno: Some(new_lineno),
            missing_newline: false,
        }
    }

    pub fn addition(new_lineno: u32, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            origin: Origin::Addition,
            old_lineno: None,
            new_lineno: Some(new_lineno),
            missing_newline: false,
        }
    }

    pub fn deletion(old_lineno: u32, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            origin: Origin::Deletion,
            old_lineno: Some(old_lineno),
            new_lineno: None,
            missing_newline: false,
        }
    }

    /// Mark the line as the last one of its side, lacking a trailing newline.
    #[must_use]
    pub fn without_newline(mut self) -> Self {
        self.missing_newline = true;
        self
    }

    /// True for additions and deletions, the lines a user can select.
    pub fn is_change(&self) -> bool {
        self.origin != Origin::Context
    }
}

/// A contiguous change region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffHunk {
    /// Original header, e.g. `@@ -10,3 +10,4 @@`
    pub header: String,
    pub lines: Vec<DiffLine>,
}

/// All hunks of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    /// Repository-relative path
    pub path: String,
    pub hunks: Vec<DiffHunk>,
}

impl FileDiff {
    /// A file is new when its first hunk starts from an empty old side.
    pub fn is_new_file(&self) -> bool {
        self.hunks
            .first()
            .is_some_and(|hunk| hunk.header.starts_with("@@ -0,0"))
    }

    /// Coordinates of every addition and deletion, in diff order.
    pub fn changed_lines(&self) -> impl Iterator<Item = LineCoord> + '_ {
        self.hunks.iter().enumerate().flat_map(|(h, hunk)| {
            hunk.lines
                .iter()
                .enumerate()
                .filter(|(_, line)| line.is_change())
                .map(move |(l, _)| LineCoord::new(h, l))
        })
    }

    /// Look up a line by coordinate; `None` when the coordinate is stale.
    pub fn line(&self, coord: LineCoord) -> Option<&DiffLine> {
        self.hunks.get(coord.hunk)?.lines.get(coord.line)
    }
}

#[cfg(test)]
pub(crate) mod strategies {
    use super::*;
    use crate::header::HunkRange;
    use proptest::prelude::*;

    /// Hunk lines with consistent old/new numbering starting at line 1.
    pub(crate) fn arb_lines() -> impl Strategy<Value = Vec<DiffLine>> {
        let origin = prop_oneof![
            Just(Origin::Context),
            Just(Origin::Addition),
            Just(Origin::Deletion)
        ];
        prop::collection::vec(origin, 0..40).prop_map(|origins| {
            let (mut old, mut new) = (1, 1);
            let mut lines = Vec::with_capacity(origins.len());
            for (i, origin) in origins.into_iter().enumerate() {
                let content = format!("line {i}");
                lines.push(match origin {
                    Origin::Context => DiffLine::context(old, new, content),
                    Origin::Addition => DiffLine::addition(new, content),
                    Origin::Deletion => DiffLine::deletion(old, content),
                });
                if origin != Origin::Addition {
                    old += 1;
                }
                if origin != Origin::Deletion {
                    new += 1;
                }
            }
            lines
        })
    }

    /// A hunk whose header agrees with its lines.
    pub(crate) fn arb_hunk() -> impl Strategy<Value = DiffHunk> {
        (1u32..500, arb_lines()).prop_map(|(start, lines)| {
            let old_len = lines.iter().filter(|l| l.origin != Origin::Addition).count();
            let new_len = lines.iter().filter(|l| l.origin != Origin::Deletion).count();
            let range = HunkRange {
                old_start: start,
                old_len: old_len as u32,
                new_start: start,
                new_len: new_len as u32,
            };
            DiffHunk {
                header: range.to_string(),
                lines,
            }
        })
    }

    pub(crate) fn arb_file_diff() -> impl Strategy<Value = FileDiff> {
        prop::collection::vec(arb_hunk(), 0..6).prop_map(|hunks| FileDiff {
            path: "src/lib.rs".to_string(),
            hunks,
        })
    }
}
