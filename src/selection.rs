//! Line selections and the `file:refs` syntax that produces them.
//!
//! A [`SelectionSet`] is owned by whoever drives the interaction; the engines
//! only borrow it for the duration of a call. Coordinates are positions in
//! one [`FileDiff`] and become meaningless once that diff is replaced, so
//! a fresh diff always starts with a fresh selection.
//!
//! # Reference syntax
//!
//! `FILE:REFS` where `REFS` is a comma-separated list of:
//! - `H` - every added/removed line of hunk `H`
//! - `H.L` - line `L` of hunk `H`
//! - `H.L..M` - lines `L` through `M` of hunk `H` (inclusive)
//!
//! Hunk and line indexes are zero-based and count context lines, matching the
//! coordinates printed by `hunkwise diff`.
//!
//! ```
//! use hunkwise::selection::{parse_selection_refs, LineRef};
//!
//! let refs = parse_selection_refs("src/lib.rs:0.3,2").unwrap();
//! assert_eq!(refs.file, "src/lib.rs");
//! assert_eq!(refs.refs, vec![
//!     LineRef::Line { hunk: 0, line: 3 },
//!     LineRef::Hunk(2),
//! ]);
//! ```

use crate::diff::FileDiff;
use error_set::error_set;
use std::collections::HashSet;
use std::collections::hash_set;

error_set! {
    /// Errors from parsing file:refs syntax
    ParseError := {
        /// Input string does not contain a colon separator
        #[display("Invalid format '{input}': expected 'file:refs'")]
        InvalidFormat { input: String },
        /// File name portion before the colon is empty or whitespace
        #[display("Invalid format '{input}': file name cannot be empty")]
        EmptyFileName { input: String },
        /// No references provided after the colon
        #[display("No line references provided")]
        EmptyRefs,
        /// Hunk or line index is not a non-negative integer
        #[display("Invalid index '{value}'")]
        InvalidIndex { value: String },
        /// Range has start greater than end
        #[display("Invalid range {start}..{end}: start must be <= end")]
        InvalidRange { start: usize, end: usize },
    }
}

/// Position of a line inside a [`FileDiff`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineCoord {
    pub hunk: usize,
    pub line: usize,
}

impl LineCoord {
    pub fn new(hunk: usize, line: usize) -> Self {
        Self { hunk, line }
    }
}

/// The set of added/removed lines a user has marked for staging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    coords: HashSet<LineCoord>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select every added and removed line of `diff`.
    pub fn all(diff: &FileDiff) -> Self {
        diff.changed_lines().collect()
    }

    pub fn contains(&self, coord: LineCoord) -> bool {
        self.coords.contains(&coord)
    }

    pub fn insert(&mut self, coord: LineCoord) -> bool {
        self.coords.insert(coord)
    }

    pub fn remove(&mut self, coord: LineCoord) -> bool {
        self.coords.remove(&coord)
    }

    /// Flip one line. Context lines and coordinates outside `diff` are left
    /// alone. Returns whether the line is selected afterwards.
    pub fn toggle_line(&mut self, diff: &FileDiff, coord: LineCoord) -> bool {
        if !diff.line(coord).is_some_and(|line| line.is_change()) {
            return false;
        }
        if self.coords.remove(&coord) {
            false
        } else {
            self.coords.insert(coord);
            true
        }
    }

    /// Select every change line of a hunk, or clear them all when every one
    /// of them is already selected.
    pub fn toggle_hunk(&mut self, diff: &FileDiff, hunk: usize) {
        let Some(lines) = diff.hunks.get(hunk).map(|h| &h.lines) else {
            return;
        };
        let coords: Vec<_> = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.is_change())
            .map(|(l, _)| LineCoord::new(hunk, l))
            .collect();

        if coords.iter().all(|c| self.coords.contains(c)) {
            for c in &coords {
                self.coords.remove(c);
            }
        } else {
            self.coords.extend(coords);
        }
    }

    /// Replace the selection with every change line of `diff`.
    pub fn select_all(&mut self, diff: &FileDiff) {
        self.coords = diff.changed_lines().collect();
    }

    pub fn clear(&mut self) {
        self.coords.clear();
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn iter(&self) -> hash_set::Iter<'_, LineCoord> {
        self.coords.iter()
    }
}

impl FromIterator<LineCoord> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = LineCoord>>(iter: I) -> Self {
        Self {
            coords: iter.into_iter().collect(),
        }
    }
}

impl Extend<LineCoord> for SelectionSet {
    fn extend<I: IntoIterator<Item = LineCoord>>(&mut self, iter: I) {
        self.coords.extend(iter);
    }
}

/// A reference to lines to select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineRef {
    /// Every change line of a hunk
    Hunk(usize),
    /// A single line
    Line { hunk: usize, line: usize },
    /// Lines `start..=end` of one hunk
    Range {
        hunk: usize,
        start: usize,
        end: usize,
    },
}

/// Parsed `file:refs` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSelection {
    pub file: String,
    pub refs: Vec<LineRef>,
}

impl FileSelection {
    /// Turn the references into a selection over `diff`.
    ///
    /// Only additions and deletions are selected; references to context lines
    /// or to lines the diff does not have are dropped.
    pub fn resolve(&self, diff: &FileDiff) -> SelectionSet {
        let mut selection = SelectionSet::new();

        for line_ref in &self.refs {
            let (hunk, lines) = match *line_ref {
                LineRef::Hunk(hunk) => (hunk, 0..=usize::MAX),
                LineRef::Line { hunk, line } => (hunk, line..=line),
                LineRef::Range { hunk, start, end } => (hunk, start..=end),
            };
            let Some(diff_hunk) = diff.hunks.get(hunk) else {
                continue;
            };
            selection.extend(
                diff_hunk
                    .lines
                    .iter()
                    .enumerate()
                    .filter(|(l, line)| lines.contains(l) && line.is_change())
                    .map(|(l, _)| LineCoord::new(hunk, l)),
            );
        }

        selection
    }
}

/// Selection over `diff` made of every reference that names its path.
pub fn resolve_all(diff: &FileDiff, selections: &[FileSelection]) -> SelectionSet {
    selections
        .iter()
        .filter(|selection| selection.file == diff.path)
        .flat_map(|selection| selection.resolve(diff).coords)
        .collect()
}

/// Parse a `file:refs` string.
///
/// # Errors
///
/// Returns [`ParseError`] if:
/// - Input doesn't contain `:` separator
/// - File name is empty or whitespace
/// - No references provided
/// - An index is not a number, or a range runs backwards
pub fn parse_selection_refs(input: &str) -> Result<FileSelection, ParseError> {
    let Some((file, refs)) = input.rsplit_once(':') else {
        return Err(ParseError::InvalidFormat {
            input: input.to_string(),
        });
    };

    let file = file.trim();
    if file.is_empty() {
        return Err(ParseError::EmptyFileName {
            input: input.to_string(),
        });
    }

    Ok(FileSelection {
        file: file.to_string(),
        refs: parse_line_refs(refs)?,
    })
}

/// Examples: "0", "1.4", "0.2..5,3"
fn parse_line_refs(input: &str) -> Result<Vec<LineRef>, ParseError> {
    let refs: Vec<LineRef> = input
        .split(',')
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .map(parse_single_ref)
        .collect::<Result<Vec<_>, _>>()?;

    if refs.is_empty() {
        return Err(ParseError::EmptyRefs);
    }

    Ok(refs)
}

fn parse_single_ref(input: &str) -> Result<LineRef, ParseError> {
    let Some((hunk, lines)) = input.split_once('.') else {
        return Ok(LineRef::Hunk(parse_index(input)?));
    };
    let hunk = parse_index(hunk)?;

    if let Some((start, end)) = lines.split_once("..") {
        let start = parse_index(start)?;
        let end = parse_index(end)?;
        if start > end {
            return Err(ParseError::InvalidRange { start, end });
        }
        Ok(LineRef::Range { hunk, start, end })
    } else {
        Ok(LineRef::Line {
            hunk,
            line: parse_index(lines)?,
        })
    }
}

fn parse_index(input: &str) -> Result<usize, ParseError> {
    input
        .parse::<usize>()
        .map_err(|_| ParseError::InvalidIndex {
            value: input.to_string(),
        })
}
