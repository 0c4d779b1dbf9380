//! Build a unified diff that stages only the selected lines of a file.
//!
//! The rules per hunk line:
//!
//! | line              | selected          | not selected        |
//! |-------------------|-------------------|---------------------|
//! | context           | kept              | kept                |
//! | addition          | kept as addition  | dropped             |
//! | deletion          | kept as deletion  | kept as **context** |
//!
//! An unselected deletion still exists in the index, so it has to appear as
//! context for the patch to apply. Hunk lengths are recounted from the lines
//! that survive; start lines are taken from the original header. A hunk with
//! no selected line is left out entirely.
//!
//! An unselected deletion that lacks its trailing newline would end the hunk
//! as context. If selected additions follow it, it is written as a removal
//! plus a re-addition with the newline, so the additions start on a line of
//! their own.

use crate::diff::{DiffHunk, DiffLine, FileDiff, Origin};
use crate::header::HunkRange;
use crate::selection::{LineCoord, SelectionSet};
use error_set::error_set;
use std::fmt;
use tracing::{debug, trace};

error_set! {
    /// Errors from building a patch
    PatchError := {
        /// A hunk with selected lines has a header that cannot be parsed
        #[display("Hunk {hunk} has an invalid header '{header}'")]
        MalformedHeader { hunk: usize, header: String },
    }
}

/// A patch for one file, ready to be fed to `git apply --cached`.
///
/// Rendering through [`Display`](fmt::Display) produces the patch text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch<'a> {
    pub path: &'a str,
    /// Old side is `/dev/null`
    pub new_file: bool,
    pub hunks: Vec<PatchHunk<'a>>,
}

impl Patch<'_> {
    /// No hunk survived the selection; applying this patch would do nothing.
    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }
}

/// A hunk of a synthesized patch, with recomputed lengths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchHunk<'a> {
    /// Index of the source hunk in the [`FileDiff`]
    pub hunk: usize,
    pub range: HunkRange,
    pub lines: Vec<PatchLine<'a>>,
}

/// A line of a synthesized hunk. `origin` can differ from the source line's
/// origin: unselected deletions become context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchLine<'a> {
    pub origin: Origin,
    pub line: &'a DiffLine,
    /// Followed by `\ No newline at end of file`
    pub missing_newline: bool,
}

/// Build the patch staging exactly the selected lines of `diff`.
///
/// Coordinates in `selection` that do not name a line of `diff` are ignored.
///
/// # Errors
///
/// Returns [`PatchError::MalformedHeader`] when a hunk that has selected
/// lines carries a header that does not parse. Hunks without selected lines
/// are never parsed.
pub fn synthesize<'a>(
    diff: &'a FileDiff,
    selection: &SelectionSet,
) -> Result<Patch<'a>, PatchError> {
    let mut hunks = Vec::new();

    for (index, hunk) in diff.hunks.iter().enumerate() {
        match synthesize_hunk(index, hunk, selection)? {
            Some(patch_hunk) => hunks.push(patch_hunk),
            None => trace!(hunk = index, "no selected lines, dropping hunk"),
        }
    }

    debug!(path = %diff.path, hunks = hunks.len(), "synthesized patch");

    Ok(Patch {
        path: &diff.path,
        new_file: diff.is_new_file(),
        hunks,
    })
}

fn synthesize_hunk<'a>(
    index: usize,
    hunk: &'a DiffHunk,
    selection: &SelectionSet,
) -> Result<Option<PatchHunk<'a>>, PatchError> {
    let selected = |line: usize| selection.contains(LineCoord::new(index, line));

    let has_selection = hunk
        .lines
        .iter()
        .enumerate()
        .any(|(l, line)| line.is_change() && selected(l));
    if !has_selection {
        return Ok(None);
    }

    let range = HunkRange::parse(&hunk.header).map_err(|_| PatchError::MalformedHeader {
        hunk: index,
        header: hunk.header.clone(),
    })?;

    let mut lines = Vec::with_capacity(hunk.lines.len());
    for (l, line) in hunk.lines.iter().enumerate() {
        let origin = match (line.origin, selected(l)) {
            (Origin::Context, _) => Origin::Context,
            (Origin::Addition, true) => Origin::Addition,
            (Origin::Addition, false) => continue,
            (Origin::Deletion, true) => Origin::Deletion,
            (Origin::Deletion, false) => Origin::Context,
        };
        lines.push(PatchLine {
            origin,
            line,
            missing_newline: line.missing_newline,
        });
    }

    // A context line lacking its newline can only end a hunk. When kept lines
    // follow it, stage the newline: remove the bare line and add it back whole.
    let last = lines.len().saturating_sub(1);
    if let Some(pos) = lines[..last]
        .iter()
        .position(|pl| pl.origin == Origin::Context && pl.missing_newline)
    {
        debug!(hunk = index, line = pos, "staging missing newline before kept lines");
        let line = lines[pos].line;
        lines[pos].origin = Origin::Deletion;
        lines.insert(
            pos + 1,
            PatchLine {
                origin: Origin::Addition,
                line,
                missing_newline: false,
            },
        );
    }

    let old_len = lines.iter().filter(|pl| pl.origin != Origin::Addition).count() as u32;
    let new_len = lines.iter().filter(|pl| pl.origin != Origin::Deletion).count() as u32;

    Ok(Some(PatchHunk {
        hunk: index,
        range: HunkRange {
            old_len,
            new_len,
            ..range
        },
        lines,
    }))
}

impl fmt::Display for Patch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.new_file {
            writeln!(f, "--- /dev/null")?;
        } else {
            writeln!(f, "--- a/{}", self.path)?;
        }
        writeln!(f, "+++ b/{}", self.path)?;

        for hunk in &self.hunks {
            write!(f, "{}", hunk)?;
        }

        Ok(())
    }
}

impl fmt::Display for PatchHunk<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.range)?;

        for PatchLine {
            origin,
            line,
            missing_newline,
        } in &self.lines
        {
            writeln!(f, "{}{}", origin.marker(), line.content)?;
            if *missing_newline {
                writeln!(f, "\\ No newline at end of file")?;
            }
        }

        Ok(())
    }
}
