//! Pairing of hunk lines into two-column (old | new) rows.
//!
//! A run of deletions is paired index-wise with the run of additions that
//! immediately follows it, so a replaced line sits next to its replacement.
//! Pairing is by position, never by content, and rows always come out in the
//! hunk's own line order.

use crate::diff::{DiffHunk, DiffLine, Origin};

/// One display row of a split view.
///
/// `left` is a context or deletion line, `right` a context or addition
/// line. A context row carries the same line on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignedRow<'a> {
    pub left: Option<&'a DiffLine>,
    pub right: Option<&'a DiffLine>,
}

impl AlignedRow<'_> {
    pub fn is_context(&self) -> bool {
        self.left.is_some_and(|line| line.origin == Origin::Context)
    }
}

/// Align the lines of one hunk for split display.
pub fn align(hunk: &DiffHunk) -> Vec<AlignedRow<'_>> {
    align_positions(hunk)
        .into_iter()
        .map(|(left, right)| AlignedRow {
            left: left.and_then(|i| hunk.lines.get(i)),
            right: right.and_then(|i| hunk.lines.get(i)),
        })
        .collect()
}

/// Same rows as [`align`], as indexes into `hunk.lines`.
pub fn align_positions(hunk: &DiffHunk) -> Vec<(Option<usize>, Option<usize>)> {
    let lines = &hunk.lines;
    let mut rows = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        match lines[i].origin {
            Origin::Context => {
                rows.push((Some(i), Some(i)));
                i += 1;
            }
            Origin::Deletion => {
                let deletions = i..i + run_len(&lines[i..], Origin::Deletion);
                let additions =
                    deletions.end..deletions.end + run_len(&lines[deletions.end..], Origin::Addition);
                i = additions.end;

                for k in 0..deletions.len().max(additions.len()) {
                    rows.push((
                        (k < deletions.len()).then(|| deletions.start + k),
                        (k < additions.len()).then(|| additions.start + k),
                    ));
                }
            }
            Origin::Addition => {
                rows.push((None, Some(i)));
                i += 1;
            }
        }
    }

    rows
}

/// Length of the longest prefix of `lines` whose lines all have `origin`.
fn run_len(lines: &[DiffLine], origin: Origin) -> usize {
    lines
        .iter()
        .position(|line| line.origin != origin)
        .unwrap_or(lines.len())
}
