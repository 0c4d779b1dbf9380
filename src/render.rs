//! Text views of a [`FileDiff`] for the command line.
//!
//! Every line is prefixed with its `hunk.line` coordinate so it can be typed
//! back as a selection reference, and change lines carry a `[x]`/`[ ]`
//! selection mark.

use crate::align::align_positions;
use crate::diff::{DiffLine, FileDiff};
use crate::selection::{LineCoord, SelectionSet};

/// Default width of the old-side column in split view
pub const DEFAULT_SPLIT_WIDTH: usize = 60;

/// One-column view, lines in diff order.
///
/// Example output:
/// ```text
/// notes.txt:
/// hunk 0  @@ -1,3 +1,3 @@
///       0.0      1    1  a
///   [ ] 0.1      2      -b
///   [x] 0.2           2 +B
///       0.3      3    3  c
/// ```
pub fn render_unified(diff: &FileDiff, selection: &SelectionSet) -> String {
    let mut result = String::new();
    result.push_str(&diff.path);
    result.push_str(":\n");

    for (h, hunk) in diff.hunks.iter().enumerate() {
        if h > 0 {
            result.push('\n');
        }
        result.push_str(&format!("hunk {}  {}\n", h, hunk.header));

        for (l, line) in hunk.lines.iter().enumerate() {
            let coord = LineCoord::new(h, l);
            push_trimmed(
                &mut result,
                &format!(
                    "  {} {:<6}{:>4} {:>4} {}{}",
                    mark(line, coord, selection),
                    coord_label(coord),
                    lineno(line.old_lineno),
                    lineno(line.new_lineno),
                    line.origin.marker(),
                    line.content
                ),
            );
        }
    }

    result
}

/// Two-column view: old side on the left, new side on the right, with
/// replaced lines paired up by [`align`](crate::align::align).
///
/// `width` is the width of the left column; longer left cells are cut.
///
/// Example output:
/// ```text
/// notes.txt:
/// hunk 0  @@ -1,3 +1,3 @@
///     0.0      1  a                │              1  a
/// [ ] 0.1      2 -b                │ [x] 0.2      2 +B
///     0.3      3  c                │              3  c
/// ```
pub fn render_split(diff: &FileDiff, selection: &SelectionSet, width: usize) -> String {
    let mut result = String::new();
    result.push_str(&diff.path);
    result.push_str(":\n");

    for (h, hunk) in diff.hunks.iter().enumerate() {
        if h > 0 {
            result.push('\n');
        }
        result.push_str(&format!("hunk {}  {}\n", h, hunk.header));

        let at = |index: Option<usize>| index.and_then(|l| Some((l, hunk.lines.get(l)?)));

        for (left, right) in align_positions(hunk) {
            let (left, right) = (at(left), at(right));
            let is_context = left.is_some_and(|(_, line)| !line.is_change());

            let left = left
                .map(|(l, line)| cell(line, Some(LineCoord::new(h, l)), line.old_lineno, selection))
                .unwrap_or_default();

            // the left cell already names a context line
            let right = right
                .map(|(l, line)| {
                    let coord = (!is_context).then(|| LineCoord::new(h, l));
                    cell(line, coord, line.new_lineno, selection)
                })
                .unwrap_or_default();

            let left: String = left.chars().take(width).collect();
            push_trimmed(&mut result, &format!("{:<width$} │ {}", left, right));
        }
    }

    result
}

fn cell(
    line: &DiffLine,
    coord: Option<LineCoord>,
    lineno_value: Option<u32>,
    selection: &SelectionSet,
) -> String {
    let (check, label) = match coord {
        Some(coord) => (mark(line, coord, selection), coord_label(coord)),
        None => ("   ", String::new()),
    };
    format!(
        "{} {:<6}{:>4} {}{}",
        check,
        label,
        lineno(lineno_value),
        line.origin.marker(),
        line.content
    )
}

fn mark(line: &DiffLine, coord: LineCoord, selection: &SelectionSet) -> &'static str {
    if !line.is_change() {
        "   "
    } else if selection.contains(coord) {
        "[x]"
    } else {
        "[ ]"
    }
}

fn coord_label(coord: LineCoord) -> String {
    format!("{}.{}", coord.hunk, coord.line)
}

fn lineno(value: Option<u32>) -> String {
    value.map(|n| n.to_string()).unwrap_or_default()
}

fn push_trimmed(result: &mut String, line: &str) {
    result.push_str(line.trim_end());
    result.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::DiffHunk;

    fn sample() -> FileDiff {
        FileDiff {
            path: "notes.txt".to_string(),
            hunks: vec![
                DiffHunk {
                    header: "@@ -1,3 +1,3 @@".to_string(),
                    lines: vec![
                        DiffLine::context(1, 1, "a"),
                        DiffLine::deletion(2, "b"),
                        DiffLine::addition(2, "B"),
                        DiffLine::context(3, 3, "c"),
                    ],
                },
                DiffHunk {
                    header: "@@ -20,2 +20,2 @@ fn tail()".to_string(),
                    lines: vec![
                        DiffLine::deletion(20, "old one"),
                        DiffLine::deletion(21, "old two"),
                        DiffLine::addition(20, "new one"),
                        DiffLine::addition(21, "new two"),
                        DiffLine::addition(22, "new three"),
                    ],
                },
            ],
        }
    }

    fn selection() -> SelectionSet {
        [LineCoord::new(0, 2), LineCoord::new(1, 1), LineCoord::new(1, 4)]
            .into_iter()
            .collect()
    }

    #[test]
    fn unified_view() {
        insta::assert_snapshot!(render_unified(&sample(), &selection()), @r"
        notes.txt:
        hunk 0  @@ -1,3 +1,3 @@
              0.0      1    1  a
          [ ] 0.1      2      -b
          [x] 0.2           2 +B
              0.3      3    3  c

        hunk 1  @@ -20,2 +20,2 @@ fn tail()
          [ ] 1.0     20      -old one
          [x] 1.1     21      -old two
          [ ] 1.2          20 +new one
          [ ] 1.3          21 +new two
          [x] 1.4          22 +new three
        ");
    }

    #[test]
    fn split_view() {
        insta::assert_snapshot!(render_split(&sample(), &selection(), 24), @r"
        notes.txt:
        hunk 0  @@ -1,3 +1,3 @@
            0.0      1  a        │              1  a
        [ ] 0.1      2 -b        │ [x] 0.2      2 +B
            0.3      3  c        │              3  c

        hunk 1  @@ -20,2 +20,2 @@ fn tail()
        [ ] 1.0     20 -old one  │ [ ] 1.2     20 +new one
        [x] 1.1     21 -old two  │ [ ] 1.3     21 +new two
                                 │ [x] 1.4     22 +new three
        ");
    }

    #[test]
    fn split_view_cuts_long_left_cells() {
        let diff = FileDiff {
            path: "long.txt".to_string(),
            hunks: vec![DiffHunk {
                header: "@@ -1 +1 @@".to_string(),
                lines: vec![
                    DiffLine::deletion(1, "a rather long line that will not fit"),
                    DiffLine::addition(1, "short"),
                ],
            }],
        };
        let rendered = render_split(&diff, &SelectionSet::new(), 20);
        assert_eq!(
            rendered.lines().nth(2),
            Some("[ ] 0.0      1 -a ra │ [ ] 0.1      1 +short")
        );
    }

    #[test]
    fn split_view_labels_identical_lines_by_position() {
        let diff = FileDiff {
            path: "dup.txt".to_string(),
            hunks: vec![DiffHunk {
                header: "@@ -1,2 +1 @@".to_string(),
                lines: vec![
                    DiffLine::deletion(1, "}"),
                    DiffLine::deletion(2, "}"),
                    DiffLine::addition(1, "}"),
                ],
            }],
        };
        let selection: SelectionSet = [LineCoord::new(0, 1)].into_iter().collect();
        insta::assert_snapshot!(render_split(&diff, &selection, 17), @r"
        dup.txt:
        hunk 0  @@ -1,2 +1 @@
        [ ] 0.0      1 -} │ [ ] 0.2      1 +}
        [x] 0.1      2 -} │
        ");
    }

    #[test]
    fn empty_diff_renders_path_only() {
        let diff = FileDiff {
            path: "empty.txt".to_string(),
            hunks: vec![],
        };
        assert_eq!(render_unified(&diff, &SelectionSet::new()), "empty.txt:\n");
        assert_eq!(render_split(&diff, &SelectionSet::new(), 40), "empty.txt:\n");
    }
}
