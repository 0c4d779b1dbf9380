use super::{DiffHunk, DiffLine, FileDiff};
use crate::header::{HeaderError, HunkRange};
use error_set::error_set;
use tracing::{debug, trace};

error_set! {
    /// Errors from reading `git diff` output into a [`FileDiff`]
    DiffError := {
        /// A file section has hunks but no `---`/`+++` path header
        #[display("Could not find file path in diff")]
        MissingPath,
        HeaderError(HeaderError),
    }
}

/// Parse multi-file `git diff` output.
///
/// Sections without any hunk (binary files, pure mode changes) are skipped,
/// and so are combined diffs (`diff --cc`) of unmerged files.
pub fn parse_diff(text: &str) -> Result<Vec<FileDiff>, DiffError> {
    let mut sections: Vec<Vec<&str>> = Vec::new();

    // split_terminator keeps the `\r` of CRLF content lines
    for line in text.split_terminator('\n') {
        if line.starts_with("diff ") {
            sections.push(vec![line]);
        } else if let Some(section) = sections.last_mut() {
            section.push(line);
        }
    }

    let mut files = Vec::with_capacity(sections.len());
    for section in sections {
        if !section[0].starts_with("diff --git ") {
            debug!(header = section[0], "skipping combined diff section");
            continue;
        }
        if !section.iter().any(|line| line.starts_with("@@ ")) {
            debug!(header = section[0], "skipping diff section without hunks");
            continue;
        }
        let parsed = parse_section(&section)?;
        let path = parsed.path.ok_or(DiffError::MissingPath)?;
        files.push(FileDiff {
            path,
            hunks: parsed.hunks,
        });
    }

    Ok(files)
}

/// Parse the diff of a single file.
///
/// The `---`/`+++` headers are optional; `path` is used when they are absent,
/// so bare hunk text (`@@ ... @@` followed by lines) is accepted too.
pub fn parse_file_diff(path: &str, text: &str) -> Result<FileDiff, DiffError> {
    let lines: Vec<&str> = text.split_terminator('\n').collect();
    let parsed = parse_section(&lines)?;

    Ok(FileDiff {
        path: parsed.path.unwrap_or_else(|| path.to_string()),
        hunks: parsed.hunks,
    })
}

struct Section {
    path: Option<String>,
    hunks: Vec<DiffHunk>,
}

/// Running line numbers of the hunk being read
struct Cursor {
    old: u32,
    new: u32,
}

fn parse_section(lines: &[&str]) -> Result<Section, DiffError> {
    let mut new_path = None;
    let mut old_path = None;
    let mut hunks: Vec<DiffHunk> = Vec::new();
    let mut cursor = None;

    for &line in lines {
        if line.starts_with("@@ ") {
            let range = HunkRange::parse(line)?;
            cursor = Some(Cursor {
                old: range.old_start,
                new: range.new_start,
            });
            hunks.push(DiffHunk {
                header: line.to_string(),
                lines: Vec::new(),
            });
            continue;
        }

        let (Some(pos), Some(hunk)) = (cursor.as_mut(), hunks.last_mut()) else {
            // File header area
            if let Some(path) = line.strip_prefix("+++ b/") {
                new_path = Some(strip_path(path));
            } else if let Some(path) = line.strip_prefix("--- a/") {
                old_path = Some(strip_path(path));
            }
            continue;
        };

        if line.starts_with('\\') {
            if let Some(last) = hunk.lines.last_mut() {
                last.missing_newline = true;
            }
        } else if let Some(content) = line.strip_prefix('+') {
            hunk.lines.push(DiffLine::addition(pos.new, content));
            pos.new += 1;
        } else if let Some(content) = line.strip_prefix('-') {
            hunk.lines.push(DiffLine::deletion(pos.old, content));
            pos.old += 1;
        } else if let Some(content) = line.strip_prefix(' ').or(line.is_empty().then_some("")) {
            hunk.lines.push(DiffLine::context(pos.old, pos.new, content));
            pos.old += 1;
            pos.new += 1;
        } else {
            trace!(line, "ignoring unexpected line inside hunk");
        }
    }

    Ok(Section {
        // `+++ /dev/null` for deleted files leaves only the old path
        path: new_path.or(old_path),
        hunks,
    })
}

fn strip_path(path: &str) -> String {
    path.trim_end_matches('\t').to_string()
}
