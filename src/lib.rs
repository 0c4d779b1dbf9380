use error_set::error_set;
use std::io::Write;
use std::process::{Command, Stdio};
use tracing::{debug, info};

pub mod align;
pub mod diff;
pub mod header;
pub mod patch;
pub mod render;
pub mod selection;

pub use align::{AlignedRow, align, align_positions};
pub use diff::{DiffError, DiffHunk, DiffLine, FileDiff, Origin};
pub use header::{HeaderError, HunkRange};
pub use patch::{Patch, PatchError, synthesize};
pub use selection::{LineCoord, ParseError, SelectionSet};

error_set! {
    /// Top-level error for hunkwise operations
    GitStagerError := {
        #[display("No changes found in {file}")]
        NoChanges { file: String },
        #[display("Selection matches no added or removed line in {file}")]
        NothingSelected { file: String },
        ParseError(ParseError),
        DiffError(DiffError),
        PatchError(PatchError),
    } || GitCommandError

    /// Errors from git command execution
    GitCommandError := {
        #[display("Failed to run git {command}: {message}")]
        CommandFailed { command: String, message: String },
        #[display("git {command} failed: {stderr}")]
        CommandExitError { command: String, stderr: String },
        #[display("Invalid UTF-8 in git {command} output: {message}")]
        InvalidUtf8 { command: String, message: String },
        #[display("No stdin handle for git {command}")]
        StdinUnavailable { command: String },
        #[display("Failed to write to git {command}: {message}")]
        WriteFailed { command: String, message: String },
    }
}

/// Fetches working tree diffs and stages line selections through `git`.
pub struct GitStager<'a> {
    repo_path: &'a str,
}

impl<'a> GitStager<'a> {
    /// Create a new GitStager for the given repository path
    pub fn new(repo_path: &'a str) -> Self {
        Self { repo_path }
    }

    /// Stage the lines named by a `file:refs` argument
    ///
    /// # Examples
    /// ```no_run
    /// # use hunkwise::GitStager;
    /// let stager = GitStager::new(".");
    /// stager.stage("src/lib.rs:0").unwrap(); // all of hunk 0
    /// stager.stage("src/lib.rs:1.3,1.5..7").unwrap(); // some lines of hunk 1
    /// ```
    pub fn stage(&self, file_ref: &str) -> Result<(), GitStagerError> {
        let refs = selection::parse_selection_refs(file_ref)?;
        let diff = self.file_diff(&refs.file)?;
        self.stage_selection(&diff, &refs.resolve(&diff))
    }

    /// Build the patch a `file:refs` argument would stage, without applying it
    pub fn patch(&self, file_ref: &str) -> Result<String, GitStagerError> {
        let refs = selection::parse_selection_refs(file_ref)?;
        let diff = self.file_diff(&refs.file)?;
        let patch = patch::synthesize(&diff, &refs.resolve(&diff))?;

        if patch.is_empty() {
            return Err(GitStagerError::NothingSelected { file: diff.path });
        }

        Ok(patch.to_string())
    }

    /// Stage `selection` of `diff` into the index.
    ///
    /// A selection that keeps no hunk is reported as
    /// [`GitStagerError::NothingSelected`] instead of applying an empty patch.
    /// Either way the caller should fetch a fresh diff and drop the selection
    /// afterwards, since its coordinates only hold for `diff`.
    pub fn stage_selection(
        &self,
        diff: &FileDiff,
        selection: &SelectionSet,
    ) -> Result<(), GitStagerError> {
        let patch = patch::synthesize(diff, selection)?;

        if patch.is_empty() {
            return Err(GitStagerError::NothingSelected {
                file: diff.path.clone(),
            });
        }

        self.apply_patch(&patch.to_string())?;
        info!(path = %diff.path, hunks = patch.hunks.len(), "staged selection");
        Ok(())
    }

    /// Unstaged changes of one file.
    ///
    /// Untracked files are diffed against `/dev/null`, so all of their lines
    /// show up as additions of a new file.
    pub fn file_diff(&self, file: &str) -> Result<FileDiff, GitStagerError> {
        let diff = if self.is_untracked(file)? {
            self.untracked_diff(file)?
        } else {
            let text = self.git(&["diff", "--no-ext-diff", "--no-color", "--", file], &[0])?;
            diff::parse_file_diff(file, &text)?
        };

        if diff.hunks.is_empty() {
            return Err(GitStagerError::NoChanges {
                file: file.to_string(),
            });
        }

        Ok(diff)
    }

    /// Unstaged changes of the given files (or every changed file if empty),
    /// untracked files included.
    pub fn diffs(&self, files: &[String]) -> Result<Vec<FileDiff>, GitStagerError> {
        let mut args = vec!["diff", "--no-ext-diff", "--no-color", "--"];
        args.extend(files.iter().map(String::as_str));
        let mut diffs = diff::parse_diff(&self.git(&args, &[0])?)?;

        for file in self.untracked(files)? {
            let diff = self.untracked_diff(&file)?;
            // empty files have nothing to stage line by line
            if !diff.hunks.is_empty() {
                diffs.push(diff);
            }
        }

        Ok(diffs)
    }

    fn untracked_diff(&self, file: &str) -> Result<FileDiff, GitStagerError> {
        // --no-index exits with 1 when the files differ
        let text = self.git(
            &[
                "diff",
                "--no-index",
                "--no-ext-diff",
                "--no-color",
                "--",
                "/dev/null",
                file,
            ],
            &[0, 1],
        )?;
        Ok(diff::parse_file_diff(file, &text)?)
    }

    fn is_untracked(&self, file: &str) -> Result<bool, GitCommandError> {
        Ok(!self.untracked(&[file.to_string()])?.is_empty())
    }

    fn untracked(&self, files: &[String]) -> Result<Vec<String>, GitCommandError> {
        let mut args = vec!["ls-files", "--others", "--exclude-standard", "--"];
        args.extend(files.iter().map(String::as_str));

        Ok(self
            .git(&args, &[0])?
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Run a git subcommand in the repository and return its stdout.
    /// `ok_codes` lists the exit codes that count as success.
    fn git(&self, args: &[&str], ok_codes: &[i32]) -> Result<String, GitCommandError> {
        self.git_with_input(args, None, ok_codes)
    }

    /// Stage a patch by feeding it to `git apply --cached` on stdin.
    fn apply_patch(&self, patch: &str) -> Result<(), GitCommandError> {
        debug!(repo = self.repo_path, %patch, "applying patch to index");
        self.git_with_input(
            &["apply", "--cached", "--unidiff-zero", "-"],
            Some(patch),
            &[0],
        )?;
        Ok(())
    }

    fn git_with_input(
        &self,
        args: &[&str],
        input: Option<&str>,
        ok_codes: &[i32],
    ) -> Result<String, GitCommandError> {
        let command = args.first().copied().unwrap_or_default().to_string();
        debug!(repo = self.repo_path, ?args, "running git");

        let mut child = Command::new("git")
            .arg("-C")
            .arg(self.repo_path)
            .args(args)
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| GitCommandError::CommandFailed {
                command: command.clone(),
                message: e.to_string(),
            })?;

        if let Some(input) = input {
            // stdin is dropped at the end of this block so git sees EOF
            child
                .stdin
                .take()
                .ok_or_else(|| GitCommandError::StdinUnavailable {
                    command: command.clone(),
                })?
                .write_all(input.as_bytes())
                .map_err(|e| GitCommandError::WriteFailed {
                    command: command.clone(),
                    message: e.to_string(),
                })?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| GitCommandError::CommandFailed {
                command: command.clone(),
                message: e.to_string(),
            })?;

        if !output.status.code().is_some_and(|code| ok_codes.contains(&code)) {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GitCommandError::CommandExitError {
                command,
                stderr: stderr.into_owned(),
            });
        }

        String::from_utf8(output.stdout).map_err(|e| GitCommandError::InvalidUtf8 {
            command,
            message: e.to_string(),
        })
    }
}
