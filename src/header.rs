//! The `@@ -A[,B] +C[,D] @@` hunk header grammar.
//!
//! A missing length means a length of one. Anything after the closing `@@`
//! (git's function-context heading) is accepted and ignored.

use error_set::error_set;
use nom::{
    IResult, Parser,
    bytes::complete::tag,
    character::complete::{char, u32 as number},
    combinator::{map, opt},
    sequence::preceded,
};
use std::fmt;

error_set! {
    /// Errors from parsing a hunk header
    HeaderError := {
        /// Header does not follow the `@@ -A[,B] +C[,D] @@` grammar
        #[display("Invalid hunk header '{header}'")]
        InvalidHeader { header: String },
    }
}

/// Start lines and lengths on both sides of a hunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HunkRange {
    pub old_start: u32,
    pub old_len: u32,
    pub new_start: u32,
    pub new_len: u32,
}

impl HunkRange {
    /// Parse a hunk header line.
    ///
    /// ```
    /// use hunkwise::header::HunkRange;
    ///
    /// let range = HunkRange::parse("@@ -10,3 +10,4 @@ fn main() {").unwrap();
    /// assert_eq!((range.old_start, range.old_len), (10, 3));
    /// assert_eq!((range.new_start, range.new_len), (10, 4));
    /// ```
    pub fn parse(header: &str) -> Result<Self, HeaderError> {
        hunk_range(header)
            .map(|(_, range)| range)
            .map_err(|_| HeaderError::InvalidHeader {
                header: header.to_string(),
            })
    }
}

impl fmt::Display for HunkRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "@@ {} {} @@",
            Side('-', self.old_start, self.old_len),
            Side('+', self.new_start, self.new_len)
        )
    }
}

/// One `-A,B` or `+C,D` token. The `,len` part is dropped when the length is 1.
struct Side(char, u32, u32);

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Side(marker, start, len) = *self;
        match len {
            1 => write!(f, "{marker}{start}"),
            n => write!(f, "{marker}{start},{n}"),
        }
    }
}

fn hunk_range(input: &str) -> IResult<&str, HunkRange> {
    map(
        (tag("@@ -"), range, tag(" +"), range, tag(" @@")),
        |(_, (old_start, old_len), _, (new_start, new_len), _)| HunkRange {
            old_start,
            old_len,
            new_start,
            new_len,
        },
    )
    .parse(input)
}

/// `start[,len]`
fn range(input: &str) -> IResult<&str, (u32, u32)> {
    map((number, opt(preceded(char(','), number))), |(start, len)| {
        (start, len.unwrap_or(1))
    })
    .parse(input)
}
