//! Fixture file loading.
//!
//! A fixture file holds one case per line:
//!
//! ```text
//! # comments and blank lines are skipped
//! 123|||cardinal
//! 123|||cardinal|||one hundred twenty three
//! ```
//!
//! The line is split on the first `|||`; the left part is the input. The rest
//! is split again on its first `|||` into category and optional expected
//! output. There is no escaping, so an input can never contain `|||`.
//!
//! Every field is trimmed, so leading or trailing whitespace can't be part
//! of an input or an expected output. Inner whitespace is kept.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::{HarnessError, LineError, MalformedFixture, MalformedReason};
use crate::types::FixtureCase;

/// Field delimiter.
pub const DELIMITER: &str = "|||";

const BOM: char = '\u{feff}';

/// Parse a single fixture line.
///
/// Returns `Ok(None)` for blank and comment lines.
///
/// # Examples
///
/// ```
/// use normcheck_core::fixture::parse_line;
///
/// let case = parse_line("₹100|||money|||நூறு ரூபாய்", 4).unwrap().unwrap();
/// assert_eq!(case.input, "₹100");
/// assert_eq!(case.category, "money");
/// assert_eq!(case.expected.as_deref(), Some("நூறு ரூபாய்"));
/// assert_eq!(case.line, 4);
///
/// assert!(parse_line("   ", 5).unwrap().is_none());
/// assert!(parse_line("no delimiter", 6).is_err());
/// ```
pub fn parse_line(line: &str, line_no: usize) -> Result<Option<FixtureCase>, MalformedReason> {
    let line = line.trim_end_matches(['\n', '\r']);
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let (input, rest) = line
        .split_once(DELIMITER)
        .ok_or(MalformedReason::MissingDelimiter)?;
    let (category, expected) = match rest.split_once(DELIMITER) {
        Some((category, expected)) => (category, Some(expected)),
        None => (rest, None),
    };

    let input = input.trim();
    if input.is_empty() {
        return Err(MalformedReason::EmptyInput);
    }
    let category = category.trim();
    if category.is_empty() {
        return Err(MalformedReason::EmptyCategory);
    }
    let expected = match expected.map(str::trim) {
        Some("") => return Err(MalformedReason::EmptyExpected),
        other => other,
    };

    Ok(Some(FixtureCase {
        input: input.to_string(),
        category: category.to_string(),
        expected: expected.map(str::to_string),
        line: line_no,
    }))
}

impl FixtureCase {
    /// Serialize back into fixture-line form.
    ///
    /// For canonical lines (no padding around fields) this reproduces the
    /// line that was parsed.
    #[must_use]
    pub fn to_line(&self) -> String {
        match &self.expected {
            Some(expected) => format!(
                "{}{DELIMITER}{}{DELIMITER}{}",
                self.input, self.category, expected
            ),
            None => format!("{}{DELIMITER}{}", self.input, self.category),
        }
    }
}

/// A resolved fixture file for one language.
///
/// Cheap to clone; nothing is read until [`FixtureFile::cases`] is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureFile {
    lang: String,
    path: PathBuf,
}

impl FixtureFile {
    pub fn new(lang: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            lang: lang.into(),
            path: path.into(),
        }
    }

    #[must_use]
    pub fn lang(&self) -> &str {
        &self.lang
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the file and return a lazy sequence of its cases.
    ///
    /// Every call re-opens the file, so a run can be repeated. The file is
    /// closed when the returned iterator is dropped.
    pub fn cases(&self) -> Result<FixtureLines, HarnessError> {
        let file = File::open(&self.path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                HarnessError::FixtureFileNotFound {
                    lang: self.lang.clone(),
                    path: self.path.clone(),
                    available: Vec::new(),
                }
            } else {
                HarnessError::Io {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;
        tracing::debug!(lang = %self.lang, path = %self.path.display(), "Opened fixture file");

        Ok(FixtureLines {
            path: self.path.clone(),
            reader: BufReader::new(file),
            buf: Vec::new(),
            line: 0,
            done: false,
        })
    }
}

/// Iterator over the cases of an open fixture file.
///
/// Malformed lines are yielded as [`LineError::Malformed`] and reading
/// continues. A read error is yielded once as [`LineError::Harness`] and
/// ends the sequence.
#[derive(Debug)]
pub struct FixtureLines {
    path: PathBuf,
    reader: BufReader<File>,
    buf: Vec<u8>,
    line: usize,
    done: bool,
}

impl FixtureLines {
    fn malformed(&self, reason: MalformedReason) -> LineError {
        LineError::Malformed(MalformedFixture {
            path: self.path.clone(),
            line: self.line,
            reason,
        })
    }
}

impl Iterator for FixtureLines {
    type Item = Result<FixtureCase, LineError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                return None;
            }

            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => {
                    self.done = true;
                    return None;
                }
                Ok(_) => {}
                Err(source) => {
                    self.done = true;
                    return Some(Err(LineError::Harness(HarnessError::Io {
                        path: self.path.clone(),
                        source,
                    })));
                }
            }
            self.line += 1;

            // Strict decode; never replace invalid bytes.
            let Ok(text) = std::str::from_utf8(&self.buf) else {
                return Some(Err(self.malformed(MalformedReason::InvalidUtf8)));
            };
            let text = if self.line == 1 {
                text.strip_prefix(BOM).unwrap_or(text)
            } else {
                text
            };

            match parse_line(text, self.line) {
                Ok(Some(case)) => return Some(Ok(case)),
                Ok(None) => continue,
                Err(reason) => return Some(Err(self.malformed(reason))),
            }
        }
    }
}
