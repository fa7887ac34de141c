//! EP-003: Version resolution from a script's `__version__` line.
//!
//! Scans the script top-to-bottom and takes the first line that starts with
//! the marker at column zero. The scan stops at that line; nothing after it
//! is read. The matched line must be a plain assignment of a single quoted
//! string literal — no evaluation of script content ever happens here.

use std::fmt;
use std::io::BufRead;
use std::path::Path;

/// Literal marker a version declaration line must start with, at column zero.
pub const VERSION_MARKER: &str = "__version__";

/// Why version resolution failed. All variants abort the packaging run.
#[derive(Debug)]
pub enum VersionError {
    /// The script could not be opened or read.
    Io(String),
    /// No line starts with the marker.
    MissingMarker(String),
    /// A marker line was found but is not a quoted-string assignment.
    Malformed(String),
}

impl fmt::Display for VersionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionError::Io(msg) => write!(f, "{}", msg),
            VersionError::MissingMarker(path) => {
                write!(f, "no {} line in {}", VERSION_MARKER, path)
            }
            VersionError::Malformed(msg) => {
                write!(f, "malformed {} line: {}", VERSION_MARKER, msg)
            }
        }
    }
}

impl std::error::Error for VersionError {}

/// Resolve the version string declared in a script file.
///
/// First match wins: later marker lines are never inspected, even if the
/// first one turns out to be malformed.
pub fn resolve_version(path: &Path) -> Result<String, VersionError> {
    let file = std::fs::File::open(path)
        .map_err(|e| VersionError::Io(format!("cannot open {}: {}", path.display(), e)))?;
    let mut reader = std::io::BufReader::new(file);
    let mut line = String::new();

    loop {
        line.clear();
        let n = reader
            .read_line(&mut line)
            .map_err(|e| VersionError::Io(format!("read error {}: {}", path.display(), e)))?;
        if n == 0 {
            return Err(VersionError::MissingMarker(path.display().to_string()));
        }
        if line.starts_with(VERSION_MARKER) {
            let trimmed = line.trim_end_matches(['\n', '\r']);
            return parse_version_line(trimmed)
                .map_err(|detail| VersionError::Malformed(format!("{}: {}", path.display(), detail)));
        }
    }
}

/// Parse a marker line of the form `__version__ = "<value>"`.
///
/// Accepts single or double quotes and an optional trailing `#` comment.
/// Any other right-hand side (unquoted, multi-token, unterminated) is
/// rejected. The value is returned verbatim — no trimming, no normalization.
pub fn parse_version_line(line: &str) -> Result<String, String> {
    let rest = line
        .strip_prefix(VERSION_MARKER)
        .ok_or_else(|| format!("line does not start with {}", VERSION_MARKER))?;

    let rest = rest.trim_start();
    let rest = rest
        .strip_prefix('=')
        .ok_or_else(|| "expected '=' after marker".to_string())?;
    let rest = rest.trim_start();

    let quote = match rest.chars().next() {
        Some(c @ ('"' | '\'')) => c,
        Some(_) => return Err("right-hand side is not a quoted string literal".to_string()),
        None => return Err("missing right-hand side".to_string()),
    };

    let body = &rest[1..];
    let end = body
        .find(quote)
        .ok_or_else(|| "unterminated string literal".to_string())?;
    let value = &body[..end];

    let trailing = body[end + 1..].trim_start();
    if !trailing.is_empty() && !trailing.starts_with('#') {
        return Err(format!("unexpected trailing content: {:?}", trailing));
    }

    Ok(value.to_string())
}
