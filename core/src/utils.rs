//! Utility functions and types.

use std::fmt::{Debug, Display, Formatter};

/// Redact hides secrets in `Debug`/`Display` output.
///
/// - Empty input prints `EMPTY`.
/// - Input shorter than 12 bytes is hidden entirely.
/// - Longer input keeps its first and last three characters so different
///   redacted values can still be told apart.
#[derive(Clone, Copy)]
pub struct Redact<'a>(&'a str);

impl<'a> From<&'a str> for Redact<'a> {
    fn from(value: &'a str) -> Self {
        Redact(value)
    }
}

impl<'a> From<&'a String> for Redact<'a> {
    fn from(value: &'a String) -> Self {
        Redact(value.as_str())
    }
}

impl Display for Redact<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = self.0;
        if s.is_empty() {
            return f.write_str("EMPTY");
        }

        let chars: Vec<char> = s.chars().collect();
        if s.len() < 12 || chars.len() < 7 {
            return f.write_str("***");
        }

        let head: String = chars[..3].iter().collect();
        let tail: String = chars[chars.len() - 3..].iter().collect();
        write!(f, "{head}***{tail}")
    }
}

impl Debug for Redact<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}
