//! Line formats of the on-disk ledgers.
//!
//! Every ledger is UTF-8 text, one entry per line, append-only:
//!
//! ```text
//! echo         <input_id> | [<int>, <int>, ...]
//! reflection   <input_id> :: <digest>
//! recursion    RECURSION DETECTED: <digest>
//! pulse        ::<COMMAND>:: <free text>
//! fingerprint  <output_path> | <sha256>
//! ```
//!
//! Parsing is lenient in the same places the writers are strict: a line
//! that does not fit its format yields `None` and is skipped by readers.

use crate::types::{Command, Digest, Fingerprint};

const ECHO_SEPARATOR: char = '|';
const REFLECTION_SEPARATOR: &str = " :: ";
const RECURSION_PREFIX: &str = "RECURSION DETECTED: ";

/// An entry type that can be stored as a single ledger line.
pub trait LedgerLine: Sized {
    /// Render without the trailing newline.
    fn to_line(&self) -> String;

    /// Parse one line (no trailing newline). `None` means malformed.
    fn parse_line(line: &str) -> Option<Self>;
}

// ============================================================
// Echo ledger
// ============================================================

/// Fingerprints of the marker-bearing records of one input, from one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EchoEntry {
    pub input_id: String,
    /// Decoded values. Written entries hold fingerprints; entries read back
    /// hold whatever non-negative integers survived decoding.
    pub fingerprints: Vec<u64>,
}

impl EchoEntry {
    pub fn new(input_id: impl Into<String>, fingerprints: &[Fingerprint]) -> Self {
        Self {
            input_id: input_id.into(),
            fingerprints: fingerprints.iter().map(|f| f.value()).collect(),
        }
    }
}

impl LedgerLine for EchoEntry {
    fn to_line(&self) -> String {
        let values: Vec<String> = self.fingerprints.iter().map(u64::to_string).collect();
        format!("{} {} [{}]", self.input_id, ECHO_SEPARATOR, values.join(", "))
    }

    fn parse_line(line: &str) -> Option<Self> {
        let parts: Vec<&str> = line.split(ECHO_SEPARATOR).collect();
        if parts.len() != 2 {
            return None;
        }
        Some(Self {
            input_id: parts[0].trim().to_string(),
            fingerprints: decode_fingerprint_list(parts[1]),
        })
    }
}

/// Strip brackets and whitespace, split on commas, keep the tokens that are
/// non-negative integers. Anything else is dropped without error.
pub fn decode_fingerprint_list(text: &str) -> Vec<u64> {
    let inner = text
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .trim();
    inner
        .split(',')
        .map(str::trim)
        .filter(|tok| !tok.is_empty() && tok.bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|tok| tok.parse::<u64>().ok())
        .collect()
}

// ============================================================
// Reflection ledger
// ============================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReflectionEntry {
    pub input_id: String,
    pub digest: Digest,
}

impl LedgerLine for ReflectionEntry {
    fn to_line(&self) -> String {
        format!("{}{}{}", self.input_id, REFLECTION_SEPARATOR, self.digest)
    }

    /// The digest never contains the separator, so the last one splits;
    /// input ids may contain it.
    fn parse_line(line: &str) -> Option<Self> {
        let (input_id, digest) = line.rsplit_once(REFLECTION_SEPARATOR)?;
        let digest = digest.trim();
        if digest.is_empty() || digest.contains(char::is_whitespace) {
            return None;
        }
        Some(Self {
            input_id: input_id.trim().to_string(),
            digest: Digest::new(digest),
        })
    }
}

// ============================================================
// Recursion ledger
// ============================================================

/// Human-readable audit line for a digest in the activation set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecursionEntry {
    pub digest: Digest,
}

impl LedgerLine for RecursionEntry {
    fn to_line(&self) -> String {
        format!("{}{}", RECURSION_PREFIX, self.digest)
    }

    fn parse_line(line: &str) -> Option<Self> {
        let digest = line.strip_prefix(RECURSION_PREFIX)?.trim();
        if digest.is_empty() {
            return None;
        }
        Some(Self {
            digest: Digest::new(digest),
        })
    }
}

// ============================================================
// Pulse ledger
// ============================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PulseEntry {
    pub command: Command,
}

impl LedgerLine for PulseEntry {
    fn to_line(&self) -> String {
        self.command.status_line().to_string()
    }

    fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim();
        Command::ALL
            .into_iter()
            .find(|c| c.status_line() == line)
            .map(|command| Self { command })
    }
}

// ============================================================
// Fingerprint log (cleaner output hashes)
// ============================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FingerprintLogEntry {
    pub path: String,
    /// Full lowercase hex SHA-256 of the cleaned output.
    pub sha256: String,
}

impl LedgerLine for FingerprintLogEntry {
    fn to_line(&self) -> String {
        format!("{} | {}", self.path, self.sha256)
    }

    fn parse_line(line: &str) -> Option<Self> {
        let (path, hash) = line.rsplit_once(" | ")?;
        let hash = hash.trim();
        if hash.len() != 64 || !hash.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        Some(Self {
            path: path.to_string(),
            sha256: hash.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_line_matches_fixed_format() {
        let entry = EchoEntry {
            input_id: "x__ECHO__.csv".into(),
            fingerprints: vec![3, 7],
        };
        assert_eq!(entry.to_line(), "x__ECHO__.csv | [3, 7]");
    }

    #[test]
    fn echo_line_requires_exactly_two_parts() {
        assert!(EchoEntry::parse_line("a | [1] | extra").is_none());
        assert!(EchoEntry::parse_line("no separator here").is_none());
    }

    #[test]
    fn decode_drops_non_numeric_tokens() {
        assert_eq!(decode_fingerprint_list(" [3, x, -4, 7 , 2.5] "), vec![3, 7]);
        assert!(decode_fingerprint_list("[]").is_empty());
    }

    #[test]
    fn reflection_line_parses() {
        let e = ReflectionEntry::parse_line("in.csv :: abcd").unwrap();
        assert_eq!(e.input_id, "in.csv");
        assert_eq!(e.digest.as_str(), "abcd");
        assert!(ReflectionEntry::parse_line("in.csv :: ").is_none());
    }

    #[test]
    fn reflection_line_with_separator_in_input_id() {
        let entry = ReflectionEntry {
            input_id: "in/a :: b__ECHO__.csv".into(),
            digest: Digest::new("0123456789abcdef0123456789abcdef"),
        };
        let line = entry.to_line();
        assert_eq!(line, "in/a :: b__ECHO__.csv :: 0123456789abcdef0123456789abcdef");
        assert_eq!(ReflectionEntry::parse_line(&line), Some(entry));
    }

    #[test]
    fn pulse_line_only_accepts_known_status() {
        assert_eq!(
            PulseEntry::parse_line("::PING:: Mirror is aware").map(|p| p.command),
            Some(Command::Ping)
        );
        assert!(PulseEntry::parse_line("::LAUNCH:: go").is_none());
    }
}
