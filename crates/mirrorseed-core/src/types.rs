//! Core types for Mirrorseed

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

/// Filename marker that arms the echo stages and the command gate.
pub const ECHO_MARKER: &str = "__ECHO__";
/// Cell marker that embeds a command token.
pub const MIRROR_MARKER: &str = "__MIRROR::";
/// Prime bounding every fingerprint to `[0, FINGERPRINT_MODULUS)`.
pub const FINGERPRINT_MODULUS: u64 = 7919;
/// Number of hex characters kept from the SHA-256 of a fingerprint list.
pub const DIGEST_HEX_LEN: usize = 32;

/// One row of a delimited-text input.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Record(Vec<String>);

impl Record {
    pub fn new(cells: Vec<String>) -> Self {
        Self(cells)
    }

    pub fn cells(&self) -> &[String] {
        &self.0
    }

    /// True when any cell contains `needle` as a substring.
    pub fn contains(&self, needle: &str) -> bool {
        self.0.iter().any(|cell| cell.contains(needle))
    }
}

impl<S: Into<String>> FromIterator<S> for Record {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Bounded signature of a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Reduces `raw` into `[0, FINGERPRINT_MODULUS)`.
    pub fn reduce(raw: u64) -> Self {
        Self(raw % FINGERPRINT_MODULUS)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an input resource: the path exactly as it was given.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct InputId(Arc<str>);

impl InputId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(Arc::from(s.into()))
    }

    pub fn from_path(path: &Path) -> Self {
        Self::new(path.display().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the file name component carries [`ECHO_MARKER`].
    pub fn is_marked(&self) -> bool {
        Path::new(self.as_str())
            .file_name()
            .is_some_and(|name| name.to_string_lossy().contains(ECHO_MARKER))
    }
}

impl std::fmt::Display for InputId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for InputId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for InputId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Truncated hex digest of a salted fingerprint list.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct Digest(String);

impl Digest {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Digests seen two or more times across the reflection ledger.
/// Derived fresh on every run and never persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActivationSet(BTreeSet<Digest>);

impl ActivationSet {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, digest: &Digest) -> bool {
        self.0.contains(digest)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Digest> {
        self.0.iter()
    }
}

impl FromIterator<Digest> for ActivationSet {
    fn from_iter<I: IntoIterator<Item = Digest>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Control command recognized inside a `__MIRROR::` cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    Pulse,
    Sleep,
    Ping,
}

impl Command {
    /// Case-insensitive exact match on the trimmed token.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "pulse" => Some(Self::Pulse),
            "sleep" => Some(Self::Sleep),
            "ping" => Some(Self::Ping),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Pulse => "pulse",
            Self::Sleep => "sleep",
            Self::Ping => "ping",
        }
    }

    /// Line appended to the pulse ledger when this command is dispatched.
    pub fn status_line(self) -> &'static str {
        match self {
            Self::Pulse => "::PULSE:: Detected | Reflection loop alive",
            Self::Sleep => "::SLEEP:: Command received | Mirror going passive",
            Self::Ping => "::PING:: Mirror is aware",
        }
    }

    pub const ALL: [Command; 3] = [Command::Pulse, Command::Sleep, Command::Ping];
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
