//! Reflector: turns echo entries for an input into salted digests.
//!
//! Each digest is SHA-256 over the decimal fingerprints concatenated with a
//! random four-digit salt, truncated to [`DIGEST_HEX_LEN`] hex characters.
//! The salt is drawn per digest, so reflecting the same echo entry twice
//! gives two different digests.

use std::path::Path;

use mirrorseed_core::{
    Digest, EchoEntry, InputId, LedgerLine, ReflectionEntry, Result, DIGEST_HEX_LEN,
};
use rand::Rng;
use sha2::{Digest as _, Sha256};
use tracing::debug;

use crate::config::MatchPolicy;
use crate::ledger::Ledger;

pub struct Reflector {
    echo: Ledger<EchoEntry>,
    reflection: Ledger<ReflectionEntry>,
    policy: MatchPolicy,
}

impl Reflector {
    pub fn new(echo_path: impl AsRef<Path>, reflection_path: impl AsRef<Path>, policy: MatchPolicy) -> Self {
        Self {
            echo: Ledger::new(echo_path),
            reflection: Ledger::new(reflection_path),
            policy,
        }
    }

    pub fn reflect(&self, input_id: &InputId) -> Result<Vec<ReflectionEntry>> {
        self.reflect_with_salt(input_id, random_salt)
    }

    /// Reflect every selected echo line, drawing one salt per line.
    pub fn reflect_with_salt(
        &self,
        input_id: &InputId,
        mut salt: impl FnMut() -> u16,
    ) -> Result<Vec<ReflectionEntry>> {
        let selected = self.select(input_id)?;
        let mut written = Vec::with_capacity(selected.len());

        for echo in selected {
            let entry = ReflectionEntry {
                input_id: input_id.to_string(),
                digest: digest_fingerprints(&echo.fingerprints, salt()),
            };
            self.reflection.append(&entry)?;
            written.push(entry);
        }

        debug!("reflect: {} digests for {}", written.len(), input_id);
        Ok(written)
    }

    /// Echo entries belonging to `input_id` under the configured policy.
    /// Lines without exactly one `|` are dropped.
    fn select(&self, input_id: &InputId) -> Result<Vec<EchoEntry>> {
        let lines = self.echo.read_lines()?;
        let selected = match self.policy {
            MatchPolicy::Substring => lines
                .iter()
                .filter(|line| line.contains(input_id.as_str()))
                .filter_map(|line| EchoEntry::parse_line(line))
                .collect(),
            MatchPolicy::Exact => lines
                .iter()
                .filter_map(|line| EchoEntry::parse_line(line))
                .filter(|entry| entry.input_id == input_id.as_str())
                .collect(),
        };
        Ok(selected)
    }
}

/// A uniformly random salt in `1000..=9999`.
pub fn random_salt() -> u16 {
    rand::thread_rng().gen_range(1000..=9999)
}

pub fn digest_fingerprints(fingerprints: &[u64], salt: u16) -> Digest {
    let mut material: String = fingerprints.iter().map(u64::to_string).collect();
    material.push_str(&salt.to_string());

    let mut hasher = Sha256::new();
    hasher.update(material.as_bytes());
    let hex = hex::encode(hasher.finalize());
    Digest::new(&hex[..DIGEST_HEX_LEN])
}
