//! Echo listener: fingerprints marker-bearing records into the echo ledger.

use std::path::Path;

use mirrorseed_core::{EchoEntry, Fingerprint, InputId, Record, Result, ECHO_MARKER};
use tracing::debug;

use crate::fingerprint::fingerprint;
use crate::ledger::Ledger;

pub struct EchoListener {
    ledger: Ledger<EchoEntry>,
}

impl EchoListener {
    pub fn new(ledger_path: impl AsRef<Path>) -> Self {
        Self {
            ledger: Ledger::new(ledger_path),
        }
    }

    /// Append one entry holding the fingerprint of every record that has a
    /// cell containing `__ECHO__`. Writes nothing when no record matches.
    ///
    /// Whether the input should be scanned at all is decided by the caller.
    pub fn process(&self, input_id: &InputId, records: &[Record]) -> Result<Option<EchoEntry>> {
        let fingerprints: Vec<Fingerprint> = records
            .iter()
            .filter(|r| r.contains(ECHO_MARKER))
            .map(fingerprint)
            .collect();

        if fingerprints.is_empty() {
            debug!("echo: no marked records in {}", input_id);
            return Ok(None);
        }

        let entry = EchoEntry::new(input_id.as_str(), &fingerprints);
        self.ledger.append(&entry)?;
        debug!("echo: {} fingerprints for {}", fingerprints.len(), input_id);
        Ok(Some(entry))
    }
}
