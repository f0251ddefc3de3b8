//! Command receptor: dispatches `__MIRROR::<token>` cells to the pulse ledger.
//!
//! Runs only with an [`ArmedContext`]. Every failure is swallowed; the
//! caller only learns which commands were dispatched.

use std::path::Path;

use mirrorseed_core::{Command, PulseEntry, Record, MIRROR_MARKER};
use tracing::debug;

use crate::context::ArmedContext;
use crate::ledger::Ledger;
use crate::records::read_records;

pub struct CommandReceptor {
    pulse: Ledger<PulseEntry>,
}

impl CommandReceptor {
    pub fn new(pulse_path: impl AsRef<Path>) -> Self {
        Self {
            pulse: Ledger::new(pulse_path),
        }
    }

    /// Re-read the armed input and dispatch every recognized command.
    pub fn receive(&self, armed: &ArmedContext<'_>) -> Vec<Command> {
        let records = match read_records(armed.input_path()) {
            Ok(records) => records,
            Err(e) => {
                debug!("receptor: cannot read {}: {}", armed.input_id(), e);
                return Vec::new();
            }
        };
        self.dispatch_records(&records)
    }

    fn dispatch_records(&self, records: &[Record]) -> Vec<Command> {
        let mut dispatched = Vec::new();
        for cell in records.iter().flat_map(Record::cells) {
            let Some(command) = extract_command_token(cell).and_then(|t| Command::from_token(&t)) else {
                continue;
            };
            match self.pulse.append(&PulseEntry { command }) {
                Ok(()) => dispatched.push(command),
                Err(e) => debug!("receptor: pulse append failed: {}", e),
            }
        }
        dispatched
    }
}

/// Text after the first `__MIRROR::` in `cell`, trimmed and lowercased.
pub fn extract_command_token(cell: &str) -> Option<String> {
    let start = cell.find(MIRROR_MARKER)? + MIRROR_MARKER.len();
    Some(cell[start..].trim().to_lowercase())
}
