//! Record cleaner: trims every cell and rewrites the file, then logs the
//! SHA-256 of the cleaned output.

use std::fs;
use std::path::Path;

use mirrorseed_core::{FingerprintLogEntry, Record, Result};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::ledger::Ledger;
use crate::records::{read_records, write_records};

pub fn clean_record(record: &Record) -> Record {
    record.cells().iter().map(|cell| cell.trim()).collect()
}

/// Clean `input` into `output` and append `"<output> | <sha256>"` to the
/// fingerprint log.
pub fn clean(input: &Path, output: &Path, fingerprint_log: &Path) -> Result<FingerprintLogEntry> {
    let cleaned: Vec<Record> = read_records(input)?.iter().map(clean_record).collect();
    write_records(output, &cleaned)?;

    let entry = FingerprintLogEntry {
        path: output.display().to_string(),
        sha256: sha256_file(output)?,
    };
    Ledger::new(fingerprint_log).append(&entry)?;

    info!("cleaned {} rows into {} ({})", cleaned.len(), entry.path, entry.sha256);
    Ok(entry)
}

fn sha256_file(path: &Path) -> Result<String> {
    let data = fs::read(path)?;
    Ok(hex::encode(Sha256::digest(&data)))
}
