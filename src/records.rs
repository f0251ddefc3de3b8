//! Delimited-text input: decoding and row parsing.

use std::fs;
use std::path::Path;

use mirrorseed_core::{Error, Record, Result};

/// Decode bytes as UTF-8, dropping invalid sequences instead of failing
/// or substituting replacement characters.
pub fn decode_lossy(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
    }
    out
}

/// Parse comma-delimited text into records. Rows may have differing
/// lengths; there is no header row.
pub fn parse_records(text: &str) -> Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| Error::csv(e.to_string()))?;
        records.push(row.iter().collect());
    }
    Ok(records)
}

pub fn read_records(path: &Path) -> Result<Vec<Record>> {
    let bytes = fs::read(path)?;
    parse_records(&decode_lossy(&bytes))
}

/// Serialize records as comma-delimited text with minimal quoting.
pub fn write_records(path: &Path, records: &[Record]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| Error::csv(e.to_string()))?;
    for record in records {
        writer
            .write_record(record.cells())
            .map_err(|e| Error::csv(e.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}
