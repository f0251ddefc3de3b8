//! Append-only ledgers: the only state shared between stages and runs.
//!
//! A ledger is one line-oriented file. Writers append a single line under
//! an exclusive advisory lock so concurrent runs never interleave partial
//! lines; readers scan the whole file. Nothing is ever rewritten.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use mirrorseed_core::{Error, LedgerLine, Result};
use tracing::{debug, trace};

use crate::records::decode_lossy;

pub struct Ledger<E> {
    path: PathBuf,
    _entry: PhantomData<fn() -> E>,
}

impl<E: LedgerLine> Ledger<E> {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            _entry: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry as a single `\n`-terminated line.
    pub fn append(&self, entry: &E) -> Result<()> {
        let mut line = entry.to_line();
        line.push('\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.lock_exclusive()
            .map_err(|e| Error::ledger(self.path.display().to_string(), format!("lock: {e}")))?;
        let written = file.write_all(line.as_bytes()).and_then(|_| file.flush());
        if let Err(e) = FileExt::unlock(&file) {
            // Closing the handle below releases the lock regardless.
            debug!("ledger {}: unlock failed: {}", self.path.display(), e);
        }
        written?;

        trace!("ledger {}: appended {} bytes", self.path.display(), line.len());
        Ok(())
    }

    /// Every line in the ledger. A missing file is an empty ledger.
    pub fn read_lines(&self) -> Result<Vec<String>> {
        let bytes = match fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(decode_lossy(&bytes).lines().map(str::to_string).collect())
    }

    /// Every line that parses as `E`, in file order. Malformed lines are skipped.
    pub fn entries(&self) -> Result<Vec<E>> {
        Ok(self
            .read_lines()?
            .iter()
            .filter_map(|line| E::parse_line(line))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirrorseed_core::{Command, PulseEntry, RecursionEntry, Digest};
    use tempfile::TempDir;

    #[test]
    fn missing_ledger_reads_empty() {
        let dir = TempDir::new().unwrap();
        let ledger: Ledger<PulseEntry> = Ledger::new(dir.path().join("absent.log"));
        assert!(ledger.read_lines().unwrap().is_empty());
        assert!(ledger.entries().unwrap().is_empty());
    }

    #[test]
    fn append_preserves_order_and_history() {
        let dir = TempDir::new().unwrap();
        let ledger = Ledger::new(dir.path().join("pulse.log"));
        ledger.append(&PulseEntry { command: Command::Ping }).unwrap();
        ledger.append(&PulseEntry { command: Command::Sleep }).unwrap();

        let lines = ledger.read_lines().unwrap();
        assert_eq!(
            lines,
            vec![
                "::PING:: Mirror is aware".to_string(),
                "::SLEEP:: Command received | Mirror going passive".to_string(),
            ]
        );
    }

    #[test]
    fn append_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let ledger = Ledger::new(dir.path().join("nested/deeper/recursion.log"));
        ledger
            .append(&RecursionEntry { digest: Digest::new("abc") })
            .unwrap();
        assert_eq!(ledger.entries().unwrap().len(), 1);
    }

    #[test]
    fn lock_is_released_after_append() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pulse.log");
        let ledger = Ledger::new(&path);
        ledger.append(&PulseEntry { command: Command::Pulse }).unwrap();

        let other = OpenOptions::new().append(true).open(&path).unwrap();
        assert!(other.try_lock_exclusive().is_ok());
        FileExt::unlock(&other).unwrap();

        ledger.append(&PulseEntry { command: Command::Ping }).unwrap();
        assert_eq!(ledger.entries().unwrap().len(), 2);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("recursion.log");
        std::fs::write(&path, "garbage\nRECURSION DETECTED: d1\n\nRECURSION DETECTED: d2\n").unwrap();

        let ledger: Ledger<RecursionEntry> = Ledger::new(&path);
        let digests: Vec<String> = ledger
            .entries()
            .unwrap()
            .into_iter()
            .map(|e| e.digest.to_string())
            .collect();
        assert_eq!(digests, vec!["d1", "d2"]);
    }

    #[test]
    fn invalid_utf8_bytes_are_dropped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("recursion.log");
        std::fs::write(&path, b"RECURSION DETECTED: d\xff1\n").unwrap();

        let ledger: Ledger<RecursionEntry> = Ledger::new(&path);
        assert_eq!(ledger.read_lines().unwrap(), vec!["RECURSION DETECTED: d1".to_string()]);
    }
}
