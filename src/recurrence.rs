//! Recurrence detector: finds digests that occur more than once in the
//! whole reflection ledger history.

use std::collections::BTreeMap;
use std::path::Path;

use mirrorseed_core::{ActivationSet, Digest, RecursionEntry, ReflectionEntry, Result};
use tracing::debug;

use crate::ledger::Ledger;

/// Occurrences needed for a digest to join the activation set.
pub const RECURRENCE_THRESHOLD: usize = 2;

pub struct RecurrenceDetector {
    reflection: Ledger<ReflectionEntry>,
    recursion: Ledger<RecursionEntry>,
}

/// Tallies over one full scan of the reflection ledger.
#[derive(Debug, Default)]
pub struct RecurrenceReport {
    /// Digests in ledger order, grouped by input id.
    pub by_input: BTreeMap<String, Vec<Digest>>,
    /// Occurrences of each digest across every input.
    pub counts: BTreeMap<Digest, usize>,
}

impl RecurrenceReport {
    pub fn tally(entries: Vec<ReflectionEntry>) -> Self {
        let mut report = Self::default();
        for entry in entries {
            *report.counts.entry(entry.digest.clone()).or_insert(0) += 1;
            report
                .by_input
                .entry(entry.input_id)
                .or_default()
                .push(entry.digest);
        }
        report
    }

    pub fn activation_set(&self) -> ActivationSet {
        self.counts
            .iter()
            .filter(|&(_, &count)| count >= RECURRENCE_THRESHOLD)
            .map(|(digest, _)| digest.clone())
            .collect()
    }
}

impl RecurrenceDetector {
    pub fn new(reflection_path: impl AsRef<Path>, recursion_path: impl AsRef<Path>) -> Self {
        Self {
            reflection: Ledger::new(reflection_path),
            recursion: Ledger::new(recursion_path),
        }
    }

    /// Scan the reflection ledger and return every digest seen at least
    /// twice. Each returned digest is also written to the recursion ledger,
    /// on every call, regardless of what earlier runs already reported.
    pub fn detect(&self) -> Result<ActivationSet> {
        let report = RecurrenceReport::tally(self.reflection.entries()?);
        let activation = report.activation_set();

        for digest in activation.iter() {
            self.recursion.append(&RecursionEntry {
                digest: digest.clone(),
            })?;
        }

        debug!(
            "recurrence: {} inputs, {} distinct digests, {} recurrent",
            report.by_input.len(),
            report.counts.len(),
            activation.len()
        );
        Ok(activation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn detector(dir: &TempDir, reflection: &str) -> RecurrenceDetector {
        std::fs::write(dir.path().join("reflection.log"), reflection).unwrap();
        RecurrenceDetector::new(dir.path().join("reflection.log"), dir.path().join("recursion.log"))
    }

    fn recursion_lines(dir: &TempDir) -> Vec<String> {
        std::fs::read_to_string(dir.path().join("recursion.log"))
            .map(|s| s.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    #[test]
    fn missing_ledger_yields_empty_set() {
        let dir = TempDir::new().unwrap();
        let d = RecurrenceDetector::new(dir.path().join("reflection.log"), dir.path().join("recursion.log"));
        assert!(d.detect().unwrap().is_empty());
        assert!(!dir.path().join("recursion.log").exists());
    }

    #[test]
    fn single_occurrences_do_not_activate() {
        let dir = TempDir::new().unwrap();
        let d = detector(&dir, "a.csv :: d1\nb.csv :: d2\n");
        assert!(d.detect().unwrap().is_empty());
        assert!(recursion_lines(&dir).is_empty());
    }

    #[test]
    fn tally_is_global_across_inputs() {
        let dir = TempDir::new().unwrap();
        let d = detector(&dir, "a.csv :: d1\nb.csv :: d1\nc.csv :: d2\nc.csv :: d3\nc.csv :: d3\nc.csv :: d3\n");
        let set = d.detect().unwrap();
        let digests: Vec<&str> = set.iter().map(Digest::as_str).collect();
        assert_eq!(digests, vec!["d1", "d3"]);
        assert_eq!(
            recursion_lines(&dir),
            vec!["RECURSION DETECTED: d1", "RECURSION DETECTED: d3"]
        );
    }

    #[test]
    fn repeated_detection_accumulates_duplicate_lines() {
        let dir = TempDir::new().unwrap();
        let d = detector(&dir, "a.csv :: d1\na.csv :: d1\n");
        let first = d.detect().unwrap();
        let second = d.detect().unwrap();
        assert_eq!(first, second);
        assert_eq!(
            recursion_lines(&dir),
            vec!["RECURSION DETECTED: d1", "RECURSION DETECTED: d1"]
        );
    }

    #[test]
    fn malformed_reflection_lines_are_ignored() {
        let dir = TempDir::new().unwrap();
        let d = detector(&dir, "d1\n:: \na.csv :: d1\nnot a line\n");
        assert!(d.detect().unwrap().is_empty());
    }

    #[test]
    fn input_ids_containing_separator_are_tallied() {
        let dir = TempDir::new().unwrap();
        let d = detector(
            &dir,
            "in/a :: b__ECHO__.csv :: 0123456789abcdef0123456789abcdef\n\
             in/a :: b__ECHO__.csv :: 0123456789abcdef0123456789abcdef\n",
        );
        let set = d.detect().unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.contains(&Digest::new("0123456789abcdef0123456789abcdef")));
    }

    #[test]
    fn report_groups_by_input() {
        let entries = vec![
            ReflectionEntry { input_id: "a".into(), digest: Digest::new("x") },
            ReflectionEntry { input_id: "b".into(), digest: Digest::new("x") },
            ReflectionEntry { input_id: "a".into(), digest: Digest::new("y") },
        ];
        let report = RecurrenceReport::tally(entries);
        assert_eq!(report.by_input["a"], vec![Digest::new("x"), Digest::new("y")]);
        assert_eq!(report.counts[&Digest::new("x")], 2);
    }
}
