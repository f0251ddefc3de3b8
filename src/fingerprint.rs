use mirrorseed_core::{Fingerprint, Record, FINGERPRINT_MODULUS};

/// Sum of squared cell lengths, reduced modulo [`FINGERPRINT_MODULUS`].
///
/// Length is counted in characters, not bytes.
pub fn fingerprint(record: &Record) -> Fingerprint {
    let sum = record.cells().iter().fold(0u64, |acc, cell| {
        let len = cell.chars().count() as u64;
        (acc + len * len) % FINGERPRINT_MODULUS
    });
    Fingerprint::reduce(sum)
}
