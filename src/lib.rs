//! Mirrorseed - record cleaner with a ledger-backed echo pipeline
//!
//! Stages, leaf first:
//! - fingerprint: record -> bounded integer
//! - echo: marker-bearing records -> echo ledger
//! - reflector: echo ledger -> salted digests in the reflection ledger
//! - recurrence: reflection ledger -> activation set (+ recursion ledger)
//! - receptor: `__MIRROR::` cells -> pulse ledger, only when armed
//!
//! Stages share nothing in memory across runs; the ledgers are the state.

pub mod cleaner;
pub mod config;
pub mod context;
pub mod echo;
pub mod fingerprint;
pub mod ledger;
pub mod pipeline;
pub mod receptor;
pub mod records;
pub mod recurrence;
pub mod reflector;

pub use config::{MatchPolicy, MirrorseedConfig};
pub use pipeline::{Pipeline, PipelineOutcome, Stage};
