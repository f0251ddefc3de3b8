//! The gated four-stage pipeline.
//!
//! ```text
//! START
//!   marked? ──no──────────────────────────┐
//!     │yes                                │
//!   ECHO_SCAN -> REFLECT                  │
//!     │                                   │
//!   RECURRENCE_SCAN <─────────────────────┘
//!     │
//!   armed? ──no──> STOP
//!     │yes
//!   COMMAND_DISPATCH -> STOP
//! ```
//!
//! Stages only talk through the ledgers. A run never fails: stage errors
//! are logged at debug level and the run continues with an empty result.

use std::path::Path;

use mirrorseed_core::{ActivationSet, Command, InputId};
use tracing::debug;

use crate::config::MirrorseedConfig;
use crate::context::PipelineContext;
use crate::echo::EchoListener;
use crate::receptor::CommandReceptor;
use crate::records::read_records;
use crate::recurrence::RecurrenceDetector;
use crate::reflector::Reflector;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    EchoScan,
    Reflect,
    RecurrenceScan,
    CommandDispatch,
}

#[derive(Debug, Default)]
pub struct PipelineOutcome {
    /// Stages entered, in order.
    pub stages: Vec<Stage>,
    pub activation: ActivationSet,
    pub dispatched: Vec<Command>,
}

pub struct Pipeline {
    echo: EchoListener,
    reflector: Reflector,
    detector: RecurrenceDetector,
    receptor: CommandReceptor,
}

impl Pipeline {
    pub fn from_config(config: &MirrorseedConfig) -> Self {
        let ledgers = &config.ledgers;
        Self {
            echo: EchoListener::new(ledgers.echo_path()),
            reflector: Reflector::new(
                ledgers.echo_path(),
                ledgers.reflection_path(),
                config.reflector.match_policy,
            ),
            detector: RecurrenceDetector::new(ledgers.reflection_path(), ledgers.recursion_path()),
            receptor: CommandReceptor::new(ledgers.pulse_path()),
        }
    }

    pub fn run(&self, input: &Path) -> PipelineOutcome {
        let mut ctx = PipelineContext::new(InputId::from_path(input));
        let mut stages = Vec::new();

        if ctx.is_marked() {
            stages.push(Stage::EchoScan);
            match read_records(input) {
                Ok(records) => {
                    if let Err(e) = self.echo.process(ctx.input_id(), &records) {
                        debug!("echo stage failed: {}", e);
                    }
                }
                Err(e) => debug!("echo stage cannot read {}: {}", ctx.input_id(), e),
            }

            stages.push(Stage::Reflect);
            if let Err(e) = self.reflector.reflect(ctx.input_id()) {
                debug!("reflect stage failed: {}", e);
            }
        }

        stages.push(Stage::RecurrenceScan);
        let activation = self.detector.detect().unwrap_or_else(|e| {
            debug!("recurrence stage failed: {}", e);
            ActivationSet::default()
        });
        ctx.set_activation(activation);

        let dispatched = match ctx.arm() {
            Some(armed) => {
                stages.push(Stage::CommandDispatch);
                self.receptor.receive(&armed)
            }
            None => Vec::new(),
        };

        debug!(
            "pipeline {}: stages={:?} activation={} dispatched={:?}",
            ctx.input_id(),
            stages,
            ctx.activation().len(),
            dispatched
        );

        PipelineOutcome {
            stages,
            activation: ctx.activation().clone(),
            dispatched,
        }
    }
}

/// Run the pipeline once for `input` with ledgers taken from `config`.
pub fn run(config: &MirrorseedConfig, input: &Path) -> PipelineOutcome {
    Pipeline::from_config(config).run(input)
}
