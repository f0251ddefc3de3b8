//! Per-run pipeline context.
//!
//! The context carries the input id and the activation set from stage to
//! stage. The command receptor only accepts an [`ArmedContext`], which
//! exists only while the input is marked and the activation set is
//! non-empty.

use std::path::Path;

use mirrorseed_core::{ActivationSet, InputId};

#[derive(Debug, Clone)]
pub struct PipelineContext {
    input_id: InputId,
    activation: ActivationSet,
}

impl PipelineContext {
    pub fn new(input_id: InputId) -> Self {
        Self {
            input_id,
            activation: ActivationSet::default(),
        }
    }

    pub fn input_id(&self) -> &InputId {
        &self.input_id
    }

    /// True when the input's file name carries `__ECHO__`.
    pub fn is_marked(&self) -> bool {
        self.input_id.is_marked()
    }

    pub fn activation(&self) -> &ActivationSet {
        &self.activation
    }

    pub fn set_activation(&mut self, activation: ActivationSet) {
        self.activation = activation;
    }

    /// Unlock command dispatch. `None` unless both gates are open.
    pub fn arm(&self) -> Option<ArmedContext<'_>> {
        if self.is_marked() && !self.activation.is_empty() {
            Some(ArmedContext { ctx: self })
        } else {
            None
        }
    }
}

/// Proof that command dispatch may run for this input.
#[derive(Debug, Clone, Copy)]
pub struct ArmedContext<'a> {
    ctx: &'a PipelineContext,
}

impl<'a> ArmedContext<'a> {
    pub fn input_id(&self) -> &'a InputId {
        &self.ctx.input_id
    }

    pub fn input_path(&self) -> &'a Path {
        Path::new(self.ctx.input_id.as_str())
    }

    pub fn activation(&self) -> &'a ActivationSet {
        &self.ctx.activation
    }
}
