//! The series-neutral canonical preset.

use crate::{EffectSlot, FamilyTag, ParamValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Errors raised by canonical-model invariant checks.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A slot was pushed out of order.
    #[error("non-contiguous slot index: expected {expected}, got {found}")]
    NonContiguousSlot {
        /// Index the chain expected next.
        expected: usize,
        /// Index actually supplied.
        found: usize,
    },
}

/// Canonical amp model identifier.
///
/// Decoders map native hardware ids onto canonical identifiers through the
/// family's equivalence table. Native ids with no table entry are kept as
/// [`AmpModelId::Foreign`] so they still round-trip to their own family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AmpModelId {
    /// An amp model known to the canonical schema (e.g. `"twin57"`).
    Canonical(String),
    /// A native amp id with no canonical mapping; `code` is the family's
    /// native representation (decimal module id or FenderId string).
    Foreign {
        /// Family whose decoder produced this id.
        family: FamilyTag,
        /// Native id, verbatim.
        code: String,
    },
}

impl fmt::Display for AmpModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmpModelId::Canonical(id) => f.write_str(id),
            AmpModelId::Foreign { family, code } => write!(f, "{family}:{code}"),
        }
    }
}

/// Amp model plus its tone-stack parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmpBlock {
    /// Canonical (or foreign) amp model identifier.
    pub model: AmpModelId,
    /// Amp parameters keyed by name (volume, gain, treble, middle, bass,
    /// presence for the built-in families).
    pub params: BTreeMap<String, ParamValue>,
}

impl AmpBlock {
    /// Create an amp block with no parameters.
    pub fn new(model: AmpModelId) -> Self {
        Self {
            model,
            params: BTreeMap::new(),
        }
    }

    /// Add a parameter, keyed by its own name.
    pub fn with_param(mut self, param: ParamValue) -> Self {
        self.params.insert(param.name.clone(), param);
        self
    }
}

/// The distillate: a complete preset in series-neutral form.
///
/// Created by a decoder, possibly narrowed by reconciliation, read by an
/// encoder, then discarded. Owned by one conversion at a time — there is no
/// shared mutable state between conversions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distillate {
    /// Preset display name.
    pub name: String,
    /// Amp model and parameters.
    pub amp: AmpBlock,
    /// Ordered effect chain. Indices are contiguous from zero.
    pub slots: Vec<EffectSlot>,
    /// Family whose decoder produced this distillate.
    pub source: FamilyTag,
}

impl Distillate {
    /// Create an empty distillate with a default (unnamed canonical) amp.
    pub fn new(name: impl Into<String>, source: FamilyTag) -> Self {
        Self {
            name: name.into(),
            amp: AmpBlock::new(AmpModelId::Canonical(String::new())),
            slots: Vec::new(),
            source,
        }
    }

    /// Set the amp block.
    pub fn with_amp(mut self, amp: AmpBlock) -> Self {
        self.amp = amp;
        self
    }

    /// Append a slot, enforcing contiguous indices.
    pub fn push(&mut self, slot: EffectSlot) -> Result<(), ModelError> {
        let expected = self.slots.len();
        if slot.index != expected {
            return Err(ModelError::NonContiguousSlot {
                expected,
                found: slot.index,
            });
        }
        self.slots.push(slot);
        Ok(())
    }

    /// Builder-style [`push`](Self::push) that panics on a gap; intended for
    /// literal construction in tests and table code.
    #[must_use]
    pub fn with_slot(mut self, slot: EffectSlot) -> Self {
        let expected = self.slots.len();
        assert_eq!(slot.index, expected, "slot indices must be contiguous");
        self.slots.push(slot);
        self
    }

    /// Check the slot-index invariant (contiguous, unique, zero-based).
    pub fn validate(&self) -> Result<(), ModelError> {
        for (expected, slot) in self.slots.iter().enumerate() {
            if slot.index != expected {
                return Err(ModelError::NonContiguousSlot {
                    expected,
                    found: slot.index,
                });
            }
        }
        Ok(())
    }

    /// Look up an amp parameter by name.
    pub fn amp_param(&self, name: &str) -> Option<&ParamValue> {
        self.amp.params.get(name)
    }
}
