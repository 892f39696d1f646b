//! Loss notes: the non-fatal side channel of every conversion.
//!
//! A conversion either fails outright (malformed input, contract violation)
//! or completes with an ordered list of [`LossNote`]s describing every lossy
//! decision taken along the way. Notes are data, not errors — a batch caller
//! can keep converting and still surface every clamp and drop to the user.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One lossy decision made during decode, reconciliation, or encode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LossNote {
    /// A value outside its valid range was clamped to the nearest boundary.
    ValueClamped {
        /// Slot index, or `None` for amp parameters.
        slot: Option<usize>,
        /// Parameter name.
        param: String,
        /// Value as requested.
        requested: f32,
        /// Value actually stored/encoded.
        clamped: f32,
    },
    /// A slot was dropped because the target family has no equivalent
    /// effect type. Never substituted with a "closest" effect.
    EffectDropped {
        /// Slot index in the incoming chain.
        slot: usize,
        /// Canonical id (or opaque tag) of the dropped effect.
        effect: String,
    },
    /// A slot was dropped to satisfy the target family's slot budget.
    SlotDropped {
        /// Slot index in the incoming chain.
        slot: usize,
        /// Canonical id of the dropped effect.
        effect: String,
    },
    /// The source amp model has no equivalent in the target family and was
    /// replaced by the target's declared default.
    AmpSubstituted {
        /// Amp id as it arrived.
        from: String,
        /// Target family's default amp id.
        to: String,
    },
    /// The preset name exceeded the target's limits and was shortened
    /// and/or sanitized.
    NameTruncated {
        /// Name as it arrived.
        original: String,
        /// Name that will be encoded.
        truncated: String,
    },
}

impl fmt::Display for LossNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LossNote::ValueClamped {
                slot,
                param,
                requested,
                clamped,
            } => match slot {
                Some(i) => write!(
                    f,
                    "slot {i}: parameter '{param}' clamped from {requested} to {clamped}"
                ),
                None => write!(
                    f,
                    "amp: parameter '{param}' clamped from {requested} to {clamped}"
                ),
            },
            LossNote::EffectDropped { slot, effect } => {
                write!(f, "slot {slot}: effect '{effect}' has no target equivalent, dropped")
            }
            LossNote::SlotDropped { slot, effect } => {
                write!(f, "slot {slot}: '{effect}' dropped to fit target slot budget")
            }
            LossNote::AmpSubstituted { from, to } => {
                write!(f, "amp model '{from}' not available on target, using '{to}'")
            }
            LossNote::NameTruncated {
                original,
                truncated,
            } => write!(f, "preset name '{original}' shortened to '{truncated}'"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_the_essentials() {
        let note = LossNote::ValueClamped {
            slot: Some(2),
            param: "depth".into(),
            requested: 1.4,
            clamped: 1.0,
        };
        let msg = note.to_string();
        assert!(msg.contains("slot 2"), "got: {msg}");
        assert!(msg.contains("depth"), "got: {msg}");

        let note = LossNote::ValueClamped {
            slot: None,
            param: "volume".into(),
            requested: -0.1,
            clamped: 0.0,
        };
        assert!(note.to_string().starts_with("amp:"));

        let note = LossNote::EffectDropped {
            slot: 1,
            effect: "chorus".into(),
        };
        assert!(note.to_string().contains("chorus"));

        let note = LossNote::AmpSubstituted {
            from: "studio_preamp".into(),
            to: "twin57".into(),
        };
        let msg = note.to_string();
        assert!(msg.contains("studio_preamp") && msg.contains("twin57"), "got: {msg}");
    }
}
