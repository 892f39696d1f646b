//! Decode and encode error taxonomy.
//!
//! Decode errors mean the input bytes are not a valid preset of the claimed
//! family; nothing about them is recoverable. Encode errors mean the caller
//! handed the encoder a distillate that was never reconciled against the
//! target family; they are contract violations, not data loss.

use thiserror::Error;

/// Fatal decode failures. Malformed input never yields a partial distillate.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The byte buffer is not the fixed record length.
    #[error("bad record length: expected {expected} bytes, got {actual}")]
    BadLength {
        /// Required record length.
        expected: usize,
        /// Length of the buffer supplied.
        actual: usize,
    },
    /// The file magic does not match the family's.
    #[error("bad magic: expected {expected:02x?}, found {found:02x?}")]
    BadMagic {
        /// Magic the family declares.
        expected: [u8; 4],
        /// Magic actually present.
        found: [u8; 4],
    },
    /// The layout version byte is not one this decoder understands.
    #[error("unsupported layout version {0:#04x}")]
    UnsupportedVersion(u8),
    /// The trailer checksum does not match the record contents.
    #[error("checksum mismatch: expected {expected:#06x}, found {found:#06x}")]
    ChecksumMismatch {
        /// Checksum computed over the record.
        expected: u16,
        /// Checksum stored in the trailer.
        found: u16,
    },
    /// The input is not syntactically valid JSON.
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The JSON parses but does not have the required document shape.
    #[error("malformed document structure: {0}")]
    Structure(String),
    /// The document belongs to a different product family.
    #[error("wrong product id: expected '{expected}', found '{found}'")]
    WrongProduct {
        /// Product id the family declares.
        expected: String,
        /// Product id actually present.
        found: String,
    },
}

/// Encoder contract violations.
///
/// An encoder only narrows values (clamping, with notes); it never drops
/// slots or substitutes effects. Input that would require dropping or
/// substituting is rejected — running it through reconciliation first is
/// the caller's job.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The chain is longer than the family's slot budget.
    #[error("chain of {len} slots exceeds the family maximum of {max}")]
    UnsupportedChainLength {
        /// Slots in the incoming chain.
        len: usize,
        /// Slots the family supports.
        max: usize,
    },
    /// A slot holds an effect the family's equivalence table cannot express.
    #[error("slot {slot}: effect '{effect}' has no native equivalent")]
    UnmappableEffectType {
        /// Slot index in the incoming chain.
        slot: usize,
        /// Canonical id (or opaque tag) of the offending effect.
        effect: String,
    },
    /// The amp model has no native equivalent in the target family.
    #[error("amp model '{model}' has no native equivalent")]
    UnmappableAmp {
        /// Amp id as it arrived.
        model: String,
    },
    /// Two slots claim the same chain role in a role-based family.
    #[error("slot {slot}: role '{role}' is already occupied")]
    SlotRoleConflict {
        /// Slot index in the incoming chain.
        slot: usize,
        /// Chain role both slots map to.
        role: String,
    },
    /// The chain breaks the distillate's own slot-index invariant.
    #[error("malformed chain: {0}")]
    MalformedChain(#[from] destilo_model::ModelError),
    /// JSON serialization failed.
    #[error("JSON serialization: {0}")]
    Json(#[from] serde_json::Error),
}
