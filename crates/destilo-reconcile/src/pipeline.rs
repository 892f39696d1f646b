//! The end-to-end conversion pipeline: decode, reconcile, encode.

use crate::reconcile;
use destilo_formats::{DecodeError, EncodeError, decode, encode};
use destilo_model::LossNote;
use destilo_schema::FamilySchema;
use thiserror::Error;

/// Fatal pipeline failures.
///
/// Decode errors surface malformed input. Encode errors should not occur on
/// this path (reconciliation guarantees the distillate fits the target); one
/// here indicates conflicting opaque material or a schema bug.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The source bytes are not a valid preset of the source family.
    #[error("decoding source preset: {0}")]
    Decode(#[from] DecodeError),
    /// The reconciled distillate was still rejected by the target encoder.
    #[error("encoding target preset: {0}")]
    Encode(#[from] EncodeError),
}

/// Result of one conversion: target-native bytes plus every lossy decision
/// taken along the way, in pipeline order (decode, reconcile, encode).
#[derive(Debug)]
pub struct Conversion {
    /// Encoded preset in the target family's wire format.
    pub bytes: Vec<u8>,
    /// Accumulated loss notes from all three stages.
    pub notes: Vec<LossNote>,
}

/// Convert one preset between families.
///
/// Pure function of its inputs: no I/O, no shared state, deterministic. A
/// same-family conversion of an already-conforming preset is the identity
/// (byte-identical for the binary format, value-identical for JSON) with no
/// notes.
pub fn convert(
    bytes: &[u8],
    source: &FamilySchema,
    target: &FamilySchema,
) -> Result<Conversion, ConvertError> {
    let (distillate, mut notes) = decode(bytes, source)?;
    let (narrowed, mut reconcile_notes) = reconcile(&distillate, target);
    let (out, mut encode_notes) = encode(&narrowed, target)?;
    notes.append(&mut reconcile_notes);
    notes.append(&mut encode_notes);

    tracing::info!(
        source = %source.tag,
        target = %target.tag,
        name = %narrowed.name,
        slots = narrowed.slots.len(),
        notes = notes.len(),
        "converted preset"
    );
    Ok(Conversion { bytes: out, notes })
}
