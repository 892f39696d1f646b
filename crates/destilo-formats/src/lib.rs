//! Per-family preset decoders and encoders.
//!
//! Each hardware family serializes presets differently: the classic series
//! uses an 84-byte little-endian binary record, the LT, Rumble LT, and Micro
//! Plus ranges use Tone-style JSON audio graphs. This crate turns native
//! bytes into a
//! [`Distillate`] and back, driven entirely by the family's
//! [`FamilySchema`] — the codecs contain no per-family tables of their own.
//!
//! Decoding is strict about structure (malformed input is a fatal
//! [`DecodeError`]) and lenient about values (out-of-range values are
//! clamped, with a [`LossNote`]). Native content the equivalence table does
//! not know is preserved as opaque material so a same-family round trip is
//! lossless; see [`destilo_model::OpaqueBlob`].
//!
//! Encoding assumes the distillate was already reconciled against the target
//! family. Value narrowing (clamping into a tighter native range) happens
//! here and is reported through notes; anything that would require dropping
//! a slot or substituting an effect is an [`EncodeError`] instead.
//!
//! # Example
//!
//! ```rust
//! use destilo_formats::{decode, encode};
//! use destilo_model::{
//!     AmpBlock, AmpModelId, Distillate, EffectSlot, EffectType, FamilyTag, ParamValue,
//! };
//! use destilo_schema::FamilyRegistry;
//!
//! let registry = FamilyRegistry::new();
//! let classic = registry.get(&FamilyTag::Classic).unwrap();
//!
//! let preset = Distillate::new("Clean Twin", FamilyTag::Classic)
//!     .with_amp(
//!         AmpBlock::new(AmpModelId::Canonical("twin57".into()))
//!             .with_param(ParamValue::unit("volume", 0.8)),
//!     )
//!     .with_slot(EffectSlot::new(0, EffectType::SpringReverb));
//!
//! let (bytes, notes) = encode(&preset, classic).unwrap();
//! assert!(notes.is_empty());
//!
//! let (decoded, _) = decode(&bytes, classic).unwrap();
//! assert_eq!(decoded.name, "Clean Twin");
//! ```

mod classic;
mod error;
mod tone_json;

pub use error::{DecodeError, EncodeError};

use destilo_model::{Distillate, LossNote};
use destilo_schema::{FamilySchema, WireFormat};

/// Decode native preset bytes into a distillate.
///
/// Returns the distillate together with the notes for every value that had
/// to be clamped on the way in. The distillate's `source` is the schema's
/// family tag.
pub fn decode(
    bytes: &[u8],
    schema: &FamilySchema,
) -> Result<(Distillate, Vec<LossNote>), DecodeError> {
    match schema.wire {
        WireFormat::ClassicBinary {
            magic,
            version,
            checksum,
        } => classic::decode(bytes, schema, magic, version, checksum),
        WireFormat::ToneJson {
            product_ids,
            fender_prefix,
            params,
            layout,
        } => tone_json::decode(bytes, schema, product_ids, fender_prefix, params, layout),
    }
}

/// Encode a distillate into the family's native bytes.
///
/// The distillate must already fit the family (run it through
/// reconciliation first); a chain the family cannot hold is an error, never
/// a silent drop. Values outside a native parameter range are clamped and
/// reported through the returned notes.
pub fn encode(
    distillate: &Distillate,
    schema: &FamilySchema,
) -> Result<(Vec<u8>, Vec<LossNote>), EncodeError> {
    match schema.wire {
        WireFormat::ClassicBinary {
            magic,
            version,
            checksum,
        } => classic::encode(distillate, schema, magic, version, checksum),
        WireFormat::ToneJson {
            product_ids,
            fender_prefix,
            params,
            layout,
        } => tone_json::encode(distillate, schema, product_ids, fender_prefix, params, layout),
    }
}
