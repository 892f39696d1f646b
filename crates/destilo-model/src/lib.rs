//! Canonical preset model for destilo.
//!
//! This crate defines the series-neutral representation that every hardware
//! family decodes into and encodes from — the *distillate*. It has no
//! knowledge of any wire format; per-family layouts live in
//! `destilo-formats` and the equivalence tables in `destilo-schema`.
//!
//! # Core Types
//!
//! - [`ParamValue`] — a single effect or amp parameter with its valid range
//!   and scaling curve. Values are clamped on every mutation, never rejected.
//! - [`EffectType`] / [`Category`] — the closed set of effect kinds the
//!   canonical schema knows, plus an [`OpaqueBlob`] escape hatch that
//!   preserves unknown native effects byte-for-byte.
//! - [`EffectSlot`] — one position in the ordered effect chain.
//! - [`Distillate`] — the full canonical preset: name, amp block, slots,
//!   and source-family provenance.
//! - [`LossNote`] — the non-fatal lossy decisions (clamps, drops,
//!   substitutions) that accompany every conversion result.
//!
//! # Example
//!
//! ```rust
//! use destilo_model::{Distillate, EffectSlot, EffectType, FamilyTag, ParamValue};
//!
//! let mut preset = Distillate::new("Clean Sparkle", FamilyTag::Classic);
//! preset
//!     .push(EffectSlot::new(0, EffectType::Chorus).with_param(ParamValue::unit("depth", 0.4)))
//!     .unwrap();
//! assert_eq!(preset.slots.len(), 1);
//! ```

mod distillate;
mod family;
mod note;
mod param;
mod slot;

pub use distillate::{AmpBlock, AmpModelId, Distillate, ModelError};
pub use family::FamilyTag;
pub use note::LossNote;
pub use param::{ParamValue, ScaleKind};
pub use slot::{Category, EffectSlot, EffectType, OpaqueBlob};
