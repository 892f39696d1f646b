//! Family schemas and the schema registry for destilo.
//!
//! A [`FamilySchema`] is the static, read-only description of one hardware
//! family: which effect types and amp models it supports (as an explicit
//! bidirectional equivalence table against the canonical vocabulary), how
//! many slots it has, and the wire-format quirks of its serialization.
//!
//! Schemas are built once and never mutated; every decode, encode, and
//! reconcile call takes `&FamilySchema`. The [`FamilyRegistry`] holds the
//! four built-in schemas and accepts caller-registered ones, so new
//! hardware families can be added without modifying any conversion logic.
//!
//! # Example
//!
//! ```rust
//! use destilo_schema::FamilyRegistry;
//! use destilo_model::{EffectType, FamilyTag};
//!
//! let registry = FamilyRegistry::new();
//! let lt = registry.get(&FamilyTag::MustangLt).unwrap();
//! assert!(lt.supports(&EffectType::Chorus));
//! assert_eq!(lt.max_slots, 4);
//! ```

mod tables;

pub use tables::{classic, micro_plus, mustang_lt, rumble_lt};

use destilo_model::{Category, EffectType, FamilyTag, ParamValue, ScaleKind};

/// Declaration of one canonical parameter: name, valid range, scale.
///
/// For the Classic binary layout the position of a spec within its
/// [`EffectMapping::params`] slice is also its wire position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    /// Canonical parameter name.
    pub name: &'static str,
    /// Minimum raw value.
    pub min: f32,
    /// Maximum raw value.
    pub max: f32,
    /// Normalization curve.
    pub scale: ScaleKind,
}

impl ParamSpec {
    /// Unit-range linear parameter.
    pub const fn unit(name: &'static str) -> Self {
        Self {
            name,
            min: 0.0,
            max: 1.0,
            scale: ScaleKind::Linear,
        }
    }

    /// Logarithmically scaled parameter.
    pub const fn log(name: &'static str, min: f32, max: f32) -> Self {
        Self {
            name,
            min,
            max,
            scale: ScaleKind::Logarithmic,
        }
    }

    /// Stepped (whole-number) parameter.
    pub const fn stepped(name: &'static str, min: f32, max: f32) -> Self {
        Self {
            name,
            min,
            max,
            scale: ScaleKind::Stepped,
        }
    }

    /// Build a [`ParamValue`] from a raw value, clamping into range.
    ///
    /// The second element reports whether clamping occurred.
    pub fn value(&self, raw: f32) -> (ParamValue, bool) {
        let mut pv = ParamValue::new(self.name, self.min, self.min, self.max, self.scale);
        let clamped = pv.set(raw);
        (pv, clamped)
    }

    /// Build a [`ParamValue`] from a normalized \[0.0, 1.0\] position.
    pub fn from_normalized(&self, normalized: f32) -> (ParamValue, bool) {
        let mut pv = ParamValue::new(self.name, self.min, self.min, self.max, self.scale);
        let clamped = pv.set_normalized(normalized);
        (pv, clamped)
    }
}

/// One row of a family's effect equivalence table.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectMapping {
    /// Canonical effect type.
    pub effect: EffectType,
    /// Native single-byte module id (Classic wire format).
    pub code: u8,
    /// Native FenderId base name, without the family prefix (JSON formats).
    pub fender_id: &'static str,
    /// Parameters this family carries for the effect, in wire order.
    pub params: &'static [ParamSpec],
}

/// One row of a family's amp equivalence table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmpMapping {
    /// Canonical amp model id.
    pub canonical: &'static str,
    /// Native single-byte DSP module id (Classic wire format).
    pub code: u8,
    /// Native FenderId base name, without the family prefix (JSON formats).
    pub fender_id: &'static str,
}

/// How a family arranges its effect slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotPolicy {
    /// Any effect may occupy any slot, up to `max_slots`.
    Freeform,
    /// The chain runs in a fixed category order with at most one slot per
    /// canonical category (the Tone-JSON arrangements; see [`RoleLayout`]).
    RoleBased,
}

/// Checksum algorithm used by a binary wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checksum {
    /// No checksum.
    None,
    /// Little-endian u16 sum of all preceding bytes, modulo 2^16.
    AdditiveU16,
}

/// Native encoding of parameter values in a Tone-JSON document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamEncoding {
    /// Normalized floats in 0.0–1.0 (Mustang LT, Rumble LT).
    Unit,
    /// Integers in 0–255 (Micro Plus).
    Byte,
}

/// Node arrangement of a Tone-JSON audio graph.
///
/// Every dialect carries five nodes with the amp sitting third; the four
/// effect roles around it differ per hardware range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleLayout {
    /// `stomp, mod, amp, delay, reverb` (Mustang LT, Micro Plus).
    StompModDelayReverb,
    /// `stomp, mod, amp, eq, delay` (Rumble LT).
    StompModEqDelay,
}

impl RoleLayout {
    /// The four effect roles in node order, each with the category it hosts.
    /// The amp node is not listed; it sits between the second and third role.
    pub const fn effect_roles(&self) -> &'static [(&'static str, Category); 4] {
        match self {
            RoleLayout::StompModDelayReverb => &[
                ("stomp", Category::Stomp),
                ("mod", Category::Modulation),
                ("delay", Category::Delay),
                ("reverb", Category::Reverb),
            ],
            RoleLayout::StompModEqDelay => &[
                ("stomp", Category::Stomp),
                ("mod", Category::Modulation),
                ("eq", Category::Eq),
                ("delay", Category::Delay),
            ],
        }
    }

    /// Position of the role hosting the given category, if the layout has one.
    pub fn position(&self, category: Category) -> Option<usize> {
        self.effect_roles().iter().position(|(_, c)| *c == category)
    }
}

/// Per-family wire-format quirks, as a closed set of tagged variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    /// Fixed-layout little-endian binary record.
    ClassicBinary {
        /// File magic.
        magic: [u8; 4],
        /// Layout version byte.
        version: u8,
        /// Trailer checksum algorithm.
        checksum: Checksum,
    },
    /// Tone-style JSON audio graph.
    ToneJson {
        /// Accepted `info.product_id` values; the first is emitted on encode.
        product_ids: &'static [&'static str],
        /// Prefix carried by every native FenderId.
        fender_prefix: &'static str,
        /// Native parameter value encoding.
        params: ParamEncoding,
        /// Node arrangement of the audio graph.
        layout: RoleLayout,
    },
}

/// Static description of one hardware family.
///
/// Immutable after construction; safe for unlimited concurrent readers.
#[derive(Debug, Clone, PartialEq)]
pub struct FamilySchema {
    /// Family tag.
    pub tag: FamilyTag,
    /// Human-readable family name.
    pub display_name: &'static str,
    /// Maximum number of effect slots.
    pub max_slots: usize,
    /// Slot arrangement policy.
    pub slot_policy: SlotPolicy,
    /// Maximum preset-name length in bytes, if the format bounds it.
    pub max_name_len: Option<usize>,
    /// Whether preset names are restricted to 7-bit ASCII.
    pub ascii_name: bool,
    /// Canonical id of the amp used when a source amp has no equivalent.
    pub default_amp: &'static str,
    /// Amp equivalence table.
    pub amps: Vec<AmpMapping>,
    /// Effect equivalence table.
    pub effects: Vec<EffectMapping>,
    /// Amp parameter declarations, in wire order.
    pub amp_params: &'static [ParamSpec],
    /// Serialization quirks.
    pub wire: WireFormat,
}

impl FamilySchema {
    /// Look up an effect mapping by native module code.
    pub fn effect_by_code(&self, code: u8) -> Option<&EffectMapping> {
        self.effects.iter().find(|m| m.code == code)
    }

    /// Look up an effect mapping by FenderId base name (prefix stripped).
    pub fn effect_by_fender(&self, fender_id: &str) -> Option<&EffectMapping> {
        self.effects.iter().find(|m| m.fender_id == fender_id)
    }

    /// Look up the mapping for a canonical effect type.
    ///
    /// Opaque effects never map; they belong to exactly one family.
    pub fn mapping_for(&self, effect: &EffectType) -> Option<&EffectMapping> {
        if effect.is_opaque() {
            return None;
        }
        self.effects.iter().find(|m| &m.effect == effect)
    }

    /// Whether this family can express the given canonical effect type.
    pub fn supports(&self, effect: &EffectType) -> bool {
        self.mapping_for(effect).is_some()
    }

    /// Look up an amp mapping by native module code.
    pub fn amp_by_code(&self, code: u8) -> Option<&AmpMapping> {
        self.amps.iter().find(|m| m.code == code)
    }

    /// Look up an amp mapping by FenderId base name.
    pub fn amp_by_fender(&self, fender_id: &str) -> Option<&AmpMapping> {
        self.amps.iter().find(|m| m.fender_id == fender_id)
    }

    /// Look up an amp mapping by canonical id.
    pub fn amp_by_canonical(&self, canonical: &str) -> Option<&AmpMapping> {
        self.amps.iter().find(|m| m.canonical == canonical)
    }

    /// The mapping for this family's default amp.
    ///
    /// Schema construction guarantees the default is present in the table.
    pub fn default_amp_mapping(&self) -> &AmpMapping {
        self.amp_by_canonical(self.default_amp)
            .expect("default amp must appear in the amp table")
    }

    /// Whether the family constrains slots to one per category.
    pub fn is_role_based(&self) -> bool {
        self.slot_policy == SlotPolicy::RoleBased
    }

    /// The effect categories this family can host at all.
    pub fn supported_categories(&self) -> Vec<Category> {
        let mut cats = Vec::new();
        for mapping in &self.effects {
            if let Some(cat) = mapping.effect.category()
                && !cats.contains(&cat)
            {
                cats.push(cat);
            }
        }
        cats
    }
}

/// Registry of family schemas, keyed by [`FamilyTag`].
///
/// Built once at startup with the four built-in families; additional
/// families can be registered without modifying any conversion logic.
pub struct FamilyRegistry {
    entries: Vec<FamilySchema>,
}

impl Default for FamilyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FamilyRegistry {
    /// Create a registry with the built-in families registered.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(classic());
        registry.register(mustang_lt());
        registry.register(rumble_lt());
        registry.register(micro_plus());
        registry
    }

    /// Create an empty registry.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a schema. A schema with the same tag is replaced.
    pub fn register(&mut self, schema: FamilySchema) {
        self.entries.retain(|s| s.tag != schema.tag);
        self.entries.push(schema);
    }

    /// Look up a schema by tag.
    pub fn get(&self, tag: &FamilyTag) -> Option<&FamilySchema> {
        self.entries.iter().find(|s| &s.tag == tag)
    }

    /// Iterate over all registered schemas.
    pub fn iter(&self) -> impl Iterator<Item = &FamilySchema> {
        self.entries.iter()
    }

    /// Number of registered families.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no families are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_has_builtin_families() {
        let registry = FamilyRegistry::new();
        assert_eq!(registry.len(), 4);
        assert!(registry.get(&FamilyTag::Classic).is_some());
        assert!(registry.get(&FamilyTag::MustangLt).is_some());
        assert!(registry.get(&FamilyTag::RumbleLt).is_some());
        assert!(registry.get(&FamilyTag::MicroPlus).is_some());
        assert!(registry.get(&FamilyTag::Custom("gtx".into())).is_none());
    }

    #[test]
    fn register_replaces_same_tag() {
        let mut registry = FamilyRegistry::new();
        let mut replacement = classic();
        replacement.max_slots = 2;
        registry.register(replacement);

        assert_eq!(registry.len(), 4);
        assert_eq!(registry.get(&FamilyTag::Classic).unwrap().max_slots, 2);
    }

    #[test]
    fn custom_family_can_be_registered() {
        let mut registry = FamilyRegistry::new();
        let mut custom = classic();
        custom.tag = FamilyTag::Custom("mini".into());
        custom.max_slots = 3;
        registry.register(custom);

        assert_eq!(registry.len(), 5);
        let tag = FamilyTag::Custom("mini".into());
        assert_eq!(registry.get(&tag).unwrap().max_slots, 3);
    }

    #[test]
    fn equivalence_tables_are_bidirectional() {
        for schema in FamilyRegistry::new().iter() {
            for mapping in &schema.effects {
                // code -> mapping -> same canonical type
                let by_code = schema.effect_by_code(mapping.code).unwrap();
                assert_eq!(by_code.effect, mapping.effect, "{}", schema.display_name);

                // fender id -> mapping -> same canonical type
                let by_id = schema.effect_by_fender(mapping.fender_id).unwrap();
                assert_eq!(by_id.effect, mapping.effect, "{}", schema.display_name);

                // canonical type -> mapping -> same code
                let back = schema.mapping_for(&mapping.effect).unwrap();
                assert_eq!(back.code, mapping.code, "{}", schema.display_name);
            }
        }
    }

    #[test]
    fn default_amp_exists_in_every_table() {
        for schema in FamilyRegistry::new().iter() {
            let mapping = schema.default_amp_mapping();
            assert_eq!(mapping.canonical, schema.default_amp);
        }
    }

    #[test]
    fn opaque_never_maps() {
        use destilo_model::OpaqueBlob;
        let schema = classic();
        let opaque = EffectType::Opaque(OpaqueBlob {
            family: FamilyTag::Classic,
            payload: vec![1, 2, 3],
        });
        assert!(schema.mapping_for(&opaque).is_none());
        assert!(!schema.supports(&opaque));
    }

    #[test]
    fn param_spec_value_reports_clamp() {
        let spec = ParamSpec::unit("level");
        let (pv, clamped) = spec.value(0.5);
        assert!(!clamped);
        assert_eq!(pv.raw(), 0.5);

        let (pv, clamped) = spec.value(1.5);
        assert!(clamped);
        assert_eq!(pv.raw(), 1.0);
    }
}
