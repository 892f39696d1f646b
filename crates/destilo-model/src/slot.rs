//! Effect slots and the canonical effect-type vocabulary.

use crate::{FamilyTag, ParamValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Broad effect category, used for slot-role placement in families that
/// process their chain in a fixed category order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Gain-stage effects placed before the amp (overdrive, fuzz, compressor).
    Stomp,
    /// Modulation effects (chorus, flanger, phaser, tremolo).
    Modulation,
    /// Delay effects.
    Delay,
    /// Reverb effects.
    Reverb,
    /// Equalizer blocks (the Rumble LT chain hosts one in place of reverb).
    Eq,
}

impl Category {
    /// Human-readable category name.
    pub const fn name(&self) -> &'static str {
        match self {
            Category::Stomp => "stomp",
            Category::Modulation => "modulation",
            Category::Delay => "delay",
            Category::Reverb => "reverb",
            Category::Eq => "eq",
        }
    }
}

/// An effect preserved verbatim because its native type tag is unknown to
/// the canonical schema.
///
/// The payload is the original native representation: the raw slot block for
/// binary families, the serialized node object for JSON families. An opaque
/// slot re-encodes to its own family undamaged; it cannot be remixed to any
/// other family and is dropped (with a note) during reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpaqueBlob {
    /// Family whose decoder produced this blob.
    pub family: FamilyTag,
    /// Original native bytes, retained exactly.
    pub payload: Vec<u8>,
}

/// Canonical effect type vocabulary.
///
/// This is the closed set shared by all family schemas. Each family maps its
/// native type tags onto this set through its equivalence table; native tags
/// with no entry decode to [`EffectType::Opaque`] instead of failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EffectType {
    /// Tube-style overdrive.
    Overdrive,
    /// Fuzz distortion.
    Fuzz,
    /// Dynamics compressor.
    Compressor,
    /// Dual-voice chorus.
    Chorus,
    /// Flanger.
    Flanger,
    /// Multi-stage phaser.
    Phaser,
    /// Amplitude tremolo.
    Tremolo,
    /// Tape-style delay.
    TapeDelay,
    /// Multi-tap echo delay.
    EchoDelay,
    /// Spring reverb.
    SpringReverb,
    /// Hall reverb.
    HallReverb,
    /// Multi-band graphic equalizer.
    GraphicEq,
    /// Unknown native effect, preserved as-is for same-family round-trips.
    Opaque(OpaqueBlob),
}

impl EffectType {
    /// The category this effect belongs to.
    ///
    /// Opaque effects have no canonical category; callers that need one must
    /// treat them separately (reconciliation drops them for foreign targets).
    pub fn category(&self) -> Option<Category> {
        match self {
            EffectType::Overdrive | EffectType::Fuzz | EffectType::Compressor => {
                Some(Category::Stomp)
            }
            EffectType::Chorus
            | EffectType::Flanger
            | EffectType::Phaser
            | EffectType::Tremolo => Some(Category::Modulation),
            EffectType::TapeDelay | EffectType::EchoDelay => Some(Category::Delay),
            EffectType::SpringReverb | EffectType::HallReverb => Some(Category::Reverb),
            EffectType::GraphicEq => Some(Category::Eq),
            EffectType::Opaque(_) => None,
        }
    }

    /// Canonical lowercase identifier for display and notes.
    pub fn id(&self) -> &'static str {
        match self {
            EffectType::Overdrive => "overdrive",
            EffectType::Fuzz => "fuzz",
            EffectType::Compressor => "compressor",
            EffectType::Chorus => "chorus",
            EffectType::Flanger => "flanger",
            EffectType::Phaser => "phaser",
            EffectType::Tremolo => "tremolo",
            EffectType::TapeDelay => "tape_delay",
            EffectType::EchoDelay => "echo_delay",
            EffectType::SpringReverb => "spring_reverb",
            EffectType::HallReverb => "hall_reverb",
            EffectType::GraphicEq => "graphic_eq",
            EffectType::Opaque(_) => "opaque",
        }
    }

    /// Whether this is an opaque (unknown-native) effect.
    pub fn is_opaque(&self) -> bool {
        matches!(self, EffectType::Opaque(_))
    }
}

impl fmt::Display for EffectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EffectType::Opaque(blob) => write!(f, "opaque({})", blob.family),
            other => f.write_str(other.id()),
        }
    }
}

/// One position in the ordered effect chain of a [`crate::Distillate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectSlot {
    /// Ordinal position in the chain. Contiguous and unique per distillate.
    pub index: usize,
    /// Effect occupying this slot.
    pub effect: EffectType,
    /// Parameter values keyed by parameter name.
    pub params: BTreeMap<String, ParamValue>,
}

impl EffectSlot {
    /// Create an empty-parameter slot.
    pub fn new(index: usize, effect: EffectType) -> Self {
        Self {
            index,
            effect,
            params: BTreeMap::new(),
        }
    }

    /// Add a parameter, keyed by its own name. Replaces any existing value
    /// under the same name (keys stay unique by construction).
    pub fn with_param(mut self, param: ParamValue) -> Self {
        self.insert(param);
        self
    }

    /// Insert a parameter, keyed by its own name.
    pub fn insert(&mut self, param: ParamValue) {
        self.params.insert(param.name.clone(), param);
    }

    /// Look up a parameter by name.
    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }
}
