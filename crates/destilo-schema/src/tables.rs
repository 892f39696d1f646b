//! Built-in family schemas.
//!
//! Module codes, amp ids, and parameter names follow the vocabulary observed
//! on the hardware ranges themselves: single-byte DSP module ids and 20-byte
//! ASCII names on the classic series, `DUBS_`-prefixed FenderIds with unit
//! floats on the Mustang LT and Rumble LT series, `MMP_`-prefixed FenderIds
//! with byte values on Micro Plus.

use crate::{
    AmpMapping, Checksum, EffectMapping, FamilySchema, ParamEncoding, ParamSpec, RoleLayout,
    SlotPolicy, WireFormat,
};
use destilo_model::{EffectType, FamilyTag};

/// Amp tone-stack parameters, shared by every built-in family.
pub const AMP_PARAMS: &[ParamSpec] = &[
    ParamSpec::unit("volume"),
    ParamSpec::unit("gain"),
    ParamSpec::unit("treble"),
    ParamSpec::unit("middle"),
    ParamSpec::unit("bass"),
    ParamSpec::unit("presence"),
];

// Canonical per-effect parameter sets. Five entries each: the classic wire
// format reserves five parameter words per slot, and position in the slice
// is the wire position.

const OVERDRIVE_PARAMS: &[ParamSpec] = &[
    ParamSpec::unit("level"),
    ParamSpec::unit("gain"),
    ParamSpec::unit("low"),
    ParamSpec::unit("mid"),
    ParamSpec::unit("high"),
];

const FUZZ_PARAMS: &[ParamSpec] = &[
    ParamSpec::unit("level"),
    ParamSpec::unit("gain"),
    ParamSpec::stepped("octave", 0.0, 1.0),
    ParamSpec::unit("low"),
    ParamSpec::unit("high"),
];

const COMPRESSOR_PARAMS: &[ParamSpec] = &[
    ParamSpec::unit("level"),
    ParamSpec::unit("threshold"),
    ParamSpec::stepped("ratio", 1.0, 8.0),
    ParamSpec::log("attack", 0.1, 100.0),
    ParamSpec::log("release", 10.0, 1000.0),
];

const CHORUS_PARAMS: &[ParamSpec] = &[
    ParamSpec::unit("level"),
    ParamSpec::log("rate", 0.1, 10.0),
    ParamSpec::unit("depth"),
    ParamSpec::unit("avg_delay"),
    ParamSpec::unit("lr_phase"),
];

const FLANGER_PARAMS: &[ParamSpec] = &[
    ParamSpec::unit("level"),
    ParamSpec::log("rate", 0.1, 10.0),
    ParamSpec::unit("depth"),
    ParamSpec::unit("feedback"),
    ParamSpec::unit("manual"),
];

const PHASER_PARAMS: &[ParamSpec] = &[
    ParamSpec::unit("level"),
    ParamSpec::log("rate", 0.1, 10.0),
    ParamSpec::unit("depth"),
    ParamSpec::unit("feedback"),
    ParamSpec::stepped("shape", 0.0, 3.0),
];

const TREMOLO_PARAMS: &[ParamSpec] = &[
    ParamSpec::unit("level"),
    ParamSpec::log("rate", 0.5, 15.0),
    ParamSpec::unit("depth"),
    ParamSpec::stepped("shape", 0.0, 3.0),
    ParamSpec::unit("bias"),
];

const TAPE_DELAY_PARAMS: &[ParamSpec] = &[
    ParamSpec::unit("level"),
    ParamSpec::log("time", 20.0, 1000.0),
    ParamSpec::unit("feedback"),
    ParamSpec::unit("brightness"),
    ParamSpec::unit("flutter"),
];

// Micro Plus caps delay feedback below self-oscillation.
const TAPE_DELAY_PARAMS_MMP: &[ParamSpec] = &[
    ParamSpec::unit("level"),
    ParamSpec::log("time", 20.0, 1000.0),
    ParamSpec {
        name: "feedback",
        min: 0.0,
        max: 0.8,
        scale: destilo_model::ScaleKind::Linear,
    },
    ParamSpec::unit("brightness"),
    ParamSpec::unit("flutter"),
];

const ECHO_DELAY_PARAMS: &[ParamSpec] = &[
    ParamSpec::unit("level"),
    ParamSpec::log("time", 20.0, 1000.0),
    ParamSpec::unit("feedback"),
    ParamSpec::unit("tap_ratio"),
    ParamSpec::unit("spread"),
];

const SPRING_REVERB_PARAMS: &[ParamSpec] = &[
    ParamSpec::unit("level"),
    ParamSpec::unit("decay"),
    ParamSpec::unit("dwell"),
    ParamSpec::unit("diffusion"),
    ParamSpec::unit("tone"),
];

const HALL_REVERB_PARAMS: &[ParamSpec] = &[
    ParamSpec::unit("level"),
    ParamSpec::unit("decay"),
    ParamSpec::unit("pre_delay"),
    ParamSpec::unit("diffusion"),
    ParamSpec::unit("tone"),
];

// Five band levels, matching the five wire words per slot.
const GRAPHIC_EQ_PARAMS: &[ParamSpec] = &[
    ParamSpec::unit("low"),
    ParamSpec::unit("low_mid"),
    ParamSpec::unit("mid"),
    ParamSpec::unit("high_mid"),
    ParamSpec::unit("high"),
];

fn amp_table(include_studio: bool, include_princeton: bool) -> Vec<AmpMapping> {
    let mut amps = vec![
        AmpMapping {
            canonical: "bassman59",
            code: 100,
            fender_id: "Bassman59",
        },
        AmpMapping {
            canonical: "deluxe57",
            code: 103,
            fender_id: "Deluxe57",
        },
        AmpMapping {
            canonical: "twin57",
            code: 117,
            fender_id: "Twin57",
        },
        AmpMapping {
            canonical: "champ57",
            code: 124,
            fender_id: "Champ57",
        },
    ];
    if include_princeton {
        amps.push(AmpMapping {
            canonical: "princeton65",
            code: 106,
            fender_id: "Princeton65",
        });
    }
    if include_studio {
        amps.push(AmpMapping {
            canonical: "studio_preamp",
            code: 241,
            fender_id: "StudioPreamp",
        });
    }
    amps
}

const fn effect(
    effect: EffectType,
    code: u8,
    fender_id: &'static str,
    params: &'static [ParamSpec],
) -> EffectMapping {
    EffectMapping {
        effect,
        code,
        fender_id,
        params,
    }
}

/// Legacy Mustang I–V schema: 4 freeform slots, 84-byte binary record,
/// additive checksum trailer.
pub fn classic() -> FamilySchema {
    FamilySchema {
        tag: FamilyTag::Classic,
        display_name: "Mustang I-V (classic)",
        max_slots: 4,
        slot_policy: SlotPolicy::Freeform,
        max_name_len: Some(20),
        ascii_name: true,
        default_amp: "twin57",
        amps: amp_table(true, true),
        effects: vec![
            effect(EffectType::Overdrive, 0x11, "Overdrive", OVERDRIVE_PARAMS),
            effect(EffectType::Fuzz, 0x12, "Fuzz", FUZZ_PARAMS),
            effect(EffectType::Compressor, 0x13, "Compressor", COMPRESSOR_PARAMS),
            effect(EffectType::Chorus, 0x21, "Chorus", CHORUS_PARAMS),
            effect(EffectType::Flanger, 0x22, "Flanger", FLANGER_PARAMS),
            effect(EffectType::Phaser, 0x23, "Phaser", PHASER_PARAMS),
            effect(EffectType::Tremolo, 0x24, "Tremolo", TREMOLO_PARAMS),
            effect(EffectType::TapeDelay, 0x31, "TapeDelay", TAPE_DELAY_PARAMS),
            effect(EffectType::EchoDelay, 0x32, "EchoDelay", ECHO_DELAY_PARAMS),
            effect(
                EffectType::SpringReverb,
                0x41,
                "SpringReverb",
                SPRING_REVERB_PARAMS,
            ),
            effect(EffectType::HallReverb, 0x42, "HallReverb", HALL_REVERB_PARAMS),
        ],
        amp_params: AMP_PARAMS,
        wire: WireFormat::ClassicBinary {
            magic: *b"FMPR",
            version: 0x01,
            checksum: Checksum::AdditiveU16,
        },
    }
}

/// Mustang LT schema: role-based chain (stomp-mod-amp-delay-reverb), Tone
/// JSON with unit-float parameters.
pub fn mustang_lt() -> FamilySchema {
    FamilySchema {
        tag: FamilyTag::MustangLt,
        display_name: "Mustang LT",
        max_slots: 4,
        slot_policy: SlotPolicy::RoleBased,
        max_name_len: Some(32),
        ascii_name: false,
        default_amp: "twin57",
        amps: amp_table(false, true),
        effects: vec![
            effect(EffectType::Overdrive, 0x11, "Overdrive", OVERDRIVE_PARAMS),
            effect(EffectType::Fuzz, 0x12, "Fuzz", FUZZ_PARAMS),
            effect(EffectType::Compressor, 0x13, "Compressor", COMPRESSOR_PARAMS),
            effect(EffectType::Chorus, 0x21, "Chorus", CHORUS_PARAMS),
            effect(EffectType::Flanger, 0x22, "Flanger", FLANGER_PARAMS),
            effect(EffectType::Phaser, 0x23, "Phaser", PHASER_PARAMS),
            effect(EffectType::Tremolo, 0x24, "Tremolo", TREMOLO_PARAMS),
            effect(EffectType::TapeDelay, 0x31, "TapeDelay", TAPE_DELAY_PARAMS),
            effect(
                EffectType::SpringReverb,
                0x41,
                "SpringReverb",
                SPRING_REVERB_PARAMS,
            ),
            effect(EffectType::HallReverb, 0x42, "HallReverb", HALL_REVERB_PARAMS),
        ],
        amp_params: AMP_PARAMS,
        wire: WireFormat::ToneJson {
            product_ids: &["mustang-lt"],
            fender_prefix: "DUBS_",
            params: ParamEncoding::Unit,
            layout: RoleLayout::StompModDelayReverb,
        },
    }
}

/// Rumble LT schema: bass range speaking the LT dialect, with an EQ role in
/// the chain (stomp-mod-amp-eq-delay) and no reverb.
pub fn rumble_lt() -> FamilySchema {
    FamilySchema {
        tag: FamilyTag::RumbleLt,
        display_name: "Rumble LT",
        max_slots: 4,
        slot_policy: SlotPolicy::RoleBased,
        max_name_len: Some(32),
        ascii_name: false,
        default_amp: "bassman59",
        amps: amp_table(false, false),
        effects: vec![
            effect(EffectType::Overdrive, 0x11, "Overdrive", OVERDRIVE_PARAMS),
            effect(EffectType::Fuzz, 0x12, "Fuzz", FUZZ_PARAMS),
            effect(EffectType::Compressor, 0x13, "Compressor", COMPRESSOR_PARAMS),
            effect(EffectType::Chorus, 0x21, "Chorus", CHORUS_PARAMS),
            effect(EffectType::Flanger, 0x22, "Flanger", FLANGER_PARAMS),
            effect(EffectType::Tremolo, 0x24, "Tremolo", TREMOLO_PARAMS),
            effect(EffectType::TapeDelay, 0x31, "TapeDelay", TAPE_DELAY_PARAMS),
            effect(EffectType::EchoDelay, 0x32, "EchoDelay", ECHO_DELAY_PARAMS),
            effect(EffectType::GraphicEq, 0x51, "GraphicEq", GRAPHIC_EQ_PARAMS),
        ],
        amp_params: AMP_PARAMS,
        wire: WireFormat::ToneJson {
            product_ids: &["rumble-lt"],
            fender_prefix: "DUBS_",
            params: ParamEncoding::Unit,
            layout: RoleLayout::StompModEqDelay,
        },
    }
}

/// Mustang Micro Plus schema: role-based chain, Tone JSON with byte-valued
/// parameters and a reduced effect set.
pub fn micro_plus() -> FamilySchema {
    FamilySchema {
        tag: FamilyTag::MicroPlus,
        display_name: "Mustang Micro Plus",
        max_slots: 4,
        slot_policy: SlotPolicy::RoleBased,
        max_name_len: Some(16),
        ascii_name: false,
        default_amp: "twin57",
        amps: amp_table(false, false),
        effects: vec![
            effect(EffectType::Overdrive, 0x11, "Overdrive", OVERDRIVE_PARAMS),
            effect(EffectType::Compressor, 0x13, "Compressor", COMPRESSOR_PARAMS),
            effect(EffectType::Chorus, 0x21, "Chorus", CHORUS_PARAMS),
            effect(EffectType::Flanger, 0x22, "Flanger", FLANGER_PARAMS),
            effect(EffectType::Phaser, 0x23, "Phaser", PHASER_PARAMS),
            effect(EffectType::Tremolo, 0x24, "Tremolo", TREMOLO_PARAMS),
            effect(
                EffectType::TapeDelay,
                0x31,
                "TapeDelay",
                TAPE_DELAY_PARAMS_MMP,
            ),
            effect(
                EffectType::SpringReverb,
                0x41,
                "SpringReverb",
                SPRING_REVERB_PARAMS,
            ),
        ],
        amp_params: AMP_PARAMS,
        wire: WireFormat::ToneJson {
            product_ids: &["mustang-micro-plus"],
            fender_prefix: "MMP_",
            params: ParamEncoding::Byte,
            layout: RoleLayout::StompModDelayReverb,
        },
    }
}
