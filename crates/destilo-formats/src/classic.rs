//! Codec for the classic-series fixed-layout binary record.
//!
//! One preset is exactly 84 bytes, little-endian throughout:
//!
//! | offset | size | field |
//! |-------:|-----:|-------|
//! | 0      | 4    | magic |
//! | 4      | 1    | layout version |
//! | 5      | 20   | preset name, NUL-padded ASCII |
//! | 25     | 1    | amp DSP module id |
//! | 26     | 12   | six amp parameter words |
//! | 38     | 44   | four slot blocks, 11 bytes each |
//! | 82     | 2    | additive checksum over bytes 0..82 |
//!
//! A slot block is a module id byte followed by five parameter words. Module
//! id `0x00` marks an empty slot; its parameter words must all be the null
//! sentinel. Parameter words map `0x0300..=0xFF00` linearly onto the
//! normalized range; `0xFFFF` means "parameter absent".
//!
//! Slots with a module id the equivalence table does not know decode to an
//! opaque blob holding the raw 11-byte block, so they re-encode to the same
//! family byte-for-byte.

use crate::{DecodeError, EncodeError};
use destilo_model::{
    AmpBlock, AmpModelId, Distillate, EffectSlot, EffectType, LossNote, OpaqueBlob, ParamValue,
};
use destilo_schema::{Checksum, FamilySchema, ParamSpec};

const RECORD_LEN: usize = 84;
const NAME_OFF: usize = 5;
const NAME_LEN: usize = 20;
const AMP_CODE_OFF: usize = 25;
const AMP_PARAMS_OFF: usize = 26;
const SLOTS_OFF: usize = 38;
const SLOT_LEN: usize = 11;
const SLOT_COUNT: usize = 4;
const PARAMS_PER_SLOT: usize = 5;
const CHECKSUM_OFF: usize = 82;

const FUSE_MIN: u16 = 0x0300;
const FUSE_MAX: u16 = 0xFF00;
const FUSE_NULL: u16 = 0xFFFF;
const FUSE_SPAN: f32 = (FUSE_MAX - FUSE_MIN) as f32;

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn write_u16(bytes: &mut [u8], offset: usize, value: u16) {
    bytes[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

fn additive_checksum(bytes: &[u8]) -> u16 {
    bytes
        .iter()
        .fold(0u16, |acc, b| acc.wrapping_add(u16::from(*b)))
}

/// Wire word to unclamped normalized fraction. `None` is the null sentinel.
fn word_to_norm(word: u16) -> Option<f32> {
    if word == FUSE_NULL {
        return None;
    }
    Some((f32::from(word) - f32::from(FUSE_MIN)) / FUSE_SPAN)
}

fn norm_to_word(norm: f32) -> u16 {
    let n = norm.clamp(0.0, 1.0);
    FUSE_MIN + libm::roundf(n * FUSE_SPAN) as u16
}

fn decode_param(
    word: u16,
    spec: &ParamSpec,
    slot: Option<usize>,
    notes: &mut Vec<LossNote>,
) -> Option<ParamValue> {
    let requested = word_to_norm(word)?;
    let (pv, adjusted) = spec.from_normalized(requested);
    if adjusted {
        notes.push(LossNote::ValueClamped {
            slot,
            param: spec.name.to_string(),
            requested,
            clamped: pv.normalized(),
        });
    }
    Some(pv)
}

fn encode_param(
    value: Option<&ParamValue>,
    spec: &ParamSpec,
    slot: Option<usize>,
    notes: &mut Vec<LossNote>,
) -> u16 {
    let Some(pv) = value else {
        return FUSE_NULL;
    };
    let (native, clamped) = spec.value(pv.raw());
    if clamped {
        notes.push(LossNote::ValueClamped {
            slot,
            param: spec.name.to_string(),
            requested: pv.raw(),
            clamped: native.raw(),
        });
    }
    norm_to_word(native.normalized())
}

fn decode_name(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

fn sanitize_name(name: &str, max_len: usize) -> String {
    let mut out = String::with_capacity(max_len);
    for c in name.chars() {
        if out.len() == max_len {
            break;
        }
        out.push(if c.is_ascii_graphic() || c == ' ' { c } else { '_' });
    }
    out
}

pub(crate) fn decode(
    bytes: &[u8],
    schema: &FamilySchema,
    magic: [u8; 4],
    version: u8,
    checksum: Checksum,
) -> Result<(Distillate, Vec<LossNote>), DecodeError> {
    if bytes.len() != RECORD_LEN {
        return Err(DecodeError::BadLength {
            expected: RECORD_LEN,
            actual: bytes.len(),
        });
    }
    let found = [bytes[0], bytes[1], bytes[2], bytes[3]];
    if found != magic {
        return Err(DecodeError::BadMagic {
            expected: magic,
            found,
        });
    }
    if bytes[4] != version {
        return Err(DecodeError::UnsupportedVersion(bytes[4]));
    }
    if checksum == Checksum::AdditiveU16 {
        let expected = additive_checksum(&bytes[..CHECKSUM_OFF]);
        let stored = read_u16(bytes, CHECKSUM_OFF);
        if expected != stored {
            return Err(DecodeError::ChecksumMismatch {
                expected,
                found: stored,
            });
        }
    }

    let mut notes = Vec::new();
    let name = decode_name(&bytes[NAME_OFF..NAME_OFF + NAME_LEN]);

    let amp_code = bytes[AMP_CODE_OFF];
    let model = match schema.amp_by_code(amp_code) {
        Some(mapping) => AmpModelId::Canonical(mapping.canonical.to_string()),
        None => AmpModelId::Foreign {
            family: schema.tag.clone(),
            code: amp_code.to_string(),
        },
    };
    let mut amp = AmpBlock::new(model);
    for (i, spec) in schema.amp_params.iter().enumerate() {
        let word = read_u16(bytes, AMP_PARAMS_OFF + 2 * i);
        if let Some(pv) = decode_param(word, spec, None, &mut notes) {
            amp.params.insert(pv.name.clone(), pv);
        }
    }

    let mut distillate = Distillate::new(name, schema.tag.clone()).with_amp(amp);
    let mut seen_empty = false;
    for wire_slot in 0..SLOT_COUNT {
        let off = SLOTS_OFF + wire_slot * SLOT_LEN;
        let block = &bytes[off..off + SLOT_LEN];
        let code = block[0];
        if code == 0 {
            for p in 0..PARAMS_PER_SLOT {
                if read_u16(block, 1 + 2 * p) != FUSE_NULL {
                    return Err(DecodeError::Structure(format!(
                        "empty slot {wire_slot} carries parameter data"
                    )));
                }
            }
            seen_empty = true;
            continue;
        }
        if seen_empty {
            return Err(DecodeError::Structure(format!(
                "slot {wire_slot} is occupied but follows an empty slot"
            )));
        }
        let index = distillate.slots.len();
        let slot = match schema.effect_by_code(code) {
            Some(mapping) => {
                let mut slot = EffectSlot::new(index, mapping.effect.clone());
                for (p, spec) in mapping.params.iter().enumerate() {
                    let word = read_u16(block, 1 + 2 * p);
                    if let Some(pv) = decode_param(word, spec, Some(index), &mut notes) {
                        slot.insert(pv);
                    }
                }
                slot
            }
            None => EffectSlot::new(
                index,
                EffectType::Opaque(OpaqueBlob {
                    family: schema.tag.clone(),
                    payload: block.to_vec(),
                }),
            ),
        };
        distillate.slots.push(slot);
    }

    tracing::debug!(
        family = %schema.tag,
        name = %distillate.name,
        slots = distillate.slots.len(),
        notes = notes.len(),
        "decoded classic binary preset"
    );
    Ok((distillate, notes))
}

pub(crate) fn encode(
    distillate: &Distillate,
    schema: &FamilySchema,
    magic: [u8; 4],
    version: u8,
    checksum: Checksum,
) -> Result<(Vec<u8>, Vec<LossNote>), EncodeError> {
    // Slot blocks are addressed by `slot.index`, so the contiguity invariant
    // must hold before anything is written.
    distillate.validate()?;
    let max = schema.max_slots.min(SLOT_COUNT);
    if distillate.slots.len() > max {
        return Err(EncodeError::UnsupportedChainLength {
            len: distillate.slots.len(),
            max,
        });
    }

    let mut notes = Vec::new();
    let mut out = vec![0u8; RECORD_LEN];
    out[..4].copy_from_slice(&magic);
    out[4] = version;

    let name = sanitize_name(&distillate.name, NAME_LEN);
    if name != distillate.name {
        notes.push(LossNote::NameTruncated {
            original: distillate.name.clone(),
            truncated: name.clone(),
        });
    }
    out[NAME_OFF..NAME_OFF + name.len()].copy_from_slice(name.as_bytes());

    let amp_code = match &distillate.amp.model {
        AmpModelId::Canonical(id) => schema
            .amp_by_canonical(id)
            .map(|m| m.code)
            .ok_or_else(|| EncodeError::UnmappableAmp { model: id.clone() })?,
        AmpModelId::Foreign { family, code } if *family == schema.tag => {
            code.parse::<u8>().map_err(|_| EncodeError::UnmappableAmp {
                model: distillate.amp.model.to_string(),
            })?
        }
        foreign => {
            return Err(EncodeError::UnmappableAmp {
                model: foreign.to_string(),
            });
        }
    };
    out[AMP_CODE_OFF] = amp_code;
    for (i, spec) in schema.amp_params.iter().enumerate() {
        let word = encode_param(distillate.amp.params.get(spec.name), spec, None, &mut notes);
        write_u16(&mut out, AMP_PARAMS_OFF + 2 * i, word);
    }

    // Unoccupied slot blocks stay empty with null parameter words.
    for wire_slot in 0..SLOT_COUNT {
        let off = SLOTS_OFF + wire_slot * SLOT_LEN;
        out[off] = 0;
        for p in 0..PARAMS_PER_SLOT {
            write_u16(&mut out, off + 1 + 2 * p, FUSE_NULL);
        }
    }
    for slot in &distillate.slots {
        let off = SLOTS_OFF + slot.index * SLOT_LEN;
        match &slot.effect {
            EffectType::Opaque(blob) => {
                if blob.family != schema.tag || blob.payload.len() != SLOT_LEN {
                    return Err(EncodeError::UnmappableEffectType {
                        slot: slot.index,
                        effect: slot.effect.to_string(),
                    });
                }
                out[off..off + SLOT_LEN].copy_from_slice(&blob.payload);
            }
            effect => {
                let mapping =
                    schema
                        .mapping_for(effect)
                        .ok_or_else(|| EncodeError::UnmappableEffectType {
                            slot: slot.index,
                            effect: effect.to_string(),
                        })?;
                out[off] = mapping.code;
                for (p, spec) in mapping.params.iter().enumerate() {
                    let word =
                        encode_param(slot.params.get(spec.name), spec, Some(slot.index), &mut notes);
                    write_u16(&mut out, off + 1 + 2 * p, word);
                }
            }
        }
    }

    if checksum == Checksum::AdditiveU16 {
        let sum = additive_checksum(&out[..CHECKSUM_OFF]);
        write_u16(&mut out, CHECKSUM_OFF, sum);
    }

    tracing::debug!(
        family = %schema.tag,
        name = %name,
        slots = distillate.slots.len(),
        notes = notes.len(),
        "encoded classic binary preset"
    );
    Ok((out, notes))
}
