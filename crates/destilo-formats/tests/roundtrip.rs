//! Wire-level properties across the built-in families.

use destilo_formats::{decode, encode};
use destilo_model::{AmpBlock, AmpModelId, Distillate, FamilyTag};
use destilo_schema::FamilyRegistry;
use proptest::prelude::*;

/// Build a valid classic record by hand: fixed header, twin amp, one
/// occupied slot, correct checksum.
fn classic_record(amp_words: [u16; 6], slot_code: u8, slot_words: [u16; 5]) -> Vec<u8> {
    let mut bytes = vec![0u8; 84];
    bytes[..4].copy_from_slice(b"FMPR");
    bytes[4] = 1;
    bytes[5..11].copy_from_slice(b"Fuzzed");
    bytes[25] = 117;
    for (i, word) in amp_words.iter().enumerate() {
        bytes[26 + 2 * i..28 + 2 * i].copy_from_slice(&word.to_le_bytes());
    }
    bytes[38] = slot_code;
    for (i, word) in slot_words.iter().enumerate() {
        bytes[39 + 2 * i..41 + 2 * i].copy_from_slice(&word.to_le_bytes());
    }
    for slot in 1..4 {
        let off = 38 + slot * 11;
        bytes[off] = 0;
        for p in 0..5 {
            bytes[off + 1 + 2 * p..off + 3 + 2 * p].copy_from_slice(&0xFFFFu16.to_le_bytes());
        }
    }
    let sum = bytes[..82]
        .iter()
        .fold(0u16, |acc, b| acc.wrapping_add(u16::from(*b)));
    bytes[82..84].copy_from_slice(&sum.to_le_bytes());
    bytes
}

#[test]
fn every_builtin_family_round_trips_a_minimal_preset() {
    let registry = FamilyRegistry::new();
    for schema in registry.iter() {
        let preset = Distillate::new("Minimal", schema.tag.clone())
            .with_amp(AmpBlock::new(AmpModelId::Canonical("twin57".into())));
        let (bytes, notes) = encode(&preset, schema).unwrap();
        assert!(notes.is_empty(), "{}: {notes:?}", schema.display_name);

        let (decoded, notes) = decode(&bytes, schema).unwrap();
        assert!(notes.is_empty(), "{}: {notes:?}", schema.display_name);
        assert_eq!(decoded.name, "Minimal");
        assert!(decoded.slots.is_empty());
        assert_eq!(
            decoded.amp.model,
            AmpModelId::Canonical("twin57".into()),
            "{}",
            schema.display_name
        );
    }
}

proptest! {
    /// Decoding never fails on parameter content: any parameter words,
    /// including the null sentinel and out-of-range values, decode to
    /// in-range values, and the result re-encodes without contract errors.
    #[test]
    fn classic_decode_is_total_over_parameter_words(
        amp_words in prop::array::uniform6(any::<u16>()),
        slot_words in prop::array::uniform5(any::<u16>()),
        code in prop::sample::select(vec![0x11u8, 0x13, 0x21, 0x31, 0x41]),
    ) {
        let registry = FamilyRegistry::new();
        let schema = registry.get(&FamilyTag::Classic).unwrap();
        let bytes = classic_record(amp_words, code, slot_words);

        let (preset, _notes) = decode(&bytes, schema).unwrap();
        for pv in preset.amp.params.values() {
            prop_assert!(pv.raw() >= pv.min && pv.raw() <= pv.max, "{pv:?}");
        }
        for slot in &preset.slots {
            for pv in slot.params.values() {
                prop_assert!(pv.raw() >= pv.min && pv.raw() <= pv.max, "{pv:?}");
            }
        }
        encode(&preset, schema).unwrap();
    }
}
