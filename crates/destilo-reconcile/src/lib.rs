//! Reconciliation: narrowing a distillate to fit a target family.
//!
//! Decoders are generous (anything the source family can say ends up in the
//! distillate) and encoders are strict (they refuse chains the target cannot
//! hold). Reconciliation sits between the two: it takes any well-formed
//! distillate and produces one the target family's encoder is guaranteed to
//! accept, reporting every drop and substitution through [`LossNote`]s.
//!
//! The policy is deliberately blunt. An effect the target cannot express is
//! dropped, never swapped for a "closest match"; the one substitution ever
//! made is the amp model, because every family requires an amp. Slots are
//! judged in chain order against their *incoming* index:
//!
//! 1. a slot whose index is at or past the target's budget is dropped
//!    (`SlotDropped`);
//! 2. a slot holding an effect the target cannot express (including opaque
//!    material from another family) is dropped (`EffectDropped`);
//! 3. in a role-based target, a slot whose category is already occupied is
//!    dropped, keeping the earliest (`SlotDropped`);
//! 4. survivors are reindexed contiguously from zero.
//!
//! Reconciliation is idempotent: feeding its output back in with the same
//! target yields the same distillate and no notes.

mod pipeline;

pub use pipeline::{Conversion, ConvertError, convert};

use destilo_model::{AmpBlock, AmpModelId, Distillate, EffectType, LossNote};
use destilo_schema::FamilySchema;

fn conform_name(name: &str, target: &FamilySchema) -> String {
    let max = target.max_name_len.unwrap_or(usize::MAX);
    let mut out = String::new();
    for c in name.chars() {
        let c = if target.ascii_name && !(c.is_ascii_graphic() || c == ' ') {
            '_'
        } else {
            c
        };
        if out.len() + c.len_utf8() > max {
            break;
        }
        out.push(c);
    }
    out
}

/// Whether the target family can express this slot's effect at all.
fn expressible(effect: &EffectType, target: &FamilySchema) -> bool {
    match effect {
        EffectType::Opaque(blob) => blob.family == target.tag,
        known => target.supports(known),
    }
}

/// Narrow a distillate so the target family's encoder accepts it.
///
/// Never fails: anything the target cannot take is dropped or substituted,
/// and every such decision is reported in the returned notes, in chain
/// order for slots.
pub fn reconcile(preset: &Distillate, target: &FamilySchema) -> (Distillate, Vec<LossNote>) {
    let mut notes = Vec::new();

    let name = conform_name(&preset.name, target);
    if name != preset.name {
        notes.push(LossNote::NameTruncated {
            original: preset.name.clone(),
            truncated: name.clone(),
        });
    }

    let model = match &preset.amp.model {
        AmpModelId::Canonical(id) if target.amp_by_canonical(id).is_some() => {
            preset.amp.model.clone()
        }
        AmpModelId::Foreign { family, .. } if *family == target.tag => preset.amp.model.clone(),
        other => {
            let default = target.default_amp.to_string();
            notes.push(LossNote::AmpSubstituted {
                from: other.to_string(),
                to: default.clone(),
            });
            AmpModelId::Canonical(default)
        }
    };
    let mut amp = AmpBlock::new(model);
    amp.params = preset.amp.params.clone();

    let mut out = Distillate::new(name, preset.source.clone()).with_amp(amp);
    let mut occupied = Vec::new();
    for slot in &preset.slots {
        if slot.index >= target.max_slots {
            notes.push(LossNote::SlotDropped {
                slot: slot.index,
                effect: slot.effect.to_string(),
            });
            continue;
        }
        if !expressible(&slot.effect, target) {
            notes.push(LossNote::EffectDropped {
                slot: slot.index,
                effect: slot.effect.to_string(),
            });
            continue;
        }
        if target.is_role_based()
            && let Some(category) = slot.effect.category()
        {
            if occupied.contains(&category) {
                notes.push(LossNote::SlotDropped {
                    slot: slot.index,
                    effect: slot.effect.to_string(),
                });
                continue;
            }
            occupied.push(category);
        }
        let mut kept = slot.clone();
        kept.index = out.slots.len();
        out.slots.push(kept);
    }

    tracing::debug!(
        source = %preset.source,
        target = %target.tag,
        kept = out.slots.len(),
        dropped = preset.slots.len() - out.slots.len(),
        notes = notes.len(),
        "reconciled preset"
    );
    (out, notes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use destilo_model::{EffectSlot, FamilyTag, OpaqueBlob, ParamValue};
    use destilo_schema::{classic, micro_plus, mustang_lt};

    /// A three-slot freeform family with no chorus.
    fn small_target() -> FamilySchema {
        let mut schema = classic();
        schema.tag = FamilyTag::Custom("trio".into());
        schema.display_name = "Trio";
        schema.max_slots = 3;
        schema.effects.retain(|m| m.effect != EffectType::Chorus);
        schema
    }

    fn four_slot_chain() -> Distillate {
        Distillate::new("Big Board", FamilyTag::Classic)
            .with_amp(AmpBlock::new(AmpModelId::Canonical("twin57".into())))
            .with_slot(EffectSlot::new(0, EffectType::Overdrive))
            .with_slot(EffectSlot::new(1, EffectType::Chorus))
            .with_slot(EffectSlot::new(2, EffectType::TapeDelay))
            .with_slot(EffectSlot::new(3, EffectType::SpringReverb))
    }

    #[test]
    fn unmappable_and_overflow_drops_are_kept_apart() {
        let target = small_target();
        let (result, notes) = reconcile(&four_slot_chain(), &target);

        let kept: Vec<&EffectType> = result.slots.iter().map(|s| &s.effect).collect();
        assert_eq!(kept, [&EffectType::Overdrive, &EffectType::TapeDelay]);
        assert_eq!(result.slots[0].index, 0);
        assert_eq!(result.slots[1].index, 1);

        assert_eq!(
            notes,
            vec![
                LossNote::EffectDropped {
                    slot: 1,
                    effect: "chorus".into(),
                },
                LossNote::SlotDropped {
                    slot: 3,
                    effect: "spring_reverb".into(),
                },
            ]
        );
    }

    #[test]
    fn reconcile_is_idempotent() {
        let target = small_target();
        let (once, notes) = reconcile(&four_slot_chain(), &target);
        assert!(!notes.is_empty());

        let (twice, notes) = reconcile(&once, &target);
        assert!(notes.is_empty(), "second pass must be clean: {notes:?}");
        assert_eq!(twice, once);
    }

    #[test]
    fn role_based_targets_keep_the_earliest_of_a_category() {
        let target = mustang_lt();
        let preset = Distillate::new("Stacked", FamilyTag::Classic)
            .with_amp(AmpBlock::new(AmpModelId::Canonical("twin57".into())))
            .with_slot(EffectSlot::new(0, EffectType::Overdrive))
            .with_slot(EffectSlot::new(1, EffectType::Compressor))
            .with_slot(EffectSlot::new(2, EffectType::Phaser));

        let (result, notes) = reconcile(&preset, &target);
        assert_eq!(result.slots.len(), 2);
        assert_eq!(result.slots[0].effect, EffectType::Overdrive);
        assert_eq!(result.slots[1].effect, EffectType::Phaser);
        assert_eq!(
            notes,
            vec![LossNote::SlotDropped {
                slot: 1,
                effect: "compressor".into(),
            }]
        );
    }

    #[test]
    fn unknown_amp_is_substituted_with_the_target_default() {
        let target = micro_plus();
        let preset = Distillate::new("Studio", FamilyTag::Classic).with_amp(AmpBlock::new(
            AmpModelId::Canonical("studio_preamp".into()),
        ));

        let (result, notes) = reconcile(&preset, &target);
        assert_eq!(result.amp.model, AmpModelId::Canonical("twin57".into()));
        assert_eq!(
            notes,
            vec![LossNote::AmpSubstituted {
                from: "studio_preamp".into(),
                to: "twin57".into(),
            }]
        );
    }

    #[test]
    fn foreign_amp_survives_a_same_family_target() {
        let target = classic();
        let foreign = AmpModelId::Foreign {
            family: FamilyTag::Classic,
            code: "217".into(),
        };
        let preset =
            Distillate::new("Mystery", FamilyTag::Classic).with_amp(AmpBlock::new(foreign.clone()));

        let (result, notes) = reconcile(&preset, &target);
        assert_eq!(result.amp.model, foreign);
        assert!(notes.is_empty());
    }

    #[test]
    fn opaque_material_only_survives_its_own_family() {
        let blob = EffectType::Opaque(OpaqueBlob {
            family: FamilyTag::Classic,
            payload: vec![0x7E; 11],
        });
        let preset = Distillate::new("Odd", FamilyTag::Classic)
            .with_amp(AmpBlock::new(AmpModelId::Canonical("twin57".into())))
            .with_slot(EffectSlot::new(0, blob.clone()));

        let (kept, notes) = reconcile(&preset, &classic());
        assert_eq!(kept.slots[0].effect, blob);
        assert!(notes.is_empty());

        let (dropped, notes) = reconcile(&preset, &mustang_lt());
        assert!(dropped.slots.is_empty());
        assert_eq!(
            notes,
            vec![LossNote::EffectDropped {
                slot: 0,
                effect: "opaque(classic)".into(),
            }]
        );
    }

    #[test]
    fn names_are_conformed_to_the_target() {
        let target = classic(); // 20 ASCII bytes
        let mut preset = Distillate::new("Très long préset name over budget", FamilyTag::MustangLt)
            .with_amp(AmpBlock::new(AmpModelId::Canonical("twin57".into())));
        preset.amp.params.insert(
            "volume".into(),
            ParamValue::unit("volume", 0.5),
        );

        let (result, notes) = reconcile(&preset, &target);
        assert_eq!(result.name.len(), 20);
        assert!(result.name.is_ascii());
        assert!(notes.iter().any(|n| matches!(n, LossNote::NameTruncated { .. })));
        assert_eq!(result.amp_param("volume").unwrap().raw(), 0.5);
    }
}
