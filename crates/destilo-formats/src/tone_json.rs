//! Codec for the Tone-style JSON audio graph used by the LT, Rumble LT, and
//! Micro Plus families.
//!
//! A preset document looks like:
//!
//! ```json
//! {
//!   "nodeType": "preset",
//!   "version": "1.0",
//!   "info": { "displayName": "Clean Twin", "product_id": "mustang-lt" },
//!   "audioGraph": {
//!     "nodes": [ ... ],
//!     "connections": [ ... ]
//!   }
//! }
//! ```
//!
//! The graph always carries five nodes with fixed `nodeId`s in chain order.
//! Which roles those are is the family's [`RoleLayout`]: the Mustang ranges
//! run `stomp, mod, amp, delay, reverb`, Rumble LT runs `stomp, mod, amp,
//! eq, delay`. An unoccupied effect role holds a `Passthru` placeholder. The
//! `connections` array is redundant with the fixed chain; decoding checks it
//! is present and regenerates it on encode.
//!
//! The families speak the same dialect apart from the accepted product ids,
//! the FenderId prefix, the role layout, and the parameter value encoding
//! (unit floats vs. 0-255 integers). Effect nodes with a FenderId the
//! equivalence table does not know decode to an opaque blob holding the
//! serialized node, so they re-encode to the same family value-identically.

use crate::{DecodeError, EncodeError};
use destilo_model::{
    AmpBlock, AmpModelId, Distillate, EffectSlot, EffectType, LossNote, OpaqueBlob, ParamValue,
};
use destilo_schema::{EffectMapping, FamilySchema, ParamEncoding, ParamSpec, RoleLayout};
use serde_json::{Map, Value, json};

fn structure(msg: impl Into<String>) -> DecodeError {
    DecodeError::Structure(msg.into())
}

fn node_by_id<'a>(nodes: &'a [Value], id: &str) -> Result<&'a Map<String, Value>, DecodeError> {
    nodes
        .iter()
        .filter_map(Value::as_object)
        .find(|n| n.get("nodeId").and_then(Value::as_str) == Some(id))
        .ok_or_else(|| structure(format!("missing '{id}' node")))
}

fn fender_id(node: &Map<String, Value>) -> Result<&str, DecodeError> {
    node.get("FenderId")
        .and_then(Value::as_str)
        .ok_or_else(|| structure("node has no FenderId"))
}

/// Native JSON value to an unclamped normalized fraction.
fn value_to_norm(value: &Value, encoding: ParamEncoding) -> Result<f32, DecodeError> {
    let number = value
        .as_f64()
        .ok_or_else(|| structure("parameter value is not a number"))?;
    Ok(match encoding {
        ParamEncoding::Unit => number as f32,
        ParamEncoding::Byte => (number / 255.0) as f32,
    })
}

/// Normalized fraction to its native JSON value.
///
/// Unit floats are rounded to six decimals so that values which entered as
/// short decimals leave as the same short decimals.
fn norm_to_value(norm: f32, encoding: ParamEncoding) -> Value {
    let n = norm.clamp(0.0, 1.0);
    match encoding {
        ParamEncoding::Unit => Value::from((f64::from(n) * 1e6).round() / 1e6),
        ParamEncoding::Byte => Value::from(libm::roundf(n * 255.0) as i64),
    }
}

fn decode_param(
    name: &str,
    value: &Value,
    spec: Option<&ParamSpec>,
    encoding: ParamEncoding,
    slot: Option<usize>,
    notes: &mut Vec<LossNote>,
) -> Result<ParamValue, DecodeError> {
    let requested = value_to_norm(value, encoding)?;
    let (pv, adjusted) = match spec {
        Some(spec) => spec.from_normalized(requested),
        // Parameter names outside the equivalence table are retained with a
        // unit range so they survive a same-family round-trip.
        None => {
            let mut pv = ParamValue::unit(name, 0.0);
            let adjusted = pv.set_normalized(requested);
            (pv, adjusted)
        }
    };
    if adjusted {
        notes.push(LossNote::ValueClamped {
            slot,
            param: name.to_string(),
            requested,
            clamped: pv.normalized(),
        });
    }
    Ok(pv)
}

fn decode_params(
    node: &Map<String, Value>,
    specs: &[ParamSpec],
    encoding: ParamEncoding,
    slot: Option<usize>,
    notes: &mut Vec<LossNote>,
) -> Result<Vec<ParamValue>, DecodeError> {
    let Some(params) = node.get("dspUnitParameters") else {
        return Ok(Vec::new());
    };
    let params = params
        .as_object()
        .ok_or_else(|| structure("dspUnitParameters is not an object"))?;
    let mut out = Vec::with_capacity(params.len());
    for (name, value) in params {
        let spec = specs.iter().find(|s| s.name == name);
        out.push(decode_param(name, value, spec, encoding, slot, notes)?);
    }
    Ok(out)
}

fn encode_params(
    params: &std::collections::BTreeMap<String, ParamValue>,
    specs: &[ParamSpec],
    encoding: ParamEncoding,
    slot: Option<usize>,
    notes: &mut Vec<LossNote>,
) -> Map<String, Value> {
    let mut out = Map::new();
    for (name, pv) in params {
        let native = match specs.iter().find(|s| s.name == name) {
            Some(spec) => {
                let (native, clamped) = spec.value(pv.raw());
                if clamped {
                    notes.push(LossNote::ValueClamped {
                        slot,
                        param: name.clone(),
                        requested: pv.raw(),
                        clamped: native.raw(),
                    });
                }
                native
            }
            None => pv.clone(),
        };
        out.insert(name.clone(), norm_to_value(native.normalized(), encoding));
    }
    out
}

fn bounded_name(name: &str, max_len: Option<usize>) -> String {
    let Some(max) = max_len else {
        return name.to_string();
    };
    let mut out = String::with_capacity(max.min(name.len()));
    for c in name.chars() {
        if out.len() + c.len_utf8() > max {
            break;
        }
        out.push(c);
    }
    out
}

pub(crate) fn decode(
    bytes: &[u8],
    schema: &FamilySchema,
    product_ids: &'static [&'static str],
    fender_prefix: &'static str,
    encoding: ParamEncoding,
    layout: RoleLayout,
) -> Result<(Distillate, Vec<LossNote>), DecodeError> {
    let doc: Value = serde_json::from_slice(bytes)?;
    let root = doc
        .as_object()
        .ok_or_else(|| structure("document root is not an object"))?;
    if root.get("nodeType").and_then(Value::as_str) != Some("preset") {
        return Err(structure("nodeType is not 'preset'"));
    }
    let info = root
        .get("info")
        .and_then(Value::as_object)
        .ok_or_else(|| structure("missing info object"))?;
    let product = info
        .get("product_id")
        .and_then(Value::as_str)
        .ok_or_else(|| structure("missing info.product_id"))?;
    if !product_ids.contains(&product) {
        return Err(DecodeError::WrongProduct {
            expected: product_ids.join("|"),
            found: product.to_string(),
        });
    }
    let name = info
        .get("displayName")
        .and_then(Value::as_str)
        .ok_or_else(|| structure("missing info.displayName"))?;
    let graph = root
        .get("audioGraph")
        .and_then(Value::as_object)
        .ok_or_else(|| structure("missing audioGraph object"))?;
    let nodes = graph
        .get("nodes")
        .and_then(Value::as_array)
        .ok_or_else(|| structure("missing audioGraph.nodes array"))?;
    // Redundant with the fixed chain order; validated for presence only.
    graph
        .get("connections")
        .and_then(Value::as_array)
        .ok_or_else(|| structure("missing audioGraph.connections array"))?;

    let mut notes = Vec::new();

    let amp_node = node_by_id(nodes, "amp")?;
    let amp_fender = fender_id(amp_node)?;
    let model = match amp_fender
        .strip_prefix(fender_prefix)
        .and_then(|base| schema.amp_by_fender(base))
    {
        Some(mapping) => AmpModelId::Canonical(mapping.canonical.to_string()),
        None => AmpModelId::Foreign {
            family: schema.tag.clone(),
            code: amp_fender.to_string(),
        },
    };
    let mut amp = AmpBlock::new(model);
    for pv in decode_params(amp_node, schema.amp_params, encoding, None, &mut notes)? {
        amp.params.insert(pv.name.clone(), pv);
    }

    let mut distillate = Distillate::new(name, schema.tag.clone()).with_amp(amp);
    for &(role, category) in layout.effect_roles() {
        let node = node_by_id(nodes, role)?;
        let fender = fender_id(node)?;
        let base = fender.strip_prefix(fender_prefix);
        if base == Some("Passthru") {
            continue;
        }
        let index = distillate.slots.len();
        let slot = match base.and_then(|b| schema.effect_by_fender(b)) {
            Some(mapping) => {
                if mapping.effect.category() != Some(category) {
                    return Err(structure(format!(
                        "'{role}' node holds a {} effect",
                        mapping
                            .effect
                            .category()
                            .map_or("category-less", |c| c.name())
                    )));
                }
                let mut slot = EffectSlot::new(index, mapping.effect.clone());
                for pv in decode_params(node, mapping.params, encoding, Some(index), &mut notes)? {
                    slot.insert(pv);
                }
                slot
            }
            None => EffectSlot::new(
                index,
                EffectType::Opaque(OpaqueBlob {
                    family: schema.tag.clone(),
                    payload: serde_json::to_vec(&Value::Object(node.clone()))?,
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
        "decoded tone JSON preset"
    );
    Ok((distillate, notes))
}

fn effect_node(
    role: &'static str,
    mapping: &EffectMapping,
    slot: &EffectSlot,
    fender_prefix: &'static str,
    encoding: ParamEncoding,
    notes: &mut Vec<LossNote>,
) -> Value {
    let params = encode_params(&slot.params, mapping.params, encoding, Some(slot.index), notes);
    json!({
        "nodeId": role,
        "FenderId": format!("{fender_prefix}{}", mapping.fender_id),
        "dspUnitParameters": params,
    })
}

fn passthru_node(role: &'static str, fender_prefix: &'static str) -> Value {
    json!({
        "nodeId": role,
        "FenderId": format!("{fender_prefix}Passthru"),
        "dspUnitParameters": {},
    })
}

pub(crate) fn encode(
    distillate: &Distillate,
    schema: &FamilySchema,
    product_ids: &'static [&'static str],
    fender_prefix: &'static str,
    encoding: ParamEncoding,
    layout: RoleLayout,
) -> Result<(Vec<u8>, Vec<LossNote>), EncodeError> {
    distillate.validate()?;
    if distillate.slots.len() > schema.max_slots {
        return Err(EncodeError::UnsupportedChainLength {
            len: distillate.slots.len(),
            max: schema.max_slots,
        });
    }

    let mut notes = Vec::new();
    let roles = layout.effect_roles();

    // One node per chain role; placement is by effect category.
    let mut role_nodes: [Option<Value>; 4] = [None, None, None, None];
    for slot in &distillate.slots {
        let (position, node) = match &slot.effect {
            EffectType::Opaque(blob) => {
                if blob.family != schema.tag {
                    return Err(EncodeError::UnmappableEffectType {
                        slot: slot.index,
                        effect: slot.effect.to_string(),
                    });
                }
                let node: Value = serde_json::from_slice(&blob.payload)?;
                let role = node
                    .get("nodeId")
                    .and_then(Value::as_str)
                    .and_then(|id| roles.iter().position(|(r, _)| *r == id))
                    .ok_or_else(|| EncodeError::UnmappableEffectType {
                        slot: slot.index,
                        effect: slot.effect.to_string(),
                    })?;
                (role, node)
            }
            effect => {
                let mapping =
                    schema
                        .mapping_for(effect)
                        .ok_or_else(|| EncodeError::UnmappableEffectType {
                            slot: slot.index,
                            effect: effect.to_string(),
                        })?;
                let position = effect
                    .category()
                    .and_then(|c| layout.position(c))
                    .ok_or_else(|| EncodeError::UnmappableEffectType {
                        slot: slot.index,
                        effect: effect.to_string(),
                    })?;
                let node = effect_node(
                    roles[position].0,
                    mapping,
                    slot,
                    fender_prefix,
                    encoding,
                    &mut notes,
                );
                (position, node)
            }
        };
        if role_nodes[position].is_some() {
            return Err(EncodeError::SlotRoleConflict {
                slot: slot.index,
                role: roles[position].0.to_string(),
            });
        }
        role_nodes[position] = Some(node);
    }

    let amp_fender = match &distillate.amp.model {
        AmpModelId::Canonical(id) => {
            let mapping = schema
                .amp_by_canonical(id)
                .ok_or_else(|| EncodeError::UnmappableAmp { model: id.clone() })?;
            format!("{fender_prefix}{}", mapping.fender_id)
        }
        AmpModelId::Foreign { family, code } if *family == schema.tag => code.clone(),
        foreign => {
            return Err(EncodeError::UnmappableAmp {
                model: foreign.to_string(),
            });
        }
    };
    let amp_params = encode_params(
        &distillate.amp.params,
        schema.amp_params,
        encoding,
        None,
        &mut notes,
    );
    let amp_node = json!({
        "nodeId": "amp",
        "FenderId": amp_fender,
        "dspUnitParameters": amp_params,
    });

    // The amp node always sits third, between the second and third role.
    let mut nodes: Vec<Value> = role_nodes
        .into_iter()
        .enumerate()
        .map(|(i, node)| node.unwrap_or_else(|| passthru_node(roles[i].0, fender_prefix)))
        .collect();
    nodes.insert(2, amp_node);

    let chain = [
        "preset", roles[0].0, roles[1].0, "amp", roles[2].0, roles[3].0, "preset",
    ];
    let connections: Vec<Value> = chain
        .windows(2)
        .map(|pair| json!({ "input": { "nodeId": pair[0] }, "output": { "nodeId": pair[1] } }))
        .collect();

    let name = bounded_name(&distillate.name, schema.max_name_len);
    if name != distillate.name {
        notes.push(LossNote::NameTruncated {
            original: distillate.name.clone(),
            truncated: name.clone(),
        });
    }

    let doc = json!({
        "nodeType": "preset",
        "version": "1.0",
        "info": {
            "displayName": name,
            "product_id": product_ids.first().copied().unwrap_or_default(),
        },
        "audioGraph": {
            "nodes": nodes,
            "connections": connections,
        },
    });

    tracing::debug!(
        family = %schema.tag,
        name = %name,
        slots = distillate.slots.len(),
        notes = notes.len(),
        "encoded tone JSON preset"
    );
    Ok((serde_json::to_vec(&doc)?, notes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{decode as dispatch_decode, encode as dispatch_encode};
    use destilo_model::{FamilyTag, ScaleKind};
    use destilo_schema::{micro_plus, mustang_lt, rumble_lt};

    fn sample(source: FamilyTag) -> Distillate {
        Distillate::new("Clean Twin", source)
            .with_amp(
                AmpBlock::new(AmpModelId::Canonical("twin57".into()))
                    .with_param(ParamValue::unit("volume", 0.75))
                    .with_param(ParamValue::unit("treble", 0.5)),
            )
            .with_slot(
                EffectSlot::new(0, EffectType::Compressor)
                    .with_param(ParamValue::unit("level", 0.5))
                    .with_param(ParamValue::new("ratio", 4.0, 1.0, 8.0, ScaleKind::Stepped)),
            )
            .with_slot(
                EffectSlot::new(1, EffectType::SpringReverb)
                    .with_param(ParamValue::unit("level", 0.25))
                    .with_param(ParamValue::unit("decay", 0.5)),
            )
    }

    fn parse(bytes: &[u8]) -> Value {
        serde_json::from_slice(bytes).unwrap()
    }

    #[test]
    fn encode_builds_the_fixed_graph() {
        let schema = mustang_lt();
        let (bytes, notes) = dispatch_encode(&sample(FamilyTag::MustangLt), &schema).unwrap();
        assert!(notes.is_empty());

        let doc = parse(&bytes);
        assert_eq!(doc["nodeType"], "preset");
        assert_eq!(doc["info"]["product_id"], "mustang-lt");
        assert_eq!(doc["info"]["displayName"], "Clean Twin");

        let nodes = doc["audioGraph"]["nodes"].as_array().unwrap();
        let ids: Vec<&str> = nodes
            .iter()
            .map(|n| n["nodeId"].as_str().unwrap())
            .collect();
        assert_eq!(ids, ["stomp", "mod", "amp", "delay", "reverb"]);

        assert_eq!(nodes[0]["FenderId"], "DUBS_Compressor");
        assert_eq!(nodes[1]["FenderId"], "DUBS_Passthru");
        assert_eq!(nodes[2]["FenderId"], "DUBS_Twin57");
        assert_eq!(nodes[3]["FenderId"], "DUBS_Passthru");
        assert_eq!(nodes[4]["FenderId"], "DUBS_SpringReverb");

        assert_eq!(doc["audioGraph"]["connections"].as_array().unwrap().len(), 6);
        assert_eq!(nodes[2]["dspUnitParameters"]["volume"], 0.75);
    }

    #[test]
    fn micro_plus_encodes_byte_values() {
        let schema = micro_plus();
        let (bytes, _) = dispatch_encode(&sample(FamilyTag::MicroPlus), &schema).unwrap();
        let doc = parse(&bytes);
        let nodes = doc["audioGraph"]["nodes"].as_array().unwrap();
        assert_eq!(nodes[2]["FenderId"], "MMP_Twin57");
        assert_eq!(nodes[2]["dspUnitParameters"]["volume"], 191); // round(0.75 * 255)
        assert_eq!(nodes[4]["dspUnitParameters"]["decay"], 128);
    }

    #[test]
    fn roundtrip_is_value_identical() {
        for schema in [mustang_lt(), micro_plus()] {
            let preset = sample(schema.tag.clone());
            let (bytes, notes) = dispatch_encode(&preset, &schema).unwrap();
            assert!(notes.is_empty());

            let (decoded, notes) = dispatch_decode(&bytes, &schema).unwrap();
            assert!(notes.is_empty(), "{}: {notes:?}", schema.display_name);
            assert_eq!(decoded.name, "Clean Twin");
            assert_eq!(decoded.slots.len(), 2);
            assert_eq!(decoded.slots[0].effect, EffectType::Compressor);
            assert_eq!(decoded.slots[0].param("ratio").unwrap().raw(), 4.0);

            let (again, notes) = dispatch_encode(&decoded, &schema).unwrap();
            assert!(notes.is_empty());
            assert_eq!(parse(&again), parse(&bytes), "{}", schema.display_name);
        }
    }

    #[test]
    fn wrong_product_id_is_rejected() {
        let lt = mustang_lt();
        let mmp = micro_plus();
        let (bytes, _) = dispatch_encode(&sample(FamilyTag::MustangLt), &lt).unwrap();
        assert!(matches!(
            dispatch_decode(&bytes, &mmp).unwrap_err(),
            DecodeError::WrongProduct { .. }
        ));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let schema = mustang_lt();
        assert!(matches!(
            dispatch_decode(b"{not json", &schema).unwrap_err(),
            DecodeError::Json(_)
        ));
    }

    #[test]
    fn missing_nodes_are_rejected() {
        let schema = mustang_lt();
        let doc = json!({
            "nodeType": "preset",
            "info": { "displayName": "X", "product_id": "mustang-lt" },
            "audioGraph": { "nodes": [], "connections": [] },
        });
        let err = dispatch_decode(&serde_json::to_vec(&doc).unwrap(), &schema).unwrap_err();
        assert!(matches!(err, DecodeError::Structure(_)));
    }

    #[test]
    fn missing_connections_are_rejected() {
        let schema = mustang_lt();
        let (bytes, _) = dispatch_encode(&sample(FamilyTag::MustangLt), &schema).unwrap();
        let mut doc = parse(&bytes);
        doc["audioGraph"]
            .as_object_mut()
            .unwrap()
            .remove("connections");
        let err = dispatch_decode(&serde_json::to_vec(&doc).unwrap(), &schema).unwrap_err();
        assert!(matches!(err, DecodeError::Structure(_)));
    }

    #[test]
    fn unknown_fender_id_decodes_opaque_and_roundtrips() {
        let schema = mustang_lt();
        let (bytes, _) = dispatch_encode(&sample(FamilyTag::MustangLt), &schema).unwrap();
        let mut doc = parse(&bytes);
        doc["audioGraph"]["nodes"][1] = json!({
            "nodeId": "mod",
            "FenderId": "DUBS_Vibratone",
            "dspUnitParameters": { "speed": 0.6 },
        });
        let bytes = serde_json::to_vec(&doc).unwrap();

        let (decoded, notes) = dispatch_decode(&bytes, &schema).unwrap();
        assert!(notes.is_empty());
        assert_eq!(decoded.slots.len(), 3);
        assert!(decoded.slots[1].effect.is_opaque());

        let (again, notes) = dispatch_encode(&decoded, &schema).unwrap();
        assert!(notes.is_empty());
        assert_eq!(parse(&again), doc);
    }

    #[test]
    fn unknown_parameter_names_are_retained() {
        let schema = mustang_lt();
        let (bytes, _) = dispatch_encode(&sample(FamilyTag::MustangLt), &schema).unwrap();
        let mut doc = parse(&bytes);
        doc["audioGraph"]["nodes"][2]["dspUnitParameters"]["sag"] = json!(0.4);
        let bytes = serde_json::to_vec(&doc).unwrap();

        let (decoded, _) = dispatch_decode(&bytes, &schema).unwrap();
        assert_eq!(decoded.amp_param("sag").unwrap().raw(), 0.4);

        let (again, _) = dispatch_encode(&decoded, &schema).unwrap();
        assert_eq!(parse(&again)["audioGraph"]["nodes"][2]["dspUnitParameters"]["sag"], 0.4);
    }

    #[test]
    fn effect_in_the_wrong_role_is_rejected() {
        let schema = mustang_lt();
        let (bytes, _) = dispatch_encode(&sample(FamilyTag::MustangLt), &schema).unwrap();
        let mut doc = parse(&bytes);
        doc["audioGraph"]["nodes"][3]["FenderId"] = json!("DUBS_Chorus");
        let err =
            dispatch_decode(&serde_json::to_vec(&doc).unwrap(), &schema).unwrap_err();
        assert!(matches!(err, DecodeError::Structure(_)));
    }

    #[test]
    fn duplicate_roles_are_rejected_at_encode() {
        let schema = mustang_lt();
        let mut preset = sample(FamilyTag::MustangLt);
        preset.slots.push(EffectSlot::new(2, EffectType::Overdrive));
        assert!(matches!(
            dispatch_encode(&preset, &schema).unwrap_err(),
            EncodeError::SlotRoleConflict { slot: 2, .. }
        ));
    }

    #[test]
    fn out_of_range_values_clamp_with_a_note() {
        let schema = mustang_lt();
        let (bytes, _) = dispatch_encode(&sample(FamilyTag::MustangLt), &schema).unwrap();
        let mut doc = parse(&bytes);
        doc["audioGraph"]["nodes"][2]["dspUnitParameters"]["volume"] = json!(1.3);
        let bytes = serde_json::to_vec(&doc).unwrap();

        let (decoded, notes) = dispatch_decode(&bytes, &schema).unwrap();
        assert_eq!(decoded.amp_param("volume").unwrap().raw(), 1.0);
        assert!(notes.iter().any(|n| matches!(
            n,
            LossNote::ValueClamped { slot: None, param, .. } if param == "volume"
        )));
    }

    /// A Rumble LT document as its own encoder would emit it: the eq role
    /// sits between the amp and the delay, and there is no reverb node.
    fn rumble_doc() -> Value {
        json!({
            "nodeType": "preset",
            "version": "1.0",
            "info": { "displayName": "Bass Rig", "product_id": "rumble-lt" },
            "audioGraph": {
                "nodes": [
                    { "nodeId": "stomp", "FenderId": "DUBS_Overdrive",
                      "dspUnitParameters": { "gain": 0.5, "level": 0.6 } },
                    { "nodeId": "mod", "FenderId": "DUBS_Passthru",
                      "dspUnitParameters": {} },
                    { "nodeId": "amp", "FenderId": "DUBS_Bassman59",
                      "dspUnitParameters": { "bass": 0.7, "volume": 0.5 } },
                    { "nodeId": "eq", "FenderId": "DUBS_GraphicEq",
                      "dspUnitParameters": { "low": 0.8, "mid": 0.5 } },
                    { "nodeId": "delay", "FenderId": "DUBS_Passthru",
                      "dspUnitParameters": {} },
                ],
                "connections": [
                    { "input": { "nodeId": "preset" }, "output": { "nodeId": "stomp" } },
                    { "input": { "nodeId": "stomp" }, "output": { "nodeId": "mod" } },
                    { "input": { "nodeId": "mod" }, "output": { "nodeId": "amp" } },
                    { "input": { "nodeId": "amp" }, "output": { "nodeId": "eq" } },
                    { "input": { "nodeId": "eq" }, "output": { "nodeId": "delay" } },
                    { "input": { "nodeId": "delay" }, "output": { "nodeId": "preset" } },
                ],
            },
        })
    }

    #[test]
    fn rumble_documents_decode_with_the_eq_layout() {
        let schema = rumble_lt();
        let doc = rumble_doc();
        let bytes = serde_json::to_vec(&doc).unwrap();

        let (decoded, notes) = dispatch_decode(&bytes, &schema).unwrap();
        assert!(notes.is_empty(), "{notes:?}");
        assert_eq!(decoded.name, "Bass Rig");
        assert_eq!(decoded.amp.model, AmpModelId::Canonical("bassman59".into()));
        assert_eq!(decoded.slots.len(), 2);
        assert_eq!(decoded.slots[0].effect, EffectType::Overdrive);
        assert_eq!(decoded.slots[1].effect, EffectType::GraphicEq);
        assert_eq!(decoded.slots[1].param("low").unwrap().raw(), 0.8);

        let (again, notes) = dispatch_encode(&decoded, &schema).unwrap();
        assert!(notes.is_empty());
        assert_eq!(parse(&again), doc);
    }

    #[test]
    fn rumble_and_mustang_products_do_not_cross_decode() {
        let rumble = rumble_lt();
        let lt = mustang_lt();

        let bytes = serde_json::to_vec(&rumble_doc()).unwrap();
        assert!(matches!(
            dispatch_decode(&bytes, &lt).unwrap_err(),
            DecodeError::WrongProduct { .. }
        ));

        let (bytes, _) = dispatch_encode(&sample(FamilyTag::MustangLt), &lt).unwrap();
        assert!(matches!(
            dispatch_decode(&bytes, &rumble).unwrap_err(),
            DecodeError::WrongProduct { .. }
        ));
    }

    #[test]
    fn reverb_has_no_role_on_the_rumble_chain() {
        let schema = rumble_lt();
        let preset = Distillate::new("No Verb", FamilyTag::RumbleLt)
            .with_amp(AmpBlock::new(AmpModelId::Canonical("bassman59".into())))
            .with_slot(EffectSlot::new(0, EffectType::SpringReverb));
        assert!(matches!(
            dispatch_encode(&preset, &schema).unwrap_err(),
            EncodeError::UnmappableEffectType { slot: 0, .. }
        ));
    }

    #[test]
    fn non_contiguous_chains_are_rejected() {
        let schema = mustang_lt();
        let mut preset = Distillate::new("Gap", FamilyTag::MustangLt)
            .with_amp(AmpBlock::new(AmpModelId::Canonical("twin57".into())));
        preset.slots.push(EffectSlot::new(3, EffectType::Chorus));
        assert!(matches!(
            dispatch_encode(&preset, &schema).unwrap_err(),
            EncodeError::MalformedChain(_)
        ));
    }

    #[test]
    fn long_names_are_truncated_with_a_note() {
        let schema = micro_plus(); // 16-byte name limit
        let mut preset = sample(FamilyTag::MicroPlus);
        preset.name = "A rather wordy preset name".into();
        let (bytes, notes) = dispatch_encode(&preset, &schema).unwrap();
        assert_eq!(parse(&bytes)["info"]["displayName"], "A rather wordy p");
        assert!(notes.iter().any(|n| matches!(n, LossNote::NameTruncated { .. })));
    }
}
