use bevy::gltf::GltfExtras;
use bevy::prelude::*;
use pet_common::NodeSlot;
use std::collections::VecDeque;

use super::types::MaterialOwner;

/// Breadth-first walk of `root`'s subtree that does not descend into nested
/// material owners. `root` itself is always included.
pub fn owner_subtree(
    root: Entity,
    children_query: &Query<&Children>,
    owners: &Query<(), With<MaterialOwner>>,
) -> Vec<Entity> {
    let mut result = Vec::new();
    let mut queue = VecDeque::from([root]);
    while let Some(entity) = queue.pop_front() {
        if entity != root && owners.contains(entity) {
            continue;
        }
        result.push(entity);
        if let Ok(children) = children_query.get(entity) {
            queue.extend(children.iter());
        }
    }
    result
}

/// Semantic slot declared in a node's glTF extras (`{"slot": "head"}`).
pub fn slot_tag(extras: &GltfExtras) -> Option<NodeSlot> {
    let value: serde_json::Value = serde_json::from_str(&extras.value).ok()?;
    value.get("slot")?.as_str().and_then(NodeSlot::from_tag)
}

/// First node in `nodes` for `slot`, preferring explicit tags over legacy
/// name matches.
pub fn find_slot(
    slot: NodeSlot,
    nodes: &[Entity],
    names: &Query<&Name>,
    extras: &Query<&GltfExtras>,
    excluded: impl Fn(Entity) -> bool,
) -> Option<Entity> {
    let candidates = || nodes.iter().copied().filter(|&entity| !excluded(entity));
    candidates()
        .find(|&entity| extras.get(entity).ok().and_then(slot_tag) == Some(slot))
        .or_else(|| {
            candidates().find(|&entity| {
                names
                    .get(entity)
                    .is_ok_and(|name| slot.matches_legacy_name(name.as_str()))
            })
        })
}

/// Every node in `nodes` for `slot`. Tagged nodes win when any exist.
pub fn find_all_slots(
    slot: NodeSlot,
    nodes: &[Entity],
    names: &Query<&Name>,
    extras: &Query<&GltfExtras>,
) -> Vec<Entity> {
    let tagged: Vec<Entity> = nodes
        .iter()
        .copied()
        .filter(|&entity| extras.get(entity).ok().and_then(slot_tag) == Some(slot))
        .collect();
    if !tagged.is_empty() {
        return tagged;
    }
    nodes
        .iter()
        .copied()
        .filter(|&entity| {
            names
                .get(entity)
                .is_ok_and(|name| slot.matches_legacy_name(name.as_str()))
        })
        .collect()
}
