use bevy::gltf::Gltf;
use bevy::prelude::*;
use pet_common::{ClipPicker, ClipPose, Sequencer, resolve_playlist};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

use super::PetPresentationConfig;
use super::assets::{TemplateCache, TemplateKey, TemplateState};
use super::clock::ActivePresentationClock;
use super::hierarchy::owner_subtree;
use super::types::{InstanceMaterials, MaterialOwner, PetInstance, PetRetiring};

/// Animation graph and named clips of one template.
#[derive(Debug, Clone)]
pub struct AnimationLibrary {
    pub graph: Handle<AnimationGraph>,
    clips: HashMap<String, (AnimationNodeIndex, f32)>,
}

impl AnimationLibrary {
    pub fn new(graph: Handle<AnimationGraph>) -> Self {
        Self {
            graph,
            clips: HashMap::new(),
        }
    }

    pub fn with_clip(mut self, name: impl Into<String>, node: AnimationNodeIndex, duration: f32) -> Self {
        self.clips.insert(name.into(), (node, duration));
        self
    }

    /// Graph node and duration in seconds.
    pub fn clip(&self, name: &str) -> Option<(AnimationNodeIndex, f32)> {
        self.clips.get(name).copied()
    }
}

#[derive(Resource, Debug, Default)]
pub struct AnimationLibraries {
    libraries: HashMap<TemplateKey, AnimationLibrary>,
}

impl AnimationLibraries {
    pub fn get(&self, key: TemplateKey) -> Option<&AnimationLibrary> {
        self.libraries.get(&key)
    }

    pub fn insert(&mut self, key: TemplateKey, library: AnimationLibrary) {
        self.libraries.insert(key, library);
    }
}

/// Source of gesture randomness. Seeded for recordings, entropy otherwise.
#[derive(Resource)]
pub struct PetRng(pub StdRng);

impl PetRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }
}

impl ClipPicker for PetRng {
    fn pick_index(&mut self, len: usize) -> usize {
        self.0.gen_range(0..len.max(1))
    }

    fn pick_cycles(&mut self, max: u32) -> u32 {
        self.0.gen_range(1..=max.max(1))
    }
}

/// Sequenced animation of one pet, bound to the player in its scene.
#[derive(Component)]
pub struct PetAnimation {
    pub player: Entity,
    /// Graph node per sequencer clip index.
    nodes: Vec<AnimationNodeIndex>,
    pub sequencer: Sequencer,
}

impl PetAnimation {
    pub fn nodes(&self) -> &[AnimationNodeIndex] {
        &self.nodes
    }
}

/// The pet has nothing to animate.
#[derive(Component, Debug, Default)]
pub struct PetAnimationUnavailable;

/// Build the base template's animation graph once its glTF is ready.
pub fn build_animation_libraries(
    cache: Res<TemplateCache>,
    mut libraries: ResMut<AnimationLibraries>,
    gltfs: Res<Assets<Gltf>>,
    clips: Res<Assets<AnimationClip>>,
    mut graphs: ResMut<Assets<AnimationGraph>>,
) {
    let key = TemplateKey::Pet;
    if libraries.get(key).is_some() {
        return;
    }
    let Some(entry) = cache.get(key) else {
        return;
    };
    if !matches!(entry.state, TemplateState::Ready { .. }) {
        return;
    }
    let Some(gltf) = gltfs.get(&entry.gltf) else {
        return;
    };

    let mut graph = AnimationGraph::new();
    let mut named = Vec::with_capacity(gltf.named_animations.len());
    for (name, handle) in &gltf.named_animations {
        let duration = clips.get(handle).map(AnimationClip::duration).unwrap_or(0.0);
        let node = graph.add_clip(handle.clone(), 1.0, graph.root);
        named.push((name.to_string(), node, duration));
    }

    info!(
        "animation library for '{}': {} clip(s)",
        entry.path,
        named.len()
    );

    let library = named.into_iter().fold(
        AnimationLibrary::new(graphs.add(graph)),
        |library, (name, node, duration)| library.with_clip(name, node, duration),
    );
    libraries.insert(key, library);
}

/// Attach the sequencer to each pet once its scene and library exist.
pub fn bind_pet_animations(
    mut commands: Commands,
    config: Res<PetPresentationConfig>,
    libraries: Res<AnimationLibraries>,
    clock: Res<ActivePresentationClock>,
    mut rng: ResMut<PetRng>,
    pets: Query<
        (Entity, &PetInstance),
        (
            With<InstanceMaterials>,
            Without<PetAnimation>,
            Without<PetAnimationUnavailable>,
            Without<PetRetiring>,
        ),
    >,
    owners: Query<(), With<MaterialOwner>>,
    children_query: Query<&Children>,
    players: Query<(), With<AnimationPlayer>>,
) {
    let Some(library) = libraries.get(TemplateKey::Pet) else {
        return;
    };

    for (pet, instance) in &pets {
        let nodes = owner_subtree(pet, &children_query, &owners);
        let Some(player) = nodes.into_iter().find(|&entity| players.contains(entity)) else {
            warn!("pet {:?} has no animation player", instance.record_id);
            commands.entity(pet).insert(PetAnimationUnavailable);
            continue;
        };

        let (clips, missing) = resolve_playlist(&config.playlist, |name| {
            library.clip(name).map(|(_, duration)| duration)
        });
        if !missing.is_empty() {
            warn!("template is missing clip(s) {missing:?}; skipping them");
        }
        let graph_nodes: Vec<AnimationNodeIndex> = clips
            .iter()
            .filter_map(|clip| library.clip(&clip.name).map(|(node, _)| node))
            .collect();

        let Some(mut sequencer) = Sequencer::new(clips, &config.default_clip, config.timing) else {
            warn!("pet {:?} has no playable clips", instance.record_id);
            commands.entity(pet).insert(PetAnimationUnavailable);
            continue;
        };

        let now = clock.now_secs();
        let started = match config.pinned_clip.as_deref() {
            Some(name) => sequencer
                .pin(name, now, &mut *rng)
                .or_else(|| sequencer.start(now, &mut *rng)),
            None => sequencer.start(now, &mut *rng),
        };
        if let Some(transition) = started {
            debug!(
                "pet {pet} starts with '{}'",
                sequencer.clips()[transition.to].name
            );
        }

        commands
            .entity(player)
            .insert(AnimationGraphHandle(library.graph.clone()));
        commands.entity(pet).insert(PetAnimation {
            player,
            nodes: graph_nodes,
            sequencer,
        });
    }
}

/// Advance every sequencer on the presentation clock and push the resulting
/// weights and clip times into its player.
pub fn drive_pet_animations(
    clock: Res<ActivePresentationClock>,
    mut rng: ResMut<PetRng>,
    mut pets: Query<(Entity, &mut PetAnimation), Without<PetRetiring>>,
    mut players: Query<&mut AnimationPlayer>,
) {
    let now = clock.now_secs();
    for (pet, mut animation) in &mut pets {
        if let Some(transition) = animation.sequencer.tick(now, &mut *rng) {
            debug!(
                "pet {pet}: {:?} -> '{}'",
                transition.from,
                animation.sequencer.clips()[transition.to].name
            );
        }

        let poses = animation.sequencer.pose(now);
        if let Ok(mut player) = players.get_mut(animation.player) {
            apply_pose(&mut player, &animation.nodes, &poses);
        }
    }
}

/// Play every posed clip at its weight and local time, stop the rest.
pub fn apply_pose(player: &mut AnimationPlayer, nodes: &[AnimationNodeIndex], poses: &[ClipPose]) {
    for (index, &node) in nodes.iter().enumerate() {
        match poses.iter().find(|pose| pose.clip == index) {
            Some(pose) => {
                player
                    .play(node)
                    .set_weight(pose.weight)
                    .seek_to(pose.local_time)
                    .pause();
            }
            None => {
                if player.is_playing_animation(node) {
                    player.stop(node);
                }
            }
        }
    }
}
