use bevy::asset::AssetPlugin;
use bevy::ecs::system::RunSystemOnce;
use bevy::gltf::{Gltf, GltfMaterialName};
use bevy::prelude::*;

use pet_gallery::pet::animation::PetAnimationUnavailable;
use pet_gallery::pet::{
    ActivePresentationClock, AnimationLibraries, AnimationLibrary, PetAnimation, PetAppearance,
    PetFactory, PetModel, PetPresentationConfig, PetPresentationPlugin, PetRng, TemplateCache,
    TemplateKey,
};

struct Nodes {
    graph: Handle<AnimationGraph>,
    sit: AnimationNodeIndex,
    walk: AnimationNodeIndex,
}

fn test_app(config: PetPresentationConfig, with_wag: bool) -> (App, Nodes) {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, AssetPlugin::default()))
        .init_asset::<StandardMaterial>()
        .init_asset::<Gltf>()
        .init_asset::<AnimationClip>()
        .init_asset::<AnimationGraph>()
        .add_plugins(PetPresentationPlugin {
            config,
            preload: false,
        })
        .insert_resource(ActivePresentationClock::progress(1_000, 1_000.0))
        .insert_resource(PetRng::seeded(5));

    app.world_mut()
        .resource_mut::<TemplateCache>()
        .insert_ready(TemplateKey::Pet, Handle::default(), Handle::default());

    let mut graph = AnimationGraph::new();
    let sit = graph.add_clip(Handle::<AnimationClip>::default(), 1.0, graph.root);
    let wag = graph.add_clip(Handle::<AnimationClip>::default(), 1.0, graph.root);
    let walk = graph.add_clip(Handle::<AnimationClip>::default(), 1.0, graph.root);
    let graph = app
        .world_mut()
        .resource_mut::<Assets<AnimationGraph>>()
        .add(graph);

    let mut library = AnimationLibrary::new(graph.clone())
        .with_clip("sit", sit, 2.0)
        .with_clip("walkloop", walk, 0.5);
    if with_wag {
        library = library.with_clip("wag", wag, 1.0);
    }
    app.world_mut()
        .resource_mut::<AnimationLibraries>()
        .insert(TemplateKey::Pet, library);

    (app, Nodes { graph, sit, walk })
}

/// Spawn a pet whose model holds an animation player and one mesh.
fn spawn_animated_pet(app: &mut App, with_player: bool) -> (Entity, Option<Entity>) {
    let pet = app
        .world_mut()
        .run_system_once(|mut commands: Commands, config: Res<PetPresentationConfig>| {
            PetFactory::spawn(
                &mut commands,
                &config,
                PetAppearance::default(),
                None,
                Transform::default(),
            )
        })
        .unwrap();
    app.update();

    let mut models = app.world_mut().query::<(Entity, &PetModel)>();
    let model = models
        .iter(app.world())
        .find(|(_, model)| model.pet == pet)
        .map(|(entity, _)| entity)
        .expect("pet model spawned");

    let material = app
        .world_mut()
        .resource_mut::<Assets<StandardMaterial>>()
        .add(StandardMaterial::default());
    let root = app
        .world_mut()
        .spawn((Name::new("Armature"), Transform::default(), ChildOf(model)))
        .id();
    if with_player {
        app.world_mut().entity_mut(root).insert(AnimationPlayer::default());
    }
    app.world_mut().spawn((
        Name::new("Body"),
        MeshMaterial3d(material),
        GltfMaterialName("coat".to_string()),
        Transform::default(),
        ChildOf(root),
    ));
    app.update();
    (pet, with_player.then_some(root))
}

fn current_clip(app: &App, pet: Entity) -> String {
    app.world()
        .get::<PetAnimation>(pet)
        .and_then(|animation| animation.sequencer.current_clip())
        .map(|clip| clip.name.clone())
        .expect("current clip")
}

fn player(app: &App, entity: Entity) -> &AnimationPlayer {
    app.world().get::<AnimationPlayer>(entity).expect("player")
}

#[test]
fn sequencer_binds_to_the_scene_player() {
    let (mut app, nodes) = test_app(PetPresentationConfig::default(), true);
    let (pet, player_entity) = spawn_animated_pet(&mut app, true);
    let player_entity = player_entity.unwrap();

    assert_eq!(
        app.world()
            .get::<AnimationGraphHandle>(player_entity)
            .map(|handle| handle.0.id()),
        Some(nodes.graph.id())
    );
    let animation = app.world().get::<PetAnimation>(pet).expect("bound");
    assert_eq!(animation.player, player_entity);
    assert_eq!(animation.sequencer.clips().len(), 3);
    assert_eq!(current_clip(&app, pet), "sit");
    assert!(animation.sequencer.deadline().is_some());
}

#[test]
fn default_clip_fades_in_and_holds_its_time() {
    let (mut app, nodes) = test_app(PetPresentationConfig::default(), true);
    let (_, player_entity) = spawn_animated_pet(&mut app, true);
    let player_entity = player_entity.unwrap();
    app.update();

    let sit = player(&app, player_entity)
        .animation(nodes.sit)
        .expect("sit is playing");
    assert!((sit.weight() - 1.0).abs() < 1e-5);
    assert!((sit.seek_time() - 1.0).abs() < 1e-4);
}

#[test]
fn finished_clip_hands_over_and_stops() {
    let (mut app, nodes) = test_app(PetPresentationConfig::default(), true);
    let (pet, player_entity) = spawn_animated_pet(&mut app, true);
    let player_entity = player_entity.unwrap();

    let mut switched = false;
    for _ in 0..6 {
        app.update();
        if current_clip(&app, pet) != "sit" {
            switched = true;
            break;
        }
    }
    assert!(switched, "sit never ended");

    app.update();
    assert!(!player(&app, player_entity).is_playing_animation(nodes.sit));
    let animation = app.world().get::<PetAnimation>(pet).expect("bound");
    let current = animation.sequencer.current_index().expect("current");
    assert!(player(&app, player_entity).is_playing_animation(animation.nodes()[current]));
}

#[test]
fn clips_missing_from_the_model_are_skipped() {
    let (mut app, _) = test_app(PetPresentationConfig::default(), false);
    let (pet, _) = spawn_animated_pet(&mut app, true);

    let animation = app.world().get::<PetAnimation>(pet).expect("bound");
    let names: Vec<&str> = animation
        .sequencer
        .clips()
        .iter()
        .map(|clip| clip.name.as_str())
        .collect();
    assert_eq!(names, vec!["sit", "walkloop"]);
    assert_eq!(animation.nodes().len(), 2);
}

#[test]
fn pinned_clip_never_schedules_a_change() {
    let config = PetPresentationConfig {
        pinned_clip: Some("walkloop".to_string()),
        ..PetPresentationConfig::default()
    };
    let (mut app, nodes) = test_app(config, true);
    let (pet, player_entity) = spawn_animated_pet(&mut app, true);
    let player_entity = player_entity.unwrap();

    for _ in 0..8 {
        app.update();
    }
    assert_eq!(current_clip(&app, pet), "walkloop");
    assert!(
        app.world()
            .get::<PetAnimation>(pet)
            .is_some_and(|animation| animation.sequencer.deadline().is_none())
    );
    assert!(player(&app, player_entity).is_playing_animation(nodes.walk));
}

#[test]
fn pet_without_player_is_marked_unavailable() {
    let (mut app, _) = test_app(PetPresentationConfig::default(), true);
    let (pet, _) = spawn_animated_pet(&mut app, false);

    assert!(app.world().get::<PetAnimation>(pet).is_none());
    assert!(app.world().get::<PetAnimationUnavailable>(pet).is_some());
}
