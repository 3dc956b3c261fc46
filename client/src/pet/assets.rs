//! Shared, read-only templates loaded once per asset path.

use bevy::asset::{AssetPath, LoadState};
use bevy::gltf::Gltf;
use bevy::prelude::*;
use pet_common::AccessoryKind;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKey {
    Pet,
    Accessory(AccessoryKind),
}

#[derive(Debug, Clone)]
pub enum TemplateState {
    Loading,
    Ready { scene: Handle<Scene> },
    Failed,
}

#[derive(Debug, Clone)]
pub struct TemplateEntry {
    pub path: String,
    pub gltf: Handle<Gltf>,
    pub state: TemplateState,
}

/// Template cache. Entries hold strong handles, so a template stays loaded
/// for as long as the cache does; instances never mutate it.
#[derive(Resource, Debug, Default)]
pub struct TemplateCache {
    pet_model_path: String,
    entries: HashMap<TemplateKey, TemplateEntry>,
}

impl TemplateCache {
    pub fn new(pet_model_path: impl Into<String>) -> Self {
        Self {
            pet_model_path: pet_model_path.into(),
            entries: HashMap::new(),
        }
    }

    pub fn path_for(&self, key: TemplateKey) -> String {
        match key {
            TemplateKey::Pet => self.pet_model_path.clone(),
            TemplateKey::Accessory(kind) => kind.model_path().to_string(),
        }
    }

    /// Start loading `key` unless it is already known.
    pub fn request(&mut self, key: TemplateKey, asset_server: &AssetServer) -> &TemplateEntry {
        let path = self.path_for(key);
        self.entries.entry(key).or_insert_with(|| {
            debug!("loading template {key:?} from '{path}'");
            TemplateEntry {
                gltf: asset_server.load(AssetPath::from(path.clone())),
                path,
                state: TemplateState::Loading,
            }
        })
    }

    pub fn get(&self, key: TemplateKey) -> Option<&TemplateEntry> {
        self.entries.get(&key)
    }

    pub fn ready_scene(&self, key: TemplateKey) -> Option<Handle<Scene>> {
        match &self.entries.get(&key)?.state {
            TemplateState::Ready { scene } => Some(scene.clone()),
            TemplateState::Loading | TemplateState::Failed => None,
        }
    }

    pub fn is_failed(&self, key: TemplateKey) -> bool {
        matches!(
            self.entries.get(&key).map(|entry| &entry.state),
            Some(TemplateState::Failed)
        )
    }

    /// Register an already available scene, bypassing the asset server.
    pub fn insert_ready(&mut self, key: TemplateKey, gltf: Handle<Gltf>, scene: Handle<Scene>) {
        let path = self.path_for(key);
        self.entries.insert(
            key,
            TemplateEntry {
                path,
                gltf,
                state: TemplateState::Ready { scene },
            },
        );
    }
}

/// Request the base template and every accessory up front.
pub fn preload_templates(mut cache: ResMut<TemplateCache>, asset_server: Res<AssetServer>) {
    cache.request(TemplateKey::Pet, &asset_server);
    for kind in AccessoryKind::ALL {
        cache.request(TemplateKey::Accessory(kind), &asset_server);
    }
}

/// Promote loading templates once the glTF and its dependencies are in.
pub fn poll_template_loads(
    mut cache: ResMut<TemplateCache>,
    asset_server: Res<AssetServer>,
    gltfs: Res<Assets<Gltf>>,
) {
    for entry in cache.entries.values_mut() {
        if !matches!(entry.state, TemplateState::Loading) {
            continue;
        }

        if let Some(LoadState::Failed(error)) = asset_server.get_load_state(&entry.gltf) {
            warn!("template '{}' failed to load: {error}", entry.path);
            entry.state = TemplateState::Failed;
            continue;
        }

        if !asset_server.is_loaded_with_dependencies(&entry.gltf) {
            continue;
        }

        let Some(gltf) = gltfs.get(&entry.gltf) else {
            continue;
        };

        match gltf.default_scene.clone().or_else(|| gltf.scenes.first().cloned()) {
            Some(scene) => {
                info!("template '{}' ready", entry.path);
                entry.state = TemplateState::Ready { scene };
            }
            None => {
                warn!("template '{}' has no scene", entry.path);
                entry.state = TemplateState::Failed;
            }
        }
    }
}
