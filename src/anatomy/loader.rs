use crate::anatomy::error::AnatomyError;
use crate::anatomy::normalize::{NormalizedOrgan, normalize};
use crate::anatomy::organs::{OrganId, OrganLoadRequest, OrganSpec, load_failure};
use crate::anatomy::raw_asset::{RawAsset, RawNode};
use crate::anatomy::session::LoadCompletion;
use bevy::asset::{LoadState, RecursiveDependencyLoadState};
use bevy::gltf::Gltf;
use bevy::mesh::VertexAttributeValues;
use bevy::prelude::*;
use crossbeam_channel::Sender;
use std::collections::HashMap;
use tracing::{debug, warn};

pub struct PendingOrgan {
    pub spec: &'static OrganSpec,
    pub gltf: Handle<Gltf>,
}

#[derive(Resource, Default)]
pub struct OrganLoads {
    /// Requests accepted by the session but not yet handed to the asset server.
    pub queued: Vec<OrganLoadRequest>,
    pub pending: Vec<PendingOrgan>,
    /// Scene to instantiate under each normalized organ's pivot.
    pub scenes: HashMap<OrganId, Handle<Scene>>,
    sender: Option<Sender<LoadCompletion>>,
}

impl OrganLoads {
    pub fn queue(&mut self, requests: Vec<OrganLoadRequest>, sender: Sender<LoadCompletion>) {
        self.sender = Some(sender);
        self.queued.extend(requests);
    }

    pub fn is_idle(&self) -> bool {
        self.queued.is_empty() && self.pending.is_empty()
    }

    fn start_queued(&mut self, asset_server: &AssetServer) {
        for request in std::mem::take(&mut self.queued) {
            debug!("requesting {} from {}", request.id(), request.spec.asset_path);
            self.pending.push(PendingOrgan {
                spec: request.spec,
                gltf: asset_server.load::<Gltf>(request.spec.asset_path),
            });
        }
    }

    fn send(&self, completion: LoadCompletion) {
        let Some(sender) = &self.sender else {
            warn!("no session queue for {} completion", completion.organ);
            return;
        };
        if sender.send(completion).is_err() {
            warn!("session queue closed, dropping organ completion");
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadProgress {
    Waiting,
    Failed(String),
    Loaded,
}

pub fn load_progress(
    state: Option<LoadState>,
    dependencies: Option<RecursiveDependencyLoadState>,
    loaded_with_dependencies: bool,
) -> LoadProgress {
    if let Some(LoadState::Failed(err)) = state {
        return LoadProgress::Failed(err.to_string());
    }
    if let Some(RecursiveDependencyLoadState::Failed(err)) = dependencies {
        return LoadProgress::Failed(format!("dependency failed: {err}"));
    }
    if loaded_with_dependencies {
        LoadProgress::Loaded
    } else {
        LoadProgress::Waiting
    }
}

pub fn poll_organ_loads(
    asset_server: Res<AssetServer>,
    gltfs: Res<Assets<Gltf>>,
    scenes: Res<Assets<Scene>>,
    meshes: Res<Assets<Mesh>>,
    mut loads: ResMut<OrganLoads>,
) {
    if loads.is_idle() {
        return;
    }
    loads.start_queued(&asset_server);

    let pending = std::mem::take(&mut loads.pending);
    for organ in pending {
        let id = organ.spec.id;
        let progress = load_progress(
            asset_server.get_load_state(&organ.gltf),
            asset_server.get_recursive_dependency_load_state(&organ.gltf),
            asset_server.is_loaded_with_dependencies(&organ.gltf),
        );

        let result = match progress {
            LoadProgress::Waiting => {
                loads.pending.push(organ);
                continue;
            }
            LoadProgress::Failed(reason) => Err(load_failure(id, reason)),
            LoadProgress::Loaded => gltfs
                .get(&organ.gltf)
                .ok_or_else(|| load_failure(id, "document vanished after loading"))
                .and_then(|gltf| scene_handle(gltf, id))
                .and_then(|handle| {
                    let scene = scenes
                        .get(&handle)
                        .ok_or_else(|| load_failure(id, "scene asset missing"))?;
                    let normalized = organ_from_scene(organ.spec, scene, &meshes)?;
                    Ok((handle, normalized))
                }),
        };

        let result = result.map(|(handle, normalized)| {
            loads.scenes.insert(id, handle);
            normalized
        });
        loads.send(LoadCompletion { organ: id, result });
    }
}

fn scene_handle(gltf: &Gltf, organ: OrganId) -> Result<Handle<Scene>, AnatomyError> {
    gltf.default_scene
        .clone()
        .or_else(|| gltf.scenes.first().cloned())
        .ok_or_else(|| load_failure(organ, "document has no scene"))
}

/// Measures and fits the scene that will be spawned under the organ's pivot.
pub fn organ_from_scene(
    spec: &OrganSpec,
    scene: &Scene,
    meshes: &Assets<Mesh>,
) -> Result<NormalizedOrgan, AnatomyError> {
    let raw = raw_asset_from_scene(spec.asset_path, spec.id, scene, meshes)?;
    normalize(spec.id, raw, spec.target_size, spec.placement)
}

/// Flattens the entities of a loaded scene into plain node data. Only what
/// the scene itself contains is measured.
pub fn raw_asset_from_scene(
    label: &str,
    organ: OrganId,
    scene: &Scene,
    meshes: &Assets<Mesh>,
) -> Result<RawAsset, AnatomyError> {
    let world = &scene.world;
    let entities: Vec<(Entity, Transform)> = match world.try_query::<(Entity, &Transform)>() {
        Some(mut query) => query
            .iter(world)
            .map(|(entity, transform)| (entity, *transform))
            .collect(),
        None => Vec::new(),
    };
    if entities.is_empty() {
        return Err(load_failure(organ, "scene has no nodes"));
    }

    let index_of: HashMap<Entity, usize> = entities
        .iter()
        .enumerate()
        .map(|(index, (entity, _))| (*entity, index))
        .collect();

    let mut raw = RawAsset::new(label);
    raw.nodes = entities
        .iter()
        .map(|(entity, transform)| RawNode {
            name: world.get::<Name>(*entity).map(|name| name.as_str().to_string()),
            transform: *transform,
            positions: world
                .get::<Mesh3d>(*entity)
                .and_then(|mesh| meshes.get(&mesh.0))
                .map(mesh_positions)
                .unwrap_or_default(),
            children: Vec::new(),
        })
        .collect();

    for (index, (entity, _)) in entities.iter().enumerate() {
        let parent = world
            .get::<ChildOf>(*entity)
            .and_then(|child_of| index_of.get(&child_of.parent()).copied());
        match parent.and_then(|parent| raw.nodes.get_mut(parent)) {
            Some(parent_node) => parent_node.children.push(index),
            None => raw.roots.push(index),
        }
    }
    Ok(raw)
}

fn mesh_positions(mesh: &Mesh) -> Vec<Vec3> {
    match mesh.attribute(Mesh::ATTRIBUTE_POSITION) {
        Some(VertexAttributeValues::Float32x3(positions)) => {
            positions.iter().copied().map(Vec3::from_array).collect()
        }
        _ => Vec::new(),
    }
}
