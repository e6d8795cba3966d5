use crate::anatomy::camera::{AnatomyCamera, OrbitCamera, OrbitInput, UiInteractionState};
use crate::anatomy::loader::OrganLoads;
use crate::anatomy::normalize::Emissive;
use crate::anatomy::organs::OrganId;
use crate::anatomy::render_loop::{FrameInput, RenderCommand, tick};
use crate::anatomy::session::AnatomySession;
use crate::anatomy::settings::ViewerConfig;
use crate::anatomy::shell::{SHELL_PARTS, ShellPart, ShellShape};
use bevy::camera::ClearColorConfig;
use bevy::camera::visibility::RenderLayers;
use bevy::input::mouse::{AccumulatedMouseMotion, AccumulatedMouseScroll};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::PrimaryEguiContext;
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Component)]
pub struct BodyRig;

#[derive(Component)]
pub struct ShellMesh(pub ShellPart);

#[derive(Component)]
pub struct OrganPivot(pub OrganId);

/// Mesh inside an organ's scene whose material has been cloned for tinting.
#[derive(Component)]
pub struct OrganSurface(pub OrganId);

#[derive(Resource, Default)]
pub struct SceneEntities {
    pub rig: Option<Entity>,
    pub shell_materials: HashMap<ShellPart, Handle<StandardMaterial>>,
    pub organ_pivots: HashMap<OrganId, Entity>,
    pub organ_materials: HashMap<OrganId, Vec<Handle<StandardMaterial>>>,
}

/// Commands produced by [`drive_render_loop`], applied by [`apply_render_commands`].
#[derive(Resource, Default)]
pub struct PendingRenderCommands(pub Vec<RenderCommand>);

pub fn setup_scene(mut commands: Commands, config: Res<ViewerConfig>, orbit: Res<OrbitCamera>) {
    let camera = &config.camera;
    let lighting = &config.lighting;

    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: camera.fov_degrees.to_radians(),
            near: camera.near,
            far: camera.far,
            ..default()
        }),
        orbit.transform(),
        AnatomyCamera,
    ));
    commands.spawn((
        Camera2d,
        Camera {
            order: 1,
            clear_color: ClearColorConfig::None,
            ..default()
        },
        RenderLayers::layer(31),
        PrimaryEguiContext,
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: lighting.directional_illuminance,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_translation(Vec3::from_array(lighting.directional_position))
            .looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let (r, g, b) = lighting.clear_color;
    commands.insert_resource(ClearColor(Color::srgb(r, g, b)));
    commands.insert_resource(GlobalAmbientLight {
        color: Color::WHITE,
        brightness: lighting.ambient_brightness,
        ..default()
    });
}

pub fn drive_render_loop(
    time: Res<Time<Real>>,
    mouse_motion: Res<AccumulatedMouseMotion>,
    mouse_scroll: Res<AccumulatedMouseScroll>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    ui_state: Res<UiInteractionState>,
    mut session: ResMut<AnatomySession>,
    mut orbit: ResMut<OrbitCamera>,
    mut pending: ResMut<PendingRenderCommands>,
) {
    let pointer_in_window = windows
        .single()
        .ok()
        .and_then(|w| w.cursor_position())
        .is_some();
    let can_capture_mouse = pointer_in_window && !ui_state.wants_pointer_input;

    let mut input = OrbitInput::default();
    if can_capture_mouse {
        if mouse_buttons.pressed(MouseButton::Left) {
            input.drag = mouse_motion.delta;
        }
        input.scroll = mouse_scroll.delta.y;
    }

    let frame = FrameInput {
        elapsed_secs: time.elapsed_secs_f64(),
        delta_secs: time.delta_secs(),
        orbit: input,
    };
    let commands = tick(&mut session, &mut orbit, &frame);
    pending.0.extend(commands);
}

pub fn apply_render_commands(
    mut commands: Commands,
    mut pending: ResMut<PendingRenderCommands>,
    session: Res<AnatomySession>,
    loads: Res<OrganLoads>,
    mut scene_entities: ResMut<SceneEntities>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut pivots: Query<&mut Transform, (With<OrganPivot>, Without<AnatomyCamera>)>,
    mut cameras: Query<&mut Transform, (With<AnatomyCamera>, Without<OrganPivot>)>,
) {
    for command in pending.0.drain(..) {
        match command {
            RenderCommand::SpawnRig => {
                if scene_entities.rig.is_some() {
                    continue;
                }
                let rig = commands
                    .spawn((
                        Name::new("body rig"),
                        BodyRig,
                        Transform::default(),
                        Visibility::default(),
                    ))
                    .id();
                for part in SHELL_PARTS {
                    let mesh = match part.shape() {
                        ShellShape::Sphere { radius } => meshes.add(Sphere::new(radius).mesh().uv(48, 24)),
                        ShellShape::Frustum {
                            radius_top,
                            radius_bottom,
                            height,
                        } => meshes.add(ConicalFrustum {
                            radius_top,
                            radius_bottom,
                            height,
                        }),
                    };
                    let material = materials.add(glass_material(session.shell().opacity(part)));
                    commands.spawn((
                        Name::new(format!("shell {}", part.label())),
                        ShellMesh(part),
                        Mesh3d(mesh),
                        MeshMaterial3d(material.clone()),
                        Transform::from_translation(part.offset()),
                        ChildOf(rig),
                    ));
                    scene_entities.shell_materials.insert(part, material);
                }
                scene_entities.rig = Some(rig);
            }
            RenderCommand::SpawnOrgan(organ) => {
                let Some(rig) = scene_entities.rig else {
                    warn!("cannot place {organ} before the rig exists");
                    continue;
                };
                let Some(entry) = session.registry().get(organ) else {
                    warn!("{organ} spawn requested but it is not registered");
                    continue;
                };
                let Some(scene) = loads.scenes.get(&organ) else {
                    warn!("{organ} has no scene to instantiate");
                    continue;
                };

                let pivot = commands
                    .spawn((
                        Name::new(format!("{organ} pivot")),
                        OrganPivot(organ),
                        entry.pivot,
                        Visibility::default(),
                        ChildOf(rig),
                    ))
                    .id();
                commands.spawn((
                    Name::new(format!("{organ} asset")),
                    SceneRoot(scene.clone()),
                    Transform::from_translation(entry.asset_offset),
                    ChildOf(pivot),
                ));
                scene_entities.organ_pivots.insert(organ, pivot);
            }
            RenderCommand::SetOrganScale { organ, scale } => {
                let Some(pivot) = scene_entities.organ_pivots.get(&organ) else {
                    continue;
                };
                if let Ok(mut transform) = pivots.get_mut(*pivot) {
                    transform.scale = Vec3::splat(scale);
                }
            }
            RenderCommand::SetOrganEmissive { organ, emissive } => {
                let Some(handles) = scene_entities.organ_materials.get(&organ) else {
                    continue;
                };
                for handle in handles {
                    if let Some(material) = materials.get_mut(handle) {
                        material.emissive = emissive.to_linear();
                    }
                }
            }
            RenderCommand::SetShellOpacity { part, opacity } => {
                let Some(handle) = scene_entities.shell_materials.get(&part) else {
                    continue;
                };
                if let Some(material) = materials.get_mut(handle) {
                    material.base_color = material.base_color.with_alpha(opacity);
                }
            }
            RenderCommand::Present { camera } => {
                for mut transform in &mut cameras {
                    *transform = camera;
                }
            }
        }
    }
}

/// Gives every mesh spawned under an organ pivot its own material so the
/// organ can be tinted without affecting shared glTF materials.
pub fn claim_organ_surfaces(
    mut commands: Commands,
    added: Query<
        (Entity, &MeshMaterial3d<StandardMaterial>),
        (Added<MeshMaterial3d<StandardMaterial>>, Without<OrganSurface>),
    >,
    parents: Query<&ChildOf>,
    pivots: Query<&OrganPivot>,
    session: Res<AnatomySession>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut scene_entities: ResMut<SceneEntities>,
) {
    for (entity, material) in &added {
        let Some(organ) = parents
            .iter_ancestors(entity)
            .find_map(|ancestor| pivots.get(ancestor).ok().map(|pivot| pivot.0))
        else {
            continue;
        };
        let Some(mut tinted) = materials.get(&material.0).cloned() else {
            continue;
        };

        let emissive = session
            .registry()
            .get(organ)
            .map(|entry| entry.emissive())
            .unwrap_or(Emissive::NEUTRAL);
        tinted.emissive = emissive.to_linear();

        let handle = materials.add(tinted);
        commands
            .entity(entity)
            .insert((MeshMaterial3d(handle.clone()), OrganSurface(organ)));
        scene_entities
            .organ_materials
            .entry(organ)
            .or_default()
            .push(handle);
        debug!("claimed surface {entity} for {organ}");
    }
}

fn glass_material(opacity: f32) -> StandardMaterial {
    StandardMaterial {
        base_color: Color::WHITE.with_alpha(opacity),
        metallic: 0.1,
        perceptual_roughness: 0.1,
        alpha_mode: AlphaMode::Blend,
        ..default()
    }
}
