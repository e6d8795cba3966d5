use crate::anatomy::camera::{OrbitCamera, OrbitInput};
use crate::anatomy::normalize::Emissive;
use crate::anatomy::organs::OrganId;
use crate::anatomy::session::AnatomySession;
use crate::anatomy::shell::ShellPart;
use crate::anatomy::{PULSE_AMPLITUDE, PULSE_ANGULAR_RATE};
use bevy::transform::components::Transform;

#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    SpawnRig,
    SpawnOrgan(OrganId),
    SetOrganScale { organ: OrganId, scale: f32 },
    SetOrganEmissive { organ: OrganId, emissive: Emissive },
    SetShellOpacity { part: ShellPart, opacity: f32 },
    /// Always last in a frame.
    Present { camera: Transform },
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    /// Wall-clock seconds since start.
    pub elapsed_secs: f64,
    pub delta_secs: f32,
    pub orbit: OrbitInput,
}

pub fn pulse_multiplier(elapsed_secs: f64) -> f32 {
    1.0 + (elapsed_secs * PULSE_ANGULAR_RATE).sin() as f32 * PULSE_AMPLITUDE
}

/// Runs one frame. Returns nothing until the model view has been entered.
pub fn tick(
    session: &mut AnatomySession,
    camera: &mut OrbitCamera,
    frame: &FrameInput,
) -> Vec<RenderCommand> {
    if !session.is_active() {
        return Vec::new();
    }

    session.drain_completions();
    let camera_pose = camera.update(&frame.orbit, frame.delta_secs);

    if let Some(organ) = session.current_dosha().pulse_target() {
        let multiplier = pulse_multiplier(frame.elapsed_secs);
        if let Some(entry) = session.registry_mut().get_mut(organ) {
            let scale = entry.ensure_baseline() * multiplier;
            entry.set_uniform_scale(scale);
            session.push_command(RenderCommand::SetOrganScale { organ, scale });
        }
    }

    let mut commands = session.take_render_commands();
    commands.push(RenderCommand::Present {
        camera: camera_pose,
    });
    commands
}
