use crate::anatomy::SHELL_RESTING_OPACITY;
use bevy::math::Vec3;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShellPart {
    Head,
    Torso,
    Hips,
}

pub const SHELL_PARTS: [ShellPart; 3] = [ShellPart::Head, ShellPart::Torso, ShellPart::Hips];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShellShape {
    Sphere { radius: f32 },
    Frustum {
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
    },
}

impl ShellPart {
    pub fn label(self) -> &'static str {
        match self {
            Self::Head => "head",
            Self::Torso => "torso",
            Self::Hips => "hips",
        }
    }

    pub fn shape(self) -> ShellShape {
        match self {
            Self::Head => ShellShape::Sphere { radius: 1.3 },
            Self::Torso => ShellShape::Frustum {
                radius_top: 1.6,
                radius_bottom: 1.4,
                height: 4.5,
            },
            Self::Hips => ShellShape::Frustum {
                radius_top: 1.4,
                radius_bottom: 1.5,
                height: 2.5,
            },
        }
    }

    /// Rig-local center of the part.
    pub fn offset(self) -> Vec3 {
        match self {
            Self::Head => Vec3::new(0.0, 5.2, 0.0),
            Self::Torso => Vec3::new(0.0, 1.0, 0.0),
            Self::Hips => Vec3::new(0.0, -2.5, 0.0),
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Head => 0,
            Self::Torso => 1,
            Self::Hips => 2,
        }
    }
}

/// Translucent head/torso/hips reference. Only opacity ever changes.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyShell {
    opacity: [f32; 3],
}

impl Default for BodyShell {
    fn default() -> Self {
        Self {
            opacity: [SHELL_RESTING_OPACITY; 3],
        }
    }
}

impl BodyShell {
    pub fn opacity(&self, part: ShellPart) -> f32 {
        self.opacity[part.index()]
    }

    /// Returns the applied value, or `None` if `value` was NaN.
    pub fn set_part_opacity(&mut self, part: ShellPart, value: f32) -> Option<f32> {
        if value.is_nan() {
            warn!("ignoring NaN opacity for shell part {}", part.label());
            return None;
        }
        let clamped = value.clamp(0.0, 1.0);
        if clamped != value {
            warn!(
                "shell opacity {value} for {} is outside [0, 1], clamped to {clamped}",
                part.label()
            );
        }
        self.opacity[part.index()] = clamped;
        Some(clamped)
    }

    pub fn set_shell_opacity(&mut self, value: f32) -> Option<f32> {
        let mut applied = None;
        for part in SHELL_PARTS {
            applied = self.set_part_opacity(part, value);
        }
        applied
    }

    pub fn rest(&mut self) {
        self.opacity = [SHELL_RESTING_OPACITY; 3];
    }
}
