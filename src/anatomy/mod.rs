pub mod bounds;
pub mod camera;
pub mod dosha;
pub mod error;
pub mod loader;
pub mod normalize;
pub mod organs;
pub mod raw_asset;
pub mod registry;
pub mod render_loop;
pub mod scene;
pub mod session;
pub mod settings;
pub mod shell;
pub mod ui;
pub mod viewer;

use bevy::color::Color;

pub const CONFIG_PATH: &str = "config/anatomy_viewer.ron";

/// Opacity every shell part returns to on a dosha reset.
pub const SHELL_RESTING_OPACITY: f32 = 0.2;

pub const NEUTRAL_EMISSIVE_HEX: u32 = 0x222222;
pub const VATA_HEX: u32 = 0x3399FF;
pub const PITTA_HEX: u32 = 0xFF3333;
pub const KAPHA_HEX: u32 = 0x33FF99;
pub const HIGHLIGHT_INTENSITY: f32 = 0.8;

/// `1 + sin(t * rate) * amplitude`, t in seconds.
pub const PULSE_ANGULAR_RATE: f64 = 5.0;
pub const PULSE_AMPLITUDE: f32 = 0.05;

/// Anything at or below this is treated as a zero-sized asset.
pub const DEGENERATE_EXTENT_EPSILON: f32 = 1e-6;

pub const fn hex_color(hex: u32) -> Color {
    Color::srgb(
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    )
}
