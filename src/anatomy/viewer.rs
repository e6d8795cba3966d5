use crate::anatomy::CONFIG_PATH;
use crate::anatomy::camera::{OrbitCamera, UiInteractionState};
use crate::anatomy::dosha::DoshaSelection;
use crate::anatomy::loader::{OrganLoads, poll_organ_loads};
use crate::anatomy::scene::{
    PendingRenderCommands, SceneEntities, apply_render_commands, claim_organ_surfaces,
    drive_render_loop, setup_scene,
};
use crate::anatomy::session::AnatomySession;
use crate::anatomy::settings::load_viewer_config_or_default;
use crate::anatomy::ui::{
    ViewerStatus, auto_enter, keyboard_shortcuts, on_enter_model_view, on_select_dosha, ui_system,
};
use anyhow::{Context, bail};
use bevy::prelude::*;
use bevy::window::{PresentMode, Window, WindowPlugin};
use bevy_egui::{EguiPlugin, EguiPrimaryContextPass};
use std::path::PathBuf;

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct LaunchOptions {
    pub config_path: PathBuf,
    pub auto_enter: bool,
    pub initial_selection: Option<DoshaSelection>,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(CONFIG_PATH),
            auto_enter: true,
            initial_selection: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    Run(LaunchOptions),
    Help,
}

pub fn parse_cli_options<I>(args: I) -> anyhow::Result<CliCommand>
where
    I: IntoIterator<Item = String>,
{
    let mut options = LaunchOptions::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let value = args.next().context("--config expects a path")?;
                options.config_path = PathBuf::from(value);
            }
            "--dosha" | "-d" => {
                let value = args.next().context("--dosha expects vata, pitta, kapha or reset")?;
                let selection = value
                    .parse::<DoshaSelection>()
                    .with_context(|| format!("invalid --dosha value {value:?}"))?;
                options.initial_selection = Some(selection);
            }
            "--no-auto-enter" => options.auto_enter = false,
            "--help" | "-h" => return Ok(CliCommand::Help),
            _ => bail!("unknown option: {arg}"),
        }
    }

    if options.initial_selection.is_some() && !options.auto_enter {
        bail!("--dosha needs the model view; drop --no-auto-enter");
    }

    Ok(CliCommand::Run(options))
}

pub fn print_help() {
    println!(
        "Usage:\n  tridosha [options]\n\nOptions:\n  -c, --config <path>     Viewer config (default {CONFIG_PATH})\n  -d, --dosha <name>      Select vata, pitta, kapha or reset after entering\n      --no-auto-enter     Wait for M or the panel button before loading organs\n  -h, --help              Show this help"
    );
}

pub fn run() -> anyhow::Result<()> {
    let options = match parse_cli_options(std::env::args().skip(1))? {
        CliCommand::Run(options) => options,
        CliCommand::Help => {
            print_help();
            return Ok(());
        }
    };

    let config = load_viewer_config_or_default(&options.config_path);
    let window = config.window.clone();
    let orbit = OrbitCamera::from_settings(&config.camera);

    App::new()
        .insert_resource(config)
        .insert_resource(options)
        .insert_resource(orbit)
        .insert_resource(AnatomySession::default())
        .insert_resource(OrganLoads::default())
        .insert_resource(SceneEntities::default())
        .insert_resource(PendingRenderCommands::default())
        .insert_resource(UiInteractionState::default())
        .insert_resource(ViewerStatus::default())
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: window.title,
                resolution: (window.width, window.height).into(),
                present_mode: PresentMode::AutoVsync,
                ..Default::default()
            }),
            ..Default::default()
        }))
        .add_plugins(EguiPlugin::default())
        .add_observer(on_enter_model_view)
        .add_observer(on_select_dosha)
        .add_systems(Startup, (setup_scene, auto_enter).chain())
        .add_systems(
            Update,
            (
                keyboard_shortcuts,
                poll_organ_loads,
                drive_render_loop,
                apply_render_commands,
                claim_organ_surfaces,
            )
                .chain(),
        )
        .add_systems(EguiPrimaryContextPass, ui_system)
        .run();

    Ok(())
}
