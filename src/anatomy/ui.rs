use crate::anatomy::camera::{OrbitCamera, UiInteractionState};
use crate::anatomy::dosha::{DOSHA_ORDER, Dosha, DoshaSelection};
use crate::anatomy::loader::OrganLoads;
use crate::anatomy::session::{AnatomySession, LoadStatus, ViewEntry};
use crate::anatomy::shell::ShellPart;
use crate::anatomy::viewer::LaunchOptions;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::{EguiContexts, egui};
use tracing::{error, info};

/// Entry point A, raised by the panel, the keyboard or at startup.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct EnterModelView;

/// Entry point B.
#[derive(Event, Debug, Clone, Copy)]
pub struct SelectDosha(pub DoshaSelection);

/// Text shown at the bottom of the panel.
#[derive(Resource, Debug, Default)]
pub struct ViewerStatus {
    pub message: String,
}

pub fn on_enter_model_view(
    _trigger: On<EnterModelView>,
    windows: Query<Entity, With<PrimaryWindow>>,
    mut session: ResMut<AnatomySession>,
    mut loads: ResMut<OrganLoads>,
    mut status: ResMut<ViewerStatus>,
) {
    let surface = windows.iter().next();
    match session.enter_model_view(surface) {
        Ok(ViewEntry::Started(requests)) => {
            status.message = format!("Loading {} organs", requests.len());
            loads.queue(requests, session.completion_sender());
        }
        Ok(ViewEntry::AlreadyActive) => {}
        Err(err) => {
            error!("model view unavailable: {err}");
            status.message = format!("Model view unavailable: {err}");
        }
    }
}

pub fn on_select_dosha(
    trigger: On<SelectDosha>,
    mut session: ResMut<AnatomySession>,
    mut status: ResMut<ViewerStatus>,
) {
    let SelectDosha(selection) = *trigger.event();
    if !session.select(selection) {
        status.message = "Open the model view first".to_string();
        return;
    }
    status.message = match selection {
        DoshaSelection::Reset => "Reset".to_string(),
        DoshaSelection::Dosha(dosha) => format!("{} selected", dosha.label()),
    };
}

pub fn keyboard_shortcuts(
    keys: Res<ButtonInput<KeyCode>>,
    ui_state: Res<UiInteractionState>,
    mut commands: Commands,
) {
    if ui_state.wants_keyboard_input {
        return;
    }
    if keys.just_pressed(KeyCode::KeyM) {
        commands.trigger(EnterModelView);
    }
    let selection = if keys.just_pressed(KeyCode::Digit1) {
        Some(DoshaSelection::Dosha(Dosha::Vata))
    } else if keys.just_pressed(KeyCode::Digit2) {
        Some(DoshaSelection::Dosha(Dosha::Pitta))
    } else if keys.just_pressed(KeyCode::Digit3) {
        Some(DoshaSelection::Dosha(Dosha::Kapha))
    } else if keys.just_pressed(KeyCode::Digit0) || keys.just_pressed(KeyCode::KeyR) {
        Some(DoshaSelection::Reset)
    } else {
        None
    };
    if let Some(selection) = selection {
        commands.trigger(SelectDosha(selection));
    }
}

pub fn ui_system(
    mut contexts: EguiContexts,
    mut commands: Commands,
    mut session: ResMut<AnatomySession>,
    mut ui_state: ResMut<UiInteractionState>,
    mut orbit: ResMut<OrbitCamera>,
    status: Res<ViewerStatus>,
) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    egui::SidePanel::left("tridosha_controls")
        .resizable(true)
        .default_width(260.0)
        .show(ctx, |ui| {
            ui.heading("Dosha");

            if !session.is_active() {
                if ui.button("Open Model").clicked() {
                    commands.trigger(EnterModelView);
                }
                ui.small("M opens the model view.");
            }

            ui.separator();
            let active = session.is_active();
            ui.add_enabled_ui(active, |ui| {
                ui.horizontal_wrapped(|ui| {
                    for dosha in DOSHA_ORDER {
                        let selected = session.current_dosha() == dosha;
                        if ui.selectable_label(selected, dosha.label()).clicked() {
                            commands.trigger(SelectDosha(DoshaSelection::Dosha(dosha)));
                        }
                    }
                    if ui.button("Reset").clicked() {
                        commands.trigger(SelectDosha(DoshaSelection::Reset));
                    }
                });
            });
            ui.small("Keys: 1 vata, 2 pitta, 3 kapha, 0/R reset.");

            ui.separator();
            ui.heading("Organs");
            for (organ, load_status) in session.organ_summary() {
                let text = match load_status {
                    None => "not requested".to_string(),
                    Some(LoadStatus::Pending) => "loading".to_string(),
                    Some(LoadStatus::Ready) => "ready".to_string(),
                    Some(LoadStatus::Failed) => session
                        .load_error(organ)
                        .map(|err| format!("failed: {err}"))
                        .unwrap_or_else(|| "failed".to_string()),
                };
                ui.label(format!("{}: {text}", organ.label()));
            }

            ui.separator();
            ui.heading("Body");
            let mut opacity = session.shell().opacity(ShellPart::Torso);
            if ui
                .add(egui::Slider::new(&mut opacity, 0.0..=1.0).text("Shell opacity"))
                .changed()
            {
                session.set_shell_opacity(opacity);
            }
            ui.checkbox(&mut orbit.auto_rotate, "Auto-rotate");

            ui.separator();
            ui.small("Drag to rotate, wheel to zoom.");
            if !status.message.is_empty() {
                ui.label(status.message.clone());
            }
        });

    ui_state.wants_pointer_input = ctx.wants_pointer_input();
    ui_state.wants_keyboard_input = ctx.wants_keyboard_input();
}

/// Startup hook: enters the view and optionally applies an initial dosha.
pub fn auto_enter(mut commands: Commands, options: Res<LaunchOptions>) {
    if !options.auto_enter {
        return;
    }
    commands.trigger(EnterModelView);
    if let Some(selection) = options.initial_selection {
        info!("applying initial selection {selection}");
        commands.trigger(SelectDosha(selection));
    }
}
