use crate::anatomy::dosha::{Dosha, DoshaSelection};
use crate::anatomy::error::AnatomyError;
use crate::anatomy::normalize::NormalizedOrgan;
use crate::anatomy::organs::{ORGAN_ORDER, OrganId, OrganLoadRequest, manifest_load_requests};
use crate::anatomy::registry::OrganRegistry;
use crate::anatomy::render_loop::RenderCommand;
use crate::anatomy::shell::{BodyShell, SHELL_PARTS, ShellPart};
use bevy::prelude::{Entity, Resource};
use crossbeam_channel::{Receiver, Sender, unbounded};
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct LoadCompletion {
    pub organ: OrganId,
    pub result: Result<NormalizedOrgan, AnatomyError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Pending,
    Ready,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEntry {
    /// First entry: the rig was created and these organs should be loaded.
    Started(Vec<OrganLoadRequest>),
    AlreadyActive,
}

#[derive(Resource)]
pub struct AnatomySession {
    registry: OrganRegistry,
    shell: BodyShell,
    current: Dosha,
    surface: Option<Entity>,
    active: bool,
    load_status: HashMap<OrganId, LoadStatus>,
    load_errors: HashMap<OrganId, AnatomyError>,
    completion_tx: Sender<LoadCompletion>,
    completion_rx: Receiver<LoadCompletion>,
    outbox: Vec<RenderCommand>,
}

impl Default for AnatomySession {
    fn default() -> Self {
        let (completion_tx, completion_rx) = unbounded();
        Self {
            registry: OrganRegistry::default(),
            shell: BodyShell::default(),
            current: Dosha::None,
            surface: None,
            active: false,
            load_status: HashMap::new(),
            load_errors: HashMap::new(),
            completion_tx,
            completion_rx,
            outbox: Vec::new(),
        }
    }
}

impl AnatomySession {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn surface(&self) -> Option<Entity> {
        self.surface
    }

    pub fn current_dosha(&self) -> Dosha {
        self.current
    }

    pub fn registry(&self) -> &OrganRegistry {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut OrganRegistry {
        &mut self.registry
    }

    pub fn shell(&self) -> &BodyShell {
        &self.shell
    }

    pub fn load_status(&self, organ: OrganId) -> Option<LoadStatus> {
        self.load_status.get(&organ).copied()
    }

    pub fn load_error(&self, organ: OrganId) -> Option<&AnatomyError> {
        self.load_errors.get(&organ)
    }

    pub fn pending_loads(&self) -> usize {
        self.load_status
            .values()
            .filter(|status| **status == LoadStatus::Pending)
            .count()
    }

    /// Sender handed to loaders; completions are applied on the next tick.
    pub fn completion_sender(&self) -> Sender<LoadCompletion> {
        self.completion_tx.clone()
    }

    /// Entry point A. Creates the rig and returns the organs to load, once.
    pub fn enter_model_view(&mut self, surface: Option<Entity>) -> Result<ViewEntry, AnatomyError> {
        if self.active {
            debug!("model view already active, ignoring re-entry");
            return Ok(ViewEntry::AlreadyActive);
        }
        let Some(surface) = surface else {
            error!("cannot enter model view: no render surface");
            return Err(AnatomyError::MissingContainer);
        };

        self.surface = Some(surface);
        self.active = true;
        self.outbox.push(RenderCommand::SpawnRig);
        for part in SHELL_PARTS {
            self.push_shell_opacity(part);
        }

        let requests = manifest_load_requests();
        for request in &requests {
            self.load_status.insert(request.id(), LoadStatus::Pending);
        }
        info!("entered model view, loading {} organs", requests.len());
        Ok(ViewEntry::Started(requests))
    }

    /// Entry point B. Resets every organ and the shell, then applies the
    /// requested dosha's highlight to whichever of its organs are loaded.
    /// Ignored until the model view has been entered; returns whether it applied.
    pub fn select(&mut self, selection: DoshaSelection) -> bool {
        if !self.active {
            debug!("ignoring {selection} before the model view is entered");
            return false;
        }

        let mut reset_commands = Vec::new();
        self.registry.for_each_mut(|organ| {
            let baseline = organ.ensure_baseline();
            organ.set_uniform_scale(baseline);
            organ.current_highlight = None;
            reset_commands.push(RenderCommand::SetOrganScale {
                organ: organ.id,
                scale: baseline,
            });
            reset_commands.push(RenderCommand::SetOrganEmissive {
                organ: organ.id,
                emissive: organ.baseline_emissive,
            });
        });
        self.outbox.extend(reset_commands);

        self.shell.rest();
        for part in SHELL_PARTS {
            self.push_shell_opacity(part);
        }

        let dosha = match selection {
            DoshaSelection::Reset => {
                self.current = Dosha::None;
                debug!("dosha reset");
                return true;
            }
            DoshaSelection::Dosha(dosha) => dosha,
        };

        self.current = dosha;
        let highlighted = dosha
            .targets()
            .iter()
            .filter(|organ| self.apply_highlight(**organ, dosha))
            .count();
        info!(
            "selected dosha {dosha}: {highlighted}/{} target organs highlighted",
            dosha.targets().len()
        );
        true
    }

    pub fn set_shell_opacity(&mut self, value: f32) {
        if self.shell.set_shell_opacity(value).is_some() {
            for part in SHELL_PARTS {
                self.push_shell_opacity(part);
            }
        }
    }

    pub fn set_part_opacity(&mut self, part: ShellPart, value: f32) {
        if self.shell.set_part_opacity(part, value).is_some() {
            self.push_shell_opacity(part);
        }
    }

    /// Applies every completion currently queued. Returns how many were seen.
    pub fn drain_completions(&mut self) -> usize {
        let completions: Vec<LoadCompletion> = self.completion_rx.try_iter().collect();
        let count = completions.len();
        for completion in completions {
            self.complete_load(completion);
        }
        count
    }

    pub fn complete_load(&mut self, completion: LoadCompletion) {
        let LoadCompletion { organ, result } = completion;
        match result {
            Ok(normalized) => {
                let surfaces = normalized.surface_count();
                let scale = normalized.scale_factor();
                if let Err(err) = self.registry.put(normalized) {
                    warn!("dropping load completion: {err}");
                    return;
                }
                self.load_status.insert(organ, LoadStatus::Ready);
                self.outbox.push(RenderCommand::SpawnOrgan(organ));
                if self.current.highlights(organ) {
                    self.apply_highlight(organ, self.current);
                }
                info!("loaded {organ} ({surfaces} surfaces, scale {scale:.4})");
            }
            Err(err) => {
                error!("failed to load {organ}: {err}");
                self.load_status.insert(organ, LoadStatus::Failed);
                self.load_errors.insert(organ, err);
            }
        }
    }

    pub fn take_render_commands(&mut self) -> Vec<RenderCommand> {
        std::mem::take(&mut self.outbox)
    }

    pub(crate) fn push_command(&mut self, command: RenderCommand) {
        self.outbox.push(command);
    }

    pub fn organ_summary(&self) -> Vec<(OrganId, Option<LoadStatus>)> {
        ORGAN_ORDER
            .iter()
            .map(|organ| (*organ, self.load_status(*organ)))
            .collect()
    }

    fn apply_highlight(&mut self, organ: OrganId, dosha: Dosha) -> bool {
        let Some(highlight) = dosha.highlight() else {
            return false;
        };
        let Some(entry) = self.registry.get_mut(organ) else {
            debug!("{organ} is not loaded, nothing to highlight for {dosha}");
            return false;
        };
        entry.current_highlight = Some(highlight);
        self.outbox.push(RenderCommand::SetOrganEmissive {
            organ,
            emissive: highlight,
        });
        true
    }

    fn push_shell_opacity(&mut self, part: ShellPart) {
        if !self.active {
            return;
        }
        self.outbox.push(RenderCommand::SetShellOpacity {
            part,
            opacity: self.shell.opacity(part),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anatomy::normalize::{Emissive, normalize};
    use crate::anatomy::raw_asset::RawAsset;
    use crate::anatomy::{HIGHLIGHT_INTENSITY, PITTA_HEX, SHELL_RESTING_OPACITY, hex_color};
    use bevy::math::Vec3;

    fn loaded(organ: OrganId) -> LoadCompletion {
        let raw = RawAsset::from_positions(organ.as_str(), vec![Vec3::ZERO, Vec3::splat(2.0)]);
        let spec = organ.spec();
        LoadCompletion {
            organ,
            result: normalize(organ, raw, spec.target_size, spec.placement),
        }
    }

    fn active_session() -> AnatomySession {
        let mut session = AnatomySession::default();
        session
            .enter_model_view(Some(Entity::PLACEHOLDER))
            .unwrap();
        session.take_render_commands();
        session
    }

    #[test]
    fn entering_without_surface_fails_and_stays_inactive() {
        let mut session = AnatomySession::default();
        assert_eq!(
            session.enter_model_view(None),
            Err(AnatomyError::MissingContainer)
        );
        assert!(!session.is_active());
        assert!(session.take_render_commands().is_empty());
    }

    #[test]
    fn entering_twice_is_a_no_op() {
        let mut session = AnatomySession::default();
        let first = session.enter_model_view(Some(Entity::PLACEHOLDER)).unwrap();
        let ViewEntry::Started(requests) = first else {
            panic!("first entry should start loads");
        };
        assert_eq!(requests.len(), 4);
        assert_eq!(session.pending_loads(), 4);
        assert_eq!(session.take_render_commands()[0], RenderCommand::SpawnRig);

        assert_eq!(
            session.enter_model_view(Some(Entity::PLACEHOLDER)),
            Ok(ViewEntry::AlreadyActive)
        );
        assert!(session.take_render_commands().is_empty());
    }

    #[test]
    fn completions_arrive_through_the_queue() {
        let mut session = active_session();
        let tx = session.completion_sender();
        tx.send(loaded(OrganId::KidneyR)).unwrap();
        tx.send(LoadCompletion {
            organ: OrganId::Brain,
            result: Err(AnatomyError::AssetLoadFailure {
                organ: OrganId::Brain,
                reason: "missing file".to_string(),
            }),
        })
        .unwrap();

        assert!(session.registry().is_empty());
        assert_eq!(session.drain_completions(), 2);
        assert!(session.registry().contains(OrganId::KidneyR));
        assert_eq!(session.load_status(OrganId::Brain), Some(LoadStatus::Failed));
        assert!(session.load_error(OrganId::Brain).is_some());
        assert_eq!(session.pending_loads(), 2);
        assert_eq!(
            session.take_render_commands(),
            vec![RenderCommand::SpawnOrgan(OrganId::KidneyR)]
        );
    }

    #[test]
    fn late_organ_picks_up_active_highlight() {
        let mut session = active_session();
        session.select(DoshaSelection::Dosha(Dosha::Pitta));
        session.complete_load(loaded(OrganId::Heart));

        let heart = session.registry().get(OrganId::Heart).unwrap();
        assert_eq!(
            heart.emissive(),
            Emissive {
                color: hex_color(PITTA_HEX),
                intensity: HIGHLIGHT_INTENSITY,
            }
        );
    }

    #[test]
    fn reset_restores_scale_and_clears_dosha() {
        let mut session = active_session();
        session.complete_load(loaded(OrganId::Heart));
        session.select(DoshaSelection::Dosha(Dosha::Pitta));

        let heart = session.registry_mut().get_mut(OrganId::Heart).unwrap();
        let baseline = heart.baseline_scale.unwrap();
        heart.set_uniform_scale(baseline * 1.05);

        session.select(DoshaSelection::Reset);
        let heart = session.registry().get(OrganId::Heart).unwrap();
        assert_eq!(heart.scale_factor(), baseline);
        assert_eq!(heart.baseline_scale, Some(baseline));
        assert_eq!(session.current_dosha(), Dosha::None);
    }

    #[test]
    fn select_rests_the_shell() {
        let mut session = active_session();
        session.set_shell_opacity(0.7);
        assert_eq!(session.shell().opacity(ShellPart::Head), 0.7);

        session.select(DoshaSelection::Dosha(Dosha::Kapha));
        for part in SHELL_PARTS {
            assert_eq!(session.shell().opacity(part), SHELL_RESTING_OPACITY);
        }
    }

    #[test]
    fn inactive_session_ignores_selection_and_queues_nothing() {
        let mut session = AnatomySession::default();
        for _ in 0..5 {
            assert!(!session.select(DoshaSelection::Dosha(Dosha::Pitta)));
            assert!(!session.select(DoshaSelection::Reset));
        }
        session.set_shell_opacity(0.6);

        assert_eq!(session.current_dosha(), Dosha::None);
        assert_eq!(session.shell().opacity(ShellPart::Hips), 0.6);
        assert!(session.take_render_commands().is_empty());

        session.enter_model_view(Some(Entity::PLACEHOLDER)).unwrap();
        assert!(session.select(DoshaSelection::Dosha(Dosha::Pitta)));
        assert_eq!(session.current_dosha(), Dosha::Pitta);
    }

    #[test]
    fn duplicate_completion_is_ignored() {
        let mut session = active_session();
        session.complete_load(loaded(OrganId::Brain));
        session.take_render_commands();
        session.complete_load(loaded(OrganId::Brain));

        assert_eq!(session.registry().len(), 1);
        assert!(session.take_render_commands().is_empty());
    }
}
