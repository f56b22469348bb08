//! Render/simulation loop lifecycle
//!
//! A [`Session`] owns the scene, the lab and the viewpoint while it runs.
//! The browser (or a native driver) calls [`Session::frame`] once per
//! displayed frame and [`Session::dispatch`] for every input command.
//! Progress lives outside the session and is passed in by `&mut`.

use std::collections::VecDeque;

use crate::classify::{CapabilityError, Prediction};
use crate::interaction::{self, HeadPose, Viewpoint};
use crate::platform::{FrameClock, Registrations};
use crate::progress::ProgressTracker;
use crate::renderer::{FrameBuilder, FrameSink};
use crate::scene::{Scene, compose};
use crate::settings::QualityTier;
use crate::sim::Lab;
use crate::tuning::Tuning;

pub use crate::interaction::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    Uninitialized,
    Running,
    TornDown,
}

/// Where frames are shown. Both consume the same frame contract; immersive
/// frames are viewed from the latest head pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    #[default]
    Flat,
    Immersive,
}

/// User-visible message for the page
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Info(String),
    Warning(String),
    Error(String),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Notice::Info(s) | Notice::Warning(s) | Notice::Error(s) => s,
        }
    }
}

/// Handed out when a classification starts. Results are only applied if the
/// session is still running the same generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationTicket {
    generation: u64,
}

/// What the caller must do after a command
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Followup {
    Nothing,
    /// Run the classifier, then call [`Session::finish_classification`]
    Classify(ClassificationTicket),
}

/// Scene-side state rebuilt on reset
struct World {
    scene: Scene,
    lab: Lab,
    viewpoint: Viewpoint,
    frames: FrameBuilder,
}

impl World {
    fn build(tuning: &Tuning, seed: u64, tier: QualityTier, aspect: f32) -> Self {
        let scene = compose();
        let frames = FrameBuilder::new(&scene, tier);
        Self {
            lab: Lab::new(tuning.clone(), seed),
            viewpoint: Viewpoint::new(aspect),
            frames,
            scene,
        }
    }
}

pub struct Session<F: FrameSink> {
    phase: LoopPhase,
    display: DisplayMode,
    tuning: Tuning,
    seed: u64,
    world: Option<World>,
    clock: FrameClock,
    sink: Option<F>,
    registrations: Registrations,
    notices: VecDeque<Notice>,
    generation: u64,
    classifying: bool,
    frame_count: u64,
    aspect: f32,
}

impl<F: FrameSink> Session<F> {
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        Self {
            phase: LoopPhase::Uninitialized,
            display: DisplayMode::Flat,
            tuning,
            seed,
            world: None,
            clock: FrameClock::new(),
            sink: None,
            registrations: Registrations::new(),
            notices: VecDeque::new(),
            generation: 0,
            classifying: false,
            frame_count: 0,
            aspect: 16.0 / 9.0,
        }
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == LoopPhase::Running
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display
    }

    /// Switch display target. Frame timing restarts because the two targets
    /// run on different frame callbacks; leaving immersive drops the head pose.
    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        if self.display == mode {
            return;
        }
        log::info!("Display mode: {:?}", mode);
        self.display = mode;
        self.clock.reset();
        if mode == DisplayMode::Flat {
            if let Some(world) = self.world.as_mut() {
                world.viewpoint.head = None;
            }
        }
    }

    /// Latest headset pose. Only used while immersive; returns whether it applied.
    pub fn set_head_pose(&mut self, pose: HeadPose) -> bool {
        if self.display != DisplayMode::Immersive {
            return false;
        }
        match self.world.as_mut() {
            Some(world) => {
                world.viewpoint.head = Some(pose);
                true
            }
            None => false,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn lab(&self) -> Option<&Lab> {
        self.world.as_ref().map(|w| &w.lab)
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.world.as_ref().map(|w| &w.scene)
    }

    pub fn viewpoint(&self) -> Option<&Viewpoint> {
        self.world.as_ref().map(|w| &w.viewpoint)
    }

    pub fn sink(&self) -> Option<&F> {
        self.sink.as_ref()
    }

    /// Resources to release on teardown
    pub fn registrations_mut(&mut self) -> &mut Registrations {
        &mut self.registrations
    }

    pub fn notify(&mut self, notice: Notice) {
        match &notice {
            Notice::Info(s) => log::info!("{}", s),
            Notice::Warning(s) => log::warn!("{}", s),
            Notice::Error(s) => log::error!("{}", s),
        }
        self.notices.push_back(notice);
    }

    /// Drain queued notices, oldest first
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    /// Build the world and begin accepting frames. No-op unless uninitialized.
    pub fn start(&mut self, sink: Option<F>, tier: QualityTier) -> bool {
        if self.phase != LoopPhase::Uninitialized {
            log::warn!("Session start ignored in phase {:?}", self.phase);
            return false;
        }
        self.world = Some(World::build(&self.tuning, self.seed, tier, self.aspect));
        self.sink = sink;
        self.clock.reset();
        self.phase = LoopPhase::Running;
        log::info!("Session running (generation {})", self.generation);
        true
    }

    /// Canvas size changed (pixels)
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
        if let Some(world) = self.world.as_mut() {
            world.viewpoint.set_viewport(width, height);
        }
        if let Some(sink) = self.sink.as_mut() {
            sink.resize(width, height);
        }
    }

    /// Advance the lab and draw one frame. Returns false when not running.
    pub fn frame(&mut self, now_ms: f64) -> bool {
        if self.phase != LoopPhase::Running {
            return false;
        }
        let Some(world) = self.world.as_mut() else {
            return false;
        };

        let dt = self.clock.tick(now_ms);
        world.lab.step(dt);

        let mut dynamic = Vec::new();
        world.lab.draw(&mut dynamic);
        let frame = world.frames.build(
            world.viewpoint.view_proj(),
            world.viewpoint.eye(),
            &dynamic,
        );
        if let Some(sink) = self.sink.as_mut() {
            sink.present(&frame);
        }
        self.frame_count += 1;
        true
    }

    /// Apply one input command
    pub fn dispatch(&mut self, command: Command, tracker: &mut ProgressTracker) -> Followup {
        if self.phase != LoopPhase::Running {
            log::debug!("Ignoring {:?} in phase {:?}", command, self.phase);
            return Followup::Nothing;
        }
        if command == Command::ResetSession {
            self.reset(tracker);
            return Followup::Nothing;
        }
        let Some(world) = self.world.as_mut() else {
            return Followup::Nothing;
        };

        let mut notice = None;
        let mut followup = Followup::Nothing;

        match command {
            Command::Teleport(station) => {
                if !interaction::teleport_to_station(&mut world.viewpoint, &world.scene, station) {
                    notice = Some(Notice::Warning(format!(
                        "No teleport marker for {}",
                        station.as_str()
                    )));
                }
            }
            Command::TeleportAt {
                x,
                y,
                width,
                height,
            } => {
                interaction::teleport_at(&mut world.viewpoint, &world.scene, x, y, width, height);
            }
            Command::Fire => world.lab.fire(),
            Command::SpawnBody => world.lab.spawn_body(),
            Command::Mix => {
                notice = Some(match world.lab.mix(tracker) {
                    Ok(report) => Notice::Info(report.message),
                    Err(e) => Notice::Warning(e.to_string()),
                });
            }
            Command::BuildCircuit => {
                let report = world.lab.build_circuit(tracker);
                notice = Some(Notice::Info(report.message));
            }
            Command::ToggleSafetyGate => {
                world.lab.toggle_safety_gate();
            }
            Command::AcceptMission(id) => {
                tracker.accept_mission(id);
            }
            Command::SetQuality(tier) => {
                tracker.set_quality(tier);
                world.frames.set_quality(&world.scene, tier);
                if let Some(sink) = self.sink.as_mut() {
                    sink.set_quality(tier);
                }
            }
            Command::RunClassification => {
                if self.classifying {
                    notice = Some(Notice::Info("Classification already running".into()));
                } else {
                    self.classifying = true;
                    followup = Followup::Classify(ClassificationTicket {
                        generation: self.generation,
                    });
                }
            }
            Command::ResetSession => {}
        }

        if let Some(notice) = notice {
            self.notify(notice);
        }
        followup
    }

    /// Apply a finished classification. Late results (after reset or teardown)
    /// are discarded and return false.
    pub fn finish_classification(
        &mut self,
        ticket: ClassificationTicket,
        result: Result<Vec<Prediction>, CapabilityError>,
        tracker: &mut ProgressTracker,
    ) -> bool {
        if self.phase != LoopPhase::Running || ticket.generation != self.generation {
            log::info!(
                "Discarding classification from generation {} (now {})",
                ticket.generation,
                self.generation
            );
            return false;
        }
        self.classifying = false;
        let Some(world) = self.world.as_mut() else {
            return false;
        };

        let notice = match result {
            Ok(predictions) => {
                let report = world.lab.apply_classification(&predictions, tracker);
                Notice::Info(report.message)
            }
            Err(e) => Notice::Error(format!("AI error: {}", e)),
        };
        self.notify(notice);
        true
    }

    /// Rebuild scene state from scratch and reload progress from the store.
    /// Persisted progress is kept. In-flight classifications become stale.
    pub fn reset(&mut self, tracker: &mut ProgressTracker) {
        if self.phase != LoopPhase::Running {
            return;
        }
        tracker.reload();
        self.generation += 1;
        self.classifying = false;
        let seed = self.seed.wrapping_add(self.generation);
        self.world = Some(World::build(&self.tuning, seed, tracker.quality(), self.aspect));
        if let Some(sink) = self.sink.as_mut() {
            sink.set_quality(tracker.quality());
        }
        self.clock.reset();
        log::info!("Session reset (generation {})", self.generation);
    }

    /// Release listeners and the render sink. Idempotent.
    pub fn teardown(&mut self) {
        let released = self.registrations.release_all();
        if self.sink.take().is_some() {
            log::debug!("Render sink detached");
        }
        self.world = None;
        if self.phase != LoopPhase::TornDown {
            log::info!("Session torn down ({} registrations released)", released);
            self.phase = LoopPhase::TornDown;
        }
    }
}

impl<F: FrameSink> Drop for Session<F> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{Classifier, FixedClassifier, ImageSource, UnavailableClassifier};
    use crate::persistence::{MemoryStorage, Store};
    use crate::progress::MissionId;
    use crate::renderer::Frame;
    use crate::scene::StationId;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Debug, Default)]
    struct RecordingSink {
        frames: usize,
        last_vertices: usize,
        camera: Option<glam::Vec3>,
        quality: Option<QualityTier>,
        size: Option<(u32, u32)>,
    }

    impl FrameSink for RecordingSink {
        fn present(&mut self, frame: &Frame) {
            self.frames += 1;
            self.last_vertices = frame.vertices.len();
            self.camera = Some(frame.camera_pos);
        }

        fn resize(&mut self, width: u32, height: u32) {
            self.size = Some((width, height));
        }

        fn set_quality(&mut self, tier: QualityTier) {
            self.quality = Some(tier);
        }
    }

    fn tracker() -> ProgressTracker {
        ProgressTracker::new(Store::new(MemoryStorage::new()))
    }

    fn running() -> Session<RecordingSink> {
        let mut session = Session::new(Tuning::default(), 7);
        assert!(session.start(Some(RecordingSink::default()), QualityTier::Medium));
        session
    }

    #[test]
    fn test_lifecycle() {
        let mut session: Session<RecordingSink> = Session::new(Tuning::default(), 1);
        assert_eq!(session.phase(), LoopPhase::Uninitialized);
        assert!(!session.frame(0.0));
        assert!(session.start(None, QualityTier::Low));
        assert!(!session.start(None, QualityTier::Low));
        assert!(session.frame(0.0));
        session.teardown();
        assert_eq!(session.phase(), LoopPhase::TornDown);
        assert!(!session.frame(16.0));
        assert!(!session.start(None, QualityTier::Low));
    }

    #[test]
    fn test_teardown_before_start_and_twice() {
        let mut session: Session<RecordingSink> = Session::new(Tuning::default(), 1);
        session.teardown();
        session.teardown();
        assert_eq!(session.phase(), LoopPhase::TornDown);
    }

    #[test]
    fn test_teardown_releases_registrations_once() {
        let mut session = running();
        let released = Rc::new(Cell::new(0));
        for _ in 0..3 {
            let r = released.clone();
            session
                .registrations_mut()
                .on_release("listener", move || r.set(r.get() + 1));
        }
        session.teardown();
        session.teardown();
        assert_eq!(released.get(), 3);
        assert!(session.sink().is_none());
    }

    #[test]
    fn test_each_frame_reaches_the_sink() {
        let mut session = running();
        for i in 0..5 {
            session.frame(i as f64 * 16.0);
        }
        let sink = session.sink().unwrap();
        assert_eq!(sink.frames, 5);
        assert!(sink.last_vertices > 0);
        assert_eq!(session.frame_count(), 5);
    }

    #[test]
    fn test_frames_continue_across_display_modes() {
        use glam::{Quat, Vec3};

        let mut session = running();
        assert!(session.frame(0.0));
        let standing = session.viewpoint().unwrap().position;
        let pose = HeadPose::new(Vec3::new(0.1, 1.7, 0.0), Quat::from_rotation_y(0.5));

        // pose is ignored on the flat display
        assert!(!session.set_head_pose(pose));

        session.set_display_mode(DisplayMode::Immersive);
        assert!(session.set_head_pose(pose));
        for i in 1..4 {
            assert!(session.frame(i as f64 * 11.0));
        }
        let expected = Vec3::new(standing.x + 0.1, 1.7, standing.z);
        assert!((session.sink().unwrap().camera.unwrap() - expected).length() < 1e-5);
        let lab_time = session.lab().unwrap().time();
        assert!(lab_time > 0.0);

        session.set_display_mode(DisplayMode::Flat);
        assert!(session.frame(5_000.0));
        assert_eq!(session.sink().unwrap().camera, Some(standing));
        assert!(session.viewpoint().unwrap().head.is_none());
        // clock restarted on the switch, so the gap is not one long step
        assert!(session.lab().unwrap().time() - lab_time < 0.1);

        assert_eq!(session.sink().unwrap().frames, 5);
        assert_eq!(session.frame_count(), 5);
    }

    #[test]
    fn test_fired_projectile_adds_geometry() {
        let mut session = running();
        let mut t = tracker();
        session.frame(0.0);
        let before = session.sink().unwrap().last_vertices;
        let _ = session.dispatch(Command::Fire, &mut t);
        session.frame(16.0);
        assert!(session.sink().unwrap().last_vertices > before);
    }

    #[test]
    fn test_blocked_mix_becomes_warning() {
        let mut session = running();
        let mut t = tracker();
        let _ = session.dispatch(Command::Mix, &mut t);
        assert_eq!(
            session.take_notices(),
            vec![Notice::Warning("Put on safety goggles first (press G).".into())]
        );
        assert_eq!(t.xp(), 0);

        let _ = session.dispatch(Command::ToggleSafetyGate, &mut t);
        let _ = session.dispatch(Command::Mix, &mut t);
        assert_eq!(t.xp(), 50);
        assert!(matches!(session.take_notices()[0], Notice::Info(_)));
    }

    #[test]
    fn test_teleport_command_moves_viewpoint() {
        let mut session = running();
        let mut t = tracker();
        let _ = session.dispatch(Command::Teleport(StationId::Chemistry), &mut t);
        assert_eq!(
            session.viewpoint().unwrap().position,
            glam::Vec3::new(0.0, 1.6, 0.0)
        );
    }

    #[test]
    fn test_quality_reaches_tracker_and_sink() {
        let mut session = running();
        let mut t = tracker();
        let _ = session.dispatch(Command::SetQuality(QualityTier::High), &mut t);
        assert_eq!(t.quality(), QualityTier::High);
        assert_eq!(session.sink().unwrap().quality, Some(QualityTier::High));
    }

    #[test]
    fn test_reset_keeps_progress_and_rebuilds_lab() {
        let mut session = running();
        let mut t = tracker();
        let _ = session.dispatch(Command::AcceptMission(MissionId::Pendulum), &mut t);
        let _ = session.dispatch(Command::BuildCircuit, &mut t);
        let _ = session.dispatch(Command::ToggleSafetyGate, &mut t);
        let _ = session.dispatch(Command::ResetSession, &mut t);

        assert_eq!(t.xp(), 70);
        assert!(t.mission(MissionId::Pendulum).accepted);
        let lab = session.lab().unwrap();
        assert!(!lab.circuit.is_lit());
        assert!(!lab.safety_gate());
        assert_eq!(session.generation(), 1);
    }

    #[test]
    fn test_classification_applies_once_per_ticket() {
        let mut session = running();
        let mut t = tracker();
        let Followup::Classify(ticket) = session.dispatch(Command::RunClassification, &mut t) else {
            panic!("expected a ticket");
        };
        // second request while the first is in flight
        assert_eq!(
            session.dispatch(Command::RunClassification, &mut t),
            Followup::Nothing
        );
        session.take_notices();

        let classifier = FixedClassifier::demo();
        let result = pollster::block_on(classifier.classify(&ImageSource::demo()));
        assert!(session.finish_classification(ticket, result, &mut t));
        assert_eq!(t.xp(), 60);
        let notices = session.take_notices();
        assert!(notices[0].text().starts_with("AI Prediction:\ndesktop computer"));
    }

    #[test]
    fn test_stale_classification_is_discarded() {
        let mut session = running();
        let mut t = tracker();
        let Followup::Classify(ticket) = session.dispatch(Command::RunClassification, &mut t) else {
            panic!("expected a ticket");
        };
        let _ = session.dispatch(Command::ResetSession, &mut t);
        let result = Ok(vec![Prediction::new("late", 0.9)]);
        assert!(!session.finish_classification(ticket, result, &mut t));
        assert_eq!(t.xp(), 0);

        let Followup::Classify(ticket) = session.dispatch(Command::RunClassification, &mut t) else {
            panic!("expected a ticket");
        };
        session.teardown();
        let result = Ok(vec![Prediction::new("late", 0.9)]);
        assert!(!session.finish_classification(ticket, result, &mut t));
        assert_eq!(t.xp(), 0);
    }

    #[test]
    fn test_classification_failure_is_error_notice() {
        let mut session = running();
        let mut t = tracker();
        let Followup::Classify(ticket) = session.dispatch(Command::RunClassification, &mut t) else {
            panic!("expected a ticket");
        };
        let result = pollster::block_on(UnavailableClassifier.classify(&ImageSource::demo()));
        assert!(session.finish_classification(ticket, result, &mut t));
        assert_eq!(
            session.take_notices(),
            vec![Notice::Error("AI error: classification is not available here".into())]
        );
        assert_eq!(t.xp(), 0);
        assert!(session.lab().unwrap().effects.overlays().is_empty());
    }

    #[test]
    fn test_commands_ignored_when_not_running() {
        let mut session: Session<RecordingSink> = Session::new(Tuning::default(), 1);
        let mut t = tracker();
        assert_eq!(session.dispatch(Command::BuildCircuit, &mut t), Followup::Nothing);
        assert_eq!(t.xp(), 0);
    }

    #[test]
    fn test_resize_updates_aspect_and_sink() {
        let mut session = running();
        session.resize(800, 400);
        assert_eq!(session.viewpoint().unwrap().aspect, 2.0);
        assert_eq!(session.sink().unwrap().size, Some((800, 400)));
    }
}
