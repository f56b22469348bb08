//! The lab: every station plus the safety gate and timed effects
//!
//! Stations never touch progression directly. Actions that reward the
//! player take the tracker by `&mut` and report what happened.

use crate::classify::{Prediction, format_predictions};
use crate::consts::{BURST_LIFETIME, MAX_FRAME_DT, OVERLAY_LIFETIME};
use crate::progress::{MissionId, ProgressTracker};
use crate::scene::DrawItem;
use crate::sim::{
    CircuitStation, Effects, FallingBodies, MixingStation, OverlayKind, Pendulum,
    ProjectileLauncher, StationError, circuit, mixing,
};
use crate::tuning::Tuning;

/// Position of the classification result panel
pub const PREDICTION_OVERLAY_POS: glam::Vec3 = glam::Vec3::new(3.0, 1.9, -1.6);

/// Outcome of a successful rewarding action
#[derive(Debug, Clone, PartialEq)]
pub struct ActionReport {
    pub message: String,
    pub xp_gained: u32,
    pub badge: Option<&'static str>,
}

#[derive(Debug, Clone)]
pub struct Lab {
    pub pendulum: Pendulum,
    pub launcher: ProjectileLauncher,
    pub drop_zone: FallingBodies,
    pub mixing: MixingStation,
    pub circuit: CircuitStation,
    pub effects: Effects,
    safety_gate: bool,
    /// Lab clock (seconds since the lab was built)
    time: f64,
    tuning: Tuning,
}

impl Lab {
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        Self {
            pendulum: Pendulum::from_tuning(&tuning),
            launcher: ProjectileLauncher::new(&tuning),
            drop_zone: FallingBodies::new(seed, &tuning),
            mixing: MixingStation::new(seed.wrapping_add(1)),
            circuit: CircuitStation::new(),
            effects: Effects::new(),
            safety_gate: false,
            time: 0.0,
            tuning,
        }
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn safety_gate(&self) -> bool {
        self.safety_gate
    }

    /// Advance every time-driven station. `dt` is clamped to the frame ceiling;
    /// a non-finite step advances nothing.
    pub fn step(&mut self, dt: f32) {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.time += dt as f64;

        self.pendulum.step(dt);
        self.launcher.step(dt);
        self.drop_zone.step(dt);
        self.effects.sweep(self.time);
    }

    /// Returns the new gate state
    pub fn toggle_safety_gate(&mut self) -> bool {
        self.safety_gate = !self.safety_gate;
        log::debug!("Safety goggles {}", if self.safety_gate { "on" } else { "off" });
        self.safety_gate
    }

    pub fn fire(&mut self) {
        self.launcher.fire();
    }

    pub fn spawn_body(&mut self) {
        self.drop_zone.spawn();
    }

    /// Run the neutralisation reaction. Needs the safety gate.
    pub fn mix(&mut self, tracker: &mut ProgressTracker) -> Result<ActionReport, StationError> {
        let bubbles = self.mixing.mix(self.safety_gate, tracker.quality())?;
        self.effects.add_burst(bubbles, self.time + BURST_LIFETIME);
        self.effects.show_overlay(
            OverlayKind::Info,
            mixing::REACTION_TEXT,
            mixing::OVERLAY_POS,
            self.time + OVERLAY_LIFETIME,
        );

        let xp = self.tuning.mix_xp;
        tracker.grant_xp(xp);
        tracker.grant_badge(mixing::BADGE);
        tracker.complete_mission(MissionId::Spill);

        Ok(ActionReport {
            message: mixing::REACTION_TEXT.to_string(),
            xp_gained: xp,
            badge: Some(mixing::BADGE),
        })
    }

    /// Close the circuit. Always succeeds; repeat builds keep granting XP.
    pub fn build_circuit(&mut self, tracker: &mut ProgressTracker) -> ActionReport {
        self.circuit.build();
        self.effects.show_overlay(
            OverlayKind::Success,
            circuit::SUCCESS_TEXT,
            circuit::OVERLAY_POS,
            self.time + OVERLAY_LIFETIME,
        );

        let xp = self.tuning.circuit_xp;
        tracker.grant_xp(xp);
        tracker.grant_badge(circuit::BADGE);
        tracker.complete_mission(MissionId::Circuit);

        ActionReport {
            message: circuit::SUCCESS_TEXT.to_string(),
            xp_gained: xp,
            badge: Some(circuit::BADGE),
        }
    }

    /// Show ranked predictions and reward the player
    pub fn apply_classification(
        &mut self,
        predictions: &[Prediction],
        tracker: &mut ProgressTracker,
    ) -> ActionReport {
        let text = format_predictions(predictions);
        self.effects.show_overlay(
            OverlayKind::Info,
            text.clone(),
            PREDICTION_OVERLAY_POS,
            self.time + OVERLAY_LIFETIME,
        );

        let xp = self.tuning.classify_xp;
        tracker.grant_xp(xp);

        ActionReport {
            message: text,
            xp_gained: xp,
            badge: None,
        }
    }

    /// Per-frame geometry produced by station state
    pub fn draw(&self, out: &mut Vec<DrawItem>) {
        self.pendulum.draw(out);
        self.launcher.draw(out);
        self.drop_zone.draw(out);
        self.mixing.draw(out);
        self.circuit.draw(out);
        self.effects.draw(out);
    }
}
