//! Timed visual effects: floating info panels and reaction bubbles
//!
//! Each effect carries an absolute expiry time in lab seconds. The frame
//! loop sweeps expired effects once per tick.

use glam::Vec3;

use crate::scene::{
    DrawItem, Material, PANEL_FOCUS, PANEL_HEIGHT, PANEL_WIDTH, Shape, Transform, facing,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKind {
    Info,
    Success,
}

impl OverlayKind {
    fn color(&self) -> u32 {
        match self {
            OverlayKind::Info => 0x0ea5e9,
            OverlayKind::Success => 0x22c55e,
        }
    }
}

/// Floating text panel
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub id: u32,
    pub kind: OverlayKind,
    pub text: String,
    pub position: Vec3,
    pub expires_at: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bubble {
    pub pos: Vec3,
    pub radius: f32,
}

/// Reaction bubbles removed together
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleBurst {
    pub id: u32,
    pub bubbles: Vec<Bubble>,
    pub expires_at: f64,
}

#[derive(Debug, Clone)]
pub struct Effects {
    overlays: Vec<Overlay>,
    bursts: Vec<ParticleBurst>,
    next_id: u32,
}

impl Default for Effects {
    fn default() -> Self {
        Self::new()
    }
}

impl Effects {
    pub fn new() -> Self {
        Self {
            overlays: Vec::new(),
            bursts: Vec::new(),
            next_id: 1,
        }
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn show_overlay(
        &mut self,
        kind: OverlayKind,
        text: impl Into<String>,
        position: Vec3,
        expires_at: f64,
    ) -> u32 {
        let id = self.next_id();
        self.overlays.push(Overlay {
            id,
            kind,
            text: text.into(),
            position,
            expires_at,
        });
        id
    }

    pub fn add_burst(&mut self, bubbles: Vec<Bubble>, expires_at: f64) -> u32 {
        let id = self.next_id();
        self.bursts.push(ParticleBurst {
            id,
            bubbles,
            expires_at,
        });
        id
    }

    /// Drop everything that expired at or before `now`. Returns how many went.
    pub fn sweep(&mut self, now: f64) -> usize {
        let before = self.overlays.len() + self.bursts.len();
        self.overlays.retain(|o| o.expires_at > now);
        self.bursts.retain(|b| b.expires_at > now);
        before - (self.overlays.len() + self.bursts.len())
    }

    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    pub fn bursts(&self) -> &[ParticleBurst] {
        &self.bursts
    }

    pub fn bubble_count(&self) -> usize {
        self.bursts.iter().map(|b| b.bubbles.len()).sum()
    }

    pub fn draw(&self, out: &mut Vec<DrawItem>) {
        for burst in &self.bursts {
            for bubble in &burst.bubbles {
                out.push(DrawItem::new(
                    Shape::Sphere {
                        radius: bubble.radius,
                    },
                    Transform::at(bubble.pos),
                    Material::glowing(0xf43f5e, 0xf43f5e),
                ));
            }
        }
        for overlay in &self.overlays {
            out.push(DrawItem::new(
                Shape::Quad {
                    width: PANEL_WIDTH,
                    height: PANEL_HEIGHT,
                },
                Transform::at(overlay.position)
                    .with_rotation(facing(overlay.position, PANEL_FOCUS)),
                Material::translucent(overlay.kind.color(), 0.35),
            ));
        }
    }
}
