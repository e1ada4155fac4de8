//! Short audiovisual feedback (shake, flash, pulse)
//!
//! Effect durations are in milliseconds, advanced by `dt * MS_PER_TICK`.

use glam::Vec2;
use rand::Rng;

use super::stage::{Flash, Stage};
use crate::consts::MS_PER_TICK;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeedbackKind {
    Shake { intensity: f32 },
    Flash { color: u32 },
    Pulse { intensity: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct FeedbackEffect {
    kind: FeedbackKind,
    duration_ms: f32,
    elapsed_ms: f32,
}

impl FeedbackEffect {
    fn progress(&self) -> f32 {
        (self.elapsed_ms / self.duration_ms).min(1.0)
    }
}

pub const SUCCESS_COLOR: u32 = 0x00ff00;
pub const ERROR_COLOR: u32 = 0xff0000;
pub const CHAOS_COLOR: u32 = 0xff00ff;

#[derive(Debug, Clone)]
pub struct FeedbackManager {
    effects: Vec<FeedbackEffect>,
    enabled: bool,
    /// Multiplier on shake amplitude (reduced motion)
    motion_scale: f32,
}

impl Default for FeedbackManager {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedbackManager {
    pub fn new() -> Self {
        Self {
            effects: Vec::new(),
            enabled: true,
            motion_scale: 1.0,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.effects.clear();
        }
    }

    pub fn set_motion_scale(&mut self, scale: f32) {
        self.motion_scale = scale.clamp(0.0, 1.0);
    }

    fn push(&mut self, kind: FeedbackKind, duration_ms: f32) {
        if !self.enabled {
            return;
        }
        self.effects.push(FeedbackEffect {
            kind,
            duration_ms: duration_ms.max(1.0),
            elapsed_ms: 0.0,
        });
    }

    pub fn shake(&mut self, duration_ms: f32, intensity: f32) {
        self.push(FeedbackKind::Shake { intensity }, duration_ms);
    }

    pub fn flash(&mut self, duration_ms: f32, color: u32) {
        self.push(FeedbackKind::Flash { color }, duration_ms);
    }

    pub fn pulse(&mut self, duration_ms: f32, intensity: f32) {
        self.push(FeedbackKind::Pulse { intensity }, duration_ms);
    }

    pub fn success(&mut self) {
        self.flash(150.0, SUCCESS_COLOR);
    }

    pub fn error(&mut self) {
        self.shake(200.0, 8.0);
        self.flash(100.0, ERROR_COLOR);
    }

    pub fn chaos_start(&mut self) {
        self.flash(200.0, CHAOS_COLOR);
    }

    pub fn active_count(&self) -> usize {
        self.effects.len()
    }

    /// Advance all effects and write their result into the stage
    pub fn update(&mut self, dt: f32, stage: &mut Stage, rng: &mut impl Rng) {
        for effect in &mut self.effects {
            effect.elapsed_ms += dt * MS_PER_TICK;
        }
        self.effects.retain(|e| e.elapsed_ms < e.duration_ms);

        let mut offset = Vec2::ZERO;
        let mut flash = None;
        let mut pulse = 1.0;
        for effect in &self.effects {
            let remaining = 1.0 - effect.progress();
            match effect.kind {
                FeedbackKind::Shake { intensity } => {
                    let amount = intensity * remaining * self.motion_scale;
                    offset += Vec2::new(
                        rng.random_range(-1.0..=1.0) * amount,
                        rng.random_range(-1.0..=1.0) * amount,
                    );
                }
                FeedbackKind::Flash { color } => {
                    flash = Some(Flash {
                        color,
                        alpha: remaining,
                    });
                }
                FeedbackKind::Pulse { intensity } => {
                    pulse += intensity * remaining;
                }
            }
        }
        stage.feedback_offset = offset;
        stage.flash = flash;
        stage.feedback_scale = pulse;
    }

    pub fn clear(&mut self, stage: &mut Stage) {
        self.effects.clear();
        stage.feedback_offset = Vec2::ZERO;
        stage.feedback_scale = 1.0;
        stage.flash = None;
    }
}
