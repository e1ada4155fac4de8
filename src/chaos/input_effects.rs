//! Effects that disturb the cursor (modifier writers and ghost cursors)
//!
//! Modifier writers must restore the default in `on_stop`.

use std::collections::VecDeque;

use glam::Vec2;
use rand::Rng;

use super::effect::{EffectContext, EffectHooks};
use crate::runtime::Ghost;

/// Random one-shot offsets every tick
#[derive(Debug, Clone)]
pub struct PointerGlitch {
    /// Max jitter per axis, either direction
    pub amplitude: f32,
}

impl Default for PointerGlitch {
    fn default() -> Self {
        Self { amplitude: 10.0 }
    }
}

impl EffectHooks for PointerGlitch {
    fn on_start(&mut self, _ctx: &mut EffectContext) {}

    fn on_update(&mut self, _progress: f32, _elapsed_ms: f32, ctx: &mut EffectContext) {
        let a = self.amplitude;
        let dx = ctx.rng.random_range(-a..a);
        let dy = ctx.rng.random_range(-a..a);
        ctx.input.add_offset(dx, dy);
    }

    fn on_stop(&mut self, ctx: &mut EffectContext) {
        ctx.input.clear_offset();
    }
}

/// Sensitivity spike (HYPER) or drop (SLUGGISH)
#[derive(Debug, Clone)]
pub struct SensitivityShift {
    pub multiplier: f32,
}

impl SensitivityShift {
    pub const SPIKE_MULTIPLIER: f32 = 3.0;
    pub const SLOWDOWN_MULTIPLIER: f32 = 0.3;

    pub fn spike() -> Self {
        Self {
            multiplier: Self::SPIKE_MULTIPLIER,
        }
    }

    pub fn slowdown() -> Self {
        Self {
            multiplier: Self::SLOWDOWN_MULTIPLIER,
        }
    }
}

impl EffectHooks for SensitivityShift {
    fn on_start(&mut self, ctx: &mut EffectContext) {
        ctx.input.set_sensitivity(self.multiplier);
    }

    fn on_update(&mut self, _progress: f32, _elapsed_ms: f32, _ctx: &mut EffectContext) {}

    fn on_stop(&mut self, ctx: &mut EffectContext) {
        ctx.input.reset_sensitivity();
    }
}

/// Both axes inverted
#[derive(Debug, Clone, Copy)]
pub struct InvertedControls;

impl EffectHooks for InvertedControls {
    fn on_start(&mut self, ctx: &mut EffectContext) {
        ctx.input.set_invert_x(true);
        ctx.input.set_invert_y(true);
    }

    fn on_update(&mut self, _progress: f32, _elapsed_ms: f32, _ctx: &mut EffectContext) {}

    fn on_stop(&mut self, ctx: &mut EffectContext) {
        ctx.input.reset_invert();
    }
}

/// Positions kept per ghost
pub const GHOST_HISTORY_PER_GHOST: usize = 10;
/// Extra delay (in recorded positions) for each successive ghost
pub const GHOST_DELAY_STEP: usize = 5;

/// Ghost alpha: starts at 0.5 and fades linearly to half of that
pub fn ghost_alpha(progress: f32) -> f32 {
    0.5 * (1.0 - progress.clamp(0.0, 1.0) * 0.5)
}

/// 2-3 delayed, orbiting copies of the cursor
#[derive(Debug, Clone, Default)]
pub struct GhostCursors {
    spawn_offsets: Vec<Vec2>,
    history: VecDeque<Vec2>,
}

impl GhostCursors {
    pub fn ghost_count(&self) -> usize {
        self.spawn_offsets.len()
    }
}

impl EffectHooks for GhostCursors {
    fn on_start(&mut self, ctx: &mut EffectContext) {
        let count = 2 + ctx.rng.random_range(0..2);
        self.spawn_offsets = (0..count)
            .map(|_| {
                Vec2::new(
                    ctx.rng.random_range(-50.0..50.0),
                    ctx.rng.random_range(-50.0..50.0),
                )
            })
            .collect();
        self.history.clear();

        let cursor = ctx.input.position();
        ctx.stage.ghosts = self
            .spawn_offsets
            .iter()
            .map(|offset| Ghost {
                pos: cursor + *offset,
                alpha: ghost_alpha(0.0),
            })
            .collect();
    }

    fn on_update(&mut self, progress: f32, elapsed_ms: f32, ctx: &mut EffectContext) {
        let count = self.spawn_offsets.len();
        self.history.push_back(ctx.input.position());
        while self.history.len() > GHOST_HISTORY_PER_GHOST * count {
            self.history.pop_front();
        }

        let alpha = ghost_alpha(progress);
        let len = self.history.len();
        ctx.stage.ghosts = (0..count)
            .map(|i| {
                let delay = (i + 1) * GHOST_DELAY_STEP;
                let base = self.history[len.saturating_sub(delay)];
                let radius = 30.0 + i as f32 * 20.0;
                let phase = elapsed_ms / 200.0 + i as f32;
                Ghost {
                    pos: base + Vec2::new(phase.sin(), phase.cos()) * radius,
                    alpha,
                }
            })
            .collect();
    }

    fn on_stop(&mut self, ctx: &mut EffectContext) {
        self.spawn_offsets.clear();
        self.history.clear();
        ctx.stage.ghosts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chaos::{ChaosEffect, EffectKind};
    use crate::runtime::{EventBus, InputManager, Modifiers, Stage};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::rc::Rc;

    struct Fixture {
        input: InputManager,
        stage: Stage,
        rng: Pcg32,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                input: InputManager::new(Rc::new(EventBus::new())),
                stage: Stage::new(),
                rng: Pcg32::seed_from_u64(42),
            }
        }

        fn ctx(&mut self) -> EffectContext<'_> {
            EffectContext {
                input: &mut self.input,
                stage: &mut self.stage,
                rng: &mut self.rng,
                motion_scale: 1.0,
            }
        }
    }

    #[test]
    fn test_modifier_effects_restore_defaults() {
        for kind in [
            EffectKind::SensitivitySpike,
            EffectKind::SensitivityDrop,
            EffectKind::InvertedControls,
        ] {
            let mut fx = Fixture::new();
            let mut effect = ChaosEffect::new(kind);
            effect.start(&mut fx.ctx());
            assert_ne!(fx.input.modifiers(), Modifiers::default(), "{:?}", kind);
            effect.stop(&mut fx.ctx());
            assert_eq!(fx.input.modifiers(), Modifiers::default(), "{:?}", kind);
        }
    }

    #[test]
    fn test_sensitivity_values() {
        let mut fx = Fixture::new();
        let mut spike = ChaosEffect::new(EffectKind::SensitivitySpike);
        spike.start(&mut fx.ctx());
        assert_eq!(fx.input.modifiers().sensitivity, 3.0);

        let mut slow = ChaosEffect::new(EffectKind::SensitivityDrop);
        slow.start(&mut fx.ctx());
        assert_eq!(fx.input.modifiers().sensitivity, 0.3);
    }

    #[test]
    fn test_pointer_glitch_jitters_within_amplitude() {
        let mut fx = Fixture::new();
        let mut effect = ChaosEffect::new(EffectKind::PointerGlitch);
        effect.start(&mut fx.ctx());
        effect.update(1.0, &mut fx.ctx());
        let offset = fx.input.modifiers().pending_offset;
        assert!(offset.x.abs() <= 10.0 && offset.y.abs() <= 10.0);
        assert_ne!(offset, Vec2::ZERO);
    }

    #[test]
    fn test_ghosts_follow_cursor_and_fade() {
        let mut fx = Fixture::new();
        let mut effect = ChaosEffect::new(EffectKind::GhostCursors);
        effect.start(&mut fx.ctx());
        let count = fx.stage.ghosts.len();
        assert!((2..=3).contains(&count));

        for _ in 0..60 {
            effect.update(1.0, &mut fx.ctx());
        }
        assert_eq!(fx.stage.ghosts.len(), count);
        let cursor = fx.input.position();
        for (i, ghost) in fx.stage.ghosts.iter().enumerate() {
            let radius = 30.0 + i as f32 * 20.0;
            assert!((ghost.pos.distance(cursor) - radius).abs() < 0.01);
            assert!(ghost.alpha < 0.5 && ghost.alpha > 0.25);
        }

        effect.stop(&mut fx.ctx());
        assert!(fx.stage.ghosts.is_empty());
    }

    #[test]
    fn test_ghost_alpha_curve() {
        assert_eq!(ghost_alpha(0.0), 0.5);
        assert_eq!(ghost_alpha(1.0), 0.25);
        assert!(ghost_alpha(0.3) > ghost_alpha(0.6));
    }
}
