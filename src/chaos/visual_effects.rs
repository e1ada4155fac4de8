//! Effects that disturb what the player sees
//!
//! Each writes stage fields only and puts them back to neutral on stop.
//! The progress curves are kept as free functions so they can be checked
//! without a stage.

use glam::Vec2;
use rand::Rng;

use super::effect::{EffectContext, EffectHooks};
use crate::consts::{HEIGHT, WIDTH};
use crate::runtime::StaticOverlay;

pub const SHAKE_INTENSITY: f32 = 15.0;
pub const ZOOM_MAX: f32 = 1.3;
pub const ZOOM_MIN: f32 = 0.8;
pub const STATIC_ALPHA: f32 = 0.4;
pub const STATIC_DENSITY: f32 = 0.3;
pub const STATIC_PIXEL_SIZE: f32 = 8.0;

/// Shake amplitude decays linearly to half over the effect
pub fn shake_intensity(progress: f32) -> f32 {
    SHAKE_INTENSITY * (1.0 - progress.clamp(0.0, 1.0) * 0.5)
}

/// Zoom goes out to its extreme by the midpoint, then back to 1.0
pub fn zoom_scale(progress: f32, zoom_in: bool) -> f32 {
    let p = progress.clamp(0.0, 1.0);
    let t = if p < 0.5 { p * 2.0 } else { 1.0 - (p - 0.5) * 2.0 };
    if zoom_in {
        1.0 + (ZOOM_MAX - 1.0) * t
    } else {
        1.0 - (1.0 - ZOOM_MIN) * t
    }
}

/// Static fades to half its alpha over the effect
pub fn static_alpha(progress: f32) -> f32 {
    STATIC_ALPHA * (1.0 - progress.clamp(0.0, 1.0) * 0.5)
}

#[derive(Debug, Clone, Default)]
pub struct ScreenShake;

impl EffectHooks for ScreenShake {
    fn on_start(&mut self, _ctx: &mut EffectContext) {}

    fn on_update(&mut self, progress: f32, _elapsed_ms: f32, ctx: &mut EffectContext) {
        let amount = shake_intensity(progress) * ctx.motion_scale;
        ctx.stage.chaos_offset = Vec2::new(
            ctx.rng.random_range(-1.0..=1.0) * amount,
            ctx.rng.random_range(-1.0..=1.0) * amount,
        );
    }

    fn on_stop(&mut self, ctx: &mut EffectContext) {
        ctx.stage.chaos_offset = Vec2::ZERO;
    }
}

/// Scale around the screen center, direction picked on start
#[derive(Debug, Clone)]
pub struct ZoomWarp {
    pub zoom_in: bool,
}

impl Default for ZoomWarp {
    fn default() -> Self {
        Self { zoom_in: true }
    }
}

impl EffectHooks for ZoomWarp {
    fn on_start(&mut self, ctx: &mut EffectContext) {
        self.zoom_in = ctx.rng.random::<bool>();
    }

    fn on_update(&mut self, progress: f32, _elapsed_ms: f32, ctx: &mut EffectContext) {
        let scale = 1.0 + (zoom_scale(progress, self.zoom_in) - 1.0) * ctx.motion_scale;
        let center = Vec2::new(WIDTH, HEIGHT) * 0.5;
        ctx.stage.scale = scale;
        ctx.stage.chaos_offset = center * (1.0 - scale);
    }

    fn on_stop(&mut self, ctx: &mut EffectContext) {
        ctx.stage.scale = 1.0;
        ctx.stage.chaos_offset = Vec2::ZERO;
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ColorInvert;

impl EffectHooks for ColorInvert {
    fn on_start(&mut self, ctx: &mut EffectContext) {
        ctx.stage.color_inverted = true;
    }

    fn on_update(&mut self, _progress: f32, _elapsed_ms: f32, _ctx: &mut EffectContext) {}

    fn on_stop(&mut self, ctx: &mut EffectContext) {
        ctx.stage.color_inverted = false;
    }
}

/// Sparse noise overlay, reseeded every tick
#[derive(Debug, Clone, Default)]
pub struct StaticBurst;

impl EffectHooks for StaticBurst {
    fn on_start(&mut self, ctx: &mut EffectContext) {
        ctx.stage.static_overlay = Some(StaticOverlay {
            alpha: static_alpha(0.0),
            density: STATIC_DENSITY,
            pixel_size: STATIC_PIXEL_SIZE,
            seed: ctx.rng.random(),
        });
    }

    fn on_update(&mut self, progress: f32, _elapsed_ms: f32, ctx: &mut EffectContext) {
        ctx.stage.static_overlay = Some(StaticOverlay {
            alpha: static_alpha(progress),
            density: STATIC_DENSITY,
            pixel_size: STATIC_PIXEL_SIZE,
            seed: ctx.rng.random(),
        });
    }

    fn on_stop(&mut self, ctx: &mut EffectContext) {
        ctx.stage.static_overlay = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chaos::{ChaosEffect, EffectKind};
    use crate::runtime::{EventBus, InputManager, Stage};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::rc::Rc;

    fn run_to_end(kind: EffectKind, motion_scale: f32) -> (Stage, Vec<Stage>) {
        let mut input = InputManager::new(Rc::new(EventBus::new()));
        let mut stage = Stage::new();
        let mut rng = Pcg32::seed_from_u64(9);
        let mut frames = Vec::new();
        let mut effect = ChaosEffect::new(kind);
        {
            let mut ctx = EffectContext {
                input: &mut input,
                stage: &mut stage,
                rng: &mut rng,
                motion_scale,
            };
            effect.start(&mut ctx);
        }
        while effect.is_active() {
            let mut ctx = EffectContext {
                input: &mut input,
                stage: &mut stage,
                rng: &mut rng,
                motion_scale,
            };
            effect.update(1.0, &mut ctx);
            frames.push(ctx.stage.clone());
        }
        let mut ctx = EffectContext {
            input: &mut input,
            stage: &mut stage,
            rng: &mut rng,
            motion_scale,
        };
        effect.stop(&mut ctx);
        (stage, frames)
    }

    #[test]
    fn test_zoom_curve_turns_at_midpoint() {
        assert_eq!(zoom_scale(0.0, true), 1.0);
        assert!((zoom_scale(0.5, true) - ZOOM_MAX).abs() < 1e-6);
        assert!((zoom_scale(0.5, false) - ZOOM_MIN).abs() < 1e-6);
        assert!((zoom_scale(1.0, true) - 1.0).abs() < 1e-6);
        assert!(zoom_scale(0.25, true) < zoom_scale(0.4, true));
        assert!(zoom_scale(0.6, true) > zoom_scale(0.9, true));
        assert!(zoom_scale(0.25, false) > zoom_scale(0.4, false));
    }

    #[test]
    fn test_decay_curves() {
        assert_eq!(shake_intensity(0.0), 15.0);
        assert_eq!(shake_intensity(1.0), 7.5);
        assert!((static_alpha(1.0) - 0.2).abs() < 1e-6);
        assert!(static_alpha(0.2) > static_alpha(0.8));
    }

    #[test]
    fn test_visual_effects_leave_neutral_stage() {
        for kind in [
            EffectKind::ScreenShake,
            EffectKind::ZoomWarp,
            EffectKind::ColorInvert,
            EffectKind::StaticBurst,
        ] {
            let (stage, frames) = run_to_end(kind, 1.0);
            assert!(!frames.is_empty());
            assert_eq!(stage, Stage::new(), "{:?}", kind);
        }
    }

    #[test]
    fn test_color_invert_holds_for_duration() {
        let (_, frames) = run_to_end(EffectKind::ColorInvert, 1.0);
        assert!(frames.iter().all(|s| s.color_inverted));
    }

    #[test]
    fn test_zoom_anchors_on_center() {
        let (_, frames) = run_to_end(EffectKind::ZoomWarp, 1.0);
        let center = Vec2::new(WIDTH, HEIGHT) * 0.5;
        for s in &frames {
            assert!((ZOOM_MIN - 1e-4..=ZOOM_MAX + 1e-4).contains(&s.scale));
            // center maps onto itself: center * scale + offset == center
            assert!((center * s.scale + s.chaos_offset - center).length() < 1e-2);
        }
    }

    #[test]
    fn test_reduced_motion_damps_shake() {
        let (_, frames) = run_to_end(EffectKind::ScreenShake, 0.5);
        for s in &frames {
            assert!(s.chaos_offset.x.abs() <= 7.5 + 1e-4);
            assert!(s.chaos_offset.y.abs() <= 7.5 + 1e-4);
        }
    }

    proptest! {
        #[test]
        fn zoom_scale_stays_within_limits(p in 0.0f32..=1.0, zoom_in: bool) {
            let s = zoom_scale(p, zoom_in);
            prop_assert!(s >= ZOOM_MIN - 1e-6 && s <= ZOOM_MAX + 1e-6);
        }
    }
}
