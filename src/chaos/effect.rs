//! Chaos effect lifecycle
//!
//! Every effect shares the same bookkeeping (duration, elapsed, active flag)
//! and differs only in what its hooks do to the input modifiers or the stage.
//! The set of effects is closed: `EffectBehavior` has one variant per kind.

use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::input_effects::{GhostCursors, InvertedControls, PointerGlitch, SensitivityShift};
use super::visual_effects::{ColorInvert, ScreenShake, StaticBurst, ZoomWarp};
use crate::consts::MS_PER_TICK;
use crate::runtime::{InputManager, Stage};

/// The nine disruption kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    PointerGlitch,
    SensitivitySpike,
    SensitivityDrop,
    InvertedControls,
    GhostCursors,
    ScreenShake,
    ZoomWarp,
    ColorInvert,
    StaticBurst,
}

impl EffectKind {
    pub const ALL: [EffectKind; 9] = [
        EffectKind::PointerGlitch,
        EffectKind::SensitivitySpike,
        EffectKind::SensitivityDrop,
        EffectKind::InvertedControls,
        EffectKind::GhostCursors,
        EffectKind::ScreenShake,
        EffectKind::ZoomWarp,
        EffectKind::ColorInvert,
        EffectKind::StaticBurst,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Configuration key
    pub fn key(&self) -> &'static str {
        match self {
            EffectKind::PointerGlitch => "pointer_glitch",
            EffectKind::SensitivitySpike => "sensitivity_spike",
            EffectKind::SensitivityDrop => "sensitivity_drop",
            EffectKind::InvertedControls => "inverted_controls",
            EffectKind::GhostCursors => "ghost_cursors",
            EffectKind::ScreenShake => "screen_shake",
            EffectKind::ZoomWarp => "zoom_warp",
            EffectKind::ColorInvert => "color_invert",
            EffectKind::StaticBurst => "static_burst",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.key() == key)
    }

    /// Name shown on the HUD chaos indicator
    pub fn display_name(&self) -> &'static str {
        match self {
            EffectKind::PointerGlitch => "GLITCH",
            EffectKind::SensitivitySpike => "HYPER",
            EffectKind::SensitivityDrop => "SLUGGISH",
            EffectKind::InvertedControls => "INVERTED",
            EffectKind::GhostCursors => "GHOSTS",
            EffectKind::ScreenShake => "SHAKE",
            EffectKind::ZoomWarp => "ZOOM",
            EffectKind::ColorInvert => "INVERT",
            EffectKind::StaticBurst => "STATIC",
        }
    }

    pub fn duration_ms(&self) -> f32 {
        match self {
            EffectKind::PointerGlitch => 3500.0,
            EffectKind::SensitivitySpike => 4500.0,
            EffectKind::SensitivityDrop => 4500.0,
            EffectKind::InvertedControls => 5500.0,
            EffectKind::GhostCursors => 4000.0,
            EffectKind::ScreenShake => 3000.0,
            EffectKind::ZoomWarp => 2000.0,
            EffectKind::ColorInvert => 3000.0,
            EffectKind::StaticBurst => 2000.0,
        }
    }
}

/// What an effect hook may touch
pub struct EffectContext<'a> {
    pub input: &'a mut InputManager,
    pub stage: &'a mut Stage,
    pub rng: &'a mut Pcg32,
    /// 1.0 normally, lower with reduced motion
    pub motion_scale: f32,
}

/// Per-kind hooks. `on_update` receives the progress in [0, 1] and the
/// elapsed time in milliseconds.
pub(crate) trait EffectHooks {
    fn on_start(&mut self, ctx: &mut EffectContext);
    fn on_update(&mut self, progress: f32, elapsed_ms: f32, ctx: &mut EffectContext);
    fn on_stop(&mut self, ctx: &mut EffectContext);
}

#[derive(Debug, Clone)]
enum EffectBehavior {
    PointerGlitch(PointerGlitch),
    SensitivitySpike(SensitivityShift),
    SensitivityDrop(SensitivityShift),
    InvertedControls(InvertedControls),
    GhostCursors(GhostCursors),
    ScreenShake(ScreenShake),
    ZoomWarp(ZoomWarp),
    ColorInvert(ColorInvert),
    StaticBurst(StaticBurst),
}

impl EffectBehavior {
    fn for_kind(kind: EffectKind) -> Self {
        match kind {
            EffectKind::PointerGlitch => Self::PointerGlitch(PointerGlitch::default()),
            EffectKind::SensitivitySpike => Self::SensitivitySpike(SensitivityShift::spike()),
            EffectKind::SensitivityDrop => Self::SensitivityDrop(SensitivityShift::slowdown()),
            EffectKind::InvertedControls => Self::InvertedControls(InvertedControls),
            EffectKind::GhostCursors => Self::GhostCursors(GhostCursors::default()),
            EffectKind::ScreenShake => Self::ScreenShake(ScreenShake::default()),
            EffectKind::ZoomWarp => Self::ZoomWarp(ZoomWarp::default()),
            EffectKind::ColorInvert => Self::ColorInvert(ColorInvert),
            EffectKind::StaticBurst => Self::StaticBurst(StaticBurst::default()),
        }
    }

    fn hooks(&mut self) -> &mut dyn EffectHooks {
        match self {
            Self::PointerGlitch(e) => e,
            Self::SensitivitySpike(e) | Self::SensitivityDrop(e) => e,
            Self::InvertedControls(e) => e,
            Self::GhostCursors(e) => e,
            Self::ScreenShake(e) => e,
            Self::ZoomWarp(e) => e,
            Self::ColorInvert(e) => e,
            Self::StaticBurst(e) => e,
        }
    }
}

/// A chaos effect instance. Reused across triggers.
#[derive(Debug, Clone)]
pub struct ChaosEffect {
    kind: EffectKind,
    duration_ms: f32,
    elapsed_ms: f32,
    active: bool,
    behavior: EffectBehavior,
}

impl ChaosEffect {
    pub fn new(kind: EffectKind) -> Self {
        Self {
            kind,
            duration_ms: kind.duration_ms(),
            elapsed_ms: 0.0,
            active: false,
            behavior: EffectBehavior::for_kind(kind),
        }
    }

    pub fn kind(&self) -> EffectKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.display_name()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn elapsed_ms(&self) -> f32 {
        self.elapsed_ms
    }

    pub fn duration_ms(&self) -> f32 {
        self.duration_ms
    }

    /// elapsed / duration, clamped to [0, 1]
    pub fn progress(&self) -> f32 {
        (self.elapsed_ms / self.duration_ms).clamp(0.0, 1.0)
    }

    pub fn start(&mut self, ctx: &mut EffectContext) {
        self.elapsed_ms = 0.0;
        self.active = true;
        self.behavior.hooks().on_start(ctx);
    }

    /// Advance by `dt` ticks. Goes inactive once the duration is reached;
    /// the owner is responsible for calling `stop`.
    pub fn update(&mut self, dt: f32, ctx: &mut EffectContext) {
        if !self.active {
            return;
        }
        self.elapsed_ms += dt * MS_PER_TICK;
        let progress = self.progress();
        let elapsed = self.elapsed_ms;
        self.behavior.hooks().on_update(progress, elapsed, ctx);

        if self.elapsed_ms >= self.duration_ms {
            self.active = false;
        }
    }

    pub fn stop(&mut self, ctx: &mut EffectContext) {
        self.active = false;
        self.behavior.hooks().on_stop(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::EventBus;
    use rand::SeedableRng;
    use std::rc::Rc;

    #[test]
    fn test_keys_round_trip() {
        for kind in EffectKind::ALL {
            assert_eq!(EffectKind::from_key(kind.key()), Some(kind));
        }
        assert_eq!(EffectKind::from_key("nope"), None);
    }

    #[test]
    fn test_effect_deactivates_after_duration() {
        let mut input = InputManager::new(Rc::new(EventBus::new()));
        let mut stage = Stage::new();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut ctx = EffectContext {
            input: &mut input,
            stage: &mut stage,
            rng: &mut rng,
            motion_scale: 1.0,
        };

        // 2000ms at 1000/60 ms per tick is 120 ticks
        let mut effect = ChaosEffect::new(EffectKind::StaticBurst);
        effect.start(&mut ctx);
        let mut ticks = 0;
        while effect.is_active() {
            effect.update(1.0, &mut ctx);
            ticks += 1;
            assert!(ticks <= 121);
        }
        assert!(ticks >= 120);
        assert_eq!(effect.progress(), 1.0);
        effect.stop(&mut ctx);
        assert!(ctx.stage.static_overlay.is_none());
    }
}
