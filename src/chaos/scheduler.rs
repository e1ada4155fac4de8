//! Chaos scheduler
//!
//! Per match the scheduler is Stopped, Armed (counting towards the next
//! trigger) or Triggered (exactly one effect running). At most one effect is
//! active at any time; a new one can only be drawn on an update where no
//! effect was running at the start of the update.

use std::rc::Rc;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::effect::{ChaosEffect, EffectContext, EffectKind};
use crate::consts::{DEFAULT_IMMUNITY_TICKS, TOTAL_LEVELS};
use crate::runtime::{EventBus, GameEvent, InputManager, Stage};

/// Trigger interval range (ticks) and effect pool for one level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelChaosConfig {
    pub min_interval: f32,
    pub max_interval: f32,
    pub effects: &'static [EffectKind],
}

use EffectKind::*;

const POOL_1: &[EffectKind] = &[PointerGlitch, ScreenShake];
const POOL_2: &[EffectKind] = &[PointerGlitch, SensitivityDrop, ScreenShake, ZoomWarp, StaticBurst];
const POOL_3: &[EffectKind] = &[
    PointerGlitch,
    SensitivitySpike,
    SensitivityDrop,
    ScreenShake,
    ZoomWarp,
    ColorInvert,
    StaticBurst,
];

/// Difficulty curve: intervals shrink and pools grow with the level
pub const LEVEL_CONFIGS: [LevelChaosConfig; TOTAL_LEVELS as usize] = [
    LevelChaosConfig {
        min_interval: 900.0,
        max_interval: 1200.0,
        effects: POOL_1,
    },
    LevelChaosConfig {
        min_interval: 720.0,
        max_interval: 900.0,
        effects: POOL_2,
    },
    LevelChaosConfig {
        min_interval: 600.0,
        max_interval: 720.0,
        effects: POOL_3,
    },
    LevelChaosConfig {
        min_interval: 480.0,
        max_interval: 600.0,
        effects: &EffectKind::ALL,
    },
    LevelChaosConfig {
        min_interval: 480.0,
        max_interval: 600.0,
        effects: &EffectKind::ALL,
    },
    LevelChaosConfig {
        min_interval: 360.0,
        max_interval: 480.0,
        effects: &EffectKind::ALL,
    },
];

/// Config for a level, clamped to 1..=6
pub fn level_config(level: u8) -> &'static LevelChaosConfig {
    let index = level.clamp(1, TOTAL_LEVELS) as usize - 1;
    &LEVEL_CONFIGS[index]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Stopped,
    Armed,
    Triggered,
}

/// Effect transition reported by `update`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChaosChange {
    Started(EffectKind),
    Ended(EffectKind),
}

/// What the active effect may mutate
pub struct ChaosTargets<'a> {
    pub input: &'a mut InputManager,
    pub stage: &'a mut Stage,
}

pub struct ChaosScheduler {
    bus: Rc<EventBus>,
    rng: Pcg32,
    /// One reusable instance per kind, indexed by `EffectKind::index`
    effects: Vec<ChaosEffect>,
    active: Option<EffectKind>,
    level: u8,
    elapsed: f32,
    next_trigger: f32,
    running: bool,
    paused: bool,
    immunity: f32,
    immunity_default: f32,
    enabled: bool,
    motion_scale: f32,
}

impl ChaosScheduler {
    pub fn new(bus: Rc<EventBus>, seed: u64) -> Self {
        let mut scheduler = Self {
            bus,
            rng: Pcg32::seed_from_u64(seed),
            effects: EffectKind::ALL.into_iter().map(ChaosEffect::new).collect(),
            active: None,
            level: 1,
            elapsed: 0.0,
            next_trigger: 0.0,
            running: false,
            paused: false,
            immunity: 0.0,
            immunity_default: DEFAULT_IMMUNITY_TICKS,
            enabled: true,
            motion_scale: 1.0,
        };
        scheduler.reset_timer();
        scheduler
    }

    /// When disabled, running effects finish but nothing new triggers
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn set_motion_scale(&mut self, scale: f32) {
        self.motion_scale = scale.clamp(0.0, 1.0);
    }

    /// Immunity window applied by `start` and `resume`
    pub fn set_default_immunity(&mut self, ticks: f32) {
        self.immunity_default = ticks.max(0.0);
    }

    pub fn set_level(&mut self, level: u8) {
        self.level = level.clamp(1, TOTAL_LEVELS);
        self.reset_timer();
    }

    pub fn start(&mut self) {
        self.running = true;
        self.paused = false;
        self.reset_timer();
        self.immunity = self.immunity_default;
    }

    /// Stop scheduling and end the active effect without publishing
    pub fn stop(&mut self, targets: ChaosTargets) {
        self.running = false;
        if let Some(kind) = self.active.take() {
            let effect = &mut self.effects[kind.index()];
            effect.stop(&mut EffectContext {
                input: targets.input,
                stage: targets.stage,
                rng: &mut self.rng,
                motion_scale: self.motion_scale,
            });
            log::debug!("Chaos {} stopped with the scheduler", kind.display_name());
        }
    }

    /// Freeze scheduling; the active effect is kept but not advanced
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
        self.immunity = self.immunity_default;
    }

    pub fn set_immunity(&mut self, ticks: f32) {
        self.immunity = ticks;
    }

    fn reset_timer(&mut self) {
        let config = level_config(self.level);
        self.next_trigger = if config.max_interval > config.min_interval {
            self.rng.random_range(config.min_interval..config.max_interval)
        } else {
            config.min_interval
        };
        self.elapsed = 0.0;
    }

    pub fn update(&mut self, dt: f32, targets: ChaosTargets) -> Option<ChaosChange> {
        if !self.running || self.paused {
            return None;
        }

        if self.immunity > 0.0 {
            self.immunity -= dt;
        }

        if let Some(kind) = self.active {
            let mut ctx = EffectContext {
                input: targets.input,
                stage: targets.stage,
                rng: &mut self.rng,
                motion_scale: self.motion_scale,
            };
            let effect = &mut self.effects[kind.index()];
            effect.update(dt, &mut ctx);
            if effect.is_active() {
                return None;
            }
            effect.stop(&mut ctx);
            self.active = None;
            log::info!("Chaos ended: {}", kind.display_name());
            self.bus.publish(GameEvent::ChaosEnded);
            self.reset_timer();
            return Some(ChaosChange::Ended(kind));
        }

        if self.immunity > 0.0 || !self.enabled {
            return None;
        }

        self.elapsed += dt;
        if self.elapsed < self.next_trigger {
            return None;
        }

        let pool = level_config(self.level).effects;
        let kind = pool[self.rng.random_range(0..pool.len())];
        self.activate(kind, targets);
        Some(ChaosChange::Started(kind))
    }

    /// Start a specific effect now. Refused while another one is active.
    pub fn trigger_effect(&mut self, kind: EffectKind, targets: ChaosTargets) -> bool {
        if self.active.is_some() {
            log::warn!(
                "Ignoring chaos trigger {}: {} still active",
                kind.display_name(),
                self.active_name()
            );
            return false;
        }
        self.activate(kind, targets);
        true
    }

    fn activate(&mut self, kind: EffectKind, targets: ChaosTargets) {
        let effect = &mut self.effects[kind.index()];
        effect.start(&mut EffectContext {
            input: targets.input,
            stage: targets.stage,
            rng: &mut self.rng,
            motion_scale: self.motion_scale,
        });
        self.active = Some(kind);
        log::info!("Chaos started: {} (level {})", kind.display_name(), self.level);
        self.bus.publish(GameEvent::ChaosStarted(kind.display_name()));
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_kind(&self) -> Option<EffectKind> {
        self.active
    }

    /// Display name of the active effect, empty when none
    pub fn active_name(&self) -> &'static str {
        self.active.map(|k| k.display_name()).unwrap_or("")
    }

    pub fn active_progress(&self) -> Option<f32> {
        self.active.map(|k| self.effects[k.index()].progress())
    }

    pub fn state(&self) -> SchedulerState {
        if !self.running {
            SchedulerState::Stopped
        } else if self.active.is_some() {
            SchedulerState::Triggered
        } else {
            SchedulerState::Armed
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn immunity(&self) -> f32 {
        self.immunity
    }

    /// Ticks until the next trigger once immunity has run out
    pub fn next_trigger(&self) -> f32 {
        self.next_trigger
    }
}
