//! Chaos effects and the scheduler that fires them during play

pub mod effect;
pub mod input_effects;
pub mod scheduler;
pub mod visual_effects;

pub use effect::{ChaosEffect, EffectContext, EffectKind};
pub use scheduler::{ChaosChange, ChaosScheduler, ChaosTargets, LevelChaosConfig, SchedulerState};
