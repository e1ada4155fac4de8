//! Playing mode: drives the level lifecycle, the chaos scheduler and the HUD

use glam::Vec2;

use super::{GAMEPLAY, SceneData, SceneRequest, TRANSITION};
use crate::chaos::{ChaosChange, ChaosTargets, EffectKind};
use crate::consts::TOTAL_LEVELS;
use crate::game::GameContext;
use crate::levels::{LevelAdvance, LevelLifecycle};
use crate::runtime::SceneLifecycle;

/// Text and cursor state a renderer draws over the level
#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    pub timer: String,
    pub level: String,
    pub chaos: String,
    pub chaos_active: bool,
    pub cursor: Vec2,
    pub frozen: bool,
}

impl Default for Hud {
    fn default() -> Self {
        Self {
            timer: crate::format_time(0.0),
            level: format!("Level 1/{}", TOTAL_LEVELS),
            chaos: "CHAOS: ---".to_string(),
            chaos_active: false,
            cursor: Vec2::ZERO,
            frozen: false,
        }
    }
}

#[derive(Default)]
pub struct GameplayScene {
    levels: LevelLifecycle,
    hud: Hud,
}

impl GameplayScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_levels(levels: LevelLifecycle) -> Self {
        Self {
            levels,
            hud: Hud::default(),
        }
    }

    pub fn hud(&self) -> &Hud {
        &self.hud
    }

    pub fn levels(&self) -> &LevelLifecycle {
        &self.levels
    }

    fn start_level(&mut self, n: u8, ctx: &mut GameContext) {
        if self.levels.start_level(n, &mut ctx.level_context()).is_ok() {
            ctx.chaos.set_level(n);
            ctx.chaos.start();
        }
    }

    /// Completion hook for levels driven from outside. Repeat calls on the
    /// same level are ignored.
    pub fn complete_current(&mut self, ctx: &mut GameContext) -> bool {
        match self.levels.complete_current(&mut ctx.level_context()) {
            Some(advance) => {
                self.on_level_complete(advance, ctx);
                true
            }
            None => false,
        }
    }

    pub fn report_violation(&mut self, ctx: &mut GameContext) {
        self.levels.report_violation(&mut ctx.level_context());
    }

    /// Force an effect (debug / demo hook)
    pub fn trigger_chaos(&mut self, kind: EffectKind, ctx: &mut GameContext) -> bool {
        let triggered = ctx.chaos.trigger_effect(
            kind,
            ChaosTargets {
                input: &mut ctx.input,
                stage: &mut ctx.stage,
            },
        );
        if triggered {
            ctx.feedback.chaos_start();
        }
        triggered
    }

    fn on_level_complete(&mut self, advance: LevelAdvance, ctx: &mut GameContext) {
        ctx.feedback.success();
        match advance {
            LevelAdvance::Finished => {
                ctx.chaos.stop(ChaosTargets {
                    input: &mut ctx.input,
                    stage: &mut ctx.stage,
                });
                ctx.requests.push(SceneRequest::EndGame);
            }
            LevelAdvance::Next(next) => {
                ctx.chaos.pause();
                ctx.requests.switch_to(
                    TRANSITION,
                    SceneData::transition(
                        next,
                        Box::new(move |requests| {
                            requests.switch_to(GAMEPLAY, SceneData::resume(next))
                        }),
                    ),
                );
            }
        }
    }

    fn refresh_hud(&mut self, ctx: &GameContext) {
        let level = self.levels.current_level().unwrap_or(ctx.match_data.current_level);
        self.hud.timer = ctx.timer.formatted();
        self.hud.level = format!("Level {}/{}", level, TOTAL_LEVELS);
        self.hud.chaos_active = ctx.chaos.is_active();
        self.hud.chaos = if self.hud.chaos_active {
            format!("CHAOS: {}", ctx.chaos.active_name())
        } else {
            "CHAOS: ---".to_string()
        };
        self.hud.cursor = ctx.input.position();
        self.hud.frozen = self.levels.current().is_some_and(|l| l.is_frozen());
    }
}

impl SceneLifecycle for GameplayScene {
    type Context = GameContext;
    type Data = SceneData;

    fn init(&mut self, _ctx: &mut GameContext) {}

    fn enter(&mut self, data: SceneData, ctx: &mut GameContext) {
        match data.resume_level {
            Some(level) => {
                ctx.chaos.resume();
                self.start_level(level, ctx);
            }
            None => {
                ctx.match_data.current_level = 1;
                self.start_level(1, ctx);
            }
        }
        self.refresh_hud(ctx);
    }

    fn update(&mut self, dt: f32, ctx: &mut GameContext) {
        if let Some(advance) = self.levels.update(dt, &mut ctx.level_context()) {
            self.on_level_complete(advance, ctx);
            return;
        }

        let change = ctx.chaos.update(
            dt,
            ChaosTargets {
                input: &mut ctx.input,
                stage: &mut ctx.stage,
            },
        );
        if let Some(ChaosChange::Started(_)) = change {
            ctx.feedback.chaos_start();
        }

        self.refresh_hud(ctx);
    }

    fn exit(&mut self, ctx: &mut GameContext) {
        ctx.chaos.stop(ChaosTargets {
            input: &mut ctx.input,
            stage: &mut ctx.stage,
        });
        ctx.input.reset_modifiers();
        ctx.input.reset_position();
        ctx.stage.reset_chaos_visuals();
        self.levels.exit_current(&mut ctx.level_context());
    }
}
