//! Between-level interstitial
//!
//! Shows the upcoming level for a fixed time, then runs the continuation it
//! was entered with. The continuation runs at most once per entry.

use super::{Continuation, SceneData};
use crate::game::GameContext;
use crate::match_data::level_name;
use crate::runtime::SceneLifecycle;

/// Interstitial length (3 s at 60 ticks/s)
pub const TRANSITION_TICKS: f32 = 180.0;

#[derive(Default)]
pub struct TransitionScene {
    elapsed: f32,
    next_level: u8,
    callback: Option<Continuation>,
}

impl TransitionScene {
    /// 0 at entry, 1 once the countdown is over
    pub fn progress(&self) -> f32 {
        (self.elapsed / TRANSITION_TICKS).min(1.0)
    }

    /// "Starting in N..." counting 3-2-1, then "GO!"
    pub fn countdown_text(&self) -> String {
        let seconds_left = (3.0 - self.progress() * 3.0).ceil() as i32;
        if seconds_left > 0 {
            format!("Starting in {}...", seconds_left)
        } else {
            "GO!".to_string()
        }
    }

    pub fn level_label(&self) -> String {
        format!("LEVEL {}", self.next_level)
    }

    pub fn level_name(&self) -> &'static str {
        level_name(self.next_level)
    }

    pub fn next_level(&self) -> u8 {
        self.next_level
    }

    pub fn has_pending_callback(&self) -> bool {
        self.callback.is_some()
    }
}

impl SceneLifecycle for TransitionScene {
    type Context = GameContext;
    type Data = SceneData;

    fn init(&mut self, _ctx: &mut GameContext) {}

    fn enter(&mut self, data: SceneData, _ctx: &mut GameContext) {
        self.elapsed = 0.0;
        self.next_level = data.level.unwrap_or(1);
        self.callback = data.callback;
    }

    fn update(&mut self, dt: f32, ctx: &mut GameContext) {
        self.elapsed += dt;
        if self.elapsed >= TRANSITION_TICKS {
            if let Some(callback) = self.callback.take() {
                callback(&mut ctx.requests);
            }
        }
    }

    fn exit(&mut self, _ctx: &mut GameContext) {
        self.callback = None;
    }
}
