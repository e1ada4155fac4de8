//! Post-match scenes: results summary and the leaderboard table

use chrono::Utc;
use glam::Vec2;

use super::{Button, LEADERBOARD, RESULTS, SceneData, SceneRequest, pressed};
use crate::consts::{HEIGHT, WIDTH};
use crate::format_time;
use crate::game::GameContext;
use crate::leaderboard::{DEFAULT_TOP_COUNT, LeaderboardEntry, format_date};
use crate::runtime::{InputEvent, SceneLifecycle};

const BUTTON_SIZE: Vec2 = Vec2::new(280.0, 60.0);

/// Final time, per-level breakdown and leaderboard rank
pub struct ResultsScene {
    /// Match whose entry is already on the board
    recorded_match: Option<u32>,
    rank: Option<usize>,
    total_entries: usize,
    total_time: String,
    breakdown: Vec<(String, String)>,
    view_leaderboard: Button,
    play_again: Button,
}

impl Default for ResultsScene {
    fn default() -> Self {
        Self {
            recorded_match: None,
            rank: None,
            total_entries: 0,
            total_time: format_time(0.0),
            breakdown: Vec::new(),
            view_leaderboard: Button::new(
                "VIEW LEADERBOARD",
                Vec2::new(WIDTH / 2.0 - 200.0, 900.0),
                BUTTON_SIZE,
            ),
            play_again: Button::new(
                "PLAY AGAIN",
                Vec2::new(WIDTH / 2.0 + 200.0, 900.0),
                BUTTON_SIZE,
            ),
        }
    }
}

impl ResultsScene {
    pub fn rank(&self) -> Option<usize> {
        self.rank
    }

    /// "Rank #3 of 12"
    pub fn rank_text(&self) -> String {
        match self.rank {
            Some(rank) => format!("Rank #{} of {}", rank, self.total_entries),
            None => "Unranked".to_string(),
        }
    }

    pub fn total_time(&self) -> &str {
        &self.total_time
    }

    /// (level name, formatted time) per completed level
    pub fn breakdown(&self) -> &[(String, String)] {
        &self.breakdown
    }

    pub fn view_leaderboard_button(&self) -> Button {
        self.view_leaderboard
    }

    pub fn play_again_button(&self) -> Button {
        self.play_again
    }

    pub(super) fn on_input(&mut self, event: InputEvent, ctx: &mut GameContext) {
        if pressed(&self.view_leaderboard, event, ctx) {
            ctx.requests.switch_to(LEADERBOARD, SceneData::none());
        } else if pressed(&self.play_again, event, ctx) {
            ctx.requests.push(SceneRequest::RestartGame);
        }
    }

    fn record(&mut self, ctx: &mut GameContext) {
        let data = &ctx.match_data;
        let entry = LeaderboardEntry::new(
            &data.team_name,
            data.total_time,
            data.level_times.iter().map(|t| t.time).collect(),
        );
        let rank = ctx.leaderboard.add_entry(entry);
        ctx.leaderboard.save(&*ctx.storage);
        log::info!(
            "Team {:?} finished in {} (rank {})",
            data.team_name,
            format_time(data.total_time),
            rank
        );
        self.rank = Some(rank);
        self.recorded_match = Some(ctx.match_id);
    }
}

impl SceneLifecycle for ResultsScene {
    type Context = GameContext;
    type Data = SceneData;

    fn init(&mut self, _ctx: &mut GameContext) {}

    fn enter(&mut self, _data: SceneData, ctx: &mut GameContext) {
        // Coming back from the leaderboard must not add the match again
        if self.recorded_match != Some(ctx.match_id) {
            self.record(ctx);
        }
        self.total_entries = ctx.leaderboard.len();
        self.total_time = format_time(ctx.match_data.total_time);
        self.breakdown = ctx
            .match_data
            .level_times
            .iter()
            .map(|t| (t.name.clone(), format_time(t.time)))
            .collect();
    }

    fn update(&mut self, _dt: f32, _ctx: &mut GameContext) {}

    fn exit(&mut self, _ctx: &mut GameContext) {}
}

/// One rendered leaderboard row
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardRow {
    pub rank: usize,
    pub team_name: String,
    pub total_time: String,
    pub date: String,
    /// The match that just finished
    pub is_current: bool,
}

pub struct LeaderboardScene {
    rows: Vec<LeaderboardRow>,
    back: Button,
    play_again: Button,
}

impl Default for LeaderboardScene {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            back: Button::new(
                "BACK",
                Vec2::new(WIDTH / 2.0 - 200.0, HEIGHT - 80.0),
                BUTTON_SIZE,
            ),
            play_again: Button::new(
                "PLAY AGAIN",
                Vec2::new(WIDTH / 2.0 + 200.0, HEIGHT - 80.0),
                BUTTON_SIZE,
            ),
        }
    }
}

impl LeaderboardScene {
    pub fn rows(&self) -> &[LeaderboardRow] {
        &self.rows
    }

    pub fn back_button(&self) -> Button {
        self.back
    }

    pub fn play_again_button(&self) -> Button {
        self.play_again
    }

    pub(super) fn on_input(&mut self, event: InputEvent, ctx: &mut GameContext) {
        if pressed(&self.back, event, ctx) {
            ctx.requests.switch_to(RESULTS, SceneData::none());
        } else if pressed(&self.play_again, event, ctx) {
            ctx.requests.push(SceneRequest::RestartGame);
        }
    }
}

impl SceneLifecycle for LeaderboardScene {
    type Context = GameContext;
    type Data = SceneData;

    fn init(&mut self, _ctx: &mut GameContext) {}

    fn enter(&mut self, _data: SceneData, ctx: &mut GameContext) {
        let now = Utc::now();
        let data = &ctx.match_data;
        self.rows = ctx
            .leaderboard
            .top_entries(DEFAULT_TOP_COUNT)
            .iter()
            .enumerate()
            .map(|(i, entry)| LeaderboardRow {
                rank: i + 1,
                team_name: entry.team_name.clone(),
                total_time: format_time(entry.total_time),
                date: format_date(&entry.timestamp, now),
                is_current: entry.team_name == data.team_name
                    && entry.total_time == data.total_time,
            })
            .collect();
    }

    fn update(&mut self, _dt: f32, _ctx: &mut GameContext) {}

    fn exit(&mut self, _ctx: &mut GameContext) {}
}
