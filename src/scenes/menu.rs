//! Pre-match scenes: splash, team registration, tutorial and countdown

use glam::Vec2;

use super::{Button, COUNTDOWN, REGISTRATION, SceneData, SceneRequest, TUTORIAL, pressed};
use crate::consts::{TEAM_NAME_MAX, TEAM_NAME_MIN, WIDTH};
use crate::game::GameContext;
use crate::runtime::{InputEvent, KeyInput, SceneLifecycle};

/// Ticks between blink toggles of prompts and the text caret
const BLINK_TICKS: f32 = 30.0;

#[derive(Debug, Default)]
pub struct SplashScene {
    blink_timer: f32,
    prompt_visible: bool,
}

impl SplashScene {
    pub fn prompt_visible(&self) -> bool {
        self.prompt_visible
    }

    pub(super) fn on_input(&mut self, event: InputEvent, ctx: &mut GameContext) {
        if let InputEvent::PointerDown { .. } = event {
            ctx.requests.switch_to(REGISTRATION, SceneData::none());
        }
    }
}

impl SceneLifecycle for SplashScene {
    type Context = GameContext;
    type Data = SceneData;

    fn init(&mut self, _ctx: &mut GameContext) {}

    fn enter(&mut self, _data: SceneData, _ctx: &mut GameContext) {
        self.blink_timer = 0.0;
        self.prompt_visible = true;
    }

    fn update(&mut self, dt: f32, _ctx: &mut GameContext) {
        self.blink_timer += dt;
        if self.blink_timer > BLINK_TICKS {
            self.blink_timer = 0.0;
            self.prompt_visible = !self.prompt_visible;
        }
    }

    fn exit(&mut self, _ctx: &mut GameContext) {}
}

/// Team name entry
#[derive(Debug)]
pub struct RegistrationScene {
    team_name: String,
    error: Option<String>,
    caret_visible: bool,
    caret_timer: f32,
    submit_button: Button,
}

impl Default for RegistrationScene {
    fn default() -> Self {
        Self {
            team_name: String::new(),
            error: None,
            caret_visible: true,
            caret_timer: 0.0,
            submit_button: Button::new(
                "START GAME",
                Vec2::new(WIDTH / 2.0, 600.0),
                Vec2::new(300.0, 60.0),
            ),
        }
    }
}

impl RegistrationScene {
    pub fn team_name(&self) -> &str {
        &self.team_name
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn submit_button(&self) -> Button {
        self.submit_button
    }

    /// Input field text with the blinking caret
    pub fn display_text(&self) -> String {
        if self.caret_visible {
            format!("{}|", self.team_name)
        } else {
            self.team_name.clone()
        }
    }

    fn type_key(&mut self, key: KeyInput, ctx: &mut GameContext) {
        match key {
            KeyInput::Enter => self.submit(ctx),
            KeyInput::Backspace => {
                self.team_name.pop();
            }
            KeyInput::Char(c) if c.is_ascii_alphanumeric() || c == ' ' => {
                if self.team_name.len() < TEAM_NAME_MAX {
                    self.team_name.push(c);
                }
            }
            KeyInput::Char(_) => {}
        }
    }

    fn submit(&mut self, ctx: &mut GameContext) {
        let trimmed = self.team_name.trim();
        let problem = if trimmed.len() < TEAM_NAME_MIN {
            Some(format!("Team name must be at least {} characters", TEAM_NAME_MIN))
        } else if trimmed.len() > TEAM_NAME_MAX {
            Some(format!("Team name must be at most {} characters", TEAM_NAME_MAX))
        } else {
            None
        };

        if let Some(message) = problem {
            log::warn!("Rejected team name {:?}: {}", trimmed, message);
            self.error = Some(message);
            ctx.feedback.error();
            return;
        }

        if ctx.leaderboard.is_duplicate(trimmed) {
            log::info!("Team {:?} is already on the leaderboard", trimmed);
        }
        ctx.match_data.set_team_name(trimmed);
        self.error = None;
        ctx.requests.switch_to(TUTORIAL, SceneData::none());
    }

    pub(super) fn on_input(&mut self, event: InputEvent, ctx: &mut GameContext) {
        match event {
            InputEvent::Key(key) => self.type_key(key, ctx),
            _ if pressed(&self.submit_button, event, ctx) => self.submit(ctx),
            _ => {}
        }
    }
}

impl SceneLifecycle for RegistrationScene {
    type Context = GameContext;
    type Data = SceneData;

    fn init(&mut self, _ctx: &mut GameContext) {}

    fn enter(&mut self, _data: SceneData, _ctx: &mut GameContext) {
        self.team_name.clear();
        self.error = None;
        self.caret_visible = true;
        self.caret_timer = 0.0;
    }

    fn update(&mut self, dt: f32, _ctx: &mut GameContext) {
        self.caret_timer += dt;
        if self.caret_timer > BLINK_TICKS {
            self.caret_timer = 0.0;
            self.caret_visible = !self.caret_visible;
        }
    }

    fn exit(&mut self, _ctx: &mut GameContext) {}
}

/// Role briefing; the ready button starts the countdown
#[derive(Debug)]
pub struct TutorialScene {
    team_label: String,
    ready: Button,
    /// Card bob phase (ticks)
    phase: f32,
}

impl Default for TutorialScene {
    fn default() -> Self {
        Self {
            team_label: String::new(),
            ready: Button::new(
                "NAVIGATOR IS BLINDFOLDED - START GAME",
                Vec2::new(WIDTH / 2.0, 850.0),
                Vec2::new(600.0, 70.0),
            ),
            phase: 0.0,
        }
    }
}

impl TutorialScene {
    pub fn team_label(&self) -> &str {
        &self.team_label
    }

    pub fn ready_button(&self) -> Button {
        self.ready
    }

    /// Vertical bob of the two role cards (navigator, guide), in opposite phase
    pub fn card_offsets(&self) -> (f32, f32) {
        let t = self.phase / 60.0 * 2.0;
        (t.sin() * 5.0, (t + std::f32::consts::PI).sin() * 5.0)
    }

    pub(super) fn on_input(&mut self, event: InputEvent, ctx: &mut GameContext) {
        if pressed(&self.ready, event, ctx) {
            ctx.requests.switch_to(COUNTDOWN, SceneData::none());
        }
    }
}

impl SceneLifecycle for TutorialScene {
    type Context = GameContext;
    type Data = SceneData;

    fn init(&mut self, _ctx: &mut GameContext) {}

    fn enter(&mut self, _data: SceneData, ctx: &mut GameContext) {
        self.team_label = format!("Team: {}", ctx.match_data.team_name);
        self.phase = 0.0;
    }

    fn update(&mut self, dt: f32, _ctx: &mut GameContext) {
        self.phase += dt;
    }

    fn exit(&mut self, _ctx: &mut GameContext) {}
}

/// Ticks each countdown number stays on screen
pub const COUNTDOWN_STEP_TICKS: f32 = 60.0;

const COUNT_FLASH: u32 = 0x00ffff;
const GO_FLASH: u32 = 0x00ff00;

/// 3-2-1-GO, then the match starts
#[derive(Debug)]
pub struct CountdownScene {
    count: i32,
    timer: f32,
    started: bool,
}

impl Default for CountdownScene {
    fn default() -> Self {
        Self {
            count: 3,
            timer: 0.0,
            started: false,
        }
    }
}

impl CountdownScene {
    /// "3", "2", "1" or "GO!"
    pub fn display(&self) -> String {
        if self.count > 0 {
            self.count.to_string()
        } else {
            "GO!".to_string()
        }
    }

    fn step_progress(&self) -> f32 {
        self.timer / COUNTDOWN_STEP_TICKS
    }

    /// Text grows by up to 30% during each step
    pub fn scale(&self) -> f32 {
        1.0 + self.step_progress() * 0.3
    }

    pub fn alpha(&self) -> f32 {
        (1.0 - self.step_progress() * 0.5).max(0.5)
    }
}

impl SceneLifecycle for CountdownScene {
    type Context = GameContext;
    type Data = SceneData;

    fn init(&mut self, _ctx: &mut GameContext) {}

    fn enter(&mut self, _data: SceneData, _ctx: &mut GameContext) {
        self.count = 3;
        self.timer = 0.0;
        self.started = true;
    }

    fn update(&mut self, dt: f32, ctx: &mut GameContext) {
        if !self.started {
            return;
        }
        self.timer += dt;
        if self.timer < COUNTDOWN_STEP_TICKS {
            return;
        }

        self.timer = 0.0;
        self.count -= 1;
        if self.count > 0 {
            ctx.feedback.flash(100.0, COUNT_FLASH);
            ctx.feedback.pulse(200.0, 0.1);
        } else if self.count == 0 {
            ctx.feedback.flash(200.0, GO_FLASH);
            ctx.feedback.pulse(300.0, 0.2);
        } else {
            self.started = false;
            ctx.requests.push(SceneRequest::StartGame);
        }
    }

    fn exit(&mut self, _ctx: &mut GameContext) {
        self.started = false;
    }
}
