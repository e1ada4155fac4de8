//! The eight top-level game modes
//!
//! Scenes are a closed set dispatched through `Scene`. They never switch
//! scenes directly: they queue a `SceneRequest` on the context and the
//! `Game` applies it once the current hook has returned.

mod gameplay;
mod menu;
mod results;
mod transition;

pub use gameplay::{GameplayScene, Hud};
pub use menu::{CountdownScene, RegistrationScene, SplashScene, TutorialScene};
pub use results::{LeaderboardRow, LeaderboardScene, ResultsScene};
pub use transition::{TRANSITION_TICKS, TransitionScene};

use std::collections::VecDeque;
use std::fmt;

use glam::Vec2;

use crate::game::GameContext;
use crate::runtime::{GameMode, InputEvent, SceneLifecycle};

pub const SPLASH: &str = "splash";
pub const REGISTRATION: &str = "registration";
pub const TUTORIAL: &str = "tutorial";
pub const COUNTDOWN: &str = "countdown";
pub const GAMEPLAY: &str = "gameplay";
pub const TRANSITION: &str = "transition";
pub const RESULTS: &str = "results";
pub const LEADERBOARD: &str = "leaderboard";

/// Game mode a scene represents
pub fn mode_for(name: &str) -> Option<GameMode> {
    match name {
        SPLASH => Some(GameMode::Splash),
        REGISTRATION => Some(GameMode::Registration),
        TUTORIAL => Some(GameMode::Tutorial),
        COUNTDOWN => Some(GameMode::Countdown),
        GAMEPLAY => Some(GameMode::Playing),
        TRANSITION => Some(GameMode::Transition),
        RESULTS => Some(GameMode::Results),
        LEADERBOARD => Some(GameMode::Leaderboard),
        _ => None,
    }
}

/// Deferred work run by the Transition scene when it finishes
pub type Continuation = Box<dyn FnOnce(&mut SceneRequests)>;

/// Payload handed to `enter`
#[derive(Default)]
pub struct SceneData {
    /// Playing: resume at this level instead of starting a fresh match
    pub resume_level: Option<u8>,
    /// Transition: level about to start
    pub level: Option<u8>,
    /// Transition: run exactly once when the countdown ends
    pub callback: Option<Continuation>,
}

impl SceneData {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn resume(level: u8) -> Self {
        Self {
            resume_level: Some(level),
            ..Self::default()
        }
    }

    pub fn transition(level: u8, callback: Continuation) -> Self {
        Self {
            level: Some(level),
            callback: Some(callback),
            ..Self::default()
        }
    }
}

impl fmt::Debug for SceneData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneData")
            .field("resume_level", &self.resume_level)
            .field("level", &self.level)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

/// Flow changes requested by scenes
#[derive(Debug)]
pub enum SceneRequest {
    SwitchTo { name: String, data: SceneData },
    StartGame,
    EndGame,
    RestartGame,
}

/// FIFO of pending requests, drained by the `Game` after each hook
#[derive(Debug, Default)]
pub struct SceneRequests {
    queue: VecDeque<SceneRequest>,
}

impl SceneRequests {
    pub fn push(&mut self, request: SceneRequest) {
        self.queue.push_back(request);
    }

    pub fn switch_to(&mut self, name: &str, data: SceneData) {
        self.push(SceneRequest::SwitchTo {
            name: name.to_string(),
            data,
        });
    }

    pub fn pop(&mut self) -> Option<SceneRequest> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

/// Clickable rectangle in game coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Button {
    pub label: &'static str,
    pub center: Vec2,
    pub size: Vec2,
}

impl Button {
    pub const fn new(label: &'static str, center: Vec2, size: Vec2) -> Self {
        Self {
            label,
            center,
            size,
        }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        let half = self.size * 0.5;
        (p - self.center).abs().cmple(half).all()
    }
}

/// True for a pointer press landing on `button`
fn pressed(button: &Button, event: InputEvent, ctx: &GameContext) -> bool {
    matches!(event, InputEvent::PointerDown { .. }) && button.contains(ctx.input.position())
}

pub enum Scene {
    Splash(SplashScene),
    Registration(RegistrationScene),
    Tutorial(TutorialScene),
    Countdown(CountdownScene),
    Gameplay(Box<GameplayScene>),
    Transition(TransitionScene),
    Results(ResultsScene),
    Leaderboard(LeaderboardScene),
}

impl Scene {
    /// Route an input event to the scene. Pointer state has already been
    /// updated by the input manager.
    pub fn on_input(&mut self, event: InputEvent, ctx: &mut GameContext) {
        match self {
            Scene::Splash(s) => s.on_input(event, ctx),
            Scene::Registration(s) => s.on_input(event, ctx),
            Scene::Tutorial(s) => s.on_input(event, ctx),
            Scene::Results(s) => s.on_input(event, ctx),
            Scene::Leaderboard(s) => s.on_input(event, ctx),
            Scene::Countdown(_) | Scene::Gameplay(_) | Scene::Transition(_) => {}
        }
    }

    pub fn as_gameplay_mut(&mut self) -> Option<&mut GameplayScene> {
        match self {
            Scene::Gameplay(s) => Some(&mut **s),
            _ => None,
        }
    }

    pub fn as_gameplay(&self) -> Option<&GameplayScene> {
        match self {
            Scene::Gameplay(s) => Some(&**s),
            _ => None,
        }
    }
}

macro_rules! dispatch {
    ($self:ident, $s:ident => $body:expr) => {
        match $self {
            Scene::Splash($s) => $body,
            Scene::Registration($s) => $body,
            Scene::Tutorial($s) => $body,
            Scene::Countdown($s) => $body,
            Scene::Gameplay($s) => $body,
            Scene::Transition($s) => $body,
            Scene::Results($s) => $body,
            Scene::Leaderboard($s) => $body,
        }
    };
}

impl SceneLifecycle for Scene {
    type Context = GameContext;
    type Data = SceneData;

    fn init(&mut self, ctx: &mut GameContext) {
        dispatch!(self, s => s.init(ctx))
    }

    fn enter(&mut self, data: SceneData, ctx: &mut GameContext) {
        dispatch!(self, s => s.enter(data, ctx))
    }

    fn update(&mut self, dt: f32, ctx: &mut GameContext) {
        dispatch!(self, s => s.update(dt, ctx))
    }

    fn exit(&mut self, ctx: &mut GameContext) {
        dispatch!(self, s => s.exit(ctx))
    }
}
