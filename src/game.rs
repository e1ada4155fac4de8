//! Game session
//!
//! Owns every service (no globals), the scene registry and the match flow.
//! One `tick` per frame runs: scene update → queued scene requests →
//! feedback. Input arrives between ticks through `handle_input`.

use std::rc::Rc;

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::chaos::{ChaosScheduler, EffectKind};
use crate::error::SceneError;
use crate::format_time;
use crate::leaderboard::Leaderboard;
use crate::levels::{ExternalContent, LevelContent, LevelContext, LevelKind, LevelLifecycle};
use crate::match_data::MatchData;
use crate::platform::{Clock, Storage};
use crate::runtime::{
    EventBus, FeedbackManager, GameMode, InputEvent, InputManager, SceneHost, SceneManager,
    Stage, StateMachine, Timer,
};
use crate::scenes::{
    self, CountdownScene, GameplayScene, Hud, LeaderboardScene, RegistrationScene,
    ResultsScene, Scene, SceneData, SceneRequest, SceneRequests, SplashScene, TransitionScene,
    TutorialScene,
};
use crate::settings::Settings;

/// Everything scenes can reach
pub struct GameContext {
    pub bus: Rc<EventBus>,
    pub state: StateMachine,
    pub input: InputManager,
    pub timer: Timer,
    pub feedback: FeedbackManager,
    pub stage: Stage,
    pub chaos: ChaosScheduler,
    pub match_data: MatchData,
    pub leaderboard: Leaderboard,
    pub settings: Settings,
    pub storage: Rc<dyn Storage>,
    /// Flow changes queued by scene hooks
    pub requests: SceneRequests,
    /// Incremented by every `start_game`
    pub match_id: u32,
    /// Feedback jitter
    rng: Pcg32,
}

impl GameContext {
    /// Borrow the services a level can reach
    pub fn level_context(&mut self) -> LevelContext<'_> {
        LevelContext {
            bus: self.bus.as_ref(),
            input: &mut self.input,
            timer: &mut self.timer,
            feedback: &mut self.feedback,
            stage: &mut self.stage,
            match_data: &mut self.match_data,
        }
    }

    fn apply_settings(&mut self) {
        let settings = &self.settings;
        self.chaos.set_enabled(settings.chaos_enabled);
        self.chaos.set_motion_scale(settings.motion_scale());
        self.chaos.set_default_immunity(settings.effective_immunity());
        self.feedback.set_enabled(settings.feedback_effects);
        self.feedback.set_motion_scale(settings.motion_scale());
    }
}

impl SceneHost for GameContext {
    fn bus(&self) -> &EventBus {
        &self.bus
    }

    fn stage_mut(&mut self) -> &mut Stage {
        &mut self.stage
    }
}

pub struct Game {
    ctx: GameContext,
    scenes: SceneManager<Scene>,
}

impl Game {
    /// Session whose levels complete through `complete_current_level`
    pub fn new(clock: Rc<dyn Clock>, storage: Rc<dyn Storage>) -> Self {
        Self::with_level_content(clock, storage, |_| Box::new(ExternalContent))
    }

    /// Session with custom puzzle content per level
    pub fn with_level_content(
        clock: Rc<dyn Clock>,
        storage: Rc<dyn Storage>,
        make: impl FnMut(LevelKind) -> Box<dyn LevelContent>,
    ) -> Self {
        let settings = Settings::load(&*storage);
        let leaderboard = Leaderboard::load(&*storage);
        let seed = settings.seed.unwrap_or_else(rand::random);
        log::info!("Session seed: {}", seed);

        let bus = Rc::new(EventBus::new());
        let mut ctx = GameContext {
            state: StateMachine::new(Rc::clone(&bus)),
            input: InputManager::new(Rc::clone(&bus)),
            timer: Timer::new(clock),
            feedback: FeedbackManager::new(),
            stage: Stage::new(),
            chaos: ChaosScheduler::new(Rc::clone(&bus), seed),
            match_data: MatchData::new(),
            leaderboard,
            settings,
            storage,
            requests: SceneRequests::default(),
            match_id: 0,
            rng: Pcg32::seed_from_u64(seed.wrapping_add(1)),
            bus,
        };
        ctx.apply_settings();

        let mut manager = SceneManager::new();
        manager.register(scenes::SPLASH, Scene::Splash(SplashScene::default()));
        manager.register(
            scenes::REGISTRATION,
            Scene::Registration(RegistrationScene::default()),
        );
        manager.register(scenes::TUTORIAL, Scene::Tutorial(TutorialScene::default()));
        manager.register(scenes::COUNTDOWN, Scene::Countdown(CountdownScene::default()));
        manager.register(
            scenes::GAMEPLAY,
            Scene::Gameplay(Box::new(GameplayScene::with_levels(
                LevelLifecycle::with_content(make),
            ))),
        );
        manager.register(scenes::TRANSITION, Scene::Transition(TransitionScene::default()));
        manager.register(scenes::RESULTS, Scene::Results(ResultsScene::default()));
        manager.register(
            scenes::LEADERBOARD,
            Scene::Leaderboard(LeaderboardScene::default()),
        );

        Self { ctx, scenes: manager }
    }

    /// Enter the splash screen
    pub fn start(&mut self) {
        log::info!("Eyes Off starting");
        if let Err(e) = self.switch_to(scenes::SPLASH, SceneData::none()) {
            log::error!("Cannot start: {}", e);
        }
    }

    /// Deliver one input event: pointer state first, then the current scene
    pub fn handle_input(&mut self, event: InputEvent) {
        self.ctx.input.handle(event);
        if let Some(scene) = self.scenes.current_mut() {
            scene.on_input(event, &mut self.ctx);
        }
        self.process_requests();
    }

    /// Advance one frame; `dt` is in ticks (1.0 = 1/60 s)
    pub fn tick(&mut self, dt: f32) {
        self.scenes.update(dt, &mut self.ctx);
        self.process_requests();
        let ctx = &mut self.ctx;
        ctx.feedback.update(dt, &mut ctx.stage, &mut ctx.rng);
    }

    /// Switch scenes and apply whatever the new scene queues on entry.
    /// An unknown name is logged and changes nothing.
    pub fn switch_to(&mut self, name: &str, data: SceneData) -> Result<(), SceneError> {
        let result = self.apply_switch(name, data);
        self.process_requests();
        result
    }

    fn apply_switch(&mut self, name: &str, data: SceneData) -> Result<(), SceneError> {
        if self.scenes.is_registered(name) {
            if let Some(mode) = scenes::mode_for(name) {
                self.ctx.state.set_state(mode);
            }
        }
        self.scenes.switch_to(name, data, &mut self.ctx)
    }

    /// Drain queued requests in order; requests queued while applying one
    /// are handled in the same drain.
    pub fn process_requests(&mut self) {
        while let Some(request) = self.ctx.requests.pop() {
            match request {
                SceneRequest::SwitchTo { name, data } => {
                    // Already logged by the scene manager
                    let _ = self.apply_switch(&name, data);
                }
                SceneRequest::StartGame => self.start_game(),
                SceneRequest::EndGame => self.end_game(),
                SceneRequest::RestartGame => self.restart_game(),
            }
        }
    }

    /// Fresh timer and timings for the registered team, then level 1
    pub fn start_game(&mut self) {
        let ctx = &mut self.ctx;
        ctx.timer.reset();
        ctx.timer.start();
        ctx.match_data.begin_match();
        ctx.match_id += 1;
        log::info!(
            "Match {} started for team {:?}",
            ctx.match_id,
            ctx.match_data.team_name
        );
        let _ = self.apply_switch(scenes::GAMEPLAY, SceneData::none());
    }

    /// Freeze the timer, record the total and show the results
    pub fn end_game(&mut self) {
        let ctx = &mut self.ctx;
        ctx.timer.stop();
        ctx.match_data.total_time = ctx.timer.elapsed();
        log::info!(
            "Match {} finished: {}",
            ctx.match_id,
            format_time(ctx.match_data.total_time)
        );
        let _ = self.apply_switch(scenes::RESULTS, SceneData::none());
    }

    /// Back to registration with a clean match record
    pub fn restart_game(&mut self) {
        let ctx = &mut self.ctx;
        ctx.timer.reset();
        ctx.match_data.reset();
        ctx.feedback.clear(&mut ctx.stage);
        let _ = self.apply_switch(scenes::REGISTRATION, SceneData::none());
    }

    /// Complete the current level from outside (puzzle solved). False when
    /// not playing or when the level already completed.
    pub fn complete_current_level(&mut self) -> bool {
        let Some(gameplay) = self.scenes.current_mut().and_then(Scene::as_gameplay_mut) else {
            log::debug!("No level to complete outside of gameplay");
            return false;
        };
        let completed = gameplay.complete_current(&mut self.ctx);
        self.process_requests();
        completed
    }

    /// Apply the current level's penalty
    pub fn report_violation(&mut self) {
        if let Some(gameplay) = self.scenes.current_mut().and_then(Scene::as_gameplay_mut) {
            gameplay.report_violation(&mut self.ctx);
        }
    }

    /// Force a chaos effect while playing
    pub fn trigger_chaos(&mut self, kind: EffectKind) -> bool {
        match self.scenes.current_mut().and_then(Scene::as_gameplay_mut) {
            Some(gameplay) => gameplay.trigger_chaos(kind, &mut self.ctx),
            None => false,
        }
    }

    /// Replace the settings, apply them and persist them
    pub fn set_settings(&mut self, settings: Settings) {
        self.ctx.settings = settings;
        self.ctx.apply_settings();
        self.ctx.settings.save(&*self.ctx.storage);
    }

    pub fn settings(&self) -> &Settings {
        &self.ctx.settings
    }

    pub fn mode(&self) -> GameMode {
        self.ctx.state.state()
    }

    pub fn current_scene(&self) -> Option<&str> {
        self.scenes.current_name()
    }

    pub fn scene(&self, name: &str) -> Option<&Scene> {
        self.scenes.get(name)
    }

    /// HUD snapshot of the gameplay scene
    pub fn hud(&self) -> Option<&Hud> {
        self.scenes
            .get(scenes::GAMEPLAY)
            .and_then(Scene::as_gameplay)
            .map(GameplayScene::hud)
    }

    pub fn timer(&self) -> &Timer {
        &self.ctx.timer
    }

    pub fn match_data(&self) -> &MatchData {
        &self.ctx.match_data
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.ctx.leaderboard
    }

    pub fn stage(&self) -> &Stage {
        &self.ctx.stage
    }

    pub fn input(&self) -> &InputManager {
        &self.ctx.input
    }

    pub fn chaos(&self) -> &ChaosScheduler {
        &self.ctx.chaos
    }

    pub fn bus(&self) -> &Rc<EventBus> {
        &self.ctx.bus
    }

    pub fn context(&self) -> &GameContext {
        &self.ctx
    }
}
