//! Level sequencing inside the Playing mode
//!
//! `start_level` order: validate → exit/detach previous → init once →
//! record start time → attach → enter → `level:started`.
//! Each activation honours exactly one completion.

use super::{ExternalContent, LevelContent, LevelKind, LevelSignal};
use crate::error::LevelError;
use crate::format_time;
use crate::match_data::MatchData;
use crate::runtime::{EventBus, FeedbackManager, GameEvent, InputManager, Stage, Timer};

/// Services a level can reach
pub struct LevelContext<'a> {
    pub bus: &'a EventBus,
    pub input: &'a mut InputManager,
    pub timer: &'a mut Timer,
    pub feedback: &'a mut FeedbackManager,
    pub stage: &'a mut Stage,
    pub match_data: &'a mut MatchData,
}

/// Where the match goes after a level completes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelAdvance {
    Next(u8),
    /// The last level is done
    Finished,
}

/// Level shell around a piece of content
pub struct Level {
    kind: LevelKind,
    content: Box<dyn LevelContent>,
    initialized: bool,
    completed: bool,
    frozen_ticks: f32,
}

impl Level {
    pub fn new(kind: LevelKind, content: Box<dyn LevelContent>) -> Self {
        Self {
            kind,
            content,
            initialized: false,
            completed: false,
            frozen_ticks: 0.0,
        }
    }

    pub fn kind(&self) -> LevelKind {
        self.kind
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Input is ignored while a freeze penalty runs
    pub fn is_frozen(&self) -> bool {
        self.frozen_ticks > 0.0
    }

    /// Returns true on the update that completes the level
    fn update(&mut self, dt: f32, ctx: &mut LevelContext) -> bool {
        if self.completed {
            return false;
        }
        if self.frozen_ticks > 0.0 {
            self.frozen_ticks -= dt;
            return false;
        }
        match self.content.update(dt, ctx) {
            LevelSignal::Continue => false,
            LevelSignal::Violation => {
                self.penalize(ctx);
                false
            }
            LevelSignal::Completed => self.mark_complete(),
        }
    }

    fn penalize(&mut self, ctx: &mut LevelContext) {
        let Some(penalty) = self.kind.penalty() else {
            log::debug!("{} has no penalty", self.kind.name());
            return;
        };
        ctx.timer.add_penalty(penalty.ms);
        ctx.feedback.error();
        if penalty.freeze_ticks > 0.0 {
            self.frozen_ticks = penalty.freeze_ticks;
        }
        log::info!("Penalty +{}ms on {}", penalty.ms, self.kind.name());
        ctx.bus.publish(GameEvent::PenaltyAdded { ms: penalty.ms });
    }

    /// Set the completion guard. False if it was already set.
    fn mark_complete(&mut self) -> bool {
        if self.completed {
            return false;
        }
        self.completed = true;
        true
    }
}

pub struct LevelLifecycle {
    levels: Vec<Level>,
    current: Option<usize>,
}

impl Default for LevelLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelLifecycle {
    /// All six levels with externally driven content
    pub fn new() -> Self {
        Self::with_content(|_| Box::new(ExternalContent))
    }

    pub fn with_content(mut make: impl FnMut(LevelKind) -> Box<dyn LevelContent>) -> Self {
        Self {
            levels: LevelKind::ALL
                .into_iter()
                .map(|kind| Level::new(kind, make(kind)))
                .collect(),
            current: None,
        }
    }

    pub fn start_level(&mut self, n: u8, ctx: &mut LevelContext) -> Result<(), LevelError> {
        let kind = LevelKind::from_number(n).inspect_err(|e| log::error!("{}", e))?;

        if let Some(previous) = self.current.take() {
            let level = &mut self.levels[previous];
            level.content.exit(ctx);
            ctx.stage.detach(&level.kind.root());
        }

        let index = kind as usize;
        let level = &mut self.levels[index];
        if !level.initialized {
            level.content.init(ctx);
            level.initialized = true;
        }
        level.completed = false;
        level.frozen_ticks = 0.0;

        ctx.match_data.start_level(n, ctx.timer.elapsed());
        ctx.stage.attach(&kind.root());
        level.content.enter(ctx);
        self.current = Some(index);

        log::info!("Level {} started: {}", n, kind.name());
        ctx.bus.publish(GameEvent::LevelStarted { level: n });
        Ok(())
    }

    /// Forward a frame to the current level
    pub fn update(&mut self, dt: f32, ctx: &mut LevelContext) -> Option<LevelAdvance> {
        let index = self.current?;
        if self.levels[index].update(dt, ctx) {
            Some(self.finish(index, ctx))
        } else {
            None
        }
    }

    /// Completion hook for the current level. Ignored while a freeze
    /// penalty runs and for repeat calls within one activation.
    pub fn complete_current(&mut self, ctx: &mut LevelContext) -> Option<LevelAdvance> {
        let index = self.current?;
        if self.levels[index].is_frozen() {
            log::debug!("Level {} is frozen, completion ignored", index + 1);
            return None;
        }
        if !self.levels[index].mark_complete() {
            log::debug!("Level {} already completed", index + 1);
            return None;
        }
        Some(self.finish(index, ctx))
    }

    /// Apply the current level's penalty (for content driven from outside)
    pub fn report_violation(&mut self, ctx: &mut LevelContext) {
        if let Some(index) = self.current {
            self.levels[index].penalize(ctx);
        }
    }

    fn finish(&mut self, index: usize, ctx: &mut LevelContext) -> LevelAdvance {
        let number = self.levels[index].kind.number();
        let time = ctx.match_data.complete_level(ctx.timer.elapsed());
        log::info!("Level {} complete in {}", number, format_time(time));
        ctx.bus.publish(GameEvent::LevelCompleted {
            level: number,
            time_ms: time,
        });

        if ctx.match_data.is_last_level() {
            LevelAdvance::Finished
        } else {
            let next = ctx.match_data.next_level();
            ctx.match_data.current_level = next;
            LevelAdvance::Next(next)
        }
    }

    /// Exit and detach the current level, if any
    pub fn exit_current(&mut self, ctx: &mut LevelContext) {
        if let Some(index) = self.current.take() {
            let level = &mut self.levels[index];
            level.content.exit(ctx);
            ctx.stage.detach(&level.kind.root());
        }
    }

    pub fn current_level(&self) -> Option<u8> {
        self.current.map(|i| self.levels[i].kind.number())
    }

    pub fn current(&self) -> Option<&Level> {
        self.current.map(|i| &self.levels[i])
    }

    pub fn level(&self, n: u8) -> Option<&Level> {
        LevelKind::from_number(n).ok().map(|k| &self.levels[k as usize])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::ScriptedContent;
    use crate::platform::ManualClock;
    use crate::runtime::{EventLog, Topic};
    use std::cell::Cell;
    use std::rc::Rc;

    struct Fixture {
        bus: Rc<EventBus>,
        clock: ManualClock,
        input: InputManager,
        timer: Timer,
        feedback: FeedbackManager,
        stage: Stage,
        match_data: MatchData,
    }

    impl Fixture {
        fn new() -> Self {
            let bus = Rc::new(EventBus::new());
            let clock = ManualClock::new();
            let mut timer = Timer::new(Rc::new(clock.clone()));
            timer.start();
            Self {
                input: InputManager::new(Rc::clone(&bus)),
                bus,
                clock,
                timer,
                feedback: FeedbackManager::new(),
                stage: Stage::new(),
                match_data: MatchData::new(),
            }
        }

        fn ctx(&mut self) -> LevelContext<'_> {
            LevelContext {
                bus: &self.bus,
                input: &mut self.input,
                timer: &mut self.timer,
                feedback: &mut self.feedback,
                stage: &mut self.stage,
                match_data: &mut self.match_data,
            }
        }
    }

    struct CountingContent {
        inits: Rc<Cell<u32>>,
    }

    impl LevelContent for CountingContent {
        fn init(&mut self, _ctx: &mut LevelContext) {
            self.inits.set(self.inits.get() + 1);
        }

        fn update(&mut self, _dt: f32, _ctx: &mut LevelContext) -> LevelSignal {
            LevelSignal::Continue
        }
    }

    #[test]
    fn test_double_completion_records_once() {
        let mut fx = Fixture::new();
        let log = EventLog::new();
        log.attach(&fx.bus, &[Topic::LevelCompleted]);
        let mut levels = LevelLifecycle::new();

        levels.start_level(1, &mut fx.ctx()).unwrap();
        fx.clock.advance(4000.0);
        assert_eq!(levels.complete_current(&mut fx.ctx()), Some(LevelAdvance::Next(2)));
        assert_eq!(levels.complete_current(&mut fx.ctx()), None);

        assert_eq!(fx.match_data.level_times.len(), 1);
        assert_eq!(fx.match_data.level_times[0].time, 4000.0);
        assert_eq!(log.count(Topic::LevelCompleted), 1);
    }

    #[test]
    fn test_content_completion_then_external_call_is_ignored() {
        let mut fx = Fixture::new();
        let mut levels =
            LevelLifecycle::with_content(|_| Box::new(ScriptedContent::new(1.0, Vec::new())));
        levels.start_level(3, &mut fx.ctx()).unwrap();
        assert_eq!(levels.update(1.0, &mut fx.ctx()), Some(LevelAdvance::Next(4)));
        assert_eq!(levels.complete_current(&mut fx.ctx()), None);
        assert_eq!(levels.update(1.0, &mut fx.ctx()), None);
        assert_eq!(fx.match_data.level_times.len(), 1);
    }

    #[test]
    fn test_out_of_range_changes_nothing() {
        let mut fx = Fixture::new();
        let mut levels = LevelLifecycle::new();
        levels.start_level(2, &mut fx.ctx()).unwrap();
        let before = fx.match_data.clone();

        assert_eq!(
            levels.start_level(7, &mut fx.ctx()),
            Err(LevelError::OutOfRange(7))
        );
        assert_eq!(levels.start_level(0, &mut fx.ctx()), Err(LevelError::OutOfRange(0)));
        assert_eq!(levels.current_level(), Some(2));
        assert_eq!(fx.match_data, before);
        assert!(fx.stage.is_attached("level:2"));
    }

    #[test]
    fn test_init_once_and_roots_swap() {
        let mut fx = Fixture::new();
        let inits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&inits);
        let mut levels = LevelLifecycle::with_content(move |_| {
            Box::new(CountingContent {
                inits: Rc::clone(&counter),
            })
        });

        levels.start_level(1, &mut fx.ctx()).unwrap();
        levels.start_level(2, &mut fx.ctx()).unwrap();
        levels.start_level(1, &mut fx.ctx()).unwrap();
        assert_eq!(inits.get(), 2);
        assert!(fx.stage.is_attached("level:1"));
        assert!(!fx.stage.is_attached("level:2"));
    }

    #[test]
    fn test_last_level_finishes() {
        let mut fx = Fixture::new();
        let mut levels = LevelLifecycle::new();
        levels.start_level(6, &mut fx.ctx()).unwrap();
        assert_eq!(levels.complete_current(&mut fx.ctx()), Some(LevelAdvance::Finished));
    }

    #[test]
    fn test_violation_applies_penalty_and_freeze() {
        let mut fx = Fixture::new();
        let log = EventLog::new();
        log.attach(&fx.bus, &[Topic::PenaltyAdded]);
        let mut levels =
            LevelLifecycle::with_content(|_| Box::new(ScriptedContent::new(10.0, vec![1.0])));

        levels.start_level(6, &mut fx.ctx()).unwrap();
        assert_eq!(levels.update(1.0, &mut fx.ctx()), None);
        assert_eq!(fx.timer.penalties(), 3000.0);
        assert_eq!(log.events(), vec![GameEvent::PenaltyAdded { ms: 3000.0 }]);
        assert!(levels.current().unwrap().is_frozen());
        assert_eq!(fx.feedback.active_count(), 2);

        // Frozen for 180 ticks, then 9 more content ticks to complete
        for _ in 0..180 {
            assert_eq!(levels.update(1.0, &mut fx.ctx()), None);
        }
        assert!(!levels.current().unwrap().is_frozen());
        let finished = (0..20).find_map(|_| levels.update(1.0, &mut fx.ctx()));
        assert_eq!(finished, Some(LevelAdvance::Finished));
    }

    #[test]
    fn test_completion_waits_for_freeze_to_end() {
        let mut fx = Fixture::new();
        let mut levels = LevelLifecycle::new();
        levels.start_level(5, &mut fx.ctx()).unwrap();
        levels.report_violation(&mut fx.ctx());
        assert!(levels.current().unwrap().is_frozen());

        assert_eq!(levels.complete_current(&mut fx.ctx()), None);
        assert!(!levels.current().unwrap().is_completed());
        assert!(fx.match_data.level_times.is_empty());

        for _ in 0..180 {
            levels.update(1.0, &mut fx.ctx());
        }
        assert_eq!(levels.complete_current(&mut fx.ctx()), Some(LevelAdvance::Next(6)));
        assert_eq!(fx.match_data.level_times.len(), 1);
    }

    #[test]
    fn test_violation_without_penalty_is_free() {
        let mut fx = Fixture::new();
        let mut levels = LevelLifecycle::new();
        levels.start_level(1, &mut fx.ctx()).unwrap();
        levels.report_violation(&mut fx.ctx());
        assert_eq!(fx.timer.penalties(), 0.0);

        levels.start_level(3, &mut fx.ctx()).unwrap();
        levels.report_violation(&mut fx.ctx());
        assert_eq!(fx.timer.penalties(), 5000.0);
        assert!(!levels.current().unwrap().is_frozen());
    }
}
