//! Top-level game mode tracker
//!
//! No transition table: `set_state` always overwrites. The game session only
//! calls it right before switching scenes.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::events::{EventBus, GameEvent};

/// Top-level game mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum GameMode {
    #[default]
    Splash,
    Registration,
    Tutorial,
    Countdown,
    Playing,
    Transition,
    Results,
    Leaderboard,
}

impl GameMode {
    pub const ALL: [GameMode; 8] = [
        GameMode::Splash,
        GameMode::Registration,
        GameMode::Tutorial,
        GameMode::Countdown,
        GameMode::Playing,
        GameMode::Transition,
        GameMode::Results,
        GameMode::Leaderboard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Splash => "splash",
            GameMode::Registration => "registration",
            GameMode::Tutorial => "tutorial",
            GameMode::Countdown => "countdown",
            GameMode::Playing => "playing",
            GameMode::Transition => "transition",
            GameMode::Results => "results",
            GameMode::Leaderboard => "leaderboard",
        }
    }
}

pub struct StateMachine {
    current: GameMode,
    bus: Rc<EventBus>,
}

impl StateMachine {
    pub fn new(bus: Rc<EventBus>) -> Self {
        Self {
            current: GameMode::Splash,
            bus,
        }
    }

    pub fn state(&self) -> GameMode {
        self.current
    }

    /// Overwrite the current mode and publish `state:changed`
    pub fn set_state(&mut self, next: GameMode) {
        let previous = self.current;
        self.current = next;
        log::debug!("State {} -> {}", previous.as_str(), next.as_str());
        self.bus.publish(GameEvent::StateChanged { next, previous });
    }

    pub fn is(&self, mode: GameMode) -> bool {
        self.current == mode
    }
}
