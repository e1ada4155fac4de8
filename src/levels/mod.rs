//! The six levels played inside the Playing mode
//!
//! Puzzle logic lives behind `LevelContent`; the shell around it (timing,
//! penalties, single completion) lives in `lifecycle`.

pub mod lifecycle;

pub use lifecycle::{Level, LevelAdvance, LevelContext, LevelLifecycle};

use serde::{Deserialize, Serialize};

use crate::consts::TOTAL_LEVELS;
use crate::error::LevelError;
use crate::match_data::LEVEL_NAMES;

/// Penalty applied when level content reports a rule violation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Penalty {
    pub ms: f64,
    /// Ticks during which the level ignores input afterwards
    pub freeze_ticks: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LevelKind {
    DigitalCleanup,
    PasswordPanic,
    BombDefusal,
    SafeCracker,
    LaserHeist,
    MazeEscape,
}

impl LevelKind {
    pub const ALL: [LevelKind; TOTAL_LEVELS as usize] = [
        LevelKind::DigitalCleanup,
        LevelKind::PasswordPanic,
        LevelKind::BombDefusal,
        LevelKind::SafeCracker,
        LevelKind::LaserHeist,
        LevelKind::MazeEscape,
    ];

    pub fn from_number(n: u8) -> Result<Self, LevelError> {
        n.checked_sub(1)
            .and_then(|i| Self::ALL.get(i as usize))
            .copied()
            .ok_or(LevelError::OutOfRange(n))
    }

    /// 1-based level number
    pub fn number(&self) -> u8 {
        *self as u8 + 1
    }

    pub fn name(&self) -> &'static str {
        LEVEL_NAMES[*self as usize]
    }

    /// Stage root the level attaches while active
    pub fn root(&self) -> String {
        format!("level:{}", self.number())
    }

    pub fn penalty(&self) -> Option<Penalty> {
        match self {
            LevelKind::BombDefusal => Some(Penalty {
                ms: 5000.0,
                freeze_ticks: 0.0,
            }),
            LevelKind::LaserHeist | LevelKind::MazeEscape => Some(Penalty {
                ms: 3000.0,
                freeze_ticks: 180.0,
            }),
            _ => None,
        }
    }
}

/// What level content reports back from an update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LevelSignal {
    #[default]
    Continue,
    /// Rule broken (wrong wire, laser, wall)
    Violation,
    Completed,
}

/// Puzzle logic of one level
pub trait LevelContent {
    /// Build the level once, on first activation
    fn init(&mut self, _ctx: &mut LevelContext) {}
    fn enter(&mut self, _ctx: &mut LevelContext) {}
    fn update(&mut self, dt: f32, ctx: &mut LevelContext) -> LevelSignal;
    fn exit(&mut self, _ctx: &mut LevelContext) {}
}

/// Content with no puzzle of its own; completion comes from outside
/// (`Game::complete_current_level`).
#[derive(Debug, Clone, Copy, Default)]
pub struct ExternalContent;

impl LevelContent for ExternalContent {
    fn update(&mut self, _dt: f32, _ctx: &mut LevelContext) -> LevelSignal {
        LevelSignal::Continue
    }
}

/// Content that plays itself: reports violations at fixed tick marks and
/// completes after a fixed number of ticks. Drives the headless runner.
#[derive(Debug, Clone, Default)]
pub struct ScriptedContent {
    pub complete_after: f32,
    pub violations_at: Vec<f32>,
    ticks: f32,
    next_violation: usize,
}

impl ScriptedContent {
    pub fn new(complete_after: f32, violations_at: Vec<f32>) -> Self {
        Self {
            complete_after,
            violations_at,
            ticks: 0.0,
            next_violation: 0,
        }
    }
}

impl LevelContent for ScriptedContent {
    fn enter(&mut self, _ctx: &mut LevelContext) {
        self.ticks = 0.0;
        self.next_violation = 0;
    }

    fn update(&mut self, dt: f32, _ctx: &mut LevelContext) -> LevelSignal {
        self.ticks += dt;
        if let Some(&at) = self.violations_at.get(self.next_violation) {
            if self.ticks >= at {
                self.next_violation += 1;
                return LevelSignal::Violation;
            }
        }
        if self.ticks >= self.complete_after {
            LevelSignal::Completed
        } else {
            LevelSignal::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_numbers() {
        for (i, kind) in LevelKind::ALL.iter().enumerate() {
            assert_eq!(kind.number() as usize, i + 1);
            assert_eq!(LevelKind::from_number(kind.number()), Ok(*kind));
        }
        assert_eq!(LevelKind::from_number(0), Err(LevelError::OutOfRange(0)));
        assert_eq!(LevelKind::from_number(7), Err(LevelError::OutOfRange(7)));
        assert_eq!(LevelKind::SafeCracker.name(), "Safe Cracker");
        assert_eq!(LevelKind::MazeEscape.root(), "level:6");
    }

    #[test]
    fn test_penalties() {
        assert_eq!(LevelKind::DigitalCleanup.penalty(), None);
        assert_eq!(LevelKind::BombDefusal.penalty().map(|p| p.ms), Some(5000.0));
        let laser = LevelKind::LaserHeist.penalty().unwrap();
        assert_eq!((laser.ms, laser.freeze_ticks), (3000.0, 180.0));
    }
}
