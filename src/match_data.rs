//! Per-match record: team name and level timings

use serde::{Deserialize, Serialize};

use crate::consts::TOTAL_LEVELS;

/// Level names, indexed by level number - 1
pub const LEVEL_NAMES: [&str; TOTAL_LEVELS as usize] = [
    "Digital Cleanup",
    "Password Panic",
    "Bomb Defusal",
    "Safe Cracker",
    "Laser Heist",
    "Maze Escape",
];

/// Name for a level number, "Unknown" outside 1..=6
pub fn level_name(level: u8) -> &'static str {
    level
        .checked_sub(1)
        .and_then(|i| LEVEL_NAMES.get(i as usize))
        .copied()
        .unwrap_or("Unknown")
}

/// Time spent on one level (ms, timer time so penalties included)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelTime {
    pub level: u8,
    pub name: String,
    pub time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchData {
    pub team_name: String,
    pub total_time: f64,
    pub current_level: u8,
    pub level_times: Vec<LevelTime>,
    pub level_start_time: f64,
}

impl Default for MatchData {
    fn default() -> Self {
        Self {
            team_name: String::new(),
            total_time: 0.0,
            current_level: 1,
            level_times: Vec::new(),
            level_start_time: 0.0,
        }
    }
}

impl MatchData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear everything, team name included
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Clear timings for a new match, keeping the registered team
    pub fn begin_match(&mut self) {
        let team_name = std::mem::take(&mut self.team_name);
        *self = Self {
            team_name,
            ..Self::default()
        };
    }

    pub fn set_team_name(&mut self, name: &str) {
        self.team_name = name.trim().to_string();
    }

    pub fn start_level(&mut self, level: u8, start_time: f64) {
        self.current_level = level;
        self.level_start_time = start_time;
    }

    /// Record the current level's time and return it
    pub fn complete_level(&mut self, end_time: f64) -> f64 {
        let time = end_time - self.level_start_time;
        self.level_times.push(LevelTime {
            level: self.current_level,
            name: level_name(self.current_level).to_string(),
            time,
        });
        time
    }

    pub fn is_last_level(&self) -> bool {
        self.current_level >= TOTAL_LEVELS
    }

    pub fn next_level(&self) -> u8 {
        self.current_level + 1
    }

    /// Sum of the recorded level times
    pub fn sum_level_times(&self) -> f64 {
        self.level_times.iter().map(|t| t.time).sum()
    }
}
