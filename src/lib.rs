//! Eyes Off - a cooperative blindfolded party game
//!
//! One player (the Navigator) steers the cursor without looking, the other
//! (the Guide) watches the screen and talks them through six puzzle levels
//! while chaos effects scramble the controls.
//!
//! Core modules:
//! - `runtime`: Event bus, timer, input pipeline, state machine, scene manager
//! - `chaos`: Disruption effects and the scheduler that triggers them
//! - `levels`: Level lifecycle inside the Playing mode
//! - `scenes`: The eight top-level game modes
//! - `game`: Session object that owns every service and drives the frame tick
//! - `platform`: Clock and storage backends (browser/native/in-memory)

pub mod chaos;
pub mod error;
pub mod game;
pub mod leaderboard;
pub mod levels;
pub mod match_data;
pub mod platform;
pub mod runtime;
pub mod scenes;
pub mod settings;

pub use error::{HandlerError, LevelError, SceneError, StorageError};
pub use game::Game;
pub use leaderboard::{Leaderboard, LeaderboardEntry};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Logical game width (all positions are in this space)
    pub const WIDTH: f32 = 1920.0;
    /// Logical game height
    pub const HEIGHT: f32 = 1080.0;

    /// Conceptual update rate; one `dt` unit is one tick at this rate
    pub const TICKS_PER_SECOND: f32 = 60.0;
    /// Milliseconds represented by one tick
    pub const MS_PER_TICK: f32 = 1000.0 / TICKS_PER_SECOND;

    /// Ticks after a scene/level change during which chaos cannot trigger
    pub const DEFAULT_IMMUNITY_TICKS: f32 = 180.0;

    /// Number of levels in a match
    pub const TOTAL_LEVELS: u8 = 6;

    /// Team name length limits (characters, after trimming)
    pub const TEAM_NAME_MIN: usize = 3;
    pub const TEAM_NAME_MAX: usize = 20;
}

/// Format milliseconds as a fixed-width `MM:SS:mmm` clock string
pub fn format_time(milliseconds: f64) -> String {
    let total_ms = milliseconds.max(0.0).floor() as u64;
    let ms = total_ms % 1000;
    let total_seconds = total_ms / 1000;
    let seconds = total_seconds % 60;
    let minutes = total_seconds / 60;
    format!("{:02}:{:02}:{:03}", minutes, seconds, ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_format_time_pads_fields() {
        assert_eq!(format_time(0.0), "00:00:000");
        assert_eq!(format_time(61_005.9), "01:01:005");
        assert_eq!(format_time(-50.0), "00:00:000");
    }

    proptest! {
        #[test]
        fn format_time_round_trips_through_fields(ms in 0u64..5_999_999) {
            let text = format_time(ms as f64);
            let parts: Vec<u64> = text.split(':').map(|p| p.parse().unwrap()).collect();
            prop_assert_eq!(text.len(), 9);
            prop_assert_eq!(parts[0] * 60_000 + parts[1] * 1000 + parts[2], ms);
        }
    }
}
