//! Leaderboard of completed matches
//!
//! Sorted ascending by total time (fastest first). Persisted as a JSON array
//! through the platform `Storage`; storage failures are logged and the board
//! behaves as empty / unsaved.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::platform::Storage;

/// Rows shown on the leaderboard screen
pub const DEFAULT_TOP_COUNT: usize = 15;

/// One completed match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub team_name: String,
    /// Milliseconds, penalties included
    pub total_time: f64,
    /// Per-level milliseconds, level 1 first
    pub level_times: Vec<f64>,
    /// RFC 3339
    pub timestamp: String,
}

impl LeaderboardEntry {
    /// Entry stamped with the current time
    pub fn new(team_name: &str, total_time: f64, level_times: Vec<f64>) -> Self {
        Self {
            team_name: team_name.to_string(),
            total_time,
            level_times,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub const STORAGE_KEY: &'static str = "eyesoff_leaderboard";

    pub fn new() -> Self {
        Self::default()
    }

    /// Insert keeping the order; returns the 1-indexed rank. Ties rank after
    /// the entries already on the board.
    pub fn add_entry(&mut self, entry: LeaderboardEntry) -> usize {
        let index = self
            .entries
            .iter()
            .position(|e| e.total_time > entry.total_time)
            .unwrap_or(self.entries.len());
        self.entries.insert(index, entry);
        index + 1
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn top_entries(&self, count: usize) -> &[LeaderboardEntry] {
        &self.entries[..count.min(self.entries.len())]
    }

    /// 1-indexed rank of the first entry with exactly this team name
    pub fn position(&self, team_name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.team_name == team_name)
            .map(|i| i + 1)
    }

    /// Case-insensitive name check
    pub fn is_duplicate(&self, team_name: &str) -> bool {
        let wanted = team_name.to_lowercase();
        self.entries
            .iter()
            .any(|e| e.team_name.to_lowercase() == wanted)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn try_load(storage: &dyn Storage) -> Result<Self, StorageError> {
        let Some(json) = storage.get_item(Self::STORAGE_KEY)? else {
            return Ok(Self::new());
        };
        let mut board: Self = serde_json::from_str(&json)?;
        board
            .entries
            .sort_by(|a, b| a.total_time.total_cmp(&b.total_time));
        Ok(board)
    }

    /// Load from storage, empty on any failure
    pub fn load(storage: &dyn Storage) -> Self {
        match Self::try_load(storage) {
            Ok(board) => {
                log::info!("Loaded {} leaderboard entries", board.len());
                board
            }
            Err(e) => {
                log::error!("Failed to load leaderboard: {}", e);
                Self::new()
            }
        }
    }

    pub fn try_save(&self, storage: &dyn Storage) -> Result<(), StorageError> {
        let json = serde_json::to_string(self)?;
        storage.set_item(Self::STORAGE_KEY, &json)
    }

    /// Save to storage; failures are logged only
    pub fn save(&self, storage: &dyn Storage) {
        match self.try_save(storage) {
            Ok(()) => log::info!("Leaderboard saved ({} entries)", self.len()),
            Err(e) => log::error!("Failed to save leaderboard: {}", e),
        }
    }
}

/// Relative date for a leaderboard row ("Just now", "3 days ago", "4/12/26")
pub fn format_date(timestamp: &str, now: DateTime<Utc>) -> String {
    let Ok(then) = DateTime::parse_from_rfc3339(timestamp) else {
        return "N/A".to_string();
    };
    let then = then.with_timezone(&Utc);
    let diff = now.signed_duration_since(then);

    let days = diff.num_days();
    let hours = diff.num_hours();
    let mins = diff.num_minutes();

    if days >= 1 {
        if days == 1 {
            "Yesterday".to_string()
        } else if days < 7 {
            format!("{} days ago", days)
        } else {
            then.format("%-m/%-d/%y").to_string()
        }
    } else if hours >= 1 {
        if hours == 1 {
            "1 hour ago".to_string()
        } else {
            format!("{} hours ago", hours)
        }
    } else if mins >= 1 {
        if mins == 1 {
            "1 min ago".to_string()
        } else {
            format!("{} mins ago", mins)
        }
    } else {
        "Just now".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStorage;
    use chrono::{Duration, TimeZone};

    fn entry(name: &str, total: f64) -> LeaderboardEntry {
        LeaderboardEntry {
            team_name: name.to_string(),
            total_time: total,
            level_times: vec![total],
            timestamp: "2026-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn test_add_entry_returns_rank() {
        let mut board = Leaderboard::new();
        assert_eq!(board.add_entry(entry("Slow", 90_000.0)), 1);
        assert_eq!(board.add_entry(entry("Fast", 30_000.0)), 1);
        assert_eq!(board.add_entry(entry("Mid", 60_000.0)), 2);
        assert_eq!(board.add_entry(entry("Tie", 60_000.0)), 3);

        let names: Vec<&str> = board.entries().iter().map(|e| e.team_name.as_str()).collect();
        assert_eq!(names, vec!["Fast", "Mid", "Tie", "Slow"]);
        assert_eq!(board.position("Slow"), Some(4));
        assert_eq!(board.position("Nobody"), None);
        assert_eq!(board.top_entries(2).len(), 2);
        assert_eq!(board.top_entries(50).len(), 4);
    }

    #[test]
    fn test_duplicate_is_case_insensitive() {
        let mut board = Leaderboard::new();
        board.add_entry(entry("Night Owls", 1.0));
        assert!(board.is_duplicate("night owls"));
        assert!(board.is_duplicate("NIGHT OWLS"));
        assert!(!board.is_duplicate("Night"));
    }

    #[test]
    fn test_persisted_format_and_round_trip() {
        let storage = MemoryStorage::new();
        let mut board = Leaderboard::new();
        board.add_entry(entry("Alpha", 1234.0));
        board.save(&storage);

        let json = storage.get_item(Leaderboard::STORAGE_KEY).unwrap().unwrap();
        assert!(json.starts_with('['));
        assert!(json.contains("\"teamName\":\"Alpha\""));
        assert!(json.contains("\"totalTime\":1234.0"));
        assert!(json.contains("\"levelTimes\""));

        assert_eq!(Leaderboard::load(&storage), board);
    }

    #[test]
    fn test_corrupt_storage_loads_empty() {
        let storage = MemoryStorage::new();
        storage
            .set_item(Leaderboard::STORAGE_KEY, "{not json")
            .unwrap();
        assert!(Leaderboard::try_load(&storage).is_err());
        assert!(Leaderboard::load(&storage).is_empty());
    }

    #[test]
    fn test_format_date() {
        let now = Utc.with_ymd_and_hms(2026, 4, 20, 12, 0, 0).unwrap();
        let ago = |d: Duration| (now - d).to_rfc3339();
        assert_eq!(format_date(&ago(Duration::seconds(20)), now), "Just now");
        assert_eq!(format_date(&ago(Duration::minutes(5)), now), "5 mins ago");
        assert_eq!(format_date(&ago(Duration::hours(1)), now), "1 hour ago");
        assert_eq!(format_date(&ago(Duration::days(1)), now), "Yesterday");
        assert_eq!(format_date(&ago(Duration::days(3)), now), "3 days ago");
        assert_eq!(format_date(&ago(Duration::days(8)), now), "4/12/26");
        assert_eq!(format_date("garbage", now), "N/A");
    }
}
