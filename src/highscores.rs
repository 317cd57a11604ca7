//! Best survival times
//!
//! Kept in memory for the lifetime of the process; nothing is persisted.

use serde::{Deserialize, Serialize};

/// Maximum number of times to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Seconds survived
    pub survival_time: f64,
    /// 1-based index of the session within this process
    pub session: u32,
}

/// Leaderboard sorted by survival time, longest first
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a time qualifies for the leaderboard
    pub fn qualifies(&self, survival_time: f64) -> bool {
        if survival_time.is_nan() || survival_time <= 0.0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries
            .last()
            .map(|e| survival_time > e.survival_time)
            .unwrap_or(true)
    }

    /// Add a finished run. Returns the rank achieved (1-indexed) or None if
    /// it didn't qualify.
    pub fn add_time(&mut self, survival_time: f64, session: u32) -> Option<usize> {
        if !self.qualifies(survival_time) {
            return None;
        }

        let entry = HighScoreEntry {
            survival_time,
            session,
        };

        let pos = self
            .entries
            .iter()
            .position(|e| survival_time > e.survival_time);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Longest survival so far (if any)
    pub fn best(&self) -> Option<f64> {
        self.entries.first().map(|e| e.survival_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranks_longest_first() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_time(5.0, 1), Some(1));
        assert_eq!(scores.add_time(9.5, 2), Some(1));
        assert_eq!(scores.add_time(7.0, 3), Some(2));
        assert_eq!(scores.best(), Some(9.5));

        let sessions: Vec<u32> = scores.entries.iter().map(|e| e.session).collect();
        assert_eq!(sessions, vec![2, 3, 1]);
    }

    #[test]
    fn test_zero_time_never_qualifies() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_time(0.0, 1), None);
        assert_eq!(scores.add_time(-1.0, 2), None);
        assert_eq!(scores.add_time(f64::NAN, 3), None);
        assert!(scores.is_empty());
    }

    #[test]
    fn test_board_is_capped() {
        let mut scores = HighScores::new();
        for i in 1..=MAX_HIGH_SCORES as u32 {
            scores.add_time(i as f64, i);
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);

        // Slower than everything on a full board
        assert!(!scores.qualifies(0.5));
        assert_eq!(scores.add_time(0.5, 99), None);

        // Beats the slowest entry and pushes it out
        assert_eq!(scores.add_time(3.5, 100), Some(8));
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.entries.last().map(|e| e.survival_time), Some(2.0));
    }
}
