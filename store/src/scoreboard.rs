//! Scoreboard demo: one replay channel, one plain channel, side by side.
//!
//! The score rides a replay channel: whoever looks at the scoreboard,
//! however late, sees the current score at once. Bulletins ride a plain
//! channel; they are live announcements, and a listener that tunes in
//! late has simply missed them.

use statecast_core::{Channel, ChannelReader};

/// Numeric score broadcast with last-value replay, plus ephemeral
/// bulletin announcements.
#[derive(Debug, Clone)]
pub struct Scoreboard {
    score: Channel<u64>,
    bulletins: Channel<String>,
}

impl Scoreboard {
    /// Creates a scoreboard with the score at 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            score: Channel::replay_seeded(0).with_name("scoreboard.score"),
            bulletins: Channel::plain().with_name("scoreboard.bulletins"),
        }
    }

    /// Read side of the score channel; subscribers immediately receive
    /// the current score.
    #[must_use]
    pub fn score(&self) -> ChannelReader<u64> {
        self.score.reader()
    }

    /// Read side of the bulletin channel; announcements are not retained.
    #[must_use]
    pub fn bulletins(&self) -> ChannelReader<String> {
        self.bulletins.reader()
    }

    /// The current score.
    #[must_use]
    pub fn current_score(&self) -> u64 {
        self.score.current_value().unwrap_or(0)
    }

    /// Updates the score and notifies everyone.
    pub fn set_score(&self, score: u64) {
        tracing::debug!(score, "score updated");
        self.score.emit(score);
    }

    /// Broadcasts a live announcement to current listeners only.
    pub fn announce(&self, bulletin: impl Into<String>) {
        self.bulletins.emit(bulletin.into());
    }
}

impl Default for Scoreboard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn score_replays_to_late_subscribers() {
        let board = Scoreboard::new();
        board.set_score(21);

        let seen: Arc<Mutex<Vec<u64>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = board.score().subscribe(move |score| sink.lock().unwrap().push(*score));

        assert_eq!(*seen.lock().unwrap(), vec![21]);
        assert_eq!(board.current_score(), 21);
    }

    #[test]
    fn bulletins_are_missed_by_late_subscribers() {
        let board = Scoreboard::new();
        board.announce("kick-off");

        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = board
            .bulletins()
            .subscribe(move |bulletin| sink.lock().unwrap().push(bulletin.clone()));

        assert!(seen.lock().unwrap().is_empty());

        board.announce("goal!");
        assert_eq!(*seen.lock().unwrap(), vec!["goal!".to_string()]);
    }

    #[test]
    fn score_starts_at_zero() {
        assert_eq!(Scoreboard::new().current_score(), 0);
    }
}
