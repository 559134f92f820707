//! The session lifecycle.

use std::fmt;

/// The session's state-machine stage.
///
/// ```text
///            join (2nd)        both ready           game_over
/// Waiting ─────────────→ Armed ──────────→ Active ───────────→ Ended
///    ↑                                    ↺ turn                 │
///    │                                                           │
///    └──── reset (3rd join, disconnect) from any state ──────────┘
///                                     Ended ──(both ready)──→ Active
/// ```
///
/// - **Waiting**: zero or one participant.
/// - **Armed**: two participants, not both ready.
/// - **Active**: two ready participants, a turn is in progress.
/// - **Ended**: a round finished via `game_over`. Both participants stay
///   seated with their ready flags cleared; a new ready cycle starts the
///   next round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    #[default]
    Waiting,
    Armed,
    Active,
    Ended,
}

impl Phase {
    /// Returns `true` while a turn is in progress.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }

    /// Returns `true` if a completed ready cycle may start a battle from
    /// this phase.
    pub fn can_start_battle(self) -> bool {
        matches!(self, Self::Armed | Self::Ended)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Armed => "armed",
            Self::Active => "active",
            Self::Ended => "ended",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_default_is_waiting() {
        assert_eq!(Phase::default(), Phase::Waiting);
    }

    #[test]
    fn test_phase_is_active() {
        assert!(!Phase::Waiting.is_active());
        assert!(!Phase::Armed.is_active());
        assert!(Phase::Active.is_active());
        assert!(!Phase::Ended.is_active());
    }

    #[test]
    fn test_phase_can_start_battle() {
        assert!(!Phase::Waiting.can_start_battle());
        assert!(Phase::Armed.can_start_battle());
        assert!(!Phase::Active.can_start_battle());
        assert!(Phase::Ended.can_start_battle());
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::Waiting.to_string(), "waiting");
        assert_eq!(Phase::Ended.to_string(), "ended");
    }
}
