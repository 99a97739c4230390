use std::fmt;

use serde::{Deserialize, Serialize};

/// Hysteresis flags carried from one control cycle to the next.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ApproachState {
    /// Turning pulses are allowed.
    pub can_turn: bool,
    /// Final approach is in progress.
    pub approached: bool,
    /// Forks were raised after losing the target; drive commands are suppressed.
    pub fork_override: bool,
}

impl Default for ApproachState {
    fn default() -> Self {
        Self {
            can_turn: true,
            approached: false,
            fork_override: false,
        }
    }
}

impl ApproachState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_initial(&self) -> bool {
        *self == Self::default()
    }
}

/// What a single cycle did, for logs and reports.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApproachPhase {
    /// No usable navigation vector; the rover was stopped.
    Searching,
    Turning,
    Approaching,
    AtTarget,
    /// Fork override is active; no drive commands were issued.
    ForkOverride,
}

impl fmt::Display for ApproachPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ApproachPhase::Searching => "searching",
            ApproachPhase::Turning => "turning",
            ApproachPhase::Approaching => "approaching",
            ApproachPhase::AtTarget => "at-target",
            ApproachPhase::ForkOverride => "fork-override",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_restores_initial_flags() {
        let mut s = ApproachState {
            can_turn: false,
            approached: true,
            fork_override: true,
        };
        assert!(!s.is_initial());
        s.reset();
        assert!(s.is_initial());
        assert!(s.can_turn && !s.approached && !s.fork_override);
    }
}
