//! Per-target build state.
//!
//! ```text
//! Clean ─────────────────────────────────────────────┐ (terminal)
//! Stale ─→ Combining ─→ Minifying ─→ Written | Failed
//!    └──────────┴──────────────┴───────↗
//! ```
//!
//! `Combining` and `Minifying` are skipped when the artifact is disabled.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetState {
    Clean,
    Stale,
    Combining,
    Minifying,
    Written,
    Failed,
}

impl TargetState {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Clean | Self::Written | Self::Failed)
    }

    /// Whether `next` may follow `self`.
    pub const fn can_advance_to(self, next: Self) -> bool {
        use TargetState::*;
        matches!(
            (self, next),
            (Clean, Stale)
                | (Stale, Combining | Minifying | Written | Failed)
                | (Combining, Minifying | Written | Failed)
                | (Minifying, Written | Failed)
        )
    }
}

impl fmt::Display for TargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Clean => "clean",
            Self::Stale => "stale",
            Self::Combining => "combining",
            Self::Minifying => "minifying",
            Self::Written => "written",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}
