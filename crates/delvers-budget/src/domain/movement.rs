//! Movement point ledger.

use serde::{Deserialize, Serialize};

/// Movement points for one turn.
///
/// Every mutation keeps `used + remaining == total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementLedger {
    total: u32,
    used: u32,
    remaining: u32,
}

impl MovementLedger {
    /// A fresh ledger holding `total` unused points.
    #[must_use]
    pub fn with_total(total: u32) -> Self {
        Self {
            total,
            used: 0,
            remaining: total,
        }
    }

    /// Total points granted this turn.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Points spent this turn.
    #[must_use]
    pub fn used(&self) -> u32 {
        self.used
    }

    /// Points still available.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Adds `points` to both total and remaining.
    pub fn grant(&mut self, points: u32) {
        self.total = self.total.saturating_add(points);
        self.remaining = self.total - self.used;
    }

    /// Spends one point. Returns `false` if none remain.
    pub fn spend_one(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.used += 1;
        self.remaining -= 1;
        true
    }

    /// Halves the remaining points (rounding down), shrinking the total to
    /// match.
    pub fn halve_remaining(&mut self) {
        self.remaining /= 2;
        self.total = self.used + self.remaining;
    }
}
