//! Active effects on heroes and monsters.

use serde::{Deserialize, Serialize};

/// What an effect does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// A monster may attack once more this turn.
    ExtraAttack,
    /// A hero may take one more action this turn.
    ExtraAction,
    /// The bearer can be moved through.
    Passable,
    /// Remaining movement is halved when the effect lands.
    MovementHalved,
    /// Adds `magnitude` movement points.
    BonusMovement,
    /// Adds `magnitude` attack dice.
    AttackBonus,
    /// Adds `magnitude` defense dice.
    DefenseBonus,
}

/// When an effect fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectTrigger {
    /// As soon as it is added.
    Immediate,
    /// At the start of the bearer's turn.
    TurnStart,
    /// When the bearer moves.
    OnMove,
    /// When the bearer attacks.
    OnAttack,
    /// When the bearer defends.
    OnDefend,
}

/// When an effect is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectExpiry {
    /// At the end of the bearer's turn; for monsters, the end of the GM phase.
    EndOfTurn,
    /// When the quest ends.
    EndOfQuest,
    /// Never.
    Permanent,
}

/// A time- or trigger-bound modifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveEffect {
    /// Spell, item or ability that produced the effect.
    pub source: String,
    /// What the effect does.
    pub kind: EffectKind,
    /// Strength of the effect; meaning depends on `kind`.
    pub magnitude: i32,
    /// When it fires.
    pub trigger: EffectTrigger,
    /// When it is removed.
    pub expiry: EffectExpiry,
    /// Whether it already fired.
    pub applied: bool,
}

impl ActiveEffect {
    /// A new, not yet applied effect.
    pub fn new(
        source: impl Into<String>,
        kind: EffectKind,
        magnitude: i32,
        trigger: EffectTrigger,
        expiry: EffectExpiry,
    ) -> Self {
        Self {
            source: source.into(),
            kind,
            magnitude,
            trigger,
            expiry,
            applied: false,
        }
    }
}

/// Marks every unapplied effect matching `trigger` as applied and returns
/// copies of them.
pub(crate) fn fire(effects: &mut [ActiveEffect], trigger: EffectTrigger) -> Vec<ActiveEffect> {
    effects
        .iter_mut()
        .filter(|effect| effect.trigger == trigger && !effect.applied)
        .map(|effect| {
            effect.applied = true;
            effect.clone()
        })
        .collect()
}

/// Drops effects that end with the current turn.
pub(crate) fn expire_end_of_turn(effects: &mut Vec<ActiveEffect>) {
    effects.retain(|effect| effect.expiry != EffectExpiry::EndOfTurn);
}
