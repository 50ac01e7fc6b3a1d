//! Martingale sequence state machine.
//!
//! ```text
//!   Idle ──arm──▶ Armed ──order_placed──▶ AwaitingOutcome
//!                   ▲                          │
//!                   └──── resolve(loss) ───────┤  level < max
//!                                              │
//!   Idle ◀── gate release ◀── Finished ◀───────┘  win / tie / loss at max
//! ```
//!
//! All mutation goes through the transition methods on
//! [`TradeSequenceState`]; fields are read through accessors only. The
//! sequence gate owns the single instance and resets it on release.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::direction::Direction;
use super::error::DomainError;
use super::id::{Asset, OrderId};
use super::outcome::Outcome;

/// Phase of the current sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SequencePhase {
    Idle,
    Armed,
    AwaitingOutcome,
}

impl fmt::Display for SequencePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Armed => "armed",
            Self::AwaitingOutcome => "awaiting_outcome",
        })
    }
}

/// Status of the most recent trade in the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Pending,
    Win,
    Loss,
    Tie,
    Uncertain,
}

impl From<Outcome> for TradeStatus {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Win => Self::Win,
            Outcome::Loss => Self::Loss,
            Outcome::Tie => Self::Tie,
            Outcome::Uncertain => Self::Uncertain,
        }
    }
}

/// Highest `max_level` a plan accepts.
pub const MAX_LEVEL_LIMIT: u32 = 64;

/// Fixed-ratio martingale parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MartingalePlan {
    initial_stake: Decimal,
    multiplier: Decimal,
    max_level: u32,
}

impl MartingalePlan {
    /// Build a plan.
    ///
    /// # Errors
    ///
    /// Rejects a non-positive initial stake, a multiplier below one, a
    /// `max_level` above [`MAX_LEVEL_LIMIT`] and plans whose total exposure
    /// does not fit in a [`Decimal`].
    pub fn try_new(
        initial_stake: Decimal,
        multiplier: Decimal,
        max_level: u32,
    ) -> Result<Self, DomainError> {
        if initial_stake <= Decimal::ZERO {
            return Err(DomainError::NonPositiveStake {
                stake: initial_stake,
            });
        }
        if multiplier < Decimal::ONE {
            return Err(DomainError::MultiplierBelowOne { multiplier });
        }
        if max_level > MAX_LEVEL_LIMIT {
            return Err(DomainError::LevelTooHigh {
                max_level,
                limit: MAX_LEVEL_LIMIT,
            });
        }

        let mut stake = initial_stake;
        let mut total = initial_stake;
        for _ in 0..max_level {
            stake = stake
                .checked_mul(multiplier)
                .ok_or(DomainError::StakeOverflow { max_level })?;
            total = total
                .checked_add(stake)
                .ok_or(DomainError::StakeOverflow { max_level })?;
        }

        Ok(Self {
            initial_stake,
            multiplier,
            max_level,
        })
    }

    #[must_use]
    pub const fn initial_stake(&self) -> Decimal {
        self.initial_stake
    }

    #[must_use]
    pub const fn multiplier(&self) -> Decimal {
        self.multiplier
    }

    /// Highest level that may be traded (0-indexed).
    #[must_use]
    pub const fn max_level(&self) -> u32 {
        self.max_level
    }

    /// Stake committed at a given level. Saturates past `max_level`.
    #[must_use]
    pub fn stake_for(&self, level: u32) -> Decimal {
        (0..level).fold(self.initial_stake, |stake, _| {
            stake.saturating_mul(self.multiplier)
        })
    }

    /// Sum of the stakes at every level, the most a sequence can lose.
    #[must_use]
    pub fn max_exposure(&self) -> Decimal {
        (0..=self.max_level).map(|level| self.stake_for(level)).sum()
    }
}

impl Default for MartingalePlan {
    fn default() -> Self {
        Self {
            initial_stake: Decimal::ONE,
            multiplier: Decimal::TWO,
            max_level: 2,
        }
    }
}

/// How a sequence ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceEnd {
    Won,
    Tied,
    MaxLevelLoss,
    PlacementFailed,
    Cancelled,
}

impl fmt::Display for SequenceEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Won => "won",
            Self::Tied => "tied",
            Self::MaxLevelLoss => "max_level_loss",
            Self::PlacementFailed => "placement_failed",
            Self::Cancelled => "cancelled",
        })
    }
}

/// What the orchestrator must do after an outcome is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Place the next trade at the given level and stake.
    ReEnter { level: u32, stake: Decimal },
    /// The sequence is over; release the gate.
    Finished(SequenceEnd),
}

/// State of the single in-flight martingale sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TradeSequenceState {
    #[serde(skip)]
    plan: MartingalePlan,
    active: bool,
    phase: SequencePhase,
    asset: Option<Asset>,
    direction: Option<Direction>,
    level: u32,
    stake: Decimal,
    last_order_id: Option<OrderId>,
    last_status: Option<TradeStatus>,
    balance_before: Option<Decimal>,
    started_at: Option<DateTime<Utc>>,
}

impl TradeSequenceState {
    /// Idle state for the given plan.
    #[must_use]
    pub fn new(plan: MartingalePlan) -> Self {
        Self {
            plan,
            active: false,
            phase: SequencePhase::Idle,
            asset: None,
            direction: None,
            level: 0,
            stake: plan.initial_stake(),
            last_order_id: None,
            last_status: None,
            balance_before: None,
            started_at: None,
        }
    }

    #[must_use]
    pub const fn plan(&self) -> &MartingalePlan {
        &self.plan
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub const fn phase(&self) -> SequencePhase {
        self.phase
    }

    #[must_use]
    pub const fn asset(&self) -> Option<&Asset> {
        self.asset.as_ref()
    }

    #[must_use]
    pub const fn direction(&self) -> Option<Direction> {
        self.direction
    }

    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    #[must_use]
    pub const fn stake(&self) -> Decimal {
        self.stake
    }

    #[must_use]
    pub const fn last_order_id(&self) -> Option<&OrderId> {
        self.last_order_id.as_ref()
    }

    #[must_use]
    pub const fn last_status(&self) -> Option<TradeStatus> {
        self.last_status
    }

    #[must_use]
    pub const fn balance_before(&self) -> Option<Decimal> {
        self.balance_before
    }

    #[must_use]
    pub const fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Idle → Armed: start a sequence for a new signal at level 0.
    ///
    /// # Errors
    ///
    /// Fails unless the state is idle.
    pub fn arm(
        &mut self,
        asset: Asset,
        direction: Direction,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.expect_phase(SequencePhase::Idle, "arm")?;
        *self = Self {
            active: true,
            phase: SequencePhase::Armed,
            asset: Some(asset),
            direction: Some(direction),
            started_at: Some(now),
            ..Self::new(self.plan)
        };
        Ok(())
    }

    /// Armed → AwaitingOutcome: an order was accepted by the broker.
    ///
    /// # Errors
    ///
    /// Fails unless the state is armed.
    pub fn order_placed(
        &mut self,
        order_id: OrderId,
        balance_before: Option<Decimal>,
    ) -> Result<(), DomainError> {
        self.expect_phase(SequencePhase::Armed, "record a placed order")?;
        self.phase = SequencePhase::AwaitingOutcome;
        self.last_order_id = Some(order_id);
        self.last_status = Some(TradeStatus::Pending);
        self.balance_before = balance_before;
        Ok(())
    }

    /// Apply the outcome of the awaited trade.
    ///
    /// A loss below the maximum level re-arms the sequence one level up with
    /// the stake multiplied; anything else finishes it.
    ///
    /// # Errors
    ///
    /// Fails unless the state is awaiting an outcome.
    pub fn resolve(&mut self, outcome: Outcome) -> Result<Transition, DomainError> {
        self.expect_phase(SequencePhase::AwaitingOutcome, "resolve an outcome")?;
        self.last_status = Some(outcome.into());

        if !outcome.is_loss() {
            let end = if outcome == Outcome::Tie {
                SequenceEnd::Tied
            } else {
                SequenceEnd::Won
            };
            return Ok(Transition::Finished(end));
        }

        if self.level >= self.plan.max_level() {
            return Ok(Transition::Finished(SequenceEnd::MaxLevelLoss));
        }

        self.level += 1;
        self.stake = self.plan.stake_for(self.level);
        self.phase = SequencePhase::Armed;
        self.balance_before = None;
        Ok(Transition::ReEnter {
            level: self.level,
            stake: self.stake,
        })
    }

    /// The broker rejected the order for the current level.
    ///
    /// # Errors
    ///
    /// Fails unless the state is armed.
    pub fn placement_failed(&mut self) -> Result<SequenceEnd, DomainError> {
        self.expect_phase(SequencePhase::Armed, "record a placement failure")?;
        self.last_status = None;
        Ok(SequenceEnd::PlacementFailed)
    }

    /// Return to idle defaults.
    pub fn reset(&mut self) {
        *self = Self::new(self.plan);
    }

    fn expect_phase(&self, phase: SequencePhase, action: &'static str) -> Result<(), DomainError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(DomainError::InvalidTransition {
                from: self.phase,
                action,
            })
        }
    }
}
