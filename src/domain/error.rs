//! Domain validation errors.
//!
//! Raised when a martingale plan is built from invalid values or when the
//! sequence state machine is asked to perform a transition its current phase
//! does not allow.

use thiserror::Error;

use super::sequence::SequencePhase;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Stake amounts must be strictly positive.
    #[error("stake must be positive, got {stake}")]
    NonPositiveStake {
        /// The invalid stake that was provided.
        stake: rust_decimal::Decimal,
    },

    /// The martingale multiplier must not shrink the stake.
    #[error("multiplier must be at least 1, got {multiplier}")]
    MultiplierBelowOne {
        /// The invalid multiplier that was provided.
        multiplier: rust_decimal::Decimal,
    },

    /// More levels than a plan may have.
    #[error("max level {max_level} exceeds the limit of {limit}")]
    LevelTooHigh {
        /// The requested maximum level.
        max_level: u32,
        /// The accepted upper bound.
        limit: u32,
    },

    /// Stakes up to the maximum level do not fit in a decimal.
    #[error("stakes up to level {max_level} overflow")]
    StakeOverflow {
        /// The requested maximum level.
        max_level: u32,
    },

    /// A transition was requested from a phase that does not allow it.
    #[error("cannot {action} while sequence is {from}")]
    InvalidTransition {
        /// The phase the sequence was in.
        from: SequencePhase,
        /// The rejected action.
        action: &'static str,
    },
}
