//! Broker-agnostic domain types and the martingale state machine.

mod direction;
mod id;
mod order;
mod outcome;
mod sequence;
mod signal;

pub mod error;

pub use direction::Direction;
pub use id::{Asset, OrderId};
pub use order::{Balance, Order, OrderRequest, OrderResult, OrderStatus};
pub use outcome::{BalanceModel, Outcome};
pub use sequence::{
    MartingalePlan, SequenceEnd, SequencePhase, Transition, TradeSequenceState, TradeStatus,
    MAX_LEVEL_LIMIT,
};
pub use signal::{parse_time_of_day, ParsedNotification, Signal};
