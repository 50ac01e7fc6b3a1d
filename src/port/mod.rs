//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! ```text
//!            webhook / CLI
//!                 │
//!                 ▼
//!        ┌─────────────────┐
//!        │  inbound port   │  SignalService
//!        ├─────────────────┤
//!        │   application   │  gate, timing, monitor, orchestrator
//!        ├─────────────────┤
//!        │  outbound port  │  Broker, CredentialSource, Clock,
//!        └─────────────────┘  NotificationParser, Notifier
//! ```

pub mod inbound;
pub mod outbound;

pub use inbound::signal::{CancelOutcome, SequenceStatus, SignalDisposition, SignalService};
pub use outbound::broker::{Broker, BrokerFactory, Credential};
pub use outbound::clock::{Clock, SystemClock};
pub use outbound::credential::CredentialSource;
pub use outbound::notifier::{
    Event, LogNotifier, Notifier, NotifierRegistry, NullNotifier, TradeEvent,
};
pub use outbound::parser::NotificationParser;
