//! Infrastructure configuration modules.

pub mod broker;
pub mod logging;
pub mod monitor;
pub mod parser;
pub mod server;
pub mod settings;
pub mod timing;
pub mod trading;

pub use settings::Config;
