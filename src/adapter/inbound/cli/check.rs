//! Handler for `check config`.

use std::path::Path;

use crate::adapter::inbound::cli::output;
use crate::adapter::outbound::credential::TOKEN_ENV_VAR;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;

/// Validate a configuration file without starting the server.
pub fn execute_config<P: AsRef<Path>>(config_path: P) -> Result<()> {
    let path = config_path.as_ref();
    let config = Config::load(path)?;

    output::section("Configuration Check");
    output::field("Config", path.display());
    output::success("Configuration file is valid");

    output::section("Summary");
    output::field("Listen", &config.server.bind);
    output::field("Webhook", &config.server.webhook_path);
    output::field("Initial stake", config.trading.initial_stake);
    output::field("Multiplier", config.trading.multiplier);
    output::field("Max level", config.trading.max_level);
    output::field(
        "Max exposure",
        output::highlight(sequence_exposure(&config)),
    );
    output::field("Outcome", config.monitor.policy.as_str());
    output::field("Broker", config.broker.kind.as_str());
    match &config.status_file {
        Some(path) => output::field("Status file", path.display()),
        None => output::field("Status file", output::missing()),
    }

    let env_token = std::env::var(TOKEN_ENV_VAR).is_ok_and(|t| !t.trim().is_empty());
    match (&config.broker.token_file, env_token) {
        (_, true) => output::success(&format!("Broker token found in {TOKEN_ENV_VAR}")),
        (Some(file), false) if file.exists() => output::success("Broker token file present"),
        (Some(file), false) => output::warning(&format!(
            "Token file {} does not exist yet",
            file.display()
        )),
        (None, false) => output::note("No broker token configured; paper broker runs without one"),
    }

    output::success("Configuration check complete");
    Ok(())
}

/// Total stake committed if every level of a sequence loses.
fn sequence_exposure(config: &Config) -> rust_decimal::Decimal {
    match config.trading.plan() {
        Ok(plan) => plan.max_exposure(),
        Err(_) => rust_decimal::Decimal::ZERO,
    }
}
