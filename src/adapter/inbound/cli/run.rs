//! Handler for the `run` command.

use crate::adapter::inbound::cli::command::RunArgs;
use crate::adapter::inbound::cli::output;
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::settings::Config;

/// Load configuration, apply overrides and serve until Ctrl-C.
pub async fn execute(args: &RunArgs) -> Result<()> {
    let mut config = Config::load(&args.config)?;
    apply_overrides(&mut config, args);
    config.validate()?;
    config.init_logging();

    if !output::is_quiet() || output::is_json() {
        print_startup(&config);
    }

    bootstrap::run(config, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

fn apply_overrides(config: &mut Config, args: &RunArgs) {
    if let Some(bind) = &args.bind {
        config.server.bind.clone_from(bind);
    }
    if let Some(level) = &args.log_level {
        config.logging.level.clone_from(level);
    }
    if args.json_logs || output::is_json() {
        config.logging.format = "json".to_string();
    }
    if let Some(path) = &args.status_file {
        config.status_file = Some(path.clone());
    }
}

fn print_startup(config: &Config) {
    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Listen", &config.server.bind);
    output::field("Webhook", &config.server.webhook_path);
    output::field("Broker", config.broker.kind.as_str());
    output::field(
        "Plan",
        format!(
            "stake {} x{} up to level {}",
            config.trading.initial_stake, config.trading.multiplier, config.trading.max_level
        ),
    );
    output::field("Outcome", config.monitor.policy.as_str());
    if output::verbosity() > 0 {
        output::field(
            "Time zones",
            format!(
                "{} -> {}",
                config.timing.signal_timezone, config.timing.local_timezone
            ),
        );
        output::field("Grace", format!("{}s", config.trading.grace_secs));
    }
}
