//! Handler for `parse`: dry-run a notification through the parser and the
//! entry-time resolver.

use std::io::Read;
use std::path::Path;

use chrono::Utc;

use crate::adapter::inbound::cli::command::ParseArgs;
use crate::adapter::inbound::cli::output;
use crate::application::Lateness;
use crate::domain::Signal;
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::settings::Config;
use crate::port::NotificationParser;

pub fn execute(args: &ParseArgs) -> Result<()> {
    let config = if args.config.exists() {
        Config::load(&args.config)?
    } else {
        Config::default()
    };
    let text = read_input(&args.file)?;

    let parser = bootstrap::build_parser(&config)?;
    let parsed = parser.parse(&text);

    output::section("Parsed");
    let show = |label: &str, value: Option<String>| match value {
        Some(v) => output::field(label, output::highlight(v)),
        None => output::field(label, output::missing()),
    };
    show("Asset", parsed.asset.clone());
    show("Direction", parsed.direction.clone());
    show("Entry time", parsed.entry_time.clone());
    show(
        "Expiration",
        parsed.expiration.map(|d| format!("{}s", d.as_secs())),
    );

    let signal = Signal::from_parsed(&parsed)?;
    let resolver = bootstrap::build_resolver(&config)?;
    let now = Utc::now();
    let target = resolver.resolve(signal.entry_time, now)?;

    output::section("Resolved");
    output::field("Direction", signal.direction);
    output::field("Local entry", target.format("%Y-%m-%d %H:%M:%S %Z"));
    match resolver.check_lateness(target, now) {
        Lateness::Wait(d) => output::success(&format!("Entry in {:.1}s", d.as_secs_f64())),
        Lateness::Due => output::success("Entry is due now"),
        Lateness::Late(d) => output::warning(&format!(
            "Entry passed {:.1}s ago; this signal would be skipped",
            d.as_secs_f64()
        )),
    }
    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    Ok(std::fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, SignalError};
    use std::io::Write;
    use std::path::PathBuf;

    fn args_for(text: &str) -> (tempfile::NamedTempFile, ParseArgs) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{text}").unwrap();
        let args = ParseArgs {
            file: file.path().to_path_buf(),
            config: PathBuf::from("/nonexistent/config.toml"),
        };
        (file, args)
    }

    #[test]
    fn complete_notification_resolves() {
        let (_file, args) = args_for("🇪🇺 EUR/USD 🇺🇸 OTC\n🕘 Expiration 5M\n⏺ Entry at 10:59\n🟩 BUY");
        assert!(execute(&args).is_ok());
    }

    #[test]
    fn missing_direction_is_an_input_error() {
        let (_file, args) = args_for("EUR/USD\nEntry at 10:59");
        assert!(matches!(
            execute(&args),
            Err(Error::Signal(SignalError::MissingField { field: "direction" }))
        ));
    }
}
