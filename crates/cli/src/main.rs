use std::process::ExitCode;

use agrobill_core::config::{AppConfig, LoadOptions, LogFormat};

fn init_logging() {
    use tracing::Level;

    // Commands re-load and report config problems themselves; logging just
    // falls back to defaults when the config cannot be read here.
    let logging = AppConfig::load(LoadOptions::default())
        .map(|config| config.logging)
        .unwrap_or_default();
    let log_level = logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match logging.format {
        LogFormat::Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        LogFormat::Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

fn main() -> ExitCode {
    init_logging();
    agrobill_cli::run()
}
