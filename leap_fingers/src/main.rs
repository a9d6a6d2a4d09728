//! leap_fingers — entry point.

use leap_fingers::app::{run, AppError};
use leap_fingers::config::AppConfig;

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    #[cfg(feature = "leap")]
    log::info!("mode: LeapMotion hardware");
    #[cfg(not(feature = "leap"))]
    log::info!("mode: simulated hands (use --features leap for hardware)");

    if let Err(e) = load_config().and_then(run) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

/// `--config <path>` loads a TOML file; otherwise the built-in defaults.
fn load_config() -> Result<AppConfig, AppError> {
    let args: Vec<String> = std::env::args().collect();
    match args.iter().position(|a| a == "--config") {
        Some(i) => match args.get(i + 1) {
            Some(path) => {
                log::info!("loading config from {}", path);
                Ok(AppConfig::load(path)?)
            }
            None => {
                log::warn!("--config given without a path; using defaults");
                Ok(AppConfig::default())
            }
        },
        None => Ok(AppConfig::default()),
    }
}
