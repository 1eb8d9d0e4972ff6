//! dualtag: MFRC522 + RDM6300 keyboard wedge.
//!
//! Polls both readers in alternating time slices and types every accepted
//! identifier followed by Enter.

mod config;
mod console;
mod runner;
#[cfg(all(feature = "hardware-spi", feature = "hardware-serial"))]
mod wiring;

use anyhow::{Context, Result};
use clap::Parser;
use config::AppConfig;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "dualtag")]
#[command(about = "Types RFID tag identifiers from an MFRC522 and an RDM6300")]
#[command(version)]
struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// RDM6300 serial port, overrides the configuration file
    #[arg(short, long)]
    serial_port: Option<String>,

    /// Log at debug level regardless of RUST_LOG
    #[arg(long)]
    debug: bool,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    print_config: bool,
}

fn init_tracing(debug: bool) -> Result<()> {
    let filter = if debug {
        EnvFilter::try_new("debug")
    } else {
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))
    }
    .context("invalid log filter")?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init()
        .context("failed to install tracing subscriber")?;
    Ok(())
}

fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(port) = &args.serial_port {
        config.serial.port = port.clone();
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

#[cfg(all(feature = "hardware-spi", feature = "hardware-serial"))]
fn run_hardware(config: &AppConfig, stop: &AtomicBool) -> Result<()> {
    wiring::run(config, stop).map(|_| ())
}

#[cfg(not(all(feature = "hardware-spi", feature = "hardware-serial")))]
fn run_hardware(_config: &AppConfig, _stop: &AtomicBool) -> Result<()> {
    anyhow::bail!("built without reader support; enable the hardware-spi and hardware-serial features")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.debug)?;

    let config = load_config(&args)?;
    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    info!(
        "Starting dualtag v{} (RDM6300 on {})",
        env!("CARGO_PKG_VERSION"),
        config.serial.port
    );

    let stop = Arc::new(AtomicBool::new(false));

    let signal_stop = Arc::clone(&stop);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl-C received, stopping");
                signal_stop.store(true, Ordering::Relaxed);
            }
            Err(e) => warn!("Cannot listen for Ctrl-C: {}", e),
        }
    });

    let loop_stop = Arc::clone(&stop);
    tokio::task::spawn_blocking(move || run_hardware(&config, &loop_stop))
        .await
        .context("acquisition loop panicked")??;

    info!("dualtag stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_port_flag_overrides_default() {
        let args = Args::parse_from(["dualtag", "--serial-port", "/dev/ttyUSB0"]);
        let config = load_config(&args).unwrap();

        assert_eq!(config.serial.port, "/dev/ttyUSB0");
        assert_eq!(config.scheduler, AppConfig::default().scheduler);
    }

    #[test]
    fn test_flags_parse() {
        let args = Args::parse_from(["dualtag", "-c", "/etc/dualtag.json", "--debug"]);

        assert_eq!(args.config, Some(PathBuf::from("/etc/dualtag.json")));
        assert!(args.debug);
        assert!(!args.print_config);
    }

    #[test]
    fn test_missing_config_file_fails_startup() {
        let args = Args::parse_from(["dualtag", "--config", "/nonexistent/dualtag.json"]);

        assert!(load_config(&args).is_err());
    }
}
