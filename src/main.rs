//! # DSM Link
//!
//! Decode a Spektrum/JR DSM satellite receiver byte stream into supervised
//! RC channel values.
//!
//! This application opens the satellite serial stream, runs the decoder and
//! failsafe supervisor, and periodically logs the channel values the flight
//! core would read through the receiver registry.

use anyhow::Result;
use std::sync::Arc;
use tokio::time::{interval, Duration};
use tracing::{info, warn};
use tracing_subscriber;

mod config;
mod error;
mod dsm;
mod receiver;
mod transport;

use config::Config;
use dsm::device::DsmReceiver;
use receiver::driver::ChannelRead;
use receiver::registry::{ChannelGroup, ReceiverRegistry};
use receiver::software::SoftwareReceiver;
use transport::port_trait::{run_rx_pump, TokioSerialPort};
use transport::DsmSerial;

/// Number of supervisor ticks between status log messages
const STATUS_INTERVAL_TICKS: u64 = 2500;

/// Channels included in the periodic status log
const STATUS_CHANNELS: usize = 6;

/// Main entry point for DSM Link
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging with tracing subscriber
///    - Load configuration (optional first CLI argument)
///    - Open the satellite serial stream and spawn the receiver
///    - Register backends in the receiver registry
///
/// 2. **Main Loop**
///    - Drive the supervisor tick at the configured fixed rate
///    - Forward received bytes into the byte-ingest callback (pump task)
///    - Log a channel snapshot every ~4 seconds
///    - Handle Ctrl+C for shutdown
///
/// # Errors
///
/// Returns error if the serial port cannot be opened or the receiver fails
/// to initialize; both are fatal to bring-up.
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
        )
        .init();

    info!("DSM Link v{} starting...", env!("CARGO_PKG_VERSION"));

    // Load configuration; missing file falls back to defaults
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(&path)?,
        None => match Config::load("config/default.toml") {
            Ok(config) => config,
            Err(e) => {
                warn!("No config file loaded ({}), using defaults", e);
                Config::default()
            }
        },
    };

    // Open the satellite serial stream
    let serial = if config.serial.port.is_empty() {
        DsmSerial::open()?
    } else {
        DsmSerial::open_with_paths(&[config.serial.port.as_str()])?
    };
    info!("DSM satellite stream opened at: {}", serial.device_path());

    // Spawn the receiver; binding requires a board GPIO driver, which a
    // host-side serial adapter cannot provide
    if config.dsm.bind_pulses > 0 {
        warn!("bind_pulses set but no bind pin is available on this transport, skipping bind");
    }
    let device = DsmReceiver::spawn(config.dsm_timings(), config.dsm.event_queue_depth, None)?;

    // Populate the registry the way a board configuration would
    let mut registry = ReceiverRegistry::new();
    let dsm_handle = registry.register(Arc::new(device.clone()));
    registry.bind_group(config.receiver.dsm_group, dsm_handle);

    if config.receiver.software_channels > 0 {
        let sim = Arc::new(SoftwareReceiver::new(config.receiver.software_channels));
        let sim_handle = registry.register(sim);
        registry.bind_group(ChannelGroup::Software, sim_handle);
    }

    // Byte-arrival context: pump serial reads into the ingest callback
    tokio::spawn(run_rx_pump(
        TokioSerialPort::new(serial.into_stream()),
        device.clone(),
    ));

    // Tick context: fixed-rate supervisor
    let mut tick_interval = interval(Duration::from_micros(config.dsm.tick_period_us));

    info!(
        "Supervisor running at {} µs/tick (sync loss {} ticks, failsafe {} ticks)",
        config.dsm.tick_period_us, config.dsm.sync_loss_ticks, config.dsm.failsafe_ticks
    );
    info!("Press Ctrl+C to exit");

    let mut tick_count: u64 = 0;

    // Main control loop
    loop {
        tokio::select! {
            _ = tick_interval.tick() => {
                device.tick();
                tick_count += 1;

                if tick_count % STATUS_INTERVAL_TICKS == 0 {
                    let snapshot: Vec<ChannelRead> = (0..STATUS_CHANNELS)
                        .map(|ch| registry.get_group(config.receiver.dsm_group, ch))
                        .collect();
                    info!(
                        "Channels {:?}, {} valid frames, {} lost",
                        snapshot,
                        device.stats().valid_frames(),
                        device.stats().frames_lost()
                    );
                }
            }

            // Handle Ctrl+C for shutdown
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                info!("Total valid frames: {}", device.stats().valid_frames());
                break;
            }
        }
    }

    Ok(())
}
