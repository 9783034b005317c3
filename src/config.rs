//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! All values are fixed at initialization; the only runtime-negotiated
//! receiver parameter is the wire resolution, which is detected from live
//! traffic, never configured.

use serde::Deserialize;
use serde::de::Error;
use std::fs;
use std::path::Path;

use crate::dsm::decoder::{
    DsmTimings, DEFAULT_FAILSAFE_TICKS, DEFAULT_SYNC_LOSS_TICKS, DEFAULT_TICK_PERIOD_US,
};
use crate::dsm::device::DEFAULT_EVENT_QUEUE_DEPTH;
use crate::error::Result;
use crate::receiver::registry::ChannelGroup;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub serial: SerialConfig,

    #[serde(default)]
    pub dsm: DsmConfig,

    #[serde(default)]
    pub receiver: ReceiverConfig,
}

/// Serial port configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    /// Device path; empty means auto-detect across the default candidates
    #[serde(default)]
    pub port: String,
}

/// DSM decoder and supervisor configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DsmConfig {
    /// Ticks of byte silence before a new collection window opens
    #[serde(default = "default_sync_loss_ticks")]
    pub sync_loss_ticks: u32,

    /// Ticks without a valid frame before failsafe trips
    #[serde(default = "default_failsafe_ticks")]
    pub failsafe_ticks: u32,

    /// Supervisor tick period in microseconds
    #[serde(default = "default_tick_period_us")]
    pub tick_period_us: u64,

    /// Bound of the event queue between callbacks and the decoder task
    #[serde(default = "default_event_queue_depth")]
    pub event_queue_depth: usize,

    /// Bind pulse pairs to emit at power-up; 0 skips binding
    #[serde(default)]
    pub bind_pulses: u8,

    /// Accumulate the receiver's lost-frame counter (opt-in)
    #[serde(default)]
    pub track_lost_frames: bool,
}

/// Channel-group wiring configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ReceiverConfig {
    /// Logical channel group the DSM backend serves
    #[serde(default = "default_dsm_group")]
    pub dsm_group: ChannelGroup,

    /// Channels exposed by the software/simulation backend; 0 disables it
    #[serde(default = "default_software_channels")]
    pub software_channels: usize,
}

// Default value functions
fn default_sync_loss_ticks() -> u32 { DEFAULT_SYNC_LOSS_TICKS }
fn default_failsafe_ticks() -> u32 { DEFAULT_FAILSAFE_TICKS }
fn default_tick_period_us() -> u64 { DEFAULT_TICK_PERIOD_US }
fn default_event_queue_depth() -> usize { DEFAULT_EVENT_QUEUE_DEPTH }

fn default_dsm_group() -> ChannelGroup { ChannelGroup::Dsm }
fn default_software_channels() -> usize { 8 }

impl Default for SerialConfig {
    fn default() -> Self {
        Self { port: String::new() }
    }
}

impl Default for DsmConfig {
    fn default() -> Self {
        Self {
            sync_loss_ticks: default_sync_loss_ticks(),
            failsafe_ticks: default_failsafe_ticks(),
            tick_period_us: default_tick_period_us(),
            event_queue_depth: default_event_queue_depth(),
            bind_pulses: 0,
            track_lost_frames: false,
        }
    }
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            dsm_group: default_dsm_group(),
            software_channels: default_software_channels(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            serial: SerialConfig::default(),
            dsm: DsmConfig::default(),
            receiver: ReceiverConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Supervisor timings derived from the DSM section
    pub fn dsm_timings(&self) -> DsmTimings {
        DsmTimings {
            sync_loss_ticks: self.dsm.sync_loss_ticks,
            failsafe_ticks: self.dsm.failsafe_ticks,
            track_lost_frames: self.dsm.track_lost_frames,
        }
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.dsm.sync_loss_ticks == 0 {
            return Err(crate::error::DsmLinkError::Config(
                toml::de::Error::custom("sync_loss_ticks must be greater than 0")
            ));
        }

        if self.dsm.failsafe_ticks <= self.dsm.sync_loss_ticks {
            return Err(crate::error::DsmLinkError::Config(
                toml::de::Error::custom("failsafe_ticks must be greater than sync_loss_ticks")
            ));
        }

        if self.dsm.tick_period_us < 100 || self.dsm.tick_period_us > 100_000 {
            return Err(crate::error::DsmLinkError::Config(
                toml::de::Error::custom("tick_period_us must be between 100 and 100000")
            ));
        }

        if self.dsm.event_queue_depth == 0 || self.dsm.event_queue_depth > 4096 {
            return Err(crate::error::DsmLinkError::Config(
                toml::de::Error::custom("event_queue_depth must be between 1 and 4096")
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());

        assert_eq!(config.dsm.sync_loss_ticks, 4);
        assert_eq!(config.dsm.failsafe_ticks, 64);
        assert_eq!(config.dsm.tick_period_us, 1600);
        assert_eq!(config.dsm.bind_pulses, 0);
        assert!(!config.dsm.track_lost_frames);
        assert_eq!(config.receiver.dsm_group, ChannelGroup::Dsm);
    }

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.dsm.sync_loss_ticks, 4);
        assert_eq!(config.serial.port, "");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[serial]\nport = \"/dev/ttyUSB1\"\n\n\
             [dsm]\nfailsafe_ticks = 128\nbind_pulses = 9\ntrack_lost_frames = true\n\n\
             [receiver]\ndsm_group = \"dsm\"\nsoftware_channels = 4\n"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.serial.port, "/dev/ttyUSB1");
        assert_eq!(config.dsm.failsafe_ticks, 128);
        assert_eq!(config.dsm.bind_pulses, 9);
        assert!(config.dsm.track_lost_frames);
        assert_eq!(config.receiver.software_channels, 4);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = Config::load("/nonexistent/dsm-link.toml");
        assert!(matches!(
            result.unwrap_err(),
            crate::error::DsmLinkError::Io(_)
        ));
    }

    #[test]
    fn test_zero_sync_loss_ticks_rejected() {
        let config: Config = toml::from_str("[dsm]\nsync_loss_ticks = 0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_failsafe_not_greater_than_sync_loss_rejected() {
        let config: Config =
            toml::from_str("[dsm]\nsync_loss_ticks = 10\nfailsafe_ticks = 10\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tick_period_bounds() {
        let config: Config = toml::from_str("[dsm]\ntick_period_us = 50\n").unwrap();
        assert!(config.validate().is_err());

        let config: Config = toml::from_str("[dsm]\ntick_period_us = 200000\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_queue_depth_bounds() {
        let config: Config = toml::from_str("[dsm]\nevent_queue_depth = 0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_dsm_timings_mapping() {
        let config: Config = toml::from_str(
            "[dsm]\nsync_loss_ticks = 6\nfailsafe_ticks = 96\ntrack_lost_frames = true\n",
        )
        .unwrap();
        let timings = config.dsm_timings();
        assert_eq!(timings.sync_loss_ticks, 6);
        assert_eq!(timings.failsafe_ticks, 96);
        assert!(timings.track_lost_frames);
    }
}
