//! # DSM Bind Sequence Generator
//!
//! One-shot, blocking pulse-train generator that puts a satellite receiver
//! into bind mode at power-up.
//!
//! The satellite samples its RX line during a short window after power-up
//! (roughly 20-140 ms); driving the line low/high a specific number of
//! times inside that window selects the bind mode. This runs to completion
//! during device initialization, before any byte ingest begins, and is not
//! part of the concurrent hot path.

use std::thread;
use std::time::{Duration, Instant};

use tracing::info;

/// Maximum number of bind pulse pairs; larger requests are clamped
pub const DSM_BIND_MAX_PULSES: u8 = 10;

/// Width of each low and each high phase of a bind pulse
pub const DSM_BIND_PULSE_WIDTH: Duration = Duration::from_micros(120);

/// Minimum wait after power-up before pulsing starts
pub const DSM_BIND_POWER_UP_DELAY: Duration = Duration::from_millis(20);

/// Control of the receiver's RX line during the bind sequence.
///
/// Implementations drive the pin as a push-pull output for `set_low` /
/// `set_high` and return it to input mode on `release_to_input`, after
/// which serial data can flow.
pub trait BindPin {
    /// Drive the RX line high.
    fn set_high(&mut self);

    /// Drive the RX line low.
    fn set_low(&mut self);

    /// Return the RX line to input mode and wait for data.
    fn release_to_input(&mut self);
}

/// Run the bind pulse train on `pin`.
///
/// Waits out the remainder of [`DSM_BIND_POWER_UP_DELAY`] measured from
/// `power_on`, then emits `pulses` low/high pairs of
/// [`DSM_BIND_PULSE_WIDTH`] each (clamped to [`DSM_BIND_MAX_PULSES`]), and
/// finally releases the pin to input mode.
pub fn run_bind_sequence(pin: &mut dyn BindPin, pulses: u8, power_on: Instant) {
    let pulses = pulses.min(DSM_BIND_MAX_PULSES);
    info!(pulses, "running DSM bind sequence");

    // RX line idles high until the pulse train starts
    pin.set_high();

    let elapsed = power_on.elapsed();
    if elapsed < DSM_BIND_POWER_UP_DELAY {
        thread::sleep(DSM_BIND_POWER_UP_DELAY - elapsed);
    }

    for _ in 0..pulses {
        pin.set_low();
        thread::sleep(DSM_BIND_PULSE_WIDTH);
        pin.set_high();
        thread::sleep(DSM_BIND_PULSE_WIDTH);
    }

    pin.release_to_input();
}

#[cfg(test)]
pub mod mocks {
    use super::*;

    /// Pin state transition recorded by [`MockBindPin`]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum PinEvent {
        High,
        Low,
        Input,
    }

    /// Mock bind pin recording every transition for inspection
    #[derive(Debug, Default)]
    pub struct MockBindPin {
        pub events: Vec<PinEvent>,
    }

    impl MockBindPin {
        pub fn new() -> Self {
            Self::default()
        }

        /// Number of complete low/high pulse pairs emitted
        pub fn pulse_pairs(&self) -> usize {
            self.events
                .windows(2)
                .filter(|w| w[0] == PinEvent::Low && w[1] == PinEvent::High)
                .count()
        }
    }

    impl BindPin for MockBindPin {
        fn set_high(&mut self) {
            self.events.push(PinEvent::High);
        }

        fn set_low(&mut self) {
            self.events.push(PinEvent::Low);
        }

        fn release_to_input(&mut self) {
            self.events.push(PinEvent::Input);
        }
    }
}
