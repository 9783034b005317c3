//! # DSM Frame Assembler and Timing Supervisor
//!
//! Synchronous decoder core: a two-state frame assembler fed by the byte
//! stream, and a fixed-rate tick supervisor that infers frame boundaries
//! from inter-byte silence and forces failsafe on link loss.
//!
//! The DSM wire protocol has no start-of-frame marker, so collection windows
//! are opened by time, not by data: after `sync_loss_ticks` ticks with no
//! byte received, any partial frame is discarded and the next byte starts a
//! new frame. Independently, after `failsafe_ticks` ticks without a
//! successfully unrolled frame, every channel is bulk-reset to TIMEOUT.
//!
//! DSM frames arrive every 11 or 22 ms at 115,200 baud. With the default
//! 1.6 ms tick the sync-loss threshold of 4 ticks detects the inter-frame
//! pause for both rates, and the failsafe threshold of 64 ticks trips after
//! 102.4 ms of link silence.

use std::sync::atomic::{AtomicU16, AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, trace};

use super::protocol::{
    channel_word, Resolution, DSM_CHANNELS_PER_FRAME, DSM_EMPTY_SLOT, DSM_FRAME_LENGTH,
    DSM_SECOND_FRAME_MASK,
};
use super::resolution::detect_resolution;
use crate::receiver::store::ChannelStore;

/// Default sync-loss threshold in supervisor ticks (8 ms at 1.6 ms/tick)
pub const DEFAULT_SYNC_LOSS_TICKS: u32 = 4;

/// Default failsafe threshold in supervisor ticks (102.4 ms at 1.6 ms/tick)
pub const DEFAULT_FAILSAFE_TICKS: u32 = 64;

/// Default supervisor tick period in microseconds (625 Hz)
pub const DEFAULT_TICK_PERIOD_US: u64 = 1600;

/// Supervisor thresholds and decode options, fixed at initialization.
#[derive(Debug, Clone, Copy)]
pub struct DsmTimings {
    /// Ticks of byte silence before a new collection window opens
    pub sync_loss_ticks: u32,
    /// Ticks without a valid frame before failsafe trips
    pub failsafe_ticks: u32,
    /// Whether to accumulate the receiver's lost-frame counter
    pub track_lost_frames: bool,
}

impl Default for DsmTimings {
    fn default() -> Self {
        Self {
            sync_loss_ticks: DEFAULT_SYNC_LOSS_TICKS,
            failsafe_ticks: DEFAULT_FAILSAFE_TICKS,
            track_lost_frames: false,
        }
    }
}

/// Link quality counters shared with readers outside the decoder task.
#[derive(Debug, Default)]
pub struct LinkStats {
    frames_lost: AtomicU16,
    valid_frames: AtomicU64,
}

impl LinkStats {
    /// Total lost frames reported by the receiver since reset.
    pub fn frames_lost(&self) -> u16 {
        self.frames_lost.load(Ordering::Relaxed)
    }

    /// Frames successfully unrolled since reset.
    pub fn valid_frames(&self) -> u64 {
        self.valid_frames.load(Ordering::Relaxed)
    }
}

/// Frame assembler state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameSync {
    /// Outside a collection window; incoming bytes are discarded
    WaitingForWindow,
    /// Inside a window; bytes accumulate until the frame completes
    CollectingFrame,
}

/// Recoverable outcomes of unrolling one complete frame.
///
/// Neither variant resets the assembler or the detected resolution; the
/// offending frame is simply dropped (in whole or in part).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnrollError {
    /// Resolution not yet detected; frame dropped, retried on the next one
    UnknownResolution,
    /// Frame inconsistent with the detected stream type; remainder dropped
    ProtocolMismatch,
}

/// Synchronous DSM decoder state.
///
/// Owned exclusively by the device's event pump task; the [`ChannelStore`]
/// and [`LinkStats`] are the only surfaces shared with other contexts.
#[derive(Debug)]
pub struct DsmDecoder {
    store: Arc<ChannelStore>,
    stats: Arc<LinkStats>,
    timings: DsmTimings,
    frame: [u8; DSM_FRAME_LENGTH],
    byte_count: usize,
    sync: FrameSync,
    receive_ticks: u32,
    failsafe_ticks: u32,
    resolution: Resolution,
    frames_lost_last: u8,
}

impl DsmDecoder {
    /// Create a decoder writing into `store`, with every slot at TIMEOUT.
    pub fn new(store: Arc<ChannelStore>, stats: Arc<LinkStats>, timings: DsmTimings) -> Self {
        store.reset_to_timeout();
        Self {
            store,
            stats,
            timings,
            frame: [0u8; DSM_FRAME_LENGTH],
            byte_count: 0,
            sync: FrameSync::WaitingForWindow,
            receive_ticks: 0,
            failsafe_ticks: 0,
            resolution: Resolution::Unknown,
            frames_lost_last: 0,
        }
    }

    /// Detected stream resolution, sticky once set.
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Ingest a buffer of transport bytes.
    pub fn ingest(&mut self, buf: &[u8]) {
        for &byte in buf {
            self.ingest_byte(byte);
        }
    }

    /// Ingest a single transport byte.
    ///
    /// Resets the byte-silence counter, then feeds the assembler only while
    /// a collection window is open. When the frame completes, the unroller
    /// runs synchronously and the assembler returns to waiting.
    pub fn ingest_byte(&mut self, byte: u8) {
        self.receive_ticks = 0;

        if self.sync != FrameSync::CollectingFrame {
            return;
        }

        self.frame[self.byte_count] = byte;
        self.byte_count += 1;

        if self.byte_count == DSM_FRAME_LENGTH {
            match self.unroll_channels() {
                Ok(()) => {
                    self.failsafe_ticks = 0;
                    self.stats.valid_frames.fetch_add(1, Ordering::Relaxed);
                }
                Err(UnrollError::UnknownResolution) => {
                    trace!("DSM resolution undetected, dropping frame");
                }
                Err(UnrollError::ProtocolMismatch) => {
                    debug!("DSM frame inconsistent with detected stream type, remainder dropped");
                }
            }

            // Wait for the next silence window
            self.sync = FrameSync::WaitingForWindow;
            self.byte_count = 0;
        }
    }

    /// Fixed-rate supervisor tick: frame-sync windowing and failsafe.
    pub fn tick(&mut self) {
        // Open a new collection window after enough byte silence
        self.receive_ticks += 1;
        if self.receive_ticks > self.timings.sync_loss_ticks {
            if self.sync == FrameSync::CollectingFrame && self.byte_count > 0 {
                trace!(partial_bytes = self.byte_count, "sync loss, discarding partial frame");
            }
            self.sync = FrameSync::CollectingFrame;
            self.byte_count = 0;
            self.receive_ticks = 0;
        }

        // Force failsafe when no frame unrolled within the threshold
        self.failsafe_ticks += 1;
        if self.failsafe_ticks > self.timings.failsafe_ticks {
            debug!("DSM failsafe, resetting all channels to TIMEOUT");
            self.store.reset_to_timeout();
            self.failsafe_ticks = 0;
        }
    }

    /// Unroll a complete frame into the channel store.
    ///
    /// Empty slots (0xFFFF) are skipped and retain the prior channel value.
    /// A second-sub-frame marker on any slot but the first aborts the rest
    /// of this frame only: slots already unrolled keep their new values and
    /// the detected resolution is untouched.
    fn unroll_channels(&mut self) -> Result<(), UnrollError> {
        if self.timings.track_lost_frames {
            let frames_lost = self.frame[0];
            let delta = frames_lost.wrapping_sub(self.frames_lost_last);
            self.stats
                .frames_lost
                .fetch_add(u16::from(delta), Ordering::Relaxed);
            self.frames_lost_last = frames_lost;
        }

        // Probe the stream type once per power cycle
        if self.resolution == Resolution::Unknown {
            self.resolution = detect_resolution(&self.frame);
            if self.resolution != Resolution::Unknown {
                debug!(resolution = ?self.resolution, "DSM stream resolution detected");
            }
        }

        let Some(params) = self.resolution.params() else {
            return Err(UnrollError::UnknownResolution);
        };

        for slot in 0..DSM_CHANNELS_PER_FRAME {
            let word = channel_word(&self.frame, slot);

            // Skip empty channel slot, prior value retained
            if word == DSM_EMPTY_SLOT {
                continue;
            }

            if slot > 0 && word & DSM_SECOND_FRAME_MASK != 0 {
                // Either a 10-bit stream decoded as 11-bit or vice versa
                return Err(UnrollError::ProtocolMismatch);
            }

            // Channel index travels in the word, not the slot position
            let channel = usize::from((word >> params.bits) & 0x0F);
            self.store.write(channel, word & params.mask);
        }

        Ok(())
    }

    /// Reset the decoder to its power-on state except for the detected
    /// resolution, which only an explicit device re-creation clears.
    pub fn reset_state(&mut self) {
        self.receive_ticks = 0;
        self.failsafe_ticks = 0;
        self.sync = FrameSync::WaitingForWindow;
        self.byte_count = 0;
        self.frames_lost_last = 0;
        self.store.reset_to_timeout();
    }
}
