//! # DSM Receiver Device
//!
//! The concrete DSM backend behind the [`ReceiverDriver`] contract.
//!
//! Byte arrival and the supervisor tick are independent execution contexts
//! that must never block. Both are folded into a single consumer task fed by
//! a bounded event queue: the callbacks only `try_send`, the pump task owns
//! the mutable decoder state, and the lock-free channel store is the sole
//! hand-off surface read by the flight core. A full queue drops the event
//! and lets silence windowing resynchronize the stream.
//!
//! A device has no shutdown path: once spawned it is valid for the process
//! lifetime.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::bind::{run_bind_sequence, BindPin};
use super::decoder::{DsmDecoder, DsmTimings, LinkStats};
use super::protocol::{DSM_FRAME_LENGTH, DSM_NUM_INPUTS};
use crate::error::{DsmLinkError, Result};
use crate::receiver::driver::{ChannelRead, ReceiverDriver, RxFeedback};
use crate::receiver::store::ChannelStore;

/// Default bound of the event queue between the callbacks and the pump task
pub const DEFAULT_EVENT_QUEUE_DEPTH: usize = 64;

/// Event delivered to the decoder pump task
#[derive(Debug)]
enum RxEvent {
    /// Bytes received from the transport
    Bytes(Bytes),
    /// One supervisor tick elapsed
    Tick,
}

/// Request to bind the satellite before the byte stream starts.
pub struct BindRequest<'a> {
    /// RX-line pin driver
    pub pin: &'a mut dyn BindPin,
    /// Requested pulse pairs (clamped to the protocol maximum)
    pub pulses: u8,
    /// Power-up instant the bind window is measured from
    pub power_on: Instant,
}

/// Handle to a spawned DSM receiver.
///
/// Cheap to clone; all clones feed the same decoder task and read the same
/// channel store.
#[derive(Debug, Clone)]
pub struct DsmReceiver {
    events: mpsc::Sender<RxEvent>,
    store: Arc<ChannelStore>,
    stats: Arc<LinkStats>,
}

impl DsmReceiver {
    /// Spawn a DSM receiver on the current tokio runtime.
    ///
    /// Runs the blocking bind sequence first when requested, then starts
    /// the decoder pump task with every channel at TIMEOUT.
    ///
    /// # Errors
    ///
    /// Returns [`DsmLinkError::Init`] when no tokio runtime is available;
    /// this is fatal to the caller's bring-up sequence.
    pub fn spawn(
        timings: DsmTimings,
        queue_depth: usize,
        bind: Option<BindRequest<'_>>,
    ) -> Result<Self> {
        // Bind must finish before any byte can arrive
        if let Some(request) = bind {
            run_bind_sequence(request.pin, request.pulses, request.power_on);
        }

        let runtime = Handle::try_current()
            .map_err(|e| DsmLinkError::Init(format!("no tokio runtime: {e}")))?;

        let store = Arc::new(ChannelStore::new(DSM_NUM_INPUTS));
        let stats = Arc::new(LinkStats::default());
        let (events, queue) = mpsc::channel(queue_depth.max(1));

        let decoder = DsmDecoder::new(store.clone(), stats.clone(), timings);
        runtime.spawn(pump(queue, decoder));
        info!(queue_depth, "DSM receiver started");

        Ok(Self { events, store, stats })
    }

    /// Byte-received callback, invoked by the transport.
    ///
    /// Non-blocking: the bytes are queued for the decoder task. Always
    /// reports the full buffer consumed, one frame of headroom, and no
    /// yield request.
    pub fn rx_in(&self, buf: &[u8]) -> RxFeedback {
        if !buf.is_empty() {
            let event = RxEvent::Bytes(Bytes::copy_from_slice(buf));
            if self.events.try_send(event).is_err() {
                debug!(bytes = buf.len(), "event queue full, dropping receive buffer");
            }
        }

        RxFeedback {
            bytes_consumed: buf.len(),
            headroom: DSM_FRAME_LENGTH,
            yield_requested: false,
        }
    }

    /// Supervisor tick callback, invoked at a fixed rate.
    ///
    /// Non-blocking; a tick lost to a full queue only stretches the
    /// sync-loss and failsafe windows by one period.
    pub fn tick(&self) {
        if self.events.try_send(RxEvent::Tick).is_err() {
            debug!("event queue full, dropping supervisor tick");
        }
    }

    /// Link quality counters for this receiver.
    pub fn stats(&self) -> &LinkStats {
        &self.stats
    }
}

impl ReceiverDriver for DsmReceiver {
    fn read(&self, channel: usize) -> ChannelRead {
        self.store.read(channel)
    }

    fn num_channels(&self) -> usize {
        self.store.len()
    }
}

/// Decoder pump: the single consumer of both execution contexts.
async fn pump(mut queue: mpsc::Receiver<RxEvent>, mut decoder: DsmDecoder) {
    while let Some(event) = queue.recv().await {
        match event {
            RxEvent::Bytes(bytes) => decoder.ingest(&bytes),
            RxEvent::Tick => decoder.tick(),
        }
    }
}
