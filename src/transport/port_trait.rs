//! Trait abstraction for serial port reads to enable testing

use async_trait::async_trait;
use std::io;
use tracing::warn;

use crate::dsm::device::DsmReceiver;

/// Trait for serial port input operations
#[async_trait]
pub trait TransportIO: Send {
    /// Read available bytes into `buf`, returning the count
    async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// Wrapper around tokio_serial::SerialStream that implements TransportIO
pub struct TokioSerialPort {
    port: tokio_serial::SerialStream,
}

impl TokioSerialPort {
    pub fn new(port: tokio_serial::SerialStream) -> Self {
        Self { port }
    }
}

#[async_trait]
impl TransportIO for TokioSerialPort {
    async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        use tokio::io::AsyncReadExt;
        self.port.read(buf).await
    }
}

/// Receive pump: forwards transport bytes into the device's byte-received
/// callback until the port fails.
///
/// The callback never blocks and always consumes the whole buffer, so the
/// pump applies no backpressure of its own; its read size follows the
/// headroom hint the device reports.
pub async fn run_rx_pump<T: TransportIO>(mut port: T, device: DsmReceiver) {
    let mut buf = [0u8; 64];
    let mut want = buf.len();

    loop {
        match port.read(&mut buf[..want]).await {
            Ok(0) => continue,
            Ok(n) => {
                let feedback = device.rx_in(&buf[..n]);
                debug_assert_eq!(feedback.bytes_consumed, n);
                want = feedback.headroom.clamp(1, buf.len());
            }
            Err(e) => {
                warn!("serial read failed, stopping receive pump: {}", e);
                return;
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::mocks::MockTransport;
    use super::*;
    use crate::dsm::decoder::{DsmTimings, DEFAULT_SYNC_LOSS_TICKS};
    use crate::dsm::device::DEFAULT_EVENT_QUEUE_DEPTH;
    use crate::dsm::protocol::{
        DSM_CHANNELS_PER_FRAME, DSM_EMPTY_SLOT, DSM_FRAME_LENGTH, DSM_RESOLUTION_MASK,
    };
    use crate::receiver::driver::{ChannelRead, ReceiverDriver};
    use std::time::Duration;

    fn frame_11bit(channels: &[(u16, u16)]) -> Vec<u8> {
        let mut frame = vec![0u8; DSM_FRAME_LENGTH];
        frame[1] = DSM_RESOLUTION_MASK;
        for slot in 0..DSM_CHANNELS_PER_FRAME {
            let word = match channels.get(slot) {
                Some(&(ch, value)) => (ch << 11) | (value & 0x07FF),
                None => DSM_EMPTY_SLOT,
            };
            frame[2 + slot * 2..4 + slot * 2].copy_from_slice(&word.to_be_bytes());
        }
        frame
    }

    #[tokio::test]
    async fn test_pump_feeds_device_until_transport_fails() {
        let device =
            DsmReceiver::spawn(DsmTimings::default(), DEFAULT_EVENT_QUEUE_DEPTH, None).unwrap();

        // Open a collection window before the bytes arrive
        for _ in 0..=DEFAULT_SYNC_LOSS_TICKS {
            device.tick();
        }

        let frame = frame_11bit(&[(0, 1200), (4, 800)]);
        let transport = MockTransport::new(vec![frame[..6].to_vec(), frame[6..].to_vec()]);

        // The pump returns once the script is exhausted
        run_rx_pump(transport, device.clone()).await;

        for _ in 0..100 {
            if device.read(0) == ChannelRead::Value(1200) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(device.read(0), ChannelRead::Value(1200));
        assert_eq!(device.read(4), ChannelRead::Value(800));
    }

    #[tokio::test]
    async fn test_pump_stops_on_read_error() {
        let device =
            DsmReceiver::spawn(DsmTimings::default(), DEFAULT_EVENT_QUEUE_DEPTH, None).unwrap();

        let mut transport = MockTransport::new(vec![]);
        transport.reads.push_back(Err(io::Error::new(
            io::ErrorKind::BrokenPipe,
            "device unplugged",
        )));

        run_rx_pump(transport, device).await;
    }
}
