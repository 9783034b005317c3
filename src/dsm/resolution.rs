//! # DSM Resolution Detection
//!
//! One-shot classification of the 10/11-bit wire resolution from the first
//! structurally plausible frame.
//!
//! A satellite bound as master (odd number of bind pulses) reports its
//! resolution directly in the system/info byte. A satellite bound as slave
//! leaves that byte zero, and the detector falls back to checking the channel
//! order encoded in the first two words: a stock Spektrum setup sends channel
//! 1 then channel 5 first, and only the correct bit width recovers that pair.
//! The channel-order method does not work with all transmitter
//! configurations; detection then stays `Unknown` and is retried on the next
//! frame.

use super::protocol::{
    channel_word, Resolution, DSM_RESOLUTION_MASK, DSM_SECOND_FRAME_MASK,
};

/// Canonical channel indices in the first two words of a first sub-frame
const CANONICAL_CHANNEL_PAIR: (u16, u16) = (1, 5);

/// Try to classify the stream resolution from a complete frame.
///
/// Returns `Resolution::Unknown` when the frame cannot be classified: it is
/// a second sub-frame, or the slave-satellite channel-order heuristic is
/// ambiguous. Callers drop the frame and retry on the next one.
pub fn detect_resolution(frame: &[u8]) -> Resolution {
    let word0 = channel_word(frame, 0);
    let word1 = channel_word(frame, 1);

    // Can't detect on the second sub-frame
    if word0 & DSM_SECOND_FRAME_MASK != 0 {
        return Resolution::Unknown;
    }

    let info = frame[1];
    if info != 0x00 {
        // Master satellite: resolution bit in the system/info byte
        if info & DSM_RESOLUTION_MASK == 0x00 {
            Resolution::TenBit
        } else {
            Resolution::ElevenBit
        }
    } else {
        // Slave satellite: probe both widths for the canonical channel order
        let matches_10 = channel_pair(word0, word1, 10) == CANONICAL_CHANNEL_PAIR;
        let matches_11 = channel_pair(word0, word1, 11) == CANONICAL_CHANNEL_PAIR;

        match (matches_10, matches_11) {
            (true, false) => Resolution::TenBit,
            (false, true) => Resolution::ElevenBit,
            _ => Resolution::Unknown,
        }
    }
}

/// Channel indices of two words under a candidate value width
fn channel_pair(word0: u16, word1: u16, bits: u8) -> (u16, u16) {
    ((word0 >> bits) & 0x0F, (word1 >> bits) & 0x0F)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsm::protocol::DSM_FRAME_LENGTH;

    fn frame_with_words(info: u8, word0: u16, word1: u16) -> [u8; DSM_FRAME_LENGTH] {
        let mut frame = [0u8; DSM_FRAME_LENGTH];
        frame[1] = info;
        frame[2..4].copy_from_slice(&word0.to_be_bytes());
        frame[4..6].copy_from_slice(&word1.to_be_bytes());
        frame
    }

    #[test]
    fn test_master_satellite_reports_10bit() {
        // Non-zero info byte with the resolution bit clear
        let frame = frame_with_words(0x01, 0x0000, 0x0000);
        assert_eq!(detect_resolution(&frame), Resolution::TenBit);
    }

    #[test]
    fn test_master_satellite_reports_11bit() {
        // Resolution bit set in the info byte
        let frame = frame_with_words(DSM_RESOLUTION_MASK, 0x0000, 0x0000);
        assert_eq!(detect_resolution(&frame), Resolution::ElevenBit);
    }

    #[test]
    fn test_second_sub_frame_is_not_classified() {
        let frame = frame_with_words(DSM_RESOLUTION_MASK, DSM_SECOND_FRAME_MASK, 0x0000);
        assert_eq!(detect_resolution(&frame), Resolution::Unknown);
    }

    #[test]
    fn test_slave_satellite_channel_order_11bit() {
        // Channel 1 then channel 5 at 11-bit offsets; the 10-bit
        // interpretation sees indices 2 and 10 so only one width matches
        let word0 = (1 << 11) | 0x0123;
        let word1 = (5 << 11) | 0x0456;
        let frame = frame_with_words(0x00, word0, word1);
        assert_eq!(detect_resolution(&frame), Resolution::ElevenBit);
    }

    #[test]
    fn test_slave_satellite_channel_order_10bit() {
        let word0 = (1 << 10) | 0x0155;
        let word1 = (5 << 10) | 0x02AA;
        let frame = frame_with_words(0x00, word0, word1);
        assert_eq!(detect_resolution(&frame), Resolution::TenBit);
    }

    #[test]
    fn test_slave_satellite_ambiguous_order_stays_unknown() {
        // Neither width recovers the canonical 1/5 pair
        let word0 = (3 << 11) | 0x0010;
        let word1 = (7 << 11) | 0x0020;
        let frame = frame_with_words(0x00, word0, word1);
        assert_eq!(detect_resolution(&frame), Resolution::Unknown);
    }
}
