//! # DSM Protocol Constants and Types
//!
//! Core wire-format definitions for the DSM satellite receiver stream.
//!
//! A DSM frame is 16 bytes: a lost-frame counter, a system/info byte, then
//! seven big-endian 16-bit channel words. There is no sync byte and no
//! checksum; frame boundaries are inferred from inter-byte silence.

/// DSM frame length in bytes
pub const DSM_FRAME_LENGTH: usize = 16;

/// Channel words carried by a single frame
pub const DSM_CHANNELS_PER_FRAME: usize = 7;

/// Number of input channels tracked per receiver
pub const DSM_NUM_INPUTS: usize = 12;

/// High bit of a channel word, set on words of the second sub-frame
pub const DSM_SECOND_FRAME_MASK: u16 = 0x8000;

/// Resolution bit within the system/info byte (master satellite only)
pub const DSM_RESOLUTION_MASK: u8 = 0x10;

/// Channel word value marking an unused slot
pub const DSM_EMPTY_SLOT: u16 = 0xFFFF;

/// DSM satellite serial rate (115,200 baud, 8N1)
pub const DSM_BAUD_RATE: u32 = 115_200;

/// Offset of the first channel word within a frame
pub const DSM_CHANNEL_DATA_OFFSET: usize = 2;

/// Wire resolution variant of a DSM stream.
///
/// Ambiguous until detected from live traffic; sticky once set. Never
/// reverts to `Unknown` without a full device reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resolution {
    /// Not yet detected; frames are dropped until detection succeeds
    #[default]
    Unknown,
    /// 10-bit channel values (DSM2 1024 mode)
    TenBit,
    /// 11-bit channel values (DSM2/DSMX 2048 mode)
    ElevenBit,
}

/// Bit-level decode parameters resolved from a detected [`Resolution`].
///
/// Resolved once at detection time and threaded through the unroll path as
/// an immutable value; the channel index occupies the 4 bits above `bits`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeParams {
    /// Channel value width in bits
    pub bits: u8,
    /// Mask covering the channel value field
    pub mask: u16,
}

impl Resolution {
    /// Decode parameters for this resolution, or `None` while undetected.
    pub fn params(self) -> Option<DecodeParams> {
        match self {
            Resolution::Unknown => None,
            Resolution::TenBit => Some(DecodeParams { bits: 10, mask: 0x03FF }),
            Resolution::ElevenBit => Some(DecodeParams { bits: 11, mask: 0x07FF }),
        }
    }
}

/// Extract the big-endian channel word at `slot` (0-based) from a frame.
///
/// # Panics
///
/// Panics if `slot >= DSM_CHANNELS_PER_FRAME` or the frame is shorter than
/// [`DSM_FRAME_LENGTH`]; callers operate on complete frames only.
pub fn channel_word(frame: &[u8], slot: usize) -> u16 {
    let at = DSM_CHANNEL_DATA_OFFSET + slot * 2;
    u16::from_be_bytes([frame[at], frame[at + 1]])
}
