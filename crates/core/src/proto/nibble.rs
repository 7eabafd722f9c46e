//! Nibble packing used by the device sequence storage.
//!
//! The device keeps only the high four bits of every color channel, so the
//! 24 channels of a step take 12 bytes. Unpacking expands each nibble back
//! with `nibble * 16`, which makes the roundtrip lossy: the low four bits are
//! always zero after a trip through the device.

use rgb::{ComponentBytes, FromSlice};

use crate::types::{Color, Timing, CHANNEL_COUNT, LED_COUNT};

/// Length of the packed color channels.
pub const PACKED_LEN: usize = CHANNEL_COUNT / 2;

/// Packs 24 color channels into 12 bytes, high nibble first.
#[must_use]
pub fn pack_channels(channels: &[u8; CHANNEL_COUNT]) -> [u8; PACKED_LEN] {
    let mut packed = [0_u8; PACKED_LEN];
    for (byte, pair) in packed.iter_mut().zip(channels.chunks_exact(2)) {
        *byte = ((pair[0] >> 4) << 4) | (pair[1] >> 4);
    }
    packed
}

/// Expands 12 packed bytes back into 24 color channels.
#[must_use]
pub fn unpack_channels(packed: &[u8; PACKED_LEN]) -> [u8; CHANNEL_COUNT] {
    let mut channels = [0_u8; CHANNEL_COUNT];
    for (pair, byte) in channels.chunks_exact_mut(2).zip(packed) {
        pair[0] = (byte >> 4) * 16;
        pair[1] = (byte & 0x0F) * 16;
    }
    channels
}

/// Packs hold and fade timings into a single byte, hold goes to the high nibble.
#[must_use]
pub const fn pack_holdfade(hold: Timing, fade: Timing) -> u8 {
    (hold.nibble() << 4) | fade.nibble()
}

#[must_use]
pub const fn unpack_holdfade(holdfade: u8) -> (Timing, Timing) {
    (Timing::from_nibble(holdfade >> 4), Timing::from_nibble(holdfade))
}

/// Flattens colors into the `R, G, B` channel order used on the wire.
#[must_use]
pub fn colors_to_channels(colors: &[Color; LED_COUNT]) -> [u8; CHANNEL_COUNT] {
    let mut channels = [0_u8; CHANNEL_COUNT];
    channels.copy_from_slice(colors.as_bytes());
    channels
}

#[must_use]
pub fn channels_to_colors(channels: &[u8; CHANNEL_COUNT]) -> [Color; LED_COUNT] {
    let mut colors = [Color::default(); LED_COUNT];
    colors.copy_from_slice(channels.as_rgb());
    colors
}
