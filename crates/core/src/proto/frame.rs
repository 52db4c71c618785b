use rand::Rng;

use super::{CharWrite, TERMINATOR};
use crate::color::ColorSample;

/// Protocol tag followed by the fixed part of the color command header.
const HEADER: [u8; 9] = [0xAA, 0x0A, 0xFC, 0x3A, 0x86, 0x01, 0x0D, 0x06, 0x01];
const TRAILER: [u8; 2] = [0x80, 0x80];
const CHECKSUM_SEED: u8 = 85;

const COLOR_OFFSET: usize = HEADER.len();
const NONCE_OFFSET: usize = COLOR_OFFSET + 3 + TRAILER.len();
const CHECKSUM_OFFSET: usize = NONCE_OFFSET + 1;

/// Color command frame.
///
/// | offset | field          |
/// |--------|----------------|
/// | 0      | protocol tag   |
/// | 1..=8  | fixed header   |
/// | 9..=11 | red, green, blue |
/// | 12..=13| fixed trailer  |
/// | 14     | random nonce   |
/// | 15     | checksum       |
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct CommandFrame([u8; CommandFrame::LEN]);

impl CommandFrame {
    /// Frame length in bytes, excluding the wire terminator.
    pub const LEN: usize = 16;

    /// Encodes the given color into a new frame with a nonce taken from `nonce_source`.
    pub fn encode<R: Rng + ?Sized>(color: ColorSample, nonce_source: &mut R) -> Self {
        Self::with_nonce(color, nonce_source.gen())
    }

    /// Encodes the given color into a new frame with the exact nonce value.
    pub fn with_nonce(color: ColorSample, nonce: u8) -> Self {
        let mut bytes = [0_u8; Self::LEN];
        bytes[..COLOR_OFFSET].copy_from_slice(&HEADER);
        bytes[COLOR_OFFSET..COLOR_OFFSET + 3].copy_from_slice(&color.to_bytes());
        bytes[COLOR_OFFSET + 3..NONCE_OFFSET].copy_from_slice(&TRAILER);
        bytes[NONCE_OFFSET] = nonce;

        let mut frame = Self(bytes);
        frame.update_checksum();
        frame
    }

    /// Computes the checksum over the bytes between the protocol tag and the checksum
    /// itself.
    pub fn compute_checksum(&self) -> u8 {
        self.0[1..CHECKSUM_OFFSET]
            .iter()
            .fold(CHECKSUM_SEED, |sum, byte| sum.wrapping_add(*byte))
    }

    fn update_checksum(&mut self) {
        self.0[CHECKSUM_OFFSET] = self.compute_checksum();
    }

    pub fn color(&self) -> ColorSample {
        ColorSample::new(
            self.0[COLOR_OFFSET],
            self.0[COLOR_OFFSET + 1],
            self.0[COLOR_OFFSET + 2],
        )
    }

    pub fn nonce(&self) -> u8 {
        self.0[NONCE_OFFSET]
    }

    pub fn checksum(&self) -> u8 {
        self.0[CHECKSUM_OFFSET]
    }

    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }

    /// Returns the write command carrying this frame followed by the terminator.
    pub fn to_write(&self) -> CharWrite {
        let mut payload = Vec::with_capacity(Self::LEN + 1);
        payload.extend_from_slice(&self.0);
        payload.push(TERMINATOR);
        CharWrite::new(payload)
    }
}
