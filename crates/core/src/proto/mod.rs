//! Time2 bulb color control protocol.
//!
//! The bulb accepts fixed-length frames written without response to a single GATT
//! characteristic.

pub use self::{
    frame::CommandFrame,
    types::{BulbAddress, CharWrite},
};

mod frame;
mod types;

/// Handle of the characteristic receiving color frames.
pub const ATTRIBUTE_HANDLE: u16 = 0x0021;

/// Byte which closes every frame on the wire.
pub const TERMINATOR: u8 = 0x0D;

/// Frame which brings the bulb back into the white mode with its previous settings.
///
/// Its checksum does not follow [`CommandFrame::compute_checksum`], the bulb accepts
/// it exactly as it is.
pub const RESTORE_FRAME: [u8; 17] = [
    0xAA, 0x0A, 0xFC, 0x3A, 0x86, 0x01, 0x0D, 0x06, 0x02, 0x80, 0x80, 0x80, 0x80, 0x80, 0x8E,
    0x3F, TERMINATOR,
];

/// Returns a write command carrying the restore frame.
pub fn restore_command() -> CharWrite {
    CharWrite::new(RESTORE_FRAME)
}
