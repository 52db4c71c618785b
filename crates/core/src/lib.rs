//! Hue cycling driver for the Time2 BLE smart bulb.
//!
//! This crate contains the transport agnostic part of the driver: the hue scheduler,
//! the bulb color protocol and the animation loop on top of an abstract [`Transport`].

// Linter configuration
#![warn(unsafe_code, clippy::pedantic, clippy::use_self)]
// Too many false positives.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate
)]

pub use crate::{
    animation::{AnimationSummary, Animator},
    color::{to_rgb, ColorSample, CycleConfig, CycleState},
    errors::{Error, Result},
    session::Session,
};
use crate::proto::{BulbAddress, CharWrite};

pub mod animation;
pub mod color;
pub mod errors;
pub mod proto;
pub mod session;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

/// The trait provides a link to the bulb through some BLE host stack.
///
/// Implementations may drive an external BLE utility or bind to the native host stack,
/// the rest of the crate does not depend on which.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Connects to the bulb with the given address.
    ///
    /// Returns `Ok(())` once the bulb has acknowledged the connection.
    async fn connect(&mut self, address: BulbAddress) -> Result<()>;
    /// Writes a command without waiting for the bulb response.
    async fn send(&mut self, command: &CharWrite) -> Result<()>;
    /// Disconnects from the bulb and terminates the underlying session.
    async fn shutdown(&mut self) -> Result<()>;
}
