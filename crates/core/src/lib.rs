//! PlasmaTrim RGB-8 protocol
//!
//! Data model, command codec and the sequence file format of the PlasmaTrim
//! RGB-8 USB light fixture. This crate has no transport of its own, see the
//! `plasmatrim-device` crate for the device session.

#![cfg_attr(not(any(feature = "std", test)), no_std)]

pub use errors::{Error, Result};
pub use types::{
    Color, DeviceIdentity, DeviceName, Sequence, SequenceStep, SerialNumber, Timing, LED_COUNT,
    MAX_BRIGHTNESS, MAX_SEQUENCE_STEPS,
};

pub mod errors;
pub mod proto;
#[cfg(feature = "std")]
pub mod sequence_file;
pub mod types;
