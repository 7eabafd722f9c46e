//! PlasmaTrim device session
//!
//! A blocking, single threaded session on top of an HID transport. Every
//! command is a single write immediately followed by a single report read,
//! use one [`Session`] per physical device.

// Linter configuration
#![warn(unsafe_code, clippy::pedantic, clippy::use_self)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

pub use crate::{
    error::{Error, Result},
    pulse::{StdDelay, PULSE_INTERVAL_MS, PULSE_STEP},
    session::Session,
    transport::{is_plasmatrim, HidTransport},
};

mod error;
mod pulse;
mod session;
mod transport;
