use core::fmt::{Debug, Display};

use displaydoc::Display;

/// A specialized result type for the device session.
pub type Result<T, E> = core::result::Result<T, Error<E>>;

/// Errors that can occur while talking to the device.
#[derive(Debug, Display)]
pub enum Error<E> {
    /// {0}
    Protocol(plasmatrim_core::Error),
    /// PlasmaTrim device is not open.
    NotOpen,
    /// Provided device could not be identified as a PlasmaTrim.
    NotPlasmaTrim { vendor_id: u16, product_id: u16 },
    /// Unable to exchange a report with the device.
    Transport(E),
}

impl<E> From<plasmatrim_core::Error> for Error<E> {
    fn from(inner: plasmatrim_core::Error) -> Self {
        Self::Protocol(inner)
    }
}

impl<E: Debug + Display> std::error::Error for Error<E> {}
