use core::fmt::Debug;

use plasmatrim_core::{
    proto::{Frame, Report},
    types::{PRODUCT_ID, VENDOR_ID},
};

/// Blocking HID transport of a single device.
///
/// Implementations are provided by the host platform HID bindings. There are
/// no timeouts, a read blocks until the device answers.
pub trait HidTransport {
    /// Error type returned on transport failure.
    type Error: Debug;

    fn vendor_id(&self) -> u16;

    fn product_id(&self) -> u16;

    /// Opens the device handle.
    fn open(&mut self) -> Result<(), Self::Error>;
    /// Closes the device handle, closing an already closed handle does nothing.
    fn close(&mut self);
    /// Writes a single frame.
    fn write(&mut self, frame: &Frame) -> Result<(), Self::Error>;
    /// Reads the report with the given id.
    fn read(&mut self, report_id: u8) -> Result<Report, Self::Error>;
}

impl<T: ?Sized + HidTransport> HidTransport for &mut T {
    type Error = T::Error;

    fn vendor_id(&self) -> u16 {
        T::vendor_id(self)
    }

    fn product_id(&self) -> u16 {
        T::product_id(self)
    }

    fn open(&mut self) -> Result<(), Self::Error> {
        T::open(self)
    }

    fn close(&mut self) {
        T::close(self);
    }

    fn write(&mut self, frame: &Frame) -> Result<(), Self::Error> {
        T::write(self, frame)
    }

    fn read(&mut self, report_id: u8) -> Result<Report, Self::Error> {
        T::read(self, report_id)
    }
}

/// Returns true if the transport identifies itself as a PlasmaTrim unit.
pub fn is_plasmatrim<T: ?Sized + HidTransport>(transport: &T) -> bool {
    transport.vendor_id() == VENDOR_ID && transport.product_id() == PRODUCT_ID
}
