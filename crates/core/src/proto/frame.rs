//! Fixed size HID frames.

use super::Opcode;
use crate::{Error, Result};

/// Length of an outbound frame, including the reserved report id byte.
pub const FRAME_LEN: usize = 33;
/// Maximum length of a command payload.
pub const PAYLOAD_MAX_LEN: usize = FRAME_LEN - 2;
/// Length of an inbound report.
pub const REPORT_LEN: usize = 33;
/// Report id used to read command responses.
pub const RESPONSE_REPORT_ID: u8 = 1;

const OPCODE_OFFSET: usize = 1;
const PAYLOAD_OFFSET: usize = 2;

/// Outbound command frame.
///
/// Byte 0 is reserved for the HID report id and is ignored by the device,
/// byte 1 is the opcode and the rest is a zero padded payload.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Frame([u8; FRAME_LEN]);

impl Frame {
    pub fn new(opcode: Opcode, payload: &[u8]) -> Result<Self> {
        if payload.len() > PAYLOAD_MAX_LEN {
            return Err(Error::PayloadTooLong);
        }

        let mut bytes = [0_u8; FRAME_LEN];
        bytes[OPCODE_OFFSET] = opcode as u8;
        bytes[PAYLOAD_OFFSET..PAYLOAD_OFFSET + payload.len()].copy_from_slice(payload);
        Ok(Self(bytes))
    }

    /// Wraps raw frame bytes, for example the ones captured from the transport.
    pub const fn from_bytes(bytes: [u8; FRAME_LEN]) -> Self {
        Self(bytes)
    }

    pub fn opcode(&self) -> Result<Opcode> {
        Opcode::try_from(self.0[OPCODE_OFFSET])
    }

    pub fn payload(&self) -> &[u8; PAYLOAD_MAX_LEN] {
        let [_, _, payload @ ..] = &self.0;
        payload
    }

    pub const fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.0
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Inbound report read back from the device after each command.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Report([u8; REPORT_LEN]);

impl Report {
    pub const fn new(bytes: [u8; REPORT_LEN]) -> Self {
        Self(bytes)
    }

    /// Copies the given bytes into a report, a shorter input is zero padded and
    /// a longer one is cut.
    pub fn from_slice(bytes: &[u8]) -> Self {
        let mut report = [0_u8; REPORT_LEN];
        let len = bytes.len().min(REPORT_LEN);
        report[..len].copy_from_slice(&bytes[..len]);
        Self(report)
    }

    pub const fn as_bytes(&self) -> &[u8; REPORT_LEN] {
        &self.0
    }

    pub(crate) const fn byte(&self, offset: usize) -> u8 {
        self.0[offset]
    }

    /// Borrows `N` bytes starting at `offset`.
    pub(crate) fn array<const N: usize>(&self, offset: usize) -> Result<&[u8; N]> {
        slice_to_array(&self.0, offset).ok_or(Error::UnexpectedResponse)
    }
}

impl From<[u8; REPORT_LEN]> for Report {
    fn from(bytes: [u8; REPORT_LEN]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Report {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

pub(crate) fn slice_to_array<const N: usize>(bytes: &[u8], offset: usize) -> Option<&[u8; N]> {
    bytes.get(offset..offset + N)?.try_into().ok()
}
