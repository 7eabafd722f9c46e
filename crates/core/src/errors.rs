use displaydoc::Display;

/// A specialized result type for PlasmaTrim protocol operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur while encoding commands, decoding reports or parsing
/// sequence files.
#[derive(Clone, Copy, PartialEq, Eq, Display, Debug)]
pub enum Error {
    /// The color array does not contain exactly one color per LED.
    ColorCountMismatch,
    /// The sequence does not fit into the device memory.
    SequenceTooLong,
    /// The sequence slot index is greater than the device slots count.
    SlotOutOfRange,
    /// The command payload does not fit into a single frame.
    PayloadTooLong,
    /// The timing value does not fit into a nibble.
    InvalidTiming,
    /// Unknown command opcode.
    UnknownOpcode,
    /// Unexpected response to the request.
    UnexpectedResponse,
    /// File is not recognized as a valid PlasmaTrim sequence.
    InvalidHeader,
    /// The active slots count of the sequence file is invalid.
    InvalidActiveSlots,
    /// Malformed sequence step at line {0}.
    MalformedLine(usize),
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl From<Error> for std::io::Error {
    fn from(err: Error) -> Self {
        std::io::Error::new(std::io::ErrorKind::InvalidData, err)
    }
}
