//! PlasmaTrim command codec.
//!
//! Every logical operation is a [`Command`] variant, which knows how to encode
//! itself into a [`Frame`] and how to decode the [`Report`] the device sends
//! back into a typed [`Response`].

pub use self::frame::{Frame, Report, FRAME_LEN, PAYLOAD_MAX_LEN, REPORT_LEN, RESPONSE_REPORT_ID};
use self::{
    frame::slice_to_array,
    nibble::{
        channels_to_colors, colors_to_channels, pack_channels, pack_holdfade, unpack_channels,
        unpack_holdfade, PACKED_LEN,
    },
};
use crate::{
    types::{
        clamp_brightness, Color, DeviceName, SequenceStep, SerialNumber, CHANNEL_COUNT, LED_COUNT,
        MAX_SEQUENCE_STEPS,
    },
    Error, Result,
};

pub mod frame;
pub mod nibble;

/// Sequence step requests are always sent with a payload of this length.
pub const SEQUENCE_STEP_PAYLOAD_LEN: usize = 30;

/// Colors, names and sequence steps follow a two bytes report header.
const REPORT_HEADER_LEN: usize = 2;
/// Single byte values are placed right after the report id.
const VALUE_OFFSET: usize = 1;
const SERIAL_NUMBER_OFFSET: usize = 1;
const HOLDFADE_OFFSET: usize = REPORT_HEADER_LEN + PACKED_LEN;

type Payload = heapless::Vec<u8, PAYLOAD_MAX_LEN>;

#[repr(u8)]
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum Opcode {
    SetColorImmediate = 0x00,
    GetColorImmediate = 0x01,
    PlayStoredSequence = 0x02,
    StopStoredSequence = 0x03,
    SetSequenceLength = 0x04,
    GetSequenceLength = 0x05,
    SetSequenceStep = 0x06,
    GetSequenceStep = 0x07,
    SetDeviceName = 0x08,
    GetDeviceName = 0x09,
    GetSerialNumber = 0x0A,
    SetBrightness = 0x0B,
    GetBrightness = 0x0C,
}

impl TryFrom<u8> for Opcode {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Ok(match value {
            0x00 => Self::SetColorImmediate,
            0x01 => Self::GetColorImmediate,
            0x02 => Self::PlayStoredSequence,
            0x03 => Self::StopStoredSequence,
            0x04 => Self::SetSequenceLength,
            0x05 => Self::GetSequenceLength,
            0x06 => Self::SetSequenceStep,
            0x07 => Self::GetSequenceStep,
            0x08 => Self::SetDeviceName,
            0x09 => Self::GetDeviceName,
            0x0A => Self::GetSerialNumber,
            0x0B => Self::SetBrightness,
            0x0C => Self::GetBrightness,
            _ => return Err(Error::UnknownOpcode),
        })
    }
}

/// Commands supported by the device.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Command {
    /// Sets all LED colors immediately, without storing them.
    SetColorImmediate {
        colors: [Color; LED_COUNT],
        brightness: u8,
    },
    GetColorImmediate,
    /// Plays the sequence stored in the device memory.
    PlayStoredSequence,
    StopStoredSequence,
    /// Sets the number of active sequence slots.
    SetSequenceLength(u8),
    GetSequenceLength,
    SetSequenceStep {
        slot: u8,
        step: SequenceStep,
    },
    GetSequenceStep {
        slot: u8,
    },
    SetDeviceName(DeviceName),
    GetDeviceName,
    GetSerialNumber,
    /// Sets the brightness of the currently shown colors.
    SetBrightness(u8),
    GetBrightness,
}

impl Command {
    pub const fn opcode(&self) -> Opcode {
        match self {
            Self::SetColorImmediate { .. } => Opcode::SetColorImmediate,
            Self::GetColorImmediate => Opcode::GetColorImmediate,
            Self::PlayStoredSequence => Opcode::PlayStoredSequence,
            Self::StopStoredSequence => Opcode::StopStoredSequence,
            Self::SetSequenceLength(_) => Opcode::SetSequenceLength,
            Self::GetSequenceLength => Opcode::GetSequenceLength,
            Self::SetSequenceStep { .. } => Opcode::SetSequenceStep,
            Self::GetSequenceStep { .. } => Opcode::GetSequenceStep,
            Self::SetDeviceName(_) => Opcode::SetDeviceName,
            Self::GetDeviceName => Opcode::GetDeviceName,
            Self::GetSerialNumber => Opcode::GetSerialNumber,
            Self::SetBrightness(_) => Opcode::SetBrightness,
            Self::GetBrightness => Opcode::GetBrightness,
        }
    }

    /// Encodes the command into an outbound frame.
    ///
    /// Brightness values are clamped, sequence lengths and slot indices are
    /// validated here, so an invalid command never reaches the transport.
    pub fn encode(&self) -> Result<Frame> {
        let mut payload = Payload::new();

        match self {
            Self::SetColorImmediate { colors, brightness } => {
                extend(&mut payload, &colors_to_channels(colors))?;
                push(&mut payload, clamp_brightness(*brightness))?;
            }
            Self::SetSequenceLength(len) => {
                if usize::from(*len) > MAX_SEQUENCE_STEPS {
                    return Err(Error::SequenceTooLong);
                }
                push(&mut payload, *len)?;
            }
            Self::SetSequenceStep { slot, step } => {
                push(&mut payload, check_slot(*slot)?)?;
                extend(&mut payload, &pack_channels(&colors_to_channels(&step.colors)))?;
                push(&mut payload, pack_holdfade(step.hold, step.fade))?;
                pad(&mut payload, SEQUENCE_STEP_PAYLOAD_LEN)?;
            }
            Self::GetSequenceStep { slot } => {
                push(&mut payload, check_slot(*slot)?)?;
                pad(&mut payload, SEQUENCE_STEP_PAYLOAD_LEN)?;
            }
            Self::SetDeviceName(name) => extend(&mut payload, name.as_bytes())?,
            Self::SetBrightness(brightness) => push(&mut payload, clamp_brightness(*brightness))?,
            Self::GetColorImmediate
            | Self::PlayStoredSequence
            | Self::StopStoredSequence
            | Self::GetSequenceLength
            | Self::GetDeviceName
            | Self::GetSerialNumber
            | Self::GetBrightness => {}
        }

        Frame::new(self.opcode(), &payload)
    }

    /// Decodes a frame written by the host, this is what the device firmware sees.
    pub fn decode(frame: &Frame) -> Result<Self> {
        let payload = frame.payload();

        Ok(match frame.opcode()? {
            Opcode::SetColorImmediate => Self::SetColorImmediate {
                colors: channels_to_colors(payload_array(payload, 0)?),
                brightness: payload[CHANNEL_COUNT],
            },
            Opcode::GetColorImmediate => Self::GetColorImmediate,
            Opcode::PlayStoredSequence => Self::PlayStoredSequence,
            Opcode::StopStoredSequence => Self::StopStoredSequence,
            Opcode::SetSequenceLength => Self::SetSequenceLength(payload[0]),
            Opcode::GetSequenceLength => Self::GetSequenceLength,
            Opcode::SetSequenceStep => Self::SetSequenceStep {
                slot: payload[0],
                step: decode_step(payload_array(payload, 1)?, payload[1 + PACKED_LEN]),
            },
            Opcode::GetSequenceStep => Self::GetSequenceStep { slot: payload[0] },
            Opcode::SetDeviceName => Self::SetDeviceName(DeviceName::from_bytes(payload)),
            Opcode::GetDeviceName => Self::GetDeviceName,
            Opcode::GetSerialNumber => Self::GetSerialNumber,
            Opcode::SetBrightness => Self::SetBrightness(payload[0]),
            Opcode::GetBrightness => Self::GetBrightness,
        })
    }

    /// Decodes the report the device sent back in response to this command.
    pub fn decode_response(&self, report: &Report) -> Result<Response> {
        Ok(match self {
            Self::SetColorImmediate { .. }
            | Self::PlayStoredSequence
            | Self::StopStoredSequence
            | Self::SetSequenceLength(_)
            | Self::SetSequenceStep { .. }
            | Self::SetDeviceName(_)
            | Self::SetBrightness(_) => Response::Empty,

            Self::GetColorImmediate => {
                Response::Colors(channels_to_colors(report.array(REPORT_HEADER_LEN)?))
            }
            Self::GetBrightness => Response::Brightness(report.byte(VALUE_OFFSET)),
            Self::GetSequenceLength => {
                let len = report.byte(VALUE_OFFSET);
                if usize::from(len) > MAX_SEQUENCE_STEPS {
                    return Err(Error::UnexpectedResponse);
                }
                Response::SequenceLength(len)
            }
            Self::GetSerialNumber => {
                let mut serial = *report.array::<4>(SERIAL_NUMBER_OFFSET)?;
                serial.reverse();
                Response::SerialNumber(SerialNumber(serial))
            }
            Self::GetDeviceName => {
                // Byte 1 echoes the opcode, the name starts right after it.
                Response::DeviceName(DeviceName::from_bytes(&report.as_bytes()[REPORT_HEADER_LEN..]))
            }
            Self::GetSequenceStep { .. } => Response::SequenceStep(decode_step(
                report.array(REPORT_HEADER_LEN)?,
                report.byte(HOLDFADE_OFFSET),
            )),
        })
    }
}

/// Typed device response, the variant mirrors the request.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Response {
    Empty,
    Colors([Color; LED_COUNT]),
    Brightness(u8),
    SequenceLength(u8),
    SequenceStep(SequenceStep),
    SerialNumber(SerialNumber),
    DeviceName(DeviceName),
}

impl Response {
    pub fn empty(self) -> Result<()> {
        match self {
            Self::Empty => Ok(()),
            _ => Err(Error::UnexpectedResponse),
        }
    }

    pub fn colors(self) -> Result<[Color; LED_COUNT]> {
        match self {
            Self::Colors(colors) => Ok(colors),
            _ => Err(Error::UnexpectedResponse),
        }
    }

    pub fn brightness(self) -> Result<u8> {
        match self {
            Self::Brightness(brightness) => Ok(brightness),
            _ => Err(Error::UnexpectedResponse),
        }
    }

    pub fn sequence_length(self) -> Result<u8> {
        match self {
            Self::SequenceLength(len) => Ok(len),
            _ => Err(Error::UnexpectedResponse),
        }
    }

    pub fn sequence_step(self) -> Result<SequenceStep> {
        match self {
            Self::SequenceStep(step) => Ok(step),
            _ => Err(Error::UnexpectedResponse),
        }
    }

    pub fn serial_number(self) -> Result<SerialNumber> {
        match self {
            Self::SerialNumber(serial) => Ok(serial),
            _ => Err(Error::UnexpectedResponse),
        }
    }

    pub fn device_name(self) -> Result<DeviceName> {
        match self {
            Self::DeviceName(name) => Ok(name),
            _ => Err(Error::UnexpectedResponse),
        }
    }
}

fn decode_step(packed: &[u8; PACKED_LEN], holdfade: u8) -> SequenceStep {
    let (hold, fade) = unpack_holdfade(holdfade);
    SequenceStep::new(channels_to_colors(&unpack_channels(packed)), hold, fade)
}

fn payload_array<const N: usize>(payload: &[u8], offset: usize) -> Result<&[u8; N]> {
    slice_to_array(payload, offset).ok_or(Error::PayloadTooLong)
}

const fn check_slot(slot: u8) -> Result<u8> {
    if slot as usize >= MAX_SEQUENCE_STEPS {
        return Err(Error::SlotOutOfRange);
    }
    Ok(slot)
}

fn push(payload: &mut Payload, byte: u8) -> Result<()> {
    payload.push(byte).map_err(|_| Error::PayloadTooLong)
}

fn extend(payload: &mut Payload, bytes: &[u8]) -> Result<()> {
    payload
        .extend_from_slice(bytes)
        .map_err(|()| Error::PayloadTooLong)
}

fn pad(payload: &mut Payload, len: usize) -> Result<()> {
    payload
        .resize_default(len)
        .map_err(|()| Error::PayloadTooLong)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Timing, MAX_BRIGHTNESS};

    fn rainbow() -> [Color; LED_COUNT] {
        let mut colors = [Color::default(); LED_COUNT];
        for (i, color) in colors.iter_mut().enumerate() {
            let i = i as u8;
            *color = Color::new(i * 30, 255 - i * 30, i * 7);
        }
        colors
    }

    fn report_with(offset: usize, bytes: &[u8]) -> Report {
        let mut raw = [0_u8; REPORT_LEN];
        raw[offset..offset + bytes.len()].copy_from_slice(bytes);
        Report::new(raw)
    }

    #[test]
    fn test_opcode_roundtrip() {
        for value in 0x00..=0x0C {
            let opcode = Opcode::try_from(value).unwrap();
            assert_eq!(opcode as u8, value);
        }
        assert_eq!(Opcode::try_from(0x0D), Err(Error::UnknownOpcode));
    }

    #[test]
    fn test_encode_set_color_immediate() {
        let colors = rainbow();
        let frame = Command::SetColorImmediate {
            colors,
            brightness: 42,
        }
        .encode()
        .unwrap();

        let bytes = frame.as_bytes();
        assert_eq!(bytes[1], Opcode::SetColorImmediate as u8);
        assert_eq!(&bytes[2..26], &colors_to_channels(&colors));
        assert_eq!(bytes[26], 42);
        assert!(bytes[27..].iter().all(|byte| *byte == 0));
    }

    #[test]
    fn test_encode_clamps_brightness() {
        for value in [MAX_BRIGHTNESS + 1, 200, u8::MAX] {
            assert_eq!(
                Command::SetBrightness(value).encode(),
                Command::SetBrightness(MAX_BRIGHTNESS).encode()
            );

            let frame = Command::SetColorImmediate {
                colors: rainbow(),
                brightness: value,
            }
            .encode()
            .unwrap();
            assert_eq!(frame.as_bytes()[26], MAX_BRIGHTNESS);
        }
    }

    #[test]
    fn test_encode_set_sequence_step() {
        let mut colors = [Color::new(0x12, 0x34, 0x56); LED_COUNT];
        colors[7] = Color::new(0xFF, 0x0F, 0xA0);
        let step = SequenceStep::new(colors, Timing::TenSeconds, Timing::QuarterOfSecond);

        let frame = Command::SetSequenceStep { slot: 5, step }.encode().unwrap();
        let bytes = frame.as_bytes();

        assert_eq!(bytes[1], Opcode::SetSequenceStep as u8);
        assert_eq!(bytes[2], 5);
        assert_eq!(&bytes[3..6], &[0x13, 0x51, 0x35]);
        assert_eq!(&bytes[12..15], &[0x13, 0x5F, 0x0A]);
        assert_eq!(bytes[15], 0x72);
        assert!(bytes[16..].iter().all(|byte| *byte == 0));
    }

    #[test]
    fn test_encode_rejects_invalid_values() {
        assert_eq!(
            Command::SetSequenceLength(MAX_SEQUENCE_STEPS as u8 + 1).encode(),
            Err(Error::SequenceTooLong)
        );
        assert!(Command::SetSequenceLength(MAX_SEQUENCE_STEPS as u8)
            .encode()
            .is_ok());
        assert_eq!(
            Command::GetSequenceStep {
                slot: MAX_SEQUENCE_STEPS as u8
            }
            .encode(),
            Err(Error::SlotOutOfRange)
        );
        assert_eq!(
            Command::SetSequenceStep {
                slot: 200,
                step: SequenceStep::solid(Color::default())
            }
            .encode(),
            Err(Error::SlotOutOfRange)
        );
    }

    #[test]
    fn test_decode_frames() {
        let commands = [
            Command::SetColorImmediate {
                colors: rainbow(),
                brightness: 17,
            },
            Command::GetColorImmediate,
            Command::PlayStoredSequence,
            Command::StopStoredSequence,
            Command::SetSequenceLength(12),
            Command::GetSequenceLength,
            Command::SetSequenceStep {
                slot: 75,
                step: SequenceStep::new(rainbow(), Timing::OneMinute, Timing::Instantly)
                    .truncated(),
            },
            Command::GetSequenceStep { slot: 3 },
            Command::SetDeviceName(DeviceName::new("Desk").unwrap()),
            Command::GetDeviceName,
            Command::GetSerialNumber,
            Command::SetBrightness(64),
            Command::GetBrightness,
        ];

        for command in commands {
            let frame = command.encode().unwrap();
            assert_eq!(Command::decode(&frame).unwrap(), command);
        }
    }

    #[test]
    fn test_decode_serial_number() {
        let report = Report::from_slice(&[0x00, 0x0A, 0x09, 0x59, 0xB8, 0x00, 0x01, 0x01, 0x1E]);
        let serial = Command::GetSerialNumber
            .decode_response(&report)
            .and_then(Response::serial_number)
            .unwrap();

        assert_eq!(serial, SerialNumber([0xB8, 0x59, 0x09, 0x0A]));
        assert_eq!(serial.to_string(), "B8-59-09-0A");
    }

    #[test]
    fn test_decode_device_name() {
        let mut raw = b"\x00\x09PlasmaTrim RGB-8 0xB85909".to_vec();
        raw.resize(REPORT_LEN, 0);

        let name = Command::GetDeviceName
            .decode_response(&Report::from_slice(&raw))
            .and_then(Response::device_name)
            .unwrap();
        assert_eq!(name.as_str(), "PlasmaTrim RGB-8 0xB85909");
    }

    #[test]
    fn test_decode_colors() {
        let colors = rainbow();
        let report = report_with(2, &colors_to_channels(&colors));

        let decoded = Command::GetColorImmediate
            .decode_response(&report)
            .and_then(Response::colors)
            .unwrap();
        assert_eq!(decoded, colors);
    }

    #[test]
    fn test_decode_single_byte_values() {
        let report = report_with(1, &[0x37]);

        assert_eq!(
            Command::GetBrightness.decode_response(&report),
            Ok(Response::Brightness(0x37))
        );
        assert_eq!(
            Command::GetSequenceLength.decode_response(&report_with(1, &[76])),
            Ok(Response::SequenceLength(76))
        );
        assert_eq!(
            Command::GetSequenceLength.decode_response(&report_with(1, &[77])),
            Err(Error::UnexpectedResponse)
        );
    }

    #[test]
    fn test_decode_sequence_step() {
        let mut packed = [0_u8; PACKED_LEN + 1];
        packed[0] = 0xF8;
        packed[11] = 0x1E;
        packed[PACKED_LEN] = 0x4B;

        let step = Command::GetSequenceStep { slot: 0 }
            .decode_response(&report_with(2, &packed))
            .and_then(Response::sequence_step)
            .unwrap();

        assert_eq!(step.colors[0], Color::new(0xF0, 0x80, 0x00));
        assert_eq!(step.colors[7], Color::new(0x00, 0x10, 0xE0));
        assert_eq!(step.hold, Timing::OneSecond);
        assert_eq!(step.fade, Timing::TwoAndHalfMinutes);
    }

    #[test]
    fn test_set_commands_have_empty_response() {
        let report = report_with(0, &[0xFF; REPORT_LEN]);

        assert_eq!(
            Command::PlayStoredSequence.decode_response(&report),
            Ok(Response::Empty)
        );
        assert_eq!(
            Command::SetBrightness(5).decode_response(&report),
            Ok(Response::Empty)
        );
        assert_eq!(
            Response::Empty.brightness(),
            Err(Error::UnexpectedResponse)
        );
    }
}
