//! In-memory PlasmaTrim emulator.

#![allow(dead_code)]

use std::collections::VecDeque;

use displaydoc::Display;
use plasmatrim_core::{
    proto::{
        nibble::{colors_to_channels, pack_channels, pack_holdfade},
        Command, Frame, Opcode, Report, REPORT_LEN,
    },
    types::{
        Color, SequenceStep, LED_COUNT, MAX_BRIGHTNESS, MAX_SEQUENCE_STEPS, PRODUCT_ID, VENDOR_ID,
    },
};
use plasmatrim_device::HidTransport;

/// Serial number report captured from a real unit.
pub const SERIAL_NUMBER_REPORT: &str =
    "000A0959B80001011E000000000000000000000000000000000000000000000000";
/// Device name report captured from a real unit.
pub const DEVICE_NAME_REPORT: &str =
    "0009506C61736D615472696D205247422D38203078423835393039000000000000";

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum FakeError {
    /// Device handle is closed
    Closed,
    /// Device rejected the frame
    WriteRejected,
    /// No report to read
    NothingToRead,
}

/// Emulates the device firmware on top of the decoded frames.
pub struct FakeDevice {
    pub vendor_id: u16,
    pub product_id: u16,
    pub is_open: bool,
    pub opened: usize,
    pub closed: usize,
    /// Number of writes accepted before the device starts rejecting them.
    pub write_budget: Option<usize>,
    /// Number of reads answered before the device stops responding.
    pub read_budget: Option<usize>,
    pub frames: Vec<Frame>,
    pub reads: usize,

    pub colors: [Color; LED_COUNT],
    pub brightness: u8,
    pub playing: bool,
    pub sequence_len: u8,
    pub slots: [SequenceStep; MAX_SEQUENCE_STEPS],
    pub name: Vec<u8>,

    responses: VecDeque<Report>,
}

pub fn init_logger() {
    let _ = env_logger::try_init();
}

pub fn hex(text: &str) -> Vec<u8> {
    (0..text.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&text[i..i + 2], 16).unwrap())
        .collect()
}

impl Default for FakeDevice {
    fn default() -> Self {
        Self {
            vendor_id: VENDOR_ID,
            product_id: PRODUCT_ID,
            is_open: false,
            opened: 0,
            closed: 0,
            write_budget: None,
            read_budget: None,
            frames: Vec::new(),
            reads: 0,

            colors: [Color::default(); LED_COUNT],
            brightness: MAX_BRIGHTNESS,
            playing: true,
            sequence_len: 0,
            slots: [SequenceStep::solid(Color::default()); MAX_SEQUENCE_STEPS],
            name: hex(DEVICE_NAME_REPORT)[2..].to_vec(),

            responses: VecDeque::new(),
        }
    }
}

impl FakeDevice {
    pub fn with_ids(vendor_id: u16, product_id: u16) -> Self {
        Self {
            vendor_id,
            product_id,
            ..Self::default()
        }
    }

    pub fn with_write_budget(write_budget: usize) -> Self {
        Self {
            write_budget: Some(write_budget),
            ..Self::default()
        }
    }

    pub fn with_read_budget(read_budget: usize) -> Self {
        Self {
            read_budget: Some(read_budget),
            ..Self::default()
        }
    }

    /// Returns the opcodes of all the written frames.
    pub fn opcodes(&self) -> Vec<Opcode> {
        self.frames
            .iter()
            .map(|frame| frame.opcode().unwrap())
            .collect()
    }

    /// Returns all the written frames decoded back into commands.
    pub fn commands(&self) -> Vec<Command> {
        self.frames
            .iter()
            .map(|frame| Command::decode(frame).unwrap())
            .collect()
    }

    fn respond(&mut self, frame: &Frame) -> Report {
        let mut raw = [0_u8; REPORT_LEN];
        raw[1] = frame.as_bytes()[1];

        match Command::decode(frame).unwrap() {
            Command::SetColorImmediate { colors, brightness } => {
                self.colors = colors;
                self.brightness = brightness;
                self.playing = false;
            }
            Command::GetColorImmediate => {
                raw[2..26].copy_from_slice(&colors_to_channels(&self.colors));
            }
            Command::PlayStoredSequence => self.playing = true,
            Command::StopStoredSequence => self.playing = false,
            Command::SetSequenceLength(len) => self.sequence_len = len,
            Command::GetSequenceLength => raw[1] = self.sequence_len,
            Command::SetSequenceStep { slot, step } => self.slots[slot as usize] = step,
            Command::GetSequenceStep { slot } => {
                let step = &self.slots[slot as usize];
                raw[2..14].copy_from_slice(&pack_channels(&colors_to_channels(&step.colors)));
                raw[14] = pack_holdfade(step.hold, step.fade);
            }
            Command::SetDeviceName(name) => self.name = name.as_bytes().to_vec(),
            Command::GetDeviceName => {
                let len = self.name.len().min(REPORT_LEN - 2);
                raw[2..2 + len].copy_from_slice(&self.name[..len]);
            }
            Command::GetSerialNumber => return Report::from_slice(&hex(SERIAL_NUMBER_REPORT)),
            Command::SetBrightness(brightness) => self.brightness = brightness,
            Command::GetBrightness => raw[1] = self.brightness,
        }

        Report::new(raw)
    }
}

impl HidTransport for FakeDevice {
    type Error = FakeError;

    fn vendor_id(&self) -> u16 {
        self.vendor_id
    }

    fn product_id(&self) -> u16 {
        self.product_id
    }

    fn open(&mut self) -> Result<(), Self::Error> {
        self.is_open = true;
        self.opened += 1;
        Ok(())
    }

    fn close(&mut self) {
        if self.is_open {
            self.is_open = false;
            self.closed += 1;
        }
    }

    fn write(&mut self, frame: &Frame) -> Result<(), Self::Error> {
        if !self.is_open {
            return Err(FakeError::Closed);
        }
        if self.write_budget.is_some_and(|budget| self.frames.len() >= budget) {
            return Err(FakeError::WriteRejected);
        }

        self.frames.push(*frame);
        let report = self.respond(frame);
        self.responses.push_back(report);
        Ok(())
    }

    fn read(&mut self, _report_id: u8) -> Result<Report, Self::Error> {
        if self.read_budget.is_some_and(|budget| self.reads >= budget) {
            return Err(FakeError::NothingToRead);
        }

        self.reads += 1;
        self.responses.pop_front().ok_or(FakeError::NothingToRead)
    }
}
