//! Human readable sequence files.
//!
//! ```text
//! PlasmaTrim RGB-8 Sequence
//! Version: Simple Sequence Format
//! Active Slots: 2
//! slot 00 4 4 - F00F00F00F00F00F00F00F00
//! slot 01 4 6 - 00F00F00F00F00F00F00F00F
//! ```
//!
//! Each hex digit is a single color channel with the same four bit
//! resolution as the device storage.

use std::{
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use crate::{
    proto::nibble::{channels_to_colors, colors_to_channels},
    types::{Sequence, SequenceStep, Timing, CHANNEL_COUNT, MAX_SEQUENCE_STEPS},
    Error,
};

const TITLE_LINE: &str = "PlasmaTrim RGB-8 Sequence";
const VERSION_LINE: &str = "Version: Simple Sequence Format";
const ACTIVE_SLOTS_PREFIX: &str = "Active Slots: ";
const HEADER_LINES: usize = 3;

/// A sequence together with the number of slots declared active.
///
/// The declared count may differ from the number of stored steps, a file is
/// allowed to reserve more slots than it fills.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SequenceFile {
    pub active_slots: usize,
    pub sequence: Sequence,
}

impl SequenceFile {
    /// Creates a file which declares every step of the sequence active.
    pub fn new(sequence: Sequence) -> Self {
        Self {
            active_slots: sequence.len(),
            sequence,
        }
    }

    /// Returns the stored steps which are covered by the active slots count.
    pub fn active_steps(&self) -> &[SequenceStep] {
        let len = self.active_slots.min(self.sequence.len());
        &self.sequence.as_slice()[..len]
    }

    pub fn load(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::open(path)?;
        Self::read_from(BufReader::new(file))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let file = File::create(path)?;
        self.write_to(BufWriter::new(file))
    }

    /// Writes the sequence file, an active slots count which could not be
    /// read back is rejected before anything is written.
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        if self.active_slots > MAX_SEQUENCE_STEPS {
            return Err(Error::InvalidActiveSlots.into());
        }

        writeln!(writer, "{TITLE_LINE}")?;
        writeln!(writer, "{VERSION_LINE}")?;
        writeln!(writer, "{ACTIVE_SLOTS_PREFIX}{}", self.active_slots)?;

        for (slot, step) in self.sequence.iter().enumerate() {
            write!(
                writer,
                "slot {slot:02} {} {} - ",
                step.hold.nibble(),
                step.fade.nibble()
            )?;
            for channel in colors_to_channels(&step.colors) {
                write!(writer, "{:X}", channel >> 4)?;
            }
            writeln!(writer)?;
        }

        writer.flush()
    }

    /// Reads a sequence file.
    ///
    /// The header is checked before any step is parsed, a file with a wrong
    /// header is rejected as a whole.
    pub fn read_from<R: BufRead>(reader: R) -> io::Result<Self> {
        let mut lines = reader.lines();

        if next_header_line(&mut lines)? != TITLE_LINE {
            return Err(Error::InvalidHeader.into());
        }
        if next_header_line(&mut lines)? != VERSION_LINE {
            return Err(Error::InvalidHeader.into());
        }
        let active_slots = next_header_line(&mut lines)?
            .strip_prefix(ACTIVE_SLOTS_PREFIX)
            .ok_or(Error::InvalidHeader)?
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|slots| *slots <= MAX_SEQUENCE_STEPS)
            .ok_or(Error::InvalidActiveSlots)?;

        let mut sequence = Sequence::new();
        for (index, line) in lines.enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let line_number = HEADER_LINES + index + 1;
            let step =
                parse_step(&line, sequence.len()).ok_or(Error::MalformedLine(line_number))?;
            sequence.push(step)?;
        }

        Ok(Self {
            active_slots,
            sequence,
        })
    }
}

fn next_header_line<I>(lines: &mut I) -> io::Result<String>
where
    I: Iterator<Item = io::Result<String>>,
{
    lines.next().unwrap_or_else(|| Err(Error::InvalidHeader.into()))
}

/// Parses `slot <NN> <hold> <fade> - <hex digits>`.
fn parse_step(line: &str, slot: usize) -> Option<SequenceStep> {
    let mut fields = line.split_whitespace();
    let keyword = fields.next()?;
    let index = fields.next()?;
    let hold = fields.next()?;
    let fade = fields.next()?;
    let separator = fields.next()?;
    let digits = fields.next()?;

    if keyword != "slot" || separator != "-" || fields.next().is_some() {
        return None;
    }
    if index.parse::<usize>().ok()? != slot {
        return None;
    }

    let hold = parse_timing(hold)?;
    let fade = parse_timing(fade)?;

    if digits.len() != CHANNEL_COUNT {
        return None;
    }
    let mut channels = [0_u8; CHANNEL_COUNT];
    for (channel, digit) in channels.iter_mut().zip(digits.chars()) {
        *channel = digit.to_digit(16)? as u8 * 16;
    }

    Some(SequenceStep::new(channels_to_colors(&channels), hold, fade))
}

fn parse_timing(value: &str) -> Option<Timing> {
    value.parse::<u8>().ok().and_then(|value| Timing::try_from(value).ok())
}
