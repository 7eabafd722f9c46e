//! PlasmaTrim data model.

use core::{fmt::Display, str::FromStr, time::Duration};

pub use rgb::RGB8 as Color;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// ChromaCove vendor identifier.
pub const VENDOR_ID: u16 = 0x26F3;
/// PlasmaTrim product identifier.
pub const PRODUCT_ID: u16 = 0x1000;

/// Number of LEDs of the PlasmaTrim RGB-8 fixture.
pub const LED_COUNT: usize = 8;
/// Number of color channels of the whole fixture.
pub const CHANNEL_COUNT: usize = LED_COUNT * 3;
/// Number of sequence slots the device is able to store.
pub const MAX_SEQUENCE_STEPS: usize = 76;
/// Highest brightness value accepted by the device, values above are clamped.
pub const MAX_BRIGHTNESS: u8 = 0x64;
/// Maximum length of the device name in bytes.
pub const NAME_MAX_LEN: usize = 31;

/// Clamps the given brightness to the range supported by the device.
#[must_use]
pub const fn clamp_brightness(value: u8) -> u8 {
    if value > MAX_BRIGHTNESS {
        MAX_BRIGHTNESS
    } else {
        value
    }
}

/// Hold or fade duration of a sequence step.
///
/// The device stores it as a single nibble, so there are only sixteen levels.
#[repr(u8)]
#[derive(
    Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug, Default,
)]
pub enum Timing {
    Instantly = 0,
    TenthOfSecond = 1,
    QuarterOfSecond = 2,
    HalfOfSecond = 3,
    #[default]
    OneSecond = 4,
    TwoAndHalfSeconds = 5,
    FiveSeconds = 6,
    TenSeconds = 7,
    FifteenSeconds = 8,
    ThirtySeconds = 9,
    OneMinute = 10,
    TwoAndHalfMinutes = 11,
    FiveMinutes = 12,
    TenMinutes = 13,
    FifteenMinutes = 14,
    ThirtyMinutes = 15,
}

impl Timing {
    /// All timing levels ordered by their nibble value.
    pub const ALL: [Self; 16] = [
        Self::Instantly,
        Self::TenthOfSecond,
        Self::QuarterOfSecond,
        Self::HalfOfSecond,
        Self::OneSecond,
        Self::TwoAndHalfSeconds,
        Self::FiveSeconds,
        Self::TenSeconds,
        Self::FifteenSeconds,
        Self::ThirtySeconds,
        Self::OneMinute,
        Self::TwoAndHalfMinutes,
        Self::FiveMinutes,
        Self::TenMinutes,
        Self::FifteenMinutes,
        Self::ThirtyMinutes,
    ];

    /// Creates a timing from the low nibble of the given byte.
    #[must_use]
    pub const fn from_nibble(value: u8) -> Self {
        Self::ALL[(value & 0x0F) as usize]
    }

    /// Returns the wire representation.
    #[must_use]
    pub const fn nibble(self) -> u8 {
        self as u8
    }

    /// Returns the timing length in milliseconds.
    #[must_use]
    pub const fn millis(self) -> u64 {
        const SECOND: u64 = 1_000;
        const MINUTE: u64 = 60 * SECOND;

        match self {
            Self::Instantly => 0,
            Self::TenthOfSecond => 100,
            Self::QuarterOfSecond => 250,
            Self::HalfOfSecond => 500,
            Self::OneSecond => SECOND,
            Self::TwoAndHalfSeconds => 2_500,
            Self::FiveSeconds => 5 * SECOND,
            Self::TenSeconds => 10 * SECOND,
            Self::FifteenSeconds => 15 * SECOND,
            Self::ThirtySeconds => 30 * SECOND,
            Self::OneMinute => MINUTE,
            Self::TwoAndHalfMinutes => 150 * SECOND,
            Self::FiveMinutes => 5 * MINUTE,
            Self::TenMinutes => 10 * MINUTE,
            Self::FifteenMinutes => 15 * MINUTE,
            Self::ThirtyMinutes => 30 * MINUTE,
        }
    }

    #[must_use]
    pub const fn as_duration(self) -> Duration {
        Duration::from_millis(self.millis())
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Instantly => "instantly",
            Self::TenthOfSecond => "0.1s",
            Self::QuarterOfSecond => "0.25s",
            Self::HalfOfSecond => "0.5s",
            Self::OneSecond => "1s",
            Self::TwoAndHalfSeconds => "2.5s",
            Self::FiveSeconds => "5s",
            Self::TenSeconds => "10s",
            Self::FifteenSeconds => "15s",
            Self::ThirtySeconds => "30s",
            Self::OneMinute => "1min",
            Self::TwoAndHalfMinutes => "2.5min",
            Self::FiveMinutes => "5min",
            Self::TenMinutes => "10min",
            Self::FifteenMinutes => "15min",
            Self::ThirtyMinutes => "30min",
        }
    }
}

impl TryFrom<u8> for Timing {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        if value > 0x0F {
            return Err(Error::InvalidTiming);
        }
        Ok(Self::from_nibble(value))
    }
}

impl From<Timing> for Duration {
    fn from(value: Timing) -> Self {
        value.as_duration()
    }
}

impl Display for Timing {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Parses either a label such as `2.5s` or a raw nibble value such as `5`.
impl FromStr for Timing {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if let Some(timing) = Self::ALL.into_iter().find(|timing| timing.label() == s) {
            return Ok(timing);
        }

        let value = u8::from_str(s).map_err(|_| Error::InvalidTiming)?;
        Self::try_from(value)
    }
}

/// A single step of the stored animation.
#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Debug)]
pub struct SequenceStep {
    /// One color per LED.
    pub colors: [Color; LED_COUNT],
    /// How long the colors are shown.
    pub hold: Timing,
    /// How long the transition to the next step takes.
    pub fade: Timing,
}

impl SequenceStep {
    pub const fn new(colors: [Color; LED_COUNT], hold: Timing, fade: Timing) -> Self {
        Self { colors, hold, fade }
    }

    /// Creates a step from a color slice, which must contain exactly one color per LED.
    pub fn from_slice(colors: &[Color], hold: Timing, fade: Timing) -> Result<Self> {
        let colors = colors.try_into().map_err(|_| Error::ColorCountMismatch)?;
        Ok(Self::new(colors, hold, fade))
    }

    /// Creates a step with all the LEDs set to the same color.
    pub fn solid(color: Color) -> Self {
        Self::new([color; LED_COUNT], Timing::default(), Timing::default())
    }

    /// Returns this step as it would be read back from the device storage,
    /// the low four bits of each channel are lost.
    #[must_use]
    pub fn truncated(&self) -> Self {
        let mut step = *self;
        for color in &mut step.colors {
            *color = Color::new(color.r & 0xF0, color.g & 0xF0, color.b & 0xF0);
        }
        step
    }
}

/// An ordered list of sequence steps, the position of a step is its slot index.
#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug, Default)]
pub struct Sequence(heapless::Vec<SequenceStep, MAX_SEQUENCE_STEPS>);

impl Sequence {
    pub const fn new() -> Self {
        Self(heapless::Vec::new())
    }

    pub fn from_slice(steps: &[SequenceStep]) -> Result<Self> {
        heapless::Vec::from_slice(steps)
            .map(Self)
            .map_err(|()| Error::SequenceTooLong)
    }

    /// Appends a step into the next free slot.
    pub fn push(&mut self, step: SequenceStep) -> Result<()> {
        self.0.push(step).map_err(|_| Error::SequenceTooLong)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, slot: usize) -> Option<&SequenceStep> {
        self.0.get(slot)
    }

    pub fn as_slice(&self) -> &[SequenceStep] {
        &self.0
    }

    pub fn iter(&self) -> core::slice::Iter<'_, SequenceStep> {
        self.0.iter()
    }
}

impl TryFrom<&[SequenceStep]> for Sequence {
    type Error = Error;

    fn try_from(steps: &[SequenceStep]) -> Result<Self> {
        Self::from_slice(steps)
    }
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = &'a SequenceStep;
    type IntoIter = core::slice::Iter<'a, SequenceStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Factory serial number of the device.
#[derive(Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy, Debug, Default)]
pub struct SerialNumber(pub [u8; 4]);

impl Display for SerialNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("-")?;
            }
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

/// User configurable device name.
#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug, Default)]
pub struct DeviceName(heapless::String<NAME_MAX_LEN>);

impl DeviceName {
    pub fn new(name: &str) -> Result<Self> {
        let mut inner = heapless::String::new();
        inner.push_str(name).map_err(|()| Error::PayloadTooLong)?;
        Ok(Self(inner))
    }

    /// Decodes a NUL padded UTF-8 name.
    ///
    /// An invalid UTF-8 tail is dropped, names longer than [`NAME_MAX_LEN`]
    /// are truncated.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let text = match core::str::from_utf8(bytes) {
            Ok(text) => text,
            Err(err) => core::str::from_utf8(&bytes[..err.valid_up_to()]).unwrap_or_default(),
        };

        let mut inner = heapless::String::new();
        for ch in text.trim_matches('\0').chars() {
            if inner.push(ch).is_err() {
                break;
            }
        }
        Self(inner)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl Display for DeviceName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity fields which are read once the device is connected.
#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug, Default)]
pub struct DeviceIdentity {
    pub serial_number: SerialNumber,
    pub name: DeviceName,
}
