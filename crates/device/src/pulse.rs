//! Pulse animation.
//!
//! There is no pulse primitive on the device, the animation is a scripted
//! series of brightness commands.

use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use embedded_hal::blocking::delay::DelayMs;
use plasmatrim_core::types::{Color, MAX_BRIGHTNESS};

use crate::{HidTransport, Result, Session};

/// Brightness decrement between two pulse steps.
pub const PULSE_STEP: u8 = 3;
/// Pause between two pulse steps.
pub const PULSE_INTERVAL_MS: u8 = 15;

/// Blocking delay based on [`std::thread::sleep`].
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl DelayMs<u8> for StdDelay {
    fn delay_ms(&mut self, ms: u8) {
        std::thread::sleep(Duration::from_millis(ms.into()));
    }
}

impl<T: HidTransport> Session<T> {
    /// Sets all LEDs to the given color at full brightness and slowly dims it.
    ///
    /// Brightness goes down from `MAX_BRIGHTNESS - 1` in steps of [`PULSE_STEP`]
    /// with a [`PULSE_INTERVAL_MS`] pause after each step, then the full
    /// brightness is restored.
    pub fn pulse_color<D>(&mut self, color: Color, delay: &mut D) -> Result<(), T::Error>
    where
        D: DelayMs<u8>,
    {
        self.pulse_color_cancellable(color, delay, &AtomicBool::new(false))
    }

    /// Same as [`Session::pulse_color`], but stops dimming as soon as the
    /// `cancelled` flag is raised.
    ///
    /// The flag is checked between steps, the full brightness is restored in
    /// any case.
    pub fn pulse_color_cancellable<D>(
        &mut self,
        color: Color,
        delay: &mut D,
        cancelled: &AtomicBool,
    ) -> Result<(), T::Error>
    where
        D: DelayMs<u8>,
    {
        self.set_color(color, MAX_BRIGHTNESS)?;

        let mut brightness = MAX_BRIGHTNESS - 1;
        while brightness > 0 && !cancelled.load(Ordering::Relaxed) {
            self.set_brightness(brightness)?;
            delay.delay_ms(PULSE_INTERVAL_MS);
            brightness = brightness.saturating_sub(PULSE_STEP);
        }

        self.set_brightness(MAX_BRIGHTNESS)
    }
}
