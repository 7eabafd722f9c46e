use log::{debug, info, trace};
use plasmatrim_core::{
    proto::{Command, Response, RESPONSE_REPORT_ID},
    types::{Color, DeviceIdentity, DeviceName, Sequence, SequenceStep, SerialNumber, LED_COUNT},
    Error as ProtocolError,
};

use crate::{is_plasmatrim, Error, HidTransport, Result};

/// PlasmaTrim device session.
///
/// The session exclusively owns the transport. It starts closed, every
/// command requires it to be opened with [`Session::open`] first.
pub struct Session<T: HidTransport> {
    transport: T,
    identity: DeviceIdentity,
    open: bool,
}

impl<T: HidTransport> Session<T> {
    /// Creates a new session on top of the given transport.
    ///
    /// The device is opened for a moment to read its serial number and name,
    /// and then closed again.
    pub fn new(transport: T) -> Result<Self, T::Error> {
        if !is_plasmatrim(&transport) {
            return Err(Error::NotPlasmaTrim {
                vendor_id: transport.vendor_id(),
                product_id: transport.product_id(),
            });
        }

        let mut session = Self {
            transport,
            identity: DeviceIdentity::default(),
            open: false,
        };

        session.open()?;
        let identity = session.read_identity();
        session.close();

        session.identity = identity?;
        info!(
            "Found PlasmaTrim {} \"{}\"",
            session.identity.serial_number, session.identity.name
        );
        Ok(session)
    }

    fn read_identity(&mut self) -> Result<DeviceIdentity, T::Error> {
        let serial_number = self
            .send_and_receive(Command::GetSerialNumber)?
            .serial_number()?;
        let name = self.send_and_receive(Command::GetDeviceName)?.device_name()?;

        Ok(DeviceIdentity {
            serial_number,
            name,
        })
    }

    /// Opens a connection to the device, does nothing if it is already open.
    pub fn open(&mut self) -> Result<(), T::Error> {
        if self.open {
            return Ok(());
        }

        self.transport.open().map_err(Error::Transport)?;
        self.open = true;
        debug!("Opened device {}", self.identity.serial_number);
        Ok(())
    }

    /// Closes the connection to the device, does nothing if it is already closed.
    pub fn close(&mut self) {
        if !self.open {
            return;
        }

        self.transport.close();
        self.open = false;
        debug!("Closed device {}", self.identity.serial_number);
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Identity fields read once at construction.
    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    pub fn serial_number(&self) -> SerialNumber {
        self.identity.serial_number
    }

    pub fn name(&self) -> &DeviceName {
        &self.identity.name
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Plays the sequence stored in the device memory.
    pub fn play_stored_sequence(&mut self) -> Result<(), T::Error> {
        Ok(self.send_and_receive(Command::PlayStoredSequence)?.empty()?)
    }

    /// Stops playing the sequence stored in the device memory.
    pub fn stop_stored_sequence(&mut self) -> Result<(), T::Error> {
        Ok(self.send_and_receive(Command::StopStoredSequence)?.empty()?)
    }

    /// Sets all LED colors immediately, without storing them.
    ///
    /// The slice must contain exactly one color per LED, brightness above
    /// the maximum is clamped.
    pub fn set_colors(&mut self, colors: &[Color], brightness: u8) -> Result<(), T::Error> {
        let colors = colors
            .try_into()
            .map_err(|_| ProtocolError::ColorCountMismatch)?;

        Ok(self
            .send_and_receive(Command::SetColorImmediate { colors, brightness })?
            .empty()?)
    }

    /// Sets all LEDs to the same color.
    pub fn set_color(&mut self, color: Color, brightness: u8) -> Result<(), T::Error> {
        self.set_colors(&[color; LED_COUNT], brightness)
    }

    /// Returns the currently shown LED colors.
    pub fn colors(&mut self) -> Result<[Color; LED_COUNT], T::Error> {
        Ok(self.send_and_receive(Command::GetColorImmediate)?.colors()?)
    }

    pub fn brightness(&mut self) -> Result<u8, T::Error> {
        Ok(self.send_and_receive(Command::GetBrightness)?.brightness()?)
    }

    /// Sets the brightness of the currently shown colors, values above the
    /// maximum are clamped.
    pub fn set_brightness(&mut self, brightness: u8) -> Result<(), T::Error> {
        Ok(self
            .send_and_receive(Command::SetBrightness(brightness))?
            .empty()?)
    }

    /// Returns the number of active slots of the stored sequence.
    pub fn sequence_length(&mut self) -> Result<u8, T::Error> {
        Ok(self
            .send_and_receive(Command::GetSequenceLength)?
            .sequence_length()?)
    }

    pub fn sequence_step(&mut self, slot: u8) -> Result<SequenceStep, T::Error> {
        Ok(self
            .send_and_receive(Command::GetSequenceStep { slot })?
            .sequence_step()?)
    }

    /// Stores a single sequence step, colors are truncated to four bits per channel.
    pub fn set_sequence_step(&mut self, slot: u8, step: &SequenceStep) -> Result<(), T::Error> {
        Ok(self
            .send_and_receive(Command::SetSequenceStep { slot, step: *step })?
            .empty()?)
    }

    /// Reads all the active slots of the stored sequence.
    pub fn sequence(&mut self) -> Result<Sequence, T::Error> {
        let len = self.sequence_length()?;

        let mut sequence = Sequence::new();
        for slot in 0..len {
            sequence.push(self.sequence_step(slot)?)?;
        }
        Ok(sequence)
    }

    /// Replaces the stored sequence, the slot order follows the order of the steps.
    ///
    /// The length is validated before anything is sent to the device.
    pub fn set_sequence(&mut self, steps: &[SequenceStep]) -> Result<(), T::Error> {
        let sequence = Sequence::try_from(steps)?;
        let len = u8::try_from(sequence.len()).map_err(|_| ProtocolError::SequenceTooLong)?;

        self.send_and_receive(Command::SetSequenceLength(len))?
            .empty()?;
        for (slot, step) in (0_u8..).zip(&sequence) {
            self.set_sequence_step(slot, step)?;
        }
        Ok(())
    }

    /// Changes the device name and updates the cached identity.
    pub fn set_name(&mut self, name: &str) -> Result<(), T::Error> {
        let name = DeviceName::new(name)?;

        self.send_and_receive(Command::SetDeviceName(name.clone()))?
            .empty()?;
        self.identity.name = name;
        Ok(())
    }

    /// Sends a command and reads back exactly one report.
    ///
    /// Each write must be followed by a read, even for commands without a
    /// meaningful response, otherwise the device read and write cursors
    /// get out of sync.
    fn send_and_receive(&mut self, command: Command) -> Result<Response, T::Error> {
        if !self.open {
            return Err(Error::NotOpen);
        }

        let frame = command.encode()?;
        trace!("Sending command {command:?}");
        self.transport.write(&frame).map_err(Error::Transport)?;

        let report = self
            .transport
            .read(RESPONSE_REPORT_ID)
            .map_err(Error::Transport)?;
        trace!("Got report {:02X?}", report.as_bytes());

        Ok(command.decode_response(&report)?)
    }
}

impl<T: HidTransport> Drop for Session<T> {
    fn drop(&mut self) {
        self.close();
    }
}
