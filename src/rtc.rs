//! High-level interface for the DS3231 real-time clock.
//!
//! [`Ds3231`] wraps the low-level bus transport with field validation,
//! register encoding, and a small health state machine.

use embedded_hal_async::i2c::I2c;

use crate::codec::{decode_temperature, decode_time, encode_time};
use crate::config::Config;
use crate::driver::BusDriver;
use crate::error::{BusError, DriverError};
use crate::registers::{
    ControlRegister, StatusRegister, REG_AGING_OFFSET, REG_CONTROL, REG_SECONDS, REG_STATUS,
    REG_TEMPERATURE_MSB, TEMPERATURE_BLOCK_LEN, TIME_BLOCK_LEN,
};
use crate::time::{TemperatureReading, TimePoint};

/// Health of the link to the chip.
///
/// Any bus failure moves the driver to `Faulted`; the next successful
/// transaction moves it back to `Ready`. No fault history is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverState {
    Uninitialized,
    Ready,
    Faulted,
}

/// Result of [`Ds3231::read_time()`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeReading {
    pub time: TimePoint,
    /// The oscillator stopped since the time was last written, so `time`
    /// may not be trustworthy.
    ///
    /// This reflects the oscillator-stop flag as of the last
    /// [`initialize()`](Ds3231::initialize) or [`status()`](Ds3231::status)
    /// call; `read_time()` itself does not read the status register.
    pub stale: bool,
}

/// High-level interface for the DS3231.
///
/// Owns the bus handle, the driver state, and the last time successfully
/// read from or written to the chip.
///
/// # Example
///
/// ```ignore
/// use ds3231_rtc::{Ds3231, DEFAULT_ADDRESS};
///
/// // `i2c` is any `embedded-hal-async` I2C implementation
/// let mut rtc = Ds3231::new(i2c, DEFAULT_ADDRESS);
/// rtc.initialize().await?;
///
/// let reading = rtc.read_time().await?;
/// if reading.stale {
///     // Battery ran out at some point; set the clock before trusting it.
/// }
/// ```
pub struct Ds3231<I2C> {
    bus: BusDriver<I2C>,
    state: DriverState,
    initialized: bool,
    stale: bool,
    last_time: Option<TimePoint>,
}

impl<I2C> Ds3231<I2C>
where
    I2C: I2c,
{
    /// Create a driver with the default bus timeout.
    ///
    /// No I2C traffic is generated. You **must** call
    /// [`initialize()`](Self::initialize) before any other operation.
    ///
    /// # Arguments
    /// * `i2c` - I2C peripheral (takes ownership for exclusive access)
    /// * `address` - 7-bit I2C device address (typically 0x68)
    pub fn new(i2c: I2C, address: u8) -> Self {
        let config = Config {
            address,
            ..Config::default()
        };
        Self::from_config(i2c, &config)
    }

    /// Create a driver using the address and bus timeout from `config`.
    pub fn from_config(i2c: I2C, config: &Config) -> Self {
        Self {
            bus: BusDriver::new(i2c, config.address, config.bus_timeout),
            state: DriverState::Uninitialized,
            initialized: false,
            stale: false,
            last_time: None,
        }
    }

    // -----------------------------------------------------------------------
    // State
    // -----------------------------------------------------------------------

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn address(&self) -> u8 {
        self.bus.address()
    }

    /// `true` while the chip reports that its oscillator stopped and no
    /// time has been written since.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Last time read from or written to the chip. Not updated by failed
    /// operations.
    pub fn last_known_time(&self) -> Option<TimePoint> {
        self.last_time
    }

    /// Tear down the driver and return the I2C peripheral.
    pub fn release(self) -> I2C {
        self.bus.release()
    }

    fn ensure_initialized(&self) -> Result<(), DriverError<I2C::Error>> {
        if self.initialized {
            Ok(())
        } else {
            Err(DriverError::NotInitialized)
        }
    }

    /// Fold a bus result into the driver state.
    fn track<T>(
        &mut self,
        result: Result<T, BusError<I2C::Error>>,
    ) -> Result<T, DriverError<I2C::Error>> {
        match result {
            Ok(value) => {
                self.state = DriverState::Ready;
                Ok(value)
            }
            Err(e) => {
                self.state = DriverState::Faulted;
                Err(e.into())
            }
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Check that the chip responds and whether its time can be trusted.
    ///
    /// Reads the status register. If the oscillator-stop flag is set the
    /// call still succeeds, but every [`TimeReading`] is marked stale until
    /// a time is written.
    ///
    /// # Errors
    /// * [`DriverError::Bus`] if the chip does not respond; the driver stays
    ///   uninitialised and the call may be retried
    pub async fn initialize(&mut self) -> Result<StatusRegister, DriverError<I2C::Error>> {
        let result = self.bus.read_u8(REG_STATUS).await;
        let status = StatusRegister::from_bits_retain(self.track(result)?);
        self.initialized = true;

        self.stale = status.contains(StatusRegister::OSF);
        if self.stale {
            #[cfg(feature = "defmt")]
            defmt::warn!("DS3231 oscillator stopped; retained time is unreliable");
        }

        #[cfg(feature = "defmt")]
        defmt::info!("DS3231 initialised at {=u8:#x}: {}", self.address(), status);

        Ok(status)
    }

    // -----------------------------------------------------------------------
    // Time
    // -----------------------------------------------------------------------

    /// Read the current time from the chip.
    ///
    /// All seven timekeeping registers are read in a single transaction.
    /// On failure the cached [`last_known_time`](Self::last_known_time) is
    /// left unchanged.
    ///
    /// # Errors
    /// * [`DriverError::NotInitialized`] before [`initialize()`](Self::initialize)
    /// * [`DriverError::Bus`] on communication failure
    /// * [`DriverError::Codec`] if the registers hold an invalid time
    pub async fn read_time(&mut self) -> Result<TimeReading, DriverError<I2C::Error>> {
        self.ensure_initialized()?;

        let mut raw = [0u8; TIME_BLOCK_LEN];
        let result = self.bus.read(REG_SECONDS, &mut raw).await;
        self.track(result)?;

        let time = decode_time(&raw)?;
        self.last_time = Some(time);

        #[cfg(feature = "defmt")]
        defmt::debug!("DS3231 read {}", time);

        Ok(TimeReading {
            time,
            stale: self.stale,
        })
    }

    /// Set the chip's time and mark it trusted.
    ///
    /// Writes the seven timekeeping registers in one transaction, then
    /// clears the oscillator-stop flag.
    ///
    /// # Errors
    /// * [`DriverError::OutOfRange`] if a field is invalid; nothing is sent
    /// * [`DriverError::NotInitialized`] before [`initialize()`](Self::initialize)
    /// * [`DriverError::Bus`] on communication failure
    ///
    /// # Example
    /// ```ignore
    /// let time = TimePoint::new(24, 3, 15, 6, 14, 30, 0)?;
    /// rtc.write_time(&time).await?;
    /// ```
    pub async fn write_time(&mut self, time: &TimePoint) -> Result<(), DriverError<I2C::Error>> {
        time.validate().map_err(DriverError::OutOfRange)?;
        self.ensure_initialized()?;

        let raw = encode_time(time)?;
        let result = self.bus.write(REG_SECONDS, &raw).await;
        self.track(result)?;
        self.last_time = Some(*time);

        self.clear_oscillator_stop().await?;

        #[cfg(feature = "defmt")]
        defmt::debug!("DS3231 wrote {}", time);

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Temperature
    // -----------------------------------------------------------------------

    /// Read the die temperature.
    ///
    /// The chip converts on its own every 64 seconds; this returns the
    /// latest completed conversion and never starts one.
    pub async fn read_temperature(
        &mut self,
    ) -> Result<TemperatureReading, DriverError<I2C::Error>> {
        self.ensure_initialized()?;

        let mut raw = [0u8; TEMPERATURE_BLOCK_LEN];
        let result = self.bus.read(REG_TEMPERATURE_MSB, &mut raw).await;
        self.track(result)?;

        Ok(decode_temperature(&raw))
    }

    // -----------------------------------------------------------------------
    // Status and configuration
    // -----------------------------------------------------------------------

    /// Read the status register.
    ///
    /// Also refreshes [`is_stale()`](Self::is_stale) from the
    /// oscillator-stop flag.
    pub async fn status(&mut self) -> Result<StatusRegister, DriverError<I2C::Error>> {
        self.ensure_initialized()?;
        let result = self.bus.read_u8(REG_STATUS).await;
        let status = StatusRegister::from_bits_retain(self.track(result)?);
        self.stale = status.contains(StatusRegister::OSF);
        Ok(status)
    }

    /// Clear the oscillator-stop flag, leaving the other status bits alone.
    ///
    /// Alarm flags can only be cleared by writing 0, so writing back the
    /// value just read leaves them as they were.
    pub async fn clear_oscillator_stop(&mut self) -> Result<(), DriverError<I2C::Error>> {
        let status = self.status().await?;
        if status.contains(StatusRegister::OSF) {
            let cleared = status.difference(StatusRegister::OSF);
            let result = self.bus.write_u8(REG_STATUS, cleared.bits()).await;
            self.track(result)?;
        }
        self.stale = false;
        Ok(())
    }

    pub async fn control(&mut self) -> Result<ControlRegister, DriverError<I2C::Error>> {
        self.ensure_initialized()?;
        let result = self.bus.read_u8(REG_CONTROL).await;
        Ok(ControlRegister::from_bits_retain(self.track(result)?))
    }

    /// Write the control register.
    ///
    /// # Errors
    /// * [`DriverError::UnsupportedControl`] if `control` sets
    ///   [`ControlRegister::CONV`]; conversions are left to the chip
    /// * [`DriverError::Bus`] on communication failure
    pub async fn configure(
        &mut self,
        control: ControlRegister,
    ) -> Result<(), DriverError<I2C::Error>> {
        if control.contains(ControlRegister::CONV) {
            return Err(DriverError::UnsupportedControl);
        }
        self.ensure_initialized()?;

        let result = self.bus.write_u8(REG_CONTROL, control.bits()).await;
        self.track(result)?;

        #[cfg(feature = "defmt")]
        defmt::debug!("DS3231 control set to {}", control);

        Ok(())
    }

    /// Crystal aging trim. Positive values slow the oscillator down.
    pub async fn aging_offset(&mut self) -> Result<i8, DriverError<I2C::Error>> {
        self.ensure_initialized()?;
        let result = self.bus.read_u8(REG_AGING_OFFSET).await;
        Ok(self.track(result)? as i8)
    }

    pub async fn set_aging_offset(&mut self, offset: i8) -> Result<(), DriverError<I2C::Error>> {
        self.ensure_initialized()?;
        let result = self.bus.write_u8(REG_AGING_OFFSET, offset as u8).await;
        self.track(result)
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────
