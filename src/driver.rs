//! Low-level DS3231 bus transport.
//!
//! Implements addressed register-range reads and writes over I2C with a
//! bounded transaction time. There are no retries at this layer; every
//! failure is returned to the caller immediately.
//!
//! This module is crate-private; consumers interact with [`Ds3231`]
//! in `rtc.rs` instead.
//!
//! [`Ds3231`]: crate::Ds3231

use embassy_time::{with_timeout, Duration};
use embedded_hal_async::i2c::I2c;

use crate::error::BusError;
use crate::registers::LAST_REGISTER;

/// Largest single write payload: every register from 0x00 to 0x12.
const MAX_PAYLOAD: usize = LAST_REGISTER as usize + 1;

/// Low-level register transport.
///
/// Owns an I2C peripheral and the device address so that no other driver
/// can interleave transactions with it.
pub(crate) struct BusDriver<I2C> {
    i2c: I2C,
    address: u8,
    timeout: Duration,
}

impl<I2C> BusDriver<I2C>
where
    I2C: I2c,
{
    /// Create a new transport.
    ///
    /// # Arguments
    /// * `i2c` - I2C peripheral (takes ownership for exclusive access)
    /// * `address` - 7-bit I2C device address (typically 0x68)
    /// * `timeout` - upper bound for a single transaction
    pub fn new(i2c: I2C, address: u8, timeout: Duration) -> Self {
        Self {
            i2c,
            address,
            timeout,
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Give back the I2C peripheral.
    pub fn release(self) -> I2C {
        self.i2c
    }

    // -----------------------------------------------------------------------
    // Core protocol primitives
    // -----------------------------------------------------------------------

    /// Reject empty accesses and accesses that run past the register map.
    fn check_range(register: u8, len: usize) -> Result<(), BusError<I2C::Error>> {
        if len == 0 || usize::from(register) + len > MAX_PAYLOAD {
            return Err(BusError::RegisterRange { register, len });
        }
        Ok(())
    }

    /// Read `buffer.len()` consecutive registers starting at `register`.
    ///
    /// The register pointer write and the data read happen in one
    /// `write_read` transaction (repeated start), so a multi-byte block is
    /// captured by the chip's user buffer in one go and cannot tear across
    /// a seconds rollover.
    pub async fn read(
        &mut self,
        register: u8,
        buffer: &mut [u8],
    ) -> Result<(), BusError<I2C::Error>> {
        Self::check_range(register, buffer.len())?;

        match with_timeout(
            self.timeout,
            self.i2c.write_read(self.address, &[register], buffer),
        )
        .await
        {
            Ok(result) => Ok(result?),
            Err(_) => Err(BusError::Timeout),
        }
    }

    /// Write `bytes` to consecutive registers starting at `register`.
    ///
    /// Sends `[register, bytes...]` as a single I2C write transaction.
    pub async fn write(
        &mut self,
        register: u8,
        bytes: &[u8],
    ) -> Result<(), BusError<I2C::Error>> {
        Self::check_range(register, bytes.len())?;

        let mut buf = [0u8; MAX_PAYLOAD + 1];
        buf[0] = register;
        buf[1..=bytes.len()].copy_from_slice(bytes);

        match with_timeout(
            self.timeout,
            self.i2c.write(self.address, &buf[..=bytes.len()]),
        )
        .await
        {
            Ok(result) => Ok(result?),
            Err(_) => Err(BusError::Timeout),
        }
    }

    // -----------------------------------------------------------------------
    // Typed read/write helpers
    // -----------------------------------------------------------------------

    /// Read a single register.
    pub async fn read_u8(&mut self, register: u8) -> Result<u8, BusError<I2C::Error>> {
        let mut buf = [0u8; 1];
        self.read(register, &mut buf).await?;
        Ok(buf[0])
    }

    /// Write a single register.
    pub async fn write_u8(
        &mut self,
        register: u8,
        value: u8,
    ) -> Result<(), BusError<I2C::Error>> {
        self.write(register, &[value]).await
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────
