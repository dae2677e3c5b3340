//! Error types for the DS3231 driver.
//!
//! Errors are layered the same way the driver is: [`BusError`] comes from
//! the transport, [`CodecError`] from register conversion, and
//! [`DriverError`] wraps both for the public clock API.

use core::fmt;

use embedded_hal_async::i2c::ErrorKind;

use crate::time::TimeField;

/// Errors raised by the bus transport.
#[derive(Debug)]
pub enum BusError<E> {
    /// Underlying I2C bus error, including a missing acknowledge.
    I2c(E),

    /// The transaction did not complete within the configured timeout.
    Timeout,

    /// The requested access is empty or runs past the last register (0x12).
    RegisterRange { register: u8, len: usize },
}

impl<E> BusError<E> {
    /// `true` if the failure is a missing acknowledge from the device.
    pub fn is_nack(&self) -> bool
    where
        E: embedded_hal_async::i2c::Error,
    {
        match self {
            BusError::I2c(e) => matches!(e.kind(), ErrorKind::NoAcknowledge(_)),
            _ => false,
        }
    }
}

// Allow ergonomic `?` propagation from raw I2C errors.
impl<E> From<E> for BusError<E> {
    fn from(error: E) -> Self {
        BusError::I2c(error)
    }
}

impl<E: fmt::Debug> fmt::Display for BusError<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BusError::I2c(e) => write!(f, "I2C error: {:?}", e),
            BusError::Timeout => write!(f, "I2C transaction timed out"),
            BusError::RegisterRange { register, len } => write!(
                f,
                "Access of {} bytes at {:#04x} exceeds the register map",
                len, register
            ),
        }
    }
}

#[cfg(feature = "defmt")]
impl<E: defmt::Format> defmt::Format for BusError<E> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            BusError::I2c(e) => defmt::write!(f, "I2C error: {}", e),
            BusError::Timeout => defmt::write!(f, "I2C timeout"),
            BusError::RegisterRange { register, len } => {
                defmt::write!(f, "Register range {=u8:#x}+{=usize}", register, len)
            }
        }
    }
}

/// Malformed register data or an unencodable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodecError {
    /// A nibble of the byte is greater than 9.
    InvalidBcd(u8),
    /// The value has more than two decimal digits.
    ValueTooLarge(u8),
    /// A decoded or to-be-encoded field is outside its calendar range.
    FieldOutOfRange(TimeField),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CodecError::InvalidBcd(b) => write!(f, "Invalid BCD byte {:#04x}", b),
            CodecError::ValueTooLarge(v) => write!(f, "Value {} does not fit two BCD digits", v),
            CodecError::FieldOutOfRange(field) => write!(f, "{:?} out of range", field),
        }
    }
}

/// Errors returned by [`Ds3231`](crate::Ds3231).
#[derive(Debug)]
pub enum DriverError<E> {
    /// Transport failure.
    Bus(BusError<E>),

    /// The chip returned data that does not decode.
    Codec(CodecError),

    /// A field of the time to write is out of range. Nothing was sent.
    OutOfRange(TimeField),

    /// The request sets control bits the driver does not manage.
    UnsupportedControl,

    /// An operation was attempted before [`Ds3231::initialize()`](crate::Ds3231::initialize)
    /// succeeded.
    NotInitialized,
}

impl<E> DriverError<E> {
    /// `true` if the error originated on the bus.
    pub fn is_bus(&self) -> bool {
        matches!(self, DriverError::Bus(_))
    }
}

impl<E> From<BusError<E>> for DriverError<E> {
    fn from(error: BusError<E>) -> Self {
        DriverError::Bus(error)
    }
}

impl<E> From<CodecError> for DriverError<E> {
    fn from(error: CodecError) -> Self {
        DriverError::Codec(error)
    }
}

impl<E: fmt::Debug> fmt::Display for DriverError<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DriverError::Bus(e) => write!(f, "{}", e),
            DriverError::Codec(e) => write!(f, "{}", e),
            DriverError::OutOfRange(field) => write!(f, "{:?} out of range", field),
            DriverError::UnsupportedControl => write!(f, "Unsupported control bits"),
            DriverError::NotInitialized => write!(f, "Driver not initialized"),
        }
    }
}

#[cfg(feature = "defmt")]
impl<E: defmt::Format> defmt::Format for DriverError<E> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            DriverError::Bus(e) => defmt::write!(f, "{}", e),
            DriverError::Codec(e) => defmt::write!(f, "{}", e),
            DriverError::OutOfRange(field) => defmt::write!(f, "{} out of range", field),
            DriverError::UnsupportedControl => defmt::write!(f, "Unsupported control bits"),
            DriverError::NotInitialized => defmt::write!(f, "Not initialized"),
        }
    }
}
