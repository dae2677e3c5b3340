//! Conversion between raw register bytes and typed values.
//!
//! All functions are pure: they never touch the bus and hold no state.

use crate::error::CodecError;
use crate::registers::{HOURS_12H_MODE, HOURS_PM, MONTH_CENTURY, TEMPERATURE_BLOCK_LEN, TIME_BLOCK_LEN};
use crate::time::{TemperatureReading, TimeField, TimePoint};

/// Encode a value 0–99 as two BCD digits.
///
/// # Errors
/// [`CodecError::ValueTooLarge`] if `value > 99`.
pub fn encode_bcd(value: u8) -> Result<u8, CodecError> {
    if value > 99 {
        return Err(CodecError::ValueTooLarge(value));
    }
    Ok(((value / 10) << 4) | (value % 10))
}

/// Decode a two-digit BCD byte.
///
/// # Errors
/// [`CodecError::InvalidBcd`] if either nibble is 10–15.
pub fn decode_bcd(byte: u8) -> Result<u8, CodecError> {
    let tens = byte >> 4;
    let ones = byte & 0x0F;
    if tens > 9 || ones > 9 {
        return Err(CodecError::InvalidBcd(byte));
    }
    Ok(tens * 10 + ones)
}

/// Encode a time point into the seven timekeeping registers (0x00–0x06).
///
/// The hour is always written in 24-hour mode. Years 100–199 set the
/// century bit of the month register.
///
/// # Errors
/// [`CodecError::FieldOutOfRange`] if `time` fails validation.
pub fn encode_time(time: &TimePoint) -> Result<[u8; TIME_BLOCK_LEN], CodecError> {
    time.validate().map_err(CodecError::FieldOutOfRange)?;

    let century = if time.century() { MONTH_CENTURY } else { 0 };

    Ok([
        encode_bcd(time.second)?,
        encode_bcd(time.minute)?,
        // Bit 6 clear selects 24-hour mode; BCD 00–23 never sets it.
        encode_bcd(time.hour)? & !HOURS_12H_MODE,
        time.weekday,
        encode_bcd(time.day)?,
        encode_bcd(time.month)? | century,
        encode_bcd(time.year % 100)?,
    ])
}

/// Decode the seven timekeeping registers into a validated time point.
///
/// Unused register bits are masked off. Hour registers written in 12-hour
/// mode by another host are converted to 0–23.
///
/// # Errors
/// * [`CodecError::InvalidBcd`] on a malformed digit
/// * [`CodecError::FieldOutOfRange`] if the decoded fields are not a valid date
pub fn decode_time(raw: &[u8; TIME_BLOCK_LEN]) -> Result<TimePoint, CodecError> {
    let time = TimePoint {
        second: decode_bcd(raw[0] & 0x7F)?,
        minute: decode_bcd(raw[1] & 0x7F)?,
        hour: decode_hour(raw[2])?,
        weekday: raw[3] & 0x07,
        day: decode_bcd(raw[4] & 0x3F)?,
        month: decode_bcd(raw[5] & 0x1F)?,
        year: decode_bcd(raw[6])? + if raw[5] & MONTH_CENTURY != 0 { 100 } else { 0 },
    };
    time.validate().map_err(CodecError::FieldOutOfRange)?;
    Ok(time)
}

fn decode_hour(byte: u8) -> Result<u8, CodecError> {
    if byte & HOURS_12H_MODE == 0 {
        return decode_bcd(byte & 0x3F);
    }

    let hour12 = decode_bcd(byte & 0x1F)?;
    if !(1..=12).contains(&hour12) {
        return Err(CodecError::FieldOutOfRange(TimeField::Hour));
    }
    let pm = if byte & HOURS_PM != 0 { 12 } else { 0 };
    Ok(hour12 % 12 + pm)
}

/// Decode the temperature registers (0x11–0x12).
///
/// The MSB holds signed whole degrees; bits 7:6 of the LSB hold the
/// fraction in quarter steps. Together they form a 10-bit two's complement
/// count of quarter degrees. The low six bits of the LSB are ignored.
pub fn decode_temperature(raw: &[u8; TEMPERATURE_BLOCK_LEN]) -> TemperatureReading {
    let whole = i16::from(raw[0] as i8);
    let fraction = i16::from(raw[1] >> 6);
    TemperatureReading::from_quarters((whole << 2) | fraction)
}

// ── Unit Tests ───────────────────────────────────────────────────────
