//! Calendar and temperature value types.
//!
//! [`TimePoint`] is the typed view of the seven timekeeping registers and
//! [`TemperatureReading`] the typed view of the two temperature registers.
//! Neither type performs any I/O.

use crate::registers::BASE_YEAR;

/// Lowest temperature the DS3231 is specified to operate at, in °C.
pub const MIN_OPERATING_CELSIUS: f32 = -40.0;

/// Highest temperature the DS3231 is specified to operate at, in °C.
pub const MAX_OPERATING_CELSIUS: f32 = 85.0;

/// Largest `year` offset representable with the century bit (2199).
pub const MAX_YEAR_OFFSET: u8 = 199;

/// Identifies a [`TimePoint`] field, used to report range violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeField {
    Year,
    Month,
    Day,
    Weekday,
    Hour,
    Minute,
    Second,
}

/// A calendar date and time of day as held by the chip.
///
/// `year` counts from [`BASE_YEAR`]. Values 0–99 live in the base century;
/// 100–199 are the same registers with the century bit set. `weekday` runs
/// 1–7 with 1 meaning Sunday. The chip itself only increments the weekday
/// register, so its meaning is whatever the writer chose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimePoint {
    pub year: u8,
    pub month: u8,
    pub day: u8,
    pub weekday: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl TimePoint {
    /// Build a validated time point.
    ///
    /// # Errors
    /// Returns the first [`TimeField`] that is out of range.
    pub fn new(
        year: u8,
        month: u8,
        day: u8,
        weekday: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<Self, TimeField> {
        let time = Self {
            year,
            month,
            day,
            weekday,
            hour,
            minute,
            second,
        };
        time.validate()?;
        Ok(time)
    }

    /// Check every field against the range the chip can represent.
    ///
    /// The day of month is checked against the month length, including
    /// leap years computed on the full calendar year.
    pub fn validate(&self) -> Result<(), TimeField> {
        if self.year > MAX_YEAR_OFFSET {
            return Err(TimeField::Year);
        }
        if !(1..=12).contains(&self.month) {
            return Err(TimeField::Month);
        }
        if self.day == 0 || self.day > days_in_month(self.full_year(), self.month) {
            return Err(TimeField::Day);
        }
        if !(1..=7).contains(&self.weekday) {
            return Err(TimeField::Weekday);
        }
        if self.hour > 23 {
            return Err(TimeField::Hour);
        }
        if self.minute > 59 {
            return Err(TimeField::Minute);
        }
        if self.second > 59 {
            return Err(TimeField::Second);
        }
        Ok(())
    }

    /// Calendar year, e.g. `2024` for `year == 24`.
    pub fn full_year(&self) -> u16 {
        BASE_YEAR + u16::from(self.year)
    }

    /// `true` when the year lies in the second century, i.e. the month
    /// register's century bit is set.
    pub fn century(&self) -> bool {
        self.year >= 100
    }
}

/// Gregorian leap-year rule.
pub fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` (1–12) of `year`. Returns 0 for an invalid month.
pub fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

// ---------------------------------------------------------------------------
// Temperature
// ---------------------------------------------------------------------------

/// Die temperature with 0.25 °C resolution.
///
/// Stored as a signed count of quarter degrees, which is exactly the
/// chip's 10-bit two's complement value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TemperatureReading {
    quarters: i16,
}

impl TemperatureReading {
    pub const fn from_quarters(quarters: i16) -> Self {
        Self { quarters }
    }

    pub fn quarters(&self) -> i16 {
        self.quarters
    }

    /// Temperature in degrees Celsius.
    pub fn celsius(&self) -> f32 {
        f32::from(self.quarters) / 4.0
    }

    /// Whole degrees, rounded towards negative infinity (the MSB register).
    pub fn whole_degrees(&self) -> i8 {
        (self.quarters >> 2).clamp(i16::from(i8::MIN), i16::from(i8::MAX)) as i8
    }

    /// `true` when the reading lies within the chip's operating range.
    pub fn is_in_operating_range(&self) -> bool {
        let celsius = self.celsius();
        (MIN_OPERATING_CELSIUS..=MAX_OPERATING_CELSIUS).contains(&celsius)
    }
}

// ---------------------------------------------------------------------------
// chrono interop
// ---------------------------------------------------------------------------

#[cfg(feature = "chrono")]
mod chrono_interop {
    use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

    use super::{TimeField, TimePoint, MAX_YEAR_OFFSET};
    use crate::registers::BASE_YEAR;

    impl TimePoint {
        /// Convert from a chrono date-time, deriving the weekday from the date.
        ///
        /// # Errors
        /// [`TimeField::Year`] if the year lies outside 2000–2199.
        pub fn from_naive(datetime: &NaiveDateTime) -> Result<Self, TimeField> {
            let offset = datetime.year() - i32::from(BASE_YEAR);
            if !(0..=i32::from(MAX_YEAR_OFFSET)).contains(&offset) {
                return Err(TimeField::Year);
            }
            Self::new(
                offset as u8,
                datetime.month() as u8,
                datetime.day() as u8,
                datetime.weekday().number_from_sunday() as u8,
                datetime.hour() as u8,
                datetime.minute() as u8,
                datetime.second() as u8,
            )
        }

        /// Convert to a chrono date-time. The stored weekday is ignored.
        ///
        /// Returns `None` if the fields do not form a valid date.
        pub fn to_naive(&self) -> Option<NaiveDateTime> {
            NaiveDate::from_ymd_opt(
                i32::from(self.full_year()),
                u32::from(self.month),
                u32::from(self.day),
            )?
            .and_hms_opt(
                u32::from(self.hour),
                u32::from(self.minute),
                u32::from(self.second),
            )
        }
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────
