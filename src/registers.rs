//! DS3231 register map and bit definitions.
//!
//! The chip exposes 19 byte-wide registers (0x00–0x12) and auto-increments
//! its register pointer after every byte, so contiguous blocks such as the
//! seven time registers can be moved in a single transaction.

use bitflags::bitflags;

// ---------------------------------------------------------------------------
// Timekeeping registers
// ---------------------------------------------------------------------------

/// Seconds, BCD 00–59. Start of the 7-byte time block.
pub const REG_SECONDS: u8 = 0x00;

/// Minutes, BCD 00–59.
pub const REG_MINUTES: u8 = 0x01;

/// Hours, BCD with the 12/24-hour mode select in bit 6.
pub const REG_HOURS: u8 = 0x02;

/// Day of week, 1–7.
pub const REG_DAY: u8 = 0x03;

/// Day of month, BCD 01–31.
pub const REG_DATE: u8 = 0x04;

/// Month, BCD 01–12, with the century bit in bit 7.
pub const REG_MONTH: u8 = 0x05;

/// Year within the century, BCD 00–99.
pub const REG_YEAR: u8 = 0x06;

// Alarm registers 0x07–0x0D are not driven by this crate.

// ---------------------------------------------------------------------------
// Control, status and temperature
// ---------------------------------------------------------------------------

/// Control register ([`ControlRegister`]).
pub const REG_CONTROL: u8 = 0x0E;

/// Control/status register ([`StatusRegister`]).
pub const REG_STATUS: u8 = 0x0F;

/// Aging offset, signed two's complement trim of the crystal capacitance.
pub const REG_AGING_OFFSET: u8 = 0x10;

/// Temperature MSB (signed whole degrees). Start of the 2-byte block.
pub const REG_TEMPERATURE_MSB: u8 = 0x11;

/// Temperature LSB, quarter degrees in bits 7:6.
pub const REG_TEMPERATURE_LSB: u8 = 0x12;

/// Highest addressable register.
pub const LAST_REGISTER: u8 = 0x12;

/// Number of bytes in the time block (0x00–0x06).
pub const TIME_BLOCK_LEN: usize = 7;

/// Number of bytes in the temperature block (0x11–0x12).
pub const TEMPERATURE_BLOCK_LEN: usize = 2;

// ---------------------------------------------------------------------------
// Field masks
// ---------------------------------------------------------------------------

/// Hours register: set for 12-hour mode, clear for 24-hour mode.
pub const HOURS_12H_MODE: u8 = 0x40;

/// Hours register in 12-hour mode: PM indicator.
pub const HOURS_PM: u8 = 0x20;

/// Month register: century rollover bit.
pub const MONTH_CENTURY: u8 = 0x80;

// ---------------------------------------------------------------------------
// Device constants
// ---------------------------------------------------------------------------

/// Default 7-bit I2C address of the DS3231.
pub const DEFAULT_ADDRESS: u8 = 0x68;

/// Calendar year that `TimePoint::year == 0` refers to.
pub const BASE_YEAR: u16 = 2000;

bitflags! {
    /// Control register (0x0E).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ControlRegister: u8 {
        /// Enable oscillator (active low). When set the oscillator stops
        /// once the chip switches to battery power.
        const EOSC = 1 << 7;
        /// Battery-backed square wave enable.
        const BBSQW = 1 << 6;
        /// Force a temperature conversion.
        const CONV = 1 << 5;
        /// Rate select, high bit.
        const RS2 = 1 << 4;
        /// Rate select, low bit.
        const RS1 = 1 << 3;
        /// Interrupt control: INT/SQW pin drives alarms instead of the square wave.
        const INTCN = 1 << 2;
        /// Alarm 2 interrupt enable.
        const A2IE = 1 << 1;
        /// Alarm 1 interrupt enable.
        const A1IE = 1 << 0;
    }

    /// Control/status register (0x0F).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StatusRegister: u8 {
        /// Oscillator stop flag. Set when the oscillator halted at some point;
        /// the retained time may be invalid.
        const OSF = 1 << 7;
        /// 32 kHz output enable.
        const EN32KHZ = 1 << 3;
        /// Temperature conversion in progress.
        const BSY = 1 << 2;
        /// Alarm 2 matched.
        const A2F = 1 << 1;
        /// Alarm 1 matched.
        const A1F = 1 << 0;
    }
}

/// Square-wave output frequency selected by RS2:RS1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SquareWaveRate {
    Hz1,
    Hz1024,
    Hz4096,
    Hz8192,
}

impl ControlRegister {
    /// Power-on reset value: oscillator running, 8.192 kHz, interrupt mode.
    pub const POWER_ON: Self = Self::RS2.union(Self::RS1).union(Self::INTCN);

    /// `true` when the oscillator keeps running on battery power.
    pub fn oscillator_enabled(self) -> bool {
        !self.contains(Self::EOSC)
    }

    /// Currently selected square-wave rate.
    pub fn square_wave_rate(self) -> SquareWaveRate {
        match (self.contains(Self::RS2), self.contains(Self::RS1)) {
            (false, false) => SquareWaveRate::Hz1,
            (false, true) => SquareWaveRate::Hz1024,
            (true, false) => SquareWaveRate::Hz4096,
            (true, true) => SquareWaveRate::Hz8192,
        }
    }

    /// Copy of `self` with RS2:RS1 replaced by `rate`.
    pub fn with_square_wave_rate(self, rate: SquareWaveRate) -> Self {
        let bits = match rate {
            SquareWaveRate::Hz1 => Self::empty(),
            SquareWaveRate::Hz1024 => Self::RS1,
            SquareWaveRate::Hz4096 => Self::RS2,
            SquareWaveRate::Hz8192 => Self::RS2 | Self::RS1,
        };
        self.difference(Self::RS2 | Self::RS1).union(bits)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ControlRegister {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "ControlRegister({=u8:#x})", self.bits())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for StatusRegister {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "StatusRegister({=u8:#x})", self.bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_on_control_matches_datasheet() {
        assert_eq!(ControlRegister::POWER_ON.bits(), 0x1C);
        assert!(ControlRegister::POWER_ON.oscillator_enabled());
        assert_eq!(
            ControlRegister::POWER_ON.square_wave_rate(),
            SquareWaveRate::Hz8192
        );
    }

    #[test]
    fn with_square_wave_rate_preserves_other_bits() {
        let control = ControlRegister::BBSQW | ControlRegister::A1IE | ControlRegister::RS2;
        let updated = control.with_square_wave_rate(SquareWaveRate::Hz1024);

        assert_eq!(updated.square_wave_rate(), SquareWaveRate::Hz1024);
        assert!(updated.contains(ControlRegister::BBSQW));
        assert!(updated.contains(ControlRegister::A1IE));
        assert!(!updated.contains(ControlRegister::RS2));
    }

    #[test]
    fn eosc_disables_oscillator() {
        assert!(!ControlRegister::EOSC.oscillator_enabled());
    }

    #[test]
    fn status_bits_decode_from_raw() {
        let status = StatusRegister::from_bits_retain(0x8C);
        assert!(status.contains(StatusRegister::OSF));
        assert!(status.contains(StatusRegister::EN32KHZ));
        assert!(status.contains(StatusRegister::BSY));
        assert!(!status.contains(StatusRegister::A1F));
    }
}
