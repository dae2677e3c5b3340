//! Async driver for the DS3231 battery-backed real-time clock.
//!
//! The crate is layered bottom-up:
//!
//! - a crate-private bus transport that moves register blocks over any
//!   [`embedded-hal-async`](embedded_hal_async) I2C implementation, with a
//!   per-transaction timeout
//! - [`codec`], pure conversions between [`TimePoint`] and the chip's BCD
//!   register layout, and between the temperature registers and
//!   [`TemperatureReading`]
//! - [`Ds3231`], the clock driver that validates fields, tracks whether
//!   the chip's time can be trusted, and keeps a small health state
//! - [`Sampler`], a periodic loop that publishes the die temperature to a
//!   [`TemperatureSink`]
//! - [`BoundAction`], one-shot time synchronisation between the chip and a
//!   [`HostClock`]
//!
//! The sampler and actions share the driver through an
//! [`embassy_sync::mutex::Mutex`], which also serialises bus access.
//!
//! # Quick Start
//!
//! ```ignore
//! use ds3231_rtc::{Config, Ds3231, RtcAction, Sampler};
//!
//! static RTC: StaticCell<Mutex<CriticalSectionRawMutex, Ds3231<MyI2c>>> = StaticCell::new();
//!
//! // In your Embassy main:
//! let config = Config { temperature: true, ..Config::default() };
//! let mut rtc = Ds3231::from_config(i2c, &config);
//! rtc.initialize().await?;
//! let rtc = RTC.init(Mutex::new(rtc));
//!
//! spawner.spawn(rtc_sampler_task(Sampler::from_config(rtc, sink, &config))).unwrap();
//!
//! // On boot, copy the battery-backed time into the system clock:
//! RtcAction::ReadTime.bind(rtc).play(&mut system_clock).await;
//! ```
//!
//! # Crate Features
//!
//! - **`defmt`**: structured logging via [`defmt`](https://docs.rs/defmt).
//! - **`chrono`**: conversions between [`TimePoint`] and
//!   `chrono::NaiveDateTime`.

#![cfg_attr(not(test), no_std)]

pub mod action;
pub mod codec;
pub mod config;
mod driver;
pub mod error;
pub mod host;
pub mod registers;
pub mod rtc;
pub mod sampler;
#[cfg(test)]
mod testing;
pub mod time;

// ── Re-exports for convenience ───────────────────────────────────────────

pub use action::{ActionOutcome, BoundAction, RtcAction, SkipReason};
pub use config::Config;
pub use error::{BusError, CodecError, DriverError};
pub use host::{HostClock, TemperatureSink};
pub use registers::{ControlRegister, SquareWaveRate, StatusRegister, BASE_YEAR, DEFAULT_ADDRESS};
pub use rtc::{DriverState, Ds3231, TimeReading};
pub use sampler::{Sampler, TickOutcome};
pub use time::{days_in_month, is_leap_year, TemperatureReading, TimeField, TimePoint};
