//! Driver configuration.

use embassy_time::Duration;

use crate::registers::DEFAULT_ADDRESS;

/// Configuration for the driver and the periodic sampler.
///
/// [`Config::default()`] gives the stock setup: address 0x68, a 60 s
/// sampling interval and no temperature metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// 7-bit I2C device address. Default: 0x68.
    pub address: u8,
    /// Upper bound for a single bus transaction. Default: 25 ms.
    pub bus_timeout: Duration,
    /// Sampler period. Default: 60 s.
    pub update_interval: Duration,
    /// Publish the die temperature on every sampler tick. Default: off.
    pub temperature: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            bus_timeout: Duration::from_millis(25),
            update_interval: Duration::from_secs(60),
            temperature: false,
        }
    }
}

impl Config {
    /// Sampler period in milliseconds.
    pub fn update_interval_ms(&self) -> u64 {
        self.update_interval.as_millis()
    }
}
