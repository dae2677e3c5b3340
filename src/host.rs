//! Interfaces the driver expects from the surrounding firmware.

use crate::time::TimePoint;

/// The host's authoritative wall clock.
///
/// [`RtcAction::WriteTime`](crate::RtcAction::WriteTime) reads it to set
/// the chip; [`RtcAction::ReadTime`](crate::RtcAction::ReadTime) sets it
/// from the chip.
pub trait HostClock {
    /// Current host time, or `None` if the host has not acquired a valid
    /// time yet.
    fn now(&self) -> Option<TimePoint>;

    /// Whether the host takes its time from external sources such as this
    /// RTC.
    fn accepts_external_time(&self) -> bool {
        true
    }

    /// Replace the host time.
    fn set(&mut self, time: TimePoint);
}

/// Consumer of numeric temperature observations.
///
/// Values are degrees Celsius; the chip resolution is 0.25 °C so two
/// decimals are always exact.
pub trait TemperatureSink {
    /// Stable identifier of this metric.
    fn id(&self) -> &str;

    fn publish(&mut self, celsius: f32);
}
