//! Shared test doubles.

use core::future::Future;

use embedded_hal_async::i2c::{ErrorKind, ErrorType, I2c, Operation};

use crate::host::{HostClock, TemperatureSink};
use crate::time::TimePoint;

pub(crate) fn block_on<F: Future>(future: F) -> F::Output {
    embassy_futures::block_on(future)
}

/// A bus whose transactions never complete.
pub(crate) struct StalledBus;

impl ErrorType for StalledBus {
    type Error = ErrorKind;
}

impl I2c for StalledBus {
    async fn transaction(
        &mut self,
        _address: u8,
        _operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        core::future::pending().await
    }
}

/// Records every published value.
#[derive(Default)]
pub(crate) struct RecordingSink {
    pub published: Vec<f32>,
}

impl TemperatureSink for RecordingSink {
    fn id(&self) -> &str {
        "ds3231_temperature"
    }

    fn publish(&mut self, celsius: f32) {
        self.published.push(celsius);
    }
}

/// Host clock with a fixed `now()` that records every `set()`.
pub(crate) struct FakeHostClock {
    pub now: Option<TimePoint>,
    pub accepts_external: bool,
    pub set_calls: Vec<TimePoint>,
}

impl FakeHostClock {
    pub fn with_time(now: TimePoint) -> Self {
        Self {
            now: Some(now),
            accepts_external: true,
            set_calls: Vec::new(),
        }
    }

    pub fn without_time() -> Self {
        Self {
            now: None,
            accepts_external: true,
            set_calls: Vec::new(),
        }
    }
}

impl HostClock for FakeHostClock {
    fn now(&self) -> Option<TimePoint> {
        self.now
    }

    fn accepts_external_time(&self) -> bool {
        self.accepts_external
    }

    fn set(&mut self, time: TimePoint) {
        self.set_calls.push(time);
    }
}

pub(crate) fn sample_time() -> TimePoint {
    TimePoint {
        year: 24,
        month: 3,
        day: 15,
        weekday: 6,
        hour: 14,
        minute: 30,
        second: 0,
    }
}
