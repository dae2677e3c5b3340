//! Periodic temperature sampling.
//!
//! [`Sampler`] borrows the shared driver and, on every tick of its
//! interval, reads the die temperature and hands it to a
//! [`TemperatureSink`]. It never writes the time; synchronisation is only
//! done through [`RtcAction`](crate::RtcAction).

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{Duration, Ticker};
use embedded_hal_async::i2c::I2c;

use crate::config::Config;
use crate::host::TemperatureSink;
use crate::rtc::Ds3231;
use crate::time::TemperatureReading;

/// What a single [`Sampler::tick()`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickOutcome {
    /// No sink configured; nothing was read.
    Idle,
    /// The reading was published.
    Published(TemperatureReading),
    /// The reading was outside the chip's operating range and was dropped.
    OutOfRange(TemperatureReading),
    /// The driver reported an error; the tick was skipped.
    Failed,
}

/// Periodic sampler bound to a shared driver.
pub struct Sampler<'d, M, I2C, S>
where
    M: RawMutex,
{
    rtc: &'d Mutex<M, Ds3231<I2C>>,
    sink: Option<S>,
    interval: Duration,
}

impl<'d, M, I2C, S> Sampler<'d, M, I2C, S>
where
    M: RawMutex,
    I2C: I2c,
    S: TemperatureSink,
{
    /// Create a sampler. Passing `None` for `sink` leaves the sampler idle.
    pub fn new(rtc: &'d Mutex<M, Ds3231<I2C>>, sink: Option<S>, interval: Duration) -> Self {
        Self {
            rtc,
            sink,
            interval,
        }
    }

    /// Create a sampler from `config`.
    ///
    /// The sink is dropped unless [`Config::temperature`] is set.
    pub fn from_config(rtc: &'d Mutex<M, Ds3231<I2C>>, sink: S, config: &Config) -> Self {
        Self::new(
            rtc,
            config.temperature.then_some(sink),
            config.update_interval,
        )
    }

    pub fn sink(&self) -> Option<&S> {
        self.sink.as_ref()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run one sampling cycle.
    ///
    /// Errors are logged and reported through the returned
    /// [`TickOutcome`]; they never propagate.
    pub async fn tick(&mut self) -> TickOutcome {
        let Some(sink) = self.sink.as_mut() else {
            return TickOutcome::Idle;
        };

        // The driver lock also serialises bus access, so it is held for the
        // duration of the read.
        let result = self.rtc.lock().await.read_temperature().await;

        match result {
            Ok(reading) if reading.is_in_operating_range() => {
                sink.publish(reading.celsius());
                #[cfg(feature = "defmt")]
                defmt::trace!("{=str}: {=f32} C", sink.id(), reading.celsius());
                TickOutcome::Published(reading)
            }
            Ok(reading) => {
                #[cfg(feature = "defmt")]
                defmt::warn!(
                    "{=str}: reading out of range: {=f32} C",
                    sink.id(),
                    reading.celsius()
                );
                TickOutcome::OutOfRange(reading)
            }
            Err(_e) => {
                #[cfg(feature = "defmt")]
                {
                    if _e.is_bus() {
                        defmt::error!("{=str}: failed to read DS3231 temperature: bus error", sink.id());
                    } else {
                        defmt::error!("{=str}: failed to read DS3231 temperature", sink.id());
                    }
                }
                TickOutcome::Failed
            }
        }
    }

    /// Periodic sampling loop.
    ///
    /// This is a regular `async fn`, **not** an Embassy `#[task]`. Callers
    /// should wrap it in a thin, concrete task since Embassy tasks cannot
    /// be generic:
    ///
    /// ```ignore
    /// #[embassy_executor::task]
    /// async fn rtc_sampler_task(
    ///     sampler: Sampler<'static, CriticalSectionRawMutex, MyI2c, MySink>,
    /// ) {
    ///     sampler.run().await
    /// }
    /// ```
    ///
    /// A failed tick is logged and the loop continues with the next one.
    pub async fn run(mut self) -> ! {
        let mut ticker = Ticker::every(self.interval);
        loop {
            ticker.next().await;
            self.tick().await;
        }
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::{DEFAULT_ADDRESS, REG_STATUS, REG_TEMPERATURE_MSB};
    use crate::testing::{block_on, RecordingSink};
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use embedded_hal_async::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTrans};

    const INTERVAL: Duration = Duration::from_secs(60);

    fn temperature_read(msb: u8, lsb: u8) -> I2cTrans {
        I2cTrans::write_read(DEFAULT_ADDRESS, vec![REG_TEMPERATURE_MSB], vec![msb, lsb])
    }

    fn shared_rtc(rest: &[I2cTrans]) -> Mutex<NoopRawMutex, Ds3231<I2cMock>> {
        let mut expectations = vec![I2cTrans::write_read(
            DEFAULT_ADDRESS,
            vec![REG_STATUS],
            vec![0x08],
        )];
        expectations.extend_from_slice(rest);
        let mut rtc = Ds3231::new(I2cMock::new(&expectations), DEFAULT_ADDRESS);
        block_on(rtc.initialize()).unwrap();
        Mutex::new(rtc)
    }

    #[test]
    fn tick_publishes_temperature() {
        let rtc = shared_rtc(&[temperature_read(0x19, 0x40)]);
        let mut sampler = Sampler::new(&rtc, Some(RecordingSink::default()), INTERVAL);

        let outcome = block_on(sampler.tick());
        assert_eq!(
            outcome,
            TickOutcome::Published(TemperatureReading::from_quarters(101))
        );
        assert_eq!(sampler.sink().unwrap().published, vec![25.25]);
        assert_eq!(sampler.sink().unwrap().id(), "ds3231_temperature");

        drop(sampler);
        rtc.into_inner().release().done();
    }

    #[test]
    fn tick_without_sink_generates_no_traffic() {
        let rtc = shared_rtc(&[]);
        let mut sampler = Sampler::<_, _, RecordingSink>::new(&rtc, None, INTERVAL);

        assert_eq!(block_on(sampler.tick()), TickOutcome::Idle);

        drop(sampler);
        rtc.into_inner().release().done();
    }

    #[test]
    fn from_config_drops_sink_when_temperature_disabled() {
        let rtc = shared_rtc(&[]);
        let config = Config::default();
        let mut sampler = Sampler::from_config(&rtc, RecordingSink::default(), &config);

        assert!(sampler.sink().is_none());
        assert_eq!(sampler.interval(), config.update_interval);
        assert_eq!(block_on(sampler.tick()), TickOutcome::Idle);

        drop(sampler);
        rtc.into_inner().release().done();
    }

    #[test]
    fn out_of_range_reading_is_not_published() {
        // 0x7F = +127 °C, beyond the +85 °C limit.
        let rtc = shared_rtc(&[temperature_read(0x7F, 0x00)]);
        let config = Config {
            temperature: true,
            ..Config::default()
        };
        let mut sampler = Sampler::from_config(&rtc, RecordingSink::default(), &config);

        assert!(matches!(block_on(sampler.tick()), TickOutcome::OutOfRange(_)));
        assert!(sampler.sink().unwrap().published.is_empty());

        drop(sampler);
        rtc.into_inner().release().done();
    }

    #[test]
    fn failed_tick_does_not_stop_sampling() {
        let rtc = shared_rtc(&[
            temperature_read(0, 0).with_error(ErrorKind::Other),
            temperature_read(0xFF, 0xC0),
        ]);
        let mut sampler = Sampler::new(&rtc, Some(RecordingSink::default()), INTERVAL);

        assert_eq!(block_on(sampler.tick()), TickOutcome::Failed);
        assert!(matches!(block_on(sampler.tick()), TickOutcome::Published(_)));
        assert_eq!(sampler.sink().unwrap().published, vec![-0.25]);

        drop(sampler);
        rtc.into_inner().release().done();
    }
}
