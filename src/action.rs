//! Externally triggered time synchronisation.
//!
//! The set of actions is fixed: copy the host time into the chip, or copy
//! the chip time into the host. A [`BoundAction`] ties one of them to a
//! specific shared driver; the borrow guarantees the action cannot outlive
//! the driver it targets.
//!
//! Actions are fire-and-forget. Failures are logged and reported as an
//! [`ActionOutcome`], never as an error.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;
use embedded_hal_async::i2c::I2c;

use crate::host::HostClock;
use crate::rtc::Ds3231;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RtcAction {
    /// Write the host's current time to the chip.
    WriteTime,
    /// Read the chip's time and set the host clock from it.
    ReadTime,
}

impl RtcAction {
    /// Bind this action to a driver instance.
    pub fn bind<'d, M, I2C>(self, rtc: &'d Mutex<M, Ds3231<I2C>>) -> BoundAction<'d, M, I2C>
    where
        M: RawMutex,
    {
        BoundAction { action: self, rtc }
    }
}

/// Why an action finished without changing anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SkipReason {
    /// The host has no valid time to write.
    HostTimeInvalid,
    /// The chip's oscillator stopped; its time is not copied to the host.
    StaleTime,
    /// The host does not take time from external sources.
    HostRejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActionOutcome {
    Applied,
    Skipped(SkipReason),
    /// The driver reported an error, which has been logged.
    Failed,
}

/// An [`RtcAction`] bound to a shared driver.
pub struct BoundAction<'d, M, I2C>
where
    M: RawMutex,
{
    action: RtcAction,
    rtc: &'d Mutex<M, Ds3231<I2C>>,
}

impl<'d, M, I2C> BoundAction<'d, M, I2C>
where
    M: RawMutex,
    I2C: I2c,
{
    pub fn new(action: RtcAction, rtc: &'d Mutex<M, Ds3231<I2C>>) -> Self {
        Self { action, rtc }
    }

    pub fn action(&self) -> RtcAction {
        self.action
    }

    /// Run the action against `host`.
    pub async fn play<H: HostClock>(&self, host: &mut H) -> ActionOutcome {
        match self.action {
            RtcAction::WriteTime => self.write_time(host).await,
            RtcAction::ReadTime => self.read_time(host).await,
        }
    }

    async fn write_time<H: HostClock>(&self, host: &mut H) -> ActionOutcome {
        let Some(now) = host.now() else {
            #[cfg(feature = "defmt")]
            defmt::error!("Invalid system time, not syncing to RTC");
            return ActionOutcome::Skipped(SkipReason::HostTimeInvalid);
        };

        match self.rtc.lock().await.write_time(&now).await {
            Ok(()) => ActionOutcome::Applied,
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::error!("Failed to write time to DS3231");
                ActionOutcome::Failed
            }
        }
    }

    async fn read_time<H: HostClock>(&self, host: &mut H) -> ActionOutcome {
        // Refresh the oscillator-stop flag first so a halt since the last
        // status read is not copied into the host.
        let result = {
            let mut rtc = self.rtc.lock().await;
            match rtc.status().await {
                Ok(_) => rtc.read_time().await,
                Err(e) => Err(e),
            }
        };

        let reading = match result {
            Ok(reading) => reading,
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::error!("Failed to read time from DS3231");
                return ActionOutcome::Failed;
            }
        };

        if reading.stale {
            #[cfg(feature = "defmt")]
            defmt::warn!("RTC oscillator stopped, not syncing to system clock");
            return ActionOutcome::Skipped(SkipReason::StaleTime);
        }

        if !host.accepts_external_time() {
            return ActionOutcome::Skipped(SkipReason::HostRejected);
        }

        host.set(reading.time);
        ActionOutcome::Applied
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::{DEFAULT_ADDRESS, REG_SECONDS, REG_STATUS};
    use crate::testing::{block_on, sample_time, FakeHostClock};
    use crate::time::TimePoint;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use embedded_hal_async::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTrans};

    const SAMPLE_REGISTERS: [u8; 7] = [0x00, 0x30, 0x14, 0x06, 0x15, 0x03, 0x24];

    fn status_read(value: u8) -> I2cTrans {
        I2cTrans::write_read(DEFAULT_ADDRESS, vec![REG_STATUS], vec![value])
    }

    fn synced_read(status: u8) -> [I2cTrans; 2] {
        [status_read(status), time_read()]
    }

    fn time_read() -> I2cTrans {
        I2cTrans::write_read(DEFAULT_ADDRESS, vec![REG_SECONDS], SAMPLE_REGISTERS.to_vec())
    }

    fn shared_rtc(status: u8, rest: &[I2cTrans]) -> Mutex<NoopRawMutex, Ds3231<I2cMock>> {
        let mut expectations = vec![status_read(status)];
        expectations.extend_from_slice(rest);
        let mut rtc = Ds3231::new(I2cMock::new(&expectations), DEFAULT_ADDRESS);
        block_on(rtc.initialize()).unwrap();
        Mutex::new(rtc)
    }

    // ── WriteTime ────────────────────────────────────────────────────

    #[test]
    fn write_action_copies_host_time_to_chip() {
        let mut write = vec![REG_SECONDS];
        write.extend_from_slice(&SAMPLE_REGISTERS);
        let rtc = shared_rtc(
            0x00,
            &[I2cTrans::write(DEFAULT_ADDRESS, write), status_read(0x00)],
        );
        let mut host = FakeHostClock::with_time(sample_time());

        let action = RtcAction::WriteTime.bind(&rtc);
        assert_eq!(block_on(action.play(&mut host)), ActionOutcome::Applied);
        assert!(host.set_calls.is_empty());

        let rtc = rtc.into_inner();
        assert_eq!(rtc.last_known_time(), Some(sample_time()));
        rtc.release().done();
    }

    #[test]
    fn write_action_skips_without_host_time() {
        let rtc = shared_rtc(0x00, &[]);
        let mut host = FakeHostClock::without_time();

        let action = BoundAction::new(RtcAction::WriteTime, &rtc);
        assert_eq!(
            block_on(action.play(&mut host)),
            ActionOutcome::Skipped(SkipReason::HostTimeInvalid)
        );

        rtc.into_inner().release().done();
    }

    #[test]
    fn write_action_swallows_invalid_host_time() {
        let rtc = shared_rtc(0x00, &[]);
        let mut host = FakeHostClock::with_time(TimePoint {
            month: 13,
            ..sample_time()
        });

        let action = RtcAction::WriteTime.bind(&rtc);
        assert_eq!(block_on(action.play(&mut host)), ActionOutcome::Failed);

        rtc.into_inner().release().done();
    }

    #[test]
    fn write_action_on_uninitialized_driver_fails_quietly() {
        let rtc: Mutex<NoopRawMutex, _> =
            Mutex::new(Ds3231::new(I2cMock::new(&[]), DEFAULT_ADDRESS));
        let mut host = FakeHostClock::with_time(sample_time());

        let action = RtcAction::WriteTime.bind(&rtc);
        assert_eq!(block_on(action.play(&mut host)), ActionOutcome::Failed);

        rtc.into_inner().release().done();
    }

    // ── ReadTime ─────────────────────────────────────────────────────

    #[test]
    fn read_action_sets_host_clock() {
        let rtc = shared_rtc(0x00, &synced_read(0x00));
        let mut host = FakeHostClock::without_time();

        let action = RtcAction::ReadTime.bind(&rtc);
        assert_eq!(action.action(), RtcAction::ReadTime);
        assert_eq!(block_on(action.play(&mut host)), ActionOutcome::Applied);
        assert_eq!(host.set_calls, vec![sample_time()]);

        rtc.into_inner().release().done();
    }

    #[test]
    fn read_action_refuses_stale_time() {
        let rtc = shared_rtc(0x80, &synced_read(0x80));
        let mut host = FakeHostClock::without_time();

        let action = RtcAction::ReadTime.bind(&rtc);
        assert_eq!(
            block_on(action.play(&mut host)),
            ActionOutcome::Skipped(SkipReason::StaleTime)
        );
        assert!(host.set_calls.is_empty());

        rtc.into_inner().release().done();
    }

    #[test]
    fn read_action_notices_oscillator_stop_after_initialize() {
        let rtc = shared_rtc(0x00, &synced_read(0x80));
        let mut host = FakeHostClock::without_time();

        let action = RtcAction::ReadTime.bind(&rtc);
        assert_eq!(
            block_on(action.play(&mut host)),
            ActionOutcome::Skipped(SkipReason::StaleTime)
        );
        assert!(host.set_calls.is_empty());

        let rtc = rtc.into_inner();
        assert!(rtc.is_stale());
        rtc.release().done();
    }

    #[test]
    fn read_action_respects_host_without_external_time() {
        let rtc = shared_rtc(0x00, &synced_read(0x00));
        let mut host = FakeHostClock::without_time();
        host.accepts_external = false;

        let action = RtcAction::ReadTime.bind(&rtc);
        assert_eq!(
            block_on(action.play(&mut host)),
            ActionOutcome::Skipped(SkipReason::HostRejected)
        );
        assert!(host.set_calls.is_empty());

        rtc.into_inner().release().done();
    }

    #[test]
    fn read_action_swallows_bus_errors() {
        let rtc = shared_rtc(0x00, &[status_read(0x00), time_read().with_error(ErrorKind::Other)]);
        let mut host = FakeHostClock::without_time();

        let action = RtcAction::ReadTime.bind(&rtc);
        assert_eq!(block_on(action.play(&mut host)), ActionOutcome::Failed);
        assert!(host.set_calls.is_empty());

        rtc.into_inner().release().done();
    }

    #[test]
    fn read_action_skips_time_read_when_status_fails() {
        let rtc = shared_rtc(0x00, &[status_read(0x00).with_error(ErrorKind::Other)]);
        let mut host = FakeHostClock::without_time();

        let action = RtcAction::ReadTime.bind(&rtc);
        assert_eq!(block_on(action.play(&mut host)), ActionOutcome::Failed);
        assert!(host.set_calls.is_empty());

        rtc.into_inner().release().done();
    }
}
