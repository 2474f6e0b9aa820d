/*
   Copyright 2018 Ilya Epifanov

   Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
   http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
   http://opensource.org/licenses/MIT>, at your option. This file may not be
   copied, modified, or distributed except according to those terms.
*/
//! Register protocol bringing the codec from power-on to audio-ready.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{I2c, SevenBitAddress, TenBitAddress};
use tracing::{debug, info, trace, warn};

use crate::config::{BringUpConfig, BringUpPlan, CodecMode, DeviceAddress};
use crate::pll::ClockPlan;
use crate::rate::SampleRateClass;
use crate::registers::{
    Register, RegisterWrite, SerialPortBits, CONFIG_TABLE, CORE_OFF, CORE_ON,
};
use crate::Error;

/// Time the PLL needs to lock after being programmed.
pub const PLL_LOCK_TIME_MS: u32 = 10;
/// Time the codec needs to latch a register after each bus transaction.
pub const REGISTER_SETTLE_TIME_MS: u32 = 2;

/// Source of bus handles, e.g. Linux `/dev/i2c-*` character devices.
///
/// Exclusive access to the device across processes is up to the implementation.
pub trait Transport {
    type Bus: I2c<SevenBitAddress> + I2c<TenBitAddress>;
    type Error: core::fmt::Debug;

    fn open(&mut self, bus_name: &str) -> Result<Self::Bus, Self::Error>;
    fn close(&mut self, bus: Self::Bus);
}

/// Progress of one bring-up. Each state names the last step that completed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum BringUpState {
    #[default]
    Idle,
    Connected,
    CoreOff,
    PllProgrammed,
    PllLockWait,
    CoreOn,
    ModeSelected,
    ConfigTableApplied,
    SampleRateDividerSet,
    Done,
}

/// An open session with one codec.
pub struct CodecHandle<I2C, D> {
    i2c: I2C,
    delay: D,
    address: DeviceAddress,
    state: BringUpState,
    failure: Option<(Error, BringUpState)>,
}

pub trait Adau1761 {
    /// Writes one register. Once any write has failed every further write
    /// returns that failure without touching the bus.
    fn apply(&mut self, write: RegisterWrite) -> Result<(), Error>;

    fn power_down_core(&mut self) -> Result<(), Error>;
    fn program_pll(&mut self, plan: &ClockPlan) -> Result<(), Error>;
    /// Waits out the PLL lock time. A failed handle returns its failure
    /// without waiting.
    fn wait_pll_lock(&mut self) -> Result<(), Error>;
    fn power_up_core(&mut self) -> Result<(), Error>;
    fn select_mode(&mut self, mode: CodecMode) -> Result<(), Error>;
    fn apply_config_table(&mut self) -> Result<(), Error>;
    fn set_sample_rate_divider(&mut self, divider: SampleRateClass) -> Result<(), Error>;

    /// Runs every step in order, stopping at the first failure.
    fn run(&mut self, plan: &BringUpPlan) -> Result<(), Error>;
}

fn bus_error<E: embedded_hal::i2c::Error>(address: DeviceAddress, reg: u16, e: E) -> Error {
    warn!(
        device = address.raw(),
        register = reg,
        kind = ?e.kind(),
        "error writing codec register"
    );
    Error::BusWriteFailed(reg)
}

impl<I2C, D> CodecHandle<I2C, D>
where
    I2C: I2c<SevenBitAddress> + I2c<TenBitAddress>,
    D: DelayNs,
{
    /// Wraps a freshly opened bus.
    pub fn new(i2c: I2C, delay: D, address: DeviceAddress) -> Self {
        CodecHandle {
            i2c,
            delay,
            address,
            state: BringUpState::Connected,
            failure: None,
        }
    }

    pub fn state(&self) -> BringUpState {
        self.state
    }

    /// The first failure and the state reached before it, if any.
    pub fn failure(&self) -> Option<(Error, BringUpState)> {
        self.failure
    }

    /// Ends the session, handing back the bus and the delay.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    fn advance(&mut self, next: BringUpState) {
        debug!(from = ?self.state, to = ?next, "codec state");
        self.state = next;
    }

    fn check_failed(&self) -> Result<(), Error> {
        match self.failure {
            Some((error, _)) => Err(error),
            None => Ok(()),
        }
    }

    /// Sends `payload`, which starts with the big-endian address of `reg`.
    fn write_payload(&mut self, reg: u16, payload: &[u8]) -> Result<(), Error> {
        self.check_failed()?;

        trace!(register = reg, len = payload.len(), "write");
        let result = match self.address {
            DeviceAddress::SevenBit(address) => {
                I2c::<SevenBitAddress>::write(&mut self.i2c, address, payload)
            }
            DeviceAddress::TenBit(address) => {
                I2c::<TenBitAddress>::write(&mut self.i2c, address, payload)
            }
        };
        self.delay.delay_ms(REGISTER_SETTLE_TIME_MS);

        result.map_err(|e| {
            let error = bus_error(self.address, reg, e);
            self.failure = Some((error, self.state));
            error
        })
    }

    fn run_steps(&mut self, plan: &BringUpPlan) -> Result<(), Error> {
        self.power_down_core()?;
        self.program_pll(&plan.clock_plan)?;
        self.wait_pll_lock()?;
        self.power_up_core()?;
        self.select_mode(plan.mode)?;
        self.apply_config_table()?;
        self.set_sample_rate_divider(plan.divider)?;
        self.advance(BringUpState::Done);
        Ok(())
    }
}

impl<I2C, D> Adau1761 for CodecHandle<I2C, D>
where
    I2C: I2c<SevenBitAddress> + I2c<TenBitAddress>,
    D: DelayNs,
{
    fn apply(&mut self, write: RegisterWrite) -> Result<(), Error> {
        let [reg_hi, reg_lo] = write.address.to_be_bytes();
        self.write_payload(write.address, &[reg_hi, reg_lo, write.value])
    }

    fn power_down_core(&mut self) -> Result<(), Error> {
        self.apply(RegisterWrite::new(Register::ClockControl, CORE_OFF.bits()))?;
        self.advance(BringUpState::CoreOff);
        Ok(())
    }

    fn program_pll(&mut self, plan: &ClockPlan) -> Result<(), Error> {
        let reg = Register::PllControl.addr();
        let [reg_hi, reg_lo] = reg.to_be_bytes();
        let [m_hi, m_lo, n_hi, n_lo, control, enable] = plan.to_bytes();
        self.write_payload(reg, &[reg_hi, reg_lo, m_hi, m_lo, n_hi, n_lo, control, enable])?;
        self.advance(BringUpState::PllProgrammed);
        Ok(())
    }

    fn wait_pll_lock(&mut self) -> Result<(), Error> {
        self.check_failed()?;
        self.delay.delay_ms(PLL_LOCK_TIME_MS);
        self.advance(BringUpState::PllLockWait);
        Ok(())
    }

    fn power_up_core(&mut self) -> Result<(), Error> {
        self.apply(RegisterWrite::new(Register::ClockControl, CORE_ON.bits()))?;
        self.advance(BringUpState::CoreOn);
        Ok(())
    }

    fn select_mode(&mut self, mode: CodecMode) -> Result<(), Error> {
        let bits = match mode {
            CodecMode::Master => SerialPortBits::MASTER,
            CodecMode::Slave => SerialPortBits::empty(),
        };
        self.apply(RegisterWrite::new(Register::SerialPort0, bits.bits()))?;
        self.advance(BringUpState::ModeSelected);
        Ok(())
    }

    fn apply_config_table(&mut self) -> Result<(), Error> {
        for &write in CONFIG_TABLE.iter() {
            self.apply(write)?;
        }
        self.advance(BringUpState::ConfigTableApplied);
        Ok(())
    }

    fn set_sample_rate_divider(&mut self, divider: SampleRateClass) -> Result<(), Error> {
        let code = divider.converter_code();
        self.apply(RegisterWrite::new(Register::ConverterControl0, code))?;
        self.apply(RegisterWrite::new(Register::SerialPortSamplingRate, code))?;
        self.apply(RegisterWrite::new(Register::DspSamplingRate, divider.dsp_code()))?;
        self.advance(BringUpState::SampleRateDividerSet);
        Ok(())
    }

    fn run(&mut self, plan: &BringUpPlan) -> Result<(), Error> {
        self.run_steps(plan).map_err(|e| {
            warn!(state = ?self.state, error = %e, "codec bring-up aborted");
            e
        })
    }
}

/// Brings the codec described by `config` to an audio-ready state.
///
/// The configuration is validated and the PLL solved before the bus is
/// opened. Once opened, the bus is always handed back to
/// [`Transport::close`], whether bring-up succeeds or not.
pub fn bring_up<T, D>(
    transport: &mut T,
    delay: D,
    config: &BringUpConfig<'_>,
) -> Result<(), Error>
where
    T: Transport,
    D: DelayNs,
{
    let plan = config.prepare().map_err(|e| {
        warn!(
            sample_rate = config.sample_rate_hz,
            input_clock = config.input_clock_hz,
            error = %e,
            "invalid codec configuration"
        );
        e
    })?;
    debug!(plan = ?plan, "codec plan");

    let i2c = match transport.open(config.bus_name) {
        Ok(i2c) => i2c,
        Err(e) => {
            warn!(bus = config.bus_name, error = ?e, "unable to open bus");
            return Err(Error::DeviceUnavailable);
        }
    };
    info!(bus = config.bus_name, "bus opened");

    let mut codec = CodecHandle::new(i2c, delay, plan.address);
    let result = codec.run(&plan);
    let (i2c, _) = codec.release();
    transport.close(i2c);
    info!(bus = config.bus_name, "bus closed");

    if result.is_ok() {
        info!(sample_rate = config.sample_rate_hz, "codec initialized");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};

    #[derive(Debug)]
    struct MockError;

    impl embedded_hal::i2c::Error for MockError {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    #[derive(Default)]
    struct MockI2c {
        writes: std::vec::Vec<(u16, std::vec::Vec<u8>)>,
        fail: bool,
    }

    impl MockI2c {
        fn record(
            &mut self,
            address: u16,
            operations: &mut [Operation<'_>],
        ) -> Result<(), MockError> {
            for op in operations.iter() {
                if let Operation::Write(data) = op {
                    self.writes.push((address, data.to_vec()));
                }
            }
            if self.fail {
                Err(MockError)
            } else {
                Ok(())
            }
        }
    }

    impl ErrorType for MockI2c {
        type Error = MockError;
    }

    impl I2c<SevenBitAddress> for MockI2c {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            self.record(address.into(), operations)
        }
    }

    impl I2c<TenBitAddress> for MockI2c {
        fn transaction(
            &mut self,
            address: u16,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            self.record(address, operations)
        }
    }

    #[derive(Default)]
    struct MockDelay {
        ms: std::vec::Vec<u32>,
    }

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, _ns: u32) {}

        fn delay_ms(&mut self, ms: u32) {
            self.ms.push(ms);
        }
    }

    #[test]
    fn register_payload_is_big_endian() {
        let mut codec = CodecHandle::new(
            MockI2c::default(),
            MockDelay::default(),
            DeviceAddress::SevenBit(0x3b),
        );
        codec.power_down_core().unwrap();
        let (i2c, delay) = codec.release();
        assert_eq!(i2c.writes, [(0x3b, std::vec![0x40, 0x00, 0x0e])]);
        assert_eq!(delay.ms, [REGISTER_SETTLE_TIME_MS]);
    }

    #[test]
    fn pll_goes_out_in_one_transaction() {
        let mut codec = CodecHandle::new(
            MockI2c::default(),
            MockDelay::default(),
            DeviceAddress::SevenBit(0x3b),
        );
        let plan = crate::pll::solve(12_000_000, 49_152_000).unwrap();
        codec.program_pll(&plan).unwrap();
        assert_eq!(codec.state(), BringUpState::PllProgrammed);
        let (i2c, _) = codec.release();
        assert_eq!(
            i2c.writes,
            [(0x3b, std::vec![0x40, 0x02, 0x00, 0x7d, 0x00, 0x0c, 0x21, 0x01])]
        );
    }

    #[test]
    fn ten_bit_address_is_used_when_configured() {
        let mut codec = CodecHandle::new(
            MockI2c::default(),
            MockDelay::default(),
            DeviceAddress::TenBit(0x23b),
        );
        codec.select_mode(CodecMode::Slave).unwrap();
        let (i2c, _) = codec.release();
        assert_eq!(i2c.writes, [(0x23b, std::vec![0x40, 0x15, 0x00])]);
    }

    #[test]
    fn settle_delay_follows_failed_write() {
        let i2c = MockI2c {
            fail: true,
            ..Default::default()
        };
        let mut codec =
            CodecHandle::new(i2c, MockDelay::default(), DeviceAddress::SevenBit(0x3b));
        assert_eq!(codec.power_down_core(), Err(Error::BusWriteFailed(0x4000)));
        assert_eq!(codec.state(), BringUpState::Connected);
        assert_eq!(
            codec.failure(),
            Some((Error::BusWriteFailed(0x4000), BringUpState::Connected))
        );
        let (_, delay) = codec.release();
        assert_eq!(delay.ms, [REGISTER_SETTLE_TIME_MS]);
    }

    #[test]
    fn failed_handle_stays_failed() {
        let i2c = MockI2c {
            fail: true,
            ..Default::default()
        };
        let mut codec =
            CodecHandle::new(i2c, MockDelay::default(), DeviceAddress::SevenBit(0x3b));
        assert!(codec.power_down_core().is_err());
        assert_eq!(codec.power_up_core(), Err(Error::BusWriteFailed(0x4000)));
        let (i2c, _) = codec.release();
        assert_eq!(i2c.writes.len(), 1);
    }

    #[test]
    fn lock_wait_is_skipped_after_failure() {
        let i2c = MockI2c {
            fail: true,
            ..Default::default()
        };
        let mut codec =
            CodecHandle::new(i2c, MockDelay::default(), DeviceAddress::SevenBit(0x3b));
        assert!(codec.power_down_core().is_err());
        assert_eq!(codec.wait_pll_lock(), Err(Error::BusWriteFailed(0x4000)));
        assert_eq!(codec.state(), BringUpState::Connected);
        assert_eq!(codec.failure().map(|(_, state)| state), Some(codec.state()));
        let (_, delay) = codec.release();
        assert_eq!(delay.ms, [REGISTER_SETTLE_TIME_MS]);
    }

    #[test]
    fn lock_wait_advances_healthy_handle() {
        let mut codec = CodecHandle::new(
            MockI2c::default(),
            MockDelay::default(),
            DeviceAddress::SevenBit(0x3b),
        );
        codec.wait_pll_lock().unwrap();
        assert_eq!(codec.state(), BringUpState::PllLockWait);
        let (_, delay) = codec.release();
        assert_eq!(delay.ms, [PLL_LOCK_TIME_MS]);
    }
}
