/*
   Copyright 2018 Ilya Epifanov

   Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
   http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
   http://opensource.org/licenses/MIT>, at your option. This file may not be
   copied, modified, or distributed except according to those terms.
*/
//! Bring-up parameters and their validation.

use crate::pll::{self, ClockPlan};
use crate::rate::{self, BaseRate, SampleRateClass};
use crate::Error;

/// Which side drives the serial port bit and frame clocks.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CodecMode {
    Slave,
    Master,
}

/// Bus address of the codec.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DeviceAddress {
    SevenBit(u8),
    TenBit(u16),
}

impl DeviceAddress {
    /// Addresses that fit in 7 bits use 7-bit addressing, anything up to
    /// 10 bits uses 10-bit addressing.
    pub fn new(address: u16) -> Result<DeviceAddress, Error> {
        match address {
            0..=0x7f => Ok(DeviceAddress::SevenBit(address as u8)),
            0x80..=0x3ff => Ok(DeviceAddress::TenBit(address)),
            _ => Err(Error::InvalidDeviceAddress(address)),
        }
    }

    pub fn raw(&self) -> u16 {
        match *self {
            DeviceAddress::SevenBit(address) => address.into(),
            DeviceAddress::TenBit(address) => address,
        }
    }
}

/// Default codec address with both ADDR pins pulled high.
pub const DEFAULT_DEVICE_ADDRESS: u16 = 0x3b;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BringUpConfig<'a> {
    /// Name the transport opens, e.g. `/dev/i2c-0`.
    pub bus_name: &'a str,
    pub device_address: u16,
    /// MCLK frequency feeding the PLL.
    pub input_clock_hz: u32,
    pub mode: CodecMode,
    pub sample_rate_hz: u32,
}

/// Everything bring-up needs, computed from a [`BringUpConfig`] without
/// touching the bus.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BringUpPlan {
    pub address: DeviceAddress,
    pub mode: CodecMode,
    pub clock_plan: ClockPlan,
    pub divider: SampleRateClass,
}

impl<'a> BringUpConfig<'a> {
    pub fn new(
        bus_name: &'a str,
        device_address: u16,
        input_clock_hz: u32,
        mode: CodecMode,
        sample_rate_hz: u32,
    ) -> Self {
        BringUpConfig {
            bus_name,
            device_address,
            input_clock_hz,
            mode,
            sample_rate_hz,
        }
    }

    /// ZedBoard wiring: first I2C controller, 12 MHz oscillator, codec as
    /// clock master.
    pub fn zedboard(sample_rate_hz: u32) -> Self {
        BringUpConfig::new(
            "/dev/i2c-0",
            DEFAULT_DEVICE_ADDRESS,
            12_000_000,
            CodecMode::Master,
            sample_rate_hz,
        )
    }

    pub fn with_mode(self, mode: CodecMode) -> Self {
        BringUpConfig { mode, ..self }
    }

    pub fn with_sample_rate(self, sample_rate_hz: u32) -> Self {
        BringUpConfig {
            sample_rate_hz,
            ..self
        }
    }

    /// Validates the configuration and solves the PLL.
    pub fn prepare(&self) -> Result<BringUpPlan, Error> {
        if !rate::is_codec_supported(self.sample_rate_hz) {
            return Err(Error::UnsupportedSampleRate);
        }
        let base = BaseRate::for_sample_rate(self.sample_rate_hz)?;
        let divider = SampleRateClass::for_sample_rate(base, self.sample_rate_hz)?;
        let address = DeviceAddress::new(self.device_address)?;
        let clock_plan = pll::solve(self.input_clock_hz, base.core_clock_hz())?;

        Ok(BringUpPlan {
            address,
            mode: self.mode,
            clock_plan,
            divider,
        })
    }
}
