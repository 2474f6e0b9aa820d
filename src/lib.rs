/*
   Copyright 2018 Ilya Epifanov

   Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
   http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
   http://opensource.org/licenses/MIT>, at your option. This file may not be
   copied, modified, or distributed except according to those terms.
*/
/*!
A platform agnostic Rust driver bringing up the [ADAU1761] audio codec, based
on the [`embedded-hal`] traits.

## The Device

The Analog Devices [ADAU1761] is a low-power stereo audio codec with an
integrated PLL and SigmaDSP core.

The device has an I²C control interface with 16-bit register addresses.

## Usage

Provide a [`Transport`] that opens your I²C bus by name, and an
`embedded_hal::delay::DelayNs` implementation:

```ignore
use adau1761::{bring_up, check_supported_rate, BringUpConfig};

let config = BringUpConfig::zedboard(48_000);
assert!(check_supported_rate(config.sample_rate_hz));
bring_up(&mut transport, &mut delay, &config)?;
```

Bring-up powers the core down, programs the PLL for a 1024 × fs core clock,
waits for lock, powers the core up, selects master or slave mode, applies the
mixer/converter/routing table and finally selects the sample rate divider.

The PLL solver can be used on its own:

```
let plan = adau1761::pll::solve(12_000_000, 49_152_000).unwrap();
assert_eq!((plan.r, plan.n, plan.m), (4, 12, 125));
```

[ADAU1761]: https://www.analog.com/media/en/technical-documentation/data-sheets/ADAU1761.pdf
[`embedded-hal`]: https://github.com/rust-embedded/embedded-hal
*/
#![deny(warnings)]
#![cfg_attr(not(test), no_std)]

#[macro_use]
extern crate bitflags;

pub mod codec;
pub mod config;
pub mod pll;
pub mod rate;
pub mod registers;

pub use crate::codec::{
    bring_up, Adau1761, BringUpState, CodecHandle, Transport, PLL_LOCK_TIME_MS,
    REGISTER_SETTLE_TIME_MS,
};
pub use crate::config::{BringUpConfig, BringUpPlan, CodecMode, DeviceAddress};
pub use crate::pll::ClockPlan;
pub use crate::rate::{is_codec_supported as check_supported_rate, BaseRate, SampleRateClass};
pub use crate::registers::{Register, RegisterWrite};

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// PLL input clock outside 8 MHz to 27 MHz.
    #[error("PLL input clock out of range")]
    OutOfRange,
    #[error("no PLL coefficients reach the requested clock")]
    UnachievableRatio,
    #[error("unsupported sample rate")]
    UnsupportedSampleRate,
    /// Core clock to sample rate ratio missing from the divider table.
    #[error("no divider for core clock ratio")]
    UnsupportedRatio,
    #[error("unable to open the bus")]
    DeviceUnavailable,
    /// Carries the register address whose write failed.
    #[error("error writing codec register {0:#06x}")]
    BusWriteFailed(u16),
    #[error("device address {0:#x} does not fit in 10 bits")]
    InvalidDeviceAddress(u16),
    #[error("invalid parameter")]
    InvalidParameter,
}
