/*
   Copyright 2018 Ilya Epifanov

   Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
   http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
   http://opensource.org/licenses/MIT>, at your option. This file may not be
   copied, modified, or distributed except according to those terms.
*/
//! PLL coefficient solver.
//!
//! The ADAU1761 core clock is synthesized from MCLK by a PLL that multiplies
//! the (optionally pre-divided) input by `R + N/M`. In integer mode `N` and
//! `M` are zero and the PLL multiplies by `R` alone.

use crate::Error;

/// Lowest MCLK frequency the PLL accepts.
pub const MIN_INPUT_HZ: u32 = 8_000_000;
/// Highest MCLK frequency the PLL accepts.
pub const MAX_INPUT_HZ: u32 = 27_000_000;
/// The PLL input after the `X` pre-divider must not exceed this.
pub const MAX_PFD_INPUT_HZ: u32 = 13_500_000;

const MAX_FRACTION: u32 = 0xffff;
const MAX_PREDIVIDER: u32 = 3;
const MIN_INTEGER: u32 = 2;
const MAX_INTEGER: u32 = 8;

bitflags! {
    /// Byte 4 of the PLL control register.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct PllControlBits: u8 {
        const R_MASK = 0b0111_1000;
        const X_MASK = 0b0000_0110;
        const TYPE_FRACTIONAL = 0b0000_0001;
    }
}

bitflags! {
    /// Byte 5 of the PLL control register.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct PllEnableBits: u8 {
        /// Read-only lock flag. Bring-up waits a fixed time instead of polling it.
        const LOCK = 0b0000_0010;
        const PLL_EN = 0b0000_0001;
    }
}

/// PLL coefficients for one input/output frequency pair.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct ClockPlan {
    /// Fractional denominator.
    pub m: u16,
    /// Fractional numerator.
    pub n: u16,
    /// Integer multiplier.
    pub r: u8,
    /// Input pre-divider code; the input is divided by `div + 1`.
    pub div: u8,
    pub fractional: bool,
}

/// Greatest common divisor by Euclid's algorithm. `gcd(a, 0) == a`.
pub fn gcd(a: u32, b: u32) -> u32 {
    let (mut a, mut b) = if a < b { (b, a) } else { (a, b) };
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

/// Finds PLL coefficients turning `input_hz` into `output_hz`.
///
/// An `output_hz` of zero requests a disabled PLL and yields the all-zero plan.
pub fn solve(input_hz: u32, output_hz: u32) -> Result<ClockPlan, Error> {
    if !(MIN_INPUT_HZ..=MAX_INPUT_HZ).contains(&input_hz) {
        return Err(Error::OutOfRange);
    }

    if output_hz == 0 {
        return Ok(ClockPlan::default());
    }

    let (r, n, m, div) = if output_hz % input_hz == 0 {
        (output_hz / input_hz, 0, 0, 0)
    } else {
        let div = input_hz.div_ceil(MAX_PFD_INPUT_HZ) - 1;
        let reduced = input_hz / (div + 1);
        let i = output_hz % reduced;
        let g = gcd(i, reduced);
        (output_hz / reduced, i / g, reduced / g, div)
    };

    if n > MAX_FRACTION
        || m > MAX_FRACTION
        || div > MAX_PREDIVIDER
        || !(MIN_INTEGER..=MAX_INTEGER).contains(&r)
    {
        return Err(Error::UnachievableRatio);
    }

    Ok(ClockPlan {
        m: m as u16,
        n: n as u16,
        r: r as u8,
        div: div as u8,
        fractional: m != 0,
    })
}

impl ClockPlan {
    fn control_bits(&self) -> PllControlBits {
        let fields = PllControlBits::from_bits_truncate((self.r << 3) | (self.div << 1));
        if self.fractional {
            fields | PllControlBits::TYPE_FRACTIONAL
        } else {
            fields
        }
    }

    /// Register image for `0x4002..=0x4007`.
    pub fn to_bytes(&self) -> [u8; 6] {
        let [m_hi, m_lo] = self.m.to_be_bytes();
        let [n_hi, n_lo] = self.n.to_be_bytes();
        [
            m_hi,
            m_lo,
            n_hi,
            n_lo,
            self.control_bits().bits(),
            PllEnableBits::PLL_EN.bits(),
        ]
    }

    /// Decodes a register image produced by [`ClockPlan::to_bytes`] or read
    /// back from the device. The enable byte is not part of the plan and is
    /// ignored.
    pub fn from_bytes(bytes: [u8; 6]) -> Result<Self, Error> {
        let control = PllControlBits::from_bits(bytes[4]).ok_or(Error::InvalidParameter)?;
        Ok(ClockPlan {
            m: u16::from_be_bytes([bytes[0], bytes[1]]),
            n: u16::from_be_bytes([bytes[2], bytes[3]]),
            r: (control & PllControlBits::R_MASK).bits() >> 3,
            div: (control & PllControlBits::X_MASK).bits() >> 1,
            fractional: control.contains(PllControlBits::TYPE_FRACTIONAL),
        })
    }

    /// Frequency this plan synthesizes from `input_hz`, rounded down.
    pub fn output_hz(&self, input_hz: u32) -> u64 {
        let divided = u64::from(self.div) + 1;
        let input = u64::from(input_hz);
        if self.fractional && self.m != 0 {
            let m = u64::from(self.m);
            input * (u64::from(self.r) * m + u64::from(self.n)) / (divided * m)
        } else {
            input * u64::from(self.r) / divided
        }
    }
}
