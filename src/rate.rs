/*
   Copyright 2018 Ilya Epifanov

   Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
   http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
   http://opensource.org/licenses/MIT>, at your option. This file may not be
   copied, modified, or distributed except according to those terms.
*/
//! Sample rates the codec can run at, and the divider codes selecting them.

use crate::Error;

/// Sample rates reachable from a 1024 × fs core clock in either family.
pub const SUPPORTED_SAMPLE_RATES: [u32; 14] = [
    8000, 12000, 16000, 24000, 32000, 48000, 96000, //
    7350, 11025, 14700, 22050, 29400, 44100, 88200,
];

/// The core clock runs at this multiple of the base rate.
pub const CORE_CLOCK_RATIO: u32 = 1024;

/// Returns `true` if the codec can run at `sample_rate_hz`.
pub fn is_codec_supported(sample_rate_hz: u32) -> bool {
    SUPPORTED_SAMPLE_RATES.contains(&sample_rate_hz)
}

/// Sample-rate family the PLL is tuned for.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BaseRate {
    Fs48000,
    Fs44100,
}

impl BaseRate {
    pub fn hz(&self) -> u32 {
        match *self {
            BaseRate::Fs48000 => 48_000,
            BaseRate::Fs44100 => 44_100,
        }
    }

    /// PLL output frequency for this family.
    pub fn core_clock_hz(&self) -> u32 {
        self.hz() * CORE_CLOCK_RATIO
    }

    /// Picks the family whose core clock divides evenly by `sample_rate_hz`,
    /// preferring 48 kHz.
    pub fn for_sample_rate(sample_rate_hz: u32) -> Result<BaseRate, Error> {
        if sample_rate_hz == 0 {
            return Err(Error::UnsupportedSampleRate);
        }
        [BaseRate::Fs48000, BaseRate::Fs44100]
            .into_iter()
            .find(|base| base.core_clock_hz() % sample_rate_hz == 0)
            .ok_or(Error::UnsupportedSampleRate)
    }
}

/// Entry of the converter divider table, named by the sample rate relative to
/// the base rate.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SampleRateClass {
    Fs,
    FsDiv6,
    FsDiv4,
    FsDiv3,
    FsDiv2,
    FsDiv1_5,
    FsTimes2,
}

impl SampleRateClass {
    fn from_ratio(ratio: u32) -> Result<SampleRateClass, Error> {
        match ratio {
            1024 => Ok(SampleRateClass::Fs),
            6144 => Ok(SampleRateClass::FsDiv6),
            4096 => Ok(SampleRateClass::FsDiv4),
            3072 => Ok(SampleRateClass::FsDiv3),
            2048 => Ok(SampleRateClass::FsDiv2),
            1536 => Ok(SampleRateClass::FsDiv1_5),
            512 => Ok(SampleRateClass::FsTimes2),
            _ => Err(Error::UnsupportedRatio),
        }
    }

    pub fn for_sample_rate(base: BaseRate, sample_rate_hz: u32) -> Result<SampleRateClass, Error> {
        let core_clock = base.core_clock_hz();
        if sample_rate_hz == 0 || core_clock % sample_rate_hz != 0 {
            return Err(Error::UnsupportedSampleRate);
        }
        SampleRateClass::from_ratio(core_clock / sample_rate_hz)
    }

    /// Core clock cycles per sample.
    pub fn ratio(&self) -> u32 {
        match *self {
            SampleRateClass::Fs => 1024,
            SampleRateClass::FsDiv6 => 6144,
            SampleRateClass::FsDiv4 => 4096,
            SampleRateClass::FsDiv3 => 3072,
            SampleRateClass::FsDiv2 => 2048,
            SampleRateClass::FsDiv1_5 => 1536,
            SampleRateClass::FsTimes2 => 512,
        }
    }

    /// Code for the converter and serial port rate registers.
    pub fn converter_code(&self) -> u8 {
        match *self {
            SampleRateClass::Fs => 0,
            SampleRateClass::FsDiv6 => 1,
            SampleRateClass::FsDiv4 => 2,
            SampleRateClass::FsDiv3 => 3,
            SampleRateClass::FsDiv2 => 4,
            SampleRateClass::FsDiv1_5 => 5,
            SampleRateClass::FsTimes2 => 6,
        }
    }

    /// Code for the DSP sampling rate register, which orders its table differently.
    pub fn dsp_code(&self) -> u8 {
        match *self {
            SampleRateClass::Fs => 1,
            SampleRateClass::FsDiv6 => 6,
            SampleRateClass::FsDiv4 => 5,
            SampleRateClass::FsDiv3 => 4,
            SampleRateClass::FsDiv2 => 3,
            SampleRateClass::FsDiv1_5 => 2,
            SampleRateClass::FsTimes2 => 0,
        }
    }
}
