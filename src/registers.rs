/*
   Copyright 2018 Ilya Epifanov

   Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
   http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
   http://opensource.org/licenses/MIT>, at your option. This file may not be
   copied, modified, or distributed except according to those terms.
*/
//! ADAU1761 register map.
//!
//! Register addresses are 16 bits wide and sent big-endian ahead of the data.

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u16)]
pub enum Register {
    ClockControl = 0x4000,
    PllControl = 0x4002,
    RecordMixerLeft0 = 0x400a,
    RecordMixerLeft1 = 0x400b,
    RecordMixerRight0 = 0x400c,
    RecordMixerRight1 = 0x400d,
    SerialPort0 = 0x4015,
    ConverterControl0 = 0x4017,
    AdcControl = 0x4019,
    PlaybackMixerLeft0 = 0x401c,
    PlaybackMixerRight0 = 0x401e,
    PlaybackLrMixerLeft = 0x4020,
    PlaybackLrMixerRight = 0x4021,
    HeadphoneLeftVolume = 0x4023,
    HeadphoneRightVolume = 0x4024,
    LineOutLeftVolume = 0x4025,
    LineOutRightVolume = 0x4026,
    PlaybackPowerManagement = 0x4029,
    DacControl0 = 0x402a,
    DspSamplingRate = 0x40eb,
    SerialInputRoute = 0x40f2,
    SerialOutputRoute = 0x40f3,
    SerialPortSamplingRate = 0x40f8,
    ClockEnable0 = 0x40f9,
    ClockEnable1 = 0x40fa,
}

impl Register {
    pub const fn addr(&self) -> u16 {
        *self as u16
    }
}

bitflags! {
    /// Register `0x4000`.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct ClockControlBits: u8 {
        const CLKSRC_PLL = 0b0000_1000;
        const INFREQ_MASK = 0b0000_0110;
        const INFREQ_1024 = 0b0000_0110;
        const COREN = 0b0000_0001;
    }
}

bitflags! {
    /// Register `0x4015`.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct SerialPortBits: u8 {
        const MASTER = 0b0000_0001;
    }
}

bitflags! {
    /// Register `0x40f9`, one power-up bit per digital module.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct ModulePowerBits: u8 {
        const SLEWPD = 0b0100_0000;
        const ALCPD = 0b0010_0000;
        const DECPD = 0b0001_0000;
        const SOUTPD = 0b0000_1000;
        const INTPD = 0b0000_0100;
        const SINPD = 0b0000_0010;
        const SPPD = 0b0000_0001;
    }
}

bitflags! {
    /// Register `0x40fa`.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct ClockEnableBits: u8 {
        const CLK1 = 0b0000_0010;
        const CLK0 = 0b0000_0001;
    }
}

/// Core clocked from the PLL at 1024 × fs, core disabled.
pub const CORE_OFF: ClockControlBits =
    ClockControlBits::CLKSRC_PLL.union(ClockControlBits::INFREQ_1024);
/// Core clocked from the PLL at 1024 × fs, core enabled.
pub const CORE_ON: ClockControlBits = CORE_OFF.union(ClockControlBits::COREN);

/// One byte destined for one register.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RegisterWrite {
    pub address: u16,
    pub value: u8,
}

impl RegisterWrite {
    pub const fn new(reg: Register, value: u8) -> Self {
        RegisterWrite {
            address: reg.addr(),
            value,
        }
    }
}

/// Mixer, volume, converter and routing setup, applied after the core is
/// running and before the sample rate is selected. Levels and routing come
/// before the clock enables.
pub const CONFIG_TABLE: [RegisterWrite; 19] = [
    // record mixers enabled, aux gain 0 dB
    RegisterWrite::new(Register::RecordMixerLeft0, 0x01),
    RegisterWrite::new(Register::RecordMixerLeft1, 0x05),
    RegisterWrite::new(Register::RecordMixerRight0, 0x01),
    RegisterWrite::new(Register::RecordMixerRight1, 0x05),
    // left DAC to left playback mixer, right DAC to right
    RegisterWrite::new(Register::PlaybackMixerLeft0, 0x21),
    RegisterWrite::new(Register::PlaybackMixerRight0, 0x41),
    RegisterWrite::new(Register::PlaybackLrMixerLeft, 0x03),
    RegisterWrite::new(Register::PlaybackLrMixerRight, 0x09),
    // headphones 0 dB, unmuted, headphone mode
    RegisterWrite::new(Register::HeadphoneLeftVolume, 0xe7),
    RegisterWrite::new(Register::HeadphoneRightVolume, 0xe7),
    RegisterWrite::new(Register::LineOutLeftVolume, 0xe6),
    RegisterWrite::new(Register::LineOutRightVolume, 0xe6),
    // both ADCs
    RegisterWrite::new(Register::AdcControl, 0x03),
    // both DACs
    RegisterWrite::new(Register::PlaybackPowerManagement, 0x03),
    RegisterWrite::new(Register::DacControl0, 0x03),
    // serial [L0, R0] <-> converters [L, R]
    RegisterWrite::new(Register::SerialInputRoute, 0x01),
    RegisterWrite::new(Register::SerialOutputRoute, 0x01),
    // every module powered
    RegisterWrite::new(Register::ClockEnable0, ModulePowerBits::all().bits()),
    RegisterWrite::new(
        Register::ClockEnable1,
        ClockEnableBits::CLK0.union(ClockEnableBits::CLK1).bits(),
    ),
];
