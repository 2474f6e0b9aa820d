//! Simulated transport, bus and delay shared by the integration tests.

#![allow(dead_code)]

use adau1761::Transport;
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation, SevenBitAddress, TenBitAddress};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusAddress {
    Seven(u8),
    Ten(u16),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub address: BusAddress,
    pub payload: Vec<u8>,
}

impl Transfer {
    pub fn register(&self) -> u16 {
        u16::from_be_bytes([self.payload[0], self.payload[1]])
    }

    pub fn data(&self) -> &[u8] {
        &self.payload[2..]
    }
}

#[derive(Debug)]
pub struct BusFault;

impl embedded_hal::i2c::Error for BusFault {
    fn kind(&self) -> ErrorKind {
        ErrorKind::NoAcknowledge(embedded_hal::i2c::NoAcknowledgeSource::Data)
    }
}

/// Records every write and fails the write targeting `fail_on`.
#[derive(Debug, Default)]
pub struct RecordingBus {
    pub transfers: Vec<Transfer>,
    pub fail_on: Option<u16>,
}

impl RecordingBus {
    fn record(
        &mut self,
        address: BusAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), BusFault> {
        for op in operations.iter() {
            if let Operation::Write(data) = op {
                let transfer = Transfer {
                    address,
                    payload: data.to_vec(),
                };
                let register = transfer.register();
                self.transfers.push(transfer);
                if self.fail_on == Some(register) {
                    return Err(BusFault);
                }
            }
        }
        Ok(())
    }

    pub fn registers(&self) -> Vec<u16> {
        self.transfers.iter().map(Transfer::register).collect()
    }
}

impl ErrorType for RecordingBus {
    type Error = BusFault;
}

impl I2c<SevenBitAddress> for RecordingBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.record(BusAddress::Seven(address), operations)
    }
}

impl I2c<TenBitAddress> for RecordingBus {
    fn transaction(
        &mut self,
        address: u16,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.record(BusAddress::Ten(address), operations)
    }
}

#[derive(Debug)]
pub struct NotFound;

/// Hands out one [`RecordingBus`] per open and keeps it after close.
#[derive(Debug, Default)]
pub struct MockTransport {
    pub missing: bool,
    pub fail_on: Option<u16>,
    pub opened: Vec<String>,
    pub closed: Vec<RecordingBus>,
}

impl MockTransport {
    pub fn failing_on(register: u16) -> Self {
        MockTransport {
            fail_on: Some(register),
            ..Default::default()
        }
    }

    pub fn missing() -> Self {
        MockTransport {
            missing: true,
            ..Default::default()
        }
    }

    /// The bus handed back by the single close.
    pub fn bus(&self) -> &RecordingBus {
        assert_eq!(self.closed.len(), 1, "bus must be closed exactly once");
        &self.closed[0]
    }
}

impl Transport for MockTransport {
    type Bus = RecordingBus;
    type Error = NotFound;

    fn open(&mut self, bus_name: &str) -> Result<Self::Bus, Self::Error> {
        self.opened.push(bus_name.to_string());
        if self.missing {
            return Err(NotFound);
        }
        Ok(RecordingBus {
            transfers: Vec::new(),
            fail_on: self.fail_on,
        })
    }

    fn close(&mut self, bus: Self::Bus) {
        self.closed.push(bus);
    }
}

#[derive(Debug, Default)]
pub struct RecordingDelay {
    pub ms: Vec<u32>,
    pub ns: u64,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.ns += u64::from(ns);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.ms.push(ms);
    }
}
