//! Transmit-only console UART.
//!
//! The reference MMIO region: a single combined data/status register. Guest
//! software busy-waits on the transmit-ready flag and stores one character at
//! a time; the device latches each byte into an output buffer and can echo it
//! to the host's stdout for console use.
//!
//! # Registers
//!
//! * `0x0C`: Data/Status
//!   * write: latch the low byte into the transmit sink
//!   * read: transmit-ready flag (`0x100`, always set)
//!
//! Only 32-bit access is implemented; every other width falls through to the
//! shared no-memory fallback and fails with a bus error.

use std::io::{self, Write};

use crate::common::{Address, ByteOrder, MemError};
use crate::mem::{MemoryKind, Region};

/// Data/Status register offset.
const REG_DATA: Address = 0x0C;

/// Status flag: transmitter ready to accept a byte.
const STATUS_TX_READY: u32 = 0x100;

/// Size of the UART's MMIO window in bytes.
const UART_SIZE: Address = 0x1000;

/// UART device structure.
pub struct Uart {
    byte_order: ByteOrder,
    tx: Vec<u8>,
    echo: bool,
}

impl Uart {
    /// Creates a UART that latches transmitted bytes into an internal buffer.
    ///
    /// # Arguments
    ///
    /// * `byte_order` - Byte order the region reports; pick the simulated
    ///   machine's natural order.
    pub fn new(byte_order: ByteOrder) -> Self {
        Self { byte_order, tx: Vec::new(), echo: false }
    }

    /// Creates a console UART that also echoes each byte to stdout.
    pub fn console(byte_order: ByteOrder) -> Self {
        Self { byte_order, tx: Vec::new(), echo: true }
    }

    /// Returns the bytes transmitted so far.
    pub fn output(&self) -> &[u8] {
        &self.tx
    }

    /// Takes the transmitted bytes, leaving the buffer empty.
    pub fn take_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.tx)
    }

    fn transmit(&mut self, byte: u8) {
        self.tx.push(byte);
        if self.echo {
            let mut out = io::stdout();
            let _ = out.write_all(&[byte]);
            let _ = out.flush();
        }
    }
}

impl Region for Uart {
    fn size(&self) -> Address {
        UART_SIZE
    }

    fn kind(&self) -> MemoryKind {
        MemoryKind::Io
    }

    fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Reads a device register; unimplemented registers read as 0.
    fn read_u32(&mut self, offset: Address) -> Result<u32, MemError> {
        if offset > UART_SIZE - 4 {
            return Err(MemError::Page);
        }
        match offset {
            REG_DATA => Ok(STATUS_TX_READY),
            _ => Ok(0),
        }
    }

    /// Writes a device register; unimplemented registers are ignored.
    fn write_u32(&mut self, offset: Address, v: u32) -> Result<(), MemError> {
        if offset > UART_SIZE - 4 {
            return Err(MemError::Page);
        }
        if offset == REG_DATA {
            self.transmit(v as u8);
        }
        Ok(())
    }

    fn as_uart_mut(&mut self) -> Option<&mut Uart> {
        Some(self)
    }
}
