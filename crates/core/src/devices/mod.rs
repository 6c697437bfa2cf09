//! Memory-mapped I/O device implementations.

/// Transmit-only console UART.
pub mod uart;

pub use uart::Uart;
