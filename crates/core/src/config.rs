//! Machine configuration.
//!
//! This module defines the configuration structure used to parameterize a
//! simulated machine. It provides:
//! 1. **Defaults:** Baseline constants (page size, UART base, cycle budget).
//! 2. **Structure:** The `system` section covering memory, devices, and the
//!    debug agent.
//!
//! Configuration is supplied as JSON by the CLI, or use `Config::default()`.

use serde::Deserialize;

use crate::common::{Address, ByteOrder};

/// Default configuration constants.
mod defaults {
    use crate::common::Address;

    /// Bus page size in bytes; the granularity of loader auto-allocation.
    pub const PAGE_SIZE: Address = 4096;

    /// Base address of the console UART MMIO region.
    pub const UART_BASE: Address = 0x080A_0000;

    /// Cycle budget handed to each `step` call by the CLI run loop.
    pub const STEP_CYCLES: u64 = 2_000_000;
}

/// Root configuration type.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// System-level settings (memory geometry, devices, debug agent).
    pub system: SystemConfig,
}

/// System-level configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SystemConfig {
    /// Bus page size; must be a nonzero power of two.
    pub page_size: Address,

    /// Byte order of RAM auto-allocated under a loaded image.
    pub ram_order: ByteOrder,

    /// Whether the loader allocates RAM under the image's segments.
    pub auto_alloc: bool,

    /// Base address of the console UART.
    pub uart_base: Address,

    /// Listen address for the GDB stub; `None` disables it.
    pub gdb_addr: Option<String>,

    /// Cycle budget per `step` call in the run loop.
    pub step_cycles: u64,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            page_size: defaults::PAGE_SIZE,
            ram_order: ByteOrder::Little,
            auto_alloc: true,
            uart_base: defaults::UART_BASE,
            gdb_addr: None,
            step_cycles: defaults::STEP_CYCLES,
        }
    }
}

impl Config {
    /// Deserializes a configuration from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
