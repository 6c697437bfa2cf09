//! Toolkit for building whole-system CPU simulators.
//!
//! This crate provides the guest-side memory plumbing a simulator needs and a
//! reference CPU that exercises it:
//! 1. **Memory bus:** Address-indexed routing of sized, endian-aware accesses
//!    to mapped regions, with a one-entry hot cache for per-instruction lookups.
//! 2. **Regions:** RAM backed by a flat byte buffer, a void sentinel for
//!    unmapped space, and a trait for memory-mapped I/O devices.
//! 3. **ELF loader:** Materialises `PT_LOAD` segments into the guest address
//!    space, auto-allocating backing RAM under the image.
//! 4. **ZPU:** A big-endian 32-bit stack machine used as the canonical bus
//!    consumer.
//! 5. **GDB stub:** A background TCP listener reserved for remote debugging.

/// Common types (guest addresses, byte order, error kinds).
pub mod common;

/// Machine configuration (defaults, JSON deserialization).
pub mod config;

/// CPU trait and the ZPU interpreter.
pub mod cpu;

/// Memory-mapped I/O device implementations.
pub mod devices;

/// ELF executable loader.
pub mod elf;

/// Stub GDB remote agent.
pub mod gdb;

/// Guest memory bus (mapping, routing, streaming writes).
pub mod mem;

pub use crate::common::{Address, ByteOrder, MemError};
pub use crate::config::Config;
pub use crate::cpu::Cpu;
pub use crate::mem::{new_ram, Bus, MemoryKind, Region};
