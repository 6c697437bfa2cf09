//! CPU trait and implementations.

/// The ZPU stack-machine interpreter.
pub mod zpu;

use crate::common::Address;

pub use zpu::Zpu;

/// Trait implemented by simulated CPUs.
pub trait Cpu {
    /// Initialises the CPU to a known initial state.
    fn reset(&mut self);
    /// Sets the program counter to the given address.
    fn set_pc(&mut self, pc: Address);
    /// Returns the current program counter.
    fn pc(&self) -> Address;
    /// Returns the current stack pointer.
    fn sp(&self) -> Address;
    /// Steps the simulation forward by at most `n` cycles.
    ///
    /// Returns the number of cycles actually consumed; the budget is the
    /// cooperative cancellation mechanism for long-running simulations.
    fn step(&mut self, n: u64) -> u64;
}
