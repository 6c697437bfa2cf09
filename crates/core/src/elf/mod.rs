//! ELF executable loader.
//!
//! This module materialises a statically linked ELF executable into the guest
//! address space. It performs:
//! 1. **Header parsing:** Hand-decodes the ELF ident, header, and program
//!    headers for both classes (32/64-bit) and both byte orders, consuming
//!    only the fields the loader needs.
//! 2. **Auto-allocation:** Scans the bus at page granularity under each
//!    `PT_LOAD` segment and maps fresh RAM over every maximal run of
//!    unmapped pages, leaving pre-mapped blocks (e.g. MMIO) untouched.
//! 3. **Segment streaming:** Writes `filesz` bytes through the bus's
//!    streaming writer, then zero-fills the tail up to `memsz`.
//!
//! Only `ET_EXEC` files with `PT_LOAD` segments are supported. Auto-allocated
//! RAM defaults to little-endian irrespective of the image's `EI_DATA` field;
//! the CPU owns any mismatch at access time. Use [`load_with_order`] to pick
//! a different order.

mod loader;

use std::fmt;
use std::io;

use thiserror::Error;

use crate::common::{Address, MemError};

pub use loader::{load, load_with_order};

/// ELF machine identifier (`e_machine`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Machine(pub u16);

impl Machine {
    /// Zylin ZPU.
    pub const ZPU: Machine = Machine(106);
    /// LatticeMico32.
    pub const LM32: Machine = Machine(138);
    /// RISC-V.
    pub const RISCV: Machine = Machine(243);
}

impl fmt::Display for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Machine::ZPU => write!(f, "zpu"),
            Machine::LM32 => write!(f, "lm32"),
            Machine::RISCV => write!(f, "riscv"),
            Machine(other) => write!(f, "unknown-{}", other),
        }
    }
}

/// ELF class (`EI_CLASS`): the architecture's natural word width.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Class {
    /// Unknown class.
    None,
    /// 32-bit architecture.
    Elf32,
    /// 64-bit architecture.
    Elf64,
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Class::None => write!(f, "none"),
            Class::Elf32 => write!(f, "elf32"),
            Class::Elf64 => write!(f, "elf64"),
        }
    }
}

/// ELF data encoding (`EI_DATA`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Data {
    /// Unknown data format.
    None,
    /// 2's complement little-endian.
    Little,
    /// 2's complement big-endian.
    Big,
}

impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Data::None => write!(f, "none"),
            Data::Little => write!(f, "little"),
            Data::Big => write!(f, "big"),
        }
    }
}

/// Architecture description recovered from an ELF header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Arch {
    /// Machine identifier.
    pub machine: Machine,
    /// Word width class.
    pub class: Class,
    /// Data encoding.
    pub data: Data,
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.machine, self.class, self.data)
    }
}

/// A successfully loaded image.
#[derive(Clone, Copy, Debug)]
pub struct Image {
    /// Architecture the image was built for.
    pub arch: Arch,
    /// Entry point address.
    pub entry: Address,
}

/// Errors reported by the loader.
///
/// Variants produced after the header has been parsed carry the partial
/// architecture description, so a caller can still report what kind of image
/// it was looking at.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// The image file could not be opened or read.
    #[error("failed to read image file")]
    Io(#[from] io::Error),

    /// The file is not a well-formed ELF image.
    #[error("invalid ELF image: {0}")]
    Parse(String),

    /// The file is an ELF image but not a static executable.
    #[error("unsupported elf file type {kind} for {arch}")]
    UnsupportedFileType {
        /// Architecture parsed from the header.
        arch: Arch,
        /// The offending `e_type` value.
        kind: u16,
    },

    /// A program header other than `PT_LOAD` was encountered.
    #[error("unsupported program segment type {kind:#x} for {arch}")]
    UnsupportedSegmentType {
        /// Architecture parsed from the header.
        arch: Arch,
        /// The offending `p_type` value.
        kind: u32,
    },

    /// A bus fault occurred while materialising a segment.
    #[error("bus fault while loading segment at {addr:#x}: {source}")]
    Write {
        /// Architecture parsed from the header.
        arch: Arch,
        /// Guest address of the fault.
        addr: Address,
        /// The underlying bus error.
        source: MemError,
    },
}
