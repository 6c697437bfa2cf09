//! ELF parsing and segment materialisation.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::common::{Address, BusOp, ByteOrder, MemError};
use crate::elf::{Arch, Class, Data, Image, LoaderError, Machine};
use crate::mem::{new_ram, Bus};

/// ELF magic number: 0x7f 'E' 'L' 'F'.
const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];

/// ELF type: executable file.
const ET_EXEC: u16 = 2;

/// Program header type: loadable segment.
const PT_LOAD: u32 = 1;

/// ELF header size for the 32-bit class.
const EHDR32_SIZE: usize = 52;

/// ELF header size for the 64-bit class.
const EHDR64_SIZE: usize = 64;

/// Chunk used when zero-filling the `filesz..memsz` tail.
const ZERO_CHUNK: [u8; 4096] = [0; 4096];

/// Field reader over raw ELF bytes, decoding in the image's own byte order.
struct Reader<'a> {
    data: &'a [u8],
    order: Data,
}

impl<'a> Reader<'a> {
    fn bytes_at(&self, off: usize, n: usize) -> Result<&'a [u8], LoaderError> {
        self.data
            .get(off..off + n)
            .ok_or_else(|| LoaderError::Parse(format!("truncated at offset {:#x}", off)))
    }

    fn u16_at(&self, off: usize) -> Result<u16, LoaderError> {
        let b = self.bytes_at(off, 2)?;
        Ok(match self.order {
            Data::Big => u16::from_be_bytes([b[0], b[1]]),
            _ => u16::from_le_bytes([b[0], b[1]]),
        })
    }

    fn u32_at(&self, off: usize) -> Result<u32, LoaderError> {
        let b = self.bytes_at(off, 4)?;
        Ok(match self.order {
            Data::Big => u32::from_be_bytes([b[0], b[1], b[2], b[3]]),
            _ => u32::from_le_bytes([b[0], b[1], b[2], b[3]]),
        })
    }

    fn u64_at(&self, off: usize) -> Result<u64, LoaderError> {
        let b = self.bytes_at(off, 8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(b);
        Ok(match self.order {
            Data::Big => u64::from_be_bytes(raw),
            _ => u64::from_le_bytes(raw),
        })
    }

    /// Reads a class-width word: `u32` for ELF32, `u64` for ELF64.
    fn word_at(&self, off: usize, class: Class) -> Result<u64, LoaderError> {
        match class {
            Class::Elf64 => self.u64_at(off),
            _ => self.u32_at(off).map(u64::from),
        }
    }
}

/// A `PT_LOAD` program header, reduced to the fields the loader consumes.
struct Segment {
    p_type: u32,
    offset: u64,
    paddr: Address,
    filesz: u64,
    memsz: u64,
}

fn parse_segment(r: &Reader<'_>, off: usize, class: Class) -> Result<Segment, LoaderError> {
    match class {
        Class::Elf64 => Ok(Segment {
            p_type: r.u32_at(off)?,
            offset: r.u64_at(off + 8)?,
            paddr: r.u64_at(off + 24)?,
            filesz: r.u64_at(off + 32)?,
            memsz: r.u64_at(off + 40)?,
        }),
        _ => Ok(Segment {
            p_type: r.u32_at(off)?,
            offset: u64::from(r.u32_at(off + 4)?),
            paddr: u64::from(r.u32_at(off + 12)?),
            filesz: u64::from(r.u32_at(off + 16)?),
            memsz: u64::from(r.u32_at(off + 20)?),
        }),
    }
}

/// Allocates and maps RAM covering `[addr, addr + size)`.
///
/// The range is widened to page boundaries and scanned for maximal runs of
/// unmapped pages; each run gets one fresh RAM region of exactly that length.
/// Already-mapped pages are skipped, which lets callers pre-map MMIO (or
/// their own RAM) underneath the image before loading.
fn alloc(bus: &mut Bus, addr: Address, size: Address, order: ByteOrder) -> Result<(), MemError> {
    let ps = bus.page_size();
    let pm = ps - 1;
    let size = (size.wrapping_add(addr & pm).wrapping_add(pm)) & !pm;
    let addr = addr & !pm;
    let end = addr.wrapping_add(size);

    let mut cur = addr;
    while cur != end {
        let mut start = cur;
        while start != end && bus.memory(start).1.size() != 0 {
            start = start.wrapping_add(ps);
        }
        if start == end {
            break;
        }
        cur = start.wrapping_add(ps);
        while cur != end && bus.memory(cur).1.size() == 0 {
            cur = cur.wrapping_add(ps);
        }
        bus.map(start, new_ram(cur.wrapping_sub(start), order))?;
    }
    Ok(())
}

/// Loads an ELF executable into the guest address space.
///
/// Parses the file at `path`, and for each `PT_LOAD` segment streams its
/// bytes (then a zero-filled tail up to `memsz`) into `bus` at the segment's
/// physical address. Only statically linked executables are supported.
///
/// # Arguments
///
/// * `bus` - Destination bus; pre-mapped blocks are written through, not
///   replaced.
/// * `path` - Path to the ELF executable.
/// * `auto_alloc` - When `true`, RAM is allocated and mapped under the
///   image's segments first. The allocated RAM is little-endian regardless
///   of the image's `EI_DATA` field.
///
/// # Returns
///
/// The architecture triple and the entry point address.
pub fn load(bus: &mut Bus, path: impl AsRef<Path>, auto_alloc: bool) -> Result<Image, LoaderError> {
    load_with_order(bus, path, auto_alloc, ByteOrder::Little)
}

/// [`load`] with an explicit byte order for auto-allocated RAM.
pub fn load_with_order(
    bus: &mut Bus,
    path: impl AsRef<Path>,
    auto_alloc: bool,
    ram_order: ByteOrder,
) -> Result<Image, LoaderError> {
    let data = fs::read(path)?;

    if data.len() < EHDR32_SIZE || data[..4] != ELF_MAGIC {
        return Err(LoaderError::Parse("bad magic".into()));
    }
    let class = match data[4] {
        1 => Class::Elf32,
        2 => Class::Elf64,
        _ => Class::None,
    };
    let order = match data[5] {
        1 => Data::Little,
        2 => Data::Big,
        _ => Data::None,
    };
    if class == Class::None || order == Data::None {
        return Err(LoaderError::Parse(format!(
            "unsupported class/data encoding {}/{}",
            data[4], data[5]
        )));
    }
    if class == Class::Elf64 && data.len() < EHDR64_SIZE {
        return Err(LoaderError::Parse("truncated ELF64 header".into()));
    }

    let r = Reader { data: &data, order };
    let arch = Arch { machine: Machine(r.u16_at(18)?), class, data: order };

    let e_type = r.u16_at(16)?;
    if e_type != ET_EXEC {
        return Err(LoaderError::UnsupportedFileType { arch, kind: e_type });
    }

    let (entry, phoff, phentsize_off, phnum_off) = match class {
        Class::Elf64 => (r.word_at(24, class)?, r.word_at(32, class)?, 54, 56),
        _ => (r.word_at(24, class)?, r.word_at(28, class)?, 42, 44),
    };
    let phentsize = usize::from(r.u16_at(phentsize_off)?);
    let phnum = usize::from(r.u16_at(phnum_off)?);

    for i in 0..phnum {
        let off = usize::try_from(phoff)
            .ok()
            .and_then(|base| base.checked_add(i * phentsize))
            .ok_or_else(|| LoaderError::Parse("program header table out of range".into()))?;
        let seg = parse_segment(&r, off, class)?;
        if seg.p_type != PT_LOAD {
            return Err(LoaderError::UnsupportedSegmentType { arch, kind: seg.p_type });
        }

        if auto_alloc {
            alloc(bus, seg.paddr, seg.memsz, ram_order).map_err(|source| {
                LoaderError::Write { arch, addr: seg.paddr, source }
            })?;
        }

        let file_end = seg
            .offset
            .checked_add(seg.filesz)
            .and_then(|end| usize::try_from(end).ok())
            .filter(|&end| end <= data.len())
            .ok_or_else(|| {
                LoaderError::Parse(format!("segment {} data outside the file", i))
            })?;
        let file_start = usize::try_from(seg.offset)
            .map_err(|_| LoaderError::Parse(format!("segment {} data outside the file", i)))?;

        let mut w = bus.writer(seg.paddr);
        stream(&mut w, &data[file_start..file_end]).map_err(|addr| LoaderError::Write {
            arch,
            addr,
            source: MemError::Bus { op: BusOp::Write, width: 1, addr },
        })?;

        // zero-fill filesz..memsz; this clears the BSS as a side effect, but
        // that should not be taken for granted by guest code
        let mut gap = seg.memsz.saturating_sub(seg.filesz);
        while gap > 0 {
            let n = gap.min(ZERO_CHUNK.len() as u64) as usize;
            stream(&mut w, &ZERO_CHUNK[..n]).map_err(|addr| LoaderError::Write {
                arch,
                addr,
                source: MemError::Bus { op: BusOp::Write, width: 1, addr },
            })?;
            gap -= n as u64;
        }
    }

    Ok(Image { arch, entry })
}

/// Pushes `buf` through the writer, reporting the faulting address when the
/// stream hits unmapped memory.
fn stream(w: &mut crate::mem::BusWriter<'_>, buf: &[u8]) -> Result<(), Address> {
    let mut off = 0;
    while off < buf.len() {
        match w.write(&buf[off..]) {
            Ok(0) | Err(_) => return Err(w.position()),
            Ok(n) => off += n,
        }
    }
    Ok(())
}
