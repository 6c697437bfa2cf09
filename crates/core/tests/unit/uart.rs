//! UART Device Unit Tests.
//!
//! The UART is the reference MMIO region: writes carry side effects (the
//! transmit latch), reads report status, and unimplemented widths fall
//! through to the bus-error default.

use mirv_core::common::{BusOp, ByteOrder, MemError};
use mirv_core::devices::Uart;
use mirv_core::mem::{Bus, MemoryKind, Region};

use crate::common::regions::Latch;

const UART_BASE: u64 = 0x080A_0000;
const REG_DATA: u64 = 0x0C;

// ══════════════════════════════════════════════════════════
// 1. Transmit latch
// ══════════════════════════════════════════════════════════

#[test]
fn writes_accumulate_in_the_output_buffer() {
    let mut bus = Bus::new();
    bus.map(UART_BASE, Box::new(Uart::new(ByteOrder::Big))).unwrap();

    for &b in b"Hi" {
        bus.write_u32(UART_BASE + REG_DATA, u32::from(b)).unwrap();
    }

    let (_, region) = bus.memory(UART_BASE);
    let uart = region.as_uart_mut().expect("uart downcast");
    assert_eq!(uart.output(), b"Hi");
    assert_eq!(uart.take_output(), b"Hi");
    assert!(uart.output().is_empty());
}

#[test]
fn only_the_low_byte_is_latched() {
    let mut uart = Uart::new(ByteOrder::Big);
    uart.write_u32(REG_DATA, 0x1234_5641).unwrap();
    assert_eq!(uart.output(), b"A");
}

#[test]
fn status_read_reports_transmit_ready() {
    let mut bus = Bus::new();
    bus.map(UART_BASE, Box::new(Uart::new(ByteOrder::Big))).unwrap();
    assert_eq!(bus.read_u32(UART_BASE + REG_DATA).unwrap(), 0x100);
}

#[test]
fn every_access_reaches_the_device() {
    // no caching on the bus: two writes produce two latched bytes
    let mut bus = Bus::new();
    bus.map(UART_BASE, Box::new(Uart::new(ByteOrder::Big))).unwrap();
    bus.write_u32(UART_BASE + REG_DATA, u32::from(b'a')).unwrap();
    bus.write_u32(UART_BASE + REG_DATA, u32::from(b'a')).unwrap();

    let (_, region) = bus.memory(UART_BASE);
    assert_eq!(region.as_uart_mut().expect("uart downcast").output(), b"aa");
}

// ══════════════════════════════════════════════════════════
// 2. Region surface
// ══════════════════════════════════════════════════════════

#[test]
fn uart_reports_io_kind() {
    let uart = Uart::new(ByteOrder::Big);
    assert_eq!(uart.kind(), MemoryKind::Io);
    assert_eq!(uart.size(), 0x1000);
    assert_eq!(uart.byte_order(), ByteOrder::Big);
}

#[test]
fn unimplemented_widths_are_bus_errors() {
    let mut bus = Bus::new();
    bus.map(UART_BASE, Box::new(Uart::new(ByteOrder::Big))).unwrap();

    assert_eq!(
        bus.read_u8(UART_BASE + REG_DATA),
        Err(MemError::Bus { op: BusOp::Read, width: 1, addr: REG_DATA })
    );
    assert_eq!(
        bus.write_u16(UART_BASE + REG_DATA, 0),
        Err(MemError::Bus { op: BusOp::Write, width: 2, addr: REG_DATA })
    );
    assert_eq!(
        bus.read_u64(UART_BASE),
        Err(MemError::Bus { op: BusOp::Read, width: 8, addr: 0 })
    );
}

#[test]
fn access_past_the_window_is_a_page_error() {
    let mut uart = Uart::new(ByteOrder::Big);
    assert_eq!(uart.read_u32(0xFFD), Err(MemError::Page));
    assert_eq!(uart.write_u32(0xFFE, 0), Err(MemError::Page));
}

// ══════════════════════════════════════════════════════════
// 3. Latching MMIO stub
// ══════════════════════════════════════════════════════════

#[test]
fn latch_observes_each_write_and_reads_back_the_latest() {
    let mut bus = Bus::new();
    bus.map(0, mirv_core::mem::new_ram(0x80000, ByteOrder::Little)).unwrap();
    bus.map(0x80000, Box::new(Latch::new(0x1000))).unwrap();

    bus.write_u32(0x80000, 0x1111_1111).unwrap();
    bus.write_u32(0x80000, 0x2222_2222).unwrap();
    assert_eq!(bus.read_u32(0x80000).unwrap(), 0x2222_2222);

    // RAM accesses in between do not disturb the device
    bus.write_u32(0x100, 0x3333_3333).unwrap();
    assert_eq!(bus.read_u32(0x80000).unwrap(), 0x2222_2222);
}

#[test]
fn latch_records_every_write_in_order() {
    let mut latch = Latch::new(0x1000);
    latch.write_u32(0, 0xAAAA_AAAA).unwrap();
    latch.write_u32(0, 0xBBBB_BBBB).unwrap();
    assert_eq!(latch.writes, vec![0xAAAA_AAAA, 0xBBBB_BBBB]);
    assert_eq!(latch.read_u32(0).unwrap(), 0xBBBB_BBBB);
}
