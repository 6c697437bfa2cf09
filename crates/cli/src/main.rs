//! MIRV simulator CLI.
//!
//! This binary provides the entry point for running guest images. It performs:
//! 1. **Machine assembly:** Builds a bus from the configuration and maps the
//!    console UART.
//! 2. **Image loading:** Loads an ELF executable, auto-allocating RAM under
//!    its segments.
//! 3. **Execution:** Instantiates the CPU for the image's machine and loops
//!    on `step` until a breakpoint or a bus fault.

use clap::{Parser, Subcommand};
use std::{fs, process};

use mirv_core::config::Config;
use mirv_core::cpu::{Cpu, Zpu};
use mirv_core::devices::Uart;
use mirv_core::elf::{self, Machine};
use mirv_core::mem::Bus;
use mirv_core::{gdb, Address};

#[derive(Parser, Debug)]
#[command(
    name = "mirv",
    author,
    version,
    about = "Whole-system CPU simulator",
    long_about = "Load a statically linked ELF executable into a simulated machine and run it.\n\nExamples:\n  mirv run -f hello.elf\n  mirv run -f hello.elf --config machine.json\n  mirv run -f hello.elf --gdb 127.0.0.1:1234"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run an ELF executable until a breakpoint or bus fault.
    Run {
        /// ELF executable to load.
        #[arg(short, long)]
        file: String,

        /// Machine configuration (JSON).
        #[arg(long)]
        config: Option<String>,

        /// Listen address for the GDB stub (overrides the config).
        #[arg(long)]
        gdb: Option<String>,

        /// Total cycle budget (0 = run until breakpoint or fault).
        #[arg(long, default_value_t = 0)]
        cycles: u64,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { file, config, gdb, cycles } => cmd_run(&file, config, gdb, cycles),
    }
}

/// Loads the configuration file, or falls back to the defaults.
fn load_config(path: Option<String>) -> Config {
    let Some(path) = path else {
        return Config::default();
    };
    let text = fs::read_to_string(&path).unwrap_or_else(|e| {
        eprintln!("[!] FATAL: could not read config '{}': {}", path, e);
        process::exit(1);
    });
    Config::from_json(&text).unwrap_or_else(|e| {
        eprintln!("[!] FATAL: invalid config '{}': {}", path, e);
        process::exit(1);
    })
}

/// Builds the machine, loads the image, and runs it to completion.
fn cmd_run(file: &str, config: Option<String>, gdb_addr: Option<String>, cycles: u64) {
    let config = load_config(config);
    let sys = &config.system;

    let mut bus = Bus::with_page_size(sys.page_size);
    if let Err(e) = bus.map(sys.uart_base, Box::new(Uart::console(sys.ram_order))) {
        eprintln!("[!] FATAL: could not map UART at {:#x}: {}", sys.uart_base, e);
        process::exit(1);
    }

    let image = elf::load_with_order(&mut bus, file, sys.auto_alloc, sys.ram_order)
        .unwrap_or_else(|e| {
            eprintln!("[!] FATAL: could not load '{}': {}", file, e);
            process::exit(1);
        });
    println!("[Loader] {} entry {:#x}", image.arch, image.entry);

    if let Some(addr) = gdb_addr.or_else(|| sys.gdb_addr.clone()) {
        match gdb::start_agent(&addr) {
            Ok(local) => println!("[GDB] listening on {}", local),
            Err(e) => {
                eprintln!("[!] FATAL: could not start GDB agent on {}: {}", addr, e);
                process::exit(1);
            }
        }
    }

    if image.arch.machine != Machine::ZPU {
        eprintln!("[!] FATAL: no CPU model for machine '{}'", image.arch.machine);
        process::exit(1);
    }

    let mut cpu = Zpu::new(bus);
    cpu.reset();
    cpu.set_pc(image.entry);
    run_loop(&mut cpu, sys.step_cycles, cycles);
}

/// Loops on `step` until a breakpoint, a bus fault, or the cycle budget.
fn run_loop(cpu: &mut Zpu, step_cycles: u64, budget: u64) {
    let mut total: u64 = 0;
    loop {
        let batch = if budget == 0 {
            step_cycles
        } else {
            step_cycles.min(budget - total)
        };
        if batch == 0 {
            println!("[Sim] cycle budget exhausted after {} cycles", total);
            return;
        }

        let consumed = cpu.step(batch);
        total += consumed;

        if let Some(fault) = cpu.fault() {
            report_stop(cpu, total);
            eprintln!("[Sim] stopped on {}", fault);
            process::exit(1);
        }
        if consumed < batch {
            report_stop(cpu, total);
            println!("[Sim] breakpoint");
            return;
        }
    }
}

/// Prints the machine state at the point the run loop stopped.
fn report_stop(cpu: &Zpu, total: u64) {
    let pc: Address = cpu.pc();
    let sp: Address = cpu.sp();
    println!("[Sim] {} cycles, PC {:#010x}, SP {:#010x}", total, pc, sp);
}
