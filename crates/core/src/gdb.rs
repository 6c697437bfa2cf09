//! Stub GDB remote agent.
//!
//! Accepts TCP connections on a background thread and drains them without
//! performing any protocol work. The agent never touches bus or CPU state;
//! it exists so a debugger can connect while the remote protocol is being
//! brought up.

use std::io::{self, Read};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;

/// Starts a background GDB agent listening on `addr` (e.g. `"127.0.0.1:0"`).
///
/// Returns the bound socket address. The accept loop runs on a detached
/// thread for the lifetime of the process; each connection is drained until
/// the peer closes it.
pub fn start_agent(addr: &str) -> io::Result<SocketAddr> {
    let listener = TcpListener::bind(addr)?;
    let local = listener.local_addr()?;

    thread::spawn(move || {
        for conn in listener.incoming() {
            match conn {
                Ok(stream) => {
                    thread::spawn(move || {
                        let _ = drain(stream);
                    });
                }
                Err(_) => return,
            }
        }
    });

    Ok(local)
}

fn drain(mut stream: TcpStream) -> io::Result<()> {
    let mut buf = [0u8; 512];
    loop {
        if stream.read(&mut buf)? == 0 {
            return Ok(());
        }
    }
}
