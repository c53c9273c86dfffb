//! TCP/DNS adapter over `std::net`.
//!
//! Implements [`NetStack`] and [`Connection`].  On ESP-IDF `std::net` sits
//! on lwIP, so the same code runs on target and host.
//!
//! Every blocking call is bounded by the timeout passed to
//! [`NetStack::open`]; an expired timeout maps to
//! [`UploadError::Timeout`] whatever the phase.

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use log::debug;

use crate::app::ports::{Connection, NetStack};
use crate::error::UploadError;

/// `std::net` backed network stack.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdNetStack;

impl StdNetStack {
    pub fn new() -> Self {
        Self
    }
}

fn is_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock)
}

fn classify(e: &io::Error, otherwise: UploadError) -> UploadError {
    if is_timeout(e) {
        UploadError::Timeout
    } else {
        otherwise
    }
}

impl NetStack for StdNetStack {
    type Conn = TcpConnection;

    fn resolve(&mut self, host: &str, port: u16) -> Result<SocketAddr, UploadError> {
        (host, port)
            .to_socket_addrs()
            .map_err(|e| {
                debug!("net: resolve {} failed: {}", host, e);
                UploadError::Resolve
            })?
            .next()
            .ok_or(UploadError::Resolve)
    }

    fn open(&mut self, addr: SocketAddr, timeout_ms: u32) -> Result<TcpConnection, UploadError> {
        let timeout = Duration::from_millis(u64::from(timeout_ms.max(1)));
        let stream = TcpStream::connect_timeout(&addr, timeout).map_err(|e| {
            debug!("net: connect {} failed: {}", addr, e);
            classify(&e, UploadError::Connect)
        })?;
        stream
            .set_read_timeout(Some(timeout))
            .map_err(|_| UploadError::Connect)?;
        stream
            .set_write_timeout(Some(timeout))
            .map_err(|_| UploadError::Connect)?;
        Ok(TcpConnection {
            stream: Some(stream),
        })
    }
}

/// One TCP stream.  Dropped (and therefore closed) by [`Connection::close`].
pub struct TcpConnection {
    stream: Option<TcpStream>,
}

impl TcpConnection {
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }
}

impl Connection for TcpConnection {
    fn send_all(&mut self, data: &[u8]) -> Result<(), UploadError> {
        let stream = self.stream.as_mut().ok_or(UploadError::Send)?;
        stream
            .write_all(data)
            .map_err(|e| classify(&e, UploadError::Send))
    }

    fn recv(&mut self, buf: &mut [u8]) -> Result<usize, UploadError> {
        let stream = self.stream.as_mut().ok_or(UploadError::Receive)?;
        stream.read(buf).map_err(|e| classify(&e, UploadError::Receive))
    }

    fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
    }
}
