use std::fmt;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::os::fd::{AsRawFd, RawFd};

use crate::error::ErrorCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressFamily {
    V4,
    V6,
}

impl AddressFamily {
    pub fn of(addr: &SocketAddr) -> Self {
        match addr {
            SocketAddr::V4(_) => AddressFamily::V4,
            SocketAddr::V6(_) => AddressFamily::V6,
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressFamily::V4 => f.write_str("ipv4"),
            AddressFamily::V6 => f.write_str("ipv6"),
        }
    }
}

/// An accepted client socket.
///
/// The connection owns its descriptor; dropping it closes the socket, so a
/// descriptor is closed exactly once by whoever holds the connection last.
#[derive(Debug)]
pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
}

/// Non-owning snapshot of a [`Connection`], as kept in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub fd: RawFd,
    pub peer: SocketAddr,
    pub family: AddressFamily,
}

impl Connection {
    pub fn new(stream: TcpStream, peer: SocketAddr) -> Self {
        Self { stream, peer }
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    pub fn family(&self) -> AddressFamily {
        AddressFamily::of(&self.peer)
    }

    pub fn info(&self) -> ConnectionInfo {
        ConnectionInfo {
            fd: self.stream.as_raw_fd(),
            peer: self.peer,
            family: self.family(),
        }
    }

    /// Reads whatever is available into `buf`.
    ///
    /// A zero-length read means the peer closed its side and is reported as
    /// [`ErrorCode::ClosedConnection`].
    pub fn recv(&mut self, buf: &mut [u8]) -> Result<usize, ErrorCode> {
        match self.stream.read(buf)? {
            0 => Err(ErrorCode::ClosedConnection),
            n => Ok(n),
        }
    }

    /// Writes the whole of `data`, retrying short writes.
    pub fn send_all(&mut self, data: &[u8]) -> Result<(), ErrorCode> {
        let mut written = 0;
        while written < data.len() {
            let n = self.stream.write(&data[written..])?;
            if n == 0 {
                return Err(ErrorCode::ClosedConnection);
            }
            written += n;
        }
        self.stream.flush()?;
        Ok(())
    }
}

impl AsRawFd for Connection {
    fn as_raw_fd(&self) -> RawFd {
        self.stream.as_raw_fd()
    }
}
