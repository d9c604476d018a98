use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener};
use std::os::fd::AsRawFd;
use std::time::Duration;

use socket2::{Domain, Protocol, Socket, Type};
use tracing::{debug, error, info};

use crate::error::ErrorCode;
use crate::server::connection::{AddressFamily, Connection};
use crate::server::poll;

/// How long one accept call waits before reporting [`ErrorCode::Timeout`].
pub const ACCEPT_TIMEOUT: Duration = Duration::from_secs(60);

/// The listening socket.
pub struct Acceptor {
    listener: TcpListener,
    family: AddressFamily,
}

impl Acceptor {
    /// Creates, binds and listens on the wildcard address of the requested
    /// family. `backlog` is the listen queue length.
    pub fn bind_and_listen(port: u16, ipv4: bool, backlog: usize) -> Result<Self, ErrorCode> {
        let addr: SocketAddr = if ipv4 {
            (Ipv4Addr::UNSPECIFIED, port).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, port).into()
        };
        Self::bind_addr(addr, backlog)
    }

    /// Same as [`bind_and_listen`](Self::bind_and_listen) for an explicit
    /// local address.
    pub fn bind_addr(addr: SocketAddr, backlog: usize) -> Result<Self, ErrorCode> {
        let domain = if addr.is_ipv4() {
            Domain::IPV4
        } else {
            Domain::IPV6
        };

        let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP)).map_err(|e| {
            error!(error = %e, "socket() failed");
            ErrorCode::CreateSocket(e)
        })?;
        // Restarting the server should not wait out TIME_WAIT.
        socket
            .set_reuse_address(true)
            .map_err(ErrorCode::CreateSocket)?;

        socket.bind(&addr.into()).map_err(|e| {
            error!(%addr, error = %e, "bind() failed");
            ErrorCode::SocketNotBound(e)
        })?;

        let backlog = backlog.clamp(1, i32::MAX as usize) as i32;
        socket.listen(backlog).map_err(|e| {
            error!(%addr, backlog, error = %e, "listen() failed");
            ErrorCode::ListenToSocket(e)
        })?;

        let listener: TcpListener = socket.into();
        info!(%addr, "Listening");

        Ok(Self {
            listener,
            family: AddressFamily::of(&addr),
        })
    }

    /// Waits up to `timeout` for a client.
    ///
    /// The wait is a readiness poll rather than a blocking `accept`, so the
    /// caller gets control back regularly and can recheck its running flag.
    pub fn accept(&self, timeout: Duration) -> Result<Connection, ErrorCode> {
        if !poll::wait_readable(self.listener.as_raw_fd(), timeout)? {
            return Err(ErrorCode::Timeout);
        }

        let (stream, peer) = self.listener.accept().map_err(|e| {
            error!(error = %e, "accept() failed");
            ErrorCode::AcceptConnection(e)
        })?;

        let conn = Connection::new(stream, peer);
        debug!(
            peer = %conn.peer_addr(),
            family = %conn.family(),
            fd = conn.info().fd,
            "Connection accepted"
        );
        Ok(conn)
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ErrorCode> {
        Ok(self.listener.local_addr()?)
    }

    pub fn family(&self) -> AddressFamily {
        self.family
    }
}
