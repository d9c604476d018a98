use std::io;
use std::os::fd::RawFd;
use std::time::Duration;

/// Waits until `fd` is readable or `timeout` elapses.
///
/// Returns `Ok(true)` when the descriptor is ready (this includes hang-up,
/// so the following read observes EOF) and `Ok(false)` on timeout.
/// Interrupted waits are retried.
pub fn wait_readable(fd: RawFd, timeout: Duration) -> io::Result<bool> {
    let timeout_ms = timeout.as_millis().min(i32::MAX as u128) as libc::c_int;

    let mut poll_fd = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };

    loop {
        // SAFETY: `poll_fd` lives on this stack frame for the whole call and
        // the count passed is exactly one entry.
        let rc = unsafe { libc::poll(&mut poll_fd, 1, timeout_ms) };
        if rc < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err);
        }
        if rc > 0 && poll_fd.revents & libc::POLLNVAL != 0 {
            return Err(io::Error::from_raw_os_error(libc::EBADF));
        }
        return Ok(rc > 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::net::{TcpListener, TcpStream};
    use std::os::fd::AsRawFd;

    #[test]
    fn times_out_without_data_then_sees_it() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let mut client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
        let (server, _) = listener.accept().unwrap();

        let ready = wait_readable(server.as_raw_fd(), Duration::from_millis(50)).unwrap();
        assert!(!ready);

        client.write_all(b"x").unwrap();
        let ready = wait_readable(server.as_raw_fd(), Duration::from_secs(2)).unwrap();
        assert!(ready);
    }
}
