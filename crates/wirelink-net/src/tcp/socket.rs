//! Exclusive owner of a raw IPv4 stream socket.

use std::io;
use std::mem;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::os::fd::RawFd;
use std::sync::atomic::{AtomicI32, Ordering};
use std::time::Duration;

use wirelink_core::logging::targets;

use crate::dns::Endpoint;

macro_rules! syscall {
    ($fn: ident ( $($arg: expr),* $(,)* ) ) => {{
        #[allow(unused_unsafe)]
        let res = unsafe { libc::$fn($($arg, )*) };
        if res == -1 {
            Err(std::io::Error::last_os_error())
        } else {
            Ok(res)
        }
    }};
}

/// Descriptor value marking a released handle.
const INVALID_FD: RawFd = -1;

#[cfg(any(target_os = "linux", target_os = "android"))]
const SEND_FLAGS: libc::c_int = libc::MSG_NOSIGNAL;
#[cfg(not(any(target_os = "linux", target_os = "android")))]
const SEND_FLAGS: libc::c_int = 0;

/// Owns one socket descriptor and releases it exactly once.
///
/// The descriptor is swapped out atomically on [`close`](Self::close), so a
/// second close (or any later operation) fails with `EBADF` instead of
/// touching a descriptor number the OS may have handed out again.
#[derive(Debug)]
pub(crate) struct SocketHandle {
    fd: AtomicI32,
}

impl SocketHandle {
    /// Create a blocking IPv4 stream socket.
    pub(crate) fn new_stream() -> io::Result<Self> {
        #[cfg(any(target_os = "linux", target_os = "android"))]
        let ty = libc::SOCK_STREAM | libc::SOCK_CLOEXEC;
        #[cfg(not(any(target_os = "linux", target_os = "android")))]
        let ty = libc::SOCK_STREAM;

        let fd = syscall!(socket(libc::AF_INET, ty, 0))?;
        let handle = Self {
            fd: AtomicI32::new(fd),
        };
        handle.disable_sigpipe()?;
        tracing::debug!(target: targets::TCP, fd, "socket created");
        Ok(handle)
    }

    /// The live descriptor, or `EBADF` once released.
    fn raw(&self) -> io::Result<RawFd> {
        match self.fd.load(Ordering::SeqCst) {
            INVALID_FD => Err(io::Error::from_raw_os_error(libc::EBADF)),
            fd => Ok(fd),
        }
    }

    /// Whether the descriptor has not been released yet.
    pub(crate) fn is_open(&self) -> bool {
        self.fd.load(Ordering::SeqCst) != INVALID_FD
    }

    /// Bind to `port` on the wildcard address.
    pub(crate) fn bind_local_port(&self, port: u16) -> io::Result<()> {
        let addr = into_sockaddr(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port));
        syscall!(bind(
            self.raw()?,
            &addr as *const libc::sockaddr_in as *const libc::sockaddr,
            mem::size_of::<libc::sockaddr_in>() as libc::socklen_t,
        ))
        .map(drop)
    }

    /// Perform the blocking connect handshake.
    pub(crate) fn connect(&self, endpoint: Endpoint) -> io::Result<()> {
        let addr = into_sockaddr(endpoint.socket_addr());
        syscall!(connect(
            self.raw()?,
            &addr as *const libc::sockaddr_in as *const libc::sockaddr,
            mem::size_of::<libc::sockaddr_in>() as libc::socklen_t,
        ))
        .map(drop)
    }

    /// Enable or disable `TCP_NODELAY`.
    pub(crate) fn set_nodelay(&self, enabled: bool) -> io::Result<()> {
        self.set_int_option(libc::IPPROTO_TCP, libc::TCP_NODELAY, enabled as libc::c_int)
    }

    /// Enable or disable `SO_KEEPALIVE`.
    pub(crate) fn set_keepalive(&self, enabled: bool) -> io::Result<()> {
        self.set_int_option(libc::SOL_SOCKET, libc::SO_KEEPALIVE, enabled as libc::c_int)
    }

    fn set_int_option(&self, level: libc::c_int, name: libc::c_int, value: libc::c_int) -> io::Result<()> {
        syscall!(setsockopt(
            self.raw()?,
            level,
            name,
            &value as *const libc::c_int as *const libc::c_void,
            mem::size_of::<libc::c_int>() as libc::socklen_t,
        ))
        .map(drop)
    }

    /// Writes are reported through `send` errors, never through `SIGPIPE`.
    /// Linux passes `MSG_NOSIGNAL` per call instead.
    fn disable_sigpipe(&self) -> io::Result<()> {
        #[cfg(any(
            target_os = "freebsd",
            target_os = "netbsd",
            target_os = "dragonfly",
            target_vendor = "apple"
        ))]
        self.set_int_option(libc::SOL_SOCKET, libc::SO_NOSIGPIPE, 1)?;

        Ok(())
    }

    /// One blocking `send(2)`; returns the number of bytes written.
    pub(crate) fn send(&self, buf: &[u8]) -> io::Result<usize> {
        let sent = syscall!(send(
            self.raw()?,
            buf.as_ptr() as *const libc::c_void,
            buf.len(),
            SEND_FLAGS,
        ))?;
        Ok(sent as usize)
    }

    /// One `recv(2)` into `buf`; `Ok(0)` means the peer closed.
    pub(crate) fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        let received = syscall!(recv(
            self.raw()?,
            buf.as_mut_ptr() as *mut libc::c_void,
            buf.len(),
            0,
        ))?;
        Ok(received as usize)
    }

    /// Wait up to `timeout` for the socket to become readable.
    ///
    /// Returns `Ok(false)` on timeout. Hang-up and error conditions count as
    /// readable so the following `recv` reports them.
    pub(crate) fn wait_readable(&self, timeout: Duration) -> io::Result<bool> {
        let mut pollfd = libc::pollfd {
            fd: self.raw()?,
            events: libc::POLLIN,
            revents: 0,
        };
        let timeout_ms = timeout.as_millis().clamp(1, libc::c_int::MAX as u128) as libc::c_int;

        let ready = syscall!(poll(&mut pollfd, 1, timeout_ms))?;
        if ready > 0 && pollfd.revents & libc::POLLNVAL != 0 {
            return Err(io::Error::from_raw_os_error(libc::EBADF));
        }
        Ok(ready > 0)
    }

    /// The local address the socket is bound to.
    pub(crate) fn local_addr(&self) -> io::Result<SocketAddrV4> {
        let fd = self.raw()?;
        sockname(|addr, len| unsafe { libc::getsockname(fd, addr, len) })
    }

    /// The address of the connected peer.
    pub(crate) fn peer_addr(&self) -> io::Result<SocketAddrV4> {
        let fd = self.raw()?;
        sockname(|addr, len| unsafe { libc::getpeername(fd, addr, len) })
    }

    /// Release the descriptor.
    ///
    /// Only the first call reaches the OS; later calls fail with `EBADF`.
    pub(crate) fn close(&self) -> io::Result<()> {
        let fd = self.fd.swap(INVALID_FD, Ordering::SeqCst);
        if fd == INVALID_FD {
            return Err(io::Error::from_raw_os_error(libc::EBADF));
        }
        tracing::debug!(target: targets::TCP, fd, "closing socket");
        syscall!(close(fd)).map(drop)
    }
}

impl Drop for SocketHandle {
    fn drop(&mut self) {
        if self.is_open()
            && let Err(e) = self.close()
        {
            tracing::warn!(target: targets::TCP, error = %e, "failed to release socket on drop");
        }
    }
}

fn into_sockaddr(addr: SocketAddrV4) -> libc::sockaddr_in {
    // SAFETY: sockaddr_in is a C struct with primitive integer fields.
    // Zero-initialization is safe - all fields accept zero as a valid value.
    let mut raw: libc::sockaddr_in = unsafe { mem::zeroed() };

    #[cfg(any(
        target_os = "macos",
        target_os = "ios",
        target_os = "freebsd",
        target_os = "openbsd",
        target_os = "netbsd",
        target_os = "dragonfly"
    ))]
    {
        raw.sin_len = mem::size_of::<libc::sockaddr_in>() as u8;
    }
    raw.sin_family = libc::AF_INET as libc::sa_family_t;
    raw.sin_port = addr.port().to_be();
    raw.sin_addr = libc::in_addr {
        s_addr: u32::from(*addr.ip()).to_be(),
    };
    raw
}

fn sockname<F>(query: F) -> io::Result<SocketAddrV4>
where
    F: FnOnce(*mut libc::sockaddr, *mut libc::socklen_t) -> libc::c_int,
{
    // SAFETY: zeroed sockaddr_in is valid; the kernel fills at most `len` bytes.
    let mut raw: libc::sockaddr_in = unsafe { mem::zeroed() };
    let mut len = mem::size_of::<libc::sockaddr_in>() as libc::socklen_t;

    let addr = &mut raw as *mut libc::sockaddr_in as *mut libc::sockaddr;
    if query(addr, &mut len as *mut libc::socklen_t) == -1 {
        return Err(io::Error::last_os_error());
    }
    if raw.sin_family != libc::AF_INET as libc::sa_family_t {
        return Err(io::Error::from_raw_os_error(libc::EAFNOSUPPORT));
    }

    let ip = Ipv4Addr::from(u32::from_be(raw.sin_addr.s_addr));
    Ok(SocketAddrV4::new(ip, u16::from_be(raw.sin_port)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::net::TcpListener;

    fn connected_pair() -> (SocketHandle, std::net::TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let socket = SocketHandle::new_stream().unwrap();
        socket
            .connect(Endpoint::new(Ipv4Addr::LOCALHOST, port))
            .unwrap();
        let (peer, _) = listener.accept().unwrap();
        (socket, peer)
    }

    #[test]
    fn test_double_close_fails_with_ebadf() {
        let socket = SocketHandle::new_stream().unwrap();
        assert!(socket.is_open());

        socket.close().unwrap();
        assert!(!socket.is_open());

        let err = socket.close().unwrap_err();
        assert_eq!(err.raw_os_error(), Some(libc::EBADF));
    }

    #[test]
    fn test_operations_after_close_fail() {
        let socket = SocketHandle::new_stream().unwrap();
        socket.close().unwrap();

        assert!(socket.send(b"x").is_err());
        assert!(socket.recv(&mut [0u8; 4]).is_err());
        assert!(socket.wait_readable(Duration::from_millis(1)).is_err());
        assert!(socket.bind_local_port(0).is_err());
    }

    #[test]
    fn test_wait_readable_times_out_then_sees_data() {
        let (socket, mut peer) = connected_pair();

        assert!(!socket.wait_readable(Duration::from_millis(20)).unwrap());

        peer.write_all(b"ping").unwrap();
        assert!(socket.wait_readable(Duration::from_secs(5)).unwrap());

        let mut buf = [0u8; 16];
        let n = socket.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"ping");
    }

    #[test]
    fn test_recv_returns_zero_on_peer_close() {
        let (socket, peer) = connected_pair();
        drop(peer);

        assert!(socket.wait_readable(Duration::from_secs(5)).unwrap());
        assert_eq!(socket.recv(&mut [0u8; 16]).unwrap(), 0);
    }

    #[test]
    fn test_addresses_after_connect() {
        let (socket, peer) = connected_pair();

        let local = socket.local_addr().unwrap();
        let remote = socket.peer_addr().unwrap();
        assert_eq!(*local.ip(), Ipv4Addr::LOCALHOST);
        assert_eq!(std::net::SocketAddr::V4(local), peer.peer_addr().unwrap());
        assert_eq!(std::net::SocketAddr::V4(remote), peer.local_addr().unwrap());
    }

    #[test]
    fn test_socket_options() {
        let (socket, _peer) = connected_pair();
        socket.set_nodelay(true).unwrap();
        socket.set_keepalive(true).unwrap();
    }
}
