//! Socket helpers.

use std::io;
use std::net::SocketAddr;

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;

/// Bind a UDP socket for the trap listener.
///
/// IPv6 binds are dual-stack (`[::]:162` also receives IPv4 traps).
/// `SO_REUSEADDR` is set so a restarted listener can rebind the trap port
/// immediately. The receive buffer is a request; the kernel may cap it at
/// `net.core.rmem_max`, which is not treated as an error.
pub(crate) async fn bind_udp_socket(
    addr: SocketAddr,
    recv_buffer_size: Option<usize>,
) -> io::Result<UdpSocket> {
    let domain = match addr {
        SocketAddr::V4(_) => Domain::IPV4,
        SocketAddr::V6(_) => Domain::IPV6,
    };
    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;

    if addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_reuse_address(true)?;

    if let Some(size) = recv_buffer_size
        && let Err(e) = socket.set_recv_buffer_size(size)
    {
        tracing::debug!(target: "snmp_watch::trap", { size, error = %e }, "receive buffer size not applied");
    }

    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    UdpSocket::from_std(socket.into())
}
