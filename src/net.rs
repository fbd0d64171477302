use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::io;
use std::net::{SocketAddr, UdpSocket};

/// Creates a non-blocking UDP socket bound to `addr`
///
/// With `reuse_address` a restarted server can rebind its port right away.
pub fn bind_udp(addr: SocketAddr, reuse_address: bool) -> io::Result<UdpSocket> {
    let socket = Socket::new(Domain::for_address(addr), Type::DGRAM, Some(Protocol::UDP))?;
    if reuse_address {
        socket.set_reuse_address(true)?;
    }
    if addr.is_ipv6() {
        socket.set_only_v6(true)?;
    }
    socket.set_nonblocking(true)?;

    socket.bind(&SockAddr::from(addr))?;
    Ok(socket.into())
}
