use std::net::{Ipv4Addr, SocketAddr};

use udns::{DnsServer, ServerConfig};

pub fn main() {
    env_logger::init();

    let bind_addr: SocketAddr = "127.0.0.1:5353".parse().unwrap();
    let server = DnsServer::new(
        ServerConfig::default()
            .bind_addr(bind_addr)
            .host("router.lan", Ipv4Addr::new(192, 168, 1, 1))
            .host("printer.lan", Ipv4Addr::new(192, 168, 1, 20)),
    )
    .unwrap();
    println!("serving on {}", server.local_addr());

    loop {
        ::std::thread::sleep(::std::time::Duration::from_secs(10));
    }
}
