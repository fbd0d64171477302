use std::env;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::mpsc;
use std::time::Duration;

use udns::{ClientConfig, DnsAnswer, DnsClient};

pub fn main() {
    env_logger::init();

    let mut args = env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "example.com".to_owned());
    let server: Ipv4Addr = args
        .next()
        .map(|ip| ip.parse().expect("server must be an IPv4 address"))
        .unwrap_or(Ipv4Addr::new(8, 8, 8, 8));

    let (tx, rx) = mpsc::sync_channel(1);
    let client = DnsClient::new(
        ClientConfig::default().correlate_ids(true),
        move |_: SocketAddr, answer: &DnsAnswer| {
            let _ = tx.try_send(answer.clone());
        },
    )
    .unwrap();

    let id = client.send_question_to_host(server, &host).unwrap();
    match rx.recv_timeout(Duration::from_secs(5)) {
        Ok(answer) => {
            println!("answer {} for {}", id, host);
            for alias in &answer.aliases {
                println!("  {} is an alias for {}", alias.name, alias.alias);
            }
            for address in &answer.addresses {
                println!("  {} has address {}", address.name, address.address);
            }
            for ns in &answer.name_servers {
                println!("  {} name server {}", ns.name, ns.server);
            }
        }
        Err(_) => println!("no answer from {}", server),
    }
}
