//! A small UDP DNS client and address-only server
//!
//! [`dns_parser`] reads and writes RFC 1035 messages. [`DnsClient`] sends
//! single-question `A` queries and hands answers to a listener;
//! [`DnsServer`] answers queries from a host table or a listener.

use futures_util::future::BoxFuture;
use log::debug;
use std::io;
use std::sync::mpsc::sync_channel;
use std::thread;

pub mod dns_parser;

mod client;
mod fsm;
mod message;
mod net;
mod server;

pub use crate::client::{ClientConfig, ClientTask, DnsClient, DnsClientListener};
pub use crate::message::{
    build_answer, build_query, Address, Alias, AnswerQuestion, DnsAnswer, DnsQuestion, NameServer,
};
pub use crate::server::{DnsServer, DnsServerListener, ServerConfig, ServerTask};

pub const DNS_PORT: u16 = 53;
pub const DEFAULT_TTL: u32 = 60;

/// Runs an endpoint's task on a new thread with its own runtime
///
/// `setup` runs inside the runtime; its handle is passed back once the
/// socket is bound.
fn spawn_thread<T, F>(name: &str, setup: F) -> io::Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> io::Result<(T, BoxFuture<'static, ()>)> + Send + 'static,
{
    let (tx, rx) = sync_channel(0);

    thread::Builder::new()
        .name(name.to_owned())
        .spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(err) => {
                    let _ = tx.send(Err(err));
                    return;
                }
            };
            rt.block_on(async move {
                let task = match setup() {
                    Ok((endpoint, task)) => {
                        if tx.send(Ok(endpoint)).is_err() {
                            return;
                        }
                        task
                    }
                    Err(err) => {
                        let _ = tx.send(Err(err));
                        return;
                    }
                };
                task.await;
            });
            debug!("{} thread stopped", thread::current().name().unwrap_or("dns"));
        })?;

    rx.recv()
        .map_err(|_| io::Error::new(io::ErrorKind::Other, "endpoint thread exited early"))?
}
