use futures_util::future::{BoxFuture, FutureExt};
use log::{debug, trace, warn};
use rand::{thread_rng, Rng};
use std::collections::HashSet;
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;

use tokio::runtime::Handle;

use crate::dns_parser::{self, Header, Packet};
use crate::fsm::{Commands, Handler, Outgoing, FSM};
use crate::message::{build_query, DnsAnswer, DnsQuestion};
use crate::{net, DNS_PORT};

/// The future that drives a [`DnsClient`]'s socket
pub type ClientTask = BoxFuture<'static, ()>;

/// Receives the answers a [`DnsClient`] gets back
///
/// Called on the client's socket task, one datagram at a time.
pub trait DnsClientListener: Send + Sync {
    fn on_dns_answer(&self, server: SocketAddr, answer: &DnsAnswer);
}

impl<F> DnsClientListener for F
where
    F: Fn(SocketAddr, &DnsAnswer) + Send + Sync,
{
    fn on_dns_answer(&self, server: SocketAddr, answer: &DnsAnswer) {
        self(server, answer)
    }
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Local address of the client socket
    pub bind_addr: SocketAddr,
    /// Only deliver responses whose id matches a query still in flight
    pub correlate_ids: bool,
}

impl Default for ClientConfig {
    fn default() -> ClientConfig {
        ClientConfig {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
            correlate_ids: false,
        }
    }
}

impl ClientConfig {
    pub fn bind_addr(mut self, addr: SocketAddr) -> ClientConfig {
        self.bind_addr = addr;
        self
    }

    pub fn correlate_ids(mut self, correlate: bool) -> ClientConfig {
        self.correlate_ids = correlate;
        self
    }
}

struct ClientHandler {
    listener: Arc<dyn DnsClientListener>,
    /// ids of queries in flight, when correlating
    pending: Option<HashSet<u16>>,
}

impl Handler for ClientHandler {
    fn on_send(&mut self, packet: &[u8]) {
        if let (Some(pending), Ok(header)) = (self.pending.as_mut(), Header::new_checked(packet)) {
            pending.insert(header.id());
        }
    }

    fn handle_packet(&mut self, packet: &[u8], addr: SocketAddr, _outgoing: &mut Outgoing) {
        let packet = match Packet::parse(packet) {
            Ok(packet) => packet,
            Err(error) => {
                warn!("couldn't parse packet from {:?}: {}", addr, error);
                return;
            }
        };

        if !packet.header.qr() {
            trace!("dropping query from {:?}", addr);
            return;
        }

        let id = packet.header.id();
        if let Some(pending) = self.pending.as_mut() {
            if !pending.remove(&id) {
                debug!("dropping unsolicited response {} from {:?}", id, addr);
                return;
            }
        }

        match DnsAnswer::from_packet(&packet) {
            Ok(answer) => {
                debug!(
                    "answer {} from {:?}: {} addresses, {} aliases, {} name servers",
                    id,
                    addr,
                    answer.addresses.len(),
                    answer.aliases.len(),
                    answer.name_servers.len()
                );
                self.listener.on_dns_answer(addr, &answer);
            }
            Err(error) => warn!("malformed answer {} from {:?}: {}", id, addr, error),
        }
    }
}

/// A resolver client sending single-question queries over UDP
///
/// Answers are handed to the listener given at construction. Dropping the
/// client stops its socket task.
pub struct DnsClient {
    commands: Commands,
    last_id: AtomicU16,
    local_addr: SocketAddr,
}

impl DnsClient {
    /// Starts a client on its own thread
    pub fn new<L>(config: ClientConfig, listener: L) -> io::Result<DnsClient>
    where
        L: DnsClientListener + 'static,
    {
        crate::spawn_thread("dns-client", move || {
            Self::with_default_handle(config, listener)
        })
    }

    /// Starts a client on an existing runtime
    pub fn spawn<L>(handle: &Handle, config: ClientConfig, listener: L) -> io::Result<DnsClient>
    where
        L: DnsClientListener + 'static,
    {
        let _guard = handle.enter();
        let (client, task) = Self::with_default_handle(config, listener)?;
        handle.spawn(task);
        Ok(client)
    }

    /// Creates a client and the task driving it, leaving the task to the caller
    ///
    /// Will panic if called from outside the context of a runtime.
    pub fn with_default_handle<L>(
        config: ClientConfig,
        listener: L,
    ) -> io::Result<(DnsClient, ClientTask)>
    where
        L: DnsClientListener + 'static,
    {
        let socket = net::bind_udp(config.bind_addr, false)?;
        let local_addr = socket.local_addr()?;

        let handler = ClientHandler {
            listener: Arc::new(listener),
            pending: if config.correlate_ids {
                Some(HashSet::new())
            } else {
                None
            },
        };
        let (fsm, tx) = FSM::new(socket, handler)?;
        debug!("dns client bound to {:?}", local_addr);

        let client = DnsClient {
            commands: Commands::new(tx),
            last_id: AtomicU16::new(thread_rng().gen()),
            local_addr,
        };
        Ok((client, fsm.boxed()))
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Allocates a transaction id, wrapping at 16 bits
    pub fn next_id(&self) -> u16 {
        self.last_id.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }

    /// Sends `question` to `server` under the question's own id
    ///
    /// Fails only if the query cannot be encoded. After `release` this does
    /// nothing.
    pub fn send_question(
        &self,
        server: SocketAddr,
        question: &DnsQuestion,
    ) -> Result<(), dns_parser::Error> {
        let packet = build_query(question.id, &question.name)?;
        trace!("query {} for {} to {:?}", question.id, question.name, server);
        self.commands.send(packet, server);
        Ok(())
    }

    /// Asks `server_ip` on the DNS port for the address of `host`
    ///
    /// Returns the id the query was sent with.
    pub fn send_question_to_host(
        &self,
        server_ip: Ipv4Addr,
        host: &str,
    ) -> Result<u16, dns_parser::Error> {
        let question = DnsQuestion::new(self.next_id(), host);
        self.send_question(SocketAddr::from((server_ip, DNS_PORT)), &question)?;
        Ok(question.id)
    }

    /// Stops the socket task; safe to call more than once
    pub fn release(&self) {
        self.commands.release();
    }
}

impl Drop for DnsClient {
    fn drop(&mut self) {
        self.release();
    }
}
