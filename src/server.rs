use futures_util::future::{BoxFuture, FutureExt};
use log::{debug, trace, warn};
use std::collections::HashMap;
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Arc, PoisonError, RwLock};

use tokio::runtime::Handle;

use crate::dns_parser::{self, Class, Packet, Question, Type};
use crate::fsm::{Commands, Handler, Outgoing, FSM};
use crate::message::{build_answer, DnsQuestion};
use crate::{net, DEFAULT_TTL, DNS_PORT};

/// The future that drives a [`DnsServer`]'s socket
pub type ServerTask = BoxFuture<'static, ()>;

/// Decides the address a query is answered with
pub trait DnsServerListener: Send + Sync {
    fn on_resolve_dns_host(&self, client: SocketAddr, question: &DnsQuestion) -> Ipv4Addr;
}

impl<F> DnsServerListener for F
where
    F: Fn(SocketAddr, &DnsQuestion) -> Ipv4Addr + Send + Sync,
{
    fn on_resolve_dns_host(&self, client: SocketAddr, question: &DnsQuestion) -> Ipv4Addr {
        self(client, question)
    }
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// TTL of every answer, in seconds
    pub ttl: u32,
    /// Initial host table
    pub hosts: Vec<(String, Ipv4Addr)>,
}

impl Default for ServerConfig {
    fn default() -> ServerConfig {
        ServerConfig {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DNS_PORT)),
            ttl: DEFAULT_TTL,
            hosts: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(mut self, addr: SocketAddr) -> ServerConfig {
        self.bind_addr = addr;
        self
    }

    pub fn ttl(mut self, ttl: u32) -> ServerConfig {
        self.ttl = ttl;
        self
    }

    pub fn host<N: Into<String>>(mut self, name: N, address: Ipv4Addr) -> ServerConfig {
        self.hosts.push((name.into(), address));
        self
    }
}

/// Host names compare without case and without the root dot
fn normalize(name: &str) -> String {
    name.strip_suffix('.').unwrap_or(name).to_ascii_lowercase()
}

struct Shared {
    hosts: RwLock<HashMap<String, Ipv4Addr>>,
    listener: RwLock<Option<Arc<dyn DnsServerListener>>>,
}

impl Shared {
    fn resolve(&self, name: &str) -> Ipv4Addr {
        self.hosts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&normalize(name))
            .copied()
            .unwrap_or(Ipv4Addr::UNSPECIFIED)
    }

    fn listener(&self) -> Option<Arc<dyn DnsServerListener>> {
        self.listener
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

struct ServerHandler {
    shared: Arc<Shared>,
    ttl: u32,
}

impl Handler for ServerHandler {
    fn handle_packet(&mut self, packet: &[u8], addr: SocketAddr, outgoing: &mut Outgoing) {
        let packet = match Packet::parse(packet) {
            Ok(packet) => packet,
            Err(error) => {
                warn!("couldn't parse packet from {:?}: {}", addr, error);
                return;
            }
        };

        if packet.header.qr() {
            trace!("dropping response from {:?}", addr);
            return;
        }
        if packet.header.truncated() {
            debug!("dropping truncated query from {:?}", addr);
            return;
        }
        let question = match packet.questions.first() {
            Some(question) => question,
            None => {
                debug!("dropping query without a question from {:?}", addr);
                return;
            }
        };

        let id = packet.header.id();
        let address = match self.shared.listener() {
            Some(listener) => {
                listener.on_resolve_dns_host(addr, &DnsQuestion::new(id, question.qname.as_str()))
            }
            None => self.shared.resolve(&question.qname),
        };
        trace!("{} for {:?} resolves to {}", question.qname, addr, address);

        match build_answer(id, question, self.ttl, address) {
            Ok(response) => outgoing.push_back((response, addr)),
            Err(error) => warn!("couldn't answer {} from {:?}: {}", id, addr, error),
        }
    }
}

/// An address-only DNS server answering each query with one `A` record
///
/// Names are looked up in a host table unless a listener is installed.
/// Dropping the server stops its socket task.
pub struct DnsServer {
    commands: Commands,
    shared: Arc<Shared>,
    ttl: u32,
    local_addr: SocketAddr,
}

impl DnsServer {
    /// Starts a server on its own thread
    pub fn new(config: ServerConfig) -> io::Result<DnsServer> {
        crate::spawn_thread("dns-server", move || Self::with_default_handle(config))
    }

    /// Starts a server on an existing runtime
    pub fn spawn(handle: &Handle, config: ServerConfig) -> io::Result<DnsServer> {
        let _guard = handle.enter();
        let (server, task) = Self::with_default_handle(config)?;
        handle.spawn(task);
        Ok(server)
    }

    /// Creates a server and the task driving it, leaving the task to the caller
    ///
    /// Will panic if called from outside the context of a runtime.
    pub fn with_default_handle(config: ServerConfig) -> io::Result<(DnsServer, ServerTask)> {
        let socket = net::bind_udp(config.bind_addr, true)?;
        let local_addr = socket.local_addr()?;

        let hosts = config
            .hosts
            .iter()
            .map(|(name, address)| (normalize(name), *address))
            .collect();
        let shared = Arc::new(Shared {
            hosts: RwLock::new(hosts),
            listener: RwLock::new(None),
        });

        let handler = ServerHandler {
            shared: shared.clone(),
            ttl: config.ttl,
        };
        let (fsm, tx) = FSM::new(socket, handler)?;
        debug!("dns server bound to {:?}", local_addr);

        let server = DnsServer {
            commands: Commands::new(tx),
            shared,
            ttl: config.ttl,
            local_addr,
        };
        Ok((server, fsm.boxed()))
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn add_host(&self, name: &str, address: Ipv4Addr) {
        self.shared
            .hosts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(normalize(name), address);
    }

    pub fn remove_host(&self, name: &str) -> Option<Ipv4Addr> {
        self.shared
            .hosts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&normalize(name))
    }

    /// Routes every query through `listener` instead of the host table
    pub fn set_listener<L>(&self, listener: L)
    where
        L: DnsServerListener + 'static,
    {
        *self
            .shared
            .listener
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(listener));
    }

    pub fn clear_listener(&self) {
        *self
            .shared
            .listener
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Looks `name` up in the host table; unknown names map to `0.0.0.0`
    pub fn resolve_dns_host(&self, name: &str) -> Ipv4Addr {
        self.shared.resolve(name)
    }

    /// Sends an unprompted answer for `question` to `client`
    pub fn send_answer(
        &self,
        client: SocketAddr,
        question: &DnsQuestion,
        address: Ipv4Addr,
    ) -> Result<(), dns_parser::Error> {
        let q = Question::new(question.name.as_str(), Type::A, Class::IN);
        let packet = build_answer(question.id, &q, self.ttl, address)?;
        self.commands.send(packet, client);
        Ok(())
    }

    /// Stops the socket task; safe to call more than once
    pub fn release(&self) {
        self.commands.release();
    }
}

impl Drop for DnsServer {
    fn drop(&mut self) {
        self.release();
    }
}
