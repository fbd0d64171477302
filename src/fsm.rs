use log::{debug, trace, warn};
use std::collections::VecDeque;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use tokio::{io::ReadBuf, net::UdpSocket, sync::mpsc};

/// Largest datagram the socket tasks accept
const RECV_BUF_SIZE: usize = 65536;

pub type Outgoing = VecDeque<(Vec<u8>, SocketAddr)>;

#[derive(Clone, Debug)]
pub enum Command {
    Send { packet: Vec<u8>, addr: SocketAddr },
    Shutdown,
}

/// What a socket task does with the datagrams passing through it
pub trait Handler {
    /// Sees every datagram a handle queues, before it is sent
    fn on_send(&mut self, _packet: &[u8]) {}

    /// Handles one received datagram; replies go to `outgoing`
    ///
    /// `packet` lives in the task's receive buffer and is overwritten by the
    /// next datagram.
    fn handle_packet(&mut self, packet: &[u8], addr: SocketAddr, outgoing: &mut Outgoing);
}

/// A UDP socket driven as a future, one datagram at a time
pub struct FSM<H> {
    socket: UdpSocket,
    handler: H,
    commands: mpsc::UnboundedReceiver<Command>,
    outgoing: Outgoing,
    recv_buf: Vec<u8>,
}

impl<H: Handler> FSM<H> {
    // Will panic if called from outside the context of a runtime
    pub fn new(
        socket: std::net::UdpSocket,
        handler: H,
    ) -> io::Result<(FSM<H>, mpsc::UnboundedSender<Command>)> {
        let socket = UdpSocket::from_std(socket)?;

        let (tx, rx) = mpsc::unbounded_channel();

        let fsm = FSM {
            socket,
            handler,
            commands: rx,
            outgoing: VecDeque::new(),
            recv_buf: vec![0u8; RECV_BUF_SIZE],
        };

        Ok((fsm, tx))
    }

    fn recv_packets(&mut self, cx: &mut Context) {
        loop {
            let mut buf = ReadBuf::new(&mut self.recv_buf);
            let addr = match self.socket.poll_recv_from(cx, &mut buf) {
                Poll::Ready(Ok(addr)) => addr,
                Poll::Ready(Err(err)) => {
                    // nothing was received; try again on the next poll
                    debug!("error receiving packet: {}", err);
                    cx.waker().wake_by_ref();
                    break;
                }
                Poll::Pending => break,
            };
            let len = buf.filled().len();

            trace!("received {} bytes from {:?}", len, addr);
            self.handler
                .handle_packet(&self.recv_buf[..len], addr, &mut self.outgoing);
        }
    }

    fn send_packets(&mut self, cx: &mut Context) {
        while let Some((response, addr)) = self.outgoing.pop_front() {
            trace!("sending packet to {:?}", addr);

            match self.socket.poll_send_to(cx, &response, addr) {
                Poll::Ready(Ok(bytes_sent)) if bytes_sent == response.len() => (),
                Poll::Ready(Ok(_)) => warn!("failed to send entire packet"),
                Poll::Ready(Err(err)) => warn!("error sending packet to {:?}: {}", addr, err),
                Poll::Pending => {
                    self.outgoing.push_front((response, addr));
                    break;
                }
            }
        }
    }
}

impl<H: Handler + Unpin> Future for FSM<H> {
    type Output = ();
    fn poll(self: Pin<&mut Self>, cx: &mut Context) -> Poll<()> {
        let pinned = Pin::get_mut(self);
        while let Poll::Ready(cmd) = pinned.commands.poll_recv(cx) {
            match cmd {
                Some(Command::Shutdown) => return Poll::Ready(()),
                Some(Command::Send { packet, addr }) => {
                    pinned.handler.on_send(&packet);
                    pinned.outgoing.push_back((packet, addr));
                }
                None => {
                    warn!("socket task handle dropped without shutdown");
                    return Poll::Ready(());
                }
            }
        }

        pinned.recv_packets(cx);
        pinned.send_packets(cx);

        Poll::Pending
    }
}

/// The handle side of a socket task
#[derive(Debug)]
pub struct Commands {
    tx: mpsc::UnboundedSender<Command>,
    released: AtomicBool,
}

impl Commands {
    pub fn new(tx: mpsc::UnboundedSender<Command>) -> Commands {
        Commands {
            tx,
            released: AtomicBool::new(false),
        }
    }

    /// Queues `packet` for `addr`; does nothing once released
    pub fn send(&self, packet: Vec<u8>, addr: SocketAddr) {
        if self.is_released() {
            trace!("not sending to {:?}: released", addr);
            return;
        }
        if self.tx.send(Command::Send { packet, addr }).is_err() {
            debug!("not sending to {:?}: socket task is gone", addr);
        }
    }

    /// Stops the socket task; only the first call has an effect
    pub fn release(&self) {
        if !self.released.swap(true, Ordering::SeqCst) {
            if self.tx.send(Command::Shutdown).is_err() {
                trace!("socket task already stopped");
            }
        }
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_is_idempotent() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let commands = Commands::new(tx);
        let addr: SocketAddr = "127.0.0.1:53".parse().unwrap();

        commands.send(vec![1, 2, 3], addr);
        commands.release();
        commands.release();
        commands.send(vec![4], addr);
        assert!(commands.is_released());

        match rx.try_recv() {
            Ok(Command::Send { packet, .. }) => assert_eq!(packet, vec![1, 2, 3]),
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(matches!(rx.try_recv(), Ok(Command::Shutdown)));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn send_after_task_is_gone() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let commands = Commands::new(tx);
        commands.send(vec![1], "127.0.0.1:53".parse().unwrap());
        commands.release();
    }
}
