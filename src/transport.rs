//! UDP transport.
//!
//! A thin, synchronous wrapper over [`std::net::UdpSocket`]: `send` is a
//! fire-and-forget `sendto`, with no retry and no delivery confirmation.
//! This front-end never brings up an SCTP association — UDP framing is
//! preserved intentionally (see the design notes).

use crate::errors::VmscError;
use std::net::{SocketAddr, UdpSocket};
use tracing::{instrument, warn};

pub struct UdpTransport {
    socket: UdpSocket,
}

impl UdpTransport {
    /// Binds a UDP socket at `local_addr`.
    pub fn bind(local_addr: SocketAddr) -> Result<Self, VmscError> {
        let socket = UdpSocket::bind(local_addr)?;
        Ok(Self { socket })
    }

    /// Sends `payload` to `remote_addr`. Returns the number of bytes
    /// written; a short write is not retried.
    #[instrument(skip(self, payload))]
    pub fn send(&self, payload: &[u8], remote_addr: SocketAddr) -> Result<usize, VmscError> {
        let sent = self.socket.send_to(payload, remote_addr)?;
        if sent != payload.len() {
            warn!(sent, total = payload.len(), "short UDP write");
        }
        Ok(sent)
    }

    pub fn local_addr(&self) -> Result<SocketAddr, VmscError> {
        Ok(self.socket.local_addr()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_round_trips_over_loopback() {
        let sender = UdpTransport::bind("127.0.0.1:0".parse().unwrap()).unwrap();
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        let receiver_addr = receiver.local_addr().unwrap();

        let sent = sender.send(&[0xAA, 0xBB, 0xCC], receiver_addr).unwrap();
        assert_eq!(sent, 3);

        let mut buf = [0u8; 16];
        let (n, _) = receiver.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..n], &[0xAA, 0xBB, 0xCC]);
    }
}
