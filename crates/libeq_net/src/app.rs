//! The application framing shared by the login and world clients: wraps
//! outgoing messages as `AppPacket` bodies, and reassembles `Fragment`
//! trains transparently before handing a decoded application message back
//! to the caller.

use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;

use crate::error::Error;
use crate::message::{Message, Namespace, Schedule};
use crate::session::{FragmentState, SessionClient, SessionOpcode, APPPACKET};

pub struct AppClient {
    session: SessionClient,
    ns: Namespace,
    fragments: FragmentState,
}

impl AppClient {
    pub fn connect(addr: impl ToSocketAddrs, ns: Namespace, compressed: bool) -> Result<Self, Error> {
        let remote = resolve(addr)?;
        let session = SessionClient::connect(remote, compressed)?;
        Ok(AppClient {
            session,
            ns,
            fragments: FragmentState::new(),
        })
    }

    /// Wrap `msg`'s serialized bytes as an `AppPacket` body and send it.
    pub fn send(&mut self, msg: Message) -> Result<(), Error> {
        let mut carrier = Message::new(Namespace::Session, APPPACKET);
        carrier.body = Some(msg.serialize());
        self.session.send(carrier)
    }

    /// Block until a complete application message arrives, decoding it
    /// against `schedule`. Fragment trains are reassembled transparently.
    pub fn receive(&mut self, schedule: Schedule) -> Result<Message, Error> {
        loop {
            let sm = self.session.receive()?;
            match SessionOpcode::from_u16(sm.msg_type) {
                SessionOpcode::AppPacket => {
                    let body = sm.body.unwrap_or_default();
                    return Message::parse(self.ns, schedule, &body);
                }
                SessionOpcode::Fragment => {
                    let body = sm.body.unwrap_or_default();
                    if let Some(payload) = self.fragments.push(&body)? {
                        return Message::parse(self.ns, schedule, &payload);
                    }
                }
                other => {
                    return Err(Error::Protocol(format!(
                        "unexpected session message {other:?} while awaiting an application reply"
                    )));
                }
            }
        }
    }

    pub fn disconnect(&mut self) -> Result<(), Error> {
        self.session.disconnect()
    }

    pub fn enable_packet_dump(&mut self, dir: PathBuf) -> Result<(), Error> {
        self.session.enable_packet_dump(dir)
    }
}

fn resolve(addr: impl ToSocketAddrs) -> Result<SocketAddr, Error> {
    addr.to_socket_addrs()?
        .next()
        .ok_or_else(|| Error::Protocol("address did not resolve to anything".to_string()))
}
