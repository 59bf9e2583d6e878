//! The reliable-UDP session layer ("SM") that carries the login and world
//! application substreams.
//!
//! [`SessionClient`] owns a single blocking `UdpSocket`. It handles the
//! handshake, per-direction sequencing and acknowledgement, `Combined`
//! packet unwrapping, the CRC-32 trailer, and optional zlib compression.
//! Fragment *reassembly* is tracked here too (via [`FragmentState`]) since
//! both a live session and the offline packet inspector need the same
//! accumulation logic.

use std::collections::VecDeque;
use std::io::{Read, Write};
use std::net::{SocketAddr, UdpSocket};
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use rand::Rng;

use crate::error::Error;
use crate::message::{Format, Message, Namespace, ParamValue, Schedule};

pub const SR: u16 = 0x01;
pub const SRESP: u16 = 0x02;
pub const COMBINED: u16 = 0x03;
pub const DISCONNECT: u16 = 0x05;
pub const KEEPALIVE: u16 = 0x06;
pub const APPPACKET: u16 = 0x09;
pub const FRAGMENT: u16 = 0x0d;
pub const ACK: u16 = 0x15;

const COMPRESSED_FLAG: u8 = 0x5A;
const UNCOMPRESSED_FLAG: u8 = 0xA5;
const COMPRESSION_THRESHOLD: usize = 10;

/// Every session message type this crate knows by name, plus a catch-all
/// for opcodes observed on the wire (`OutOfOrderAck`, `OutOfSession`, …)
/// that this crate doesn't give a full meaning to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOpcode {
    SessionRequest,
    SessionResponse,
    Combined,
    Disconnect,
    KeepAlive,
    AppPacket,
    Fragment,
    Ack,
    Other(u16),
}

impl SessionOpcode {
    pub fn from_u16(t: u16) -> Self {
        match t {
            SR => Self::SessionRequest,
            SRESP => Self::SessionResponse,
            COMBINED => Self::Combined,
            DISCONNECT => Self::Disconnect,
            KEEPALIVE => Self::KeepAlive,
            APPPACKET => Self::AppPacket,
            FRAGMENT => Self::Fragment,
            ACK => Self::Ack,
            other => Self::Other(other),
        }
    }

    pub fn to_u16(self) -> u16 {
        match self {
            Self::SessionRequest => SR,
            Self::SessionResponse => SRESP,
            Self::Combined => COMBINED,
            Self::Disconnect => DISCONNECT,
            Self::KeepAlive => KEEPALIVE,
            Self::AppPacket => APPPACKET,
            Self::Fragment => FRAGMENT,
            Self::Ack => ACK,
            Self::Other(t) => t,
        }
    }

    fn has_seq_num(self) -> bool {
        matches!(self, Self::AppPacket | Self::Fragment | Self::Ack)
    }

    fn carries_crc(self) -> bool {
        !matches!(self, Self::SessionRequest | Self::SessionResponse)
    }

    pub fn name(self) -> Option<&'static str> {
        match self {
            Self::SessionRequest => Some("SessionRequest"),
            Self::SessionResponse => Some("SessionResponse"),
            Self::Combined => Some("Combined"),
            Self::Disconnect => Some("Disconnect"),
            Self::KeepAlive => Some("KeepAlive"),
            Self::AppPacket => Some("AppPacket"),
            Self::Fragment => Some("Fragment"),
            Self::Ack => Some("Ack"),
            Self::Other(_) => None,
        }
    }
}

const SESSION_RESPONSE_SCHEDULE: Schedule = &[
    ("Session", Format::U32),
    ("Key", Format::U32),
    ("UnknownA", Format::U8),
    ("Format", Format::U8),
    ("UnknownB", Format::U8),
    ("MaxLength", Format::U32),
    ("UnknownC", Format::U32),
];

const SEQ_NUM_SCHEDULE: Schedule = &[("SeqNum", Format::U16)];

pub fn schedule_for(opcode: SessionOpcode) -> Schedule {
    match opcode {
        SessionOpcode::SessionResponse => SESSION_RESPONSE_SCHEDULE,
        op if op.has_seq_num() => SEQ_NUM_SCHEDULE,
        _ => &[],
    }
}

/// Accumulates a `Fragment` train's body into one reassembled application
/// payload. The first fragment's body starts with a big-endian `u32`
/// total size; every fragment after that is raw payload.
#[derive(Debug, Default)]
pub struct FragmentState {
    total_size: Option<usize>,
    buffer: Vec<u8>,
}

impl FragmentState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        self.total_size.is_none()
    }

    /// Feed one `Fragment` message's body. Returns the reassembled payload
    /// once the running total reaches the announced size.
    pub fn push(&mut self, body: &[u8]) -> Result<Option<Vec<u8>>, Error> {
        if self.total_size.is_none() {
            if body.len() < 4 {
                return Err(Error::Truncated);
            }
            let total = u32::from_be_bytes(body[0..4].try_into().unwrap());
            self.total_size = Some(total as usize);
            self.buffer.extend_from_slice(&body[4..]);
        } else {
            self.buffer.extend_from_slice(body);
        }

        let total = self.total_size.unwrap();
        if self.buffer.len() >= total {
            self.total_size = None;
            Ok(Some(std::mem::take(&mut self.buffer)))
        } else {
            Ok(None)
        }
    }
}

/// A handshaken, CRC-seeded reliable session over a UDP socket.
pub struct SessionClient {
    socket: UdpSocket,
    remote: SocketAddr,
    session_id: u32,
    crc_key: u32,
    compressed: bool,
    next_seq_in: u16,
    next_seq_out: u16,
    next_ack_in: u16,
    pending: VecDeque<(Vec<u8>, bool)>,
    dump_dir: Option<PathBuf>,
    dump_seq: u64,
}

impl SessionClient {
    /// Perform the `SR`/`SResp` handshake against `remote` and adopt the
    /// server's key as the CRC base. `compressed` selects whether
    /// subsequent traffic is zlib-wrapped (world = true, login = false).
    pub fn connect(remote: SocketAddr, compressed: bool) -> Result<Self, Error> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.connect(remote)?;

        let session_id: u32 = rand::rng().random();

        let mut session = SessionClient {
            socket,
            remote,
            session_id,
            crc_key: 0,
            compressed: false,
            next_seq_in: 0,
            next_seq_out: 0,
            next_ack_in: 0,
            pending: VecDeque::new(),
            dump_dir: None,
            dump_seq: 0,
        };

        let mut request = Message::new(Namespace::Session, SR);
        request.push("UnknownA", ParamValue::U32(2));
        request.push("Session", ParamValue::U32(session_id));
        request.push("MaxLength", ParamValue::U32(0x200));
        session.send(request)?;

        let response = session.receive()?;
        if response.msg_type != SRESP {
            return Err(Error::BadHandshake);
        }
        if response.get_u32("Session") != Some(session_id) {
            return Err(Error::BadHandshake);
        }

        session.crc_key = response.get_u32("Key").ok_or(Error::BadHandshake)?;
        session.compressed = compressed;
        Ok(session)
    }

    /// Stamp a `SeqNum` if the message type requires one, serialize,
    /// compress, CRC, and send it.
    pub fn send(&mut self, mut msg: Message) -> Result<(), Error> {
        let opcode = SessionOpcode::from_u16(msg.msg_type);
        if opcode.has_seq_num() {
            msg.push("SeqNum", ParamValue::U16(self.next_seq_out));
            self.next_seq_out = self.next_seq_out.wrapping_add(1);
        }

        let packet = msg.serialize();
        let packet = self.encode_compression(opcode, packet);
        let packet = self.append_crc(opcode, packet);

        self.dump_packet(&packet, "out");
        self.socket.send_to(&packet, self.remote)?;
        Ok(())
    }

    /// Receive the next application-relevant message: acks are consumed
    /// and looped past, `Combined` packets are unwrapped and their
    /// sub-packets enqueued, and sequenced packets arriving out of order
    /// are silently dropped rather than reordered.
    pub fn receive(&mut self) -> Result<Message, Error> {
        loop {
            let (packet, unwrapped) = self.next_packet()?;
            let opcode = SessionOpcode::from_u16(peek_type(&packet)?);
            let msg = self.parse_packet(&packet, unwrapped)?;

            match opcode {
                SessionOpcode::Ack => {
                    let seq = msg.get_u16("SeqNum").ok_or_else(|| {
                        Error::Protocol("Ack carried no SeqNum".to_string())
                    })?;
                    if seq >= self.next_seq_out {
                        return Err(Error::Protocol(format!(
                            "ack for unsent sequence number {seq}"
                        )));
                    }
                    self.next_ack_in = seq.wrapping_add(1);
                    continue;
                }
                SessionOpcode::Combined => {
                    for sub in unpack_combined(msg.body.as_deref().unwrap_or(&[]))? {
                        self.pending.push_back((sub, true));
                    }
                    continue;
                }
                opcode if opcode.has_seq_num() => {
                    let seq = msg.get_u16("SeqNum").ok_or_else(|| {
                        Error::Protocol("sequenced message carried no SeqNum".to_string())
                    })?;
                    if seq != self.next_seq_in {
                        log::debug!("dropping out-of-order packet: seq {seq}, expected {}", self.next_seq_in);
                        continue;
                    }
                    self.send_ack(seq)?;
                    self.next_seq_in = self.next_seq_in.wrapping_add(1);
                    return Ok(msg);
                }
                _ => return Ok(msg),
            }
        }
    }

    pub fn session_id(&self) -> u32 {
        self.session_id
    }

    /// Write every raw datagram this session sends or receives to `dir`,
    /// named `packet_<kind>_<timestamp>_<direction>` in capture order.
    pub fn enable_packet_dump(&mut self, dir: PathBuf) -> Result<(), Error> {
        std::fs::create_dir_all(&dir)?;
        self.dump_dir = Some(dir);
        Ok(())
    }

    fn dump_packet(&mut self, packet: &[u8], direction: &str) {
        let Some(dir) = &self.dump_dir else { return };
        let kind = peek_type(packet)
            .ok()
            .map(SessionOpcode::from_u16)
            .and_then(|op| op.name())
            .unwrap_or("Unknown");
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros())
            .unwrap_or(0);
        self.dump_seq += 1;
        let path = dir.join(format!(
            "packet_{kind}_{timestamp}_{direction}_{:06}",
            self.dump_seq
        ));
        if let Err(e) = std::fs::write(&path, packet) {
            log::warn!("failed to write packet dump {}: {e}", path.display());
        }
    }

    /// Send the `Disconnect` handshake teardown. Always attempted
    /// best-effort; closure of the underlying socket is left to `Drop`.
    pub fn disconnect(&mut self) -> Result<(), Error> {
        let mut msg = Message::new(Namespace::Session, DISCONNECT);
        msg.push("Session", ParamValue::U32(self.session_id));
        msg.push("UnknownA", ParamValue::U16(6));
        self.send(msg)
    }

    pub fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<(), Error> {
        self.socket.set_read_timeout(timeout)?;
        Ok(())
    }

    fn send_ack(&mut self, seq: u16) -> Result<(), Error> {
        let mut ack = Message::new(Namespace::Session, ACK);
        ack.push("SeqNum", ParamValue::U16(seq));
        self.send(ack)
    }

    fn next_packet(&mut self) -> Result<(Vec<u8>, bool), Error> {
        if let Some(pending) = self.pending.pop_front() {
            return Ok(pending);
        }
        let mut buf = [0u8; 2048];
        let len = match self.socket.recv(&mut buf) {
            Ok(len) => len,
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => return Err(Error::Timeout),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => return Err(Error::Timeout),
            Err(e) => return Err(Error::Io(e)),
        };
        let packet = buf[..len].to_vec();
        self.dump_packet(&packet, "in");
        Ok((packet, false))
    }

    /// Parse one raw session packet: strip and validate the CRC trailer,
    /// strip and inflate the compression flag, then read the `Schedule`
    /// the `msg_type` implies. `unwrapped` packets (already-unwrapped
    /// `Combined` sub-packets) skip the CRC strip.
    fn parse_packet(&self, packet: &[u8], unwrapped: bool) -> Result<Message, Error> {
        parse_packet_with(self.crc_key, self.compressed, packet, unwrapped)
    }

    fn encode_compression(&self, opcode: SessionOpcode, packet: Vec<u8>) -> Vec<u8> {
        if !self.compressed || is_handshake(opcode) {
            return packet;
        }
        let (header, payload) = packet.split_at(2);
        let mut out = header.to_vec();
        if payload.len() > COMPRESSION_THRESHOLD {
            out.push(COMPRESSED_FLAG);
            out.extend(deflate(payload));
        } else {
            out.push(UNCOMPRESSED_FLAG);
            out.extend_from_slice(payload);
        }
        out
    }

    fn append_crc(&self, opcode: SessionOpcode, mut packet: Vec<u8>) -> Vec<u8> {
        if opcode.carries_crc() {
            let trailer = self.crc16(&packet);
            packet.extend_from_slice(&trailer.to_be_bytes());
        }
        packet
    }

    /// `crc32(u32_le(crc_key) ++ bytes)`, truncated to its low 16 bits.
    /// Writing that truncation big-endian on the wire is what the source
    /// calls "byte-swapping" it; the byte order the result serializes in
    /// is the normative detail here, not the intermediate swap itself.
    fn crc16(&self, bytes: &[u8]) -> u16 {
        crc16_with(self.crc_key, bytes)
    }
}

/// A stand-in for [`SessionClient`] with no socket: parses raw datagrams
/// captured to disk against a configured `crc_key` and compression mode.
/// Used by the offline packet inspector.
pub struct PacketInspector {
    crc_key: u32,
    compressed: bool,
}

impl PacketInspector {
    pub fn new(crc_key: u32, compressed: bool) -> Self {
        PacketInspector { crc_key, compressed }
    }

    pub fn parse_packet(&self, packet: &[u8], unwrapped: bool) -> Result<Message, Error> {
        parse_packet_with(self.crc_key, self.compressed, packet, unwrapped)
    }
}

fn crc16_with(crc_key: u32, bytes: &[u8]) -> u16 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&crc_key.to_le_bytes());
    hasher.update(bytes);
    (hasher.finalize() & 0xFFFF) as u16
}

fn parse_packet_with(crc_key: u32, compressed: bool, packet: &[u8], unwrapped: bool) -> Result<Message, Error> {
    let opcode = SessionOpcode::from_u16(peek_type(packet)?);
    let carries_crc = opcode.carries_crc() && !unwrapped;

    let mut body_end = packet.len();
    if carries_crc {
        if packet.len() < 2 {
            return Err(Error::Truncated);
        }
        body_end -= 2;
        let received = u16::from_be_bytes([packet[body_end], packet[body_end + 1]]);
        let computed = crc16_with(crc_key, &packet[..body_end]);
        if received != 0 && received != computed {
            return Err(Error::BadCrc);
        }
    }

    let mut payload = packet[2..body_end].to_vec();
    if compressed && !unwrapped {
        let (flag, rest) = payload.split_first().ok_or(Error::Truncated)?;
        payload = match *flag {
            COMPRESSED_FLAG => inflate(rest)?,
            UNCOMPRESSED_FLAG => rest.to_vec(),
            other => return Err(Error::BadCompressionFlag(other)),
        };
    }

    let mut framed = Vec::with_capacity(2 + payload.len());
    framed.extend_from_slice(&packet[0..2]);
    framed.extend_from_slice(&payload);

    Message::parse(Namespace::Session, schedule_for(opcode), &framed)
}

fn is_handshake(opcode: SessionOpcode) -> bool {
    matches!(opcode, SessionOpcode::SessionRequest | SessionOpcode::SessionResponse)
}

fn peek_type(packet: &[u8]) -> Result<u16, Error> {
    let bytes: [u8; 2] = packet
        .get(0..2)
        .ok_or(Error::Truncated)?
        .try_into()
        .unwrap();
    Ok(u16::from_be_bytes(bytes))
}

/// Unwrap a `Combined` body: a `u8` length prefix followed by that many
/// bytes, repeated until the buffer is exhausted.
pub fn unpack_combined(body: &[u8]) -> Result<Vec<Vec<u8>>, Error> {
    let mut out = Vec::new();
    let mut pos = 0;
    while pos < body.len() {
        let len = body[pos] as usize;
        pos += 1;
        let end = pos.checked_add(len).filter(|&e| e <= body.len()).ok_or(Error::Truncated)?;
        out.push(body[pos..end].to_vec());
        pos = end;
    }
    Ok(out)
}

fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).expect("writing to an in-memory buffer cannot fail");
    encoder.finish().expect("writing to an in-memory buffer cannot fail")
}

fn inflate(data: &[u8]) -> Result<Vec<u8>, Error> {
    let mut out = Vec::new();
    ZlibDecoder::new(data).read_to_end(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combined_unwrapping_splits_on_length_prefix() {
        let body = [2u8, b'h', b'i', 3, b'b', b'y', b'e'];
        let parts = unpack_combined(&body).unwrap();
        assert_eq!(parts, vec![b"hi".to_vec(), b"bye".to_vec()]);
    }

    #[test]
    fn combined_unwrapping_fails_on_truncation() {
        let body = [5u8, b'h', b'i'];
        assert!(unpack_combined(&body).is_err());
    }

    #[test]
    fn fragment_state_reassembles_across_two_fragments() {
        let mut state = FragmentState::new();
        let mut first = 5u32.to_be_bytes().to_vec();
        first.extend_from_slice(b"ab");
        assert_eq!(state.push(&first).unwrap(), None);
        assert_eq!(state.push(b"cde").unwrap(), Some(b"abcde".to_vec()));
        assert!(state.is_idle());
    }

    #[test]
    fn fragment_state_completes_in_a_single_fragment() {
        let mut state = FragmentState::new();
        let mut body = 2u32.to_be_bytes().to_vec();
        body.extend_from_slice(b"ok");
        assert_eq!(state.push(&body).unwrap(), Some(b"ok".to_vec()));
    }

    #[test]
    fn opcode_round_trips_through_its_numeric_value() {
        for t in [SR, SRESP, COMBINED, DISCONNECT, KEEPALIVE, APPPACKET, FRAGMENT, ACK] {
            assert_eq!(SessionOpcode::from_u16(t).to_u16(), t);
        }
        assert_eq!(SessionOpcode::from_u16(0x11).name(), None);
    }

    #[test]
    fn packet_inspector_parses_a_keepalive_without_a_socket() {
        let msg = Message::new(Namespace::Session, KEEPALIVE);
        let packet = append_crc_for_test(0xABCD, msg.serialize());

        let inspector = PacketInspector::new(0xABCD, false);
        let parsed = inspector.parse_packet(&packet, false).unwrap();
        assert_eq!(parsed.msg_type, KEEPALIVE);
    }

    fn append_crc_for_test(crc_key: u32, mut packet: Vec<u8>) -> Vec<u8> {
        let trailer = crc16_with(crc_key, &packet);
        packet.extend_from_slice(&trailer.to_be_bytes());
        packet
    }
}
