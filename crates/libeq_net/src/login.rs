//! The login namespace ("LM"): chat-message retrieval, credential
//! exchange, server-list lookup, and the handoff into a world server.

use std::net::ToSocketAddrs;
use std::path::PathBuf;

use libeq_wld::cursor::Cursor;

use crate::app::AppClient;
use crate::error::Error;
use crate::message::{Format, Message, Namespace, ParamValue, Schedule};

pub const CHAT_MESSAGE_REQUEST: u16 = 0x01;
pub const LOGIN_REQUEST: u16 = 0x02;
pub const UNKNOWN_REQUEST: u16 = 0x03;
pub const SERVER_LIST_REQUEST: u16 = 0x04;
pub const PLAY_REQUEST: u16 = 0x0d;
pub const CHAT_MESSAGE_RESPONSE: u16 = 0x16;
pub const LOGIN_RESPONSE: u16 = 0x17;
pub const SERVER_LIST_RESPONSE: u16 = 0x18;
pub const PLAY_RESPONSE: u16 = 0x21;

/// `PlayResponse.Status` values observed from live servers.
pub mod play_status {
    pub const ALLOWED: u16 = 101;
    pub const WORLD_FULL: u16 = 303;
    pub const DENIED: u16 = 326;
    pub const SUSPENDED: u16 = 337;
    pub const BANNED: u16 = 338;
}

const LOGIN_RESPONSE_SCHEDULE: Schedule = &[
    ("Status", Format::U32),
    ("UnknownA", Format::U32),
    ("UserID", Format::I32),
    ("Key", Format::Raw(16)),
    ("FailedAttempts", Format::U32),
];

const PLAY_RESPONSE_SCHEDULE: Schedule = &[
    ("Sequence", Format::U32),
    ("UnknownA", Format::Raw(6)),
    ("Allowed", Format::U8),
    ("Status", Format::U16),
    ("UnknownB", Format::Raw(3)),
    ("ServerID", Format::U32),
];

/// The `Schedule` a login message type implies, for callers (the offline
/// packet inspector) that only have the raw type and body, not an
/// in-progress `begin`/`end` exchange to tell them which one to expect.
pub fn schedule_for(msg_type: u16) -> Schedule {
    match msg_type {
        LOGIN_RESPONSE => LOGIN_RESPONSE_SCHEDULE,
        PLAY_RESPONSE => PLAY_RESPONSE_SCHEDULE,
        _ => &[],
    }
}

pub fn name_for(msg_type: u16) -> Option<&'static str> {
    match msg_type {
        CHAT_MESSAGE_REQUEST => Some("ChatMessageRequest"),
        LOGIN_REQUEST => Some("LoginRequest"),
        UNKNOWN_REQUEST => Some("UnknownRequest"),
        SERVER_LIST_REQUEST => Some("ServerListRequest"),
        PLAY_REQUEST => Some("PlayRequest"),
        CHAT_MESSAGE_RESPONSE => Some("ChatMessageResponse"),
        LOGIN_RESPONSE => Some("LoginResponse"),
        SERVER_LIST_RESPONSE => Some("ServerListResponse"),
        PLAY_RESPONSE => Some("PlayResponse"),
        _ => None,
    }
}

/// One row of a `ServerListResponse` body.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerListing {
    pub host: String,
    pub server_type: u32,
    pub runtime_id: u32,
    pub name: String,
    pub locale: (String, String),
    pub status: u32,
    pub players: u32,
}

pub struct LoginClient {
    app: AppClient,
}

impl LoginClient {
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self, Error> {
        Ok(LoginClient {
            app: AppClient::connect(addr, Namespace::Login, false)?,
        })
    }

    pub fn begin_get_chat_message(&mut self) -> Result<(), Error> {
        self.app.send(Message::new(Namespace::Login, CHAT_MESSAGE_REQUEST))
    }

    pub fn end_get_chat_message(&mut self) -> Result<Vec<u8>, Error> {
        let msg = self.app.receive(&[])?;
        Ok(msg.body.unwrap_or_default())
    }

    /// Three leading params (`UnknownA=3:u32, UnknownB=2:u32, UnknownC=0:u16`,
    /// a 10-byte preamble) followed by a body of
    /// `password + "\0" + user + "\0" + padding`, the padding chosen so the
    /// packet's total length lands on `20 + 8k` bytes with at least one
    /// trailing NUL.
    pub fn begin_login(&mut self, user: &str, password: &str) -> Result<(), Error> {
        let mut msg = Message::new(Namespace::Login, LOGIN_REQUEST);
        msg.push("UnknownA", ParamValue::U32(3));
        msg.push("UnknownB", ParamValue::U32(2));
        msg.push("UnknownC", ParamValue::U16(0));
        msg.body = Some(login_request_body(user, password));
        self.app.send(msg)
    }

    /// `(success, user_id, session_key)`. `success` requires `Status == 1`
    /// and a `UserID` other than `-1`.
    pub fn end_login(&mut self) -> Result<(bool, i32, Vec<u8>), Error> {
        let msg = self.app.receive(LOGIN_RESPONSE_SCHEDULE)?;
        let status = msg.get_u32("Status").unwrap_or(0);
        let user_id = match msg.get("UserID") {
            Some(ParamValue::I32(v)) => *v,
            _ => 0,
        };
        let key = match msg.get("Key") {
            Some(ParamValue::Raw(bytes)) => bytes.clone(),
            _ => Vec::new(),
        };
        let success = status == 1 && user_id != -1;
        Ok((success, user_id, key))
    }

    pub fn begin_list_servers(&mut self) -> Result<(), Error> {
        self.app.send(Message::new(Namespace::Login, SERVER_LIST_REQUEST))
    }

    pub fn end_list_servers(&mut self) -> Result<Vec<ServerListing>, Error> {
        let msg = self.app.receive(&[])?;
        let body = msg.body.unwrap_or_default();
        parse_server_listings(&body)
    }

    pub fn begin_play(&mut self, server_id: u32, sequence: u32) -> Result<(), Error> {
        let mut msg = Message::new(Namespace::Login, PLAY_REQUEST);
        msg.push("ServerID", ParamValue::U32(server_id));
        msg.push("Sequence", ParamValue::U32(sequence));
        self.app.send(msg)
    }

    /// `(allowed, status, server_id, sequence)`.
    pub fn end_play(&mut self) -> Result<(bool, u16, u32, u32), Error> {
        let msg = self.app.receive(PLAY_RESPONSE_SCHEDULE)?;
        let allowed = matches!(msg.get("Allowed"), Some(ParamValue::U8(1)));
        let status = msg.get_u16("Status").unwrap_or(0);
        let server_id = msg.get_u32("ServerID").unwrap_or(0);
        let sequence = msg.get_u32("Sequence").unwrap_or(0);
        Ok((allowed, status, server_id, sequence))
    }

    pub fn disconnect(&mut self) -> Result<(), Error> {
        self.app.disconnect()
    }

    pub fn enable_packet_dump(&mut self, dir: PathBuf) -> Result<(), Error> {
        self.app.enable_packet_dump(dir)
    }
}

fn login_request_body(user: &str, password: &str) -> Vec<u8> {
    let packet_size = password.len() + user.len() + 14;
    let mut allowed_size = 20;
    while allowed_size < packet_size {
        allowed_size += 8;
    }
    let padding = allowed_size - packet_size + 1;

    let mut body = Vec::with_capacity(password.len() + 1 + user.len() + padding);
    body.extend_from_slice(password.as_bytes());
    body.push(0);
    body.extend_from_slice(user.as_bytes());
    body.extend(std::iter::repeat(0u8).take(padding));
    body
}

fn parse_server_listings(body: &[u8]) -> Result<Vec<ServerListing>, Error> {
    let mut cursor = Cursor::new(body);
    let mut out = Vec::new();
    while !cursor.is_empty() {
        let host = cursor.cstring()?;
        let server_type = cursor.u32_le()?;
        let runtime_id = cursor.u32_le()?;
        let name = cursor.cstring()?;
        let locale1 = cursor.cstring()?;
        let locale2 = cursor.cstring()?;
        let status = cursor.u32_le()?;
        let players = cursor.u32_le()?;
        out.push(ServerListing {
            host,
            server_type,
            runtime_id,
            name,
            locale: (locale1, locale2),
            status,
            players,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_request_body_pads_to_a_multiple_of_eight_plus_twenty() {
        let body = login_request_body("user", "password");
        let packet_size = "password".len() + "user".len() + 14;
        let mut allowed_size = 20;
        while allowed_size < packet_size {
            allowed_size += 8;
        }
        assert_eq!(body.last(), Some(&0));
        assert!(body.ends_with(&vec![0u8; allowed_size - packet_size + 1]));
    }

    #[test]
    fn login_request_body_separates_password_and_username_with_a_nul() {
        let body = login_request_body("bob", "hunter2");
        let joined = String::from_utf8(body[..11].to_vec()).unwrap();
        assert_eq!(joined, "hunter2\0bob");
    }

    #[test]
    fn login_request_serializes_to_a_total_length_of_20_plus_8k() {
        let mut msg = Message::new(Namespace::Login, LOGIN_REQUEST);
        msg.push("UnknownA", ParamValue::U32(3));
        msg.push("UnknownB", ParamValue::U32(2));
        msg.push("UnknownC", ParamValue::U16(0));
        msg.body = Some(login_request_body("user", "password"));

        let serialized = msg.serialize();
        assert_eq!((serialized.len() - 20) % 8, 0);
    }

    #[test]
    fn server_listing_parses_one_record() {
        let mut body = b"srv1\0".to_vec();
        body.extend_from_slice(&1u32.to_le_bytes());
        body.extend_from_slice(&10u32.to_le_bytes());
        body.extend_from_slice(b"Name\0");
        body.extend_from_slice(b"US\0");
        body.extend_from_slice(b"en\0");
        body.extend_from_slice(&1u32.to_le_bytes());
        body.extend_from_slice(&5u32.to_le_bytes());

        let servers = parse_server_listings(&body).unwrap();
        assert_eq!(servers.len(), 1);
        assert_eq!(servers[0].host, "srv1");
        assert_eq!(servers[0].server_type, 1);
        assert_eq!(servers[0].runtime_id, 10);
        assert_eq!(servers[0].name, "Name");
        assert_eq!(servers[0].locale, ("US".to_string(), "en".to_string()));
        assert_eq!(servers[0].status, 1);
        assert_eq!(servers[0].players, 5);
    }
}
