//! The world namespace ("WM"): the post-login handoff up to character
//! selection and the request to enter the world. `ZoneServerInfo` is
//! where this crate's scope ends — everything the zone server itself
//! speaks is out of scope.

use std::net::ToSocketAddrs;

use libeq_wld::cursor::Cursor;

use crate::app::AppClient;
use crate::error::Error;
use crate::message::{Message, Namespace, Schedule};

pub const SEND_LOGIN_INFO: u16 = 0x4dd0;
pub const GUILD_LIST: u16 = 0x6957;
pub const LOG_SERVER: u16 = 0x0fa6;
pub const APPROVE_WORLD: u16 = 0x3c25;
pub const ENTER_WORLD: u16 = 0x7cba;
pub const POST_ENTER_WORLD: u16 = 0x52a4;
pub const EXPANSION_INFO: u16 = 0x04ec;
pub const SEND_CHAR_INFO: u16 = 0x4513;
pub const MOTD: u16 = 0x024d;
pub const SET_CHAT_SERVER: u16 = 0x00d7;
pub const SET_CHAT_SERVER_2: u16 = 0x6536;

const LOGIN_INFO_HEADER_PAD: usize = 188;
const LOGIN_INFO_TOTAL_LEN: usize = 464;

/// World messages carry no declared `Schedule`; every one of them is read
/// out of its body with a `Cursor` instead. Offline callers still want a
/// uniform lookup, so this always answers the empty schedule.
pub fn schedule_for(_msg_type: u16) -> Schedule {
    &[]
}

pub fn name_for(msg_type: u16) -> Option<&'static str> {
    match msg_type {
        SEND_LOGIN_INFO => Some("SendLoginInfo"),
        GUILD_LIST => Some("GuildList"),
        LOG_SERVER => Some("LogServer"),
        APPROVE_WORLD => Some("ApproveWorld"),
        ENTER_WORLD => Some("EnterWorld"),
        POST_ENTER_WORLD => Some("PostEnterWorld"),
        EXPANSION_INFO => Some("ExpansionInfo"),
        SEND_CHAR_INFO => Some("SendCharInfo"),
        MOTD => Some("MOTD"),
        SET_CHAT_SERVER => Some("SetChatServer"),
        SET_CHAT_SERVER_2 => Some("SetChatServer2"),
        _ => None,
    }
}

/// One row of the post-login character list: name, level, class, race,
/// and zone. Fields beyond these are not read.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterInfo {
    pub name: String,
    pub level: u8,
    pub class: u32,
    pub race: u32,
    pub zone: u32,
}

pub struct WorldClient {
    app: AppClient,
}

impl WorldClient {
    pub fn connect(host: &str) -> Result<Self, Error> {
        Ok(WorldClient {
            app: AppClient::connect((host, 9000), Namespace::World, true)?,
        })
    }

    /// `SendLoginInfo`: body is `sequence_ascii + "\0" + session_key + "\0"`,
    /// zero-padded to 188 bytes, then one zoning-flag byte, then
    /// zero-padded to 464 bytes total.
    pub fn begin_login(&mut self, sequence: u32, session_key: &[u8], zoning: bool) -> Result<(), Error> {
        let mut body = sequence.to_string().into_bytes();
        body.push(0);
        body.extend_from_slice(session_key);
        body.push(0);
        body.resize(LOGIN_INFO_HEADER_PAD, 0);
        body.push(zoning as u8);
        body.resize(LOGIN_INFO_TOTAL_LEN, 0);

        let mut msg = Message::new(Namespace::World, SEND_LOGIN_INFO);
        msg.body = Some(body);
        self.app.send(msg)
    }

    /// Waits for `LogServer`, confirming the world server has picked up
    /// the session; the body carries no fields this crate decodes.
    pub fn end_login(&mut self) -> Result<(), Error> {
        self.app.receive(&[])?;
        Ok(())
    }

    /// No outbound message; marks the transition into character
    /// selection once `end_login` returns.
    pub fn begin_char_selection(&mut self) -> Result<(), Error> {
        Ok(())
    }

    /// Waits for `SendCharInfo` and decodes each character record until
    /// the body is exhausted.
    pub fn end_char_selection(&mut self) -> Result<Vec<CharacterInfo>, Error> {
        let msg = self.app.receive(&[])?;
        let body = msg.body.unwrap_or_default();
        parse_character_infos(&body)
    }

    pub fn begin_enter_world(&mut self, name: &str) -> Result<(), Error> {
        let mut msg = Message::new(Namespace::World, ENTER_WORLD);
        msg.body = Some([name.as_bytes(), &[0u8]].concat());
        self.app.send(msg)
    }

    pub fn disconnect(&mut self) -> Result<(), Error> {
        self.app.disconnect()
    }
}

fn parse_character_infos(body: &[u8]) -> Result<Vec<CharacterInfo>, Error> {
    let mut cursor = Cursor::new(body);
    let mut out = Vec::new();
    while !cursor.is_empty() {
        let name = cursor.cstring()?;
        let level = cursor.u8()?;
        let class = cursor.u32_le()?;
        let race = cursor.u32_le()?;
        let zone = cursor.u32_le()?;
        out.push(CharacterInfo {
            name,
            level,
            class,
            race,
            zone,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_info_body_is_464_bytes_with_zoning_byte_at_188() {
        let mut body = 7u32.to_string().into_bytes();
        body.push(0);
        body.extend_from_slice(&[0xAA; 16]);
        body.push(0);
        body.resize(LOGIN_INFO_HEADER_PAD, 0);
        body.push(1);
        body.resize(LOGIN_INFO_TOTAL_LEN, 0);

        assert_eq!(body.len(), 464);
        assert_eq!(body[LOGIN_INFO_HEADER_PAD], 1);
    }

    #[test]
    fn character_info_parses_one_record() {
        let mut body = b"Bob\0".to_vec();
        body.push(10);
        body.extend_from_slice(&1u32.to_le_bytes());
        body.extend_from_slice(&2u32.to_le_bytes());
        body.extend_from_slice(&3u32.to_le_bytes());

        let chars = parse_character_infos(&body).unwrap();
        assert_eq!(chars.len(), 1);
        assert_eq!(chars[0].name, "Bob");
        assert_eq!(chars[0].level, 10);
        assert_eq!(chars[0].class, 1);
        assert_eq!(chars[0].race, 2);
        assert_eq!(chars[0].zone, 3);
    }
}
