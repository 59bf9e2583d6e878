//! The wire message shared by the session, login, and world namespaces.
//!
//! A [`Message`] is an ordered list of named parameters plus optional raw
//! `body` bytes. Namespaces only differ in one respect that matters to
//! serialization: the session namespace writes its 16-bit type (and every
//! multi-byte field after it) in network byte order; the login and world
//! namespaces write little-endian throughout.

use std::fmt;

use libeq_wld::cursor::{Cursor, UnexpectedEof};

use crate::error::Error;

/// Which byte order a message's fields serialize in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Session,
    Login,
    World,
}

impl Namespace {
    fn is_big_endian(self) -> bool {
        matches!(self, Namespace::Session)
    }
}

/// One parameter's decoded value. The variant also doubles as the
/// parameter's format code when building a message to send.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    U8(u8),
    U16(u16),
    U32(u32),
    I16(i16),
    I32(i32),
    F32(f32),
    CString(String),
    Raw(Vec<u8>),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::U8(v) => write!(f, "{v}"),
            ParamValue::U16(v) => write!(f, "{v}"),
            ParamValue::U32(v) => write!(f, "{v}"),
            ParamValue::I16(v) => write!(f, "{v}"),
            ParamValue::I32(v) => write!(f, "{v}"),
            ParamValue::F32(v) => write!(f, "{v}"),
            ParamValue::CString(v) => write!(f, "{v:?}"),
            ParamValue::Raw(v) => write!(f, "[{} bytes]", v.len()),
        }
    }
}

/// A parameter format, used to describe how to read an incoming value the
/// caller expects at a given name. [`Format::Raw`] reads a fixed number of
/// bytes verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    U8,
    U16,
    U32,
    I16,
    I32,
    F32,
    CString,
    Raw(usize),
}

/// A named `(parameter name, format)` pair describing one field of an
/// incoming message, in wire order. The caller supplies this since the
/// model itself doesn't know every message type in existence.
pub type Schedule = &'static [(&'static str, Format)];

/// An ordered named-parameter message plus optional opaque trailing bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub ns: Namespace,
    pub msg_type: u16,
    pub params: Vec<(String, ParamValue)>,
    pub body: Option<Vec<u8>>,
}

impl Message {
    pub fn new(ns: Namespace, msg_type: u16) -> Self {
        Message {
            ns,
            msg_type,
            params: Vec::new(),
            body: None,
        }
    }

    /// Append a parameter. Order of calls is serialization order.
    pub fn push(&mut self, name: impl Into<String>, value: ParamValue) -> &mut Self {
        self.params.push((name.into(), value));
        self
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.params.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn get_u16(&self, name: &str) -> Option<u16> {
        match self.get(name) {
            Some(ParamValue::U16(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_u32(&self, name: &str) -> Option<u32> {
        match self.get(name) {
            Some(ParamValue::U32(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_string(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(ParamValue::CString(v)) => Some(v.as_str()),
            _ => None,
        }
    }

    /// `type:u16`, then every parameter's bytes in its declared layout,
    /// then `body` if present. All of it shares the namespace's byte order.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        push_u16(&mut out, self.ns, self.msg_type);
        for (_, value) in &self.params {
            push_value(&mut out, self.ns, value);
        }
        if let Some(body) = &self.body {
            out.extend_from_slice(body);
        }
        out
    }

    /// Read `type:u16` plus every parameter the `schedule` declares, in
    /// order; whatever bytes remain become `body`.
    pub fn parse(ns: Namespace, schedule: Schedule, data: &[u8]) -> Result<Self, Error> {
        let mut cursor = Cursor::new(data);
        let msg_type = read_u16(&mut cursor, ns)?;
        let mut params = Vec::with_capacity(schedule.len());
        for (name, format) in schedule {
            let value = read_value(&mut cursor, ns, *format)?;
            params.push((name.to_string(), value));
        }
        let rest = cursor.take_rest();
        let body = if rest.is_empty() {
            None
        } else {
            Some(rest.to_vec())
        };
        Ok(Message {
            ns,
            msg_type,
            params,
            body,
        })
    }

    /// `<TypeName(param=value, …) body=[N bytes]>`, resolving `msg_type`
    /// against `type_name`; a name this table doesn't recognize falls back
    /// to a hex mnemonic.
    pub fn describe(&self, type_name: impl Fn(u16) -> Option<&'static str>) -> String {
        let name = type_name(self.msg_type)
            .map(str::to_string)
            .unwrap_or_else(|| format!("0x{:04x}", self.msg_type));
        let params = self
            .params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", ");
        match &self.body {
            Some(body) => format!("<{name}({params}) body=[{} bytes]>", body.len()),
            None => format!("<{name}({params})>"),
        }
    }
}

fn push_u16(out: &mut Vec<u8>, ns: Namespace, v: u16) {
    out.extend_from_slice(&if ns.is_big_endian() {
        v.to_be_bytes()
    } else {
        v.to_le_bytes()
    });
}

fn push_value(out: &mut Vec<u8>, ns: Namespace, value: &ParamValue) {
    let be = ns.is_big_endian();
    match value {
        ParamValue::U8(v) => out.push(*v),
        ParamValue::U16(v) => out.extend_from_slice(&if be { v.to_be_bytes() } else { v.to_le_bytes() }),
        ParamValue::U32(v) => out.extend_from_slice(&if be { v.to_be_bytes() } else { v.to_le_bytes() }),
        ParamValue::I16(v) => out.extend_from_slice(&if be { v.to_be_bytes() } else { v.to_le_bytes() }),
        ParamValue::I32(v) => out.extend_from_slice(&if be { v.to_be_bytes() } else { v.to_le_bytes() }),
        ParamValue::F32(v) => out.extend_from_slice(&if be { v.to_be_bytes() } else { v.to_le_bytes() }),
        ParamValue::CString(v) => {
            out.extend_from_slice(v.as_bytes());
            out.push(0);
        }
        ParamValue::Raw(bytes) => out.extend_from_slice(bytes),
    }
}

fn read_u16(cursor: &mut Cursor, ns: Namespace) -> Result<u16, UnexpectedEof> {
    if ns.is_big_endian() {
        cursor.u16_be()
    } else {
        cursor.u16_le()
    }
}

fn read_value(cursor: &mut Cursor, ns: Namespace, format: Format) -> Result<ParamValue, UnexpectedEof> {
    let be = ns.is_big_endian();
    Ok(match format {
        Format::U8 => ParamValue::U8(cursor.u8()?),
        Format::U16 => ParamValue::U16(if be { cursor.u16_be()? } else { cursor.u16_le()? }),
        Format::U32 => ParamValue::U32(if be { cursor.u32_be()? } else { cursor.u32_le()? }),
        Format::I16 => ParamValue::I16(if be { cursor.i16_be()? } else { cursor.i16_le()? }),
        Format::I32 => ParamValue::I32(if be { cursor.i32_be()? } else { cursor.i32_le()? }),
        Format::F32 => ParamValue::F32(if be { cursor.f32_be()? } else { cursor.f32_le()? }),
        Format::CString => ParamValue::CString(cursor.cstring()?),
        Format::Raw(n) => ParamValue::Raw(cursor.take(n)?.to_vec()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_messages_serialize_big_endian() {
        let mut msg = Message::new(Namespace::Session, 0x02);
        msg.push("Session", ParamValue::U32(0x26EC5075));
        let bytes = msg.serialize();
        assert_eq!(&bytes[0..2], &[0x00, 0x02]);
        assert_eq!(&bytes[2..6], &[0x26, 0xEC, 0x50, 0x75]);
    }

    #[test]
    fn application_messages_serialize_little_endian() {
        let mut msg = Message::new(Namespace::Login, 0x17);
        msg.push("Status", ParamValue::U32(1));
        let bytes = msg.serialize();
        assert_eq!(&bytes[0..2], &[0x17, 0x00]);
        assert_eq!(&bytes[2..6], &[0x01, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn parse_reads_schedule_then_leaves_the_rest_as_body() {
        const SCHEDULE: Schedule = &[("Session", Format::U32), ("Key", Format::U32)];
        let mut source = Message::new(Namespace::Session, 0x02);
        source.push("Session", ParamValue::U32(7));
        source.push("Key", ParamValue::U32(9));
        source.body = Some(vec![0xAA, 0xBB]);
        let bytes = source.serialize();

        let parsed = Message::parse(Namespace::Session, SCHEDULE, &bytes).unwrap();
        assert_eq!(parsed.get_u32("Session"), Some(7));
        assert_eq!(parsed.get_u32("Key"), Some(9));
        assert_eq!(parsed.body, Some(vec![0xAA, 0xBB]));
    }

    #[test]
    fn describe_falls_back_to_a_hex_mnemonic() {
        let msg = Message::new(Namespace::World, 0x4dd0);
        assert_eq!(msg.describe(|_| None), "<0x4dd0()>");
    }
}
