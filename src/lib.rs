//! Readers for legacy EverQuest archive/WLD assets and a client for the
//! EQEmu session/login/world network protocol.
//!
//! This crate is a thin, feature-gated facade over the workspace's three
//! library crates — `libeq_archive`, `libeq_wld`, and `libeq_net` — each of
//! which can also be depended on directly. The CLIs under `tools/` do so;
//! this crate exists for callers who want one dependency covering all
//! three.

#[cfg(feature = "archive")]
pub use libeq_archive;

#[cfg(feature = "wld")]
pub use libeq_wld;

#[cfg(feature = "net")]
pub use libeq_net;
