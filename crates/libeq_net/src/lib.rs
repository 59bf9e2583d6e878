//! A client for the EverQuest session protocol: a reliable layer over UDP
//! ("SM") carrying two application substreams, login ("LM") and world
//! ("WM").
//!
//! ```no_run
//! use libeq_net::login::LoginClient;
//!
//! let mut login = LoginClient::connect("login.eqemulator.net:5998")?;
//! login.begin_login("user", "password")?;
//! let (ok, user_id, key) = login.end_login()?;
//! # Ok::<(), libeq_net::Error>(())
//! ```

pub mod app;
pub mod error;
pub mod login;
pub mod message;
pub mod session;
pub mod world;

pub use app::AppClient;
pub use error::Error;
pub use login::LoginClient;
pub use message::{Format, Message, Namespace, ParamValue, Schedule};
pub use session::{unpack_combined, FragmentState, PacketInspector, SessionClient, SessionOpcode};
pub use world::WorldClient;
