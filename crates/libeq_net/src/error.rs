use std::io;

use libeq_wld::cursor::UnexpectedEof;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Eof(#[from] UnexpectedEof),
    #[error("session response echoed a different session id than requested")]
    BadHandshake,
    #[error("CRC mismatch on a packet carrying a non-zero trailer")]
    BadCrc,
    #[error("compression flag was neither 'Z' (0x5a) nor 0xa5: got 0x{0:02x}")]
    BadCompressionFlag(u8),
    #[error("combined packet truncated mid sub-packet")]
    Truncated,
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("timed out waiting for a packet")]
    Timeout,
}
