use thiserror::Error;

use crate::cmd::MAX_FRAME_LEN;
use crate::reader::hex_pairs;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by reader operations.
///
/// Only [`Error::ConnectionFailed`] is fatal to the whole session; every
/// other variant is scoped to one tag or one exchange.
#[derive(Debug, Error)]
pub enum Error {
    /// The NFC device could not be opened or put into initiator mode.
    #[error("unable to connect to NFC device")]
    ConnectionFailed(#[source] nfc1::Error),

    /// A previously listed tag could not be reacquired.
    #[error("failed to select tag with UID: {}", hex_pairs(.uid))]
    SelectionFailed { uid: Vec<u8> },

    /// The assembled command frame would exceed [`MAX_FRAME_LEN`] bytes.
    /// Rejected before any hardware I/O.
    #[error("command frame of {0} bytes exceeds the {limit} byte limit", limit = MAX_FRAME_LEN)]
    CommandTooLarge(usize),

    /// The reader did not accept or answer the exchange.
    #[error("reader rejected the exchange")]
    TransportRejected(#[source] nfc1::Error),

    /// A data block refused access while no key was loaded this session.
    #[error("block {0} refused access, authentication with a sector key is likely required")]
    AuthenticationRequired(u8),
}
