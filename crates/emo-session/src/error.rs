use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid MAC address format in {descriptor:?}: {reason}")]
    InvalidAddressFormat {
        descriptor: String,
        reason: &'static str,
    },

    #[error("IO slot {0} out of range (expected 1..=16)")]
    InvalidSlot(u8),

    #[error("cannot open session store {}: {source}", path.display())]
    StoreUnavailable {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("session store is corrupt or has an unexpected schema: {0}")]
    StoreCorrupt(#[from] rusqlite::Error),

    #[error("session store has no `{0}` table; is this an eMotion session file?")]
    MissingTable(&'static str),

    #[error("no free device id left in session store (highest id {0})")]
    IdSpaceExhausted(i64),

    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SessionError {
    pub(crate) fn invalid_address(descriptor: &str, reason: &'static str) -> Self {
        SessionError::InvalidAddressFormat {
            descriptor: descriptor.to_string(),
            reason,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        SessionError::Io {
            path: path.into(),
            source,
        }
    }
}
