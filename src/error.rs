use std::fmt::{Display, Formatter};
use std::sync::PoisonError;

use config::ConfigError;
use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, Error>;

// All except Internal are considered user-facing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Error {
    /// A page id beyond the allocated range of the backing store, or
    /// outside the bounds derived from the pool capacity.
    OutOfRange(String),
    /// A page id that is not currently resident in the cache.
    NotResident(String),
    /// A recency-set removal named an element that is not a member.
    NotFound,
    /// The backing substrate failed: missing directory, read/write/stat
    /// failure.
    StoreIo(String),
    /// Every resident frame is pinned, no eviction candidate exists.
    AllPinned,
    /// An invariant tying the mappings, the recency set and the slot
    /// array was violated. The pool should not be reused after this.
    StateIncoherent(String),
    /// No empty slot was found after eviction guaranteed one.
    NoEmptySlot,
    Internal(String),
}

impl Error {
    pub fn out_of_range<E: ToString>(msg: E) -> Error {
        Error::OutOfRange(msg.to_string())
    }

    pub fn not_resident<E: ToString>(msg: E) -> Error {
        Error::NotResident(msg.to_string())
    }

    pub fn store_io<E: ToString>(msg: E) -> Error {
        Error::StoreIo(msg.to_string())
    }

    pub fn incoherent<E: ToString>(msg: E) -> Error {
        Error::StateIncoherent(msg.to_string())
    }

    pub fn internal<E: ToString>(msg: E) -> Error {
        Error::Internal(msg.to_string())
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::OutOfRange(s) => write!(f, "out of range: {}", s),
            Error::NotResident(s) => write!(f, "not a resident page: {}", s),
            Error::NotFound => write!(f, "not found"),
            Error::StoreIo(s) => write!(f, "store io: {}", s),
            Error::AllPinned => write!(f, "all frames are pinned"),
            Error::StateIncoherent(s) => write!(f, "state incoherence: {}", s),
            Error::NoEmptySlot => write!(f, "unable to find an empty slot"),
            Error::Internal(s) => write!(f, "{}", s),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::store_io(err)
    }
}

impl<T> From<PoisonError<T>> for Error {
    fn from(err: PoisonError<T>) -> Self {
        Error::internal(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::internal(err)
    }
}
