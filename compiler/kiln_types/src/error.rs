use std::collections::TryReserveError;

use thiserror::Error;

/// Failure while building or copying a type.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum TypeError {
    #[error("out of memory while copying a type")]
    OutOfMemory,
}

impl From<TryReserveError> for TypeError {
    fn from(_: TryReserveError) -> Self {
        TypeError::OutOfMemory
    }
}
