use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[cfg(feature = "serde")]
    #[error("serde_json error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("serializer encountered maximum depth of {max}")]
    DepthExceeded { max: usize },

    #[error("cannot instantiate type \"{type_name}\" from assembly \"{assembly}\": {reason}")]
    Construction {
        type_name: String,
        assembly: String,
        reason: String,
    },

    #[error("{0}")]
    Message(String),
}

pub type Result<T> = core::result::Result<T, Error>;

#[cfg(feature = "serde")]
impl serde::ser::Error for Error {
    fn custom<T: core::fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}
