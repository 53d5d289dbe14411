use std::io;

/// Errors surfaced by the codec core to its caller.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("unknown codec: {0}")]
    UnknownCodec(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("bad magic: expected {expected:?}, found {found:?}")]
    BadMagic { expected: [u8; 4], found: [u8; 4] },

    #[error("unsupported channel count: {0}")]
    UnsupportedChannelCount(u8),

    #[error("empty input channel")]
    EmptyInput,

    #[error("malformed compressed stream: {0}")]
    MalformedStream(String),
}

pub type Result<T> = std::result::Result<T, CodecError>;
