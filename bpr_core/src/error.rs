use thiserror::Error;

/// Everything that can go wrong inside the codec.
///
/// No variant is recovered internally; every error aborts the running
/// encode or decode and surfaces to the caller with the stage named.
#[derive(Error, Debug)]
pub enum Error {
    /// Structural damage in the container: bad magic, truncated header,
    /// truncated varint, a block length exceeding the remaining input,
    /// or an invalid LZMA stream.
    #[error("malformed container: {0}")]
    Malformed(String),

    /// A block's decompressed byte stream ended before all rows in the
    /// block were consumed, or left unconsumed bytes behind.
    #[error("residual stream: {0}")]
    Residual(String),

    /// Predictor byte outside {0, 1, 2, 3}.
    #[error("unknown predictor id {0}")]
    UnknownPredictor(u8),

    /// Delta mode byte outside {0, 1}.
    #[error("unknown delta mode {0}")]
    UnknownMode(u8),

    /// A token in the text grid is not a valid decimal integer.
    #[error("text parse error on line {line}: {msg}")]
    Parse { line: usize, msg: String },

    /// Propagated I/O error from the underlying reader or writer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
