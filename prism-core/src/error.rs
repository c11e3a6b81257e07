use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrismError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("chunk {index} checksum mismatch")]
    ChunkChecksum { index: u32 },

    #[error("assembled file checksum mismatch")]
    FinalChecksum,
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, PrismError>;
