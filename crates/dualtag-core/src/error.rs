use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Identifier errors
    #[error("Invalid UID length: expected {min}-{max} bytes, got {actual}")]
    InvalidUidLength {
        min: usize,
        max: usize,
        actual: usize,
    },

    #[error("Invalid tag data: {0}")]
    InvalidTagData(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
