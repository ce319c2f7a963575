use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unsupported checksum algorithm '{0}'")]
    UnsupportedAlgorithm(String),

    #[error("failed to read '{path}' for hashing: {source}")]
    Read { path: PathBuf, source: io::Error },
}

pub type Result<T> = std::result::Result<T, Error>;
