use thiserror::Error;

#[derive(Debug, Error)]
pub enum FatupError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("boot record truncated: got {actual} bytes, need {expected}")]
    TruncatedBootRecord { actual: usize, expected: usize },

    #[error("invalid volume geometry: {0}")]
    InvalidGeometry(String),

    #[error("volume already holds {clusters} clusters and is FAT16")]
    AlreadyFat16 { clusters: u32 },
}
