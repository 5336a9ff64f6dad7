use thiserror::Error;

#[derive(Error, Debug)]
pub enum FsError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("no such file: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    /// Names the resource that ran out.
    #[error("no free {0} available")]
    Exhausted(&'static str),
    /// The block store rejected an access. Indicates a bug or a damaged image,
    /// never a condition callers are expected to recover from.
    #[error("block store failure: {0}")]
    Fatal(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FsError>;
