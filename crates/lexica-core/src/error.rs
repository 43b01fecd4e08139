use crate::prelude::{BuildError, ScanError};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Scan(#[from] ScanError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
