use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("failed to write trace output: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum RomError {
    #[error("failed to read ROM: {0}")]
    Io(#[from] io::Error),

    #[error("ROM image is empty")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown address region '{0}'")]
pub struct ParseRegionError(pub String);
