use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::DocumentId;

/// Reading a document from storage failed.
#[derive(Debug, Error)]
#[error("{}: {source}", path.display())]
pub struct LoadError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Saving a document failed.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("{}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{} is already open in another tab", .0.display())]
    AlreadyOpen(PathBuf),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no open document with id {0}")]
    UnknownDocument(DocumentId),
}
