//! Error types for traktor-export-core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parse error: {0}")]
    Xml(String),

    #[error("Missing element <{element}> in {context}")]
    MissingElement {
        element: &'static str,
        context: String,
    },

    #[error("Missing attribute {attribute} on <{element}> in {context}")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
        context: String,
    },

    #[error("Invalid value {value:?} for {attribute} on <{element}> in {context}")]
    InvalidAttribute {
        element: &'static str,
        attribute: &'static str,
        value: String,
        context: String,
    },

    #[error("Track has no location: {track}")]
    MissingLocation { track: String },

    #[error("Playlist {playlist:?} references unknown track {key:?}")]
    UnknownTrack { playlist: String, key: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<roxmltree::Error> for Error {
    fn from(e: roxmltree::Error) -> Self {
        Error::Xml(e.to_string())
    }
}

impl From<tempfile::PersistError> for Error {
    fn from(e: tempfile::PersistError) -> Self {
        Error::Io(e.error)
    }
}
