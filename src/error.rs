use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("could not open {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("could not read OSM data: {0}")]
    Read(#[from] osmpbfreader::Error),

    #[error("malformed entity {entity}: {reason}")]
    MalformedEntity { entity: String, reason: String },

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("could not write JSON output: {0}")]
    Json(#[source] serde_json::Error),
}

impl Error {
    pub(crate) fn malformed<E: ToString, R: ToString>(entity: E, reason: R) -> Self {
        Error::MalformedEntity {
            entity: entity.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
