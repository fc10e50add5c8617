use serde::{Deserialize, Serialize};

/// The two failure signals an upload attempt can surface to the user.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Bytes are not a readable archive.
    Decode,
    /// The markup document is not well-formed.
    Parse,
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("failed to open KMZ archive: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("failed to read KML document from archive: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse KML document: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("malformed KML document: {0}")]
    Malformed(String),
}

impl ExtractError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExtractError::Archive(_) | ExtractError::Io(_) => ErrorKind::Decode,
            ExtractError::Xml(_) | ExtractError::Malformed(_) => ErrorKind::Parse,
        }
    }
}

/// Shape of the error handed back across the wasm boundary.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorPayload {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&ExtractError> for ErrorPayload {
    fn from(err: &ExtractError) -> Self {
        ErrorPayload {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
