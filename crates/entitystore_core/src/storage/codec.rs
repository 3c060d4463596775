//! Encoding of `EntityDocument` to and from bytes.

use crate::model::document::EntityDocument;
use std::error::Error;
use std::fmt::{Display, Formatter};

type BoxedError = Box<dyn Error + Send + Sync + 'static>;

/// Serialization codec for the persisted document.
pub trait DocumentCodec {
    fn encode(&self, document: &EntityDocument) -> Result<Vec<u8>, CodecError>;
    fn decode(&self, bytes: &[u8]) -> Result<EntityDocument, CodecError>;
}

/// Codec failure, split by direction.
#[derive(Debug)]
pub enum CodecError {
    Encode(BoxedError),
    Decode(BoxedError),
}

impl CodecError {
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode(err) => write!(f, "failed to encode entity document: {err}"),
            Self::Decode(err) => write!(f, "failed to decode entity document: {err}"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) | Self::Decode(err) => Some(err.as_ref()),
        }
    }
}

/// JSON codec backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDocumentCodec {
    pretty: bool,
}

impl JsonDocumentCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits indented JSON when `pretty` is set.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl DocumentCodec for JsonDocumentCodec {
    fn encode(&self, document: &EntityDocument) -> Result<Vec<u8>, CodecError> {
        let encoded = if self.pretty {
            serde_json::to_vec_pretty(document)
        } else {
            serde_json::to_vec(document)
        };
        encoded.map_err(|err| CodecError::Encode(Box::new(err)))
    }

    fn decode(&self, bytes: &[u8]) -> Result<EntityDocument, CodecError> {
        serde_json::from_slice(bytes).map_err(|err| CodecError::Decode(Box::new(err)))
    }
}
