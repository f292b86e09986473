//! Ambient error handling, matching the rest of the workspace: a plain
//! enum with a hand-written `Display`, no `thiserror`.

use std::fmt;

#[derive(Debug)]
pub enum FactsError {
    Encode(bincode::Error),
    Decode(bincode::Error),
    Io(std::io::Error),
    UnknownAnnotation { kind: &'static str, name: String },
    TooLarge { bytes: usize, limit: usize },
}

impl fmt::Display for FactsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactsError::Encode(e) => write!(f, "failed to encode facts envelope: {e}"),
            FactsError::Decode(e) => write!(f, "failed to decode facts envelope: {e}"),
            FactsError::Io(e) => write!(f, "facts envelope compression failed: {e}"),
            FactsError::UnknownAnnotation { kind, name } => {
                write!(f, "unrecognized {kind} short name {name:?} in facts envelope")
            }
            FactsError::TooLarge { bytes, limit } => {
                write!(f, "facts envelope of {bytes} bytes exceeds the {limit} byte limit")
            }
        }
    }
}

impl std::error::Error for FactsError {}

impl From<std::io::Error> for FactsError {
    fn from(e: std::io::Error) -> Self {
        FactsError::Io(e)
    }
}
