use thiserror::Error;

use crate::preset::PresetId;

/// Errors reported to the editing thread. Nothing in the real-time
/// path returns these; inconsistencies there degrade to holding the
/// last written value.
#[derive(Debug, Error, PartialEq)]
pub enum AutomationError {
    #[error("no clip, path, or preset with the requested id")]
    NotFound,
    #[error("invalid preset: {0}")]
    InvalidPreset(#[from] PresetError),
    #[error("a preset named `{0}` already exists")]
    NameTaken(String),
}

/// Why a preset reference or payload was rejected.
#[derive(Debug, Error, PartialEq)]
pub enum PresetError {
    #[error("preset {0:?} does not exist")]
    Dangling(PresetId),
    #[error("payload has {actual} values, expected {expected}")]
    PayloadLength { expected: usize, actual: usize },
}
