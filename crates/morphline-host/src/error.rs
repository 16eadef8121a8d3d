use thiserror::Error;

use morphline_engine::AutomationError;

/// Errors surfaced to the editing thread by the host boundary. None of
/// these can reach the real-time path.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("preset payload has {actual} values, expected {expected}")]
    PayloadLength { expected: usize, actual: usize },
    #[error("automation command queue is full")]
    QueueFull,
    #[error(transparent)]
    Automation(#[from] AutomationError),
}
