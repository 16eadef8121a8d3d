//! Host-facing boundary for the Morphline engine: live parameter
//! handles backed by atomics, gesture plumbing that drives
//! capture/release-on-touch, and preset payload validation.

pub mod error;
pub mod parameters;

pub use error::HostError;
pub use parameters::{
    capture_values, load_preset_payload, AutomationMessage, HostParam, SharedReceiver,
};
