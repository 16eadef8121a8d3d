//! Morphline Engine
//! ================
//! Preset-morphing automation for hosted plugin parameters. The engine
//! blends between named parameter snapshots placed on a timeline and
//! writes the result through the host's parameter handles once per
//! audio block, without allocating or blocking on the processing
//! thread.

pub mod blend;
pub mod curve;
pub mod engine;
pub mod error;
pub mod preset;
pub mod store;
pub mod sync;
pub mod touch;
pub mod transport;

pub use blend::{ParameterBlender, ParameterHandle, ParameterSlot};
pub use curve::{BlendCurve, ClipPair};
pub use engine::{AutomationCommand, AutomationEngine, CommandSender};
pub use error::{AutomationError, PresetError};
pub use preset::{Preset, PresetId, PresetStore};
pub use store::{
    AutomationPoint, AutomationStore, Clip, ClipId, Lane, Path, PathId, PointSource, Selection,
    StoreEvent,
};
pub use sync::{ExclusiveWindow, Shared};
pub use touch::{SlotAction, TouchArbiter, TouchMode};
pub use transport::Transport;
