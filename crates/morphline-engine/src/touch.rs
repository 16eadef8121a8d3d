//! Decides who owns a parameter slot when the user grabs its control
//! during playback. A touch can hand the parameter to automation
//! (capture) or back to manual control (release), and either effect can
//! stick or last only while the control is held.

/// Per-slot policy for gesture begin/end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TouchMode {
    /// Gestures leave the slot's active flag alone.
    #[default]
    Ignore,
    /// Grabbing the control captures the slot for automation; the
    /// capture sticks after release.
    Capture,
    /// Grabbing captures; letting go hands the slot back.
    CaptureWhileHeld,
    /// Grabbing releases the slot so the manual value wins; the
    /// release sticks.
    Release,
    /// Grabbing releases; letting go re-engages automation.
    ReleaseWhileHeld,
}

/// Effect a gesture has on the slot's active flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotAction {
    Activate,
    Deactivate,
}

/// Tracks one slot's gesture state and maps begin/end events to
/// activation changes under the configured mode.
#[derive(Debug, Clone, Default)]
pub struct TouchArbiter {
    mode: TouchMode,
    held: bool,
}

impl TouchArbiter {
    pub fn new(mode: TouchMode) -> Self {
        Self { mode, held: false }
    }

    pub fn mode(&self) -> TouchMode {
        self.mode
    }

    /// Changing modes mid-gesture forgets the gesture, so the pending
    /// end event has no effect.
    pub fn set_mode(&mut self, mode: TouchMode) {
        self.mode = mode;
        self.held = false;
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    pub fn begin_touch(&mut self) -> Option<SlotAction> {
        self.held = true;
        match self.mode {
            TouchMode::Ignore => None,
            TouchMode::Capture | TouchMode::CaptureWhileHeld => Some(SlotAction::Activate),
            TouchMode::Release | TouchMode::ReleaseWhileHeld => Some(SlotAction::Deactivate),
        }
    }

    pub fn end_touch(&mut self) -> Option<SlotAction> {
        if !std::mem::take(&mut self.held) {
            return None;
        }
        match self.mode {
            TouchMode::CaptureWhileHeld => Some(SlotAction::Deactivate),
            TouchMode::ReleaseWhileHeld => Some(SlotAction::Activate),
            TouchMode::Ignore | TouchMode::Capture | TouchMode::Release => None,
        }
    }
}
