use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;

use morphline_engine::{AutomationCommand, CommandSender, ParameterHandle, TouchMode};

use crate::error::HostError;

const NOTIFY_QUEUE_DEPTH: usize = 256;

/// Message emitted on a parameter's notification channel when its
/// value changes, whether from automation or a manual gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AutomationMessage {
    SetValue { value: f32 },
    BeginGesture,
    EndGesture,
}

/// Receiver that can be cloned into UI code.
#[derive(Debug, Clone)]
pub struct SharedReceiver<T> {
    inner: Arc<Mutex<Receiver<T>>>,
}

impl<T> SharedReceiver<T> {
    pub fn new(rx: Receiver<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(rx)),
        }
    }

    pub fn try_recv(&self) -> Option<T> {
        self.inner.lock().try_recv().ok()
    }

    pub fn drain(&self) -> Vec<T> {
        let mut guard = self.inner.lock();
        let mut messages = Vec::new();
        while let Ok(message) = guard.try_recv() {
            messages.push(message);
        }
        messages
    }
}

/// A live plugin parameter, normalized to [0, 1]. The blender writes
/// through [`ParameterHandle`]; the UI reads notifications and reports
/// gestures, which the engine turns into capture/release decisions.
pub struct HostParam {
    index: usize,
    name: String,
    default: f32,
    bits: AtomicU32,
    notify_tx: Sender<AutomationMessage>,
    notifications: SharedReceiver<AutomationMessage>,
    commands: CommandSender,
}

impl HostParam {
    pub fn new(
        index: usize,
        name: impl Into<String>,
        default: f32,
        commands: CommandSender,
    ) -> Self {
        let default = default.clamp(0.0, 1.0);
        let (notify_tx, notify_rx) = bounded(NOTIFY_QUEUE_DEPTH);
        Self {
            index,
            name: name.into(),
            default,
            bits: AtomicU32::new(default.to_bits()),
            notify_tx,
            notifications: SharedReceiver::new(notify_rx),
            commands,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default(&self) -> f32 {
        self.default
    }

    /// Notification stream for UI listeners. Messages are dropped, not
    /// blocked on, when nobody drains the queue.
    pub fn notifications(&self) -> SharedReceiver<AutomationMessage> {
        self.notifications.clone()
    }

    /// User grabbed the control. Forwarded to the engine so the slot's
    /// touch mode can capture or release it.
    pub fn begin_gesture(&self) -> Result<(), HostError> {
        let _ = self.notify_tx.try_send(AutomationMessage::BeginGesture);
        self.commands
            .send(AutomationCommand::BeginGesture { slot: self.index })
            .map_err(|_| HostError::QueueFull)
    }

    /// User let go of the control.
    pub fn end_gesture(&self) -> Result<(), HostError> {
        let _ = self.notify_tx.try_send(AutomationMessage::EndGesture);
        self.commands
            .send(AutomationCommand::EndGesture { slot: self.index })
            .map_err(|_| HostError::QueueFull)
    }

    pub fn set_touch_mode(&self, mode: TouchMode) -> Result<(), HostError> {
        self.commands
            .send(AutomationCommand::SetTouchMode {
                slot: self.index,
                mode,
            })
            .map_err(|_| HostError::QueueFull)
    }

    pub fn set_automated(&self, active: bool) -> Result<(), HostError> {
        self.commands
            .send(AutomationCommand::SetActive {
                slot: self.index,
                active,
            })
            .map_err(|_| HostError::QueueFull)
    }
}

impl ParameterHandle for HostParam {
    fn value(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }

    fn set_value(&self, value: f32) {
        let value = value.clamp(0.0, 1.0);
        self.bits.store(value.to_bits(), Ordering::Relaxed);
        // Notification fan-out is fire-and-forget; the writer never
        // waits on listeners.
        let _ = self.notify_tx.try_send(AutomationMessage::SetValue { value });
    }
}

/// Validates an externally-persisted preset payload: a flat sequence of
/// normalized floats whose length must equal the live parameter count.
pub fn load_preset_payload(raw: &[f32], parameter_count: usize) -> Result<Vec<f32>, HostError> {
    if raw.len() != parameter_count {
        return Err(HostError::PayloadLength {
            expected: parameter_count,
            actual: raw.len(),
        });
    }
    Ok(raw.iter().map(|v| v.clamp(0.0, 1.0)).collect())
}

/// Snapshots the live values of every parameter, in slot order, for
/// capturing a new preset.
pub fn capture_values(params: &[Arc<HostParam>]) -> Vec<f32> {
    params.iter().map(|param| param.value()).collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use morphline_engine::{AutomationEngine, Transport};

    // The engine must outlive the sender or commands report a full
    // queue on the disconnected channel.
    fn command_sender() -> (AutomationEngine, CommandSender) {
        let engine = AutomationEngine::new(Arc::new(Transport::new()));
        let sender = engine.command_sender();
        (engine, sender)
    }

    #[test]
    fn set_value_clamps_and_notifies() {
        let (_engine, sender) = command_sender();
        let param = HostParam::new(0, "Cutoff", 0.5, sender);
        let notifications = param.notifications();
        param.set_value(1.7);
        assert_eq!(param.value(), 1.0);
        assert_eq!(
            notifications.try_recv(),
            Some(AutomationMessage::SetValue { value: 1.0 })
        );
    }

    #[test]
    fn gestures_reach_the_notification_stream() {
        let (_engine, sender) = command_sender();
        let param = HostParam::new(0, "Res", 0.0, sender);
        let notifications = param.notifications();
        param.begin_gesture().unwrap();
        param.end_gesture().unwrap();
        assert_eq!(
            notifications.drain(),
            vec![
                AutomationMessage::BeginGesture,
                AutomationMessage::EndGesture
            ]
        );
    }

    #[test]
    fn payload_length_is_validated() {
        assert!(load_preset_payload(&[0.1, 0.2], 2).is_ok());
        assert!(matches!(
            load_preset_payload(&[0.1], 2),
            Err(HostError::PayloadLength {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn payload_values_are_clamped() {
        let payload = load_preset_payload(&[-0.5, 2.0], 2).unwrap();
        assert_eq!(payload, vec![0.0, 1.0]);
    }

    #[test]
    fn capture_reads_slot_order() {
        let (_engine, sender) = command_sender();
        let params: Vec<Arc<HostParam>> = (0..3)
            .map(|i| {
                Arc::new(HostParam::new(
                    i,
                    format!("p{i}"),
                    i as f32 * 0.25,
                    sender.clone(),
                ))
            })
            .collect();
        assert_eq!(capture_values(&params), vec![0.0, 0.25, 0.5]);
    }
}
