//! Per-block driver. Owns the blender and the per-slot touch arbiters,
//! drains host commands, and applies one round of parameter writes per
//! audio block.

use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::blend::{ParameterBlender, ParameterHandle};
use crate::store::AutomationStore;
use crate::sync::Shared;
use crate::touch::{SlotAction, TouchArbiter, TouchMode};
use crate::transport::Transport;

const COMMAND_QUEUE_DEPTH: usize = 256;

/// Commands flowing from the host/UI layer into the block driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AutomationCommand {
    SetTouchMode { slot: usize, mode: TouchMode },
    SetActive { slot: usize, active: bool },
    BeginGesture { slot: usize },
    EndGesture { slot: usize },
}

/// Cloneable handle for submitting commands from the editing thread.
/// Sends never block; a full queue hands the command back.
#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: Sender<AutomationCommand>,
}

impl CommandSender {
    pub fn send(&self, command: AutomationCommand) -> Result<(), AutomationCommand> {
        self.tx.try_send(command).map_err(|err| err.into_inner())
    }
}

pub struct AutomationEngine {
    shared: Shared<AutomationStore>,
    blender: ParameterBlender,
    touch: Vec<TouchArbiter>,
    transport: Arc<Transport>,
    commands: Receiver<AutomationCommand>,
    command_tx: Sender<AutomationCommand>,
}

impl AutomationEngine {
    pub fn new(transport: Arc<Transport>) -> Self {
        let (command_tx, commands) = bounded(COMMAND_QUEUE_DEPTH);
        Self {
            shared: Shared::new(AutomationStore::new(0)),
            blender: ParameterBlender::default(),
            touch: Vec::new(),
            transport,
            commands,
            command_tx,
        }
    }

    /// Registers a live parameter and returns its slot index. All
    /// parameters are registered at instantiation time, before any
    /// preset is captured.
    pub fn register_parameter(&mut self, handle: Arc<dyn ParameterHandle>) -> usize {
        let slot = self.blender.add_slot(handle);
        self.touch.push(TouchArbiter::default());
        let count = self.blender.slot_count();
        self.shared.with_edit(|store| store.set_parameter_count(count));
        slot
    }

    /// Editing-thread handle to the store. All mutations go through
    /// [`Shared::edit`] / [`Shared::with_edit`].
    pub fn editor(&self) -> Shared<AutomationStore> {
        self.shared.clone()
    }

    pub fn command_sender(&self) -> CommandSender {
        CommandSender {
            tx: self.command_tx.clone(),
        }
    }

    pub fn transport(&self) -> Arc<Transport> {
        Arc::clone(&self.transport)
    }

    pub fn is_active(&self, slot: usize) -> bool {
        self.blender.is_active(slot)
    }

    /// Called by the host once per audio block on the real-time
    /// thread. Skips evaluation (holding the last written values)
    /// while an exclusive window is open.
    pub fn process_block(&mut self) {
        while let Ok(command) = self.commands.try_recv() {
            self.apply_command(command);
        }

        let Some(store) = self.shared.rt() else {
            return;
        };
        let t = self.transport.seconds() as f32;
        let pair = store.evaluate(t);
        self.blender.apply(&pair, store.presets());
    }

    fn apply_command(&mut self, command: AutomationCommand) {
        match command {
            AutomationCommand::SetTouchMode { slot, mode } => {
                if let Some(arbiter) = self.touch.get_mut(slot) {
                    arbiter.set_mode(mode);
                }
            }
            AutomationCommand::SetActive { slot, active } => {
                self.blender.set_active(slot, active);
            }
            AutomationCommand::BeginGesture { slot } => {
                let action = self.touch.get_mut(slot).and_then(TouchArbiter::begin_touch);
                self.apply_action(slot, action);
            }
            AutomationCommand::EndGesture { slot } => {
                let action = self.touch.get_mut(slot).and_then(TouchArbiter::end_touch);
                self.apply_action(slot, action);
            }
        }
    }

    fn apply_action(&mut self, slot: usize, action: Option<SlotAction>) {
        if let Some(action) = action {
            self.blender
                .set_active(slot, matches!(action, SlotAction::Activate));
        }
    }
}
