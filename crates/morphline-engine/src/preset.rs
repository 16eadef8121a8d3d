use serde::{Deserialize, Serialize};

use crate::error::{AutomationError, PresetError};

/// Identifier for a parameter snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresetId(pub u64);

/// A named snapshot of every automatable parameter, normalized to
/// [0, 1]. The value vector's length is fixed at capture time and
/// always equals the live parameter count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preset {
    pub id: PresetId,
    pub name: String,
    values: Vec<f32>,
}

impl Preset {
    fn new(id: PresetId, name: impl Into<String>, values: &[f32]) -> Self {
        let values = values.iter().map(|v| v.clamp(0.0, 1.0)).collect();
        Self {
            id,
            name: name.into(),
            values,
        }
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn value(&self, index: usize) -> Option<f32> {
        self.values.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Owns every captured preset. Mutated only by the editing thread;
/// the real-time thread reads presets through the committed store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetStore {
    presets: Vec<Preset>,
    parameter_count: usize,
    next_id: u64,
}

impl PresetStore {
    pub fn new(parameter_count: usize) -> Self {
        Self {
            presets: Vec::new(),
            parameter_count,
            next_id: 1,
        }
    }

    pub fn parameter_count(&self) -> usize {
        self.parameter_count
    }

    /// The count is fixed for the lifetime of every captured preset;
    /// it may only change while the store is empty.
    pub(crate) fn set_parameter_count(&mut self, count: usize) {
        debug_assert!(
            self.presets.is_empty(),
            "parameter count changed after presets were captured"
        );
        self.parameter_count = count;
    }

    /// Snapshots a full parameter vector under a new name. Rejects
    /// duplicate names and payloads whose length does not match the
    /// live parameter count.
    pub fn capture(
        &mut self,
        name: impl Into<String>,
        values: &[f32],
    ) -> Result<PresetId, AutomationError> {
        let name = name.into();
        if self.find_by_name(&name).is_some() {
            return Err(AutomationError::NameTaken(name));
        }
        if values.len() != self.parameter_count {
            return Err(PresetError::PayloadLength {
                expected: self.parameter_count,
                actual: values.len(),
            }
            .into());
        }
        let id = PresetId(self.next_id);
        self.next_id += 1;
        self.presets.push(Preset::new(id, name, values));
        Ok(id)
    }

    /// Replaces an existing preset's values in place. The length stays
    /// fixed, so clips referencing the preset remain valid.
    pub fn overwrite(&mut self, id: PresetId, values: &[f32]) -> Result<(), AutomationError> {
        if values.len() != self.parameter_count {
            return Err(PresetError::PayloadLength {
                expected: self.parameter_count,
                actual: values.len(),
            }
            .into());
        }
        let preset = self
            .presets
            .iter_mut()
            .find(|preset| preset.id == id)
            .ok_or(AutomationError::NotFound)?;
        preset.values = values.iter().map(|v| v.clamp(0.0, 1.0)).collect();
        Ok(())
    }

    pub(crate) fn remove(&mut self, id: PresetId) -> Result<Preset, AutomationError> {
        let index = self
            .presets
            .iter()
            .position(|preset| preset.id == id)
            .ok_or(AutomationError::NotFound)?;
        Ok(self.presets.remove(index))
    }

    pub fn get(&self, id: PresetId) -> Option<&Preset> {
        self.presets.iter().find(|preset| preset.id == id)
    }

    pub fn contains(&self, id: PresetId) -> bool {
        self.get(id).is_some()
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Preset> {
        self.presets.iter().find(|preset| preset.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        self.presets.iter()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}
