//! Maps a [`ClipPair`] into concrete parameter writes through the
//! host's parameter handles. Runs on the real-time thread: no
//! allocation, no logging, no fallible paths.

use std::sync::Arc;

use crate::curve::ClipPair;
use crate::preset::PresetStore;

/// Writes closer than this to the current value are skipped to avoid
/// redundant host notifications.
pub const EPSILON: f32 = 1e-6;

/// Live plugin parameter as seen by the blender. Implementations must
/// be wait-free; `set_value` may fan out host notifications but never
/// blocks the caller.
pub trait ParameterHandle: Send + Sync {
    fn value(&self) -> f32;
    fn set_value(&self, value: f32);
}

/// One automatable parameter. Inactive slots are never written, which
/// preserves values the user dialed in manually.
pub struct ParameterSlot {
    handle: Arc<dyn ParameterHandle>,
    active: bool,
}

impl ParameterSlot {
    pub fn new(handle: Arc<dyn ParameterHandle>) -> Self {
        Self {
            handle,
            active: true,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    fn write(&self, target: f32) {
        let target = target.clamp(0.0, 1.0);
        if (self.handle.value() - target).abs() > EPSILON {
            self.handle.set_value(target);
        }
    }
}

#[derive(Default)]
pub struct ParameterBlender {
    slots: Vec<ParameterSlot>,
}

impl ParameterBlender {
    pub fn new(handles: impl IntoIterator<Item = Arc<dyn ParameterHandle>>) -> Self {
        Self {
            slots: handles.into_iter().map(ParameterSlot::new).collect(),
        }
    }

    /// Appends a slot and returns its index. Slots are registered once
    /// at instantiation time, before any preset is captured.
    pub fn add_slot(&mut self, handle: Arc<dyn ParameterHandle>) -> usize {
        self.slots.push(ParameterSlot::new(handle));
        self.slots.len() - 1
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(ParameterSlot::is_active)
    }

    pub fn set_active(&mut self, index: usize, active: bool) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.active = active;
        }
    }

    /// Applies one block's worth of parameter writes. Both bounding
    /// sides resolving to clips yields an interpolated write; a side
    /// bound to a path carries no payload, so the nearest clip side is
    /// held instead. No clip anywhere means no writes.
    pub fn apply(&self, pair: &ClipPair, presets: &PresetStore) {
        let a = pair
            .a
            .and_then(|point| point.source.preset())
            .and_then(|id| presets.get(id));
        let b = pair
            .b
            .and_then(|point| point.source.preset())
            .and_then(|id| presets.get(id));

        if let (Some(pa), Some(pb), Some(weight)) = (a, b, pair.weight) {
            for (index, slot) in self.slots.iter().enumerate() {
                if !slot.active {
                    continue;
                }
                let (Some(va), Some(vb)) = (pa.value(index), pb.value(index)) else {
                    continue;
                };
                let target = va + (vb - va) * weight;
                debug_assert!(
                    (-1e-4..=1.0 + 1e-4).contains(&target),
                    "blend left [0,1]: {target}"
                );
                slot.write(target);
            }
            return;
        }

        let Some(preset) = a.or(b) else {
            return;
        };
        for (index, slot) in self.slots.iter().enumerate() {
            if !slot.active {
                continue;
            }
            if let Some(value) = preset.value(index) {
                slot.write(value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

    use super::*;
    use crate::store::{AutomationStore, Lane};

    #[derive(Default)]
    struct TestHandle {
        bits: AtomicU32,
        writes: AtomicUsize,
    }

    impl ParameterHandle for TestHandle {
        fn value(&self) -> f32 {
            f32::from_bits(self.bits.load(Ordering::Relaxed))
        }

        fn set_value(&self, value: f32) {
            self.bits.store(value.to_bits(), Ordering::Relaxed);
            self.writes.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn rig(count: usize) -> (Vec<Arc<TestHandle>>, ParameterBlender) {
        let handles: Vec<Arc<TestHandle>> =
            (0..count).map(|_| Arc::new(TestHandle::default())).collect();
        let blender = ParameterBlender::new(
            handles
                .iter()
                .map(|handle| Arc::clone(handle) as Arc<dyn ParameterHandle>),
        );
        (handles, blender)
    }

    #[test]
    fn two_clip_blend_interpolates() {
        let mut store = AutomationStore::new(2);
        let a = store.capture_preset("A", &[0.2, 0.8]).unwrap();
        let b = store.capture_preset("B", &[0.9, 0.1]).unwrap();
        store.add_clip(a, 0.0, Lane::Top).unwrap();
        store.add_clip(b, 10.0, Lane::Bottom).unwrap();

        let (handles, blender) = rig(2);
        blender.apply(&store.evaluate(5.0), store.presets());
        assert!((handles[0].value() - 0.55).abs() < 1e-3);
        assert!((handles[1].value() - 0.45).abs() < 1e-3);
    }

    #[test]
    fn single_clip_holds_exact_values() {
        let mut store = AutomationStore::new(2);
        let a = store.capture_preset("A", &[0.2, 0.8]).unwrap();
        store.add_clip(a, 3.0, Lane::Top).unwrap();

        let (handles, blender) = rig(2);
        blender.apply(&store.evaluate(100.0), store.presets());
        assert_eq!(handles[0].value(), 0.2);
        assert_eq!(handles[1].value(), 0.8);
    }

    #[test]
    fn no_points_means_no_writes() {
        let store = AutomationStore::new(1);
        let (handles, blender) = rig(1);
        blender.apply(&store.evaluate(7.0), store.presets());
        assert_eq!(handles[0].writes.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn redundant_writes_are_skipped() {
        let mut store = AutomationStore::new(1);
        let a = store.capture_preset("A", &[0.4]).unwrap();
        store.add_clip(a, 0.0, Lane::Top).unwrap();

        let (handles, blender) = rig(1);
        blender.apply(&store.evaluate(1.0), store.presets());
        blender.apply(&store.evaluate(2.0), store.presets());
        assert_eq!(handles[0].writes.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn inactive_slots_are_left_alone() {
        let mut store = AutomationStore::new(2);
        let a = store.capture_preset("A", &[0.3, 0.6]).unwrap();
        store.add_clip(a, 0.0, Lane::Top).unwrap();

        let (handles, mut blender) = rig(2);
        blender.set_active(1, false);
        handles[1].set_value(0.99);
        blender.apply(&store.evaluate(1.0), store.presets());
        assert_eq!(handles[0].value(), 0.3);
        assert_eq!(handles[1].value(), 0.99);
    }

    #[test]
    fn path_side_falls_back_to_clip_side() {
        let mut store = AutomationStore::new(1);
        let a = store.capture_preset("A", &[0.25]).unwrap();
        store.add_clip(a, 0.0, Lane::Top).unwrap();
        store.add_path(10.0, 1.0, 0.5);

        let (handles, blender) = rig(1);
        blender.apply(&store.evaluate(5.0), store.presets());
        assert_eq!(handles[0].value(), 0.25);
    }

    #[test]
    fn two_paths_write_nothing() {
        let mut store = AutomationStore::new(1);
        store.add_path(0.0, 0.0, 0.5);
        store.add_path(10.0, 1.0, 0.5);

        let (handles, blender) = rig(1);
        blender.apply(&store.evaluate(5.0), store.presets());
        assert_eq!(handles[0].writes.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn same_preset_blend_is_exact() {
        let mut store = AutomationStore::new(2);
        let a = store.capture_preset("A", &[0.2, 0.8]).unwrap();
        store.add_clip(a, 0.0, Lane::Top).unwrap();
        store.add_clip(a, 10.0, Lane::Top).unwrap();

        let (handles, blender) = rig(2);
        blender.apply(&store.evaluate(3.7), store.presets());
        assert_eq!(handles[0].value(), 0.2);
        assert_eq!(handles[1].value(), 0.8);
    }
}
