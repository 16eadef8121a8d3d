//! Clips, paths, and the fused point sequence they project onto. Every
//! mutation re-sorts the collections, rebuilds the blend curve, bumps
//! the revision counter, and notifies subscribers before returning, so
//! readers never observe a partially-rebuilt state.

use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

use crate::curve::{self, BlendCurve, ClipPair};
use crate::error::{AutomationError, PresetError};
use crate::preset::{Preset, PresetId, PresetStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClipId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathId(pub u64);

/// Binary placement of a clip. The lane decides the clip's vertical
/// coordinate on the blend curve and therefore the blend direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Lane {
    #[default]
    Top,
    Bottom,
}

impl Lane {
    pub fn offset(self) -> f32 {
        match self {
            Lane::Top => 0.0,
            Lane::Bottom => 1.0,
        }
    }
}

/// A timed placement of a preset. Parameter values are always read
/// through the referenced preset; clips never copy them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub id: ClipId,
    pub x: f32,
    pub lane: Lane,
    pub shape: f32,
    pub preset: PresetId,
}

/// A free-standing curve control point with no preset payload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub id: PathId,
    pub x: f32,
    pub y: f32,
    pub shape: f32,
}

/// Time range used for bulk deletion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub start: f32,
    pub end: f32,
}

impl Selection {
    pub fn new(start: f32, end: f32) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    pub fn contains(&self, x: f32) -> bool {
        self.start <= x && x <= self.end
    }
}

/// Back-reference from a fused point to the clip or path it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointSource {
    Clip {
        id: ClipId,
        preset: PresetId,
        lane: Lane,
    },
    Path {
        id: PathId,
    },
}

impl PointSource {
    pub fn preset(&self) -> Option<PresetId> {
        match self {
            PointSource::Clip { preset, .. } => Some(*preset),
            PointSource::Path { .. } => None,
        }
    }
}

/// Read-only fused view over clips and paths, ascending by `x`. This
/// sequence is the only input to curve construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutomationPoint {
    pub x: f32,
    pub y: f32,
    pub c: f32,
    pub source: PointSource,
}

// UI drags routinely run past the view edges, so positions are only
// clamped; a normalized field outside [0,1] indicates a caller bug.
fn bounded_position(x: f32) -> f32 {
    debug_assert!(!x.is_nan(), "position is NaN");
    x.max(0.0)
}

fn bounded_unit(value: f32, what: &str) -> f32 {
    debug_assert!(
        (0.0..=1.0).contains(&value),
        "{what} out of range: {value}"
    );
    value.clamp(0.0, 1.0)
}

/// Broadcast to subscribers after every committed mutation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StoreEvent {
    Changed { revision: u64 },
}

/// Owns the preset store, the clip/path collections, and the derived
/// blend curve. Created and mutated only inside an exclusive window on
/// the editing thread.
#[derive(Debug)]
pub struct AutomationStore {
    presets: PresetStore,
    clips: Vec<Clip>,
    paths: Vec<Path>,
    points: Vec<AutomationPoint>,
    curve: BlendCurve,
    revision: u64,
    next_clip: u64,
    next_path: u64,
    subscribers: Vec<Sender<StoreEvent>>,
}

impl AutomationStore {
    pub fn new(parameter_count: usize) -> Self {
        Self {
            presets: PresetStore::new(parameter_count),
            clips: Vec::new(),
            paths: Vec::new(),
            points: Vec::new(),
            curve: BlendCurve::new(),
            revision: 0,
            next_clip: 1,
            next_path: 1,
            subscribers: Vec::new(),
        }
    }

    pub fn presets(&self) -> &PresetStore {
        &self.presets
    }

    /// Fixes the live parameter count. Called during instantiation
    /// setup, before any preset exists.
    pub fn set_parameter_count(&mut self, count: usize) {
        self.presets.set_parameter_count(count);
    }

    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    pub fn points(&self) -> &[AutomationPoint] {
        &self.points
    }

    pub fn curve(&self) -> &BlendCurve {
        &self.curve
    }

    /// Monotonically increasing; bumped on every committed mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Registers a change listener. Disconnected receivers are pruned
    /// on the next commit.
    pub fn subscribe(&mut self) -> Receiver<StoreEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    pub fn capture_preset(
        &mut self,
        name: impl Into<String>,
        values: &[f32],
    ) -> Result<PresetId, AutomationError> {
        self.presets.capture(name, values)
    }

    pub fn overwrite_preset(
        &mut self,
        id: PresetId,
        values: &[f32],
    ) -> Result<(), AutomationError> {
        self.presets.overwrite(id, values)
    }

    /// Removes a preset and every clip referencing it.
    pub fn remove_preset(&mut self, id: PresetId) -> Result<Preset, AutomationError> {
        let preset = self.presets.remove(id)?;
        let before = self.clips.len();
        self.clips.retain(|clip| clip.preset != id);
        let dropped = before - self.clips.len();
        if dropped > 0 {
            log::debug!("removing preset `{}` dropped {dropped} clip(s)", preset.name);
        }
        self.commit();
        Ok(preset)
    }

    pub fn add_clip(
        &mut self,
        preset: PresetId,
        x: f32,
        lane: Lane,
    ) -> Result<ClipId, AutomationError> {
        if !self.presets.contains(preset) {
            return Err(PresetError::Dangling(preset).into());
        }
        let id = ClipId(self.next_clip);
        self.next_clip += 1;
        self.clips.push(Clip {
            id,
            x: bounded_position(x),
            lane,
            shape: 0.5,
            preset,
        });
        self.commit();
        Ok(id)
    }

    pub fn remove_clip(&mut self, id: ClipId) -> Result<(), AutomationError> {
        let index = self
            .clips
            .iter()
            .position(|clip| clip.id == id)
            .ok_or(AutomationError::NotFound)?;
        self.clips.remove(index);
        self.commit();
        Ok(())
    }

    pub fn move_clip(
        &mut self,
        id: ClipId,
        x: f32,
        lane: Lane,
        shape: f32,
    ) -> Result<(), AutomationError> {
        let clip = self
            .clips
            .iter_mut()
            .find(|clip| clip.id == id)
            .ok_or(AutomationError::NotFound)?;
        clip.x = bounded_position(x);
        clip.lane = lane;
        clip.shape = bounded_unit(shape, "clip shape");
        self.commit();
        Ok(())
    }

    pub fn add_path(&mut self, x: f32, y: f32, shape: f32) -> PathId {
        let id = PathId(self.next_path);
        self.next_path += 1;
        self.paths.push(Path {
            id,
            x: bounded_position(x),
            y: bounded_unit(y, "path y"),
            shape: bounded_unit(shape, "path shape"),
        });
        self.commit();
        id
    }

    pub fn remove_path(&mut self, id: PathId) -> Result<(), AutomationError> {
        let index = self
            .paths
            .iter()
            .position(|path| path.id == id)
            .ok_or(AutomationError::NotFound)?;
        self.paths.remove(index);
        self.commit();
        Ok(())
    }

    pub fn move_path(
        &mut self,
        id: PathId,
        x: f32,
        y: f32,
        shape: f32,
    ) -> Result<(), AutomationError> {
        let path = self
            .paths
            .iter_mut()
            .find(|path| path.id == id)
            .ok_or(AutomationError::NotFound)?;
        path.x = bounded_position(x);
        path.y = bounded_unit(y, "path y");
        path.shape = bounded_unit(shape, "path shape");
        self.commit();
        Ok(())
    }

    /// Deletes every clip and path inside the selection, inclusive.
    pub fn remove_in_range(&mut self, selection: Selection) {
        self.clips.retain(|clip| !selection.contains(clip.x));
        self.paths.retain(|path| !selection.contains(path.x));
        self.commit();
    }

    /// Finds the bounding points around `t` and the blend weight when
    /// both sides are populated. Read-only; safe on the real-time
    /// thread while the store is committed.
    pub fn evaluate(&self, t: f32) -> ClipPair {
        curve::evaluate(&self.points, &self.curve, t)
    }

    fn commit(&mut self) {
        self.clips.sort_by(|a, b| a.x.total_cmp(&b.x));
        self.paths.sort_by(|a, b| a.x.total_cmp(&b.x));

        self.points.clear();
        for clip in &self.clips {
            self.points.push(AutomationPoint {
                x: clip.x,
                y: clip.lane.offset(),
                c: clip.shape,
                source: PointSource::Clip {
                    id: clip.id,
                    preset: clip.preset,
                    lane: clip.lane,
                },
            });
        }
        for path in &self.paths {
            self.points.push(AutomationPoint {
                x: path.x,
                y: path.y,
                c: path.shape,
                source: PointSource::Path { id: path.id },
            });
        }
        // Stable, so same-x points keep insertion order; the evaluator
        // takes the last of them as the left bound.
        self.points.sort_by(|a, b| a.x.total_cmp(&b.x));

        self.curve.rebuild(&self.points);
        self.revision += 1;
        let event = StoreEvent::Changed {
            revision: self.revision,
        };
        self.subscribers.retain(|tx| tx.send(event).is_ok());
    }
}
