//! Editor grid for the automation timeline. Computes cached gridline
//! pixel offsets with bar labels for the current view and snaps edit
//! positions to the nearest active subdivision. Purely an editing-side
//! helper; nothing here runs on the audio thread.

use serde::{Deserialize, Serialize};

pub const MIN_GRID_WIDTH: i8 = -2;
pub const MAX_GRID_WIDTH: i8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    pub numerator: u32,
    pub denominator: u32,
}

impl TimeSignature {
    pub fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator: numerator.max(1),
            denominator: denominator.max(1),
        }
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::new(4, 4)
    }
}

/// One vertical line in the grid overlay. Bar starts carry a label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridLine {
    pub offset_px: f32,
    pub label: Option<String>,
}

/// View-dependent grid state. `reset` recomputes the cached lines
/// whenever zoom, view width, tempo, or meter changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    zoom_px_per_sec: f32,
    width_px: f32,
    tempo_bpm: f64,
    signature: TimeSignature,
    grid_width: i8,
    triplet: bool,
    lines: Vec<GridLine>,
}

impl Grid {
    pub fn new() -> Self {
        Self {
            zoom_px_per_sec: 100.0,
            width_px: 0.0,
            tempo_bpm: 120.0,
            signature: TimeSignature::default(),
            grid_width: 0,
            triplet: false,
            lines: Vec::new(),
        }
    }

    pub fn reset(
        &mut self,
        zoom_px_per_sec: f32,
        width_px: f32,
        tempo_bpm: f64,
        signature: TimeSignature,
    ) {
        self.zoom_px_per_sec = zoom_px_per_sec.max(1.0);
        self.width_px = width_px.max(0.0);
        self.tempo_bpm = tempo_bpm.max(1.0);
        self.signature = signature;
        self.rebuild_lines();
    }

    /// Subdivision density. Negative values subdivide the beat, zero is
    /// one line per beat, positive values coarsen toward bar lines.
    pub fn set_grid_width(&mut self, grid_width: i8) {
        self.grid_width = grid_width.clamp(MIN_GRID_WIDTH, MAX_GRID_WIDTH);
        self.rebuild_lines();
    }

    pub fn grid_width(&self) -> i8 {
        self.grid_width
    }

    pub fn set_triplet(&mut self, triplet: bool) {
        self.triplet = triplet;
        self.rebuild_lines();
    }

    pub fn triplet(&self) -> bool {
        self.triplet
    }

    pub fn lines(&self) -> &[GridLine] {
        &self.lines
    }

    /// Snaps a view-space position to the nearest active subdivision
    /// line. Idempotent: snapping a snapped position is a no-op.
    pub fn quantize(&self, position_px: f32) -> f32 {
        let step = self.step_px();
        if step <= 0.0 {
            return position_px.max(0.0);
        }
        (position_px.max(0.0) / step).round() * step
    }

    fn step_beats(&self) -> f64 {
        let base = match self.grid_width {
            -2 => 0.25,
            -1 => 0.5,
            0 => 1.0,
            1 => (f64::from(self.signature.numerator) / 2.0).max(1.0),
            _ => f64::from(self.signature.numerator),
        };
        if self.triplet {
            base * 2.0 / 3.0
        } else {
            base
        }
    }

    fn step_px(&self) -> f32 {
        let beat_secs = 60.0 / self.tempo_bpm;
        (self.step_beats() * beat_secs) as f32 * self.zoom_px_per_sec
    }

    fn beats_per_bar(&self) -> f64 {
        f64::from(self.signature.numerator)
    }

    fn rebuild_lines(&mut self) {
        self.lines.clear();
        let step = self.step_px();
        if step <= 0.0 || self.width_px <= 0.0 {
            return;
        }
        let step_beats = self.step_beats();
        let beats_per_bar = self.beats_per_bar();
        let count = (self.width_px / step).floor() as usize;
        for index in 0..=count {
            let beat = index as f64 * step_beats;
            let bar = beat / beats_per_bar;
            let label = if (bar - bar.round()).abs() < 1e-9 {
                Some(format!("{}", bar.round() as u64 + 1))
            } else {
                None
            };
            self.lines.push(GridLine {
                offset_px: index as f32 * step,
                label,
            });
        }
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn grid() -> Grid {
        let mut grid = Grid::new();
        // 120 bpm, 100 px/s: one beat = 0.5 s = 50 px.
        grid.reset(100.0, 800.0, 120.0, TimeSignature::default());
        grid
    }

    #[test]
    fn quantize_rounds_to_nearest_beat() {
        let grid = grid();
        assert_eq!(grid.quantize(0.0), 0.0);
        assert_eq!(grid.quantize(24.0), 0.0);
        assert_eq!(grid.quantize(26.0), 50.0);
        assert_eq!(grid.quantize(149.0), 150.0);
    }

    #[test]
    fn quantize_is_idempotent() {
        let mut grid = grid();
        for width in MIN_GRID_WIDTH..=MAX_GRID_WIDTH {
            grid.set_grid_width(width);
            for raw in [0.0, 13.7, 99.9, 431.2, 799.0] {
                let once = grid.quantize(raw);
                assert_eq!(grid.quantize(once), once, "width {width}, raw {raw}");
            }
        }
    }

    #[test]
    fn negative_width_subdivides_the_beat() {
        let mut grid = grid();
        grid.set_grid_width(-2);
        // Sixteenth lines: 12.5 px apart.
        assert_eq!(grid.quantize(13.0), 12.5);
    }

    #[test]
    fn positive_width_snaps_to_bars() {
        let mut grid = grid();
        grid.set_grid_width(2);
        // One bar of 4/4 at 120 bpm is 2 s = 200 px.
        assert_eq!(grid.quantize(140.0), 200.0);
        assert_eq!(grid.quantize(90.0), 0.0);
    }

    #[test]
    fn triplet_mode_compresses_the_step() {
        let mut grid = grid();
        grid.set_triplet(true);
        // A triplet beat step is 50 * 2/3 px.
        let step = 50.0 * 2.0 / 3.0;
        assert!((grid.quantize(30.0) - step).abs() < 1e-4);
    }

    #[test]
    fn grid_width_is_clamped() {
        let mut grid = grid();
        grid.set_grid_width(9);
        assert_eq!(grid.grid_width(), MAX_GRID_WIDTH);
        grid.set_grid_width(-9);
        assert_eq!(grid.grid_width(), MIN_GRID_WIDTH);
    }

    #[test]
    fn bar_lines_carry_labels() {
        let grid = grid();
        let labels: Vec<_> = grid
            .lines()
            .iter()
            .filter_map(|line| line.label.clone())
            .collect();
        // 800 px = 8 s = 4 bars of 4/4, plus the line starting bar 5.
        assert_eq!(labels, vec!["1", "2", "3", "4", "5"]);
        assert_eq!(grid.lines().len(), 17);
    }

    #[test]
    fn reset_recomputes_line_cache() {
        let mut grid = grid();
        let before = grid.lines().len();
        grid.reset(200.0, 800.0, 120.0, TimeSignature::default());
        assert_ne!(grid.lines().len(), before);
        assert_eq!(grid.lines()[1].offset_px, 100.0);
    }
}
