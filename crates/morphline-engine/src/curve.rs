//! The committed blend curve: a piecewise-quadratic shape derived from
//! the fused clip/path point sequence. The curve's vertical coordinate
//! doubles as the blend weight, so sampling it at the playhead position
//! yields the interpolation weight between the two bounding presets.

use crate::store::{AutomationPoint, Lane, PointSource};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Segment {
    x0: f32,
    y0: f32,
    cx: f32,
    cy: f32,
    x1: f32,
    y1: f32,
}

impl Segment {
    /// Solves the quadratic Bezier's horizontal polynomial for the
    /// parameter at `x`, then returns the vertical coordinate there.
    fn sample_y(&self, x: f32) -> f32 {
        let t = self.solve_t(x);
        let mt = 1.0 - t;
        mt * mt * self.y0 + 2.0 * mt * t * self.cy + t * t * self.y1
    }

    fn solve_t(&self, x: f32) -> f32 {
        let a = self.x0 - 2.0 * self.cx + self.x1;
        let b = 2.0 * (self.cx - self.x0);
        let c = self.x0 - x;
        if a.abs() < 1e-9 {
            if b.abs() < 1e-9 {
                return 0.0;
            }
            return (-c / b).clamp(0.0, 1.0);
        }
        let discriminant = (b * b - 4.0 * a * c).max(0.0);
        let root = discriminant.sqrt();
        // x(t) is monotonic because the control point sits between the
        // endpoints, so exactly one root lands in [0, 1].
        let t = (-b + root) / (2.0 * a);
        if (0.0..=1.0).contains(&t) {
            t
        } else {
            ((-b - root) / (2.0 * a)).clamp(0.0, 1.0)
        }
    }
}

/// The derived automation curve. Rebuilt from scratch by the editing
/// thread after every structural mutation; the real-time thread only
/// samples it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlendCurve {
    segments: Vec<Segment>,
    first: Option<(f32, f32)>,
    last: Option<(f32, f32)>,
}

impl BlendCurve {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_none()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Folds the sorted point sequence into quadratic segments. Each
    /// point contributes one control point whose horizontal bias
    /// depends on whether the segment rises or falls:
    ///
    /// ```text
    /// ctrl_x = cx0 + (p.x - cx0) * if rising { p.c } else { 1 - p.c }
    /// ctrl_y = min(cy0, p.y) + |p.y - cy0| * (1 - p.c)
    /// ```
    ///
    /// The first point only seeds the running endpoint; the curve is
    /// undefined before it.
    pub fn rebuild(&mut self, points: &[AutomationPoint]) {
        self.segments.clear();
        self.first = None;
        self.last = None;

        let mut iter = points.iter();
        let Some(first) = iter.next() else {
            return;
        };
        self.first = Some((first.x, first.y));
        let (mut cx0, mut cy0) = (first.x, first.y);
        for point in iter {
            let bias = if cy0 < point.y {
                point.c
            } else {
                1.0 - point.c
            };
            let cx = cx0 + (point.x - cx0) * bias;
            let cy = cy0.min(point.y) + (point.y - cy0).abs() * (1.0 - point.c);
            self.segments.push(Segment {
                x0: cx0,
                y0: cy0,
                cx,
                cy,
                x1: point.x,
                y1: point.y,
            });
            cx0 = point.x;
            cy0 = point.y;
        }
        self.last = Some((cx0, cy0));
    }

    /// Samples the curve's vertical coordinate at `x`. `None` before
    /// the first point; constant at the last point's value beyond it.
    pub fn sample(&self, x: f32) -> Option<f32> {
        let (first_x, first_y) = self.first?;
        if x < first_x {
            return None;
        }
        let (last_x, last_y) = self.last?;
        if x >= last_x || self.segments.is_empty() {
            return Some(last_y);
        }
        if x == first_x {
            return Some(first_y);
        }
        let index = self.segments.partition_point(|segment| segment.x1 <= x);
        match self.segments.get(index) {
            Some(segment) => Some(segment.sample_y(x)),
            None => Some(last_y),
        }
    }
}

/// The two automation points bounding a playhead position, plus the
/// effective blend position when both sides are bound. `a` is the
/// nearer point whenever only one side exists.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClipPair {
    pub a: Option<AutomationPoint>,
    pub b: Option<AutomationPoint>,
    pub weight: Option<f32>,
}

impl ClipPair {
    pub fn is_empty(&self) -> bool {
        self.a.is_none() && self.b.is_none()
    }
}

/// Locates the bounding points around `t` and, when both sides exist,
/// derives the blend weight from the curve. A Bottom-lane clip on the
/// left flips the blend direction.
pub fn evaluate(points: &[AutomationPoint], curve: &BlendCurve, t: f32) -> ClipPair {
    // First point strictly past `t`; everything before it is at or
    // behind the playhead. Points sharing an x at or behind `t` all
    // land on the left, so the last of them becomes the left bound.
    let split = points.partition_point(|point| point.x <= t);
    let left = split.checked_sub(1).map(|index| points[index]);
    let right = points.get(split).copied();

    match (left, right) {
        (None, None) => ClipPair::default(),
        (Some(a), None) => ClipPair {
            a: Some(a),
            b: None,
            weight: None,
        },
        (None, Some(b)) => ClipPair {
            a: Some(b),
            b: None,
            weight: None,
        },
        (Some(a), Some(b)) => {
            let raw = curve.sample(t).unwrap_or(a.y).clamp(0.0, 1.0);
            let weight = match a.source {
                PointSource::Clip { lane: Lane::Bottom, .. } => 1.0 - raw,
                _ => raw,
            };
            ClipPair {
                a: Some(a),
                b: Some(b),
                weight: Some(weight),
            }
        }
    }
}
