//! Piecewise-linear falloff profile evaluated by every brush.
//!
//! Maps normalized brush distance (0 = center, 1 = edge) to an influence
//! weight. Control points are kept sorted by x.

/// A single falloff control point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePoint {
    pub x: f32,
    pub y: f32,
}

/// Piecewise-linear curve over sorted control points, x in [0, 1]
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    points: Vec<CurvePoint>,
}

impl Default for Curve {
    /// Linear falloff: full influence at the center, none at the edge
    fn default() -> Self {
        Self {
            points: vec![CurvePoint { x: 0.0, y: 1.0 }, CurvePoint { x: 1.0, y: 0.0 }],
        }
    }
}

impl Curve {
    pub fn new(mut points: Vec<CurvePoint>) -> Self {
        points.sort_by(|a, b| a.x.total_cmp(&b.x));
        Self { points }
    }

    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    /// Insert a control point, keeping the list sorted by x
    pub fn add_point(&mut self, x: f32, y: f32) {
        let pos = self.points.partition_point(|p| p.x < x);
        self.points.insert(pos, CurvePoint { x, y });
    }

    /// Evaluate at `x`, interpolating linearly between the bracketing points.
    /// Outside the defined domain the first/last point's y-value is returned.
    pub fn evaluate(&self, x: f32) -> f32 {
        let Some(first) = self.points.first() else {
            return 0.0;
        };
        if x <= first.x {
            return first.y;
        }
        let last = self.points[self.points.len() - 1];
        if x >= last.x {
            return last.y;
        }

        for pair in self.points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if x >= a.x && x <= b.x {
                let span = b.x - a.x;
                if span < 1e-8 {
                    return a.y;
                }
                let t = (x - a.x) / span;
                return a.y + (b.y - a.y) * t;
            }
        }

        last.y
    }
}
