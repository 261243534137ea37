//! # Sweep Path
//!
//! The boustrophedon raster the automatic scan follows. Pure geometry: the
//! runtime layer pulls one position per tick and feeds it to detection.
//!
//! ## Path Shape
//! ```text
//! (x1,y1)
//!    ●──►──►──►──►──►──►──►──►──►──┐
//!                                   │  advance = range / 2
//!    ┌──◄──◄──◄──◄──◄──◄──◄──◄──◄──●
//!    │
//!    ●──►──►──►──►──►──►──►──►──►──┐
//!                                   ⋮
//!  ─────────────────────────────────────── y2: path ends, settle, finalize
//! ```
//!
//! The position is emitted *before* it is advanced, so a row ends one step
//! short of the bound and the clamped bound position opens the next row.
//! The advance is fixed when the path is built; later range changes only
//! affect proximity tests.

use crate::types::{PackageBounds, Point};

/// Iterator over the positions visited by one automatic sweep.
#[derive(Debug, Clone)]
pub struct SweepPath {
    bounds: PackageBounds,
    step: f64,
    advance: f64,
    x: f64,
    y: f64,
    direction: f64,
    finished: bool,
}

impl SweepPath {
    /// Starts a sweep at the top-left corner of `bounds`.
    ///
    /// `step` and `range` must be positive or the path never ends; both are
    /// validated before they reach here.
    pub fn new(bounds: PackageBounds, step: f64, range: f64) -> Self {
        let origin = bounds.origin();
        SweepPath {
            bounds,
            step,
            advance: range / 2.0,
            x: origin.x,
            y: origin.y,
            direction: 1.0,
            finished: false,
        }
    }

    /// Vertical advance per row, captured at construction.
    pub fn advance(&self) -> f64 {
        self.advance
    }

    /// True once the vertical advance reached the bottom bound.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl Iterator for SweepPath {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        if self.finished {
            return None;
        }

        let current = Point::new(self.x, self.y);

        self.x += self.step * self.direction;
        if self.x >= self.bounds.x2 || self.x <= self.bounds.x1 {
            self.direction = -self.direction;
            self.y += self.advance;
            self.x = self.x.clamp(self.bounds.x1, self.bounds.x2);
        }

        if self.y >= self.bounds.y2 {
            self.finished = true;
        }

        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sweep_covers_fifteen_rows() {
        let path = SweepPath::new(PackageBounds::default(), 25.0, 80.0);
        let points: Vec<Point> = path.collect();

        assert_eq!(points.len(), 390);
        assert_eq!(points[0], Point::new(50.0, 50.0));
        assert_eq!(points.last().copied(), Some(Point::new(675.0, 610.0)));
    }

    #[test]
    fn test_reverses_and_clamps_at_bound() {
        let points: Vec<Point> = SweepPath::new(PackageBounds::default(), 25.0, 80.0)
            .skip(25)
            .take(3)
            .collect();

        assert_eq!(
            points,
            vec![
                Point::new(675.0, 50.0),
                Point::new(700.0, 90.0),
                Point::new(675.0, 90.0)
            ]
        );
    }

    #[test]
    fn test_stays_inside_bounds() {
        let bounds = PackageBounds::default();
        assert!(SweepPath::new(bounds, 25.0, 80.0).all(|p| bounds.contains(p)));
    }

    #[test]
    fn test_larger_range_means_fewer_rows() {
        let bounds = PackageBounds::default();
        let narrow = SweepPath::new(bounds, 25.0, 40.0).count();
        let wide = SweepPath::new(bounds, 25.0, 200.0).count();
        assert!(wide < narrow);
    }

    #[test]
    fn test_finished_path_yields_nothing() {
        let mut path = SweepPath::new(PackageBounds::new(0.0, 0.0, 100.0, 10.0), 50.0, 40.0);
        // (0,0) then (50,0); the next step hits x2 and the advance crosses y2
        assert_eq!(path.next(), Some(Point::new(0.0, 0.0)));
        assert_eq!(path.next(), Some(Point::new(50.0, 0.0)));
        assert!(path.is_finished());
        assert_eq!(path.next(), None);
    }
}
