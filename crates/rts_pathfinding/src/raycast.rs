//! Grid ray casting.
//!
//! [`trace`] walks the cells crossed by the segment between two cell
//! centres. Each step moves along exactly one axis, so consecutive cells
//! always share an edge and a ray can never slip diagonally between two
//! blocked cells. A ray from `(x0, y0)` to `(x1, y1)` visits exactly
//! `1 + |x1 - x0| + |y1 - y0|` cells, endpoints included.
//!
//! The stepping uses an integer error accumulator only, so traces are
//! identical on every platform.
//!
//! More information: <http://playtechs.blogspot.com/2007/03/raytracing-on-grid.html>

use std::iter::FusedIterator;

use crate::finder::Path;
use crate::grid::GridPos;

/// Lazy iterator over the cells of a ray.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RayTrace {
    source: GridPos,
    destination: GridPos,
    x: i64,
    y: i64,
    x_inc: i64,
    y_inc: i64,
    dx2: i64,
    dy2: i64,
    error: i64,
    remaining: usize,
}

/// Trace the cells from `source` to `destination`, both inclusive.
#[must_use]
pub fn trace(source: GridPos, destination: GridPos) -> RayTrace {
    let (x0, y0) = (i64::from(source.x), i64::from(source.y));
    let (x1, y1) = (i64::from(destination.x), i64::from(destination.y));
    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();

    RayTrace {
        source,
        destination,
        x: x0,
        y: y0,
        x_inc: if x1 > x0 { 1 } else { -1 },
        y_inc: if y1 > y0 { 1 } else { -1 },
        dx2: dx * 2,
        dy2: dy * 2,
        error: dx - dy,
        remaining: usize::try_from(1 + dx + dy).unwrap_or(usize::MAX),
    }
}

impl RayTrace {
    /// First cell of the ray.
    #[must_use]
    pub const fn source(&self) -> GridPos {
        self.source
    }

    /// Last cell of the ray.
    #[must_use]
    pub const fn destination(&self) -> GridPos {
        self.destination
    }

    /// Rewind to the source cell.
    pub fn restart(&mut self) {
        *self = trace(self.source, self.destination);
    }
}

impl Iterator for RayTrace {
    type Item = GridPos;

    fn next(&mut self) -> Option<GridPos> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        // Coordinates stay between the two i32 endpoints.
        let current = GridPos::new(
            i32::try_from(self.x).unwrap_or_default(),
            i32::try_from(self.y).unwrap_or_default(),
        );
        if self.error > 0 {
            self.x += self.x_inc;
            self.error -= self.dy2;
        } else {
            self.y += self.y_inc;
            self.error += self.dx2;
        }
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for RayTrace {}

impl FusedIterator for RayTrace {}

/// True if every cell on the ray from `a` to `b` is passable.
pub fn has_line_of_sight<F>(a: GridPos, b: GridPos, passable: F) -> bool
where
    F: Fn(GridPos) -> bool,
{
    trace(a, b).all(passable)
}

/// Drop waypoints that can be skipped in a straight line.
///
/// From each kept waypoint, jump to the furthest later waypoint with a clear
/// ray to it. The result keeps the original endpoints.
pub fn smooth_path<F>(path: &[GridPos], passable: F) -> Path
where
    F: Fn(GridPos) -> bool,
{
    if path.len() <= 2 {
        return path.to_vec();
    }

    let last = path.len() - 1;
    let mut smoothed = vec![path[0]];
    let mut anchor = 0;
    while anchor < last {
        let next = (anchor + 2..=last)
            .rev()
            .find(|&i| has_line_of_sight(path[anchor], path[i], &passable))
            .unwrap_or(anchor + 1);
        smoothed.push(path[next]);
        anchor = next;
    }
    smoothed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(x: i32, y: i32) -> GridPos {
        GridPos::new(x, y)
    }

    #[test]
    fn test_known_trace() {
        let cells: Vec<_> = trace(pos(1, 3), pos(3, 0)).collect();
        assert_eq!(
            cells,
            vec![pos(1, 3), pos(1, 2), pos(2, 2), pos(2, 1), pos(3, 1), pos(3, 0)]
        );
    }

    #[test]
    fn test_single_cell_trace() {
        let cells: Vec<_> = trace(pos(4, 4), pos(4, 4)).collect();
        assert_eq!(cells, vec![pos(4, 4)]);
    }

    #[test]
    fn test_trace_is_exact_size_and_fused() {
        let mut ray = trace(pos(-3, 2), pos(5, -4));
        assert_eq!(ray.len(), 1 + 8 + 6);
        ray.next();
        assert_eq!(ray.len(), 14);
        let rest: Vec<_> = ray.by_ref().collect();
        assert_eq!(rest.last(), Some(&pos(5, -4)));
        assert_eq!(ray.next(), None);
        assert_eq!(ray.next(), None);
    }

    #[test]
    fn test_every_step_moves_one_axis() {
        let cells: Vec<_> = trace(pos(0, 0), pos(7, 3)).collect();
        for pair in cells.windows(2) {
            let d = (pair[1].x - pair[0].x).abs() + (pair[1].y - pair[0].y).abs();
            assert_eq!(d, 1, "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_restart_and_clone_replay() {
        let mut ray = trace(pos(0, 0), pos(2, 5));
        let copy = ray.clone();
        let first: Vec<_> = ray.by_ref().collect();
        ray.restart();
        assert_eq!(ray.clone().collect::<Vec<_>>(), first);
        assert_eq!(copy.collect::<Vec<_>>(), first);
        assert_eq!(ray.source(), pos(0, 0));
        assert_eq!(ray.destination(), pos(2, 5));
    }

    #[test]
    fn test_line_of_sight() {
        let wall = |p: GridPos| p != pos(2, 2);
        assert!(has_line_of_sight(pos(0, 0), pos(4, 0), wall));
        assert!(!has_line_of_sight(pos(0, 0), pos(4, 4), wall));
    }

    #[test]
    fn test_path_smoothing() {
        let path = vec![pos(0, 0), pos(1, 1), pos(2, 2), pos(3, 3), pos(4, 4)];
        let smoothed = smooth_path(&path, |_| true);
        assert_eq!(smoothed, vec![pos(0, 0), pos(4, 4)]);
    }

    #[test]
    fn test_smoothing_keeps_corners_around_obstacles() {
        let blocked = [pos(1, 1), pos(2, 1)];
        let passable = |p: GridPos| !blocked.contains(&p);
        let path = vec![pos(0, 2), pos(1, 2), pos(2, 2), pos(3, 1), pos(3, 0)];
        let smoothed = smooth_path(&path, passable);
        assert_eq!(smoothed, vec![pos(0, 2), pos(2, 2), pos(3, 1), pos(3, 0)]);
    }
}
