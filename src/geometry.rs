//! Pure rectangle arithmetic shared by the frame tree, the window state
//! machine, and the monitor set. Generalized from the teacher's `Quad`
//! (a plain position/size 4-tuple) into the split/inset/edge-adjust
//! operations a binary frame partition needs.

/// A rectangle in root (screen) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Axis a frame is split along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Cardinal direction used by focus/exchange traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Edge deltas in pixels, `(left, top, right, bottom)`, as used by
/// `resize_by`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeDelta {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rectangle {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Rectangle {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_size(width: u32, height: u32) -> Self {
        Rectangle::new(0, 0, width, height)
    }

    pub fn center(&self) -> (i32, i32) {
        (
            self.x + self.width as i32 / 2,
            self.y + self.height as i32 / 2,
        )
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    /// Split into two adjacent rectangles along `axis` at `ratio`
    /// (the first child gets `ratio` of the space). `ratio` is clamped
    /// to `(0.0, 1.0)` exclusive so neither child degenerates.
    pub fn split(&self, axis: Axis, ratio: f64) -> (Rectangle, Rectangle) {
        let ratio = ratio.clamp(0.01, 0.99);
        match axis {
            Axis::Horizontal => {
                let first_width = (self.width as f64 * ratio).round() as u32;
                let second_width = self.width.saturating_sub(first_width);
                (
                    Rectangle::new(self.x, self.y, first_width, self.height),
                    Rectangle::new(self.x + first_width as i32, self.y, second_width, self.height),
                )
            }
            Axis::Vertical => {
                let first_height = (self.height as f64 * ratio).round() as u32;
                let second_height = self.height.saturating_sub(first_height);
                (
                    Rectangle::new(self.x, self.y, self.width, first_height),
                    Rectangle::new(self.x, self.y + first_height as i32, self.width, second_height),
                )
            }
        }
    }

    /// Manhattan distance between centers, used by directional focus.
    pub fn manhattan_distance(&self, other: &Rectangle) -> i64 {
        let (ax, ay) = self.center();
        let (bx, by) = other.center();
        (ax as i64 - bx as i64).abs() + (ay as i64 - by as i64).abs()
    }

    /// Whether `other`'s center lies in the half-plane of `direction`
    /// relative to `self`'s center.
    pub fn is_towards(&self, other: &Rectangle, direction: Direction) -> bool {
        let (ax, ay) = self.center();
        let (bx, by) = other.center();
        match direction {
            Direction::Up => by < ay,
            Direction::Down => by > ay,
            Direction::Left => bx < ax,
            Direction::Right => bx > ax,
        }
    }

    /// Apply an edge delta, returning `None` if either resulting
    /// dimension would drop below `min`.
    pub fn adjusted(&self, delta: EdgeDelta, min: u32) -> Option<Rectangle> {
        let x = self.x + delta.left;
        let y = self.y + delta.top;
        let width = (self.width as i32 + delta.right - delta.left).max(0) as u32;
        let height = (self.height as i32 + delta.bottom - delta.top).max(0) as u32;
        if width < min || height < min {
            None
        } else {
            Some(Rectangle::new(x, y, width, height))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_horizontal_partitions_without_gap_or_overlap() {
        let r = Rectangle::new(0, 0, 1920, 1080);
        let (first, second) = r.split(Axis::Horizontal, 0.5);
        assert_eq!(first, Rectangle::new(0, 0, 960, 1080));
        assert_eq!(second, Rectangle::new(960, 0, 960, 1080));
        assert_eq!(first.width + second.width, r.width);
    }

    #[test]
    fn split_vertical_partitions_without_gap_or_overlap() {
        let r = Rectangle::new(0, 0, 1920, 1080);
        let (first, second) = r.split(Axis::Vertical, 0.25);
        assert_eq!(first.height + second.height, r.height);
        assert_eq!(first, Rectangle::new(0, 0, 1920, 270));
        assert_eq!(second, Rectangle::new(0, 270, 1920, 810));
    }

    #[test]
    fn adjusted_rejects_shrink_below_minimum() {
        let r = Rectangle::new(0, 0, 10, 10);
        assert!(r
            .adjusted(
                EdgeDelta {
                    left: 0,
                    top: 0,
                    right: -9,
                    bottom: 0
                },
                2
            )
            .is_none());
        assert!(r
            .adjusted(
                EdgeDelta {
                    left: 0,
                    top: 0,
                    right: -8,
                    bottom: 0
                },
                2
            )
            .is_some());
    }

    #[test]
    fn is_towards_uses_center_half_plane() {
        let a = Rectangle::new(0, 0, 100, 100);
        let b = Rectangle::new(200, 0, 100, 100);
        assert!(a.is_towards(&b, Direction::Right));
        assert!(!a.is_towards(&b, Direction::Left));
    }
}
