use crate::foundation::error::{BlitError, BlitResult};

/// Integer rectangle with exclusive right/bottom edges.
///
/// Spans are non-negative; a rectangle with a zero span denotes "nothing to
/// draw" and every operation over it is a no-op.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// The canonical empty rectangle at the origin.
    pub const EMPTY: Rect = Rect {
        x: 0,
        y: 0,
        width: 0,
        height: 0,
    };

    pub fn new(x: i32, y: i32, width: i32, height: i32) -> BlitResult<Self> {
        if width < 0 || height < 0 {
            return Err(BlitError::validation(format!(
                "Rect spans must be non-negative, got {width}x{height}"
            )));
        }
        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }

    pub fn from_size(width: i32, height: i32) -> BlitResult<Self> {
        Self::new(0, 0, width, height)
    }

    pub fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Exclusive right edge.
    pub fn right(self) -> i32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(self) -> i32 {
        self.y + self.height
    }

    pub fn area(self) -> u64 {
        if self.is_empty() {
            return 0;
        }
        (self.width as u64) * (self.height as u64)
    }

    /// Intersection of two rectangles, normalized to [`Rect::EMPTY`] when the
    /// rectangles do not overlap.
    pub fn intersect(self, other: Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= x || bottom <= y {
            return Rect::EMPTY;
        }
        Rect {
            x,
            y,
            width: right - x,
            height: bottom - y,
        }
    }

    /// True if `other` lies entirely within `self`. Empty rectangles are
    /// contained everywhere.
    pub fn contains_rect(self, other: Rect) -> bool {
        if other.is_empty() {
            return true;
        }
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_negative_spans() {
        assert!(Rect::new(0, 0, -1, 4).is_err());
        assert!(Rect::new(0, 0, 4, -1).is_err());
        assert!(Rect::new(-5, -5, 0, 0).is_ok());
    }

    #[test]
    fn intersect_overlapping() {
        let a = Rect::new(0, 0, 10, 10).unwrap();
        let b = Rect::new(4, 6, 10, 10).unwrap();
        assert_eq!(a.intersect(b), Rect::new(4, 6, 6, 4).unwrap());
    }

    #[test]
    fn intersect_disjoint_is_empty() {
        let a = Rect::new(0, 0, 4, 4).unwrap();
        let b = Rect::new(4, 0, 4, 4).unwrap();
        assert!(a.intersect(b).is_empty());
        assert_eq!(a.intersect(b), Rect::EMPTY);
    }

    #[test]
    fn contains_rect_edges_and_empty() {
        let outer = Rect::new(0, 0, 8, 8).unwrap();
        assert!(outer.contains_rect(Rect::new(0, 0, 8, 8).unwrap()));
        assert!(outer.contains_rect(Rect::new(7, 7, 1, 1).unwrap()));
        assert!(!outer.contains_rect(Rect::new(7, 7, 2, 1).unwrap()));
        assert!(outer.contains_rect(Rect::EMPTY));
    }

    #[test]
    fn area_of_empty_is_zero() {
        assert_eq!(Rect::EMPTY.area(), 0);
        assert_eq!(Rect::new(1, 2, 3, 4).unwrap().area(), 12);
    }
}
