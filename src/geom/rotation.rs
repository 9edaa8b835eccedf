use crate::geom::rect::Rect;

/// 90-degree-step rotation between the user coordinate frame and the base
/// (device) coordinate frame of a destination buffer.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

/// Axis permutation and flip flags for one rotation step, plus the small
/// shift corrections (0 or -1) applied when mapping inclusive point
/// coordinates along a flipped axis.
///
/// The table below is read-only for the lifetime of the process and safe to
/// share across threads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AxisMap {
    pub swap_axes: bool,
    pub flip_x: bool,
    pub flip_y: bool,
    pub shift_x: i32,
    pub shift_y: i32,
}

const AXIS_MAPS: [AxisMap; 4] = [
    // R0
    AxisMap {
        swap_axes: false,
        flip_x: false,
        flip_y: false,
        shift_x: 0,
        shift_y: 0,
    },
    // R90: user (x, y) -> base (base_w - 1 - y, x)
    AxisMap {
        swap_axes: true,
        flip_x: true,
        flip_y: false,
        shift_x: -1,
        shift_y: 0,
    },
    // R180: user (x, y) -> base (base_w - 1 - x, base_h - 1 - y)
    AxisMap {
        swap_axes: false,
        flip_x: true,
        flip_y: true,
        shift_x: -1,
        shift_y: -1,
    },
    // R270: user (x, y) -> base (y, base_h - 1 - x)
    AxisMap {
        swap_axes: true,
        flip_x: false,
        flip_y: true,
        shift_x: 0,
        shift_y: -1,
    },
];

impl Rotation {
    /// Axis mapping for this rotation step.
    pub fn axis_map(self) -> &'static AxisMap {
        let idx = match self {
            Rotation::R0 => 0,
            Rotation::R90 => 1,
            Rotation::R180 => 2,
            Rotation::R270 => 3,
        };
        &AXIS_MAPS[idx]
    }
}

impl AxisMap {
    /// Maps an inclusive user-frame point into the base frame of a
    /// `base_w` x `base_h` destination.
    pub fn map_point(&self, x: i32, y: i32, base_w: i32, base_h: i32) -> (i32, i32) {
        let (px, py) = if self.swap_axes { (y, x) } else { (x, y) };
        let bx = if self.flip_x {
            base_w + self.shift_x - px
        } else {
            px
        };
        let by = if self.flip_y {
            base_h + self.shift_y - py
        } else {
            py
        };
        (bx, by)
    }

    /// Inverse of [`AxisMap::map_point`]: base frame back to the user frame.
    pub fn unmap_point(&self, bx: i32, by: i32, base_w: i32, base_h: i32) -> (i32, i32) {
        let px = if self.flip_x {
            base_w + self.shift_x - bx
        } else {
            bx
        };
        let py = if self.flip_y {
            base_h + self.shift_y - by
        } else {
            by
        };
        if self.swap_axes { (py, px) } else { (px, py) }
    }

    /// Maps a user-frame rectangle (exclusive spans) into the base frame.
    ///
    /// The inclusive corner points are mapped individually, so the shift
    /// corrections cancel and the mapped rectangle covers exactly the same
    /// pixel set.
    pub fn map_rect(&self, r: Rect, base_w: i32, base_h: i32) -> Rect {
        if r.is_empty() {
            return Rect::EMPTY;
        }
        let (ax, ay) = self.map_point(r.x, r.y, base_w, base_h);
        let (bx, by) = self.map_point(r.right() - 1, r.bottom() - 1, base_w, base_h);
        Rect {
            x: ax.min(bx),
            y: ay.min(by),
            width: (ax - bx).abs() + 1,
            height: (ay - by).abs() + 1,
        }
    }
}
