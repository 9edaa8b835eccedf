//! Scaled rectangular blits: the central drawing algorithm.
//!
//! A draw maps a source rectangle onto a destination rectangle given in the
//! user coordinate frame, clips against a user-frame clip rectangle, permutes
//! the iteration axes according to the active rotation and then processes the
//! destination row by row. Three sampling strategies exist:
//!
//! - **exact**: destination spans are integer multiples or divisors of the
//!   source spans, so every destination pixel maps to exactly one source
//!   pixel with no rounding ambiguity;
//! - **nearest**: non-integer ratios with `accurate == false`, floor mapping;
//! - **accurate**: non-integer ratios with `accurate == true`, an
//!   area-weighted box filter over the source pixels each destination pixel
//!   overlaps, computed in premultiplied space with integer weights and a
//!   round-half-up final divide.
//!
//! Work is decomposed across destination row ranges by the parallel split
//! coordinator; each unit owns its scratch row, so nothing mutable is shared.

use crate::buffer::view::{PixelView, PixelViewMut};
use crate::foundation::error::{BlitError, BlitResult};
use crate::geom::rect::Rect;
use crate::geom::rotation::Rotation;
use crate::parallel::split::{SPLIT_AREA_THRESHOLD, SplitTask, run_rows};
use crate::pixel::format::{PixelFn, PixelFormat};
use crate::raster::row::{RowMode, RowOp};

/// True when one span is an exact integer multiple of the other, which lets
/// every destination pixel map to exactly one source pixel.
pub fn is_exact_with_closest(src_span: i32, dst_span: i32) -> bool {
    if src_span <= 0 || dst_span <= 0 {
        return false;
    }
    src_span % dst_span == 0 || dst_span % src_span == 0
}

/// Source/destination extents along one base-frame axis, together with the
/// flip correction needed to recover the user coordinate.
#[derive(Clone, Copy)]
struct AxisSpans {
    src_origin: i32,
    src_span: i32,
    dst_origin: i32,
    dst_span: i32,
    flip: bool,
    shift: i32,
    base_extent: i32,
}

impl AxisSpans {
    /// Base coordinate back to the relative user offset within the
    /// destination rectangle, 0..dst_span.
    fn user_offset(&self, base: i32) -> i32 {
        let user = if self.flip {
            self.base_extent + self.shift - base
        } else {
            base
        };
        user - self.dst_origin
    }

    /// Floor mapping of a relative destination offset to an absolute source
    /// coordinate. Unambiguous for exact ratios, nearest-neighbor otherwise.
    fn nearest_src(&self, offset: i32) -> i32 {
        debug_assert!((0..self.dst_span).contains(&offset));
        self.src_origin
            + ((i64::from(offset) * i64::from(self.src_span)) / i64::from(self.dst_span)) as i32
    }
}

/// Draws `src_rect` of `src` scaled into `dst_rect` of `dst`, clipped to
/// `clip`. `dst_rect` and `clip` are given in the user coordinate frame;
/// `rotation` selects the axis mapping into the destination's base frame.
///
/// Destination pixels outside the intersection of `dst_rect`, `clip` and the
/// buffer bounds are never touched. `src_rect` must lie entirely within the
/// source buffer (`OutOfBounds` otherwise); zero-span rectangles are no-ops.
/// With `mode == RowMode::SrcOver` the destination format must be
/// premultiplied (`IncompatibleBuffer` otherwise).
#[allow(clippy::too_many_arguments)]
#[tracing::instrument(skip(src, dst))]
pub fn draw_rect_scaled(
    parallelism: usize,
    accurate: bool,
    src: PixelView<'_>,
    src_rect: Rect,
    dst: PixelViewMut<'_>,
    dst_rect: Rect,
    clip: Rect,
    rotation: Rotation,
    mode: RowMode,
) -> BlitResult<()> {
    if src_rect.width < 0 || src_rect.height < 0 {
        return Err(BlitError::validation("source rect spans must be non-negative"));
    }
    if !src.bounds().contains_rect(src_rect) {
        return Err(BlitError::out_of_bounds(format!(
            "source rect {src_rect:?} outside {}x{} buffer",
            src.width(),
            src.height()
        )));
    }
    if src_rect.is_empty() || dst_rect.is_empty() {
        return Ok(());
    }

    let base_w = dst.width() as i32;
    let base_h = dst.height() as i32;
    let map = *rotation.axis_map();
    let dst_base = map.map_rect(dst_rect, base_w, base_h);
    let clip_base = map.map_rect(clip, base_w, base_h);
    let target = dst_base.intersect(clip_base).intersect(dst.bounds());
    if target.is_empty() {
        return Ok(());
    }

    // Which source axis each base axis drives: with swapped axes, base X
    // walks the user Y direction and therefore the source rows.
    let (x_axis, y_axis) = if map.swap_axes {
        (
            AxisSpans {
                src_origin: src_rect.y,
                src_span: src_rect.height,
                dst_origin: dst_rect.y,
                dst_span: dst_rect.height,
                flip: map.flip_x,
                shift: map.shift_x,
                base_extent: base_w,
            },
            AxisSpans {
                src_origin: src_rect.x,
                src_span: src_rect.width,
                dst_origin: dst_rect.x,
                dst_span: dst_rect.width,
                flip: map.flip_y,
                shift: map.shift_y,
                base_extent: base_h,
            },
        )
    } else {
        (
            AxisSpans {
                src_origin: src_rect.x,
                src_span: src_rect.width,
                dst_origin: dst_rect.x,
                dst_span: dst_rect.width,
                flip: map.flip_x,
                shift: map.shift_x,
                base_extent: base_w,
            },
            AxisSpans {
                src_origin: src_rect.y,
                src_span: src_rect.height,
                dst_origin: dst_rect.y,
                dst_span: dst_rect.height,
                flip: map.flip_y,
                shift: map.shift_y,
                base_extent: base_h,
            },
        )
    };

    let exact = is_exact_with_closest(x_axis.src_span, x_axis.dst_span)
        && is_exact_with_closest(y_axis.src_span, y_axis.dst_span);
    let resample = accurate && !exact;

    // Resampled rows are produced in canonical premultiplied ARGB; exact and
    // nearest rows stay in the source format and convert inside the row op.
    let row_src_format = if resample {
        PixelFormat::PREMUL_ARGB
    } else {
        src.format()
    };
    let op = RowOp::resolve(row_src_format, dst.format(), mode)?.require_premul_dst()?;
    let load_src = src.format().loader()?;

    let tw = target.width as u32;
    let th = target.height as u32;

    // Column -> relative destination offset, fixed across rows.
    let col_offsets: Vec<i32> = (target.x..target.right())
        .map(|bx| x_axis.user_offset(bx))
        .collect();
    // Nearest/exact paths also fix the driven source coordinate per column.
    let col_src: Vec<i32> = col_offsets
        .iter()
        .map(|&off| x_axis.nearest_src(off))
        .collect();

    // A 1:1 unflipped X axis means source rows can be sliced directly.
    let contiguous_x = !map.swap_axes
        && !x_axis.flip
        && x_axis.src_span == x_axis.dst_span
        && !resample;
    let row_start_x = x_axis.src_origin + (target.x - x_axis.dst_origin);

    let dst_region = dst.sub_view(target)?;
    run_rows(
        parallelism,
        SPLIT_AREA_THRESHOLD,
        tw,
        dst_region,
        SplitTask::new(0, th),
        &|mut unit, task| {
            let src = src.duplicate();
            // The contiguous fast path slices source rows directly and never
            // touches the scratch row.
            let mut scratch = if contiguous_x {
                Vec::new()
            } else {
                vec![0u32; tw as usize]
            };
            for r in 0..task.length {
                let by = target.y + (task.offset + r) as i32;
                let row_offset = y_axis.user_offset(by);
                let dst_row = unit.row_mut(0, r, tw);
                if contiguous_x {
                    let sy = y_axis.nearest_src(row_offset);
                    op.run(src.row(row_start_x as u32, sy as u32, tw), dst_row)?;
                } else if resample {
                    resample_row(
                        &src, load_src, &x_axis, &y_axis, &col_offsets, row_offset,
                        map.swap_axes, &mut scratch,
                    );
                    op.run(&scratch, dst_row)?;
                } else {
                    let row_src = y_axis.nearest_src(row_offset);
                    for (slot, &col) in scratch.iter_mut().zip(&col_src) {
                        let (sx, sy) = if map.swap_axes {
                            (row_src, col)
                        } else {
                            (col, row_src)
                        };
                        *slot = src.get(sx as u32, sy as u32);
                    }
                    op.run(&scratch, dst_row)?;
                }
            }
            Ok(())
        },
    )
}

/// Area-weighted box filter for one destination row.
///
/// On the common grid one source pixel spans `dst_span` units and one
/// destination pixel spans `src_span` units, so overlap lengths are exact
/// integers and the total weight per destination pixel is
/// `src_span_x * src_span_y`. The final divide rounds half up.
#[allow(clippy::too_many_arguments)]
fn resample_row(
    src: &PixelView<'_>,
    load_src: PixelFn,
    x_axis: &AxisSpans,
    y_axis: &AxisSpans,
    col_offsets: &[i32],
    row_offset: i32,
    swap_axes: bool,
    out: &mut [u32],
) {
    let (y0, y1) = overlap_range(row_offset, y_axis);
    let total =
        u64::try_from(i64::from(x_axis.src_span) * i64::from(y_axis.src_span)).unwrap_or(u64::MAX);
    for (slot, &col_offset) in out.iter_mut().zip(col_offsets) {
        let (x0, x1) = overlap_range(col_offset, x_axis);
        let mut acc = [0u64; 4];
        for sy in y0..y1 {
            let wy = overlap_weight(row_offset, sy, y_axis);
            for sx in x0..x1 {
                let wx = overlap_weight(col_offset, sx, x_axis);
                let w = wx * wy;
                let (ax, ay) = if swap_axes { (sy, sx) } else { (sx, sy) };
                let px = load_src(src.get(ax as u32, ay as u32));
                acc[0] += w * u64::from(px >> 24);
                acc[1] += w * u64::from((px >> 16) & 0xff);
                acc[2] += w * u64::from((px >> 8) & 0xff);
                acc[3] += w * u64::from(px & 0xff);
            }
        }
        let half = total / 2;
        let a = ((acc[0] + half) / total) as u32;
        let r = ((acc[1] + half) / total) as u32;
        let g = ((acc[2] + half) / total) as u32;
        let b = ((acc[3] + half) / total) as u32;
        *slot = (a << 24) | (r << 16) | (g << 8) | b;
    }
}

/// Absolute source coordinate range `[start, end)` overlapped by the
/// destination pixel at relative offset `off`.
fn overlap_range(off: i32, axis: &AxisSpans) -> (i32, i32) {
    let ssp = i64::from(axis.src_span);
    let dsp = i64::from(axis.dst_span);
    let lo = i64::from(off) * ssp;
    let hi = lo + ssp;
    let start = lo / dsp;
    // `i64::div_ceil` is unstable (`int_roundings`); open-code the same logic.
    let (q, r) = (hi / dsp, hi % dsp);
    let ceil = if (r > 0 && dsp > 0) || (r < 0 && dsp < 0) { q + 1 } else { q };
    let end = ceil.min(ssp);
    (axis.src_origin + start as i32, axis.src_origin + end as i32)
}

/// Overlap length between the destination pixel at relative offset `off` and
/// the absolute source pixel `s`, on the common grid.
fn overlap_weight(off: i32, s: i32, axis: &AxisSpans) -> u64 {
    let ssp = i64::from(axis.src_span);
    let dsp = i64::from(axis.dst_span);
    let rel = i64::from(s - axis.src_origin);
    let lo = (i64::from(off) * ssp).max(rel * dsp);
    let hi = (i64::from(off) * ssp + ssp).min(rel * dsp + dsp);
    u64::try_from((hi - lo).max(0)).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_ratio_detection() {
        assert!(is_exact_with_closest(4, 8));
        assert!(is_exact_with_closest(8, 4));
        assert!(is_exact_with_closest(3, 3));
        assert!(!is_exact_with_closest(3, 5));
        assert!(!is_exact_with_closest(0, 4));
        assert!(!is_exact_with_closest(4, 0));
    }

    #[test]
    fn overlap_weights_sum_to_src_span() {
        let axis = AxisSpans {
            src_origin: 0,
            src_span: 7,
            dst_origin: 0,
            dst_span: 3,
            flip: false,
            shift: 0,
            base_extent: 3,
        };
        for off in 0..3 {
            let (s0, s1) = overlap_range(off, &axis);
            let sum: u64 = (s0..s1).map(|s| overlap_weight(off, s, &axis)).sum();
            assert_eq!(sum, 7, "off {off}");
        }
    }

    #[test]
    fn overlap_range_stays_inside_source() {
        let axis = AxisSpans {
            src_origin: 2,
            src_span: 5,
            dst_origin: 0,
            dst_span: 4,
            flip: false,
            shift: 0,
            base_extent: 4,
        };
        for off in 0..4 {
            let (s0, s1) = overlap_range(off, &axis);
            assert!(s0 >= 2 && s1 <= 7 && s0 < s1, "off {off} -> {s0}..{s1}");
        }
    }

    #[test]
    fn nearest_src_floor_mapping() {
        let axis = AxisSpans {
            src_origin: 10,
            src_span: 4,
            dst_origin: 0,
            dst_span: 8,
            flip: false,
            shift: 0,
            base_extent: 8,
        };
        let mapped: Vec<i32> = (0..8).map(|o| axis.nearest_src(o)).collect();
        assert_eq!(mapped, vec![10, 10, 11, 11, 12, 12, 13, 13]);
    }

    #[test]
    fn user_offset_honors_flip_and_shift() {
        let axis = AxisSpans {
            src_origin: 0,
            src_span: 4,
            dst_origin: 1,
            dst_span: 4,
            flip: true,
            shift: -1,
            base_extent: 8,
        };
        // base 6 -> user 8 - 1 - 6 = 1 -> offset 0.
        assert_eq!(axis.user_offset(6), 0);
        assert_eq!(axis.user_offset(3), 3);
    }
}
