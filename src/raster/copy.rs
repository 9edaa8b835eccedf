//! Unscaled rectangular copy between two pixel buffers.

use crate::buffer::view::{PixelView, PixelViewMut};
use crate::foundation::error::{BlitError, BlitResult};
use crate::geom::rect::Rect;
use crate::parallel::split::{SPLIT_AREA_THRESHOLD, SplitTask, run_rows};
use crate::raster::row::{RowMode, RowOp};

fn checked_rect(
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    bounds: Rect,
    what: &str,
) -> BlitResult<Rect> {
    let rect = Rect::new(x, y, width, height)?;
    if !bounds.contains_rect(rect) {
        return Err(BlitError::out_of_bounds(format!(
            "{what} rect {rect:?} outside {}x{} buffer",
            bounds.width, bounds.height
        )));
    }
    Ok(rect)
}

/// Copies a `width` x `height` region from `(src_x, src_y)` in `src` to
/// `(dst_x, dst_y)` in `dst`, converting pixel formats when they differ.
///
/// Both regions must lie within their buffers (`OutOfBounds` otherwise); a
/// zero-span region is a no-op. The copy is decomposed across worker threads
/// under the standard split policy and is idempotent: repeating the call
/// yields an identical destination.
#[allow(clippy::too_many_arguments)]
#[tracing::instrument(skip(src, dst))]
pub fn copy_image(
    parallelism: usize,
    src: PixelView<'_>,
    src_x: i32,
    src_y: i32,
    dst: PixelViewMut<'_>,
    dst_x: i32,
    dst_y: i32,
    width: i32,
    height: i32,
) -> BlitResult<()> {
    let src_rect = checked_rect(src_x, src_y, width, height, src.bounds(), "source")?;
    let dst_rect = checked_rect(dst_x, dst_y, width, height, dst.bounds(), "destination")?;
    if src_rect.is_empty() {
        return Ok(());
    }

    let op = RowOp::resolve(src.format(), dst.format(), RowMode::Copy)?;
    let src_region = src.sub_view(src_rect)?;
    let dst_region = dst.sub_view(dst_rect)?;

    let width = src_rect.width as u32;
    let rows = src_rect.height as u32;
    run_rows(
        parallelism,
        SPLIT_AREA_THRESHOLD,
        width,
        dst_region,
        SplitTask::new(0, rows),
        &|mut unit, task| {
            let src = src_region.duplicate();
            for r in 0..task.length {
                let s = src.row(0, task.offset + r, width);
                op.run(s, unit.row_mut(0, r, width))?;
            }
            Ok(())
        },
    )
}
