//! Lightweight views over caller-owned pixel buffers.
//!
//! The backing storage is a plain `[u32]` slice owned entirely outside this
//! crate; views only describe a rectangular window into it (offset, row
//! stride, width, height, format). Read views are `Copy` and
//! [`PixelView::duplicate`] is free, so every parallel split unit can hold its
//! own handle. Mutable views cannot alias: [`PixelViewMut::split_rows`]
//! partitions one view into two views over disjoint row ranges, which is what
//! makes concurrent sub-tasks safe without any locking.
//!
//! Bounds checking happens once at view construction. Per-pixel accessors
//! trust the caller to stay inside the view (clip first); coordinates are
//! debug-asserted only, since these run in the hot loops.

use crate::foundation::error::{BlitError, BlitResult};
use crate::geom::rect::Rect;
use crate::pixel::format::PixelFormat;

fn required_len(offset: usize, stride: usize, width: u32, height: u32) -> BlitResult<usize> {
    if height == 0 || width == 0 {
        return Ok(offset);
    }
    let last_row = (height as usize - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(offset))
        .ok_or_else(|| BlitError::validation("view extent overflows"))?;
    last_row
        .checked_add(width as usize)
        .ok_or_else(|| BlitError::validation("view extent overflows"))
}

fn check_layout(
    len: usize,
    offset: usize,
    stride: usize,
    width: u32,
    height: u32,
    format: PixelFormat,
) -> BlitResult<()> {
    format.validate()?;
    if stride < width as usize {
        return Err(BlitError::validation(format!(
            "stride {stride} is smaller than width {width}"
        )));
    }
    let required = required_len(offset, stride, width, height)?;
    if required > len {
        return Err(BlitError::out_of_bounds(format!(
            "view needs {required} pixels, backing buffer holds {len}"
        )));
    }
    Ok(())
}

fn check_sub_rect(rect: Rect, width: u32, height: u32) -> BlitResult<()> {
    if rect.width < 0 || rect.height < 0 {
        return Err(BlitError::validation("sub-view spans must be non-negative"));
    }
    if rect.x < 0 || rect.y < 0 || rect.right() > width as i32 || rect.bottom() > height as i32 {
        return Err(BlitError::out_of_bounds(format!(
            "sub-view {rect:?} outside {width}x{height} view"
        )));
    }
    Ok(())
}

/// Read-only view of a rectangular region of a pixel buffer.
#[derive(Clone, Copy)]
pub struct PixelView<'a> {
    data: &'a [u32],
    offset: usize,
    stride: usize,
    width: u32,
    height: u32,
    format: PixelFormat,
}

impl<'a> PixelView<'a> {
    /// View over `data` starting at its first element.
    pub fn new(
        data: &'a [u32],
        stride: usize,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> BlitResult<Self> {
        Self::with_offset(data, 0, stride, width, height, format)
    }

    /// View whose top-left pixel sits at `data[offset]`.
    pub fn with_offset(
        data: &'a [u32],
        offset: usize,
        stride: usize,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> BlitResult<Self> {
        check_layout(data.len(), offset, stride, width, height, format)?;
        Ok(Self {
            data,
            offset,
            stride,
            width,
            height,
            format,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Bounds of this view as a rectangle at the origin.
    pub fn bounds(&self) -> Rect {
        Rect {
            x: 0,
            y: 0,
            width: self.width as i32,
            height: self.height as i32,
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        self.offset + y as usize * self.stride + x as usize
    }

    /// Reads the pixel at `(x, y)`. The caller must keep coordinates inside
    /// the view.
    pub fn get(&self, x: u32, y: u32) -> u32 {
        debug_assert!(x < self.width && y < self.height);
        self.data[self.index(x, y)]
    }

    /// Read-only slice of `len` pixels starting at `(x, y)`.
    pub fn row(&self, x: u32, y: u32, len: u32) -> &'a [u32] {
        debug_assert!(x + len <= self.width && y < self.height);
        let start = self.index(x, y);
        &self.data[start..start + len as usize]
    }

    /// Independent view over the same backing storage. Cheap; call before
    /// handing the view to another parallel task.
    pub fn duplicate(&self) -> PixelView<'a> {
        *self
    }

    /// View of `rect` within this view; `rect` is relative to this view's
    /// origin.
    pub fn sub_view(&self, rect: Rect) -> BlitResult<PixelView<'a>> {
        check_sub_rect(rect, self.width, self.height)?;
        Ok(PixelView {
            data: self.data,
            offset: self.offset
                + rect.y as usize * self.stride
                + rect.x as usize,
            stride: self.stride,
            width: rect.width as u32,
            height: rect.height as u32,
            format: self.format,
        })
    }
}

/// Mutable view of a rectangular region of a pixel buffer.
pub struct PixelViewMut<'a> {
    data: &'a mut [u32],
    offset: usize,
    stride: usize,
    width: u32,
    height: u32,
    format: PixelFormat,
}

impl<'a> PixelViewMut<'a> {
    /// Mutable view over `data` starting at its first element.
    pub fn new(
        data: &'a mut [u32],
        stride: usize,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> BlitResult<Self> {
        Self::with_offset(data, 0, stride, width, height, format)
    }

    /// Mutable view whose top-left pixel sits at `data[offset]`.
    pub fn with_offset(
        data: &'a mut [u32],
        offset: usize,
        stride: usize,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> BlitResult<Self> {
        check_layout(data.len(), offset, stride, width, height, format)?;
        Ok(Self {
            data,
            offset,
            stride,
            width,
            height,
            format,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Bounds of this view as a rectangle at the origin.
    pub fn bounds(&self) -> Rect {
        Rect {
            x: 0,
            y: 0,
            width: self.width as i32,
            height: self.height as i32,
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        self.offset + y as usize * self.stride + x as usize
    }

    /// Reads the pixel at `(x, y)`. The caller must keep coordinates inside
    /// the view.
    pub fn get(&self, x: u32, y: u32) -> u32 {
        debug_assert!(x < self.width && y < self.height);
        self.data[self.index(x, y)]
    }

    /// Writes the pixel at `(x, y)`. The caller must keep coordinates inside
    /// the view.
    pub fn set(&mut self, x: u32, y: u32, pixel: u32) {
        debug_assert!(x < self.width && y < self.height);
        let idx = self.index(x, y);
        self.data[idx] = pixel;
    }

    /// Mutable slice of `len` pixels starting at `(x, y)`.
    pub fn row_mut(&mut self, x: u32, y: u32, len: u32) -> &mut [u32] {
        debug_assert!(x + len <= self.width && y < self.height);
        let start = self.index(x, y);
        &mut self.data[start..start + len as usize]
    }

    /// Shorter-lived mutable view over the same region.
    pub fn reborrow(&mut self) -> PixelViewMut<'_> {
        PixelViewMut {
            data: self.data,
            offset: self.offset,
            stride: self.stride,
            width: self.width,
            height: self.height,
            format: self.format,
        }
    }

    /// Read-only view over the same region.
    pub fn as_view(&self) -> PixelView<'_> {
        PixelView {
            data: self.data,
            offset: self.offset,
            stride: self.stride,
            width: self.width,
            height: self.height,
            format: self.format,
        }
    }

    /// Mutable view of `rect` within this view; `rect` is relative to this
    /// view's origin. Consumes the view so the result keeps the full
    /// lifetime.
    pub fn sub_view(self, rect: Rect) -> BlitResult<PixelViewMut<'a>> {
        check_sub_rect(rect, self.width, self.height)?;
        Ok(PixelViewMut {
            data: self.data,
            offset: self.offset
                + rect.y as usize * self.stride
                + rect.x as usize,
            stride: self.stride,
            width: rect.width as u32,
            height: rect.height as u32,
            format: self.format,
        })
    }

    /// Partitions this view into rows `[0, at)` and `[at, height)`.
    ///
    /// The two views reference disjoint regions of the backing buffer, so
    /// they can be written concurrently by independent split units. `at` is
    /// clamped to `0..=height`; either half may come out empty.
    pub fn split_rows(self, at: u32) -> (PixelViewMut<'a>, PixelViewMut<'a>) {
        let at = at.min(self.height);
        let cut = (self.offset + at as usize * self.stride).min(self.data.len());
        let (head, tail) = self.data.split_at_mut(cut);
        let top = PixelViewMut {
            data: head,
            offset: self.offset,
            stride: self.stride,
            width: self.width,
            height: at,
            format: self.format,
        };
        let bottom = PixelViewMut {
            data: tail,
            offset: 0,
            stride: self.stride,
            width: self.width,
            height: self.height - at,
            format: self.format,
        };
        (top, bottom)
    }
}
