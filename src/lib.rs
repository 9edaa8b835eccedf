//! Softblit is the pixel-level rendering core behind a windowing-toolkit
//! backend: format conversion, SRC-OVER compositing and scaled rectangular
//! blits over caller-owned pixel buffers.
//!
//! # Pipeline overview
//!
//! 1. **Describe**: wrap caller-owned `[u32]` storage in a [`PixelView`] /
//!    [`PixelViewMut`] (stride, offset, extent, [`PixelFormat`])
//! 2. **Resolve**: pick a [`RowMode`] and let the engine resolve format
//!    conversion function pointers once per call ([`RowOp`])
//! 3. **Draw**: [`draw_rect_scaled`] for scaled/blended blits,
//!    [`copy_image`] for plain rectangular copies
//! 4. **Decompose**: large operations are split into disjoint row ranges and
//!    executed on rayon's fork-join scheduler
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Caller-owned buffers**: the engine never allocates or frees backing
//!   pixel storage; it is handed views and coordinates.
//! - **Premultiplied ARGB32 canon**: all blending happens in canonical
//!   premultiplied ARGB with one agreed round-half-up rule.
//! - **Deterministic-by-default**: a sequential draw processes rows
//!   top-to-bottom, columns left-to-right; parallel units write disjoint
//!   pixels, so results are byte-identical at any parallelism.
#![forbid(unsafe_code)]

mod buffer;
mod foundation;
mod geom;
mod parallel;
mod pixel;
mod raster;

pub use buffer::view::{PixelView, PixelViewMut};
pub use foundation::error::{BlitError, BlitResult};
pub use geom::rect::Rect;
pub use geom::rotation::{AxisMap, Rotation};
pub use parallel::split::{
    SPLIT_AREA_THRESHOLD, SplitTask, available_parallelism, build_thread_pool, run_rows,
    worth_to_split,
};
pub use pixel::format::{
    ChannelOrder, PixelFn, PixelFormat, from_premul_argb, premultiply_argb, to_premul_argb,
    unpremultiply_argb,
};
pub use raster::copy::copy_image;
pub use raster::row::{RowMode, RowOp, src_over_argb};
pub use raster::scale::{draw_rect_scaled, is_exact_with_closest};
