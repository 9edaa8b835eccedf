//! Per-row compositing: bulk copy and SRC-OVER blending.
//!
//! A [`RowOp`] resolves the format conversion function pointers and the
//! raw-copy eligibility once per bulk call, so the per-pixel loops contain no
//! format branching.

use crate::foundation::error::{BlitError, BlitResult};
use crate::foundation::math::mul_div255_u8;
use crate::pixel::format::{PixelFn, PixelFormat};

/// How source rows are combined with destination rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RowMode {
    /// Source replaces destination.
    Copy,
    /// SRC-OVER alpha compositing in premultiplied space.
    SrcOver,
}

/// SRC-OVER of two canonical premultiplied ARGB32 pixels:
/// `out = src + dst * (255 - src_alpha) / 255` per channel, round half up.
pub fn src_over_argb(src: u32, dst: u32) -> u32 {
    let sa = src >> 24;
    if sa == 0 {
        return dst;
    }
    if sa == 255 {
        return src;
    }
    let inv = (255 - sa) as u16;
    let mut out = 0u32;
    for shift in [24u32, 16, 8, 0] {
        let s = ((src >> shift) & 0xff) as u8;
        let d = mul_div255_u8(((dst >> shift) & 0xff) as u16, inv);
        out |= u32::from(s.saturating_add(d)) << shift;
    }
    out
}

/// A row operation with conversion functions resolved up front.
#[derive(Clone, Copy)]
pub struct RowOp {
    load_src: PixelFn,
    load_dst: PixelFn,
    store: PixelFn,
    raw_copy: bool,
    dst_premultiplied: bool,
    mode: RowMode,
}

impl RowOp {
    /// Resolves the conversion pipeline for one source/destination format
    /// pair. Call once per bulk operation, not per row.
    pub fn resolve(
        src_format: PixelFormat,
        dst_format: PixelFormat,
        mode: RowMode,
    ) -> BlitResult<RowOp> {
        Ok(RowOp {
            load_src: src_format.loader()?,
            load_dst: dst_format.loader()?,
            store: dst_format.storer()?,
            raw_copy: src_format.compatible_with(dst_format),
            dst_premultiplied: dst_format.premultiplied,
            mode,
        })
    }

    /// Blending requires a premultiplied destination; straight-alpha
    /// destinations are rejected rather than silently converted per pixel.
    pub fn require_premul_dst(self) -> BlitResult<RowOp> {
        if self.mode == RowMode::SrcOver && !self.dst_premultiplied {
            return Err(BlitError::incompatible_buffer(
                "SRC-OVER blending requires a premultiplied destination format",
            ));
        }
        Ok(self)
    }

    /// Applies the operation to one row pair. `src` and `dst` must have equal
    /// lengths.
    pub fn run(&self, src: &[u32], dst: &mut [u32]) -> BlitResult<()> {
        if src.len() != dst.len() {
            return Err(BlitError::validation(format!(
                "row lengths must match, got {} and {}",
                src.len(),
                dst.len()
            )));
        }
        match self.mode {
            RowMode::Copy => self.run_copy(src, dst),
            RowMode::SrcOver => self.run_blend(src, dst),
        }
        Ok(())
    }

    fn run_copy(&self, src: &[u32], dst: &mut [u32]) {
        if self.raw_copy {
            dst.copy_from_slice(src);
            return;
        }
        for (d, &s) in dst.iter_mut().zip(src) {
            *d = (self.store)((self.load_src)(s));
        }
    }

    fn run_blend(&self, src: &[u32], dst: &mut [u32]) {
        for (d, &s) in dst.iter_mut().zip(src) {
            let s = (self.load_src)(s);
            let sa = s >> 24;
            // Each source pixel is converted once; the alpha extremes skip
            // the destination load entirely.
            if sa == 0 {
                continue;
            }
            *d = if sa == 255 {
                (self.store)(s)
            } else {
                (self.store)(src_over_argb(s, (self.load_dst)(*d)))
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::format::ChannelOrder;

    const PREMUL: PixelFormat = PixelFormat::PREMUL_ARGB;

    #[test]
    fn src_over_transparent_src_keeps_dst() {
        assert_eq!(src_over_argb(0, 0xff11_2233), 0xff11_2233);
    }

    #[test]
    fn src_over_opaque_src_replaces_dst() {
        assert_eq!(src_over_argb(0xffab_cdef, 0xff11_2233), 0xffab_cdef);
    }

    #[test]
    fn src_over_half_alpha_over_white() {
        // Premultiplied half-transparent black over opaque white.
        let out = src_over_argb(0x8000_0000, 0xffff_ffff);
        assert_eq!(out >> 24, 255);
        // White scaled by (255 - 128)/255 = 127/255 -> 127.
        assert_eq!(out & 0xff, 127);
    }

    #[test]
    fn copy_uses_raw_path_for_compatible_formats() {
        let op = RowOp::resolve(PREMUL, PREMUL, RowMode::Copy).unwrap();
        let src = [0x0102_0304u32, 0xffff_ffff];
        let mut dst = [0u32; 2];
        op.run(&src, &mut dst).unwrap();
        assert_eq!(dst, src);
    }

    #[test]
    fn copy_converts_between_formats() {
        let rgba_premul = PixelFormat::new(ChannelOrder::Rgba, true);
        let op = RowOp::resolve(rgba_premul, PREMUL, RowMode::Copy).unwrap();
        let src = [0x1122_33ffu32]; // r=0x11 g=0x22 b=0x33 a=0xff in RGBA
        let mut dst = [0u32; 1];
        op.run(&src, &mut dst).unwrap();
        assert_eq!(dst[0], 0xff11_2233);
    }

    #[test]
    fn opaque_row_blend_equals_copy() {
        let op_blend = RowOp::resolve(PREMUL, PREMUL, RowMode::SrcOver).unwrap();
        let op_copy = RowOp::resolve(PREMUL, PREMUL, RowMode::Copy).unwrap();
        let src = [0xff01_0203u32, 0xffaa_bbcc, 0xffff_ffff];
        let mut a = [0x1234_5678u32; 3];
        let mut b = [0x1234_5678u32; 3];
        op_blend.run(&src, &mut a).unwrap();
        op_copy.run(&src, &mut b).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn blend_skips_transparent_pixels() {
        let op = RowOp::resolve(PREMUL, PREMUL, RowMode::SrcOver).unwrap();
        let src = [0u32, 0xff00_00ff];
        let mut dst = [0xffff_ffffu32; 2];
        op.run(&src, &mut dst).unwrap();
        assert_eq!(dst[0], 0xffff_ffff);
        assert_eq!(dst[1], 0xff00_00ff);
    }

    #[test]
    fn blend_handles_mixed_opacity_rows() {
        // Straight-alpha source so the per-pixel conversion feeds the blend.
        let op = RowOp::resolve(PixelFormat::STRAIGHT_ARGB, PREMUL, RowMode::SrcOver).unwrap();
        let src = [0x0012_3456u32, 0xffab_cdef, 0x8000_0000];
        let mut dst = [0xffff_ffffu32; 3];
        op.run(&src, &mut dst).unwrap();
        // Transparent leaves the destination, opaque replaces it.
        assert_eq!(dst[0], 0xffff_ffff);
        assert_eq!(dst[1], 0xffab_cdef);
        // Half-transparent black over white: 128 + 255 * 127/255 = 255 alpha,
        // color 127.
        assert_eq!(dst[2], 0xff7f_7f7f);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let op = RowOp::resolve(PREMUL, PREMUL, RowMode::Copy).unwrap();
        let src = [0u32; 2];
        let mut dst = [0u32; 3];
        assert!(matches!(
            op.run(&src, &mut dst),
            Err(BlitError::Validation(_))
        ));
    }

    #[test]
    fn straight_destination_rejected_for_blending() {
        let op = RowOp::resolve(PREMUL, PixelFormat::STRAIGHT_ARGB, RowMode::SrcOver).unwrap();
        assert!(matches!(
            op.require_premul_dst(),
            Err(BlitError::IncompatibleBuffer(_))
        ));
        let op = RowOp::resolve(PREMUL, PREMUL, RowMode::SrcOver).unwrap();
        assert!(op.require_premul_dst().is_ok());
    }
}
