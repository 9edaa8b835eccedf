//! Pixel format descriptors and conversion to/from the canonical
//! premultiplied ARGB32 value.
//!
//! The canonical form packs alpha in bits 24..32, then red, green, blue, with
//! color channels premultiplied by `alpha / 255` (round half up). Conversion
//! functions are pure; bulk callers resolve a loader/storer function pointer
//! once per call via [`PixelFormat::loader`] / [`PixelFormat::storer`] so the
//! per-pixel loops stay branch-light.

use crate::foundation::error::{BlitError, BlitResult};
use crate::foundation::math::{mul_div255_u8, unmul_div255_u8};

/// Which byte of the 32-bit word holds which channel, most significant byte
/// first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ChannelOrder {
    Argb,
    Rgba,
    Bgra,
    Abgr,
}

/// Immutable pixel format descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PixelFormat {
    pub order: ChannelOrder,
    pub premultiplied: bool,
    pub bits_per_channel: u8,
}

/// A per-pixel conversion function resolved once per bulk call.
pub type PixelFn = fn(u32) -> u32;

impl PixelFormat {
    /// The canonical premultiplied ARGB32 format.
    pub const PREMUL_ARGB: PixelFormat = PixelFormat {
        order: ChannelOrder::Argb,
        premultiplied: true,
        bits_per_channel: 8,
    };

    /// Straight-alpha ARGB32.
    pub const STRAIGHT_ARGB: PixelFormat = PixelFormat {
        order: ChannelOrder::Argb,
        premultiplied: false,
        bits_per_channel: 8,
    };

    pub fn new(order: ChannelOrder, premultiplied: bool) -> Self {
        Self {
            order,
            premultiplied,
            bits_per_channel: 8,
        }
    }

    /// Only 8 bits per channel are supported by this engine.
    pub fn validate(self) -> BlitResult<()> {
        if self.bits_per_channel != 8 {
            return Err(BlitError::unsupported_format(format!(
                "channel depth must be 8 bits, got {}",
                self.bits_per_channel
            )));
        }
        Ok(())
    }

    /// True when a raw word copy is equivalent to per-pixel conversion:
    /// channel order and premultiplication state both match.
    pub fn compatible_with(self, other: PixelFormat) -> bool {
        self.order == other.order && self.premultiplied == other.premultiplied
    }

    /// Conversion function from this format to canonical premultiplied
    /// ARGB32, resolved once per bulk call.
    pub fn loader(self) -> BlitResult<PixelFn> {
        self.validate()?;
        Ok(match (self.order, self.premultiplied) {
            (ChannelOrder::Argb, true) => load_argb_premul,
            (ChannelOrder::Argb, false) => load_argb_straight,
            (ChannelOrder::Rgba, true) => load_rgba_premul,
            (ChannelOrder::Rgba, false) => load_rgba_straight,
            (ChannelOrder::Bgra, true) => load_bgra_premul,
            (ChannelOrder::Bgra, false) => load_bgra_straight,
            (ChannelOrder::Abgr, true) => load_abgr_premul,
            (ChannelOrder::Abgr, false) => load_abgr_straight,
        })
    }

    /// Conversion function from canonical premultiplied ARGB32 to this
    /// format, resolved once per bulk call.
    pub fn storer(self) -> BlitResult<PixelFn> {
        self.validate()?;
        Ok(match (self.order, self.premultiplied) {
            (ChannelOrder::Argb, true) => store_argb_premul,
            (ChannelOrder::Argb, false) => store_argb_straight,
            (ChannelOrder::Rgba, true) => store_rgba_premul,
            (ChannelOrder::Rgba, false) => store_rgba_straight,
            (ChannelOrder::Bgra, true) => store_bgra_premul,
            (ChannelOrder::Bgra, false) => store_bgra_straight,
            (ChannelOrder::Abgr, true) => store_abgr_premul,
            (ChannelOrder::Abgr, false) => store_abgr_straight,
        })
    }
}

/// Converts a pixel in `format` to the canonical premultiplied ARGB32 value.
pub fn to_premul_argb(pixel: u32, format: PixelFormat) -> BlitResult<u32> {
    Ok(format.loader()?(pixel))
}

/// Converts a canonical premultiplied ARGB32 value to a pixel in `format`.
pub fn from_premul_argb(argb: u32, format: PixelFormat) -> BlitResult<u32> {
    Ok(format.storer()?(argb))
}

/// Premultiplies a straight-alpha ARGB32 value, rounding half up per channel.
///
/// Guarantees that no color channel of the result exceeds the alpha value.
pub fn premultiply_argb(argb: u32) -> u32 {
    let a = argb >> 24;
    if a == 255 {
        return argb;
    }
    if a == 0 {
        return 0;
    }
    let a16 = a as u16;
    let r = mul_div255_u8(((argb >> 16) & 0xff) as u16, a16);
    let g = mul_div255_u8(((argb >> 8) & 0xff) as u16, a16);
    let b = mul_div255_u8((argb & 0xff) as u16, a16);
    (a << 24) | (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
}

/// Undoes premultiplication of an ARGB32 value. Alpha 0 is treated as fully
/// transparent: color channels are forced to 0.
pub fn unpremultiply_argb(argb: u32) -> u32 {
    let a = argb >> 24;
    if a == 255 {
        return argb;
    }
    if a == 0 {
        return 0;
    }
    let a8 = a as u8;
    let r = unmul_div255_u8(((argb >> 16) & 0xff) as u8, a8);
    let g = unmul_div255_u8(((argb >> 8) & 0xff) as u8, a8);
    let b = unmul_div255_u8((argb & 0xff) as u8, a8);
    (a << 24) | (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
}

// Channel reorders between each supported layout and ARGB. Each is its own
// inverse except Rgba, whose inverse is a rotate in the other direction.

fn argb_from_rgba(px: u32) -> u32 {
    px.rotate_right(8)
}

fn rgba_from_argb(px: u32) -> u32 {
    px.rotate_left(8)
}

fn argb_from_bgra(px: u32) -> u32 {
    px.swap_bytes()
}

fn argb_from_abgr(px: u32) -> u32 {
    (px & 0xff00_ff00) | ((px & 0xff) << 16) | ((px >> 16) & 0xff)
}

fn load_argb_premul(px: u32) -> u32 {
    px
}

fn load_argb_straight(px: u32) -> u32 {
    premultiply_argb(px)
}

fn load_rgba_premul(px: u32) -> u32 {
    argb_from_rgba(px)
}

fn load_rgba_straight(px: u32) -> u32 {
    premultiply_argb(argb_from_rgba(px))
}

fn load_bgra_premul(px: u32) -> u32 {
    argb_from_bgra(px)
}

fn load_bgra_straight(px: u32) -> u32 {
    premultiply_argb(argb_from_bgra(px))
}

fn load_abgr_premul(px: u32) -> u32 {
    argb_from_abgr(px)
}

fn load_abgr_straight(px: u32) -> u32 {
    premultiply_argb(argb_from_abgr(px))
}

fn store_argb_premul(argb: u32) -> u32 {
    argb
}

fn store_argb_straight(argb: u32) -> u32 {
    unpremultiply_argb(argb)
}

fn store_rgba_premul(argb: u32) -> u32 {
    rgba_from_argb(argb)
}

fn store_rgba_straight(argb: u32) -> u32 {
    rgba_from_argb(unpremultiply_argb(argb))
}

fn store_bgra_premul(argb: u32) -> u32 {
    argb_from_bgra(argb)
}

fn store_bgra_straight(argb: u32) -> u32 {
    argb_from_bgra(unpremultiply_argb(argb))
}

fn store_abgr_premul(argb: u32) -> u32 {
    argb_from_abgr(argb)
}

fn store_abgr_straight(argb: u32) -> u32 {
    argb_from_abgr(unpremultiply_argb(argb))
}
