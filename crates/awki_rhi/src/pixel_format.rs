//! Pixel format table
//!
//! Static metadata about every color and depth format the RHI understands.
//! Variant order matters: SRGB variants directly follow their linear
//! counterpart, and the depth formats form the tail of the enum.

use ash::vk;

/// Texel formats supported by textures and swapchain backbuffers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u32)]
pub enum PixelFormat {
    /// No format
    Undefined,

    /// 8-bit unsigned integer, one channel
    R8Uint,
    /// 8-bit signed integer, one channel
    R8Sint,
    /// 8-bit unsigned normalized, one channel
    R8Unorm,
    /// 8-bit signed normalized, one channel
    R8Snorm,

    /// 8-bit unsigned integer, two channels
    Rg8Uint,
    /// 8-bit signed integer, two channels
    Rg8Sint,
    /// 8-bit unsigned normalized, two channels
    Rg8Unorm,
    /// 8-bit signed normalized, two channels
    Rg8Snorm,

    /// 8-bit unsigned integer, four channels
    Rgba8Uint,
    /// 8-bit signed integer, four channels
    Rgba8Sint,
    /// 8-bit signed normalized, four channels
    Rgba8Snorm,
    /// 8-bit unsigned normalized, four channels
    Rgba8Unorm,
    /// 8-bit SRGB, four channels
    Rgba8Srgb,

    /// 8-bit unsigned normalized, four channels in BGRA order
    Bgra8Unorm,
    /// 8-bit SRGB, four channels in BGRA order
    Bgra8Srgb,

    /// 10-bit color with 2-bit alpha, packed into 32 bits
    R10G10B10A2Unorm,

    /// 16-bit unsigned integer, one channel
    R16Uint,
    /// 16-bit signed integer, one channel
    R16Sint,
    /// 16-bit unsigned normalized, one channel
    R16Unorm,
    /// 16-bit signed normalized, one channel
    R16Snorm,
    /// 16-bit float, one channel
    R16Float,

    /// 16-bit unsigned integer, two channels
    Rg16Uint,
    /// 16-bit signed integer, two channels
    Rg16Sint,
    /// 16-bit unsigned normalized, two channels
    Rg16Unorm,
    /// 16-bit signed normalized, two channels
    Rg16Snorm,
    /// 16-bit float, two channels
    Rg16Float,

    /// 16-bit unsigned integer, four channels
    Rgba16Uint,
    /// 16-bit signed integer, four channels
    Rgba16Sint,
    /// 16-bit unsigned normalized, four channels
    Rgba16Unorm,
    /// 16-bit signed normalized, four channels
    Rgba16Snorm,
    /// 16-bit float, four channels
    Rgba16Float,

    /// 32-bit unsigned integer, one channel
    R32Uint,
    /// 32-bit signed integer, one channel
    R32Sint,
    /// 32-bit float, one channel
    R32Float,

    /// 32-bit unsigned integer, two channels
    Rg32Uint,
    /// 32-bit signed integer, two channels
    Rg32Sint,
    /// 32-bit float, two channels
    Rg32Float,

    /// 32-bit unsigned integer, four channels
    Rgba32Uint,
    /// 32-bit signed integer, four channels
    Rgba32Sint,
    /// 32-bit float, four channels
    Rgba32Float,

    /// BC1 without alpha
    Bc1RgbUnorm,
    /// BC1 without alpha, SRGB
    Bc1RgbSrgb,

    /// BC1 with 1-bit alpha
    Bc1RgbaUnorm,
    /// BC1 with 1-bit alpha, SRGB
    Bc1RgbaSrgb,

    /// BC2 (explicit alpha)
    Bc2Unorm,
    /// BC2 (explicit alpha), SRGB
    Bc2Srgb,

    /// BC3 (interpolated alpha)
    Bc3Unorm,
    /// BC3 (interpolated alpha), SRGB
    Bc3Srgb,

    /// BC4 single channel, unsigned
    Bc4Unorm,
    /// BC4 single channel, signed
    Bc4Snorm,

    /// BC5 two channels, unsigned
    Bc5Unorm,
    /// BC5 two channels, signed
    Bc5Snorm,

    /// BC6H unsigned half float
    Bc6hUf16,
    /// BC6H signed half float
    Bc6hSf16,

    /// BC7
    Bc7Unorm,
    /// BC7, SRGB
    Bc7Srgb,

    /// 32-bit float depth with 8-bit stencil
    D32SfloatS8Uint,
    /// 32-bit float depth
    D32Sfloat,
    /// 24-bit normalized depth with 8-bit stencil
    D24UnormS8Uint,
    /// 16-bit normalized depth
    D16Unorm,
}

impl PixelFormat {
    /// Every format in declaration order
    pub const ALL: [Self; 61] = [
        Self::Undefined,
        Self::R8Uint,
        Self::R8Sint,
        Self::R8Unorm,
        Self::R8Snorm,
        Self::Rg8Uint,
        Self::Rg8Sint,
        Self::Rg8Unorm,
        Self::Rg8Snorm,
        Self::Rgba8Uint,
        Self::Rgba8Sint,
        Self::Rgba8Snorm,
        Self::Rgba8Unorm,
        Self::Rgba8Srgb,
        Self::Bgra8Unorm,
        Self::Bgra8Srgb,
        Self::R10G10B10A2Unorm,
        Self::R16Uint,
        Self::R16Sint,
        Self::R16Unorm,
        Self::R16Snorm,
        Self::R16Float,
        Self::Rg16Uint,
        Self::Rg16Sint,
        Self::Rg16Unorm,
        Self::Rg16Snorm,
        Self::Rg16Float,
        Self::Rgba16Uint,
        Self::Rgba16Sint,
        Self::Rgba16Unorm,
        Self::Rgba16Snorm,
        Self::Rgba16Float,
        Self::R32Uint,
        Self::R32Sint,
        Self::R32Float,
        Self::Rg32Uint,
        Self::Rg32Sint,
        Self::Rg32Float,
        Self::Rgba32Uint,
        Self::Rgba32Sint,
        Self::Rgba32Float,
        Self::Bc1RgbUnorm,
        Self::Bc1RgbSrgb,
        Self::Bc1RgbaUnorm,
        Self::Bc1RgbaSrgb,
        Self::Bc2Unorm,
        Self::Bc2Srgb,
        Self::Bc3Unorm,
        Self::Bc3Srgb,
        Self::Bc4Unorm,
        Self::Bc4Snorm,
        Self::Bc5Unorm,
        Self::Bc5Snorm,
        Self::Bc6hUf16,
        Self::Bc6hSf16,
        Self::Bc7Unorm,
        Self::Bc7Srgb,
        Self::D32SfloatS8Uint,
        Self::D32Sfloat,
        Self::D24UnormS8Uint,
        Self::D16Unorm,
    ];

    /// Whether the format stores SRGB-encoded color
    pub const fn is_srgb(self) -> bool {
        matches!(
            self,
            Self::Rgba8Srgb
                | Self::Bgra8Srgb
                | Self::Bc1RgbSrgb
                | Self::Bc1RgbaSrgb
                | Self::Bc2Srgb
                | Self::Bc3Srgb
                | Self::Bc7Srgb
        )
    }

    /// Whether a linear format has an SRGB counterpart
    pub const fn supports_srgb(self) -> bool {
        matches!(
            self,
            Self::Rgba8Unorm
                | Self::Bgra8Unorm
                | Self::Bc1RgbUnorm
                | Self::Bc1RgbaUnorm
                | Self::Bc2Unorm
                | Self::Bc3Unorm
                | Self::Bc7Unorm
        )
    }

    /// SRGB counterpart of the format, or the format itself when none exists
    pub fn to_srgb(self) -> Self {
        let srgb = match self {
            Self::Rgba8Unorm => Self::Rgba8Srgb,
            Self::Bgra8Unorm => Self::Bgra8Srgb,
            Self::Bc1RgbUnorm => Self::Bc1RgbSrgb,
            Self::Bc1RgbaUnorm => Self::Bc1RgbaSrgb,
            Self::Bc2Unorm => Self::Bc2Srgb,
            Self::Bc3Unorm => Self::Bc3Srgb,
            Self::Bc7Unorm => Self::Bc7Srgb,
            other => return other,
        };

        if !srgb.is_srgb() {
            raise!("Return pixel format {:?} is not SRGB", srgb);
        }
        srgb
    }

    /// Whether the format is a depth or depth-stencil format
    pub fn is_depth(self) -> bool {
        self >= Self::D32SfloatS8Uint
    }

    /// Whether the format carries a stencil component
    pub const fn has_stencil(self) -> bool {
        matches!(self, Self::D32SfloatS8Uint | Self::D24UnormS8Uint)
    }

    /// Whether the format can hold values outside the 8-bit range
    pub fn is_hdr(self) -> bool {
        self >= Self::R10G10B10A2Unorm && self <= Self::Rgba32Float
    }

    /// Whether the format is block-compressed
    pub fn is_block_compressed(self) -> bool {
        self >= Self::Bc1RgbUnorm && self <= Self::Bc7Srgb
    }

    /// Size in bytes of one texel; `None` for block-compressed formats
    /// and `Undefined`
    pub const fn pixel_size(self) -> Option<u32> {
        let size = match self {
            Self::Undefined
            | Self::Bc1RgbUnorm
            | Self::Bc1RgbSrgb
            | Self::Bc1RgbaUnorm
            | Self::Bc1RgbaSrgb
            | Self::Bc2Unorm
            | Self::Bc2Srgb
            | Self::Bc3Unorm
            | Self::Bc3Srgb
            | Self::Bc4Unorm
            | Self::Bc4Snorm
            | Self::Bc5Unorm
            | Self::Bc5Snorm
            | Self::Bc6hUf16
            | Self::Bc6hSf16
            | Self::Bc7Unorm
            | Self::Bc7Srgb => return None,

            Self::R8Uint | Self::R8Sint | Self::R8Unorm | Self::R8Snorm => 1,

            Self::Rg8Uint
            | Self::Rg8Sint
            | Self::Rg8Unorm
            | Self::Rg8Snorm
            | Self::R16Uint
            | Self::R16Sint
            | Self::R16Unorm
            | Self::R16Snorm
            | Self::R16Float
            | Self::D16Unorm => 2,

            Self::Rgba8Uint
            | Self::Rgba8Sint
            | Self::Rgba8Unorm
            | Self::Rgba8Snorm
            | Self::Rgba8Srgb
            | Self::Bgra8Unorm
            | Self::Bgra8Srgb
            | Self::R10G10B10A2Unorm
            | Self::Rg16Uint
            | Self::Rg16Sint
            | Self::Rg16Unorm
            | Self::Rg16Snorm
            | Self::Rg16Float
            | Self::R32Uint
            | Self::R32Sint
            | Self::R32Float
            | Self::D32Sfloat
            | Self::D24UnormS8Uint => 4,

            Self::D32SfloatS8Uint => 5,

            Self::Rgba16Uint
            | Self::Rgba16Sint
            | Self::Rgba16Unorm
            | Self::Rgba16Snorm
            | Self::Rgba16Float
            | Self::Rg32Uint
            | Self::Rg32Sint
            | Self::Rg32Float => 8,

            Self::Rgba32Uint | Self::Rgba32Sint | Self::Rgba32Float => 16,
        };
        Some(size)
    }

    /// Size in bytes of one 4x4 block; `None` for uncompressed formats
    pub const fn compressed_block_size(self) -> Option<u32> {
        match self {
            Self::Bc1RgbUnorm
            | Self::Bc1RgbSrgb
            | Self::Bc1RgbaUnorm
            | Self::Bc1RgbaSrgb
            | Self::Bc4Unorm
            | Self::Bc4Snorm => Some(8),

            Self::Bc2Unorm
            | Self::Bc2Srgb
            | Self::Bc3Unorm
            | Self::Bc3Srgb
            | Self::Bc5Unorm
            | Self::Bc5Snorm
            | Self::Bc6hUf16
            | Self::Bc6hSf16
            | Self::Bc7Unorm
            | Self::Bc7Srgb => Some(16),

            _ => None,
        }
    }

    /// Number of channels; `None` only for `Undefined`
    pub const fn channel_count(self) -> Option<u32> {
        let channels = match self {
            Self::Undefined => return None,

            Self::Bc4Unorm
            | Self::Bc4Snorm
            | Self::R8Uint
            | Self::R8Sint
            | Self::R8Unorm
            | Self::R8Snorm
            | Self::R16Uint
            | Self::R16Sint
            | Self::R16Unorm
            | Self::R16Snorm
            | Self::R16Float
            | Self::R32Uint
            | Self::R32Sint
            | Self::R32Float
            | Self::D16Unorm
            | Self::D32Sfloat => 1,

            Self::Bc5Unorm
            | Self::Bc5Snorm
            | Self::Rg8Uint
            | Self::Rg8Sint
            | Self::Rg8Unorm
            | Self::Rg8Snorm
            | Self::Rg16Uint
            | Self::Rg16Sint
            | Self::Rg16Unorm
            | Self::Rg16Snorm
            | Self::Rg16Float
            | Self::Rg32Uint
            | Self::Rg32Sint
            | Self::Rg32Float
            | Self::D24UnormS8Uint
            | Self::D32SfloatS8Uint => 2,

            Self::Bc1RgbUnorm | Self::Bc1RgbSrgb => 3,

            Self::Bc1RgbaUnorm
            | Self::Bc1RgbaSrgb
            | Self::Bc2Unorm
            | Self::Bc2Srgb
            | Self::Bc3Unorm
            | Self::Bc3Srgb
            | Self::Bc6hUf16
            | Self::Bc6hSf16
            | Self::Bc7Unorm
            | Self::Bc7Srgb
            | Self::Rgba8Uint
            | Self::Rgba8Sint
            | Self::Rgba8Unorm
            | Self::Rgba8Snorm
            | Self::Rgba8Srgb
            | Self::Bgra8Unorm
            | Self::Bgra8Srgb
            | Self::Rgba16Uint
            | Self::Rgba16Sint
            | Self::Rgba16Unorm
            | Self::Rgba16Snorm
            | Self::Rgba16Float
            | Self::Rgba32Uint
            | Self::Rgba32Sint
            | Self::Rgba32Float
            | Self::R10G10B10A2Unorm => 4,
        };
        Some(channels)
    }

    /// Native Vulkan format
    pub const fn to_vk(self) -> vk::Format {
        match self {
            Self::Undefined => vk::Format::UNDEFINED,

            Self::R8Uint => vk::Format::R8_UINT,
            Self::R8Sint => vk::Format::R8_SINT,
            Self::R8Unorm => vk::Format::R8_UNORM,
            Self::R8Snorm => vk::Format::R8_SNORM,

            Self::Rg8Uint => vk::Format::R8G8_UINT,
            Self::Rg8Sint => vk::Format::R8G8_SINT,
            Self::Rg8Unorm => vk::Format::R8G8_UNORM,
            Self::Rg8Snorm => vk::Format::R8G8_SNORM,

            Self::Rgba8Uint => vk::Format::R8G8B8A8_UINT,
            Self::Rgba8Sint => vk::Format::R8G8B8A8_SINT,
            Self::Rgba8Snorm => vk::Format::R8G8B8A8_SNORM,
            Self::Rgba8Unorm => vk::Format::R8G8B8A8_UNORM,
            Self::Rgba8Srgb => vk::Format::R8G8B8A8_SRGB,

            Self::Bgra8Unorm => vk::Format::B8G8R8A8_UNORM,
            Self::Bgra8Srgb => vk::Format::B8G8R8A8_SRGB,

            Self::R10G10B10A2Unorm => vk::Format::A2B10G10R10_UNORM_PACK32,

            Self::R16Uint => vk::Format::R16_UINT,
            Self::R16Sint => vk::Format::R16_SINT,
            Self::R16Unorm => vk::Format::R16_UNORM,
            Self::R16Snorm => vk::Format::R16_SNORM,
            Self::R16Float => vk::Format::R16_SFLOAT,

            Self::Rg16Uint => vk::Format::R16G16_UINT,
            Self::Rg16Sint => vk::Format::R16G16_SINT,
            Self::Rg16Unorm => vk::Format::R16G16_UNORM,
            Self::Rg16Snorm => vk::Format::R16G16_SNORM,
            Self::Rg16Float => vk::Format::R16G16_SFLOAT,

            Self::Rgba16Uint => vk::Format::R16G16B16A16_UINT,
            Self::Rgba16Sint => vk::Format::R16G16B16A16_SINT,
            Self::Rgba16Unorm => vk::Format::R16G16B16A16_UNORM,
            Self::Rgba16Snorm => vk::Format::R16G16B16A16_SNORM,
            Self::Rgba16Float => vk::Format::R16G16B16A16_SFLOAT,

            Self::R32Uint => vk::Format::R32_UINT,
            Self::R32Sint => vk::Format::R32_SINT,
            Self::R32Float => vk::Format::R32_SFLOAT,

            Self::Rg32Uint => vk::Format::R32G32_UINT,
            Self::Rg32Sint => vk::Format::R32G32_SINT,
            Self::Rg32Float => vk::Format::R32G32_SFLOAT,

            Self::Rgba32Uint => vk::Format::R32G32B32A32_UINT,
            Self::Rgba32Sint => vk::Format::R32G32B32A32_SINT,
            Self::Rgba32Float => vk::Format::R32G32B32A32_SFLOAT,

            Self::Bc1RgbUnorm => vk::Format::BC1_RGB_UNORM_BLOCK,
            Self::Bc1RgbSrgb => vk::Format::BC1_RGB_SRGB_BLOCK,
            Self::Bc1RgbaUnorm => vk::Format::BC1_RGBA_UNORM_BLOCK,
            Self::Bc1RgbaSrgb => vk::Format::BC1_RGBA_SRGB_BLOCK,
            Self::Bc2Unorm => vk::Format::BC2_UNORM_BLOCK,
            Self::Bc2Srgb => vk::Format::BC2_SRGB_BLOCK,
            Self::Bc3Unorm => vk::Format::BC3_UNORM_BLOCK,
            Self::Bc3Srgb => vk::Format::BC3_SRGB_BLOCK,
            Self::Bc4Unorm => vk::Format::BC4_UNORM_BLOCK,
            Self::Bc4Snorm => vk::Format::BC4_SNORM_BLOCK,
            Self::Bc5Unorm => vk::Format::BC5_UNORM_BLOCK,
            Self::Bc5Snorm => vk::Format::BC5_SNORM_BLOCK,
            Self::Bc6hUf16 => vk::Format::BC6H_UFLOAT_BLOCK,
            Self::Bc6hSf16 => vk::Format::BC6H_SFLOAT_BLOCK,
            Self::Bc7Unorm => vk::Format::BC7_UNORM_BLOCK,
            Self::Bc7Srgb => vk::Format::BC7_SRGB_BLOCK,

            Self::D32SfloatS8Uint => vk::Format::D32_SFLOAT_S8_UINT,
            Self::D32Sfloat => vk::Format::D32_SFLOAT,
            Self::D24UnormS8Uint => vk::Format::D24_UNORM_S8_UINT,
            Self::D16Unorm => vk::Format::D16_UNORM,
        }
    }

    /// Translate a native Vulkan format, if it is part of the table
    pub fn from_vk(format: vk::Format) -> Option<Self> {
        Self::ALL.iter().copied().find(|candidate| candidate.to_vk() == format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_all_lists_every_variant_in_order() {
        for (index, format) in PixelFormat::ALL.iter().enumerate() {
            assert_eq!(*format as usize, index, "{format:?} out of order");
        }
        assert_eq!(PixelFormat::ALL.last(), Some(&PixelFormat::D16Unorm));
    }

    #[test]
    fn test_every_format_has_exactly_one_size() {
        for format in PixelFormat::ALL.into_iter().skip(1) {
            let pixel = format.pixel_size();
            let block = format.compressed_block_size();
            assert!(pixel.is_some() != block.is_some(), "{format:?} must have exactly one size");
            assert_eq!(block.is_some(), format.is_block_compressed());
            assert!(format.channel_count().is_some(), "{format:?} has no channel count");
        }
        assert_eq!(PixelFormat::Undefined.pixel_size(), None);
        assert_eq!(PixelFormat::Undefined.channel_count(), None);
    }

    #[test]
    fn test_known_sizes() {
        assert_eq!(PixelFormat::R8Unorm.pixel_size(), Some(1));
        assert_eq!(PixelFormat::Rgba8Srgb.pixel_size(), Some(4));
        assert_eq!(PixelFormat::Rgba16Float.pixel_size(), Some(8));
        assert_eq!(PixelFormat::Rgba32Float.pixel_size(), Some(16));
        assert_eq!(PixelFormat::D32SfloatS8Uint.pixel_size(), Some(5));
        assert_eq!(PixelFormat::Bc1RgbUnorm.compressed_block_size(), Some(8));
        assert_eq!(PixelFormat::Bc7Srgb.compressed_block_size(), Some(16));
        assert_eq!(PixelFormat::Bc1RgbSrgb.channel_count(), Some(3));
        assert_eq!(PixelFormat::D24UnormS8Uint.channel_count(), Some(2));
    }

    #[test]
    fn test_srgb_pairs_are_adjacent() {
        for format in PixelFormat::ALL {
            if format.supports_srgb() {
                let srgb = format.to_srgb();
                assert!(srgb.is_srgb());
                assert_eq!(srgb as u32, format as u32 + 1, "{format:?} mis-paired with {srgb:?}");
            }
        }
    }

    #[test]
    fn test_to_srgb_is_idempotent() {
        for format in PixelFormat::ALL {
            let once = format.to_srgb();
            assert_eq!(once.to_srgb(), once);
            if !format.supports_srgb() {
                assert_eq!(once, format);
            }
        }
    }

    #[test]
    fn test_depth_range() {
        let depth: Vec<_> = PixelFormat::ALL.into_iter().filter(|f| f.is_depth()).collect();
        assert_eq!(
            depth,
            vec![
                PixelFormat::D32SfloatS8Uint,
                PixelFormat::D32Sfloat,
                PixelFormat::D24UnormS8Uint,
                PixelFormat::D16Unorm,
            ]
        );
        assert!(PixelFormat::D24UnormS8Uint.has_stencil());
        assert!(!PixelFormat::D16Unorm.has_stencil());
        assert!(!PixelFormat::Bc7Srgb.is_depth());
    }

    #[test]
    fn test_hdr_range() {
        assert!(PixelFormat::R10G10B10A2Unorm.is_hdr());
        assert!(PixelFormat::Rgba32Float.is_hdr());
        assert!(!PixelFormat::Bgra8Srgb.is_hdr());
        assert!(!PixelFormat::Bc1RgbUnorm.is_hdr());
    }

    #[test]
    fn test_vk_translation_is_one_to_one() {
        let natives: HashSet<_> = PixelFormat::ALL.iter().map(|f| f.to_vk()).collect();
        assert_eq!(natives.len(), PixelFormat::ALL.len());

        for format in PixelFormat::ALL {
            assert_eq!(PixelFormat::from_vk(format.to_vk()), Some(format));
        }
        assert_eq!(PixelFormat::from_vk(vk::Format::R8G8B8_UNORM), None);
    }
}
