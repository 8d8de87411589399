//! GPU textures
//!
//! A [`Texture`] binds an immutable [`TextureDescriptor`] to a native image.
//! Textures created through [`Texture::from_image`] wrap an image owned by
//! someone else (a swapchain backbuffer); dropping them leaves the image
//! untouched.

use ash::vk;
use bitflags::bitflags;

use crate::pixel_format::PixelFormat;

bitflags! {
    /// How a texture may be bound and used
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureFlags: u16 {
        /// Views of the texture should prefer the SRGB format variant
        const SRGB_HINT = 1 << 0;
        /// Sampled or read by shaders
        const BIND_AS_SHADER_RESOURCE = 1 << 1;
        /// Bound as a depth-stencil attachment
        const BIND_AS_DEPTH_STENCIL = 1 << 2;
        /// Bound as a color attachment
        const BIND_AS_RENDER_TARGET = 1 << 3;
        /// Written by shaders through storage bindings
        const ALLOW_UNORDERED_ACCESS = 1 << 4;
        /// Destination of copies and clears
        const COPY_DESTINATION = 1 << 5;
        /// Source of copies
        const COPY_SOURCE = 1 << 6;
        /// Multisampled contents are resolved automatically
        const AUTO_RESOLVE_MSAA = 1 << 7;
        /// Individual mips or slices are rendered into
        const RENDER_INTO_SUB_RESOURCES = 1 << 8;

        /// Default for sampled textures
        const DEFAULT = Self::BIND_AS_SHADER_RESOURCE.bits() | Self::COPY_DESTINATION.bits();
        /// Default for render targets
        const DEFAULT_RT = Self::BIND_AS_RENDER_TARGET.bits()
            | Self::BIND_AS_SHADER_RESOURCE.bits()
            | Self::AUTO_RESOLVE_MSAA.bits();
        /// Default for depth buffers
        const DEFAULT_DEPTH =
            Self::BIND_AS_DEPTH_STENCIL.bits() | Self::BIND_AS_SHADER_RESOURCE.bits();
    }
}

impl Default for TextureFlags {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Dimensionality of a texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureType {
    /// One-dimensional
    Texture1D,
    /// Two-dimensional
    #[default]
    Texture2D,
    /// Three-dimensional
    Texture3D,
    /// Array of one-dimensional slices
    TextureArray1D,
    /// Array of two-dimensional slices
    TextureArray2D,
    /// Six-faced cube
    Cubemap,
    /// Array of cubes
    CubemapArray,
}

/// Multisample count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Msaa {
    /// Single sample
    #[default]
    X1,
    /// Two samples
    X2,
    /// Four samples
    X4,
    /// Eight samples
    X8,
}

impl Msaa {
    /// Native sample count
    pub const fn to_vk(self) -> vk::SampleCountFlags {
        match self {
            Self::X1 => vk::SampleCountFlags::TYPE_1,
            Self::X2 => vk::SampleCountFlags::TYPE_2,
            Self::X4 => vk::SampleCountFlags::TYPE_4,
            Self::X8 => vk::SampleCountFlags::TYPE_8,
        }
    }
}

/// Immutable description of a texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureDescriptor {
    /// Width in texels
    pub width: u32,
    /// Height in texels
    pub height: u32,
    /// Depth in texels (3D textures only)
    pub depth: u32,
    /// Usage flags
    pub flags: TextureFlags,
    /// Dimensionality
    pub texture_type: TextureType,
    /// Texel format
    pub format: PixelFormat,
    /// Number of mip levels
    pub mips: u32,
    /// Number of array slices
    pub slices: u32,
    /// Sample count
    pub msaa: Msaa,
}

impl Default for TextureDescriptor {
    fn default() -> Self {
        Self {
            width: 1,
            height: 1,
            depth: 1,
            flags: TextureFlags::DEFAULT,
            texture_type: TextureType::Texture2D,
            format: PixelFormat::Rgba8Unorm,
            mips: 1,
            slices: 1,
            msaa: Msaa::X1,
        }
    }
}

impl TextureDescriptor {
    /// Descriptor for a single-mip 2D render target
    pub fn render_target(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            flags: TextureFlags::DEFAULT_RT,
            format,
            ..Self::default()
        }
    }

    /// Aspects of the image touched by barriers and clears
    pub fn aspect_mask(&self) -> vk::ImageAspectFlags {
        if !self.format.is_depth() {
            vk::ImageAspectFlags::COLOR
        } else if self.format.has_stencil() {
            vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL
        } else {
            vk::ImageAspectFlags::DEPTH
        }
    }

    /// Every mip level and array slice of the texture
    pub fn full_subresource_range(&self) -> vk::ImageSubresourceRange {
        vk::ImageSubresourceRange {
            aspect_mask: self.aspect_mask(),
            base_mip_level: 0,
            level_count: self.mips,
            base_array_layer: 0,
            layer_count: self.slices,
        }
    }
}

/// A descriptor bound to a native image handle
#[derive(Debug)]
pub struct Texture {
    descriptor: TextureDescriptor,
    image: vk::Image,
}

impl Texture {
    /// Wrap an image owned elsewhere
    ///
    /// The texture never frees `image`; its owner (e.g. the swapchain) must
    /// keep it alive for as long as the texture is used.
    pub const fn from_image(descriptor: TextureDescriptor, image: vk::Image) -> Self {
        Self { descriptor, image }
    }

    /// The texture's descriptor
    pub const fn descriptor(&self) -> &TextureDescriptor {
        &self.descriptor
    }

    /// The native image handle
    pub const fn image(&self) -> vk::Image {
        self.image
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ash::vk::Handle;

    #[test]
    fn test_imported_texture_keeps_handle() {
        let descriptor = TextureDescriptor::render_target(1280, 720, PixelFormat::Bgra8Unorm);
        let texture = Texture::from_image(descriptor, vk::Image::from_raw(0x42));

        assert_eq!(texture.image().as_raw(), 0x42);
        assert_eq!(texture.descriptor().width, 1280);
        assert_eq!(texture.descriptor().flags, TextureFlags::DEFAULT_RT);
    }

    #[test]
    fn test_subresource_range_spans_all_mips_and_slices() {
        let descriptor = TextureDescriptor { mips: 5, slices: 6, ..TextureDescriptor::default() };
        let range = descriptor.full_subresource_range();

        assert_eq!(range.base_mip_level, 0);
        assert_eq!(range.level_count, 5);
        assert_eq!(range.base_array_layer, 0);
        assert_eq!(range.layer_count, 6);
        assert_eq!(range.aspect_mask, vk::ImageAspectFlags::COLOR);
    }

    #[test]
    fn test_depth_aspects() {
        let depth = TextureDescriptor {
            format: PixelFormat::D32Sfloat,
            ..TextureDescriptor::default()
        };
        assert_eq!(depth.aspect_mask(), vk::ImageAspectFlags::DEPTH);

        let depth_stencil = TextureDescriptor {
            format: PixelFormat::D24UnormS8Uint,
            ..TextureDescriptor::default()
        };
        assert_eq!(
            depth_stencil.aspect_mask(),
            vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL
        );
    }
}
