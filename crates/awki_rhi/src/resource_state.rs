//! Resource states and their barrier mapping tables
//!
//! A [`ResourceState`] names how the GPU pipeline is about to touch a
//! resource. Every state maps to exactly one access mask and one set of
//! pipeline stages; image-compatible states additionally map to one image
//! layout. The caller tracks the current state of each resource: nothing
//! here remembers what a resource was last transitioned to.

use ash::vk;

use crate::{RhiError, RhiResult};

/// How a GPU resource is about to be accessed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceState {
    /// Contents are irrelevant; only valid as a source state
    Undefined,
    /// Bound as a color attachment
    RenderTarget,
    /// Read and written by shaders through storage bindings
    UnorderedAccess,
    /// Bound as a read-only depth attachment
    DepthRead,
    /// Bound as a writable depth attachment
    DepthWrite,
    /// Sampled or read by shaders
    ShaderResource,
    /// Destination of a copy, blit or clear
    CopyDestination,
    /// Source of a copy or blit
    CopySource,
    /// Handed to the presentation engine
    Present,
    /// Bound as an index buffer
    IndexBuffer,
    /// Bound as a vertex buffer
    VertexBuffer,
    /// Bound as a uniform buffer
    ConstantBuffer,
    /// Read as indirect draw/dispatch arguments
    IndirectArgument,
}

impl ResourceState {
    /// Whether the state only applies to buffers and has no image layout
    pub const fn is_buffer_only(self) -> bool {
        matches!(
            self,
            Self::IndexBuffer | Self::VertexBuffer | Self::ConstantBuffer | Self::IndirectArgument
        )
    }

    /// Image layout for an image in this state
    ///
    /// Buffer-only states have no layout and are rejected.
    pub fn image_layout(self) -> RhiResult<vk::ImageLayout> {
        let layout = match self {
            Self::Undefined => vk::ImageLayout::UNDEFINED,
            Self::RenderTarget => vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
            Self::UnorderedAccess => vk::ImageLayout::GENERAL,
            Self::DepthRead => vk::ImageLayout::DEPTH_STENCIL_READ_ONLY_OPTIMAL,
            Self::DepthWrite => vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
            Self::ShaderResource => vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
            Self::CopyDestination => vk::ImageLayout::TRANSFER_DST_OPTIMAL,
            Self::CopySource => vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
            Self::Present => vk::ImageLayout::PRESENT_SRC_KHR,
            Self::IndexBuffer
            | Self::VertexBuffer
            | Self::ConstantBuffer
            | Self::IndirectArgument => {
                log::error!("Resource state {:?} is not a texture compatible state", self);
                return Err(RhiError::InvalidResourceState {
                    state: self,
                    reason: "not a texture compatible state",
                });
            }
        };
        Ok(layout)
    }

    /// Memory access mask for this state
    pub fn access_mask(self) -> vk::AccessFlags {
        match self {
            Self::Undefined => vk::AccessFlags::empty(),
            Self::IndexBuffer => vk::AccessFlags::INDEX_READ,
            Self::VertexBuffer => vk::AccessFlags::VERTEX_ATTRIBUTE_READ,
            Self::ConstantBuffer => vk::AccessFlags::UNIFORM_READ,
            Self::RenderTarget => {
                vk::AccessFlags::COLOR_ATTACHMENT_READ | vk::AccessFlags::COLOR_ATTACHMENT_WRITE
            }
            Self::UnorderedAccess => vk::AccessFlags::SHADER_READ | vk::AccessFlags::SHADER_WRITE,
            Self::DepthRead => vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_READ,
            Self::DepthWrite => {
                vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_READ
                    | vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE
            }
            Self::ShaderResource => vk::AccessFlags::SHADER_READ,
            Self::IndirectArgument => vk::AccessFlags::INDIRECT_COMMAND_READ,
            Self::CopyDestination => vk::AccessFlags::TRANSFER_WRITE,
            Self::CopySource => vk::AccessFlags::TRANSFER_READ,
            Self::Present => vk::AccessFlags::MEMORY_READ,
        }
    }

    /// Pipeline stages that touch a resource in this state
    pub fn pipeline_stages(self) -> vk::PipelineStageFlags {
        match self {
            Self::Undefined => vk::PipelineStageFlags::TOP_OF_PIPE,

            Self::IndexBuffer | Self::VertexBuffer => vk::PipelineStageFlags::VERTEX_INPUT,

            Self::ShaderResource | Self::ConstantBuffer | Self::UnorderedAccess => {
                vk::PipelineStageFlags::VERTEX_SHADER
                    | vk::PipelineStageFlags::FRAGMENT_SHADER
                    | vk::PipelineStageFlags::GEOMETRY_SHADER
                    | vk::PipelineStageFlags::COMPUTE_SHADER
                    | vk::PipelineStageFlags::TESSELLATION_CONTROL_SHADER
                    | vk::PipelineStageFlags::TESSELLATION_EVALUATION_SHADER
            }

            Self::RenderTarget => vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,

            Self::DepthRead | Self::DepthWrite => {
                vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS
                    | vk::PipelineStageFlags::LATE_FRAGMENT_TESTS
            }

            Self::IndirectArgument => vk::PipelineStageFlags::DRAW_INDIRECT,

            Self::CopySource | Self::CopyDestination => vk::PipelineStageFlags::TRANSFER,

            Self::Present => vk::PipelineStageFlags::BOTTOM_OF_PIPE,
        }
    }

    /// Whether an image in this state may be cleared with a clear command
    pub const fn allows_clear(self) -> bool {
        matches!(self, Self::CopyDestination | Self::UnorderedAccess)
    }
}
