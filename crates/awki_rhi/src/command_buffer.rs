//! Command buffer recording
//!
//! A [`CommandBuffer`] is owned by the
//! [`CommandBufferAllocator`](crate::command_allocator::CommandBufferAllocator)
//! that created it and always stays on the queue role of its pool.

use std::fmt;

use ash::prelude::VkResult;
use ash::vk;
use nalgebra::Vector4;

use crate::device::QueueRole;
use crate::resource_state::ResourceState;
use crate::texture::Texture;
use crate::{RhiError, RhiResult};

/// Native command pool and recording calls
///
/// Implemented by `ash::Device`. Every buffer and pool keeps its own clone,
/// so implementations should be cheap to clone.
pub trait CommandBackend: Clone {
    /// Create a pool whose buffers can be reset individually
    fn create_command_pool(&self, queue_family_index: u32) -> VkResult<vk::CommandPool>;
    /// Destroy `pool`; its buffers must already be freed
    fn destroy_command_pool(&self, pool: vk::CommandPool);
    /// Allocate `count` primary buffers from `pool`
    fn allocate_command_buffers(
        &self,
        pool: vk::CommandPool,
        count: u32,
    ) -> VkResult<Vec<vk::CommandBuffer>>;
    /// Free `buffers` back to `pool`
    fn free_command_buffers(&self, pool: vk::CommandPool, buffers: &[vk::CommandBuffer]);

    /// Begin a one-time-submit recording
    fn begin_command_buffer(&self, buffer: vk::CommandBuffer) -> VkResult<()>;
    /// End the recording
    fn end_command_buffer(&self, buffer: vk::CommandBuffer) -> VkResult<()>;
    /// Record `transition`
    fn cmd_texture_barrier(&self, buffer: vk::CommandBuffer, transition: &TextureBarrier);
    /// Record a clear of `range` in `image`
    fn cmd_clear_color_image(
        &self,
        buffer: vk::CommandBuffer,
        image: vk::Image,
        layout: vk::ImageLayout,
        color: &vk::ClearColorValue,
        range: vk::ImageSubresourceRange,
    );
}

impl CommandBackend for ash::Device {
    fn create_command_pool(&self, queue_family_index: u32) -> VkResult<vk::CommandPool> {
        let create_info = vk::CommandPoolCreateInfo::builder()
            .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER)
            .queue_family_index(queue_family_index);
        unsafe { Self::create_command_pool(self, &create_info, None) }
    }

    fn destroy_command_pool(&self, pool: vk::CommandPool) {
        unsafe { Self::destroy_command_pool(self, pool, None) }
    }

    fn allocate_command_buffers(
        &self,
        pool: vk::CommandPool,
        count: u32,
    ) -> VkResult<Vec<vk::CommandBuffer>> {
        let allocate_info = vk::CommandBufferAllocateInfo::builder()
            .command_pool(pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(count);
        unsafe { Self::allocate_command_buffers(self, &allocate_info) }
    }

    fn free_command_buffers(&self, pool: vk::CommandPool, buffers: &[vk::CommandBuffer]) {
        unsafe { Self::free_command_buffers(self, pool, buffers) }
    }

    fn begin_command_buffer(&self, buffer: vk::CommandBuffer) -> VkResult<()> {
        let begin_info = vk::CommandBufferBeginInfo::builder()
            .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
        unsafe { Self::begin_command_buffer(self, buffer, &begin_info) }
    }

    fn end_command_buffer(&self, buffer: vk::CommandBuffer) -> VkResult<()> {
        unsafe { Self::end_command_buffer(self, buffer) }
    }

    fn cmd_texture_barrier(&self, buffer: vk::CommandBuffer, transition: &TextureBarrier) {
        unsafe {
            self.cmd_pipeline_barrier(
                buffer,
                transition.src_stage,
                transition.dst_stage,
                vk::DependencyFlags::empty(),
                &[],
                &[],
                &[transition.barrier],
            );
        }
    }

    fn cmd_clear_color_image(
        &self,
        buffer: vk::CommandBuffer,
        image: vk::Image,
        layout: vk::ImageLayout,
        color: &vk::ClearColorValue,
        range: vk::ImageSubresourceRange,
    ) {
        unsafe { Self::cmd_clear_color_image(self, buffer, image, layout, color, &[range]) }
    }
}

/// Image barrier plus the stages it orders
#[derive(Debug, Clone, Copy)]
pub struct TextureBarrier {
    /// Barrier over the full subresource range of the texture
    pub barrier: vk::ImageMemoryBarrier,
    /// Stages that must finish before the transition
    pub src_stage: vk::PipelineStageFlags,
    /// Stages that wait for the transition
    pub dst_stage: vk::PipelineStageFlags,
}

/// Build the barrier moving `texture` from `from` to `to`
///
/// Both states must be image compatible and `to` cannot be
/// [`ResourceState::Undefined`].
pub fn texture_barrier(
    texture: &Texture,
    from: ResourceState,
    to: ResourceState,
) -> RhiResult<TextureBarrier> {
    if to == ResourceState::Undefined {
        return Err(RhiError::InvalidResourceState {
            state: to,
            reason: "only valid as a source state",
        });
    }

    let barrier = vk::ImageMemoryBarrier::builder()
        .src_access_mask(from.access_mask())
        .dst_access_mask(to.access_mask())
        .old_layout(from.image_layout()?)
        .new_layout(to.image_layout()?)
        .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .image(texture.image())
        .subresource_range(texture.descriptor().full_subresource_range())
        .build();

    Ok(TextureBarrier {
        barrier,
        src_stage: from.pipeline_stages(),
        dst_stage: to.pipeline_stages(),
    })
}

fn clear_value(color: Vector4<f32>) -> vk::ClearColorValue {
    vk::ClearColorValue {
        float32: [color.x, color.y, color.z, color.w],
    }
}

/// A primary command buffer allocated from a per-role pool
pub struct CommandBuffer<D: CommandBackend = ash::Device> {
    device: D,
    pool: vk::CommandPool,
    handle: vk::CommandBuffer,
    role: QueueRole,
    recording: bool,
}

impl<D: CommandBackend> CommandBuffer<D> {
    pub(crate) const fn new(
        device: D,
        pool: vk::CommandPool,
        handle: vk::CommandBuffer,
        role: QueueRole,
    ) -> Self {
        Self {
            device,
            pool,
            handle,
            role,
            recording: false,
        }
    }

    /// Native handle, as passed to the swapchain on present
    pub const fn handle(&self) -> vk::CommandBuffer {
        self.handle
    }

    /// Queue role of the pool this buffer came from
    pub const fn role(&self) -> QueueRole {
        self.role
    }

    /// Whether a `begin` is waiting for its `end`
    pub const fn is_recording(&self) -> bool {
        self.recording
    }

    /// Start a one-time-submit recording session
    ///
    /// The buffer must not be in flight on the GPU; the swapchain frame
    /// fence guarantees this for per-frame buffers.
    pub fn begin(&mut self) -> RhiResult<()> {
        if self.recording {
            return Err(RhiError::InvalidOperation {
                reason: "Command buffer already recording".to_string(),
            });
        }

        self.device
            .begin_command_buffer(self.handle)
            .map_err(RhiError::from)?;

        self.recording = true;
        Ok(())
    }

    /// Finish the recording session
    pub fn end(&mut self) -> RhiResult<()> {
        self.ensure_recording()?;

        self.device
            .end_command_buffer(self.handle)
            .map_err(RhiError::from)?;

        self.recording = false;
        Ok(())
    }

    /// Record a barrier moving `texture` from `from` to `to`
    ///
    /// The caller tracks the texture's state; `from` must be the state the
    /// texture is really in.
    pub fn transition_texture(
        &mut self,
        texture: &Texture,
        from: ResourceState,
        to: ResourceState,
    ) -> RhiResult<()> {
        self.ensure_recording()?;
        let transition = texture_barrier(texture, from, to)?;

        self.device.cmd_texture_barrier(self.handle, &transition);
        Ok(())
    }

    /// Record a clear of every mip and slice of `texture` to `color`
    ///
    /// `state` must be [`ResourceState::CopyDestination`] or
    /// [`ResourceState::UnorderedAccess`]; anything else is reported and the
    /// clear is skipped.
    pub fn clear_color(
        &mut self,
        texture: &Texture,
        state: ResourceState,
        color: Vector4<f32>,
    ) -> RhiResult<()> {
        self.ensure_recording()?;

        soft_assert!(
            state.allows_clear(),
            "Cannot clear texture in state {:?}, expected CopyDestination or UnorderedAccess",
            state
        );
        if !state.allows_clear() {
            return Ok(());
        }

        self.device.cmd_clear_color_image(
            self.handle,
            texture.image(),
            state.image_layout()?,
            &clear_value(color),
            texture.descriptor().full_subresource_range(),
        );
        Ok(())
    }

    fn ensure_recording(&self) -> RhiResult<()> {
        if self.recording {
            Ok(())
        } else {
            Err(RhiError::InvalidOperation {
                reason: "Command buffer not recording".to_string(),
            })
        }
    }
}

impl<D: CommandBackend> fmt::Debug for CommandBuffer<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandBuffer")
            .field("handle", &self.handle)
            .field("role", &self.role)
            .field("recording", &self.recording)
            .finish_non_exhaustive()
    }
}

impl<D: CommandBackend> Drop for CommandBuffer<D> {
    fn drop(&mut self) {
        if self.pool != vk::CommandPool::null() && self.handle != vk::CommandBuffer::null() {
            self.device.free_command_buffers(self.pool, &[self.handle]);
        }
    }
}
