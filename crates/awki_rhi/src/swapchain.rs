//! Presentation swapchain
//!
//! The [`Swapchain`] owns the window surface, the presentable images and one
//! set of synchronization primitives per frame in flight. Each frame goes
//! through:
//!
//! ```text
//! prepare ─► (recreate?) ─► wait frame fence ─► acquire ─► reset fence
//!    record commands into the frame's command buffers
//! present ─► submit (wait acquired, signal finished + fence) ─► queue present
//! ```
//!
//! State changes:
//!
//! | From            | Event                               | To              |
//! |-----------------|-------------------------------------|-----------------|
//! | Uninitialized   | created with a non-zero surface     | Ready           |
//! | Uninitialized   | created with a zero-area surface    | NeedsRecreation |
//! | Ready           | suboptimal acquire, stale present   | NeedsRecreation |
//! | NeedsRecreation | `prepare` with a non-zero surface   | Ready           |
//! | any             | `destroy` / drop                    | Destroyed       |
//!
//! Only [`RhiError::DeviceLost`] escapes the per-frame calls; every other
//! failure is logged and the frame is skipped.
//!
//! The native calls are issued through a [`PresentBackend`]; the default
//! [`VulkanPresenter`] clones the loader tables out of the [`Device`], so the
//! swapchain must be dropped before the device.

use ash::extensions::khr::{Surface as SurfaceLoader, Swapchain as SwapchainLoader};
use ash::prelude::VkResult;
use ash::vk;

use crate::device::{Device, QueueRole};
use crate::pixel_format::PixelFormat;
use crate::texture::{Texture, TextureDescriptor, TextureFlags};
use crate::window::PresentationWindow;
use crate::{RhiError, RhiResult};

/// Lifecycle state of a [`Swapchain`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapchainState {
    /// Native objects are being created
    Uninitialized,
    /// Frames can be acquired
    Ready,
    /// The native swapchain must be rebuilt before the next acquire
    NeedsRecreation,
    /// Every native object has been released
    Destroyed,
}

/// Parameters of one native swapchain
#[derive(Debug, Clone, Copy)]
pub struct SwapchainDescriptor {
    /// Minimum number of presentable images
    pub image_count: u32,
    /// Image format and color space
    pub surface_format: vk::SurfaceFormatKHR,
    /// Presentation mode
    pub present_mode: vk::PresentModeKHR,
    /// Image size
    pub extent: vk::Extent2D,
    /// Image usages, restricted to what the surface supports
    pub image_usage: vk::ImageUsageFlags,
    /// Surface transform
    pub pre_transform: vk::SurfaceTransformFlagsKHR,
    /// Alpha compositing mode
    pub composite_alpha: vk::CompositeAlphaFlagsKHR,
}

/// Native operations driven by the swapchain state machine
pub trait PresentBackend {
    /// Current surface capabilities
    fn surface_capabilities(&self) -> RhiResult<vk::SurfaceCapabilitiesKHR>;
    /// Formats the surface can present
    fn surface_formats(&self) -> RhiResult<Vec<vk::SurfaceFormatKHR>>;
    /// Presentation modes the surface supports
    fn present_modes(&self) -> RhiResult<Vec<vk::PresentModeKHR>>;

    /// Create a swapchain, handing `old` over to the driver
    fn create_swapchain(
        &mut self,
        descriptor: &SwapchainDescriptor,
        old: vk::SwapchainKHR,
    ) -> RhiResult<vk::SwapchainKHR>;
    /// Presentable images of `swapchain`
    fn swapchain_images(&self, swapchain: vk::SwapchainKHR) -> RhiResult<Vec<vk::Image>>;
    /// Destroy `swapchain`
    fn destroy_swapchain(&mut self, swapchain: vk::SwapchainKHR);

    /// Create a binary semaphore
    fn create_semaphore(&mut self) -> RhiResult<vk::Semaphore>;
    /// Destroy `semaphore`
    fn destroy_semaphore(&mut self, semaphore: vk::Semaphore);
    /// Create a fence, optionally already signaled
    fn create_fence(&mut self, signaled: bool) -> RhiResult<vk::Fence>;
    /// Destroy `fence`
    fn destroy_fence(&mut self, fence: vk::Fence);
    /// Block until `fence` is signaled
    fn wait_for_fence(&mut self, fence: vk::Fence) -> RhiResult<()>;
    /// Return `fence` to the unsignaled state
    fn reset_fence(&mut self, fence: vk::Fence) -> RhiResult<()>;

    /// Acquire the next image; the flag reports a suboptimal swapchain
    fn acquire_next_image(
        &mut self,
        swapchain: vk::SwapchainKHR,
        signal: vk::Semaphore,
    ) -> VkResult<(u32, bool)>;
    /// Submit `command_buffers` to the presentation queue
    fn submit(
        &mut self,
        command_buffers: &[vk::CommandBuffer],
        wait: vk::Semaphore,
        wait_stage: vk::PipelineStageFlags,
        signal: vk::Semaphore,
        fence: vk::Fence,
    ) -> VkResult<()>;
    /// Queue `image_index` for presentation; the flag reports a suboptimal swapchain
    fn present(
        &mut self,
        swapchain: vk::SwapchainKHR,
        image_index: u32,
        wait: vk::Semaphore,
    ) -> VkResult<bool>;

    /// Block until the device is idle
    fn wait_idle(&mut self) -> RhiResult<()>;
    /// Destroy the presentation surface
    fn destroy_surface(&mut self);
}

/// Number of images to request: one above the minimum, within the maximum
pub fn choose_image_count(capabilities: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let count = capabilities.min_image_count + 1;
    if capabilities.max_image_count > 0 && count > capabilities.max_image_count {
        capabilities.max_image_count
    } else {
        count
    }
}

/// Prefer `R8G8B8A8_UNORM`; a lone `UNDEFINED` entry means any format works
pub fn choose_surface_format(formats: &[vk::SurfaceFormatKHR]) -> Option<vk::SurfaceFormatKHR> {
    let preferred = vk::SurfaceFormatKHR {
        format: vk::Format::R8G8B8A8_UNORM,
        color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
    };

    if let [only] = formats {
        if only.format == vk::Format::UNDEFINED {
            return Some(preferred);
        }
    }

    formats
        .iter()
        .find(|format| format.format == vk::Format::R8G8B8A8_UNORM)
        .or_else(|| formats.first())
        .copied()
}

/// Prefer mailbox, then FIFO, then whatever the surface lists first
pub fn choose_present_mode(modes: &[vk::PresentModeKHR]) -> Option<vk::PresentModeKHR> {
    [vk::PresentModeKHR::MAILBOX, vk::PresentModeKHR::FIFO]
        .into_iter()
        .find(|mode| modes.contains(mode))
        .or_else(|| modes.first().copied())
}

/// The surface's current extent, or the window size clamped to the surface limits
pub fn choose_extent(
    capabilities: &vk::SurfaceCapabilitiesKHR,
    window_size: (u32, u32),
) -> vk::Extent2D {
    if capabilities.current_extent.width != u32::MAX {
        return capabilities.current_extent;
    }

    let (width, height) = window_size;
    let (min, max) = (capabilities.min_image_extent, capabilities.max_image_extent);
    vk::Extent2D {
        width: width.clamp(min.width, max.width),
        height: height.clamp(min.height, max.height),
    }
}

/// Whether there is nothing to render into
pub const fn has_zero_area(capabilities: &vk::SurfaceCapabilitiesKHR) -> bool {
    capabilities.max_image_extent.width == 0 || capabilities.max_image_extent.height == 0
}

#[derive(Debug, Clone, Copy)]
struct FrameSync {
    image_acquired: vk::Semaphore,
    render_finished: vk::Semaphore,
    in_flight: vk::Fence,
}

/// Chain of presentable images with per-frame synchronization
pub struct Swapchain<B: PresentBackend = VulkanPresenter> {
    backend: B,
    swapchain: vk::SwapchainKHR,
    backbuffers: Vec<Texture>,
    frames: Vec<FrameSync>,
    surface_format: vk::SurfaceFormatKHR,
    present_mode: vk::PresentModeKHR,
    extent: vk::Extent2D,
    backbuffer_count: u32,
    frame_index: usize,
    image_index: Option<u32>,
    state: SwapchainState,
}

impl Swapchain<VulkanPresenter> {
    /// Create a surface for `window` and a swapchain presenting to it
    pub fn new(device: &Device, window: &impl PresentationWindow) -> RhiResult<Self> {
        let presenter = VulkanPresenter::new(device, window)?;
        Self::with_backend(presenter, window)
    }
}

impl<B: PresentBackend> Swapchain<B> {
    /// Build the swapchain on top of `backend`
    ///
    /// Surface formats and present modes are queried once here. When the
    /// surface has no area yet, creation of the native swapchain is deferred
    /// to the first [`Swapchain::prepare`].
    pub fn with_backend(backend: B, window: &impl PresentationWindow) -> RhiResult<Self> {
        let mut swapchain = Self {
            backend,
            swapchain: vk::SwapchainKHR::null(),
            backbuffers: Vec::new(),
            frames: Vec::new(),
            surface_format: vk::SurfaceFormatKHR::default(),
            present_mode: vk::PresentModeKHR::FIFO,
            extent: vk::Extent2D::default(),
            backbuffer_count: 0,
            frame_index: 0,
            image_index: None,
            state: SwapchainState::Uninitialized,
        };

        let capabilities = swapchain.backend.surface_capabilities()?;
        swapchain.surface_format = choose_surface_format(&swapchain.backend.surface_formats()?)
            .ok_or_else(|| {
                RhiError::InitializationFailed("Surface reports no formats".to_string())
            })?;
        swapchain.present_mode = choose_present_mode(&swapchain.backend.present_modes()?)
            .ok_or_else(|| {
                RhiError::InitializationFailed("Surface reports no present modes".to_string())
            })?;
        swapchain.backbuffer_count = choose_image_count(&capabilities);

        for _ in 0..swapchain.backbuffer_count {
            let frame = swapchain.create_frame_sync()?;
            swapchain.frames.push(frame);
        }

        if has_zero_area(&capabilities) {
            log::info!("Surface has no area yet, deferring swapchain creation");
            swapchain.state = SwapchainState::NeedsRecreation;
        } else {
            swapchain.create_swapchain(window, &capabilities)?;
            swapchain.state = SwapchainState::Ready;
        }

        log::info!(
            "Swapchain created: {} frames in flight, {:?}, {:?}",
            swapchain.backbuffer_count,
            swapchain.surface_format.format,
            swapchain.present_mode
        );
        Ok(swapchain)
    }

    /// Get the next backbuffer ready for recording
    ///
    /// Returns `Ok(false)` when this frame should be skipped (zero-area
    /// surface, failed recreation or acquire); the caller simply tries again
    /// next frame. Only a lost device is an error.
    pub fn prepare(&mut self, window: &impl PresentationWindow) -> RhiResult<bool> {
        match self.state {
            SwapchainState::Ready | SwapchainState::NeedsRecreation => {}
            state => {
                log::error!("Cannot prepare a frame on a swapchain in state {:?}", state);
                return Ok(false);
            }
        }

        soft_assert!(self.image_index.is_none(), "Swapchain prepared twice without presenting");
        if self.image_index.is_some() {
            return Ok(true);
        }

        let (width, height) = window.drawable_size();
        let window_changed = window.is_minimized()
            || width != self.extent.width
            || height != self.extent.height;

        if self.state == SwapchainState::NeedsRecreation || window_changed {
            match self.recreate(window) {
                Ok(true) => {}
                Ok(false) => return Ok(false),
                Err(e) => return Self::skip_frame("Failed to recreate swapchain", e),
            }
        }

        let fence = self.frames[self.frame_index].in_flight;
        if let Err(e) = self.backend.wait_for_fence(fence) {
            return Self::skip_frame("Error while waiting for frame fence", e);
        }

        self.acquire(window, true)
    }

    /// Submit `command_buffers` for the prepared frame and present it
    ///
    /// The command buffers must target the graphics queue and leave the
    /// current backbuffer in
    /// [`ResourceState::Present`](crate::resource_state::ResourceState::Present).
    pub fn present(&mut self, command_buffers: &[vk::CommandBuffer]) -> RhiResult<()> {
        let Some(image_index) = self.image_index.take() else {
            log::warn!("Present called without an acquired backbuffer, frame dropped");
            return Ok(());
        };
        let frame = self.frames[self.frame_index];

        let submitted = self.backend.submit(
            command_buffers,
            frame.image_acquired,
            vk::PipelineStageFlags::BOTTOM_OF_PIPE,
            frame.render_finished,
            frame.in_flight,
        );

        match submitted {
            Ok(()) => {
                let presented = self
                    .backend
                    .present(self.swapchain, image_index, frame.render_finished);
                match presented {
                    Ok(false) => {}
                    Ok(true) | Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                        self.mark_for_recreation()?;
                    }
                    Err(e) => {
                        Self::skip_frame("Failed to present frame", RhiError::from(e))?;
                    }
                }
            }
            Err(e) => {
                Self::skip_frame("Failed to submit frame", RhiError::from(e))?;
                self.replace_frame_sync(self.frame_index)?;
            }
        }

        self.frame_index = (self.frame_index + 1) % self.frames.len();
        Ok(())
    }

    /// Release every native object; the swapchain cannot be used afterwards
    pub fn destroy(&mut self) {
        if self.state == SwapchainState::Destroyed {
            return;
        }

        if let Err(e) = self.backend.wait_idle() {
            log::warn!("Failed to wait for device idle before destroying swapchain: {}", e);
        }

        self.backbuffers.clear();
        for frame in std::mem::take(&mut self.frames) {
            self.destroy_frame_sync(frame);
        }
        if self.swapchain != vk::SwapchainKHR::null() {
            self.backend.destroy_swapchain(self.swapchain);
            self.swapchain = vk::SwapchainKHR::null();
        }
        self.backend.destroy_surface();

        self.image_index = None;
        self.state = SwapchainState::Destroyed;
        log::debug!("Swapchain destroyed");
    }

    /// Index of the frame in flight, in `0..backbuffer_count()`
    pub const fn frame_index(&self) -> usize {
        self.frame_index
    }

    /// Image acquired by the last successful [`Swapchain::prepare`]
    pub const fn backbuffer_index(&self) -> Option<u32> {
        self.image_index
    }

    /// Number of frames in flight
    pub const fn backbuffer_count(&self) -> u32 {
        self.backbuffer_count
    }

    /// Texture wrapping the acquired image
    pub fn current_backbuffer(&self) -> Option<&Texture> {
        self.image_index
            .and_then(|index| self.backbuffers.get(index as usize))
    }

    /// Every presentable image
    pub fn backbuffers(&self) -> &[Texture] {
        &self.backbuffers
    }

    /// Size of the presentable images
    pub const fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    /// Format and color space of the presentable images
    pub const fn surface_format(&self) -> vk::SurfaceFormatKHR {
        self.surface_format
    }

    /// Format of the presentable images, when it has a table entry
    pub fn format(&self) -> Option<PixelFormat> {
        PixelFormat::from_vk(self.surface_format.format)
    }

    /// Presentation mode in use
    pub const fn present_mode(&self) -> vk::PresentModeKHR {
        self.present_mode
    }

    /// Whether the next prepare rebuilds the native swapchain
    pub fn needs_recreation(&self) -> bool {
        self.state == SwapchainState::NeedsRecreation
    }

    /// Lifecycle state
    pub const fn state(&self) -> SwapchainState {
        self.state
    }

    /// The backend issuing native calls
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    fn acquire(&mut self, window: &impl PresentationWindow, retry: bool) -> RhiResult<bool> {
        let frame = self.frames[self.frame_index];

        match self.backend.acquire_next_image(self.swapchain, frame.image_acquired) {
            Ok((index, suboptimal)) => {
                if suboptimal {
                    log::debug!("Acquired suboptimal backbuffer, recreating next frame");
                    self.state = SwapchainState::NeedsRecreation;
                }
                if let Err(e) = self.backend.reset_fence(frame.in_flight) {
                    return Self::skip_frame("Failed to reset frame fence", e);
                }
                self.image_index = Some(index);
                Ok(true)
            }
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                self.state = SwapchainState::NeedsRecreation;
                if !retry {
                    log::warn!("Swapchain still out of date after recreation, skipping frame");
                    return Ok(false);
                }
                match self.recreate(window) {
                    Ok(true) => self.acquire(window, false),
                    Ok(false) => Ok(false),
                    Err(e) => Self::skip_frame("Failed to recreate swapchain", e),
                }
            }
            Err(e) => {
                self.image_index = None;
                Self::skip_frame("Failed to acquire next backbuffer", RhiError::from(e))
            }
        }
    }

    fn recreate(&mut self, window: &impl PresentationWindow) -> RhiResult<bool> {
        let capabilities = self.backend.surface_capabilities()?;
        if has_zero_area(&capabilities) {
            return Ok(false);
        }

        self.backend.wait_idle()?;
        self.create_swapchain(window, &capabilities)?;
        self.state = SwapchainState::Ready;
        log::debug!("Swapchain recreated at {}x{}", self.extent.width, self.extent.height);
        Ok(true)
    }

    fn create_swapchain(
        &mut self,
        window: &impl PresentationWindow,
        capabilities: &vk::SurfaceCapabilitiesKHR,
    ) -> RhiResult<()> {
        let wanted_usage = vk::ImageUsageFlags::COLOR_ATTACHMENT
            | vk::ImageUsageFlags::SAMPLED
            | vk::ImageUsageFlags::TRANSFER_DST;
        let image_usage = wanted_usage & capabilities.supported_usage_flags;
        if !image_usage.contains(vk::ImageUsageFlags::TRANSFER_DST) {
            log::warn!("Surface images cannot be cleared, transfer destination usage unsupported");
        }

        let composite_alpha = if capabilities
            .supported_composite_alpha
            .contains(vk::CompositeAlphaFlagsKHR::OPAQUE)
        {
            vk::CompositeAlphaFlagsKHR::OPAQUE
        } else {
            vk::CompositeAlphaFlagsKHR::INHERIT
        };

        let descriptor = SwapchainDescriptor {
            image_count: self.backbuffer_count,
            surface_format: self.surface_format,
            present_mode: self.present_mode,
            extent: choose_extent(capabilities, window.drawable_size()),
            image_usage,
            pre_transform: capabilities.current_transform,
            composite_alpha,
        };

        let old = self.swapchain;
        let swapchain = self.backend.create_swapchain(&descriptor, old)?;
        let images = match self.backend.swapchain_images(swapchain) {
            Ok(images) => images,
            Err(e) => {
                self.backend.destroy_swapchain(swapchain);
                return Err(e);
            }
        };

        self.backbuffers.clear();
        if old != vk::SwapchainKHR::null() {
            self.backend.destroy_swapchain(old);
        }
        self.swapchain = swapchain;
        self.extent = descriptor.extent;

        let format = PixelFormat::from_vk(self.surface_format.format).unwrap_or_else(|| {
            log::warn!("Surface format {:?} has no pixel format entry", self.surface_format.format);
            PixelFormat::Undefined
        });
        let texture_descriptor = TextureDescriptor {
            flags: TextureFlags::DEFAULT_RT | TextureFlags::COPY_DESTINATION,
            ..TextureDescriptor::render_target(self.extent.width, self.extent.height, format)
        };
        self.backbuffers = images
            .into_iter()
            .map(|image| Texture::from_image(texture_descriptor, image))
            .collect();

        Ok(())
    }

    fn mark_for_recreation(&mut self) -> RhiResult<()> {
        match self.backend.surface_capabilities() {
            Ok(capabilities) if has_zero_area(&capabilities) => {
                log::debug!("Surface has no area, deferring swapchain recreation");
            }
            Ok(_) => self.state = SwapchainState::NeedsRecreation,
            Err(RhiError::DeviceLost) => return Err(RhiError::DeviceLost),
            Err(_) => self.state = SwapchainState::NeedsRecreation,
        }
        Ok(())
    }

    fn create_frame_sync(&mut self) -> RhiResult<FrameSync> {
        let image_acquired = self.backend.create_semaphore()?;
        let render_finished = match self.backend.create_semaphore() {
            Ok(semaphore) => semaphore,
            Err(e) => {
                self.backend.destroy_semaphore(image_acquired);
                return Err(e);
            }
        };
        match self.backend.create_fence(true) {
            Ok(in_flight) => Ok(FrameSync {
                image_acquired,
                render_finished,
                in_flight,
            }),
            Err(e) => {
                self.backend.destroy_semaphore(image_acquired);
                self.backend.destroy_semaphore(render_finished);
                Err(e)
            }
        }
    }

    fn destroy_frame_sync(&mut self, frame: FrameSync) {
        self.backend.destroy_fence(frame.in_flight);
        self.backend.destroy_semaphore(frame.image_acquired);
        self.backend.destroy_semaphore(frame.render_finished);
    }

    // The slot's fence stays unsignaled and its acquire semaphore stays
    // signaled after a failed submit; swap both for fresh objects.
    fn replace_frame_sync(&mut self, slot: usize) -> RhiResult<()> {
        self.backend.wait_idle()?;
        let fresh = self.create_frame_sync()?;
        let stale = std::mem::replace(&mut self.frames[slot], fresh);
        self.destroy_frame_sync(stale);
        self.state = SwapchainState::NeedsRecreation;
        Ok(())
    }

    fn skip_frame(context: &str, error: RhiError) -> RhiResult<bool> {
        if error == RhiError::DeviceLost {
            log::error!("{}: device lost", context);
            return Err(error);
        }
        log::error!("{}: {}", context, error);
        Ok(false)
    }
}

impl<B: PresentBackend> Drop for Swapchain<B> {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// [`PresentBackend`] issuing real Vulkan calls on the graphics queue
pub struct VulkanPresenter {
    device: ash::Device,
    surface_loader: SurfaceLoader,
    swapchain_loader: SwapchainLoader,
    physical_device: vk::PhysicalDevice,
    surface: vk::SurfaceKHR,
    queue: vk::Queue,
}

impl VulkanPresenter {
    /// Create a surface for `window` and check the graphics queue can present to it
    pub fn new(device: &Device, window: &impl PresentationWindow) -> RhiResult<Self> {
        let surface = window.create_surface(device.entry(), device.instance())?;
        let surface_loader = device.surface_loader().clone();

        let supported = unsafe {
            surface_loader.get_physical_device_surface_support(
                device.physical_device(),
                device.queue_family_index(QueueRole::Graphics),
                surface,
            )
        };
        if supported != Ok(true) {
            log::error!("Graphics queue cannot present to the window surface: {:?}", supported);
            unsafe {
                surface_loader.destroy_surface(surface, None);
            }
            return Err(RhiError::InitializationFailed(
                "Graphics queue cannot present to the window surface".to_string(),
            ));
        }

        Ok(Self {
            device: device.device().clone(),
            surface_loader,
            swapchain_loader: device.swapchain_loader().clone(),
            physical_device: device.physical_device(),
            surface,
            queue: device.queue(QueueRole::Graphics),
        })
    }
}

impl PresentBackend for VulkanPresenter {
    fn surface_capabilities(&self) -> RhiResult<vk::SurfaceCapabilitiesKHR> {
        unsafe {
            self.surface_loader
                .get_physical_device_surface_capabilities(self.physical_device, self.surface)
        }
        .map_err(RhiError::from)
    }

    fn surface_formats(&self) -> RhiResult<Vec<vk::SurfaceFormatKHR>> {
        unsafe {
            self.surface_loader
                .get_physical_device_surface_formats(self.physical_device, self.surface)
        }
        .map_err(RhiError::from)
    }

    fn present_modes(&self) -> RhiResult<Vec<vk::PresentModeKHR>> {
        unsafe {
            self.surface_loader
                .get_physical_device_surface_present_modes(self.physical_device, self.surface)
        }
        .map_err(RhiError::from)
    }

    fn create_swapchain(
        &mut self,
        descriptor: &SwapchainDescriptor,
        old: vk::SwapchainKHR,
    ) -> RhiResult<vk::SwapchainKHR> {
        let create_info = vk::SwapchainCreateInfoKHR::builder()
            .surface(self.surface)
            .min_image_count(descriptor.image_count)
            .image_format(descriptor.surface_format.format)
            .image_color_space(descriptor.surface_format.color_space)
            .image_extent(descriptor.extent)
            .image_array_layers(1)
            .image_usage(descriptor.image_usage)
            .image_sharing_mode(vk::SharingMode::EXCLUSIVE)
            .pre_transform(descriptor.pre_transform)
            .composite_alpha(descriptor.composite_alpha)
            .present_mode(descriptor.present_mode)
            .clipped(true)
            .old_swapchain(old);

        unsafe { self.swapchain_loader.create_swapchain(&create_info, None) }.map_err(|e| {
            log::error!("Failed to create swapchain: {:?}", e);
            RhiError::from(e)
        })
    }

    fn swapchain_images(&self, swapchain: vk::SwapchainKHR) -> RhiResult<Vec<vk::Image>> {
        unsafe { self.swapchain_loader.get_swapchain_images(swapchain) }.map_err(RhiError::from)
    }

    fn destroy_swapchain(&mut self, swapchain: vk::SwapchainKHR) {
        unsafe {
            self.swapchain_loader.destroy_swapchain(swapchain, None);
        }
    }

    fn create_semaphore(&mut self) -> RhiResult<vk::Semaphore> {
        let create_info = vk::SemaphoreCreateInfo::builder();
        unsafe { self.device.create_semaphore(&create_info, None) }.map_err(RhiError::from)
    }

    fn destroy_semaphore(&mut self, semaphore: vk::Semaphore) {
        unsafe {
            self.device.destroy_semaphore(semaphore, None);
        }
    }

    fn create_fence(&mut self, signaled: bool) -> RhiResult<vk::Fence> {
        let flags = if signaled {
            vk::FenceCreateFlags::SIGNALED
        } else {
            vk::FenceCreateFlags::empty()
        };
        let create_info = vk::FenceCreateInfo::builder().flags(flags);
        unsafe { self.device.create_fence(&create_info, None) }.map_err(RhiError::from)
    }

    fn destroy_fence(&mut self, fence: vk::Fence) {
        unsafe {
            self.device.destroy_fence(fence, None);
        }
    }

    fn wait_for_fence(&mut self, fence: vk::Fence) -> RhiResult<()> {
        unsafe { self.device.wait_for_fences(&[fence], true, u64::MAX) }.map_err(RhiError::from)
    }

    fn reset_fence(&mut self, fence: vk::Fence) -> RhiResult<()> {
        unsafe { self.device.reset_fences(&[fence]) }.map_err(RhiError::from)
    }

    fn acquire_next_image(
        &mut self,
        swapchain: vk::SwapchainKHR,
        signal: vk::Semaphore,
    ) -> VkResult<(u32, bool)> {
        unsafe {
            self.swapchain_loader
                .acquire_next_image(swapchain, u64::MAX, signal, vk::Fence::null())
        }
    }

    fn submit(
        &mut self,
        command_buffers: &[vk::CommandBuffer],
        wait: vk::Semaphore,
        wait_stage: vk::PipelineStageFlags,
        signal: vk::Semaphore,
        fence: vk::Fence,
    ) -> VkResult<()> {
        let wait_semaphores = [wait];
        let wait_stages = [wait_stage];
        let signal_semaphores = [signal];
        let submit_info = vk::SubmitInfo::builder()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(command_buffers)
            .signal_semaphores(&signal_semaphores)
            .build();

        unsafe { self.device.queue_submit(self.queue, &[submit_info], fence) }
    }

    fn present(
        &mut self,
        swapchain: vk::SwapchainKHR,
        image_index: u32,
        wait: vk::Semaphore,
    ) -> VkResult<bool> {
        let wait_semaphores = [wait];
        let swapchains = [swapchain];
        let image_indices = [image_index];
        let present_info = vk::PresentInfoKHR::builder()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        unsafe { self.swapchain_loader.queue_present(self.queue, &present_info) }
    }

    fn wait_idle(&mut self) -> RhiResult<()> {
        unsafe { self.device.device_wait_idle() }.map_err(RhiError::from)
    }

    fn destroy_surface(&mut self) {
        if self.surface != vk::SurfaceKHR::null() {
            unsafe {
                self.surface_loader.destroy_surface(self.surface, None);
            }
            self.surface = vk::SurfaceKHR::null();
        }
    }
}
