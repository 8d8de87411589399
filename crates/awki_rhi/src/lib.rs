//! # Awki RHI
//!
//! Graphics device and frame presentation core for the Awki engine, built on
//! Vulkan through `ash`.
//!
//! ## Features
//!
//! - **Device selection**: scores every adapter by type and queue-family shape
//! - **Command recording**: per-queue command pools with reusable buffers
//! - **Resource transitions**: deterministic state → barrier mapping tables
//! - **Presentation**: multi-frame-in-flight swapchain with lazy recreation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use awki_rhi::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ApplicationConfig::default();
//!     let mut window = GlfwWindow::new(&config.window)?;
//!     let device = Device::new(&config.device, &window)?;
//!     let mut allocator = CommandBufferAllocator::new(&device)?;
//!     let mut swapchain = Swapchain::new(&device, &window)?;
//!
//!     let count = swapchain.backbuffer_count();
//!     let buffers = allocator.allocate_command_buffers(QueueRole::Graphics, count)?;
//!     while !window.should_close() {
//!         window.poll_events();
//!         if !swapchain.prepare(&window)? {
//!             continue;
//!         }
//!         // record into buffers[swapchain.frame_index()] ...
//!         let handle = allocator.get(buffers[swapchain.frame_index()]).map(CommandBuffer::handle);
//!         swapchain.present(handle.as_slice())?;
//!     }
//!     device.wait_idle()?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

#[macro_use]
pub mod assert;

pub mod command_allocator;
pub mod command_buffer;
pub mod config;
pub mod device;
pub mod error;
pub mod logging;
pub mod pixel_format;
pub mod resource_state;
pub mod swapchain;
pub mod texture;
pub mod window;

pub use error::{RhiError, RhiResult};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        command_allocator::{CommandBufferAllocator, CommandBufferId},
        command_buffer::CommandBuffer,
        config::{ApplicationConfig, Config, DeviceConfig, EngineConfig, WindowConfig},
        device::{Device, QueueRole},
        pixel_format::PixelFormat,
        resource_state::ResourceState,
        swapchain::Swapchain,
        texture::{Texture, TextureDescriptor, TextureFlags},
        window::{GlfwWindow, PresentationWindow},
        RhiError, RhiResult,
    };
}
