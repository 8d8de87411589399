//! Window collaborator
//!
//! The RHI never creates or destroys windows on its own behalf; it only asks
//! the window for its drawable size, its minimized state, the instance
//! extensions it needs and a surface. [`GlfwWindow`] is the GLFW-backed
//! implementation used by applications.

use ash::{vk, Entry, Instance};
use thiserror::Error;

use crate::config::WindowConfig;
use crate::{RhiError, RhiResult};

/// Window management errors
#[derive(Error, Debug)]
pub enum WindowError {
    /// GLFW could not be initialized
    #[error("GLFW initialization failed")]
    InitializationFailed,

    /// GLFW refused to create the window
    #[error("Window creation failed")]
    CreationFailed,

    /// Any other GLFW failure
    #[error("GLFW error: {0}")]
    GlfwError(String),
}

/// Result type for window operations
pub type WindowResult<T> = Result<T, WindowError>;

impl From<WindowError> for RhiError {
    fn from(error: WindowError) -> Self {
        Self::InitializationFailed(error.to_string())
    }
}

/// What the device and swapchain need from a window
pub trait PresentationWindow {
    /// Size of the drawable area in pixels
    fn drawable_size(&self) -> (u32, u32);

    /// Whether the window is minimized
    fn is_minimized(&self) -> bool;

    /// Instance extensions needed to present to this window
    fn required_instance_extensions(&self) -> RhiResult<Vec<String>>;

    /// Create a presentation surface for this window
    fn create_surface(&self, entry: &Entry, instance: &Instance) -> RhiResult<vk::SurfaceKHR>;
}

/// GLFW window configured for Vulkan rendering (no client API)
pub struct GlfwWindow {
    glfw: glfw::Glfw,
    window: glfw::PWindow,
    events: glfw::GlfwReceiver<(f64, glfw::WindowEvent)>,
}

impl GlfwWindow {
    /// Open a window described by `config`
    pub fn new(config: &WindowConfig) -> WindowResult<Self> {
        let mut glfw =
            glfw::init(glfw::fail_on_errors).map_err(|_| WindowError::InitializationFailed)?;

        if !glfw.vulkan_supported() {
            return Err(WindowError::GlfwError("Vulkan is not supported by GLFW".to_string()));
        }

        glfw.window_hint(glfw::WindowHint::ClientApi(glfw::ClientApiHint::NoApi));
        glfw.window_hint(glfw::WindowHint::Resizable(config.resizable));

        let (mut window, events) = glfw
            .create_window(config.width, config.height, &config.title, glfw::WindowMode::Windowed)
            .ok_or(WindowError::CreationFailed)?;

        window.set_close_polling(true);
        window.set_key_polling(true);
        window.set_framebuffer_size_polling(true);

        log::info!("Created window '{}' ({}x{})", config.title, config.width, config.height);
        Ok(Self { glfw, window, events })
    }

    /// Whether the user asked to close the window
    pub fn should_close(&self) -> bool {
        self.window.should_close()
    }

    /// Ask the window to close at the end of the frame
    pub fn set_should_close(&mut self, should_close: bool) {
        self.window.set_should_close(should_close);
    }

    /// Process pending window system events
    ///
    /// Escape requests a close.
    pub fn poll_events(&mut self) {
        self.glfw.poll_events();
        for (_, event) in glfw::flush_messages(&self.events) {
            if let glfw::WindowEvent::Key(glfw::Key::Escape, _, glfw::Action::Press, _) = event {
                self.window.set_should_close(true);
            }
        }
    }
}

impl PresentationWindow for GlfwWindow {
    fn drawable_size(&self) -> (u32, u32) {
        let (width, height) = self.window.get_framebuffer_size();
        (width.max(0) as u32, height.max(0) as u32)
    }

    fn is_minimized(&self) -> bool {
        self.window.is_iconified()
    }

    fn required_instance_extensions(&self) -> RhiResult<Vec<String>> {
        self.glfw
            .get_required_instance_extensions()
            .ok_or_else(|| {
                WindowError::GlfwError("Failed to get required extensions".to_string()).into()
            })
    }

    fn create_surface(&self, _entry: &Entry, instance: &Instance) -> RhiResult<vk::SurfaceKHR> {
        let mut surface = vk::SurfaceKHR::null();
        let result = self
            .window
            .create_window_surface(instance.handle(), std::ptr::null(), &mut surface);

        if result == vk::Result::SUCCESS {
            Ok(surface)
        } else {
            log::error!("Failed to create window surface: {:?}", result);
            Err(RhiError::from(result))
        }
    }
}
