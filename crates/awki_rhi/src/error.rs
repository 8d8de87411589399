//! Error types shared by every RHI component

use ash::vk;
use thiserror::Error;

use crate::resource_state::ResourceState;

/// RHI-specific error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RhiError {
    /// The Vulkan loader or its entry points could not be loaded
    #[error("Failed to load Vulkan entry points: {0}")]
    Loading(String),

    /// General Vulkan API error with result code
    #[error("Vulkan API error: {0:?}")]
    Api(vk::Result),

    /// No physical device exposes a usable graphics queue family
    #[error("Failed to find a suitable graphics device")]
    NoSuitableDevice,

    /// A required device or instance extension is not available
    #[error("Required extension '{0}' is not available")]
    MissingExtension(String),

    /// A component could not be created
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    /// A resource state was used where its class of state is not allowed
    #[error("Invalid resource state {state:?}: {reason}")]
    InvalidResourceState {
        /// The offending state
        state: ResourceState,
        /// Why the state is not accepted here
        reason: &'static str,
    },

    /// Invalid operation attempted
    #[error("Invalid operation: {reason}")]
    InvalidOperation {
        /// Description of why the operation is invalid
        reason: String,
    },

    /// The logical device was lost; the GPU can no longer be used
    #[error("Graphics device lost")]
    DeviceLost,
}

impl From<vk::Result> for RhiError {
    fn from(result: vk::Result) -> Self {
        match result {
            vk::Result::ERROR_DEVICE_LOST => Self::DeviceLost,
            other => Self::Api(other),
        }
    }
}

/// Result type for RHI operations
pub type RhiResult<T> = Result<T, RhiError>;
