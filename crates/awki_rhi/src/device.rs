//! GPU device selection and ownership
//!
//! [`Device`] is the context object every other RHI component borrows from.
//! It loads Vulkan, creates the instance (with validation when requested),
//! scores every physical device, creates the logical device with one queue
//! per [`QueueRole`] and owns all of it until it is dropped.
//!
//! Selection works on [`AdapterInfo`] snapshots so the heuristics can be
//! exercised without a GPU:
//!
//! ```text
//! enumerate → AdapterInfo[] → QueueFamilyAssignment + DeviceScorer → best adapter
//! ```
//!
//! Dependents (command pools, swapchains) clone loader tables out of the
//! device; they must be dropped before it.

use std::ffi::{c_char, CStr, CString};

use ash::extensions::ext::DebugUtils;
use ash::extensions::khr::{Surface as SurfaceLoader, Swapchain as SwapchainLoader};
use ash::{vk, Entry, Instance};

use crate::config::DeviceConfig;
use crate::window::PresentationWindow;
use crate::{RhiError, RhiResult};

const VALIDATION_LAYER_NAME: &CStr =
    unsafe { CStr::from_bytes_with_nul_unchecked(b"VK_LAYER_KHRONOS_validation\0") };
const DEBUG_MARKER_EXTENSION_NAME: &CStr =
    unsafe { CStr::from_bytes_with_nul_unchecked(b"VK_EXT_debug_marker\0") };
const MEMORY_BUDGET_EXTENSION_NAME: &CStr =
    unsafe { CStr::from_bytes_with_nul_unchecked(b"VK_EXT_memory_budget\0") };
const ENGINE_NAME: &CStr = unsafe { CStr::from_bytes_with_nul_unchecked(b"Awki\0") };

/// Hardware queue a piece of GPU work is submitted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueRole {
    /// Graphics and compute work on the main queue
    Graphics,
    /// Compute work, asynchronous when the device has a compute-only family
    Compute,
    /// Copies, asynchronous when the device has a transfer-only family
    Transfer,
}

impl QueueRole {
    /// Every role
    pub const ALL: [Self; 3] = [Self::Graphics, Self::Compute, Self::Transfer];
}

/// One value per [`QueueRole`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PerQueue<T> {
    /// Value for [`QueueRole::Graphics`]
    pub graphics: T,
    /// Value for [`QueueRole::Compute`]
    pub compute: T,
    /// Value for [`QueueRole::Transfer`]
    pub transfer: T,
}

impl<T> PerQueue<T> {
    /// Build the set by calling `f` once per role
    pub fn from_fn(mut f: impl FnMut(QueueRole) -> T) -> Self {
        Self {
            graphics: f(QueueRole::Graphics),
            compute: f(QueueRole::Compute),
            transfer: f(QueueRole::Transfer),
        }
    }

    /// Fallible variant of [`PerQueue::from_fn`]; stops at the first error
    pub fn try_from_fn<E>(mut f: impl FnMut(QueueRole) -> Result<T, E>) -> Result<Self, E> {
        Ok(Self {
            graphics: f(QueueRole::Graphics)?,
            compute: f(QueueRole::Compute)?,
            transfer: f(QueueRole::Transfer)?,
        })
    }

    /// Value for `role`
    pub const fn get(&self, role: QueueRole) -> &T {
        match role {
            QueueRole::Graphics => &self.graphics,
            QueueRole::Compute => &self.compute,
            QueueRole::Transfer => &self.transfer,
        }
    }

    /// Mutable value for `role`
    pub fn get_mut(&mut self, role: QueueRole) -> &mut T {
        match role {
            QueueRole::Graphics => &mut self.graphics,
            QueueRole::Compute => &mut self.compute,
            QueueRole::Transfer => &mut self.transfer,
        }
    }
}

/// Snapshot of what a physical device offers
#[derive(Debug, Clone)]
pub struct AdapterInfo {
    /// Driver-reported device name
    pub name: String,
    /// Discrete, integrated, virtual, CPU or other
    pub device_type: vk::PhysicalDeviceType,
    /// Queue families in index order
    pub queue_families: Vec<vk::QueueFamilyProperties>,
    /// Names of the supported device extensions
    pub extensions: Vec<String>,
}

impl AdapterInfo {
    fn query(instance: &Instance, physical_device: vk::PhysicalDevice) -> RhiResult<Self> {
        let properties = unsafe { instance.get_physical_device_properties(physical_device) };
        let queue_families =
            unsafe { instance.get_physical_device_queue_family_properties(physical_device) };
        let extensions = unsafe {
            instance
                .enumerate_device_extension_properties(physical_device)
                .map_err(RhiError::from)?
        };

        Ok(Self {
            name: c_chars_to_string(&properties.device_name),
            device_type: properties.device_type,
            queue_families,
            extensions: extensions
                .iter()
                .map(|extension| c_chars_to_string(&extension.extension_name))
                .collect(),
        })
    }

    /// Whether the adapter advertises the device extension `name`
    pub fn supports_extension(&self, name: &CStr) -> bool {
        let name = name.to_string_lossy();
        self.extensions.iter().any(|extension| *extension == name)
    }
}

/// Queue family chosen for every role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamilyAssignment {
    /// Family index per role
    pub families: PerQueue<u32>,
}

impl QueueFamilyAssignment {
    /// Assign roles to the families of one device
    ///
    /// Graphics takes the first family that supports both graphics and
    /// compute. Compute moves to the first compute-only family and Transfer
    /// to the first family with neither graphics nor compute, when those
    /// exist. Returns `None` when no combined graphics+compute family exists.
    pub fn from_families(families: &[vk::QueueFamilyProperties]) -> Option<Self> {
        let mut graphics = None;
        let mut async_compute = None;
        let mut async_transfer = None;

        for (index, family) in families.iter().enumerate() {
            if family.queue_count == 0 {
                continue;
            }

            let index = index as u32;
            let supports_graphics = family.queue_flags.contains(vk::QueueFlags::GRAPHICS);
            let supports_compute = family.queue_flags.contains(vk::QueueFlags::COMPUTE);
            let supports_transfer = family.queue_flags.contains(vk::QueueFlags::TRANSFER);

            if graphics.is_none() && supports_graphics && supports_compute {
                graphics = Some(index);
            }
            if async_compute.is_none() && supports_compute && !supports_graphics {
                async_compute = Some(index);
            }
            if async_transfer.is_none()
                && supports_transfer
                && !supports_graphics
                && !supports_compute
            {
                async_transfer = Some(index);
            }
        }

        let graphics = graphics?;
        Some(Self {
            families: PerQueue {
                graphics,
                compute: async_compute.unwrap_or(graphics),
                transfer: async_transfer.unwrap_or(graphics),
            },
        })
    }

    /// Whether compute work can run on its own family
    pub fn supports_async_compute(&self) -> bool {
        self.families.compute != self.families.graphics
    }

    /// Whether transfers can run on their own family
    pub fn supports_async_transfer(&self) -> bool {
        self.families.transfer != self.families.graphics
    }

    /// Distinct family indices, graphics first
    pub fn unique_families(&self) -> Vec<u32> {
        let mut unique = Vec::with_capacity(3);
        for role in QueueRole::ALL {
            let family = *self.families.get(role);
            if !unique.contains(&family) {
                unique.push(family);
            }
        }
        unique
    }
}

/// Strategy ranking candidate adapters; the highest score wins
pub trait DeviceScorer {
    /// Score one adapter given its queue assignment
    fn score(&self, adapter: &AdapterInfo, queues: &QueueFamilyAssignment) -> u32;
}

/// Default strategy: device type plus queue-family shape
///
/// Memory size, driver version and feature completeness are not weighed.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueueShapeScorer;

impl QueueShapeScorer {
    /// Weight of each device type
    pub const fn device_type_weight(device_type: vk::PhysicalDeviceType) -> u32 {
        match device_type {
            vk::PhysicalDeviceType::DISCRETE_GPU => 20,
            vk::PhysicalDeviceType::INTEGRATED_GPU => 10,
            vk::PhysicalDeviceType::VIRTUAL_GPU => 5,
            vk::PhysicalDeviceType::CPU => 1,
            _ => 0,
        }
    }
}

impl DeviceScorer for QueueShapeScorer {
    fn score(&self, adapter: &AdapterInfo, queues: &QueueFamilyAssignment) -> u32 {
        // A combined graphics+compute family always exists once we get here
        let mut score = Self::device_type_weight(adapter.device_type) + 2;
        if queues.supports_async_compute() {
            score += 1;
        }
        if queues.supports_async_transfer() {
            score += 1;
        }
        score
    }
}

/// Outcome of adapter selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceSelection {
    /// Index into the candidate list
    pub adapter_index: usize,
    /// Queue families to create
    pub queues: QueueFamilyAssignment,
    /// Score the adapter obtained
    pub score: u32,
}

/// Pick the highest-scoring adapter; ties keep the first one seen
pub fn select_adapter(
    adapters: &[AdapterInfo],
    scorer: &dyn DeviceScorer,
) -> RhiResult<DeviceSelection> {
    let mut selected: Option<DeviceSelection> = None;

    for (adapter_index, adapter) in adapters.iter().enumerate() {
        log::info!("Found device: {} ({:?})", adapter.name, adapter.device_type);

        let Some(queues) = QueueFamilyAssignment::from_families(&adapter.queue_families) else {
            log::info!("\t No combined graphics/compute queue family, skipping");
            continue;
        };

        if queues.supports_async_compute() {
            log::info!("\t Supports async compute");
        }
        if queues.supports_async_transfer() {
            log::info!("\t Supports async transfers");
        }

        let score = scorer.score(adapter, &queues);
        log::debug!("\t Score: {}", score);

        if selected.map_or(true, |best| score > best.score) {
            selected = Some(DeviceSelection { adapter_index, queues, score });
        }
    }

    selected.ok_or(RhiError::NoSuitableDevice)
}

/// Device extensions to enable on `adapter`
///
/// The swapchain extension is required; debug markers (with validation)
/// and the memory budget extension are added when available.
pub fn device_extensions(adapter: &AdapterInfo, validation: bool) -> RhiResult<Vec<&'static CStr>> {
    let swapchain = SwapchainLoader::name();
    if !adapter.supports_extension(swapchain) {
        log::error!("Required extension '{}' is not available", swapchain.to_string_lossy());
        return Err(RhiError::MissingExtension(swapchain.to_string_lossy().into_owned()));
    }

    let mut extensions = vec![swapchain];
    if validation && adapter.supports_extension(DEBUG_MARKER_EXTENSION_NAME) {
        extensions.push(DEBUG_MARKER_EXTENSION_NAME);
    }
    if adapter.supports_extension(MEMORY_BUDGET_EXTENSION_NAME) {
        extensions.push(MEMORY_BUDGET_EXTENSION_NAME);
    }
    Ok(extensions)
}

struct InstanceHandle {
    entry: Entry,
    instance: Instance,
    validation: bool,
}

impl InstanceHandle {
    fn new(config: &DeviceConfig, required_extensions: &[String]) -> RhiResult<Self> {
        let entry = unsafe { Entry::load() }.map_err(|e| {
            log::error!("Failed to load vulkan entrypoints: {}", e);
            RhiError::Loading(e.to_string())
        })?;
        let validation = config.validation_enabled() && has_validation_layer(&entry);

        let app_name = CString::new(config.application_name.as_str())
            .map_err(|e| RhiError::InitializationFailed(format!("Invalid application name: {e}")))?;
        let (major, minor, patch) = config.application_version;
        let app_info = vk::ApplicationInfo::builder()
            .application_name(&app_name)
            .application_version(vk::make_api_version(0, major, minor, patch))
            .engine_name(ENGINE_NAME)
            .engine_version(vk::make_api_version(0, 0, 0, 1))
            .api_version(vk::API_VERSION_1_1);

        let mut extension_names = required_extensions
            .iter()
            .map(|name| CString::new(name.as_str()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| RhiError::InitializationFailed(format!("Invalid extension name: {e}")))?;

        let mut layers: Vec<*const c_char> = Vec::new();
        if validation {
            extension_names.push(DebugUtils::name().to_owned());
            layers.push(VALIDATION_LAYER_NAME.as_ptr());
        }
        let extensions: Vec<*const c_char> =
            extension_names.iter().map(|name| name.as_ptr()).collect();

        let create_info = vk::InstanceCreateInfo::builder()
            .application_info(&app_info)
            .enabled_extension_names(&extensions)
            .enabled_layer_names(&layers);

        let instance = unsafe { entry.create_instance(&create_info, None) }.map_err(|e| {
            log::error!("Failed to create vulkan instance: {:?}", e);
            RhiError::from(e)
        })?;

        Ok(Self { entry, instance, validation })
    }
}

impl Drop for InstanceHandle {
    fn drop(&mut self) {
        unsafe {
            self.instance.destroy_instance(None);
        }
    }
}

struct DebugMessenger {
    loader: DebugUtils,
    messenger: vk::DebugUtilsMessengerEXT,
}

impl DebugMessenger {
    fn new(handle: &InstanceHandle) -> RhiResult<Self> {
        let loader = DebugUtils::new(&handle.entry, &handle.instance);
        let create_info = vk::DebugUtilsMessengerCreateInfoEXT::builder()
            .message_severity(
                vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE
                    | vk::DebugUtilsMessageSeverityFlagsEXT::INFO
                    | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                    | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
            )
            .message_type(
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                    | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                    | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
            )
            .pfn_user_callback(Some(debug_callback));

        let messenger = unsafe { loader.create_debug_utils_messenger(&create_info, None) }
            .map_err(|e| {
                log::error!("Failed to initialize vulkan validation layers: {:?}", e);
                RhiError::from(e)
            })?;

        Ok(Self { loader, messenger })
    }
}

impl Drop for DebugMessenger {
    fn drop(&mut self) {
        unsafe {
            self.loader.destroy_debug_utils_messenger(self.messenger, None);
        }
    }
}

/// Validation layer messages, forwarded at the matching log level
unsafe extern "system" fn debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    _message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _user_data: *mut std::ffi::c_void,
) -> vk::Bool32 {
    if callback_data.is_null() || (*callback_data).p_message.is_null() {
        return vk::FALSE;
    }
    let message = CStr::from_ptr((*callback_data).p_message).to_string_lossy();

    match message_severity {
        vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE => log::trace!("{}", message),
        vk::DebugUtilsMessageSeverityFlagsEXT::INFO => log::info!("{}", message),
        vk::DebugUtilsMessageSeverityFlagsEXT::WARNING => log::warn!("{}", message),
        _ => log::error!("{}", message),
    }

    vk::FALSE
}

struct LogicalDevice {
    device: ash::Device,
}

impl Drop for LogicalDevice {
    fn drop(&mut self) {
        unsafe {
            let _ = self.device.device_wait_idle();
            self.device.destroy_device(None);
        }
    }
}

/// Process-wide GPU context
///
/// Fields drop top to bottom: diagnostics, logical device, instance.
pub struct Device {
    debug_messenger: Option<DebugMessenger>,
    logical: LogicalDevice,
    surface_loader: SurfaceLoader,
    swapchain_loader: SwapchainLoader,
    queues: PerQueue<vk::Queue>,
    queue_families: QueueFamilyAssignment,
    physical_device: vk::PhysicalDevice,
    adapter: AdapterInfo,
    instance: InstanceHandle,
}

impl Device {
    /// Create a device able to present to `window`
    pub fn new(config: &DeviceConfig, window: &impl PresentationWindow) -> RhiResult<Self> {
        let extensions = window.required_instance_extensions()?;
        Self::with_scorer(config, &extensions, &QueueShapeScorer)
    }

    /// Create a device with explicit instance extensions and selection strategy
    pub fn with_scorer(
        config: &DeviceConfig,
        instance_extensions: &[String],
        scorer: &dyn DeviceScorer,
    ) -> RhiResult<Self> {
        let instance = InstanceHandle::new(config, instance_extensions)?;
        let validation = instance.validation;

        let debug_messenger = if validation {
            Some(DebugMessenger::new(&instance)?)
        } else {
            None
        };

        let physical_devices =
            unsafe { instance.instance.enumerate_physical_devices() }.map_err(RhiError::from)?;
        let adapters = physical_devices
            .iter()
            .map(|&physical_device| AdapterInfo::query(&instance.instance, physical_device))
            .collect::<RhiResult<Vec<_>>>()?;

        let selection = select_adapter(&adapters, scorer).map_err(|e| {
            log::error!("Failed to find a suitable graphics device");
            e
        })?;
        let physical_device = physical_devices[selection.adapter_index];
        let adapter = adapters[selection.adapter_index].clone();
        log::info!("Selected device: {}", adapter.name);

        let extensions = device_extensions(&adapter, validation)?;
        let extension_ptrs: Vec<*const c_char> =
            extensions.iter().map(|name| name.as_ptr()).collect();

        let priorities = [1.0_f32];
        let queue_infos: Vec<vk::DeviceQueueCreateInfo> = selection
            .queues
            .unique_families()
            .into_iter()
            .map(|family| {
                vk::DeviceQueueCreateInfo::builder()
                    .queue_family_index(family)
                    .queue_priorities(&priorities)
                    .build()
            })
            .collect();

        let create_info = vk::DeviceCreateInfo::builder()
            .queue_create_infos(&queue_infos)
            .enabled_extension_names(&extension_ptrs);

        let device =
            unsafe { instance.instance.create_device(physical_device, &create_info, None) }
                .map_err(|e| {
                    log::error!("Failed to create vulkan device: {:?}", e);
                    RhiError::from(e)
                })?;
        let logical = LogicalDevice { device };

        let families = selection.queues.families;
        let queues = PerQueue::from_fn(|role| unsafe {
            logical.device.get_device_queue(*families.get(role), 0)
        });

        let surface_loader = SurfaceLoader::new(&instance.entry, &instance.instance);
        let swapchain_loader = SwapchainLoader::new(&instance.instance, &logical.device);

        Ok(Self {
            debug_messenger,
            logical,
            surface_loader,
            swapchain_loader,
            queues,
            queue_families: selection.queues,
            physical_device,
            adapter,
            instance,
        })
    }

    /// Block until every queue of the device is idle
    pub fn wait_idle(&self) -> RhiResult<()> {
        unsafe { self.logical.device.device_wait_idle() }.map_err(RhiError::from)
    }

    /// The Vulkan entry points
    pub fn entry(&self) -> &Entry {
        &self.instance.entry
    }

    /// The Vulkan instance
    pub fn instance(&self) -> &Instance {
        &self.instance.instance
    }

    /// The logical device
    pub fn device(&self) -> &ash::Device {
        &self.logical.device
    }

    /// The selected physical device
    pub const fn physical_device(&self) -> vk::PhysicalDevice {
        self.physical_device
    }

    /// What the selected physical device offers
    pub const fn adapter(&self) -> &AdapterInfo {
        &self.adapter
    }

    /// Surface extension loader
    pub const fn surface_loader(&self) -> &SurfaceLoader {
        &self.surface_loader
    }

    /// Swapchain extension loader
    pub const fn swapchain_loader(&self) -> &SwapchainLoader {
        &self.swapchain_loader
    }

    /// Whether validation layers and the debug messenger are active
    pub const fn validation_enabled(&self) -> bool {
        self.debug_messenger.is_some()
    }

    /// Queue for `role`
    pub const fn queue(&self, role: QueueRole) -> vk::Queue {
        *self.queues.get(role)
    }

    /// Queue family index for `role`
    pub const fn queue_family_index(&self, role: QueueRole) -> u32 {
        *self.queue_families.families.get(role)
    }

    /// Graphics queue
    pub const fn graphics_queue(&self) -> vk::Queue {
        self.queue(QueueRole::Graphics)
    }

    /// Compute queue
    pub const fn compute_queue(&self) -> vk::Queue {
        self.queue(QueueRole::Compute)
    }

    /// Transfer queue
    pub const fn transfer_queue(&self) -> vk::Queue {
        self.queue(QueueRole::Transfer)
    }

    /// Graphics queue family index
    pub const fn graphics_queue_family_index(&self) -> u32 {
        self.queue_family_index(QueueRole::Graphics)
    }

    /// Compute queue family index
    pub const fn compute_queue_family_index(&self) -> u32 {
        self.queue_family_index(QueueRole::Compute)
    }

    /// Transfer queue family index
    pub const fn transfer_queue_family_index(&self) -> u32 {
        self.queue_family_index(QueueRole::Transfer)
    }

    /// Whether compute work has its own queue family
    pub fn supports_async_compute(&self) -> bool {
        self.queue_families.supports_async_compute()
    }

    /// Whether transfers have their own queue family
    pub fn supports_async_transfer(&self) -> bool {
        self.queue_families.supports_async_transfer()
    }
}

fn has_validation_layer(entry: &Entry) -> bool {
    #[allow(unused_unsafe)]
    let layers = match unsafe { entry.enumerate_instance_layer_properties() } {
        Ok(layers) => layers,
        Err(e) => {
            log::warn!("Failed to enumerate instance layers: {:?}", e);
            return false;
        }
    };

    let wanted = VALIDATION_LAYER_NAME.to_string_lossy();
    let found = layers
        .iter()
        .any(|layer| c_chars_to_string(&layer.layer_name) == wanted);
    if !found {
        log::warn!("Validation requested but {} is not installed", wanted);
    }
    found
}

fn c_chars_to_string(chars: &[c_char]) -> String {
    let bytes: Vec<u8> = chars.iter().take_while(|&&c| c != 0).map(|&c| c as u8).collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn family(flags: vk::QueueFlags, count: u32) -> vk::QueueFamilyProperties {
        vk::QueueFamilyProperties {
            queue_flags: flags,
            queue_count: count,
            ..Default::default()
        }
    }

    fn combined() -> vk::QueueFamilyProperties {
        family(vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE | vk::QueueFlags::TRANSFER, 16)
    }

    fn adapter(
        name: &str,
        device_type: vk::PhysicalDeviceType,
        families: Vec<vk::QueueFamilyProperties>,
    ) -> AdapterInfo {
        AdapterInfo {
            name: name.to_string(),
            device_type,
            queue_families: families,
            extensions: vec!["VK_KHR_swapchain".to_string()],
        }
    }

    #[test]
    fn test_single_discrete_gpu_with_combined_family() {
        let adapters = vec![adapter(
            "dGPU",
            vk::PhysicalDeviceType::DISCRETE_GPU,
            vec![combined()],
        )];

        let selection =
            select_adapter(&adapters, &QueueShapeScorer).expect("device should be selected");
        assert_eq!(selection.adapter_index, 0);
        assert!(!selection.queues.supports_async_compute());
        assert!(!selection.queues.supports_async_transfer());
        assert_eq!(selection.queues.unique_families(), vec![0]);
        assert!(device_extensions(&adapters[0], false).is_ok());
    }

    #[test]
    fn test_discrete_beats_integrated() {
        let adapters = vec![
            adapter("iGPU", vk::PhysicalDeviceType::INTEGRATED_GPU, vec![combined()]),
            adapter("dGPU", vk::PhysicalDeviceType::DISCRETE_GPU, vec![combined()]),
        ];

        let selection = select_adapter(&adapters, &QueueShapeScorer).unwrap();
        assert_eq!(selection.adapter_index, 1);

        let integrated = QueueFamilyAssignment::from_families(&adapters[0].queue_families).unwrap();
        assert!(selection.score > QueueShapeScorer.score(&adapters[0], &integrated));
    }

    #[test]
    fn test_ties_keep_first_adapter() {
        let adapters = vec![
            adapter("first", vk::PhysicalDeviceType::DISCRETE_GPU, vec![combined()]),
            adapter("second", vk::PhysicalDeviceType::DISCRETE_GPU, vec![combined()]),
        ];

        assert_eq!(select_adapter(&adapters, &QueueShapeScorer).unwrap().adapter_index, 0);
    }

    #[test]
    fn test_async_families_are_detected() {
        let families = vec![
            combined(),
            family(vk::QueueFlags::COMPUTE | vk::QueueFlags::TRANSFER, 4),
            family(vk::QueueFlags::TRANSFER, 2),
        ];

        let queues = QueueFamilyAssignment::from_families(&families).unwrap();
        assert_eq!(queues.families, PerQueue { graphics: 0, compute: 1, transfer: 2 });
        assert!(queues.supports_async_compute());
        assert!(queues.supports_async_transfer());
        assert_eq!(queues.unique_families(), vec![0, 1, 2]);

        let adapter = adapter("dGPU", vk::PhysicalDeviceType::DISCRETE_GPU, families);
        assert_eq!(QueueShapeScorer.score(&adapter, &queues), 20 + 2 + 1 + 1);
    }

    #[test]
    fn test_async_extras_outweigh_nothing_but_type() {
        let plain = adapter("plain", vk::PhysicalDeviceType::INTEGRATED_GPU, vec![combined()]);
        let rich = adapter(
            "rich",
            vk::PhysicalDeviceType::INTEGRATED_GPU,
            vec![combined(), family(vk::QueueFlags::COMPUTE, 1)],
        );

        let selection = select_adapter(&[plain, rich], &QueueShapeScorer).unwrap();
        assert_eq!(selection.adapter_index, 1);
        assert_eq!(selection.score, 13);
    }

    #[test]
    fn test_empty_families_are_ignored() {
        let families = vec![family(vk::QueueFlags::COMPUTE, 0), combined()];
        let queues = QueueFamilyAssignment::from_families(&families).unwrap();
        assert_eq!(queues.families.graphics, 1);
        assert!(!queues.supports_async_compute());
    }

    #[test]
    fn test_no_graphics_family_is_unsuitable() {
        let adapters = vec![adapter(
            "compute only",
            vk::PhysicalDeviceType::DISCRETE_GPU,
            vec![family(vk::QueueFlags::COMPUTE, 1)],
        )];

        assert_eq!(select_adapter(&adapters, &QueueShapeScorer), Err(RhiError::NoSuitableDevice));
        assert_eq!(select_adapter(&[], &QueueShapeScorer), Err(RhiError::NoSuitableDevice));
    }

    #[test]
    fn test_swapchain_extension_is_required() {
        let mut gpu = adapter("dGPU", vk::PhysicalDeviceType::DISCRETE_GPU, vec![combined()]);
        gpu.extensions.clear();

        assert_eq!(
            device_extensions(&gpu, false),
            Err(RhiError::MissingExtension("VK_KHR_swapchain".to_string()))
        );
    }

    #[test]
    fn test_optional_extensions_enabled_when_present() {
        let mut gpu = adapter("dGPU", vk::PhysicalDeviceType::DISCRETE_GPU, vec![combined()]);
        gpu.extensions.push("VK_EXT_memory_budget".to_string());
        gpu.extensions.push("VK_EXT_debug_marker".to_string());

        let release = device_extensions(&gpu, false).unwrap();
        assert_eq!(release, vec![SwapchainLoader::name(), MEMORY_BUDGET_EXTENSION_NAME]);

        let debug = device_extensions(&gpu, true).unwrap();
        assert!(debug.contains(&DEBUG_MARKER_EXTENSION_NAME));
    }

    #[test]
    fn test_custom_scorer_is_used() {
        struct PreferCpu;
        impl DeviceScorer for PreferCpu {
            fn score(&self, adapter: &AdapterInfo, _queues: &QueueFamilyAssignment) -> u32 {
                u32::from(adapter.device_type == vk::PhysicalDeviceType::CPU)
            }
        }

        let adapters = vec![
            adapter("dGPU", vk::PhysicalDeviceType::DISCRETE_GPU, vec![combined()]),
            adapter("llvmpipe", vk::PhysicalDeviceType::CPU, vec![combined()]),
        ];
        assert_eq!(select_adapter(&adapters, &PreferCpu).unwrap().adapter_index, 1);
    }

    #[test]
    fn test_per_queue_lookup() {
        let mut values = PerQueue::from_fn(|role| role);
        for role in QueueRole::ALL {
            assert_eq!(*values.get(role), role);
        }
        *values.get_mut(QueueRole::Transfer) = QueueRole::Graphics;
        assert_eq!(values.transfer, QueueRole::Graphics);
    }

    #[test]
    fn test_c_chars_to_string_stops_at_nul() {
        let mut raw = [0 as c_char; 8];
        for (slot, byte) in raw.iter_mut().zip(b"GPU") {
            *slot = *byte as c_char;
        }
        assert_eq!(c_chars_to_string(&raw), "GPU");
    }
}
