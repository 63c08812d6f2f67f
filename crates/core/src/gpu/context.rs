//! GPU device initialization
//!
//! Distinguishes "no GPU found" (expected on headless machines) from "GPU
//! found but failed to initialize" (worth a warning, usually a driver issue).

use tracing::{debug, info};

/// Result of a GPU initialization attempt
#[derive(Debug)]
pub enum GpuInitResult {
    /// GPU initialized successfully
    Success(GpuContext),
    /// No compatible adapter (silent fallback to CPU)
    NoGpuFound,
    /// Adapter found but device creation failed (warn, fallback to CPU)
    InitFailed {
        /// Name of the adapter that failed
        adapter_name: String,
        /// Error message
        error: String,
    },
}

/// wgpu device and queue plus adapter information
#[derive(Debug)]
pub struct GpuContext {
    device: wgpu::Device,
    queue: wgpu::Queue,
    adapter_info: wgpu::AdapterInfo,
}

impl GpuContext {
    /// Try to create a compute-capable device
    ///
    /// # Returns
    ///
    /// - `GpuInitResult::Success` - GPU ready to use
    /// - `GpuInitResult::NoGpuFound` - No compatible adapter
    /// - `GpuInitResult::InitFailed` - Adapter found but device creation failed
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> GpuInitResult {
        info!("Attempting to initialize GPU context");

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = if let Some(a) =
            pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })) {
            debug!("Found GPU adapter: {}", a.get_info().name);
            a
        } else {
            debug!("No GPU adapter found");
            return GpuInitResult::NoGpuFound;
        };

        let adapter_info = adapter.get_info();
        let adapter_name = adapter_info.name.clone();

        match pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("SmokeSim GPU"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::Performance,
            },
            None,
        )) {
            Ok((device, queue)) => {
                info!("GPU context initialized successfully: {}", adapter_name);
                GpuInitResult::Success(Self {
                    device,
                    queue,
                    adapter_info,
                })
            }
            Err(e) => {
                debug!("Failed to create GPU device: {}", e);
                GpuInitResult::InitFailed {
                    adapter_name,
                    error: e.to_string(),
                }
            }
        }
    }

    /// Adapter name for logging
    #[must_use]
    pub fn adapter_name(&self) -> &str {
        &self.adapter_info.name
    }

    /// Check a voxel buffer of `cells` 4-byte elements fits one storage binding
    #[must_use]
    pub fn can_allocate(&self, cells: usize) -> bool {
        let bytes = (cells as u64).saturating_mul(4);
        let limits = self.device.limits();
        bytes > 0
            && bytes <= u64::from(limits.max_storage_buffer_binding_size)
            && bytes <= limits.max_buffer_size
    }

    #[must_use]
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    #[must_use]
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }
}
