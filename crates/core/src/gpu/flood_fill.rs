//! wgpu compute backend for the smoke density field
//!
//! Keeps both density buffers and the occupancy grid in GPU storage
//! buffers. One `iterate` call records every reseed/propagate pass into a
//! single command encoder; passes in one encoder execute in order, which
//! gives the same phase separation as the CPU backend. The occupancy grid is
//! written to the device once per `iterate` call, not once per iteration.
//!
//! # Shader
//!
//! `shaders/flood_fill.wgsl` has two entry points sharing one bind group
//! layout:
//! - `reseed` - single invocation, raises the seed voxel of the source buffer
//! - `propagate` - one invocation per voxel, source to destination

use super::GpuContext;
use crate::error::{SimError, SimResult};
use crate::flood_fill::{DensityBackend, PropagateParams};
use crate::voxel::OccupancyGrid;
use bytemuck::{Pod, Zeroable};
use std::borrow::Cow;
use tracing::{debug, warn};

/// Voxels per workgroup axis (must match `@workgroup_size` in the shader)
const WORKGROUP_SIZE: u32 = 4;

/// Uniform block (must match WGSL `FillParams` layout)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct FillParams {
    grid_x: u32,
    grid_y: u32,
    grid_z: u32,
    seed_index: u32,
    seed_x: i32,
    seed_y: i32,
    seed_z: i32,
    seed_value: i32,
    radius_xz: f32,
    radius_y: f32,
    _pad0: f32,
    _pad1: f32,
}

/// Buffers sized for one grid, created by `allocate`
struct GridBuffers {
    cells: usize,
    density: [wgpu::Buffer; 2],
    occupancy: wgpu::Buffer,
    staging: wgpu::Buffer,
    /// `bind_groups[k]` reads `density[k]` and writes `density[1 - k]`
    bind_groups: [wgpu::BindGroup; 2],
}

/// GPU density backend
pub struct GpuDensityBackend {
    context: GpuContext,
    reseed_pipeline: wgpu::ComputePipeline,
    propagate_pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    params_buffer: wgpu::Buffer,
    buffers: Option<GridBuffers>,
    current: usize,
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

impl GpuDensityBackend {
    /// Build pipelines on `context`; buffers are created by `allocate`
    #[must_use]
    pub fn new(context: GpuContext) -> Self {
        let device = context.device();

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Flood Fill Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/flood_fill.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Flood Fill Bind Group Layout"),
            entries: &[
                // source density (reseed writes it)
                storage_entry(0, false),
                // occupancy
                storage_entry(1, true),
                // destination density
                storage_entry(2, false),
                // params
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Flood Fill Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let make_pipeline = |label: &str, entry_point: &str| {
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                module: &shader,
                entry_point: Some(entry_point),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                cache: None,
            })
        };
        let reseed_pipeline = make_pipeline("Flood Fill Reseed Pipeline", "reseed");
        let propagate_pipeline = make_pipeline("Flood Fill Propagate Pipeline", "propagate");

        let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Flood Fill Params"),
            size: std::mem::size_of::<FillParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            context,
            reseed_pipeline,
            propagate_pipeline,
            bind_group_layout,
            params_buffer,
            buffers: None,
            current: 0,
        }
    }

    fn create_buffers(&self, cells: usize) -> GridBuffers {
        let device = self.context.device();
        let size = (cells * std::mem::size_of::<i32>()) as u64;

        let density_buffer = |label: &str| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size,
                usage: wgpu::BufferUsages::STORAGE
                    | wgpu::BufferUsages::COPY_SRC
                    | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };
        let density = [density_buffer("Density A"), density_buffer("Density B")];

        let occupancy = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Occupancy"),
            size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Density Readback"),
            size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = |source: &wgpu::Buffer, destination: &wgpu::Buffer| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Flood Fill Bind Group"),
                layout: &self.bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: source.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: occupancy.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: destination.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: self.params_buffer.as_entire_binding(),
                    },
                ],
            })
        };
        let bind_groups = [
            bind_group(&density[0], &density[1]),
            bind_group(&density[1], &density[0]),
        ];

        GridBuffers {
            cells,
            density,
            occupancy,
            staging,
            bind_groups,
        }
    }
}

impl DensityBackend for GpuDensityBackend {
    fn allocate(&mut self, cells: usize) -> SimResult<()> {
        self.current = 0;
        // wgpu rejects zero-sized bindings
        if cells == 0 {
            self.buffers = None;
            return Ok(());
        }
        if !self.context.can_allocate(cells) {
            return Err(SimError::AllocationFailed { cells });
        }
        let buffers = self.create_buffers(cells);
        self.buffers = Some(buffers);
        // wgpu zero-initializes new buffers
        self.current = 0;
        debug!("GPU density buffers allocated: {} voxels", cells);
        Ok(())
    }

    fn clear(&mut self) {
        self.current = 0;
        let Some(buffers) = &self.buffers else {
            return;
        };
        let mut encoder =
            self.context
                .device()
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Density Clear Encoder"),
                });
        for buffer in &buffers.density {
            encoder.clear_buffer(buffer, 0, None);
        }
        self.context.queue().submit(Some(encoder.finish()));
    }

    fn iterate(
        &mut self,
        occupancy: &OccupancyGrid,
        params: &PropagateParams,
        iterations: usize,
    ) -> SimResult<()> {
        let cells = self.cell_count();
        if occupancy.len() != cells {
            return Err(SimError::GridMismatch {
                expected: cells,
                actual: occupancy.len(),
            });
        }
        let Some(buffers) = self.buffers.as_ref() else {
            // Empty grid: only the slot swaps remain
            self.current ^= iterations & 1;
            return Ok(());
        };

        let queue = self.context.queue();

        // Any grid with a matching cell count is accepted, so upload it every call
        queue.write_buffer(&buffers.occupancy, 0, bytemuck::cast_slice(occupancy.cells()));

        let grid = occupancy.grid();
        let uniform = FillParams {
            grid_x: grid.nx as u32,
            grid_y: grid.ny as u32,
            grid_z: grid.nz as u32,
            seed_index: grid.flat_index(params.seed) as u32,
            seed_x: params.seed.x as i32,
            seed_y: params.seed.y as i32,
            seed_z: params.seed.z as i32,
            seed_value: params.seed_value,
            radius_xz: params.radius_xz,
            radius_y: params.radius_y,
            _pad0: 0.0,
            _pad1: 0.0,
        };
        queue.write_buffer(&self.params_buffer, 0, bytemuck::bytes_of(&uniform));

        let groups = (
            (grid.nx as u32).div_ceil(WORKGROUP_SIZE),
            (grid.ny as u32).div_ceil(WORKGROUP_SIZE),
            (grid.nz as u32).div_ceil(WORKGROUP_SIZE),
        );

        let mut encoder =
            self.context
                .device()
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Flood Fill Encoder"),
                });

        let mut current = self.current;
        for _ in 0..iterations {
            let bind_group = &buffers.bind_groups[current];
            {
                let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                    label: Some("Flood Fill Reseed Pass"),
                    timestamp_writes: None,
                });
                pass.set_pipeline(&self.reseed_pipeline);
                pass.set_bind_group(0, bind_group, &[]);
                pass.dispatch_workgroups(1, 1, 1);
            }
            {
                let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                    label: Some("Flood Fill Propagate Pass"),
                    timestamp_writes: None,
                });
                pass.set_pipeline(&self.propagate_pipeline);
                pass.set_bind_group(0, bind_group, &[]);
                pass.dispatch_workgroups(groups.0, groups.1, groups.2);
            }
            current ^= 1;
        }

        queue.submit(Some(encoder.finish()));
        self.current = current;
        Ok(())
    }

    fn read_density(&self) -> Cow<'_, [i32]> {
        let Some(buffers) = &self.buffers else {
            return Cow::Owned(Vec::new());
        };
        let size = (buffers.cells * std::mem::size_of::<i32>()) as u64;

        let mut encoder =
            self.context
                .device()
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Density Readback Encoder"),
                });
        encoder.copy_buffer_to_buffer(&buffers.density[self.current], 0, &buffers.staging, 0, size);
        self.context.queue().submit(Some(encoder.finish()));

        let slice = buffers.staging.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            sender.send(result).ok();
        });
        let _ = self.context.device().poll(wgpu::Maintain::Wait);

        match receiver.recv() {
            Ok(Ok(())) => {
                let data = slice.get_mapped_range();
                let result: Vec<i32> = bytemuck::cast_slice(&data).to_vec();
                drop(data);
                buffers.staging.unmap();
                Cow::Owned(result)
            }
            Ok(Err(e)) => {
                warn!("Density readback failed: {}", e);
                Cow::Owned(vec![0; buffers.cells])
            }
            Err(_) => {
                warn!("Density readback callback dropped");
                Cow::Owned(vec![0; buffers.cells])
            }
        }
    }

    fn cell_count(&self) -> usize {
        self.buffers.as_ref().map_or(0, |b| b.cells)
    }

    fn current_slot(&self) -> usize {
        self.current
    }

    fn is_gpu_accelerated(&self) -> bool {
        true
    }
}
