//! wgpu-backed [`ComputeDevice`].
//!
//! # Kernel binding contract
//!
//! The caller supplies WGSL source with a `@compute @workgroup_size(512)`
//! entry point named `main` and these bindings in group 0:
//!
//! | Binding | Type                                   | Contents             |
//! |---------|----------------------------------------|----------------------|
//! | 0       | `var<storage, read>` array of agents   | `AgentRecord` × N    |
//! | 1       | `var<uniform>` `KernelParams`          | see [`KernelParams`] |
//! | 2       | `var<storage, read_write>` headings    | `array<f32, 3>` × N  |
//!
//! Agents and headings are tightly packed (strides 24 and 12).  WGSL
//! `vec3<f32>` has 16-byte alignment inside arrays, so the kernel must declare
//! its element fields as `array<f32, 3>` rather than `vec3<f32>`:
//!
//! ```wgsl
//! struct Agent { position: array<f32, 3>, heading: array<f32, 3> }
//! ```
//!
//! [`IDENTITY_KERNEL_WGSL`] is a complete pass-through kernel written to this
//! contract.

use std::sync::mpsc;

use fl_agent::AgentView;
use glam::Vec3;
use tracing::info;
use wgpu::util::DeviceExt;

use crate::{ComputeDevice, DeviceError, KernelParams};

/// Pass-through kernel: writes each agent's current heading back out.
pub const IDENTITY_KERNEL_WGSL: &str = r#"
struct Agent {
    position: array<f32, 3>,
    heading:  array<f32, 3>,
}

struct KernelParams {
    flock_origin:                vec3<f32>,
    agent_count:                 u32,
    alignment_coefficient:       f32,
    cohesion_coefficient:        f32,
    separation_coefficient:      f32,
    max_view_distance_squared:   f32,
    max_wander_distance_squared: f32,
}

@group(0) @binding(0) var<storage, read>       agents:   array<Agent>;
@group(0) @binding(1) var<uniform>             params:   KernelParams;
@group(0) @binding(2) var<storage, read_write> headings: array<array<f32, 3>>;

@compute @workgroup_size(512)
fn main(@builtin(global_invocation_id) id: vec3<u32>) {
    let i = id.x;
    if (i >= params.agent_count) {
        return;
    }
    headings[i] = agents[i].heading;
}
"#;

const HEADING_STRIDE: u64 = std::mem::size_of::<Vec3>() as u64;

/// A device buffer plus the element count it was sized for.
pub struct WgpuBuffer {
    buffer: wgpu::Buffer,
    len:    usize,
}

/// [`ComputeDevice`] running the heading kernel through wgpu.
pub struct WgpuDevice {
    device:            wgpu::Device,
    queue:             wgpu::Queue,
    pipeline:          wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    adapter_name:      String,
}

impl WgpuDevice {
    /// Pick a high-performance adapter, open a device, and build the compute
    /// pipeline from `kernel_wgsl`.
    ///
    /// Shader validation errors are reported as
    /// [`DeviceError::KernelUnavailable`].
    pub fn new(kernel_wgsl: &str) -> Result<Self, DeviceError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference:       wgpu::PowerPreference::HighPerformance,
            compatible_surface:     None,
            force_fallback_adapter: false,
        }))
        .ok_or(DeviceError::NoAdapter)?;

        let info = adapter.get_info();
        info!(adapter = %info.name, device_type = ?info.device_type, backend = ?info.backend, "compute adapter selected");

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label:             Some("Flock Compute Device"),
                required_features: wgpu::Features::empty(),
                required_limits:   wgpu::Limits::default(),
                memory_hints:      wgpu::MemoryHints::Performance,
            },
            None,
        ))
        .map_err(|e| DeviceError::DeviceCreation(e.to_string()))?;

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label:   Some("Flock Kernel Layout"),
            entries: &[
                storage_entry(0, true),
                wgpu::BindGroupLayoutEntry {
                    binding:    1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty:         wgpu::BindingType::Buffer {
                        ty:                 wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size:   None,
                    },
                    count:      None,
                },
                storage_entry(2, false),
            ],
        });

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label:  Some("Flock Heading Kernel"),
            source: wgpu::ShaderSource::Wgsl(kernel_wgsl.into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label:                Some("Flock Kernel Pipeline Layout"),
            bind_group_layouts:   &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label:               Some("Flock Heading Pipeline"),
            layout:              Some(&pipeline_layout),
            module:              &module,
            entry_point:         Some("main"),
            compilation_options: Default::default(),
            cache:               None,
        });
        if let Some(e) = pollster::block_on(device.pop_error_scope()) {
            return Err(DeviceError::KernelUnavailable(e.to_string()));
        }

        info!(adapter = %info.name, "heading kernel pipeline created");

        Ok(Self {
            device,
            queue,
            pipeline,
            bind_group_layout,
            adapter_name: info.name,
        })
    }

    pub fn adapter_name(&self) -> &str {
        &self.adapter_name
    }

    /// Create a buffer inside an out-of-memory error scope so exhaustion is
    /// reported instead of surfacing later as a device-lost panic.
    fn guarded_alloc(
        &self,
        bytes: u64,
        alloc: impl FnOnce(&wgpu::Device) -> wgpu::Buffer,
    ) -> Result<wgpu::Buffer, DeviceError> {
        let limits = self.device.limits();
        let max = limits.max_buffer_size.min(u64::from(limits.max_storage_buffer_binding_size));
        if bytes > max {
            return Err(DeviceError::BufferAllocation {
                bytes,
                reason: format!("exceeds device limit of {max} bytes"),
            });
        }

        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let buffer = alloc(&self.device);
        match pollster::block_on(self.device.pop_error_scope()) {
            None => Ok(buffer),
            Some(e) => Err(DeviceError::BufferAllocation { bytes, reason: e.to_string() }),
        }
    }
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty:                 wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size:   None,
        },
        count: None,
    }
}

impl ComputeDevice for WgpuDevice {
    type Buffer = WgpuBuffer;

    fn create_input_buffer(&mut self, agents: AgentView<'_>) -> Result<WgpuBuffer, DeviceError> {
        let contents = agents.as_bytes();
        let buffer = self.guarded_alloc(contents.len() as u64, |device| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Flock Agent Input"),
                contents,
                usage: wgpu::BufferUsages::STORAGE,
            })
        })?;
        Ok(WgpuBuffer { buffer, len: agents.len() })
    }

    fn create_output_buffer(&mut self, len: usize) -> Result<WgpuBuffer, DeviceError> {
        let size = len as u64 * HEADING_STRIDE;
        let buffer = self.guarded_alloc(size, |device| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label:              Some("Flock Heading Output"),
                size,
                usage:              wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
                mapped_at_creation: false,
            })
        })?;
        Ok(WgpuBuffer { buffer, len })
    }

    fn dispatch(
        &mut self,
        input:         &WgpuBuffer,
        output:        &mut WgpuBuffer,
        params:        &KernelParams,
        thread_groups: u32,
    ) -> Result<(), DeviceError> {
        if params.agent_count() > input.len || params.agent_count() > output.len {
            return Err(DeviceError::Submission(format!(
                "agent_count {} exceeds bound buffers ({} agents, {} headings)",
                params.agent_count(),
                input.len,
                output.len
            )));
        }

        // The uniform block is transient like the other buffers; wgpu keeps
        // it alive until the submission completes.
        let params_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label:    Some("Flock Kernel Params"),
            contents: bytemuck::bytes_of(params),
            usage:    wgpu::BufferUsages::UNIFORM,
        });

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label:   Some("Flock Kernel Bind Group"),
            layout:  &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: input.buffer.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: params_buffer.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 2, resource: output.buffer.as_entire_binding() },
            ],
        });

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Flock Dispatch Encoder"),
        });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label:            Some("Flock Heading Pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(thread_groups, 1, 1);
        }
        self.queue.submit(Some(encoder.finish()));

        match pollster::block_on(self.device.pop_error_scope()) {
            None => Ok(()),
            Some(e) => Err(DeviceError::Submission(e.to_string())),
        }
    }

    fn read_headings(&mut self, output: &WgpuBuffer, len: usize) -> Result<Vec<Vec3>, DeviceError> {
        let len = len.min(output.len);
        let size = len as u64 * HEADING_STRIDE;
        if size == 0 {
            return Ok(Vec::new());
        }

        let staging = self.guarded_alloc(size, |device| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label:              Some("Flock Heading Staging"),
                size,
                usage:              wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        })?;

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Flock Readback Encoder"),
        });
        encoder.copy_buffer_to_buffer(&output.buffer, 0, &staging, 0, size);
        self.queue.submit(Some(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        let _ = self.device.poll(wgpu::Maintain::Wait);

        rx.recv()
            .map_err(|e| DeviceError::Readback(format!("map callback dropped: {e}")))?
            .map_err(|e| DeviceError::Readback(format!("failed to map staging buffer: {e}")))?;

        let headings = {
            let data = slice.get_mapped_range();
            bytemuck::cast_slice::<u8, Vec3>(&data).to_vec()
        };
        staging.unmap();
        Ok(headings)
    }

    fn release(&mut self, buffer: WgpuBuffer) {
        // Submitted work that still references the buffer stays valid.
        buffer.buffer.destroy();
    }

    fn name(&self) -> &'static str {
        "wgpu"
    }
}
