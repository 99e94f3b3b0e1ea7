//! wgpu compute dispatcher.
//!
//! All four kernels are compiled once at construction into a shared
//! bind group layout; per-call state is limited to the three buffers
//! (input, output, dims uniform) and one command encoder. Failures are
//! caught with wgpu error scopes and mapped onto [`AnalysisError`]
//! instead of surfacing as device panics.

use std::sync::mpsc;

use bytemuck::{Pod, Zeroable};
use platelens_core::ImageBuffer;
use tracing::{debug, trace};
use wgpu::util::DeviceExt;

use crate::kernel::AnalysisKernel;
use crate::{AnalysisError, AnalysisResult};

use super::{validate_input, workgroup_grid, AnalysisBackend};

/// Image dimensions uniform, padded to 16 bytes for WGSL `vec4<u32>`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct Dims {
    width: u32,
    height: u32,
    _pad: [u32; 2],
}

/// GPU backend running the WGSL kernels from [`crate::shaders`].
///
/// Construction requests an adapter and compiles every kernel up
/// front; if either step fails the dispatcher does not exist and the
/// accelerated path stays permanently unavailable for this process.
/// A constructed dispatcher is immutable and shareable across threads.
pub struct GpuDispatcher {
    device: wgpu::Device,
    queue: wgpu::Queue,
    bind_group_layout: wgpu::BindGroupLayout,
    pipelines: Vec<wgpu::ComputePipeline>,
}

impl GpuDispatcher {
    /// Request an adapter and compile all analysis kernels.
    pub fn new() -> AnalysisResult<Self> {
        let instance = wgpu::Instance::default();
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            compatible_surface: None,
        }))
        .ok_or_else(|| {
            AnalysisError::AcceleratorUnavailable("no compatible adapter found".into())
        })?;

        debug!(adapter = %adapter.get_info().name, "gpu adapter selected");

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("platelens-analysis-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                memory_hints: wgpu::MemoryHints::default(),
            },
            None,
        ))
        .map_err(|e| AnalysisError::AcceleratorUnavailable(e.to_string()))?;

        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("platelens-analysis-layout"),
                entries: &[
                    storage_entry(0, true),
                    storage_entry(1, false),
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
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
            label: Some("platelens-analysis-pipeline-layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let mut pipelines = Vec::with_capacity(AnalysisKernel::ALL.len());
        for kernel in AnalysisKernel::ALL {
            device.push_error_scope(wgpu::ErrorFilter::Validation);

            let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(kernel.name()),
                source: wgpu::ShaderSource::Wgsl(kernel.shader_source().into()),
            });
            let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(kernel.name()),
                layout: Some(&pipeline_layout),
                module: &module,
                entry_point: Some(kernel.entry_point()),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                cache: None,
            });

            if let Some(err) = pollster::block_on(device.pop_error_scope()) {
                return Err(AnalysisError::KernelCompilationFailed {
                    kernel: kernel.name(),
                    reason: err.to_string(),
                });
            }
            trace!(kernel = %kernel, "compiled compute pipeline");
            pipelines.push(pipeline);
        }

        debug!(kernels = pipelines.len(), "gpu dispatcher ready");
        Ok(Self {
            device,
            queue,
            bind_group_layout,
            pipelines,
        })
    }

    /// `true` if a compatible adapter exists on this machine.
    ///
    /// Cheaper than full construction; used by tests and callers that
    /// want to pick a backend without paying for kernel compilation.
    pub fn is_available() -> bool {
        let instance = wgpu::Instance::default();
        pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            compatible_surface: None,
        }))
        .is_some()
    }

    fn run(&self, kernel: AnalysisKernel, input: &ImageBuffer) -> AnalysisResult<ImageBuffer> {
        let (width, height) = input.dimensions();
        let size_bytes = input.size_bytes() as wgpu::BufferAddress;

        // Buffer allocation under an out-of-memory scope.
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);

        let input_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("platelens-input"),
                contents: bytemuck::cast_slice(input.data()),
                usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            });
        let output_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("platelens-output"),
            size: size_bytes,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let readback_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("platelens-readback"),
            size: size_bytes,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let dims = Dims {
            width,
            height,
            _pad: [0; 2],
        };
        let dims_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("platelens-dims"),
                contents: bytemuck::bytes_of(&dims),
                usage: wgpu::BufferUsages::UNIFORM,
            });

        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(AnalysisError::BufferAllocationFailed(err.to_string()));
        }

        // Encoding and submission under a validation scope.
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("platelens-bind-group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: input_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: output_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: dims_buffer.as_entire_binding(),
                },
            ],
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("platelens-encoder"),
            });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some(kernel.name()),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipelines[kernel.index()]);
            pass.set_bind_group(0, &bind_group, &[]);
            let (gx, gy) = workgroup_grid(width, height);
            pass.dispatch_workgroups(gx, gy, 1);
        }
        encoder.copy_buffer_to_buffer(&output_buffer, 0, &readback_buffer, 0, size_bytes);
        self.queue.submit(std::iter::once(encoder.finish()));

        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(AnalysisError::DispatchEncodingFailed(err.to_string()));
        }

        let data = self.read_back(&readback_buffer)?;
        ImageBuffer::from_rgba(data, width, height)
            .map_err(|e| AnalysisError::ComputationFailed(e.to_string()))
    }

    fn read_back(&self, buffer: &wgpu::Buffer) -> AnalysisResult<Vec<f32>> {
        let slice = buffer.slice(..);
        let (sender, receiver) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        let _ = self.device.poll(wgpu::Maintain::Wait);

        match receiver.recv() {
            Ok(Ok(())) => {}
            Ok(Err(err)) => return Err(AnalysisError::ComputationFailed(err.to_string())),
            Err(err) => return Err(AnalysisError::ComputationFailed(err.to_string())),
        }

        let mapped = slice.get_mapped_range();
        let data = bytemuck::cast_slice(&mapped).to_vec();
        drop(mapped);
        buffer.unmap();
        Ok(data)
    }
}

impl AnalysisBackend for GpuDispatcher {
    fn dispatch(&self, kernel: AnalysisKernel, input: &ImageBuffer) -> AnalysisResult<ImageBuffer> {
        validate_input(input)?;
        let (width, height) = input.dimensions();
        debug!(kernel = %kernel, width, height, "gpu dispatch");
        self.run(kernel, input)
    }

    fn name(&self) -> &'static str {
        "gpu"
    }
}

impl std::fmt::Debug for GpuDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuDispatcher")
            .field("kernels", &self.pipelines.len())
            .finish()
    }
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
