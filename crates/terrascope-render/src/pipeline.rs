//! The terrain blend pipeline and its shape-keyed cache.

use std::collections::HashMap;
use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};
use terrascope_material::{ShaderShape, TerrainBlendUniforms, compose_terrain_shader};

use crate::mesh::terrain_vertex_layout;

/// Camera uniform at `@group(0) @binding(0)`: view-projection matrix
/// plus world position (for distance-based tiling).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub position: [f32; 4],
}

const _: () = assert!(std::mem::size_of::<CameraUniform>() == 80);

/// A compiled terrain pipeline for one parameter shape.
pub struct TerrainPipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub camera_layout: wgpu::BindGroupLayout,
    pub mask_layout: wgpu::BindGroupLayout,
    pub blend_layout: wgpu::BindGroupLayout,
}

impl TerrainPipeline {
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    fn compile(
        device: &wgpu::Device,
        shape: &ShaderShape,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let source = compose_terrain_shader(shape);
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("terrain-blend-shader"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("terrain-camera-layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(
                        std::mem::size_of::<CameraUniform>() as u64
                    ),
                },
                count: None,
            }],
        });

        let mask_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("terrain-mask-layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering),
                    count: None,
                },
            ],
        });

        let blend_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("terrain-blend-layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2Array,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: NonZeroU64::new(
                            std::mem::size_of::<TerrainBlendUniforms>() as u64,
                        ),
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("terrain-pipeline-layout"),
            bind_group_layouts: &[&camera_layout, &mask_layout, &blend_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("terrain-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[terrain_vertex_layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: Self::DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        Self {
            pipeline,
            camera_layout,
            mask_layout,
            blend_layout,
        }
    }
}

/// Pipelines keyed by parameter shape.
///
/// Value-only parameter edits never reach this cache: they go through
/// `write_buffer` on the uniform. Only toggling a feature, switching the
/// tiling debug view, or bumping the shader version compiles anything.
#[derive(Default)]
pub struct TerrainPipelineCache {
    pipelines: HashMap<ShaderShape, TerrainPipeline>,
}

impl TerrainPipelineCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the pipeline for a shape, compiling it on first use.
    pub fn ensure(
        &mut self,
        device: &wgpu::Device,
        shape: &ShaderShape,
        surface_format: wgpu::TextureFormat,
    ) -> &TerrainPipeline {
        self.pipelines.entry(*shape).or_insert_with(|| {
            log::info!("compiling terrain pipeline for shape {shape:?}");
            TerrainPipeline::compile(device, shape, surface_format)
        })
    }

    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrascope_material::BlendParameters;

    fn create_test_device() -> Option<(wgpu::Device, wgpu::Queue)> {
        pollster::block_on(async {
            let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
                backends: wgpu::Backends::all(),
                ..Default::default()
            });
            let adapter = instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::default(),
                    force_fallback_adapter: false,
                    compatible_surface: None,
                })
                .await
                .ok()?;
            adapter
                .request_device(&wgpu::DeviceDescriptor::default())
                .await
                .ok()
        })
    }

    #[test]
    fn test_pipeline_compiles_for_default_shape() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let mut cache = TerrainPipelineCache::new();
        let shape = BlendParameters::default().shape_key();
        cache.ensure(&device, &shape, wgpu::TextureFormat::Bgra8UnormSrgb);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_compiles_once_per_shape() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let mut cache = TerrainPipelineCache::new();
        let shape = BlendParameters::default().shape_key();
        cache.ensure(&device, &shape, wgpu::TextureFormat::Bgra8UnormSrgb);
        cache.ensure(&device, &shape, wgpu::TextureFormat::Bgra8UnormSrgb);
        assert_eq!(cache.len(), 1, "Same shape must not recompile");

        let mut toggled = BlendParameters::default();
        toggled.anti_tiling.enabled = false;
        cache.ensure(&device, &toggled.shape_key(), wgpu::TextureFormat::Bgra8UnormSrgb);
        assert_eq!(cache.len(), 2, "New shape compiles a second pipeline");
    }

    #[test]
    fn test_all_shapes_compose_valid_wgsl() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        // Shader module creation runs naga validation, so this covers
        // every fragment combination the shape space can produce.
        use terrascope_material::TilingDebugView;
        let mut cache = TerrainPipelineCache::new();
        for tiling in [false, true] {
            for anti in [false, true] {
                for mac in [false, true] {
                    for view in [
                        TilingDebugView::Blended,
                        TilingDebugView::NearOnly,
                        TilingDebugView::FarOnly,
                    ] {
                        let mut p = BlendParameters::default();
                        p.tiling.enabled = tiling;
                        p.anti_tiling.enabled = anti;
                        p.macro_variation.enabled = mac;
                        p.tiling.debug_view = view;
                        cache.ensure(
                            &device,
                            &p.shape_key(),
                            wgpu::TextureFormat::Bgra8UnormSrgb,
                        );
                    }
                }
            }
        }
        assert!(cache.len() >= 12);
    }
}
