//! Window creation and event handling via winit.
//!
//! [`AppState`] implements winit's [`ApplicationHandler`]: it owns the
//! GPU context, the scene, and the per-frame resources, and runs one
//! scene tick plus one render pass per redraw.

use std::sync::Arc;

use glam::DVec2;
use tracing::{error, info, warn};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowAttributes, WindowId};

use terrascope_config::Config;
use terrascope_mask::{DebugMode, ProceduralMaskEngine, ProceduralMaskParams};
use terrascope_material::ShaderShape;
use terrascope_render::{
    BiomeArrayTexture, DepthBuffer, GpuContext, MaskTexture, SurfaceAcquireError,
    TerrainMeshBuffers, TerrainPipeline, TerrainPipelineCache, init_gpu_context_blocking,
};
use terrascope_scene::{TerrainScene, UiState};

use crate::bridge::ui_state_from_config;
use crate::camera::OrbitCamera;

/// Default window width in logical pixels.
pub const DEFAULT_WIDTH: f64 = 1280.0;
/// Default window height in logical pixels.
pub const DEFAULT_HEIGHT: f64 = 720.0;
/// Default window title.
pub const DEFAULT_TITLE: &str = "Terrascope";

/// Resolution of each biome albedo layer after resampling.
const BIOME_LAYER_RESOLUTION: u32 = 512;

fn default_window_attributes() -> WindowAttributes {
    WindowAttributes::default()
        .with_title(DEFAULT_TITLE)
        .with_inner_size(winit::dpi::LogicalSize::new(DEFAULT_WIDTH, DEFAULT_HEIGHT))
}

/// GPU resources that exist only while a window and device do.
struct FrameResources {
    depth: DepthBuffer,
    pipelines: TerrainPipelineCache,
    mesh: TerrainMeshBuffers,
    mask: MaskTexture,
    biomes: BiomeArrayTexture,
    mask_sampler: wgpu::Sampler,
    biome_sampler: wgpu::Sampler,
    camera_buffer: wgpu::Buffer,
    blend_buffer: wgpu::Buffer,
    shape: ShaderShape,
    camera_bind_group: wgpu::BindGroup,
    mask_bind_group: wgpu::BindGroup,
    blend_bind_group: wgpu::BindGroup,
}

impl FrameResources {
    fn new(
        gpu: &GpuContext,
        scene: &mut TerrainScene,
        ui: &UiState,
        camera: &OrbitCamera,
    ) -> Self {
        use wgpu::util::DeviceExt;

        let device = &gpu.device;
        let depth = DepthBuffer::new(device, gpu.surface_config.width, gpu.surface_config.height);

        // First tick populates the mask cache before any GPU upload.
        let eye = camera.eye();
        scene.tick(ui, DVec2::new(eye.x as f64, eye.z as f64));

        let mesh = TerrainMeshBuffers::upload(device, scene.geometry());
        let export = scene
            .current_mask()
            .expect("first scene tick always produces a mask export");
        let mask = MaskTexture::upload(device, &gpu.queue, export)
            .expect("validated mask export has a consistent shape");
        let biomes =
            BiomeArrayTexture::load(device, &gpu.queue, scene.binding_table(), BIOME_LAYER_RESOLUTION);

        let mask_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("mask-sampler"),
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });
        let biome_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("biome-sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        });

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("camera-uniform"),
            contents: bytemuck::bytes_of(&camera.to_uniform()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let blend_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("terrain-blend-uniform"),
            contents: bytemuck::bytes_of(scene.blend_uniforms()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let mut pipelines = TerrainPipelineCache::new();
        let shape = scene.shape_key();
        let pipeline = pipelines.ensure(device, &shape, gpu.surface_format);
        let (camera_bind_group, mask_bind_group, blend_bind_group) = create_bind_groups(
            device,
            pipeline,
            &camera_buffer,
            &blend_buffer,
            &mask,
            &mask_sampler,
            &biomes,
            &biome_sampler,
        );

        Self {
            depth,
            pipelines,
            mesh,
            mask,
            biomes,
            mask_sampler,
            biome_sampler,
            camera_buffer,
            blend_buffer,
            shape,
            camera_bind_group,
            mask_bind_group,
            blend_bind_group,
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn create_bind_groups(
    device: &wgpu::Device,
    pipeline: &TerrainPipeline,
    camera_buffer: &wgpu::Buffer,
    blend_buffer: &wgpu::Buffer,
    mask: &MaskTexture,
    mask_sampler: &wgpu::Sampler,
    biomes: &BiomeArrayTexture,
    biome_sampler: &wgpu::Sampler,
) -> (wgpu::BindGroup, wgpu::BindGroup, wgpu::BindGroup) {
    let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("camera-bind-group"),
        layout: &pipeline.camera_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: camera_buffer.as_entire_binding(),
        }],
    });
    let mask_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("mask-bind-group"),
        layout: &pipeline.mask_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&mask.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(mask_sampler),
            },
        ],
    });
    let blend_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("blend-bind-group"),
        layout: &pipeline.blend_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&biomes.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(biome_sampler),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: blend_buffer.as_entire_binding(),
            },
        ],
    });
    (camera_bind_group, mask_bind_group, blend_bind_group)
}

/// Application state: window, GPU context, scene, camera, input.
pub struct AppState {
    window: Option<Arc<Window>>,
    gpu: Option<GpuContext>,
    frame: Option<FrameResources>,
    scene: TerrainScene,
    ui: UiState,
    camera: OrbitCamera,
    dragging: bool,
    last_cursor: Option<(f64, f64)>,
}

impl AppState {
    /// Build the application from a loaded config.
    pub fn with_config(config: Config) -> Self {
        let ui = ui_state_from_config(&config);
        let engine = Box::new(ProceduralMaskEngine::new(ProceduralMaskParams::default()));
        let scene = TerrainScene::new(&ui, engine);

        let spec = ui.terrain_spec();
        let (min_y, max_y) = scene.height_bounds();
        let mut camera = OrbitCamera::default();
        camera.frame(
            spec.min_x() as f32,
            spec.max_x() as f32,
            spec.min_z() as f32,
            spec.max_z() as f32,
            min_y,
            max_y,
        );

        Self {
            window: None,
            gpu: None,
            frame: None,
            scene,
            ui,
            camera,
            dragging: false,
            last_cursor: None,
        }
    }

    /// The active debug visualization mode.
    pub fn debug_mode(&self) -> DebugMode {
        self.ui.debug_mode
    }

    fn set_debug_mode(&mut self, mode: DebugMode) {
        if self.ui.debug_mode != mode {
            info!("debug mode: {mode:?}");
            self.ui.debug_mode = mode;
        }
    }

    fn handle_resize(&mut self, width: u32, height: u32) {
        self.camera.set_aspect_ratio(width as f32, height as f32);
        if let Some(gpu) = &mut self.gpu {
            gpu.resize(width, height);
            if let Some(frame) = &mut self.frame {
                frame.depth.resize(&gpu.device, width.max(1), height.max(1));
            }
        }
    }

    fn render_frame(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(gpu), Some(frame)) = (&self.gpu, &mut self.frame) else {
            return;
        };

        gpu.queue.write_buffer(
            &frame.camera_buffer,
            0,
            bytemuck::bytes_of(&self.camera.to_uniform()),
        );

        let eye = self.camera.eye();
        let report = self
            .scene
            .tick(&self.ui, DVec2::new(eye.x as f64, eye.z as f64));

        if report.geometry_rebuilt {
            frame.mesh = TerrainMeshBuffers::upload(&gpu.device, self.scene.geometry());
        }

        let mut mask_recreated = false;
        if report.mask_refreshed
            && let Some(export) = self.scene.current_mask()
        {
            match frame.mask.update(&gpu.device, &gpu.queue, export) {
                Ok(recreated) => mask_recreated = recreated,
                Err(e) => warn!("mask texture update failed: {e}"),
            }
        }

        if report.uniforms_updated {
            gpu.queue.write_buffer(
                &frame.blend_buffer,
                0,
                bytemuck::bytes_of(self.scene.blend_uniforms()),
            );
        }

        let shape = self.scene.shape_key();
        let shape_changed = shape != frame.shape;
        let pipeline = frame.pipelines.ensure(&gpu.device, &shape, gpu.surface_format);
        if shape_changed || mask_recreated {
            let (camera_bg, mask_bg, blend_bg) = create_bind_groups(
                &gpu.device,
                pipeline,
                &frame.camera_buffer,
                &frame.blend_buffer,
                &frame.mask,
                &frame.mask_sampler,
                &frame.biomes,
                &frame.biome_sampler,
            );
            frame.camera_bind_group = camera_bg;
            frame.mask_bind_group = mask_bg;
            frame.blend_bind_group = blend_bg;
            frame.shape = shape;
        }

        let surface_texture = match gpu.get_current_texture() {
            Ok(texture) => texture,
            Err(SurfaceAcquireError::Timeout) => {
                warn!("surface timeout, skipping frame");
                return;
            }
            Err(SurfaceAcquireError::Lost) => {
                if let Some(gpu) = &mut self.gpu {
                    let (w, h) = (gpu.surface_config.width, gpu.surface_config.height);
                    gpu.resize(w, h);
                }
                return;
            }
            Err(SurfaceAcquireError::OutOfMemory) => {
                error!("GPU out of memory");
                event_loop.exit();
                return;
            }
        };

        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("terrain-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.25,
                            g: 0.45,
                            b: 0.75,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &frame.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(DepthBuffer::CLEAR_VALUE),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            pass.set_pipeline(&pipeline.pipeline);
            pass.set_bind_group(0, &frame.camera_bind_group, &[]);
            pass.set_bind_group(1, &frame.mask_bind_group, &[]);
            pass.set_bind_group(2, &frame.blend_bind_group, &[]);
            frame.mesh.bind(&mut pass);
            frame.mesh.draw(&mut pass);
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let window = match event_loop.create_window(default_window_attributes()) {
                Ok(window) => Arc::new(window),
                Err(e) => {
                    error!("failed to create window: {e}");
                    event_loop.exit();
                    return;
                }
            };

            let size = window.inner_size();
            self.camera
                .set_aspect_ratio(size.width as f32, size.height as f32);

            match init_gpu_context_blocking(window.clone()) {
                Ok(gpu) => {
                    self.frame = Some(FrameResources::new(
                        &gpu,
                        &mut self.scene,
                        &self.ui,
                        &self.camera,
                    ));
                    self.gpu = Some(gpu);
                }
                Err(e) => {
                    error!("GPU initialization failed: {e}");
                    event_loop.exit();
                    return;
                }
            }

            self.window = Some(window);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                self.handle_resize(new_size.width, new_size.height);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed {
                    return;
                }
                match event.physical_key {
                    PhysicalKey::Code(KeyCode::Escape) => event_loop.exit(),
                    PhysicalKey::Code(KeyCode::Digit1) => self.set_debug_mode(DebugMode::BiomeId),
                    PhysicalKey::Code(KeyCode::Digit2) => self.set_debug_mode(DebugMode::Humidity),
                    PhysicalKey::Code(KeyCode::Digit3) => {
                        self.set_debug_mode(DebugMode::TransitionBand)
                    }
                    PhysicalKey::Code(KeyCode::Digit4) => {
                        self.set_debug_mode(DebugMode::TransitionResult)
                    }
                    PhysicalKey::Code(KeyCode::Digit5) => {
                        self.set_debug_mode(DebugMode::TransitionWeight)
                    }
                    PhysicalKey::Code(KeyCode::Digit6) => {
                        self.set_debug_mode(DebugMode::TransitionFalloff)
                    }
                    PhysicalKey::Code(KeyCode::Digit7) => {
                        self.set_debug_mode(DebugMode::TransitionNoise)
                    }
                    PhysicalKey::Code(KeyCode::Digit8) => {
                        self.set_debug_mode(DebugMode::PairIsolation)
                    }
                    PhysicalKey::Code(KeyCode::Digit9) => self.set_debug_mode(DebugMode::PatchIds),
                    _ => {}
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left {
                    self.dragging = state == ElementState::Pressed;
                    if !self.dragging {
                        self.last_cursor = None;
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if self.dragging {
                    if let Some((lx, ly)) = self.last_cursor {
                        self.camera
                            .rotate((position.x - lx) as f32, (position.y - ly) as f32);
                    }
                    self.last_cursor = Some((position.x, position.y));
                } else {
                    self.last_cursor = None;
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => (p.y / 50.0) as f32,
                };
                self.camera.zoom(steps);
            }
            WindowEvent::RedrawRequested => {
                self.render_frame(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

/// Create an event loop and run the application with the given config.
///
/// Blocks until the window is closed.
pub fn run_with_config(config: Config) {
    let event_loop = EventLoop::new().expect("Failed to create event loop");
    let mut app = AppState::with_config(config);
    event_loop.run_app(&mut app).expect("Event loop failed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_starts_without_window() {
        let state = AppState::with_config(Config::default());
        assert!(state.window.is_none());
        assert!(state.gpu.is_none());
    }

    #[test]
    fn test_camera_framed_to_terrain_extent() {
        let state = AppState::with_config(Config::default());
        // Default grid is 4x4 tiles of 50 m centered on the origin.
        assert_eq!(state.camera.target.x, 0.0);
        assert_eq!(state.camera.target.z, 0.0);
        assert!(state.camera.distance > 100.0);
    }

    #[test]
    fn test_debug_mode_comes_from_config() {
        let mut config = Config::default();
        config.debug.debug_mode = "transition_noise".to_string();
        let state = AppState::with_config(config);
        assert_eq!(state.debug_mode(), DebugMode::TransitionNoise);
    }
}
