//! Mask and biome textures.

use terrascope_mask::PackedMaskExport;
use terrascope_material::BiomeBindingTable;

/// Texture upload failures. Biome slot loads recover with fallback
/// colors; only programmer errors (shape mismatches) surface here.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("texture data size ({actual}) does not match expected ({expected}) for {width}x{height}")]
    DataSizeMismatch {
        actual: usize,
        expected: usize,
        width: u32,
        height: u32,
    },

    #[error("texture dimensions must be non-zero, got {width}x{height}")]
    ZeroDimensions { width: u32, height: u32 },
}

/// GPU copy of the packed biome mask.
///
/// The texture object is reused across exports of the same resolution
/// (in-place pixel replace), so view-dependent debug modes don't
/// allocate a texture every 250 ms. Ids and weights are raw data, so
/// the format is linear and the sampler must be nearest.
pub struct MaskTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub dimensions: (u32, u32),
}

impl MaskTexture {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        export: &PackedMaskExport,
    ) -> Result<Self, TextureError> {
        check_shape(export)?;
        let texture = create_rgba_texture(
            device,
            "mask-texture",
            export.width,
            export.height,
            Self::FORMAT,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut mask = Self {
            texture,
            view,
            dimensions: (export.width, export.height),
        };
        mask.write(queue, export);
        Ok(mask)
    }

    /// Refresh from a new export. Writes in place when the resolution
    /// is unchanged; otherwise recreates the texture. Returns whether
    /// the texture object was recreated (bind groups must be rebuilt).
    pub fn update(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        export: &PackedMaskExport,
    ) -> Result<bool, TextureError> {
        check_shape(export)?;
        if self.dimensions == (export.width, export.height) {
            self.write(queue, export);
            return Ok(false);
        }
        log::debug!(
            "mask resolution changed {:?} -> {}x{}, recreating texture",
            self.dimensions,
            export.width,
            export.height
        );
        *self = Self::upload(device, queue, export)?;
        Ok(true)
    }

    fn write(&mut self, queue: &wgpu::Queue, export: &PackedMaskExport) {
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &export.rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(export.width * 4),
                rows_per_image: Some(export.height),
            },
            wgpu::Extent3d {
                width: export.width,
                height: export.height,
                depth_or_array_layers: 1,
            },
        );
    }
}

fn check_shape(export: &PackedMaskExport) -> Result<(), TextureError> {
    if export.width == 0 || export.height == 0 {
        return Err(TextureError::ZeroDimensions {
            width: export.width,
            height: export.height,
        });
    }
    let expected = export.width as usize * export.height as usize * 4;
    if export.rgba.len() != expected {
        return Err(TextureError::DataSizeMismatch {
            actual: export.rgba.len(),
            expected,
            width: export.width,
            height: export.height,
        });
    }
    Ok(())
}

/// A 1×1 solid-color texture, used as the fallback for biome slots
/// whose image failed to load.
pub fn solid_color_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    rgba: [u8; 4],
    label: &str,
) -> wgpu::Texture {
    let texture = create_rgba_texture(device, label, 1, 1, wgpu::TextureFormat::Rgba8Unorm);
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4),
            rows_per_image: Some(1),
        },
        wgpu::Extent3d {
            width: 1,
            height: 1,
            depth_or_array_layers: 1,
        },
    );
    texture
}

/// The nine biome × humidity albedo layers as one array texture.
///
/// Layer order follows [`BiomeBindingTable::layer_index`]. A slot whose
/// image is missing or undecodable gets its biome's representative
/// color instead; the failure is logged and never blocks other slots.
/// Pixels are stored as-authored (sRGB bytes in a linear-format view);
/// the shader decodes explicitly before blending.
pub struct BiomeArrayTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub layer_resolution: u32,
}

impl BiomeArrayTexture {
    pub const LAYERS: u32 = 9;

    pub fn load(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        table: &BiomeBindingTable,
        layer_resolution: u32,
    ) -> Self {
        let resolution = layer_resolution.clamp(1, 4096);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("biome-array-texture"),
            size: wgpu::Extent3d {
                width: resolution,
                height: resolution,
                depth_or_array_layers: Self::LAYERS,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (layer, (biome, band, binding)) in table.slots().enumerate() {
            let pixels = match &binding.texture_path {
                Some(path) => match load_layer_pixels(path, resolution) {
                    Ok(pixels) => pixels,
                    Err(e) => {
                        log::warn!(
                            "failed to load {:?} for {:?}/{:?}: {e}; using fallback color",
                            path,
                            biome,
                            band
                        );
                        solid_layer_pixels(table.fallback_color(biome), resolution)
                    }
                },
                None => solid_layer_pixels(table.fallback_color(biome), resolution),
            };

            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d {
                        x: 0,
                        y: 0,
                        z: layer as u32,
                    },
                    aspect: wgpu::TextureAspect::All,
                },
                &pixels,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(resolution * 4),
                    rows_per_image: Some(resolution),
                },
                wgpu::Extent3d {
                    width: resolution,
                    height: resolution,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            dimension: Some(wgpu::TextureViewDimension::D2Array),
            ..Default::default()
        });

        Self {
            texture,
            view,
            layer_resolution: resolution,
        }
    }
}

fn load_layer_pixels(path: &std::path::Path, resolution: u32) -> Result<Vec<u8>, image::ImageError> {
    let img = image::open(path)?;
    let resized = img.resize_exact(resolution, resolution, image::imageops::FilterType::Triangle);
    Ok(resized.to_rgba8().into_raw())
}

fn solid_layer_pixels(linear_rgba: [f32; 4], resolution: u32) -> Vec<u8> {
    // Layers store sRGB-encoded bytes; encode the linear fallback color
    // the same way so the shader's decode lands back on it.
    let encode = |c: f32| {
        let c = c.clamp(0.0, 1.0);
        let s = if c <= 0.003_130_8 {
            c * 12.92
        } else {
            1.055 * c.powf(1.0 / 2.4) - 0.055
        };
        (s * 255.0).round() as u8
    };
    let texel = [
        encode(linear_rgba[0]),
        encode(linear_rgba[1]),
        encode(linear_rgba[2]),
        (linear_rgba[3].clamp(0.0, 1.0) * 255.0) as u8,
    ];
    texel.repeat(resolution as usize * resolution as usize)
}

fn create_rgba_texture(
    device: &wgpu::Device,
    label: &str,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    })
}
