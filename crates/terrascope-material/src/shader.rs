//! Explicit WGSL source composition for the terrain blend shader.
//!
//! The shader is assembled from named fragments instead of patched at
//! pipeline-compile time, so what gets compiled is exactly what the
//! [`ShaderShape`] says. Feature toggles and the debug view select which
//! fragments are emitted; slider values only flow through the uniform
//! buffer and never change the source.

use std::fmt::Write;

use crate::params::{ShaderShape, TilingDebugView};

/// Bumped whenever the uniform layout or fragment set changes shape in a
/// way value updates can't express. Part of the pipeline cache key.
pub const SHADER_VERSION: u32 = 4;

const COMMON: &str = r#"
struct CameraUniform {
    view_proj: mat4x4<f32>,
    position: vec4<f32>,
}

struct TerrainParams {
    mask_bounds: vec4<f32>,      // min_x, min_z, max_x, max_z
    humidity: vec4<f32>,         // dry_max, wet_min, band_width, edge_noise
    tiling_a: vec4<f32>,         // near_scale, far_scale, blend_start, blend_end
    tiling_b: vec4<f32>,         // curve, debug_view, enabled, _
    variation_a: vec4<f32>,      // anti_enabled, anti_strength, anti_cell, macro_enabled
    variation_b: vec4<f32>,      // macro_strength, macro_freq, intensity_near, intensity_far
    tile_scale_stone: vec4<f32>, // dry, neutral, wet, _
    tile_scale_grass: vec4<f32>,
    tile_scale_land: vec4<f32>,
}

@group(0) @binding(0) var<uniform> camera: CameraUniform;
@group(1) @binding(0) var mask_texture: texture_2d<f32>;
@group(1) @binding(1) var mask_sampler: sampler;
@group(2) @binding(0) var biome_textures: texture_2d_array<f32>;
@group(2) @binding(1) var biome_sampler: sampler;
@group(2) @binding(2) var<uniform> params: TerrainParams;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) normal: vec3<f32>,
    @location(1) world_xz: vec2<f32>,
}

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = camera.view_proj * vec4<f32>(in.position, 1.0);
    out.normal = in.normal;
    out.world_xz = in.uv;
    return out;
}

fn srgb_to_linear(c: vec3<f32>) -> vec3<f32> {
    let lo = c / 12.92;
    let hi = pow((c + vec3<f32>(0.055)) / 1.055, vec3<f32>(2.4));
    return select(hi, lo, c <= vec3<f32>(0.04045));
}

fn hash2(p: vec2<f32>) -> f32 {
    let h = dot(p, vec2<f32>(127.1, 311.7));
    return fract(sin(h) * 43758.5453123);
}

fn value_noise(p: vec2<f32>) -> f32 {
    let i = floor(p);
    let f = fract(p);
    let u = f * f * (3.0 - 2.0 * f);
    let a = hash2(i);
    let b = hash2(i + vec2<f32>(1.0, 0.0));
    let c = hash2(i + vec2<f32>(0.0, 1.0));
    let d = hash2(i + vec2<f32>(1.0, 1.0));
    return mix(mix(a, b, u.x), mix(c, d, u.x), u.y);
}

fn humidity_weights(h_in: f32, noise_coord: vec2<f32>) -> vec3<f32> {
    let dry_max = params.humidity.x;
    let wet_min = params.humidity.y;
    let band = params.humidity.z;
    let half_band = band * 0.5;

    let near_dry = 1.0 - abs(h_in - dry_max) / band;
    let near_wet = 1.0 - abs(h_in - wet_min) / band;
    let edge_mask = clamp(max(near_dry, near_wet), 0.0, 1.0);
    let noise = value_noise(noise_coord) * 2.0 - 1.0;
    let h = clamp(h_in + noise * params.humidity.w * edge_mask, 0.0, 1.0);

    let dry = 1.0 - smoothstep(dry_max - half_band, dry_max + half_band, h);
    let wet = smoothstep(wet_min - half_band, wet_min + half_band, h);
    let neutral = max(1.0 - dry - wet, 0.0);
    return vec3<f32>(dry, neutral, wet);
}
"#;

/// Assemble the complete terrain shader for one parameter shape.
pub fn compose_terrain_shader(shape: &ShaderShape) -> String {
    let mut src = String::with_capacity(8 * 1024);
    let _ = writeln!(
        src,
        "// terrain blend shader v{} (tiling={} anti={} macro={} view={:?})",
        shape.shader_version,
        shape.tiling_enabled,
        shape.anti_tiling_enabled,
        shape.macro_enabled,
        shape.debug_view,
    );

    src.push_str(COMMON);

    src.push_str(&sample_slot_fn(shape));
    src.push_str(&fragment_entry(shape));
    src
}

/// The per-slot sampling helper: distance tiling and anti-tiling both
/// live here so every one of the nine slots gets identical treatment.
///
/// Distance tiling takes one sample at the near UV scale and one at the
/// far UV scale and cross-fades their colors: both tilings stay anchored
/// in world space, so nothing swims as the camera moves. Anti-tiling is
/// applied to each scale independently, its breakup strength scaled by a
/// near/far variation intensity lerped with the same blend factor.
fn sample_slot_fn(shape: &ShaderShape) -> String {
    let mut f = String::new();
    f.push_str(
        "fn sample_slot(layer: i32, world_xz: vec2<f32>, tile_size: f32, dist: f32) -> vec3<f32> {\n",
    );

    if shape.tiling_enabled {
        match shape.debug_view {
            TilingDebugView::Blended => f.push_str(
                "    let t = clamp((dist - params.tiling_a.z) / (params.tiling_a.w - params.tiling_a.z), 0.0, 1.0);\n\
                 \x20   let blend_factor = pow(t, params.tiling_b.x);\n",
            ),
            TilingDebugView::NearOnly => f.push_str("    let blend_factor = 0.0;\n"),
            TilingDebugView::FarOnly => f.push_str("    let blend_factor = 1.0;\n"),
        }
    } else if shape.anti_tiling_enabled {
        // No distance blend, so the variation intensity stays at near.
        f.push_str("    let blend_factor = 0.0;\n");
    }

    if shape.anti_tiling_enabled {
        f.push_str(
            "    let cell = floor(world_xz / params.variation_a.z);\n\
             \x20   let angle = hash2(cell) * 6.28318530718;\n\
             \x20   let offset = vec2<f32>(hash2(cell + vec2<f32>(17.0, 0.0)), hash2(cell + vec2<f32>(0.0, 41.0)));\n\
             \x20   let rot = mat2x2<f32>(cos(angle), -sin(angle), sin(angle), cos(angle));\n\
             \x20   let intensity = mix(params.variation_b.z, params.variation_b.w, blend_factor);\n\
             \x20   let breakup = params.variation_a.y * intensity;\n",
        );
    }

    if shape.tiling_enabled {
        f.push_str(
            "    let near_uv = world_xz * params.tiling_a.x / tile_size;\n\
             \x20   let far_uv = world_xz * params.tiling_a.y / tile_size;\n",
        );
        if shape.anti_tiling_enabled {
            f.push_str(
                "    let near_color = mix(\n\
                 \x20       textureSample(biome_textures, biome_sampler, fract(near_uv), layer).rgb,\n\
                 \x20       textureSample(biome_textures, biome_sampler, fract(rot * near_uv + offset), layer).rgb,\n\
                 \x20       breakup);\n\
                 \x20   let far_color = mix(\n\
                 \x20       textureSample(biome_textures, biome_sampler, fract(far_uv), layer).rgb,\n\
                 \x20       textureSample(biome_textures, biome_sampler, fract(rot * far_uv + offset), layer).rgb,\n\
                 \x20       breakup);\n",
            );
        } else {
            f.push_str(
                "    let near_color = textureSample(biome_textures, biome_sampler, fract(near_uv), layer).rgb;\n\
                 \x20   let far_color = textureSample(biome_textures, biome_sampler, fract(far_uv), layer).rgb;\n",
            );
        }
        f.push_str("    let color = mix(near_color, far_color, blend_factor);\n");
    } else {
        f.push_str("    let uv = world_xz * params.tiling_a.x / tile_size;\n");
        if shape.anti_tiling_enabled {
            f.push_str(
                "    let base = textureSample(biome_textures, biome_sampler, fract(uv), layer).rgb;\n\
                 \x20   let alt = textureSample(biome_textures, biome_sampler, fract(rot * uv + offset), layer).rgb;\n\
                 \x20   let color = mix(base, alt, breakup);\n",
            );
        } else {
            f.push_str(
                "    let color = textureSample(biome_textures, biome_sampler, fract(uv), layer).rgb;\n",
            );
        }
    }

    // Textures are stored as-authored (sRGB bytes in a non-sRGB view);
    // decode explicitly so all blending happens in linear space.
    f.push_str("    return srgb_to_linear(color);\n}\n");
    f
}

fn fragment_entry(shape: &ShaderShape) -> String {
    let mut f = String::new();
    f.push_str(
        r#"
fn biome_color(biome: i32, weights: vec3<f32>, world_xz: vec2<f32>, dist: f32) -> vec3<f32> {
    var tile_scales = params.tile_scale_stone;
    if biome == 1 { tile_scales = params.tile_scale_grass; }
    if biome == 2 { tile_scales = params.tile_scale_land; }
    let base = biome * 3;
    return weights.x * sample_slot(base, world_xz, tile_scales.x, dist)
         + weights.y * sample_slot(base + 1, world_xz, tile_scales.y, dist)
         + weights.z * sample_slot(base + 2, world_xz, tile_scales.z, dist);
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let span = max(params.mask_bounds.zw - params.mask_bounds.xy, vec2<f32>(1e-6));
    let mask_uv = clamp((in.world_xz - params.mask_bounds.xy) / span, vec2<f32>(0.0), vec2<f32>(1.0));
    let mask = textureSample(mask_texture, mask_sampler, mask_uv);

    let primary = i32(mask.r * 255.0 + 0.5);
    let secondary = i32(mask.g * 255.0 + 0.5);
    let blend = mask.b;
    let weights = humidity_weights(mask.a, in.world_xz * 0.37);

    let dist = distance(camera.position.xz, in.world_xz);
    let primary_color = biome_color(primary, weights, in.world_xz, dist);
    let secondary_color = biome_color(secondary, weights, in.world_xz, dist);
    var albedo = primary_color * (1.0 - blend) + secondary_color * blend;
"#,
    );

    if shape.macro_enabled {
        f.push_str(
            "    let macro_noise = value_noise(in.world_xz * params.variation_b.y) * 2.0 - 1.0;\n\
             \x20   albedo = albedo * (1.0 + macro_noise * params.variation_b.x);\n",
        );
    }

    f.push_str(
        r#"    let sun = normalize(vec3<f32>(0.4, 1.0, 0.3));
    let light = max(dot(normalize(in.normal), sun), 0.0) * 0.8 + 0.2;
    return vec4<f32>(albedo * light, 1.0);
}
"#,
    );
    f
}
