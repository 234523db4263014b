//! Render pipelines for the streak backdrop.
//!
//! Three passes per frame, all reading plain storage/uniform buffers:
//! 1. **Fade**: overpaints the persistent accumulation texture with a
//!    low-alpha black fullscreen quad instead of clearing it, leaving a
//!    decaying trail of previous frames' strokes.
//! 2. **Streak**: one quad per instance, expanded in the vertex shader to
//!    a vertical capsule; the fragment shader applies the head-to-tail
//!    gradient and rounded caps.
//! 3. **Blit**: copies the accumulation texture to the swapchain.

use bytemuck::bytes_of;
use tracing::{debug, info};
use wgpu::{util::DeviceExt, Device, Queue};

use crate::instance::{FieldUniforms, StreakInstance};

/// Maximum number of streak instances per frame.
///
/// The count policy is one streak per 15 logical pixels of width, so this
/// covers viewports far beyond 8K.
pub const MAX_STREAKS: usize = 1024;

/// Fade pass shader: fullscreen black quad at the trail fade alpha.
pub const FADE_SHADER: &str = r"
struct FieldUniforms {
    surface_size: vec2<f32>,
    fade_alpha: f32,
    streak_opacity: f32,
}

@group(0) @binding(1) var<uniform> uniforms: FieldUniforms;

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> @builtin(position) vec4<f32> {
    // Fullscreen triangle
    let x = f32(i32(vertex_index & 1u) * 4 - 1);
    let y = f32(i32(vertex_index >> 1u) * 4 - 1);
    return vec4<f32>(x, y, 0.0, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(0.0, 0.0, 0.0, uniforms.fade_alpha);
}
";

/// Streak pass shader: instanced vertical light streaks with a gradient
/// from full color at the head to transparent at the tail, rounded caps.
pub const STREAK_SHADER: &str = r"
struct StreakInstance {
    head: vec2<f32>,
    length: f32,
    width: f32,
    color: vec4<f32>,
}

struct FieldUniforms {
    surface_size: vec2<f32>,
    fade_alpha: f32,
    streak_opacity: f32,
}

@group(0) @binding(0) var<storage, read> streaks: array<StreakInstance>;
@group(0) @binding(1) var<uniform> uniforms: FieldUniforms;

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) pixel_pos: vec2<f32>,
    @location(1) head: vec2<f32>,
    @location(2) length: f32,
    @location(3) half_width: f32,
    @location(4) color: vec4<f32>,
}

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_idx: u32,
    @builtin(instance_index) instance_idx: u32
) -> VertexOutput {
    let streak = streaks[instance_idx];

    // Quad corners (two triangles)
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(0.0, 0.0),
        vec2<f32>(1.0, 0.0),
        vec2<f32>(0.0, 1.0),
        vec2<f32>(1.0, 0.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(0.0, 1.0)
    );
    let corner = corners[vertex_idx];

    // The quad covers the capsule from tail to head, padded by the cap radius
    let half_width = streak.width * 0.5;
    let top_left = vec2<f32>(
        streak.head.x - half_width,
        streak.head.y - streak.length - half_width
    );
    let size = vec2<f32>(streak.width, streak.length + streak.width);
    let pixel = top_left + corner * size;

    let ndc = pixel / uniforms.surface_size * 2.0 - 1.0;

    var out: VertexOutput;
    out.position = vec4<f32>(ndc.x, -ndc.y, 0.0, 1.0);
    out.pixel_pos = pixel;
    out.head = streak.head;
    out.length = streak.length;
    out.half_width = half_width;
    out.color = streak.color;
    return out;
}

// Distance from a point to the segment [a, b]
fn sd_segment(p: vec2<f32>, a: vec2<f32>, b: vec2<f32>) -> f32 {
    let pa = p - a;
    let ba = b - a;
    let h = clamp(dot(pa, ba) / dot(ba, ba), 0.0, 1.0);
    return length(pa - ba * h);
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let tail = vec2<f32>(in.head.x, in.head.y - in.length);
    let d = sd_segment(in.pixel_pos, in.head, tail);

    // Rounded caps fall out of the segment distance
    let edge = 1.0 - smoothstep(in.half_width - 1.0, in.half_width, d);

    // Head at full color, fading to transparent at the tail
    let t = clamp((in.head.y - in.pixel_pos.y) / in.length, 0.0, 1.0);
    let alpha = in.color.a * (1.0 - t) * edge * uniforms.streak_opacity;

    if alpha < 0.003 {
        discard;
    }
    return vec4<f32>(in.color.rgb, alpha);
}
";

/// Blit shader: copies the accumulation texture to the surface.
pub const BLIT_SHADER: &str = r"
@group(0) @binding(0) var trail_texture: texture_2d<f32>;
@group(0) @binding(1) var trail_sampler: sampler;

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
}

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> VertexOutput {
    var out: VertexOutput;
    let x = f32(i32(vertex_index & 1u) * 4 - 1);
    let y = f32(i32(vertex_index >> 1u) * 4 - 1);
    out.position = vec4<f32>(x, y, 0.0, 1.0);
    out.uv = vec2<f32>((x + 1.0) * 0.5, (1.0 - y) * 0.5);
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(trail_texture, trail_sampler, in.uv);
}
";

/// The three render pipelines plus their shared GPU state.
pub struct BackdropPipelines {
    /// Fade pass (accumulation target, load + alpha blend)
    fade_pipeline: wgpu::RenderPipeline,
    /// Streak pass (accumulation target, alpha blend)
    streak_pipeline: wgpu::RenderPipeline,
    /// Blit pass (surface target)
    blit_pipeline: wgpu::RenderPipeline,
    /// Bind group shared by the fade and streak passes
    field_bind_group: wgpu::BindGroup,
    /// Layout for per-texture blit bind groups
    blit_bind_group_layout: wgpu::BindGroupLayout,
    /// Sampler for the blit pass
    blit_sampler: wgpu::Sampler,
    /// Instance storage buffer (fixed capacity)
    instance_buffer: wgpu::Buffer,
    /// Uniforms buffer
    uniforms_buffer: wgpu::Buffer,
    /// Current uniforms
    uniforms: FieldUniforms,
    /// Instances uploaded for the current frame
    instance_count: u32,
}

impl BackdropPipelines {
    /// Creates the pipelines.
    ///
    /// `trail_format` is the accumulation texture format; `surface_format`
    /// is the swapchain format the blit pass targets.
    pub fn new(
        device: &Device,
        trail_format: wgpu::TextureFormat,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        info!("Creating backdrop render pipelines...");

        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Streak Instance Buffer"),
            size: (MAX_STREAKS * StreakInstance::SIZE) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniforms = FieldUniforms::default();
        let uniforms_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Field Uniforms Buffer"),
            contents: bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let field_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Field Bind Group Layout"),
                entries: &[
                    // streak instances - storage buffer
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Storage { read_only: true },
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    // field uniforms
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                ],
            });

        let field_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Field Bind Group"),
            layout: &field_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: instance_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: uniforms_buffer.as_entire_binding(),
                },
            ],
        });

        let field_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Field Pipeline Layout"),
                bind_group_layouts: &[&field_bind_group_layout],
                push_constant_ranges: &[],
            });

        let fade_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Fade Shader"),
            source: wgpu::ShaderSource::Wgsl(FADE_SHADER.into()),
        });

        let fade_pipeline = create_pipeline(
            device,
            "Fade Pipeline",
            &field_pipeline_layout,
            &fade_shader,
            trail_format,
            wgpu::BlendState::ALPHA_BLENDING,
        );

        let streak_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Streak Shader"),
            source: wgpu::ShaderSource::Wgsl(STREAK_SHADER.into()),
        });

        let streak_pipeline = create_pipeline(
            device,
            "Streak Pipeline",
            &field_pipeline_layout,
            &streak_shader,
            trail_format,
            wgpu::BlendState::ALPHA_BLENDING,
        );

        let blit_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Blit Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
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
                ],
            });

        let blit_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Blit Pipeline Layout"),
                bind_group_layouts: &[&blit_bind_group_layout],
                push_constant_ranges: &[],
            });

        let blit_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Blit Shader"),
            source: wgpu::ShaderSource::Wgsl(BLIT_SHADER.into()),
        });

        let blit_pipeline = create_pipeline(
            device,
            "Blit Pipeline",
            &blit_pipeline_layout,
            &blit_shader,
            surface_format,
            wgpu::BlendState::REPLACE,
        );

        let blit_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Blit Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        info!("Backdrop render pipelines created successfully");

        Self {
            fade_pipeline,
            streak_pipeline,
            blit_pipeline,
            field_bind_group,
            blit_bind_group_layout,
            blit_sampler,
            instance_buffer,
            uniforms_buffer,
            uniforms,
            instance_count: 0,
        }
    }

    /// Sets the drawing surface size in physical pixels.
    pub fn set_surface_size(&mut self, queue: &Queue, width: u32, height: u32) {
        self.uniforms.surface_size = [width as f32, height as f32];
        queue.write_buffer(&self.uniforms_buffer, 0, bytes_of(&self.uniforms));
    }

    /// Sets the trail fade alpha.
    pub fn set_fade_alpha(&mut self, queue: &Queue, alpha: f32) {
        self.uniforms.fade_alpha = alpha.clamp(0.0, 1.0);
        queue.write_buffer(&self.uniforms_buffer, 0, bytes_of(&self.uniforms));
    }

    /// Sets the overall streak opacity.
    pub fn set_streak_opacity(&mut self, queue: &Queue, opacity: f32) {
        self.uniforms.streak_opacity = opacity.clamp(0.0, 1.0);
        queue.write_buffer(&self.uniforms_buffer, 0, bytes_of(&self.uniforms));
    }

    /// Uploads the frame's streak instances, truncating at capacity.
    pub fn upload_instances(&mut self, queue: &Queue, instances: &[StreakInstance]) {
        let count = instances.len().min(MAX_STREAKS);
        if count < instances.len() {
            debug!(
                requested = instances.len(),
                capacity = MAX_STREAKS,
                "streak instances truncated at buffer capacity"
            );
        }
        if count > 0 {
            queue.write_buffer(
                &self.instance_buffer,
                0,
                bytemuck::cast_slice(&instances[..count]),
            );
        }
        self.instance_count = count as u32;
    }

    /// Creates a blit bind group for an accumulation texture view.
    ///
    /// Call again whenever the accumulation texture is recreated.
    #[must_use]
    pub fn create_blit_bind_group(
        &self,
        device: &Device,
        trail_view: &wgpu::TextureView,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Blit Bind Group"),
            layout: &self.blit_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(trail_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.blit_sampler),
                },
            ],
        })
    }

    /// Records the fade pass into a render pass targeting the accumulation
    /// texture (which must be loaded, not cleared).
    pub fn fade(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_pipeline(&self.fade_pipeline);
        render_pass.set_bind_group(0, &self.field_bind_group, &[]);
        render_pass.draw(0..3, 0..1); // Fullscreen triangle
    }

    /// Records the streak pass for the instances uploaded this frame.
    pub fn streaks(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        if self.instance_count == 0 {
            return;
        }
        render_pass.set_pipeline(&self.streak_pipeline);
        render_pass.set_bind_group(0, &self.field_bind_group, &[]);
        render_pass.draw(0..6, 0..self.instance_count);
    }

    /// Records the blit pass into a render pass targeting the surface.
    pub fn blit(&self, render_pass: &mut wgpu::RenderPass<'_>, bind_group: &wgpu::BindGroup) {
        render_pass.set_pipeline(&self.blit_pipeline);
        render_pass.set_bind_group(0, bind_group, &[]);
        render_pass.draw(0..3, 0..1);
    }

    /// Returns the number of instances uploaded for the current frame.
    #[must_use]
    pub const fn instance_count(&self) -> u32 {
        self.instance_count
    }

    /// Returns the current uniforms.
    #[must_use]
    pub const fn uniforms(&self) -> &FieldUniforms {
        &self.uniforms
    }
}

/// Builds a render pipeline with the shared settings of all three passes.
fn create_pipeline(
    device: &Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    blend: wgpu::BlendState,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shader_entry_points() {
        for shader in [FADE_SHADER, STREAK_SHADER, BLIT_SHADER] {
            assert!(shader.contains("fn vs_main"));
            assert!(shader.contains("fn fs_main"));
        }
    }

    #[test]
    fn test_streak_shader_layout_matches_instance() {
        // WGSL struct fields must mirror StreakInstance's layout
        assert!(STREAK_SHADER.contains("head: vec2<f32>"));
        assert!(STREAK_SHADER.contains("length: f32"));
        assert!(STREAK_SHADER.contains("width: f32"));
        assert!(STREAK_SHADER.contains("color: vec4<f32>"));
        assert_eq!(StreakInstance::SIZE, 32);
    }

    #[test]
    fn test_capacity_covers_count_policy() {
        // One streak per 15 logical px: even an 8K-wide viewport fits
        assert!(7680_usize / 15 < MAX_STREAKS);
    }
}
