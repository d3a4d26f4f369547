//! Immediate-mode 2D quads and text, drawn over the 3D scene.
//!
//! The overlay rebuilds its geometry every frame: [`Draw2d::clear`], a run of
//! `rect`/`rect_outline`/`text` calls, then one [`Draw2d::render`] inside the overlay
//! render pass. Nothing is retained between frames except the GPU buffers and the
//! per-font atlas bind groups.
//!
//! # Batching
//!
//! Solid quads share one vertex list and draw first. Glyph quads are grouped by
//! font so each atlas is bound once. At render time every list is copied into a
//! single vertex buffer of `MAX_VERTICES` entries and drawn as ranges of it;
//! anything past the capacity is dropped for that frame.
//!
//! # Example
//!
//! ```ignore
//! draw.clear();
//! draw.rect(16.0, 16.0, 320.0, 96.0, Color::rgba(0.0, 0.0, 0.0, 0.6));
//! draw.rect_outline(16.0, 16.0, 320.0, 96.0, 1.0, Color::WHITE);
//! let width = draw.text(&assets, font, 28.0, 28.0, "Artwork 3", Color::WHITE);
//!
//! draw.update_font_bind_groups(&gpu, &assets);
//! draw.render(&gpu, &mut overlay_pass);
//! ```
//!
//! Coordinates are window pixels with the origin at the top left.

use crate::assets::{Assets, FontId};
use crate::color::Color;
use crate::gpu::GpuContext;

/// Overlay vertex in window pixels.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex2d {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex2d {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2, 2 => Float32x4];

    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex2d>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &Self::ATTRIBUTES,
    };
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Draw2dUniforms {
    resolution: [f32; 2],
    _padding: [f32; 2],
}

/// Capacity of the shared overlay vertex buffer.
const MAX_VERTICES: usize = 16384;

/// Immediate-mode 2D drawing API for panels and text.
pub struct Draw2d {
    colored_pipeline: wgpu::RenderPipeline,
    textured_pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    texture_bind_group_layout: wgpu::BindGroupLayout,
    /// Indexed by [`FontId`].
    font_bind_groups: Vec<Option<wgpu::BindGroup>>,
    colored_vertices: Vec<Vertex2d>,
    text_batches: Vec<(FontId, Vec<Vertex2d>)>,
}

impl Draw2d {
    pub fn new(gpu: &GpuContext) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Overlay Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/draw2d.wgsl").into()),
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Overlay Uniforms"),
            size: std::mem::size_of::<Draw2dUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // group 0: screen resolution
        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Overlay Uniform Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Overlay Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        // group 1: glyph atlas
        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Overlay Atlas Layout"),
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

        let colored_pipeline = overlay_pipeline(
            gpu,
            &shader,
            "fs_colored",
            &[&uniform_bind_group_layout],
        );
        let textured_pipeline = overlay_pipeline(
            gpu,
            &shader,
            "fs_textured",
            &[&uniform_bind_group_layout, &texture_bind_group_layout],
        );

        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Overlay Vertices"),
            size: (MAX_VERTICES * std::mem::size_of::<Vertex2d>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            colored_pipeline,
            textured_pipeline,
            vertex_buffer,
            uniform_buffer,
            uniform_bind_group,
            texture_bind_group_layout,
            font_bind_groups: Vec::new(),
            colored_vertices: Vec::with_capacity(1024),
            text_batches: Vec::new(),
        }
    }

    /// Clear all draw calls for the new frame.
    pub fn clear(&mut self) {
        self.colored_vertices.clear();
        self.text_batches.clear();
    }

    /// Draw a colored rectangle.
    pub fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        push_quad(
            &mut self.colored_vertices,
            [x, y, x + w, y + h],
            [0.0, 0.0, 0.0, 0.0],
            color.to_array(),
        );
    }

    /// Draw a rectangle outline `thickness` pixels wide, inside the given bounds.
    pub fn rect_outline(&mut self, x: f32, y: f32, w: f32, h: f32, thickness: f32, color: Color) {
        self.rect(x, y, w, thickness, color);
        self.rect(x, y + h - thickness, w, thickness, color);
        self.rect(x, y + thickness, thickness, h - 2.0 * thickness, color);
        self.rect(x + w - thickness, y + thickness, thickness, h - 2.0 * thickness, color);
    }

    /// Draw text with its top-left corner at the given position. Returns the
    /// advance width of the drawn text.
    ///
    /// Characters missing from the atlas advance by half the font size. An
    /// unknown `font_id` draws nothing and returns 0.
    pub fn text(
        &mut self,
        assets: &Assets,
        font_id: FontId,
        x: f32,
        y: f32,
        text: &str,
        color: Color,
    ) -> f32 {
        let Some(font) = assets.font(font_id) else {
            return 0.0;
        };

        let rgba = color.to_array();
        let baseline = y + font.size();
        let batch = self.batch_for(font_id);
        let mut pen = x;

        for ch in text.chars() {
            let Some(glyph) = font.glyph(ch) else {
                pen += font.size() * 0.5;
                continue;
            };
            if glyph.width > 0 && glyph.height > 0 {
                let left = pen + glyph.offset_x;
                // fontdue's ymin runs up from the baseline to the glyph's bottom
                let top = baseline - glyph.offset_y - glyph.height as f32;
                let [u, v, du, dv] = glyph.uv;
                push_quad(
                    batch,
                    [left, top, left + glyph.width as f32, top + glyph.height as f32],
                    [u, v, u + du, v + dv],
                    rgba,
                );
            }
            pen += glyph.advance;
        }
        pen - x
    }

    fn batch_for(&mut self, font_id: FontId) -> &mut Vec<Vertex2d> {
        let index = match self.text_batches.iter().position(|(id, _)| *id == font_id) {
            Some(index) => index,
            None => {
                self.text_batches.push((font_id, Vec::new()));
                self.text_batches.len() - 1
            }
        };
        &mut self.text_batches[index].1
    }

    /// Creates atlas bind groups for fonts loaded since the last call.
    pub(crate) fn update_font_bind_groups(&mut self, gpu: &GpuContext, assets: &Assets) {
        self.font_bind_groups.resize_with(assets.fonts.len(), || None);

        for (i, font) in assets.fonts.iter().enumerate() {
            if self.font_bind_groups[i].is_none() {
                let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("Overlay Font Bind Group"),
                    layout: &self.texture_bind_group_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(&font.view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::Sampler(&font.sampler),
                        },
                    ],
                });
                self.font_bind_groups[i] = Some(bind_group);
            }
        }
    }

    /// Draws the batched quads, then each font's glyphs. Everything past
    /// `MAX_VERTICES` is dropped.
    pub fn render(&self, gpu: &GpuContext, render_pass: &mut wgpu::RenderPass) {
        let resolution = Draw2dUniforms {
            resolution: [gpu.width() as f32, gpu.height() as f32],
            _padding: [0.0; 2],
        };
        gpu.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[resolution]));

        let mut staged: Vec<Vertex2d> = Vec::with_capacity(MAX_VERTICES.min(4096));
        let mut stage = |vertices: &[Vertex2d]| {
            let start = staged.len();
            let take = vertices.len().min(MAX_VERTICES - start);
            staged.extend_from_slice(&vertices[..take]);
            start as u32..staged.len() as u32
        };

        let quads = stage(&self.colored_vertices);
        let glyph_runs: Vec<_> = self
            .text_batches
            .iter()
            .filter_map(|(font_id, vertices)| {
                let bind_group = self.font_bind_groups.get(font_id.0)?.as_ref()?;
                Some((bind_group, stage(vertices)))
            })
            .collect();

        if staged.is_empty() {
            return;
        }
        gpu.queue
            .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&staged));

        render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        if !quads.is_empty() {
            render_pass.set_pipeline(&self.colored_pipeline);
            render_pass.draw(quads, 0..1);
        }
        render_pass.set_pipeline(&self.textured_pipeline);
        for (bind_group, range) in glyph_runs.into_iter().filter(|(_, r)| !r.is_empty()) {
            render_pass.set_bind_group(1, bind_group, &[]);
            render_pass.draw(range, 0..1);
        }
    }
}

/// Alpha-blended triangle-list pipeline over the swapchain format, no depth.
fn overlay_pipeline(
    gpu: &GpuContext,
    shader: &wgpu::ShaderModule,
    fragment_entry: &str,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
) -> wgpu::RenderPipeline {
    let layout = gpu
        .device
        .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Overlay Pipeline Layout"),
            bind_group_layouts,
            push_constant_ranges: &[],
        });

    gpu.device
        .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(fragment_entry),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs"),
                buffers: &[Vertex2d::LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some(fragment_entry),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
}

fn push_quad(out: &mut Vec<Vertex2d>, [x0, y0, x1, y1]: [f32; 4], [u0, v0, u1, v1]: [f32; 4], color: [f32; 4]) {
    let v = |x, y, u, v| Vertex2d {
        position: [x, y],
        uv: [u, v],
        color,
    };
    out.extend_from_slice(&[
        v(x0, y0, u0, v0),
        v(x1, y0, u1, v0),
        v(x0, y1, u0, v1),
        v(x1, y0, u1, v0),
        v(x1, y1, u1, v1),
        v(x0, y1, u0, v1),
    ]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_is_two_triangles() {
        let mut out = Vec::new();
        push_quad(&mut out, [10.0, 20.0, 30.0, 60.0], [0.0, 0.0, 1.0, 1.0], Color::WHITE.to_array());
        assert_eq!(out.len(), 6);
        assert_eq!(out[0].position, [10.0, 20.0]);
        assert_eq!(out[4].position, [30.0, 60.0]);
        assert_eq!(out[4].uv, [1.0, 1.0]);
    }

    #[test]
    fn vertex_layout_matches_struct() {
        assert_eq!(std::mem::size_of::<Vertex2d>(), 32);
        assert_eq!(Vertex2d::LAYOUT.array_stride, 32);
        assert_eq!(Vertex2d::ATTRIBUTES[2].offset, 16);
    }
}
