//! 3D mesh rendering pass with depth testing, lighting and texture support.
//!
//! # Architecture
//!
//! The mesh pass uses three bind groups:
//! - **Group 0**: Frame uniforms (view-projection, camera position, fog, exposure) and
//!   the packed light array
//! - **Group 1**: Per-draw uniforms (model matrix, normal matrix, material), one
//!   256-byte aligned slot per draw call, selected with a dynamic offset
//! - **Group 2**: Texture and sampler for the mesh surface
//!
//! Every draw call gets its own uniform slot, so all draws recorded into a render pass
//! see their own transform and material when the queue is finally submitted.
//!
//! Three pipelines share one shader: back-face culled triangles, double-sided
//! triangles, and a line list used for wireframe materials.
//!
//! # Usage
//!
//! ```ignore
//! mesh_pass.ensure_depth_size(&gpu);
//! mesh_pass.prepare(&gpu, &frame, &draws);
//! // ... begin a render pass with `mesh_pass.depth_view()` attached ...
//! mesh_pass.render(&mut render_pass, &draws);
//! ```

use glam::Mat4;

use crate::camera::Camera;
use crate::gpu::GpuContext;
use crate::light::LightUniforms;
use crate::material::Material;
use crate::mesh::{Mesh, Vertex3d};
use crate::scene::{Exposure, Fog};
use crate::texture::Texture;

/// Per-frame uniforms. Must match `Frame` in `mesh.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    /// Camera position + time.
    pub camera: [f32; 4],
    /// Fog color + enabled flag.
    pub fog_color: [f32; 4],
    /// Fog near, fog far, exposure, tone mapping flag.
    pub params: [f32; 4],
}

impl FrameUniforms {
    /// Packs the camera and the scene's fog and exposure. Without fog the fog
    /// flag is 0 and the shader skips the blend.
    pub fn new(camera: &Camera, time: f32, fog: Option<Fog>, exposure: Exposure) -> Self {
        let position = camera.pose.position;
        let (fog_color, near, far) = match fog {
            Some(fog) => {
                let [r, g, b] = fog.color.rgb_array();
                ([r, g, b, 1.0], fog.near, fog.far)
            }
            None => ([0.0; 4], 0.0, 0.0),
        };
        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            camera: [position.x, position.y, position.z, time],
            fog_color,
            params: [
                near,
                far,
                exposure.exposure,
                if exposure.tone_mapping { 1.0 } else { 0.0 },
            ],
        }
    }
}

/// Per-draw uniforms. Must match `Draw` in `mesh.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawUniforms {
    pub model: [[f32; 4]; 4],
    /// Inverse transpose of the model matrix, for normals under non-uniform scale.
    pub normal_matrix: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// Shininess, specular strength, unlit flag, textured flag.
    pub material: [f32; 4],
    /// UV repeat, metalness, unused.
    pub extra: [f32; 4],
}

impl DrawUniforms {
    /// `textured` is whether a texture bind group is actually bound, which lags the
    /// material's texture until the image has loaded.
    pub fn new(matrix: Mat4, material: &Material, textured: bool) -> Self {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        Self {
            model: matrix.to_cols_array_2d(),
            normal_matrix: matrix.inverse().transpose().to_cols_array_2d(),
            color: material.color.to_array(),
            material: [
                material.shininess(),
                material.specular(),
                flag(material.unlit),
                flag(textured),
            ],
            extra: [material.uv_repeat.x, material.uv_repeat.y, material.metalness, 0.0],
        }
    }
}

/// One mesh to draw this frame.
pub struct DrawCall<'a> {
    pub mesh: &'a Mesh,
    pub matrix: Mat4,
    pub material: Material,
    /// Texture bind group from [`MeshPass::texture_bind_group`]; `None` draws the
    /// material color alone.
    pub texture: Option<&'a wgpu::BindGroup>,
}

/// Rounds `size` up to the next multiple of `alignment`.
pub fn aligned_stride(size: u64, alignment: u64) -> u64 {
    size.div_ceil(alignment) * alignment
}

/// Handles 3D mesh rendering with depth testing.
///
/// Per-draw uniforms live in one buffer of slots spaced by [`aligned_stride`]. The buffer
/// grows to the next power of two when a frame has more draws than slots, and is
/// never shrunk.
///
/// # Pipeline Configuration
///
/// - Counter-clockwise front faces, back faces culled unless the material is
///   double-sided
/// - Alpha blending
/// - Depth write and Less-than comparison against a 32-bit float depth buffer
pub struct MeshPass {
    cull_pipeline: wgpu::RenderPipeline,
    double_sided_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    light_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    draw_layout: wgpu::BindGroupLayout,
    draw_buffer: wgpu::Buffer,
    draw_bind_group: wgpu::BindGroup,
    draw_capacity: usize,
    draw_stride: u64,
    staging: Vec<u8>,
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
    depth_size: (u32, u32),
    texture_bind_group_layout: wgpu::BindGroupLayout,
    default_bind_group: wgpu::BindGroup,
}

impl MeshPass {
    pub fn new(gpu: &GpuContext) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mesh.wgsl").into()),
        });

        let uniform_entry = |binding: u32, dynamic: bool| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: dynamic,
                min_binding_size: None,
            },
            count: None,
        };

        // Frame uniforms + lights (group 0)
        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniforms"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let light_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Light Uniforms"),
            size: std::mem::size_of::<LightUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Bind Group Layout"),
            entries: &[uniform_entry(0, false), uniform_entry(1, false)],
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: frame_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: light_buffer.as_entire_binding(),
                },
            ],
        });

        // Per-draw uniforms (group 1)
        let draw_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Draw Bind Group Layout"),
            entries: &[uniform_entry(0, true)],
        });
        let draw_stride = aligned_stride(
            std::mem::size_of::<DrawUniforms>() as u64,
            device.limits().min_uniform_buffer_offset_alignment as u64,
        );
        let draw_capacity = 64;
        let (draw_buffer, draw_bind_group) =
            Self::create_draw_buffer(device, &draw_layout, draw_stride, draw_capacity);

        // Texture (group 2)
        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Texture Bind Group Layout"),
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

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[&frame_layout, &draw_layout, &texture_bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = |label: &str, topology: wgpu::PrimitiveTopology, cull_mode: Option<wgpu::Face>| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs"),
                    buffers: &[Vertex3d::LAYOUT],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: gpu.config.format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology,
                    cull_mode,
                    front_face: wgpu::FrontFace::Ccw,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: wgpu::TextureFormat::Depth32Float,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        let cull_pipeline = pipeline(
            "Mesh Pipeline",
            wgpu::PrimitiveTopology::TriangleList,
            Some(wgpu::Face::Back),
        );
        let double_sided_pipeline = pipeline(
            "Mesh Pipeline (double-sided)",
            wgpu::PrimitiveTopology::TriangleList,
            None,
        );
        let line_pipeline = pipeline("Mesh Line Pipeline", wgpu::PrimitiveTopology::LineList, None);

        let (depth_texture, depth_view) = Self::create_depth_texture(gpu);

        let white = Texture::from_rgba(gpu, &[255, 255, 255, 255], 1, 1, "Default White");
        let default_bind_group = Self::bind_texture(device, &texture_bind_group_layout, &white);

        Self {
            cull_pipeline,
            double_sided_pipeline,
            line_pipeline,
            frame_buffer,
            light_buffer,
            frame_bind_group,
            draw_layout,
            draw_buffer,
            draw_bind_group,
            draw_capacity,
            draw_stride,
            staging: Vec::new(),
            depth_texture,
            depth_view,
            depth_size: (gpu.width(), gpu.height()),
            texture_bind_group_layout,
            default_bind_group,
        }
    }

    fn create_draw_buffer(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        stride: u64,
        capacity: usize,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Draw Uniforms"),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Draw Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<DrawUniforms>() as u64),
                }),
            }],
        });
        (buffer, bind_group)
    }

    fn bind_texture(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        texture: &Texture,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Mesh Texture Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        })
    }

    /// Creates the group 2 bind group for a texture. Cache the result; it stays valid
    /// for the life of the texture.
    pub fn texture_bind_group(&self, gpu: &GpuContext, texture: &Texture) -> wgpu::BindGroup {
        Self::bind_texture(&gpu.device, &self.texture_bind_group_layout, texture)
    }

    fn create_depth_texture(gpu: &GpuContext) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: gpu.width(),
                height: gpu.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }

    /// Recreates the depth buffer if the surface size changed.
    pub fn ensure_depth_size(&mut self, gpu: &GpuContext) {
        if self.depth_size != (gpu.width(), gpu.height()) {
            let (texture, view) = Self::create_depth_texture(gpu);
            self.depth_texture = texture;
            self.depth_view = view;
            self.depth_size = (gpu.width(), gpu.height());
        }
    }

    /// Depth attachment for the scene pass.
    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth_view
    }

    pub fn depth_size(&self) -> (u32, u32) {
        (self.depth_texture.width(), self.depth_texture.height())
    }

    /// Uploads frame, light and per-draw uniforms. Call before the render pass begins.
    pub fn prepare(
        &mut self,
        gpu: &GpuContext,
        frame: &FrameUniforms,
        lights: &LightUniforms,
        draws: &[DrawCall],
    ) {
        gpu.queue
            .write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(frame));
        gpu.queue
            .write_buffer(&self.light_buffer, 0, bytemuck::bytes_of(lights));

        if draws.is_empty() {
            return;
        }

        if draws.len() > self.draw_capacity {
            let capacity = draws.len().next_power_of_two();
            let (buffer, bind_group) =
                Self::create_draw_buffer(&gpu.device, &self.draw_layout, self.draw_stride, capacity);
            self.draw_buffer = buffer;
            self.draw_bind_group = bind_group;
            self.draw_capacity = capacity;
            log::debug!("draw uniform buffer grown to {capacity} slots");
        }

        let stride = self.draw_stride as usize;
        self.staging.clear();
        self.staging.resize(stride * draws.len(), 0);
        for (slot, draw) in self.staging.chunks_exact_mut(stride).zip(draws) {
            let uniforms = DrawUniforms::new(draw.matrix, &draw.material, draw.texture.is_some());
            let bytes = bytemuck::bytes_of(&uniforms);
            slot[..bytes.len()].copy_from_slice(bytes);
        }
        gpu.queue.write_buffer(&self.draw_buffer, 0, &self.staging);
    }

    /// Records every draw. `draws` must be the slice passed to [`prepare`](Self::prepare).
    pub fn render(&self, render_pass: &mut wgpu::RenderPass, draws: &[DrawCall]) {
        render_pass.set_bind_group(0, &self.frame_bind_group, &[]);

        for (i, draw) in draws.iter().enumerate().take(self.draw_capacity) {
            let (pipeline, indices, count) = if draw.material.wireframe {
                (&self.line_pipeline, &draw.mesh.edge_buffer, draw.mesh.edge_count)
            } else if draw.material.double_sided {
                (&self.double_sided_pipeline, &draw.mesh.index_buffer, draw.mesh.index_count)
            } else {
                (&self.cull_pipeline, &draw.mesh.index_buffer, draw.mesh.index_count)
            };
            if count == 0 {
                continue;
            }

            render_pass.set_pipeline(pipeline);
            render_pass.set_bind_group(1, &self.draw_bind_group, &[(i as u64 * self.draw_stride) as u32]);
            render_pass.set_bind_group(2, draw.texture.unwrap_or(&self.default_bind_group), &[]);
            render_pass.set_vertex_buffer(0, draw.mesh.vertex_buffer.slice(..));
            render_pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..count, 0, 0..1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use glam::Vec3;

    #[test]
    fn uniform_sizes_are_vec4_multiples() {
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 112);
        assert_eq!(std::mem::size_of::<DrawUniforms>(), 176);
    }

    #[test]
    fn draw_stride_respects_alignment() {
        assert_eq!(aligned_stride(176, 256), 256);
        assert_eq!(aligned_stride(256, 256), 256);
        assert_eq!(aligned_stride(300, 256), 512);
    }

    #[test]
    fn draw_uniforms_carry_material_flags() {
        let material = Material::basic(Color::WHITE).repeat(4.0, 2.0);
        let u = DrawUniforms::new(Mat4::from_translation(Vec3::X), &material, true);
        assert_eq!(u.material[2], 1.0);
        assert_eq!(u.material[3], 1.0);
        assert_eq!(&u.extra[..2], &[4.0, 2.0]);
        assert_eq!(u.model[3], [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn frame_uniforms_encode_fog_and_exposure() {
        let camera = Camera::default();
        let fog = Fog::linear(Color::BLACK, 40.0, 120.0);
        let exposure = Exposure {
            exposure: 1.5,
            tone_mapping: true,
        };
        let u = FrameUniforms::new(&camera, 2.0, Some(fog), exposure);
        assert_eq!(u.fog_color[3], 1.0);
        assert_eq!(u.params, [40.0, 120.0, 1.5, 1.0]);
        assert_eq!(u.camera[3], 2.0);

        let plain = FrameUniforms::new(&camera, 0.0, None, Exposure::default());
        assert_eq!(plain.fog_color[3], 0.0);
        assert_eq!(plain.params[3], 0.0);
    }
}
