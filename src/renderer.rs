//! Draws a [`SceneWorld`] and the overlay to the window surface.
//!
//! The world only holds CPU data. The renderer uploads meshes and textures the
//! first time it sees them, so geometry and images that arrive from the asset loader
//! mid-session show up on the next frame without any extra bookkeeping.

use std::path::Path;

use crate::assets::{Assets, FontId, SYSTEM_FONT_CANDIDATES, find_font};
use crate::background_pass::BackgroundPass;
use crate::camera::Camera;
use crate::draw2d::Draw2d;
use crate::gpu::GpuContext;
use crate::light::LightUniforms;
use crate::mesh::{Mesh, Transform};
use crate::mesh_pass::{DrawCall, FrameUniforms, MeshPass};
use crate::overlay::OverlayState;
use crate::scene::{RenderMesh, SceneWorld};
use crate::texture::Texture;

/// Pixel size of overlay text.
const FONT_SIZE: f32 = 16.0;

struct GpuTexture {
    // Kept alive for the bind group.
    _texture: Texture,
    bind_group: wgpu::BindGroup,
}

pub struct Renderer {
    mesh_pass: MeshPass,
    background_pass: BackgroundPass,
    draw_2d: Draw2d,
    assets: Assets,
    font: Option<FontId>,
    meshes: Vec<Mesh>,
    textures: Vec<Option<GpuTexture>>,
}

impl Renderer {
    /// Builds the passes and loads the overlay font. A missing or unreadable font is
    /// not fatal: the overlay then draws its boxes without text.
    pub fn new(gpu: &GpuContext, font_path: Option<&Path>) -> Self {
        let mut assets = Assets::new();
        let font = match find_font(font_path, SYSTEM_FONT_CANDIDATES) {
            Some(path) => match assets.load_font(gpu, &path, FONT_SIZE) {
                Ok(id) => Some(id),
                Err(err) => {
                    log::warn!("{err}; overlay text disabled");
                    None
                }
            },
            None => {
                log::warn!("no usable font found (pass --font); overlay text disabled");
                None
            }
        };

        let mut draw_2d = Draw2d::new(gpu);
        draw_2d.update_font_bind_groups(gpu, &assets);

        Self {
            mesh_pass: MeshPass::new(gpu),
            background_pass: BackgroundPass::new(gpu),
            draw_2d,
            assets,
            font,
            meshes: Vec::new(),
            textures: Vec::new(),
        }
    }

    /// Uploads geometry and images the GPU has not seen yet.
    fn sync(&mut self, gpu: &GpuContext, world: &SceneWorld) {
        for index in self.meshes.len()..world.mesh_count() {
            if let Some(geometry) = world.mesh(crate::material::MeshId(index)) {
                self.meshes.push(Mesh::new(gpu, geometry));
            }
        }

        self.textures.resize_with(world.texture_count(), || None);
        for (index, slot) in self.textures.iter_mut().enumerate() {
            if slot.is_some() {
                continue;
            }
            if let Some(image) = world.texture(crate::material::TextureId(index)) {
                let texture = Texture::from_image(gpu, image, &format!("Scene Texture {index}"));
                let bind_group = self.mesh_pass.texture_bind_group(gpu, &texture);
                *slot = Some(GpuTexture {
                    _texture: texture,
                    bind_group,
                });
            }
        }
    }

    /// Renders one frame. Surface loss reconfigures and skips the frame.
    pub fn render(
        &mut self,
        gpu: &GpuContext,
        world: &SceneWorld,
        camera: &Camera,
        overlay: &OverlayState,
        time: f32,
    ) {
        let output = match gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("surface lost, reconfiguring");
                gpu.reconfigure();
                return;
            }
            Err(wgpu::SurfaceError::Timeout) => return,
            Err(err) => {
                log::error!("failed to acquire surface texture: {err}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.sync(gpu, world);
        self.mesh_pass.ensure_depth_size(gpu);

        let mut entities: Vec<(hecs::Entity, Transform, RenderMesh)> = world
            .ecs
            .query::<(&Transform, &RenderMesh)>()
            .iter()
            .map(|(entity, (transform, render))| (entity, *transform, *render))
            .collect();
        entities.sort_by_key(|(entity, _, _)| entity.id());

        let draws: Vec<DrawCall> = entities
            .iter()
            .filter_map(|(_, transform, render)| {
                let mesh = self.meshes.get(render.mesh.index())?;
                let texture = render
                    .material
                    .texture
                    .and_then(|id| self.textures.get(id.index()))
                    .and_then(|slot| slot.as_ref())
                    .map(|t| &t.bind_group);
                Some(DrawCall {
                    mesh,
                    matrix: transform.matrix(),
                    material: render.material,
                    texture,
                })
            })
            .collect();

        let frame = FrameUniforms::new(camera, time, world.fog, world.exposure);
        let lights = world.lights();
        let lights = LightUniforms::pack(&lights);
        self.mesh_pass.prepare(gpu, &frame, &lights, &draws);
        let gradient = self.background_pass.prepare(gpu, &world.background);

        self.draw_2d.clear();
        overlay.draw(
            &mut self.draw_2d,
            &self.assets,
            self.font,
            gpu.width() as f32,
            gpu.height() as f32,
        );

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(world.background.clear_color().to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.mesh_pass.depth_view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if gradient {
                self.background_pass.render(&mut render_pass);
            }
            self.mesh_pass.render(&mut render_pass, &draws);
        }

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Overlay Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.draw_2d.render(gpu, &mut render_pass);
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }
}
