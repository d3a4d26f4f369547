//! Scene description and the live world built from it.

mod desc;
mod world;

pub use desc::{
    Background, EntityDesc, Exposure, Fog, GlowDesc, LightDesc, ModelDesc, SceneDesc, TextureDesc,
};
pub use world::{Label, Name, RenderMesh, SceneWorld, Spin, TextureSlot};
