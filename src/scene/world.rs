//! The live scene: an ECS world plus the CPU-side asset libraries it references.

use glam::{EulerRot, Quat, Vec3};
use hecs::Entity;

use crate::color::Color;
use crate::flicker::LanternGlow;
use crate::geometry::RawGeometry;
use crate::light::Light;
use crate::loader::{AssetRequest, LoadedAsset};
use crate::material::{Material, MeshId, TextureId};
use crate::mesh::Transform;
use crate::model::ModelData;
use crate::picking::{Ray, RayHit, raycast};
use crate::rng::SeededRandom;
use crate::texture::ImageData;

use super::desc::{Background, EntityDesc, Exposure, Fog, GlowDesc, ModelDesc, SceneDesc};

/// Drawable component: geometry plus appearance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderMesh {
    pub mesh: MeshId,
    pub material: Material,
}

/// Lookup key for [`SceneWorld::find`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Name(pub String);

/// Human-readable title, shown when the entity is selected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Label(pub String);

/// Continuous rotation. Angles accumulate and are applied as XYZ Euler angles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spin {
    pub rates: Vec3,
    pub angles: Vec3,
}

/// A texture slot. `image` stays `None` until the file loads.
#[derive(Clone, Debug, Default)]
pub struct TextureSlot {
    pub image: Option<ImageData>,
}

/// ECS world plus geometry and texture libraries.
pub struct SceneWorld {
    pub ecs: hecs::World,
    pub background: Background,
    pub fog: Option<Fog>,
    pub exposure: Exposure,
    meshes: Vec<RawGeometry>,
    textures: Vec<TextureSlot>,
    rng: SeededRandom,
}

impl SceneWorld {
    pub fn new(rng: SeededRandom) -> Self {
        Self {
            ecs: hecs::World::new(),
            background: Background::Solid(Color::BLACK),
            fog: None,
            exposure: Exposure::default(),
            meshes: Vec::new(),
            textures: Vec::new(),
            rng,
        }
    }

    /// Spawns everything in `desc` and returns the asset loads it still needs.
    pub fn build(desc: SceneDesc, rng: SeededRandom) -> (Self, Vec<AssetRequest>) {
        let mut world = Self::new(rng);
        world.background = desc.background;
        world.fog = desc.fog;
        world.exposure = desc.exposure;
        world.meshes = desc.meshes;
        world.textures = vec![TextureSlot::default(); desc.textures.len()];

        for entity in desc.entities {
            world.spawn(entity);
        }
        for light in desc.lights {
            match light.name {
                Some(name) => world.ecs.spawn((light.light, Name(name))),
                None => world.ecs.spawn((light.light,)),
            };
        }

        let mut requests: Vec<AssetRequest> = desc
            .textures
            .into_iter()
            .enumerate()
            .map(|(i, t)| AssetRequest::Texture {
                slot: TextureId(i),
                path: t.path,
            })
            .collect();
        requests.extend(desc.models.into_iter().map(AssetRequest::Model));

        (world, requests)
    }

    pub fn spawn(&mut self, desc: EntityDesc) -> Entity {
        let entity = self.ecs.spawn((
            desc.transform,
            RenderMesh {
                mesh: desc.mesh,
                material: desc.material,
            },
        ));
        // Inserting into an entity spawned just above cannot fail.
        if let Some(collider) = desc.collider {
            let _ = self.ecs.insert_one(entity, collider);
        }
        if let Some(name) = desc.name {
            let _ = self.ecs.insert_one(entity, Name(name));
        }
        if let Some(label) = desc.label {
            let _ = self.ecs.insert_one(entity, Label(label));
        }
        if let Some(rates) = desc.spin {
            let (x, y, z) = desc.transform.rotation.to_euler(EulerRot::XYZ);
            let _ = self.ecs.insert_one(
                entity,
                Spin {
                    rates,
                    angles: Vec3::new(x, y, z),
                },
            );
        }
        entity
    }

    pub fn add_mesh(&mut self, geometry: RawGeometry) -> MeshId {
        self.meshes.push(geometry);
        MeshId(self.meshes.len() - 1)
    }

    pub fn add_texture(&mut self, image: Option<ImageData>) -> TextureId {
        self.textures.push(TextureSlot { image });
        TextureId(self.textures.len() - 1)
    }

    pub fn mesh(&self, id: MeshId) -> Option<&RawGeometry> {
        self.meshes.get(id.0)
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// The image behind a slot, once loaded.
    pub fn texture(&self, id: TextureId) -> Option<&ImageData> {
        self.textures.get(id.0).and_then(|slot| slot.image.as_ref())
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Attaches a finished load. Each asset is self-contained, so results may arrive
    /// in any order.
    pub fn attach(&mut self, asset: LoadedAsset) {
        match asset {
            LoadedAsset::Texture { slot, image } => match self.textures.get_mut(slot.0) {
                Some(entry) => entry.image = Some(image),
                None => log::warn!("texture for unknown slot {} dropped", slot.0),
            },
            LoadedAsset::Model { desc, model } => self.attach_model(&desc, model),
        }
    }

    fn attach_model(&mut self, desc: &ModelDesc, mut model: ModelData) {
        model.place(&desc.placement);

        let images: Vec<Option<TextureId>> = std::mem::take(&mut model.images)
            .into_iter()
            .map(|image| image.map(|image| self.add_texture(Some(image))))
            .collect();

        for part in model.parts {
            let mut material = Material::standard(part.base_color);
            material.texture = part.image.and_then(|i| images.get(i).copied().flatten());
            material.double_sided = part.double_sided;

            let mesh = self.add_mesh(part.geometry);
            let entity = self.ecs.spawn((Transform::new(), RenderMesh { mesh, material }));
            if let Some(name) = &desc.name {
                let _ = self.ecs.insert_one(entity, Name(name.clone()));
            }
        }

        if let Some(glow) = desc.glow {
            self.spawn_glow(desc, glow);
        }
        log::debug!("attached model {}", desc.path.display());
    }

    fn spawn_glow(&mut self, desc: &ModelDesc, glow: GlowDesc) {
        let height = desc.placement.fit.target_height().unwrap_or(1.0);
        let position = desc.placement.anchor() + Vec3::Y * height * glow.height_fraction;
        let light = Light::point(glow.color, glow.intensity, position, glow.range).with_decay(glow.decay);
        if glow.flicker {
            let flicker = LanternGlow::random(glow.intensity, &mut self.rng);
            self.ecs.spawn((light, flicker));
        } else {
            self.ecs.spawn((light,));
        }
    }

    /// First entity with the given name.
    pub fn find(&self, name: &str) -> Option<Entity> {
        self.ecs
            .query::<&Name>()
            .iter()
            .find(|(_, n)| n.0 == name)
            .map(|(entity, _)| entity)
    }

    pub fn label(&self, entity: Entity) -> Option<String> {
        self.ecs.get::<&Label>(entity).ok().map(|l| l.0.clone())
    }

    pub fn transform(&self, entity: Entity) -> Option<Transform> {
        self.ecs.get::<&Transform>(entity).ok().map(|t| *t)
    }

    /// Sets the intensity of the light named `name`. Returns `false` if there is none.
    pub fn set_light_intensity(&mut self, name: &str, intensity: f32) -> bool {
        let mut found = false;
        for (_, (light, n)) in self.ecs.query_mut::<(&mut Light, &Name)>() {
            if n.0 == name {
                light.set_intensity(intensity);
                found = true;
            }
        }
        found
    }

    pub fn light_intensity(&self, name: &str) -> Option<f32> {
        self.ecs
            .query::<(&Light, &Name)>()
            .iter()
            .find(|(_, (_, n))| n.0 == name)
            .map(|(_, (light, _))| light.intensity())
    }

    /// Applies `edit` to the material of every entity named `name` and returns how
    /// many were changed.
    pub fn edit_materials(&mut self, name: &str, mut edit: impl FnMut(&mut Material)) -> usize {
        let mut count = 0;
        for (_, (render, n)) in self.ecs.query_mut::<(&mut RenderMesh, &Name)>() {
            if n.0 == name {
                edit(&mut render.material);
                count += 1;
            }
        }
        count
    }

    /// Every light, in spawn order.
    pub fn lights(&self) -> Vec<Light> {
        let mut lights: Vec<(Entity, Light)> = self
            .ecs
            .query::<&Light>()
            .iter()
            .map(|(entity, light)| (entity, *light))
            .collect();
        lights.sort_by_key(|(entity, _)| entity.id());
        lights.into_iter().map(|(_, light)| light).collect()
    }

    /// Advances every [`Spin`] by `dt` seconds.
    pub fn advance_spins(&mut self, dt: f32) {
        for (_, (transform, spin)) in self.ecs.query_mut::<(&mut Transform, &mut Spin)>() {
            spin.angles += spin.rates * dt;
            transform.rotation =
                Quat::from_euler(EulerRot::XYZ, spin.angles.x, spin.angles.y, spin.angles.z);
        }
    }

    /// Sets every flickering glow to its intensity at `time`.
    pub fn animate_flicker(&mut self, time: f32) {
        for (_, (light, glow)) in self.ecs.query_mut::<(&mut Light, &LanternGlow)>() {
            light.set_intensity(glow.intensity(time));
        }
    }

    /// Nearest collider hit.
    pub fn raycast(&self, ray: &Ray) -> Option<RayHit> {
        raycast(&self.ecs, ray)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ModelFit, ModelPart, ModelPlacement};
    use crate::picking::Collider;

    fn cube_model() -> ModelData {
        ModelData {
            parts: vec![ModelPart {
                geometry: RawGeometry::cuboid(1.0, 2.0, 1.0, 1),
                base_color: Color::WHITE,
                image: Some(0),
                double_sided: false,
            }],
            images: vec![Some(ImageData::solid([255, 0, 0, 255]))],
        }
    }

    fn lantern_desc() -> ModelDesc {
        ModelDesc::new(
            "models/lanterns/lantern.glb",
            ModelPlacement::new(ModelFit::Height(1.4), Vec3::new(-5.0, 3.8, -12.95)),
        )
        .glow(GlowDesc {
            color: Color::hex(0xffc58f),
            intensity: 1.2,
            range: 12.0,
            decay: 2.0,
            height_fraction: 0.4,
            flicker: true,
        })
    }

    #[test]
    fn build_creates_slots_and_requests() {
        let mut desc = SceneDesc::default();
        let quad = desc.mesh(RawGeometry::plane(2.4, 1.55));
        let art = desc.texture("artworks/0.jpg");
        desc.spawn(
            EntityDesc::new(quad, Material::basic(Color::WHITE).texture(art))
                .collider(Collider::quad(2.4, 1.55))
                .label("Artwork 0"),
        );
        desc.light(Light::ambient(Color::WHITE, 0.35));
        desc.model(lantern_desc());

        let (world, requests) = SceneWorld::build(desc, SeededRandom::new(1));
        assert_eq!(world.texture_count(), 1);
        assert!(world.texture(art).is_none());
        assert_eq!(requests.len(), 2);
        assert!(matches!(requests[0], AssetRequest::Texture { slot, .. } if slot == art));
        assert_eq!(world.lights().len(), 1);
    }

    #[test]
    fn texture_attach_fills_slot() {
        let mut desc = SceneDesc::default();
        let slot = desc.texture("textures/wood.png");
        let (mut world, _) = SceneWorld::build(desc, SeededRandom::new(1));
        world.attach(LoadedAsset::Texture {
            slot,
            image: ImageData::solid([1, 2, 3, 255]),
        });
        assert_eq!(world.texture(slot).map(|i| i.width), Some(1));
    }

    #[test]
    fn lantern_attach_adds_flickering_glow_above_model() {
        let (mut world, _) = SceneWorld::build(SceneDesc::default(), SeededRandom::new(7));
        world.attach(LoadedAsset::Model {
            desc: lantern_desc(),
            model: cube_model(),
        });

        let glows: Vec<(Light, LanternGlow)> = world
            .ecs
            .query::<(&Light, &LanternGlow)>()
            .iter()
            .map(|(_, (l, g))| (*l, *g))
            .collect();
        assert_eq!(glows.len(), 1);
        let (light, glow) = glows[0];
        let expected = Vec3::new(-5.0, 3.8 + 1.4 * 0.4, -12.95);
        assert!((light.position().unwrap() - expected).length() < 1e-5);
        assert_eq!(glow.base, 1.2);

        // The embedded image became a filled texture slot used by the part.
        let (_, render) = world.ecs.query::<&RenderMesh>().iter().next().map(|(e, r)| (e, *r)).unwrap();
        let texture = render.material.texture.unwrap();
        assert!(world.texture(texture).is_some());
    }

    #[test]
    fn flicker_animation_sets_intensity() {
        let (mut world, _) = SceneWorld::build(SceneDesc::default(), SeededRandom::new(3));
        world.attach(LoadedAsset::Model {
            desc: lantern_desc(),
            model: cube_model(),
        });
        world.animate_flicker(12.5);
        for (_, (light, glow)) in world.ecs.query::<(&Light, &LanternGlow)>().iter() {
            assert_eq!(light.intensity(), glow.intensity(12.5));
        }
    }

    #[test]
    fn spin_accumulates_rotation() {
        let mut desc = SceneDesc::default();
        let cube = desc.mesh(RawGeometry::cuboid(1.0, 1.0, 1.0, 1));
        desc.spawn(EntityDesc::new(cube, Material::default()).named("cube").spin(Vec3::new(0.0, 0.6, 0.0)));
        let (mut world, _) = SceneWorld::build(desc, SeededRandom::new(1));
        let entity = world.find("cube").unwrap();

        world.advance_spins(0.5);
        world.advance_spins(0.5);
        let rotation = world.transform(entity).unwrap().rotation;
        assert!(rotation.angle_between(Quat::from_rotation_y(0.6)) < 1e-5);
    }

    #[test]
    fn named_lights_and_materials_can_be_edited() {
        let mut desc = SceneDesc::default();
        let plane = desc.mesh(RawGeometry::plane(18.0, 3.0));
        desc.spawn(EntityDesc::new(plane, Material::standard(Color::WHITE)).named("road"));
        desc.spawn(EntityDesc::new(plane, Material::standard(Color::WHITE)).named("road"));
        desc.named_light("sun", Light::ambient(Color::WHITE, 1.4));
        let (mut world, _) = SceneWorld::build(desc, SeededRandom::new(1));

        assert!(world.set_light_intensity("sun", 2.0));
        assert_eq!(world.light_intensity("sun"), Some(2.0));
        assert!(!world.set_light_intensity("moon", 1.0));

        assert_eq!(world.edit_materials("road", |m| m.roughness = 0.25), 2);
        for (_, render) in world.ecs.query::<&RenderMesh>().iter() {
            assert_eq!(render.material.roughness, 0.25);
        }
    }

    #[test]
    fn find_and_label_lookup() {
        let mut desc = SceneDesc::default();
        let quad = desc.mesh(RawGeometry::plane(1.0, 1.0));
        desc.spawn(EntityDesc::new(quad, Material::default()).named("art").label("Artwork 3"));
        let (world, _) = SceneWorld::build(desc, SeededRandom::new(1));
        let art = world.find("art").unwrap();
        assert_eq!(world.label(art).as_deref(), Some("Artwork 3"));
        assert!(world.find("missing").is_none());
    }
}
