//! A row of spheres with different materials under a sun, orbiting colored
//! point lights and one spot light.

use std::f32::consts::TAU;
use std::rc::Rc;

use anyhow::{Context, Result};
use glam::{Mat4, Vec3};

use penumbra_engine::render::mesh::{Mesh, MeshData};
use penumbra_engine::render::passes::DrawBatch;
use penumbra_engine::render::tables::{
    InstanceMatrices, Light, LightTable, MAX_MATERIALS, Material, MaterialId, MaterialTable, Spot,
};
use penumbra_engine::render::{DeferredScene, RenderCtx};

use crate::demo::Demo;
use crate::scene::SceneState;

const AMBIENT: Vec3 = Vec3::splat(0.15);
const SPHERE_RADIUS: f32 = 3.0;
const SPACING: f32 = 8.0;
const ORBIT_RADIUS: f32 = 20.0;

/// Sphere materials, left to right. The ground takes the last slot.
pub fn sphere_materials() -> Vec<Material> {
    vec![
        // matte clay
        Material::new(Vec3::new(0.8, 0.35, 0.2), Vec3::new(0.4, 0.2, 0.1), Vec3::splat(0.05), 4.0),
        // plastic
        Material::new(Vec3::new(0.1, 0.3, 0.8), Vec3::new(0.1, 0.2, 0.5), Vec3::splat(0.6), 32.0),
        // brushed metal
        Material::new(Vec3::splat(0.45), Vec3::splat(0.3), Vec3::splat(0.8), 64.0),
        // jade
        Material::new(Vec3::new(0.35, 0.75, 0.45), Vec3::new(0.2, 0.4, 0.25), Vec3::splat(0.3), 12.0),
        // gold
        Material::new(Vec3::new(0.75, 0.6, 0.2), Vec3::new(0.35, 0.25, 0.05), Vec3::new(0.9, 0.8, 0.5), 96.0),
    ]
}

/// Lights for rig angle `angle`: a sun, three orbiting points and a spot.
pub fn gallery_lights(angle: f32) -> Vec<Light> {
    let mut lights = vec![Light::directional(
        Vec3::new(-0.3, 1.0, 0.4),
        Vec3::splat(0.35),
        Vec3::splat(0.2),
    )];

    let colors = [
        Vec3::new(1.0, 0.3, 0.3),
        Vec3::new(0.3, 1.0, 0.3),
        Vec3::new(0.3, 0.3, 1.0),
    ];
    for (k, color) in colors.into_iter().enumerate() {
        let a = angle * 6.0 + TAU * k as f32 / colors.len() as f32;
        let position = Vec3::new(a.cos() * ORBIT_RADIUS, 6.0, a.sin() * ORBIT_RADIUS);
        lights.push(Light::point(position, color * 0.6, color));
    }

    lights.push(
        Light::point(Vec3::new(0.0, 25.0, 0.0), Vec3::splat(0.9), Vec3::ONE)
            .with_spot(Spot::from_half_angle(Vec3::NEG_Y, 20f32.to_radians(), 8.0)),
    );
    lights
}

pub struct GalleryDemo {
    materials: MaterialTable,
    sphere_ids: Vec<MaterialId>,
    ground_id: MaterialId,
    lights: LightTable,
    batches: Vec<DrawBatch>,
}

impl GalleryDemo {
    pub fn new() -> Result<Self> {
        let mut materials = MaterialTable::new();
        let sphere_ids: Vec<MaterialId> = sphere_materials()
            .into_iter()
            .map(|m| materials.push(m))
            .collect();
        let ground_id = materials.push(Material::grey(0.4, 0.3, 0.1, 8.0));
        debug_assert!(materials.len() <= MAX_MATERIALS);
        materials.build().context("packing gallery materials")?;

        Ok(Self {
            materials,
            sphere_ids,
            ground_id,
            lights: LightTable::new(),
            batches: Vec::new(),
        })
    }

    fn sphere_model(index: usize, count: usize) -> Mat4 {
        let x = (index as f32 - (count - 1) as f32 / 2.0) * SPACING;
        Mat4::from_translation(Vec3::new(x, SPHERE_RADIUS, -10.0))
    }
}

impl Demo for GalleryDemo {
    fn name(&self) -> &'static str {
        "gallery"
    }

    fn prepare(&mut self, ctx: &RenderCtx<'_>) {
        if !self.batches.is_empty() {
            return;
        }
        let ground = Rc::new(Mesh::upload(
            ctx.device,
            "gallery ground",
            &MeshData::ground_plane(60.0, 0.0),
        ));
        let sphere = Rc::new(Mesh::upload(
            ctx.device,
            "gallery sphere",
            &MeshData::uv_sphere(SPHERE_RADIUS, 24, 32),
        ));

        self.batches.push(DrawBatch::new(ground));
        // One batch per material: a batch carries a single material id.
        for _ in &self.sphere_ids {
            self.batches.push(DrawBatch::new(Rc::clone(&sphere)));
        }
    }

    fn update(&mut self, scene: &SceneState) -> Result<()> {
        let camera = scene.camera();
        self.lights
            .build(AMBIENT, &gallery_lights(scene.light_angle()), camera.view)
            .context("packing gallery lights")?;

        let Some((ground, spheres)) = self.batches.split_first_mut() else {
            return Ok(());
        };
        ground
            .set_instances(
                self.ground_id,
                &[InstanceMatrices::new(Mat4::IDENTITY, camera.view, camera.projection)],
            )
            .context("packing gallery ground")?;

        let count = self.sphere_ids.len();
        for (index, (batch, &material)) in spheres.iter_mut().zip(&self.sphere_ids).enumerate() {
            let model = Self::sphere_model(index, count);
            batch
                .set_instances(
                    material,
                    &[InstanceMatrices::new(model, camera.view, camera.projection)],
                )
                .with_context(|| format!("packing gallery sphere {index}"))?;
        }
        Ok(())
    }

    fn frame(&mut self) -> DeferredScene<'_> {
        DeferredScene {
            materials: &mut self.materials,
            lights: &mut self.lights,
            batches: &mut self.batches,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use penumbra_engine::render::shading::{GBufferSample, shade_fragment};

    #[test]
    fn materials_fit_the_block() {
        let demo = GalleryDemo::new().unwrap();
        assert_eq!(demo.materials.len(), sphere_materials().len() + 1);
        assert!(demo.materials.len() <= MAX_MATERIALS);
    }

    #[test]
    fn rig_has_every_light_kind() {
        let lights = gallery_lights(0.0);
        assert!(lights.iter().any(|l| l.is_directional()));
        assert!(lights.iter().any(|l| l.spot.is_some()));
        assert!(lights.iter().any(|l| !l.is_directional() && l.spot.is_none()));
    }

    #[test]
    fn spheres_are_lit_from_above() {
        // Top of the middle sphere, in world space (identity view).
        let top = GalleryDemo::sphere_model(2, 5).transform_point3(Vec3::Y * SPHERE_RADIUS);
        let sample = GBufferSample {
            position: top,
            normal: Vec3::Y,
            material: MaterialId(2).encode(),
        };
        let lit = shade_fragment(&sample, &sphere_materials(), AMBIENT, &gallery_lights(0.0));
        let ambient_only = sphere_materials()[2].ambient * AMBIENT;
        assert!(lit.cmpgt(ambient_only).all(), "{lit:?}");
    }
}
