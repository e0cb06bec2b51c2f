//! Grid of objects, each lit by its own colored spot light; the whole light
//! rig turns slowly above the grid.

use std::f32::consts::{FRAC_PI_4, TAU};
use std::rc::Rc;

use anyhow::{Context, Result};
use glam::{Mat4, Vec3};
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

use penumbra_engine::render::mesh::{Mesh, MeshData};
use penumbra_engine::render::passes::DrawBatch;
use penumbra_engine::render::tables::{
    InstanceMatrices, Light, LightTable, Material, MaterialId, MaterialTable, Spot,
};
use penumbra_engine::render::{DeferredScene, RenderCtx};

use crate::demo::Demo;
use crate::scene::SceneState;

pub const GRID_I: usize = 10;
pub const GRID_J: usize = 10;
pub const GRID_SPACING: f32 = 15.0;

const LIGHT_HEIGHT: f32 = 10.0;
const OBJECT_RADIUS: f32 = 2.0;
const GROUND_HALF_EXTENT: f32 = 100.0;
const GROUND_HEIGHT: f32 = -0.1;

const AMBIENT: Vec3 = Vec3::splat(0.2);
const LIGHT_SPECULAR: Vec3 = Vec3::splat(0.5);
const SPOT_EXPONENT: f32 = 16.0;
/// Cosine cutoff, a half angle of roughly 38 degrees.
const SPOT_CUTOFF: f32 = FRAC_PI_4;

/// Offset of cell `(i, j)` from the grid center.
pub fn cell_offset(i: usize, j: usize) -> Vec3 {
    let x = (i as f32 - (GRID_I - 1) as f32 / 2.0) * GRID_SPACING;
    let z = (j as f32 - (GRID_J - 1) as f32 / 2.0) * GRID_SPACING;
    Vec3::new(x, 0.0, z)
}

/// One spot light per cell, hanging above it and pointing down, all turned
/// by `rotation` around the grid center.
pub fn grid_lights(colors: &[Vec3], rotation: Mat4) -> Vec<Light> {
    let mut lights = Vec::with_capacity(GRID_I * GRID_J);
    for i in 0..GRID_I {
        for j in 0..GRID_J {
            let model = rotation * Mat4::from_translation(cell_offset(i, j));
            let position = model.transform_point3(Vec3::new(0.0, LIGHT_HEIGHT, 0.0));
            let direction = model.transform_vector3(Vec3::NEG_Y);
            lights.push(
                Light::point(position, colors[i + GRID_I * j], LIGHT_SPECULAR)
                    .with_spot(Spot::new(direction, SPOT_CUTOFF, SPOT_EXPONENT)),
            );
        }
    }
    lights
}

pub struct GridDemo {
    colors: Vec<Vec3>,
    materials: MaterialTable,
    object_material: MaterialId,
    ground_material: MaterialId,
    lights: LightTable,
    batches: Vec<DrawBatch>,
}

impl GridDemo {
    pub fn new(seed: u64) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        let colors = (0..GRID_I * GRID_J)
            .map(|_| Vec3::new(rng.r#gen(), rng.r#gen(), rng.r#gen()))
            .collect();

        let mut materials = MaterialTable::new();
        let object_material = materials.push(Material::new(
            Vec3::splat(0.7),
            Vec3::splat(0.5),
            Vec3::splat(0.5),
            16.0,
        ));
        let ground_material = materials.push(Material::grey(0.5, 0.5, 0.2, 16.0));
        materials.build().context("packing grid materials")?;

        Ok(Self {
            colors,
            materials,
            object_material,
            ground_material,
            lights: LightTable::new(),
            batches: Vec::new(),
        })
    }

    fn object_models(&self) -> Vec<Mat4> {
        let mut models = Vec::with_capacity(GRID_I * GRID_J);
        for i in 0..GRID_I {
            for j in 0..GRID_J {
                let theta = self.colors[i + GRID_I * j].x * TAU;
                models.push(
                    Mat4::from_translation(cell_offset(i, j) + Vec3::Y * OBJECT_RADIUS)
                        * Mat4::from_rotation_y(theta),
                );
            }
        }
        models
    }
}

impl Demo for GridDemo {
    fn name(&self) -> &'static str {
        "grid"
    }

    fn prepare(&mut self, ctx: &RenderCtx<'_>) {
        if !self.batches.is_empty() {
            return;
        }
        let ground = Rc::new(Mesh::upload(
            ctx.device,
            "grid ground",
            &MeshData::ground_plane(GROUND_HALF_EXTENT, GROUND_HEIGHT),
        ));
        let sphere = Rc::new(Mesh::upload(
            ctx.device,
            "grid sphere",
            &MeshData::uv_sphere(OBJECT_RADIUS, 16, 24),
        ));
        self.batches = vec![DrawBatch::new(ground), DrawBatch::new(sphere)];
    }

    fn update(&mut self, scene: &SceneState) -> Result<()> {
        let camera = scene.camera();

        let lights = grid_lights(&self.colors, scene.light_rotation());
        self.lights
            .build(AMBIENT, &lights, camera.view)
            .context("packing grid lights")?;

        let objects: Vec<InstanceMatrices> = self
            .object_models()
            .into_iter()
            .map(|model| InstanceMatrices::new(model, camera.view, camera.projection))
            .collect();
        let ground = InstanceMatrices::new(Mat4::IDENTITY, camera.view, camera.projection);

        if let [ground_batch, object_batch] = self.batches.as_mut_slice() {
            ground_batch
                .set_instances(self.ground_material, &[ground])
                .context("packing ground instance")?;
            object_batch
                .set_instances(self.object_material, &objects)
                .context("packing grid instances")?;
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
    use penumbra_engine::render::tables::{MAX_INSTANCES, MAX_LIGHTS};

    #[test]
    fn grid_is_centered() {
        assert_eq!(cell_offset(0, 0), Vec3::new(-67.5, 0.0, -67.5));
        assert_eq!(cell_offset(GRID_I - 1, GRID_J - 1), Vec3::new(67.5, 0.0, 67.5));
    }

    #[test]
    fn one_spot_per_cell_fits_the_light_block() {
        let colors = vec![Vec3::ONE; GRID_I * GRID_J];
        let lights = grid_lights(&colors, Mat4::IDENTITY);
        assert_eq!(lights.len(), GRID_I * GRID_J);
        assert!(lights.len() <= MAX_LIGHTS);
        assert!(GRID_I * GRID_J <= MAX_INSTANCES);

        let first = lights[0];
        assert_eq!(first.position.truncate(), Vec3::new(-67.5, LIGHT_HEIGHT, -67.5));
        let spot = first.spot.unwrap();
        assert_eq!(spot.direction, Vec3::NEG_Y);
        assert_eq!(spot.exponent, SPOT_EXPONENT);
    }

    #[test]
    fn rig_rotation_moves_lights_not_their_aim() {
        let colors = vec![Vec3::ONE; GRID_I * GRID_J];
        let turned = grid_lights(&colors, Mat4::from_rotation_y(FRAC_PI_4));
        let light = turned[0];
        assert!((light.position.y - LIGHT_HEIGHT).abs() < 1e-4);
        assert!((light.spot.unwrap().direction - Vec3::NEG_Y).length() < 1e-6);
    }

    #[test]
    fn same_seed_same_colors() {
        let a = GridDemo::new(7).unwrap();
        let b = GridDemo::new(7).unwrap();
        assert_eq!(a.colors, b.colors);
        assert!(a.colors.iter().all(|c| c.min_element() >= 0.0 && c.max_element() < 1.0));
    }

    #[test]
    fn tables_pack_for_every_preset() {
        let mut demo = GridDemo::new(1).unwrap();
        let mut scene = SceneState::new();
        for _ in 0..3 {
            demo.update(&scene).unwrap();
            scene.next_camera();
        }
        assert_eq!(demo.lights.count(), GRID_I * GRID_J);
        assert_eq!(demo.materials.len(), 2);
    }
}
