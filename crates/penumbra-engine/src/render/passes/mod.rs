//! Geometry and lighting passes of the deferred pipeline.
//!
//! Shader sources are stored without their capacity constants; every module
//! is compiled from [`shader_prelude`] followed by the pass body so the WGSL
//! array sizes always match the Rust packing code.

mod geometry;
mod lighting;

pub use geometry::{DrawBatch, GeometryPass};
pub use lighting::LightingPass;

use crate::render::shading::BACKGROUND_COLOR;
use crate::render::tables::{MAX_INSTANCES, MAX_LIGHTS, MAX_MATERIALS};

/// WGSL constant declarations shared by both passes.
pub fn shader_prelude() -> String {
    let bg = BACKGROUND_COLOR;
    format!(
        "const MAX_MATERIALS: u32 = {MAX_MATERIALS}u;\n\
         const MAX_LIGHTS: u32 = {MAX_LIGHTS}u;\n\
         const MAX_INSTANCES: u32 = {MAX_INSTANCES}u;\n\
         const BACKGROUND_COLOR: vec3<f32> = vec3<f32>({:?}, {:?}, {:?});\n\n",
        bg.x, bg.y, bg.z
    )
}

pub(crate) fn shader_source(body: &str) -> String {
    let mut src = shader_prelude();
    src.push_str(body);
    src
}

pub(crate) fn create_shader(device: &wgpu::Device, label: &str, body: &str) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(shader_source(body).into()),
    })
}

pub(crate) fn uniform_entry(
    binding: u32,
    visibility: wgpu::ShaderStages,
    min_size: usize,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: wgpu::BufferSize::new(min_size as u64),
        },
        count: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prelude_declares_capacities() {
        let prelude = shader_prelude();
        assert!(prelude.contains("const MAX_MATERIALS: u32 = 8u;"));
        assert!(prelude.contains("const MAX_LIGHTS: u32 = 100u;"));
        assert!(prelude.contains("const MAX_INSTANCES: u32 = 100u;"));
        assert!(prelude.contains("vec3<f32>(0.0, 0.0, 0.0)"));
    }

    #[test]
    fn bodies_use_only_injected_capacities() {
        for body in [geometry::SHADER_BODY, lighting::SHADER_BODY] {
            assert!(!body.contains("const MAX_"), "capacity redeclared in shader body");
        }
        assert!(lighting::SHADER_BODY.contains("array<Material, MAX_MATERIALS>"));
        assert!(lighting::SHADER_BODY.contains("array<Light, MAX_LIGHTS>"));
        assert!(geometry::SHADER_BODY.contains("array<InstanceMatrices, MAX_INSTANCES>"));
    }

    #[test]
    fn source_starts_with_prelude() {
        let src = shader_source(lighting::SHADER_BODY);
        assert!(src.starts_with(&shader_prelude()));
        assert!(src.ends_with(lighting::SHADER_BODY));
    }

    // ── WGSL block layouts ────────────────────────────────────────────────

    use crate::render::tables::{
        INSTANCE_BLOCK_SIZE, INSTANCE_HEADER_SIZE, INSTANCE_STRIDE, LIGHT_BLOCK_SIZE,
        LIGHT_HEADER_SIZE, LIGHT_STRIDE, MATERIAL_BLOCK_SIZE, MATERIAL_STRIDE,
    };

    struct Layouts {
        module: naga::Module,
        layouter: naga::proc::Layouter,
    }

    impl Layouts {
        fn parse(body: &str) -> Self {
            let module = naga::front::wgsl::parse_str(&shader_source(body)).unwrap();
            let mut layouter = naga::proc::Layouter::default();
            layouter.update(module.to_ctx()).unwrap();
            Self { module, layouter }
        }

        fn handle(&self, name: &str) -> naga::Handle<naga::Type> {
            self.module
                .types
                .iter()
                .find(|(_, ty)| ty.name.as_deref() == Some(name))
                .map(|(handle, _)| handle)
                .unwrap_or_else(|| panic!("no struct {name}"))
        }

        /// Byte size of the named type.
        fn size(&self, name: &str) -> usize {
            self.layouter[self.handle(name)].size as usize
        }

        /// Member offsets of the named struct, in declaration order.
        fn offsets(&self, name: &str) -> Vec<usize> {
            match &self.module.types[self.handle(name)].inner {
                naga::TypeInner::Struct { members, .. } => {
                    members.iter().map(|m| m.offset as usize).collect()
                }
                other => panic!("{name} is not a struct: {other:?}"),
            }
        }
    }

    #[test]
    fn material_struct_matches_packed_row() {
        let layouts = Layouts::parse(lighting::SHADER_BODY);
        assert_eq!(layouts.size("Material"), MATERIAL_STRIDE);
        assert_eq!(layouts.offsets("Material"), [0, 16, 32, 44]);
        assert_eq!(layouts.size("Materials"), MATERIAL_BLOCK_SIZE);
    }

    #[test]
    fn light_struct_matches_packed_record() {
        let layouts = Layouts::parse(lighting::SHADER_BODY);
        assert_eq!(layouts.size("Light"), LIGHT_STRIDE);
        assert_eq!(layouts.offsets("Light"), [0, 16, 32, 44, 48, 60, 64]);
        assert_eq!(layouts.offsets("Lights"), [0, 12, LIGHT_HEADER_SIZE]);
        assert_eq!(layouts.size("Lights"), LIGHT_BLOCK_SIZE);
    }

    #[test]
    fn batch_struct_matches_instance_block() {
        let layouts = Layouts::parse(geometry::SHADER_BODY);
        assert_eq!(layouts.size("InstanceMatrices"), INSTANCE_STRIDE);
        assert_eq!(layouts.offsets("InstanceMatrices"), [0, 64, 128]);
        assert_eq!(layouts.offsets("Batch"), [0, INSTANCE_HEADER_SIZE]);
        assert_eq!(layouts.size("Batch"), INSTANCE_BLOCK_SIZE);
    }
}
