use std::rc::Rc;

use crate::render::gbuffer::{DEPTH_FORMAT, GBuffer};
use crate::render::mesh::{Mesh, MeshVertex};
use crate::render::tables::{INSTANCE_BLOCK_SIZE, InstanceMatrices, InstanceTable, MaterialId, TableError};

use super::{create_shader, uniform_entry};

pub(super) const SHADER_BODY: &str = include_str!("shaders/geometry.wgsl");

/// One instanced draw: a mesh, the material it is drawn with and up to
/// `MAX_INSTANCES` transforms.
#[derive(Debug)]
pub struct DrawBatch {
    pub mesh: Rc<Mesh>,
    pub instances: InstanceTable,
    bind_group: Option<wgpu::BindGroup>,
    bind_key: (u64, u64),
}

impl DrawBatch {
    pub fn new(mesh: Rc<Mesh>) -> Self {
        Self {
            mesh,
            instances: InstanceTable::new(),
            bind_group: None,
            bind_key: (0, 0),
        }
    }

    /// Repacks the batch's instance block.
    pub fn set_instances(
        &mut self,
        material: MaterialId,
        instances: &[InstanceMatrices],
    ) -> Result<(), TableError> {
        self.instances.build(material, instances)
    }

    fn ensure_bind_group(
        &mut self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        layout_generation: u64,
    ) {
        let key = (layout_generation, self.instances.buffer().generation());
        if self.bind_group.is_some() && self.bind_key == key {
            return;
        }
        let Some(ubo) = self.instances.buffer().buffer() else { return };

        self.bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("penumbra geometry bind group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.as_entire_binding(),
            }],
        }));
        self.bind_key = key;
    }
}

/// Writes view-space position, normal and material id into a [`GBuffer`].
#[derive(Default)]
pub struct GeometryPass {
    pipeline_formats: Vec<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
    bind_group_layout: Option<wgpu::BindGroupLayout>,
    layout_generation: u64,
}

impl GeometryPass {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads every batch and records the pass into `encoder`.
    pub fn record(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        gbuffer: &GBuffer,
        batches: &mut [DrawBatch],
    ) {
        self.ensure_pipeline(device, &gbuffer.formats());
        let (Some(pipeline), Some(bgl)) = (self.pipeline.as_ref(), self.bind_group_layout.as_ref())
        else {
            return;
        };

        for batch in batches.iter_mut() {
            batch.instances.upload(device, queue);
            batch.ensure_bind_group(device, bgl, self.layout_generation);
        }

        let color_attachments = gbuffer.color_attachments();
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("penumbra geometry pass"),
            color_attachments: &color_attachments,
            depth_stencil_attachment: Some(gbuffer.depth_attachment()),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        for batch in batches.iter() {
            let Some(bind_group) = batch.bind_group.as_ref() else { continue };
            rpass.set_bind_group(0, bind_group, &[]);
            batch.mesh.draw_instances(&mut rpass, batch.instances.instance_count());
        }
    }

    fn ensure_pipeline(&mut self, device: &wgpu::Device, formats: &[wgpu::TextureFormat]) {
        if self.pipeline.is_some() && self.pipeline_formats == formats {
            return;
        }

        let shader = create_shader(device, "penumbra geometry shader", SHADER_BODY);

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("penumbra geometry bgl"),
            entries: &[uniform_entry(
                0,
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                INSTANCE_BLOCK_SIZE,
            )],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("penumbra geometry pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let targets: Vec<Option<wgpu::ColorTargetState>> = formats
            .iter()
            .map(|&format| {
                Some(wgpu::ColorTargetState {
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })
            })
            .collect();

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("penumbra geometry pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[MeshVertex::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &targets,
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        log::debug!("geometry pipeline built for {formats:?}");
        self.pipeline_formats = formats.to_vec();
        self.pipeline = Some(pipeline);
        self.bind_group_layout = Some(bind_group_layout);
        self.layout_generation += 1;
    }
}
