use crate::render::gbuffer::GBuffer;
use crate::render::tables::{LIGHT_BLOCK_SIZE, LightTable, MATERIAL_BLOCK_SIZE, MaterialTable};
use crate::render::{RenderCtx, RenderTarget};

use super::{create_shader, uniform_entry};

pub(super) const SHADER_BODY: &str = include_str!("shaders/lighting.wgsl");

/// Shades every pixel of the surface from the G-buffer.
///
/// Expects the G-buffer in [`GBuffer::deferred`] order: position, normal,
/// material.
#[derive(Default)]
pub struct LightingPass {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
    bind_group_layout: Option<wgpu::BindGroupLayout>,

    bind_group: Option<wgpu::BindGroup>,
    // (materials, lights, gbuffer) generations the bind group was built from.
    bind_key: (u64, u64, u64),
}

impl LightingPass {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads both tables and draws a fullscreen triangle into `target`.
    pub fn record(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        gbuffer: &GBuffer,
        materials: &mut MaterialTable,
        lights: &mut LightTable,
    ) {
        self.ensure_pipeline(ctx);
        materials.upload(ctx.device, ctx.queue);
        lights.upload(ctx.device, ctx.queue);
        self.ensure_bindings(ctx, gbuffer, materials, lights);

        let (Some(pipeline), Some(bind_group)) = (self.pipeline.as_ref(), self.bind_group.as_ref())
        else {
            return;
        };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("penumbra lighting pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.draw(0..3, 0..1);
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let shader = create_shader(ctx.device, "penumbra lighting shader", SHADER_BODY);

        let float_texture = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: false },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };

        let bind_group_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("penumbra lighting bgl"),
                    entries: &[
                        uniform_entry(0, wgpu::ShaderStages::FRAGMENT, MATERIAL_BLOCK_SIZE),
                        uniform_entry(1, wgpu::ShaderStages::FRAGMENT, LIGHT_BLOCK_SIZE),
                        float_texture(2),
                        float_texture(3),
                        wgpu::BindGroupLayoutEntry {
                            binding: 4,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Texture {
                                sample_type: wgpu::TextureSampleType::Uint,
                                view_dimension: wgpu::TextureViewDimension::D2,
                                multisampled: false,
                            },
                            count: None,
                        },
                    ],
                });

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("penumbra lighting pipeline layout"),
                bind_group_layouts: &[&bind_group_layout],
                immediate_size: 0,
            });

        let pipeline = ctx
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("penumbra lighting pipeline"),
                layout: Some(&pipeline_layout),

                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[],
                },

                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: ctx.surface_format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),

                primitive: wgpu::PrimitiveState::default(),
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            });

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        self.bind_group_layout = Some(bind_group_layout);
        self.bind_group = None;
    }

    fn ensure_bindings(
        &mut self,
        ctx: &RenderCtx<'_>,
        gbuffer: &GBuffer,
        materials: &MaterialTable,
        lights: &LightTable,
    ) {
        let key = (
            materials.buffer().generation(),
            lights.buffer().generation(),
            gbuffer.generation(),
        );
        if self.bind_group.is_some() && self.bind_key == key {
            return;
        }

        let Some(bgl) = self.bind_group_layout.as_ref() else { return };
        let (Some(materials_ubo), Some(lights_ubo)) =
            (materials.buffer().buffer(), lights.buffer().buffer())
        else {
            return;
        };
        let [position, normal, material] = gbuffer.textures() else {
            log::warn!(
                "lighting pass needs 3 G-buffer targets, found {}",
                gbuffer.textures().len()
            );
            self.bind_group = None;
            return;
        };

        self.bind_group = Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("penumbra lighting bind group"),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: materials_ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: lights_ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&position.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&normal.view),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(&material.view),
                },
            ],
        }));
        self.bind_key = key;
    }
}
