use anyhow::{Context, Result};

use super::gbuffer::GBuffer;
use super::passes::{DrawBatch, GeometryPass, LightingPass};
use super::tables::{LightTable, MaterialTable};
use super::{RenderCtx, RenderTarget};

/// Everything one deferred frame reads. Tables must already be built.
pub struct DeferredScene<'a> {
    pub materials: &'a mut MaterialTable,
    pub lights: &'a mut LightTable,
    pub batches: &'a mut [DrawBatch],
}

/// Owns the G-buffer and both passes, and sequences them per frame.
#[derive(Default)]
pub struct DeferredRenderer {
    gbuffer: Option<GBuffer>,
    geometry: GeometryPass,
    lighting: LightingPass,
}

impl DeferredRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Geometry pass into the G-buffer, then lighting into `target`.
    ///
    /// The G-buffer follows the surface size and is verified against the
    /// device limits whenever it is (re)created.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        scene: DeferredScene<'_>,
    ) -> Result<()> {
        self.ensure_gbuffer(ctx)?;
        let Some(gbuffer) = self.gbuffer.as_ref() else { return Ok(()) };

        self.geometry
            .record(ctx.device, ctx.queue, target.encoder, gbuffer, scene.batches);
        self.lighting
            .record(ctx, target, gbuffer, scene.materials, scene.lights);
        Ok(())
    }

    pub fn gbuffer(&self) -> Option<&GBuffer> {
        self.gbuffer.as_ref()
    }

    fn ensure_gbuffer(&mut self, ctx: &RenderCtx<'_>) -> Result<()> {
        let (width, height) = ctx.size;
        let changed = match self.gbuffer.as_mut() {
            Some(gbuffer) => gbuffer.resize(ctx.device, width, height),
            None => {
                log::debug!("creating gbuffer {width}x{height}");
                self.gbuffer = Some(GBuffer::deferred(ctx.device, width, height));
                true
            }
        };

        if changed {
            if let Some(gbuffer) = self.gbuffer.as_ref() {
                gbuffer
                    .verify(&ctx.device.limits())
                    .context("G-buffer is incomplete")?;
            }
        }
        Ok(())
    }
}
