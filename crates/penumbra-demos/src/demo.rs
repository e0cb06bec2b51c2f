use anyhow::Result;
use penumbra_engine::render::{DeferredScene, RenderCtx};

use crate::scene::SceneState;

/// A scene the demo app can drive.
pub trait Demo {
    fn name(&self) -> &'static str;

    /// Creates GPU resources on first call; later calls are cheap.
    fn prepare(&mut self, ctx: &RenderCtx<'_>);

    /// Rebuilds the light and instance tables for the current frame.
    fn update(&mut self, scene: &SceneState) -> Result<()>;

    /// Tables and batches for the renderer.
    fn frame(&mut self) -> DeferredScene<'_>;
}
