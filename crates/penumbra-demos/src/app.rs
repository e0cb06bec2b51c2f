use penumbra_engine::core::{App, AppControl, FrameCtx};
use penumbra_engine::input::Key;
use penumbra_engine::render::DeferredRenderer;

use crate::demo::Demo;
use crate::scene::SceneState;

/// Runs one [`Demo`] through the deferred renderer.
pub struct DemoApp {
    demo: Box<dyn Demo>,
    renderer: DeferredRenderer,
    scene: SceneState,
}

impl DemoApp {
    pub fn new(demo: Box<dyn Demo>) -> Self {
        log::info!("demo: {} (Space: next camera, Q/Esc: quit)", demo.name());
        Self {
            demo,
            renderer: DeferredRenderer::new(),
            scene: SceneState::new(),
        }
    }
}

/// Window title naming the demo and the active camera preset.
fn window_title(demo: &str, camera: &str) -> String {
    format!("penumbra: {demo} ({camera} camera)")
}

impl App for DemoApp {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let input = ctx.input_frame;
        if input.pressed(Key::Q) || input.pressed(Key::Escape) {
            return AppControl::Exit;
        }
        if input.pressed(Key::Space) {
            let preset = self.scene.next_camera();
            log::info!("camera: {}", preset.name);
            ctx.runtime.set_title(window_title(self.demo.name(), preset.name));
        }

        self.scene.advance(ctx.time.dt, ctx.window.aspect_ratio());

        let (demo, renderer, scene) = (&mut self.demo, &mut self.renderer, &self.scene);
        let result = ctx.render(|rctx, target| {
            demo.prepare(rctx);
            demo.update(scene)?;
            renderer.render(rctx, target, demo.frame())
        });

        match result {
            Ok(control) => control,
            Err(err) => {
                ctx.runtime.fail(err.context(format!("{} demo frame failed", self.demo.name())));
                AppControl::Exit
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_names_demo_and_camera() {
        assert_eq!(window_title("grid", "overview"), "penumbra: grid (overview camera)");
    }
}
