//! Prism viewer: a ring of lit cubes under an orbiting camera and light.

mod camera;
mod cube;
mod scene;

use anyhow::Result;
use winit::event::WindowEvent;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowId;

use prism_engine::core::{App, AppControl, FrameCtx};
use prism_engine::device::GpuInit;
use prism_engine::logging::{init_logging, LoggingConfig};
use prism_engine::window::{Runtime, RuntimeConfig};

use camera::OrbitCamera;
use scene::CubeScene;

struct ViewerApp {
    camera: OrbitCamera,
    scene: Option<CubeScene>,
}

impl ViewerApp {
    fn new() -> Self {
        Self {
            camera: OrbitCamera::default(),
            scene: None,
        }
    }
}

impl App for ViewerApp {
    fn on_window_event(&mut self, _window_id: WindowId, event: &WindowEvent) -> AppControl {
        match event {
            WindowEvent::KeyboardInput { event, .. }
                if event.state.is_pressed()
                    && event.physical_key == PhysicalKey::Code(KeyCode::Escape) =>
            {
                AppControl::Exit
            }
            _ => AppControl::Continue,
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if self.scene.is_none() {
            self.scene = CubeScene::from_renderer(ctx.renderer);
        }

        // Renderer failed to come up; nothing to draw into.
        let Some(scene) = self.scene.as_mut() else {
            return AppControl::Continue;
        };

        self.camera.aspect = ctx.window.aspect_ratio();
        self.camera.advance(ctx.time.dt);
        scene.animate(ctx.time.elapsed);

        ctx.render(&self.camera, &*scene)
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig {
        title: "prism viewer".to_string(),
        ..Default::default()
    };

    Runtime::run(config, GpuInit::default(), ViewerApp::new())
}
