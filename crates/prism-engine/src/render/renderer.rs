use anyhow::{Context, Result};
use winit::dpi::PhysicalSize;

use crate::device::SurfaceErrorAction;

use super::{
    BufferOf, Camera, DepthViewOf, DeviceSource, RenderDevice, RenderPassConfig, Scene,
    CAMERA_UNIFORM_SIZE, LIGHT_DATA_SIZE,
};

/// Outcome of [`FrameRenderer::frame`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameStatus {
    /// The renderer is not initialized; no device work was issued.
    Skipped,
    /// The pass was recorded, submitted and presented.
    Presented,
    /// No swapchain image could be acquired; nothing was recorded.
    SurfaceError(SurfaceErrorAction),
}

/// Everything that exists only after a successful init.
struct Initialized<D: RenderDevice> {
    device: D,
    pass: RenderPassConfig<DepthViewOf<D>>,
    camera_buffer: BufferOf<D>,
    light_buffer: BufferOf<D>,
}

/// Renders one pass per frame: uploads camera and light uniforms, then lets
/// every scene object draw itself into a pass that clears color and depth.
///
/// Lifecycle:
/// - [`init`](Self::init) brings up the device and allocates the uniform buffers
/// - [`update`](Self::update) follows surface resizes
/// - [`frame`](Self::frame) renders and presents
///
/// Until `init` succeeds, `update` and `frame` do nothing.
pub struct FrameRenderer<D: RenderDevice> {
    state: Option<Initialized<D>>,
}

impl<D: RenderDevice> Default for FrameRenderer<D> {
    fn default() -> Self {
        Self { state: None }
    }
}

impl<D: RenderDevice> FrameRenderer<D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Brings up the device from `source` and allocates the frame resources.
    ///
    /// Returns `false` (after logging why) when no source is given or no device
    /// can be acquired; the renderer then stays inert.
    pub async fn init<S>(&mut self, source: Option<S>) -> bool
    where
        S: DeviceSource<Device = D>,
    {
        match self.try_init(source).await {
            Ok(()) => true,
            Err(e) => {
                log::error!("frame renderer init failed: {e:#}");
                false
            }
        }
    }

    /// Like [`init`](Self::init), but reports the failure as an error.
    ///
    /// Nothing is allocated unless the device was acquired. On an already
    /// initialized renderer this is a no-op.
    pub async fn try_init<S>(&mut self, source: Option<S>) -> Result<()>
    where
        S: DeviceSource<Device = D>,
    {
        if self.state.is_some() {
            log::warn!("frame renderer already initialized; keeping existing resources");
            return Ok(());
        }

        let source = source.context("missing presentation surface")?;
        let device = source.acquire().await.context("found no gpu device")?;

        let size = device.size();
        let pass = RenderPassConfig::new(device.create_depth_view(size));

        let camera_buffer = device.create_uniform_buffer("prism camera ubo", CAMERA_UNIFORM_SIZE);
        let light_buffer = device.create_uniform_buffer("prism light ubo", LIGHT_DATA_SIZE);

        log::debug!("frame renderer initialized at {}x{}", size.width, size.height);

        self.state = Some(Initialized {
            device,
            pass,
            camera_buffer,
            light_buffer,
        });

        Ok(())
    }

    /// Follows a surface resize: reconfigures the surface and rebinds a fresh
    /// depth/stencil view of the new size.
    ///
    /// A zero-sized surface keeps the previous depth view.
    pub fn update(&mut self, new_size: PhysicalSize<u32>) {
        let Some(state) = self.state.as_mut() else { return };

        state.device.resize(new_size);

        let size = state.device.size();
        if size.width == 0 || size.height == 0 {
            log::debug!("surface is {}x{}; depth target kept", size.width, size.height);
            return;
        }

        let view = state.device.create_depth_view(size);
        state.pass.rebind_depth_view(view);
        log::debug!("depth target recreated at {}x{}", size.width, size.height);
    }

    /// Renders and presents one frame.
    ///
    /// Order: camera upload, light upload, image acquisition, one pass in which
    /// each of `scene.objects()` draws exactly once (scene order, nothing culled
    /// or batched), submission.
    ///
    /// Panics raised by a drawable propagate to the caller.
    pub fn frame<C, S>(&mut self, camera: &C, scene: &S) -> FrameStatus
    where
        C: Camera + ?Sized,
        S: Scene<D::Backend>,
    {
        let Some(state) = self.state.as_mut() else {
            return FrameStatus::Skipped;
        };

        let view_proj = camera.view_projection();
        state
            .device
            .write_buffer(&state.camera_buffer, bytemuck::cast_slice(&view_proj));

        let light = scene.point_light_position();
        state
            .device
            .write_buffer(&state.light_buffer, bytemuck::cast_slice(&light));

        let mut frame = match state.device.begin_frame() {
            Ok(f) => f,
            Err(err) => return FrameStatus::SurfaceError(state.device.handle_surface_error(err)),
        };

        let device = &state.device;
        let handle = device.handle();
        device.record_pass(&mut frame, &state.pass, |pass| {
            for object in scene.objects() {
                object.draw(pass, handle);
            }
        });

        device.submit(frame);
        FrameStatus::Presented
    }

    /// The device, once initialized.
    pub fn device(&self) -> Option<&D> {
        self.state.as_ref().map(|s| &s.device)
    }

    /// Buffer holding the camera view-projection matrix (`CAMERA_UNIFORM_SIZE` bytes).
    pub fn camera_uniform_buffer(&self) -> Option<&BufferOf<D>> {
        self.state.as_ref().map(|s| &s.camera_buffer)
    }

    /// Buffer holding the point-light position (`LIGHT_DATA_SIZE` bytes).
    pub fn light_data_buffer(&self) -> Option<&BufferOf<D>> {
        self.state.as_ref().map(|s| &s.light_buffer)
    }

    pub fn pass_config(&self) -> Option<&RenderPassConfig<DepthViewOf<D>>> {
        self.state.as_ref().map(|s| &s.pass)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::future::Future;
    use std::rc::Rc;

    use super::*;
    use crate::device::surface::classify_surface_error;
    use crate::render::{Backend, ColorAttachmentConfig, Drawable};

    // ── recording device ──────────────────────────────────────────────────

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Resize(u32, u32),
        CreateBuffer { label: String, size: u64 },
        WriteBuffer { label: String, bytes: Vec<u8> },
        CreateDepthView { id: u32, width: u32, height: u32 },
        BeginFrame,
        Pass {
            color: ColorAttachmentConfig,
            depth_view: u32,
            draws: Vec<&'static str>,
        },
        Submit,
    }

    type Log = Rc<RefCell<Vec<Op>>>;

    struct Recording;

    impl Backend for Recording {
        type Buffer = RecordedBuffer;
        type DepthView = u32;
        type Pass<'p> = Vec<&'static str>;
        type Handle = ();
    }

    #[derive(Debug)]
    struct RecordedBuffer {
        label: String,
        size: u64,
    }

    struct RecordingDevice {
        log: Log,
        size: PhysicalSize<u32>,
        next_view: Cell<u32>,
        fail_acquire: bool,
    }

    impl RecordingDevice {
        fn push(&self, op: Op) {
            self.log.borrow_mut().push(op);
        }
    }

    impl RenderDevice for RecordingDevice {
        type Backend = Recording;
        type Frame = ();

        fn handle(&self) -> &() {
            &()
        }

        fn size(&self) -> PhysicalSize<u32> {
            self.size
        }

        fn resize(&mut self, new_size: PhysicalSize<u32>) {
            self.size = new_size;
            self.push(Op::Resize(new_size.width, new_size.height));
        }

        fn create_uniform_buffer(&self, label: &str, size: u64) -> RecordedBuffer {
            self.push(Op::CreateBuffer { label: label.to_string(), size });
            RecordedBuffer { label: label.to_string(), size }
        }

        fn write_buffer(&self, buffer: &RecordedBuffer, data: &[u8]) {
            assert_eq!(data.len() as u64, buffer.size, "partial write to {}", buffer.label);
            self.push(Op::WriteBuffer {
                label: buffer.label.clone(),
                bytes: data.to_vec(),
            });
        }

        fn create_depth_view(&self, size: PhysicalSize<u32>) -> u32 {
            let id = self.next_view.get();
            self.next_view.set(id + 1);
            self.push(Op::CreateDepthView {
                id,
                width: size.width,
                height: size.height,
            });
            id
        }

        fn begin_frame(&self) -> std::result::Result<(), wgpu::SurfaceError> {
            self.push(Op::BeginFrame);
            if self.fail_acquire {
                return Err(wgpu::SurfaceError::Timeout);
            }
            Ok(())
        }

        fn record_pass<F>(&self, _frame: &mut (), config: &RenderPassConfig<u32>, record: F)
        where
            F: FnOnce(&mut <Recording as Backend>::Pass<'_>),
        {
            let mut draws = Vec::new();
            record(&mut draws);
            self.push(Op::Pass {
                color: config.color,
                depth_view: config.depth_stencil.view,
                draws,
            });
        }

        fn submit(&self, _frame: ()) {
            self.push(Op::Submit);
        }

        fn handle_surface_error(&mut self, err: wgpu::SurfaceError) -> SurfaceErrorAction {
            classify_surface_error(&err)
        }
    }

    struct RecordingSource {
        log: Log,
        fail: bool,
        fail_acquire: bool,
    }

    impl RecordingSource {
        fn working(log: &Log) -> Self {
            Self { log: log.clone(), fail: false, fail_acquire: false }
        }
    }

    impl DeviceSource for RecordingSource {
        type Device = RecordingDevice;

        fn acquire(self) -> impl Future<Output = Result<RecordingDevice>> {
            async move {
                anyhow::ensure!(!self.fail, "no adapter available");
                Ok(RecordingDevice {
                    log: self.log,
                    size: PhysicalSize::new(800, 600),
                    next_view: Cell::new(0),
                    fail_acquire: self.fail_acquire,
                })
            }
        }
    }

    // ── collaborators ─────────────────────────────────────────────────────

    struct Named {
        name: &'static str,
        calls: Cell<usize>,
    }

    impl Named {
        fn new(name: &'static str) -> Self {
            Self { name, calls: Cell::new(0) }
        }
    }

    impl Drawable<Recording> for Named {
        fn draw(&self, pass: &mut Vec<&'static str>, _device: &()) {
            self.calls.set(self.calls.get() + 1);
            pass.push(self.name);
        }
    }

    struct TestScene {
        light: [f32; 4],
        objects: Vec<Named>,
    }

    impl TestScene {
        fn with(names: &[&'static str]) -> Self {
            Self {
                light: [1.0, 2.0, 3.0, 1.0],
                objects: names.iter().map(|&n| Named::new(n)).collect(),
            }
        }
    }

    impl Scene<Recording> for TestScene {
        fn point_light_position(&self) -> [f32; 4] {
            self.light
        }

        fn objects(&self) -> impl Iterator<Item = &dyn Drawable<Recording>> {
            self.objects.iter().map(|o| o as &dyn Drawable<Recording>)
        }
    }

    struct FixedCamera([f32; 16]);

    impl Camera for FixedCamera {
        fn view_projection(&self) -> [f32; 16] {
            self.0
        }
    }

    fn camera() -> FixedCamera {
        let mut m = [0.0f32; 16];
        for (i, v) in m.iter_mut().enumerate() {
            *v = i as f32;
        }
        FixedCamera(m)
    }

    fn init_renderer(log: &Log) -> FrameRenderer<RecordingDevice> {
        let mut renderer = FrameRenderer::new();
        assert!(pollster::block_on(renderer.init(Some(RecordingSource::working(log)))));
        renderer
    }

    fn ops(log: &Log) -> Vec<Op> {
        log.borrow().clone()
    }

    // ── init ──────────────────────────────────────────────────────────────

    #[test]
    fn init_without_surface_fails_and_allocates_nothing() {
        let mut renderer = FrameRenderer::<RecordingDevice>::new();
        assert!(!pollster::block_on(renderer.init(None::<RecordingSource>)));
        assert!(!renderer.is_initialized());
        assert!(renderer.camera_uniform_buffer().is_none());
        assert!(renderer.light_data_buffer().is_none());
    }

    #[test]
    fn init_fails_when_no_device_is_available() {
        let log = Log::default();
        let source = RecordingSource { log: log.clone(), fail: true, fail_acquire: false };

        let mut renderer = FrameRenderer::new();
        assert!(!pollster::block_on(renderer.init(Some(source))));

        assert!(!renderer.is_initialized());
        assert!(ops(&log).is_empty());
    }

    #[test]
    fn try_init_reports_missing_surface() {
        let mut renderer = FrameRenderer::<RecordingDevice>::new();
        let err = pollster::block_on(renderer.try_init(None::<RecordingSource>)).unwrap_err();
        assert!(format!("{err:#}").contains("missing presentation surface"));
    }

    #[test]
    fn init_allocates_fixed_size_uniform_buffers() {
        let log = Log::default();
        let renderer = init_renderer(&log);

        assert_eq!(renderer.camera_uniform_buffer().map(|b| b.size), Some(64));
        assert_eq!(renderer.light_data_buffer().map(|b| b.size), Some(LIGHT_DATA_SIZE));
        assert_eq!(
            ops(&log),
            vec![
                Op::CreateDepthView { id: 0, width: 800, height: 600 },
                Op::CreateBuffer { label: "prism camera ubo".into(), size: 64 },
                Op::CreateBuffer { label: "prism light ubo".into(), size: LIGHT_DATA_SIZE },
            ]
        );
    }

    #[test]
    fn second_init_keeps_existing_resources() {
        let log = Log::default();
        let mut renderer = init_renderer(&log);
        let before = ops(&log).len();

        assert!(pollster::block_on(renderer.init(Some(RecordingSource::working(&log)))));
        assert_eq!(ops(&log).len(), before);
    }

    // ── frame ─────────────────────────────────────────────────────────────

    #[test]
    fn frame_before_init_does_nothing() {
        let scene = TestScene::with(&["a", "b"]);
        let mut renderer = FrameRenderer::<RecordingDevice>::new();

        assert_eq!(renderer.frame(&camera(), &scene), FrameStatus::Skipped);
        assert!(scene.objects.iter().all(|o| o.calls.get() == 0));
    }

    #[test]
    fn frame_after_failed_init_does_nothing() {
        let log = Log::default();
        let source = RecordingSource { log: log.clone(), fail: true, fail_acquire: false };
        let mut renderer = FrameRenderer::new();
        pollster::block_on(renderer.init(Some(source)));

        let scene = TestScene::with(&["a"]);
        assert_eq!(renderer.frame(&camera(), &scene), FrameStatus::Skipped);
        assert!(ops(&log).is_empty());
    }

    #[test]
    fn frame_uploads_then_draws_every_object_once_in_order() {
        let log = Log::default();
        let mut renderer = init_renderer(&log);
        log.borrow_mut().clear();

        let cam = camera();
        let scene = TestScene::with(&["floor", "cube", "lamp"]);

        assert_eq!(renderer.frame(&cam, &scene), FrameStatus::Presented);

        assert_eq!(
            ops(&log),
            vec![
                Op::WriteBuffer {
                    label: "prism camera ubo".into(),
                    bytes: bytemuck::cast_slice(&cam.0).to_vec(),
                },
                Op::WriteBuffer {
                    label: "prism light ubo".into(),
                    bytes: bytemuck::cast_slice(&scene.light).to_vec(),
                },
                Op::BeginFrame,
                Op::Pass {
                    color: ColorAttachmentConfig::default(),
                    depth_view: 0,
                    draws: vec!["floor", "cube", "lamp"],
                },
                Op::Submit,
            ]
        );
        assert!(scene.objects.iter().all(|o| o.calls.get() == 1));
    }

    #[test]
    fn empty_scene_still_clears_and_presents() {
        let log = Log::default();
        let mut renderer = init_renderer(&log);
        log.borrow_mut().clear();

        assert_eq!(renderer.frame(&camera(), &TestScene::with(&[])), FrameStatus::Presented);
        assert!(ops(&log).contains(&Op::Pass {
            color: ColorAttachmentConfig::default(),
            depth_view: 0,
            draws: vec![],
        }));
    }

    #[test]
    fn failed_acquisition_records_nothing() {
        let log = Log::default();
        let source = RecordingSource { log: log.clone(), fail: false, fail_acquire: true };
        let mut renderer = FrameRenderer::new();
        assert!(pollster::block_on(renderer.init(Some(source))));
        log.borrow_mut().clear();

        let scene = TestScene::with(&["a"]);
        assert_eq!(
            renderer.frame(&camera(), &scene),
            FrameStatus::SurfaceError(SurfaceErrorAction::SkipFrame)
        );

        let ops = ops(&log);
        assert_eq!(ops.last(), Some(&Op::BeginFrame));
        assert!(!ops.iter().any(|op| matches!(op, Op::Pass { .. } | Op::Submit)));
        assert_eq!(scene.objects[0].calls.get(), 0);
    }

    // ── update ────────────────────────────────────────────────────────────

    #[test]
    fn update_before_init_is_noop() {
        let mut renderer = FrameRenderer::<RecordingDevice>::new();
        renderer.update(PhysicalSize::new(1024, 768));
        assert!(renderer.pass_config().is_none());
    }

    #[test]
    fn update_rebinds_depth_view_and_keeps_color_ops() {
        let log = Log::default();
        let mut renderer = init_renderer(&log);
        let color_before = renderer.pass_config().map(|p| p.color);
        log.borrow_mut().clear();

        renderer.update(PhysicalSize::new(1024, 768));

        assert_eq!(
            ops(&log),
            vec![
                Op::Resize(1024, 768),
                Op::CreateDepthView { id: 1, width: 1024, height: 768 },
            ]
        );
        let pass = renderer.pass_config().unwrap();
        assert_eq!(pass.depth_stencil.view, 1);
        assert_eq!(Some(pass.color), color_before);
        assert_eq!(pass.depth_stencil.depth_ops.load, wgpu::LoadOp::Clear(1.0));
    }

    #[test]
    fn update_to_zero_size_keeps_depth_view() {
        let log = Log::default();
        let mut renderer = init_renderer(&log);
        log.borrow_mut().clear();

        renderer.update(PhysicalSize::new(0, 0));

        assert_eq!(ops(&log), vec![Op::Resize(0, 0)]);
        assert_eq!(renderer.pass_config().map(|p| p.depth_stencil.view), Some(0));
    }

    #[test]
    fn frame_after_update_uses_new_depth_view() {
        let log = Log::default();
        let mut renderer = init_renderer(&log);
        renderer.update(PhysicalSize::new(640, 480));
        log.borrow_mut().clear();

        renderer.frame(&camera(), &TestScene::with(&["a"]));

        assert!(ops(&log).contains(&Op::Pass {
            color: ColorAttachmentConfig::default(),
            depth_view: 1,
            draws: vec!["a"],
        }));
    }
}
