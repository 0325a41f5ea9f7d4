use super::Backend;

/// Byte size of the camera uniform: one column-major 4x4 `f32` matrix.
pub const CAMERA_UNIFORM_SIZE: u64 = (4 * 16) as u64;

/// Byte size of the light uniform: point-light position as `vec4<f32>` (w = 1).
pub const LIGHT_DATA_SIZE: u64 = (4 * 4) as u64;

/// Supplies the view-projection matrix uploaded each frame.
pub trait Camera {
    /// Column-major view-projection matrix, recomputed on demand.
    fn view_projection(&self) -> [f32; 16];
}

/// An object that records its own draw commands into the frame pass.
pub trait Drawable<B: Backend> {
    fn draw(&self, pass: &mut B::Pass<'_>, device: &B::Handle);
}

/// The world drawn by the frame renderer.
pub trait Scene<B: Backend> {
    /// Point-light position uploaded each frame (`LIGHT_DATA_SIZE` bytes).
    fn point_light_position(&self) -> [f32; 4];

    /// Objects in draw order. The renderer draws every one, in this order.
    fn objects(&self) -> impl Iterator<Item = &dyn Drawable<B>>;
}
