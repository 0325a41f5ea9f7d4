use std::rc::Rc;

use glam::{Mat4, Vec3};

use prism_engine::device::{Gpu, WgpuBackend};
use prism_engine::render::{Drawable, FrameRenderer, Scene};

use crate::cube::{Cube, CubeMaterial};

/// Radius and height of the light's circular path.
const LIGHT_ORBIT_RADIUS: f32 = 4.0;
const LIGHT_HEIGHT: f32 = 3.0;

/// A floor slab with a ring of colored cubes, lit by one orbiting point light.
pub struct CubeScene {
    cubes: Vec<Cube>,
    light: Vec3,
}

impl CubeScene {
    /// Builds the scene on top of an initialized renderer's device and uniforms.
    ///
    /// Returns `None` while the renderer is not initialized.
    pub fn from_renderer(renderer: &FrameRenderer<Gpu<'_>>) -> Option<Self> {
        let gpu = renderer.device()?;
        let camera_ubo = renderer.camera_uniform_buffer()?;
        let light_ubo = renderer.light_data_buffer()?;

        let device = gpu.device();
        let material = Rc::new(CubeMaterial::new(device, gpu.surface_format()));

        let cube = |transform: Mat4, color: [f32; 4]| {
            Cube::new(device, material.clone(), camera_ubo, light_ubo, transform, color)
        };

        let mut cubes = vec![cube(
            Mat4::from_scale_rotation_translation(
                Vec3::new(8.0, 0.2, 8.0),
                glam::Quat::IDENTITY,
                Vec3::new(0.0, -0.6, 0.0),
            ),
            [0.8, 0.8, 0.8, 1.0],
        )];

        cubes.extend(ring_positions(6, 2.5).into_iter().zip(PALETTE.iter().cycle()).map(
            |(pos, color)| cube(Mat4::from_translation(pos), *color),
        ));

        log::info!("scene ready: {} objects", cubes.len());

        Some(Self {
            cubes,
            light: light_position(0.0),
        })
    }

    /// Moves the light along its orbit; `elapsed` is in seconds.
    pub fn animate(&mut self, elapsed: f32) {
        self.light = light_position(elapsed);
    }
}

impl Scene<WgpuBackend> for CubeScene {
    fn point_light_position(&self) -> [f32; 4] {
        self.light.extend(1.0).to_array()
    }

    fn objects(&self) -> impl Iterator<Item = &dyn Drawable<WgpuBackend>> {
        self.cubes.iter().map(|c| c as &dyn Drawable<WgpuBackend>)
    }
}

const PALETTE: [[f32; 4]; 3] = [
    [0.90, 0.30, 0.25, 1.0],
    [0.25, 0.65, 0.90, 1.0],
    [0.95, 0.80, 0.30, 1.0],
];

fn ring_positions(count: usize, radius: f32) -> Vec<Vec3> {
    (0..count)
        .map(|i| {
            let angle = i as f32 / count as f32 * std::f32::consts::TAU;
            Vec3::new(radius * angle.cos(), 0.0, radius * angle.sin())
        })
        .collect()
}

fn light_position(elapsed: f32) -> Vec3 {
    let (s, c) = (elapsed * 0.8).sin_cos();
    Vec3::new(LIGHT_ORBIT_RADIUS * c, LIGHT_HEIGHT, LIGHT_ORBIT_RADIUS * s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_is_evenly_spaced_on_the_circle() {
        let ring = ring_positions(6, 2.5);
        assert_eq!(ring.len(), 6);
        for p in &ring {
            assert!((p.length() - 2.5).abs() < 1e-5);
            assert_eq!(p.y, 0.0);
        }
        let step = ring[0].distance(ring[1]);
        assert!((ring[3].distance(ring[4]) - step).abs() < 1e-5);
    }

    #[test]
    fn light_stays_on_its_orbit() {
        for t in [0.0, 1.3, 7.9] {
            let p = light_position(t);
            assert_eq!(p.y, LIGHT_HEIGHT);
            assert!((Vec3::new(p.x, 0.0, p.z).length() - LIGHT_ORBIT_RADIUS).abs() < 1e-4);
        }
    }
}
