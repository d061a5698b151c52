//! Shared test fixtures.
//!
//! A minimal `Bridge` implementation over a flat plane with a grid of point
//! lights (§9's design note) so the resampling algorithms can be exercised
//! without a real renderer, plus a `RandomSampler` adapter over `rand`.

use glam::{IVec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use restir_core::{Bridge, GiReservoir, RandomSampler};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MockSurface {
    pub position: Vec3,
    pub normal: Vec3,
    pub depth: f32,
    pub material_id: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockMaterial(pub u32);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MockLightInfo {
    pub position: Vec3,
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MockLightSample {
    pub position: Vec3,
    pub intensity: f32,
}

/// A flat `width x height` plane at `z = 0`, normal `+Z`, with a grid of
/// point lights floating above it.
pub struct MockBridge {
    pub width: i32,
    pub height: i32,
    pub lights: Vec<MockLightInfo>,
    pub dead_lights: Vec<u32>,
}

impl MockBridge {
    #[must_use]
    pub fn new(width: i32, height: i32, light_count: u32) -> Self {
        let side = (f64::from(light_count)).sqrt().ceil() as i32;
        let lights = (0..light_count)
            .map(|i| {
                let x = (i as i32 % side.max(1)) as f32;
                let y = (i as i32 / side.max(1)) as f32;
                MockLightInfo {
                    position: Vec3::new(x * 2.0, y * 2.0, 3.0),
                    intensity: 10.0,
                }
            })
            .collect();
        Self { width, height, lights, dead_lights: Vec::new() }
    }

    fn in_bounds(&self, pixel: IVec2) -> bool {
        pixel.x >= 0 && pixel.x < self.width && pixel.y >= 0 && pixel.y < self.height
    }
}

impl Bridge for MockBridge {
    type Surface = MockSurface;
    type Material = MockMaterial;
    type LightInfo = MockLightInfo;
    type LightSample = MockLightSample;

    fn get_gbuffer_surface(&self, pixel: IVec2, _previous_frame: bool) -> Option<MockSurface> {
        if !self.in_bounds(pixel) {
            return None;
        }
        Some(MockSurface {
            position: Vec3::new(pixel.x as f32, pixel.y as f32, 0.0),
            normal: Vec3::Z,
            depth: 10.0,
            material_id: 0,
        })
    }

    fn is_surface_valid(&self, _surface: &MockSurface) -> bool {
        true
    }

    fn surface_normal(&self, surface: &MockSurface) -> Vec3 {
        surface.normal
    }

    fn surface_world_pos(&self, surface: &MockSurface) -> Vec3 {
        surface.position
    }

    fn surface_linear_depth(&self, surface: &MockSurface) -> f32 {
        surface.depth
    }

    fn get_material(&self, surface: &MockSurface) -> MockMaterial {
        MockMaterial(surface.material_id)
    }

    fn materials_similar(&self, a: &MockMaterial, b: &MockMaterial) -> bool {
        a.0 == b.0
    }

    fn load_light_info(&self, index: u32, _previous_frame: bool) -> Option<MockLightInfo> {
        self.lights.get(index as usize).copied()
    }

    fn translate_light_index(&self, index: u32, _current_to_previous: bool) -> Option<u32> {
        if self.dead_lights.contains(&index) || index as usize >= self.lights.len() {
            None
        } else {
            Some(index)
        }
    }

    fn sample_polymorphic_light(&self, light: &MockLightInfo, _surface: &MockSurface, _uv: (f32, f32)) -> MockLightSample {
        // A point light has no area to parameterize by uv.
        MockLightSample { position: light.position, intensity: light.intensity }
    }

    fn light_sample_target_pdf(&self, light_sample: &MockLightSample, surface: &MockSurface) -> f32 {
        let to_light = light_sample.position - surface.position;
        let dist2 = to_light.length_squared().max(1e-4);
        let cos_theta = to_light.normalize().dot(surface.normal).max(0.0);
        light_sample.intensity * cos_theta / dist2
    }

    fn gi_sample_target_pdf(&self, sample: &GiReservoir, surface: &MockSurface) -> f32 {
        let to_sample = sample.position - surface.position;
        let dist2 = to_sample.length_squared().max(1e-4);
        let cos_theta = to_sample.normalize().dot(surface.normal).max(0.0);
        let luminance = restir_core::encoding::luminance(sample.radiance);
        luminance * cos_theta / dist2
    }

    fn conservative_visibility(&self, _surface: &MockSurface, _light_sample: &MockLightSample) -> bool {
        true
    }

    fn temporal_conservative_visibility(
        &self,
        _current_surface: &MockSurface,
        _previous_surface: &MockSurface,
        _light_sample: &MockLightSample,
    ) -> bool {
        true
    }

    fn clamp_sample_position_into_view(&self, pixel: IVec2, _previous_frame: bool) -> IVec2 {
        IVec2::new(pixel.x.clamp(0, self.width - 1), pixel.y.clamp(0, self.height - 1))
    }
}

/// Adapts `rand`'s `StdRng` to [`RandomSampler`] for deterministic,
/// reproducible tests.
pub struct MockRng(pub StdRng);

impl MockRng {
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl RandomSampler for MockRng {
    fn next_f32(&mut self) -> f32 {
        self.0.random::<f32>()
    }
}
