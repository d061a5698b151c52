//! The `RAB_*` callback surface (§6, §9).
//!
//! Everything the resampling algorithms need from the scene — BVH
//! visibility, G-buffer surfaces, light lists, RNG — is deliberately out of
//! scope for this crate (§1). Instead the core is generic over a single
//! [`Bridge`] trait: a capability set the host application implements once,
//! backed by its own BVH/G-buffer/light-list machinery. This mirrors the
//! teacher's own seam between engine core and scene data (`Scene`,
//! `RAB_Surface`-equivalent node lookups) without depending on any of the
//! teacher's concrete GPU types.

use glam::{IVec2, Vec3};

use crate::reservoir::GiReservoir;

/// A source of uniform random numbers (`RAB_RandomSamplerState`).
///
/// The library never constructs its own RNG — every resampling entry
/// point takes a `&mut R: RandomSampler` supplied by the caller, so the
/// per-pixel RNG stream stays under host control (§5's replay
/// requirement for the bias-correction re-walk).
pub trait RandomSampler {
    /// Returns the next uniform random value in `[0, 1)`.
    fn next_f32(&mut self) -> f32;

    /// Returns two independent uniform random values in `[0, 1)`.
    fn next_2d(&mut self) -> (f32, f32) {
        (self.next_f32(), self.next_f32())
    }
}

/// The capability set a host application implements to let this crate
/// drive resampling over its scene (§6's `RAB_*` callbacks).
///
/// Associated types let each host pick its own surface/material/light
/// representations; the trait only requires the operations the resampling
/// algorithms actually call.
pub trait Bridge {
    /// Opaque per-pixel surface description (G-buffer read).
    type Surface: Clone;
    /// Opaque material handle, compared only for similarity.
    type Material;
    /// Opaque light description as stored in the light list.
    type LightInfo: Clone;
    /// A concrete sample drawn from a light (point + direction + pdf, in
    /// host representation).
    type LightSample: Clone;

    /// `RAB_GetGBufferSurface`: fetches the surface at `pixel`, from the
    /// current or previous frame's G-buffer. Returns `None` if there is no
    /// surface there (matches `RAB_EmptySurface`/invalid-surface semantics
    /// via the `Option`, and `IsSurfaceValid` below for the populated case).
    fn get_gbuffer_surface(&self, pixel: IVec2, previous_frame: bool) -> Option<Self::Surface>;

    /// `RAB_IsSurfaceValid`.
    fn is_surface_valid(&self, surface: &Self::Surface) -> bool;

    /// `RAB_GetSurfaceNormal`.
    fn surface_normal(&self, surface: &Self::Surface) -> Vec3;

    /// `RAB_GetSurfaceWorldPos`.
    fn surface_world_pos(&self, surface: &Self::Surface) -> Vec3;

    /// `RAB_GetSurfaceLinearDepth`.
    fn surface_linear_depth(&self, surface: &Self::Surface) -> f32;

    /// `RAB_GetMaterial`.
    fn get_material(&self, surface: &Self::Surface) -> Self::Material;

    /// `RAB_AreMaterialsSimilar`.
    fn materials_similar(&self, a: &Self::Material, b: &Self::Material) -> bool;

    /// `RAB_LoadLightInfo`.
    fn load_light_info(&self, index: u32, previous_frame: bool) -> Option<Self::LightInfo>;

    /// `RAB_TranslateLightIndex`: maps a light index from the previous
    /// frame's light list to the current frame's (or vice-versa). `None`
    /// means the light no longer exists (§4.6 step 6, §8 scenario S5).
    fn translate_light_index(&self, index: u32, current_to_previous: bool) -> Option<u32>;

    /// `RAB_SamplePolymorphicLight`: deterministically reconstructs the
    /// concrete sample a reservoir's stored `(light, uv)` pair refers to.
    /// Resampling never draws a fresh random sample from a light — the
    /// whole point of storing `uv` in the reservoir is that the same
    /// sample point can be re-evaluated against a different surface
    /// without re-rolling the RNG (§4.6 step 8, §4.7 step 6).
    fn sample_polymorphic_light(
        &self,
        light: &Self::LightInfo,
        surface: &Self::Surface,
        uv: (f32, f32),
    ) -> Self::LightSample;

    /// `RAB_GetLightSampleTargetPdfForSurface`.
    fn light_sample_target_pdf(&self, light_sample: &Self::LightSample, surface: &Self::Surface) -> f32;

    /// `RAB_GetGISampleTargetPdfForSurface`.
    fn gi_sample_target_pdf(&self, sample: &GiReservoir, surface: &Self::Surface) -> f32;

    /// `RAB_GetConservativeVisibility`.
    fn conservative_visibility(&self, surface: &Self::Surface, light_sample: &Self::LightSample) -> bool;

    /// `RAB_GetTemporalConservativeVisibility`: a shadow ray traced in the
    /// previous frame's BVH from `previous_surface` to `light_sample`.
    fn temporal_conservative_visibility(
        &self,
        current_surface: &Self::Surface,
        previous_surface: &Self::Surface,
        light_sample: &Self::LightSample,
    ) -> bool;

    /// `RAB_ValidateGISampleWithJacobian`: an additional, host-defined
    /// rejection test layered on top of the `jacobian` finiteness check
    /// this crate already applies (§4.4).
    fn validate_gi_sample_with_jacobian(&self, jacobian: f32) -> bool {
        jacobian.is_finite() && jacobian > 0.0
    }

    /// `RAB_ClampSamplePositionIntoView`: snaps a pixel coordinate that may
    /// have walked outside the render target back into bounds.
    fn clamp_sample_position_into_view(&self, pixel: IVec2, previous_frame: bool) -> IVec2;
}
