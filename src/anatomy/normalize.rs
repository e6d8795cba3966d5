use crate::anatomy::bounds::Bounds3;
use crate::anatomy::error::AnatomyError;
use crate::anatomy::organs::OrganId;
use crate::anatomy::raw_asset::RawAsset;
use crate::anatomy::{DEGENERATE_EXTENT_EPSILON, NEUTRAL_EMISSIVE_HEX, hex_color};
use bevy::color::{Color, LinearRgba};
use bevy::math::Vec3;
use bevy::transform::components::Transform;

/// Emissive tint as a colour and a multiplier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Emissive {
    pub color: Color,
    pub intensity: f32,
}

impl Emissive {
    pub const NEUTRAL: Self = Self {
        color: hex_color(NEUTRAL_EMISSIVE_HEX),
        intensity: 0.0,
    };

    pub fn to_linear(self) -> LinearRgba {
        let c = self.color.to_linear();
        LinearRgba::rgb(
            c.red * self.intensity,
            c.green * self.intensity,
            c.blue * self.intensity,
        )
    }
}

pub type Highlight = Emissive;

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedOrgan {
    pub id: OrganId,
    /// Uniform scale plus rig-local placement.
    pub pivot: Transform,
    /// Translation applied to the asset under the pivot; always `-center`.
    pub asset_offset: Vec3,
    pub asset: RawAsset,
    pub baseline_scale: Option<f32>,
    pub baseline_emissive: Emissive,
    pub current_highlight: Option<Highlight>,
}

impl NormalizedOrgan {
    pub fn scale_factor(&self) -> f32 {
        self.pivot.scale.x
    }

    pub fn surface_count(&self) -> usize {
        self.asset.surface_count()
    }

    pub fn emissive(&self) -> Emissive {
        self.current_highlight.unwrap_or(self.baseline_emissive)
    }

    /// Records the current pivot scale as the baseline unless one exists.
    /// Call before any write that changes the pivot scale.
    pub fn ensure_baseline(&mut self) -> f32 {
        *self.baseline_scale.get_or_insert(self.pivot.scale.x)
    }

    pub fn set_uniform_scale(&mut self, scale: f32) {
        self.pivot.scale = Vec3::splat(scale);
    }

    /// Asset bounds after re-centering, in pivot-local space.
    pub fn centered_bounds(&self) -> Option<Bounds3> {
        self.asset
            .local_bounds()
            .map(|bounds| bounds.translated(self.asset_offset))
    }

    /// Asset bounds after re-centering, scaling and placement, in rig space.
    pub fn rig_bounds(&self) -> Option<Bounds3> {
        let affine = self.pivot.compute_affine();
        self.centered_bounds().map(|bounds| bounds.transformed(&affine))
    }
}

pub fn normalize(
    organ: OrganId,
    raw: RawAsset,
    target_size: f32,
    placement: Vec3,
) -> Result<NormalizedOrgan, AnatomyError> {
    if !(target_size.is_finite() && target_size > 0.0) {
        return Err(AnatomyError::InvalidTargetSize(target_size));
    }

    let Some(bounds) = raw.local_bounds() else {
        return Err(AnatomyError::DegenerateAsset {
            label: raw.label.clone(),
            max_extent: 0.0,
        });
    };

    let max_extent = bounds.max_extent();
    if !max_extent.is_finite() || max_extent <= DEGENERATE_EXTENT_EPSILON {
        return Err(AnatomyError::DegenerateAsset {
            label: raw.label.clone(),
            max_extent,
        });
    }

    let scale_factor = target_size / max_extent;
    let pivot = Transform::from_translation(placement).with_scale(Vec3::splat(scale_factor));

    Ok(NormalizedOrgan {
        id: organ,
        pivot,
        asset_offset: -bounds.center(),
        asset: raw,
        baseline_scale: None,
        baseline_emissive: Emissive::NEUTRAL,
        current_highlight: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn box_asset(min: Vec3, max: Vec3) -> RawAsset {
        RawAsset::from_positions("box", vec![min, max])
    }

    #[test]
    fn scales_by_largest_extent() {
        let raw = box_asset(Vec3::new(4.0, -1.0, 7.0), Vec3::new(6.0, 3.0, 8.0));
        let organ = normalize(OrganId::Heart, raw, 2.0, Vec3::new(0.2, 1.8, 0.3)).unwrap();

        assert_relative_eq!(organ.scale_factor(), 0.5);
        assert_eq!(organ.pivot.scale, Vec3::splat(0.5));
        assert_eq!(organ.pivot.translation, Vec3::new(0.2, 1.8, 0.3));
        assert_eq!(organ.asset_offset, -Vec3::new(5.0, 1.0, 7.5));
        assert_eq!(organ.baseline_scale, None);
        assert_eq!(organ.emissive(), Emissive::NEUTRAL);
    }

    #[test]
    fn zero_extent_is_an_error() {
        let raw = box_asset(Vec3::ONE, Vec3::ONE);
        let err = normalize(OrganId::Brain, raw, 2.0, Vec3::ZERO).unwrap_err();
        assert!(matches!(err, AnatomyError::DegenerateAsset { .. }));
    }

    #[test]
    fn asset_without_geometry_is_an_error() {
        let raw = RawAsset::new("hollow");
        let err = normalize(OrganId::Brain, raw, 2.0, Vec3::ZERO).unwrap_err();
        assert!(matches!(err, AnatomyError::DegenerateAsset { .. }));
    }

    #[test]
    fn rejects_non_positive_target_size() {
        let raw = box_asset(Vec3::ZERO, Vec3::ONE);
        assert_eq!(
            normalize(OrganId::Brain, raw.clone(), 0.0, Vec3::ZERO),
            Err(AnatomyError::InvalidTargetSize(0.0))
        );
        assert!(normalize(OrganId::Brain, raw, f32::NAN, Vec3::ZERO).is_err());
    }

    #[test]
    fn renormalizing_the_same_raw_data_is_stable() {
        let raw = box_asset(Vec3::new(-3.0, 0.0, 1.0), Vec3::new(1.0, 2.0, 2.0));
        let first = normalize(OrganId::KidneyL, raw.clone(), 1.2, Vec3::X).unwrap();
        let second = normalize(OrganId::KidneyL, first.asset.clone(), 1.2, Vec3::X).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn baseline_is_recorded_once() {
        let raw = box_asset(Vec3::ZERO, Vec3::splat(2.0));
        let mut organ = normalize(OrganId::Heart, raw, 1.0, Vec3::ZERO).unwrap();

        assert_relative_eq!(organ.ensure_baseline(), 0.5);
        organ.set_uniform_scale(0.9);
        assert_relative_eq!(organ.ensure_baseline(), 0.5);
    }

    #[test]
    fn highlight_intensity_scales_linear_emissive() {
        let glow = Emissive {
            color: Color::WHITE,
            intensity: 0.5,
        };
        let linear = glow.to_linear();
        assert_relative_eq!(linear.red, 0.5);
        assert_relative_eq!(linear.alpha, 1.0);
        assert_eq!(Emissive::NEUTRAL.to_linear(), LinearRgba::rgb(0.0, 0.0, 0.0));
    }

    fn vec3_strategy(range: std::ops::Range<f32>) -> impl Strategy<Value = Vec3> {
        (range.clone(), range.clone(), range).prop_map(|(x, y, z)| Vec3::new(x, y, z))
    }

    proptest! {
        #[test]
        fn centered_asset_sits_on_pivot_origin(
            min in vec3_strategy(-50.0..50.0),
            size in vec3_strategy(0.5..50.0),
            target in 0.1f32..10.0,
        ) {
            let raw = box_asset(min, min + size);
            let organ = normalize(OrganId::Brain, raw, target, Vec3::ZERO).unwrap();
            let centered = organ.centered_bounds().unwrap();

            prop_assert!(centered.center().length() < 1e-3);
        }

        #[test]
        fn scaled_asset_matches_target_size(
            min in vec3_strategy(-50.0..50.0),
            size in vec3_strategy(0.5..50.0),
            target in 0.1f32..10.0,
            placement in vec3_strategy(-5.0..5.0),
        ) {
            let raw = box_asset(min, min + size);
            let organ = normalize(OrganId::Heart, raw, target, placement).unwrap();
            let placed = organ.rig_bounds().unwrap();

            prop_assert!((placed.max_extent() - target).abs() < target * 1e-3);
            prop_assert!((placed.center() - placement).length() < 1e-3 * (1.0 + target));
            prop_assert_eq!(organ.pivot.scale.x, organ.pivot.scale.y);
            prop_assert_eq!(organ.pivot.scale.y, organ.pivot.scale.z);
        }
    }
}
