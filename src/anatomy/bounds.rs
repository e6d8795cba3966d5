use bevy::math::{Affine3A, Vec3};

/// Axis-aligned box in whatever space its points were given in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds3 {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds3 {
    pub fn from_point(point: Vec3) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// `None` when `points` is empty.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self::from_point(first), |bounds, p| {
            bounds.including(p)
        }))
    }

    pub fn including(self, point: Vec3) -> Self {
        Self {
            min: self.min.min(point),
            max: self.max.max(point),
        }
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn max_extent(&self) -> f32 {
        self.size().max_element()
    }

    pub fn translated(self, offset: Vec3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Bounds of the eight transformed corners.
    pub fn transformed(self, affine: &Affine3A) -> Self {
        let corners = [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ];
        let first = affine.transform_point3(corners[0]);
        corners[1..]
            .iter()
            .fold(Self::from_point(first), |bounds, corner| {
                bounds.including(affine.transform_point3(*corner))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bevy::math::Quat;

    #[test]
    fn empty_point_set_has_no_bounds() {
        assert_eq!(Bounds3::from_points(Vec::<Vec3>::new()), None);
    }

    #[test]
    fn center_and_size_follow_extremes() {
        let bounds = Bounds3::from_points([
            Vec3::new(1.0, -2.0, 0.5),
            Vec3::new(3.0, 2.0, 1.5),
            Vec3::new(2.0, 0.0, 1.0),
        ])
        .unwrap();

        assert_eq!(bounds.center(), Vec3::new(2.0, 0.0, 1.0));
        assert_eq!(bounds.size(), Vec3::new(2.0, 4.0, 1.0));
        assert_eq!(bounds.max_extent(), 4.0);
    }

    #[test]
    fn rotation_swaps_extents() {
        let bounds = Bounds3 {
            min: Vec3::new(-1.0, -2.0, -0.5),
            max: Vec3::new(1.0, 2.0, 0.5),
        };
        let quarter_turn = Affine3A::from_quat(Quat::from_rotation_z(std::f32::consts::FRAC_PI_2));
        let rotated = bounds.transformed(&quarter_turn);

        assert_relative_eq!(rotated.size().x, 4.0, epsilon = 1e-5);
        assert_relative_eq!(rotated.size().y, 2.0, epsilon = 1e-5);
        assert_relative_eq!(rotated.size().z, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn union_covers_both() {
        let a = Bounds3::from_point(Vec3::ZERO);
        let b = Bounds3::from_point(Vec3::new(1.0, -1.0, 2.0));
        let merged = a.union(b);
        assert_eq!(merged.min, Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(merged.max, Vec3::new(1.0, 0.0, 2.0));
    }
}
