// Math utilities and the renderer-facing transform type

use glam::{Quat, Vec3};

/// Clamp a value between min and max
///
/// NaN inputs compare false against both bounds and fall through to `min`,
/// so a clamped value is always inside the range.
pub fn clamp<T: PartialOrd>(value: T, min: T, max: T) -> T {
    if value > max {
        max
    } else if value >= min {
        value
    } else {
        min
    }
}

/// Position and orientation of a scene node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    /// Create a transform from a translation only
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::IDENTITY,
        }
    }

    /// Create a transform from translation and rotation
    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(5.0, 0.0, 10.0), 5.0);
        assert_eq!(clamp(-5.0, 0.0, 10.0), 0.0);
        assert_eq!(clamp(15.0, 0.0, 10.0), 10.0);
    }

    #[test]
    fn test_clamp_nan_falls_to_min() {
        assert_eq!(clamp(f32::NAN, 0.0, 1.0), 0.0);
    }

    #[test]
    fn test_default_is_identity() {
        let t = Transform::default();
        assert_eq!(t, Transform::IDENTITY);
        assert_eq!(Transform::from_translation(Vec3::Y).rotation, Quat::IDENTITY);
    }
}
