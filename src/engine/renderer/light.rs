// Scene lights
//
// Plain data read by the renderer every frame; the parameter panel writes
// straight into these fields.

use glam::Vec3;

/// Identifier of a light in a `Lighting` set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LightId(usize);

/// Light type and its type-specific parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    Ambient,
    Hemisphere { ground_color: [f32; 3] },
    Directional,
    Point,
    Spot {
        /// Cone half-angle in radians
        angle: f32,
        /// Edge softness, 0..1
        penumbra: f32,
    },
}

/// A single light
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub name: String,
    pub kind: LightKind,
    pub color: [f32; 3],
    pub intensity: f32,
    pub position: Vec3,
    pub visible: bool,
    pub cast_shadow: bool,
}

impl Light {
    /// Create a white light of the given kind
    pub fn new(name: impl Into<String>, kind: LightKind, intensity: f32) -> Self {
        Self {
            name: name.into(),
            kind,
            color: [1.0, 1.0, 1.0],
            intensity,
            position: Vec3::ZERO,
            visible: true,
            cast_shadow: false,
        }
    }

    /// Set the position
    pub fn at(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position = Vec3::new(x, y, z);
        self
    }

    /// Enable shadow casting
    pub fn casting_shadow(mut self) -> Self {
        self.cast_shadow = true;
        self
    }

    /// Set the initial visibility
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Cone angle of a spot light
    pub fn spot_angle(&self) -> Option<f32> {
        match self.kind {
            LightKind::Spot { angle, .. } => Some(angle),
            _ => None,
        }
    }

    /// Set the cone angle; ignored for non-spot lights
    pub fn set_spot_angle(&mut self, value: f32) {
        if let LightKind::Spot { angle, .. } = &mut self.kind {
            *angle = value;
        }
    }

    /// Penumbra of a spot light
    pub fn spot_penumbra(&self) -> Option<f32> {
        match self.kind {
            LightKind::Spot { penumbra, .. } => Some(penumbra),
            _ => None,
        }
    }

    /// Set the penumbra; ignored for non-spot lights
    pub fn set_spot_penumbra(&mut self, value: f32) {
        if let LightKind::Spot { penumbra, .. } = &mut self.kind {
            *penumbra = value;
        }
    }
}

/// All lights of a scene
#[derive(Debug, Clone, Default)]
pub struct Lighting {
    lights: Vec<Light>,
}

impl Lighting {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a light
    pub fn add(&mut self, light: Light) -> LightId {
        self.lights.push(light);
        LightId(self.lights.len() - 1)
    }

    /// Get a light
    pub fn get(&self, id: LightId) -> Option<&Light> {
        self.lights.get(id.0)
    }

    /// Get a mutable light
    pub fn get_mut(&mut self, id: LightId) -> Option<&mut Light> {
        self.lights.get_mut(id.0)
    }

    /// Find a light by name
    pub fn find(&self, name: &str) -> Option<LightId> {
        self.lights.iter().position(|l| l.name == name).map(LightId)
    }

    /// Lights that contribute to the frame
    pub fn active(&self) -> impl Iterator<Item = &Light> {
        self.lights.iter().filter(|l| l.visible)
    }

    /// Number of lights
    pub fn len(&self) -> usize {
        self.lights.len()
    }

    /// Whether there are no lights
    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }
}
