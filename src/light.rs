use glam::Vec3;

/// Kind of light source.
///
/// The default shaders treat every light as a point light; the kind is kept
/// so scenes can carry it through to custom materials.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LightKind {
    #[default]
    Point,
    Directional,
    Spot,
}

/// A light in world space. Only the first light of a [`Scene`](crate::Scene)
/// reaches the shaders.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub position: Vec3,
    /// Linear RGB.
    pub color: Vec3,
    pub intensity: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            kind: LightKind::Point,
            position: Vec3::ZERO,
            color: Vec3::ONE,
            intensity: 1.0,
        }
    }
}

impl Light {
    pub fn new() -> Self {
        Self::default()
    }

    /// White point light at `position`.
    pub fn point(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn kind(mut self, kind: LightKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn color(mut self, color: Vec3) -> Self {
        self.color = color;
        self
    }

    pub fn intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }
}
