use glam::Vec3;

/// Axis-aligned box in the engine's center / half-extent form.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingBox {
    pub center: [f32; 3],
    pub half_extent: [f32; 3],
}

impl BoundingBox {
    /// Build from two opposite corners given in any order.
    pub fn from_corners(a: [f32; 3], b: [f32; 3]) -> Self {
        let a = Vec3::from_array(a);
        let b = Vec3::from_array(b);
        let min = a.min(b);
        let max = a.max(b);
        Self {
            center: ((max + min) * 0.5).to_array(),
            half_extent: ((max - min) * 0.5).to_array(),
        }
    }

    /// Smallest box containing every point. `None` for an empty slice.
    pub fn from_points(points: &[[f32; 3]]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut min = Vec3::from_array(*first);
        let mut max = min;
        for p in rest {
            let p = Vec3::from_array(*p);
            min = min.min(p);
            max = max.max(p);
        }
        Some(Self::from_corners(min.to_array(), max.to_array()))
    }

    pub fn min(&self) -> [f32; 3] {
        (Vec3::from_array(self.center) - Vec3::from_array(self.half_extent)).to_array()
    }

    pub fn max(&self) -> [f32; 3] {
        (Vec3::from_array(self.center) + Vec3::from_array(self.half_extent)).to_array()
    }
}
