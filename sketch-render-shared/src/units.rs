use glam::DVec3;

/// Sketch units in one meter.
pub const ONE_METER: f64 = 5000.0;

/// Multiplier taking sketch units to engine units (meters).
pub const SKETCH_TO_ENGINE_SCALE: f64 = 1.0 / ONE_METER;

/// Row-major 3x3 rotation taking the sketch Z-up frame into the engine's Y-up frame.
pub const SKETCH_TO_ENGINE_AXES: [f32; 9] = [
    1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, //
    0.0, -1.0, 0.0,
];

/// Converts sketch-space values into engine space for a given unit scale.
///
/// Every position goes through [`UnitConverter::point`], never through
/// per-component scalar calls, so an axis remap only has to change that one
/// function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitConverter {
    one_meter: f64,
}

impl UnitConverter {
    pub const fn new(one_meter: f64) -> Self {
        Self { one_meter }
    }

    pub fn one_meter(&self) -> f64 {
        self.one_meter
    }

    /// Sketch length to engine length.
    pub fn scalar(&self, value: f64) -> f64 {
        value / self.one_meter
    }

    /// Engine length back to sketch length.
    pub fn invert_scalar(&self, value: f64) -> f64 {
        value * self.one_meter
    }

    pub fn point(&self, p: [f64; 3]) -> [f32; 3] {
        let v = DVec3::from_array(p) / self.one_meter;
        v.as_vec3().to_array()
    }

    pub fn invert_point(&self, p: [f32; 3]) -> [f64; 3] {
        (glam::Vec3::from_array(p).as_dvec3() * self.one_meter).to_array()
    }

    /// Convert a row-major 4x4 transform whose translation lives in row 3.
    ///
    /// Rows 0..3 and element `[3][3]` are copied untouched, only the
    /// translation is converted. The result is flattened row by row, which is
    /// the linear layout the engine reads.
    pub fn matrix(&self, rows: &[[f64; 4]; 4]) -> [f32; 16] {
        let mut out = [0.0f32; 16];
        for (row, values) in rows.iter().enumerate().take(3) {
            for (col, v) in values.iter().enumerate() {
                out[row * 4 + col] = *v as f32;
            }
        }

        let translation = self.point([rows[3][0], rows[3][1], rows[3][2]]);
        out[12..15].copy_from_slice(&translation);
        out[15] = rows[3][3] as f32;
        out
    }
}

impl Default for UnitConverter {
    fn default() -> Self {
        Self::new(ONE_METER)
    }
}

pub fn convert_scalar(value: f64) -> f64 {
    value * SKETCH_TO_ENGINE_SCALE
}

pub fn convert_point(p: [f64; 3]) -> [f32; 3] {
    UnitConverter::default().point(p)
}

pub fn convert_matrix(rows: &[[f64; 4]; 4]) -> [f32; 16] {
    UnitConverter::default().matrix(rows)
}

/// Flatten a row-major 4x4 matrix without any conversion.
pub fn flatten_matrix(rows: &[[f64; 4]; 4]) -> [f32; 16] {
    let mut out = [0.0f32; 16];
    for (row, values) in rows.iter().enumerate() {
        for (col, v) in values.iter().enumerate() {
            out[row * 4 + col] = *v as f32;
        }
    }
    out
}
