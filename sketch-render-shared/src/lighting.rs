/// Baked indirect-lighting environments selectable by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndirectLightPreset {
    NoonGrass = 0,
    DefaultSky = 1,
}

/// Number of SH bands in the baked tables (9 coefficients).
pub const SH_BANDS: u32 = 3;

pub type ShCoefficients = [[f32; 3]; 9];

impl IndirectLightPreset {
    pub fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(Self::NoonGrass),
            1 => Some(Self::DefaultSky),
            _ => None,
        }
    }

    /// Irradiance SH coefficients, ordered L00, L1-1, L10, L11, L2-2, L2-1, L20, L21, L22.
    pub fn coefficients(self) -> &'static ShCoefficients {
        match self {
            Self::NoonGrass => &NOON_GRASS,
            Self::DefaultSky => &DEFAULT_SKY,
        }
    }
}

/// Flatten the coefficients into the 27-float layout the engine takes.
pub fn flatten_sh(sh: &ShCoefficients) -> [f32; 27] {
    let mut out = [0.0; 27];
    for (i, rgb) in sh.iter().enumerate() {
        out[i * 3..i * 3 + 3].copy_from_slice(rgb);
    }
    out
}

static NOON_GRASS: ShCoefficients = [
    [0.623_220_1, 0.886_922_6, 1.255_084_8],
    [-0.210_521_73, -0.270_994_63, -1.099_017_7],
    [0.031_589_826, 0.058_418_597, 0.159_860_53],
    [-0.002_709_596_8, 0.015_904_247, 0.028_695_914],
    [0.016_667_783, 0.026_230_41, 0.010_163_63],
    [-0.040_963_503, -0.050_351_523, -0.101_756_41],
    [-0.136_296_16, -0.140_777_72, -0.183_877_58],
    [-0.034_435_15, -0.051_731_33, -0.113_001_26],
    [-0.294_609_33, -0.345_042_38, -0.550_035_46],
];

// Irradiance, pre-scaled base. Grey, so all channels match.
static DEFAULT_SKY: ShCoefficients = [
    [0.350_047_3; 3],
    [0.155_069_6; 3],
    [0.045_930_672; 3],
    [-0.045_964_867; 3],
    [-0.038_627_006; 3],
    [0.038_441_505; 3],
    [0.010_158_68; 3],
    [-0.026_496_364; 3],
    [0.030_545_883; 3],
];
