//! Analysis kernels: reference per-pixel math.
//!
//! Each kernel is a pure function from an input [`ImageBuffer`] (and up
//! to its 3x3 neighborhood, edge-clamped) to one RGBA output value.
//! The functions here are the single numeric source of truth: the CPU
//! dispatcher runs them directly, and the WGSL shaders in
//! [`crate::shaders`] mirror them operation for operation.
//!
//! # Kernels
//!
//! - [`AnalysisKernel::Enhancement`] - food-aware HSV boost + sharpen
//! - [`AnalysisKernel::NutritionHeuristic`] - explainable nutrient proxies
//! - [`AnalysisKernel::Freshness`] - spoilage cues from color/texture
//! - [`AnalysisKernel::EdgeDetection`] - Sobel segmentation strength

use platelens_core::ImageBuffer;

use crate::shaders;

/// The four analysis kernels.
///
/// Kernels are stateless; dispatching one never mutates the input
/// buffer, and the output buffer always matches the input dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisKernel {
    /// Visual optimization of food photos (HSV boost + sharpening).
    Enhancement,
    /// Coarse per-pixel nutrient-category proxies.
    NutritionHeuristic,
    /// Spoilage-risk estimation from color and texture cues.
    Freshness,
    /// Sobel edge strength for food/background segmentation.
    EdgeDetection,
}

impl AnalysisKernel {
    /// All kernels, in compile order.
    pub const ALL: [Self; 4] = [
        Self::Enhancement,
        Self::NutritionHeuristic,
        Self::Freshness,
        Self::EdgeDetection,
    ];

    /// Human-readable kernel name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Enhancement => "enhancement",
            Self::NutritionHeuristic => "nutrition-heuristic",
            Self::Freshness => "freshness",
            Self::EdgeDetection => "edge-detection",
        }
    }

    /// Stable index used for pipeline caching.
    pub fn index(self) -> usize {
        match self {
            Self::Enhancement => 0,
            Self::NutritionHeuristic => 1,
            Self::Freshness => 2,
            Self::EdgeDetection => 3,
        }
    }

    /// WGSL source for this kernel.
    pub fn shader_source(self) -> &'static str {
        match self {
            Self::Enhancement => shaders::ENHANCEMENT,
            Self::NutritionHeuristic => shaders::NUTRITION,
            Self::Freshness => shaders::FRESHNESS,
            Self::EdgeDetection => shaders::EDGE_DETECTION,
        }
    }

    /// Shader entry point name.
    pub fn entry_point(self) -> &'static str {
        match self {
            Self::Enhancement => "enhance_main",
            Self::NutritionHeuristic => "nutrition_main",
            Self::Freshness => "freshness_main",
            Self::EdgeDetection => "edge_main",
        }
    }

    /// Evaluate this kernel at one pixel of the input buffer.
    pub fn eval(self, input: &ImageBuffer, x: u32, y: u32) -> [f32; 4] {
        match self {
            Self::Enhancement => enhance_pixel(input, x, y),
            Self::NutritionHeuristic => nutrition_pixel(input, x, y),
            Self::Freshness => freshness_pixel(input, x, y),
            Self::EdgeDetection => edge_pixel(input, x, y),
        }
    }
}

impl std::fmt::Display for AnalysisKernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Color conversion
// =============================================================================

/// Convert RGB to HSV, all components in [0, 1] (hue in [0, 1)).
pub fn rgb_to_hsv(rgb: [f32; 3]) -> [f32; 3] {
    let [r, g, b] = rgb;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let value = max;
    let saturation = if max > 0.0 { delta / max } else { 0.0 };
    let hue = if delta <= 0.0 {
        0.0
    } else if max == r {
        (((g - b) / delta + 6.0) % 6.0) / 6.0
    } else if max == g {
        ((b - r) / delta + 2.0) / 6.0
    } else {
        ((r - g) / delta + 4.0) / 6.0
    };

    [hue, saturation, value]
}

/// Convert HSV back to RGB via the standard six-sector formula.
pub fn hsv_to_rgb(hsv: [f32; 3]) -> [f32; 3] {
    let [h, s, v] = hsv;
    let h6 = h * 6.0;
    let sector = (h6.floor() as i32).rem_euclid(6);
    let f = h6 - h6.floor();

    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    match sector {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, q],
        _ => [v, p, q],
    }
}

/// Food-specific saturation/value boost.
///
/// Red-yellow hues (ripe produce, cooked food) get the strongest push;
/// greens a lighter one; everything else passes through.
pub fn boost_food_colors(hsv: [f32; 3]) -> [f32; 3] {
    let [h, mut s, mut v] = hsv;
    if (0.0..=0.167).contains(&h) {
        s = (s * 1.15).min(1.0);
        v = (v * 1.05).min(1.0);
    } else if (0.25..=0.417).contains(&h) {
        s = (s * 1.10).min(1.0);
        v = (v * 1.02).min(1.0);
    }
    [h, s, v]
}

// =============================================================================
// Enhancement
// =============================================================================

/// 3x3 sharpening weights, applied to the pre-boost RGB neighborhood.
pub const SHARPEN: [[f32; 3]; 3] = [
    [0.0, -0.5, 0.0],
    [-0.5, 3.0, -0.5],
    [0.0, -0.5, 0.0],
];

/// Enhancement kernel: HSV food boost blended with a light sharpen.
///
/// Out-of-range input channels are defensively clamped, never rejected.
/// Alpha passes through unchanged.
pub fn enhance_pixel(input: &ImageBuffer, x: u32, y: u32) -> [f32; 4] {
    let px = input.sample_clamped(x as i32, y as i32);
    let rgb = [
        px[0].clamp(0.0, 1.0),
        px[1].clamp(0.0, 1.0),
        px[2].clamp(0.0, 1.0),
    ];

    let boosted = hsv_to_rgb(boost_food_colors(rgb_to_hsv(rgb)));

    // Sharpen over the original (pre-boost) RGB neighborhood.
    let mut sharp = [0.0f32; 3];
    for (ky, row) in SHARPEN.iter().enumerate() {
        for (kx, &w) in row.iter().enumerate() {
            if w == 0.0 {
                continue;
            }
            let s = input.sample_clamped(x as i32 + kx as i32 - 1, y as i32 + ky as i32 - 1);
            for c in 0..3 {
                sharp[c] += s[c].clamp(0.0, 1.0) * w;
            }
        }
    }

    let mut out = [0.0f32; 4];
    for c in 0..3 {
        out[c] = (boosted[c] * 0.7 + sharp[c] * 0.3).clamp(0.0, 1.0);
    }
    out[3] = px[3];
    out
}

// =============================================================================
// Nutrition heuristic
// =============================================================================

/// Nutrition-heuristic kernel.
///
/// Writes raw (unclamped) proxies: R = vitamin, G = protein, B = carb,
/// A = density. Normalization to [0, 1] happens in the result
/// extractor, not here.
pub fn nutrition_pixel(input: &ImageBuffer, x: u32, y: u32) -> [f32; 4] {
    let [r, g, b, _] = input.sample_clamped(x as i32, y as i32);

    let greenness = (g - r.max(b)).max(0.0);
    let warmness = (r.max(g) - b).max(0.0);
    let brownness = (2.0 * r.min(g).min(b) - r.max(g).max(b)).max(0.0);
    let lightness = (r + g + b) / 3.0;

    let vitamin = 0.8 * greenness + 0.6 * warmness;
    let protein = 0.9 * brownness + 0.3 * (1.0 - lightness);
    let carb = 0.7 * lightness + 0.4 * brownness;
    let density = (vitamin + protein + carb) / 3.0;

    [vitamin, protein, carb, density]
}

// =============================================================================
// Freshness
// =============================================================================

/// Population variance of the clamped 3x3 patch around `(x, y)`.
///
/// Mean squared deviation from the patch mean, averaged over the three
/// color channels, so a black/white checkerboard patch lands near the
/// per-channel variance of {0, 1} samples (~0.25) rather than three
/// times that.
pub fn patch_variance(input: &ImageBuffer, x: u32, y: u32) -> f32 {
    let mut samples = [[0.0f32; 3]; 9];
    let mut mean = [0.0f32; 3];
    let mut i = 0;
    for ky in -1..=1 {
        for kx in -1..=1 {
            let s = input.sample_clamped(x as i32 + kx, y as i32 + ky);
            samples[i] = [s[0], s[1], s[2]];
            for c in 0..3 {
                mean[c] += s[c];
            }
            i += 1;
        }
    }
    for c in &mut mean {
        *c /= 9.0;
    }

    let mut acc = 0.0;
    for s in &samples {
        let dr = s[0] - mean[0];
        let dg = s[1] - mean[1];
        let db = s[2] - mean[2];
        acc += dr * dr + dg * dg + db * db;
    }
    acc / (9.0 * 3.0)
}

/// Freshness kernel.
///
/// R = brown-spot flag (binary), G = vibrancy, B = 3x3 texture
/// variance, A = composite freshness in [0, 1].
pub fn freshness_pixel(input: &ImageBuffer, x: u32, y: u32) -> [f32; 4] {
    let [r, g, b, _] = input.sample_clamped(x as i32, y as i32);

    let brown = if r > 0.4 && g > 0.25 && b < 0.3 && (r - g) < 0.2 && (g - b) > 0.1 {
        1.0
    } else {
        0.0
    };
    let vibrancy = r.max(g).max(b) - r.min(g).min(b);
    let variance = patch_variance(input, x, y);

    let freshness = 0.4 * vibrancy.clamp(0.0, 1.0)
        + 0.4 * (1.0 - brown)
        + 0.2 * (variance * 5.0).clamp(0.0, 1.0);

    [brown, vibrancy, variance, freshness]
}

// =============================================================================
// Edge detection
// =============================================================================

/// Horizontal Sobel weights.
pub const SOBEL_X: [[f32; 3]; 3] = [
    [-1.0, 0.0, 1.0],
    [-2.0, 0.0, 2.0],
    [-1.0, 0.0, 1.0],
];

/// Vertical Sobel weights.
pub const SOBEL_Y: [[f32; 3]; 3] = [
    [-1.0, -2.0, -1.0],
    [0.0, 0.0, 0.0],
    [1.0, 2.0, 1.0],
];

/// Edge-detection kernel.
///
/// Per-channel Sobel magnitude averaged over RGB, written identically
/// to R, G and B; alpha fixed at 1.0. Magnitude is unbounded above.
pub fn edge_pixel(input: &ImageBuffer, x: u32, y: u32) -> [f32; 4] {
    let mut gx = [0.0f32; 3];
    let mut gy = [0.0f32; 3];

    for ky in 0..3 {
        for kx in 0..3 {
            let s = input.sample_clamped(x as i32 + kx as i32 - 1, y as i32 + ky as i32 - 1);
            for c in 0..3 {
                gx[c] += s[c] * SOBEL_X[ky][kx];
                gy[c] += s[c] * SOBEL_Y[ky][kx];
            }
        }
    }

    let mag = (0..3)
        .map(|c| (gx[c] * gx[c] + gy[c] * gy[c]).sqrt())
        .sum::<f32>()
        / 3.0;

    [mag, mag, mag, 1.0]
}
