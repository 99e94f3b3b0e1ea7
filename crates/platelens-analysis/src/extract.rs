//! Result extraction: raw kernel buffers to typed analysis results.
//!
//! Kernels write per-pixel signals; collaborators want whole-image
//! answers. The aggregation policy is uniform: spatial mean per
//! channel, then [`normalize_signal`] for every field surfaced as a
//! [0, 1] score. Raw heuristic channels may exceed 1 by construction,
//! so normalization happens here, after averaging, not in the kernels.

use std::collections::BTreeMap;
use std::time::Duration;

use platelens_core::ImageBuffer;
use tracing::trace;

/// Clamp an averaged raw signal into [0, 1].
#[inline]
pub fn normalize_signal(x: f32) -> f32 {
    x.min(1.0)
}

/// Dominant color of the photo, as mean RGB converted to HSV.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorProfile {
    /// Mean hue in [0, 1).
    pub hue: f32,
    /// Mean saturation in [0, 1].
    pub saturation: f32,
    /// Mean brightness (HSV value) in [0, 1].
    pub brightness: f32,
}

/// Surface texture summary derived from 3x3 patch variance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureMetrics {
    /// 1 - roughness.
    pub smoothness: f32,
    /// Scaled mean patch variance, in [0, 1].
    pub roughness: f32,
}

/// Coarse nutrition estimate from the heuristic kernel.
///
/// These are explainable color-based proxies, not measurements; the
/// vitamin keys are fixed so downstream consumers see a stable,
/// deterministically ordered map.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatedNutrition {
    /// Estimated calories per serving.
    pub calories: i32,
    /// Vitamin proxy scores keyed by vitamin name.
    pub vitamins: BTreeMap<String, f64>,
}

/// Full analysis result combining nutrition, freshness and texture.
///
/// Immutable once built; holds no device references.
#[derive(Debug, Clone)]
pub struct AdvancedFoodAnalysis {
    /// Dominant color of the input photo.
    pub color_profile: ColorProfile,
    /// Surface texture summary.
    pub texture_metrics: TextureMetrics,
    /// Composite freshness in [0, 1].
    pub freshness_score: f32,
    /// Nutrition proxies.
    pub estimated_nutrition: EstimatedNutrition,
    /// Overall confidence in [0, 1].
    pub confidence: f32,
    /// Wall-clock time spent in kernel dispatches.
    pub processing_time: Duration,
}

/// Consumption guidance derived from the freshness score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    /// Fresh enough to eat now but not to store.
    ConsumeImmediately,
    /// Good for the given number of days.
    ConsumeWithinDays(u32),
    /// Inspect manually before eating.
    CheckBeforeConsuming,
    /// Likely spoiled.
    Discard,
}

/// Freshness assessment of a food photo.
#[derive(Debug, Clone)]
pub struct FreshnessAnalysis {
    /// Composite freshness in [0, 1].
    pub freshness_score: f32,
    /// Confidence in [0, 1], driven by color vibrancy.
    pub confidence: f32,
    /// Human-readable observations, in fixed check order.
    pub indicators: Vec<String>,
    /// Consumption guidance.
    pub recommendation: Recommendation,
}

/// Single-channel edge-strength view for the segmentation collaborator.
#[derive(Debug, Clone)]
pub struct EdgeMap {
    /// Row-major edge strength, one f32 per pixel, unbounded above.
    pub strength: Vec<f32>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl EdgeMap {
    /// Edge strength at `(x, y)`; `None` when out of bounds.
    pub fn at(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.strength[(y as usize) * (self.width as usize) + (x as usize)])
    }

    /// Mean edge strength over the whole image.
    pub fn mean_strength(&self) -> f32 {
        if self.strength.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.strength.iter().map(|&v| v as f64).sum();
        (sum / self.strength.len() as f64) as f32
    }

    /// Maximum edge strength over the whole image.
    pub fn max_strength(&self) -> f32 {
        self.strength
            .iter()
            .fold(0.0f32, |acc, &v| acc.max(v))
    }
}

/// Mean input RGB converted to an HSV color profile.
pub fn color_profile(input: &ImageBuffer) -> ColorProfile {
    let mean_rgb = [
        input.channel_mean(0),
        input.channel_mean(1),
        input.channel_mean(2),
    ];
    let [hue, saturation, brightness] = crate::kernel::rgb_to_hsv(mean_rgb);
    ColorProfile {
        hue,
        saturation,
        brightness,
    }
}

/// Build the full analysis from the nutrition and freshness buffers.
///
/// `nutrition` holds raw (vitamin, protein, carb, density) channels;
/// `freshness` holds (brown, vibrancy, variance, composite).
pub fn advanced_food_analysis(
    input: &ImageBuffer,
    nutrition: &ImageBuffer,
    freshness: &ImageBuffer,
    processing_time: Duration,
) -> AdvancedFoodAnalysis {
    let vitamin_mean = normalize_signal(nutrition.channel_mean(0));
    let protein_mean = normalize_signal(nutrition.channel_mean(1));
    let carb_mean = normalize_signal(nutrition.channel_mean(2));
    let density_mean = nutrition.channel_mean(3);

    let variance_mean = freshness.channel_mean(2);
    let roughness = normalize_signal(variance_mean * 5.0);

    let calories = (320.0 * carb_mean + 180.0 * protein_mean).round() as i32;
    let mut vitamins = BTreeMap::new();
    vitamins.insert("vitamin_a".to_string(), (0.6 * vitamin_mean) as f64);
    vitamins.insert("vitamin_c".to_string(), vitamin_mean as f64);

    trace!(vitamin_mean, protein_mean, carb_mean, "nutrition aggregates");

    AdvancedFoodAnalysis {
        color_profile: color_profile(input),
        texture_metrics: TextureMetrics {
            smoothness: 1.0 - roughness,
            roughness,
        },
        freshness_score: freshness.channel_mean(3),
        estimated_nutrition: EstimatedNutrition { calories, vitamins },
        confidence: normalize_signal(density_mean),
        processing_time,
    }
}

/// Build a freshness assessment from the freshness kernel output.
pub fn freshness_analysis(freshness: &ImageBuffer) -> FreshnessAnalysis {
    let brown_mean = freshness.channel_mean(0);
    let vibrancy_mean = freshness.channel_mean(1);
    let variance_mean = freshness.channel_mean(2);
    let score = freshness.channel_mean(3);

    let mut indicators = Vec::new();
    if brown_mean > 0.5 {
        indicators.push("brown spots detected".to_string());
    }
    if vibrancy_mean < 0.2 {
        indicators.push("dull, faded color".to_string());
    }
    if vibrancy_mean > 0.6 {
        indicators.push("vibrant color".to_string());
    }
    if normalize_signal(variance_mean * 5.0) > 0.8 {
        indicators.push("uneven surface texture".to_string());
    }

    FreshnessAnalysis {
        freshness_score: score,
        confidence: normalize_signal(0.5 + 0.5 * vibrancy_mean),
        indicators,
        recommendation: recommendation_for(score),
    }
}

/// Map a freshness score onto consumption guidance.
pub fn recommendation_for(score: f32) -> Recommendation {
    if score >= 0.8 {
        Recommendation::ConsumeWithinDays(4)
    } else if score >= 0.6 {
        Recommendation::ConsumeWithinDays(2)
    } else if score >= 0.4 {
        Recommendation::ConsumeImmediately
    } else if score >= 0.2 {
        Recommendation::CheckBeforeConsuming
    } else {
        Recommendation::Discard
    }
}

/// Collapse the edge kernel's RGBA output into a single-channel map.
pub fn edge_map(edges: &ImageBuffer) -> EdgeMap {
    let strength = edges
        .data()
        .chunks_exact(platelens_core::image::CHANNELS)
        .map(|px| px[0])
        .collect();
    EdgeMap {
        strength,
        width: edges.width,
        height: edges.height,
    }
}
