//! End-to-end analysis tests on the CPU backend.

use approx::assert_relative_eq;
use platelens_analysis::{
    AnalysisError, Backend, FoodAnalyzer, ImageBuffer, Recommendation,
};

fn analyzer() -> FoodAnalyzer {
    FoodAnalyzer::new(Backend::Cpu).unwrap()
}

fn checkerboard(width: u32, height: u32) -> ImageBuffer {
    let mut img = ImageBuffer::new(width, height).unwrap();
    for y in 0..height {
        for x in 0..width {
            let v = if (x + y) % 2 == 0 { 1.0 } else { 0.0 };
            img.set_pixel(x, y, [v, v, v, 1.0]).unwrap();
        }
    }
    img
}

#[test]
fn test_cpu_backend_available() {
    assert!(Backend::Cpu.is_available());
    assert_eq!(analyzer().backend_name(), "cpu");
}

#[test]
fn test_empty_image_rejected_everywhere() {
    let a = analyzer();
    let empty = ImageBuffer::empty();
    for result in [
        a.enhance(&empty).map(|_| ()),
        a.analyze_nutrition(&empty).map(|_| ()),
        a.analyze_freshness(&empty).map(|_| ()),
        a.edge_map(&empty).map(|_| ()),
    ] {
        assert!(matches!(
            result.unwrap_err(),
            AnalysisError::InvalidImage {
                width: 0,
                height: 0
            }
        ));
    }
}

#[test]
fn test_enhance_output_in_range() {
    // Saturated orange with some out-of-range channels mixed in.
    let mut photo = ImageBuffer::splat([0.9, 0.5, 0.1, 1.0], 32, 24).unwrap();
    photo.set_pixel(3, 3, [1.4, -0.2, 0.5, 1.0]).unwrap();

    let out = analyzer().enhance(&photo).unwrap();
    assert_eq!(out.dimensions(), (32, 24));
    for px in out.data().chunks_exact(4) {
        for c in 0..3 {
            assert!((0.0..=1.0).contains(&px[c]), "channel {c} = {}", px[c]);
        }
    }
    // Alpha passes through untouched.
    assert_relative_eq!(out.channel_mean(3), 1.0);
}

#[test]
fn test_enhance_boosts_warm_colors() {
    // A dark-ish red should gain saturation/value from the food boost.
    let photo = ImageBuffer::splat([0.6, 0.1, 0.05, 1.0], 16, 16).unwrap();
    let out = analyzer().enhance(&photo).unwrap();
    assert!(out.channel_mean(0) > photo.channel_mean(0));
}

#[test]
fn test_freshness_vibrant_red_scenario() {
    // Solid saturated red: vibrancy 1, no brown, zero variance.
    // Composite freshness = 0.4*1 + 0.4*1 + 0.2*0 = 0.8.
    let photo = ImageBuffer::splat([1.0, 0.0, 0.0, 1.0], 16, 16).unwrap();
    let analysis = analyzer().analyze_freshness(&photo).unwrap();

    assert_relative_eq!(analysis.freshness_score, 0.8, epsilon = 1e-5);
    assert_eq!(
        analysis.recommendation,
        Recommendation::ConsumeWithinDays(4)
    );
    assert_eq!(analysis.indicators, vec!["vibrant color".to_string()]);
}

#[test]
fn test_freshness_brown_image_flagged() {
    let photo = ImageBuffer::splat([0.5, 0.4, 0.2, 1.0], 16, 16).unwrap();
    let analysis = analyzer().analyze_freshness(&photo).unwrap();
    assert!(analysis
        .indicators
        .contains(&"brown spots detected".to_string()));
    // Brown flag costs the full 0.4 non-brown term.
    assert!(analysis.freshness_score < 0.5);
}

#[test]
fn test_freshness_gray_is_dull() {
    let photo = ImageBuffer::splat([0.5, 0.5, 0.5, 1.0], 16, 16).unwrap();
    let analysis = analyzer().analyze_freshness(&photo).unwrap();
    assert!(analysis.indicators.contains(&"dull, faded color".to_string()));
    assert_relative_eq!(analysis.confidence, 0.5, epsilon = 1e-5);
}

#[test]
fn test_nutrition_green_photo_scores_vitamins() {
    let photo = ImageBuffer::splat([0.1, 0.8, 0.2, 1.0], 16, 16).unwrap();
    let analysis = analyzer().analyze_nutrition(&photo).unwrap();

    let vitamins = &analysis.estimated_nutrition.vitamins;
    // vitamin = 0.8*greenness + 0.6*warmness = 0.8*0.6 + 0.6*0.6 = 0.84.
    assert_relative_eq!(
        *vitamins.get("vitamin_c").unwrap(),
        0.84,
        epsilon = 1e-4
    );
    assert_relative_eq!(
        *vitamins.get("vitamin_a").unwrap(),
        0.6 * 0.84,
        epsilon = 1e-4
    );
    assert!(analysis.estimated_nutrition.calories > 0);
    assert!(analysis.confidence > 0.0 && analysis.confidence <= 1.0);
    // Uniform image: perfectly smooth.
    assert_relative_eq!(analysis.texture_metrics.smoothness, 1.0, epsilon = 1e-5);
}

#[test]
fn test_nutrition_color_profile_matches_input() {
    let photo = ImageBuffer::splat([0.0, 0.7, 0.0, 1.0], 8, 8).unwrap();
    let analysis = analyzer().analyze_nutrition(&photo).unwrap();
    // Pure green mean: hue 1/3, fully saturated.
    assert_relative_eq!(analysis.color_profile.hue, 1.0 / 3.0, epsilon = 1e-5);
    assert_relative_eq!(analysis.color_profile.saturation, 1.0, epsilon = 1e-5);
    assert_relative_eq!(analysis.color_profile.brightness, 0.7, epsilon = 1e-5);
}

#[test]
fn test_edge_map_uniform_vs_split() {
    let a = analyzer();

    let flat = ImageBuffer::splat([0.4, 0.4, 0.4, 1.0], 16, 16).unwrap();
    let flat_edges = a.edge_map(&flat).unwrap();
    assert_relative_eq!(flat_edges.max_strength(), 0.0);

    // Left half black, right half white: one strong vertical edge.
    let mut split = ImageBuffer::new(16, 16).unwrap();
    for y in 0..16 {
        for x in 0..16 {
            let v = if x < 8 { 0.0 } else { 1.0 };
            split.set_pixel(x, y, [v, v, v, 1.0]).unwrap();
        }
    }
    let split_edges = a.edge_map(&split).unwrap();
    assert_eq!((split_edges.width, split_edges.height), (16, 16));
    // Sobel magnitude at the boundary columns is 4.
    assert_relative_eq!(split_edges.max_strength(), 4.0, epsilon = 1e-5);
    assert_relative_eq!(split_edges.at(7, 8).unwrap(), 4.0, epsilon = 1e-5);
    assert_relative_eq!(split_edges.at(0, 8).unwrap(), 0.0);
    assert!(split_edges.mean_strength() > 0.1);
}

#[test]
fn test_checkerboard_texture_is_rough() {
    let analysis = analyzer().analyze_nutrition(&checkerboard(16, 16)).unwrap();
    // Checkerboard variance (~0.25) scales past the roughness cap.
    assert_relative_eq!(analysis.texture_metrics.roughness, 1.0, epsilon = 1e-5);
    assert_relative_eq!(analysis.texture_metrics.smoothness, 0.0, epsilon = 1e-5);
}

#[test]
fn test_single_pixel_image() {
    let photo = ImageBuffer::splat([0.9, 0.2, 0.1, 1.0], 1, 1).unwrap();
    let a = analyzer();
    assert_eq!(a.enhance(&photo).unwrap().dimensions(), (1, 1));
    // Clamped neighborhood of a 1x1 image is the pixel itself.
    let edges = a.edge_map(&photo).unwrap();
    assert_relative_eq!(edges.max_strength(), 0.0);
}

#[test]
fn test_non_tile_aligned_dimensions() {
    // 17x15 forces partial tiles on both axes.
    let photo = ImageBuffer::splat([0.3, 0.6, 0.2, 1.0], 17, 15).unwrap();
    let out = analyzer().enhance(&photo).unwrap();
    assert_eq!(out.dimensions(), (17, 15));
    // Uniform input enhances uniformly; corner equals center.
    let corner = out.pixel(16, 14).unwrap();
    let center = out.pixel(8, 7).unwrap();
    for c in 0..4 {
        assert_relative_eq!(corner[c], center[c], epsilon = 1e-5);
    }
}
