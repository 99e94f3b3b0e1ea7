//! WGSL compute shader sources.
//!
//! Each shader mirrors one reference function in [`crate::kernel`] and
//! shares the same bind group interface:
//!
//! - binding 0: input pixels, `array<vec4<f32>>`, read-only storage
//! - binding 1: output pixels, `array<vec4<f32>>`, read-write storage
//! - binding 2: dimensions, `vec4<u32>` uniform (width, height, 0, 0)
//!
//! All entry points use a 16x16 workgroup and bounds-check against the
//! uniform dimensions, so partially filled edge workgroups are safe.

/// Food-aware enhancement: HSV boost blended with a 3x3 sharpen.
pub const ENHANCEMENT: &str = r#"
@group(0) @binding(0) var<storage, read> src: array<vec4<f32>>;
@group(0) @binding(1) var<storage, read_write> dst: array<vec4<f32>>;
@group(0) @binding(2) var<uniform> dims: vec4<u32>;

fn sample_clamped(x: i32, y: i32) -> vec4<f32> {
    let sx = u32(clamp(x, 0, i32(dims.x) - 1));
    let sy = u32(clamp(y, 0, i32(dims.y) - 1));
    return src[sy * dims.x + sx];
}

fn rgb_to_hsv(rgb: vec3<f32>) -> vec3<f32> {
    let mx = max(rgb.r, max(rgb.g, rgb.b));
    let mn = min(rgb.r, min(rgb.g, rgb.b));
    let delta = mx - mn;

    var s = 0.0;
    if (mx > 0.0) {
        s = delta / mx;
    }

    var h = 0.0;
    if (delta > 0.0) {
        if (mx == rgb.r) {
            h = (((rgb.g - rgb.b) / delta + 6.0) % 6.0) / 6.0;
        } else if (mx == rgb.g) {
            h = ((rgb.b - rgb.r) / delta + 2.0) / 6.0;
        } else {
            h = ((rgb.r - rgb.g) / delta + 4.0) / 6.0;
        }
    }

    return vec3<f32>(h, s, mx);
}

fn hsv_to_rgb(hsv: vec3<f32>) -> vec3<f32> {
    let h6 = hsv.x * 6.0;
    let sector = i32(floor(h6)) % 6;
    let f = h6 - floor(h6);
    let v = hsv.z;
    let p = v * (1.0 - hsv.y);
    let q = v * (1.0 - hsv.y * f);
    let t = v * (1.0 - hsv.y * (1.0 - f));

    switch sector {
        case 0: { return vec3<f32>(v, t, p); }
        case 1: { return vec3<f32>(q, v, p); }
        case 2: { return vec3<f32>(p, v, t); }
        case 3: { return vec3<f32>(p, q, v); }
        case 4: { return vec3<f32>(t, p, q); }
        default: { return vec3<f32>(v, p, q); }
    }
}

fn boost_food_colors(hsv: vec3<f32>) -> vec3<f32> {
    var out = hsv;
    if (hsv.x >= 0.0 && hsv.x <= 0.167) {
        out.y = min(hsv.y * 1.15, 1.0);
        out.z = min(hsv.z * 1.05, 1.0);
    } else if (hsv.x >= 0.25 && hsv.x <= 0.417) {
        out.y = min(hsv.y * 1.10, 1.0);
        out.z = min(hsv.z * 1.02, 1.0);
    }
    return out;
}

@compute @workgroup_size(16, 16, 1)
fn enhance_main(@builtin(global_invocation_id) gid: vec3<u32>) {
    if (gid.x >= dims.x || gid.y >= dims.y) {
        return;
    }

    let px = sample_clamped(i32(gid.x), i32(gid.y));
    let rgb = clamp(px.rgb, vec3<f32>(0.0), vec3<f32>(1.0));

    let boosted = hsv_to_rgb(boost_food_colors(rgb_to_hsv(rgb)));

    let x = i32(gid.x);
    let y = i32(gid.y);
    var sharp = 3.0 * rgb;
    sharp -= 0.5 * clamp(sample_clamped(x, y - 1).rgb, vec3<f32>(0.0), vec3<f32>(1.0));
    sharp -= 0.5 * clamp(sample_clamped(x - 1, y).rgb, vec3<f32>(0.0), vec3<f32>(1.0));
    sharp -= 0.5 * clamp(sample_clamped(x + 1, y).rgb, vec3<f32>(0.0), vec3<f32>(1.0));
    sharp -= 0.5 * clamp(sample_clamped(x, y + 1).rgb, vec3<f32>(0.0), vec3<f32>(1.0));

    let blended = clamp(boosted * 0.7 + sharp * 0.3, vec3<f32>(0.0), vec3<f32>(1.0));
    dst[gid.y * dims.x + gid.x] = vec4<f32>(blended, px.a);
}
"#;

/// Nutrition heuristic: raw per-pixel nutrient proxies.
pub const NUTRITION: &str = r#"
@group(0) @binding(0) var<storage, read> src: array<vec4<f32>>;
@group(0) @binding(1) var<storage, read_write> dst: array<vec4<f32>>;
@group(0) @binding(2) var<uniform> dims: vec4<u32>;

@compute @workgroup_size(16, 16, 1)
fn nutrition_main(@builtin(global_invocation_id) gid: vec3<u32>) {
    if (gid.x >= dims.x || gid.y >= dims.y) {
        return;
    }

    let px = src[gid.y * dims.x + gid.x];
    let r = px.r;
    let g = px.g;
    let b = px.b;

    let greenness = max(g - max(r, b), 0.0);
    let warmness = max(max(r, g) - b, 0.0);
    let brownness = max(2.0 * min(r, min(g, b)) - max(r, max(g, b)), 0.0);
    let lightness = (r + g + b) / 3.0;

    let vitamin = 0.8 * greenness + 0.6 * warmness;
    let protein = 0.9 * brownness + 0.3 * (1.0 - lightness);
    let carb = 0.7 * lightness + 0.4 * brownness;
    let density = (vitamin + protein + carb) / 3.0;

    dst[gid.y * dims.x + gid.x] = vec4<f32>(vitamin, protein, carb, density);
}
"#;

/// Freshness: brown-spot flag, vibrancy, 3x3 texture variance, composite.
pub const FRESHNESS: &str = r#"
@group(0) @binding(0) var<storage, read> src: array<vec4<f32>>;
@group(0) @binding(1) var<storage, read_write> dst: array<vec4<f32>>;
@group(0) @binding(2) var<uniform> dims: vec4<u32>;

fn sample_clamped(x: i32, y: i32) -> vec4<f32> {
    let sx = u32(clamp(x, 0, i32(dims.x) - 1));
    let sy = u32(clamp(y, 0, i32(dims.y) - 1));
    return src[sy * dims.x + sx];
}

fn patch_variance(x: i32, y: i32) -> f32 {
    var mean = vec3<f32>(0.0);
    for (var ky = -1; ky <= 1; ky++) {
        for (var kx = -1; kx <= 1; kx++) {
            mean += sample_clamped(x + kx, y + ky).rgb;
        }
    }
    mean /= 9.0;

    var acc = 0.0;
    for (var ky = -1; ky <= 1; ky++) {
        for (var kx = -1; kx <= 1; kx++) {
            let d = sample_clamped(x + kx, y + ky).rgb - mean;
            acc += dot(d, d);
        }
    }
    return acc / (9.0 * 3.0);
}

@compute @workgroup_size(16, 16, 1)
fn freshness_main(@builtin(global_invocation_id) gid: vec3<u32>) {
    if (gid.x >= dims.x || gid.y >= dims.y) {
        return;
    }

    let px = src[gid.y * dims.x + gid.x];
    let r = px.r;
    let g = px.g;
    let b = px.b;

    var brown = 0.0;
    if (r > 0.4 && g > 0.25 && b < 0.3 && (r - g) < 0.2 && (g - b) > 0.1) {
        brown = 1.0;
    }

    let vibrancy = max(r, max(g, b)) - min(r, min(g, b));
    let variance = patch_variance(i32(gid.x), i32(gid.y));

    let freshness = 0.4 * clamp(vibrancy, 0.0, 1.0)
        + 0.4 * (1.0 - brown)
        + 0.2 * clamp(variance * 5.0, 0.0, 1.0);

    dst[gid.y * dims.x + gid.x] = vec4<f32>(brown, vibrancy, variance, freshness);
}
"#;

/// Edge detection: per-channel Sobel magnitude averaged over RGB.
pub const EDGE_DETECTION: &str = r#"
@group(0) @binding(0) var<storage, read> src: array<vec4<f32>>;
@group(0) @binding(1) var<storage, read_write> dst: array<vec4<f32>>;
@group(0) @binding(2) var<uniform> dims: vec4<u32>;

fn sample_clamped(x: i32, y: i32) -> vec3<f32> {
    let sx = u32(clamp(x, 0, i32(dims.x) - 1));
    let sy = u32(clamp(y, 0, i32(dims.y) - 1));
    return src[sy * dims.x + sx].rgb;
}

@compute @workgroup_size(16, 16, 1)
fn edge_main(@builtin(global_invocation_id) gid: vec3<u32>) {
    if (gid.x >= dims.x || gid.y >= dims.y) {
        return;
    }

    let x = i32(gid.x);
    let y = i32(gid.y);

    let tl = sample_clamped(x - 1, y - 1);
    let tc = sample_clamped(x, y - 1);
    let tr = sample_clamped(x + 1, y - 1);
    let ml = sample_clamped(x - 1, y);
    let mr = sample_clamped(x + 1, y);
    let bl = sample_clamped(x - 1, y + 1);
    let bc = sample_clamped(x, y + 1);
    let br = sample_clamped(x + 1, y + 1);

    let gx = (tr + 2.0 * mr + br) - (tl + 2.0 * ml + bl);
    let gy = (bl + 2.0 * bc + br) - (tl + 2.0 * tc + tr);

    let mag_rgb = sqrt(gx * gx + gy * gy);
    let mag = (mag_rgb.r + mag_rgb.g + mag_rgb.b) / 3.0;

    dst[gid.y * dims.x + gid.x] = vec4<f32>(mag, mag, mag, 1.0);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_bind_group_interface() {
        for source in [ENHANCEMENT, NUTRITION, FRESHNESS, EDGE_DETECTION] {
            assert!(source.contains("@binding(0) var<storage, read> src"));
            assert!(source.contains("@binding(1) var<storage, read_write> dst"));
            assert!(source.contains("@binding(2) var<uniform> dims"));
            assert!(source.contains("@workgroup_size(16, 16, 1)"));
        }
    }
}
