//! Interpolation helpers:
//! - lerp_* (component-wise linear blend)
//! - add_scaled_* (accumulation terms)
//! - cubic_bezier / spline_ease (keySpline timing via bisection)

/// Linear interpolation of scalars.
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
pub fn lerp_vec2(a: [f32; 2], b: [f32; 2], t: f32) -> [f32; 2] {
    [lerp_f32(a[0], b[0], t), lerp_f32(a[1], b[1], t)]
}

#[inline]
pub fn lerp_vec4(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
    [
        lerp_f32(a[0], b[0], t),
        lerp_f32(a[1], b[1], t),
        lerp_f32(a[2], b[2], t),
        lerp_f32(a[3], b[3], t),
    ]
}

/// Component-wise lerp over equal-length slices.
pub fn lerp_slice(a: &[f32], b: &[f32], t: f32) -> Vec<f32> {
    a.iter().zip(b.iter()).map(|(x, y)| lerp_f32(*x, *y, t)).collect()
}

#[inline]
pub fn add_scaled_vec2(a: [f32; 2], b: [f32; 2], k: f32) -> [f32; 2] {
    [a[0] + b[0] * k, a[1] + b[1] * k]
}

#[inline]
pub fn add_scaled_vec4(a: [f32; 4], b: [f32; 4], k: f32) -> [f32; 4] {
    [
        a[0] + b[0] * k,
        a[1] + b[1] * k,
        a[2] + b[2] * k,
        a[3] + b[3] * k,
    ]
}

pub fn add_scaled_slice(a: &[f32], b: &[f32], k: f32) -> Vec<f32> {
    a.iter().zip(b.iter()).map(|(x, y)| x + y * k).collect()
}

/// Euclidean distance between equal-length component slices.
pub fn euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (y - x) * (y - x))
        .sum::<f32>()
        .sqrt()
}

/// Cubic Bezier basis function
#[inline]
pub fn cubic_bezier(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

/// Ease `fraction` through the keySpline `(x1, y1, x2, y2)`.
///
/// The curve runs from (0,0) to (1,1). Its x-component is inverted by halving
/// [0,1] until the sampled x lies within `tolerance` of `fraction` or the
/// iteration bound is reached; the y at that parameter is the eased fraction.
pub fn spline_ease(fraction: f32, ctrl: [f32; 4], tolerance: f32, max_iterations: u32) -> f32 {
    let target = fraction.clamp(0.0, 1.0);
    let mut lo = 0.0f32;
    let mut hi = 1.0f32;
    let mut mid = 0.5f32;
    for _ in 0..max_iterations.max(1) {
        mid = 0.5 * (lo + hi);
        let x = cubic_bezier(0.0, ctrl[0], ctrl[2], 1.0, mid);
        if (x - target).abs() < tolerance {
            break;
        }
        if x < target {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    cubic_bezier(0.0, ctrl[1], ctrl[3], 1.0, mid)
}
